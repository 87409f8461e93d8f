//! Derives post URLs from the configured base URLs. Post records never store
//! their links; every link in the system is computed here from a post's `id`
//! and `slug`.

use crate::post::PostRecord;
use url::{ParseError, Url};

/// Builds permalinks and short links for posts.
#[derive(Clone, Debug)]
pub struct Permalinks {
    /// The blog's base URL, e.g. `https://blog.example.org`.
    base: Url,

    /// The base for short links. Falls back to `base` when the blog has no
    /// short domain.
    short: Url,
}

impl Permalinks {
    pub fn new(base: Url, short: Option<Url>) -> Permalinks {
        Permalinks {
            short: short.unwrap_or_else(|| base.clone()),
            base,
        }
    }

    /// Returns the canonical URL for `post`: `{base}/{id:04}_{slug}`.
    pub fn link(&self, post: &PostRecord) -> Result<Url, ParseError> {
        join(&self.base, &format!("{:04}_{}", post.id, post.slug))
    }

    /// Returns the short URL for `post`: `{short}/{id:04}`.
    pub fn short_link(&self, post: &PostRecord) -> Result<Url, ParseError> {
        join(&self.short, &format!("{:04}", post.id))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn short(&self) -> &Url {
        &self.short
    }

    /// Returns `{base}/{name}`, used for the feed URLs.
    pub fn site_file(&self, name: &str) -> Result<Url, ParseError> {
        join(&self.base, name)
    }
}

// [`Url::join`] treats the last path segment as a file name unless the base
// ends with a slash, which would silently drop e.g. the `/b` in
// `https://example.org/b`. Appending the segment textually keeps it.
fn join(base: &Url, segment: &str) -> Result<Url, ParseError> {
    Url::parse(&format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        segment
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::PostRecord;

    fn post(id: u64, slug: &str) -> PostRecord {
        PostRecord {
            id,
            slug: slug.to_owned(),
            ..PostRecord::default()
        }
    }

    #[test]
    fn test_link() -> Result<(), ParseError> {
        let links = Permalinks::new(Url::parse("https://blog.example.org")?, None);
        assert_eq!(
            "https://blog.example.org/0007_hello",
            links.link(&post(7, "hello"))?.as_str()
        );
        assert_eq!(
            "https://blog.example.org/0007",
            links.short_link(&post(7, "hello"))?.as_str()
        );
        Ok(())
    }

    #[test]
    fn test_short_link_keeps_path() -> Result<(), ParseError> {
        let links = Permalinks::new(
            Url::parse("https://blog.example.org/")?,
            Some(Url::parse("https://ex.in/b")?),
        );
        assert_eq!(
            "https://blog.example.org/0012_later",
            links.link(&post(12, "later"))?.as_str()
        );
        assert_eq!(
            "https://ex.in/b/0012",
            links.short_link(&post(12, "later"))?.as_str()
        );
        Ok(())
    }

    #[test]
    fn test_wide_ids_are_not_truncated() -> Result<(), ParseError> {
        let links = Permalinks::new(Url::parse("https://blog.example.org")?, None);
        assert_eq!(
            "https://blog.example.org/12345_big",
            links.link(&post(12345, "big"))?.as_str()
        );
        Ok(())
    }
}
