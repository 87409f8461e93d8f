//! Attaches chronological neighbor links to the most recent posts. Records
//! from the loader are never touched; each post in the window is wrapped in a
//! [`PublishedPost`] view that carries its own permalink and the permalinks
//! of its neighbors.

use crate::post::PostRecord;
use crate::url::Permalinks;
use gtmpl_value::Value;
use url::{ParseError, Url};

/// A post as it is published in this run: the parsed record plus the links
/// derived from it and from its neighbors.
#[derive(Clone, Debug, PartialEq)]
pub struct PublishedPost<'a> {
    pub post: &'a PostRecord,

    /// The post's permalink.
    pub link: Url,

    /// The post's short link.
    pub short_link: Url,

    /// The permalink of the next-older post, if any.
    pub prev: Option<Url>,

    /// The permalink of the next-newer post. Always `None` for the newest
    /// post.
    pub next: Option<Url>,
}

impl PublishedPost<'_> {
    /// Converts the view into a template [`Value`]: the record's fields plus
    /// `link`, `shortlink`, `prev` and `next`. Missing neighbors are
    /// [`Value::Nil`] so templates can test them with `{{if .post.prev}}`.
    pub fn to_value(&self) -> Value {
        let option_to_value = |opt: &Option<Url>| match opt {
            Some(url) => Value::String(url.to_string()),
            None => Value::Nil,
        };

        let mut value = self.post.to_value();
        if let Value::Object(m) = &mut value {
            m.insert("link".to_owned(), Value::String(self.link.to_string()));
            m.insert(
                "shortlink".to_owned(),
                Value::String(self.short_link.to_string()),
            );
            m.insert("prev".to_owned(), option_to_value(&self.prev));
            m.insert("next".to_owned(), option_to_value(&self.next));
        }
        value
    }
}

/// Produces [`PublishedPost`] views for the trailing `window` posts of
/// `posts`, which must be ordered oldest to newest. The oldest post in the
/// window takes its `prev` link from the post just before the window, when
/// there is one.
pub fn sequence<'a>(
    posts: &'a [PostRecord],
    window: usize,
    permalinks: &Permalinks,
) -> Result<Vec<PublishedPost<'a>>, ParseError> {
    let links = posts
        .iter()
        .map(|post| permalinks.link(post))
        .collect::<Result<Vec<Url>, ParseError>>()?;

    let start = posts.len().saturating_sub(window);
    (start..posts.len())
        .map(|i| {
            Ok(PublishedPost {
                post: &posts[i],
                link: links[i].clone(),
                short_link: permalinks.short_link(&posts[i])?,
                prev: match i {
                    0 => None,
                    _ => Some(links[i - 1].clone()),
                },
                next: links.get(i + 1).cloned(),
            })
        })
        .collect()
}
