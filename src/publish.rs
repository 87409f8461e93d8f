//! Renders post pages and makes the newest one the site's root document.

use crate::sequence::PublishedPost;
use crate::template::TemplateEngine;
use crate::url::Permalinks;
use crate::write::{overwrite, staging_path, Error, Result};
use gtmpl_value::Value;
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Responsible for templating and writing post pages to disk.
pub struct PageWriter<'a, E> {
    /// The template engine pages are rendered with.
    pub engine: &'a E,

    /// The name of the page template, e.g. `index.php`.
    pub template: &'a str,

    /// The directory pages are written to. The page for post 42 is
    /// `{output_directory}/0042.{page_extension}`.
    pub output_directory: &'a Path,

    /// The extension of rendered pages, e.g. `php`.
    pub page_extension: &'a str,

    /// The blog's base and short URLs, made available to the template as
    /// `url` and `short_url`.
    pub permalinks: &'a Permalinks,
}

impl<E: TemplateEngine> PageWriter<'_, E> {
    /// Returns the path of the rendered page for post `id`.
    pub fn page_path(&self, id: u64) -> PathBuf {
        self.output_directory
            .join(format!("{:04}.{}", id, self.page_extension))
    }

    /// Takes a single [`PublishedPost`], templates it, and writes it to disk,
    /// overwriting any earlier rendering. Returns the page's path.
    pub fn write_page(&self, view: &PublishedPost) -> Result<PathBuf> {
        let option_to_value = |opt: &Option<url::Url>| match opt {
            Some(url) => Value::String(url.to_string()),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("post".to_owned(), view.to_value());
        m.insert("prev".to_owned(), option_to_value(&view.prev));
        m.insert("next".to_owned(), option_to_value(&view.next));
        m.insert(
            "url".to_owned(),
            Value::String(self.permalinks.base().to_string()),
        );
        m.insert(
            "short_url".to_owned(),
            Value::String(self.permalinks.short().to_string()),
        );

        let path = self.page_path(view.post.id);
        info!("writing {} ({})", path.display(), view.post.title);
        let text = self.engine.render(self.template, Value::Object(m))?;
        overwrite(&path, text.as_bytes())?;
        Ok(path)
    }

    /// Writes the pages for `views` in order and returns their paths.
    pub fn write_pages(&self, views: &[PublishedPost]) -> Result<Vec<PathBuf>> {
        views.iter().map(|view| self.write_page(view)).collect()
    }
}

/// Makes `page` the root document `{output_directory}/{root_name}`.
///
/// The page is hard-linked to a temporary name in the same directory, which is
/// then renamed over the root document. The rename replaces the old root in
/// one step, so readers see either the old page or the new one, never a
/// missing root document.
pub fn swap_root(output_directory: &Path, root_name: &str, page: &Path) -> Result<PathBuf> {
    let root = output_directory.join(root_name);
    let staging = staging_path(&root);

    remove_if_exists(&staging)?;
    fs::hard_link(page, &staging).map_err(|err| Error::io(&staging, err))?;
    fs::rename(&staging, &root).map_err(|err| Error::io(&root, err))?;

    // Renaming onto a hard link of the same file is a successful no-op that
    // leaves the staging name behind.
    remove_if_exists(&staging)?;

    info!("{} now points at {}", root.display(), page.display());
    Ok(root)
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("removed stale {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::io(path, err)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::PostRecord;
    use crate::sequence::sequence;
    use crate::template::Templates;
    use std::fs::{read_to_string, write};
    use url::Url;

    const PAGE: &str = "{{.post.title}}|{{if .prev}}{{.prev}}{{else}}-{{end}}|{{if .next}}{{.next}}{{else}}-{{end}}|{{.short_url}}";

    fn records() -> Vec<PostRecord> {
        (1..=3)
            .map(|id| PostRecord {
                id,
                slug: format!("p{}", id),
                title: format!("T{}", id),
                ..PostRecord::default()
            })
            .collect()
    }

    #[test]
    fn test_write_pages() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let templates = tempfile::tempdir()?;
        write(templates.path().join("index.php"), PAGE)?;
        let output = tempfile::tempdir()?;
        let engine = Templates::new(templates.path());
        let permalinks = Permalinks::new(Url::parse("https://b.example")?, None);
        let writer = PageWriter {
            engine: &engine,
            template: "index.php",
            output_directory: output.path(),
            page_extension: "php",
            permalinks: &permalinks,
        };

        let posts = records();
        let paths = writer.write_pages(&sequence(&posts, 2, &permalinks)?)?;
        assert_eq!(
            vec![output.path().join("0002.php"), output.path().join("0003.php")],
            paths
        );
        assert_eq!(
            "T2|https://b.example/0001_p1|https://b.example/0003_p3|https://b.example/",
            read_to_string(&paths[0])?
        );
        assert_eq!(
            "T3|https://b.example/0002_p2|-|https://b.example/",
            read_to_string(&paths[1])?
        );
        assert!(!output.path().join("0001.php").exists());
        Ok(())
    }

    #[test]
    fn test_swap_root() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let output = tempfile::tempdir()?;
        let older = output.path().join("0001.php");
        let newer = output.path().join("0002.php");
        write(&older, "older")?;
        write(&newer, "newer")?;

        let root = swap_root(output.path(), "index.php", &older)?;
        assert_eq!("older", read_to_string(&root)?);

        swap_root(output.path(), "index.php", &newer)?;
        assert_eq!("newer", read_to_string(&root)?);

        // Swapping to the page the root already points at is harmless.
        swap_root(output.path(), "index.php", &newer)?;
        assert_eq!("newer", read_to_string(&root)?);
        assert!(!output.path().join(".index.php.tmp").exists());
        assert_eq!("older", read_to_string(&older)?);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_root_is_a_hard_link() -> std::result::Result<(), Box<dyn std::error::Error>> {
        use std::os::unix::fs::MetadataExt;

        let output = tempfile::tempdir()?;
        let page = output.path().join("0007.php");
        write(&page, "page")?;
        let root = swap_root(output.path(), "index.php", &page)?;
        assert_eq!(fs::metadata(&page)?.ino(), fs::metadata(&root)?.ino());
        Ok(())
    }
}
