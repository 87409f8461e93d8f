//! Rebuilds the recent-posts listing (`archive.inc`).

use crate::category::entry;
use crate::sequence::PublishedPost;
use crate::write::{overwrite, Result};
use log::info;
use std::path::Path;

/// The file name of the recent-posts listing.
pub const ARCHIVE_FILE: &str = "archive.inc";

/// Overwrites the archive in `output_directory` so it lists exactly `views`,
/// newest first. `views` must be ordered oldest to newest.
pub fn write_archive(output_directory: &Path, views: &[PublishedPost]) -> Result<()> {
    let path = output_directory.join(ARCHIVE_FILE);
    info!("rebuilding {} with {} posts", path.display(), views.len());
    overwrite(&path, render(views).as_bytes())
}

fn render(views: &[PublishedPost]) -> String {
    let mut out = String::from("<ul class=\"posts\">\n");
    for view in views.iter().rev() {
        out.push_str(&entry(view));
    }
    out.push_str("</ul>\n");
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::category::listed_links;
    use crate::post::PostRecord;
    use crate::sequence::sequence;
    use crate::url::Permalinks;
    use url::Url;

    fn records(ids: &[u64]) -> Vec<PostRecord> {
        ids.iter()
            .map(|id| PostRecord {
                id: *id,
                slug: format!("p{}", id),
                title: format!("Title {}", id),
                ..PostRecord::default()
            })
            .collect()
    }

    #[test]
    fn test_archive_lists_window_newest_first() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let permalinks = Permalinks::new(Url::parse("https://b.example")?, None);

        let posts = records(&[1, 2, 3]);
        write_archive(dir.path(), &sequence(&posts, 3, &permalinks)?)?;
        let archive = std::fs::read_to_string(dir.path().join(ARCHIVE_FILE))?;
        assert_eq!(
            "<ul class=\"posts\">\n\
             <li><a href=\"https://b.example/0003_p3\">Title 3</a></li>\n\
             <li><a href=\"https://b.example/0002_p2\">Title 2</a></li>\n\
             <li><a href=\"https://b.example/0001_p1\">Title 1</a></li>\n\
             </ul>\n",
            archive
        );

        // Post 1 leaves the window; the archive no longer mentions it.
        let posts = records(&[2, 3, 4]);
        write_archive(dir.path(), &sequence(&posts, 3, &permalinks)?)?;
        let archive = std::fs::read_to_string(dir.path().join(ARCHIVE_FILE))?;
        assert_eq!(
            vec![
                "https://b.example/0004_p4",
                "https://b.example/0003_p3",
                "https://b.example/0002_p2"
            ],
            listed_links(&archive).collect::<Vec<_>>()
        );
        Ok(())
    }
}
