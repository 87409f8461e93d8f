//! Maintains the per-tag listing files. Each listing is an append-only list of
//! `<li>` entries, one per post carrying the tag.

use crate::sequence::PublishedPost;
use crate::write::{append, read_or_empty, Result};
use log::{debug, info, warn};
use std::path::Path;

/// The extension of tag listing files.
pub const LISTING_EXTENSION: &str = "html";

/// What happened to one tag listing when a post was indexed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The post's entry was appended.
    Added(String),

    /// The listing already held an entry linking to the post.
    AlreadyListed(String),
}

/// Appends posts to the tag listings in an output directory.
pub struct CategoryIndexer<'a> {
    output_directory: &'a Path,
}

impl<'a> CategoryIndexer<'a> {
    pub fn new(output_directory: &'a Path) -> CategoryIndexer<'a> {
        CategoryIndexer { output_directory }
    }

    /// Adds `view` to the listing of every tag it declares, unless the listing
    /// already has an entry whose `href` is exactly the post's permalink.
    /// Returns one [`Outcome`] per declared tag, keyed by the normalized tag.
    /// Tags whose key normalizes to nothing are skipped.
    pub fn index(&self, view: &PublishedPost) -> Result<Vec<Outcome>> {
        let mut outcomes = Vec::with_capacity(view.post.tags.len());
        for tag in &view.post.tags {
            let key = tag.key();
            if key.is_empty() {
                warn!("post {:04}: tag {:?} has no usable name", view.post.id, tag.name);
                continue;
            }
            let path = self
                .output_directory
                .join(format!("{}.{}", key, LISTING_EXTENSION));

            let existing = read_or_empty(&path)?;
            if listed_links(&existing).any(|href| href == view.link.as_str()) {
                debug!("{} already lists {}", path.display(), view.link);
                outcomes.push(Outcome::AlreadyListed(key));
                continue;
            }

            info!("adding post {:04} to {}", view.post.id, path.display());
            append(&path, entry(view).as_bytes())?;
            outcomes.push(Outcome::Added(key));
        }
        Ok(outcomes)
    }
}

/// Formats one listing entry. The archive uses the same shape.
pub fn entry(view: &PublishedPost) -> String {
    format!(
        "<li><a href=\"{}\">{}</a></li>\n",
        view.link, view.post.title
    )
}

/// Yields the `href` of every entry in a listing. Both quoted and unquoted
/// attribute values are recognized so listings written by hand still dedup.
pub fn listed_links(listing: &str) -> impl Iterator<Item = &str> {
    listing.lines().filter_map(|line| {
        let rest = &line[line.find("href=")? + "href=".len()..];
        match rest.chars().next()? {
            quote @ '"' | quote @ '\'' => rest[1..].split(quote).next(),
            _ => rest.split(|c: char| c == '>' || c.is_whitespace()).next(),
        }
    })
}
