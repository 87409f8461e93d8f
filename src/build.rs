//! Exports the [`publish_blog`] function which stitches together one
//! publishing run: loading the recent posts ([`crate::loader`]), linking
//! neighbors ([`crate::sequence`]), updating the tag listings
//! ([`crate::category`]), rebuilding the archive ([`crate::archive`]) and the
//! feeds ([`crate::feed`]), re-rendering the newest pages and finally swapping
//! the root document ([`crate::publish`]).
//!
//! Each step is idempotent, so a run that failed halfway can simply be
//! repeated.

use crate::archive::write_archive;
use crate::category::{CategoryIndexer, Outcome};
use crate::config::Config;
use crate::feed::{write_feeds, FeedConfig};
use crate::loader::{Error as LoadError, PostLoader};
use crate::post::Error as PostError;
use crate::publish::{swap_root, PageWriter};
use crate::sequence::sequence;
use crate::template::{Error as TemplateError, TemplateEngine};
use crate::write::Error as WriteError;
use log::{info, warn};
use std::fmt;
use std::io;
use std::path::PathBuf;

/// What a publishing run did, for logging and tests.
#[derive(Debug, Default, PartialEq)]
pub struct Report {
    /// The ids of the posts in the window, oldest first.
    pub window: Vec<u64>,

    /// The pages rendered in this run.
    pub pages: Vec<PathBuf>,

    /// The number of entries appended to tag listings.
    pub listings_added: usize,

    /// The root document, if one was published.
    pub root: Option<PathBuf>,
}

/// Runs the publish pipeline described by `config`, rendering pages and feeds
/// with `engine`.
pub fn publish_blog<E: TemplateEngine>(config: &Config, engine: &E) -> Result<Report> {
    let permalinks = config.permalinks();
    let output = &config.output_directory;

    // Load one post beyond the window so the oldest post in it and the oldest
    // re-rendered page get their `prev` link.
    let publish_count = config.publish_count.max(1);
    let posts = PostLoader::new(&config.post_extension, config.sort).load(
        &config.source_directory,
        config.recent_count.max(publish_count).saturating_add(1),
    )?;
    if posts.is_empty() {
        warn!(
            "no posts found in {}; nothing to publish",
            config.source_directory.display()
        );
        return Ok(Report::default());
    }
    std::fs::create_dir_all(output).map_err(|err| Error::FileSystem {
        path: output.clone(),
        err,
    })?;

    // Sequence
    let window = sequence(&posts, config.recent_count, &permalinks).map_err(WriteError::from)?;
    let mut report = Report {
        window: window.iter().map(|view| view.post.id).collect(),
        ..Report::default()
    };

    // Index, oldest first so listings stay chronological.
    let indexer = CategoryIndexer::new(output);
    for view in &window {
        report.listings_added += indexer
            .index(view)?
            .iter()
            .filter(|outcome| matches!(outcome, Outcome::Added(_)))
            .count();
    }

    // Archive and feeds
    write_archive(output, &window)?;
    write_feeds(
        engine,
        &FeedConfig {
            name: &config.blog_name,
            permalinks: &permalinks,
        },
        &window,
        output,
    )?;

    // Newest page plus predecessors, then the root swap.
    let root_name = config.root_file_name();
    let writer = PageWriter {
        engine,
        template: &root_name,
        output_directory: output,
        page_extension: &config.page_extension,
        permalinks: &permalinks,
    };
    let published = sequence(&posts, publish_count, &permalinks).map_err(WriteError::from)?;
    report.pages = writer.write_pages(&published)?;
    if let Some(newest) = report.pages.last() {
        report.root = Some(swap_root(output, &root_name, newest)?);
    }

    info!(
        "published {} posts ({} pages, {} new listing entries)",
        report.window.len(),
        report.pages.len(),
        report.listings_added
    );
    Ok(report)
}

/// The result of a publishing run.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for a publishing run. Every error is fatal and aborts the
/// run; nothing is retried.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file has an unparsable name or header.
    MalformedPost { path: PathBuf, err: PostError },

    /// Returned when a named template doesn't exist.
    MissingTemplate { name: String, directory: PathBuf },

    /// Returned when a template can't be read, parsed or rendered.
    Template(TemplateError),

    /// Returned when a file can't be read, written or linked.
    FileSystem { path: PathBuf, err: io::Error },

    /// Returned when a post URL can't be derived from the base URL.
    Url(url::ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedPost { path, err } => {
                write!(f, "Malformed post '{}': {}", path.display(), err)
            }
            Error::MissingTemplate { name, directory } => write!(
                f,
                "Missing template `{}` in '{}'",
                name,
                directory.display()
            ),
            Error::Template(err) => err.fmt(f),
            Error::FileSystem { path, err } => {
                write!(f, "File system error at '{}': {}", path.display(), err)
            }
            Error::Url(err) => write!(f, "Building post URL: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MalformedPost { path: _, err } => Some(err),
            Error::MissingTemplate { .. } => None,
            Error::Template(err) => Some(err),
            Error::FileSystem { path: _, err } => Some(err),
            Error::Url(err) => Some(err),
        }
    }
}

impl From<LoadError> for Error {
    /// Converts [`LoadError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: LoadError) -> Error {
        match err {
            LoadError::Malformed { path, err } => Error::MalformedPost { path, err },
            LoadError::Walk(path, err) => Error::FileSystem {
                path,
                err: err.into(),
            },
            LoadError::Io { path, err } => Error::FileSystem { path, err },
        }
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        match err {
            WriteError::Template(TemplateError::Missing { name, directory }) => {
                Error::MissingTemplate { name, directory }
            }
            WriteError::Template(err) => Error::Template(err),
            WriteError::Io { path, err } => Error::FileSystem { path, err },
            WriteError::UrlParse(err) => Error::Url(err),
        }
    }
}
