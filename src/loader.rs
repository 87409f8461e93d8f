//! Discovers post source files and parses the most recent ones into
//! [`PostRecord`]s.

use crate::config::SortOrder;
use crate::post::{self, parse_file_name, PostRecord};
use chrono::{DateTime, Local};
use log::{debug, warn};
use std::fmt;
use std::fs::{read_to_string, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Loads [`PostRecord`]s from a source directory.
pub struct PostLoader<'a> {
    /// The extension post source files carry, without the dot (e.g. `md`).
    extension: &'a str,

    /// How candidate files are ordered before the most recent ones are
    /// selected.
    sort: SortOrder,
}

impl<'a> PostLoader<'a> {
    /// Constructs a new loader. See fields on [`PostLoader`] for argument
    /// descriptions.
    pub fn new(extension: &'a str, sort: SortOrder) -> PostLoader<'a> {
        PostLoader { extension, sort }
    }

    /// Returns the `count` most recent posts in `source_directory`, oldest
    /// first.
    ///
    /// With [`SortOrder::Name`], "most recent" means the lexicographically
    /// greatest file names. That matches numeric order only as long as every
    /// id prefix has the same zero-padded width; a warning is logged when
    /// prefixes of different widths show up.
    pub fn load(&self, source_directory: &Path, count: usize) -> Result<Vec<PostRecord>> {
        let mut files = self.discover(source_directory)?;
        debug!("found {} post files in {}", files.len(), source_directory.display());

        sort_files(&mut files, self.sort);
        if self.sort == SortOrder::Name && has_mixed_widths(&files) {
            warn!("post ids have different widths; sorting by name no longer matches id order");
        }

        let skip = files.len().saturating_sub(count);
        files[skip..]
            .iter()
            .map(|file| self.load_post(file))
            .collect()
    }

    fn discover(&self, source_directory: &Path) -> Result<Vec<SourceFile>> {
        let mut files = Vec::new();
        for result in WalkDir::new(source_directory).min_depth(1).max_depth(1) {
            let entry = result.map_err(|err| Error::Walk(source_directory.to_owned(), err))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            let matches = entry
                .path()
                .extension()
                .map_or(false, |ext| ext == self.extension);
            if hidden || !matches {
                continue;
            }
            let metadata = entry
                .metadata()
                .map_err(|err| Error::Walk(entry.path().to_owned(), err))?;
            files.push(SourceFile {
                created: creation_time(&metadata).map_err(|err| Error::Io {
                    path: entry.path().to_owned(),
                    err,
                })?,
                path: entry.into_path(),
            });
        }
        Ok(files)
    }

    fn load_post(&self, file: &SourceFile) -> Result<PostRecord> {
        debug!("parsing {}", file.path.display());
        let contents = read_to_string(&file.path).map_err(|err| Error::Io {
            path: file.path.clone(),
            err,
        })?;
        let created: DateTime<Local> = file.created.into();
        PostRecord::parse(&file.path, &contents, created.naive_local()).map_err(|err| {
            Error::Malformed {
                path: file.path.clone(),
                err,
            }
        })
    }
}

struct SourceFile {
    path: PathBuf,
    created: SystemTime,
}

// Not every filesystem records creation time; fall back to the modification
// time there.
fn creation_time(metadata: &Metadata) -> io::Result<SystemTime> {
    metadata.created().or_else(|_| metadata.modified())
}

fn sort_files(files: &mut [SourceFile], sort: SortOrder) {
    match sort {
        SortOrder::Name => files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name())),
        SortOrder::Time => files.sort_by(|a, b| {
            a.created
                .cmp(&b.created)
                .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
        }),
    }
}

// True when the id prefixes of well-formed file names don't all have the same
// number of digits.
fn has_mixed_widths(files: &[SourceFile]) -> bool {
    let mut widths = files.iter().filter_map(|file| {
        parse_file_name(&file.path)
            .ok()
            .and_then(|_| file.path.file_name()?.to_str()?.find('_'))
    });
    match widths.next() {
        Some(first) => widths.any(|width| width != first),
        None => false,
    }
}

/// The result of a fallible loading operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading posts.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is malformed.
    Malformed { path: PathBuf, err: post::Error },

    /// Returned when the source directory can't be walked.
    Walk(PathBuf, walkdir::Error),

    /// Returned for other I/O errors.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Malformed { path, err } => {
                write!(f, "malformed post '{}': {}", path.display(), err)
            }
            Error::Walk(path, err) => write!(f, "reading '{}': {}", path.display(), err),
            Error::Io { path, err } => write!(f, "reading '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Malformed { path: _, err } => Some(err),
            Error::Walk(_, err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}
