//! Shared plumbing for the components that write into the output directory:
//! the [`Error`] type they all return and the small file helpers they build
//! on.

use crate::template;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Replaces `path` with `contents`. The contents are written to a sibling
/// staging file first and renamed into place, so `path` never holds a partial
/// write and any hard links to the previous file keep the previous contents.
pub fn overwrite(path: &Path, contents: &[u8]) -> Result<()> {
    let staging = staging_path(path);
    if let Err(err) = File::create(&staging).and_then(|mut file| file.write_all(contents)) {
        // The write error is the one reported.
        let _ = fs::remove_file(&staging);
        return Err(Error::io(&staging, err));
    }
    fs::rename(&staging, path).map_err(|err| Error::io(path, err))
}

/// Returns the hidden sibling `.{file_name}.tmp` used to stage writes to
/// `path`.
pub fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", file_name))
}

/// Appends `contents` to `path`, creating it if needed.
pub fn append(path: &Path, contents: &[u8]) -> Result<()> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .and_then(|mut file| file.write_all(contents))
        .map_err(|err| Error::io(path, err))
}

/// Returns the contents of `path`, or an empty string if it doesn't exist
/// yet.
pub fn read_or_empty(path: &Path) -> Result<String> {
    let mut contents = String::new();
    match File::open(path) {
        Ok(mut file) => {
            file.read_to_string(&mut contents)
                .map_err(|err| Error::io(path, err))?;
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(Error::io(path, err)),
    }
    Ok(contents)
}

/// The result of a fallible output operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing output files.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(template::Error),

    /// An error reading, writing or linking an output file.
    Io { path: PathBuf, err: io::Error },

    /// An error deriving a post URL.
    UrlParse(url::ParseError),
}

impl Error {
    pub fn io(path: &Path, err: io::Error) -> Error {
        Error::Io {
            path: path.to_owned(),
            err,
        }
    }
}

impl From<template::Error> for Error {
    /// Converts a [`template::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible template operations.
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. This allows us to use
    /// the `?` operator for permalink derivation.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Io { path, err } => write!(f, "'{}': {}", path.display(), err),
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
            Error::UrlParse(err) => Some(err),
        }
    }
}
