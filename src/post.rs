//! Defines the [`PostRecord`] type and the logic for parsing a single post
//! source file into one. A post source file is named
//! `<zero-padded-id>_<slug>.<ext>` and looks like this:
//!
//! ```md
//! # Post Title
//! [tag, another tag]
//! <!-- Date: 2024-03-01 09:30:00 -->
//! "An optional one-line summary"
//! ===
//!
//! _Your blog content here_.
//! ```
//!
//! Every header line is optional except the `===` separator. Everything after
//! the separator is handed to the markdown renderer untouched.

use crate::markdown;
use crate::tag::Tag;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, ParseError as DateParseError, TimeZone};
use gtmpl_value::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The format of the date directive and of dates handed to templates.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TITLE_MARKER: &str = "# ";
const TAGS_MARKER: &str = "[";
const DATE_MARKER: &str = "<!-- Date:";
const DATE_TERMINATOR: &str = "-->";
const SUMMARY_MARKER: &str = "\"";
const SEPARATOR: &str = "===";
const FOLD_TAG: &str = "<!-- more -->";

/// One published post. Records are built fresh from disk on every run and
/// never change after parsing; neighbor links are attached separately by
/// [`crate::sequence`].
#[derive(Clone, Debug, PartialEq)]
pub struct PostRecord {
    /// The numeric prefix of the source file name.
    pub id: u64,

    /// The name component of the source file name, used to build URLs.
    pub slug: String,

    /// The post title, from the `# ` header line.
    pub title: String,

    /// The tags in listed order. Duplicates are kept.
    pub tags: Vec<Tag>,

    /// The post date: the date directive if present, otherwise the source
    /// file's creation time.
    pub date: NaiveDateTime,

    /// The explicit summary line, if the header had one.
    pub summary: Option<String>,

    /// The rendered HTML body.
    pub body: String,
}

impl Default for PostRecord {
    fn default() -> Self {
        PostRecord {
            id: 0,
            slug: String::new(),
            title: String::new(),
            tags: Vec::new(),
            date: NaiveDate::from_ymd(1970, 1, 1).and_hms(0, 0, 0),
            summary: None,
            body: String::new(),
        }
    }
}

impl PostRecord {
    /// Parses a post from its source `path` and file `input`. `created` is the
    /// date used when the header carries no date directive.
    pub fn parse(path: &Path, input: &str, created: NaiveDateTime) -> Result<PostRecord> {
        let (id, slug) = parse_file_name(path)?;
        let mut post = PostRecord {
            id,
            slug: slug.to_owned(),
            date: created,
            ..PostRecord::default()
        };

        let mut offset = 0;
        let mut body_start = None;
        for raw in input.split_inclusive('\n') {
            offset += raw.len();
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with(SEPARATOR) {
                body_start = Some(offset);
                break;
            }
            if let Some(title) = line.strip_prefix(TITLE_MARKER) {
                post.title = title.trim().to_owned();
            } else if line.starts_with(TAGS_MARKER) {
                post.tags = parse_tags(line);
            } else if let Some(directive) = line.strip_prefix(DATE_MARKER) {
                post.date = parse_date(directive.trim_end_matches(DATE_TERMINATOR).trim())?;
            } else if line.starts_with(SUMMARY_MARKER) {
                post.summary = Some(line.trim_matches('"').trim().to_owned());
            } else {
                log::debug!("ignoring header line in {}: {}", path.display(), line);
            }
        }

        match body_start {
            None => Err(Error::MissingSeparator),
            Some(start) => {
                markdown::to_html(&mut post.body, &input[start..]);
                Ok(post)
            }
        }
    }

    /// Returns the summary for feeds and listings: the explicit summary line,
    /// otherwise the body up to the `<!-- more -->` fold, otherwise the whole
    /// body.
    pub fn summary(&self) -> &str {
        match &self.summary {
            Some(summary) => summary.as_str(),
            None => match self.body.find(FOLD_TAG) {
                Some(i) => &self.body[..i],
                None => self.body.as_str(),
            },
        }
    }

    /// Converts the record into a template [`Value`]. Links are not part of
    /// the record; see [`crate::sequence::PublishedPost::to_value`].
    pub fn to_value(&self) -> Value {
        let local = in_zone(&self.date, &Local);
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("id".to_owned(), Value::from(self.id));
        m.insert("num".to_owned(), Value::String(format!("{:04}", self.id)));
        m.insert("slug".to_owned(), Value::String(self.slug.clone()));
        m.insert("title".to_owned(), Value::String(self.title.clone()));
        m.insert(
            "tags".to_owned(),
            Value::Array(self.tags.iter().map(Value::from).collect()),
        );
        m.insert(
            "date".to_owned(),
            Value::String(self.date.format(DATE_FORMAT).to_string()),
        );
        m.insert("rfc3339".to_owned(), Value::String(local.to_rfc3339()));
        m.insert("rfc2822".to_owned(), Value::String(local.to_rfc2822()));
        m.insert("summary".to_owned(), Value::String(self.summary().to_owned()));
        m.insert("body".to_owned(), Value::String(self.body.clone()));
        Value::Object(m)
    }
}

/// Attaches the time zone `tz` to the wall-clock time `date`. Post dates are
/// local wall-clock times, so this is how they become absolute instants. A
/// time skipped by a daylight-saving jump is read as UTC.
pub fn in_zone<Tz: TimeZone>(date: &NaiveDateTime, tz: &Tz) -> DateTime<Tz> {
    tz.from_local_datetime(date)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(date))
}

/// Splits a source file name of the form `<digits>_<slug>.<ext>` into its id
/// and slug.
pub fn parse_file_name(path: &Path) -> Result<(u64, &str)> {
    let invalid = || Error::InvalidFileName(path.to_owned());
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(invalid)?;
    let (digits, slug) = stem.split_once('_').ok_or_else(invalid)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || slug.is_empty() {
        return Err(invalid());
    }
    let id = digits.parse::<u64>().map_err(|_| invalid())?;
    Ok((id, slug))
}

fn parse_tags(line: &str) -> Vec<Tag> {
    line.trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|tag| tag.trim().trim_matches(|c: char| c == '\'' || c == '"').trim())
        .filter(|tag| !tag.is_empty())
        .map(Tag::new)
        .collect()
}

fn parse_date(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_hms(0, 0, 0)))
        .map_err(|err| Error::InvalidDate(value.to_owned(), err))
}

/// Represents the result of a [`PostRecord`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`PostRecord`]. Every variant means the post
/// source is malformed.
#[derive(Debug)]
pub enum Error {
    /// Returned when the file name doesn't match `<digits>_<slug>.<ext>`.
    InvalidFileName(PathBuf),

    /// Returned when the header has no `===` separator line.
    MissingSeparator,

    /// Returned when the date directive can't be parsed.
    InvalidDate(String, DateParseError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidFileName(path) => write!(
                f,
                "file name {:?} doesn't match `<digits>_<slug>.<ext>`",
                path
            ),
            Error::MissingSeparator => {
                write!(f, "missing `{}` separator before end of file", SEPARATOR)
            }
            Error::InvalidDate(value, err) => write!(f, "invalid date `{}`: {}", value, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidFileName(_) => None,
            Error::MissingSeparator => None,
            Error::InvalidDate(_, err) => Some(err),
        }
    }
}
