//! Defines the [`Tag`] type, which represents a [`crate::post::PostRecord`]
//! tag.

use gtmpl_value::Value;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Represents a post tag as written in the post header. The `name` field keeps
/// the author's spelling for display, while [`Tag::key`] yields the normalized
/// identifier that names the tag's listing file.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The tag's name as listed in the post header (surrounding whitespace
    /// trimmed).
    pub name: String,
}

impl Tag {
    pub fn new<S: Into<String>>(name: S) -> Tag {
        Tag { name: name.into() }
    }

    /// Returns the listing-file key for this tag. Keys are lower-cased, spaces
    /// become underscores, and surrounding quote characters are stripped, so
    /// e.g., `Rust Lang` and `'rust lang'` both resolve to `rust_lang`.
    pub fn key(&self) -> String {
        normalize(&self.name)
    }
}

/// Normalizes a raw tag into its listing-file key. Path separators and
/// leading dots are removed so the key always names a file directly inside the
/// output directory. The key may be empty.
pub fn normalize(tag: &str) -> String {
    tag.trim()
        .to_lowercase()
        .replace(' ', "_")
        .trim_matches(|c: char| c == '\'' || c == '"')
        .replace(|c: char| c == '/' || c == '\\', "")
        .trim_start_matches('.')
        .to_owned()
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating to the normalized key.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by comparing normalized
    /// keys.
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl Eq for Tag {}

impl From<&Tag> for Value {
    /// Converts [`Tag`]s into [`Value`]s for templating.
    fn from(t: &Tag) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("name".to_owned(), Value::String(t.name.clone()));
        m.insert("key".to_owned(), Value::String(t.key()));
        Value::Object(m)
    }
}
