//! The seam between the publish pipeline and the template engine. Templates
//! are external assets looked up by name (e.g. `index.php`, `template.rss`)
//! in the template directory and rendered with [`gtmpl`], i.e. Go template
//! syntax.

use gtmpl::{Context, Template};
use gtmpl_value::Value;
use std::fmt;
use std::fs::read_to_string;
use std::io;
use std::path::{Path, PathBuf};

/// Renders a named template with a context. Implementations must be pure:
/// the same name and context always produce the same text.
pub trait TemplateEngine {
    fn render(&self, name: &str, context: Value) -> Result<String>;
}

/// A [`TemplateEngine`] that loads [`gtmpl`] templates from a directory.
pub struct Templates {
    directory: PathBuf,
}

impl Templates {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Templates {
        Templates {
            directory: directory.into(),
        }
    }

    fn load(&self, name: &str) -> Result<Template> {
        let path = self.directory.join(name);
        let contents = match read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::Missing {
                    name: name.to_owned(),
                    directory: self.directory.clone(),
                })
            }
            Err(err) => return Err(Error::Read { path, err }),
        };

        let mut template = Template::default();
        template
            .parse(&contents)
            .map_err(|err| Error::Parse(name.to_owned(), err))?;
        Ok(template)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl TemplateEngine for Templates {
    fn render(&self, name: &str, context: Value) -> Result<String> {
        let template = self.load(name)?;
        let context =
            Context::from(context).map_err(|err| Error::Execute(name.to_owned(), err))?;
        let mut out: Vec<u8> = Vec::new();
        template
            .execute(&mut out, &context)
            .map_err(|err| Error::Execute(name.to_owned(), err))?;
        String::from_utf8(out).map_err(|err| Error::Execute(name.to_owned(), err.to_string()))
    }
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or rendering a template.
#[derive(Debug)]
pub enum Error {
    /// Returned when no template with the requested name exists.
    Missing { name: String, directory: PathBuf },

    /// Returned for I/O problems reading an existing template file.
    Read { path: PathBuf, err: io::Error },

    /// Returned when the template text can't be parsed.
    Parse(String, String),

    /// Returned when applying the template to its context fails.
    Execute(String, String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Missing { name, directory } => write!(
                f,
                "template `{}` not found in '{}'",
                name,
                directory.display()
            ),
            Error::Read { path, err } => {
                write!(f, "reading template file '{}': {}", path.display(), err)
            }
            Error::Parse(name, err) => write!(f, "parsing template `{}`: {}", name, err),
            Error::Execute(name, err) => write!(f, "rendering template `{}`: {}", name, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            _ => None,
        }
    }
}
