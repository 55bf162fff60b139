//! Template composition. Every page is rendered through the shared layout:
//! `main.html` is the root template, the partials `index.css`, `nav.html` and
//! `nav.css` are addressable by file name (`{{template "nav.html" .}}`), and
//! the page's own fragment contributes `{{define}}` blocks (conventionally
//! `content`) that the layout pulls in.
//!
//! Event fragments are rendered differently: each one defines an `event` and
//! a `resources` sub-template, and only the requested sub-template is
//! executed (see [`Composer::render_part`]).
//!
//! Fields missing from the template context are errors rather than blanks,
//! since every context object is a [`Value::Object`].

use crate::source::{self, Source};
use gtmpl::{Context, Template, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// The root template of the shared layout.
pub const LAYOUT_ROOT: &str = "main.html";

/// The layout partials, each available to templates under its file name.
pub const LAYOUT_PARTIALS: &[&str] = &["index.css", "nav.html", "nav.css"];

/// Loads and renders templates from a [`Source`].
pub struct Composer<'a> {
    source: &'a dyn Source,
}

impl<'a> Composer<'a> {
    pub fn new(source: &'a dyn Source) -> Composer<'a> {
        Composer { source }
    }

    /// Parses the shared layout together with the fragment at `fragment`.
    ///
    /// The fragment is parsed first so that the layout's root replaces any
    /// top-level text the fragment has outside of its `{{define}}` blocks.
    pub fn compose(&self, fragment: &Path) -> Result<Template> {
        let mut template = Template::default();
        self.parse_file(&mut template, fragment)?;

        let mut layout = String::new();
        for partial in LAYOUT_PARTIALS {
            let contents = self.source.read_to_string(Path::new(partial))?;
            layout.push_str(&format!("{{{{define \"{}\"}}}}", partial));
            layout.push_str(&contents);
            layout.push_str("{{end}}");
        }
        layout.push_str(&self.source.read_to_string(Path::new(LAYOUT_ROOT))?);
        template.parse(layout).map_err(|err| Error::Parse {
            path: PathBuf::from(LAYOUT_ROOT),
            err,
        })?;
        Ok(template)
    }

    /// Renders `fragment` through the layout with `data` as the context and
    /// trims the surrounding whitespace from the result.
    pub fn render(&self, fragment: &Path, data: Value) -> Result<String> {
        let template = self.compose(fragment)?;
        let context = Context::from(data).map_err(Error::Execute)?;
        Ok(execute(&template, &context)?.trim().to_owned())
    }

    /// Renders only the sub-template named `part` from `fragment`, with an
    /// empty context.
    pub fn render_part(&self, fragment: &Path, part: &str) -> Result<String> {
        let mut template = Template::default();
        self.parse_file(&mut template, fragment)?;
        if !template.tree_set.contains_key(part) {
            return Err(Error::MissingTemplate {
                name: part.to_owned(),
                path: fragment.to_owned(),
            });
        }
        template
            .parse(format!("{{{{template \"{}\" .}}}}", part))
            .map_err(|err| Error::Parse {
                path: fragment.to_owned(),
                err,
            })?;
        match execute(&template, &Context::empty()) {
            Ok(rendered) => Ok(rendered),
            Err(e) => Err(Error::Annotated(
                format!(
                    "executing template `{}` from `{}`",
                    part,
                    fragment.display()
                ),
                Box::new(e),
            )),
        }
    }

    fn parse_file(&self, template: &mut Template, path: &Path) -> Result<()> {
        let contents = self.source.read_to_string(path)?;
        template.parse(contents).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })
    }
}

fn execute(template: &Template, context: &Context) -> Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    template.execute(&mut buf, context).map_err(Error::Execute)?;
    Ok(String::from_utf8(buf)?)
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or executing a template.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template file can't be read.
    Source(source::Error),

    /// Returned for errors parsing a template file.
    Parse { path: PathBuf, err: String },

    /// Returned for errors during templating, including missing fields.
    Execute(String),

    /// Returned when a fragment doesn't define a requested sub-template.
    MissingTemplate { name: String, path: PathBuf },

    /// Returned when the rendered output isn't valid UTF-8.
    InvalidUtf8(std::string::FromUtf8Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Source(err) => err.fmt(f),
            Error::Parse { path, err } => {
                write!(f, "parsing template `{}`: {}", path.display(), err)
            }
            Error::Execute(err) => err.fmt(f),
            Error::MissingTemplate { name, path } => {
                write!(f, "no template named {:?} in `{}`", name, path.display())
            }
            Error::InvalidUtf8(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Source(err) => Some(err),
            Error::Parse { .. } => None,
            Error::Execute(_) => None,
            Error::MissingTemplate { .. } => None,
            Error::InvalidUtf8(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<source::Error> for Error {
    fn from(err: source::Error) -> Error {
        Error::Source(err)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Error {
        Error::InvalidUtf8(err)
    }
}
