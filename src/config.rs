//! Configuration for both binaries. [`SiteConfig`] describes the site itself
//! and is loaded from an optional `site.yaml` at the root of the resource
//! tree; every field falls back to the values the site has always been built
//! with. [`GeneratorArgs`] and [`ServerArgs`] are the command-line flags of
//! `site-gen` and `site-serve` respectively.

use crate::resource::{MAX_DOCUMENT_SIZE, MAX_IMAGE_SIZE};
use crate::source::{self, Source};
use clap::{CommandFactory, Parser};
use serde::Deserialize;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// The name of the optional configuration file at the root of the resource
/// tree.
pub const CONFIG_FILE: &str = "site.yaml";

/// Site-wide settings. Missing fields in `site.yaml` take their defaults.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    /// The site name, available to templates as `.Site.Name`.
    pub name: String,

    /// The site description, available to templates as `.Site.Description`.
    pub description: String,

    /// The top-level pages rendered through the shared layout.
    pub pages: Vec<PageSpec>,

    /// Image directories copied verbatim into the destination.
    pub image_dirs: Vec<ImageDir>,

    /// The largest image, in bytes, that may be copied. Zero disables the
    /// check.
    pub max_image_size: usize,

    /// The largest document, in bytes, that may be copied. Zero disables the
    /// check.
    pub max_document_size: usize,
}

/// One top-level page: the fragment `{dir}/{file}.html` rendered with the
/// title `title` into `{dest}/{file}.html`.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PageSpec {
    #[serde(default)]
    pub dir: String,
    pub file: String,
    pub title: String,
}

/// Copies `{src}/images` from the resource tree into `{dest}/images/{dest}`.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ImageDir {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub dest: String,
}

impl PageSpec {
    fn new(dir: &str, file: &str, title: &str) -> PageSpec {
        PageSpec {
            dir: dir.to_owned(),
            file: file.to_owned(),
            title: title.to_owned(),
        }
    }

    /// The name of the fragment and of the rendered output file.
    pub fn file_name(&self) -> String {
        format!("{}.html", self.file)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            name: String::from("Enl!ghten"),
            description: String::from("Kitsap Community Forum"),
            pages: vec![
                PageSpec::new("", "home", "Home Page"),
                PageSpec::new("about", "board-members", "Board Members"),
                PageSpec::new("about", "contact-us", "Contact Us"),
                PageSpec::new("about", "donations", "Donations"),
                PageSpec::new("about", "location", "Where Are We Located?"),
                PageSpec::new("about", "mission-statement", "Mission Statement"),
                PageSpec::new("about", "purpose-statement", "Purpose Statement"),
                PageSpec::new("about", "volunteers", "Volunteers"),
                PageSpec::new("events", "calendar", "Calendar"),
                PageSpec::new("events", "sign-up", "Sign Up For Events"),
            ],
            image_dirs: vec![
                // root images
                ImageDir {
                    src: String::new(),
                    dest: String::new(),
                },
                ImageDir {
                    src: String::from("about"),
                    dest: String::from("board"),
                },
            ],
            max_image_size: MAX_IMAGE_SIZE,
            max_document_size: MAX_DOCUMENT_SIZE,
        }
    }
}

impl SiteConfig {
    /// Loads `site.yaml` from the root of `source`, or returns the defaults
    /// when there is no such file.
    pub fn from_source(source: &dyn Source) -> Result<SiteConfig> {
        let path = Path::new(CONFIG_FILE);
        if !source.is_file(path) {
            return Ok(SiteConfig::default());
        }
        match SiteConfig::from_yaml(&source.read_file(path)?) {
            Ok(config) => Ok(config),
            Err(e) => Err(Error::Annotated(
                format!("loading `{}`", CONFIG_FILE),
                Box::new(e),
            )),
        }
    }

    pub fn from_yaml(input: &[u8]) -> Result<SiteConfig> {
        Ok(serde_yaml::from_slice(input)?)
    }
}

/// Command-line flags for `site-gen`.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "site-gen")]
#[command(about = "Generates the static site files")]
#[command(after_help = "Warning: Overwrites the previous site")]
pub struct GeneratorArgs {
    /// the location to save the site files to
    #[arg(long)]
    pub dest: PathBuf,

    /// the resource tree to build the site from
    #[arg(long, default_value = "resources")]
    pub src: PathBuf,
}

/// Command-line flags for `site-serve`. Every flag may also be set through an
/// environment variable named after it (see
/// [`ServerArgs::parse_args_and_env`]).
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "site-serve")]
#[command(about = "Serves the generated site over HTTP")]
#[command(args_override_self = true)]
pub struct ServerArgs {
    /// the port to run the site on
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// the directory of generated site files to serve
    #[arg(long, default_value = "build/site")]
    pub dir: PathBuf,
}

impl ServerArgs {
    /// Parses `args` (program name first) and then overlays environment
    /// variables. A flag named `some-flag` is overwritten by the variable
    /// `SOME_FLAG` when `lookup` finds one; the environment wins over the
    /// command line.
    pub fn parse_args_and_env<I, T, F>(args: I, lookup: F) -> Result<ServerArgs>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
        F: Fn(&str) -> Option<String>,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if args.is_empty() {
            return Err(Error::MissingProgramName);
        }
        args.extend(env_overrides(&ServerArgs::command(), lookup));
        Ok(ServerArgs::try_parse_from(args)?)
    }
}

/// Returns a `--flag=value` argument for every flag of `command` that has a
/// matching environment variable. These are appended after the real
/// arguments, so with `args_override_self` they take precedence.
fn env_overrides<F>(command: &clap::Command, lookup: F) -> Vec<OsString>
where
    F: Fn(&str) -> Option<String>,
{
    command
        .get_arguments()
        .filter_map(|arg| arg.get_long())
        .filter(|long| *long != "help" && *long != "version")
        .filter_map(|long| {
            let name = long.to_uppercase().replace('-', "_");
            lookup(&name).map(|value| OsString::from(format!("--{}={}", long, value)))
        })
        .collect()
}

/// The result of loading configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when the argument list doesn't start with a program name.
    MissingProgramName,

    /// Returned for invalid command-line flags or environment values.
    Args(clap::Error),

    /// Returned when `site.yaml` can't be read.
    Source(source::Error),

    /// Returned when `site.yaml` isn't valid.
    DeserializeYaml(serde_yaml::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingProgramName => {
                write!(f, "first argument must be program name")
            }
            Error::Args(err) => err.fmt(f),
            Error::Source(err) => err.fmt(f),
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingProgramName => None,
            Error::Args(err) => Some(err),
            Error::Source(err) => Some(err),
            Error::DeserializeYaml(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<clap::Error> for Error {
    fn from(err: clap::Error) -> Error {
        Error::Args(err)
    }
}

impl From<source::Error> for Error {
    fn from(err: source::Error) -> Error {
        Error::Source(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}
