//! The event aggregator. Events live under `events/` in the resource tree:
//!
//! ```text
//! events/
//! ├── future/              # upcoming events, one group
//! │   ├── 2024-09-speaker.html
//! │   └── 2024-09-speaker.jpg
//! └── past/
//!     ├── 2022/            # one group per year
//!     └── 2023/
//!         ├── 2023-03-talk.html
//!         └── 2023-03-talk.pdf
//! ```
//!
//! Each folder becomes an [`EventGroup`]. Files are processed newest first
//! (reverse name order), as are the past years themselves. Every `.html` file
//! must define an `event` and a `resources` sub-template, which are rendered
//! into the group's buffers; images and documents are copied into the
//! destination under `images/events/{folder}` and `resources/events/{folder}`.
//! Any other file is an error.

use crate::resource::FileKind;
use crate::source::{self, Entry};
use crate::template;
use crate::write::{self, Site};
use std::fmt;
use std::path::{Path, PathBuf};

pub const EVENTS_DIR: &str = "events";
pub const FUTURE_DIR: &str = "future";
pub const PAST_DIR: &str = "past";

/// The sub-template rendered into [`EventGroup::events`].
pub const EVENT_TEMPLATE: &str = "event";

/// The sub-template rendered into [`EventGroup::resources`].
pub const RESOURCES_TEMPLATE: &str = "resources";

/// One folder's worth of events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventGroup {
    /// The folder name: a year, or `future`.
    pub year: String,

    /// The rendered `event` sub-templates, newest first.
    pub events: String,

    /// The rendered `resources` sub-templates, newest first.
    pub resources: String,
}

/// Every past year, newest first, plus the resources of all of them together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PastEvents {
    pub years: Vec<EventGroup>,
    pub resources: String,
}

/// Builds the group for `events/future`.
pub fn future_events(site: &Site) -> Result<EventGroup> {
    let dir = Path::new(EVENTS_DIR);
    let entries = site.source.read_dir(dir)?;
    let entry = entries
        .iter()
        .find(|entry| entry.name == FUTURE_DIR)
        .ok_or(Error::MissingFuture)?;
    match event_group(site, dir, entry) {
        Ok(group) => Ok(group),
        Err(e) => Err(e.annotate("adding future events folder")),
    }
}

/// Builds a group for every folder in `events/past`, newest year first.
pub fn past_events(site: &Site) -> Result<PastEvents> {
    let dir = Path::new(EVENTS_DIR).join(PAST_DIR);
    let mut entries = site.source.read_dir(&dir)?;
    entries.reverse();

    let mut past = PastEvents::default();
    for entry in &entries {
        let group = event_group(site, &dir, entry)
            .map_err(|e| e.annotate(format!("adding events for year {}", entry.name)))?;
        past.resources.push_str(&group.resources);
        past.years.push(group);
    }
    Ok(past)
}

fn event_group(site: &Site, dir: &Path, entry: &Entry) -> Result<EventGroup> {
    if !entry.is_dir {
        return Err(Error::UnexpectedFile(dir.join(&entry.name)));
    }
    let root = dir.join(&entry.name);
    let mut files = site.source.read_dir(&root)?;
    files.reverse();

    let mut group = EventGroup {
        year: entry.name.clone(),
        ..EventGroup::default()
    };
    for file in &files {
        group
            .add_file(site, &root, file)
            .map_err(|e| e.annotate("adding file to event group"))?;
    }
    log::debug!(
        "event group `{}`: {} files from `{}`",
        group.year,
        files.len(),
        root.display()
    );
    Ok(group)
}

impl EventGroup {
    fn add_file(&mut self, site: &Site, dir: &Path, entry: &Entry) -> Result<()> {
        if entry.is_dir {
            return Err(Error::UnexpectedDirectory(dir.join(&entry.name)));
        }
        match FileKind::from_name(&entry.name) {
            FileKind::Html => self
                .add_event(site, &dir.join(&entry.name))
                .map_err(|e| e.annotate("adding event")),
            FileKind::Image => {
                let dest = Path::new("images").join(EVENTS_DIR).join(&self.year);
                site.copy_resource(dir, &entry.name, &dest, site.config.max_image_size)
                    .map_err(|e| Error::from(e).annotate("adding resource"))
            }
            FileKind::Document => {
                let dest = Path::new("resources").join(EVENTS_DIR).join(&self.year);
                site.copy_resource(dir, &entry.name, &dest, site.config.max_document_size)
                    .map_err(|e| Error::from(e).annotate("adding resource"))
            }
            FileKind::Unsupported(ext) => Err(Error::UnsupportedFileType {
                ext,
                name: entry.name.clone(),
            }),
        }
    }

    fn add_event(&mut self, site: &Site, src: &Path) -> Result<()> {
        let composer = site.composer();
        self.events
            .push_str(&composer.render_part(src, EVENT_TEMPLATE)?);
        self.resources
            .push_str(&composer.render_part(src, RESOURCES_TEMPLATE)?);
        Ok(())
    }
}

/// The result of a fallible event-aggregation operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error aggregating events.
#[derive(Debug)]
pub enum Error {
    /// Returned when `events/future` doesn't exist.
    MissingFuture,

    /// Returned when a file sits where a year folder is expected.
    UnexpectedFile(PathBuf),

    /// Returned when a directory sits inside a year folder.
    UnexpectedDirectory(PathBuf),

    /// Returned for files whose extension isn't on the allow-list.
    UnsupportedFileType { ext: String, name: String },

    /// Returned for errors rendering event sub-templates.
    Template(template::Error),

    /// Returned for errors copying resources or writing output.
    Write(write::Error),

    /// Returned for errors reading the resource tree.
    Source(source::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl Error {
    pub fn annotate<S: Into<String>>(self, annotation: S) -> Error {
        Error::Annotated(annotation.into(), Box::new(self))
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingFuture => write!(f, "future events directory not found"),
            Error::UnexpectedFile(path) => write!(f, "unexpected folder: `{}`", path.display()),
            Error::UnexpectedDirectory(path) => {
                write!(f, "unexpected directory: `{}`", path.display())
            }
            Error::UnsupportedFileType { ext, name } => {
                write!(f, "unsupported file type: {:?} ({})", ext, name)
            }
            Error::Template(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Source(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Source(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
            _ => None,
        }
    }
}

impl From<template::Error> for Error {
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

impl From<write::Error> for Error {
    fn from(err: write::Error) -> Error {
        Error::Write(err)
    }
}

impl From<source::Error> for Error {
    fn from(err: source::Error) -> Error {
        Error::Source(err)
    }
}
