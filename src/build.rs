//! Exports the [`build_site`] function which stitches together the high-level
//! steps of generating the site: cleaning the destination, rendering the
//! top-level pages and copying their images ([`crate::write`]), and rendering
//! the future and past event pages ([`crate::event`]).
//!
//! Any failure aborts the whole run. There is no partial-success mode: a run
//! that returns an error has not produced a valid site.

use crate::config::{self, SiteConfig};
use crate::event::{self, future_events, past_events};
use crate::output::{DiskOutput, Output};
use crate::source::{DiskSource, Source};
use crate::write::{self, Site};
use gtmpl::Value;
use std::fmt;
use std::path::Path;

/// The page listing upcoming events.
pub const FUTURE_EVENTS_PAGE: &str = "future-events.html";

/// The page listing past events by year.
pub const PAST_EVENTS_PAGE: &str = "past-events.html";

/// The page collecting the resources of every past event.
pub const RESOURCES_PAGE: &str = "videos-and-resources.html";

/// The pages built from `events/` rather than listed in the configuration.
pub const EVENT_PAGES: &[&str] = &[FUTURE_EVENTS_PAGE, PAST_EVENTS_PAGE, RESOURCES_PAGE];

/// Generates the site from the resource tree at `src` into `dest` on disk.
/// `dest` is deleted and recreated first.
pub fn generate(src: &Path, dest: &Path) -> Result<()> {
    let source = DiskSource::new(src);
    build(&source, &DiskOutput, dest)
}

/// Loads the site configuration from `source` and builds the site into
/// `dest` through `output`.
pub fn build(source: &dyn Source, output: &dyn Output, dest: &Path) -> Result<()> {
    let config = SiteConfig::from_source(source)?;
    let site = Site::new(config, dest, source, output);
    build_site(&site)?;
    log::info!(
        "generated {} ({} pages) into `{}`",
        site.config.name,
        site.config.pages.len() + EVENT_PAGES.len(),
        dest.display()
    );
    Ok(())
}

/// Builds the site described by `site`.
pub fn build_site(site: &Site) -> Result<()> {
    site.clean_dest()
        .map_err(|e| Error::from(e).annotate("cleaning destination directory"))?;
    site.add_main()
        .map_err(|e| Error::from(e).annotate("main site pages"))?;
    add_events(site).map_err(|e| e.annotate("event pages"))?;
    Ok(())
}

fn add_events(site: &Site) -> Result<()> {
    add_future_events(site).map_err(|e| e.annotate("adding future events"))?;
    add_past_events(site).map_err(|e| e.annotate("adding past events"))?;
    Ok(())
}

fn add_future_events(site: &Site) -> Result<()> {
    let group = future_events(site)?;
    site.add_page(
        "Upcoming Speakers",
        event::EVENTS_DIR,
        FUTURE_EVENTS_PAGE,
        Value::from(&group),
    )
    .map_err(|e| Error::from(e).annotate("adding future events page"))
}

fn add_past_events(site: &Site) -> Result<()> {
    let past = past_events(site)?;
    site.add_page(
        "Past Events",
        event::EVENTS_DIR,
        PAST_EVENTS_PAGE,
        Value::from(&past),
    )
    .map_err(|e| Error::from(e).annotate("adding past events page"))?;
    site.add_page(
        "Videos & Resources",
        event::EVENTS_DIR,
        RESOURCES_PAGE,
        Value::from(&past),
    )
    .map_err(|e| Error::from(e).annotate("adding past events resources"))
}

/// The result of building the site.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can come from loading
/// configuration, writing pages and images, or aggregating events.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading `site.yaml`.
    Config(config::Error),

    /// Returned for errors writing pages and images.
    Write(write::Error),

    /// Returned for errors aggregating events.
    Event(event::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl Error {
    pub fn annotate<S: Into<String>>(self, annotation: S) -> Error {
        Error::Annotated(annotation.into(), Box::new(self))
    }
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Config(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Event(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Event(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<config::Error> for Error {
    /// Converts [`config::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: config::Error) -> Error {
        Error::Config(err)
    }
}

impl From<write::Error> for Error {
    /// Converts [`write::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: write::Error) -> Error {
        Error::Write(err)
    }
}

impl From<event::Error> for Error {
    /// Converts [`event::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: event::Error) -> Error {
        Error::Event(err)
    }
}
