//! The library code for the Enl!ghten community forum website. It has two
//! halves:
//!
//! 1. Generating the static site from a resource tree ([`crate::build`])
//! 2. Serving the generated directory over HTTP ([`crate::server`])
//!
//! Of the two, the first is the more involved. Every page is an HTML fragment
//! rendered inside the shared `main.html` layout ([`crate::template`]). The
//! top-level pages are listed in `site.yaml` ([`crate::config`]) and written
//! by [`crate::write`], which also copies their images. The event pages are
//! aggregated from one file per event by [`crate::event`]: upcoming events
//! from a flat directory, past events from one directory per year, newest
//! first.
//!
//! Reads go through [`crate::source::Source`] and writes through
//! [`crate::output::Output`], so the whole build can run in memory.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod event;
pub mod output;
pub mod resource;
pub mod server;
pub mod source;
pub mod template;
pub mod value;
pub mod write;

#[cfg(test)]
mod test_helpers;
