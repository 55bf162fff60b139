//! Defines [`Site`], the context for one generation run, and the operations
//! that write into the destination: cleaning it, rendering pages through the
//! shared layout, and copying image directories.

use crate::config::SiteConfig;
use crate::output::Output;
use crate::resource;
use crate::source::{self, Source};
use crate::template::{self, Composer};
use crate::value::page_context;
use gtmpl::Value;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The context for one generation run. A `Site` is constructed once, passed
/// to every rendering call, and owns no state beyond what it writes through
/// its [`Output`].
pub struct Site<'a> {
    /// The root of the destination tree. Every output path is beneath it.
    pub dest: PathBuf,

    /// Settings for this run. `name` and `description` are available to
    /// templates as `.Site.Name` and `.Site.Description`.
    pub config: SiteConfig,

    /// The resource tree pages and resources are read from.
    pub source: &'a dyn Source,

    /// Where the rendered site is written.
    pub output: &'a dyn Output,
}

/// A named content unit rendered against the shared layout.
pub struct Page {
    /// The page title, available to templates as `.Page.Name`.
    pub name: String,

    /// Structured data for the page, available as `.Page.Data`.
    pub data: Value,
}

impl<'a> Site<'a> {
    pub fn new(
        config: SiteConfig,
        dest: &Path,
        source: &'a dyn Source,
        output: &'a dyn Output,
    ) -> Site<'a> {
        Site {
            dest: dest.to_owned(),
            config,
            source,
            output,
        }
    }

    /// Deletes the destination and recreates it empty.
    pub fn clean_dest(&self) -> Result<()> {
        self.output
            .remove_all(&self.dest)
            .map_err(|err| Error::Clean {
                path: self.dest.clone(),
                err,
            })?;
        self.mkdir(&self.dest)
    }

    /// Renders every configured top-level page and copies the configured
    /// image directories.
    pub fn add_main(&self) -> Result<()> {
        for page in &self.config.pages {
            self.add_page(&page.title, &page.dir, &page.file_name(), Value::Nil)
                .map_err(|e| e.annotate("writing page"))?;
        }
        for dir in &self.config.image_dirs {
            let src = Path::new(&dir.src).join("images");
            let dest = Path::new("images").join(&dir.dest);
            self.add_images(&src, &dest, self.config.max_image_size)
                .map_err(|e| e.annotate(format!("adding images from `{}`", src.display())))?;
        }
        Ok(())
    }

    /// Renders the fragment `{src_dir}/{file_name}` through the layout as a
    /// page titled `name` and writes it to `{dest}/{file_name}`.
    pub fn add_page(&self, name: &str, src_dir: &str, file_name: &str, data: Value) -> Result<()> {
        let page = Page {
            name: name.to_owned(),
            data,
        };
        match self.write_page(src_dir, file_name, &page) {
            Ok(()) => Ok(()),
            Err(e) => Err(e.annotate(format!("writing file `{}`", file_name))),
        }
    }

    fn write_page(&self, src_dir: &str, file_name: &str, page: &Page) -> Result<()> {
        let src = Path::new(src_dir).join(file_name);
        let rendered = self.composer().render(&src, page_context(self, page))?;

        self.mkdir(&self.dest)?;
        let dest = self.dest.join(file_name);
        self.output
            .write_file(&dest, rendered.as_bytes())
            .map_err(|err| Error::Io {
                path: dest.clone(),
                err,
            })?;
        log::debug!("wrote page `{}` ({})", dest.display(), page.name);
        Ok(())
    }

    /// Copies every file in `src_dir` to `{dest}/{dest_dir}`, enforcing
    /// `max_size`. The directory may not have subdirectories.
    pub fn add_images(&self, src_dir: &Path, dest_dir: &Path, max_size: usize) -> Result<()> {
        let entries = self.source.read_dir(src_dir)?;
        self.mkdir(&self.dest.join(dest_dir))?;
        for entry in entries {
            if entry.is_dir {
                return Err(Error::UnexpectedDirectory(src_dir.join(&entry.name)));
            }
            self.copy_resource(src_dir, &entry.name, dest_dir, max_size)?;
        }
        Ok(())
    }

    /// Copies `{src_dir}/{name}` to `{dest}/{dest_dir}/{name}`, enforcing
    /// `max_size`.
    pub fn copy_resource(
        &self,
        src_dir: &Path,
        name: &str,
        dest_dir: &Path,
        max_size: usize,
    ) -> Result<()> {
        resource::copy(
            self.source,
            self.output,
            src_dir,
            name,
            &self.dest.join(dest_dir),
            max_size,
        )?;
        Ok(())
    }

    pub fn composer(&self) -> Composer<'a> {
        Composer::new(self.source)
    }

    fn mkdir(&self, path: &Path) -> Result<()> {
        self.output.mkdir_all(path).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })
    }
}

/// The result of a fallible site-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing part of the site.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while cleaning the destination.
    Clean { path: PathBuf, err: io::Error },

    /// Returned when an image directory contains a directory.
    UnexpectedDirectory(PathBuf),

    /// Returned for errors during templating.
    Template(template::Error),

    /// Returned for errors copying resources, including oversized files.
    Resource(resource::Error),

    /// Returned for errors reading the resource tree.
    Source(source::Error),

    /// Returned for I/O errors writing output files.
    Io { path: PathBuf, err: io::Error },

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
            Error::Clean { path, err } => {
                write!(f, "removing old version of site `{}`: {}", path.display(), err)
            }
            Error::UnexpectedDirectory(path) => {
                write!(f, "unexpected directory for images: `{}`", path.display())
            }
            Error::Template(err) => err.fmt(f),
            Error::Resource(err) => err.fmt(f),
            Error::Source(err) => err.fmt(f),
            Error::Io { path, err } => write!(f, "writing `{}`: {}", path.display(), err),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Clean { path: _, err } => Some(err),
            Error::UnexpectedDirectory(_) => None,
            Error::Template(err) => Some(err),
            Error::Resource(err) => Some(err),
            Error::Source(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
            Error::Annotated(_, err) => Some(err),
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

impl From<resource::Error> for Error {
    fn from(err: resource::Error) -> Error {
        Error::Resource(err)
    }
}

impl From<source::Error> for Error {
    fn from(err: source::Error) -> Error {
        Error::Source(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::output::MemoryOutput;
    use crate::test_helpers::layout;

    fn site<'a>(source: &'a dyn Source, output: &'a dyn Output) -> Site<'a> {
        Site::new(SiteConfig::default(), Path::new("site"), source, output)
    }

    #[test]
    fn test_add_page_is_written_flat() -> Result<()> {
        let source = layout().with_file(
            "about/volunteers.html",
            "{{define \"content\"}}<p>Help {{.Site.Description}}</p>{{end}}",
        );
        let output = MemoryOutput::new();
        site(&source, &output).add_page("Volunteers", "about", "volunteers.html", Value::Nil)?;

        let page = String::from_utf8(output.file("site/volunteers.html").unwrap()).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Enl!ghten | Volunteers</title>"));
        assert!(page.contains("<p>Help Kitsap Community Forum</p>"));
        assert!(page.ends_with("</html>"));
        Ok(())
    }

    #[test]
    fn test_add_page_names_the_file() {
        let source = layout();
        let output = MemoryOutput::new();
        let err = site(&source, &output)
            .add_page("Calendar", "events", "calendar.html", Value::Nil)
            .unwrap_err();
        assert!(err.to_string().starts_with("writing file `calendar.html`: "));
    }

    #[test]
    fn test_add_images() -> Result<()> {
        let source = layout()
            .with_file("about/images/alice.jpg", vec![1; 10])
            .with_file("about/images/bob.png", vec![2; 10]);
        let output = MemoryOutput::new();
        site(&source, &output).add_images(Path::new("about/images"), Path::new("images/board"), 10)?;
        assert_eq!(Some(vec![1; 10]), output.file("site/images/board/alice.jpg"));
        assert_eq!(Some(vec![2; 10]), output.file("site/images/board/bob.png"));
        Ok(())
    }

    #[test]
    fn test_add_images_copies_any_extension() -> Result<()> {
        let source = layout()
            .with_file("images/favicon.ico", vec![3; 10])
            .with_file("images/logo.svg", "<svg/>");
        let output = MemoryOutput::new();
        site(&source, &output).add_images(Path::new("images"), Path::new("images"), 10)?;
        assert_eq!(Some(vec![3; 10]), output.file("site/images/favicon.ico"));
        assert_eq!(Some(b"<svg/>".to_vec()), output.file("site/images/logo.svg"));
        Ok(())
    }

    #[test]
    fn test_add_images_rejects_directories() {
        let output = MemoryOutput::new();
        let source = layout().with_file("images/nested/a.png", "hi");
        let err = site(&source, &output)
            .add_images(Path::new("images"), Path::new("images"), 10)
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedDirectory(_)));
    }

    #[test]
    fn test_add_images_too_large() {
        let source = layout().with_file("images/big.png", vec![0; 11]);
        let output = MemoryOutput::new();
        let err = site(&source, &output)
            .add_images(Path::new("images"), Path::new("images"), 10)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Resource(resource::Error::TooLarge { .. })
        ));
        assert_eq!(None, output.file("site/images/big.png"));
    }

    #[test]
    fn test_clean_dest() -> Result<()> {
        let source = layout();
        let output = MemoryOutput::new();
        output.mkdir_all(Path::new("site/old")).unwrap();
        output.write_file(Path::new("site/old/stale.html"), b"x").unwrap();

        site(&source, &output).clean_dest()?;
        assert!(output.files().is_empty());
        assert!(output.is_dir("site"));
        Ok(())
    }
}
