//! Resource files: images and documents that are copied verbatim from the
//! resource tree into the destination rather than templated. Defines the
//! [`FileKind`] dispatch on file extension and the size policy applied while
//! copying.

use crate::output::Output;
use crate::source::{self, Source};
use std::fmt;
use std::path::{Path, PathBuf};

pub const KILOBYTE: usize = 1_000;
pub const MEGABYTE: usize = 1_000 * KILOBYTE;

/// The default cap on copied images.
pub const MAX_IMAGE_SIZE: usize = 50 * KILOBYTE;

/// The default cap on copied documents.
pub const MAX_DOCUMENT_SIZE: usize = 10 * MEGABYTE;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &["docx", "pdf", "ppt", "pptx", "xlsx"];

/// What to do with a file in the resource tree, decided by its extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// A template fragment.
    Html,

    /// An image, copied subject to the image cap.
    Image,

    /// A document, copied subject to the document cap.
    Document,

    /// Anything else. Carries the extension (empty if there is none).
    Unsupported(String),
}

impl FileKind {
    pub fn from_name(name: &str) -> FileKind {
        let ext = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        match ext {
            "html" => FileKind::Html,
            ext if IMAGE_EXTENSIONS.contains(&ext) => FileKind::Image,
            ext if DOCUMENT_EXTENSIONS.contains(&ext) => FileKind::Document,
            ext => FileKind::Unsupported(ext.to_owned()),
        }
    }
}

/// Fails if `data` is larger than `max_size` bytes. A `max_size` of zero
/// means there is no limit.
pub fn check_size(name: &str, data: &[u8], max_size: usize) -> Result<()> {
    if max_size > 0 && data.len() > max_size {
        return Err(Error::TooLarge {
            name: name.to_owned(),
            size: data.len(),
            max_size,
        });
    }
    Ok(())
}

/// Copies `{src_dir}/{name}` from `source` to `{dest_dir}/{name}` in `output`,
/// creating `dest_dir` as needed. Nothing is written if the file exceeds
/// `max_size`.
pub fn copy(
    source: &dyn Source,
    output: &dyn Output,
    src_dir: &Path,
    name: &str,
    dest_dir: &Path,
    max_size: usize,
) -> Result<()> {
    let data = source.read_file(&src_dir.join(name))?;
    check_size(name, &data, max_size)?;

    output.mkdir_all(dest_dir).map_err(|err| Error::Io {
        path: dest_dir.to_owned(),
        err,
    })?;
    let dest = dest_dir.join(name);
    output.write_file(&dest, &data).map_err(|err| Error::Io {
        path: dest.clone(),
        err,
    })?;
    log::debug!("copied `{}` ({} bytes)", dest.display(), data.len());
    Ok(())
}

/// The result of copying a resource.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error copying a resource.
#[derive(Debug)]
pub enum Error {
    /// Returned when a resource exceeds its size cap.
    TooLarge {
        name: String,
        size: usize,
        max_size: usize,
    },

    /// Returned when the resource can't be read.
    Source(source::Error),

    /// Returned for I/O errors writing the copy.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TooLarge {
                name,
                size,
                max_size,
            } => write!(
                f,
                "{:?} is {} bytes, larger than {} bytes",
                name, size, max_size
            ),
            Error::Source(err) => err.fmt(f),
            Error::Io { path, err } => write!(f, "writing `{}`: {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::TooLarge { .. } => None,
            Error::Source(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
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
    use crate::source::MemorySource;

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::Html, FileKind::from_name("talk.html"));
        assert_eq!(FileKind::Image, FileKind::from_name("speaker.jpg"));
        assert_eq!(FileKind::Image, FileKind::from_name("map.png"));
        assert_eq!(FileKind::Document, FileKind::from_name("slides.pptx"));
        assert_eq!(FileKind::Document, FileKind::from_name("notes.pdf"));
        assert_eq!(
            FileKind::Unsupported(String::from("txt")),
            FileKind::from_name("notes.txt")
        );
        assert_eq!(
            FileKind::Unsupported(String::new()),
            FileKind::from_name("README")
        );
        // extensions are matched exactly
        assert_eq!(
            FileKind::Unsupported(String::from("JPG")),
            FileKind::from_name("shout.JPG")
        );
    }

    #[test]
    fn test_check_size() {
        assert!(check_size("a.jpg", &[0; 10], 10).is_ok());
        assert!(check_size("a.jpg", &[0; 11], 0).is_ok());
        match check_size("a.jpg", &[0; 11], 10) {
            Err(Error::TooLarge {
                name,
                size,
                max_size,
            }) => {
                assert_eq!("a.jpg", name);
                assert_eq!(11, size);
                assert_eq!(10, max_size);
            }
            other => panic!("wanted TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_copy() -> Result<()> {
        let source = MemorySource::new().with_file("images/logo.png", vec![1, 2, 3]);
        let output = MemoryOutput::new();
        copy(
            &source,
            &output,
            Path::new("images"),
            "logo.png",
            Path::new("site/images"),
            MAX_IMAGE_SIZE,
        )?;
        assert_eq!(Some(vec![1, 2, 3]), output.file("site/images/logo.png"));
        Ok(())
    }

    #[test]
    fn test_copy_too_large_writes_nothing() {
        let source = MemorySource::new().with_file("images/big.jpg", vec![0; 51]);
        let output = MemoryOutput::new();
        let err = copy(
            &source,
            &output,
            Path::new("images"),
            "big.jpg",
            Path::new("site/images"),
            50,
        )
        .unwrap_err();
        assert!(matches!(err, Error::TooLarge { .. }));
        assert!(output.files().is_empty());
    }
}
