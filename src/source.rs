//! Defines the [`Source`] trait, a read-only view of the resource tree that
//! page fragments, layout templates, images and event documents are read
//! from. [`DiskSource`] reads a directory on disk; [`MemorySource`] holds the
//! tree in memory so the generator can be exercised without touching the
//! filesystem.
//!
//! All paths handed to a [`Source`] are relative to the root of the tree
//! (e.g., `events/past/2023`). Directory listings are always sorted by file
//! name.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A single item in a [`Source`] directory listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// The file name of the item (no directory components).
    pub name: String,

    /// Whether the item is itself a directory.
    pub is_dir: bool,
}

impl Entry {
    pub fn file(name: &str) -> Entry {
        Entry {
            name: name.to_owned(),
            is_dir: false,
        }
    }

    pub fn dir(name: &str) -> Entry {
        Entry {
            name: name.to_owned(),
            is_dir: true,
        }
    }
}

/// Read-only access to the resource tree.
pub trait Source {
    /// Lists the entries of `dir`, sorted by file name.
    fn read_dir(&self, dir: &Path) -> Result<Vec<Entry>>;

    /// Reads the full contents of the file at `path`.
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Returns whether a file exists at `path`.
    fn is_file(&self, path: &Path) -> bool;

    /// Reads the file at `path` as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String> {
        String::from_utf8(self.read_file(path)?)
            .map_err(|_| Error::InvalidUtf8(path.to_owned()))
    }
}

/// A [`Source`] rooted at a directory on disk.
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> DiskSource {
        DiskSource { root: root.into() }
    }
}

impl Source for DiskSource {
    fn read_dir(&self, dir: &Path) -> Result<Vec<Entry>> {
        let abs = self.root.join(dir);
        if !abs.exists() {
            return Err(Error::NotFound(dir.to_owned()));
        }
        if !abs.is_dir() {
            return Err(Error::NotADirectory(dir.to_owned()));
        }

        let mut entries = Vec::new();
        for result in WalkDir::new(&abs)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = result?;
            let name = entry
                .file_name()
                .to_str()
                .ok_or_else(|| Error::InvalidFileName(entry.path().to_owned()))?;
            entries.push(Entry {
                name: name.to_owned(),
                is_dir: entry.file_type().is_dir(),
            });
        }
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(self.root.join(path)).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })
    }

    fn is_file(&self, path: &Path) -> bool {
        self.root.join(path).is_file()
    }
}

/// An in-memory [`Source`]. Directories are implied by the paths of the files
/// it holds.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> MemorySource {
        MemorySource::default()
    }

    /// Adds a file, replacing any previous contents at `path`.
    pub fn with_file<P: Into<PathBuf>, B: Into<Vec<u8>>>(mut self, path: P, contents: B) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert<P: Into<PathBuf>, B: Into<Vec<u8>>>(&mut self, path: P, contents: B) {
        self.files.insert(path.into(), contents.into());
    }
}

impl Source for MemorySource {
    fn read_dir(&self, dir: &Path) -> Result<Vec<Entry>> {
        if self.files.contains_key(dir) {
            return Err(Error::NotADirectory(dir.to_owned()));
        }

        // keyed by name so the listing comes out sorted and deduplicated
        let mut children: BTreeMap<String, bool> = BTreeMap::new();
        for path in self.files.keys() {
            let rest = match path.strip_prefix(dir) {
                Ok(rest) => rest,
                Err(_) => continue,
            };
            let mut components = rest.components();
            let first = match components.next() {
                Some(first) => first,
                None => continue,
            };
            let name = first
                .as_os_str()
                .to_str()
                .ok_or_else(|| Error::InvalidFileName(path.clone()))?;
            let is_dir = components.next().is_some();
            *children.entry(name.to_owned()).or_insert(false) |= is_dir;
        }

        if children.is_empty() && dir != Path::new("") {
            return Err(Error::NotFound(dir.to_owned()));
        }
        Ok(children
            .into_iter()
            .map(|(name, is_dir)| Entry { name, is_dir })
            .collect())
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_owned()))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// The result of a fallible [`Source`] operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading from a [`Source`].
#[derive(Debug)]
pub enum Error {
    /// Returned when no file or directory exists at the path.
    NotFound(PathBuf),

    /// Returned when a directory listing is requested for a file.
    NotADirectory(PathBuf),

    /// Returned when a file name isn't valid UTF-8.
    InvalidFileName(PathBuf),

    /// Returned when a text file isn't valid UTF-8.
    InvalidUtf8(PathBuf),

    /// Returned for I/O errors reading a file.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(path) => write!(f, "`{}` not found", path.display()),
            Error::NotADirectory(path) => {
                write!(f, "`{}` is not a directory", path.display())
            }
            Error::InvalidFileName(path) => write!(f, "invalid file name: {:?}", path),
            Error::InvalidUtf8(path) => {
                write!(f, "`{}` is not valid UTF-8", path.display())
            }
            Error::Io { path, err } => write!(f, "reading `{}`: {}", path.display(), err),
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
            _ => None,
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while listing directories.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tree() -> MemorySource {
        MemorySource::new()
            .with_file("main.html", "<html></html>")
            .with_file("events/past/2023/b.html", "b")
            .with_file("events/past/2023/a.html", "a")
            .with_file("events/past/2021/x.pdf", "x")
            .with_file("events/future/talk.html", "t")
    }

    #[test]
    fn test_memory_read_dir_sorted() -> Result<()> {
        let entries = tree().read_dir(Path::new("events/past"))?;
        assert_eq!(vec![Entry::dir("2021"), Entry::dir("2023")], entries);

        let entries = tree().read_dir(Path::new("events/past/2023"))?;
        assert_eq!(vec![Entry::file("a.html"), Entry::file("b.html")], entries);
        Ok(())
    }

    #[test]
    fn test_memory_read_dir_root() -> Result<()> {
        let entries = tree().read_dir(Path::new(""))?;
        assert_eq!(vec![Entry::dir("events"), Entry::file("main.html")], entries);
        Ok(())
    }

    #[test]
    fn test_memory_read_dir_errors() {
        assert!(matches!(
            tree().read_dir(Path::new("nope")),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            tree().read_dir(Path::new("main.html")),
            Err(Error::NotADirectory(_))
        ));
    }

    #[test]
    fn test_memory_read_file() -> Result<()> {
        let source = tree();
        assert_eq!(b"a".to_vec(), source.read_file(Path::new("events/past/2023/a.html"))?);
        assert!(source.is_file(Path::new("main.html")));
        assert!(!source.is_file(Path::new("events")));
        assert!(matches!(
            source.read_file(Path::new("missing.html")),
            Err(Error::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_disk_source() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("events/past/2022"))?;
        std::fs::write(dir.path().join("events/b.html"), "b")?;
        std::fs::write(dir.path().join("events/a.html"), "a")?;

        let source = DiskSource::new(dir.path());
        let entries = source.read_dir(Path::new("events"))?;
        assert_eq!(
            vec![Entry::file("a.html"), Entry::file("b.html"), Entry::dir("past")],
            entries
        );
        assert_eq!("b", source.read_to_string(Path::new("events/b.html"))?);
        assert!(matches!(
            source.read_dir(Path::new("events/a.html")),
            Err(Error::NotADirectory(_))
        ));
        assert!(matches!(
            source.read_dir(Path::new("missing")),
            Err(Error::NotFound(_))
        ));
        Ok(())
    }
}
