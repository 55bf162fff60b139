//! Defines the [`Output`] trait through which the generator removes, creates
//! and writes into the destination tree, along with the [`DiskOutput`] used by
//! the `site-gen` binary and the [`MemoryOutput`] used in tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

/// Write access to the destination tree.
pub trait Output {
    /// Removes `path` and everything beneath it. A missing `path` is not an
    /// error.
    fn remove_all(&self, path: &Path) -> io::Result<()>;

    /// Creates `path` and any missing parent directories.
    fn mkdir_all(&self, path: &Path) -> io::Result<()>;

    /// Writes `data` to the file at `path`, replacing any previous contents.
    /// The parent directory must already exist.
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;
}

/// An [`Output`] backed by the real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskOutput;

impl Output for DiskOutput {
    fn remove_all(&self, path: &Path) -> io::Result<()> {
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn mkdir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        std::fs::write(path, data)
    }
}

/// An in-memory [`Output`]. It tracks directories as well as files so that
/// writes into directories that were never created fail the same way they
/// would on disk.
#[derive(Debug, Default)]
pub struct MemoryOutput {
    dirs: RefCell<BTreeSet<PathBuf>>,
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryOutput {
    pub fn new() -> MemoryOutput {
        MemoryOutput::default()
    }

    /// Returns a snapshot of every file written so far.
    pub fn files(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        self.files.borrow().clone()
    }

    /// Returns the contents of the file at `path`, if any.
    pub fn file<P: AsRef<Path>>(&self, path: P) -> Option<Vec<u8>> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    pub fn is_dir<P: AsRef<Path>>(&self, path: P) -> bool {
        self.dirs.borrow().contains(path.as_ref())
    }
}

impl Output for MemoryOutput {
    fn remove_all(&self, path: &Path) -> io::Result<()> {
        self.dirs.borrow_mut().retain(|dir| !dir.starts_with(path));
        self.files.borrow_mut().retain(|file, _| !file.starts_with(path));
        Ok(())
    }

    fn mkdir_all(&self, path: &Path) -> io::Result<()> {
        if self.files.borrow().contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("`{}` is a file", path.display()),
            ));
        }
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.ancestors() {
            if ancestor != Path::new("") {
                dirs.insert(ancestor.to_owned());
            }
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        match path.parent() {
            Some(parent) if parent != Path::new("") && !self.is_dir(parent) => {
                Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("directory `{}` does not exist", parent.display()),
                ))
            }
            _ => {
                self.files
                    .borrow_mut()
                    .insert(path.to_owned(), data.to_owned());
                Ok(())
            }
        }
    }
}
