//! Fixtures shared by the unit tests: the bundled resource tree, loaded into
//! a [`MemorySource`].

use crate::source::MemorySource;
use std::path::Path;
use walkdir::WalkDir;

const RESOURCES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/resources");

/// The whole bundled resource tree.
pub fn site_source() -> MemorySource {
    let root = Path::new(RESOURCES);
    let mut source = MemorySource::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.unwrap();
        if entry.file_type().is_file() {
            let relative = entry.path().strip_prefix(root).unwrap();
            source.insert(relative, std::fs::read(entry.path()).unwrap());
        }
    }
    source
}

/// Only the shared layout: `main.html` and its partials.
pub fn layout() -> MemorySource {
    let mut source = MemorySource::new();
    for name in &["main.html", "index.css", "nav.html", "nav.css"] {
        source.insert(*name, std::fs::read(Path::new(RESOURCES).join(name)).unwrap());
    }
    source
}
