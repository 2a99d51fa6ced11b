//! Filesystem abstractions used for tree discovery.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Kind of a directory entry as seen by the tree builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Dir,
    /// Anything else (symlinks, sockets, devices). Never traversed.
    Other,
}

/// A single entry returned by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// What the entry is.
    pub kind: EntryKind,
}

impl DirEntry {
    /// Create a new entry.
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Filesystem access used by the tree builder; mocked in tests.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// Whether the path is a directory.
    fn is_dir(&self, path: &Path) -> bool;
    /// List the immediate entries of a directory, in listing order.
    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>>;
    /// Read a file into a string.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// Filesystem backed by `std::fs`. Symlinks are reported as `EntryKind::Other`.
#[derive(Debug, Default, Clone)]
pub struct StdFileSystem;

impl StdFileSystem {
    /// Create a new standard filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            // file_type() does not follow symlinks
            let file_type = entry.file_type()?;
            let kind = if file_type.is_dir() {
                EntryKind::Dir
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            entries.push(DirEntry::new(entry.path(), kind));
        }
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{EntryKind, StdFileSystem};
    use crate::fs::FileSystem;
    use std::path::PathBuf;

    #[test]
    fn std_filesystem_lists_and_reads_entries() {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(root.join("nested")).expect("create temp dir");
        let file_path = root.join("hello.rs");
        std::fs::write(&file_path, "fn hello() {}").expect("write test file");

        let fs = StdFileSystem::new();
        let mut entries = fs.read_dir(&root).expect("read dir");
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, file_path);
        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[1].kind, EntryKind::Dir);
        assert!(fs.is_dir(&root));
        assert!(!fs.is_dir(&file_path));

        let contents = fs.read_to_string(&file_path).expect("read file");
        assert_eq!(contents, "fn hello() {}");

        std::fs::remove_dir_all(&root).expect("cleanup temp dir");
    }

    #[test]
    fn std_filesystem_errors_on_missing_dir() {
        let fs = StdFileSystem::new();
        let missing = std::env::temp_dir().join(unique_dir_name());
        assert!(fs.read_dir(&missing).is_err());
    }

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        PathBuf::from(format!("qualitree_core_fs_test_{nanos}"))
    }
}
