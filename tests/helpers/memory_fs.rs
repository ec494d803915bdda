//! A file system held in memory.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use buildexpr::FileSystem;
use buildexpr::model::FileTimes;

/// Files and directories registered by absolute path.
///
/// Every registered file also registers its ancestor directories.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    cwd: PathBuf,
    files: BTreeSet<PathBuf>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFileSystem {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            self.directories.insert(dir.to_path_buf());
            parent = dir.parent();
        }
        self.files.insert(path);
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn directory_exists(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} has no contents", path.display()),
        ))
    }

    fn file_times(&self, _path: &Path) -> io::Result<Option<FileTimes>> {
        Ok(None)
    }

    fn current_directory(&self) -> io::Result<PathBuf> {
        Ok(self.cwd.clone())
    }

    fn expand_wildcards(&self, _base: &Path, pattern: &str) -> io::Result<Vec<String>> {
        Ok(vec![pattern.to_string()])
    }
}
