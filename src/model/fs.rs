//! File-system probing used by item-spec modifiers, disk-checking
//! transforms, a few property functions, and wildcard itemization.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};
use globset::GlobBuilder;
use walkdir::WalkDir;

use super::paths;

/// Timestamps of a file, in local time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileTimes {
    pub modified: Option<NaiveDateTime>,
    pub created: Option<NaiveDateTime>,
    pub accessed: Option<NaiveDateTime>,
}

/// The file system as seen by the expander.
///
/// Paths passed in are already unescaped.
pub trait FileSystem: Send + Sync {
    /// File or directory exists.
    fn exists(&self, path: &Path) -> bool {
        self.file_exists(path) || self.directory_exists(path)
    }

    fn file_exists(&self, path: &Path) -> bool;

    fn directory_exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Timestamps of an existing file; `Ok(None)` when it does not exist.
    fn file_times(&self, path: &Path) -> io::Result<Option<FileTimes>>;

    fn current_directory(&self) -> io::Result<PathBuf>;

    /// Expand a wildcard pattern (`*`, `?`, `**`) relative to `base`.
    ///
    /// Results keep the pattern's leading fixed directory as written and are
    /// sorted.
    fn expand_wildcards(&self, base: &Path, pattern: &str) -> io::Result<Vec<String>>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

static STD_FILE_SYSTEM: StdFileSystem = StdFileSystem;

/// The process file system.
pub fn std_file_system() -> &'static StdFileSystem {
    &STD_FILE_SYSTEM
}

fn to_local(time: io::Result<SystemTime>) -> Option<NaiveDateTime> {
    time.ok().map(|t| DateTime::<Local>::from(t).naive_local())
}

impl FileSystem for StdFileSystem {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn file_times(&self, path: &Path) -> io::Result<Option<FileTimes>> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => Ok(Some(FileTimes {
                modified: to_local(meta.modified()),
                created: to_local(meta.created()),
                accessed: to_local(meta.accessed()),
            })),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn current_directory(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn expand_wildcards(&self, base: &Path, pattern: &str) -> io::Result<Vec<String>> {
        let split = WildcardPattern::split(pattern);
        let root = if paths::is_rooted(split.fixed) {
            PathBuf::from(paths::fix_separators(split.fixed))
        } else {
            base.join(paths::fix_separators(split.fixed))
        };
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let matcher = GlobBuilder::new(&split.wildcard.replace('\\', "/"))
            .literal_separator(true)
            .case_insensitive(cfg!(windows))
            .build()
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?
            .compile_matcher();

        let mut matches = Vec::new();
        for entry in WalkDir::new(&root).follow_links(true) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            if matcher.is_match(&relative) {
                matches.push(format!("{}{}", split.fixed, paths::fix_separators(&relative)));
            }
        }
        matches.sort();
        Ok(matches)
    }
}

/// A wildcard include split into its fixed directory prefix and the part
/// containing wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WildcardPattern<'a> {
    /// Leading directories without wildcards, including the trailing
    /// separator (or empty).
    pub fixed: &'a str,
    pub wildcard: &'a str,
}

impl<'a> WildcardPattern<'a> {
    pub fn split(pattern: &'a str) -> Self {
        let first_wildcard = pattern.find(['*', '?']).unwrap_or(pattern.len());
        let fixed_end = pattern[..first_wildcard]
            .rfind(paths::is_separator)
            .map_or(0, |p| p + 1);
        Self {
            fixed: &pattern[..fixed_end],
            wildcard: &pattern[fixed_end..],
        }
    }

    /// The directory part of `file` below the fixed prefix, with a trailing
    /// separator: what `**` matched.
    pub fn recursive_part(&self, file: &str) -> String {
        let dir = paths::directory_with_separator(file);
        let fixed = paths::fix_separators(self.fixed);
        let dir = paths::fix_separators(dir);
        if dir
            .get(..fixed.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&fixed))
        {
            dir[fixed.len()..].to_string()
        } else {
            String::new()
        }
    }
}

impl fmt::Display for WildcardPattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.fixed, self.wildcard)
    }
}
