//! Source locations of expressions.

use std::fmt;
use std::path::{Path, PathBuf};

use super::position::Position;

/// The build file and position an expression was read from.
///
/// Besides diagnostics, the file is what the reserved `MSBuildThisFile*`
/// pseudo-properties are computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ElementLocation {
    file: Option<PathBuf>,
    position: Position,
}

impl ElementLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: Some(file.into()),
            position: Position::new(line, column),
        }
    }

    /// A location for a file without line information.
    pub fn in_file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
            position: Position::default(),
        }
    }

    /// A location for an expression that does not come from a file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Directory containing the file, if the location has one.
    pub fn directory(&self) -> Option<&Path> {
        self.file
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}

impl fmt::Display for ElementLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.position.is_unknown()) {
            (Some(file), true) => write!(f, "{}", file.display()),
            (Some(file), false) => write!(f, "{} {}", file.display(), self.position),
            (None, true) => f.write_str("<memory>"),
            (None, false) => write!(f, "<memory> {}", self.position),
        }
    }
}
