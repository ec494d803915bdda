//! Error types for expansion.
//!
//! Every failure is fatal to the single expansion call that raised it.
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Expression syntax (item vectors, metadata, property bodies)
//! - E02xx: Property functions
//! - E03xx: Item transforms
//! - E04xx: File system probes

use std::fmt;

use thiserror::Error;

use super::location::ElementLocation;

/// Categorised error codes for expansion failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed `@()`, `%()` or `$()` construct
    InvalidExpression,
    /// An item list reference concatenated with other text where a list is required
    ItemVectorConcatenation,
    /// Property function failed to parse or threw while running
    InvalidFunction,
    /// No member with that name/arity accepts the arguments
    UnknownFunction,
    /// Static type or method not available for execution
    DisallowedFunction,
    /// Wrong arguments for a built-in item transform
    InvalidTransform,
    /// I/O failure while probing the disk
    FileSystem,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidExpression => "E0101",
            Self::ItemVectorConcatenation => "E0102",
            Self::InvalidFunction => "E0201",
            Self::UnknownFunction => "E0202",
            Self::DisallowedFunction => "E0203",
            Self::InvalidTransform => "E0301",
            Self::FileSystem => "E0401",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while expanding an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpandError {
    /// Malformed expression (unbalanced parens/quotes, invalid names).
    #[error("invalid expression \"{expression}\": {message}")]
    InvalidExpression { expression: String, message: String },

    /// `@(...)` used where only a single, exclusive item list is allowed.
    #[error(
        "item list expression \"{expression}\" cannot be combined with other text when it must be split into items"
    )]
    ItemVectorConcatenation { expression: String },

    /// Invalid property function expression.
    ///
    /// `expression` is the unexpanded `$(...)` text, which is also what is
    /// substituted when the caller asks to leave properties unexpanded on error.
    #[error("invalid property function \"{expression}\": {message}")]
    InvalidFunction { expression: String, message: String },

    /// No member on the receiver matches the name and arguments.
    #[error("cannot find member \"{member}\" on \"{receiver}\" in \"{expression}\"")]
    UnknownFunction {
        receiver: String,
        member: String,
        expression: String,
    },

    /// Static type or method not allowed (or not resolvable).
    #[error("\"[{type_name}]::{member}\" is not available in \"{expression}\": {reason}")]
    DisallowedFunction {
        type_name: String,
        member: String,
        expression: String,
        reason: String,
    },

    /// Wrong use of a built-in item transform.
    #[error("invalid use of item function \"{function}\" in \"{expression}\": {message}")]
    InvalidTransform {
        function: String,
        expression: String,
        message: String,
    },

    /// I/O failure while probing the disk.
    #[error("file system error for \"{path}\": {message}")]
    FileSystem { path: String, message: String },

    /// Any of the above, tagged with the element it came from.
    #[error("{location}: {source}")]
    Located {
        location: ElementLocation,
        #[source]
        source: Box<ExpandError>,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExpandError>;

impl ExpandError {
    /// Create an invalid expression error.
    pub fn invalid_expression(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Create an invalid property function error.
    pub fn invalid_function(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFunction {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Create an invalid transform error.
    pub fn invalid_transform(
        function: impl Into<String>,
        expression: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidTransform {
            function: function.into(),
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Convert an I/O failure on `path`.
    pub fn file_system(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        Self::FileSystem {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    /// Attach a location; errors that already carry one keep it.
    pub fn with_location(self, location: &ElementLocation) -> Self {
        match self {
            located @ Self::Located { .. } => located,
            other => Self::Located {
                location: location.clone(),
                source: Box::new(other),
            },
        }
    }

    /// Name `expression` as the failing property function text.
    pub fn with_expression(self, expression: &str) -> Self {
        match self {
            Self::InvalidFunction { message, .. } => Self::InvalidFunction {
                expression: expression.to_string(),
                message,
            },
            Self::Located { location, source } => Self::Located {
                location,
                source: Box::new(source.with_expression(expression)),
            },
            other => other,
        }
    }

    /// The error without its location wrapper.
    pub fn inner(&self) -> &ExpandError {
        match self {
            Self::Located { source, .. } => source.inner(),
            other => other,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self.inner() {
            Self::InvalidExpression { .. } => ErrorCode::InvalidExpression,
            Self::ItemVectorConcatenation { .. } => ErrorCode::ItemVectorConcatenation,
            Self::InvalidFunction { .. } => ErrorCode::InvalidFunction,
            Self::UnknownFunction { .. } => ErrorCode::UnknownFunction,
            Self::DisallowedFunction { .. } => ErrorCode::DisallowedFunction,
            Self::InvalidTransform { .. } => ErrorCode::InvalidTransform,
            Self::FileSystem { .. } => ErrorCode::FileSystem,
            Self::Located { .. } => unreachable!("inner() strips locations"),
        }
    }

    /// The best-effort partially evaluated text of a failed property function.
    pub fn partially_evaluated(&self) -> Option<&str> {
        match self.inner() {
            Self::InvalidFunction { expression, .. } => Some(expression),
            _ => None,
        }
    }

    /// Format the error for display with its code.
    pub fn format(&self) -> String {
        format!("{}: {}", self.code(), self)
    }
}
