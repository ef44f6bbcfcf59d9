use thiserror::Error;

/// The result type for the `lexrt` crate.
pub type Result<T> = std::result::Result<T, LexError>;

/// The error type for the `lexrt` crate.
#[derive(Error, Debug)]
pub struct LexError {
    /// The source of the error.
    pub source: Box<LexErrorKind>,
}

impl LexError {
    /// Create a new `LexError`.
    pub fn new(kind: LexErrorKind) -> Self {
        LexError {
            source: Box::new(kind),
        }
    }

    /// Shortcut for a [`LexErrorKind::MalformedTables`] error.
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        LexError::new(LexErrorKind::MalformedTables(msg.into()))
    }

    /// Returns the kind of the error.
    #[inline]
    pub fn kind(&self) -> &LexErrorKind {
        &self.source
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum LexErrorKind {
    /// The input buffer could not grow to the requested size.
    #[error("Buffer allocation of {requested} bytes failed")]
    AllocationFailure {
        /// The capacity that was requested.
        requested: usize,
    },

    /// The tables violate their structural invariants.
    #[error("Malformed tables: {0}")]
    MalformedTables(String),

    /// A std::io error occurred.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// A start condition name was not found in the tables.
    #[error("Unknown start condition: {0}")]
    UnknownStartCondition(String),

    /// `less` was called with a length beyond the current match.
    #[error("Cannot keep {requested} bytes of a match with length {length}")]
    LessOutOfRange {
        /// The requested number of bytes to keep.
        requested: usize,
        /// The length of the current match.
        length: usize,
    },

    /// An action reported a fatal error.
    #[error("Action error: {0}")]
    Action(String),

    /// Deserializing tables from JSON failed.
    #[cfg(feature = "serde")]
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

impl From<std::io::Error> for LexError {
    fn from(error: std::io::Error) -> Self {
        LexError::new(LexErrorKind::IoError(error))
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for LexError {
    fn from(error: serde_json::Error) -> Self {
        LexError::new(LexErrorKind::JsonError(error))
    }
}

impl From<LexErrorKind> for LexError {
    fn from(kind: LexErrorKind) -> Self {
        LexError::new(kind)
    }
}
