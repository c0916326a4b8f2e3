//! Error types for template rendering.
//!
//! Every failure aborts the render: structural problems in the template,
//! failures reported by the data provider, and I/O errors from the output
//! sink all surface as an [`Error`]. [`Error::kind`] collapses the variants
//! into an [`ErrorKind`] with a stable label and a legacy numeric code.

use std::io;

use thiserror::Error;

use crate::scanner::NAME_LENGTH_MAX;

/// Boxed error type carried by [`Error::Provider`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while rendering a template.
#[derive(Debug, Error)]
pub enum Error {
    /// Write, allocation or descriptor failure in the output path.
    #[error("system error: {0}")]
    System(#[from] io::Error),

    /// A tag was opened but never closed, or a section is still open at the
    /// end of the template.
    #[error("unexpected end of template")]
    UnexpectedEnd,

    /// A tag with an empty name, when empty tags are rejected.
    #[error("empty tag")]
    EmptyTag,

    /// A tag name longer than [`NAME_LENGTH_MAX`] bytes.
    #[error("tag name too long ({length} bytes, maximum is {max})", max = NAME_LENGTH_MAX)]
    TagTooLong { length: usize },

    /// A malformed `{{=open close=}}` tag.
    #[error("bad delimiter definition")]
    BadDelimiters,

    /// Sections or partials nested beyond the allowed depth.
    #[error("nesting too deep (limit is {limit})")]
    TooDeep { limit: usize },

    /// A closing tag that does not match the innermost open section.
    #[error("{}", closing_message(.expected.as_deref(), .found))]
    Closing {
        expected: Option<String>,
        found: String,
    },

    /// A `{{{name}}}` tag without its matching closing brace.
    #[error("bad unescape tag")]
    BadUnescapeTag,

    /// The provider lacks a capability the template needs.
    #[error("provider supports neither get nor put")]
    InvalidInterface,

    /// The provider could not resolve a value.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// The provider could not resolve a partial.
    #[error("partial not found: {0}")]
    PartialNotFound(String),

    /// Any other failure reported by the provider, propagated unchanged.
    #[error("provider error: {0}")]
    Provider(#[source] BoxError),
}

fn closing_message(expected: Option<&str>, found: &str) -> String {
    match expected {
        Some(expected) => format!("closing tag `{found}` does not match open section `{expected}`"),
        None => format!("closing tag `{found}` without open section"),
    }
}

impl Error {
    /// Wraps an arbitrary provider failure.
    pub fn provider(err: impl Into<BoxError>) -> Self {
        Self::Provider(err.into())
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::System(_) => ErrorKind::System,
            Error::UnexpectedEnd => ErrorKind::UnexpectedEnd,
            Error::EmptyTag => ErrorKind::EmptyTag,
            Error::TagTooLong { .. } => ErrorKind::TagTooLong,
            Error::BadDelimiters => ErrorKind::BadDelimiters,
            Error::TooDeep { .. } => ErrorKind::TooDeep,
            Error::Closing { .. } => ErrorKind::Closing,
            Error::BadUnescapeTag => ErrorKind::BadUnescapeTag,
            Error::InvalidInterface => ErrorKind::InvalidInterface,
            Error::ItemNotFound(_) => ErrorKind::ItemNotFound,
            Error::PartialNotFound(_) => ErrorKind::PartialNotFound,
            Error::Provider(_) => ErrorKind::Provider,
        }
    }
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    System,
    UnexpectedEnd,
    EmptyTag,
    TagTooLong,
    BadDelimiters,
    TooDeep,
    Closing,
    BadUnescapeTag,
    InvalidInterface,
    ItemNotFound,
    PartialNotFound,
    Provider,
}

impl ErrorKind {
    /// Short human-readable label, as printed by the command-line tool.
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::System => "system",
            ErrorKind::UnexpectedEnd => "unexpected end",
            ErrorKind::EmptyTag => "empty tag",
            ErrorKind::TagTooLong => "tag too long",
            ErrorKind::BadDelimiters => "bad separators",
            ErrorKind::TooDeep => "too depth",
            ErrorKind::Closing => "closing",
            ErrorKind::BadUnescapeTag => "bad unescape tag",
            ErrorKind::InvalidInterface => "invalid interface",
            ErrorKind::ItemNotFound => "item not found",
            ErrorKind::PartialNotFound => "partial not found",
            ErrorKind::Provider => "provider",
        }
    }

    /// Stable negative status code, for callers that report errors
    /// numerically. Provider failures map to the first user code, `-100`.
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::System => -1,
            ErrorKind::UnexpectedEnd => -2,
            ErrorKind::EmptyTag => -3,
            ErrorKind::TagTooLong => -4,
            ErrorKind::BadDelimiters => -5,
            ErrorKind::TooDeep => -6,
            ErrorKind::Closing => -7,
            ErrorKind::BadUnescapeTag => -8,
            ErrorKind::InvalidInterface => -9,
            ErrorKind::ItemNotFound => -10,
            ErrorKind::PartialNotFound => -11,
            ErrorKind::Provider => -100,
        }
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;
