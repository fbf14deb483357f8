//! Errors raised while loading or compiling a linking configuration
//!
//! Only structural problems are errors. A path that matches no route is
//! reported as `None` by the resolver, never as an error, because URLs are
//! untrusted input.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkingError {
    /// Two screen chains normalize to the same pattern and neither chain is a
    /// prefix of the other
    #[error(
        "Found conflicting screens with the same pattern. The pattern '{pattern}' resolves to both '{first}' and '{second}'. Patterns must be unique and cannot resolve to more than one screen."
    )]
    ConfigConflict {
        pattern: String,
        first: String,
        second: String,
    },

    /// The configuration tree has a shape the compiler cannot accept
    #[error("Found invalid configuration: {0}")]
    InvalidConfigShape(String),

    /// Configuration text could not be parsed at all
    #[error("Failed to parse linking configuration: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, LinkingError>;

impl From<serde_json::Error> for LinkingError {
    fn from(err: serde_json::Error) -> Self {
        shape_or_parse(err.to_string())
    }
}

impl From<toml::de::Error> for LinkingError {
    fn from(err: toml::de::Error) -> Self {
        shape_or_parse(err.message().to_string())
    }
}

/// Unknown keys and wrong value types are shape errors; everything else is
/// a syntax error in the document itself
fn shape_or_parse(message: String) -> LinkingError {
    let is_shape = message.contains("unknown field")
        || message.contains("invalid type")
        || message.contains("missing field");

    if is_shape {
        LinkingError::InvalidConfigShape(message)
    } else {
        LinkingError::Parse(message)
    }
}
