//! All error types for the pocodec crate.
//!
//! These are returned from all fallible operations (parsing, plural rule
//! compilation, serialization). A failed parse never yields a partial catalog.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed escape: {0}")]
    MalformedEscape(String),

    #[error("malformed catalog: {0}")]
    MalformedCatalog(String),

    #[error("malformed plural expression: {0}")]
    MalformedExpression(String),

    #[error("unrecognized plural form selector: {value}")]
    UnrecognizedPluralForm {
        value: String,
        #[source]
        source: Box<Error>,
    },

    #[error("header parse error: {0}")]
    HeaderParse(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a structural error pinned to a 1-based input line.
    pub fn catalog_error(line: usize, message: impl Into<String>) -> Self {
        Error::MalformedCatalog(format!("line {}: {}", line, message.into()))
    }

    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Prefixes line information onto codec errors raised without it.
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            Error::MalformedEscape(msg) => Error::MalformedEscape(format!("line {}: {}", line, msg)),
            Error::MalformedCatalog(msg) => Error::catalog_error(line, msg),
            other => other,
        }
    }
}
