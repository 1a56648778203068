//! Error types for KeyValues parsing, writing and record conversion.
//!
//! Only *data* problems are reported through [`Error`]: malformed text, failing
//! I/O, records that don't validate, or values serde can't map onto a tree.
//! Misusing the tree API (setting a scalar on a node that holds children, or
//! adding children to a scalar) is a bug in the caller and panics instead.
//!
//! ## Error Categories
//!
//! - **Syntax Errors**: an unexpected structural token, with line/column/byte position
//! - **Unexpected EOF**: input ended inside a token, a comment or an open block
//! - **I/O Errors**: the underlying reader or writer failed; the byte offset is kept
//! - **Record Errors**: a [`Marshaler`](crate::Marshaler) rejected a node
//! - **Serde Errors**: type mismatches and unsupported shapes
//!
//! ## Examples
//!
//! ```rust
//! use keyvalues::{parse, Error};
//!
//! let err = parse("Key {\n").unwrap_err();
//! assert!(matches!(err, Error::UnexpectedEof { .. }));
//! assert!(err.to_string().contains("line 2"));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all recoverable errors produced by this crate.
///
/// Positions are reported as a 1-based line, a 1-based column counted in
/// characters, and a 0-based byte offset into the stream.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying reader or writer failed
    #[error("IO error at byte {offset}: {source}")]
    Io {
        offset: usize,
        #[source]
        source: io::Error,
    },

    /// Unexpected structural token
    #[error("Syntax error at line {line}, column {col} (byte {offset}): {msg}")]
    Syntax {
        line: usize,
        col: usize,
        offset: usize,
        msg: String,
    },

    /// Input ended in the middle of a statement, token or comment
    #[error("Unexpected end of input at line {line}, column {col} (byte {offset})\nExpected: {expected}")]
    UnexpectedEof {
        line: usize,
        col: usize,
        offset: usize,
        expected: String,
    },

    /// The stream is not valid UTF-8
    #[error("Invalid UTF-8 sequence at byte {offset}")]
    InvalidUtf8 { offset: usize },

    /// A record was handed a node with the wrong name
    #[error("{record}: key name was {found:?}, not {expected:?}")]
    KeyMismatch {
        record: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A record found a missing or malformed field
    #[error("{record}: {msg}")]
    InvalidRecord { record: &'static str, msg: String },

    /// A node could not be read as the requested type
    #[error("Type mismatch for key {key:?}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: String,
        found: String,
    },

    /// Unsupported type for serialization
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error at the given position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyvalues::Error;
    ///
    /// let err = Error::syntax(3, 7, 41, "unbalanced `}`");
    /// assert!(err.to_string().contains("line 3, column 7"));
    /// ```
    pub fn syntax(line: usize, col: usize, offset: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            offset,
            msg: msg.to_string(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(line: usize, col: usize, offset: usize, expected: &str) -> Self {
        Error::UnexpectedEof {
            line,
            col,
            offset,
            expected: expected.to_string(),
        }
    }

    /// Wraps an I/O failure with the byte offset at which it happened.
    pub fn io(offset: usize, source: io::Error) -> Self {
        Error::Io { offset, source }
    }

    /// Creates a record error for a node whose name doesn't match.
    pub fn key_mismatch(record: &'static str, expected: &'static str, found: &str) -> Self {
        Error::KeyMismatch {
            record,
            expected,
            found: found.to_string(),
        }
    }

    /// Creates a record validation error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyvalues::Error;
    ///
    /// let err = Error::invalid_record("VisGroup", "no name");
    /// assert_eq!(err.to_string(), "VisGroup: no name");
    /// ```
    pub fn invalid_record<T: fmt::Display>(record: &'static str, msg: T) -> Self {
        Error::InvalidRecord {
            record,
            msg: msg.to_string(),
        }
    }

    /// Creates a type mismatch error for the node named `key`.
    pub fn type_mismatch(key: &str, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            key: key.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an unsupported type error for shapes that have no tree representation.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns the byte offset the error points at, if it has one.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Io { offset, .. }
            | Error::Syntax { offset, .. }
            | Error::UnexpectedEof { offset, .. }
            | Error::InvalidUtf8 { offset } => Some(*offset),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
