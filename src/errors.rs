//! Unified error type for every Costbook operation.
//!
//! Views catch these at the point where an action was started and show the `Display`
//! text as a single alert message. Nothing here is retried.

use thiserror::Error;

/// All failures surfaced by the library.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid credentials or a failure reported by the identity provider.
    #[error("Authentication failed: {message}")]
    Auth {
        /// Provider-supplied reason
        message: String,
    },

    /// An action that needs a live session was attempted while signed out.
    #[error("You must be signed in to do this")]
    AuthRequired,

    /// A required field is missing or a numeric field does not hold a number.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending form field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// Any failure reading from or writing to the relational store.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A price list row could not be read.
    #[error("Import failed at line {line}: {message}")]
    ImportFormat {
        /// 1-based line number in the imported file
        line: u64,
        /// What is wrong with the row
        message: String,
    },

    /// The delimited-text reader itself failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Settings could not be loaded or are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// No budget with this id is visible to the current user.
    #[error("Budget {id} not found")]
    BudgetNotFound {
        /// Requested budget id
        id: i64,
    },

    /// The chapter is not part of the budget being edited.
    #[error("Chapter {id} not found")]
    ChapterNotFound {
        /// Requested chapter id
        id: i64,
    },

    /// Bad command-line arguments.
    #[error("{message}")]
    Usage {
        /// What to type instead
        message: String,
    },

    /// File system failure (config or import file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] on `field`.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`Error::Auth`].
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
