//! Unified error types and result handling.
//!
//! Every failure a caller can observe maps to one variant here. The `Display`
//! text doubles as the message shown to the operator, so it is kept short and
//! free of internal detail.

use thiserror::Error;

/// Errors produced by storage, data access, and configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The relational backend rejected a statement or the connection failed.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The local blob store could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot could not be serialized or deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An update, delete, or toggle targeted an identifier that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (`"user"`, `"module"`, ...)
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A user with this phone already exists.
    #[error("A user with phone {phone} already exists")]
    DuplicateUser {
        /// Normalized phone
        phone: String,
    },

    /// Input was rejected before anything was written.
    #[error("Invalid input: {message}")]
    Validation {
        /// Why the input was rejected
        message: String,
    },

    /// An import document failed shape validation. Nothing was written.
    #[error("Invalid backup document: {reason}")]
    InvalidImport {
        /// Why the document was rejected
        reason: String,
    },

    /// Student logins are refused while maintenance mode is on.
    #[error("The system is under maintenance, try again later")]
    Maintenance,

    /// The module's drip delay has not elapsed for this student yet.
    #[error("Module {id} unlocks at {unlocks_at}")]
    ModuleLocked {
        /// Module id
        id: String,
        /// First instant the module opens
        unlocks_at: chrono::DateTime<chrono::Utc>,
    },

    /// No user is registered under this phone.
    #[error("No user registered with phone {phone}")]
    UnknownUser {
        /// Normalized phone
        phone: String,
    },

    /// The user exists but access has been disabled.
    #[error("Access disabled for phone {phone}")]
    InactiveUser {
        /// Normalized phone
        phone: String,
    },
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] on `entity` with `id`.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns true when the operation failed only because the target was already absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
