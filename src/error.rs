//! Error type shared by the store, the desk and both front ends.
//!
//! Every failure a user-triggered action can produce is one of these variants;
//! the HTML layer turns them into notices and the CLI prints them.

use thiserror::Error;

/// Rejected customer input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("company name, contact name and phone are required")]
    MissingRequired,
    #[error("phone must be an 11-digit mobile number")]
    InvalidPhone,
    #[error("unknown customer type")]
    UnknownCustomerType,
}

#[derive(Debug, Error)]
pub enum CrmError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unknown user and wrong password are deliberately indistinguishable
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("current password is incorrect")]
    IncorrectPassword,

    #[error("new password must not be empty")]
    EmptyPassword,

    #[error("new passwords do not match")]
    PasswordMismatch,

    #[error("no backup files found")]
    NoBackups,

    #[error("backup file not found: {0}")]
    BackupNotFound(String),

    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CrmResult<T> = Result<T, CrmError>;
