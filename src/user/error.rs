//! User domain errors.

use thiserror::Error;
use uuid::Uuid;

/// Failures of the account side of the system.
#[derive(Debug, Error)]
pub enum UserError {
    /// The referenced user does not exist.
    #[error("user not found: {0}")]
    NotFound(Uuid),

    /// Email or mobile number already belongs to another user.
    #[error("user already exists")]
    Conflict,

    /// Page size outside the accepted 1..=100 range.
    #[error("limit must be between 1 and 100, got {0}")]
    InvalidLimit(u32),

    /// Supplied password does not meet the minimum length.
    #[error("password must be at least 6 characters")]
    WeakPassword,

    /// The store reported nothing to delete after the existence check
    /// passed; the record was lost to a concurrent delete.
    #[error("unable to delete user {0}")]
    DeleteRace(Uuid),

    /// Password hashing failed.
    #[error("password hashing failed")]
    Password(#[source] bcrypt::BcryptError),

    /// Underlying store failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to a user record.
    #[error("corrupt user record: {0}")]
    Corrupt(String),
}
