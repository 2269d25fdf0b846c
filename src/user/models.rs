//! User data models.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User entity as owned by the store.
///
/// This is the internal representation; the wire shape lives in the API
/// layer so the row never leaks to clients (the password hash in
/// particular).
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_phone: String,
    pub verified: bool,
    /// bcrypt hash of the login password, if one has been set.
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a new user.
///
/// `password`, when present, arrives in plain text and is replaced by its
/// bcrypt hash in the service layer before the store sees it.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_phone: String,
    pub verified: bool,
    pub password: Option<String>,
}

/// Partial update of an existing user.
///
/// Absent fields leave the stored value untouched. Same password handling
/// as [`NewUser`].
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile_phone: Option<String>,
    pub verified: Option<bool>,
    pub password: Option<String>,
}

impl UserPatch {
    /// Whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.mobile_phone.is_none()
            && self.verified.is_none()
            && self.password.is_none()
    }
}
