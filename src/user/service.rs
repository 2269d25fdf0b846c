//! Account service for user CRUD orchestration.

use tracing::{info, instrument};
use uuid::Uuid;

use super::error::UserError;
use super::models::{NewUser, User, UserPatch};
use super::repository::UserRepository;

/// Largest page size the listing endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

const MIN_PASSWORD_LEN: usize = 6;

/// Service for account management operations.
#[derive(Debug, Clone)]
pub struct AccountService {
    repo: UserRepository,
}

impl AccountService {
    /// Create a new account service.
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// List users within pagination bounds.
    ///
    /// An empty page is a valid result, not an error.
    #[instrument(skip(self))]
    pub async fn list_users(&self, offset: u32, limit: u32) -> Result<Vec<User>, UserError> {
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(UserError::InvalidLimit(limit));
        }

        self.repo.list(offset, limit).await
    }

    /// Get a user by id.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, UserError> {
        self.repo.get(id).await?.ok_or(UserError::NotFound(id))
    }

    /// Create a new user.
    ///
    /// The pre-check on email/mobile produces the friendly conflict answer;
    /// the store's UNIQUE constraints settle the check-then-act race when
    /// two creates pass the pre-check concurrently.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_user(&self, request: NewUser) -> Result<User, UserError> {
        if self
            .repo
            .get_by_email_or_mobile(&request.email, &request.mobile_phone)
            .await?
            .is_some()
        {
            return Err(UserError::Conflict);
        }

        let mut processed = request;
        if let Some(password) = &processed.password {
            processed.password = Some(hash_password(password)?);
        }

        let user = self.repo.create(processed).await?;
        info!(user_id = %user.id, email = %user.email, "Created new user");

        Ok(user)
    }

    /// Apply a partial update to a user.
    #[instrument(skip(self, patch))]
    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, UserError> {
        if self.repo.get(id).await?.is_none() {
            return Err(UserError::NotFound(id));
        }

        let mut processed = patch;
        if let Some(password) = &processed.password {
            processed.password = Some(hash_password(password)?);
        }

        let user = self.repo.update(id, processed).await?;
        info!(user_id = %user.id, "Updated user");

        Ok(user)
    }

    /// Delete a user.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), UserError> {
        if self.repo.get(id).await?.is_none() {
            return Err(UserError::NotFound(id));
        }

        // The existence check above is not atomic with the delete; a row
        // that vanished in between is reported, not silently ignored.
        if !self.repo.delete(id).await? {
            return Err(UserError::DeleteRace(id));
        }

        info!(user_id = %id, "Deleted user");
        Ok(())
    }
}

/// Hash a password using bcrypt.
pub(crate) fn hash_password(password: &str) -> Result<String, UserError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(UserError::WeakPassword);
    }

    // Use a lower cost factor for development speed
    let cost = if cfg!(debug_assertions) { 4 } else { 10 };
    bcrypt::hash(password, cost).map_err(UserError::Password)
}

/// Verify a password against a bcrypt hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
