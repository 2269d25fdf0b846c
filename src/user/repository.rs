//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::error::UserError;
use super::models::{NewUser, User, UserPatch};

const USER_COLUMNS: &str = "id, first_name, last_name, email, mobile_phone, verified, \
                            password_hash, created_at, updated_at";

/// Raw user row as stored. The id is kept as TEXT in SQLite and parsed
/// back into a [`Uuid`] when the row is mapped to the domain model.
#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    mobile_phone: String,
    verified: bool,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| UserError::Corrupt(format!("invalid user id '{}': {e}", row.id)))?;

        Ok(User {
            id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            mobile_phone: row.mobile_phone,
            verified: row.verified,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by email.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user matching either the email or the mobile number.
    ///
    /// Used as the uniqueness pre-check before create.
    #[instrument(skip(self))]
    pub async fn get_by_email_or_mobile(
        &self,
        email: &str,
        mobile_phone: &str,
    ) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? OR mobile_phone = ? LIMIT 1"
        ))
        .bind(email)
        .bind(mobile_phone)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// List users in a stable order.
    ///
    /// Ordered by creation time with the id as tiebreaker, so repeated
    /// calls against an unchanged store page consistently.
    #[instrument(skip(self))]
    pub async fn list(&self, offset: u32, limit: u32) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Create a new user.
    ///
    /// Assigns the id and both timestamps. The UNIQUE constraints on email
    /// and mobile_phone are the authoritative uniqueness guard; a violation
    /// surfaces as [`UserError::Conflict`].
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(&self, request: NewUser) -> Result<User, UserError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        debug!("Creating user: {} ({})", request.email, id);

        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, mobile_phone, verified, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&request.mobile_phone)
        .bind(request.verified)
        .bind(&request.password)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                UserError::Conflict
            } else {
                UserError::from(e)
            }
        })?;

        self.get(id)
            .await?
            .ok_or_else(|| UserError::Corrupt(format!("user {id} missing after insert")))
    }

    /// Apply a partial update.
    ///
    /// Only supplied fields are written; `updated_at` advances whenever at
    /// least one field is written. An empty patch returns the record
    /// unchanged.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: Uuid, patch: UserPatch) -> Result<User, UserError> {
        let existing = self.get(id).await?.ok_or(UserError::NotFound(id))?;

        let mut updates = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(first_name) = patch.first_name {
            updates.push("first_name = ?");
            values.push(first_name);
        }

        if let Some(last_name) = patch.last_name {
            updates.push("last_name = ?");
            values.push(last_name);
        }

        if let Some(email) = patch.email {
            updates.push("email = ?");
            values.push(email);
        }

        if let Some(mobile_phone) = patch.mobile_phone {
            updates.push("mobile_phone = ?");
            values.push(mobile_phone);
        }

        if let Some(verified) = patch.verified {
            updates.push("verified = ?");
            values.push(if verified { "1" } else { "0" }.to_string());
        }

        if let Some(password) = patch.password {
            updates.push("password_hash = ?");
            values.push(password);
        }

        if updates.is_empty() {
            return Ok(existing);
        }

        updates.push("updated_at = ?");

        let sql = format!("UPDATE users SET {} WHERE id = ?", updates.join(", "));

        let mut query = sqlx::query(&sql);
        for value in &values {
            query = query.bind(value);
        }
        query = query.bind(Utc::now()).bind(id.to_string());

        query.execute(&self.pool).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserError::Conflict
            } else {
                UserError::from(e)
            }
        })?;

        self.get(id)
            .await?
            .ok_or_else(|| UserError::Corrupt(format!("user {id} missing after update")))
    }

    /// Delete a user. Returns whether a row was actually removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, UserError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
