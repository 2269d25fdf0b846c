//! Refresh token revocation list.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Repository for the refresh token denylist.
///
/// Logout and refresh rotation record the `jti` of spent tokens here;
/// refresh rejects any token whose `jti` is present. Rows expire with the
/// token itself and are purged opportunistically.
#[derive(Debug, Clone)]
pub struct RevocationRepository {
    pool: SqlitePool,
}

impl RevocationRepository {
    /// Create a new revocation repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a token as revoked. Idempotent.
    #[instrument(skip(self, subject))]
    pub async fn revoke(
        &self,
        jti: Uuid,
        subject: &str,
        expires_at: i64,
    ) -> Result<(), sqlx::Error> {
        debug!("Revoking token {}", jti);

        sqlx::query(
            "INSERT OR IGNORE INTO revoked_tokens (jti, subject, expires_at) VALUES (?, ?, ?)",
        )
        .bind(jti.to_string())
        .bind(subject)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Whether a token has been revoked.
    #[instrument(skip(self))]
    pub async fn is_revoked(&self, jti: Uuid) -> Result<bool, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM revoked_tokens WHERE jti = ?")
                .bind(jti.to_string())
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0 > 0)
    }

    /// Drop entries whose token has expired anyway. Returns rows removed.
    #[instrument(skip(self))]
    pub async fn purge_expired(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < ?")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
