/// Local projection of user ids owned by the auth service.
///
/// Only the id is kept; it exists so device assignments can be validated
/// and cleaned up without a cross-service call.
use sqlx::PgPool;

#[derive(Clone)]
pub struct SyncedUserRepo {
    pool: PgPool,
}

impl SyncedUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert-or-ignore keeps replayed and duplicated events harmless.
    pub async fn insert_ignore(&self, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO synced_users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Devices referencing the user fall back to unassigned through the
    /// foreign key's ON DELETE SET NULL.
    pub async fn delete(&self, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM synced_users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn exists(&self, user_id: i64) -> Result<bool, sqlx::Error> {
        let found: Option<(i64,)> =
            sqlx::query_as("SELECT user_id FROM synced_users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }
}
