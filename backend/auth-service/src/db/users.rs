/// Account storage. This service is the authoritative owner of user
/// identities; every other copy in the platform is a projection fed by
/// the sync fabric.
use crate::models::{Account, AccountView};
use sqlx::PgPool;

#[derive(Clone)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            "SELECT id, username, password, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_view_by_id(&self, id: i64) -> Result<Option<AccountView>, sqlx::Error> {
        sqlx::query_as::<_, AccountView>("SELECT id, username, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO users (username, password, role) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Update username/role, and the password only when a new one was
    /// provided. Returns the number of affected rows.
    pub async fn update(
        &self,
        id: i64,
        username: &str,
        role: &str,
        password_hash: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = match password_hash {
            Some(hash) => {
                sqlx::query("UPDATE users SET username = $1, role = $2, password = $3 WHERE id = $4")
                    .bind(username)
                    .bind(role)
                    .bind(hash)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("UPDATE users SET username = $1, role = $2 WHERE id = $3")
                    .bind(username)
                    .bind(role)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
        };
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
