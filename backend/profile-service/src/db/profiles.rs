use sqlx::PgPool;

use crate::models::Profile;

const PROFILE_COLUMNS: &str = "user_id, name, email, avatar_url, created_at";

#[derive(Clone)]
pub struct ProfileRepo {
    pool: PgPool,
}

impl ProfileRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users ORDER BY user_id"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, user_id: i64) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Plain insert; a duplicate id surfaces as a unique violation.
    pub async fn insert(
        &self,
        user_id: i64,
        name: Option<&str>,
        email: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO users (user_id, name, email, avatar_url) VALUES ($1, $2, $3, $4)")
            .bind(user_id)
            .bind(name)
            .bind(email)
            .bind(avatar_url)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert-or-ignore for the creation projection: a replayed
    /// USER_CREATED must not clobber later updates.
    pub async fn insert_ignore(
        &self,
        user_id: i64,
        name: Option<&str>,
        email: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (user_id, name, email, avatar_url) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .bind(avatar_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Unconditional overwrite of the mutable fields. A missing row is a
    /// no-op (zero rows affected), never an insert: materializing a row
    /// here would let a stale update resurrect a deleted profile.
    pub async fn update(
        &self,
        user_id: i64,
        name: Option<&str>,
        email: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET name = $2, email = $3, avatar_url = $4 WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .bind(avatar_url)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
