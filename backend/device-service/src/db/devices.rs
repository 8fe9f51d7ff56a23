use sqlx::PgPool;

use crate::models::Device;

const DEVICE_COLUMNS: &str = "id, name, max_consumption, image_url, user_id, created_at";

#[derive(Clone)]
pub struct DeviceRepo {
    pool: PgPool,
}

impl DeviceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Device>, sqlx::Error> {
        sqlx::query_as::<_, Device>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Device>, sqlx::Error> {
        sqlx::query_as::<_, Device>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Device>, sqlx::Error> {
        sqlx::query_as::<_, Device>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn insert(
        &self,
        name: &str,
        max_consumption: f64,
        image_url: Option<&str>,
        user_id: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO devices (name, max_consumption, image_url, user_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(name)
        .bind(max_consumption)
        .bind(image_url)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        max_consumption: f64,
        image_url: Option<&str>,
        user_id: Option<i64>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE devices SET name = $1, max_consumption = $2, image_url = $3, user_id = $4 \
             WHERE id = $5",
        )
        .bind(name)
        .bind(max_consumption)
        .bind(image_url)
        .bind(user_id)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
