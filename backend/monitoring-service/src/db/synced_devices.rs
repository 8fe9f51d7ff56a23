/// Local projection of the device registry, fed by sync events.
use sqlx::PgPool;

#[derive(Clone)]
pub struct SyncedDeviceRepo {
    pool: PgPool,
}

impl SyncedDeviceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert-or-ignore keeps replayed and duplicated events harmless.
    pub async fn insert_ignore(
        &self,
        device_id: i64,
        name: &str,
        max_consumption: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO synced_devices (device_id, name, max_consumption) VALUES ($1, $2, $3) \
             ON CONFLICT (device_id) DO NOTHING",
        )
        .bind(device_id)
        .bind(name)
        .bind(max_consumption)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove the device and its accumulated history in one transaction,
    /// so a crash between the two cannot strand orphaned buckets.
    pub async fn delete_with_history(&self, device_id: i64) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM hourly_consumption WHERE device_id = $1")
            .bind(device_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM synced_devices WHERE device_id = $1")
            .bind(device_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await
    }

    pub async fn exists(&self, device_id: i64) -> Result<bool, sqlx::Error> {
        let found: Option<(i64,)> =
            sqlx::query_as("SELECT device_id FROM synced_devices WHERE device_id = $1")
                .bind(device_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }
}
