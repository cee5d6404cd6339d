use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ContentRow, RecordStore, StoreError};

/// Postgres-backed record store. Dedicated tables share the shape
/// `(id, owner_id, data jsonb, asset_url, created_at)`; keyed sections live
/// in `portfolio_content` as one serialized array per `content_key`.
///
/// Table names come only from the static section registry, never from
/// request input.
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list_rows(&self, table: &str, owner: Uuid) -> Result<Vec<ContentRow>, StoreError> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT id, owner_id, data, asset_url, created_at \
             FROM {table} WHERE owner_id = $1 ORDER BY created_at ASC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_row(
        &self,
        table: &str,
        owner: Uuid,
        data: &Value,
        asset_url: Option<&str>,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(&format!(
            "INSERT INTO {table} (id, owner_id, data, asset_url) VALUES ($1, $2, $3, $4)"
        ))
        .bind(id)
        .bind(owner)
        .bind(data)
        .bind(asset_url)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_row(
        &self,
        table: &str,
        owner: Uuid,
        id: Uuid,
        data: &Value,
        asset_url: Option<&str>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(&format!(
            "UPDATE {table} SET data = $1, asset_url = $2 WHERE id = $3 AND owner_id = $4"
        ))
        .bind(data)
        .bind(asset_url)
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    async fn delete_row(&self, table: &str, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let result =
            sqlx::query(&format!("DELETE FROM {table} WHERE id = $1 AND owner_id = $2"))
                .bind(id)
                .bind(owner)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    async fn get_content(
        &self,
        owner: Uuid,
        content_key: &str,
    ) -> Result<Option<Value>, StoreError> {
        let value: Option<Value> = sqlx::query_scalar(
            "SELECT content_value FROM portfolio_content \
             WHERE owner_id = $1 AND content_key = $2",
        )
        .bind(owner)
        .bind(content_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn put_content(
        &self,
        owner: Uuid,
        content_key: &str,
        value: &Value,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO portfolio_content (id, owner_id, content_key, content_value, updated_at) \
             VALUES ($1, $2, $3, $4, now()) \
             ON CONFLICT (owner_id, content_key) \
             DO UPDATE SET content_value = EXCLUDED.content_value, updated_at = now()",
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(content_key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
