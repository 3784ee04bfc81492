use anyhow::Result;
use async_trait::async_trait;
use log::info;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{format_timestamp, is_unique_violation, parse_timestamp};
use crate::backend::domain::models::parent::Parent;
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::ParentStorage;

/// Repository for the `parents` auth collection
#[derive(Clone)]
pub struct ParentRepository {
    db: DbConnection,
}

impl ParentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

fn row_to_parent(row: &SqliteRow) -> Result<Parent> {
    Ok(Parent {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        password_salt: row.try_get("password_salt")?,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
    })
}

#[async_trait]
impl ParentStorage for ParentRepository {
    async fn store_parent(&self, parent: &Parent) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO parents (id, email, password_hash, password_salt, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&parent.id)
        .bind(&parent.email)
        .bind(&parent.password_hash)
        .bind(&parent.password_salt)
        .bind(format_timestamp(&parent.created_at))
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => {
                info!("Stored parent account {}", parent.id);
                Ok(true)
            }
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Parent>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, password_salt, created_at
            FROM parents
            WHERE email = ?
            "#,
        )
        .bind(Parent::normalize_email(email))
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(row_to_parent).transpose()
    }

    async fn get_parent(&self, parent_id: &str) -> Result<Option<Parent>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, password_salt, created_at
            FROM parents
            WHERE id = ?
            "#,
        )
        .bind(parent_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(row_to_parent).transpose()
    }
}
