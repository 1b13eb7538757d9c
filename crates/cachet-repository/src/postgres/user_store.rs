//! PostgreSQL user store.
//!
//! Expects an existing table:
//!
//! ```sql
//! CREATE TABLE users (
//!     id    SERIAL PRIMARY KEY,
//!     name  TEXT NOT NULL,
//!     email TEXT NOT NULL
//! );
//! ```

use crate::{traits::UserStore, DatabasePoolInterface};
use async_trait::async_trait;
use cachet_core::{CachetResult, NewUser, UserId, UserRecord};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// PostgreSQL user store.
#[derive(Component, Clone)]
#[shaku(interface = UserStore)]
pub struct PgUserStore {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_raw(row.id),
            name: row.name,
            email: row.email,
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &NewUser) -> CachetResult<UserRecord> {
        debug!("Inserting user: {}", user.email);

        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(row.into())
    }

    async fn delete_by_id(&self, id: UserId) -> CachetResult<u64> {
        debug!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected())
    }

    async fn select_all(&self) -> CachetResult<Vec<UserRecord>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users ORDER BY id")
            .fetch_all(self.pool.inner())
            .await?;

        debug!("Selected {} users", rows.len());
        Ok(rows.into_iter().map(UserRecord::from).collect())
    }
}
