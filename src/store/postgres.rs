use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use super::WaitlistStore;
use crate::configuration::DatabaseSettings;
use crate::domain::WaitlistEmail;
use crate::domain::WaitlistEntry;

/// `waitlist` table in a Postgres database we connect to directly. See
/// `migrations/` for the schema; `email` carries a `UNIQUE` constraint.
///
/// Queries are built with `sqlx::query` rather than `sqlx::query!`, so the
/// crate builds without a live database or a `.sqlx` offline cache.
pub struct PgWaitlistStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct WaitlistRow {
    email: String,
}

impl PgWaitlistStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// `connect_lazy_with` only connects when the pool is used for the first
    /// time, so the server starts (and `/health_check` answers) even while the
    /// db is still coming up
    pub fn connect_lazy(db_cfg: &DatabaseSettings) -> Self {
        Self::new(PgPoolOptions::new().connect_lazy_with(db_cfg.connection()))
    }
}

#[async_trait]
impl WaitlistStore for PgWaitlistStore {
    #[tracing::instrument(name = "SELECTing waitlist entry", skip(self))]
    async fn find_by_email(
        &self,
        email: &WaitlistEmail,
    ) -> Result<Option<WaitlistEntry>, StoreError> {
        let row = sqlx::query_as::<_, WaitlistRow>(
            r#"
            SELECT email FROM waitlist
            WHERE email = $1
            "#,
        )
        .bind(email.as_ref())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query the waitlist table")?;

        match row {
            None => Ok(None),
            Some(row) => {
                let email = WaitlistEmail::parse(row.email).map_err(anyhow::Error::msg)?;
                Ok(Some(WaitlistEntry { email }))
            }
        }
    }

    #[tracing::instrument(name = "INSERTing waitlist entry", skip(self))]
    async fn insert(
        &self,
        email: &WaitlistEmail,
    ) -> Result<WaitlistEntry, StoreError> {
        let outcome = sqlx::query(
            r#"
            INSERT INTO waitlist (id, email, joined_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email.as_ref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match outcome {
            Ok(_) => Ok(WaitlistEntry {
                email: email.clone(),
            }),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Duplicate(email.clone()))
            }
            Err(e) => {
                tracing::error!("bad query: {e:?}");
                Err(anyhow::Error::new(e)
                    .context("Failed to insert into the waitlist table")
                    .into())
            }
        }
    }
}
