//! PostgreSQL-backed `WebhookRepository` using Diesel.
//!
//! Upholds the outbox invariants: new rows start `in_progress` at retry zero
//! with `scheduled_at = now`; re-entering `in_progress` re-anchors
//! `scheduled_at` by one minute per accumulated retry; `mark_delivered`
//! matches on id alone so repeating it is harmless.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{WebhookRepository, WebhookRepositoryError};
use crate::domain::webhook::{NewWebhook, WebhookRecord, WebhookState};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewWebhookRow, WebhookRow};
use super::pool::{DbPool, PoolError};
use super::schema::webhooks;

/// Diesel-backed implementation of the outbox port.
#[derive(Clone)]
pub struct DieselWebhookRepository {
    pool: DbPool,
}

impl DieselWebhookRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> WebhookRepositoryError {
    map_pool_error(error, WebhookRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> WebhookRepositoryError {
    map_diesel_error(
        error,
        WebhookRepositoryError::query,
        WebhookRepositoryError::connection,
    )
}

#[async_trait]
impl WebhookRepository for DieselWebhookRepository {
    async fn create(&self, webhook: &NewWebhook) -> Result<i32, WebhookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let now = Utc::now();

        diesel::insert_into(webhooks::table)
            .values(&NewWebhookRow {
                check_id: webhook.check_id,
                state: WebhookState::InProgress.as_str(),
                retry_cnt: 0,
                payload: &webhook.payload,
                created_at: now,
                updated_at: now,
                scheduled_at: now,
            })
            .returning(webhooks::id)
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)
    }

    async fn read(&self, id: i32) -> Result<WebhookRecord, WebhookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = webhooks::table
            .find(id)
            .select(WebhookRow::as_select())
            .first::<WebhookRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.ok_or(WebhookRepositoryError::NotFound)?
            .into_record()
            .map_err(WebhookRepositoryError::query)
    }

    async fn update_state(
        &self,
        id: i32,
        state: WebhookState,
        retry_cnt: i32,
    ) -> Result<(), WebhookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let now = Utc::now();

        let affected = if state == WebhookState::InProgress {
            let scheduled_at = now + Duration::minutes(i64::from(retry_cnt));
            diesel::update(webhooks::table.find(id))
                .set((
                    webhooks::state.eq(state.as_str()),
                    webhooks::retry_cnt.eq(retry_cnt),
                    webhooks::updated_at.eq(now),
                    webhooks::scheduled_at.eq(scheduled_at),
                ))
                .execute(&mut conn)
                .await
                .map_err(diesel_error)?
        } else {
            diesel::update(webhooks::table.find(id))
                .set((
                    webhooks::state.eq(state.as_str()),
                    webhooks::retry_cnt.eq(retry_cnt),
                    webhooks::updated_at.eq(now),
                ))
                .execute(&mut conn)
                .await
                .map_err(diesel_error)?
        };

        if affected == 0 {
            return Err(WebhookRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn mark_delivered(&self, id: i32) -> Result<(), WebhookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let affected = diesel::update(webhooks::table.find(id))
            .set((
                webhooks::state.eq(WebhookState::Delivered.as_str()),
                webhooks::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;

        if affected == 0 {
            return Err(WebhookRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_in_progress(
        &self,
        limit: i64,
    ) -> Result<Vec<WebhookRecord>, WebhookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<WebhookRow> = webhooks::table
            .filter(
                webhooks::state
                    .eq(WebhookState::InProgress.as_str())
                    .and(webhooks::scheduled_at.le(Utc::now())),
            )
            .order(webhooks::scheduled_at.asc())
            .limit(limit)
            .select(WebhookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter()
            .map(|row| row.into_record().map_err(WebhookRepositoryError::query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let mapped = pool_error(PoolError::build("bad dsn"));
        assert!(matches!(mapped, WebhookRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn diesel_errors_map_to_query_errors() {
        let mapped = diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(mapped, WebhookRepositoryError::Query { .. }));
    }
}
