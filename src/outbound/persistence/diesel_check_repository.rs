//! PostgreSQL-backed `CheckRepository` using Diesel.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::dsl::count_distinct;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::check::{CheckStats, NewCheck};
use crate::domain::ports::{CheckRepository, CheckRepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewCheckRow;
use super::pool::{DbPool, PoolError};
use super::schema::checks;

/// Diesel-backed implementation of the check log port.
#[derive(Clone)]
pub struct DieselCheckRepository {
    pool: DbPool,
}

impl DieselCheckRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> CheckRepositoryError {
    map_pool_error(error, CheckRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> CheckRepositoryError {
    map_diesel_error(
        error,
        CheckRepositoryError::query,
        CheckRepositoryError::connection,
    )
}

#[async_trait]
impl CheckRepository for DieselCheckRepository {
    async fn create(&self, check: &NewCheck) -> Result<i32, CheckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::insert_into(checks::table)
            .values(&NewCheckRow {
                user_id: check.user_id.as_str(),
                latitude: check.latitude,
                longitude: check.longitude,
                has_alert: check.has_alert,
                created_at: Utc::now(),
            })
            .returning(checks::id)
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)
    }

    async fn stats(&self, window_minutes: i64) -> Result<CheckStats, CheckRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let period_start = Utc::now() - Duration::minutes(window_minutes);

        let user_count: i64 = checks::table
            .filter(checks::created_at.ge(period_start))
            .select(count_distinct(checks::user_id))
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;

        let total_checks: i64 = checks::table
            .filter(checks::created_at.ge(period_start))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(CheckStats {
            user_count,
            total_checks,
            period_start,
        })
    }
}
