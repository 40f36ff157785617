//! PostgreSQL-backed `ZoneRepository` using Diesel.
//!
//! Deletion is soft: `deleted_at` is stamped and every read filters it out.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ZoneRepository, ZoneRepositoryError};
use crate::domain::zone::{Zone, ZoneDraft};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewZoneRow, ZoneChangeset, ZoneRow};
use super::pool::{DbPool, PoolError};
use super::schema::incidents;

/// Diesel-backed implementation of the zone catalog port.
#[derive(Clone)]
pub struct DieselZoneRepository {
    pool: DbPool,
}

impl DieselZoneRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ZoneRepositoryError {
    map_pool_error(error, ZoneRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ZoneRepositoryError {
    map_diesel_error(
        error,
        ZoneRepositoryError::query,
        ZoneRepositoryError::connection,
    )
}

#[async_trait]
impl ZoneRepository for DieselZoneRepository {
    async fn create(&self, draft: &ZoneDraft) -> Result<i32, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::insert_into(incidents::table)
            .values(&NewZoneRow {
                name: &draft.name,
                descr: &draft.descr,
                latitude: draft.latitude,
                longitude: draft.longitude,
                radius_m: draft.radius_m,
                is_active: draft.is_active,
            })
            .returning(incidents::id)
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)
    }

    async fn read(&self, id: i32) -> Result<Zone, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = incidents::table
            .filter(incidents::id.eq(id).and(incidents::deleted_at.is_null()))
            .select(ZoneRow::as_select())
            .first::<ZoneRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(Zone::from).ok_or(ZoneRepositoryError::NotFound)
    }

    async fn update(&self, id: i32, draft: &ZoneDraft) -> Result<(), ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let affected = diesel::update(
            incidents::table.filter(incidents::id.eq(id).and(incidents::deleted_at.is_null())),
        )
        .set(&ZoneChangeset {
            name: &draft.name,
            descr: &draft.descr,
            latitude: draft.latitude,
            longitude: draft.longitude,
            radius_m: draft.radius_m,
            is_active: draft.is_active,
            updated_at: Utc::now(),
        })
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        if affected == 0 {
            return Err(ZoneRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn soft_delete(&self, id: i32) -> Result<(), ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let now = Utc::now();

        let affected = diesel::update(
            incidents::table.filter(incidents::id.eq(id).and(incidents::deleted_at.is_null())),
        )
        .set((
            incidents::deleted_at.eq(Some(now)),
            incidents::updated_at.eq(now),
        ))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        if affected == 0 {
            return Err(ZoneRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Zone>, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<ZoneRow> = incidents::table
            .filter(
                incidents::is_active
                    .eq(true)
                    .and(incidents::deleted_at.is_null()),
            )
            .order(incidents::updated_at.desc())
            .select(ZoneRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(rows.into_iter().map(Zone::from).collect())
    }

    async fn list_page(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Zone>, i64), ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let total: i64 = incidents::table
            .filter(incidents::deleted_at.is_null())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;

        if total == 0 {
            return Ok((Vec::new(), 0));
        }

        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let rows: Vec<ZoneRow> = incidents::table
            .filter(incidents::deleted_at.is_null())
            .order(incidents::updated_at.desc())
            .limit(i64::from(limit))
            .offset(offset)
            .select(ZoneRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok((rows.into_iter().map(Zone::from).collect(), total))
    }
}
