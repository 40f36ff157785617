//! Diesel row structs internal to the persistence layer.
//!
//! Rows translate to and from domain types at the repository boundary; they
//! never leave this module tree.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::webhook::WebhookRecord;
use crate::domain::zone::Zone;

use super::schema::{checks, incidents, webhooks};

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = incidents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ZoneRow {
    pub id: i32,
    pub name: String,
    pub descr: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<ZoneRow> for Zone {
    fn from(row: ZoneRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            descr: row.descr,
            latitude: row.latitude,
            longitude: row.longitude,
            radius_m: row.radius_m,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = incidents)]
pub struct NewZoneRow<'a> {
    pub name: &'a str,
    pub descr: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub is_active: bool,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = incidents)]
pub struct ZoneChangeset<'a> {
    pub name: &'a str,
    pub descr: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = checks)]
pub struct NewCheckRow<'a> {
    pub user_id: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub has_alert: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = webhooks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WebhookRow {
    pub id: i32,
    pub check_id: i32,
    pub state: String,
    pub retry_cnt: i32,
    pub payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scheduled_at: DateTime<Utc>,
}

impl WebhookRow {
    /// Convert into a domain record, rejecting unknown state strings.
    pub fn into_record(self) -> Result<WebhookRecord, String> {
        let state = self
            .state
            .parse()
            .map_err(|err| format!("stored webhook state is invalid: {err}"))?;
        Ok(WebhookRecord {
            id: self.id,
            check_id: self.check_id,
            state,
            retry_cnt: self.retry_cnt,
            payload: self.payload,
            created_at: self.created_at,
            updated_at: self.updated_at,
            scheduled_at: self.scheduled_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = webhooks)]
pub struct NewWebhookRow<'a> {
    pub check_id: i32,
    pub state: &'a str,
    pub retry_cnt: i32,
    pub payload: &'a [u8],
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scheduled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use crate::domain::webhook::WebhookState;

    use super::*;

    fn row(state: &str) -> WebhookRow {
        let now = Utc::now();
        WebhookRow {
            id: 1,
            check_id: 2,
            state: state.to_owned(),
            retry_cnt: 0,
            payload: Vec::new(),
            created_at: now,
            updated_at: now,
            scheduled_at: now,
        }
    }

    #[test]
    fn known_state_converts() {
        let record = row("processing").into_record().expect("state is known");
        assert_eq!(record.state, WebhookState::Processing);
    }

    #[test]
    fn unknown_state_is_rejected() {
        let error = row("archived").into_record().expect_err("must reject");
        assert!(error.contains("archived"));
    }
}
