//! PostgreSQL-backed `LeadRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{LeadRepository, LeadRepositoryError};
use crate::domain::{LEAD_STATUS_NEW, Lead, NewLead};

use super::error_mapping::{DieselErrorKinds, map_diesel_error, map_pool_error};
use super::models::LeadRow;
use super::pool::{DbPool, PoolError};
use super::schema::leads;

const LEAD_ERROR_KINDS: DieselErrorKinds<LeadRepositoryError> = DieselErrorKinds {
    query: LeadRepositoryError::query,
    connection: LeadRepositoryError::connection,
    duplicate: None,
};

fn map_lead_pool_error(error: PoolError) -> LeadRepositoryError {
    map_pool_error(error, LeadRepositoryError::connection)
}

fn map_lead_diesel_error(error: diesel::result::Error) -> LeadRepositoryError {
    map_diesel_error(error, &LEAD_ERROR_KINDS)
}

/// Diesel-backed implementation of the lead repository port.
#[derive(Clone)]
pub struct DieselLeadRepository {
    pool: DbPool,
}

impl DieselLeadRepository {
    /// Build the repository over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadRepository for DieselLeadRepository {
    async fn create(&self, lead: &NewLead) -> Result<Lead, LeadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_lead_pool_error)?;
        let row = LeadRow {
            id: Uuid::new_v4(),
            car_model: lead.car_model().to_owned(),
            customer_name: lead.customer_name().to_owned(),
            customer_phone: lead.customer_phone().to_owned(),
            inquiry_type: lead.inquiry_type().to_owned(),
            status: LEAD_STATUS_NEW.to_owned(),
            created_at: Utc::now(),
        };
        let stored: LeadRow = diesel::insert_into(leads::table)
            .values(&row)
            .returning(LeadRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_lead_diesel_error)?;
        Ok(stored.into())
    }

    async fn list_all(&self) -> Result<Vec<Lead>, LeadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_lead_pool_error)?;
        let rows: Vec<LeadRow> = leads::table
            .order(leads::created_at.desc())
            .select(LeadRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_lead_diesel_error)?;
        Ok(rows.into_iter().map(Lead::from).collect())
    }
}
