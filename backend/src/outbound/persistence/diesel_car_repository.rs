//! PostgreSQL-backed car repositories using Diesel ORM.
//!
//! One adapter serves both the staff/catalog port and the pricing worker's
//! port; they share the `cars` table and the connection pool.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CarRepository, CarStoreError, RepricingCandidate, RepricingRepository};
use crate::domain::{Car, CarId, CarStatus, NewCar};

use super::error_mapping::{DieselErrorKinds, map_diesel_error, map_pool_error};
use super::models::{CarRow, CarStatusUpdate, NewCarRow, RepricingRow};
use super::pool::{DbPool, PoolError};
use super::schema::cars;

/// Statuses shown in the catalog and recomputed by the pricing worker.
const ON_MARKET: [&str; 2] = [CarStatus::Available.as_str(), CarStatus::Transit.as_str()];

const CAR_ERROR_KINDS: DieselErrorKinds<CarStoreError> = DieselErrorKinds {
    query: CarStoreError::query,
    connection: CarStoreError::connection,
    duplicate: Some(CarStoreError::duplicate),
};

pub(super) fn map_car_pool_error(error: PoolError) -> CarStoreError {
    map_pool_error(error, CarStoreError::connection)
}

pub(super) fn map_car_diesel_error(error: diesel::result::Error) -> CarStoreError {
    map_diesel_error(error, &CAR_ERROR_KINDS)
}

fn rows_to_cars(rows: Vec<CarRow>) -> Result<Vec<Car>, CarStoreError> {
    rows.into_iter()
        .map(|row| Car::try_from(row).map_err(CarStoreError::query))
        .collect()
}

/// Diesel-backed implementation of the car ports.
#[derive(Clone)]
pub struct DieselCarRepository {
    pool: DbPool,
}

impl DieselCarRepository {
    /// Build the repository over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarRepository for DieselCarRepository {
    async fn list_catalog(&self) -> Result<Vec<Car>, CarStoreError> {
        let mut conn = self.pool.get().await.map_err(map_car_pool_error)?;
        let rows: Vec<CarRow> = cars::table
            .filter(cars::status.eq_any(ON_MARKET))
            .order(cars::created_at.desc())
            .select(CarRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_car_diesel_error)?;
        rows_to_cars(rows)
    }

    async fn list_all(&self) -> Result<Vec<Car>, CarStoreError> {
        let mut conn = self.pool.get().await.map_err(map_car_pool_error)?;
        let rows: Vec<CarRow> = cars::table
            .order(cars::created_at.desc())
            .select(CarRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_car_diesel_error)?;
        rows_to_cars(rows)
    }

    async fn find_by_id(&self, id: CarId) -> Result<Option<Car>, CarStoreError> {
        let mut conn = self.pool.get().await.map_err(map_car_pool_error)?;
        let row: Option<CarRow> = cars::table
            .find(*id.as_uuid())
            .select(CarRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_car_diesel_error)?;
        row.map(|row| Car::try_from(row).map_err(CarStoreError::query))
            .transpose()
    }

    async fn create(&self, car: &NewCar) -> Result<Car, CarStoreError> {
        let mut conn = self.pool.get().await.map_err(map_car_pool_error)?;
        let row = NewCarRow {
            id: Uuid::new_v4(),
            vin: car.vin().as_str(),
            make: car.make(),
            model: car.model(),
            price_usd: car.price_usd(),
            price_kzt: 0.0,
            status: CarStatus::Transit.as_str(),
            image_url: car.image_url(),
        };
        let stored: CarRow = diesel::insert_into(cars::table)
            .values(&row)
            .returning(CarRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_car_diesel_error)?;
        Car::try_from(stored).map_err(CarStoreError::query)
    }

    async fn update_status(&self, id: CarId, status: CarStatus) -> Result<bool, CarStoreError> {
        let mut conn = self.pool.get().await.map_err(map_car_pool_error)?;
        let changes = CarStatusUpdate {
            status: status.as_str(),
            reserved_by: None,
        };
        let updated = diesel::update(cars::table.find(*id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_car_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: CarId) -> Result<bool, CarStoreError> {
        let mut conn = self.pool.get().await.map_err(map_car_pool_error)?;
        let deleted = diesel::delete(cars::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_car_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl RepricingRepository for DieselCarRepository {
    async fn eligible_cars(&self) -> Result<Vec<RepricingCandidate>, CarStoreError> {
        let mut conn = self.pool.get().await.map_err(map_car_pool_error)?;
        let rows: Vec<RepricingRow> = cars::table
            .filter(cars::status.eq_any(ON_MARKET))
            .select(RepricingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_car_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| RepricingCandidate {
                id: CarId::from_uuid(row.id),
                price_usd: row.price_usd,
                price_kzt: row.price_kzt,
            })
            .collect())
    }

    async fn set_price(&self, id: CarId, price_kzt: f64) -> Result<(), CarStoreError> {
        let mut conn = self.pool.get().await.map_err(map_car_pool_error)?;
        diesel::update(cars::table.find(*id.as_uuid()))
            .set(cars::price_kzt.eq(price_kzt))
            .execute(&mut conn)
            .await
            .map_err(map_car_diesel_error)?;
        Ok(())
    }
}
