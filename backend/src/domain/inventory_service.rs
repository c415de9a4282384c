//! Staff inventory management and the admin dashboard.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::ports::{CarRepository, LeadRepository};
use super::{Car, CarId, CarStatus, Error, Lead, NewCar};

/// Everything staff see on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub inventory: Vec<Car>,
    pub leads: Vec<Lead>,
}

/// Staff-only inventory management and dashboard.
#[derive(Clone)]
pub struct InventoryService {
    cars: Arc<dyn CarRepository>,
    leads: Arc<dyn LeadRepository>,
}

impl InventoryService {
    /// Build the service over the car and lead ports.
    pub fn new(cars: Arc<dyn CarRepository>, leads: Arc<dyn LeadRepository>) -> Self {
        Self { cars, leads }
    }

    /// Add a car in `transit`. Its local price is filled in by the next
    /// pricing cycle.
    pub async fn create_car(&self, car: NewCar) -> Result<Car, Error> {
        let stored = self.cars.create(&car).await?;
        info!(car_id = %stored.id, vin = %stored.vin, "car added to inventory");
        Ok(stored)
    }

    /// Staff status change. `reserved` is refused; only a booking may set it.
    pub async fn update_status(&self, id: CarId, status: CarStatus) -> Result<(), Error> {
        if !status.is_staff_assignable() {
            return Err(Error::invalid_request(
                "status `reserved` can only be set by a booking",
            ));
        }
        if self.cars.update_status(id, status).await? {
            info!(car_id = %id, %status, "car status updated");
            Ok(())
        } else {
            Err(Error::not_found("car not found"))
        }
    }

    /// Remove a car; `not_found` when it does not exist.
    pub async fn delete_car(&self, id: CarId) -> Result<(), Error> {
        if self.cars.delete(id).await? {
            info!(car_id = %id, "car removed from inventory");
            Ok(())
        } else {
            Err(Error::not_found("car not found"))
        }
    }

    /// Every car and every lead, fetched concurrently.
    pub async fn dashboard(&self) -> Result<Dashboard, Error> {
        let (inventory, leads) = tokio::try_join!(
            async { self.cars.list_all().await.map_err(Error::from) },
            async { self.leads.list_all().await.map_err(Error::from) },
        )?;
        Ok(Dashboard { inventory, leads })
    }
}
