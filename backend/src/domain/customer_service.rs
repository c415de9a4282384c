//! Customer-facing use cases: catalog browsing and test-drive booking.

use std::sync::Arc;

use tracing::debug;

use super::ports::CarRepository;
use super::reservation::ReservationService;
use super::{CarDetails, CarId, Error, PublicCar, UserId};

/// Use cases open to anonymous and signed-in customers.
#[derive(Clone)]
pub struct CustomerService {
    cars: Arc<dyn CarRepository>,
    reservations: ReservationService,
}

impl CustomerService {
    /// Combine the car port with the reservation core.
    pub fn new(cars: Arc<dyn CarRepository>, reservations: ReservationService) -> Self {
        Self { cars, reservations }
    }

    /// Cars customers can book, without VIN or local price.
    pub async fn catalog(&self) -> Result<Vec<PublicCar>, Error> {
        let cars = self.cars.list_catalog().await?;
        Ok(cars.iter().map(super::Car::to_public).collect())
    }

    /// One car with its current KZT price. Any status is visible.
    pub async fn car_details(&self, id: CarId) -> Result<CarDetails, Error> {
        self.cars
            .find_by_id(id)
            .await?
            .map(|car| car.to_details())
            .ok_or_else(|| Error::not_found("car not found"))
    }

    /// Reserve a car for a test drive.
    ///
    /// The unlocked pre-check only short-circuits obvious refusals; the
    /// reservation transaction repeats the check under the row lock.
    pub async fn book_test_drive(&self, car_id: CarId, user_id: UserId) -> Result<(), Error> {
        let car = self
            .cars
            .find_by_id(car_id)
            .await?
            .ok_or_else(|| Error::not_found("car not found"))?;
        if !car.status.is_reservable() {
            debug!(%car_id, status = %car.status, "booking refused by pre-check");
            return Err(Error::conflict("car is not available for booking"));
        }
        self.reservations.book_car(car_id, user_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::DEFAULT_STORE_TIMEOUT;
    use crate::domain::{CarStatus, ErrorCode};
    use crate::test_support::InMemoryCarStore;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> InMemoryCarStore {
        InMemoryCarStore::new()
    }

    fn service(store: &InMemoryCarStore) -> CustomerService {
        let shared = Arc::new(store.clone());
        CustomerService::new(
            shared.clone(),
            ReservationService::new(shared, DEFAULT_STORE_TIMEOUT),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn catalog_lists_only_bookable_cars(store: InMemoryCarStore) {
        let shown = store.seed(CarStatus::Available, 1.0, 1.0);
        let transit = store.seed(CarStatus::Transit, 1.0, 1.0);
        store.seed(CarStatus::Sold, 1.0, 1.0);
        store.seed(CarStatus::Reserved, 1.0, 1.0);

        let catalog = service(&store).catalog().await.expect("catalog");
        let mut ids: Vec<_> = catalog.iter().map(|car| car.id).collect();
        ids.sort();
        let mut expected = vec![shown, transit];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn details_of_missing_car_is_not_found(store: InMemoryCarStore) {
        let err = service(&store)
            .car_details(CarId::random())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn booking_reserves_car(store: InMemoryCarStore) {
        let car = store.seed(CarStatus::Transit, 1.0, 1.0);
        let user = UserId::random();

        service(&store)
            .book_test_drive(car, user)
            .await
            .expect("booked");

        assert_eq!(store.car(car).and_then(|c| c.reserved_by), Some(user));
    }

    #[rstest]
    #[tokio::test]
    async fn second_booking_conflicts(store: InMemoryCarStore) {
        let car = store.seed(CarStatus::Available, 1.0, 1.0);
        let service = service(&store);
        service
            .book_test_drive(car, UserId::random())
            .await
            .expect("first booking");

        let err = service
            .book_test_drive(car, UserId::random())
            .await
            .expect_err("second booking");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(store.commit_count(), 1);
    }
}
