//! In-memory car store implementing every car port.
//!
//! Each row carries its own async mutex standing in for the PostgreSQL row
//! lock. Reservation transactions and row writes (`UPDATE`/`DELETE`) take
//! it; plain reads do not, matching `SELECT ... FOR UPDATE` semantics.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::sync::{Mutex as RowLock, OwnedMutexGuard};

use crate::domain::ports::{
    CarRepository, CarStoreError, RepricingCandidate, RepricingRepository, ReservationStore,
    ReservationTransaction,
};
use crate::domain::{Car, CarId, CarStatus, NewCar, UserId, Vin};

struct Row {
    car: Car,
    lock: Arc<RowLock<()>>,
}

#[derive(Default)]
struct Faults {
    begin: bool,
    commit: bool,
    eligible: bool,
    price_writes: HashSet<CarId>,
}

#[derive(Default)]
struct Shared {
    rows: Mutex<BTreeMap<CarId, Row>>,
    faults: Mutex<Faults>,
    price_writes: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn row_lock(&self, id: CarId) -> Option<Arc<RowLock<()>>> {
        guard(&self.rows).get(&id).map(|row| Arc::clone(&row.lock))
    }

    /// Run `write` against the row while holding its lock.
    async fn write_row<T>(&self, id: CarId, write: impl FnOnce(&mut Car) -> T) -> Option<T> {
        let lock = self.row_lock(id)?;
        let _held = lock.lock().await;
        guard(&self.rows).get_mut(&id).map(|row| write(&mut row.car))
    }
}

/// Shared-handle in-memory store; clones observe the same rows.
#[derive(Clone, Default)]
pub struct InMemoryCarStore {
    shared: Arc<Shared>,
}

impl InMemoryCarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully specified car.
    pub fn insert(&self, car: Car) -> CarId {
        let id = car.id;
        guard(&self.shared.rows).insert(
            id,
            Row {
                car,
                lock: Arc::new(RowLock::new(())),
            },
        );
        id
    }

    /// Insert a car with the given status and prices and a generated VIN.
    ///
    /// # Panics
    /// Never in practice; the generated VIN is non-empty.
    pub fn seed(&self, status: CarStatus, price_usd: f64, price_kzt: f64) -> CarId {
        let id = CarId::random();
        let count = i64::try_from(guard(&self.shared.rows).len()).unwrap_or(i64::MAX);
        self.insert(Car {
            id,
            vin: Vin::new(format!("VIN-{id}")).unwrap_or_else(|err| panic!("seed vin: {err}")),
            make: "Toyota".to_owned(),
            model: "Camry".to_owned(),
            price_usd,
            price_kzt,
            status,
            image_url: None,
            reserved_by: None,
            created_at: Utc::now() + TimeDelta::seconds(count),
        })
    }

    /// Snapshot of the committed row.
    pub fn car(&self, id: CarId) -> Option<Car> {
        guard(&self.shared.rows).get(&id).map(|row| row.car.clone())
    }

    /// Make the next `begin` fail with a connection error.
    pub fn fail_next_begin(&self) {
        guard(&self.shared.faults).begin = true;
    }

    /// Make the next `commit` fail with a connection error.
    pub fn fail_next_commit(&self) {
        guard(&self.shared.faults).commit = true;
    }

    /// Make `eligible_cars` fail until cleared.
    pub fn fail_eligible_cars(&self, fail: bool) {
        guard(&self.shared.faults).eligible = fail;
    }

    /// Make every `set_price` for `id` fail.
    pub fn fail_price_write_for(&self, id: CarId) {
        guard(&self.shared.faults).price_writes.insert(id);
    }

    pub fn price_write_count(&self) -> usize {
        self.shared.price_writes.load(Ordering::SeqCst)
    }

    pub fn commit_count(&self) -> usize {
        self.shared.commits.load(Ordering::SeqCst)
    }

    /// Rollbacks that discarded uncommitted work.
    pub fn rollback_count(&self) -> usize {
        self.shared.rollbacks.load(Ordering::SeqCst)
    }

    fn sorted(&self, keep: impl Fn(&Car) -> bool) -> Vec<Car> {
        let mut cars: Vec<Car> = guard(&self.shared.rows)
            .values()
            .map(|row| &row.car)
            .filter(|car| keep(car))
            .cloned()
            .collect();
        cars.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        cars
    }
}

#[async_trait]
impl CarRepository for InMemoryCarStore {
    async fn list_catalog(&self) -> Result<Vec<Car>, CarStoreError> {
        Ok(self.sorted(|car| car.status.is_listed()))
    }

    async fn list_all(&self) -> Result<Vec<Car>, CarStoreError> {
        Ok(self.sorted(|_| true))
    }

    async fn find_by_id(&self, id: CarId) -> Result<Option<Car>, CarStoreError> {
        Ok(self.car(id))
    }

    async fn create(&self, car: &NewCar) -> Result<Car, CarStoreError> {
        let duplicate = guard(&self.shared.rows)
            .values()
            .any(|row| row.car.vin == *car.vin());
        if duplicate {
            return Err(CarStoreError::duplicate(format!("vin {}", car.vin())));
        }
        let stored = Car {
            id: CarId::random(),
            vin: car.vin().clone(),
            make: car.make().to_owned(),
            model: car.model().to_owned(),
            price_usd: car.price_usd(),
            price_kzt: 0.0,
            status: CarStatus::Transit,
            image_url: car.image_url().map(ToOwned::to_owned),
            reserved_by: None,
            created_at: Utc::now(),
        };
        self.insert(stored.clone());
        Ok(stored)
    }

    async fn update_status(&self, id: CarId, status: CarStatus) -> Result<bool, CarStoreError> {
        let updated = self
            .shared
            .write_row(id, |car| {
                car.status = status;
                car.reserved_by = None;
            })
            .await;
        Ok(updated.is_some())
    }

    async fn delete(&self, id: CarId) -> Result<bool, CarStoreError> {
        let Some(lock) = self.shared.row_lock(id) else {
            return Ok(false);
        };
        let _held = lock.lock().await;
        Ok(guard(&self.shared.rows).remove(&id).is_some())
    }
}

#[async_trait]
impl RepricingRepository for InMemoryCarStore {
    async fn eligible_cars(&self) -> Result<Vec<RepricingCandidate>, CarStoreError> {
        if guard(&self.shared.faults).eligible {
            return Err(CarStoreError::connection("eligible cars unavailable"));
        }
        Ok(self
            .sorted(|car| car.status.is_repriceable())
            .into_iter()
            .map(|car| RepricingCandidate {
                id: car.id,
                price_usd: car.price_usd,
                price_kzt: car.price_kzt,
            })
            .collect())
    }

    async fn set_price(&self, id: CarId, price_kzt: f64) -> Result<(), CarStoreError> {
        if guard(&self.shared.faults).price_writes.contains(&id) {
            return Err(CarStoreError::query(format!("price write rejected for {id}")));
        }
        if self
            .shared
            .write_row(id, |car| car.price_kzt = price_kzt)
            .await
            .is_some()
        {
            self.shared.price_writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for InMemoryCarStore {
    async fn begin(&self) -> Result<Box<dyn ReservationTransaction>, CarStoreError> {
        if std::mem::take(&mut guard(&self.shared.faults).begin) {
            return Err(CarStoreError::connection("could not open transaction"));
        }
        Ok(Box::new(InMemoryTransaction {
            shared: Arc::clone(&self.shared),
            held: None,
            pending: None,
            finished: false,
        }))
    }
}

struct InMemoryTransaction {
    shared: Arc<Shared>,
    held: Option<(CarId, OwnedMutexGuard<()>)>,
    pending: Option<UserId>,
    finished: bool,
}

#[async_trait]
impl ReservationTransaction for InMemoryTransaction {
    async fn lock_car_status(&mut self, car_id: CarId) -> Result<Option<CarStatus>, CarStoreError> {
        let Some(lock) = self.shared.row_lock(car_id) else {
            return Ok(None);
        };
        let held = lock.lock_owned().await;
        // Widen the read-modify-write window so racing callers interleave.
        tokio::task::yield_now().await;
        let status = guard(&self.shared.rows).get(&car_id).map(|row| row.car.status);
        if status.is_some() {
            self.held = Some((car_id, held));
        }
        Ok(status)
    }

    async fn mark_reserved(&mut self, car_id: CarId, user_id: UserId) -> Result<(), CarStoreError> {
        match &self.held {
            Some((locked, _)) if *locked == car_id => {
                self.pending = Some(user_id);
                Ok(())
            }
            _ => Err(CarStoreError::query("row is not locked by this transaction")),
        }
    }

    async fn commit(&mut self) -> Result<(), CarStoreError> {
        if std::mem::take(&mut guard(&self.shared.faults).commit) {
            return Err(CarStoreError::connection("connection lost during commit"));
        }
        if let (Some((car_id, _)), Some(user_id)) = (&self.held, self.pending.take()) {
            if let Some(row) = guard(&self.shared.rows).get_mut(car_id) {
                row.car.status = CarStatus::Reserved;
                row.car.reserved_by = Some(user_id);
            }
        }
        self.held = None;
        self.finished = true;
        self.shared.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), CarStoreError> {
        if !self.finished {
            self.finished = true;
            self.pending = None;
            self.held = None;
            self.shared.rollbacks.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
