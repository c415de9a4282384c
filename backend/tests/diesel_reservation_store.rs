//! `DieselReservationStore` against embedded PostgreSQL.
//!
//! The in-memory store only emulates `SELECT ... FOR UPDATE`; these tests
//! drive the real row lock, the transaction bookkeeping and the staff status
//! changeset. Each test gets its own cluster and migrated database, and runs
//! its async work on a runtime owned by the test so the cluster is started
//! and torn down outside of Tokio.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dealership::domain::ports::{
    CarRepository, CarStoreError, ReservationStore, ReservationTransaction, UserRepository,
};
use dealership::domain::{
    CarId, CarStatus, NewCar, ReservationError, ReservationService, Role, UserId, Username,
};
use dealership::outbound::persistence::{
    DbPool, DieselCarRepository, DieselReservationStore, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};
use futures_util::future::join_all;
use pg_embedded_setup_unpriv::{TemporaryDatabase, TestCluster};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use uuid::Uuid;

#[path = "support/pg_embed.rs"]
mod pg_embed;

use pg_embed::{handle_cluster_setup_failure, test_cluster};

const BUYERS: usize = 8;
const POOL_SIZE: u32 = 10;

// Field order is drop order: connections close before the database goes.
struct PgWorld {
    pool: DbPool,
    runtime: Runtime,
    _database: TemporaryDatabase,
    _cluster: TestCluster,
}

impl PgWorld {
    fn cars(&self) -> DieselCarRepository {
        DieselCarRepository::new(self.pool.clone())
    }

    fn store(&self) -> DieselReservationStore {
        DieselReservationStore::new(self.pool.clone())
    }

    fn service(&self) -> ReservationService {
        ReservationService::new(Arc::new(self.store()), Duration::from_secs(5))
    }

    async fn buyer(&self, name: &str) -> UserId {
        DieselUserRepository::new(self.pool.clone())
            .create(&Username::new(name).expect("username"), "hash", Role::User)
            .await
            .expect("insert user")
            .id
    }

    async fn available_car(&self) -> CarId {
        let cars = self.cars();
        let draft = NewCar::try_new(
            format!("VIN-{}", Uuid::new_v4()),
            "Toyota",
            "Camry",
            20_000.0,
            None,
        )
        .expect("valid car");
        let car = cars.create(&draft).await.expect("insert car");
        assert!(cars.update_status(car.id, CarStatus::Available).await.expect("status"));
        car.id
    }
}

fn setup() -> Result<PgWorld, String> {
    let cluster = test_cluster()?;
    let database = cluster
        .temporary_database(format!("reservations_{}", Uuid::new_v4().simple()).as_str())
        .map_err(|err| format!("{err:?}"))?;
    let url = database.url().to_owned();
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let pool = runtime.block_on(async {
        run_pending_migrations(&url)
            .await
            .map_err(|err| err.to_string())?;
        DbPool::new(PoolConfig::new(url.as_str()).with_max_size(POOL_SIZE))
            .await
            .map_err(|err| err.to_string())
    })?;
    Ok(PgWorld {
        pool,
        runtime,
        _database: database,
        _cluster: cluster,
    })
}

#[fixture]
fn pg_world() -> Option<PgWorld> {
    match setup() {
        Ok(world) => Some(world),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn concurrent_bookings_leave_one_owner(pg_world: Option<PgWorld>) {
    let Some(world) = pg_world else { return };
    world.runtime.block_on(async {
        let car = world.available_car().await;
        let mut buyers = Vec::with_capacity(BUYERS);
        for index in 0..BUYERS {
            buyers.push(world.buyer(&format!("buyer{index}")).await);
        }
        let service = world.service();

        let outcomes = join_all(buyers.iter().map(|buyer| service.book_car(car, *buyer))).await;

        let winners: Vec<UserId> = buyers
            .iter()
            .zip(&outcomes)
            .filter(|(_, outcome)| outcome.is_ok())
            .map(|(buyer, _)| *buyer)
            .collect();
        assert_eq!(winners.len(), 1, "outcomes: {outcomes:?}");
        assert!(outcomes.iter().filter(|o| o.is_err()).all(|o| matches!(
            o,
            Err(ReservationError::NotAvailable {
                status: CarStatus::Reserved
            })
        )));
        let stored = world.cars().find_by_id(car).await.expect("read").expect("car");
        assert_eq!(stored.status, CarStatus::Reserved);
        assert_eq!(stored.reserved_by, winners.first().copied());
    });
}

#[rstest]
fn rollback_after_commit_changes_nothing(pg_world: Option<PgWorld>) {
    let Some(world) = pg_world else { return };
    world.runtime.block_on(async {
        let car = world.available_car().await;
        let buyer = world.buyer("alice").await;
        let mut tx = world.store().begin().await.expect("begin");

        assert_eq!(
            tx.lock_car_status(car).await.expect("lock"),
            Some(CarStatus::Available)
        );
        tx.mark_reserved(car, buyer).await.expect("mark");
        tx.commit().await.expect("commit");
        tx.rollback().await.expect("rollback after commit");

        let stored = world.cars().find_by_id(car).await.expect("read").expect("car");
        assert_eq!(stored.status, CarStatus::Reserved);
        assert_eq!(stored.reserved_by, Some(buyer));
    });
}

#[rstest]
fn rollback_discards_the_reservation(pg_world: Option<PgWorld>) {
    let Some(world) = pg_world else { return };
    world.runtime.block_on(async {
        let car = world.available_car().await;
        let buyer = world.buyer("bob").await;
        let mut tx = world.store().begin().await.expect("begin");
        tx.lock_car_status(car).await.expect("lock");
        tx.mark_reserved(car, buyer).await.expect("mark");

        tx.rollback().await.expect("rollback");

        let stored = world.cars().find_by_id(car).await.expect("read").expect("car");
        assert_eq!(stored.status, CarStatus::Available);
        assert_eq!(stored.reserved_by, None);
    });
}

#[rstest]
fn locking_an_unknown_car_finds_nothing(pg_world: Option<PgWorld>) {
    let Some(world) = pg_world else { return };
    world.runtime.block_on(async {
        let outcome = world.service().book_car(CarId::random(), UserId::random()).await;
        assert_eq!(outcome, Err(ReservationError::NotFound));
    });
}

#[rstest]
fn staff_status_change_clears_reservation_owner(pg_world: Option<PgWorld>) {
    let Some(world) = pg_world else { return };
    world.runtime.block_on(async {
        let car = world.available_car().await;
        let buyer = world.buyer("carol").await;
        world.service().book_car(car, buyer).await.expect("booked");

        assert!(world.cars().update_status(car, CarStatus::Sold).await.expect("update"));

        let stored = world.cars().find_by_id(car).await.expect("read").expect("car");
        assert_eq!(stored.status, CarStatus::Sold);
        assert_eq!(stored.reserved_by, None);
    });
}

#[rstest]
fn contended_row_lock_gives_up_inside_postgres(pg_world: Option<PgWorld>) {
    let Some(world) = pg_world else { return };
    world.runtime.block_on(async {
        let car = world.available_car().await;
        let buyer = world.buyer("dave").await;
        let mut holder = world.store().begin().await.expect("begin holder");
        holder.lock_car_status(car).await.expect("hold lock");

        let impatient = ReservationService::new(
            Arc::new(world.store().with_lock_timeout(Duration::from_millis(200))),
            Duration::from_secs(10),
        );
        let started = Instant::now();
        let outcome = impatient.book_car(car, buyer).await;

        assert!(
            matches!(
                &outcome,
                Err(ReservationError::StoreFailure(CarStoreError::Timeout { .. }))
            ),
            "unexpected outcome: {outcome:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(5));

        holder.rollback().await.expect("release holder");
        world.service().book_car(car, buyer).await.expect("booked once free");
    });
}
