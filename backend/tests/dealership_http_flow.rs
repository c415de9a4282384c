//! End-to-end HTTP flows over the in-memory adapters: account creation,
//! token login, booking races and staff-only inventory management.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::{StatusCode, header};
use actix_web::middleware::from_fn;
use actix_web::{App, test as actix_test, web};
use chrono::TimeDelta;
use dealership::domain::ports::UserRepository;
use dealership::domain::{CarStatus, Role, TRACE_ID_HEADER, Username};
use dealership::inbound::http::auth::TokenIssuer;
use dealership::inbound::http::configure_api;
use dealership::inbound::http::state::{HttpState, HttpStatePorts};
use dealership::middleware::trace_requests;
use dealership::test_support::{
    InMemoryCarStore, InMemoryLeadRepository, InMemoryUserRepository, PlainPasswordHasher,
};
use futures_util::future::join_all;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const SECRET: &str = "integration-secret-integration-secret";

struct World {
    cars: InMemoryCarStore,
    users: Arc<InMemoryUserRepository>,
    state: web::Data<HttpState>,
    issuer: web::Data<TokenIssuer>,
}

#[fixture]
fn world() -> World {
    let cars = InMemoryCarStore::new();
    let users = Arc::new(InMemoryUserRepository::new());
    let state = HttpState::new(HttpStatePorts {
        cars: Arc::new(cars.clone()),
        reservations: Arc::new(cars.clone()),
        leads: Arc::new(InMemoryLeadRepository::new()),
        users: users.clone(),
        hasher: Arc::new(PlainPasswordHasher),
        store_timeout: Duration::from_secs(5),
    });
    let issuer = TokenIssuer::new(SECRET, TimeDelta::hours(1)).expect("issuer");
    World {
        cars,
        users,
        state: web::Data::new(state),
        issuer: web::Data::new(issuer),
    }
}

macro_rules! app {
    ($world:expr) => {
        actix_test::init_service(
            App::new()
                .app_data($world.state.clone())
                .app_data($world.issuer.clone())
                .wrap(from_fn(trace_requests))
                .configure(configure_api),
        )
        .await
    };
}

macro_rules! login {
    ($app:expr, $username:expr, $password:expr) => {{
        let request = actix_test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "username": $username, "password": $password }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json($app, request).await;
        let token = body.get("token").and_then(Value::as_str).expect("token");
        format!("Bearer {token}")
    }};
}

#[rstest]
#[actix_web::test]
async fn customer_registers_logs_in_and_books(world: World) {
    let car = world.cars.seed(CarStatus::Transit, 20_000.0, 0.0);
    let app = app!(world);

    let register = actix_test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({ "username": "alice", "password": "secret1" }))
        .to_request();
    let response = actix_test::call_service(&app, register).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key(TRACE_ID_HEADER));

    let bearer = login!(&app, "alice", "secret1");

    let book = actix_test::TestRequest::post()
        .uri(&format!("/api/cars/{car}/book"))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, book).await.status(),
        StatusCode::OK
    );

    let alice = world
        .users
        .find_by_username(&Username::new("alice").expect("username"))
        .await
        .expect("lookup")
        .expect("registered");
    let stored = world.cars.car(car).expect("car");
    assert_eq!(stored.status, CarStatus::Reserved);
    assert_eq!(stored.reserved_by, Some(alice.id));

    let dashboard = actix_test::TestRequest::get()
        .uri("/api/admin/dashboard")
        .insert_header((header::AUTHORIZATION, bearer))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, dashboard).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[rstest]
#[actix_web::test]
async fn concurrent_bookings_have_a_single_winner(world: World) {
    let car = world.cars.seed(CarStatus::Available, 20_000.0, 0.0);
    for index in 0..8 {
        world
            .users
            .create(
                &Username::new(format!("buyer{index}")).expect("username"),
                "plain$secret1",
                Role::User,
            )
            .await
            .expect("user");
    }
    let app = app!(world);
    let mut bearers = Vec::new();
    for index in 0..8 {
        bearers.push(login!(&app, format!("buyer{index}"), "secret1"));
    }

    let statuses = join_all(bearers.into_iter().map(|bearer| {
        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/cars/{car}/book"))
            .insert_header((header::AUTHORIZATION, bearer))
            .to_request();
        let app = &app;
        async move { actix_test::call_service(app, request).await.status() }
    }))
    .await;

    let winners = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let conflicts = statuses
        .iter()
        .filter(|s| **s == StatusCode::CONFLICT)
        .count();
    assert_eq!((winners, conflicts), (1, 7));
    assert_eq!(
        world.cars.car(car).map(|c| c.status),
        Some(CarStatus::Reserved)
    );
}

#[rstest]
#[actix_web::test]
async fn admin_moves_car_to_market_and_it_appears_in_catalog(world: World) {
    world
        .users
        .create(
            &Username::new("admin").expect("username"),
            "plain$password123",
            Role::Admin,
        )
        .await
        .expect("admin");
    let app = app!(world);
    let bearer = login!(&app, "admin", "password123");

    let create = actix_test::TestRequest::post()
        .uri("/api/admin/cars")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({ "vin": "KZ-001", "make": "Kia", "model": "K5", "price": 25000.0 }))
        .to_request();
    let created: Value = actix_test::call_and_read_body_json(&app, create).await;
    let id = created.get("id").and_then(Value::as_str).expect("id").to_owned();

    let update = actix_test::TestRequest::put()
        .uri("/api/admin/cars/status")
        .insert_header((header::AUTHORIZATION, bearer))
        .set_json(json!({ "id": id, "status": "available" }))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, update).await.status(),
        StatusCode::OK
    );

    let catalog = actix_test::TestRequest::get().uri("/api/cars").to_request();
    let cars: Value = actix_test::call_and_read_body_json(&app, catalog).await;
    let listed = cars.as_array().expect("array");
    assert_eq!(listed.len(), 1);
    let car = listed.first().expect("car");
    assert_eq!(car.get("id").and_then(Value::as_str), Some(id.as_str()));
    assert_eq!(car.get("status").and_then(Value::as_str), Some("available"));
}
