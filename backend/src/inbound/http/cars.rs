//! Public catalog and test-drive booking.
//!
//! ```text
//! GET /api/cars
//! GET /api/cars/{id}
//! POST /api/cars/{id}/book        (Authorization: Bearer <token>)
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde_json::json;
use tracing::info;

use crate::domain::{ApiResult, CarDetails, CarId, PublicCar};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;

/// Cars customers can book, without VIN or local price.
#[get("/cars")]
pub async fn list_cars(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<PublicCar>>> {
    Ok(web::Json(state.customers.catalog().await?))
}

/// One car with its current KZT price; VIN and reservation owner stay
/// hidden.
#[get("/cars/{id}")]
pub async fn get_car(
    state: web::Data<HttpState>,
    id: web::Path<CarId>,
) -> ApiResult<web::Json<CarDetails>> {
    Ok(web::Json(state.customers.car_details(id.into_inner()).await?))
}

/// Reserve the car for the caller. Concurrent bookings of one car yield a
/// single success; the rest get `409`.
#[post("/cars/{id}/book")]
pub async fn book_car(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    id: web::Path<CarId>,
) -> ApiResult<HttpResponse> {
    let car_id = id.into_inner();
    state.customers.book_test_drive(car_id, user.id).await?;
    info!(%car_id, user_id = %user.id, "test drive booked");
    Ok(HttpResponse::Ok().json(json!({ "status": "reserved", "car_id": car_id })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CarStatus, Role, TRACE_ID_HEADER};
    use crate::inbound::http::test_utils::{TestHarness, harness};
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[actix_web::test]
    async fn catalog_hides_private_fields(harness: TestHarness) {
        harness.cars.seed(CarStatus::Available, 20_000.0, 10_500_000.0);
        harness.cars.seed(CarStatus::Sold, 20_000.0, 10_500_000.0);
        let app = actix_test::init_service(harness.app()).await;

        let request = actix_test::TestRequest::get().uri("/api/cars").to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        let cars = body.as_array().expect("array");
        assert_eq!(cars.len(), 1);
        let car = cars.first().expect("one car");
        assert!(car.get("vin").is_none());
        assert!(car.get("price_kzt").is_none());
        assert_eq!(car.get("status").and_then(Value::as_str), Some("available"));
    }

    #[rstest]
    #[actix_web::test]
    async fn car_details_include_local_price(harness: TestHarness) {
        let car = harness.cars.seed(CarStatus::Available, 20_000.0, 10_520_000.0);
        let app = actix_test::init_service(harness.app()).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/cars/{car}"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("price_kzt").and_then(Value::as_f64), Some(10_520_000.0));
        assert_eq!(body.get("price_usd").and_then(Value::as_f64), Some(20_000.0));
        assert!(body.get("vin").is_none());
        assert!(body.get("reserved_by").is_none());
    }

    #[rstest]
    #[case::unknown(CarId::random().to_string(), StatusCode::NOT_FOUND)]
    #[case::malformed("not-a-uuid".to_owned(), StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn car_details_errors(
        harness: TestHarness,
        #[case] id: String,
        #[case] status: StatusCode,
    ) {
        let app = actix_test::init_service(harness.app()).await;
        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/cars/{id}"))
            .to_request();

        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), status);
    }

    #[rstest]
    #[actix_web::test]
    async fn booking_reserves_once_then_conflicts(harness: TestHarness) {
        let car = harness.cars.seed(CarStatus::Available, 20_000.0, 0.0);
        let (user, bearer) = harness.bearer("alice", Role::User);
        let app = actix_test::init_service(harness.app()).await;
        let book = || {
            actix_test::TestRequest::post()
                .uri(&format!("/api/cars/{car}/book"))
                .insert_header((header::AUTHORIZATION, bearer.clone()))
                .to_request()
        };

        let first = actix_test::call_service(&app, book()).await;
        assert_eq!(first.status(), StatusCode::OK);

        let second = actix_test::call_service(&app, book()).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert!(second.headers().contains_key(TRACE_ID_HEADER));

        let stored = harness.cars.car(car).expect("car");
        assert_eq!(stored.status, CarStatus::Reserved);
        assert_eq!(stored.reserved_by, Some(user.id));
    }

    #[rstest]
    #[actix_web::test]
    async fn booking_requires_token(harness: TestHarness) {
        let car = harness.cars.seed(CarStatus::Available, 20_000.0, 0.0);
        let app = actix_test::init_service(harness.app()).await;
        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/cars/{car}/book"))
            .to_request();

        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(harness.cars.car(car).map(|c| c.status), Some(CarStatus::Available));
    }
}
