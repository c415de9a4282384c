//! Staff inventory endpoints. Every handler requires an admin or manager
//! bearer token.
//!
//! ```text
//! GET    /api/admin/dashboard
//! POST   /api/admin/cars         {"vin":"...","model":"Camry","price":20000}
//! PUT    /api/admin/cars/status  {"id":"<uuid>","status":"sold"}
//! DELETE /api/admin/cars/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    ApiResult, CarId, CarStatus, CarValidationError, Dashboard, Error, NewCar,
};
use crate::inbound::http::auth::StaffUser;
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/admin/cars`.
#[derive(Debug, Deserialize, Serialize)]
pub struct NewCarRequest {
    pub vin: String,
    #[serde(default)]
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// USD list price.
    pub price: f64,
}

/// Body of `PUT /api/admin/cars/status`.
#[derive(Debug, Deserialize, Serialize)]
pub struct StatusRequest {
    pub id: CarId,
    pub status: String,
}

/// Full inventory and all leads for staff.
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    _staff: StaffUser,
) -> ApiResult<web::Json<Dashboard>> {
    Ok(web::Json(state.inventory.dashboard().await?))
}

/// Add a car in `transit`.
#[post("/cars")]
pub async fn create_car(
    state: web::Data<HttpState>,
    _staff: StaffUser,
    payload: web::Json<NewCarRequest>,
) -> ApiResult<HttpResponse> {
    let NewCarRequest {
        vin,
        make,
        model,
        image_url,
        price,
    } = payload.into_inner();
    let car = NewCar::try_new(vin, make, model, price, image_url).map_err(map_car_error)?;
    let stored = state.inventory.create_car(car).await?;
    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "Car added to inventory",
        "id": stored.id,
    })))
}

/// Move a car between `available`, `transit` and `sold`.
#[put("/cars/status")]
pub async fn update_car_status(
    state: web::Data<HttpState>,
    _staff: StaffUser,
    payload: web::Json<StatusRequest>,
) -> ApiResult<HttpResponse> {
    let StatusRequest { id, status } = payload.into_inner();
    let status: CarStatus = status.parse().map_err(map_car_error)?;
    state.inventory.update_status(id, status).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "updated" })))
}

/// Remove a car from the inventory.
#[delete("/cars/{id}")]
pub async fn delete_car(
    state: web::Data<HttpState>,
    _staff: StaffUser,
    id: web::Path<CarId>,
) -> ApiResult<HttpResponse> {
    state.inventory.delete_car(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "deleted" })))
}

fn map_car_error(err: CarValidationError) -> Error {
    let field = match &err {
        CarValidationError::InvalidId => "id",
        CarValidationError::EmptyVin => "vin",
        CarValidationError::EmptyModel => "model",
        CarValidationError::InvalidPrice => "price",
        CarValidationError::UnknownStatus(_) => "status",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestHarness, harness};
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case::user(Some(Role::User), StatusCode::FORBIDDEN)]
    #[case::anonymous(None, StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn dashboard_is_staff_only(
        harness: TestHarness,
        #[case] role: Option<Role>,
        #[case] expected: StatusCode,
    ) {
        let mut request = actix_test::TestRequest::get().uri("/api/admin/dashboard");
        if let Some(role) = role {
            let (_, bearer) = harness.bearer("caller", role);
            request = request.insert_header((header::AUTHORIZATION, bearer));
        }
        let app = actix_test::init_service(harness.app()).await;

        let response = actix_test::call_service(&app, request.to_request()).await;

        assert_eq!(response.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn manager_creates_car_in_transit(harness: TestHarness) {
        let (_, bearer) = harness.bearer("manager", Role::Manager);
        let app = actix_test::init_service(harness.app()).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/admin/cars")
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({ "vin": "JT1234", "model": "Camry", "price": 20000.0 }))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let request = actix_test::TestRequest::get()
            .uri("/api/admin/dashboard")
            .insert_header((header::AUTHORIZATION, bearer))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        let inventory = body
            .get("inventory")
            .and_then(Value::as_array)
            .expect("inventory");
        let car = inventory.first().expect("created car");
        assert_eq!(car.get("status").and_then(Value::as_str), Some("transit"));
        assert_eq!(car.get("vin").and_then(Value::as_str), Some("JT1234"));
    }

    #[rstest]
    #[case::non_positive_price(json!({ "vin": "JT1", "model": "Camry", "price": 0.0 }))]
    #[case::blank_model(json!({ "vin": "JT1", "model": " ", "price": 1.0 }))]
    #[actix_web::test]
    async fn invalid_car_is_rejected(harness: TestHarness, #[case] body: Value) {
        let (_, bearer) = harness.bearer("admin", Role::Admin);
        let app = actix_test::init_service(harness.app()).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/admin/cars")
            .insert_header((header::AUTHORIZATION, bearer))
            .set_json(body)
            .to_request();

        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case("sold", StatusCode::OK)]
    #[case("reserved", StatusCode::BAD_REQUEST)]
    #[case("scrapped", StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn status_updates(
        harness: TestHarness,
        #[case] status: &str,
        #[case] expected: StatusCode,
    ) {
        let car = harness.cars.seed(CarStatus::Available, 1.0, 1.0);
        let (_, bearer) = harness.bearer("admin", Role::Admin);
        let app = actix_test::init_service(harness.app()).await;
        let request = actix_test::TestRequest::put()
            .uri("/api/admin/cars/status")
            .insert_header((header::AUTHORIZATION, bearer))
            .set_json(json!({ "id": car, "status": status }))
            .to_request();

        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), expected);
        let stored = harness.cars.car(car).map(|c| c.status);
        if expected == StatusCode::OK {
            assert_eq!(stored, Some(CarStatus::Sold));
        } else {
            assert_eq!(stored, Some(CarStatus::Available));
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn delete_removes_car_then_reports_missing(harness: TestHarness) {
        let car = harness.cars.seed(CarStatus::Sold, 1.0, 1.0);
        let (_, bearer) = harness.bearer("admin", Role::Admin);
        let app = actix_test::init_service(harness.app()).await;
        let remove = || {
            actix_test::TestRequest::delete()
                .uri(&format!("/api/admin/cars/{car}"))
                .insert_header((header::AUTHORIZATION, bearer.clone()))
                .to_request()
        };

        assert_eq!(
            actix_test::call_service(&app, remove()).await.status(),
            StatusCode::OK
        );
        assert!(harness.cars.car(car).is_none());
        assert_eq!(
            actix_test::call_service(&app, remove()).await.status(),
            StatusCode::NOT_FOUND
        );
    }
}
