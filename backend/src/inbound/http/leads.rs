//! Test-drive inquiries from the public site.
//!
//! ```text
//! POST /api/leads {"car_model":"Camry","name":"Aigerim","phone":"+7 700 000 0000"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{ApiResult, Error, LeadValidationError, NewLead};
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/leads`.
#[derive(Debug, Deserialize, Serialize)]
pub struct LeadRequest {
    pub car_model: String,
    pub name: String,
    pub phone: String,
}

/// Record a test-drive inquiry. No account is required.
#[post("/leads")]
pub async fn create_lead(
    state: web::Data<HttpState>,
    payload: web::Json<LeadRequest>,
) -> ApiResult<HttpResponse> {
    let LeadRequest {
        car_model,
        name,
        phone,
    } = payload.into_inner();
    let lead = NewLead::try_new(car_model, name, phone).map_err(map_lead_error)?;
    state.leads.submit(lead).await?;
    Ok(HttpResponse::Created().json(json!({ "status": "success", "message": "Inquiry received" })))
}

fn map_lead_error(err: LeadValidationError) -> Error {
    let LeadValidationError::EmptyField { field } = &err;
    let details = json!({ "field": field, "code": "required" });
    Error::invalid_request(err.to_string()).with_details(details)
}
