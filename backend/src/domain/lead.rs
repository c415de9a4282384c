//! Customer inquiries captured from the public site.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Inquiry type recorded for test-drive requests.
pub const INQUIRY_TEST_DRIVE: &str = "test_drive";
/// Status assigned to every new lead.
pub const LEAD_STATUS_NEW: &str = "new";

/// Validation failures for lead input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeadValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}

/// Stored lead. Leads are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    pub id: Uuid,
    pub car_model: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub inquiry_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Validated lead submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    car_model: String,
    customer_name: String,
    customer_phone: String,
}

impl NewLead {
    /// Validate a test-drive inquiry; every field is required.
    pub fn try_new(
        car_model: impl Into<String>,
        customer_name: impl Into<String>,
        customer_phone: impl Into<String>,
    ) -> Result<Self, LeadValidationError> {
        Ok(Self {
            car_model: required("car_model", car_model.into())?,
            customer_name: required("name", customer_name.into())?,
            customer_phone: required("phone", customer_phone.into())?,
        })
    }

    pub fn car_model(&self) -> &str {
        &self.car_model
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn customer_phone(&self) -> &str {
        &self.customer_phone
    }

    pub fn inquiry_type(&self) -> &'static str {
        INQUIRY_TEST_DRIVE
    }
}

fn required(field: &'static str, value: String) -> Result<String, LeadValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LeadValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}
