//! Lead capture.

use std::sync::Arc;

use tracing::info;

use super::ports::LeadRepository;
use super::{Error, Lead, NewLead};

/// Captures test-drive inquiries.
#[derive(Clone)]
pub struct LeadService {
    leads: Arc<dyn LeadRepository>,
}

impl LeadService {
    /// Build the service over the lead port.
    pub fn new(leads: Arc<dyn LeadRepository>) -> Self {
        Self { leads }
    }

    /// Store a validated inquiry with status `new`.
    pub async fn submit(&self, lead: NewLead) -> Result<Lead, Error> {
        let stored = self.leads.create(&lead).await?;
        info!(lead_id = %stored.id, car_model = %stored.car_model, "lead captured");
        Ok(stored)
    }
}
