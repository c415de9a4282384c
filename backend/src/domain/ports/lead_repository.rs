//! Driven port for lead capture.
use async_trait::async_trait;

use crate::domain::{Lead, NewLead};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by lead repository adapters.
    pub enum LeadRepositoryError {
        Connection => "lead repository connection failed",
        Query => "lead repository query failed",
        Timeout => "lead repository call timed out",
    }
}

/// Stores customer inquiries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Append a lead with status `new`.
    async fn create(&self, lead: &NewLead) -> Result<Lead, LeadRepositoryError>;

    /// All leads, newest first.
    async fn list_all(&self) -> Result<Vec<Lead>, LeadRepositoryError>;
}
