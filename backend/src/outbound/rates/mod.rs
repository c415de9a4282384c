//! Exchange-rate adapters for the pricing worker.

mod http;
mod simulated;

pub use http::HttpRateSource;
pub use simulated::{SimulatedRateConfig, SimulatedRateSource};
