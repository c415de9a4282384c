//! HTTP middleware shared by all routes.

pub mod trace;

pub use trace::trace_requests;
