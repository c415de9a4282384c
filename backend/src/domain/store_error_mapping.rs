//! Conversions from port errors into transport-agnostic domain errors.
//!
//! Transient failures become `service_unavailable`; anything else that is
//! not a caller mistake becomes `internal_error`, whose message adapters
//! redact.

use tracing::warn;

use super::Error;
use super::ports::{CarStoreError, LeadRepositoryError, PasswordHashError, UserRepositoryError};

impl From<CarStoreError> for Error {
    fn from(value: CarStoreError) -> Self {
        match value {
            CarStoreError::Duplicate { message } => {
                Self::conflict(format!("a car with this vin already exists ({message})"))
            }
            err if err.is_transient() => {
                warn!(error = %err, "car store unavailable");
                Self::service_unavailable("inventory store is temporarily unavailable")
            }
            err => Self::internal(err.to_string()),
        }
    }
}

impl From<UserRepositoryError> for Error {
    fn from(value: UserRepositoryError) -> Self {
        match value {
            UserRepositoryError::Duplicate { .. } => Self::conflict("username already exists"),
            UserRepositoryError::Connection { .. } | UserRepositoryError::Timeout { .. } => {
                warn!(error = %value, "user store unavailable");
                Self::service_unavailable("user store is temporarily unavailable")
            }
            UserRepositoryError::Query { .. } => Self::internal(value.to_string()),
        }
    }
}

impl From<LeadRepositoryError> for Error {
    fn from(value: LeadRepositoryError) -> Self {
        match value {
            LeadRepositoryError::Connection { .. } | LeadRepositoryError::Timeout { .. } => {
                warn!(error = %value, "lead store unavailable");
                Self::service_unavailable("lead store is temporarily unavailable")
            }
            LeadRepositoryError::Query { .. } => Self::internal(value.to_string()),
        }
    }
}

impl From<PasswordHashError> for Error {
    fn from(value: PasswordHashError) -> Self {
        Self::internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(CarStoreError::duplicate("VIN1"), ErrorCode::Conflict)]
    #[case(CarStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(CarStoreError::timeout("5s"), ErrorCode::ServiceUnavailable)]
    #[case(CarStoreError::query("bad sql"), ErrorCode::InternalError)]
    fn car_store_errors(#[case] err: CarStoreError, #[case] code: ErrorCode) {
        assert_eq!(Error::from(err).code(), code);
    }

    #[rstest]
    #[case(UserRepositoryError::duplicate("bob"), ErrorCode::Conflict)]
    #[case(UserRepositoryError::timeout("5s"), ErrorCode::ServiceUnavailable)]
    #[case(UserRepositoryError::query("bad"), ErrorCode::InternalError)]
    fn user_store_errors(#[case] err: UserRepositoryError, #[case] code: ErrorCode) {
        assert_eq!(Error::from(err).code(), code);
    }
}
