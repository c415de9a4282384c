//! Account handlers.
//!
//! ```text
//! POST /api/register {"username":"alice","password":"secret1"}
//! POST /api/login {"username":"alice","password":"secret1"}
//! ```

use actix_web::{HttpResponse, post, web};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    ApiResult, CredentialsValidationError, Error, LoginCredentials, Registration,
    UserValidationError,
};
use crate::inbound::http::auth::TokenIssuer;
use crate::inbound::http::state::HttpState;

/// Body shared by `POST /api/register` and `POST /api/login`.
#[derive(Debug, Deserialize, Serialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Successful login payload. `expires` is RFC 3339.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires: String,
}

/// Create a customer account with the `user` role.
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let CredentialsRequest { username, password } = payload.into_inner();
    let registration =
        Registration::try_from_parts(&username, &password).map_err(map_credentials_error)?;
    state.auth.register(&registration).await?;
    Ok(HttpResponse::Created().json(json!({ "message": "User registered successfully" })))
}

/// Exchange credentials for a bearer token.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    issuer: web::Data<TokenIssuer>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let CredentialsRequest { username, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&username, &password).map_err(map_credentials_error)?;
    let user = state.auth.login(&credentials).await?;
    let issued = issuer.issue(&user)?;
    Ok(web::Json(TokenResponse {
        token: issued.token,
        expires: issued.expires.to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

fn map_credentials_error(err: CredentialsValidationError) -> Error {
    let (field, code) = match &err {
        CredentialsValidationError::Username(UserValidationError::EmptyUsername) => {
            ("username", "empty_username")
        }
        CredentialsValidationError::Username(_) => ("username", "invalid_username"),
        CredentialsValidationError::EmptyPassword => ("password", "empty_password"),
        CredentialsValidationError::PasswordTooShort { .. } => ("password", "password_too_short"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}
