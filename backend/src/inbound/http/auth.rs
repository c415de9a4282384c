//! Bearer-token authentication for HTTP handlers.
//!
//! Tokens are HS256 JWTs carrying `{sub, username, role, exp}`. Handlers
//! take [`AuthenticatedUser`] to require a valid token and [`StaffUser`] to
//! additionally require the `admin` or `manager` role.

use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, http::header, web};
use chrono::{DateTime, TimeDelta, Utc};
use futures_util::future::{Ready, ready};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::{Clock, DefaultClock};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::{Error, Role, User, UserId};

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

const BEARER_PREFIX: &str = "Bearer ";

/// Invalid token settings detected at start-up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenConfigError {
    #[error("jwt secret must be at least {min} bytes")]
    SecretTooShort { min: usize },
    #[error("token lifetime must be positive")]
    NonPositiveTtl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Claims {
    sub: UserId,
    username: String,
    role: Role,
    exp: i64,
}

/// Signed token handed to a client after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// Identity proven by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

/// Signs and verifies access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Build an issuer from the shared secret.
    ///
    /// # Errors
    ///
    /// Fails when the secret is shorter than [`MIN_SECRET_LEN`] bytes or the
    /// lifetime is not positive.
    pub fn new(secret: &str, ttl: TimeDelta) -> Result<Self, TokenConfigError> {
        Self::with_clock(secret, ttl, Arc::new(DefaultClock))
    }

    /// Like [`TokenIssuer::new`] with an explicit clock for issue times.
    ///
    /// # Errors
    ///
    /// See [`TokenIssuer::new`].
    pub fn with_clock(
        secret: &str,
        ttl: TimeDelta,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenConfigError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenConfigError::SecretTooShort {
                min: MIN_SECRET_LEN,
            });
        }
        if ttl <= TimeDelta::zero() {
            return Err(TokenConfigError::NonPositiveTtl);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        })
    }

    /// Sign a token for `user` that expires after the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, Error> {
        let expires = self.clock.utc() + self.ttl;
        let claims = Claims {
            sub: user.id,
            username: user.username.as_str().to_owned(),
            role: user.role,
            exp: expires.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(
            |err| {
                error!(error = %err, "token signing failed");
                Error::internal("token signing failed")
            },
        )?;
        Ok(IssuedToken { token, expires })
    }

    /// Check signature and expiry.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|err| {
                debug!(error = %err, "bearer token rejected");
                match err.kind() {
                    ErrorKind::ExpiredSignature => Error::unauthorized("token expired"),
                    _ => Error::unauthorized("invalid token"),
                }
            })?;
        let Claims {
            sub,
            username,
            role,
            exp: _,
        } = data.claims;
        Ok(AuthenticatedUser {
            id: sub,
            username,
            role,
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| Error::internal("token issuer not configured"))?;
    issuer.verify(bearer_token(req)?)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Authenticated admin or manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffUser(pub AuthenticatedUser);

impl StaffUser {
    fn require(user: AuthenticatedUser) -> Result<Self, Error> {
        if user.role.is_staff() {
            Ok(Self(user))
        } else {
            Err(Error::forbidden("staff role required"))
        }
    }
}

impl FromRequest for StaffUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(Self::require))
    }
}
