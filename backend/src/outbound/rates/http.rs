//! Reqwest-backed exchange-rate adapter.
//!
//! Issues `GET <endpoint>` and expects `{"rate": <number>}`. The adapter owns
//! transport concerns only: request timeout, status mapping and decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::domain::ports::{ExchangeRate, ExchangeRateSource, RateSourceError};

const USER_AGENT: &str = concat!("dealership-pricing-worker/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct RateDto {
    rate: f64,
}

/// Exchange-rate source backed by an HTTP endpoint.
pub struct HttpRateSource {
    client: Client,
    endpoint: Url,
}

impl HttpRateSource {
    /// Build an adapter whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ExchangeRateSource for HttpRateSource {
    async fn current_rate(&self) -> Result<ExchangeRate, RateSourceError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        parse_rate(body.as_ref())
    }
}

fn parse_rate(body: &[u8]) -> Result<ExchangeRate, RateSourceError> {
    let decoded: RateDto = serde_json::from_slice(body)
        .map_err(|error| RateSourceError::decode(format!("invalid rate payload: {error}")))?;
    ExchangeRate::new(decoded.rate)
}

fn map_transport_error(error: reqwest::Error) -> RateSourceError {
    if error.is_timeout() {
        RateSourceError::timeout(error.to_string())
    } else {
        RateSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> RateSourceError {
    let message = format!("status {}", status.as_u16());
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            RateSourceError::timeout(message)
        }
        _ => RateSourceError::transport(message),
    }
}
