//! Request tracing middleware.
//!
//! Every request runs inside a fresh [`TraceId`] scope so domain errors and
//! log lines can be correlated. The identifier is echoed in the `trace-id`
//! response header and a completion line is logged per request.

use std::time::Instant;

use actix_web::Error;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use tracing::{error, info};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware function; install with `actix_web::middleware::from_fn(trace_requests)`.
///
/// # Examples
/// ```
/// use actix_web::{App, middleware::from_fn};
/// use dealership::middleware::trace_requests;
///
/// let _app = App::new().wrap(from_fn(trace_requests));
/// ```
///
/// # Errors
/// Propagates errors produced by the wrapped service.
pub async fn trace_requests(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let trace_id = TraceId::generate();
    let method = req.method().clone();
    let path = req.path().to_owned();
    let started = Instant::now();

    TraceId::scope(trace_id, async move {
        let mut res = next.call(req).await?;
        match HeaderValue::from_str(&trace_id.to_string()) {
            Ok(value) => {
                res.headers_mut()
                    .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
            }
            Err(err) => error!(%err, %trace_id, "failed to encode trace identifier header"),
        }
        info!(
            %trace_id,
            %method,
            path,
            status = res.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            "request completed"
        );
        Ok(res)
    })
    .await
}
