// SPDX-License-Identifier: MIT
//! Request-summary logging middleware.
//!
//! Emits one `request.summary` event per request, carrying the fields the
//! MozLog request-summary convention expects: user agent, accept-language,
//! method, path, response code, `errno` (0 unless the response was a server
//! error), a per-request uuid, and the elapsed time in milliseconds.
//!
//! Layer it app-wide so every route is covered, not just the operational
//! endpoints:
//!
//! ```rust,no_run
//! use axum::{middleware, Router};
//! use dockerflow::server::request_summary;
//!
//! let app: Router = Router::new().layer(middleware::from_fn(request_summary));
//! ```

use std::time::Instant;

use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;
use uuid::Uuid;

/// Log a `request.summary` event for the wrapped request.
pub async fn request_summary(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let rid = Uuid::new_v4().to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let agent = header_value(&request, header::USER_AGENT);
    let lang = header_value(&request, header::ACCEPT_LANGUAGE);

    let response = next.run(request).await;

    let code = u64::from(response.status().as_u16());
    let errno = if response.status().is_server_error() {
        code
    } else {
        0
    };
    let t = start.elapsed().as_millis() as u64;

    info!(
        target: "request.summary",
        agent = %agent,
        lang = %lang,
        method = %method,
        path = %path,
        code,
        errno,
        rid = %rid,
        t,
    );

    response
}

fn header_value(request: &Request, name: header::HeaderName) -> String {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
