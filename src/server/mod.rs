// SPDX-License-Identifier: MIT
//! Dockerflow operational endpoints for axum.
//!
//! [`Dockerflow`] builds a router exposing the three standard endpoints:
//!
//! - `GET /__lbheartbeat__` — liveness for the load balancer; always 200,
//!   runs no checks
//! - `GET /__heartbeat__` — runs the registered health checks and reports
//!   the aggregate, with the response code derived from the worst level
//! - `GET /__version__` — contents of the application root's
//!   `version.json`, or 404 when absent
//!
//! # Usage
//! ```rust,no_run
//! use axum::Router;
//! use dockerflow::server::Dockerflow;
//!
//! # async fn demo() {
//! let app: Router = Router::new().merge(Dockerflow::new().router());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

pub mod middleware;

pub use middleware::request_summary;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::checks::{run_checks_async, CheckRegistry, ERROR};
use crate::version::get_version;

/// Builder for the Dockerflow router.
///
/// Defaults: checks come from the process-wide default registry, nothing is
/// silenced, the heartbeat fails at [`ERROR`] with a 500 response, and
/// `version.json` is looked up in `$APP_DIR` (or `/app`).
///
/// The failure threshold is endpoint policy, not engine policy — services
/// that want warnings to fail the heartbeat lower it:
///
/// ```rust
/// use dockerflow::checks::WARNING;
/// use dockerflow::server::Dockerflow;
///
/// let router = Dockerflow::new().with_failure_threshold(WARNING).router();
/// ```
pub struct Dockerflow {
    registry: Option<CheckRegistry>,
    silenced_check_ids: Vec<String>,
    failure_threshold: u8,
    failed_status_code: StatusCode,
    app_dir: Option<PathBuf>,
}

impl Dockerflow {
    /// Create a builder with the defaults described above.
    pub fn new() -> Self {
        Self {
            registry: None,
            silenced_check_ids: Vec::new(),
            failure_threshold: ERROR,
            failed_status_code: StatusCode::INTERNAL_SERVER_ERROR,
            app_dir: None,
        }
    }

    /// Serve checks from `registry` instead of the process-wide default.
    pub fn with_registry(mut self, registry: CheckRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Silence one message id in heartbeat payloads.
    pub fn silence(mut self, id: impl Into<String>) -> Self {
        self.silenced_check_ids.push(id.into());
        self
    }

    /// Replace the silenced message ids.
    pub fn with_silenced_check_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.silenced_check_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Fail the heartbeat at `level` instead of [`ERROR`].
    pub fn with_failure_threshold(mut self, level: u8) -> Self {
        self.failure_threshold = level;
        self
    }

    /// Respond with `code` instead of 500 when the heartbeat fails.
    pub fn with_failed_status_code(mut self, code: StatusCode) -> Self {
        self.failed_status_code = code;
        self
    }

    /// Look up `version.json` under `path` instead of `$APP_DIR`/`/app`.
    pub fn with_app_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.app_dir = Some(path.into());
        self
    }

    /// Build the router. Merge it into the application's router.
    pub fn router(self) -> Router {
        let app_dir = self.app_dir.unwrap_or_else(|| {
            std::env::var_os("APP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/app"))
        });
        let state = Arc::new(ServerState {
            registry: self
                .registry
                .unwrap_or_else(crate::checks::default_registry),
            silenced_check_ids: self.silenced_check_ids,
            failure_threshold: self.failure_threshold,
            failed_status_code: self.failed_status_code,
            app_dir,
        });

        Router::new()
            .route("/__lbheartbeat__", get(lbheartbeat))
            .route("/__heartbeat__", get(heartbeat))
            .route("/__version__", get(version))
            .layer(axum::middleware::from_fn(request_summary))
            .with_state(state)
    }
}

impl Default for Dockerflow {
    fn default() -> Self {
        Self::new()
    }
}

struct ServerState {
    registry: CheckRegistry,
    silenced_check_ids: Vec<String>,
    failure_threshold: u8,
    failed_status_code: StatusCode,
    app_dir: PathBuf,
}

/// Liveness probe for the load balancer. Runs nothing.
async fn lbheartbeat() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Run all registered checks and report the aggregate.
async fn heartbeat(State(state): State<Arc<ServerState>>) -> Response {
    let results = run_checks_async(state.registry.checks(), &state.silenced_check_ids).await;

    let passed = results.passes(state.failure_threshold);
    if passed {
        debug!(level = results.level, "heartbeat passed");
    } else {
        warn!(
            level = results.level,
            status = results.status(),
            "heartbeat failed"
        );
    }

    let status_code = if passed {
        StatusCode::OK
    } else {
        state.failed_status_code
    };
    let payload = json!({
        "status": results.status(),
        "checks": results.statuses,
        "details": results.details,
    });
    (status_code, Json(payload)).into_response()
}

/// Serve the application root's `version.json`, or 404 when absent.
async fn version(State(state): State<Arc<ServerState>>) -> Response {
    let root = state.app_dir.clone();
    match tokio::task::spawn_blocking(move || get_version(&root)).await {
        Ok(Ok(Some(value))) => Json(value).into_response(),
        Ok(Ok(None)) => (StatusCode::NOT_FOUND, "version.json not found").into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "failed to load version.json");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(e) => {
            error!(error = %e, "version.json load task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
