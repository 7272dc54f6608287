// SPDX-License-Identifier: MIT
//! Dockerflow operational endpoints and health checks for axum services.
//!
//! Implements the Dockerflow container convention: three standardized
//! endpoints (`/__version__`, `/__heartbeat__`, `/__lbheartbeat__`) and
//! MozLog-format structured request logging, built around a reusable
//! health-check engine — a registry of named sync/async check functions,
//! each returning leveled messages, aggregated into one worst-case status.
//!
//! # Usage
//! ```rust,no_run
//! use axum::Router;
//! use dockerflow::checks;
//! use dockerflow::server::Dockerflow;
//!
//! #[tokio::main]
//! async fn main() {
//!     dockerflow::logging::try_init("myapp").unwrap();
//!
//!     let data_dir = std::path::PathBuf::from("/app/data");
//!     checks::register("storage", move || {
//!         dockerflow::health::check_storage_writable(&data_dir)
//!     });
//!
//!     let app: Router = Router::new().merge(Dockerflow::new().router());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
//!
//! Checks report problems as [`checks::CheckMessage`]s rather than erroring:
//! a check that cannot reach its dependency returns an error-level message,
//! and the heartbeat turns the worst level across all checks into the
//! response code.

pub mod checks;
pub mod health;
pub mod logging;
#[cfg(feature = "axum")]
pub mod server;
pub mod version;

pub use checks::{CheckMessage, CheckResults};
#[cfg(feature = "axum")]
pub use server::Dockerflow;
pub use version::get_version;
