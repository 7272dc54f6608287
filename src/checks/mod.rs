// SPDX-License-Identifier: MIT
//! Health-check registry and execution engine.
//!
//! The heartbeat endpoint is backed by three pieces:
//! - [`CheckMessage`] — one leveled finding from a check
//! - [`CheckRegistry`] — named registration table for check callables
//! - [`run_checks`] / [`run_checks_async`] — the execution engine producing
//!   an aggregated [`CheckResults`]
//!
//! # Usage
//! ```rust
//! use dockerflow::checks::{self, CheckMessage, ERROR};
//!
//! checks::register("upstream", || {
//!     vec![CheckMessage::error("upstream gone").with_id("myapp.health.E001")]
//! });
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let results = checks::run_checks_async(checks::get_checks(), &[]).await;
//! assert_eq!(results.level, ERROR);
//! # });
//! # checks::clear_checks();
//! ```

pub mod messages;
pub mod registry;
pub mod runner;

// Convenience re-exports.
pub use messages::{level_to_text, CheckMessage, CRITICAL, DEBUG, ERROR, INFO, WARNING};
pub use registry::{
    clear_checks, default_registry, get_checks, register, register_async, Check, CheckRegistry,
};
pub use runner::{run_checks, run_checks_async, CheckDetail, CheckResults};
