// SPDX-License-Identifier: MIT
//! Registration table for named health checks.
//!
//! A check is a zero-argument callable returning a list of
//! [`CheckMessage`]s, either synchronously or as a future. Checks that need
//! an external resource (a connection pool, a data directory) are registered
//! as move closures capturing it:
//!
//! ```rust
//! use std::path::PathBuf;
//! use dockerflow::checks::CheckRegistry;
//! use dockerflow::health;
//!
//! let data_dir = PathBuf::from("/app/data");
//! let registry = CheckRegistry::new();
//! registry.register("storage", move || health::check_storage_writable(&data_dir));
//! ```
//!
//! [`CheckRegistry`] is an explicit object that call sites own and pass
//! down; the free functions at the bottom of this module operate on a
//! process-wide default instance for callers that register checks at import
//! time. Registration is expected to happen at startup, before heartbeat
//! traffic begins.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::checks::messages::CheckMessage;

type SyncCheckFn = Arc<dyn Fn() -> Vec<CheckMessage> + Send + Sync>;
type CheckFuture = Pin<Box<dyn Future<Output = Vec<CheckMessage>> + Send>>;
type AsyncCheckFn = Arc<dyn Fn() -> CheckFuture + Send + Sync>;

pub(crate) enum CheckImpl {
    Sync(SyncCheckFn),
    Async(AsyncCheckFn),
}

/// A cloneable handle to a registered check callable.
///
/// Whether the underlying callable is synchronous or asynchronous is carried
/// in the handle; the execution engine uses it to decide between running the
/// check on a blocking worker or polling it as a future.
#[derive(Clone)]
pub struct Check {
    pub(crate) inner: Arc<CheckImpl>,
}

impl Check {
    /// Wrap a synchronous check function.
    pub fn sync(f: impl Fn() -> Vec<CheckMessage> + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(CheckImpl::Sync(Arc::new(f))),
        }
    }

    /// Wrap an asynchronous check function.
    pub fn async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Vec<CheckMessage>> + Send + 'static,
    {
        Self {
            inner: Arc::new(CheckImpl::Async(Arc::new(move || Box::pin(f())))),
        }
    }

    /// Returns `true` if the underlying callable is asynchronous.
    pub fn is_async(&self) -> bool {
        matches!(*self.inner, CheckImpl::Async(_))
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check")
            .field("is_async", &self.is_async())
            .finish()
    }
}

/// Process-wide registration table for health checks, keyed by name.
///
/// Cheaply cloneable — all clones share the same table via `Arc`. Names are
/// unique: re-registering a name replaces the previous entry.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: Arc<RwLock<BTreeMap<String, Check>>>,
}

impl CheckRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronous check under `name`.
    ///
    /// The stored callable logs at debug level each time it is invoked.
    pub fn register(
        &self,
        name: impl Into<String>,
        f: impl Fn() -> Vec<CheckMessage> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!(check = %name, "registered check");
        let log_name = name.clone();
        let check = Check::sync(move || {
            debug!(check = %log_name, "running check");
            f()
        });
        self.insert(name, check);
    }

    /// Register an asynchronous check under `name`.
    ///
    /// The stored callable logs at debug level each time it is invoked.
    pub fn register_async<F, Fut>(&self, name: impl Into<String>, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Vec<CheckMessage>> + Send + 'static,
    {
        let name = name.into();
        debug!(check = %name, "registered check");
        let log_name = name.clone();
        let check = Check::async_fn(move || {
            debug!(check = %log_name, "running check");
            f()
        });
        self.insert(name, check);
    }

    fn insert(&self, name: String, check: Check) {
        let mut checks = self.checks.write().unwrap_or_else(|e| e.into_inner());
        checks.insert(name, check);
    }

    /// Snapshot the current `(name, check)` pairs, ordered by name.
    ///
    /// The snapshot is a shallow copy: it does not track registrations or
    /// clears that happen after it is taken.
    pub fn checks(&self) -> Vec<(String, Check)> {
        let checks = self.checks.read().unwrap_or_else(|e| e.into_inner());
        checks
            .iter()
            .map(|(name, check)| (name.clone(), check.clone()))
            .collect()
    }

    /// Number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns `true` if no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every registered check. Primarily for test isolation.
    pub fn clear(&self) {
        let mut checks = self.checks.write().unwrap_or_else(|e| e.into_inner());
        checks.clear();
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let checks = self.checks.read().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("CheckRegistry")
            .field("names", &checks.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ─── Process-wide default registry ────────────────────────────────────────────

static DEFAULT_REGISTRY: Lazy<CheckRegistry> = Lazy::new(CheckRegistry::new);

/// The process-wide default registry used by the free registration functions
/// and, unless overridden, by the HTTP integration.
pub fn default_registry() -> CheckRegistry {
    DEFAULT_REGISTRY.clone()
}

/// Register a synchronous check in the default registry.
pub fn register(
    name: impl Into<String>,
    f: impl Fn() -> Vec<CheckMessage> + Send + Sync + 'static,
) {
    DEFAULT_REGISTRY.register(name, f);
}

/// Register an asynchronous check in the default registry.
pub fn register_async<F, Fut>(name: impl Into<String>, f: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Vec<CheckMessage>> + Send + 'static,
{
    DEFAULT_REGISTRY.register_async(name, f);
}

/// Snapshot the default registry's `(name, check)` pairs.
pub fn get_checks() -> Vec<(String, Check)> {
    DEFAULT_REGISTRY.checks()
}

/// Remove every check from the default registry. Primarily for test
/// isolation.
pub fn clear_checks() {
    DEFAULT_REGISTRY.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_snapshot() {
        let registry = CheckRegistry::new();
        registry.register("always_ok", Vec::new);
        registry.register("warns", || vec![CheckMessage::warning("w")]);

        let checks = registry.checks();
        let names: Vec<&str> = checks.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["always_ok", "warns"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn reregistering_replaces_the_entry() {
        let registry = CheckRegistry::new();
        registry.register("dup", || vec![CheckMessage::error("first")]);
        registry.register("dup", || vec![CheckMessage::error("second")]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn snapshot_does_not_track_later_mutations() {
        let registry = CheckRegistry::new();
        registry.register("one", Vec::new);
        let snapshot = registry.checks();
        registry.register("two", Vec::new);
        registry.clear();
        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn closures_capture_check_resources() {
        // The zero-argument contract is met by closing over the resource.
        let limit = 3usize;
        let registry = CheckRegistry::new();
        registry.register("capacity", move || {
            if limit == 0 {
                vec![CheckMessage::error("no capacity configured")]
            } else {
                Vec::new()
            }
        });
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn async_checks_report_as_async() {
        let registry = CheckRegistry::new();
        registry.register_async("async_ok", || async { Vec::new() });
        registry.register("sync_ok", Vec::new);

        let checks = registry.checks();
        assert!(checks.iter().any(|(n, c)| n == "async_ok" && c.is_async()));
        assert!(checks.iter().any(|(n, c)| n == "sync_ok" && !c.is_async()));
    }
}
