//! The permanent tri-state module cache.

use std::sync::Arc;

use dashmap::DashMap;

use crate::module::Module;
use crate::registry::ModuleRegistry;

/// One cached resolution outcome. Entries never expire: modules are
/// deployment artifacts, not runtime data.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// The namespace resolved to a module.
    Loaded(Arc<Module>),
    /// No such namespace is registered.
    NotFound,
    /// The namespace exists but its factory failed; the stringified
    /// failure is kept for error surfacing.
    LoadError(String),
}

/// Memoizes namespace resolutions for a dispatcher's lifetime.
///
/// Concurrent first-loads of one namespace may each run the factory;
/// there is no single-flight de-duplication. The first insert wins and
/// every caller converges on the one cached entry.
#[derive(Debug, Default)]
pub struct ModuleCache {
    entries: DashMap<String, CacheEntry>,
}

impl ModuleCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a namespace through the cache.
    ///
    /// A miss consults the registry: an unregistered namespace caches
    /// [`CacheEntry::NotFound`]; a registered factory runs and caches
    /// [`CacheEntry::Loaded`] or [`CacheEntry::LoadError`].
    pub fn load(&self, registry: &ModuleRegistry, namespace: &str) -> CacheEntry {
        if let Some(entry) = self.entries.get(namespace) {
            return entry.value().clone();
        }

        let entry = match registry.lookup(namespace) {
            None => CacheEntry::NotFound,
            Some(factory) => match factory() {
                Ok(module) => {
                    tracing::debug!(namespace, "module loaded");
                    CacheEntry::Loaded(Arc::new(module))
                }
                Err(error) => {
                    tracing::debug!(namespace, %error, "module factory failed");
                    CacheEntry::LoadError(format!("{error:#}"))
                }
            },
        };

        self.entries
            .entry(namespace.to_owned())
            .or_insert(entry)
            .value()
            .clone()
    }

    /// Returns the number of cached namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Flow, Request, Response};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn module_with(action: &str) -> Module {
        Module::new().action(
            action,
            |_request: Arc<Request>, _response: Arc<Response>| async move { Ok(Flow::Continue) },
        )
    }

    #[test]
    fn test_loaded_entry() {
        let mut registry = ModuleRegistry::new();
        registry.register("math", module_with("add"));

        let cache = ModuleCache::new();
        match cache.load(&registry, "math") {
            CacheEntry::Loaded(module) => assert!(module.contains("add")),
            other => panic!("expected Loaded, got {other:?}"),
        }
    }

    #[test]
    fn test_unregistered_namespace_is_not_found() {
        let registry = ModuleRegistry::new();
        let cache = ModuleCache::new();

        assert!(matches!(
            cache.load(&registry, "missing"),
            CacheEntry::NotFound
        ));
        // The miss itself is cached.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_factory_failure_is_a_load_error() {
        let mut registry = ModuleRegistry::new();
        registry.register_factory("flaky", || anyhow::bail!("connection refused"));

        let cache = ModuleCache::new();
        match cache.load(&registry, "flaky") {
            CacheEntry::LoadError(message) => assert!(message.contains("connection refused")),
            other => panic!("expected LoadError, got {other:?}"),
        }
    }

    #[test]
    fn test_factory_runs_at_most_once_per_cache() {
        static RUNS: AtomicUsize = AtomicUsize::new(0);

        let mut registry = ModuleRegistry::new();
        registry.register_factory("counted", || {
            RUNS.fetch_add(1, Ordering::SeqCst);
            Ok(module_with("noop"))
        });

        let cache = ModuleCache::new();
        for _ in 0..3 {
            assert!(matches!(
                cache.load(&registry, "counted"),
                CacheEntry::Loaded(_)
            ));
        }
        assert_eq!(RUNS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_error_is_permanent() {
        static RUNS: AtomicUsize = AtomicUsize::new(0);

        let mut registry = ModuleRegistry::new();
        registry.register_factory("flaky", || {
            RUNS.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("boom")
        });

        let cache = ModuleCache::new();
        assert!(matches!(
            cache.load(&registry, "flaky"),
            CacheEntry::LoadError(_)
        ));
        assert!(matches!(
            cache.load(&registry, "flaky"),
            CacheEntry::LoadError(_)
        ));
        assert_eq!(RUNS.load(Ordering::SeqCst), 1);
    }
}
