//! The startup-time module registry.
//!
//! In a compiled target, dynamic string-keyed module loading becomes an
//! explicit registry populated at startup: each dotted namespace maps to
//! a module, or to a factory that builds one on first use. A factory
//! that fails is how a namespace can exist yet be unloadable, which the
//! cache records permanently as a load error.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::module::Module;

/// Builds a module on first lookup. May fail, once, permanently.
pub type ModuleFactory = Arc<dyn Fn() -> Result<Module, anyhow::Error> + Send + Sync>;

/// Maps dotted namespaces to handler modules.
///
/// Keys are the normalized namespace strings a
/// [`MethodDescriptor`](crate::MethodDescriptor) produces; the empty
/// string names the top-level namespace.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hermes_core::{Flow, Request, Response};
/// use hermes_registry::{Module, ModuleRegistry};
/// use serde_json::json;
///
/// let mut registry = ModuleRegistry::new();
/// registry.register(
///     "math",
///     Module::new().action("add", |req: Arc<Request>, res: Arc<Response>| async move {
///         let params = req.params();
///         let sum = params["a"].as_i64().unwrap_or(0) + params["b"].as_i64().unwrap_or(0);
///         res.send(Some(json!(sum)));
///         Ok(Flow::Continue)
///     }),
/// );
///
/// assert!(registry.contains("math"));
/// ```
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ready-built module under a namespace.
    pub fn register(&mut self, namespace: impl Into<String>, module: Module) {
        self.modules
            .insert(namespace.into(), Arc::new(move || Ok(module.clone())));
    }

    /// Registers a module factory under a namespace.
    ///
    /// The factory runs on the namespace's first resolution. Its
    /// failure is cached as the namespace's permanent load error.
    pub fn register_factory(
        &mut self,
        namespace: impl Into<String>,
        factory: impl Fn() -> Result<Module, anyhow::Error> + Send + Sync + 'static,
    ) {
        self.modules.insert(namespace.into(), Arc::new(factory));
    }

    /// Returns true when a namespace is registered.
    #[must_use]
    pub fn contains(&self, namespace: &str) -> bool {
        self.modules.contains_key(namespace)
    }

    /// Returns the number of registered namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub(crate) fn lookup(&self, namespace: &str) -> Option<ModuleFactory> {
        self.modules.get(namespace).map(Arc::clone)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ModuleRegistry")
            .field("namespaces", &names)
            .finish()
    }
}
