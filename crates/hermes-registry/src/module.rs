//! Handler modules.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hermes_core::RpcHandler;

/// A table of named actions, the unit of registration.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hermes_core::{Flow, Request, Response};
/// use hermes_registry::Module;
/// use serde_json::json;
///
/// let module = Module::new().action("ping", |_req: Arc<Request>, res: Arc<Response>| async move {
///     res.send(Some(json!("pong")));
///     Ok(Flow::Continue)
/// });
///
/// assert!(module.get("ping").is_some());
/// assert!(module.get("missing").is_none());
/// ```
#[derive(Clone, Default)]
pub struct Module {
    actions: HashMap<String, Arc<dyn RpcHandler>>,
}

impl Module {
    /// Creates an empty module.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action under the given name, replacing any previous
    /// handler of that name.
    #[must_use]
    pub fn action(mut self, name: impl Into<String>, handler: impl RpcHandler) -> Self {
        self.actions.insert(name.into(), Arc::new(handler));
        self
    }

    /// Looks up an action by name.
    #[must_use]
    pub fn get(&self, action: &str) -> Option<Arc<dyn RpcHandler>> {
        self.actions.get(action).map(Arc::clone)
    }

    /// Returns true when an action of the given name exists.
    #[must_use]
    pub fn contains(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true when no actions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Module").field("actions", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Flow, Request, Response};

    fn noop() -> impl RpcHandler {
        |_request: Arc<Request>, _response: Arc<Response>| async move { Ok(Flow::Continue) }
    }

    #[test]
    fn test_lookup() {
        let module = Module::new().action("add", noop()).action("subtract", noop());
        assert_eq!(module.len(), 2);
        assert!(module.contains("add"));
        assert!(module.get("subtract").is_some());
        assert!(module.get("multiply").is_none());
    }

    #[test]
    fn test_registration_replaces() {
        let module = Module::new().action("add", noop()).action("add", noop());
        assert_eq!(module.len(), 1);
    }

    #[test]
    fn test_debug_lists_action_names() {
        let module = Module::new().action("b", noop()).action("a", noop());
        assert_eq!(format!("{module:?}"), r#"Module { actions: ["a", "b"] }"#);
    }
}
