//! Splitting a dotted method into namespace and action.

/// The derived view of one method string: the module namespace and the
/// trailing action name.
///
/// The split happens on the last dot. Both halves are
/// whitespace-trimmed and the module additionally sheds one surrounding
/// dot on each side, so `".users.get"` resolves to the top-level
/// `users` module. A method with no dot at all names itself on both
/// sides, so `"ping"` looks up action `ping` on module `ping`.
///
/// # Example
///
/// ```
/// use hermes_registry::MethodDescriptor;
///
/// let descriptor = MethodDescriptor::parse("billing.invoices.create");
/// assert_eq!(descriptor.module, "billing.invoices");
/// assert_eq!(descriptor.action, "create");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// The module namespace. Empty names the top-level namespace.
    pub module: String,
    /// The action to invoke on the module.
    pub action: String,
}

impl MethodDescriptor {
    /// Derives the descriptor from a raw method string.
    #[must_use]
    pub fn parse(method: &str) -> Self {
        let (module_raw, action_raw) = match method.rfind('.') {
            Some(index) => (&method[..index], &method[index + 1..]),
            None => (method, method),
        };

        let module = module_raw.trim();
        let module = module.strip_prefix('.').unwrap_or(module);
        let module = module.strip_suffix('.').unwrap_or(module);

        Self {
            module: module.to_owned(),
            action: action_raw.trim().to_owned(),
        }
    }
}
