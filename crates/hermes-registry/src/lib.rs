//! # Hermes Registry
//!
//! Method resolution for the Hermes RPC dispatch framework.
//!
//! A dotted method string such as `billing.invoices.create` names a
//! module namespace (`billing.invoices`) and a trailing action
//! (`create`). This crate provides:
//!
//! - [`MethodDescriptor`] - the namespace/action split
//! - [`Module`] - a named table of actions
//! - [`ModuleRegistry`] - the startup-time namespace to module mapping
//! - [`ModuleCache`] - the permanent tri-state lookup cache

#![doc(html_root_url = "https://docs.rs/hermes-registry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod descriptor;
mod module;
mod registry;

pub use cache::{CacheEntry, ModuleCache};
pub use descriptor::MethodDescriptor;
pub use module::Module;
pub use registry::{ModuleFactory, ModuleRegistry};
