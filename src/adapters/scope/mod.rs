//! Active scope adapters.

mod switchable_scope_provider;

pub use switchable_scope_provider::SwitchableScopeProvider;
