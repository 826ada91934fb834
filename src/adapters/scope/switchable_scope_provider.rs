//! Host-settable active scope.

use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::guest::SessionScope;
use crate::ports::ActiveScopeProvider;

/// Scope provider the host updates when it enters or leaves a project.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SwitchableScopeProvider {
    scope: Arc<RwLock<Option<SessionScope>>>,
}

impl SwitchableScopeProvider {
    /// Provider with no active scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider starting on the given scope.
    pub fn with_scope(scope: SessionScope) -> Self {
        let provider = Self::new();
        provider.set(Some(scope));
        provider
    }

    /// Replaces the active scope; `None` leaves project context.
    pub fn set(&self, scope: Option<SessionScope>) {
        *self.scope.write().unwrap_or_else(PoisonError::into_inner) = scope;
    }
}

impl ActiveScopeProvider for SwitchableScopeProvider {
    fn active_scope(&self) -> Option<SessionScope> {
        *self.scope.read().unwrap_or_else(PoisonError::into_inner)
    }
}
