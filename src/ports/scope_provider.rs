//! Active scope port - what the core needs to know from its host.
//!
//! The host (page router, CLI, desktop shell) decides which project and
//! session kind are active. The core only asks; it never reaches into the
//! host's own session handling.

use crate::domain::guest::SessionScope;

/// Resolves the (project, session kind) the host is currently showing.
pub trait ActiveScopeProvider: Send + Sync {
    /// `None` when the host is outside any project context.
    fn active_scope(&self) -> Option<SessionScope>;
}
