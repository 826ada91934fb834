//! Active scope configuration

use serde::Deserialize;

use crate::domain::foundation::ProjectId;
use crate::domain::guest::{SessionKind, SessionScope};

/// Scope the process starts in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeConfig {
    /// Project the guest participates in; unset means no active scope
    pub project_id: Option<u64>,

    /// Deployment mode
    #[serde(default)]
    pub session_kind: SessionKind,
}

impl ScopeConfig {
    pub fn active_scope(&self) -> Option<SessionScope> {
        self.project_id
            .map(|id| SessionScope::new(ProjectId::new(id), self.session_kind))
    }
}
