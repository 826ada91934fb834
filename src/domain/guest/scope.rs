//! Session scope - the (project, session kind) key every guest record lives under.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{ProjectId, ValidationError};

/// Deployment mode a guest participates in.
///
/// `Code` treats the guest as a standing contact of the project, `Share`
/// as an anonymous visitor arriving through a share link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Code,
    #[default]
    Share,
}

impl SessionKind {
    /// Wire/storage name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Code => "code",
            SessionKind::Share => "share",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" => Ok(SessionKind::Code),
            "share" => Ok(SessionKind::Share),
            other => Err(ValidationError::invalid_format(
                "session_kind",
                format!("unknown session kind '{}'", other),
            )),
        }
    }
}

/// Key of a stored guest session. At most one record exists per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionScope {
    pub project_id: ProjectId,
    pub kind: SessionKind,
}

impl SessionScope {
    pub fn new(project_id: ProjectId, kind: SessionKind) -> Self {
        Self { project_id, kind }
    }

    /// Flat storage key, `"{project}:{kind}"`.
    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.project_id, self.kind)
    }
}

impl fmt::Display for SessionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project_id, self.kind)
    }
}
