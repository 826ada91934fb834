//! ConflictResolutionGateway - organizer decisions on ambiguous claims.

use std::sync::Arc;

use crate::domain::foundation::ClaimId;
use crate::domain::guest::{ClaimResolution, GuestError, PendingClaim};
use crate::ports::ClaimAdminApi;

/// Pass-through to the organizer endpoints. Nothing is cached.
pub struct ConflictResolutionGateway {
    admin: Arc<dyn ClaimAdminApi>,
}

impl ConflictResolutionGateway {
    pub fn new(admin: Arc<dyn ClaimAdminApi>) -> Self {
        Self { admin }
    }

    pub async fn list_pending_claims(&self) -> Result<Vec<PendingClaim>, GuestError> {
        self.admin.list_pending_claims().await
    }

    pub async fn resolve_claim(
        &self,
        claim_id: ClaimId,
        approve: bool,
    ) -> Result<ClaimResolution, GuestError> {
        let resolution = self.admin.resolve_claim(claim_id, approve).await?;
        tracing::info!(claim_id = %claim_id, approve, "claim resolved");
        Ok(resolution)
    }
}
