//! Claim administration port - organizer-only endpoints for ambiguous identity claims.

use async_trait::async_trait;

use crate::domain::foundation::ClaimId;
use crate::domain::guest::{ClaimResolution, GuestError, PendingClaim};

/// Port for listing and resolving pending roster-identity claims.
///
/// Nothing is cached locally; every call goes to the server and errors are
/// surfaced to the caller unchanged.
#[async_trait]
pub trait ClaimAdminApi: Send + Sync {
    async fn list_pending_claims(&self) -> Result<Vec<PendingClaim>, GuestError>;

    async fn resolve_claim(
        &self,
        claim_id: ClaimId,
        approve: bool,
    ) -> Result<ClaimResolution, GuestError>;
}
