//! HTTP Guest API - reqwest implementation of `GuestApi` and `ClaimAdminApi`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpGuestApiConfig::new("https://api.example.com/tablo-frontend")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_admin_token(token);
//!
//! let api = HttpGuestApi::new(config)?;
//! ```
//!
//! # Error mapping
//!
//! - no response at all (connect failure, timeout) -> `GuestError::Network`
//! - 429 -> `GuestError::RateLimited`
//! - any other non-2xx -> `GuestError::Server`
//! - undecodable body -> `GuestError::Protocol`
//!
//! The server-supplied `message` is preferred everywhere; the generic
//! fallbacks only apply when the body carries none.
//!
//! Session-status and verification-status treat 401/403 as a regular answer.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::wire::{
    DeviceLinkBody, EmailBody, Envelope, ErrorBody, GuestData, IdentificationBody, IdentifiedData,
    MessageAnswer, PendingClaimList, ProfileData, RegisterBody, ResolveBody, SessionStatusAnswer,
    TokenBody, UpdateBody, ValidateAnswer, VerificationData,
};
use crate::domain::foundation::ClaimId;
use crate::domain::guest::{
    ClaimResolution, GuestError, LinkDispatch, PendingClaim, PersonMatch, SessionToken,
    GENERIC_FAILURE_MESSAGE, OFFLINE_MESSAGE, RATE_LIMITED_MESSAGE,
};
use crate::ports::{
    ClaimAdminApi, GuestApi, IdentificationRequest, IdentifiedGuest, RegisteredGuest,
    RegistrationRequest, SessionStatusReport, SessionValidation, UpdatedProfile,
    VerificationReport,
};

/// Fallback when registration answers `success: false` without a message.
const REGISTRATION_FAILED: &str = "Registration failed.";
/// Fallback when a profile update answers `success: false` without a message.
const UPDATE_FAILED: &str = "Update failed.";

/// Configuration for the HTTP guest API.
#[derive(Debug, Clone)]
pub struct HttpGuestApiConfig {
    /// API root the `/guest/...` and `/admin/...` paths hang off.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Bearer token for the organizer endpoints.
    admin_token: Option<Secret<String>>,
}

impl HttpGuestApiConfig {
    /// Creates a configuration with a 10 second timeout and no admin token.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            admin_token: None,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the organizer bearer token.
    pub fn with_admin_token(mut self, token: Secret<String>) -> Self {
        self.admin_token = Some(token);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// reqwest-backed client for the guest and organizer endpoints.
pub struct HttpGuestApi {
    config: HttpGuestApiConfig,
    client: Client,
}

impl HttpGuestApi {
    /// Creates a client with the given configuration.
    pub fn new(config: HttpGuestApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn admin(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.admin_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Sends a request; only transport failures are errors here.
    async fn send(&self, request: RequestBuilder) -> Result<Response, GuestError> {
        request.send().await.map_err(|e| {
            tracing::debug!(error = %e, timeout = e.is_timeout(), "guest api transport failure");
            GuestError::network(OFFLINE_MESSAGE)
        })
    }

    /// Maps a non-2xx answer to the error taxonomy.
    async fn handle_response_status(response: Response) -> Result<Response, GuestError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());

        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(GuestError::rate_limited(
                message.unwrap_or_else(|| RATE_LIMITED_MESSAGE.to_string()),
            )),
            _ => Err(GuestError::server(
                status.as_u16(),
                message.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            )),
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GuestError> {
        response
            .json::<T>()
            .await
            .map_err(|e| GuestError::Protocol(e.to_string()))
    }

    /// Checks status then decodes the body.
    async fn expect_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GuestError> {
        let response = self.send(request).await?;
        let response = Self::handle_response_status(response).await?;
        Self::decode(response).await
    }

    /// Like `expect_json`, but a 401/403 body is decoded as the answer.
    async fn expect_json_or_auth_signal<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GuestError> {
        let response = self.send(request).await?;
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Self::decode(response).await;
        }
        let response = Self::handle_response_status(response).await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl GuestApi for HttpGuestApi {
    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegisteredGuest, GuestError> {
        let body = RegisterBody {
            guest_name: &request.display_name,
            guest_email: request.email.as_deref(),
            device_identifier: &request.device_identifier,
        };
        let envelope: Envelope<GuestData> = self
            .expect_json(self.client.post(self.config.url("/guest/register")).json(&body))
            .await?;
        Ok(envelope.into_data(REGISTRATION_FAILED)?.into())
    }

    async fn register_with_identification(
        &self,
        request: &IdentificationRequest,
    ) -> Result<IdentifiedGuest, GuestError> {
        let body = IdentificationBody {
            nickname: &request.nickname,
            missing_person_id: request.person_id,
            email: request.email.as_deref(),
            device_identifier: &request.device_identifier,
        };
        let envelope: Envelope<IdentifiedData> = self
            .expect_json(
                self.client
                    .post(self.config.url("/guest/register-with-identification"))
                    .json(&body),
            )
            .await?;
        Ok(envelope.into_data(REGISTRATION_FAILED)?.into())
    }

    async fn validate(&self, token: &SessionToken) -> Result<SessionValidation, GuestError> {
        let body = TokenBody {
            session_token: token.expose(),
        };
        let answer: ValidateAnswer = self
            .expect_json(self.client.post(self.config.url("/guest/validate")).json(&body))
            .await?;
        Ok(SessionValidation {
            valid: answer.valid,
            guest_id: answer.data.and_then(|d| d.id),
        })
    }

    async fn update_profile(
        &self,
        token: &SessionToken,
        display_name: &str,
        email: Option<&str>,
    ) -> Result<UpdatedProfile, GuestError> {
        let body = UpdateBody {
            session_token: token.expose(),
            guest_name: display_name,
            guest_email: email,
        };
        let envelope: Envelope<ProfileData> = self
            .expect_json(self.client.put(self.config.url("/guest/update")).json(&body))
            .await?;
        Ok(envelope.into_data(UPDATE_FAILED)?.into())
    }

    async fn heartbeat(&self, token: &SessionToken) -> Result<(), GuestError> {
        let body = TokenBody {
            session_token: token.expose(),
        };
        let response = self
            .send(self.client.post(self.config.url("/guest/heartbeat")).json(&body))
            .await?;
        Self::handle_response_status(response).await?;
        Ok(())
    }

    async fn session_status(
        &self,
        token: &SessionToken,
    ) -> Result<SessionStatusReport, GuestError> {
        let answer: SessionStatusAnswer = self
            .expect_json_or_auth_signal(
                self.client
                    .get(self.config.url("/guest/session-status"))
                    .query(&[("session_token", token.expose())]),
            )
            .await?;
        Ok(answer.into())
    }

    async fn verification_status(
        &self,
        token: &SessionToken,
    ) -> Result<VerificationReport, GuestError> {
        let envelope: Envelope<VerificationData> = self
            .expect_json_or_auth_signal(
                self.client
                    .get(self.config.url("/guest/verification-status"))
                    .query(&[("session_token", token.expose())]),
            )
            .await?;
        Ok(envelope.into_data(GENERIC_FAILURE_MESSAGE)?.into())
    }

    async fn send_device_link(
        &self,
        token: &SessionToken,
        email: &str,
    ) -> Result<LinkDispatch, GuestError> {
        let body = DeviceLinkBody {
            session_token: token.expose(),
            email,
        };
        let answer: MessageAnswer = self
            .expect_json(self.client.post(self.config.url("/guest/send-link")).json(&body))
            .await?;
        Ok(LinkDispatch {
            success: answer.success,
            message: answer.message_or_default(),
        })
    }

    async fn request_restore_link(&self, email: &str) -> Result<LinkDispatch, GuestError> {
        let answer: MessageAnswer = self
            .expect_json(
                self.client
                    .post(self.config.url("/guest/request-restore-link"))
                    .json(&EmailBody { email }),
            )
            .await?;
        Ok(LinkDispatch {
            success: answer.success,
            message: answer.message_or_default(),
        })
    }

    async fn search_persons(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<PersonMatch>, GuestError> {
        let limit = limit.to_string();
        let envelope: Envelope<Vec<PersonMatch>> = self
            .expect_json(
                self.client
                    .get(self.config.url("/guest/persons/search"))
                    .query(&[("q", query), ("limit", limit.as_str())]),
            )
            .await?;
        if !envelope.success {
            return Ok(Vec::new());
        }
        Ok(envelope.data.unwrap_or_default())
    }
}

#[async_trait]
impl ClaimAdminApi for HttpGuestApi {
    async fn list_pending_claims(&self) -> Result<Vec<PendingClaim>, GuestError> {
        let envelope: Envelope<PendingClaimList> = self
            .expect_json(
                self.admin(self.client.get(self.config.url("/admin/pending-sessions"))),
            )
            .await?;
        Ok(envelope.into_data(GENERIC_FAILURE_MESSAGE)?.into_claims())
    }

    async fn resolve_claim(
        &self,
        claim_id: ClaimId,
        approve: bool,
    ) -> Result<ClaimResolution, GuestError> {
        let path = format!("/admin/guests/{}/resolve-conflict", claim_id);
        let answer: MessageAnswer = self
            .expect_json(
                self.admin(self.client.post(self.config.url(&path)))
                    .json(&ResolveBody { approve }),
            )
            .await?;
        if !answer.success {
            return Err(GuestError::rejected(answer.message, GENERIC_FAILURE_MESSAGE));
        }
        Ok(ClaimResolution {
            claim_id,
            approved: approve,
            message: answer.message.unwrap_or_default(),
        })
    }
}
