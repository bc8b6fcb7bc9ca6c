//! Seams for the injected collaborators.
//!
//! The orchestrator owns decision logic only; everything that touches the
//! network, the device or the platform lives behind one of these traits and
//! is injected at construction. Transport concerns (retries, TLS, base
//! URLs) belong entirely to the implementations.

use async_trait::async_trait;

use crate::{
    errors::{ConfigurationError, CustomResult, DeviceFingerprintError, TransportError},
    types::{Configuration, DeviceFingerprintSession, VerificationRequest},
};

/// Read-only merchant configuration, fetched once per attempt.
#[async_trait]
pub trait ConfigurationSource: Send + Sync {
    async fn fetch_configuration(&self) -> CustomResult<Configuration, ConfigurationError>;
}

/// Best-effort device signal collection.
///
/// A failure here never blocks the flow; the orchestrator proceeds without
/// a reference id.
#[async_trait]
pub trait DeviceFingerprintClient: Send + Sync {
    async fn collect_device_data(
        &self,
        configuration: &Configuration,
        request: &VerificationRequest,
    ) -> CustomResult<DeviceFingerprintSession, DeviceFingerprintError>;
}

/// Transport for the lookup call.
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Posts `body` to `path` and returns the raw response body.
    async fn post_lookup(&self, path: &str, body: String) -> CustomResult<String, TransportError>;
}

/// Transport for the post-challenge upgrade call.
#[async_trait]
pub trait AuthenticationFinalizer: Send + Sync {
    /// Posts `body` to `path` and returns the raw response body.
    async fn post_authenticate(
        &self,
        path: &str,
        body: String,
    ) -> CustomResult<String, TransportError>;
}
