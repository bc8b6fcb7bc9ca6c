//! Call-counting collaborator doubles shared by the flow tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use error_stack::report;
use masking::Secret;
use serde_json::json;
use three_d_secure::{
    errors::{ConfigurationError, CustomResult, DeviceFingerprintError, TransportError},
    interfaces::{
        AuthenticationFinalizer, ConfigurationSource, DeviceFingerprintClient, LookupClient,
    },
    Configuration, DeviceFingerprintSession, HostCapabilities, VerificationClient,
    VerificationRequest,
};

pub fn enabled_configuration() -> Configuration {
    Configuration {
        three_d_secure_enabled: true,
        cardinal_authentication_jwt: Some(Secret::new("cardinal-credential".to_owned())),
        assets_url: "https://assets.example.com".to_owned(),
    }
}

#[derive(Clone)]
pub struct StaticConfigurationSource(pub Configuration);

#[async_trait]
impl ConfigurationSource for StaticConfigurationSource {
    async fn fetch_configuration(&self) -> CustomResult<Configuration, ConfigurationError> {
        Ok(self.0.clone())
    }
}

/// Configuration seam whose fetch always fails at transport level.
pub struct FailingConfigurationSource;

#[async_trait]
impl ConfigurationSource for FailingConfigurationSource {
    async fn fetch_configuration(&self) -> CustomResult<Configuration, ConfigurationError> {
        Err(report!(ConfigurationError))
    }
}

/// Returns a fixed reference id, or fails when none is configured.
#[derive(Clone, Default)]
pub struct MockFingerprintClient {
    pub reference_id: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl MockFingerprintClient {
    pub fn returning(reference_id: &str) -> Self {
        Self {
            reference_id: Some(reference_id.to_owned()),
            calls: Arc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceFingerprintClient for MockFingerprintClient {
    async fn collect_device_data(
        &self,
        _configuration: &Configuration,
        _request: &VerificationRequest,
    ) -> CustomResult<DeviceFingerprintSession, DeviceFingerprintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reference_id {
            Some(id) => Ok(DeviceFingerprintSession {
                df_reference_id: id.clone(),
            }),
            None => Err(report!(DeviceFingerprintError)),
        }
    }
}

/// Records every posted request; fails transport when no response is set.
#[derive(Clone, Default)]
pub struct MockLookupClient {
    pub response: Option<String>,
    pub calls: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockLookupClient {
    pub fn returning(response: String) -> Self {
        Self {
            response: Some(response),
            calls: Arc::default(),
            requests: Arc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded_requests(&self) -> Vec<(String, String)> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }
}

#[async_trait]
impl LookupClient for MockLookupClient {
    async fn post_lookup(&self, path: &str, body: String) -> CustomResult<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push((path.to_owned(), body));
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Err(report!(TransportError::RequestFailed)),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockFinalizer {
    pub response: Option<String>,
    pub calls: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockFinalizer {
    pub fn returning(response: String) -> Self {
        Self {
            response: Some(response),
            calls: Arc::default(),
            requests: Arc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded_requests(&self) -> Vec<(String, String)> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }
}

#[async_trait]
impl AuthenticationFinalizer for MockFinalizer {
    async fn post_authenticate(
        &self,
        path: &str,
        body: String,
    ) -> CustomResult<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push((path.to_owned(), body));
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Err(report!(TransportError::RequestFailed)),
        }
    }
}

pub struct TestHarness {
    pub client: VerificationClient,
    pub fingerprint: MockFingerprintClient,
    pub lookup: MockLookupClient,
    pub finalizer: MockFinalizer,
}

pub fn harness(
    configuration: Configuration,
    fingerprint: MockFingerprintClient,
    lookup: MockLookupClient,
    finalizer: MockFinalizer,
) -> TestHarness {
    harness_with_host(
        configuration,
        fingerprint,
        lookup,
        finalizer,
        HostCapabilities {
            return_url_scheme: "com.merchant.app.payments".to_owned(),
            can_receive_redirect_callback: true,
        },
    )
}

pub fn harness_with_failing_configuration(
    lookup: MockLookupClient,
    finalizer: MockFinalizer,
) -> TestHarness {
    let fingerprint = MockFingerprintClient::default();
    let client = VerificationClient::new(
        Box::new(FailingConfigurationSource),
        Box::new(fingerprint.clone()),
        Box::new(lookup.clone()),
        Box::new(finalizer.clone()),
        Secret::new("bearer-token".to_owned()),
        HostCapabilities {
            return_url_scheme: "com.merchant.app.payments".to_owned(),
            can_receive_redirect_callback: true,
        },
    );
    TestHarness {
        client,
        fingerprint,
        lookup,
        finalizer,
    }
}

pub fn harness_with_host(
    configuration: Configuration,
    fingerprint: MockFingerprintClient,
    lookup: MockLookupClient,
    finalizer: MockFinalizer,
    host: HostCapabilities,
) -> TestHarness {
    let client = VerificationClient::new(
        Box::new(StaticConfigurationSource(configuration)),
        Box::new(fingerprint.clone()),
        Box::new(lookup.clone()),
        Box::new(finalizer.clone()),
        Secret::new("bearer-token".to_owned()),
        host,
    );
    TestHarness {
        client,
        fingerprint,
        lookup,
        finalizer,
    }
}

pub fn lookup_response(acs_url: Option<&str>, version: &str, nonce: &str) -> String {
    let mut body = json!({
        "threeDSecureVersion": version,
        "cardNonce": {
            "nonce": nonce,
            "threeDSecureInfo": {
                "liabilityShifted": false,
                "liabilityShiftPossible": true
            }
        }
    });
    if let Some(acs_url) = acs_url {
        body["acsUrl"] = json!(acs_url);
    }
    body.to_string()
}

pub fn finalize_success_response(nonce: &str) -> String {
    json!({
        "cardNonce": {
            "nonce": nonce,
            "threeDSecureInfo": {
                "liabilityShifted": true,
                "liabilityShiftPossible": true
            }
        }
    })
    .to_string()
}
