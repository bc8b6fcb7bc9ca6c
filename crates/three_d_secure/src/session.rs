//! Working state for one in-flight verification attempt.

use serde::{Deserialize, Serialize};

use crate::types::{DeviceFingerprintSession, ThreeDSecureLookup, VerificationRequest};

/// Progression of a verification attempt.
///
/// Terminal states are final: a session that reached one must never be
/// resumed again.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Init,
    ConfigChecked,
    FingerprintAttempted,
    LookupPending,
    NoChallenge,
    RedirectChallengePresented,
    EmbeddedChallengePresented,
    Authenticating,
    Done,
    Failed,
    Canceled,
}

impl SessionState {
    /// Whether the attempt has finished, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Canceled)
    }
}

/// Snapshot of an attempt suspended on a challenge.
///
/// The core holds no durable storage: while the cardholder is away
/// authenticating, the host is contractually required to persist this value
/// (it serializes with `serde`) and hand it back unchanged, or semantically
/// unchanged after a process restart, to the matching resume entry point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationSession {
    pub(crate) state: SessionState,
    pub(crate) request: VerificationRequest,
    pub(crate) device_fingerprint: Option<DeviceFingerprintSession>,
    pub(crate) lookup: Option<ThreeDSecureLookup>,
}

impl VerificationSession {
    pub(crate) fn new(request: VerificationRequest) -> Self {
        Self {
            state: SessionState::Init,
            request,
            device_fingerprint: None,
            lookup: None,
        }
    }

    /// Current machine state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The request this attempt was started with.
    pub fn request(&self) -> &VerificationRequest {
        &self.request
    }

    /// The lookup result pending challenge completion, once obtained.
    pub fn lookup(&self) -> Option<&ThreeDSecureLookup> {
        self.lookup.as_ref()
    }

    pub(crate) fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }
}
