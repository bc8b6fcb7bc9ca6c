//! Domain types exchanged between the host, the orchestrator and the
//! gateway.

use masking::Secret;
use serde::{Deserialize, Serialize};
use url::Url;

/// Requested 3D Secure protocol version.
///
/// Protocol 2 is the default; protocol 1 skips device fingerprinting and
/// authenticates through a browser redirect instead of an embedded
/// challenge.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, strum::Display)]
pub enum ThreeDSecureVersion {
    /// Legacy redirect-based protocol.
    #[serde(rename = "1")]
    #[strum(serialize = "1")]
    V1,
    /// Embedded-challenge protocol.
    #[default]
    #[serde(rename = "2")]
    #[strum(serialize = "2")]
    V2,
}

/// Immutable input for one verification attempt.
///
/// `amount` and `nonce` must both be non-empty before a lookup may be
/// attempted; the merchant-context fields are opaque pass-through payload.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Transaction amount as a decimal string, e.g. `"10.00"`.
    pub amount: String,
    /// Tokenized payment method reference to verify.
    pub nonce: String,
    /// Protocol version to attempt.
    #[serde(default)]
    pub requested_version: ThreeDSecureVersion,
    /// Merchant account to verify against, when not the default one.
    pub merchant_account_id: Option<String>,
    /// Locale forwarded to the challenge UI.
    pub locale: Option<String>,
}

impl VerificationRequest {
    /// Convenience constructor for the required fields.
    pub fn new(amount: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            nonce: nonce.into(),
            requested_version: ThreeDSecureVersion::default(),
            merchant_account_id: None,
            locale: None,
        }
    }
}

/// Merchant configuration inputs, fetched once per attempt.
#[derive(Clone, Debug)]
pub struct Configuration {
    /// Whether 3D Secure is enabled for the merchant account.
    pub three_d_secure_enabled: bool,
    /// Credential provisioning protocol 2; absence means the merchant cannot
    /// run an embedded challenge.
    pub cardinal_authentication_jwt: Option<Secret<String>>,
    /// Base URL of the assets host serving the redirect frame.
    pub assets_url: String,
}

/// Host-side preconditions for receiving the redirect callback.
#[derive(Clone, Debug)]
pub struct HostCapabilities {
    /// Scheme the host registered for return-URI callbacks.
    pub return_url_scheme: String,
    /// Whether the registration is actually in place.
    pub can_receive_redirect_callback: bool,
}

/// Correlation id produced by the device fingerprint stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DeviceFingerprintSession {
    /// Reference id forwarded to the lookup as `dfReferenceId`.
    pub df_reference_id: String,
}

/// Liability-shift facts asserted by the gateway. Never recomputed locally.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDSecureInfo {
    #[serde(default)]
    pub liability_shifted: bool,
    #[serde(default)]
    pub liability_shift_possible: bool,
    /// Populated when a post-challenge upgrade was rejected and the
    /// lookup-stage nonce was returned instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Payment method reference carrying its 3D Secure verification state.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardNonce {
    /// The reference id itself.
    pub nonce: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_two: Option<String>,
    #[serde(default)]
    pub three_d_secure_info: ThreeDSecureInfo,
}

/// Parsed lookup response.
///
/// `md`, `term_url` and `pareq` only appear on legacy-protocol lookups and
/// feed the redirect URL construction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDSecureLookup {
    /// Issuer ACS endpoint. Presence is what demands a challenge.
    pub acs_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pareq: Option<String>,
    /// Protocol version the gateway selected, e.g. `"1.0.2"` or `"2.1.0"`.
    pub three_d_secure_version: String,
    /// Candidate upgraded payment method reference.
    pub card_nonce: CardNonce,
}

impl ThreeDSecureLookup {
    /// A challenge is required exactly when the gateway returned an ACS
    /// endpoint.
    pub fn requires_user_authentication(&self) -> bool {
        self.acs_url.is_some()
    }
}

/// What the external redirect presenter reported back.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirectStatus {
    /// The browser switch returned through the callback URI.
    Ok,
    /// The user abandoned the browser switch.
    Canceled,
}

/// Outcome handed back by the redirect presenter on resume.
#[derive(Clone, Debug)]
pub struct RedirectChallengeResult {
    pub status: RedirectStatus,
    /// Query-bearing return URI, present only on [`RedirectStatus::Ok`].
    pub return_uri: Option<Url>,
}

/// Classification reported by the embedded challenge presenter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
pub enum ChallengeActionCode {
    #[strum(serialize = "SUCCESS")]
    Success,
    #[strum(serialize = "NOACTION")]
    NoAction,
    #[strum(serialize = "FAILURE")]
    Failure,
    #[strum(serialize = "ERROR")]
    Error,
    #[strum(serialize = "TIMEOUT")]
    Timeout,
    #[strum(serialize = "CANCEL")]
    Cancel,
}

/// Outcome handed back by the embedded challenge presenter on resume.
#[derive(Clone, Debug)]
pub struct EmbeddedChallengeResult {
    pub action_code: ChallengeActionCode,
    /// Challenge proof, present for `SUCCESS`, `NOACTION` and `FAILURE`.
    pub jwt: Option<Secret<String>>,
    /// Present for `ERROR` and `TIMEOUT`.
    pub error_description: Option<String>,
}

/// Terminal result of a verification attempt.
///
/// Cancellation is a first-class outcome rather than an error: the user
/// explicitly walked away, nothing malfunctioned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VerificationOutcome {
    /// The attempt finished with an upgraded payment method reference.
    Completed {
        /// Reference carrying the final liability-shift flags.
        card_nonce: CardNonce,
    },
    /// The user canceled the challenge.
    Canceled {
        /// Presenter-reported cancellation reason.
        reason: String,
    },
}
