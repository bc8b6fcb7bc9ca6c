//! 3D Secure cardholder verification orchestration.
//!
//! Takes a tokenized payment method reference and a transaction amount,
//! decides which protocol version applies, coordinates a best-effort device
//! fingerprint, performs the server-side lookup, routes the cardholder
//! through a redirect or embedded challenge, and reconciles the outcome
//! into an upgraded reference carrying liability-shift metadata. A
//! successful verification benefits from a shift of fraud liability away
//! from the merchant.
//!
//! Transport, configuration retrieval, device fingerprinting and challenge
//! presentation are injected through the traits in [`interfaces`]; the
//! crate owns session state and decision logic only.

pub mod consts;
pub mod core;
pub mod errors;
pub mod interfaces;
pub mod session;
pub mod types;

pub use crate::{
    core::{
        routing::{route, ChallengeRoute},
        VerificationClient, VerificationProgress,
    },
    errors::VerificationError,
    session::{SessionState, VerificationSession},
    types::{
        CardNonce, ChallengeActionCode, Configuration, DeviceFingerprintSession,
        EmbeddedChallengeResult, HostCapabilities, RedirectChallengeResult, RedirectStatus,
        ThreeDSecureInfo, ThreeDSecureLookup, ThreeDSecureVersion, VerificationOutcome,
        VerificationRequest,
    },
};
