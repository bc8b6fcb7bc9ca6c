//! Error types surfaced by the verification core.

/// Custom Result
/// A custom datatype that wraps the error variant <E> into a report, allowing
/// error_stack::Report<E> specific extendability
///
/// Effectively, equivalent to `Result<T, error_stack::Report<E>>`
pub type CustomResult<T, E> = error_stack::Result<T, E>;

/// Terminal failure taxonomy for a verification attempt.
///
/// User cancellation is deliberately absent here: it is a normal terminal
/// outcome, reported through
/// [`VerificationOutcome::Canceled`](crate::types::VerificationOutcome).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// The caller supplied a request missing a required field. Not retried.
    #[error("Missing required field: {field_name}")]
    InvalidRequest {
        /// Name of the absent field.
        field_name: &'static str,
    },

    /// 3D Secure is not enabled for this merchant account.
    #[error("Three D Secure is not enabled for this account. Please contact support for assistance.")]
    NotEnabled,

    /// Protocol 2 was requested but no authentication credential is
    /// provisioned for the merchant.
    #[error("Merchant is not configured for 3DS 2.0. Please contact support for assistance.")]
    NotProvisionedForV2,

    /// The host cannot receive the redirect callback (missing or conflicting
    /// return-scheme registration).
    #[error("Redirect callback registration is missing or incorrectly configured for this host")]
    MisconfiguredHost,

    /// Network or HTTP failure at the lookup or authenticate stage. Retry
    /// policy, if any, belongs to the transport behind the seam.
    #[error("Transport failure while calling the payment gateway")]
    TransportError,

    /// The gateway responded with a body that does not match the documented
    /// shape. Never retried automatically.
    #[error("Unexpected response shape from the payment gateway")]
    ProtocolError,

    /// The challenge completed but server-side validation rejected it.
    #[error("Challenge was rejected during server-side validation")]
    ChallengeRejected {
        /// Raw authentication response payload, kept for diagnostics.
        response: String,
    },

    /// The challenge infrastructure reported an error or timed out.
    #[error("Challenge infrastructure reported an error: {description}")]
    ChallengeError {
        /// Description supplied by the challenge presenter.
        description: String,
    },

    /// The supplied session is foreign to this resume entry point or has
    /// already reached a terminal state. Host programming error.
    #[error("Session cannot be resumed from this entry point")]
    InvalidSessionResume,
}

/// Failure while fetching the merchant configuration.
#[derive(Debug, thiserror::Error)]
#[error("Failed to fetch merchant configuration")]
pub struct ConfigurationError;

/// Failure while collecting device signals. Tolerated by the core.
#[derive(Debug, thiserror::Error)]
#[error("Device fingerprint collection failed")]
pub struct DeviceFingerprintError;

/// Transport-level failure reported by a gateway client.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("Request could not be dispatched")]
    RequestFailed,
    /// The gateway answered with an error status.
    #[error("Received error status code: {status_code}")]
    ErrorStatus {
        /// HTTP status code returned by the gateway.
        status_code: u16,
    },
}
