//! Verification orchestration state machine.
//!
//! One [`VerificationClient`] drives a single attempt strictly forward:
//! configuration check, best-effort device fingerprint, lookup, then either
//! an immediate completion or a suspension on a redirect or embedded
//! challenge. The host persists the suspended [`VerificationSession`] and
//! hands it back, together with the presenter's outcome, to exactly one
//! resume entry point.

pub mod routing;
pub mod transformers;

use error_stack::{report, ResultExt};
use masking::Secret;
use tracing::instrument;
use url::Url;

use crate::{
    errors::{CustomResult, VerificationError},
    interfaces::{
        AuthenticationFinalizer, ConfigurationSource, DeviceFingerprintClient, LookupClient,
    },
    session::{SessionState, VerificationSession},
    types::{
        CardNonce, ChallengeActionCode, Configuration, EmbeddedChallengeResult, HostCapabilities,
        RedirectChallengeResult, RedirectStatus, ThreeDSecureLookup, ThreeDSecureVersion,
        VerificationOutcome, VerificationRequest,
    },
};

/// Where a verification attempt stands after [`VerificationClient::start_verification`].
#[derive(Debug)]
pub enum VerificationProgress {
    /// The issuer waived the challenge; the attempt is finished.
    Complete(VerificationOutcome),
    /// Suspended on the legacy redirect challenge: hand `url` to the browser
    /// switch, persist `session`, resume through
    /// [`VerificationClient::resume_from_redirect`].
    RedirectChallenge {
        session: VerificationSession,
        url: Url,
    },
    /// Suspended on the embedded native challenge: hand `lookup` to the
    /// challenge UI, persist `session`, resume through
    /// [`VerificationClient::resume_from_embedded_challenge`].
    EmbeddedChallenge {
        session: VerificationSession,
        lookup: ThreeDSecureLookup,
    },
}

/// Drives one cardholder verification attempt end to end.
///
/// Holds no state across attempts; everything per-attempt lives in the
/// [`VerificationSession`] handed to the caller on suspension.
pub struct VerificationClient {
    configuration_source: Box<dyn ConfigurationSource>,
    device_fingerprint_client: Box<dyn DeviceFingerprintClient>,
    lookup_client: Box<dyn LookupClient>,
    authentication_finalizer: Box<dyn AuthenticationFinalizer>,
    authorization_fingerprint: Secret<String>,
    host: HostCapabilities,
}

impl VerificationClient {
    pub fn new(
        configuration_source: Box<dyn ConfigurationSource>,
        device_fingerprint_client: Box<dyn DeviceFingerprintClient>,
        lookup_client: Box<dyn LookupClient>,
        authentication_finalizer: Box<dyn AuthenticationFinalizer>,
        authorization_fingerprint: Secret<String>,
        host: HostCapabilities,
    ) -> Self {
        Self {
            configuration_source,
            device_fingerprint_client,
            lookup_client,
            authentication_finalizer,
            authorization_fingerprint,
            host,
        }
    }

    /// Starts a verification attempt and runs it up to its first suspension
    /// point or completion.
    #[instrument(skip_all, fields(requested_version = %request.requested_version))]
    pub async fn start_verification(
        &self,
        request: VerificationRequest,
    ) -> CustomResult<VerificationProgress, VerificationError> {
        let mut session = VerificationSession::new(request);

        let configuration = self.check_configuration(&mut session).await?;
        self.attempt_device_fingerprint(&configuration, &mut session)
            .await;
        let lookup = self.perform_lookup(&mut session).await?;

        self.present_challenge(&configuration, session, lookup)
    }

    /// Initializes the challenge for a lookup the host already performed
    /// against the gateway server-side, from the raw response body.
    ///
    /// The attempt joins the state machine at the routing decision; the
    /// configuration check, fingerprinting and lookup stages are the host's
    /// responsibility on this path.
    #[instrument(skip_all)]
    pub async fn initialize_challenge_from_lookup_response(
        &self,
        request: VerificationRequest,
        lookup_response: &str,
    ) -> CustomResult<VerificationProgress, VerificationError> {
        let mut session = VerificationSession::new(request);

        let configuration = self
            .configuration_source
            .fetch_configuration()
            .await
            .change_context(VerificationError::TransportError)
            .attach_printable("failed to fetch merchant configuration")?;

        session.transition(SessionState::LookupPending);
        let lookup: ThreeDSecureLookup = serde_json::from_str(lookup_response)
            .change_context(VerificationError::ProtocolError)
            .attach_printable("lookup response did not match the expected shape")?;
        session.lookup = Some(lookup.clone());

        self.present_challenge(&configuration, session, lookup)
    }

    /// Resumes a session suspended on the redirect challenge.
    ///
    /// The redirect protocol carries its own finalized result inside the
    /// return URI, so no authenticate call is made on this branch.
    #[instrument(skip_all, fields(state = ?session.state()))]
    pub async fn resume_from_redirect(
        &self,
        session: &mut VerificationSession,
        result: RedirectChallengeResult,
    ) -> CustomResult<VerificationOutcome, VerificationError> {
        if session.state() != SessionState::RedirectChallengePresented {
            return Err(report!(VerificationError::InvalidSessionResume))
                .attach_printable("session is not suspended on a redirect challenge");
        }

        if let RedirectStatus::Canceled = result.status {
            return seal(
                session,
                Ok(VerificationOutcome::Canceled {
                    reason: "user canceled".to_owned(),
                }),
            );
        }

        session.transition(SessionState::Authenticating);
        let outcome = complete_redirect(result);
        seal(session, outcome)
    }

    /// Resumes a session suspended on the embedded challenge.
    ///
    /// `SUCCESS`, `NOACTION` and `FAILURE` all proceed to the upgrade call;
    /// the state guard ensures the finalizer runs at most once per session.
    #[instrument(skip_all, fields(state = ?session.state(), action_code = %result.action_code))]
    pub async fn resume_from_embedded_challenge(
        &self,
        session: &mut VerificationSession,
        result: EmbeddedChallengeResult,
    ) -> CustomResult<VerificationOutcome, VerificationError> {
        if session.state() != SessionState::EmbeddedChallengePresented {
            return Err(report!(VerificationError::InvalidSessionResume))
                .attach_printable("session is not suspended on an embedded challenge");
        }

        match result.action_code {
            ChallengeActionCode::Success
            | ChallengeActionCode::NoAction
            | ChallengeActionCode::Failure => {
                session.transition(SessionState::Authenticating);
                let outcome = self.authenticate_from_jwt(session, result.jwt).await;
                seal(session, outcome)
            }
            ChallengeActionCode::Error | ChallengeActionCode::Timeout => seal(
                session,
                Err(report!(VerificationError::ChallengeError {
                    description: result.error_description.unwrap_or_default(),
                })),
            ),
            ChallengeActionCode::Cancel => seal(
                session,
                Ok(VerificationOutcome::Canceled {
                    reason: "user canceled 3DS".to_owned(),
                }),
            ),
        }
    }

    fn present_challenge(
        &self,
        configuration: &Configuration,
        mut session: VerificationSession,
        lookup: ThreeDSecureLookup,
    ) -> CustomResult<VerificationProgress, VerificationError> {
        match routing::route(&lookup) {
            routing::ChallengeRoute::NoChallenge => {
                session.transition(SessionState::NoChallenge);
                session.transition(SessionState::Done);
                Ok(VerificationProgress::Complete(reconcile(lookup.card_nonce)))
            }
            routing::ChallengeRoute::Redirect => {
                let url = transformers::redirect_challenge_url(
                    &self.host.return_url_scheme,
                    &configuration.assets_url,
                    session.request(),
                    &lookup,
                )?;
                session.transition(SessionState::RedirectChallengePresented);
                Ok(VerificationProgress::RedirectChallenge { session, url })
            }
            routing::ChallengeRoute::Embedded => {
                session.transition(SessionState::EmbeddedChallengePresented);
                Ok(VerificationProgress::EmbeddedChallenge { session, lookup })
            }
        }
    }

    async fn check_configuration(
        &self,
        session: &mut VerificationSession,
    ) -> CustomResult<Configuration, VerificationError> {
        let request = session.request();
        if request.amount.is_empty() {
            return Err(report!(VerificationError::InvalidRequest {
                field_name: "amount",
            }));
        }
        if request.nonce.is_empty() {
            return Err(report!(VerificationError::InvalidRequest {
                field_name: "nonce",
            }));
        }

        let configuration = self
            .configuration_source
            .fetch_configuration()
            .await
            .change_context(VerificationError::TransportError)
            .attach_printable("failed to fetch merchant configuration")?;

        if !configuration.three_d_secure_enabled {
            return Err(report!(VerificationError::NotEnabled));
        }
        if !self.host.can_receive_redirect_callback {
            return Err(report!(VerificationError::MisconfiguredHost));
        }
        if request.requested_version == ThreeDSecureVersion::V2
            && configuration.cardinal_authentication_jwt.is_none()
        {
            return Err(report!(VerificationError::NotProvisionedForV2));
        }

        session.transition(SessionState::ConfigChecked);
        Ok(configuration)
    }

    async fn attempt_device_fingerprint(
        &self,
        configuration: &Configuration,
        session: &mut VerificationSession,
    ) {
        if session.request().requested_version == ThreeDSecureVersion::V1 {
            // The legacy protocol has no device-signal stage.
            session.transition(SessionState::FingerprintAttempted);
            return;
        }

        match self
            .device_fingerprint_client
            .collect_device_data(configuration, session.request())
            .await
        {
            Ok(fingerprint) => {
                session.device_fingerprint = Some(fingerprint);
            }
            Err(error) => {
                // Best-effort enrichment; the lookup proceeds without a
                // reference id.
                tracing::warn!(?error, "device fingerprint collection failed");
            }
        }
        session.transition(SessionState::FingerprintAttempted);
    }

    async fn perform_lookup(
        &self,
        session: &mut VerificationSession,
    ) -> CustomResult<ThreeDSecureLookup, VerificationError> {
        session.transition(SessionState::LookupPending);

        let body = transformers::LookupRequest::new(
            self.authorization_fingerprint.clone(),
            session.request(),
            session.device_fingerprint.as_ref(),
        );
        let body = serde_json::to_string(&body)
            .change_context(VerificationError::ProtocolError)
            .attach_printable("failed to serialize the lookup request")?;
        let path = transformers::lookup_path(&session.request().nonce);

        let response = self
            .lookup_client
            .post_lookup(&path, body)
            .await
            .change_context(VerificationError::TransportError)
            .attach_printable("lookup call failed")?;
        let lookup: ThreeDSecureLookup = serde_json::from_str(&response)
            .change_context(VerificationError::ProtocolError)
            .attach_printable("lookup response did not match the expected shape")?;

        session.lookup = Some(lookup.clone());
        Ok(lookup)
    }

    async fn authenticate_from_jwt(
        &self,
        session: &VerificationSession,
        jwt: Option<Secret<String>>,
    ) -> CustomResult<VerificationOutcome, VerificationError> {
        let lookup = session
            .lookup()
            .ok_or(VerificationError::InvalidSessionResume)
            .attach_printable("session carries no pending lookup result")?;
        let jwt = jwt
            .ok_or(VerificationError::ProtocolError)
            .attach_printable("challenge completed without an authentication token")?;

        let lookup_nonce = lookup.card_nonce.nonce.clone();
        let body = transformers::AuthenticateFromJwtRequest {
            jwt,
            payment_method_nonce: lookup_nonce.clone(),
        };
        let body = serde_json::to_string(&body)
            .change_context(VerificationError::ProtocolError)
            .attach_printable("failed to serialize the authenticate request")?;
        let path = transformers::authenticate_path(&lookup_nonce);

        let response = self
            .authentication_finalizer
            .post_authenticate(&path, body)
            .await
            .change_context(VerificationError::TransportError)
            .attach_printable("authenticate call failed")?;
        let response: transformers::AuthenticateFromJwtResponse = serde_json::from_str(&response)
            .change_context(VerificationError::ProtocolError)
            .attach_printable("authenticate response did not match the expected shape")?;

        match response.error_message() {
            Some(message) => {
                // The upgrade was rejected by validation; the pre-challenge
                // reference stays usable and is returned annotated.
                tracing::warn!("payment method upgrade rejected, returning the lookup nonce");
                let mut card_nonce = lookup.card_nonce.clone();
                card_nonce.three_d_secure_info.error_message = Some(message);
                Ok(reconcile(card_nonce))
            }
            None => {
                let card_nonce = response
                    .card_nonce
                    .ok_or(VerificationError::ProtocolError)
                    .attach_printable("authenticate response is missing the upgraded nonce")?;
                Ok(reconcile(card_nonce))
            }
        }
    }
}

/// Emits the terminal outcome for an upgraded reference. The liability-shift
/// flags are gateway-asserted facts and pass through untouched.
pub fn reconcile(card_nonce: CardNonce) -> VerificationOutcome {
    tracing::debug!(
        liability_shifted = card_nonce.three_d_secure_info.liability_shifted,
        liability_shift_possible = card_nonce.three_d_secure_info.liability_shift_possible,
        "verification complete"
    );
    VerificationOutcome::Completed { card_nonce }
}

fn complete_redirect(
    result: RedirectChallengeResult,
) -> CustomResult<VerificationOutcome, VerificationError> {
    let uri = result
        .return_uri
        .ok_or(VerificationError::ProtocolError)
        .attach_printable("redirect returned without a callback uri")?;
    let (response, raw) = transformers::parse_redirect_auth_response(&uri)?;
    if !response.success {
        return Err(report!(VerificationError::ChallengeRejected { response: raw }));
    }
    let card_nonce = response
        .nonce
        .ok_or(VerificationError::ProtocolError)
        .attach_printable("authentication response is missing the upgraded nonce")?;
    Ok(reconcile(card_nonce))
}

/// Drives the session into its terminal state. Terminal sessions fail every
/// further resume with `InvalidSessionResume`.
fn seal(
    session: &mut VerificationSession,
    outcome: CustomResult<VerificationOutcome, VerificationError>,
) -> CustomResult<VerificationOutcome, VerificationError> {
    match &outcome {
        Ok(VerificationOutcome::Completed { .. }) => session.transition(SessionState::Done),
        Ok(VerificationOutcome::Canceled { .. }) => session.transition(SessionState::Canceled),
        Err(_) => session.transition(SessionState::Failed),
    }
    outcome
}
