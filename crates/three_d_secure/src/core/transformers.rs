//! Request construction and response shapes for the lookup and
//! authenticate-from-jwt gateway calls.

use error_stack::ResultExt;
use masking::{PeekInterface, Secret};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    consts,
    errors::{CustomResult, VerificationError},
    types::{CardNonce, DeviceFingerprintSession, ThreeDSecureLookup, VerificationRequest},
};

fn expose_secret_string<S>(value: &Secret<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(value.peek())
}

/// Body posted to the lookup endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    #[serde(serialize_with = "expose_secret_string")]
    pub authorization_fingerprint: Secret<String>,
    pub braintree_library_version: String,
    pub nonce: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_account_id: Option<String>,
    pub client_metadata: ClientMetadata,
}

/// Client context attached to every lookup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    pub requested_three_d_secure_version: String,
    pub sdk_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub df_reference_id: Option<String>,
}

impl LookupRequest {
    pub fn new(
        authorization_fingerprint: Secret<String>,
        request: &VerificationRequest,
        device_fingerprint: Option<&DeviceFingerprintSession>,
    ) -> Self {
        Self {
            authorization_fingerprint,
            braintree_library_version: format!(
                "{}-{}",
                consts::LIBRARY_PLATFORM,
                consts::LIBRARY_VERSION
            ),
            nonce: request.nonce.clone(),
            amount: request.amount.clone(),
            merchant_account_id: request.merchant_account_id.clone(),
            client_metadata: ClientMetadata {
                requested_three_d_secure_version: request.requested_version.to_string(),
                sdk_version: format!(
                    "{}/{}",
                    consts::LIBRARY_PLATFORM,
                    consts::LIBRARY_VERSION
                ),
                df_reference_id: device_fingerprint
                    .map(|session| session.df_reference_id.clone()),
            },
        }
    }
}

/// Body posted to the authenticate-from-jwt endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateFromJwtRequest {
    #[serde(serialize_with = "expose_secret_string")]
    pub jwt: Secret<String>,
    pub payment_method_nonce: String,
}

/// Response of the authenticate-from-jwt endpoint. `errors` is populated
/// when server-side validation rejects the upgrade.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateFromJwtResponse {
    pub card_nonce: Option<CardNonce>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

impl AuthenticateFromJwtResponse {
    /// Human-readable rendering of the validation errors, if any.
    pub fn error_message(&self) -> Option<String> {
        self.errors.as_ref().map(|errors| {
            errors
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| errors.to_string())
        })
    }
}

/// Payload carried back through the redirect return URI's `auth_response`
/// query parameter.
#[derive(Debug, Deserialize)]
pub struct RedirectAuthResponse {
    #[serde(default)]
    pub success: bool,
    pub nonce: Option<CardNonce>,
}

pub(crate) fn versioned_path(path: &str) -> String {
    format!("{}/{}", consts::API_VERSION_PATH, path)
}

/// Lookup endpoint path, keyed by the payment method reference.
pub fn lookup_path(nonce: &str) -> String {
    versioned_path(&format!(
        "{}/{}/three_d_secure/lookup",
        consts::PAYMENT_METHOD_ENDPOINT,
        nonce
    ))
}

/// Authenticate-from-jwt endpoint path, keyed by the lookup nonce.
pub fn authenticate_path(lookup_nonce: &str) -> String {
    versioned_path(&format!(
        "{}/{}/three_d_secure/authenticate_from_jwt",
        consts::PAYMENT_METHOD_ENDPOINT,
        lookup_nonce
    ))
}

/// Extracts and parses the `auth_response` payload from the redirect return
/// URI, returning the parsed shape along with the raw payload for
/// diagnostics.
pub fn parse_redirect_auth_response(
    uri: &Url,
) -> CustomResult<(RedirectAuthResponse, String), VerificationError> {
    let raw = uri
        .query_pairs()
        .find(|(key, _)| key == consts::AUTH_RESPONSE_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or(VerificationError::ProtocolError)
        .attach_printable("return uri is missing the auth_response query parameter")?;
    let response = serde_json::from_str(&raw)
        .change_context(VerificationError::ProtocolError)
        .attach_printable("auth_response payload did not match the expected shape")?;
    Ok((response, raw))
}

/// Deterministic browser-switch URL for the legacy redirect challenge.
///
/// The challenge runs inside the assets-hosted redirect frame; the frame
/// posts the cardholder to the ACS and lands them back on the host through
/// the registered return scheme.
pub fn redirect_challenge_url(
    return_url_scheme: &str,
    assets_url: &str,
    request: &VerificationRequest,
    lookup: &ThreeDSecureLookup,
) -> CustomResult<Url, VerificationError> {
    let callback = format!("{}://{}", return_url_scheme, consts::CALLBACK_HOST_PATH);

    let mut term_url = Url::parse(&format!(
        "{}/{}/redirect.html",
        assets_url,
        consts::REDIRECT_FRAME_PATH
    ))
    .change_context(VerificationError::ProtocolError)
    .attach_printable("assets url is not a valid base url")?;
    term_url
        .query_pairs_mut()
        .append_pair("redirect_url", &format!("{}?nonce={}", callback, request.nonce));

    let mut frame_url = Url::parse(&format!(
        "{}/{}/index.html",
        assets_url,
        consts::REDIRECT_FRAME_PATH
    ))
    .change_context(VerificationError::ProtocolError)
    .attach_printable("assets url is not a valid base url")?;
    {
        let mut query = frame_url.query_pairs_mut();
        // Routing guarantees the ACS endpoint on this branch.
        query.append_pair("AcsUrl", lookup.acs_url.as_deref().unwrap_or_default());
        if let Some(pareq) = lookup.pareq.as_deref() {
            query.append_pair("PaReq", pareq);
        }
        if let Some(md) = lookup.md.as_deref() {
            query.append_pair("MD", md);
        }
        query.append_pair("TermUrl", term_url.as_str());
        query.append_pair("ReturnUrl", &callback);
    }

    Ok(frame_url)
}
