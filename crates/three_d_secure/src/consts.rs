//! Wire-level constants for the gateway client API.

/// Versioned prefix shared by every client API path.
pub const API_VERSION_PATH: &str = "v1";

/// Payment method endpoint under which the lookup and authenticate calls live.
pub const PAYMENT_METHOD_ENDPOINT: &str = "payment_methods";

/// Platform tag reported in `braintreeLibraryVersion` and `sdkVersion`.
pub const LIBRARY_PLATFORM: &str = "Rust";

/// Library version reported to the gateway.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Query parameter carrying the authentication response on the redirect
/// return URI.
pub const AUTH_RESPONSE_QUERY_PARAM: &str = "auth_response";

/// Assets-hosted redirect frame used by the legacy browser-switch challenge.
pub const REDIRECT_FRAME_PATH: &str = "mobile/three-d-secure-redirect/0.2.0";

/// Host and path portion of the return-scheme callback URI.
pub const CALLBACK_HOST_PATH: &str = "x-callback-url/braintree/threedsecure";
