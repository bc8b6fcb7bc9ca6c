//! Challenge routing.

use crate::types::ThreeDSecureLookup;

/// Which cardholder-facing path a lookup result demands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChallengeRoute {
    /// The issuer waived the challenge; the lookup nonce is already final.
    NoChallenge,
    /// Legacy flow through an external browser switch.
    Redirect,
    /// Native embedded challenge (protocol 2.x).
    Embedded,
}

/// Total, side-effect-free routing decision.
///
/// An ACS endpoint on the lookup means a challenge is required, and the
/// protocol major version picks the presenter: `"2."`-prefixed versions run
/// the embedded challenge, everything else falls back to the redirect.
pub fn route(lookup: &ThreeDSecureLookup) -> ChallengeRoute {
    if !lookup.requires_user_authentication() {
        return ChallengeRoute::NoChallenge;
    }
    if lookup.three_d_secure_version.starts_with("2.") {
        ChallengeRoute::Embedded
    } else {
        ChallengeRoute::Redirect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CardNonce;

    fn lookup(acs_url: Option<&str>, version: &str) -> ThreeDSecureLookup {
        ThreeDSecureLookup {
            acs_url: acs_url.map(str::to_owned),
            md: None,
            term_url: None,
            pareq: None,
            three_d_secure_version: version.to_owned(),
            card_nonce: CardNonce {
                nonce: "n".to_owned(),
                card_type: None,
                last_two: None,
                three_d_secure_info: Default::default(),
            },
        }
    }

    #[test]
    fn missing_acs_url_waives_the_challenge_regardless_of_version() {
        for version in ["1.0.2", "2.1.0", "2.2.0", ""] {
            assert_eq!(route(&lookup(None, version)), ChallengeRoute::NoChallenge);
        }
    }

    #[test]
    fn version_two_prefix_selects_the_embedded_challenge() {
        for version in ["2.1.0", "2.2.0"] {
            assert_eq!(
                route(&lookup(Some("https://acs"), version)),
                ChallengeRoute::Embedded
            );
        }
    }

    #[test]
    fn non_version_two_falls_back_to_the_redirect() {
        for version in ["1.0.2", "1.1.0", "20.0", ""] {
            assert_eq!(
                route(&lookup(Some("https://acs"), version)),
                ChallengeRoute::Redirect
            );
        }
    }
}
