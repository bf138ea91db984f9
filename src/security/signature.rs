//! Signed callback tokens.
//!
//! The callback URL handed to the assistant carries a bounded-lifetime
//! credential as a query parameter: the assistant round-trips whatever URL
//! it was given verbatim, so the token must be URL-safe (hex digits, ASCII
//! digits, and a dot). Any caller who does not possess the shared secret is
//! rejected before any conversation state is touched.
//!
//! Tokens are stateless: the expiry is embedded in the token and covered by
//! the MAC, so no consumed-token store is needed and tampering with the
//! window fails verification.
//!
//! # Security
//!
//! - HMAC-SHA256 over `"{payload}.{expiry}"`
//! - Constant-time comparison of the MAC bytes
//! - Expiry checked on verify; elapsed tokens are rejected outright

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Default validity window for callback tokens (15 minutes).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 900;

/// Mints and verifies the signed token carried on callback URLs.
#[derive(Clone)]
pub struct CallbackSigner {
    secret: SecretString,
    ttl_secs: i64,
}

impl CallbackSigner {
    pub fn new(secret: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            ttl_secs,
        }
    }

    /// Mint a token for `payload`, valid for the configured window.
    ///
    /// Shape: `<expiry-unix>.<hex-hmac>`.
    pub fn sign(&self, payload: &str) -> String {
        self.sign_at(payload, Utc::now().timestamp() + self.ttl_secs)
    }

    fn sign_at(&self, payload: &str, expiry: i64) -> String {
        format!("{}.{}", expiry, hex_encode(&self.mac_for(payload, expiry)))
    }

    /// Verify a token against `payload`.
    ///
    /// Constant-time on the MAC bytes; a malformed token or an elapsed
    /// expiry is a plain rejection.
    pub fn verify(&self, token: &str, payload: &str) -> bool {
        let Some((expiry_raw, mac_hex)) = token.split_once('.') else {
            return false;
        };
        let Ok(expiry) = expiry_raw.parse::<i64>() else {
            return false;
        };
        if expiry < Utc::now().timestamp() {
            return false;
        }
        let Some(provided) = hex_decode(mac_hex) else {
            return false;
        };

        let expected = self.mac_for(payload, expiry);
        expected.as_slice().ct_eq(provided.as_slice()).unwrap_u8() == 1
    }

    fn mac_for(&self, payload: &str, expiry: i64) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        mac.update(b".");
        mac.update(expiry.to_string().as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Lowercase hex encoding of raw bytes.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Strict inverse of [`hex_encode`]: lowercase hex only, even length.
fn hex_decode(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return None;
    }
    bytes
        .chunks(2)
        .map(|pair| Some(hex_val(pair[0])? << 4 | hex_val(pair[1])?))
        .collect()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PAYLOAD: &str = "conversations__IS1/CH1";

    fn signer() -> CallbackSigner {
        CallbackSigner::new("relay-test-secret", DEFAULT_TOKEN_TTL_SECS)
    }

    #[test]
    fn sign_then_verify_succeeds() {
        let signer = signer();
        let token = signer.sign(PAYLOAD);
        assert!(signer.verify(&token, PAYLOAD));
    }

    #[test]
    fn wrong_secret_fails() {
        let token = signer().sign(PAYLOAD);
        let other = CallbackSigner::new("another-secret", DEFAULT_TOKEN_TTL_SECS);
        assert!(!other.verify(&token, PAYLOAD));
    }

    #[test]
    fn wrong_payload_fails() {
        let signer = signer();
        let token = signer.sign(PAYLOAD);
        assert!(!signer.verify(&token, "conversations__IS1/CH2"));
    }

    #[test]
    fn expired_token_fails() {
        let signer = signer();
        let token = signer.sign_at(PAYLOAD, Utc::now().timestamp() - 1);
        assert!(!signer.verify(&token, PAYLOAD));
    }

    #[test]
    fn tampered_expiry_fails() {
        let signer = signer();
        let token = signer.sign_at(PAYLOAD, Utc::now().timestamp() + 60);
        let (_, mac) = token.split_once('.').unwrap();
        // Re-attach the valid MAC to a pushed-out expiry.
        let forged = format!("{}.{}", Utc::now().timestamp() + 86_400, mac);
        assert!(!signer.verify(&forged, PAYLOAD));
    }

    #[test]
    fn malformed_tokens_fail() {
        let signer = signer();
        assert!(!signer.verify("", PAYLOAD));
        assert!(!signer.verify("no-separator", PAYLOAD));
        assert!(!signer.verify("123.", PAYLOAD));
        assert!(!signer.verify("notanumber.abcdef", PAYLOAD));
        assert!(!signer.verify("123.zzzz", PAYLOAD));
        // Uppercase hex is not the canonical encoding.
        let token = signer.sign(PAYLOAD).to_uppercase();
        assert!(!signer.verify(&token, PAYLOAD));
    }

    #[test]
    fn token_is_url_safe() {
        let token = signer().sign(PAYLOAD);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c) || c == '.'));
    }

    proptest! {
        #[test]
        fn any_single_bit_mutation_fails_verification(
            bit in 0usize..8,
            index_seed in any::<usize>(),
        ) {
            let signer = signer();
            let token = signer.sign(PAYLOAD);
            prop_assume!(!token.is_empty());

            let mut bytes = token.clone().into_bytes();
            let index = index_seed % bytes.len();
            bytes[index] ^= 1 << bit;

            // A flip may leave the ASCII range; a token that is not valid
            // UTF-8 can never reach verify in the first place.
            if let Ok(mutated) = String::from_utf8(bytes) {
                prop_assert!(!signer.verify(&mutated, PAYLOAD));
            }
        }

        #[test]
        fn verify_accepts_exactly_the_minted_token(payload in "[ -~]{1,64}") {
            let signer = signer();
            let token = signer.sign(&payload);
            prop_assert!(signer.verify(&token, &payload));
        }
    }
}
