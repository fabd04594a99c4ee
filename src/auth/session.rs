use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Name of the cookie that carries the session credential.
pub const SESSION_COOKIE_NAME: &str = "bb-session";
/// Session lifetime.
pub const SESSION_DURATION_DAYS: i64 = 7;

/// Claims embedded in a session credential.
///
/// The credential is fully self-contained: there is no server-side session
/// store, so validity is determined by the signature and `expires_at` alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub authenticated: bool,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Milliseconds since the Unix epoch.
    pub expires_at: i64,
}

#[derive(Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Signs and verifies session credentials with HMAC-SHA256.
///
/// Tokens are compact `header.payload.signature` strings with base64url
/// (unpadded) segments.
pub struct SessionSigner {
    key: Zeroizing<Vec<u8>>,
}

impl SessionSigner {
    /// Creates a signer from the application secret.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(AppError::Configuration(
                "SESSION_SECRET não configurado".to_string(),
            ));
        }
        Ok(Self {
            key: Zeroizing::new(secret.as_bytes().to_vec()),
        })
    }

    /// Issues a fresh session credential valid for [`SESSION_DURATION_DAYS`].
    pub fn create_session(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp_millis();
        let claims = SessionClaims {
            authenticated: true,
            created_at: now,
            expires_at: now + SESSION_DURATION_DAYS * 24 * 60 * 60 * 1000,
        };
        self.sign_claims(&claims)
    }

    fn sign_claims(&self, claims: &SessionClaims) -> Result<String> {
        let header = TokenHeader {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };

        let header_json = sonic_rs::to_string(&header)
            .map_err(|e| AppError::Internal(format!("Failed to serialize header: {}", e)))?;
        let claims_json = sonic_rs::to_string(claims)
            .map_err(|e| AppError::Internal(format!("Failed to serialize claims: {}", e)))?;

        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json.as_bytes()),
            URL_SAFE_NO_PAD.encode(claims_json.as_bytes())
        );

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::Internal(format!("Failed to create HMAC: {}", e)))?;
        mac.update(message.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{}.{}", message, URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Verifies a session credential.
    ///
    /// Bad signature, expired and malformed tokens are all the same outcome:
    /// `None`. The distinct cause is only logged, never surfaced.
    pub fn validate_session(&self, token: &str) -> Option<SessionClaims> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            tracing::debug!("Session token rejected: not a compact token");
            return None;
        }

        let message = format!("{}.{}", parts[0], parts[1]);

        let mut mac = HmacSha256::new_from_slice(&self.key).ok()?;
        mac.update(message.as_bytes());
        let expected = mac.finalize().into_bytes();

        let given = match URL_SAFE_NO_PAD.decode(parts[2]) {
            Ok(bytes) => bytes,
            Err(_) => {
                tracing::debug!("Session token rejected: signature not base64url");
                return None;
            }
        };

        if given.len() != expected.len() || !bool::from(expected.as_slice().ct_eq(given.as_slice())) {
            tracing::warn!("❌ Session token rejected: invalid signature");
            return None;
        }

        let claims_json = match URL_SAFE_NO_PAD.decode(parts[1]) {
            Ok(bytes) => bytes,
            Err(_) => {
                tracing::debug!("Session token rejected: payload not base64url");
                return None;
            }
        };
        let claims: SessionClaims = match sonic_rs::from_slice(&claims_json) {
            Ok(claims) => claims,
            Err(_) => {
                tracing::debug!("Session token rejected: payload not valid claims");
                return None;
            }
        };

        let now = chrono::Utc::now().timestamp_millis();
        if now > claims.expires_at {
            tracing::debug!("Session token rejected: expired");
            return None;
        }

        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> SessionSigner {
        SessionSigner::new("test-secret-key").unwrap()
    }

    #[test]
    fn create_then_validate_round_trips() {
        let signer = signer();
        let token = signer.create_session().unwrap();

        let claims = signer.validate_session(&token).expect("token should be valid");
        assert!(claims.authenticated);
        assert_eq!(
            claims.expires_at - claims.created_at,
            SESSION_DURATION_DAYS * 24 * 60 * 60 * 1000
        );

        let now = chrono::Utc::now().timestamp_millis();
        assert!(claims.expires_at > now);
    }

    #[test]
    fn expired_credential_is_rejected() {
        let signer = signer();
        let now = chrono::Utc::now().timestamp_millis();
        let claims = SessionClaims {
            authenticated: true,
            created_at: now - 8 * 24 * 60 * 60 * 1000,
            expires_at: now - 24 * 60 * 60 * 1000,
        };
        let token = signer.sign_claims(&claims).unwrap();

        assert!(signer.validate_session(&token).is_none());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let signer = signer();
        let token = signer.create_session().unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = SessionClaims {
            authenticated: true,
            created_at: 0,
            expires_at: i64::MAX,
        };
        parts[1] = URL_SAFE_NO_PAD.encode(sonic_rs::to_string(&forged).unwrap());
        let forged_token = parts.join(".");

        assert!(signer.validate_session(&forged_token).is_none());
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let token = SessionSigner::new("another-secret")
            .unwrap()
            .create_session()
            .unwrap();

        assert!(signer().validate_session(&token).is_none());
    }

    #[test]
    fn malformed_tokens_do_not_panic() {
        let signer = signer();
        for garbage in ["", "abc", "a.b", "a.b.c", "....", "não.é.token", "a.b.c.d"] {
            assert!(signer.validate_session(garbage).is_none());
        }
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        assert!(SessionSigner::new("   ").is_err());
    }
}
