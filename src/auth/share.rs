use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::auth::password::constant_time_eq;
use crate::error::{AppError, Result};

/// Share token lifetime.
pub const SHARE_TOKEN_DURATION_DAYS: i64 = 30;

/// Domain-separation context for the share-token MAC key.
const MAC_KEY_CONTEXT: &str = "prontuario 2025-08-06 share-token mac v1";

/// Payload of a share token.
///
/// The token is fully self-contained: no registry of issued tokens exists,
/// so everything needed to validate an access attempt travels in the token
/// itself. `sig` authenticates `patient_id`, `timestamp` and `expires_at` so
/// a holder cannot rebuild the token with an extended expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareTokenData {
    pub patient_id: String,
    /// Issuance time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// One-time password chosen by the issuing user, stored trimmed.
    pub password: String,
    /// Milliseconds since the Unix epoch.
    pub expires_at: i64,
    /// Keyed BLAKE3 MAC (hex) over `patient_id`, `timestamp`, `expires_at`.
    pub sig: String,
}

/// Result of the password-less structural check.
#[derive(Debug, Clone, Serialize)]
pub struct TokenCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenCheck {
    fn invalid(error: &str) -> Self {
        Self {
            valid: false,
            error: Some(error.to_string()),
        }
    }
}

/// Issues and validates password-protected share tokens scoped to one
/// patient record.
pub struct ShareTokenService {
    mac_key: [u8; 32],
}

impl ShareTokenService {
    /// Creates the service, deriving the MAC key from the application secret.
    pub fn new(secret: &str) -> Self {
        Self {
            mac_key: blake3::derive_key(MAC_KEY_CONTEXT, secret.as_bytes()),
        }
    }

    fn mac(&self, patient_id: &str, timestamp: i64, expires_at: i64) -> blake3::Hash {
        let message = format!("{}|{}|{}", patient_id, timestamp, expires_at);
        blake3::keyed_hash(&self.mac_key, message.as_bytes())
    }

    fn mac_hex(&self, patient_id: &str, timestamp: i64, expires_at: i64) -> String {
        self.mac(patient_id, timestamp, expires_at).to_hex().to_string()
    }

    /// Generates a share token for one patient.
    ///
    /// Pure except for reading the clock; nothing is persisted. The caller
    /// enforces the minimum password length before getting here.
    pub fn generate(&self, patient_id: &str, password: &str) -> Result<String> {
        let patient_id = patient_id.trim();
        let password = password.trim();

        if patient_id.is_empty() {
            return Err(AppError::Validation("Paciente é obrigatório".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("Senha é obrigatória".to_string()));
        }

        let now = chrono::Utc::now().timestamp_millis();
        let expires_at = now + SHARE_TOKEN_DURATION_DAYS * 24 * 60 * 60 * 1000;

        let data = ShareTokenData {
            patient_id: patient_id.to_string(),
            timestamp: now,
            password: password.to_string(),
            expires_at,
            sig: self.mac_hex(patient_id, now, expires_at),
        };

        tracing::info!(
            "🔗 Gerando token de compartilhamento - paciente: {}, expira em: {}",
            data.patient_id,
            data.expires_at,
        );

        encode_payload(&data)
    }

    /// Validates a token + password pair offered by an anonymous caller.
    ///
    /// Malformed token, bad MAC, wrong password and expiry all collapse to
    /// `None`; the distinct cause is only logged so callers cannot probe why
    /// an attempt failed.
    pub fn validate(&self, token: &str, password: &str) -> Option<ShareTokenData> {
        let data = match decode_payload(token) {
            Some(data) => data,
            None => {
                tracing::debug!("💥 Token de compartilhamento não decodifica");
                return None;
            }
        };

        let given = match blake3::Hash::from_hex(&data.sig) {
            Ok(hash) => hash,
            Err(_) => {
                tracing::warn!("❌ Token de compartilhamento com assinatura malformada");
                return None;
            }
        };
        // blake3::Hash equality is constant-time.
        if self.mac(&data.patient_id, data.timestamp, data.expires_at) != given {
            tracing::warn!("❌ Token de compartilhamento com assinatura inválida");
            return None;
        }

        if !constant_time_eq(data.password.trim(), password.trim()) {
            tracing::debug!("❌ Senha incorreta para token de compartilhamento");
            return None;
        }

        let now = chrono::Utc::now().timestamp_millis();
        if now > data.expires_at {
            tracing::debug!("❌ Token de compartilhamento expirado");
            return None;
        }

        tracing::debug!("✅ Token de compartilhamento válido - paciente: {}", data.patient_id);
        Some(data)
    }

    /// Password-less structural check, used for early UI feedback ("link
    /// expirado") before a password is even requested.
    ///
    /// Structural only: decode, required fields, expiry. The MAC and the
    /// password are checked in [`Self::validate`].
    pub fn inspect(&self, token: &str) -> TokenCheck {
        if token.trim().is_empty() {
            return TokenCheck::invalid("Token não fornecido");
        }

        let data = match decode_payload(token) {
            Some(data) => data,
            None => return TokenCheck::invalid("Token inválido ou corrompido"),
        };

        if data.patient_id.is_empty() || data.password.is_empty() || data.expires_at <= 0 {
            return TokenCheck::invalid("Token malformado");
        }

        let now = chrono::Utc::now().timestamp_millis();
        if now > data.expires_at {
            return TokenCheck::invalid("Token expirado");
        }

        TokenCheck {
            valid: true,
            error: None,
        }
    }

    /// Decodes a token without validating anything. Used where only the
    /// embedded metadata is needed (e.g. echoing the expiry of a token that
    /// was just issued).
    pub fn decode(token: &str) -> Option<ShareTokenData> {
        decode_payload(token)
    }
}

/// Serializes the payload and makes it URL-safe: standard base64, then the
/// three reserved characters remapped and trailing padding stripped so the
/// token can be used directly as a URL path segment.
fn encode_payload(data: &ShareTokenData) -> Result<String> {
    let json = sonic_rs::to_string(data)
        .map_err(|e| AppError::Internal(format!("Failed to serialize token: {}", e)))?;

    let encoded = STANDARD.encode(json.as_bytes());
    Ok(encoded
        .replace('+', "-")
        .replace('/', "_")
        .trim_end_matches('=')
        .to_string())
}

/// Reverses [`encode_payload`]: restores the base64 alphabet, re-pads to a
/// multiple of four, decodes and parses. Any failure is `None`.
fn decode_payload(token: &str) -> Option<ShareTokenData> {
    let mut normalized = token.replace('-', "+").replace('_', "/");
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }

    let decoded = STANDARD.decode(normalized.as_bytes()).ok()?;
    sonic_rs::from_slice(&decoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ShareTokenService {
        ShareTokenService::new("test-secret-key")
    }

    #[test]
    fn generate_then_validate_round_trips() {
        let service = service();
        let token = service.generate("patient-42", "hunter2").unwrap();

        let data = service.validate(&token, "hunter2").expect("token should be valid");
        assert_eq!(data.patient_id, "patient-42");
        assert_eq!(
            data.expires_at - data.timestamp,
            SHARE_TOKEN_DURATION_DAYS * 24 * 60 * 60 * 1000
        );
    }

    #[test]
    fn token_is_a_url_path_segment() {
        let service = service();
        // Vary payload length so every padding case is produced.
        for id in ["p", "p-1", "p-12", "p-123", "patient-12345"] {
            let token = service.generate(id, "hunter2").unwrap();
            assert!(!token.contains('+'));
            assert!(!token.contains('/'));
            assert!(!token.contains('='));
            assert_eq!(service.validate(&token, "hunter2").unwrap().patient_id, id);
        }
    }

    #[test]
    fn inputs_are_trimmed() {
        let service = service();
        let token = service.generate("  patient-42  ", "  hunter2  ").unwrap();

        let data = service.validate(&token, "hunter2").unwrap();
        assert_eq!(data.patient_id, "patient-42");
        assert_eq!(data.password, "hunter2");

        // Caller-side whitespace around the password is also ignored.
        assert!(service.validate(&token, " hunter2 ").is_some());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let service = service();
        let token = service.generate("patient-42", "hunter2").unwrap();

        assert!(service.validate(&token, "hunter3").is_none());
        assert!(service.validate(&token, "").is_none());
    }

    #[test]
    fn empty_inputs_are_rejected_at_generation() {
        let service = service();
        assert!(service.generate("  ", "hunter2").is_err());
        assert!(service.generate("patient-42", "  ").is_err());
    }

    #[test]
    fn expired_token_is_rejected_regardless_of_password() {
        let service = service();
        let issued = chrono::Utc::now().timestamp_millis() - 31 * 24 * 60 * 60 * 1000;
        let expires_at = issued + SHARE_TOKEN_DURATION_DAYS * 24 * 60 * 60 * 1000;
        let data = ShareTokenData {
            patient_id: "patient-42".to_string(),
            timestamp: issued,
            password: "hunter2".to_string(),
            expires_at,
            sig: service.mac_hex("patient-42", issued, expires_at),
        };
        let token = encode_payload(&data).unwrap();

        assert!(service.validate(&token, "hunter2").is_none());

        let check = service.inspect(&token);
        assert!(!check.valid);
        assert_eq!(check.error.as_deref(), Some("Token expirado"));
    }

    #[test]
    fn tampered_scope_is_rejected_by_the_mac() {
        let service = service();
        let token = service.generate("patient-42", "hunter2").unwrap();
        let mut data = ShareTokenService::decode(&token).unwrap();

        // Retarget the token without re-signing it.
        data.patient_id = "patient-99".to_string();
        let forged = encode_payload(&data).unwrap();

        assert!(service.validate(&forged, "hunter2").is_none());
    }

    #[test]
    fn extended_expiry_is_rejected_by_the_mac() {
        let service = service();
        let token = service.generate("patient-42", "hunter2").unwrap();
        let mut data = ShareTokenService::decode(&token).unwrap();

        data.expires_at += 365 * 24 * 60 * 60 * 1000;
        let forged = encode_payload(&data).unwrap();

        assert!(service.validate(&forged, "hunter2").is_none());
    }

    #[test]
    fn corrupted_tokens_never_panic() {
        let service = service();
        let valid = service.generate("patient-42", "hunter2").unwrap();

        let corrupted = [
            String::new(),
            "completely random".to_string(),
            "%%%!!!***".to_string(),
            valid[..valid.len() / 2].to_string(),
            format!("{}!!!!", valid),
        ];
        for token in &corrupted {
            assert!(!service.inspect(token).valid);
            assert!(service.validate(token, "hunter2").is_none());
        }
    }

    #[test]
    fn structural_check_does_not_require_the_password() {
        let service = service();
        let token = service.generate("patient-42", "hunter2").unwrap();

        let check = service.inspect(&token);
        assert!(check.valid);
        assert!(check.error.is_none());
    }

    #[test]
    fn validation_is_idempotent() {
        let service = service();
        let token = service.generate("patient-42", "hunter2").unwrap();

        let first = service.validate(&token, "hunter2").unwrap();
        for _ in 0..5 {
            let again = service.validate(&token, "hunter2").unwrap();
            assert_eq!(again.patient_id, first.patient_id);
            assert_eq!(again.expires_at, first.expires_at);
        }
    }

    #[test]
    fn services_with_different_secrets_reject_each_other() {
        let token = ShareTokenService::new("other-secret")
            .generate("patient-42", "hunter2")
            .unwrap();

        // Structurally fine, but the MAC does not verify here.
        assert!(service().inspect(&token).valid);
        assert!(service().validate(&token, "hunter2").is_none());
    }
}
