use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{AppError, Result};

/// Constant-time string equality. A length mismatch short-circuits.
pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

/// Verifies a login credential against whatever credential source the
/// application is configured with.
///
/// The seam exists so a per-user credential store can replace the single
/// shared password without touching the request gate or the share service.
pub trait CredentialVerifier: Send + Sync {
    /// Returns whether `candidate` grants access.
    ///
    /// A missing or empty configured credential is a configuration error,
    /// never a silent success.
    fn verify(&self, candidate: &str) -> Result<bool>;
}

/// The single shared application password.
pub struct SharedPassword {
    configured: Option<Zeroizing<String>>,
}

impl SharedPassword {
    pub fn new(configured: Option<Zeroizing<String>>) -> Self {
        Self { configured }
    }
}

impl CredentialVerifier for SharedPassword {
    fn verify(&self, candidate: &str) -> Result<bool> {
        let configured = self.configured.as_ref().ok_or_else(|| {
            AppError::Configuration("APP_PASSWORD não configurado".to_string())
        })?;

        let configured = configured.trim();
        if configured.is_empty() {
            return Err(AppError::Configuration(
                "APP_PASSWORD não configurado".to_string(),
            ));
        }

        Ok(constant_time_eq(candidate.trim(), configured))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(password: &str) -> SharedPassword {
        SharedPassword::new(Some(Zeroizing::new(password.to_string())))
    }

    #[test]
    fn matching_password_is_accepted() {
        assert!(shared("secret123").verify("secret123").unwrap());
    }

    #[test]
    fn whitespace_is_trimmed_on_both_sides() {
        assert!(shared("  secret123  ").verify(" secret123 ").unwrap());
    }

    #[test]
    fn wrong_password_is_rejected() {
        assert!(!shared("secret123").verify("wrong").unwrap());
        assert!(!shared("secret123").verify("secret1234").unwrap());
        assert!(!shared("secret123").verify("").unwrap());
    }

    #[test]
    fn missing_configuration_fails_closed() {
        let verifier = SharedPassword::new(None);
        assert!(matches!(
            verifier.verify("anything"),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn blank_configuration_fails_closed() {
        let verifier = shared("   ");
        assert!(matches!(
            verifier.verify("   "),
            Err(AppError::Configuration(_))
        ));
    }
}
