use crate::error::{AppError, Result};

/// Minimum length of a share-link password, matching what the share dialog
/// enforces client-side.
const MIN_SHARE_PASSWORD_LEN: usize = 4;

/// Validates the patient id of a share request.
pub fn validate_patient_id(patient_id: &str) -> Result<()> {
    if patient_id.trim().is_empty() {
        return Err(AppError::Validation("Paciente é obrigatório".to_string()));
    }
    Ok(())
}

/// Validates the password chosen for a share link.
pub fn validate_share_password(password: &str) -> Result<()> {
    let password = password.trim();

    if password.len() < MIN_SHARE_PASSWORD_LEN {
        return Err(AppError::Validation(
            "A senha deve ter pelo menos 4 caracteres".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Senha deve ter no máximo 128 caracteres".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_share_password_is_rejected() {
        assert!(validate_share_password("abc").is_err());
        assert!(validate_share_password("  ab  ").is_err());
        assert!(validate_share_password("hunter2").is_ok());
    }

    #[test]
    fn blank_patient_id_is_rejected() {
        assert!(validate_patient_id("  ").is_err());
        assert!(validate_patient_id("patient-42").is_ok());
    }
}
