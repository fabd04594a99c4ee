use crate::error::{AppError, Result};

/// Validates a login password submission before the credential check runs.
pub fn validate_login_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(AppError::Validation("Senha é obrigatória".to_string()));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Senha deve ter no máximo 128 caracteres".to_string(),
        ));
    }

    Ok(())
}

/// Restricts a post-login redirect target to a local path, so the login
/// flow cannot be used as an open redirector.
pub fn sanitize_callback_url(callback_url: Option<&str>) -> String {
    match callback_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") => url.to_string(),
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_password_is_rejected() {
        assert!(validate_login_password("   ").is_err());
    }

    #[test]
    fn overlong_password_is_rejected() {
        assert!(validate_login_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn callback_url_must_be_a_local_path() {
        assert_eq!(sanitize_callback_url(Some("/patients")), "/patients");
        assert_eq!(sanitize_callback_url(Some("//evil.example")), "/");
        assert_eq!(sanitize_callback_url(Some("https://evil.example")), "/");
        assert_eq!(sanitize_callback_url(None), "/");
    }
}
