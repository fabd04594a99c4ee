use std::env;
use std::path::PathBuf;
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// The application's configuration.
///
/// Secrets are injected here at startup and passed down through `AppState`;
/// no component reads the process environment on its own.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// Secret used to sign session credentials and key the share-token MAC.
    pub session_secret: Zeroizing<String>,
    /// The single shared application password. Login fails closed when unset.
    pub app_password: Option<Zeroizing<String>>,
    /// Bearer secret protecting the heartbeat endpoint, if configured.
    pub cron_secret: Option<String>,
    /// Directory where file attachments are stored.
    pub storage_dir: PathBuf,
    /// Whether the app runs in production (controls the Secure cookie flag).
    pub is_production: bool,
    /// Login rate limit: seconds to replenish one attempt.
    pub login_rate_per_second: u64,
    /// Login rate limit: burst size.
    pub login_rate_burst: u32,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        let session_secret = env::var("SESSION_SECRET")
            .context("SESSION_SECRET must be set (generate with: openssl rand -hex 32)")?;
        if session_secret.trim().is_empty() {
            anyhow::bail!("SESSION_SECRET must not be empty");
        }

        let app_password = match env::var("APP_PASSWORD") {
            Ok(p) if !p.trim().is_empty() => Some(Zeroizing::new(p)),
            _ => {
                tracing::warn!("⚠️ APP_PASSWORD não configurado - login ficará indisponível");
                None
            }
        };

        let cron_secret = match env::var("CRON_SECRET") {
            Ok(s) if !s.is_empty() => Some(s),
            _ => {
                tracing::warn!("⚠️ CRON_SECRET não configurado - endpoint de heartbeat desprotegido");
                None
            }
        };

        let is_production = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            == "production";

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            session_secret: Zeroizing::new(session_secret),
            app_password,
            cron_secret,
            storage_dir: env::var("STORAGE_DIR")
                .unwrap_or_else(|_| "files/medical".to_string())
                .into(),
            is_production,
            login_rate_per_second: env::var("LOGIN_RATE_PER_SECOND")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("Invalid LOGIN_RATE_PER_SECOND")?,
            login_rate_burst: env::var("LOGIN_RATE_BURST")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid LOGIN_RATE_BURST")?,
        })
    }
}
