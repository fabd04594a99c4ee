use deadpool_postgres::Pool;
use std::sync::Arc;

use crate::auth::password::{CredentialVerifier, SharedPassword};
use crate::auth::session::SessionSigner;
use crate::auth::share::ShareTokenService;
use crate::config::Config;
use crate::error::Result;

/// The application's state.
///
/// Everything a handler needs is constructed once here and injected; no
/// component holds module-level clients or reads the environment itself.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: Pool,
    /// The application's configuration.
    pub config: Config,
    /// Signs and verifies session credentials.
    pub sessions: Arc<SessionSigner>,
    /// Issues and validates share tokens.
    pub share_tokens: Arc<ShareTokenService>,
    /// Verifies login credentials.
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    /// Creates a new `AppState`.
    pub fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL pool initialized (lazy, deadpool-postgres)");

        let sessions = Arc::new(SessionSigner::new(&config.session_secret)?);
        tracing::info!("✅ Session signer initialized");

        let share_tokens = Arc::new(ShareTokenService::new(&config.session_secret));
        tracing::info!("✅ Share token service initialized");

        let credentials: Arc<dyn CredentialVerifier> =
            Arc::new(SharedPassword::new(config.app_password.clone()));

        Ok(AppState {
            db,
            config: config.clone(),
            sessions,
            share_tokens,
            credentials,
        })
    }
}
