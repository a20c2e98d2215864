use std::sync::Arc;

use crate::config::AuthConfig;
use crate::notify::Notifier;
use crate::oauth2::ProviderClient;
use crate::userdb::UsersRepository;

use super::errors::CoordinationError;

/// Everything a flow needs, shared read-only across requests.
#[derive(Clone)]
pub struct AuthContext {
    pub config: Arc<AuthConfig>,
    pub provider: Arc<ProviderClient>,
    pub users: Arc<dyn UsersRepository>,
    pub notifier: Arc<dyn Notifier>,
}

impl AuthContext {
    pub fn new(
        config: Arc<AuthConfig>,
        users: Arc<dyn UsersRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoordinationError> {
        let provider = ProviderClient::new(config.oauth2.clone())?;
        Ok(Self::with_provider(config, Arc::new(provider), users, notifier))
    }

    pub fn with_provider(
        config: Arc<AuthConfig>,
        provider: Arc<ProviderClient>,
        users: Arc<dyn UsersRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            provider,
            users,
            notifier,
        }
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("config", &self.config)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}
