//! Wiring shared by every command.

use std::sync::Arc;

use uuid::Uuid;

use auth_service::{FileSessionStorage, GoTrueClient, SessionConfig, SessionStore};
use common::{AppConfig, AppResult};
use data_client::{AccessToken, DataClient, MemoryDataClient, RestClient};
use marketplace_service::{fallback, Marketplace, MarketplaceServices};

use crate::output::Output;

/// Identity whose bookings the offline dataset holds
pub const OFFLINE_IDENTITY: Uuid = Uuid::from_u128(0x401);

/// Everything a command needs: services, the session and the printer.
pub struct AppContext {
    pub config: AppConfig,
    pub services: Arc<dyn MarketplaceServices>,
    pub session: Arc<SessionStore>,
    pub output: Output,
    offline: bool,
}

impl AppContext {
    /// Build the client stack and restore any persisted session.
    pub async fn connect(config: AppConfig, offline: bool, output: Output) -> AppResult<Self> {
        config.validate()?;

        let token = AccessToken::new();
        let client: Arc<dyn DataClient> = if offline {
            tracing::info!("Offline mode: using the sample dataset");
            Arc::new(MemoryDataClient::from_tables(fallback::seed_tables(
                OFFLINE_IDENTITY,
            )))
        } else {
            Arc::new(RestClient::new(&config, token.clone())?)
        };
        let services: Arc<dyn MarketplaceServices> = Arc::new(Marketplace::from_client(client));

        let session_config = SessionConfig::from_app(&config);
        let session = SessionStore::new(
            Arc::new(GoTrueClient::new(&config)?),
            Arc::new(FileSessionStorage::new(&session_config.session_file)),
            services.profiles(),
            token,
            session_config,
        );
        let state = session.initialize().await?;
        tracing::debug!("Session: {}", state);

        Ok(Self {
            config,
            services,
            session,
            output,
            offline,
        })
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// The signed-in identity; offline mode falls back to the sample owner.
    pub async fn identity(&self) -> AppResult<Uuid> {
        match self.session.require_identity().await {
            Ok(id) => Ok(id),
            Err(_) if self.offline => Ok(OFFLINE_IDENTITY),
            Err(e) => Err(e),
        }
    }
}
