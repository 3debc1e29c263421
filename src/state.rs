use crate::config::AppConfig;
use crate::store::{MemoryStore, PgStore, Store};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match config.database_url.as_deref() {
            Some(url) => {
                let pg = PgStore::connect(url, config.max_connections).await?;
                pg.migrate().await?;
                info!("connected to postgres, migrations applied");
                Arc::new(pg) as Arc<dyn Store>
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
                Arc::new(MemoryStore::new()) as Arc<dyn Store>
            }
        };

        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::from_parts(Arc::new(MemoryStore::new()), Arc::new(AppConfig::default()))
    }

    #[cfg(test)]
    pub fn fake_strict() -> Self {
        let config = AppConfig {
            strict_validation: true,
            ..AppConfig::default()
        };
        Self::from_parts(Arc::new(MemoryStore::new()), Arc::new(config))
    }
}
