use crate::auth::sessions::{MemorySessionStore, SessionStore};
use crate::config::AppConfig;
use crate::db::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects the gateway to the configured location and wires an
    /// in-process session store.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = Arc::new(Database::new(config.query_timeout()));
        db.connect(&config.database_path).await?;

        let sessions =
            Arc::new(MemorySessionStore::new(config.session.ttl())) as Arc<dyn SessionStore>;

        Ok(Self {
            db,
            sessions,
            config: Arc::new(config),
        })
    }

    pub fn from_parts(
        db: Arc<Database>,
        sessions: Arc<dyn SessionStore>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            db,
            sessions,
            config,
        }
    }
}
