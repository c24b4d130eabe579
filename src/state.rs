use crate::analysis::{GeminiAnalyzer, MealAnalyzer};
use crate::config::AppConfig;
use crate::session::SessionService;
use crate::storage::{FileStore, KeyValueStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session: Arc<SessionService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        // Local slot store under DATA_DIR
        let store = Arc::new(FileStore::open(&config.data_dir, config.slot_max_bytes).await?)
            as Arc<dyn KeyValueStore>;
        let analyzer = Arc::new(GeminiAnalyzer::new(&config.gemini)?) as Arc<dyn MealAnalyzer>;

        Ok(Self::from_parts(config, store, analyzer).await)
    }

    pub async fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn KeyValueStore>,
        analyzer: Arc<dyn MealAnalyzer>,
    ) -> Self {
        let session =
            Arc::new(SessionService::start(store, analyzer, config.gemini.timeout()).await);
        Self { config, session }
    }

    #[cfg(test)]
    pub async fn for_tests(
        store: Arc<dyn KeyValueStore>,
        analyzer: Arc<dyn MealAnalyzer>,
        timeout: std::time::Duration,
    ) -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            data_dir: "./data".into(),
            slot_max_bytes: 5 * 1024 * 1024,
            max_upload_bytes: 1024 * 1024,
            gemini: crate::config::GeminiConfig {
                api_key: "test".into(),
                model: "test-model".into(),
                base_url: "http://127.0.0.1:9".into(),
                timeout_secs: timeout.as_secs().max(1),
            },
        });
        let session = Arc::new(SessionService::start(store, analyzer, timeout).await);
        Self { config, session }
    }
}
