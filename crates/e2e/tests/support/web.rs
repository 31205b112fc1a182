//! Browser fixtures for the UI tests
//!
//! These need the Pump Master UI (started here or already running) and a
//! Playwright install, so every test using them is `#[ignore]`d.

use std::sync::Arc;

use pumpmaster_e2e::browser::PlaywrightConfig;
use pumpmaster_e2e::{AppServer, InteractionKit, PlaywrightSession, ServerConfig, SuiteConfig};

pub type Kit = Arc<InteractionKit<PlaywrightSession>>;

/// Everything a UI test holds for its lifetime
pub struct WebFixture {
    pub config: SuiteConfig,
    pub kit: Kit,
    _server: Option<AppServer>,
}

impl WebFixture {
    pub async fn start() -> Self {
        pumpmaster_e2e::init_tracing();
        let config = SuiteConfig::from_env().expect("suite config");

        let server = match ServerConfig::from_suite(&config) {
            Some(server_config) => Some(AppServer::start(server_config).await.expect("app server")),
            None => None,
        };

        let session = PlaywrightSession::launch(PlaywrightConfig::from_suite(&config))
            .await
            .expect("playwright session");
        let viewport = session.initial_viewport();
        let kit = InteractionKit::new(session, config.base_url.clone())
            .with_viewport(viewport)
            .with_screenshot_dir(config.screenshot_dir.clone())
            .with_timeouts(config.timeouts);

        Self {
            config,
            kit: Arc::new(kit),
            _server: server,
        }
    }

    pub async fn finish(self) {
        if let Err(e) = self.kit.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
    }
}
