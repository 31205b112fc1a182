//! Generic helpers shared by page objects, steps and tests

pub mod browser;
pub mod random;
pub mod retry;

use serde::Serialize;
use tracing::{info, warn};

use crate::api::PumpMasterApi;
use crate::config::SuiteConfig;

pub use random::{
    generate_test_id, is_valid_date, is_valid_email, is_valid_url, random_date, random_email,
    random_number, random_string,
};
pub use retry::{retry, RetryPolicy};

/// Snapshot of where and how a run executes, attached to reports
#[derive(Debug, Clone, Serialize)]
pub struct TestMetadata {
    pub timestamp: String,
    pub environment: String,
    pub is_ci: bool,
    pub is_headless: bool,
    pub platform: &'static str,
    pub harness_version: &'static str,
}

pub fn is_ci(config: &SuiteConfig) -> bool {
    config.ci
}

pub fn environment(config: &SuiteConfig) -> &'static str {
    config.environment.as_str()
}

/// CI always runs headless
pub fn is_headless(config: &SuiteConfig) -> bool {
    config.headless || config.ci
}

pub fn test_metadata(config: &SuiteConfig) -> TestMetadata {
    TestMetadata {
        timestamp: chrono::Utc::now().to_rfc3339(),
        environment: environment(config).to_string(),
        is_ci: is_ci(config),
        is_headless: is_headless(config),
        platform: std::env::consts::OS,
        harness_version: env!("CARGO_PKG_VERSION"),
    }
}

/// Best-effort removal of test pumps; never fails the caller
pub async fn cleanup_test_data(api: &PumpMasterApi) -> usize {
    if api.auth_token().is_none() {
        warn!("Cleanup skipped: API client is not authenticated");
        return 0;
    }
    let removed = api.cleanup().await;
    info!("Cleaned up {} test pumps", removed);
    removed
}
