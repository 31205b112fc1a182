//! Pump Master E2E and API Test Harness
//!
//! This crate drives the Pump Master web UI and REST API from Rust:
//! - Wraps every REST endpoint behind a token-carrying API client
//! - Controls Playwright through a long-lived Node bridge speaking JSON lines
//! - Models the UI as page objects and behaviour-style step functions
//! - Starts (or reuses) the application under test for local runs
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Pump Master harness (Rust)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteConfig (.env + environment)                           │
//! │    ├── AppServer::start(ServerConfig)                       │
//! │    └── PlaywrightSession::launch(PlaywrightConfig)          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  steps                                                      │
//! │    ├── LoginSteps ─────────┐                                │
//! │    ├── PumpOverviewSteps ──┼──► pages ──► InteractionKit<D> │
//! │    ├── PumpManagementSteps ┘                 │              │
//! │    │                                         ▼              │
//! │    │                               D: Driver (bridge.js)    │
//! │    └── ApiSteps ──► PumpMasterApi ──► ApiTransport (reqwest)│
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod pages;
pub mod server;
pub mod steps;
pub mod utils;

pub use api::PumpMasterApi;
pub use browser::{Driver, InteractionKit, Locator, PlaywrightSession};
pub use config::SuiteConfig;
pub use error::{E2eError, E2eResult};
pub use server::{AppServer, ServerConfig};

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Output goes through the test writer so `cargo test` captures it. Safe
/// to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .with_target(false)
        .try_init();
}
