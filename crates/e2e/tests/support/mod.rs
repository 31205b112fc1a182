//! Shared fixtures for the integration tests

#![allow(dead_code)]

pub mod backend;
pub mod web;

use pumpmaster_common::{Credentials, PumpRecord, SequenceGenerator, TestDataFactory};
use pumpmaster_e2e::PumpMasterApi;
use std::sync::Arc;

pub use backend::FakeBackend;

pub fn api_credentials() -> Credentials {
    Credentials::new("test@pumpmaster.com", "Test@123")
}

/// Fresh fake backend plus a client that is already logged in
pub async fn logged_in() -> (FakeBackend, PumpMasterApi) {
    pumpmaster_e2e::init_tracing();
    let backend = FakeBackend::start().await;
    let mut api = PumpMasterApi::new(backend.api_url()).unwrap();
    api.login(&api_credentials()).await.unwrap();
    (backend, api)
}

pub fn factory(tag: &str) -> TestDataFactory {
    TestDataFactory::seeded(Arc::new(SequenceGenerator::with_run_tag(tag)), 7)
}

/// The fixed API pump, renamed
pub fn named_pump(name: &str) -> PumpRecord {
    factory("it").api_pump(name)
}
