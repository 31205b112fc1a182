//! The seam between page objects and a concrete browser

use async_trait::async_trait;
use serde_json::Value;

use super::protocol::BrowserStep;
use crate::error::E2eResult;

/// Executes browser steps one at a time
#[async_trait]
pub trait Driver: Send {
    /// Run `step` and return whatever value it produces (null for actions)
    async fn execute(&mut self, step: BrowserStep) -> E2eResult<Value>;

    /// Release the browser
    async fn close(&mut self) -> E2eResult<()> {
        Ok(())
    }
}
