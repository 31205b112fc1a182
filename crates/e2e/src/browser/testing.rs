//! In-memory driver that records steps for unit tests

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::driver::Driver;
use super::protocol::BrowserStep;
use crate::error::E2eResult;

type Responder = Box<dyn FnMut(&BrowserStep) -> E2eResult<Value> + Send>;

/// Shared view of every step a [`ScriptedDriver`] received
#[derive(Clone, Default)]
pub(crate) struct StepLog(Arc<Mutex<Vec<BrowserStep>>>);

impl StepLog {
    pub(crate) fn steps(&self) -> Vec<BrowserStep> {
        self.0.lock().clone()
    }

    /// The `action` tag of each recorded step
    pub(crate) fn actions(&self) -> Vec<String> {
        self.steps()
            .iter()
            .filter_map(|s| {
                serde_json::to_value(s)
                    .ok()?
                    .get("action")?
                    .as_str()
                    .map(String::from)
            })
            .collect()
    }

    /// Selectors touched by steps with the given action
    pub(crate) fn selectors_for(&self, action: &str) -> Vec<String> {
        self.steps()
            .iter()
            .filter_map(|s| {
                let value = serde_json::to_value(s).ok()?;
                if value.get("action")?.as_str()? != action {
                    return None;
                }
                value.get("selector")?.as_str().map(String::from)
            })
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().clear();
    }
}

pub(crate) struct ScriptedDriver {
    log: StepLog,
    responder: Responder,
}

impl ScriptedDriver {
    /// Every step succeeds with null
    pub(crate) fn new() -> (Self, StepLog) {
        Self::with_responder(|_| Ok(Value::Null))
    }

    pub(crate) fn with_responder<F>(responder: F) -> (Self, StepLog)
    where
        F: FnMut(&BrowserStep) -> E2eResult<Value> + Send + 'static,
    {
        let log = StepLog::default();
        let driver = Self {
            log: log.clone(),
            responder: Box::new(responder),
        };
        (driver, log)
    }
}

#[async_trait]
impl Driver for ScriptedDriver {
    async fn execute(&mut self, step: BrowserStep) -> E2eResult<Value> {
        let reply = (self.responder)(&step);
        self.log.0.lock().push(step);
        reply
    }
}
