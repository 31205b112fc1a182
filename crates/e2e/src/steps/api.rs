//! Given/When/Then clauses for the REST API
//!
//! "When" steps never fail: they record the outcome (session, pump, page,
//! or error) and "Then" steps assert on what was recorded.

use std::time::{Duration, Instant};

use pumpmaster_common::{
    AuthSession, Credentials, PaginatedResult, PumpRecord, PumpUpdate, TestDataFactory,
};
use tracing::debug;

use crate::api::{PageRequest, PumpMasterApi};
use crate::error::{E2eError, E2eResult};

/// Longest acceptable duration for a recorded request
pub const RESPONSE_TIME_LIMIT: Duration = Duration::from_secs(5);

/// Name used by the create-pump step
pub const API_PUMP_NAME: &str = "Test Pump API";
/// Name written by the update-pump step
pub const UPDATED_PUMP_NAME: &str = "Updated Test Pump API";

/// Failure captured from the last call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedError {
    pub status: Option<u16>,
    pub message: String,
}

impl From<&E2eError> for RecordedError {
    fn from(err: &E2eError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

pub struct ApiSteps {
    api: PumpMasterApi,
    credentials: Credentials,
    factory: TestDataFactory,
    session: Option<AuthSession>,
    pump: Option<PumpRecord>,
    pumps: Option<PaginatedResult<PumpRecord>>,
    last_error: Option<RecordedError>,
    last_elapsed: Option<Duration>,
}

impl ApiSteps {
    /// `credentials` is normally `SuiteConfig::api_credentials`
    pub fn new(api: PumpMasterApi, credentials: Credentials) -> Self {
        Self {
            api,
            credentials,
            factory: TestDataFactory::new(),
            session: None,
            pump: None,
            pumps: None,
            last_error: None,
            last_elapsed: None,
        }
    }

    /// Replace the factory that builds request bodies
    pub fn with_factory(mut self, factory: TestDataFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn api(&self) -> &PumpMasterApi {
        &self.api
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn pump(&self) -> Option<&PumpRecord> {
        self.pump.as_ref()
    }

    pub fn pumps(&self) -> Option<&PaginatedResult<PumpRecord>> {
        self.pumps.as_ref()
    }

    pub fn last_error(&self) -> Option<&RecordedError> {
        self.last_error.as_ref()
    }

    /// Keep the error, or clear it on success
    fn record<T>(&mut self, started: Instant, result: E2eResult<T>) -> Option<T> {
        self.last_elapsed = Some(started.elapsed());
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(err) => {
                debug!("Recorded API failure: {}", err);
                self.last_error = Some(RecordedError::from(&err));
                None
            }
        }
    }

    async fn login_with(&mut self, credentials: Credentials) {
        let started = Instant::now();
        let result = self.api.login(&credentials).await;
        if let Some(session) = self.record(started, result) {
            self.session = Some(session);
        }
    }

    fn record_pump(&mut self, started: Instant, result: E2eResult<PumpRecord>) {
        if let Some(pump) = self.record(started, result) {
            self.pump = Some(pump);
        }
    }

    fn record_pumps(
        &mut self,
        started: Instant,
        result: E2eResult<PaginatedResult<PumpRecord>>,
    ) {
        if let Some(pumps) = self.record(started, result) {
            self.pumps = Some(pumps);
        }
    }

    // --- authentication: given ---

    pub fn given_i_have_valid_api_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    pub fn given_i_have_invalid_api_credentials(&mut self) {
        self.credentials = Credentials::new("invalid@example.com", "wrongpassword");
    }

    pub fn given_i_am_not_authenticated(&mut self) {
        self.session = None;
        self.api.clear_auth_token();
    }

    pub async fn given_i_am_already_authenticated(&mut self) -> E2eResult<()> {
        self.when_i_send_a_login_request().await;
        self.then_i_should_receive_a_valid_auth_token()
    }

    // --- authentication: when ---

    pub async fn when_i_send_a_login_request(&mut self) {
        self.login_with(self.credentials.clone()).await;
    }

    pub async fn when_i_send_a_login_request_with_invalid_credentials(&mut self) {
        self.login_with(Credentials::new("invalid@example.com", "wrongpassword"))
            .await;
    }

    pub async fn when_i_send_a_login_request_with_missing_credentials(&mut self) {
        self.login_with(Credentials::new("", "")).await;
    }

    pub async fn when_i_send_a_logout_request(&mut self) {
        let started = Instant::now();
        let result = self.api.logout().await;
        self.record(started, result);
    }

    pub async fn when_i_send_a_refresh_token_request(&mut self) {
        let started = Instant::now();
        let result = self.api.refresh_token().await;
        if let Some(session) = self.record(started, result) {
            self.session = Some(session);
        }
    }

    // --- authentication: then ---

    fn expect_no_error(&self) -> E2eResult<()> {
        match &self.last_error {
            Some(err) => Err(E2eError::AssertionFailed(format!(
                "expected success, last call failed: {}",
                err.message
            ))),
            None => Ok(()),
        }
    }

    fn expect_error(&self) -> E2eResult<&RecordedError> {
        self.last_error
            .as_ref()
            .ok_or_else(|| E2eError::AssertionFailed("expected the last call to fail".to_string()))
    }

    fn expect_error_status(&self, status: u16) -> E2eResult<()> {
        let err = self.expect_error()?;
        if err.status != Some(status) {
            return Err(E2eError::AssertionFailed(format!(
                "expected status {}, got {:?}: {}",
                status, err.status, err.message
            )));
        }
        Ok(())
    }

    fn expect_no_session(&self) -> E2eResult<()> {
        if self.session.is_some() {
            return Err(E2eError::AssertionFailed(
                "a session was recorded".to_string(),
            ));
        }
        Ok(())
    }

    fn expect_no_pump(&self) -> E2eResult<()> {
        if self.pump.is_some() {
            return Err(E2eError::AssertionFailed("a pump was recorded".to_string()));
        }
        Ok(())
    }

    fn recorded_session(&self) -> E2eResult<&AuthSession> {
        self.session
            .as_ref()
            .ok_or_else(|| E2eError::AssertionFailed("no session recorded".to_string()))
    }

    fn recorded_pump(&self) -> E2eResult<&PumpRecord> {
        self.pump
            .as_ref()
            .ok_or_else(|| E2eError::AssertionFailed("no pump recorded".to_string()))
    }

    fn recorded_pumps(&self) -> E2eResult<&PaginatedResult<PumpRecord>> {
        self.pumps
            .as_ref()
            .ok_or_else(|| E2eError::AssertionFailed("no pump list recorded".to_string()))
    }

    /// Token present, user attached, positive lifetime
    pub fn then_i_should_receive_a_valid_auth_token(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        let session = self.recorded_session()?;
        if session.token.is_empty() {
            return Err(E2eError::AssertionFailed("empty token".to_string()));
        }
        if session.user.id.is_empty() {
            return Err(E2eError::AssertionFailed("session has no user".to_string()));
        }
        if session.expires_in == 0 {
            return Err(E2eError::AssertionFailed(
                "token expires immediately".to_string(),
            ));
        }
        Ok(())
    }

    pub fn then_i_should_receive_an_authentication_error(&self) -> E2eResult<()> {
        self.expect_error()?;
        self.expect_no_session()
    }

    pub fn then_i_should_receive_a_validation_error(&self) -> E2eResult<()> {
        self.expect_error()?;
        self.expect_no_session()
    }

    pub fn then_the_token_should_be_invalidated(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        if self.api.auth_token().is_some() {
            return Err(E2eError::AssertionFailed(
                "token still held after logout".to_string(),
            ));
        }
        Ok(())
    }

    pub fn then_i_should_receive_a_new_valid_token(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        if self.recorded_session()?.token.is_empty() {
            return Err(E2eError::AssertionFailed("empty token".to_string()));
        }
        Ok(())
    }

    pub fn then_i_should_receive_a_token_expired_error(&self) -> E2eResult<()> {
        self.expect_error().map(|_| ())
    }

    // --- pumps: given ---

    pub fn given_there_are_existing_pumps_in_the_system(&self) {
        debug!("pump data is seeded by the test; step skipped");
    }

    pub fn given_there_are_no_pumps_in_the_system(&self) {
        debug!("empty state requires a clean environment; step skipped");
    }

    pub async fn given_there_is_an_existing_pump_with_id(&mut self, id: &str) {
        self.when_i_send_a_get_pump_request(id).await;
    }

    // --- pumps: when ---

    pub async fn when_i_send_a_get_all_pumps_request(&mut self) {
        let started = Instant::now();
        let result = self.api.get_all_pumps(PageRequest::default()).await;
        self.record_pumps(started, result);
    }

    pub async fn when_i_send_a_get_pump_request(&mut self, id: &str) {
        let started = Instant::now();
        let result = self.api.get_pump(id).await;
        self.record_pump(started, result);
    }

    pub async fn when_i_send_a_create_pump_request(&mut self) {
        let pump = self.factory.api_pump(API_PUMP_NAME);
        let started = Instant::now();
        let result = self.api.create_pump(&pump).await;
        self.record_pump(started, result);
    }

    /// Posts a body that violates every field rule; success would be recorded as a pump
    pub async fn when_i_send_a_create_pump_request_with_invalid_data(&mut self) {
        let invalid = self.factory.create_invalid_pump();
        let started = Instant::now();
        let result = match self.api.create_pump_with_invalid_data(&invalid).await {
            Ok(failure) if failure.status >= 400 => Err(E2eError::UnexpectedStatus {
                operation: "create pump".to_string(),
                expected: 201,
                actual: failure.status,
                body: failure.error.to_string(),
            }),
            Ok(failure) => serde_json::from_value::<PumpRecord>(failure.error).map_err(|e| {
                E2eError::Decode {
                    operation: "create pump".to_string(),
                    reason: e.to_string(),
                }
            }),
            Err(err) => Err(err),
        };
        self.record_pump(started, result);
    }

    pub async fn when_i_send_an_update_pump_request(&mut self, id: &str) {
        let update = PumpUpdate {
            name: Some(UPDATED_PUMP_NAME.to_string()),
            status: Some("Maintenance".to_string()),
            ..PumpUpdate::default()
        };
        let started = Instant::now();
        let result = self.api.update_pump(id, &update).await;
        self.record_pump(started, result);
    }

    pub async fn when_i_send_a_delete_pump_request(&mut self, id: &str) {
        let started = Instant::now();
        let result = self.api.delete_pump(id).await;
        self.record(started, result);
    }

    pub async fn when_i_send_a_search_pumps_request(&mut self, term: &str) {
        let started = Instant::now();
        let result = self.api.search_pumps(term, PageRequest::default()).await;
        self.record_pumps(started, result);
    }

    /// `filter_type` is `type` or `status`; anything else records an error
    pub async fn when_i_send_a_filter_pumps_request(&mut self, filter_type: &str, value: &str) {
        let started = Instant::now();
        let result = match filter_type {
            "type" => self.api.filter_pumps_by_type(value, PageRequest::default()).await,
            "status" => {
                self.api
                    .filter_pumps_by_status(value, PageRequest::default())
                    .await
            }
            other => Err(E2eError::UnknownField(format!("filter type {}", other))),
        };
        self.record_pumps(started, result);
    }

    pub async fn when_i_send_a_get_pump_request_with_invalid_id(&mut self) {
        self.when_i_send_a_get_pump_request("invalid-id").await;
    }

    /// Three concurrent list calls; the first page is recorded
    pub async fn when_i_send_multiple_simultaneous_requests(&mut self) {
        let started = Instant::now();
        let result = futures::future::try_join_all(
            (0..3).map(|_| self.api.get_all_pumps(PageRequest::default())),
        )
        .await
        .and_then(|mut pages| {
            if pages.is_empty() {
                Err(E2eError::AssertionFailed("no responses".to_string()))
            } else {
                Ok(pages.swap_remove(0))
            }
        });
        self.record_pumps(started, result);
    }

    // --- pumps: then ---

    pub fn then_i_should_receive_a_list_of_pumps(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        let pumps = self.recorded_pumps()?;
        if pumps.total == 0 {
            return Err(E2eError::AssertionFailed("pump list is empty".to_string()));
        }
        if let Some(pump) = pumps.data.iter().find(|p| p.id.is_none() || p.status.is_none()) {
            return Err(E2eError::AssertionFailed(format!(
                "pump {:?} is missing id or status",
                pump.name
            )));
        }
        Ok(())
    }

    pub fn then_i_should_receive_pump_details(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        let pump = self.recorded_pump()?;
        if pump.id.is_none() || pump.name.is_empty() || pump.pump_type.is_empty() {
            return Err(E2eError::AssertionFailed(format!(
                "incomplete pump details: {:?}",
                pump
            )));
        }
        Ok(())
    }

    pub fn then_the_pump_should_be_created_successfully(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        let pump = self.recorded_pump()?;
        if pump.id.is_none() || pump.name != API_PUMP_NAME || pump.pump_type != "Centrifugal" {
            return Err(E2eError::AssertionFailed(format!(
                "unexpected created pump: {:?}",
                pump
            )));
        }
        Ok(())
    }

    pub fn then_the_pump_should_be_updated_successfully(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        let pump = self.recorded_pump()?;
        if pump.name != UPDATED_PUMP_NAME || pump.status.as_deref() != Some("Maintenance") {
            return Err(E2eError::AssertionFailed(format!(
                "update not applied: {:?}",
                pump
            )));
        }
        Ok(())
    }

    pub fn then_the_pump_should_be_deleted_successfully(&self) -> E2eResult<()> {
        self.expect_no_error()
    }

    pub fn then_i_should_receive_filtered_results(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        self.recorded_pumps().map(|_| ())
    }

    pub fn then_i_should_receive_search_results(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        let pumps = self.recorded_pumps()?;
        if let Some(pump) = pumps.data.iter().find(|p| p.name.is_empty()) {
            return Err(E2eError::AssertionFailed(format!(
                "search result without a name: {:?}",
                pump.id
            )));
        }
        Ok(())
    }

    pub fn then_i_should_receive_an_empty_list(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        let pumps = self.recorded_pumps()?;
        if !pumps.data.is_empty() {
            return Err(E2eError::AssertionFailed(format!(
                "expected no pumps, got {}",
                pumps.data.len()
            )));
        }
        Ok(())
    }

    pub fn then_i_should_receive_a_not_found_error(&self) -> E2eResult<()> {
        self.expect_error_status(404)?;
        self.expect_no_pump()
    }

    pub fn then_i_should_receive_an_unauthorized_error(&self) -> E2eResult<()> {
        self.expect_error_status(401)
    }

    pub fn then_i_should_receive_a_bad_request_error(&self) -> E2eResult<()> {
        self.expect_error_status(400)
    }

    pub fn then_all_requests_should_complete_successfully(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        self.recorded_pumps().map(|_| ())
    }

    pub fn then_the_response_time_should_be_acceptable(&self) -> E2eResult<()> {
        self.expect_no_error()?;
        match self.last_elapsed {
            Some(elapsed) if elapsed >= RESPONSE_TIME_LIMIT => Err(E2eError::AssertionFailed(
                format!("request took {:?}", elapsed),
            )),
            _ => Ok(()),
        }
    }

    pub fn then_i_should_receive_an_error_about_invalid_data(&self) -> E2eResult<()> {
        self.expect_error()?;
        self.expect_no_pump()
    }
}
