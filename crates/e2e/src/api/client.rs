//! Domain-level client for the Pump Master REST API

use std::collections::BTreeMap;

use bytes::Bytes;
use pumpmaster_common::{
    AuthSession, BulkUpdate, Credentials, ExportFormat, FailureResponse, ImportSummary,
    PaginatedResult, PumpRecord, PumpUpdate,
};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::transport::{ApiResponse, ApiTransport, AuthMode};
use crate::error::{E2eError, E2eResult};

/// Page and limit sent with list, search, and filter calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// Export body: decoded JSON for `json`, raw bytes otherwise
#[derive(Debug, Clone, PartialEq)]
pub enum ExportPayload {
    Json(Value),
    Bytes(Bytes),
}

/// Test-data naming convention recognized by [`PumpMasterApi::cleanup`]
pub fn is_test_pump(pump: &PumpRecord) -> bool {
    pump.name.contains("Test") || pump.area.contains("test") || pump.area.contains("automation")
}

/// Authenticated facade over the Pump Master API.
///
/// Every operation checks the single status it expects and decodes the
/// body. The only state is the session token, so token-changing calls take
/// `&mut self` and everything else can run concurrently through `&self`.
#[derive(Debug, Clone)]
pub struct PumpMasterApi {
    transport: ApiTransport,
}

impl PumpMasterApi {
    pub fn new(base_url: impl Into<String>) -> E2eResult<Self> {
        Ok(Self::with_transport(ApiTransport::new(base_url)?))
    }

    pub fn with_transport(transport: ApiTransport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &ApiTransport {
        &self.transport
    }

    // --- token ---

    pub fn auth_token(&self) -> Option<&str> {
        self.transport.token()
    }

    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.transport.set_token(token);
    }

    pub fn clear_auth_token(&mut self) {
        self.transport.clear_token();
    }

    async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        auth: AuthMode<'_>,
        body: Option<&B>,
    ) -> E2eResult<ApiResponse> {
        let mut builder = self.transport.request(method, path, auth);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.transport.send(builder).await
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> E2eResult<ApiResponse> {
        let builder = self
            .transport
            .request(Method::GET, path, AuthMode::Session)
            .query(query);
        self.transport.send(builder).await
    }

    // --- authentication ---

    /// Log in and keep the returned token for later calls
    pub async fn login(&mut self, credentials: &Credentials) -> E2eResult<AuthSession> {
        let response = self
            .call(Method::POST, "/auth/login", AuthMode::Anonymous, Some(credentials))
            .await?;
        if response.status != 200 {
            return Err(E2eError::Authentication {
                status: response.status,
                body: response.text(),
            });
        }
        let session: AuthSession = response.json("login")?;
        self.transport.set_token(session.token.clone());
        info!("Logged in as {}", session.user.username);
        Ok(session)
    }

    pub async fn logout(&mut self) -> E2eResult<()> {
        self.call::<()>(Method::POST, "/auth/logout", AuthMode::Session, None)
            .await?
            .expect_status(200, "logout")?;
        self.transport.clear_token();
        Ok(())
    }

    /// Exchange the stored token for a fresh session
    pub async fn refresh_token(&mut self) -> E2eResult<AuthSession> {
        let response = self
            .call::<()>(Method::POST, "/auth/refresh", AuthMode::Session, None)
            .await?;
        if response.status != 200 {
            return Err(E2eError::Authentication {
                status: response.status,
                body: response.text(),
            });
        }
        let session: AuthSession = response.json("refresh token")?;
        self.transport.set_token(session.token.clone());
        Ok(session)
    }

    /// True only for a 200 from the validate endpoint; never fails
    pub async fn validate_token(&self) -> bool {
        match self
            .call::<()>(Method::GET, "/auth/validate", AuthMode::Session, None)
            .await
        {
            Ok(response) => response.status == 200,
            Err(e) => {
                debug!("Token validation request failed: {}", e);
                false
            }
        }
    }

    // --- single pump CRUD ---

    pub async fn create_pump(&self, pump: &PumpRecord) -> E2eResult<PumpRecord> {
        self.call(Method::POST, "/pumps", AuthMode::Session, Some(pump))
            .await?
            .expect_status(201, "create pump")?
            .json("create pump")
    }

    pub async fn get_pump(&self, id: &str) -> E2eResult<PumpRecord> {
        let response = self
            .call::<()>(Method::GET, &pump_path(id), AuthMode::Session, None)
            .await?;
        expect_found(response, 200, "get pump", id)?.json("get pump")
    }

    /// Send only the fields present in `update`
    pub async fn update_pump(&self, id: &str, update: &PumpUpdate) -> E2eResult<PumpRecord> {
        let response = self
            .call(Method::PUT, &pump_path(id), AuthMode::Session, Some(update))
            .await?;
        expect_found(response, 200, "update pump", id)?.json("update pump")
    }

    /// Delete a pump; a second delete of the same id fails with not-found
    pub async fn delete_pump(&self, id: &str) -> E2eResult<()> {
        let response = self
            .call::<()>(Method::DELETE, &pump_path(id), AuthMode::Session, None)
            .await?;
        expect_found(response, 204, "delete pump", id)?;
        Ok(())
    }

    // --- listing ---

    pub async fn get_all_pumps(&self, page: PageRequest) -> E2eResult<PaginatedResult<PumpRecord>> {
        self.get("/pumps", &page_query(page))
            .await?
            .expect_status(200, "list pumps")?
            .json("list pumps")
    }

    pub async fn search_pumps(
        &self,
        term: &str,
        page: PageRequest,
    ) -> E2eResult<PaginatedResult<PumpRecord>> {
        let mut query = vec![("q", term.to_string())];
        query.extend(page_query(page));
        self.get("/pumps/search", &query)
            .await?
            .expect_status(200, "search pumps")?
            .json("search pumps")
    }

    pub async fn filter_pumps_by_type(
        &self,
        pump_type: &str,
        page: PageRequest,
    ) -> E2eResult<PaginatedResult<PumpRecord>> {
        self.filter("type", pump_type, page).await
    }

    pub async fn filter_pumps_by_status(
        &self,
        status: &str,
        page: PageRequest,
    ) -> E2eResult<PaginatedResult<PumpRecord>> {
        self.filter("status", status, page).await
    }

    async fn filter(
        &self,
        key: &'static str,
        value: &str,
        page: PageRequest,
    ) -> E2eResult<PaginatedResult<PumpRecord>> {
        let mut query = vec![(key, value.to_string())];
        query.extend(page_query(page));
        self.get("/pumps/filter", &query)
            .await?
            .expect_status(200, "filter pumps")?
            .json("filter pumps")
    }

    // --- negative paths ---

    /// Post an arbitrary body and capture the failure instead of raising it
    pub async fn create_pump_with_invalid_data(&self, data: &Value) -> E2eResult<FailureResponse> {
        Ok(self
            .call(Method::POST, "/pumps", AuthMode::Session, Some(data))
            .await?
            .into_failure())
    }

    pub async fn update_pump_with_invalid_data(
        &self,
        id: &str,
        data: &Value,
    ) -> E2eResult<FailureResponse> {
        Ok(self
            .call(Method::PUT, &pump_path(id), AuthMode::Session, Some(data))
            .await?
            .into_failure())
    }

    /// Status of the protected list endpoint with no Authorization header
    pub async fn access_protected_endpoint_without_auth(&self) -> E2eResult<u16> {
        let response = self
            .call::<()>(Method::GET, "/pumps", AuthMode::Anonymous, None)
            .await?;
        Ok(response.status)
    }

    /// Status of the protected list endpoint with a bogus bearer token
    pub async fn access_protected_endpoint_with_invalid_auth(&self) -> E2eResult<u16> {
        let response = self
            .call::<()>(Method::GET, "/pumps", AuthMode::Bearer("invalid-token"), None)
            .await?;
        Ok(response.status)
    }

    // --- bulk ---

    pub async fn bulk_create_pumps(&self, pumps: &[PumpRecord]) -> E2eResult<Vec<PumpRecord>> {
        self.call(
            Method::POST,
            "/pumps/bulk",
            AuthMode::Session,
            Some(&json!({ "pumps": pumps })),
        )
        .await?
        .expect_status(201, "bulk create pumps")?
        .json("bulk create pumps")
    }

    pub async fn bulk_update_pumps(&self, updates: &[BulkUpdate]) -> E2eResult<Vec<PumpRecord>> {
        self.call(
            Method::PUT,
            "/pumps/bulk",
            AuthMode::Session,
            Some(&json!({ "updates": updates })),
        )
        .await?
        .expect_status(200, "bulk update pumps")?
        .json("bulk update pumps")
    }

    pub async fn bulk_delete_pumps(&self, ids: &[String]) -> E2eResult<()> {
        self.call(
            Method::DELETE,
            "/pumps/bulk",
            AuthMode::Session,
            Some(&json!({ "ids": ids })),
        )
        .await?
        .expect_status(204, "bulk delete pumps")?;
        Ok(())
    }

    // --- export / import ---

    pub async fn export_pumps(&self, format: ExportFormat) -> E2eResult<ExportPayload> {
        let response = self
            .get("/pumps/export", &[("format", format.as_str().to_string())])
            .await?
            .expect_status(200, "export pumps")?;
        match format {
            ExportFormat::Json => Ok(ExportPayload::Json(response.json("export pumps")?)),
            _ => Ok(ExportPayload::Bytes(response.body)),
        }
    }

    /// Upload `data` as `pumps.<ext>` with the format's MIME type
    pub async fn import_pumps(
        &self,
        data: impl Into<Vec<u8>>,
        format: ExportFormat,
    ) -> E2eResult<ImportSummary> {
        let file = Part::bytes(data.into())
            .file_name(format.upload_file_name())
            .mime_str(format.mime_type())?;
        let form = Form::new()
            .part("file", file)
            .text("format", format.as_str());

        let builder = self
            .transport
            .bare_request(Method::POST, "/pumps/import", AuthMode::Session)
            .multipart(form);
        self.transport
            .send(builder)
            .await?
            .expect_status(200, "import pumps")?
            .json("import pumps")
    }

    // --- statistics ---

    pub async fn get_pump_statistics(&self) -> E2eResult<Value> {
        self.get("/pumps/statistics", &[])
            .await?
            .expect_status(200, "pump statistics")?
            .json("pump statistics")
    }

    pub async fn get_pumps_by_status_count(&self) -> E2eResult<BTreeMap<String, u64>> {
        self.get("/pumps/statistics/status", &[])
            .await?
            .expect_status(200, "status statistics")?
            .json("status statistics")
    }

    pub async fn get_pumps_by_type_count(&self) -> E2eResult<BTreeMap<String, u64>> {
        self.get("/pumps/statistics/type", &[])
            .await?
            .expect_status(200, "type statistics")?
            .json("type statistics")
    }

    // --- teardown ---

    /// Delete every pump that looks like test data; failures are logged only.
    ///
    /// Returns how many pumps were deleted.
    pub async fn cleanup(&self) -> usize {
        let listing = match self.get_all_pumps(PageRequest::new(1, 1000)).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!("Cleanup failed to list pumps: {}", e);
                return 0;
            }
        };

        let mut deleted = 0;
        for pump in listing.data.iter().filter(|p| is_test_pump(p)) {
            let Some(id) = pump.id.as_deref() else {
                continue;
            };
            match self.delete_pump(id).await {
                Ok(()) => deleted += 1,
                Err(e) => warn!("Cleanup failed to delete pump {}: {}", id, e),
            }
        }

        debug!("Cleanup removed {} test pumps", deleted);
        deleted
    }
}

fn pump_path(id: &str) -> String {
    format!("/pumps/{}", id)
}

fn page_query(page: PageRequest) -> [(&'static str, String); 2] {
    [
        ("page", page.page.to_string()),
        ("limit", page.limit.to_string()),
    ]
}

fn expect_found(
    response: ApiResponse,
    expected: u16,
    operation: &str,
    id: &str,
) -> E2eResult<ApiResponse> {
    if response.status == 404 {
        return Err(E2eError::NotFound {
            resource: format!("pump {}", id),
            status: 404,
        });
    }
    response.expect_status(expected, operation)
}
