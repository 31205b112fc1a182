//! Core records exchanged with the Pump Master backend

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Username/password pair submitted to the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// User identity attached to an authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tenant_id: String,
}

/// Result of a successful login or token refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user: UserInfo,
    /// Token lifetime in seconds
    pub expires_in: u64,
}

/// Pump classification accepted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PumpType {
    Centrifugal,
    Submersible,
    #[serde(rename = "Positive Displacement")]
    PositiveDisplacement,
    Turbine,
}

impl PumpType {
    pub const ALL: [PumpType; 4] = [
        PumpType::Centrifugal,
        PumpType::Submersible,
        PumpType::PositiveDisplacement,
        PumpType::Turbine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PumpType::Centrifugal => "Centrifugal",
            PumpType::Submersible => "Submersible",
            PumpType::PositiveDisplacement => "Positive Displacement",
            PumpType::Turbine => "Turbine",
        }
    }
}

impl fmt::Display for PumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PumpType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PumpType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownPumpType(s.to_string()))
    }
}

/// Operational status of a pump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PumpStatus {
    Active,
    Inactive,
    Maintenance,
    Decommissioned,
}

impl PumpStatus {
    pub const ALL: [PumpStatus; 4] = [
        PumpStatus::Active,
        PumpStatus::Inactive,
        PumpStatus::Maintenance,
        PumpStatus::Decommissioned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PumpStatus::Active => "Active",
            PumpStatus::Inactive => "Inactive",
            PumpStatus::Maintenance => "Maintenance",
            PumpStatus::Decommissioned => "Decommissioned",
        }
    }
}

impl fmt::Display for PumpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PumpStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PumpStatus::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownPumpStatus(s.to_string()))
    }
}

/// A pump as stored by the backend.
///
/// `pump_type` and `status` stay plain strings on the wire so negative
/// tests can submit values outside [`PumpType`] and [`PumpStatus`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpRecord {
    /// Absent until the backend assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub pump_type: String,
    pub area: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Flow rate with its unit, e.g. "1000 GPM"
    pub flow_rate: String,
    pub offset: f64,
    pub current_pressure: f64,
    pub min_pressure: f64,
    pub max_pressure: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl PumpRecord {
    /// Server-assigned id, or an empty string before creation
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn has_type(&self, pump_type: PumpType) -> bool {
        self.pump_type == pump_type.as_str()
    }

    pub fn has_status(&self, status: PumpStatus) -> bool {
        self.status.as_deref() == Some(status.as_str())
    }

    /// Compare every field present in `expected` against this record
    pub fn mismatches(&self, expected: &PumpUpdate) -> Vec<FieldMismatch> {
        let mut out = Vec::new();

        fn check<T: PartialEq + fmt::Debug>(
            out: &mut Vec<FieldMismatch>,
            field: &'static str,
            expected: &Option<T>,
            actual: &T,
        ) {
            if let Some(expected) = expected {
                if expected != actual {
                    out.push(FieldMismatch {
                        field,
                        expected: format!("{:?}", expected),
                        actual: format!("{:?}", actual),
                    });
                }
            }
        }

        check(&mut out, "name", &expected.name, &self.name);
        check(&mut out, "type", &expected.pump_type, &self.pump_type);
        check(&mut out, "area", &expected.area, &self.area);
        check(&mut out, "latitude", &expected.latitude, &self.latitude);
        check(&mut out, "longitude", &expected.longitude, &self.longitude);
        check(&mut out, "flowRate", &expected.flow_rate, &self.flow_rate);
        check(&mut out, "offset", &expected.offset, &self.offset);
        check(
            &mut out,
            "currentPressure",
            &expected.current_pressure,
            &self.current_pressure,
        );
        check(&mut out, "minPressure", &expected.min_pressure, &self.min_pressure);
        check(&mut out, "maxPressure", &expected.max_pressure, &self.max_pressure);
        if let Some(status) = &expected.status {
            if self.status.as_ref() != Some(status) {
                out.push(FieldMismatch {
                    field: "status",
                    expected: format!("{:?}", status),
                    actual: format!("{:?}", self.status),
                });
            }
        }

        out
    }
}

/// A single differing field found by [`PumpRecord::mismatches`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Partial pump payload; only populated fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub pump_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl PumpUpdate {
    pub fn is_empty(&self) -> bool {
        *self == PumpUpdate::default()
    }
}

impl From<&PumpRecord> for PumpUpdate {
    fn from(record: &PumpRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            pump_type: Some(record.pump_type.clone()),
            area: Some(record.area.clone()),
            latitude: Some(record.latitude),
            longitude: Some(record.longitude),
            flow_rate: Some(record.flow_rate.clone()),
            offset: Some(record.offset),
            current_pressure: Some(record.current_pressure),
            min_pressure: Some(record.min_pressure),
            max_pressure: Some(record.max_pressure),
            status: record.status.clone(),
        }
    }
}

/// A page of results from a list, search, or filter call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// One entry of a bulk update request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkUpdate {
    pub id: String,
    pub data: PumpUpdate,
}

/// File formats supported by export and import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// File name used for the multipart upload part
    pub fn upload_file_name(&self) -> String {
        format!("pumps.{}", self.as_str())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(Error::UnknownExportFormat(other.to_string())),
        }
    }
}

/// Outcome reported by the import endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: u64,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

/// A non-fatal failure captured for negative-path assertions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub status: u16,
    /// Decoded error body; a JSON string when the body was not JSON, null when empty
    pub error: serde_json::Value,
}

/// Role granted to a test user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Viewer,
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            "viewer" => Ok(UserRole::Viewer),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

/// A synthetic user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub tenant_id: String,
    pub role: UserRole,
}

impl TestUser {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }
}

/// Deployment the suite is pointed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestEnvironment {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl TestEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestEnvironment::Dev => "dev",
            TestEnvironment::Staging => "staging",
            TestEnvironment::Prod => "prod",
        }
    }
}

impl fmt::Display for TestEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestEnvironment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" | "development" | "test" => Ok(TestEnvironment::Dev),
            "staging" => Ok(TestEnvironment::Staging),
            "prod" | "production" => Ok(TestEnvironment::Prod),
            other => Err(Error::UnknownEnvironment(other.to_string())),
        }
    }
}
