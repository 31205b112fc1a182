//! Synthetic users and pumps for test scenarios
//!
//! Uniqueness comes from a [`SequenceGenerator`] handed to the factory
//! rather than process-wide counters. Each generator carries a run tag
//! derived from a v4 UUID, so two workers creating "pump 1" at the same
//! time still produce distinct names.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::types::{
    Credentials, PumpRecord, PumpStatus, PumpType, PumpUpdate, TestEnvironment, TestUser,
    UserRole,
};

/// Latitude of the default pump location (New York City)
pub const ORIGIN_LATITUDE: f64 = 40.7128;
/// Longitude of the default pump location
pub const ORIGIN_LONGITUDE: f64 = -74.006;
/// Password used by every synthetic user
pub const DEFAULT_PASSWORD: &str = "Test@123";

/// Run-scoped counters for user and pump numbering
#[derive(Debug)]
pub struct SequenceGenerator {
    run_tag: String,
    users: AtomicU64,
    pumps: AtomicU64,
}

impl SequenceGenerator {
    /// Create a generator with a fresh random run tag
    pub fn new() -> Self {
        let tag = Uuid::new_v4().simple().to_string();
        Self::with_run_tag(&tag[..8])
    }

    /// Create a generator with a fixed run tag
    pub fn with_run_tag(tag: impl Into<String>) -> Self {
        Self {
            run_tag: tag.into(),
            users: AtomicU64::new(0),
            pumps: AtomicU64::new(0),
        }
    }

    pub fn run_tag(&self) -> &str {
        &self.run_tag
    }

    pub fn next_user(&self) -> u64 {
        self.users.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn next_pump(&self) -> u64 {
        self.pumps.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn reset(&self) {
        self.users.store(0, Ordering::Relaxed);
        self.pumps.store(0, Ordering::Relaxed);
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Canned data for a named scenario
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioData {
    LoginSuccess {
        user: TestUser,
        expected_url: &'static str,
    },
    LoginFailure {
        credentials: Credentials,
        expected_error: &'static str,
    },
    PumpCreation {
        pump: PumpRecord,
        expected_success: &'static str,
    },
    PumpValidation {
        pump: Value,
        expected_errors: Vec<&'static str>,
    },
    SearchResults {
        pumps: Vec<PumpRecord>,
        search_term: &'static str,
    },
    FilterResults {
        pumps: Vec<PumpRecord>,
        filter_type: PumpType,
    },
}

/// Produces randomized records with deterministic shape
pub struct TestDataFactory {
    sequence: Arc<SequenceGenerator>,
    rng: StdRng,
}

impl TestDataFactory {
    /// Factory with its own sequence and an entropy-seeded RNG
    pub fn new() -> Self {
        Self::with_parts(Arc::new(SequenceGenerator::new()), StdRng::from_entropy())
    }

    /// Factory with a seeded RNG; numbering still comes from `sequence`
    pub fn seeded(sequence: Arc<SequenceGenerator>, seed: u64) -> Self {
        Self::with_parts(sequence, StdRng::seed_from_u64(seed))
    }

    pub fn with_parts(sequence: Arc<SequenceGenerator>, rng: StdRng) -> Self {
        Self { sequence, rng }
    }

    pub fn sequence(&self) -> &Arc<SequenceGenerator> {
        &self.sequence
    }

    pub fn run_tag(&self) -> &str {
        self.sequence.run_tag()
    }

    // --- users ---

    pub fn create_user(&mut self) -> TestUser {
        self.create_user_with(|_| {})
    }

    /// Create a user and let `customize` override any field
    pub fn create_user_with(&mut self, customize: impl FnOnce(&mut TestUser)) -> TestUser {
        let n = self.sequence.next_user();
        let tag = self.sequence.run_tag();
        let email = format!("testuser{}-{}@pumpmaster.com", n, tag);
        let mut user = TestUser {
            username: email.clone(),
            password: DEFAULT_PASSWORD.to_string(),
            email,
            tenant_id: format!("tenant-{}-{}", tag, n),
            role: UserRole::User,
        };
        customize(&mut user);
        user
    }

    pub fn create_admin_user(&mut self) -> TestUser {
        self.create_user_with(|u| {
            u.role = UserRole::Admin;
            u.username = "admin@pumpmaster.com".to_string();
            u.email = "admin@pumpmaster.com".to_string();
        })
    }

    pub fn create_viewer_user(&mut self) -> TestUser {
        self.create_user_with(|u| {
            u.role = UserRole::Viewer;
            u.username = "viewer@pumpmaster.com".to_string();
            u.email = "viewer@pumpmaster.com".to_string();
        })
    }

    /// Known accounts provisioned in each deployment
    pub fn environment_credentials(&mut self, environment: TestEnvironment) -> TestUser {
        let (username, password) = match environment {
            TestEnvironment::Dev => ("dev.user@pumpmaster.com", "DevTest@123"),
            TestEnvironment::Staging => ("staging.user@pumpmaster.com", "StagingTest@123"),
            TestEnvironment::Prod => ("prod.user@pumpmaster.com", "ProdTest@123"),
        };
        self.create_user_with(|u| {
            u.username = username.to_string();
            u.password = password.to_string();
        })
    }

    // --- pumps ---

    pub fn create_pump(&mut self) -> PumpRecord {
        self.create_pump_with(|_| {})
    }

    /// Create a randomized pump and let `customize` override any field
    pub fn create_pump_with(&mut self, customize: impl FnOnce(&mut PumpRecord)) -> PumpRecord {
        let n = self.sequence.next_pump();
        let pump_type = PumpType::ALL[self.rng.gen_range(0..PumpType::ALL.len())];
        let status = PumpStatus::ALL[self.rng.gen_range(0..PumpStatus::ALL.len())];
        let building = char::from(b'A' + (n % 26) as u8);

        let mut pump = PumpRecord {
            id: None,
            name: format!("Test Pump {}-{}", self.sequence.run_tag(), n),
            pump_type: pump_type.as_str().to_string(),
            area: format!("Building {} - Room {}", building, 100 + n),
            latitude: ORIGIN_LATITUDE + self.rng.gen_range(-0.05..0.05),
            longitude: ORIGIN_LONGITUDE + self.rng.gen_range(-0.05..0.05),
            flow_rate: format!("{} GPM", self.rng.gen_range(500..5500)),
            offset: f64::from(self.rng.gen_range(0..10u32)),
            current_pressure: f64::from(self.rng.gen_range(100..200u32)),
            min_pressure: f64::from(self.rng.gen_range(50..100u32)),
            max_pressure: f64::from(self.rng.gen_range(200..300u32)),
            status: Some(status.as_str().to_string()),
            created_at: None,
            updated_at: None,
        };
        customize(&mut pump);
        pump
    }

    pub fn create_pumps(&mut self, count: usize) -> Vec<PumpRecord> {
        (0..count).map(|_| self.create_pump()).collect()
    }

    pub fn create_pumps_by_type(&mut self, pump_type: PumpType, count: usize) -> Vec<PumpRecord> {
        (0..count)
            .map(|_| self.create_pump_with(|p| p.pump_type = pump_type.as_str().to_string()))
            .collect()
    }

    pub fn create_pumps_by_status(&mut self, status: PumpStatus, count: usize) -> Vec<PumpRecord> {
        (0..count)
            .map(|_| self.create_pump_with(|p| p.status = Some(status.as_str().to_string())))
            .collect()
    }

    pub fn create_centrifugal_pumps(&mut self, count: usize) -> Vec<PumpRecord> {
        self.create_pumps_by_type(PumpType::Centrifugal, count)
    }

    pub fn create_submersible_pumps(&mut self, count: usize) -> Vec<PumpRecord> {
        self.create_pumps_by_type(PumpType::Submersible, count)
    }

    pub fn create_active_pumps(&mut self, count: usize) -> Vec<PumpRecord> {
        self.create_pumps_by_status(PumpStatus::Active, count)
    }

    pub fn create_inactive_pumps(&mut self, count: usize) -> Vec<PumpRecord> {
        self.create_pumps_by_status(PumpStatus::Inactive, count)
    }

    /// Five pumps with names that exercise free-text search
    pub fn create_search_test_pumps(&mut self) -> Vec<PumpRecord> {
        [
            ("High Efficiency Centrifugal Pump", PumpType::Centrifugal),
            ("Submersible Water Pump", PumpType::Submersible),
            ("Industrial Centrifugal System", PumpType::Centrifugal),
            ("Deep Well Submersible Unit", PumpType::Submersible),
            ("Positive Displacement Pump", PumpType::PositiveDisplacement),
        ]
        .into_iter()
        .map(|(name, pump_type)| {
            self.create_pump_with(|p| {
                p.name = name.to_string();
                p.pump_type = pump_type.as_str().to_string();
            })
        })
        .collect()
    }

    /// Three centrifugal, two submersible, four active, three inactive
    pub fn create_filter_test_pumps(&mut self) -> Vec<PumpRecord> {
        let mut pumps = self.create_centrifugal_pumps(3);
        pumps.extend(self.create_submersible_pumps(2));
        pumps.extend(self.create_active_pumps(4));
        pumps.extend(self.create_inactive_pumps(3));
        pumps
    }

    /// Payload that violates every field rule
    pub fn create_invalid_pump(&self) -> Value {
        json!({
            "name": "",
            "type": "InvalidType",
            "area": "",
            "latitude": "invalid",
            "longitude": "invalid",
            "flowRate": "invalid capacity",
            "offset": "invalid",
            "currentPressure": "invalid",
            "minPressure": "invalid",
            "maxPressure": "invalid"
        })
    }

    /// Payload missing every required field but `area`
    pub fn create_incomplete_pump(&self) -> Value {
        json!({ "area": "Test Area with missing required fields" })
    }

    pub fn create_large_dataset(&mut self, count: usize) -> Vec<PumpRecord> {
        (1..=count)
            .map(|i| self.create_pump_with(|p| p.name = format!("Performance Test Pump {}", i)))
            .collect()
    }

    /// Minimum, maximum, and special-character edge cases
    pub fn create_boundary_test_pumps(&mut self) -> Vec<PumpRecord> {
        vec![
            self.create_pump_with(|p| {
                p.name = "A".to_string();
                p.flow_rate = "1 GPM".to_string();
                p.offset = 0.0;
                p.min_pressure = 1.0;
                p.max_pressure = 2.0;
            }),
            self.create_pump_with(|p| {
                p.name = "A".repeat(255);
                p.flow_rate = "99999 GPM".to_string();
                p.offset = 100.0;
                p.current_pressure = 500.0;
                p.min_pressure = 400.0;
                p.max_pressure = 600.0;
            }),
            self.create_pump_with(|p| {
                p.name = "Pump with Special Characters !@#$%^&*()".to_string();
                p.flow_rate = "1000.5 GPM".to_string();
                p.area = "Area with Unicode: 测试位置".to_string();
                p.latitude = 90.0;
                p.longitude = 180.0;
            }),
        ]
    }

    /// Partial update touching name, status, area, pressure, and offset
    pub fn create_pump_update_data(&self) -> PumpUpdate {
        PumpUpdate {
            name: Some(format!(
                "Updated Pump {}",
                chrono::Utc::now().timestamp_millis()
            )),
            status: Some(PumpStatus::Maintenance.as_str().to_string()),
            area: Some("Updated area for testing purposes".to_string()),
            current_pressure: Some(175.0),
            offset: Some(5.0),
            ..Default::default()
        }
    }

    /// The fixed pump used by API tests, named `name`
    pub fn api_pump(&self, name: impl Into<String>) -> PumpRecord {
        PumpRecord {
            id: None,
            name: name.into(),
            pump_type: PumpType::Centrifugal.as_str().to_string(),
            area: "Building A - Room 101".to_string(),
            latitude: ORIGIN_LATITUDE,
            longitude: ORIGIN_LONGITUDE,
            flow_rate: "1000 GPM".to_string(),
            offset: 0.0,
            current_pressure: 150.0,
            min_pressure: 100.0,
            max_pressure: 200.0,
            status: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// [`Self::api_pump`] with the conventional name
    pub fn pump_test_data(&self) -> PumpRecord {
        self.api_pump("Test Pump")
    }

    /// Default UI credentials; `TEST_USERNAME`/`TEST_PASSWORD` take precedence upstream
    pub fn login_test_data(&self) -> Credentials {
        Credentials::new("testuser@pumpmaster.com", DEFAULT_PASSWORD)
    }

    pub fn invalid_login_credentials(&self) -> Credentials {
        Credentials::new("invalid@example.com", "wrongpassword")
    }

    /// Look up a named scenario; `None` for unknown names
    pub fn scenario_data(&mut self, scenario: &str) -> Option<ScenarioData> {
        let data = match scenario {
            "login-success" => ScenarioData::LoginSuccess {
                user: self.create_user(),
                expected_url: "/pumps",
            },
            "login-failure" => ScenarioData::LoginFailure {
                credentials: Credentials::new("invalid@test.com", "wrongpassword"),
                expected_error: "Invalid username or password",
            },
            "pump-creation" => ScenarioData::PumpCreation {
                pump: self.create_pump(),
                expected_success: "Pump created successfully",
            },
            "pump-validation" => ScenarioData::PumpValidation {
                pump: self.create_invalid_pump(),
                expected_errors: vec!["Name is required", "Invalid pump type"],
            },
            "search-results" => ScenarioData::SearchResults {
                pumps: self.create_search_test_pumps(),
                search_term: "Centrifugal",
            },
            "filter-results" => ScenarioData::FilterResults {
                pumps: self.create_filter_test_pumps(),
                filter_type: PumpType::Centrifugal,
            },
            _ => return None,
        };
        Some(data)
    }

    /// Restart numbering for this factory's sequence
    pub fn reset_counters(&self) {
        self.sequence.reset();
    }
}

impl Default for TestDataFactory {
    fn default() -> Self {
        Self::new()
    }
}
