//! Behaviour-style step functions
//!
//! Browser steps delegate to page objects; [`ApiSteps`] drives the REST
//! client and records what happened for the following "then" clauses.
//! Clauses for features the product no longer has are kept as no-ops that
//! log at `debug` so scenarios that mention them still read end to end.

pub mod api;
pub mod login;
pub mod pump_management;
pub mod pump_overview;

pub use api::{ApiSteps, RecordedError};
pub use login::LoginSteps;
pub use pump_management::PumpManagementSteps;
pub use pump_overview::{PumpOverviewSteps, RoleCredentials};
