//! Pump Master Common Library
//!
//! Domain records shared by the API client, page objects, and step
//! functions, plus the synthetic data factory used to populate them.

pub mod error;
pub mod factory;
pub mod types;

pub use error::{Error, Result};
pub use factory::{ScenarioData, SequenceGenerator, TestDataFactory};
pub use types::*;
