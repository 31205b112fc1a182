//! Pump Master REST API harness
//!
//! [`transport`] moves bytes and reports status codes. [`client`] maps
//! domain operations onto endpoints and applies the expected-status check
//! for each one. [`assertions`] holds the checks API tests build on top.

pub mod assertions;
pub mod client;
pub mod transport;

pub use assertions::{
    assert_jwt_shape, assert_page_limit, assert_paginated, assert_pump_fields,
    assert_pump_matches, is_jwt_shaped,
};
pub use client::{is_test_pump, ExportPayload, PageRequest, PumpMasterApi};
pub use transport::{ApiResponse, ApiTransport, AuthMode};
