//! Assertion helpers for API tests

use std::sync::OnceLock;

use pumpmaster_common::{PaginatedResult, PumpRecord, PumpUpdate};
use regex::Regex;

use super::client::PumpMasterApi;
use crate::error::{E2eError, E2eResult};

fn jwt_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9\-_]+\.[A-Za-z0-9\-_]+\.[A-Za-z0-9\-_]+$").ok())
        .as_ref()
}

/// Three base64url segments separated by dots
pub fn is_jwt_shaped(token: &str) -> bool {
    jwt_pattern().is_some_and(|re| re.is_match(token))
}

pub fn assert_jwt_shape(token: &str) -> E2eResult<()> {
    if is_jwt_shaped(token) {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(format!(
            "token is not JWT-shaped: {:?}",
            token
        )))
    }
}

/// Every field present in `expected` must match `actual`
pub fn assert_pump_fields(actual: &PumpRecord, expected: &PumpUpdate) -> E2eResult<()> {
    let mismatches = actual.mismatches(expected);
    if mismatches.is_empty() {
        return Ok(());
    }
    let details: Vec<String> = mismatches.iter().map(ToString::to_string).collect();
    Err(E2eError::AssertionFailed(format!(
        "pump {} differs: {}",
        actual.id_str(),
        details.join("; ")
    )))
}

/// Field-wise comparison against a full record, ignoring server-managed fields
pub fn assert_pump_matches(actual: &PumpRecord, expected: &PumpRecord) -> E2eResult<()> {
    assert_pump_fields(actual, &PumpUpdate::from(expected))
}

/// Total and page match when given; the page never holds more than `limit` items
pub fn assert_paginated<T>(
    result: &PaginatedResult<T>,
    expected_total: Option<u64>,
    expected_page: Option<u32>,
) -> E2eResult<()> {
    if let Some(total) = expected_total {
        if result.total != total {
            return Err(E2eError::AssertionFailed(format!(
                "expected total {}, got {}",
                total, result.total
            )));
        }
    }
    if let Some(page) = expected_page {
        if result.page != page {
            return Err(E2eError::AssertionFailed(format!(
                "expected page {}, got {}",
                page, result.page
            )));
        }
    }
    if result.data.len() > result.limit as usize {
        return Err(E2eError::AssertionFailed(format!(
            "page holds {} items, above limit {}",
            result.data.len(),
            result.limit
        )));
    }
    Ok(())
}

/// The server echoed the requested page size
pub fn assert_page_limit<T>(result: &PaginatedResult<T>, expected_limit: u32) -> E2eResult<()> {
    if result.limit != expected_limit {
        return Err(E2eError::AssertionFailed(format!(
            "expected limit {}, got {}",
            expected_limit, result.limit
        )));
    }
    Ok(())
}

impl PumpMasterApi {
    /// Fetch `id` and confirm the backend returns that same pump
    pub async fn assert_pump_exists(&self, id: &str) -> E2eResult<PumpRecord> {
        let pump = self.get_pump(id).await?;
        if pump.id_str() != id {
            return Err(E2eError::AssertionFailed(format!(
                "requested pump {}, received {}",
                id,
                pump.id_str()
            )));
        }
        Ok(pump)
    }

    /// Passes only when reading `id` fails with a 404
    pub async fn assert_pump_does_not_exist(&self, id: &str) -> E2eResult<()> {
        match self.get_pump(id).await {
            Ok(_) => Err(E2eError::AssertionFailed(format!(
                "pump {} still exists",
                id
            ))),
            Err(e) if e.to_string().contains("404") => Ok(()),
            Err(e) => Err(E2eError::AssertionFailed(format!(
                "reading pump {} failed without a 404: {}",
                id, e
            ))),
        }
    }
}
