//! Page-level helpers that sit beside the page objects
//!
//! Viewport presets, network shaping and mocking, timing, and the odd
//! interaction a page object does not own.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::browser::{BrowserStep, Driver, InteractionKit, LoadState, Locator, Viewport, WaitState};
use crate::error::{E2eError, E2eResult};

pub const MOBILE_VIEWPORT: Viewport = Viewport::new(375, 667);
pub const TABLET_VIEWPORT: Viewport = Viewport::new(768, 1024);
pub const DESKTOP_VIEWPORT: Viewport = Viewport::new(1920, 1080);

const SLOW_NETWORK_DELAY: Duration = Duration::from_secs(2);
const STABLE_POLL: Duration = Duration::from_millis(100);

const IMAGES_LOADED: &str =
    "Array.from(document.querySelectorAll('img')).every(img => img.complete)";

const MEMORY_USAGE: &str = "(() => { const m = performance.memory || {}; return { \
    usedJSHeapSize: m.usedJSHeapSize || 0, \
    totalJSHeapSize: m.totalJSHeapSize || 0, \
    jsHeapSizeLimit: m.jsHeapSizeLimit || 0 }; })()";

/// JS heap figures; zero on browsers without `performance.memory`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryUsage {
    #[serde(rename = "usedJSHeapSize")]
    pub used_js_heap_size: u64,
    #[serde(rename = "totalJSHeapSize")]
    pub total_js_heap_size: u64,
    #[serde(rename = "jsHeapSizeLimit")]
    pub js_heap_size_limit: u64,
}

// --- viewports ---

pub async fn set_mobile_viewport<D: Driver>(kit: &InteractionKit<D>) -> E2eResult<()> {
    kit.set_viewport(MOBILE_VIEWPORT).await
}

pub async fn set_tablet_viewport<D: Driver>(kit: &InteractionKit<D>) -> E2eResult<()> {
    kit.set_viewport(TABLET_VIEWPORT).await
}

pub async fn set_desktop_viewport<D: Driver>(kit: &InteractionKit<D>) -> E2eResult<()> {
    kit.set_viewport(DESKTOP_VIEWPORT).await
}

// --- network ---

/// Hold every request for two seconds before letting it through
pub async fn simulate_slow_network<D: Driver>(kit: &InteractionKit<D>) -> E2eResult<()> {
    kit.run(BrowserStep::RouteDelay {
        pattern: "**/*".to_string(),
        delay_ms: SLOW_NETWORK_DELAY.as_millis() as u64,
    })
    .await?;
    Ok(())
}

pub async fn simulate_offline<D: Driver>(kit: &InteractionKit<D>) -> E2eResult<()> {
    kit.run(BrowserStep::SetOffline { offline: true }).await?;
    Ok(())
}

pub async fn restore_online<D: Driver>(kit: &InteractionKit<D>) -> E2eResult<()> {
    kit.run(BrowserStep::SetOffline { offline: false }).await?;
    Ok(())
}

fn endpoint_pattern(endpoint: &str) -> String {
    format!("**/*{}*", endpoint)
}

/// Answer requests whose URL contains `endpoint` with `200` and `body` as JSON
pub async fn mock_api_response<D: Driver>(
    kit: &InteractionKit<D>,
    endpoint: &str,
    body: &Value,
) -> E2eResult<()> {
    mock_api_error(kit, endpoint, 200, body).await
}

/// Answer requests whose URL contains `endpoint` with `status` and `body`
pub async fn mock_api_error<D: Driver>(
    kit: &InteractionKit<D>,
    endpoint: &str,
    status: u16,
    body: &Value,
) -> E2eResult<()> {
    kit.run(BrowserStep::RouteFulfill {
        pattern: endpoint_pattern(endpoint),
        status,
        content_type: "application/json".to_string(),
        body: serde_json::to_string(body)?,
    })
    .await?;
    Ok(())
}

/// Drop a mock installed by [`mock_api_response`] or [`mock_api_error`]
pub async fn clear_api_mock<D: Driver>(kit: &InteractionKit<D>, endpoint: &str) -> E2eResult<()> {
    kit.run(BrowserStep::Unroute {
        pattern: endpoint_pattern(endpoint),
    })
    .await?;
    Ok(())
}

pub async fn wait_for_network_idle<D: Driver>(kit: &InteractionKit<D>) -> E2eResult<()> {
    kit.wait_for_load_state(LoadState::NetworkIdle).await
}

// --- page helpers ---

pub async fn wait_for_images<D: Driver>(kit: &InteractionKit<D>) -> E2eResult<()> {
    kit.run(BrowserStep::WaitForFunction {
        script: IMAGES_LOADED.to_string(),
        timeout_ms: kit.timeouts().navigation.as_millis() as u64,
    })
    .await?;
    Ok(())
}

/// Scroll the element into view and wait until it is visible
pub async fn scroll_to_element<D: Driver>(
    kit: &InteractionKit<D>,
    locator: &Locator,
) -> E2eResult<()> {
    kit.scroll_to_element(locator).await?;
    kit.wait_for_element(locator).await
}

/// Full-page screenshot named `<name>-<timestamp>.png`
pub async fn take_timestamped_screenshot<D: Driver>(
    kit: &InteractionKit<D>,
    name: &str,
) -> E2eResult<PathBuf> {
    let stamp = Utc::now()
        .format("%Y-%m-%dT%H-%M-%S-%3fZ")
        .to_string();
    kit.take_screenshot(&format!("{}-{}", name, stamp)).await
}

/// Click, clear, then type one character at a time
pub async fn type_with_delay<D: Driver>(
    kit: &InteractionKit<D>,
    locator: &Locator,
    text: &str,
    delay: Duration,
) -> E2eResult<()> {
    kit.click_element(locator).await?;
    kit.run(BrowserStep::Clear {
        selector: locator.to_string(),
    })
    .await?;
    kit.type_text(locator, text, delay).await
}

/// Glide the mouse to the element centre in five steps, then hover
pub async fn hover_with_movement<D: Driver>(
    kit: &InteractionKit<D>,
    locator: &Locator,
) -> E2eResult<()> {
    if let Some(bbox) = kit.bounding_box(locator).await? {
        let (x, y) = bbox.center();
        kit.mouse_move(x, y, 5).await?;
        kit.hover(locator).await?;
    }
    Ok(())
}

/// Wait until the element's position is unchanged between two polls
pub async fn wait_for_element_stable<D: Driver>(
    kit: &InteractionKit<D>,
    locator: &Locator,
    timeout: Duration,
) -> E2eResult<()> {
    let started = Instant::now();
    let mut previous: Option<(f64, f64)> = None;

    while started.elapsed() < timeout {
        match kit.bounding_box(locator).await {
            Ok(Some(bbox)) => {
                let current = (bbox.x, bbox.y);
                if previous == Some(current) {
                    return Ok(());
                }
                previous = Some(current);
            }
            Ok(None) => {}
            Err(e) => debug!("{} not measurable yet: {}", locator, e),
        }
        tokio::time::sleep(STABLE_POLL).await;
    }

    Err(E2eError::Timeout(format!(
        "{} to stabilize within {}ms",
        locator,
        timeout.as_millis()
    )))
}

/// Cookies, permissions, local and session storage
pub async fn clear_browser_data<D: Driver>(kit: &InteractionKit<D>) -> E2eResult<()> {
    kit.run(BrowserStep::ClearStorage).await?;
    Ok(())
}

pub async fn get_memory_usage<D: Driver>(kit: &InteractionKit<D>) -> E2eResult<MemoryUsage> {
    let value = kit
        .run(BrowserStep::Evaluate {
            script: MEMORY_USAGE.to_string(),
        })
        .await?;
    serde_json::from_value(value).map_err(|e| E2eError::Decode {
        operation: "memory usage".to_string(),
        reason: e.to_string(),
    })
}

/// Click `trigger` and save the download into `save_dir`; returns the file name
pub async fn download_file<D: Driver>(
    kit: &InteractionKit<D>,
    trigger: &Locator,
    save_dir: &Path,
) -> E2eResult<String> {
    let value = kit
        .run(BrowserStep::Download {
            selector: trigger.to_string(),
            save_dir: save_dir.to_string_lossy().into_owned(),
        })
        .await?;
    value
        .as_str()
        .map(String::from)
        .ok_or_else(|| E2eError::Bridge(format!("download via {} returned no file name", trigger)))
}

pub async fn upload_file<D: Driver>(
    kit: &InteractionKit<D>,
    input: &Locator,
    file: &Path,
) -> E2eResult<()> {
    kit.wait_for_state(input, WaitState::Attached, kit.timeouts().action)
        .await?;
    kit.run(BrowserStep::SetInputFiles {
        selector: input.to_string(),
        paths: vec![file.to_string_lossy().into_owned()],
    })
    .await?;
    Ok(())
}

// --- timing ---

/// Navigate and wait for network idle; returns the wall time taken
pub async fn measure_page_load_time<D: Driver>(
    kit: &InteractionKit<D>,
    url: &str,
) -> E2eResult<Duration> {
    let started = Instant::now();
    kit.navigate(url).await?;
    let elapsed = started.elapsed();
    debug!("{} loaded in {:?}", url, elapsed);
    Ok(elapsed)
}

pub async fn measure_action_time<F, Fut, T>(action: F) -> E2eResult<(T, Duration)>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let started = Instant::now();
    let value = action().await?;
    Ok((value, started.elapsed()))
}
