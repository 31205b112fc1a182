//! Shared interaction vocabulary for page objects
//!
//! Page objects hold an `Arc<InteractionKit<D>>` and compose its verbs
//! instead of inheriting from a base page. The kit serializes steps
//! through one driver and remembers the current viewport.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::driver::Driver;
use super::protocol::{BrowserStep, Expectation, LoadState, MouseButton, WaitState};
use crate::config::Timeouts;
use crate::error::{E2eError, E2eResult};

/// Default wait for an element to become visible
pub const ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);
/// Probe used by visibility checks that must not fail
pub const VISIBILITY_PROBE: Duration = Duration::from_secs(5);

/// A Playwright selector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// `[data-testid="<id>"]`
    pub fn test_id(id: &str) -> Self {
        Self(format!("[data-testid=\"{}\"]", id))
    }

    /// Elements matching this locator that contain `text`
    pub fn has_text(&self, text: &str) -> Self {
        Self(format!("{}:has-text(\"{}\")", self.0, text.replace('"', "\\\"")))
    }

    /// `inner` scoped to elements matching this locator
    pub fn within(&self, inner: &Locator) -> Self {
        Self(format!("{} >> {}", self.0, inner.0))
    }

    pub fn first(&self) -> Self {
        self.nth(0)
    }

    pub fn nth(&self, index: usize) -> Self {
        Self(format!("{} >> nth={}", self.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn device_class(&self) -> DeviceClass {
        DeviceClass::from_width(self.width)
    }
}

/// Layout bucket derived from viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    /// Mobile below 768, tablet below 1024, desktop otherwise
    pub fn from_width(width: u32) -> Self {
        match width {
            0..=767 => DeviceClass::Mobile,
            768..=1023 => DeviceClass::Tablet,
            _ => DeviceClass::Desktop,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Desktop => "desktop",
        }
    }
}

/// Rendered element geometry in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Browser capability shared by every page object
pub struct InteractionKit<D: Driver> {
    driver: Mutex<D>,
    viewport: RwLock<Option<Viewport>>,
    base_url: String,
    screenshot_dir: PathBuf,
    timeouts: Timeouts,
}

impl<D: Driver> InteractionKit<D> {
    pub fn new(driver: D, base_url: impl Into<String>) -> Self {
        Self {
            driver: Mutex::new(driver),
            viewport: RwLock::new(None),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_viewport(self, viewport: Option<Viewport>) -> Self {
        *self.viewport.write() = viewport;
        self
    }

    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a path against the base URL; absolute URLs pass through
    pub fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    /// Run one step through the driver
    pub async fn run(&self, step: BrowserStep) -> E2eResult<Value> {
        let mut driver = self.driver.lock().await;
        driver.execute(step).await
    }

    /// Close the underlying browser
    pub async fn close(&self) -> E2eResult<()> {
        self.driver.lock().await.close().await
    }

    // --- navigation ---

    pub async fn navigate(&self, url: &str) -> E2eResult<()> {
        self.run(BrowserStep::Navigate {
            url: self.absolute_url(url),
        })
        .await?;
        self.wait_for_page_load().await
    }

    pub async fn wait_for_page_load(&self) -> E2eResult<()> {
        self.wait_for_load_state(LoadState::NetworkIdle).await
    }

    pub async fn wait_for_load_state(&self, state: LoadState) -> E2eResult<()> {
        self.run(BrowserStep::WaitForLoadState { state }).await?;
        Ok(())
    }

    pub async fn title(&self) -> E2eResult<String> {
        Ok(as_string(self.run(BrowserStep::Title).await?))
    }

    pub async fn current_url(&self) -> E2eResult<String> {
        Ok(as_string(self.run(BrowserStep::Url).await?))
    }

    /// Wait until the URL matches a glob such as `**/pumps`
    pub async fn wait_for_url(&self, pattern: &str) -> E2eResult<()> {
        self.run(BrowserStep::WaitForUrl {
            pattern: pattern.to_string(),
            timeout_ms: millis(self.timeouts.navigation),
        })
        .await?;
        Ok(())
    }

    pub async fn go_back(&self) -> E2eResult<()> {
        self.run(BrowserStep::GoBack).await?;
        Ok(())
    }

    pub async fn reload(&self) -> E2eResult<()> {
        self.run(BrowserStep::Reload).await?;
        Ok(())
    }

    /// Full-page screenshot at `<screenshot_dir>/<name>.png`
    pub async fn take_screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        let path = self.screenshot_dir.join(format!("{}.png", name));
        self.run(BrowserStep::Screenshot {
            path: path.to_string_lossy().into_owned(),
            selector: None,
            full_page: true,
        })
        .await?;
        Ok(path)
    }

    // --- element interaction ---

    pub async fn wait_for_element(&self, locator: &Locator) -> E2eResult<()> {
        self.wait_for_state(locator, WaitState::Visible, ELEMENT_TIMEOUT).await
    }

    pub async fn wait_for_state(
        &self,
        locator: &Locator,
        state: WaitState,
        timeout: Duration,
    ) -> E2eResult<()> {
        self.run(BrowserStep::Wait {
            selector: locator.to_string(),
            state,
            timeout_ms: millis(timeout),
        })
        .await?;
        Ok(())
    }

    pub async fn click_element(&self, locator: &Locator) -> E2eResult<()> {
        self.wait_for_element(locator).await?;
        self.click_with(locator, MouseButton::Left, 1).await
    }

    pub async fn click_with(
        &self,
        locator: &Locator,
        button: MouseButton,
        click_count: u32,
    ) -> E2eResult<()> {
        self.run(BrowserStep::Click {
            selector: locator.to_string(),
            button,
            click_count,
            timeout_ms: None,
        })
        .await?;
        Ok(())
    }

    /// Wait, clear, then fill
    pub async fn fill_input(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.wait_for_element(locator).await?;
        self.run(BrowserStep::Clear {
            selector: locator.to_string(),
        })
        .await?;
        self.run(BrowserStep::Fill {
            selector: locator.to_string(),
            value: value.to_string(),
        })
        .await?;
        Ok(())
    }

    pub async fn type_text(&self, locator: &Locator, text: &str, delay: Duration) -> E2eResult<()> {
        self.run(BrowserStep::Type {
            selector: locator.to_string(),
            text: text.to_string(),
            delay_ms: Some(millis(delay)),
        })
        .await?;
        Ok(())
    }

    pub async fn select_dropdown_option(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.wait_for_element(locator).await?;
        self.run(BrowserStep::Select {
            selector: locator.to_string(),
            value: value.to_string(),
        })
        .await?;
        Ok(())
    }

    /// Visible text of an element; empty when it has none
    pub async fn get_text(&self, locator: &Locator) -> E2eResult<String> {
        self.wait_for_element(locator).await?;
        let text = self
            .run(BrowserStep::TextContent {
                selector: locator.to_string(),
            })
            .await?;
        Ok(as_string(text))
    }

    pub async fn all_texts(&self, locator: &Locator) -> E2eResult<Vec<String>> {
        let value = self
            .run(BrowserStep::AllTextContents {
                selector: locator.to_string(),
            })
            .await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|e| E2eError::Decode {
            operation: "all text contents".to_string(),
            reason: e.to_string(),
        })
    }

    pub async fn input_value(&self, locator: &Locator) -> E2eResult<String> {
        let value = self
            .run(BrowserStep::InputValue {
                selector: locator.to_string(),
            })
            .await?;
        Ok(as_string(value))
    }

    /// True when the element becomes visible within the probe window; never fails
    pub async fn is_element_visible(&self, locator: &Locator) -> bool {
        match self
            .wait_for_state(locator, WaitState::Visible, VISIBILITY_PROBE)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                debug!("{} not visible: {}", locator, e);
                false
            }
        }
    }

    pub async fn is_element_enabled(&self, locator: &Locator) -> E2eResult<bool> {
        let value = self
            .run(BrowserStep::IsEnabled {
                selector: locator.to_string(),
            })
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let value = self
            .run(BrowserStep::Count {
                selector: locator.to_string(),
            })
            .await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    pub async fn bounding_box(&self, locator: &Locator) -> E2eResult<Option<BoundingBox>> {
        let value = self
            .run(BrowserStep::BoundingBox {
                selector: locator.to_string(),
            })
            .await?;
        Ok(serde_json::from_value(value).ok())
    }

    pub async fn computed_style(&self, locator: &Locator, property: &str) -> E2eResult<Option<String>> {
        let value = self
            .run(BrowserStep::ComputedStyle {
                selector: locator.to_string(),
                property: property.to_string(),
            })
            .await?;
        Ok(value.as_str().map(String::from))
    }

    pub async fn scroll_to_element(&self, locator: &Locator) -> E2eResult<()> {
        self.run(BrowserStep::ScrollIntoView {
            selector: locator.to_string(),
        })
        .await?;
        Ok(())
    }

    pub async fn hover(&self, locator: &Locator) -> E2eResult<()> {
        self.run(BrowserStep::Hover {
            selector: locator.to_string(),
        })
        .await?;
        Ok(())
    }

    /// Press a key on the focused element
    pub async fn press_key(&self, key: &str) -> E2eResult<()> {
        self.run(BrowserStep::Press {
            selector: None,
            key: key.to_string(),
        })
        .await?;
        Ok(())
    }

    // --- verification ---

    pub async fn expect(&self, locator: &Locator, expectation: Expectation) -> E2eResult<()> {
        self.run(BrowserStep::Expect {
            selector: locator.to_string(),
            expectation,
            timeout_ms: millis(self.timeouts.expect),
        })
        .await
        .map_err(|e| E2eError::AssertionFailed(format!("{}: {}", locator, e)))?;
        Ok(())
    }

    pub async fn verify_element_text(&self, locator: &Locator, text: &str) -> E2eResult<()> {
        self.expect(
            locator,
            Expectation::Text {
                text: text.to_string(),
            },
        )
        .await
    }

    pub async fn verify_element_contains_text(&self, locator: &Locator, text: &str) -> E2eResult<()> {
        self.expect(
            locator,
            Expectation::ContainsText {
                text: text.to_string(),
            },
        )
        .await
    }

    pub async fn verify_element_visible(&self, locator: &Locator) -> E2eResult<()> {
        self.expect(locator, Expectation::Visible).await
    }

    pub async fn verify_element_hidden(&self, locator: &Locator) -> E2eResult<()> {
        self.expect(locator, Expectation::Hidden).await
    }

    pub async fn verify_element_enabled(&self, locator: &Locator) -> E2eResult<()> {
        self.expect(locator, Expectation::Enabled).await
    }

    pub async fn verify_element_disabled(&self, locator: &Locator) -> E2eResult<()> {
        self.expect(locator, Expectation::Disabled).await
    }

    pub async fn verify_element_count(&self, locator: &Locator, count: usize) -> E2eResult<()> {
        self.expect(locator, Expectation::Count { count }).await
    }

    pub async fn verify_input_value(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.expect(
            locator,
            Expectation::Value {
                value: value.to_string(),
            },
        )
        .await
    }

    // --- viewport and gestures ---

    /// Last known viewport
    pub fn viewport(&self) -> Option<Viewport> {
        *self.viewport.read()
    }

    pub async fn set_viewport(&self, viewport: Viewport) -> E2eResult<()> {
        self.run(BrowserStep::SetViewport {
            width: viewport.width,
            height: viewport.height,
        })
        .await?;
        *self.viewport.write() = Some(viewport);
        Ok(())
    }

    /// Ask the browser for its viewport and remember it
    pub async fn refresh_viewport(&self) -> E2eResult<Option<Viewport>> {
        let value = self.run(BrowserStep::Viewport).await?;
        let viewport: Option<Viewport> = serde_json::from_value(value).ok();
        *self.viewport.write() = viewport;
        Ok(viewport)
    }

    pub fn device_class(&self) -> Option<DeviceClass> {
        self.viewport().map(|v| v.device_class())
    }

    pub fn is_mobile(&self) -> bool {
        self.device_class() == Some(DeviceClass::Mobile)
    }

    pub fn is_tablet(&self) -> bool {
        self.device_class() == Some(DeviceClass::Tablet)
    }

    pub fn is_desktop(&self) -> bool {
        self.device_class() == Some(DeviceClass::Desktop)
    }

    pub async fn mouse_move(&self, x: f64, y: f64, steps: u32) -> E2eResult<()> {
        self.run(BrowserStep::MouseMove { x, y, steps }).await?;
        Ok(())
    }

    async fn drag_horizontally(&self, from: f64, to: f64) -> E2eResult<()> {
        let Some(viewport) = self.viewport() else {
            return Ok(());
        };
        let (width, y) = (f64::from(viewport.width), f64::from(viewport.height) * 0.5);
        self.mouse_move(width * from, y, 1).await?;
        self.run(BrowserStep::MouseDown).await?;
        self.mouse_move(width * to, y, 1).await?;
        self.run(BrowserStep::MouseUp).await?;
        Ok(())
    }

    /// Drag from 80% to 20% of the viewport width
    pub async fn swipe_left(&self) -> E2eResult<()> {
        self.drag_horizontally(0.8, 0.2).await
    }

    /// Drag from 20% to 80% of the viewport width
    pub async fn swipe_right(&self) -> E2eResult<()> {
        self.drag_horizontally(0.2, 0.8).await
    }

    /// Dispatch a ctrl+wheel event; scale above 1 zooms in
    pub async fn pinch_zoom(&self, scale: f64) -> E2eResult<()> {
        let delta = if scale > 1.0 { -100 } else { 100 };
        let script = format!(
            "document.dispatchEvent(new WheelEvent('wheel', {{ deltaY: {}, ctrlKey: true }}))",
            delta
        );
        self.run(BrowserStep::Evaluate { script }).await?;
        Ok(())
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

fn as_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
