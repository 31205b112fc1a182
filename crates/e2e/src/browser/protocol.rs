//! Wire protocol between the Rust harness and the Playwright bridge
//!
//! Every line the harness writes is a [`Request`]; every line the bridge
//! writes back is a [`Reply`] carrying the same id. Selectors are plain
//! Playwright selector strings built by [`super::Locator`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single browser instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BrowserStep {
    /// Navigate to an absolute URL
    Navigate { url: String },

    WaitForLoadState { state: LoadState },

    /// Wait until the page URL matches a glob pattern
    WaitForUrl { pattern: String, timeout_ms: u64 },

    Title,

    Url,

    GoBack,

    Reload,

    /// Click an element
    Click {
        selector: String,
        #[serde(default)]
        button: MouseButton,
        #[serde(default = "default_click_count")]
        click_count: u32,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Replace an input's value
    Fill { selector: String, value: String },

    Clear { selector: String },

    /// Type text with keyboard simulation
    Type {
        selector: String,
        text: String,
        #[serde(default)]
        delay_ms: Option<u64>,
    },

    /// Press a key, on an element or the page
    Press {
        #[serde(default)]
        selector: Option<String>,
        key: String,
    },

    /// Wait for an element to reach a state
    Wait {
        selector: String,
        #[serde(default)]
        state: WaitState,
        timeout_ms: u64,
    },

    /// Web-first assertion on an element
    Expect {
        selector: String,
        expectation: Expectation,
        timeout_ms: u64,
    },

    /// Take a screenshot of the page or one element
    Screenshot {
        path: String,
        #[serde(default)]
        selector: Option<String>,
        #[serde(default)]
        full_page: bool,
    },

    Hover { selector: String },

    Focus { selector: String },

    /// Select an option from a dropdown
    Select { selector: String, value: String },

    Check { selector: String },

    Uncheck { selector: String },

    ScrollIntoView { selector: String },

    Count { selector: String },

    TextContent { selector: String },

    AllTextContents { selector: String },

    InputValue { selector: String },

    IsEnabled { selector: String },

    /// Returns `{x, y, width, height}` or null when not rendered
    BoundingBox { selector: String },

    /// Resolved CSS property of the first match, null when absent
    ComputedStyle { selector: String, property: String },

    SetViewport { width: u32, height: u32 },

    /// Current viewport, or null when the page has none
    Viewport,

    MouseMove {
        x: f64,
        y: f64,
        #[serde(default = "default_steps")]
        steps: u32,
    },

    MouseDown,

    MouseUp,

    /// Evaluate a JavaScript expression in the page
    Evaluate { script: String },

    /// Wait until a JavaScript expression is truthy
    WaitForFunction { script: String, timeout_ms: u64 },

    SetOffline { offline: bool },

    /// Delay every request matching `pattern`
    RouteDelay { pattern: String, delay_ms: u64 },

    /// Answer requests matching `pattern` with a canned response
    RouteFulfill {
        pattern: String,
        status: u16,
        content_type: String,
        body: String,
    },

    Unroute { pattern: String },

    /// Clear cookies, permissions, and web storage
    ClearStorage,

    SetInputFiles { selector: String, paths: Vec<String> },

    /// Click `selector`, save the resulting download into `save_dir`
    Download { selector: String, save_dir: String },

    /// Fixed pause (use sparingly)
    Sleep { ms: u64 },
}

fn default_click_count() -> u32 {
    1
}

fn default_steps() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    #[default]
    NetworkIdle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Condition checked by [`BrowserStep::Expect`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    Visible,
    Hidden,
    Enabled,
    Disabled,
    Text { text: String },
    ContainsText { text: String },
    Count { count: usize },
    Value { value: String },
}

/// Browser launch settings sent once when the bridge starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchOptions {
    pub browser: String,
    #[serde(default)]
    pub channel: Option<String>,
    pub headless: bool,
    /// Playwright device descriptor name
    #[serde(default)]
    pub device: Option<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub is_mobile: bool,
    pub action_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
}

/// One framed request
#[derive(Debug, Clone, Serialize)]
pub struct Request<'a> {
    pub id: u64,
    pub step: &'a BrowserStep,
}

/// One framed reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reply {
    pub id: u64,
    pub ok: bool,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl BrowserStep {
    /// Short label for logs
    pub fn label(&self) -> String {
        match self {
            BrowserStep::Navigate { url } => format!("navigate:{}", url),
            BrowserStep::Click { selector, .. } => format!("click:{}", selector),
            BrowserStep::Fill { selector, .. } => format!("fill:{}", selector),
            BrowserStep::Type { selector, .. } => format!("type:{}", selector),
            BrowserStep::Press { key, .. } => format!("press:{}", key),
            BrowserStep::Wait { selector, .. } => format!("wait:{}", selector),
            BrowserStep::Expect { selector, .. } => format!("expect:{}", selector),
            BrowserStep::Screenshot { path, .. } => format!("screenshot:{}", path),
            BrowserStep::Sleep { ms } => format!("sleep:{}ms", ms),
            other => serde_json::to_value(other)
                .ok()
                .and_then(|v| v.get("action").and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| "step".to_string()),
        }
    }
}
