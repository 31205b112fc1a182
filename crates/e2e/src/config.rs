//! Suite configuration
//!
//! Everything is read from the process environment after loading an
//! optional `.env` file. Tests build configs through [`SuiteConfig::from_lookup`]
//! so they never touch the real environment.

use std::path::PathBuf;
use std::time::Duration;

use pumpmaster_common::{Credentials, TestEnvironment};
use tracing::debug;

use crate::browser::playwright::Browser;
use crate::browser::Viewport;
use crate::error::{E2eError, E2eResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

/// Top-level configuration for one test run
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Root of the web UI
    pub base_url: String,

    /// Root of the REST API
    pub api_base_url: String,

    /// Credentials for UI login flows (`TEST_USERNAME`/`TEST_PASSWORD`)
    pub ui_credentials: Credentials,

    /// Credentials for API tests (`API_USERNAME`/`API_PASSWORD`)
    pub api_credentials: Credentials,

    /// Pump engineer role
    pub engineer_credentials: Credentials,

    /// System administrator role
    pub admin_credentials: Credentials,

    /// Running under CI
    pub ci: bool,

    /// Launch browsers without a window
    pub headless: bool,

    /// Deployment being tested
    pub environment: TestEnvironment,

    /// Browser and viewport to emulate
    pub device: DeviceProfile,

    pub timeouts: Timeouts,

    /// Retries granted to flaky browser tests
    pub retries: u32,

    /// Where screenshots are written
    pub screenshot_dir: PathBuf,

    /// Where downloads are saved
    pub download_dir: PathBuf,
}

/// Per-operation time limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub test: Duration,
    pub expect: Duration,
    pub action: Duration,
    pub navigation: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            test: Duration::from_secs(30),
            expect: Duration::from_secs(5),
            action: Duration::from_secs(10),
            navigation: Duration::from_secs(30),
        }
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ui_credentials: Credentials::new("testuser@pumpmaster.com", "Test@123"),
            api_credentials: Credentials::new("test@pumpmaster.com", "Test@123"),
            engineer_credentials: Credentials::new("engineer@pumpmaster.com", "Engineer@123"),
            admin_credentials: Credentials::new("admin@pumpmaster.com", "Admin@123"),
            ci: false,
            headless: true,
            environment: TestEnvironment::Dev,
            device: DeviceProfile::desktop_chrome(),
            timeouts: Timeouts::default(),
            retries: 0,
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            download_dir: PathBuf::from("downloads"),
        }
    }
}

impl SuiteConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> E2eResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> E2eResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let ci = var("CI").map(|v| is_truthy(&v)).unwrap_or(false);
        let headless = var("HEADLESS").map(|v| is_truthy(&v)).unwrap_or(true);

        let environment = match var("TEST_ENV") {
            Some(env) => env.parse()?,
            None => TestEnvironment::Dev,
        };

        let mut device = match var("DEVICE") {
            Some(name) => DeviceProfile::by_name(&name)
                .ok_or_else(|| E2eError::Config(format!("unknown device profile: {}", name)))?,
            None => DeviceProfile::desktop_chrome(),
        };
        if let Some(browser) = var("BROWSER") {
            device.browser = Browser::from_name(&browser)
                .ok_or_else(|| E2eError::Config(format!("unknown browser: {}", browser)))?;
        }

        let credentials = |user_key: &str, pass_key: &str, fallback: &Credentials| {
            Credentials::new(
                var(user_key).unwrap_or_else(|| fallback.username.clone()),
                var(pass_key).unwrap_or_else(|| fallback.password.clone()),
            )
        };

        Ok(Self {
            base_url: trim_slash(var("BASE_URL").unwrap_or(defaults.base_url.clone())),
            api_base_url: trim_slash(
                var("API_BASE_URL").unwrap_or(defaults.api_base_url.clone()),
            ),
            ui_credentials: credentials("TEST_USERNAME", "TEST_PASSWORD", &defaults.ui_credentials),
            api_credentials: credentials("API_USERNAME", "API_PASSWORD", &defaults.api_credentials),
            engineer_credentials: credentials(
                "ENGINEER_USERNAME",
                "ENGINEER_PASSWORD",
                &defaults.engineer_credentials,
            ),
            admin_credentials: credentials(
                "ADMIN_USERNAME",
                "ADMIN_PASSWORD",
                &defaults.admin_credentials,
            ),
            ci,
            headless,
            environment,
            device,
            timeouts: Timeouts::default(),
            retries: if ci { 2 } else { 0 },
            screenshot_dir: var("SCREENSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.screenshot_dir),
            download_dir: var("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
        })
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// A named browser/viewport combination
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub browser: Browser,
    /// Browser channel, e.g. `msedge`
    pub channel: Option<&'static str>,
    /// Playwright device descriptor to emulate, if any
    pub descriptor: Option<&'static str>,
    /// Viewport used when no descriptor is available
    pub viewport: Viewport,
    pub is_mobile: bool,
}

impl DeviceProfile {
    const fn desktop(name: &'static str, browser: Browser, channel: Option<&'static str>) -> Self {
        Self {
            name,
            browser,
            channel,
            descriptor: None,
            viewport: Viewport::new(1920, 1080),
            is_mobile: false,
        }
    }

    const fn emulated(
        name: &'static str,
        browser: Browser,
        descriptor: &'static str,
        viewport: Viewport,
        is_mobile: bool,
    ) -> Self {
        Self {
            name,
            browser,
            channel: None,
            descriptor: Some(descriptor),
            viewport,
            is_mobile,
        }
    }

    pub fn desktop_chrome() -> Self {
        Self::desktop("chromium", Browser::Chromium, None)
    }

    /// Every project the suite knows how to run
    pub fn all() -> Vec<Self> {
        vec![
            Self::desktop_chrome(),
            Self::desktop("firefox", Browser::Firefox, None),
            Self::desktop("webkit", Browser::Webkit, None),
            Self::desktop("edge", Browser::Chromium, Some("msedge")),
            Self::emulated("Mobile Chrome", Browser::Chromium, "Pixel 5", Viewport::new(393, 851), true),
            Self::emulated("Mobile Safari", Browser::Webkit, "iPhone 12", Viewport::new(390, 844), true),
            Self::emulated("Mobile Edge", Browser::Chromium, "Galaxy S21", Viewport::new(360, 800), true),
            Self::emulated("iPad", Browser::Webkit, "iPad Pro", Viewport::new(1024, 1366), true),
            Self::emulated("iPad Mini", Browser::Webkit, "iPad Mini", Viewport::new(768, 1024), true),
        ]
    }

    /// Look a profile up by project name or device descriptor
    pub fn by_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|p| {
            p.name.eq_ignore_ascii_case(name)
                || p.descriptor.is_some_and(|d| d.eq_ignore_ascii_case(name))
        })
    }
}
