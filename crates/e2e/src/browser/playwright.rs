//! Playwright browser automation
//!
//! A [`PlaywrightSession`] keeps one `node` process alive for the whole
//! test. The process runs the bundled bridge script, launches the browser
//! once, and then executes [`BrowserStep`]s sent over stdin so page state
//! survives between steps.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command as TokioCommand};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::driver::Driver;
use super::kit::Viewport;
use super::protocol::{BrowserStep, LaunchOptions, Reply, Request};
use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};

const BRIDGE_SCRIPT: &str = include_str!("../../assets/bridge.js");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Some(Browser::Chromium),
            "firefox" => Some(Browser::Firefox),
            "webkit" | "safari" => Some(Browser::Webkit),
            _ => None,
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub channel: Option<String>,
    pub headless: bool,
    pub device: Option<String>,
    pub viewport: Viewport,
    pub is_mobile: bool,
    pub action_timeout: Duration,
    pub navigation_timeout: Duration,
    /// Upper bound on waiting for any single reply
    pub reply_timeout: Duration,
    /// Directory holding `node_modules/playwright`
    pub project_dir: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            channel: None,
            headless: true,
            device: None,
            viewport: Viewport::new(1920, 1080),
            is_mobile: false,
            action_timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(30),
            reply_timeout: Duration::from_secs(90),
            project_dir: PathBuf::from("."),
        }
    }
}

impl PlaywrightConfig {
    pub fn from_suite(config: &SuiteConfig) -> Self {
        let device = &config.device;
        Self {
            browser: device.browser,
            channel: device.channel.map(String::from),
            headless: config.headless,
            device: device.descriptor.map(String::from),
            viewport: device.viewport,
            is_mobile: device.is_mobile,
            action_timeout: config.timeouts.action,
            navigation_timeout: config.timeouts.navigation,
            ..Self::default()
        }
    }

    fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            browser: self.browser.as_str().to_string(),
            channel: self.channel.clone(),
            headless: self.headless,
            device: self.device.clone(),
            viewport_width: self.viewport.width,
            viewport_height: self.viewport.height,
            is_mobile: self.is_mobile,
            action_timeout_ms: self.action_timeout.as_millis() as u64,
            navigation_timeout_ms: self.navigation_timeout.as_millis() as u64,
        }
    }
}

/// A live browser driven through the bridge process
pub struct PlaywrightSession {
    child: Child,
    stdin: Option<ChildStdin>,
    replies: mpsc::Receiver<Reply>,
    next_id: u64,
    reply_timeout: Duration,
    viewport: Option<Viewport>,
    _script_dir: tempfile::TempDir,
}

impl PlaywrightSession {
    /// Start node, launch the browser, and wait until the page is ready
    pub async fn launch(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        debug!("Starting Playwright bridge: {}", script_path.display());

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(&config.project_dir)
            .env("NODE_PATH", node_path(&config.project_dir))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stderr unavailable".to_string()))?;

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match serde_json::from_str::<Reply>(&line) {
                    Ok(reply) => {
                        if tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                    Err(_) => debug!("[bridge] {}", line),
                }
            }
        });
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!("[bridge] {}", line);
            }
        });

        let mut session = Self {
            child,
            stdin: Some(stdin),
            replies: rx,
            next_id: 0,
            reply_timeout: config.reply_timeout,
            viewport: None,
            _script_dir: script_dir,
        };

        let launch = serde_json::json!({ "id": 0, "launch": config.launch_options() });
        session.write_line(&launch.to_string()).await?;
        let ready = session.await_reply(0).await?;
        session.viewport = ready
            .get("viewport")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok());

        info!(
            "Playwright {} ready (viewport {:?})",
            config.browser.as_str(),
            session.viewport
        );
        Ok(session)
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Viewport reported by the browser at launch
    pub fn initial_viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    async fn write_line(&mut self, line: &str) -> E2eResult<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| E2eError::Bridge("session already closed".to_string()))?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn await_reply(&mut self, id: u64) -> E2eResult<Value> {
        let deadline = tokio::time::Instant::now() + self.reply_timeout;
        loop {
            let reply = tokio::time::timeout_at(deadline, self.replies.recv())
                .await
                .map_err(|_| E2eError::Timeout(format!("bridge reply {}", id)))?
                .ok_or_else(|| E2eError::Bridge("bridge exited".to_string()))?;

            if reply.id != id {
                warn!("Discarding stale bridge reply {} (waiting for {})", reply.id, id);
                continue;
            }
            return if reply.ok {
                Ok(reply.value)
            } else {
                Err(E2eError::Playwright(
                    reply.error.unwrap_or_else(|| "unknown bridge error".to_string()),
                ))
            };
        }
    }
}

#[async_trait]
impl Driver for PlaywrightSession {
    async fn execute(&mut self, step: BrowserStep) -> E2eResult<Value> {
        self.next_id += 1;
        let id = self.next_id;
        debug!("Executing step {}: {}", id, step.label());

        let line = serde_json::to_string(&Request { id, step: &step })?;
        self.write_line(&line).await?;
        self.await_reply(id).await.map_err(|e| match e {
            E2eError::Playwright(reason) => E2eError::StepFailed {
                step: step.label(),
                reason,
            },
            other => other,
        })
    }

    async fn close(&mut self) -> E2eResult<()> {
        // EOF on stdin tells the bridge to close the browser and exit
        if self.stdin.take().is_none() {
            return Ok(());
        }
        match tokio::time::timeout(Duration::from_secs(10), self.child.wait()).await {
            Ok(status) => {
                debug!("Playwright bridge exited: {:?}", status?);
            }
            Err(_) => {
                warn!("Playwright bridge did not exit, killing it");
                self.child.kill().await?;
            }
        }
        Ok(())
    }
}

fn node_path(project_dir: &Path) -> String {
    let modules = project_dir.join("node_modules");
    match std::env::var("NODE_PATH") {
        Ok(existing) if !existing.is_empty() => {
            format!("{}:{}", modules.display(), existing)
        }
        _ => modules.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceProfile;

    #[test]
    fn test_browser_names() {
        assert_eq!(Browser::from_name("Safari"), Some(Browser::Webkit));
        assert_eq!(Browser::from_name("firefox"), Some(Browser::Firefox));
        assert_eq!(Browser::from_name("lynx"), None);
    }

    #[test]
    fn test_launch_options_from_suite() {
        let suite = SuiteConfig {
            device: DeviceProfile::by_name("Mobile Safari").unwrap(),
            ..SuiteConfig::default()
        };
        let options = PlaywrightConfig::from_suite(&suite).launch_options();
        assert_eq!(options.browser, "webkit");
        assert_eq!(options.device.as_deref(), Some("iPhone 12"));
        assert!(options.is_mobile);
        assert_eq!(options.action_timeout_ms, 10_000);
        assert_eq!(options.navigation_timeout_ms, 30_000);
    }

    #[test]
    fn test_bridge_script_handles_every_action() {
        for action in [
            "navigate",
            "wait_for_load_state",
            "click",
            "expect",
            "bounding_box",
            "computed_style",
            "route_delay",
            "route_fulfill",
            "clear_storage",
            "download",
        ] {
            assert!(
                BRIDGE_SCRIPT.contains(&format!("case '{}'", action)),
                "bridge is missing {}",
                action
            );
        }
    }

    #[test]
    fn test_node_path_includes_project_modules() {
        let path = node_path(Path::new("/work/app"));
        assert!(path.starts_with("/work/app/node_modules"));
    }
}
