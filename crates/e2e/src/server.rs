//! Application server management - starting, reusing and health checking the UI

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};

const HEALTH_POLL: Duration = Duration::from_millis(250);

/// How to bring up the application under test
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Shell command that starts the app
    pub command: String,

    /// Directory the command runs in (None = current directory)
    pub working_dir: Option<PathBuf>,

    /// URL polled until it answers
    pub base_url: String,

    /// Timeout for server startup
    pub startup_timeout: Duration,

    /// Use a server that is already answering instead of starting one
    pub reuse_existing: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: "npm run start".to_string(),
            working_dir: None,
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            startup_timeout: Duration::from_secs(120),
            reuse_existing: true,
        }
    }
}

impl ServerConfig {
    /// `None` under CI, where the pipeline provides the app
    pub fn from_suite(suite: &SuiteConfig) -> Option<Self> {
        if suite.ci {
            return None;
        }
        Some(Self {
            base_url: suite.base_url.clone(),
            ..Self::default()
        })
    }

    /// Port the app is expected to listen on, from `base_url`
    pub fn port(&self) -> E2eResult<u16> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| E2eError::Config(format!("invalid base URL {}: {}", self.base_url, e)))?;
        url.port_or_known_default()
            .ok_or_else(|| E2eError::Config(format!("no port in base URL {}", self.base_url)))
    }
}

/// A running application, either started here or found already up
pub struct AppServer {
    child: Option<Child>,
    base_url: String,
}

impl AppServer {
    /// Reuse a live server when allowed, otherwise spawn one and wait for it
    pub async fn start(config: ServerConfig) -> E2eResult<Self> {
        let client = health_client()?;

        if config.reuse_existing && is_answering(&client, &config.base_url).await {
            info!("Reusing server already running at {}", config.base_url);
            return Ok(Self {
                child: None,
                base_url: config.base_url,
            });
        }

        let port = config.port()?;
        info!("Starting `{}` on port {}", config.command, port);

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&config.command)
            .env("PORT", port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn().map_err(|e| {
            E2eError::ServerStartup(format!("failed to spawn `{}`: {}", config.command, e))
        })?;

        // Dropping on failure stops the child
        let mut server = Self {
            child: Some(child),
            base_url: config.base_url,
        };
        server.wait_for_healthy(&client, config.startup_timeout).await?;

        info!("Server is healthy at {}", server.base_url);
        Ok(server)
    }

    async fn wait_for_healthy(
        &mut self,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> E2eResult<()> {
        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;

            if let Some(child) = self.child.as_mut() {
                if let Some(status) = child.try_wait()? {
                    return Err(E2eError::ServerStartup(format!(
                        "server exited early with {}",
                        status
                    )));
                }
            }

            if is_answering(client, &self.base_url).await {
                return Ok(());
            }
            if attempts == 1 {
                info!("Waiting for server to start...");
            }
            sleep(HEALTH_POLL).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when this handle owns the process
    pub fn is_managed(&self) -> bool {
        self.child.is_some()
    }

    /// SIGTERM, a short grace period, then kill; reused servers are left alone
    pub fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        info!("Stopping server (pid: {})", child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            // `sh -c` may fork; the child leads its own process group
            let pid = Pid::from_raw(child.id() as i32);
            if killpg(pid, Signal::SIGTERM)
                .or_else(|_| nix::sys::signal::kill(pid, Signal::SIGTERM))
                .is_ok()
            {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        if let Err(e) = child.kill() {
            debug!("Server already exited: {}", e);
        }
        child.wait()?;
        Ok(())
    }
}

impl Drop for AppServer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop server: {}", e);
        }
    }
}

fn health_client() -> E2eResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?)
}

/// Any HTTP response counts; connection errors do not
async fn is_answering(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(resp) => {
            debug!("{} answered {}", url, resp.status());
            true
        }
        Err(e) => {
            if !e.is_connect() {
                warn!("Health check error: {}", e);
            }
            false
        }
    }
}
