//! Locating and launching the Chromium instance that renders listing pages.

use anyhow::{Context, Result, anyhow};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::config::ScrapeConfig;
use crate::utils::constants::CHROME_USER_AGENT;

/// Env vars that point straight at a browser binary, checked in order
const BROWSER_PATH_VARS: [&str; 2] = ["JOBSCRAPE_CHROMIUM_PATH", "CHROMIUM_PATH"];

/// A running browser plus the task pumping its CDP connection
pub struct LaunchedBrowser {
    pub browser: Browser,
    pub handler: JoinHandle<()>,
    pub user_data_dir: PathBuf,
    /// Whether `user_data_dir` was created for this run and should be removed on close
    pub owns_user_data_dir: bool,
}

fn platform_candidates() -> &'static [&'static str] {
    if cfg!(target_os = "windows") {
        &[
            r"%PROGRAMFILES%\Google\Chrome\Application\chrome.exe",
            r"%PROGRAMFILES(X86)%\Google\Chrome\Application\chrome.exe",
            r"%LOCALAPPDATA%\Google\Chrome\Application\chrome.exe",
            r"%PROGRAMFILES%\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "~/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    }
}

/// Resolve `~/` and `%VAR%` in a candidate path. `None` when home is unknown.
fn resolve_candidate(raw: &str) -> Option<PathBuf> {
    if let Some(rest) = raw.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    if raw.contains('%') {
        return Some(PathBuf::from(expand_windows_env_vars(raw)));
    }
    Some(PathBuf::from(raw))
}

/// Replace `%VAR%` tokens with their values; unknown or unterminated tokens are kept verbatim.
fn expand_windows_env_vars(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(0) => {
                out.push('%');
                rest = &after[1..];
            }
            Some(end) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push('%');
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn lookup_on_path() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        return None;
    }
    ["chromium", "chromium-browser", "google-chrome", "chrome"]
        .iter()
        .find_map(|cmd| {
            let output = Command::new("which").arg(cmd).output().ok()?;
            if !output.status.success() {
                return None;
            }
            let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!found.is_empty()).then(|| PathBuf::from(found))
        })
}

/// Find an installed Chrome/Chromium: env override, then well-known paths, then `which`.
pub fn find_browser_executable() -> Result<PathBuf> {
    for var in BROWSER_PATH_VARS {
        if let Ok(value) = std::env::var(var) {
            let path = PathBuf::from(value);
            if path.exists() {
                info!("Using browser from {var}: {}", path.display());
                return Ok(path);
            }
            warn!("{var} points to a missing file: {}", path.display());
        }
    }

    if let Some(path) = platform_candidates()
        .iter()
        .filter_map(|raw| resolve_candidate(raw))
        .find(|path| path.exists())
    {
        info!("Found browser at: {}", path.display());
        return Ok(path);
    }

    if let Some(path) = lookup_on_path() {
        info!("Found browser on PATH: {}", path.display());
        return Ok(path);
    }

    Err(anyhow!("Chrome/Chromium executable not found"))
}

/// Download a Chromium build into the user cache dir and return its executable.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "No user cache directory, downloading browser under {}",
                fallback.display()
            );
            fallback
        })
        .join("jobscrape")
        .join("chromium");

    tokio::fs::create_dir_all(&cache_dir)
        .await
        .with_context(|| format!("Failed to create {}", cache_dir.display()))?;

    info!("Downloading managed Chromium into {}", cache_dir.display());
    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision = fetcher.fetch().await.context("Failed to fetch browser")?;
    info!("Downloaded Chromium to {}", revision.folder_path.display());

    Ok(revision.executable_path)
}

/// Launch a browser configured for listing scrapes.
///
/// Uses the configured profile dir when given, otherwise a per-process temp
/// dir that the caller removes on close.
#[instrument(skip(config), fields(headless = config.headless()))]
pub async fn launch_browser(config: &ScrapeConfig) -> Result<LaunchedBrowser> {
    let executable = match find_browser_executable() {
        Ok(path) => path,
        Err(e) => {
            warn!("{e}; falling back to a managed download");
            download_managed_browser().await?
        }
    };

    let (user_data_dir, owns_user_data_dir) = match config.chrome_data_dir() {
        Some(dir) => (dir.clone(), false),
        None => (
            std::env::temp_dir().join(format!("jobscrape_chrome_{}", std::process::id())),
            true,
        ),
    };
    tokio::fs::create_dir_all(&user_data_dir)
        .await
        .context("Failed to create user data directory")?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(config.page_load_timeout_secs()))
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(executable);

    builder = if config.headless() {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    let browser_config = builder
        .arg(format!("--user-agent={CHROME_USER_AGENT}"))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--disable-extensions")
        .arg("--disable-popup-blocking")
        .arg("--disable-background-timer-throttling")
        .arg("--disable-backgrounding-occluded-windows")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--mute-audio")
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {e}"))?;

    debug!("Launching browser with config: {browser_config:?}");
    let (browser, mut events) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler = task::spawn(async move {
        while let Some(event) = events.next().await {
            let Err(e) = event else { continue };
            let message = e.to_string();
            // chromiumoxide does not know every CDP event Chrome emits
            if message.contains("data did not match any variant of untagged enum Message")
                || message.contains("Failed to deserialize WS response")
            {
                trace!("Ignoring unknown CDP message: {message}");
            } else {
                error!("Browser handler error: {e:?}");
            }
        }
        debug!("Browser handler task completed");
    });

    Ok(LaunchedBrowser {
        browser,
        handler,
        user_data_dir,
        owns_user_data_dir,
    })
}
