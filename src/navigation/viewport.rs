//! Viewport Abstraction
//!
//! A viewport is the single surface that shows the address of the selected
//! step. It has a rich engine that must be started before use, and a coarse
//! "set the address directly" channel that works without the engine.
//!
//! [`SystemBrowser`] is the viewport used by the command-line tool: the
//! engine is the platform's URL opener.

use std::env;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::process::Command;

/// The display target driven by a [`Navigator`](super::Navigator).
///
/// Failures are reported as human-readable reasons; the navigator turns
/// them into typed errors.
#[async_trait]
pub trait Viewport: Send {
    /// Starts the rich engine.
    async fn initialize(&mut self) -> Result<(), String>;

    /// Navigates the started engine to `url`.
    async fn navigate(&mut self, url: &str) -> Result<(), String>;

    /// Sets the displayed address directly, bypassing the engine.
    fn set_address(&mut self, url: &str) -> Result<(), String>;
}

/// URL openers tried in order on this platform.
#[cfg(target_os = "macos")]
const OPENERS: &[&str] = &["open"];

#[cfg(target_os = "windows")]
const OPENERS: &[&str] = &["rundll32.exe"];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENERS: &[&str] = &["xdg-open", "sensible-browser", "x-www-browser"];

/// Arguments placed before the address for openers that need them. The
/// address always travels as its own argument and never through a shell.
fn opener_args(opener: &Path) -> &'static [&'static str] {
    let stem = opener
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if stem.eq_ignore_ascii_case("rundll32") {
        &["url.dll,FileProtocolHandler"]
    } else {
        &[]
    }
}

/// Opens addresses in the user's browser.
///
/// Initialization locates an opener on `PATH` (or uses an explicit
/// override). The address channel prints the address to standard output
/// so the user can open it by hand.
#[derive(Debug, Default)]
pub struct SystemBrowser {
    opener_override: Option<String>,
    opener: Option<PathBuf>,
    address: Option<String>,
}

impl SystemBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given program instead of searching for a platform opener.
    pub fn with_opener(mut self, opener: impl Into<String>) -> Self {
        self.opener_override = Some(opener.into());
        self
    }

    /// The opener found during initialization.
    pub fn opener(&self) -> Option<&Path> {
        self.opener.as_deref()
    }

    /// The last address set through the address channel.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn command(opener: &Path, url: &str) -> Command {
        let mut cmd = Command::new(opener);
        cmd.args(opener_args(opener)).arg(url);
        cmd
    }
}

/// Finds an executable named `program` on `PATH`, or checks it directly
/// when it already contains a path separator.
async fn locate(program: &str) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return is_file(direct).await.then(|| direct.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        let candidate = dir.join(program);
        if is_file(&candidate).await {
            return Some(candidate);
        }
    }
    None
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[async_trait]
impl Viewport for SystemBrowser {
    async fn initialize(&mut self) -> Result<(), String> {
        if self.opener.is_some() {
            return Ok(());
        }

        let candidates: Vec<String> = match &self.opener_override {
            Some(opener) => vec![opener.clone()],
            None => OPENERS.iter().map(|s| s.to_string()).collect(),
        };

        for candidate in &candidates {
            if let Some(path) = locate(candidate).await {
                info!("Using browser opener: {}", path.display());
                self.opener = Some(path);
                return Ok(());
            }
            debug!("Opener not found: {}", candidate);
        }

        warn!("No browser opener found (searched: {})", candidates.join(", "));
        Err(format!("no browser opener found among: {}", candidates.join(", ")))
    }

    async fn navigate(&mut self, url: &str) -> Result<(), String> {
        let opener = self
            .opener
            .as_deref()
            .ok_or_else(|| "browser opener not initialized".to_string())?;

        let status = Self::command(opener, url)
            .status()
            .await
            .map_err(|e| format!("failed to launch {}: {}", opener.display(), e))?;

        if !status.success() {
            return Err(format!("{} exited with {}", opener.display(), status));
        }

        self.address = Some(url.to_string());
        Ok(())
    }

    fn set_address(&mut self, url: &str) -> Result<(), String> {
        self.address = Some(url.to_string());
        println!("{}", url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_override_fails_initialization() {
        let mut browser = SystemBrowser::new().with_opener("/nonexistent/bin/opener");
        let result = browser.initialize().await;

        assert!(result.unwrap_err().contains("/nonexistent/bin/opener"));
        assert!(browser.opener().is_none());
    }

    #[tokio::test]
    async fn test_navigate_before_initialize_fails() {
        let mut browser = SystemBrowser::new();
        assert!(browser.navigate("https://example.com").await.is_err());
        assert!(browser.address().is_none());
    }

    #[test]
    fn test_set_address_records() {
        let mut browser = SystemBrowser::new();
        browser.set_address("https://example.com").unwrap();
        assert_eq!(browser.address(), Some("https://example.com"));
    }

    fn argv(cmd: &Command) -> Vec<String> {
        cmd.as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_rundll32_gets_address_as_plain_argument() {
        let url = "https://x.example/?a=1&calc|more";
        let cmd = SystemBrowser::command(Path::new("rundll32.exe"), url);

        assert_eq!(cmd.as_std().get_program(), std::ffi::OsStr::new("rundll32.exe"));
        assert_eq!(argv(&cmd), vec!["url.dll,FileProtocolHandler", url]);
    }

    #[test]
    fn test_other_openers_get_only_the_address() {
        let url = "https://x.example/?a=1&b=2";
        let cmd = SystemBrowser::command(Path::new("/usr/bin/xdg-open"), url);
        assert_eq!(argv(&cmd), vec![url]);
    }

    #[test]
    fn test_no_opener_goes_through_cmd() {
        for opener in OPENERS {
            assert!(!opener.to_ascii_lowercase().starts_with("cmd"));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_override_with_real_program() {
        let mut browser = SystemBrowser::new().with_opener("/bin/sh");
        browser.initialize().await.unwrap();
        assert_eq!(browser.opener(), Some(Path::new("/bin/sh")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_opener_reports_exit_status() {
        let mut browser = SystemBrowser::new().with_opener("false");
        browser.initialize().await.unwrap();

        let result = browser.navigate("https://example.com").await;
        assert!(result.unwrap_err().contains("exited with"));
        assert!(browser.address().is_none());
    }
}
