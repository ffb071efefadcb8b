//! Application Paths and Settings
//!
//! # Data Directory Resolution
//!
//! The data directory is resolved once, in the following order:
//! 1. `WAYMARK_HOME` environment variable
//! 2. `.waymark` under the user's home (`HOME`, then `USERPROFILE`)
//! 3. `.waymark` in the current directory
//!
//! It holds the default workflow file and the error log, and is created
//! only when one of them is first written.

use std::env;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use log::{debug, warn};
use once_cell::sync::Lazy;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "WAYMARK_HOME";

/// Environment variable naming the program used to open addresses.
pub const BROWSER_ENV: &str = "BROWSER";

/// File name of the default workflow collection.
pub const WORKFLOW_FILE_NAME: &str = "workflows.json";

/// File name of the error log.
pub const LOG_FILE_NAME: &str = "log.txt";

/// Lazily-resolved data directory.
pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    let dir = resolve_data_dir(
        env::var_os(HOME_ENV),
        env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")),
    );
    debug!("Using data directory: {}", dir.display());
    dir
});

/// Picks the data directory from an explicit override or a home directory.
fn resolve_data_dir(override_dir: Option<OsString>, home: Option<OsString>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    home.filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".waymark")
}

/// Default location of the workflow collection.
pub fn default_workflow_file() -> PathBuf {
    DATA_DIR.join(WORKFLOW_FILE_NAME)
}

/// Location of the error log.
pub fn log_file() -> PathBuf {
    DATA_DIR.join(LOG_FILE_NAME)
}

/// Browser opener requested through the environment, if any.
pub fn browser_override() -> Option<String> {
    env::var(BROWSER_ENV).ok().filter(|b| !b.trim().is_empty())
}

/// Appends a timestamped line to the error log. Failures are ignored so
/// that reporting an error can never cause another one.
pub fn append_error_log(message: &str) {
    let _ = append_log_line(&log_file(), message);
}

fn append_log_line(path: &Path, message: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                warn!("Failed to create data directory {}: {}", parent.display(), e);
                e
            })?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(
        file,
        "[{}] {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        message
    )
}
