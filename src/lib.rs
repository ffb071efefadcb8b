//! Waymark - Hierarchical Workflow Progress Tracker
//!
//! Tracks workflows made of tasks made of steps. Tasks and steps carry a
//! completion flag and a progress fraction; steps carry an address the
//! user can open. The whole tree is saved to and restored from JSON.
//!
//! # Architecture
//!
//! The library is organized into four main modules:
//!
//! - [`workflow`]: The entity tree, change notification and JSON persistence
//! - [`progress`]: The "mark complete" cascade
//! - [`navigation`]: Resolving a selection to an address and showing it
//! - [`config`]: Data directory, default files and the error log
//!
//! # Example
//!
//! ```rust
//! use waymark::progress::complete_selection;
//! use waymark::WorkflowStore;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = WorkflowStore::sample();
//!
//!     // Complete the task enclosing the first step of the first task
//!     let selection = store.select_path("0/0/0").ok_or("no such step")?;
//!     complete_selection(store.workflows_mut(), selection)?;
//!
//!     let json = store.to_json()?;
//!     assert!(json.contains("\"isCompleted\": true"));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod navigation;
pub mod progress;
pub mod workflow;

// Re-export commonly used types
pub use error::{Result, WaymarkError};
pub use navigation::{Navigator, SystemBrowser, Viewport};
pub use workflow::model::{Step, Task, Workflow};
pub use workflow::store::WorkflowStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Waymark";
