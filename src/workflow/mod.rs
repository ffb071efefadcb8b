//! Workflow Model Module
//!
//! Provides the workflow/task/step tree, its change notifications, and
//! its JSON persistence.
//!
//! # Structure
//!
//! - [`model`]: Core data structures (Workflow, Task, Step)
//! - [`notify`]: Field-level change notification
//! - [`selection`]: Addressing a node by identity or index path
//! - [`codec`]: JSON serialization and tolerant loading
//! - [`store`]: The root collection and its file/export I/O

pub mod codec;
pub mod model;
pub mod notify;
pub mod selection;
pub mod store;

pub use model::{NodeId, Step, Task, Workflow};
pub use notify::{ChangeEvent, Notifier, Property, PropertyChanged, PropertyValue};
pub use selection::{NodeRef, Selection};
pub use store::WorkflowStore;
