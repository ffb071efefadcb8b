//! Progress Module
//!
//! Applies "mark complete" operations to the workflow tree.
//!
//! # Architecture
//!
//! - [`cascade`]: Step and task completion, including the lookup of a
//!   step's enclosing task

pub mod cascade;

pub use cascade::{
    complete_enclosing_task, complete_selected_step, complete_selection, complete_step,
    complete_task,
};
