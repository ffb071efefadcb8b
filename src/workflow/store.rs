//! Workflow Store
//!
//! Owns the root collection of workflows and moves it between memory,
//! files and export sinks. Loading always replaces the whole collection;
//! a failed load leaves it untouched.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::info;

use super::codec;
use super::model::{NodeId, Step, Task, Workflow};
use super::notify::{ChangeEvent, Notifier};
use super::selection::{self, NodeRef, Selection};
use crate::error::Result;

/// The root collection of workflows.
///
/// Every node in the store shares the store's [`Notifier`], so one
/// subscription observes all field writes and structural changes.
#[derive(Debug, Default)]
pub struct WorkflowStore {
    workflows: Vec<Workflow>,
    notifier: Notifier,
}

impl WorkflowStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the demonstration workflow.
    pub fn sample() -> Self {
        let mut store = Self::new();
        store.push(
            Workflow::new("Sample Workflow")
                .with_task(
                    Task::new("Task 1")
                        .with_progress(0.5)
                        .with_step(Step::new("Step 1.1", "https://www.google.com").with_progress(0.8))
                        .with_step(Step::new("Step 1.2", "https://www.github.com").with_progress(0.3)),
                )
                .with_task(
                    Task::new("Task 2")
                        .with_progress(0.2)
                        .with_step(Step::new("Step 2.1", "https://www.jira.com").with_progress(0.1)),
                ),
        );
        store
    }

    pub fn workflows(&self) -> &[Workflow] {
        &self.workflows
    }

    /// Iterates mutably over the workflows. Structural edits go through
    /// [`push`](Self::push), [`remove`](Self::remove) and
    /// [`replace`](Self::replace) so every node stays attached to the store.
    pub fn workflows_mut(&mut self) -> std::slice::IterMut<'_, Workflow> {
        self.workflows.iter_mut()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    /// Appends a workflow and returns its identity.
    pub fn push(&mut self, mut workflow: Workflow) -> NodeId {
        let id = workflow.id();
        workflow.attach(&self.notifier);
        self.workflows.push(workflow);
        self.notifier.emit(ChangeEvent::ChildrenChanged { parent: None });
        id
    }

    /// Removes the workflow with the given identity.
    pub fn remove(&mut self, id: NodeId) -> Option<Workflow> {
        let index = self.workflows.iter().position(|w| w.id() == id)?;
        let mut workflow = self.workflows.remove(index);
        workflow.attach(&Notifier::new());
        self.notifier.emit(ChangeEvent::ChildrenChanged { parent: None });
        Some(workflow)
    }

    /// Clears the collection and repopulates it with `workflows`.
    pub fn replace(&mut self, workflows: Vec<Workflow>) {
        self.workflows = workflows;
        for workflow in &mut self.workflows {
            workflow.attach(&self.notifier);
        }
        self.notifier.emit(ChangeEvent::ChildrenChanged { parent: None });
    }

    /// Replaces the collection with the workflows parsed from `text`.
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        let workflows = codec::deserialize(text)?;
        self.replace(workflows);
        Ok(())
    }

    /// Replaces the collection with the workflows stored in a file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        self.load_str(&content)?;
        info!("Loaded {} workflows from {}", self.len(), path.display());
        Ok(())
    }

    /// Serializes the collection.
    pub fn to_json(&self) -> Result<String> {
        codec::serialize(&self.workflows)
    }

    /// Writes the collection to a file, creating parent directories.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_json()?)?;
        info!("Saved {} workflows to {}", self.len(), path.display());
        Ok(())
    }

    /// Writes the serialized collection to an external sink.
    ///
    /// The sink is write-only from the store's point of view; nothing is
    /// ever read back from it.
    pub fn export_to<W: Write>(&self, mut sink: W) -> Result<()> {
        let json = self.to_json()?;
        sink.write_all(json.as_bytes())?;
        sink.write_all(b"\n")?;
        sink.flush()?;
        Ok(())
    }

    /// Looks up the node a selection refers to.
    pub fn find(&self, selection: Selection) -> Option<NodeRef<'_>> {
        selection::find(&self.workflows, selection)
    }

    /// Resolves an index path such as `"0/1/0"`.
    pub fn select_path(&self, path: &str) -> Option<Selection> {
        selection::select_path(&self.workflows, path)
    }

    /// The first step across all workflows, depth first.
    pub fn first_step(&self) -> Option<&Step> {
        self.workflows.iter().flat_map(|w| w.steps()).next()
    }
}
