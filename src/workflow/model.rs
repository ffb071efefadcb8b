//! Workflow Data Model
//!
//! The three-level tree tracked by Waymark: a [`Workflow`] owns an ordered
//! list of [`Task`]s, a task owns an ordered list of [`Step`]s.
//!
//! # Example JSON Format
//!
//! ```json
//! [
//!   {
//!     "name": "Onboarding",
//!     "tasks": [
//!       {
//!         "name": "Accounts",
//!         "progress": 0.5,
//!         "isCompleted": false,
//!         "steps": [
//!           {
//!             "name": "Create mailbox",
//!             "url": "https://mail.example.com",
//!             "progress": 1.0,
//!             "isCompleted": true
//!           }
//!         ]
//!       }
//!     ]
//!   }
//! ]
//! ```
//!
//! Fields are private and written through setters so that every write
//! reaches the node's [`Notifier`]. Each node also carries a [`NodeId`]
//! that identifies the instance; two steps with identical fields are still
//! different steps. Equality (`==`) compares persisted fields only.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::notify::{ChangeEvent, Notifier, Property, PropertyValue};

/// Default name for a workflow created without one.
pub const DEFAULT_WORKFLOW_NAME: &str = "New Workflow";

/// Default name for a task created without one.
pub const DEFAULT_TASK_NAME: &str = "New Task";

/// Default name for a step created without one.
pub const DEFAULT_STEP_NAME: &str = "New Step";

/// Default address for a step created without one.
pub const DEFAULT_STEP_URL: &str = "https://www.google.com";

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an entity instance.
///
/// Never persisted; every constructed, deserialized or cloned node gets a
/// fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

fn default_workflow_name() -> String {
    DEFAULT_WORKFLOW_NAME.to_string()
}

fn default_task_name() -> String {
    DEFAULT_TASK_NAME.to_string()
}

fn default_step_name() -> String {
    DEFAULT_STEP_NAME.to_string()
}

fn default_step_url() -> String {
    DEFAULT_STEP_URL.to_string()
}

/// Clamps a progress value into `[0, 1]`; NaN becomes 0.
fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// A leaf unit of work with a navigable address.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(skip, default = "NodeId::fresh")]
    id: NodeId,

    #[serde(default = "default_step_name", alias = "Name")]
    name: String,

    #[serde(default = "default_step_url", alias = "Url")]
    url: String,

    #[serde(default, alias = "Progress")]
    progress: f64,

    #[serde(default, alias = "IsCompleted")]
    is_completed: bool,

    #[serde(skip)]
    notifier: Notifier,
}

impl Step {
    /// Creates an incomplete step with zero progress.
    ///
    /// # Example
    ///
    /// ```
    /// use waymark::workflow::Step;
    ///
    /// let step = Step::new("Read the docs", "https://docs.rs").with_progress(0.25);
    /// assert_eq!(step.url(), "https://docs.rs");
    /// assert!(!step.is_completed());
    /// ```
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            name: name.into(),
            url: url.into(),
            progress: 0.0,
            is_completed: false,
            notifier: Notifier::new(),
        }
    }

    /// Sets the initial progress.
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = clamp_progress(progress);
        self
    }

    /// Sets the initial completion flag.
    pub fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.notifier
            .property(self.id, Property::Name, PropertyValue::Text(self.name.clone()));
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
        self.notifier
            .property(self.id, Property::Url, PropertyValue::Text(self.url.clone()));
    }

    /// Sets progress, clamped into `[0, 1]`.
    pub fn set_progress(&mut self, progress: f64) {
        self.progress = clamp_progress(progress);
        self.notifier
            .property(self.id, Property::Progress, PropertyValue::Number(self.progress));
    }

    pub fn set_completed(&mut self, is_completed: bool) {
        self.is_completed = is_completed;
        self.notifier
            .property(self.id, Property::IsCompleted, PropertyValue::Flag(is_completed));
    }

    pub(crate) fn attach(&mut self, notifier: &Notifier) {
        self.notifier = notifier.clone();
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_NAME, DEFAULT_STEP_URL)
    }
}

impl Clone for Step {
    /// A clone is a new, detached instance with the same field values.
    fn clone(&self) -> Self {
        Self {
            id: NodeId::fresh(),
            name: self.name.clone(),
            url: self.url.clone(),
            progress: self.progress,
            is_completed: self.is_completed,
            notifier: Notifier::new(),
        }
    }
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.url == other.url
            && self.progress == other.progress
            && self.is_completed == other.is_completed
    }
}

/// A unit of work made of ordered steps.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(skip, default = "NodeId::fresh")]
    id: NodeId,

    #[serde(default = "default_task_name", alias = "Name")]
    name: String,

    #[serde(default, alias = "Progress")]
    progress: f64,

    #[serde(default, alias = "IsCompleted")]
    is_completed: bool,

    #[serde(default, alias = "Steps")]
    steps: Vec<Step>,

    #[serde(skip)]
    notifier: Notifier,
}

impl Task {
    /// Creates an incomplete task with no steps.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            name: name.into(),
            progress: 0.0,
            is_completed: false,
            steps: Vec::new(),
            notifier: Notifier::new(),
        }
    }

    /// Sets the initial progress.
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = clamp_progress(progress);
        self
    }

    /// Sets the initial completion flag.
    pub fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    /// Appends a step while building.
    pub fn with_step(mut self, step: Step) -> Self {
        self.add_step(step);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Iterates mutably over the steps. The sequence itself is changed only
    /// through [`add_step`](Self::add_step),
    /// [`replace_step`](Self::replace_step) and
    /// [`remove_step`](Self::remove_step); a step written over in place
    /// keeps its own notifier and is no longer observed through this task.
    pub fn steps_mut(&mut self) -> std::slice::IterMut<'_, Step> {
        self.steps.iter_mut()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.notifier
            .property(self.id, Property::Name, PropertyValue::Text(self.name.clone()));
    }

    /// Sets progress, clamped into `[0, 1]`.
    pub fn set_progress(&mut self, progress: f64) {
        self.progress = clamp_progress(progress);
        self.notifier
            .property(self.id, Property::Progress, PropertyValue::Number(self.progress));
    }

    pub fn set_completed(&mut self, is_completed: bool) {
        self.is_completed = is_completed;
        self.notifier
            .property(self.id, Property::IsCompleted, PropertyValue::Flag(is_completed));
    }

    /// Appends a step and returns its identity.
    pub fn add_step(&mut self, mut step: Step) -> NodeId {
        let id = step.id();
        step.attach(&self.notifier);
        self.steps.push(step);
        self.notifier.emit(ChangeEvent::ChildrenChanged {
            parent: Some(self.id),
        });
        id
    }

    /// Removes the step with the given identity, detaching it.
    pub fn remove_step(&mut self, id: NodeId) -> Option<Step> {
        let index = self.steps.iter().position(|s| s.id() == id)?;
        let mut step = self.steps.remove(index);
        step.attach(&Notifier::new());
        self.notifier.emit(ChangeEvent::ChildrenChanged {
            parent: Some(self.id),
        });
        Some(step)
    }

    /// True if this exact step instance is one of the task's steps.
    pub fn contains_step(&self, id: NodeId) -> bool {
        self.steps.iter().any(|s| s.id() == id)
    }

    pub fn step(&self, id: NodeId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id() == id)
    }

    pub fn step_mut(&mut self, id: NodeId) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id() == id)
    }

    /// Puts `step` in the slot of the step with identity `id` and returns
    /// the detached step it displaced.
    pub fn replace_step(&mut self, id: NodeId, mut step: Step) -> Option<Step> {
        let slot = self.steps.iter_mut().find(|s| s.id() == id)?;
        step.attach(&self.notifier);
        let mut old = std::mem::replace(slot, step);
        old.attach(&Notifier::new());
        self.notifier.emit(ChangeEvent::ChildrenChanged {
            parent: Some(self.id),
        });
        Some(old)
    }

    pub(crate) fn attach(&mut self, notifier: &Notifier) {
        self.notifier = notifier.clone();
        for step in &mut self.steps {
            step.attach(notifier);
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new(DEFAULT_TASK_NAME)
    }
}

impl Clone for Task {
    /// A clone is a new, detached subtree with the same field values.
    fn clone(&self) -> Self {
        let mut task = Self {
            id: NodeId::fresh(),
            name: self.name.clone(),
            progress: self.progress,
            is_completed: self.is_completed,
            steps: self.steps.clone(),
            notifier: Notifier::new(),
        };
        let notifier = task.notifier.clone();
        task.attach(&notifier);
        task
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.progress == other.progress
            && self.is_completed == other.is_completed
            && self.steps == other.steps
    }
}

/// Top-level unit of work. Carries no progress of its own.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(skip, default = "NodeId::fresh")]
    id: NodeId,

    #[serde(default = "default_workflow_name", alias = "Name")]
    name: String,

    #[serde(default, alias = "Tasks")]
    tasks: Vec<Task>,

    #[serde(skip)]
    notifier: Notifier,
}

impl Workflow {
    /// Creates an empty workflow.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            name: name.into(),
            tasks: Vec::new(),
            notifier: Notifier::new(),
        }
    }

    /// Appends a task while building.
    pub fn with_task(mut self, task: Task) -> Self {
        self.add_task(task);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Iterates mutably over the tasks. The sequence itself is changed only
    /// through [`add_task`](Self::add_task),
    /// [`replace_task`](Self::replace_task) and
    /// [`remove_task`](Self::remove_task).
    pub fn tasks_mut(&mut self) -> std::slice::IterMut<'_, Task> {
        self.tasks.iter_mut()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.notifier
            .property(self.id, Property::Name, PropertyValue::Text(self.name.clone()));
    }

    /// Appends a task and returns its identity.
    pub fn add_task(&mut self, mut task: Task) -> NodeId {
        let id = task.id();
        task.attach(&self.notifier);
        self.tasks.push(task);
        self.notifier.emit(ChangeEvent::ChildrenChanged {
            parent: Some(self.id),
        });
        id
    }

    /// Removes the task with the given identity, detaching its subtree.
    pub fn remove_task(&mut self, id: NodeId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id() == id)?;
        let mut task = self.tasks.remove(index);
        task.attach(&Notifier::new());
        self.notifier.emit(ChangeEvent::ChildrenChanged {
            parent: Some(self.id),
        });
        Some(task)
    }

    pub fn task(&self, id: NodeId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn task_mut(&mut self, id: NodeId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id() == id)
    }

    /// Puts `task` in the slot of the task with identity `id` and returns
    /// the detached task it displaced.
    pub fn replace_task(&mut self, id: NodeId, mut task: Task) -> Option<Task> {
        let slot = self.tasks.iter_mut().find(|t| t.id() == id)?;
        task.attach(&self.notifier);
        let mut old = std::mem::replace(slot, task);
        old.attach(&Notifier::new());
        self.notifier.emit(ChangeEvent::ChildrenChanged {
            parent: Some(self.id),
        });
        Some(old)
    }

    /// Iterates over every step of every task, in order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.tasks.iter().flat_map(|t| t.steps().iter())
    }

    pub(crate) fn attach(&mut self, notifier: &Notifier) {
        self.notifier = notifier.clone();
        for task in &mut self.tasks {
            task.attach(notifier);
        }
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new(DEFAULT_WORKFLOW_NAME)
    }
}

impl Clone for Workflow {
    /// A clone is a new, detached subtree with the same field values.
    fn clone(&self) -> Self {
        let mut workflow = Self {
            id: NodeId::fresh(),
            name: self.name.clone(),
            tasks: self.tasks.clone(),
            notifier: Notifier::new(),
        };
        let notifier = workflow.notifier.clone();
        workflow.attach(&notifier);
        workflow
    }
}

impl PartialEq for Workflow {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.tasks == other.tasks
    }
}
