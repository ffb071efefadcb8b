//! Node Selection
//!
//! The collaborator's current selection may be a workflow, a task or a
//! step. [`Selection`] names it by identity; [`NodeRef`] is the borrowed
//! node it resolves to.

use std::fmt;

use super::model::{NodeId, Step, Task, Workflow};

/// A selected node, by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    Workflow(NodeId),
    Task(NodeId),
    Step(NodeId),
}

impl Selection {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Workflow(id) | Self::Task(id) | Self::Step(id) => *id,
        }
    }
}

/// A borrowed node of any of the three kinds.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Workflow(&'a Workflow),
    Task(&'a Task),
    Step(&'a Step),
}

impl<'a> NodeRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Self::Workflow(w) => w.name(),
            Self::Task(t) => t.name(),
            Self::Step(s) => s.name(),
        }
    }

    pub fn selection(&self) -> Selection {
        match self {
            Self::Workflow(w) => Selection::Workflow(w.id()),
            Self::Task(t) => Selection::Task(t.id()),
            Self::Step(s) => Selection::Step(s.id()),
        }
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Workflow(_) => "workflow",
            Self::Task(_) => "task",
            Self::Step(_) => "step",
        };
        write!(f, "{} '{}'", kind, self.name())
    }
}

/// Finds the node a selection refers to.
pub fn find<'a>(workflows: &'a [Workflow], selection: Selection) -> Option<NodeRef<'a>> {
    match selection {
        Selection::Workflow(id) => workflows
            .iter()
            .find(|w| w.id() == id)
            .map(NodeRef::Workflow),
        Selection::Task(id) => workflows
            .iter()
            .find_map(|w| w.task(id))
            .map(NodeRef::Task),
        Selection::Step(id) => workflows
            .iter()
            .flat_map(|w| w.tasks())
            .find_map(|t| t.step(id))
            .map(NodeRef::Step),
    }
}

/// Resolves a slash-separated index path: `"w"`, `"w/t"` or `"w/t/s"`.
///
/// Indices are zero-based. Returns `None` for malformed or out-of-range
/// paths.
pub fn select_path(workflows: &[Workflow], path: &str) -> Option<Selection> {
    let indices: Vec<usize> = path
        .trim()
        .split('/')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;

    match indices.as_slice() {
        [w] => workflows.get(*w).map(|w| Selection::Workflow(w.id())),
        [w, t] => workflows
            .get(*w)?
            .tasks()
            .get(*t)
            .map(|t| Selection::Task(t.id())),
        [w, t, s] => workflows
            .get(*w)?
            .tasks()
            .get(*t)?
            .steps()
            .get(*s)
            .map(|s| Selection::Step(s.id())),
        _ => None,
    }
}
