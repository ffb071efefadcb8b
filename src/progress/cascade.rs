//! Completion Cascade
//!
//! Marking a node complete sets its flag and its progress together.
//! Completing a task also completes every one of its steps. The cascade
//! only runs downward: completing every step of a task never completes
//! the task itself, and workflows carry no completion state at all.

use log::{debug, info, warn};

use crate::error::{Result, WaymarkError};
use crate::workflow::{NodeId, Selection, Step, Task, Workflow};

/// Marks a single step complete.
pub fn complete_step(step: &mut Step) {
    step.set_completed(true);
    step.set_progress(1.0);
    debug!("Step '{}' marked complete", step.name());
}

/// Marks a task and every step it currently holds complete, in order.
///
/// Calling this again on a completed task changes nothing but re-emits
/// the notifications.
pub fn complete_task(task: &mut Task) {
    task.set_completed(true);
    task.set_progress(1.0);
    for step in task.steps_mut() {
        complete_step(step);
    }
    info!(
        "Task '{}' marked complete ({} steps)",
        task.name(),
        task.steps().len()
    );
}

/// Completes the task that holds this exact step instance.
///
/// # Returns
///
/// * `Ok(task_id)` - The enclosing task was found and completed
/// * `Err(WaymarkError::LookupMiss)` - No task holds the step; nothing was
///   changed
pub fn complete_enclosing_task<'a>(
    workflows: impl IntoIterator<Item = &'a mut Workflow>,
    step: NodeId,
) -> Result<NodeId> {
    let task = workflows
        .into_iter()
        .flat_map(|w| w.tasks_mut())
        .find(|t| t.contains_step(step));

    match task {
        Some(task) => {
            complete_task(task);
            Ok(task.id())
        }
        None => {
            warn!("No enclosing task for step {}", step);
            Err(WaymarkError::LookupMiss { step })
        }
    }
}

/// Completes the task behind a task or step selection.
///
/// A task selection completes that task; a step selection completes its
/// enclosing task. Selecting a workflow is rejected without changes.
pub fn complete_selection<'a>(
    workflows: impl IntoIterator<Item = &'a mut Workflow>,
    selection: Selection,
) -> Result<NodeId> {
    match selection {
        Selection::Task(id) => {
            let task = workflows
                .into_iter()
                .find_map(|w| w.task_mut(id))
                .ok_or_else(|| stale_selection("task"))?;
            complete_task(task);
            Ok(id)
        }
        Selection::Step(id) => complete_enclosing_task(workflows, id),
        Selection::Workflow(_) => Err(WaymarkError::InvalidSelection(
            "Please select a task or a step (to mark its task complete).".to_string(),
        )),
    }
}

/// Completes the selected step. Any other selection is rejected.
pub fn complete_selected_step<'a>(
    workflows: impl IntoIterator<Item = &'a mut Workflow>,
    selection: Selection,
) -> Result<NodeId> {
    let Selection::Step(id) = selection else {
        return Err(WaymarkError::InvalidSelection(
            "Please select a step to mark complete.".to_string(),
        ));
    };

    let step = workflows
        .into_iter()
        .flat_map(|w| w.tasks_mut())
        .find_map(|t| t.step_mut(id))
        .ok_or_else(|| stale_selection("step"))?;
    complete_step(step);
    Ok(id)
}

fn stale_selection(kind: &str) -> WaymarkError {
    WaymarkError::InvalidSelection(format!("The selected {} no longer exists.", kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{ChangeEvent, Property};
    use std::sync::{Arc, Mutex};

    fn tree() -> Vec<Workflow> {
        vec![
            Workflow::new("w1").with_task(
                Task::new("t1")
                    .with_progress(0.3)
                    .with_step(Step::new("s1", "https://a").with_progress(0.8))
                    .with_step(Step::new("s2", "https://b")),
            ),
            Workflow::new("w2").with_task(
                Task::new("t2").with_step(Step::new("s1", "https://a").with_progress(0.8)),
            ),
        ]
    }

    fn first_task(workflows: &mut [Workflow]) -> &mut Task {
        workflows[0].tasks_mut().next().unwrap()
    }

    fn assert_task_complete(task: &Task) {
        assert!(task.is_completed());
        assert_eq!(task.progress(), 1.0);
        for step in task.steps() {
            assert!(step.is_completed());
            assert_eq!(step.progress(), 1.0);
        }
    }

    #[test]
    fn test_complete_step() {
        let mut step = Step::new("s", "https://a").with_progress(0.4);
        complete_step(&mut step);
        assert!(step.is_completed());
        assert_eq!(step.progress(), 1.0);
    }

    #[test]
    fn test_complete_task_cascades_to_steps() {
        let mut workflows = tree();
        let task = first_task(&mut workflows);
        complete_task(task);
        assert_task_complete(task);
    }

    #[test]
    fn test_complete_task_is_idempotent() {
        let mut workflows = tree();
        complete_task(first_task(&mut workflows));
        let once = workflows.to_vec();

        complete_task(first_task(&mut workflows));
        assert_eq!(workflows, once);
    }

    #[test]
    fn test_complete_task_emits_in_order() {
        let mut task = Task::new("t").with_step(Step::default()).with_step(Step::default());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        task.notifier().subscribe(move |event| {
            if let ChangeEvent::Property(p) = event {
                sink.lock().unwrap().push((p.node, p.property));
            }
        });

        complete_task(&mut task);

        let (first, second) = (task.steps()[0].id(), task.steps()[1].id());
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                (task.id(), Property::IsCompleted),
                (task.id(), Property::Progress),
                (first, Property::IsCompleted),
                (first, Property::Progress),
                (second, Property::IsCompleted),
                (second, Property::Progress),
            ]
        );
    }

    #[test]
    fn test_completing_all_steps_leaves_task_open() {
        let mut workflows = tree();
        let task = first_task(&mut workflows);
        for step in task.steps_mut() {
            complete_step(step);
        }
        assert!(!task.is_completed());
        assert_eq!(task.progress(), 0.3);
    }

    #[test]
    fn test_step_selection_matches_direct_task_completion() {
        let mut via_step = tree();
        let mut direct = tree();

        let step_id = via_step[0].tasks()[0].steps()[1].id();
        let task_id = complete_enclosing_task(&mut via_step, step_id).unwrap();
        assert_eq!(task_id, via_step[0].tasks()[0].id());

        complete_task(first_task(&mut direct));
        assert_eq!(via_step, direct);
    }

    #[test]
    fn test_enclosing_lookup_uses_identity_not_value() {
        let mut workflows = tree();
        // w2's step has the same fields as w1's first step.
        let twin = workflows[1].tasks()[0].steps()[0].id();

        complete_enclosing_task(&mut workflows, twin).unwrap();

        assert!(!workflows[0].tasks()[0].is_completed());
        assert_task_complete(&workflows[1].tasks()[0]);
    }

    #[test]
    fn test_lookup_miss_changes_nothing() {
        let mut workflows = tree();
        let before = workflows.to_vec();
        let detached = Step::new("s1", "https://a").with_progress(0.8);

        let result = complete_enclosing_task(&mut workflows, detached.id());

        assert!(matches!(result, Err(WaymarkError::LookupMiss { step }) if step == detached.id()));
        assert_eq!(workflows, before);
    }

    #[test]
    fn test_complete_selection_task_and_step() {
        let mut workflows = tree();
        let task_id = workflows[1].tasks()[0].id();
        complete_selection(&mut workflows, Selection::Task(task_id)).unwrap();
        assert_task_complete(&workflows[1].tasks()[0]);

        let step_id = workflows[0].tasks()[0].steps()[0].id();
        complete_selection(&mut workflows, Selection::Step(step_id)).unwrap();
        assert_task_complete(&workflows[0].tasks()[0]);
    }

    #[test]
    fn test_complete_selection_rejects_workflow() {
        let mut workflows = tree();
        let before = workflows.to_vec();
        let workflow_id = workflows[0].id();
        let result = complete_selection(&mut workflows, Selection::Workflow(workflow_id));
        assert!(matches!(result, Err(WaymarkError::InvalidSelection(_))));
        assert_eq!(workflows, before);
    }

    #[test]
    fn test_complete_selected_step_only_touches_step() {
        let mut workflows = tree();
        let step_id = workflows[0].tasks()[0].steps()[1].id();

        complete_selected_step(&mut workflows, Selection::Step(step_id)).unwrap();

        let task = &workflows[0].tasks()[0];
        assert!(task.steps()[1].is_completed());
        assert!(!task.steps()[0].is_completed());
        assert!(!task.is_completed());
    }

    #[test]
    fn test_complete_selected_step_rejects_task() {
        let mut workflows = tree();
        let task_id = workflows[0].tasks()[0].id();
        let result = complete_selected_step(&mut workflows, Selection::Task(task_id));
        assert!(matches!(result, Err(WaymarkError::InvalidSelection(_))));
    }

    #[test]
    fn test_cascade_normalizes_inconsistent_loaded_state() {
        let mut task = Task::new("t").with_completed(true).with_progress(0.2);
        complete_task(&mut task);
        assert_eq!(task.progress(), 1.0);
    }
}
