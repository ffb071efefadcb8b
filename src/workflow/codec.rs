//! Workflow Codec
//!
//! Converts a collection of workflows to and from the persisted JSON
//! document. The top-level value is always an array of workflows.
//!
//! Loading is tolerant: any task or step field that is missing takes the
//! same default a freshly constructed node would have, so hand-edited or
//! partially written files still load. Documents written with PascalCase
//! keys (`Name`, `Tasks`, `IsCompleted`, ...) are accepted too.

use log::debug;
use serde_json::Value;

use super::model::Workflow;
use crate::error::Result;

/// Serializes workflows into a pretty-printed JSON array.
///
/// Key order is fixed: `name`, `tasks` for workflows; `name`, `progress`,
/// `isCompleted`, `steps` for tasks; `name`, `url`, `progress`,
/// `isCompleted` for steps.
pub fn serialize(workflows: &[Workflow]) -> Result<String> {
    let json = serde_json::to_string_pretty(workflows)?;
    debug!("Serialized {} workflows ({} bytes)", workflows.len(), json.len());
    Ok(json)
}

/// Parses a JSON document into workflows.
///
/// # Returns
///
/// * `Ok(workflows)` - The rebuilt tree; every node has a fresh identity and
///   each workflow's subtree shares one notifier
/// * `Err(WaymarkError::Parse)` - Invalid JSON, a non-array top-level value,
///   or a field of the wrong type
///
/// # Example
///
/// ```
/// use waymark::workflow::codec::deserialize;
///
/// let workflows = deserialize(r#"[{"name":"W","tasks":[{"name":"T","steps":[{"name":"S"}]}]}]"#).unwrap();
/// let step = &workflows[0].tasks()[0].steps()[0];
/// assert_eq!(step.url(), "https://www.google.com");
/// assert_eq!(step.progress(), 0.0);
/// ```
pub fn deserialize(text: &str) -> Result<Vec<Workflow>> {
    let document: Value = serde_json::from_str(text)?;

    // Decoding a non-array straight into Vec<_> gives a confusing message.
    if !document.is_array() {
        let error = <serde_json::Error as serde::de::Error>::custom(format!(
            "expected a JSON array of workflows at the top level, found {}",
            kind_of(&document)
        ));
        return Err(error.into());
    }

    let mut workflows: Vec<Workflow> = serde_json::from_value(document)?;
    for workflow in &mut workflows {
        let notifier = workflow.notifier().clone();
        workflow.attach(&notifier);
    }

    debug!("Deserialized {} workflows", workflows.len());
    Ok(workflows)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
