//! The uniform result shape of every flow action.
//!
//! ```text
//! success: {"result": ..., "status": "success", "next_action": "name" | null, "next_action_info": "..."}
//! error:   {"result": "message", "status": "error", "error_type": "RuntimeError"}
//! ```
//!
//! An error envelope never carries next-action keys.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::sequence::ActionSequence;
use crate::mcp::registry::{ImageData, ToolOutput};

/// Text used when no action follows.
pub const FLOW_COMPLETE: &str = "Flow complete";

/// Which action the next-action hint is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextActionPolicy {
    /// The most recently registered action of the flow.
    ///
    /// After registration completes this is always the final step, so every
    /// success reports the flow as complete.
    #[default]
    LastRegistered,
    /// The action that just ran.
    Executed,
}

/// Result of one flow action invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// The action succeeded.
    Success {
        /// The step's payload.
        result: Value,
        /// The action to call next, if any.
        next_action: Option<String>,
        /// Human-readable form of `next_action`.
        next_action_info: String,
    },
    /// The action failed.
    Error {
        /// The error message.
        result: Value,
        /// Classification of the failure.
        error_type: String,
    },
}

impl Envelope {
    /// Returns `"success"` or `"error"`.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }

    /// Returns `true` for an error envelope.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Returns the payload or error message.
    #[must_use]
    pub const fn result(&self) -> &Value {
        match self {
            Self::Success { result, .. } | Self::Error { result, .. } => result,
        }
    }

    /// Returns the next action hint of a success envelope.
    #[must_use]
    pub fn next_action(&self) -> Option<&str> {
        match self {
            Self::Success { next_action, .. } => next_action.as_deref(),
            Self::Error { .. } => None,
        }
    }

    /// Returns the error classification of an error envelope.
    #[must_use]
    pub fn error_type(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Error { error_type, .. } => Some(error_type),
        }
    }

    /// Renders the envelope as its JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("result".to_string(), self.result().clone());
        map.insert("status".to_string(), Value::String(self.status().to_string()));
        match self {
            Self::Success {
                next_action,
                next_action_info,
                ..
            } => {
                map.insert(
                    "next_action".to_string(),
                    next_action.clone().map_or(Value::Null, Value::String),
                );
                map.insert(
                    "next_action_info".to_string(),
                    Value::String(next_action_info.clone()),
                );
            }
            Self::Error { error_type, .. } => {
                map.insert("error_type".to_string(), Value::String(error_type.clone()));
            }
        }
        Value::Object(map)
    }
}

/// Builds the image payload a step returns to have it sent as image content.
#[must_use]
pub fn image_result(data: String, mime_type: &str) -> Value {
    json!({
        "type": "image",
        "data": data,
        "mimeType": mime_type,
    })
}

/// Splits an image payload off `result`, leaving its type and MIME type.
fn take_image(result: &mut Value) -> Option<ImageData> {
    let obj = result.as_object_mut()?;
    if obj.get("type").and_then(Value::as_str) != Some("image") {
        return None;
    }
    let mime_type = obj.get("mimeType").and_then(Value::as_str)?.to_string();
    let Some(Value::String(data)) = obj.remove("data") else {
        return None;
    };
    Some(ImageData { data, mime_type })
}

impl From<Envelope> for ToolOutput {
    fn from(mut envelope: Envelope) -> Self {
        let image = match &mut envelope {
            Envelope::Success { result, .. } => take_image(result),
            Envelope::Error { .. } => None,
        };
        let output = if envelope.is_error() {
            Self::failed(envelope.to_value())
        } else {
            Self::json(envelope.to_value())
        };
        match image {
            Some(image) => output.with_image(image),
            None => output,
        }
    }
}

/// Wraps step results into envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseFormatter {
    policy: NextActionPolicy,
}

impl ResponseFormatter {
    /// Creates a formatter with the given anchor policy.
    #[must_use]
    pub const fn new(policy: NextActionPolicy) -> Self {
        Self { policy }
    }

    /// Returns the anchor policy.
    #[must_use]
    pub const fn policy(&self) -> NextActionPolicy {
        self.policy
    }

    /// Wraps a successful result, looking up the next action in `sequence`.
    #[must_use]
    pub fn success(&self, sequence: &ActionSequence, executed: &str, result: Value) -> Envelope {
        let anchor = match self.policy {
            NextActionPolicy::LastRegistered => sequence.last(),
            NextActionPolicy::Executed => Some(executed),
        };
        let next_action = anchor
            .and_then(|name| sequence.next_after(name))
            .map(str::to_string);
        let next_action_info = next_action
            .as_ref()
            .map_or_else(|| FLOW_COMPLETE.to_string(), |n| format!("Next execution: {n}"));

        Envelope::Success {
            result,
            next_action,
            next_action_info,
        }
    }

    /// Wraps a failure. No next action is looked up.
    #[must_use]
    pub fn error(&self, message: impl Into<String>, error_type: &str) -> Envelope {
        Envelope::Error {
            result: Value::String(message.into()),
            error_type: error_type.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps() -> ActionSequence {
        let mut seq = ActionSequence::new();
        seq.push("step_1");
        seq.push("step_2");
        seq.push("step_3");
        seq
    }

    #[test]
    fn last_registered_anchor_completes() {
        let formatter = ResponseFormatter::default();
        let env = formatter.success(&steps(), "step_1", json!(["Track"]));

        assert_eq!(env.next_action(), None);
        let value = env.to_value();
        assert_eq!(value["status"], "success");
        assert_eq!(value["next_action"], Value::Null);
        assert_eq!(value["next_action_info"], FLOW_COMPLETE);
    }

    #[test]
    fn executed_anchor_points_forward() {
        let formatter = ResponseFormatter::new(NextActionPolicy::Executed);

        let env = formatter.success(&steps(), "step_1", json!(1));
        assert_eq!(env.next_action(), Some("step_2"));
        assert_eq!(env.to_value()["next_action_info"], "Next execution: step_2");

        let env = formatter.success(&steps(), "step_3", json!(1));
        assert_eq!(env.next_action(), None);
        assert_eq!(env.to_value()["next_action_info"], FLOW_COMPLETE);
    }

    #[test]
    fn error_has_no_next_action_keys() {
        let env = ResponseFormatter::new(NextActionPolicy::Executed).error("boom", "RuntimeError");
        assert!(env.is_error());
        assert_eq!(env.error_type(), Some("RuntimeError"));

        let value = env.to_value();
        assert_eq!(value["status"], "error");
        assert_eq!(value["result"], "boom");
        assert_eq!(value["error_type"], "RuntimeError");
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("next_action"));
        assert!(!obj.contains_key("next_action_info"));
    }

    #[test]
    fn image_result_moves_to_image_content() {
        let env = ResponseFormatter::default().success(
            &steps(),
            "step_3",
            image_result("aGVsbG8=".to_string(), "image/png"),
        );
        let output = ToolOutput::from(env);

        assert!(!output.is_error);
        let image = output.image.unwrap();
        assert_eq!(image.data, "aGVsbG8=");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(output.value["result"], json!({"type": "image", "mimeType": "image/png"}));
    }

    #[test]
    fn error_envelope_output_is_flagged() {
        let output = ToolOutput::from(ResponseFormatter::default().error("x", "InvalidArguments"));
        assert!(output.is_error);
        assert!(output.image.is_none());
        assert_eq!(output.value["error_type"], "InvalidArguments");
    }

    #[test]
    fn policy_from_config_string() {
        let policy: NextActionPolicy = serde_json::from_str("\"executed\"").unwrap();
        assert_eq!(policy, NextActionPolicy::Executed);
        let policy: NextActionPolicy = serde_json::from_str("\"last_registered\"").unwrap();
        assert_eq!(policy, NextActionPolicy::LastRegistered);
        assert!(serde_json::from_str::<NextActionPolicy>("\"first\"").is_err());
    }
}
