//! Statically declared tool parameters.
//!
//! Every tool declares its parameters up front as a `&'static [ParamSpec]`.
//! The declarations produce the JSON Schema advertised in `tools/list` and
//! are checked against incoming arguments before a handler runs.
//!
//! One parameter per tool may be of kind [`ParamKind::Context`]: it is
//! supplied by the server at call time (see
//! [`ToolContext`](crate::mcp::context::ToolContext)) and never appears in
//! the schema.

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use crate::error::RegistrationError;

/// JSON kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A JSON string.
    String,
    /// A JSON integer.
    Integer,
    /// Any JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
    /// A JSON object.
    Object,
    /// A JSON array of strings.
    StringArray,
    /// The server-supplied invocation context.
    Context,
}

impl ParamKind {
    /// Returns the JSON Schema fragment for this kind.
    fn schema(self) -> Option<Value> {
        match self {
            Self::String => Some(json!({"type": "string"})),
            Self::Integer => Some(json!({"type": "integer"})),
            Self::Number => Some(json!({"type": "number"})),
            Self::Boolean => Some(json!({"type": "boolean"})),
            Self::Object => Some(json!({"type": "object"})),
            Self::StringArray => Some(json!({"type": "array", "items": {"type": "string"}})),
            Self::Context => None,
        }
    }

    /// Returns `true` if `value` has this kind.
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            Self::Context => false,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::Object => "an object",
            Self::StringArray => "an array of strings",
            Self::Context => "server-supplied",
        }
    }
}

/// A single declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: &'static str,
    /// JSON kind.
    pub kind: ParamKind,
    /// Description shown to callers.
    pub description: &'static str,
    /// Whether callers must supply it.
    pub required: bool,
}

impl ParamSpec {
    /// Declares a required parameter.
    #[must_use]
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
        }
    }

    /// Declares an optional parameter.
    #[must_use]
    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
        }
    }

    /// Declares the invocation-context slot.
    #[must_use]
    pub const fn context(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Context,
            description: "",
            required: false,
        }
    }

    /// Returns `true` for the invocation-context slot.
    #[must_use]
    pub fn is_context(&self) -> bool {
        self.kind == ParamKind::Context
    }
}

/// Checks a tool's declarations.
///
/// # Errors
///
/// Returns an error if a parameter name repeats or more than one context
/// slot is declared.
pub fn validate_specs(tool: &str, params: &[ParamSpec]) -> Result<(), RegistrationError> {
    let mut seen = HashSet::new();
    for param in params {
        if !seen.insert(param.name) {
            return Err(RegistrationError::DuplicateParameter {
                tool: tool.to_string(),
                param: param.name.to_string(),
            });
        }
    }

    if params.iter().filter(|p| p.is_context()).count() > 1 {
        return Err(RegistrationError::MultipleContextParameters {
            tool: tool.to_string(),
        });
    }
    Ok(())
}

/// Builds the JSON Schema for a tool's input, leaving out the context slot.
#[must_use]
pub fn input_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in params {
        let Some(mut schema) = param.kind.schema() else {
            continue;
        };
        if !param.description.is_empty() {
            schema["description"] = Value::String(param.description.to_string());
        }
        properties.insert(param.name.to_string(), schema);
        if param.required {
            required.push(Value::String(param.name.to_string()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Checks caller arguments against the declarations.
///
/// Undeclared arguments are tolerated. A caller may not fill the context slot.
///
/// # Errors
///
/// Returns a message naming the first offending parameter.
pub fn validate_arguments(params: &[ParamSpec], args: &Map<String, Value>) -> Result<(), String> {
    for param in params {
        let value = args.get(param.name);

        if param.is_context() {
            if value.is_some() {
                return Err(format!(
                    "Parameter '{}' is supplied by the server and cannot be set",
                    param.name
                ));
            }
            continue;
        }

        match value {
            None | Some(Value::Null) if param.required => {
                return Err(format!("Missing required parameter: {}", param.name));
            }
            None | Some(Value::Null) => {}
            Some(v) if !param.kind.accepts(v) => {
                return Err(format!(
                    "Parameter '{}' must be {}",
                    param.name,
                    param.kind.label()
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &[ParamSpec] = &[
        ParamSpec::context("ctx"),
        ParamSpec::required("item_type", ParamKind::String, "The item type"),
        ParamSpec::optional("layers", ParamKind::StringArray, "Layer subset"),
    ];

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn schema_excludes_context() {
        let schema = input_schema(PARAMS);
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"].get("ctx").is_none());
        assert_eq!(schema["properties"]["item_type"]["type"], "string");
        assert_eq!(schema["properties"]["layers"]["items"]["type"], "string");
        assert_eq!(schema["required"], json!(["item_type"]));
    }

    #[test]
    fn duplicate_parameter_rejected() {
        let params = [
            ParamSpec::required("a", ParamKind::String, ""),
            ParamSpec::optional("a", ParamKind::Integer, ""),
        ];
        assert!(matches!(
            validate_specs("t", &params),
            Err(RegistrationError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn two_context_slots_rejected() {
        let params = [ParamSpec::context("a"), ParamSpec::context("b")];
        assert!(matches!(
            validate_specs("t", &params),
            Err(RegistrationError::MultipleContextParameters { .. })
        ));
    }

    #[test]
    fn missing_required_argument() {
        let err = validate_arguments(PARAMS, &Map::new()).unwrap_err();
        assert!(err.contains("item_type"));
    }

    #[test]
    fn null_counts_as_missing() {
        assert!(validate_arguments(PARAMS, &args(json!({"item_type": null}))).is_err());
        assert!(validate_arguments(
            PARAMS,
            &args(json!({"item_type": "Track", "layers": null}))
        )
        .is_ok());
    }

    #[test]
    fn wrong_kind_rejected() {
        let err = validate_arguments(PARAMS, &args(json!({"item_type": 3}))).unwrap_err();
        assert!(err.contains("must be a string"));

        let err = validate_arguments(
            PARAMS,
            &args(json!({"item_type": "Track", "layers": ["F.Cu", 2]})),
        )
        .unwrap_err();
        assert!(err.contains("array of strings"));
    }

    #[test]
    fn caller_cannot_fill_context() {
        let err =
            validate_arguments(PARAMS, &args(json!({"item_type": "Track", "ctx": {}}))).unwrap_err();
        assert!(err.contains("supplied by the server"));
    }

    #[test]
    fn extra_arguments_tolerated() {
        assert!(validate_arguments(PARAMS, &args(json!({"item_type": "Via", "extra": 1}))).is_ok());
    }
}
