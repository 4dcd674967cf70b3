//! The tool table published over `tools/list` and dispatched by `tools/call`.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{RegistrationError, ToolError};
use crate::mcp::context::ToolContext;
use crate::mcp::params::{self, ParamSpec};

/// Tool name grammar accepted by MCP clients.
const TOOL_NAME_PATTERN: &str = r"^[A-Za-z0-9_-]{1,64}$";

/// Returns `true` if `name` is a valid MCP tool name.
#[must_use]
pub fn is_valid_tool_name(name: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(TOOL_NAME_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

/// A tool definition for the `tools/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Base64 image payload carried alongside a tool's JSON output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Base64-encoded image bytes.
    pub data: String,
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
}

/// What a tool handler hands back to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Structured JSON result.
    pub value: Value,
    /// Whether the result describes a failure.
    pub is_error: bool,
    /// Image content to send next to the JSON.
    pub image: Option<ImageData>,
}

impl ToolOutput {
    /// A successful JSON result.
    #[must_use]
    pub const fn json(value: Value) -> Self {
        Self {
            value,
            is_error: false,
            image: None,
        }
    }

    /// A JSON result flagged as an error.
    #[must_use]
    pub const fn failed(value: Value) -> Self {
        Self {
            value,
            is_error: true,
            image: None,
        }
    }

    /// Attaches image content.
    #[must_use]
    pub fn with_image(mut self, image: ImageData) -> Self {
        self.image = Some(image);
        self
    }
}

/// Boxed tool body.
pub type ToolHandler =
    Box<dyn Fn(&ToolContext, &Map<String, Value>) -> Result<ToolOutput, ToolError> + Send + Sync>;

struct RegisteredTool {
    definition: ToolDefinition,
    params: &'static [ParamSpec],
    handler: ToolHandler,
}

/// Published tools in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a tool.
    ///
    /// The input schema is derived from `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, or the parameter
    /// declarations are inconsistent.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        params: &'static [ParamSpec],
        handler: ToolHandler,
    ) -> Result<(), RegistrationError> {
        if !is_valid_tool_name(name) {
            return Err(RegistrationError::InvalidName {
                name: name.to_string(),
            });
        }
        params::validate_specs(name, params)?;
        if self.tools.contains_key(name) {
            return Err(RegistrationError::DuplicateTool {
                name: name.to_string(),
            });
        }

        let definition = ToolDefinition {
            name: name.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            input_schema: params::input_schema(params),
        };

        tracing::debug!(tool = name, "Registered tool");
        self.tools.insert(
            name.to_string(),
            RegisteredTool {
                definition,
                params,
                handler,
            },
        );
        Ok(())
    }

    /// Returns `true` if a tool with this name is published.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns the number of published tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if nothing is published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns the published tool names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// Returns the definitions for `tools/list`.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition.clone()).collect()
    }

    /// Validates `arguments` and invokes the named tool.
    ///
    /// A `null` argument value is treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool is unknown, the arguments don't match
    /// its declaration, or the handler itself fails.
    pub fn call(
        &self,
        name: &str,
        ctx: &ToolContext,
        arguments: &Value,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let empty = Map::new();
        let args = match arguments {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => {
                return Err(ToolError::InvalidArguments {
                    tool: name.to_string(),
                    message: "arguments must be an object".to_string(),
                })
            }
        };

        params::validate_arguments(tool.params, args).map_err(|message| {
            ToolError::InvalidArguments {
                tool: name.to_string(),
                message,
            }
        })?;

        tracing::debug!(tool = name, "Invoking tool");
        (tool.handler)(ctx, args)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::mcp::params::ParamKind;

    const ECHO_PARAMS: &[ParamSpec] = &[ParamSpec::required("text", ParamKind::String, "Text")];

    fn echo() -> ToolHandler {
        Box::new(|_ctx: &ToolContext, args: &Map<String, Value>| Ok(ToolOutput::json(json!({"echo": args["text"]}))))
    }

    #[test]
    fn tool_name_grammar() {
        assert!(is_valid_tool_name("create_item_step_1"));
        assert!(is_valid_tool_name("a-b"));
        assert!(is_valid_tool_name(&"x".repeat(64)));
        assert!(!is_valid_tool_name(""));
        assert!(!is_valid_tool_name(&"x".repeat(65)));
        assert!(!is_valid_tool_name("has space"));
        assert!(!is_valid_tool_name("dotted.name"));
        assert!(!is_valid_tool_name("trailing\n"));
    }

    #[test]
    fn register_and_list() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", "Echo text", ECHO_PARAMS, echo()).unwrap();
        registry.register("silent", "", &[], echo()).unwrap();

        let defs = registry.definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "echo");
        assert_eq!(defs[0].description.as_deref(), Some("Echo text"));
        assert_eq!(defs[0].input_schema["required"], json!(["text"]));
        assert!(defs[1].description.is_none());

        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, ["echo", "silent"]);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", "", ECHO_PARAMS, echo()).unwrap();
        assert_eq!(
            registry.register("echo", "", ECHO_PARAMS, echo()),
            Err(RegistrationError::DuplicateTool {
                name: "echo".to_string()
            })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn invalid_name_rejected() {
        let mut registry = ToolRegistry::new();
        assert!(matches!(
            registry.register("bad name", "", &[], echo()),
            Err(RegistrationError::InvalidName { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn call_validates_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", "", ECHO_PARAMS, echo()).unwrap();
        let ctx = ToolContext::detached();

        let out = registry.call("echo", &ctx, &json!({"text": "hi"})).unwrap();
        assert_eq!(out.value, json!({"echo": "hi"}));
        assert!(!out.is_error);

        assert!(matches!(
            registry.call("echo", &ctx, &json!({})),
            Err(ToolError::InvalidArguments { .. })
        ));
        assert!(matches!(
            registry.call("echo", &ctx, &json!([1])),
            Err(ToolError::InvalidArguments { .. })
        ));
        assert!(matches!(
            registry.call("missing", &ctx, &Value::Null),
            Err(ToolError::NotFound(_))
        ));
    }

    #[test]
    fn null_arguments_are_empty() {
        let mut registry = ToolRegistry::new();
        registry
            .register("noop", "", &[], Box::new(|_: &ToolContext, args: &Map<String, Value>| {
                    Ok(ToolOutput::json(json!(args.len())))
                }))
            .unwrap();
        let out = registry
            .call("noop", &ToolContext::detached(), &Value::Null)
            .unwrap();
        assert_eq!(out.value, json!(0));
    }
}
