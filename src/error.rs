//! Error types for kicad-pcb-mcp.
//!
//! Board, schema and rendering errors live in [`crate::pcb::error`]; flow
//! step errors live in [`crate::flow::FlowError`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while wiring tools into the registry at startup.
///
/// Any of these aborts server construction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistrationError {
    /// Tool name does not match `^[A-Za-z0-9_-]{1,64}$`.
    #[error("invalid tool name '{name}': must be 1-64 characters of [A-Za-z0-9_-]")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// A tool with this name is already published.
    #[error("tool '{name}' is already registered")]
    DuplicateTool {
        /// The tool name.
        name: String,
    },

    /// A flow registered the same action twice.
    #[error("action '{action}' is already part of flow '{flow}'")]
    DuplicateAction {
        /// The flow name.
        flow: String,
        /// The action name.
        action: String,
    },

    /// A parameter name appears twice in one declaration.
    #[error("tool '{tool}' declares parameter '{param}' more than once")]
    DuplicateParameter {
        /// The tool name.
        tool: String,
        /// The repeated parameter.
        param: String,
    },

    /// More than one invocation-context slot was declared.
    #[error("tool '{tool}' declares more than one context parameter")]
    MultipleContextParameters {
        /// The tool name.
        tool: String,
    },
}

/// Errors surfaced by the tool registry to the MCP layer.
#[derive(Error, Debug)]
pub enum ToolError {
    /// No tool is published under this name.
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// Arguments did not match the tool's declared parameters.
    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments {
        /// The tool name.
        tool: String,
        /// What was wrong.
        message: String,
    },

    /// The handler failed outside of any flow envelope.
    #[error("{0}")]
    Execution(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid setting"));
    }

    #[test]
    fn registration_error_display() {
        let error = RegistrationError::DuplicateAction {
            flow: "create_item".to_string(),
            action: "create_item_step_1".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("create_item_step_1"));
        assert!(msg.contains("already part of flow"));
    }

    #[test]
    fn tool_error_display() {
        let error = ToolError::InvalidArguments {
            tool: "remove_item_step_1".to_string(),
            message: "Missing required parameter: item_ids".to_string(),
        };
        assert!(error.to_string().contains("item_ids"));
        assert_eq!(ToolError::NotFound("x".into()).to_string(), "Unknown tool: x");
    }
}
