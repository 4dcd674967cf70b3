//! Action declarations and the inputs a step receives.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::error::FlowError;
use crate::error::RegistrationError;
use crate::mcp::context::ToolContext;
use crate::mcp::params::{self, ParamSpec};
use crate::mcp::registry::is_valid_tool_name;
use crate::pcb::{Board, ItemType};

/// Static declaration of one flow action.
#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
    /// Tool name the action is published under.
    pub name: &'static str,
    /// Description shown to callers.
    pub description: &'static str,
    /// Declared parameters, in order.
    pub params: &'static [ParamSpec],
}

impl ActionSpec {
    /// Checks the declaration.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name, a repeated parameter, or more
    /// than one context parameter.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if !is_valid_tool_name(self.name) {
            return Err(RegistrationError::InvalidName {
                name: self.name.to_string(),
            });
        }
        params::validate_specs(self.name, self.params)
    }

    /// Returns `true` if the step wants the invocation context.
    #[must_use]
    pub fn declares_context(&self) -> bool {
        self.params.iter().any(ParamSpec::is_context)
    }

    /// Returns the JSON input schema, without the context parameter.
    #[must_use]
    pub fn input_schema(&self) -> Value {
        params::input_schema(self.params)
    }
}

/// State carried between the steps of one flow run.
///
/// Cleared whenever the flow's first action runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowContext {
    item_type: Option<ItemType>,
}

impl FlowContext {
    /// Returns the item type chosen earlier in this run.
    #[must_use]
    pub const fn item_type(&self) -> Option<ItemType> {
        self.item_type
    }

    /// Records the item type the run operates on.
    pub fn select_item_type(&mut self, item_type: ItemType) {
        self.item_type = Some(item_type);
    }

    /// Starts a new run.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything a step gets for one invocation.
pub struct StepInput<'a> {
    /// Board handle fetched for this invocation.
    pub board: Arc<dyn Board>,
    /// Caller arguments, already checked against the declaration.
    pub args: &'a Map<String, Value>,
    /// The flow's context.
    pub context: &'a mut FlowContext,
    /// Invocation context, present only if the action declares one.
    pub call: Option<&'a ToolContext>,
}

impl StepInput<'_> {
    /// Returns a required string argument.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidArguments`] if it is missing or not a string.
    pub fn str_arg(&self, name: &str) -> Result<&str, FlowError> {
        self.args
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| FlowError::invalid(format!("'{name}' must be a string")))
    }

    /// Returns a required object argument.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidArguments`] if it is missing or not an object.
    pub fn object_arg(&self, name: &str) -> Result<&Map<String, Value>, FlowError> {
        self.args
            .get(name)
            .and_then(Value::as_object)
            .ok_or_else(|| FlowError::invalid(format!("'{name}' must be an object")))
    }

    /// Returns an optional argument, treating `null` as absent.
    #[must_use]
    pub fn optional_arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name).filter(|v| !v.is_null())
    }

    /// Parses a required item-type argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is missing or names no known type.
    pub fn item_type_arg(&self, name: &str) -> Result<ItemType, FlowError> {
        Ok(self.str_arg(name)?.parse::<ItemType>()?)
    }

    /// Resolves the item type for a commit step.
    ///
    /// An explicit `item_type` argument wins over the type recorded in the
    /// flow context, and is recorded in turn.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::MissingItemType`] if neither is present.
    pub fn resolve_item_type(&mut self, describe_step: &'static str) -> Result<ItemType, FlowError> {
        if self.optional_arg("item_type").is_some() {
            let item_type = self.item_type_arg("item_type")?;
            self.context.select_item_type(item_type);
            return Ok(item_type);
        }
        self.context
            .item_type()
            .ok_or(FlowError::MissingItemType {
                step: describe_step,
            })
    }
}
