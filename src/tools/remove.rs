//! Remove-item flow: a single bulk removal by id.

use std::sync::Arc;

use serde_json::Value;

use crate::error::RegistrationError;
use crate::flow::{ActionRegistrar, ActionSpec, Flow, FlowError, StepInput, StepResult};
use crate::mcp::{ParamKind, ParamSpec, ToolRegistry};
use crate::pcb::ItemId;

use super::Services;

const STEP_1: ActionSpec = ActionSpec {
    name: "remove_item_step_1",
    description: "Removes the items with the given ids from the board in one operation. \
                  Returns which ids were removed and which were not found.",
    params: &[ParamSpec::required(
        "item_ids",
        ParamKind::StringArray,
        "Ids of the items to remove",
    )],
};

/// The remove-item flow.
#[derive(Debug)]
pub struct RemoveItemFlow {
    flow: Arc<Flow>,
}

impl RemoveItemFlow {
    /// Flow name.
    pub const NAME: &'static str = "remove_item";

    /// Registers the flow's step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step cannot be registered.
    pub fn register(
        services: &Services,
        registry: &mut ToolRegistry,
    ) -> Result<Self, RegistrationError> {
        let flow = services.flow(Self::NAME);
        ActionRegistrar::new(Arc::clone(&flow), registry).register(&STEP_1, remove)?;
        Ok(Self { flow })
    }

    /// Returns the underlying flow.
    #[must_use]
    pub const fn flow(&self) -> &Arc<Flow> {
        &self.flow
    }
}

fn remove(step: StepInput<'_>) -> StepResult {
    let ids: Vec<ItemId> = step
        .args
        .get("item_ids")
        .and_then(Value::as_array)
        .ok_or_else(|| FlowError::invalid("'item_ids' must be an array of strings"))?
        .iter()
        .filter_map(Value::as_str)
        .map(|s| ItemId::from(s.trim()))
        .collect();

    if ids.is_empty() {
        return Err(FlowError::invalid("'item_ids' must name at least one item"));
    }
    if ids.iter().any(ItemId::is_empty) {
        return Err(FlowError::invalid("'item_ids' must not contain empty ids"));
    }

    let result = step
        .board
        .remove_items_by_id(&ids)
        .map_err(|e| FlowError::runtime("Failed to remove the items", e))?;

    tracing::info!(
        removed = result.removed.len(),
        not_found = result.not_found.len(),
        "Removed items"
    );
    serde_json::to_value(result).map_err(|e| FlowError::runtime("Failed to encode the result", e))
}
