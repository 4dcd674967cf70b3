//! The PCB tools published by the server.
//!
//! | Group | Tools |
//! |-------|-------|
//! | Create flow | `create_item_step_1`..`3` |
//! | Edit flow | `edit_item_step_1`..`3` |
//! | Move flow | `move_item_step_1`..`3` |
//! | Remove flow | `remove_item_step_1` |
//! | Verify flow | `verify_pcb_step_1` |
//! | Board analyzer | `get_board_status`, `get_items_by_type`, `get_item_type_args_hint` |
//!
//! Flow tools answer with an [`Envelope`](crate::flow::Envelope); the
//! analyzer tools answer with plain JSON.

pub mod analyzer;
pub mod create;
pub mod edit;
pub mod move_item;
pub mod remove;
pub mod verify;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::RegistrationError;
use crate::flow::{Flow, FlowError, NextActionPolicy, ResponseFormatter, StepInput, StepResult};
use crate::mcp::ToolRegistry;
use crate::pcb::{BoardItem, BoardRenderer, CadEngine, ItemType};

pub use analyzer::BoardAnalyzer;
pub use create::CreateItemFlow;
pub use edit::EditItemFlow;
pub use move_item::MoveItemFlow;
pub use remove::RemoveItemFlow;
pub use verify::VerifyFlow;

/// Domain services shared by every tool group.
#[derive(Clone)]
pub struct Services {
    /// The CAD engine.
    pub cad: Arc<dyn CadEngine>,
    /// Board image renderer.
    pub renderer: Arc<dyn BoardRenderer>,
    /// Next-action anchor for flow envelopes.
    pub next_action: NextActionPolicy,
}

impl Services {
    /// Creates a flow bound to these services.
    #[must_use]
    pub fn flow(&self, name: &'static str) -> Arc<Flow> {
        Flow::new(
            name,
            Arc::clone(&self.cad),
            ResponseFormatter::new(self.next_action),
        )
    }
}

/// Handles to every registered flow.
#[derive(Debug)]
pub struct FlowManagers {
    /// Create-item flow.
    pub create: CreateItemFlow,
    /// Edit-item flow.
    pub edit: EditItemFlow,
    /// Move-item flow.
    pub move_item: MoveItemFlow,
    /// Remove-item flow.
    pub remove: RemoveItemFlow,
    /// Verify flow.
    pub verify: VerifyFlow,
}

/// Registers every flow and the board analyzer.
///
/// # Errors
///
/// Returns the first registration failure. The server must not start with a
/// partial tool table.
pub fn register_all(
    services: &Services,
    registry: &mut ToolRegistry,
) -> Result<FlowManagers, RegistrationError> {
    let managers = FlowManagers {
        create: CreateItemFlow::register(services, registry)?,
        edit: EditItemFlow::register(services, registry)?,
        move_item: MoveItemFlow::register(services, registry)?,
        remove: RemoveItemFlow::register(services, registry)?,
        verify: VerifyFlow::register(services, registry)?,
    };
    BoardAnalyzer::register(services, registry)?;

    tracing::info!(tools = registry.len(), "Registered PCB tools");
    Ok(managers)
}

/// Step 1 shared by the create, edit and move flows.
#[allow(clippy::unnecessary_wraps)] // step signature
fn list_item_types(_step: StepInput<'_>) -> StepResult {
    Ok(Value::from(ItemType::names()))
}

/// Maps items by id.
fn items_by_id(items: Vec<BoardItem>) -> Result<Value, FlowError> {
    let mut map = Map::new();
    for item in items {
        let id = item.id().to_string();
        let value = serde_json::to_value(item)
            .map_err(|e| FlowError::runtime("Failed to encode item", e))?;
        map.insert(id, value);
    }
    Ok(Value::Object(map))
}

/// Builds the commit-step payload.
fn committed(item: &BoardItem) -> Result<Value, FlowError> {
    let value =
        serde_json::to_value(item).map_err(|e| FlowError::runtime("Failed to encode item", e))?;
    Ok(serde_json::json!({
        "item_id": item.id(),
        "item": value,
    }))
}
