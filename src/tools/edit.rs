//! Edit-item flow: pick a type, list its items, overwrite fields of one item.
//!
//! Only the top-level fields present in `args` change. A nested value such
//! as `position` replaces the whole field. Moving is better done through the
//! move flow, which applies relative offsets.

use std::sync::Arc;

use serde_json::json;

use crate::error::RegistrationError;
use crate::flow::{ActionRegistrar, ActionSpec, Flow, FlowError, StepInput, StepResult};
use crate::mcp::{ParamKind, ParamSpec, ToolRegistry};
use crate::pcb::builder::{item_type_schema, overwrite_fields};
use crate::pcb::{BoardError, ItemId};

use super::{committed, items_by_id, list_item_types, Services};

const STEP_1: ActionSpec = ActionSpec {
    name: "edit_item_step_1",
    description: "Entry point for editing a board item. Returns the valid item types. \
                  If you already know the type, call edit_item_step_2 directly.",
    params: &[],
};

const STEP_2: ActionSpec = ActionSpec {
    name: "edit_item_step_2",
    description: "Lists the items of the given type keyed by id, together with the \
                  type's argument schema.",
    params: &[ParamSpec::required(
        "item_type",
        ParamKind::String,
        "Item type, e.g. 'Track', 'Via', 'Footprint'",
    )],
};

const STEP_3: ActionSpec = ActionSpec {
    name: "edit_item_step_3",
    description: "Overwrites the given top-level fields of an item. Fields not in args \
                  are left untouched. Prefer move_item for position and orientation.",
    params: &[
        ParamSpec::required("item_id", ParamKind::String, "Id of the item to edit"),
        ParamSpec::required("args", ParamKind::Object, "Fields to overwrite"),
        ParamSpec::optional(
            "item_type",
            ParamKind::String,
            "Item type; defaults to the one chosen in edit_item_step_2",
        ),
    ],
};

/// The edit-item flow.
#[derive(Debug)]
pub struct EditItemFlow {
    flow: Arc<Flow>,
}

impl EditItemFlow {
    /// Flow name.
    pub const NAME: &'static str = "edit_item";

    /// Registers the flow's steps.
    ///
    /// # Errors
    ///
    /// Returns an error if any step cannot be registered.
    pub fn register(
        services: &Services,
        registry: &mut ToolRegistry,
    ) -> Result<Self, RegistrationError> {
        let flow = services.flow(Self::NAME);
        let mut registrar = ActionRegistrar::new(Arc::clone(&flow), registry);
        registrar.register(&STEP_1, list_item_types)?;
        registrar.register(&STEP_2, describe)?;
        registrar.register(&STEP_3, commit)?;
        Ok(Self { flow })
    }

    /// Returns the underlying flow.
    #[must_use]
    pub const fn flow(&self) -> &Arc<Flow> {
        &self.flow
    }
}

fn describe(mut step: StepInput<'_>) -> StepResult {
    let item_type = step.item_type_arg("item_type")?;
    let items = step
        .board
        .get_items(item_type)
        .map_err(|e| FlowError::runtime("Failed to list items", e))?;
    step.context.select_item_type(item_type);

    Ok(json!({
        "args": item_type_schema(item_type)?,
        "item_list": items_by_id(items)?,
    }))
}

fn commit(mut step: StepInput<'_>) -> StepResult {
    let item_type = step.resolve_item_type(STEP_2.name)?;
    let id = ItemId::from(step.str_arg("item_id")?);

    let item = step
        .board
        .item_by_id(item_type, &id)
        .map_err(|e| FlowError::runtime("Failed to look up the item", e))?
        .ok_or(BoardError::ItemNotFound { id })?;
    let edited = overwrite_fields(&item, step.object_arg("args")?)?;

    let updated = step
        .board
        .update_items(vec![edited])
        .map_err(|e| FlowError::runtime("Failed to edit the item", e))?;
    let item = updated
        .first()
        .ok_or_else(|| FlowError::runtime("Failed to edit the item", "engine returned nothing"))?;

    tracing::info!(item_type = %item_type, id = %item.id(), "Edited item");
    committed(item)
}
