//! Create-item flow: pick a type, read its argument schema, commit the item.

use std::sync::Arc;

use crate::error::RegistrationError;
use crate::flow::{ActionRegistrar, ActionSpec, Flow, FlowError, StepInput, StepResult};
use crate::mcp::{ParamKind, ParamSpec, ToolRegistry};
use crate::pcb::builder::{build_item, item_type_schema};

use super::{committed, list_item_types, Services};

const STEP_1: ActionSpec = ActionSpec {
    name: "create_item_step_1",
    description: "Entry point for creating a board item. Returns the valid item types. \
                  If you already know the type, call create_item_step_2 directly.",
    params: &[],
};

const STEP_2: ActionSpec = ActionSpec {
    name: "create_item_step_2",
    description: "Returns the JSON schema of the arguments needed to create an item of \
                  the given type. Coordinates and lengths are integer nanometres.",
    params: &[ParamSpec::required(
        "item_type",
        ParamKind::String,
        "Item type, e.g. 'Track', 'Via', 'Footprint'",
    )],
};

const STEP_3: ActionSpec = ActionSpec {
    name: "create_item_step_3",
    description: "Creates the item on the board from the argument mapping and returns its id.",
    params: &[
        ParamSpec::required("item_type", ParamKind::String, "Item type"),
        ParamSpec::required(
            "args",
            ParamKind::Object,
            "Field values matching the schema from create_item_step_2",
        ),
    ],
};

/// The create-item flow.
#[derive(Debug)]
pub struct CreateItemFlow {
    flow: Arc<Flow>,
}

impl CreateItemFlow {
    /// Flow name.
    pub const NAME: &'static str = "create_item";

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

fn describe(step: StepInput<'_>) -> StepResult {
    let item_type = step.item_type_arg("item_type")?;
    Ok(item_type_schema(item_type)?)
}

fn commit(step: StepInput<'_>) -> StepResult {
    let item_type = step.item_type_arg("item_type")?;
    let item = build_item(item_type, step.object_arg("args")?)?;

    let created = step
        .board
        .create_items(vec![item])
        .map_err(|e| FlowError::runtime("Failed to create the item", e))?;
    let item = created
        .first()
        .ok_or_else(|| FlowError::runtime("Failed to create the item", "engine returned nothing"))?;

    tracing::info!(item_type = %item_type, id = %item.id(), "Created item");
    committed(item)
}
