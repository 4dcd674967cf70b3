//! Move-item flow: pick a type, list its items, offset one of them.
//!
//! All offsets are relative. `xy_nm` moves the whole item and `angle` is
//! added to its orientation. A `Track` additionally takes `start` and `end`
//! offsets that move each endpoint independently.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::error::RegistrationError;
use crate::flow::{ActionRegistrar, ActionSpec, Flow, FlowError, StepInput, StepResult};
use crate::mcp::{ParamKind, ParamSpec, ToolRegistry};
use crate::pcb::{Angle, BoardError, BoardItem, ItemId, Vector2};

use super::{committed, items_by_id, list_item_types, Services};

const STEP_1: ActionSpec = ActionSpec {
    name: "move_item_step_1",
    description: "Entry point for moving a board item. Returns the valid item types. \
                  If you already know the type, call move_item_step_2 directly.",
    params: &[],
};

const STEP_2: ActionSpec = ActionSpec {
    name: "move_item_step_2",
    description: "Lists the items of the given type keyed by id.",
    params: &[ParamSpec::required(
        "item_type",
        ParamKind::String,
        "Item type, e.g. 'Track', 'Via', 'Footprint'",
    )],
};

const STEP_3: ActionSpec = ActionSpec {
    name: "move_item_step_3",
    description: "Moves an item by relative offsets. args: {xy_nm: [x, y], angle: degrees} \
                  for most items; a Track takes {start: [x, y], end: [x, y]} to move each \
                  endpoint. Offsets are integer nanometres.",
    params: &[
        ParamSpec::required("item_id", ParamKind::String, "Id of the item to move"),
        ParamSpec::required("args", ParamKind::Object, "Relative offsets"),
        ParamSpec::optional(
            "item_type",
            ParamKind::String,
            "Item type; defaults to the one chosen in move_item_step_2",
        ),
    ],
};

/// An offset written as `[x, y]` or `{"x_nm": x, "y_nm": y}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum Offset {
    Pair([i64; 2]),
    Vector(Vector2),
}

impl From<Offset> for Vector2 {
    fn from(offset: Offset) -> Self {
        match offset {
            Offset::Pair([x, y]) => Self::from_xy(x, y),
            Offset::Vector(v) => v,
        }
    }
}

/// Relative move requested by the caller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct MoveArgs {
    #[serde(default)]
    xy_nm: Option<Offset>,
    #[serde(default)]
    angle: Option<f64>,
    #[serde(default)]
    start: Option<Offset>,
    #[serde(default)]
    end: Option<Offset>,
}

impl MoveArgs {
    fn parse(args: &serde_json::Map<String, Value>) -> Result<Self, FlowError> {
        serde_json::from_value(Value::Object(args.clone()))
            .map_err(|e| FlowError::invalid(format!("Invalid move arguments: {e}")))
    }

    /// Applies the offsets to `item`.
    fn apply(&self, item: &mut BoardItem) -> Result<(), FlowError> {
        if let BoardItem::Track(track) = &mut *item {
            if let Some(start) = self.start {
                track.start += Vector2::from(start);
            }
            if let Some(end) = self.end {
                track.end += Vector2::from(end);
            }
        } else if self.start.is_some() || self.end.is_some() {
            return Err(FlowError::invalid(format!(
                "start/end offsets only apply to Track items, not {}",
                item.item_type()
            )));
        }

        if let Some(xy) = self.xy_nm {
            item.translate(Vector2::from(xy));
        }
        if let Some(degrees) = self.angle {
            item.rotate(Angle::from_degrees(degrees))?;
        }
        Ok(())
    }
}

/// The move-item flow.
#[derive(Debug)]
pub struct MoveItemFlow {
    flow: Arc<Flow>,
}

impl MoveItemFlow {
    /// Flow name.
    pub const NAME: &'static str = "move_item";

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
    items_by_id(items)
}

fn commit(mut step: StepInput<'_>) -> StepResult {
    let item_type = step.resolve_item_type(STEP_2.name)?;
    let id = ItemId::from(step.str_arg("item_id")?);
    let offsets = MoveArgs::parse(step.object_arg("args")?)?;

    let mut item = step
        .board
        .item_by_id(item_type, &id)
        .map_err(|e| FlowError::runtime("Failed to look up the item", e))?
        .ok_or(BoardError::ItemNotFound { id })?;
    offsets.apply(&mut item)?;

    let updated = step
        .board
        .update_items(vec![item])
        .map_err(|e| FlowError::runtime("Failed to move the item", e))?;
    let item = updated
        .first()
        .ok_or_else(|| FlowError::runtime("Failed to move the item", "engine returned nothing"))?;

    tracing::info!(item_type = %item_type, id = %item.id(), "Moved item");
    committed(item)
}
