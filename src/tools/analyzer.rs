//! Read-only board inspection tools.
//!
//! These sit outside any flow: they return plain JSON, never touch a flow
//! context, and report failures as tool errors.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{RegistrationError, ToolError};
use crate::mcp::{ParamKind, ParamSpec, ToolContext, ToolHandler, ToolOutput, ToolRegistry};
use crate::pcb::builder::item_type_schema;
use crate::pcb::{Board, CadEngine, ItemType, SchemaError};

use super::{items_by_id, Services};

const GET_BOARD_STATUS: &str = "get_board_status";
const GET_ITEMS_BY_TYPE: &str = "get_items_by_type";
const GET_ITEM_TYPE_ARGS_HINT: &str = "get_item_type_args_hint";

const ITEM_TYPE_PARAM: &[ParamSpec] = &[ParamSpec::required(
    "item_type",
    ParamKind::String,
    "Item type, e.g. 'Track', 'Via', 'Footprint'",
)];

/// Registers the analyzer tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardAnalyzer;

impl BoardAnalyzer {
    /// Publishes `get_board_status`, `get_items_by_type` and
    /// `get_item_type_args_hint`.
    ///
    /// # Errors
    ///
    /// Returns an error if any tool name is already taken.
    pub fn register(
        services: &Services,
        registry: &mut ToolRegistry,
    ) -> Result<(), RegistrationError> {
        let cad = Arc::clone(&services.cad);
        registry.register(
            GET_BOARD_STATUS,
            "Returns every item on the board grouped by type. Types the engine cannot \
             enumerate are reported as a message instead of a list.",
            &[],
            handler(move |_args| {
                let board = open_board(cad.as_ref())?;
                Ok(board_status(board.as_ref()))
            }),
        )?;

        let cad = Arc::clone(&services.cad);
        registry.register(
            GET_ITEMS_BY_TYPE,
            "Returns the items of one type keyed by id.",
            ITEM_TYPE_PARAM,
            handler(move |args| {
                let item_type = item_type_arg(GET_ITEMS_BY_TYPE, args)?;
                let board = open_board(cad.as_ref())?;
                let items = board
                    .get_items(item_type)
                    .map_err(|e| ToolError::Execution(e.to_string()))?;
                items_by_id(items).map_err(|e| ToolError::Execution(e.to_string()))
            }),
        )?;

        registry.register(
            GET_ITEM_TYPE_ARGS_HINT,
            "Returns the JSON schema of the arguments that describe an item type.",
            ITEM_TYPE_PARAM,
            handler(|args| {
                let item_type = item_type_arg(GET_ITEM_TYPE_ARGS_HINT, args)?;
                item_type_schema(item_type).map_err(|e| ToolError::Execution(e.to_string()))
            }),
        )?;

        Ok(())
    }
}

/// Wraps a JSON-producing closure as a tool handler.
fn handler<F>(f: F) -> ToolHandler
where
    F: Fn(&Map<String, Value>) -> Result<Value, ToolError> + Send + Sync + 'static,
{
    Box::new(move |_call: &ToolContext, args: &Map<String, Value>| f(args).map(ToolOutput::json))
}

fn open_board(cad: &dyn CadEngine) -> Result<Arc<dyn Board>, ToolError> {
    cad.get_board().map_err(|e| ToolError::Execution(e.to_string()))
}

fn item_type_arg(tool: &str, args: &Map<String, Value>) -> Result<ItemType, ToolError> {
    args.get("item_type")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments {
            tool: tool.to_string(),
            message: "'item_type' must be a string".to_string(),
        })?
        .parse()
        .map_err(|e: SchemaError| ToolError::InvalidArguments {
            tool: tool.to_string(),
            message: e.to_string(),
        })
}

/// Enumerates every item type. A type that fails is reported as a string.
fn board_status(board: &dyn Board) -> Value {
    let mut status = Map::new();
    for item_type in ItemType::ALL {
        let entry = board
            .get_items(item_type)
            .map_err(|e| e.to_string())
            .and_then(|items| items_by_id(items).map_err(|e| e.to_string()))
            .unwrap_or_else(|e| {
                tracing::warn!(item_type = %item_type, error = %e, "Item type unavailable");
                Value::String(format!("Not yet implemented, {e}"))
            });
        status.insert(item_type.name().to_string(), entry);
    }
    Value::Object(status)
}
