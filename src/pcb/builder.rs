//! Conversion between flat argument mappings and typed board items.
//!
//! Callers describe items as JSON objects whose keys are the item's field
//! names. Nested objects and lists map onto nested fields, and enumerated
//! fields accept their string names.

use serde_json::{Map, Value};

use super::error::SchemaError;
use super::items::{
    ArcTrack, BoardItem, BoardShape, BoardText, Footprint, ItemType, Track, Via, Zone,
};

/// Keys callers may never set through an argument mapping.
const RESERVED_KEYS: [&str; 2] = ["id", "type"];

/// Builds a new item of `item_type` from `args`.
///
/// Any `id` in `args` is discarded; the engine assigns one on creation.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidArguments`] if a required field is missing
/// or a value has the wrong shape.
pub fn build_item(item_type: ItemType, args: &Map<String, Value>) -> Result<BoardItem, SchemaError> {
    let mut fields = args.clone();
    for key in RESERVED_KEYS {
        fields.remove(key);
    }
    fields.insert("type".to_string(), Value::String(item_type.name().to_string()));

    let item: BoardItem = serde_json::from_value(Value::Object(fields)).map_err(|e| {
        SchemaError::InvalidArguments {
            item_type,
            message: e.to_string(),
        }
    })?;
    Ok(item)
}

/// Returns a copy of `item` with the top-level fields present in `args`
/// overwritten.
///
/// Fields absent from `args` keep their current values. A nested value
/// replaces the whole field. Reserved and unknown keys are ignored.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidArguments`] if an overwritten value does not
/// fit its field.
pub fn overwrite_fields(
    item: &BoardItem,
    args: &Map<String, Value>,
) -> Result<BoardItem, SchemaError> {
    let item_type = item.item_type();
    let invalid = |message: String| SchemaError::InvalidArguments { item_type, message };

    let Value::Object(mut fields) = serde_json::to_value(item).map_err(|e| invalid(e.to_string()))?
    else {
        return Err(invalid("item did not serialise to an object".to_string()));
    };

    for (key, value) in args {
        if RESERVED_KEYS.contains(&key.as_str()) {
            tracing::debug!(field = %key, "Ignoring reserved field in edit");
            continue;
        }
        if !is_known_field(item_type, key, &fields) {
            tracing::warn!(item_type = %item_type, field = %key, "Ignoring unknown field in edit");
            continue;
        }
        fields.insert(key.clone(), value.clone());
    }

    serde_json::from_value(Value::Object(fields)).map_err(|e| invalid(e.to_string()))
}

/// Returns `true` if `key` names a field of `item_type`.
///
/// Optional fields that are currently unset do not appear in `current`, so
/// the type's schema is consulted as well.
fn is_known_field(item_type: ItemType, key: &str, current: &Map<String, Value>) -> bool {
    if current.contains_key(key) {
        return true;
    }
    item_type_schema(item_type)
        .ok()
        .and_then(|schema| schema.get("properties").and_then(Value::as_object).cloned())
        .is_some_and(|props| props.contains_key(key))
}

/// Returns the JSON schema describing the arguments of `item_type`.
///
/// # Errors
///
/// Returns [`SchemaError::Generation`] if the schema cannot be serialised.
pub fn item_type_schema(item_type: ItemType) -> Result<Value, SchemaError> {
    let schema = match item_type {
        ItemType::Track => schemars::schema_for!(Track),
        ItemType::ArcTrack => schemars::schema_for!(ArcTrack),
        ItemType::Via => schemars::schema_for!(Via),
        ItemType::Footprint => schemars::schema_for!(Footprint),
        ItemType::Zone => schemars::schema_for!(Zone),
        ItemType::BoardText => schemars::schema_for!(BoardText),
        ItemType::BoardShape => schemars::schema_for!(BoardShape),
    };

    serde_json::to_value(schema).map_err(|e| SchemaError::Generation {
        item_type,
        message: e.to_string(),
    })
}
