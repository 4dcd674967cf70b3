//! Board item types.
//!
//! Every item carries a stable [`ItemId`]. Items serialise as JSON objects
//! tagged with a `"type"` field naming their [`ItemType`], which is also the
//! format of the board file and of tool results.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::error::{BoardError, SchemaError};
use super::geometry::{Angle, Vector2};

/// Stable identifier of a board item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no identifier has been assigned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The kinds of item that live on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ItemType {
    /// Straight copper track segment.
    Track,
    /// Curved copper track through three points.
    ArcTrack,
    /// Plated via between copper layers.
    Via,
    /// Placed component footprint.
    Footprint,
    /// Copper zone (pour).
    Zone,
    /// Free text on the board.
    BoardText,
    /// Graphic shape (segment, rectangle, circle).
    BoardShape,
}

impl ItemType {
    /// All item types, in the order they are offered to callers.
    pub const ALL: [Self; 7] = [
        Self::Track,
        Self::ArcTrack,
        Self::Via,
        Self::Footprint,
        Self::Zone,
        Self::BoardText,
        Self::BoardShape,
    ];

    /// Returns the canonical type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Track => "Track",
            Self::ArcTrack => "ArcTrack",
            Self::Via => "Via",
            Self::Footprint => "Footprint",
            Self::Zone => "Zone",
            Self::BoardText => "BoardText",
            Self::BoardShape => "BoardShape",
        }
    }

    /// Returns the names of every item type.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.name()).collect()
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ItemType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SchemaError::UnknownItemType {
                name: s.to_string(),
                valid: Self::names().join(", "),
            })
    }
}

/// Board layers, named as the engine names them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum BoardLayer {
    /// Front copper.
    #[default]
    #[serde(rename = "F.Cu")]
    FrontCopper,
    /// First inner copper layer.
    #[serde(rename = "In1.Cu")]
    Inner1Copper,
    /// Second inner copper layer.
    #[serde(rename = "In2.Cu")]
    Inner2Copper,
    /// Back copper.
    #[serde(rename = "B.Cu")]
    BackCopper,
    /// Front silkscreen.
    #[serde(rename = "F.SilkS")]
    FrontSilkscreen,
    /// Back silkscreen.
    #[serde(rename = "B.SilkS")]
    BackSilkscreen,
    /// Front solder mask.
    #[serde(rename = "F.Mask")]
    FrontMask,
    /// Back solder mask.
    #[serde(rename = "B.Mask")]
    BackMask,
    /// Front fabrication.
    #[serde(rename = "F.Fab")]
    FrontFab,
    /// Back fabrication.
    #[serde(rename = "B.Fab")]
    BackFab,
    /// Front courtyard.
    #[serde(rename = "F.CrtYd")]
    FrontCourtyard,
    /// Back courtyard.
    #[serde(rename = "B.CrtYd")]
    BackCourtyard,
    /// Board outline.
    #[serde(rename = "Edge.Cuts")]
    EdgeCuts,
}

impl BoardLayer {
    /// All layers, front to back.
    pub const ALL: [Self; 13] = [
        Self::FrontCopper,
        Self::Inner1Copper,
        Self::Inner2Copper,
        Self::BackCopper,
        Self::FrontSilkscreen,
        Self::BackSilkscreen,
        Self::FrontMask,
        Self::BackMask,
        Self::FrontFab,
        Self::BackFab,
        Self::FrontCourtyard,
        Self::BackCourtyard,
        Self::EdgeCuts,
    ];

    /// Returns the engine's name for this layer.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FrontCopper => "F.Cu",
            Self::Inner1Copper => "In1.Cu",
            Self::Inner2Copper => "In2.Cu",
            Self::BackCopper => "B.Cu",
            Self::FrontSilkscreen => "F.SilkS",
            Self::BackSilkscreen => "B.SilkS",
            Self::FrontMask => "F.Mask",
            Self::BackMask => "B.Mask",
            Self::FrontFab => "F.Fab",
            Self::BackFab => "B.Fab",
            Self::FrontCourtyard => "F.CrtYd",
            Self::BackCourtyard => "B.CrtYd",
            Self::EdgeCuts => "Edge.Cuts",
        }
    }

    /// Returns `true` for copper layers.
    #[must_use]
    pub const fn is_copper(self) -> bool {
        matches!(
            self,
            Self::FrontCopper | Self::Inner1Copper | Self::Inner2Copper | Self::BackCopper
        )
    }
}

impl fmt::Display for BoardLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoardLayer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown layer '{s}'"))
    }
}

/// Default track width (0.25 mm).
const fn default_track_width() -> i64 {
    250_000
}

/// Default via pad diameter (0.6 mm).
const fn default_via_diameter() -> i64 {
    600_000
}

/// Default via drill diameter (0.3 mm).
const fn default_via_drill() -> i64 {
    300_000
}

/// Default text height (1 mm).
const fn default_text_size() -> i64 {
    1_000_000
}

/// Default graphic line width (0.15 mm).
const fn default_shape_width() -> i64 {
    150_000
}

const fn default_silkscreen() -> BoardLayer {
    BoardLayer::FrontSilkscreen
}

/// A straight copper track segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Track {
    /// Item identifier (assigned by the engine on creation).
    #[serde(default)]
    pub id: ItemId,
    /// Start point.
    pub start: Vector2,
    /// End point.
    pub end: Vector2,
    /// Track width in nm.
    #[serde(default = "default_track_width")]
    pub width_nm: i64,
    /// Copper layer.
    #[serde(default)]
    pub layer: BoardLayer,
    /// Net name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<String>,
    /// Whether the track is locked against edits in the editor.
    #[serde(default)]
    pub locked: bool,
}

/// A curved copper track defined by start, mid and end points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ArcTrack {
    /// Item identifier.
    #[serde(default)]
    pub id: ItemId,
    /// Start point.
    pub start: Vector2,
    /// A point on the arc between start and end.
    pub mid: Vector2,
    /// End point.
    pub end: Vector2,
    /// Track width in nm.
    #[serde(default = "default_track_width")]
    pub width_nm: i64,
    /// Copper layer.
    #[serde(default)]
    pub layer: BoardLayer,
    /// Net name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<String>,
}

/// Via construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViaType {
    /// Drilled through every layer.
    #[default]
    Through,
    /// Blind or buried between inner layers.
    BlindBuried,
    /// Laser-drilled microvia.
    Micro,
}

/// A plated via.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Via {
    /// Item identifier.
    #[serde(default)]
    pub id: ItemId,
    /// Centre of the via.
    pub position: Vector2,
    /// Pad diameter in nm.
    #[serde(default = "default_via_diameter")]
    pub diameter_nm: i64,
    /// Drill diameter in nm.
    #[serde(default = "default_via_drill")]
    pub drill_nm: i64,
    /// Via construction.
    #[serde(default)]
    pub via_type: ViaType,
    /// Net name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<String>,
    /// Whether the via is locked.
    #[serde(default)]
    pub locked: bool,
}

/// A placed footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Footprint {
    /// Item identifier.
    #[serde(default)]
    pub id: ItemId,
    /// Reference designator (e.g. "R1").
    pub reference: String,
    /// Value field (e.g. "10k").
    #[serde(default)]
    pub value: String,
    /// Library link (e.g. "Resistor_SMD:R_0603_1608Metric").
    #[serde(default)]
    pub library_link: String,
    /// Anchor position.
    pub position: Vector2,
    /// Orientation.
    #[serde(default)]
    pub orientation: Angle,
    /// Side of the board ("F.Cu" or "B.Cu").
    #[serde(default)]
    pub layer: BoardLayer,
    /// Whether the footprint is locked.
    #[serde(default)]
    pub locked: bool,
}

/// Zone fill style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ZoneFillMode {
    /// Solid copper.
    #[default]
    Solid,
    /// Hatched copper.
    Hatched,
}

/// A copper zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Zone {
    /// Item identifier.
    #[serde(default)]
    pub id: ItemId,
    /// Zone name.
    #[serde(default)]
    pub name: String,
    /// Layers the zone fills.
    pub layers: Vec<BoardLayer>,
    /// Closed outline polygon.
    pub outline: Vec<Vector2>,
    /// Net name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<String>,
    /// Fill priority (higher fills first).
    #[serde(default)]
    pub priority: u32,
    /// Fill style.
    #[serde(default)]
    pub fill_mode: ZoneFillMode,
}

/// Free text on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoardText {
    /// Item identifier.
    #[serde(default)]
    pub id: ItemId,
    /// The text content.
    pub text: String,
    /// Anchor position.
    pub position: Vector2,
    /// Orientation.
    #[serde(default)]
    pub orientation: Angle,
    /// Layer.
    #[serde(default = "default_silkscreen")]
    pub layer: BoardLayer,
    /// Glyph height in nm.
    #[serde(default = "default_text_size")]
    pub size_nm: i64,
}

/// Geometry of a graphic shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Line segment from `start` to `end`.
    #[default]
    Segment,
    /// Axis-aligned rectangle with corners `start` and `end`.
    Rectangle,
    /// Circle centred on `start` passing through `end`.
    Circle,
}

/// A graphic shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoardShape {
    /// Item identifier.
    #[serde(default)]
    pub id: ItemId,
    /// Shape geometry.
    #[serde(default)]
    pub shape: ShapeKind,
    /// First defining point.
    pub start: Vector2,
    /// Second defining point.
    pub end: Vector2,
    /// Line width in nm.
    #[serde(default = "default_shape_width")]
    pub width_nm: i64,
    /// Layer.
    #[serde(default = "default_silkscreen")]
    pub layer: BoardLayer,
    /// Whether the shape is filled.
    #[serde(default)]
    pub filled: bool,
}

/// Any item on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum BoardItem {
    /// See [`Track`].
    Track(Track),
    /// See [`ArcTrack`].
    ArcTrack(ArcTrack),
    /// See [`Via`].
    Via(Via),
    /// See [`Footprint`].
    Footprint(Footprint),
    /// See [`Zone`].
    Zone(Zone),
    /// See [`BoardText`].
    BoardText(BoardText),
    /// See [`BoardShape`].
    BoardShape(BoardShape),
}

impl BoardItem {
    /// Returns the item's identifier.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        match self {
            Self::Track(t) => &t.id,
            Self::ArcTrack(a) => &a.id,
            Self::Via(v) => &v.id,
            Self::Footprint(f) => &f.id,
            Self::Zone(z) => &z.id,
            Self::BoardText(t) => &t.id,
            Self::BoardShape(s) => &s.id,
        }
    }

    /// Replaces the item's identifier.
    pub fn set_id(&mut self, id: ItemId) {
        let slot = match self {
            Self::Track(t) => &mut t.id,
            Self::ArcTrack(a) => &mut a.id,
            Self::Via(v) => &mut v.id,
            Self::Footprint(f) => &mut f.id,
            Self::Zone(z) => &mut z.id,
            Self::BoardText(t) => &mut t.id,
            Self::BoardShape(s) => &mut s.id,
        };
        *slot = id;
    }

    /// Returns the item's type.
    #[must_use]
    pub const fn item_type(&self) -> ItemType {
        match self {
            Self::Track(_) => ItemType::Track,
            Self::ArcTrack(_) => ItemType::ArcTrack,
            Self::Via(_) => ItemType::Via,
            Self::Footprint(_) => ItemType::Footprint,
            Self::Zone(_) => ItemType::Zone,
            Self::BoardText(_) => ItemType::BoardText,
            Self::BoardShape(_) => ItemType::BoardShape,
        }
    }

    /// Returns the layers the item occupies.
    #[must_use]
    pub fn layers(&self) -> Vec<BoardLayer> {
        match self {
            Self::Track(t) => vec![t.layer],
            Self::ArcTrack(a) => vec![a.layer],
            Self::Via(v) => match v.via_type {
                ViaType::Through => BoardLayer::ALL
                    .iter()
                    .copied()
                    .filter(|l| l.is_copper())
                    .collect(),
                ViaType::BlindBuried | ViaType::Micro => {
                    vec![BoardLayer::FrontCopper, BoardLayer::BackCopper]
                }
            },
            Self::Footprint(f) => vec![f.layer],
            Self::Zone(z) => z.layers.clone(),
            Self::BoardText(t) => vec![t.layer],
            Self::BoardShape(s) => vec![s.layer],
        }
    }

    /// Moves the whole item by `delta`.
    ///
    /// Items without a single anchor point have every defining point moved.
    pub fn translate(&mut self, delta: Vector2) {
        match self {
            Self::Track(t) => {
                t.start += delta;
                t.end += delta;
            }
            Self::ArcTrack(a) => {
                a.start += delta;
                a.mid += delta;
                a.end += delta;
            }
            Self::Via(v) => v.position += delta,
            Self::Footprint(f) => f.position += delta,
            Self::Zone(z) => {
                for point in &mut z.outline {
                    *point += delta;
                }
            }
            Self::BoardText(t) => t.position += delta,
            Self::BoardShape(s) => {
                s.start += delta;
                s.end += delta;
            }
        }
    }

    /// Adds `delta` to the item's orientation.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Unsupported`] if the item has no orientation.
    pub fn rotate(&mut self, delta: Angle) -> Result<(), BoardError> {
        match self {
            Self::Footprint(f) => f.orientation += delta,
            Self::BoardText(t) => t.orientation += delta,
            _ => return Err(BoardError::unsupported("rotate", self.item_type())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint() -> BoardItem {
        BoardItem::Footprint(Footprint {
            id: ItemId::from("fp-1"),
            reference: "R1".to_string(),
            value: "10k".to_string(),
            library_link: String::new(),
            position: Vector2::from_xy(10, 10),
            orientation: Angle::default(),
            layer: BoardLayer::FrontCopper,
            locked: false,
        })
    }

    #[test]
    fn item_type_parse_is_case_insensitive() {
        assert_eq!("track".parse::<ItemType>().unwrap(), ItemType::Track);
        assert_eq!("BoardText".parse::<ItemType>().unwrap(), ItemType::BoardText);
    }

    #[test]
    fn item_type_parse_lists_valid_names() {
        let err = "Resistor".parse::<ItemType>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Resistor"));
        assert!(msg.contains("Footprint"));
    }

    #[test]
    fn layer_names_round_trip_through_serde() {
        for layer in BoardLayer::ALL {
            let json = serde_json::to_value(layer).unwrap();
            assert_eq!(json, serde_json::json!(layer.name()));
            assert_eq!(layer.name().parse::<BoardLayer>().unwrap(), layer);
        }
    }

    #[test]
    fn item_serialises_with_type_tag() {
        let json = serde_json::to_value(footprint()).unwrap();
        assert_eq!(json["type"], "Footprint");
        assert_eq!(json["id"], "fp-1");
        assert_eq!(json["position"]["x_nm"], 10);
    }

    #[test]
    fn translate_footprint() {
        let mut item = footprint();
        item.translate(Vector2::from_xy(3, -2));
        let BoardItem::Footprint(fp) = item else {
            panic!("Expected Footprint");
        };
        assert_eq!(fp.position, Vector2::from_xy(13, 8));
    }

    #[test]
    fn rotate_unsupported_for_via() {
        let mut item = BoardItem::Via(Via {
            id: ItemId::from("v"),
            position: Vector2::default(),
            diameter_nm: default_via_diameter(),
            drill_nm: default_via_drill(),
            via_type: ViaType::Through,
            net: None,
            locked: false,
        });
        assert!(item.rotate(Angle::from_degrees(90.0)).is_err());
    }

    #[test]
    fn through_via_spans_all_copper() {
        let item = BoardItem::Via(Via {
            id: ItemId::default(),
            position: Vector2::default(),
            diameter_nm: default_via_diameter(),
            drill_nm: default_via_drill(),
            via_type: ViaType::Through,
            net: None,
            locked: false,
        });
        assert_eq!(item.layers().len(), 4);
        assert!(item.layers().iter().all(|l| l.is_copper()));
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = ItemId::generate();
        let b = ItemId::generate();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }
}
