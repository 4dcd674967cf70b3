//! PCB domain: board items, the CAD engine interface and its collaborators.
//!
//! - [`items`] / [`geometry`] — the typed board item model
//! - [`engine`] — the [`CadEngine`] / [`Board`] traits the tools consume
//! - [`memory`] — an in-memory engine backed by a JSON board file
//! - [`builder`] — argument mapping ⇄ typed item conversion
//! - [`render`] — board image rendering
//!
//! # Units
//!
//! All coordinates and lengths are integer nanometres. Angles are degrees.

pub mod builder;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod items;
pub mod memory;
pub mod render;

pub use engine::{Board, CadEngine, RemovalResult};
pub use error::{BoardError, BoardResult, RenderError, SchemaError};
pub use geometry::{Angle, Vector2};
pub use items::{BoardItem, BoardLayer, ItemId, ItemType};
pub use memory::{MemoryBoard, MemoryEngine};
pub use render::{BoardRenderer, RasterRenderer, RenderedImage};
