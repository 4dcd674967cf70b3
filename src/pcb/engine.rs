//! The CAD engine interface consumed by the tools.
//!
//! The flows only ever talk to these traits. [`super::memory`] provides the
//! in-process implementation used by the server binary.

use std::sync::Arc;

use serde::Serialize;

use super::error::BoardResult;
use super::items::{BoardItem, ItemId, ItemType};

/// Outcome of a bulk removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalResult {
    /// Ids that were removed.
    pub removed: Vec<ItemId>,
    /// Ids that did not exist on the board.
    pub not_found: Vec<ItemId>,
}

/// A live handle to an open board.
pub trait Board: Send + Sync {
    /// Returns the board's name.
    fn name(&self) -> String;

    /// Returns every item of the given type.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot enumerate this type.
    fn get_items(&self, item_type: ItemType) -> BoardResult<Vec<BoardItem>>;

    /// Adds items to the board and returns them with their assigned ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects any item.
    fn create_items(&self, items: Vec<BoardItem>) -> BoardResult<Vec<BoardItem>>;

    /// Replaces existing items (matched by id) and returns them.
    ///
    /// # Errors
    ///
    /// Returns an error if an item does not exist or is rejected.
    fn update_items(&self, items: Vec<BoardItem>) -> BoardResult<Vec<BoardItem>>;

    /// Removes items by id in a single operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the removal.
    fn remove_items_by_id(&self, ids: &[ItemId]) -> BoardResult<RemovalResult>;

    /// Looks an item up by type and id.
    ///
    /// Engines without a direct lookup get this scan over [`Board::get_items`].
    ///
    /// # Errors
    ///
    /// Returns an error if enumeration fails.
    fn item_by_id(&self, item_type: ItemType, id: &ItemId) -> BoardResult<Option<BoardItem>> {
        Ok(self
            .get_items(item_type)?
            .into_iter()
            .find(|item| item.id() == id))
    }
}

/// Entry point into the CAD application.
pub trait CadEngine: Send + Sync {
    /// Returns the currently open board.
    ///
    /// # Errors
    ///
    /// Returns an error if no board is available.
    fn get_board(&self) -> BoardResult<Arc<dyn Board>>;
}
