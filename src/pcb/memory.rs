//! In-memory board engine backed by an optional JSON board file.
//!
//! # File Format
//!
//! ```text
//! {
//!   "name": "my-board",
//!   "items": [
//!     { "type": "Track", "id": "...", "start": {...}, "end": {...}, ... },
//!     ...
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::engine::{Board, CadEngine, RemovalResult};
use super::error::{BoardError, BoardResult};
use super::items::{BoardItem, ItemId, ItemType};

/// Serialised form of a board file.
#[derive(Debug, Serialize, Deserialize)]
struct BoardFile {
    name: String,
    #[serde(default)]
    items: Vec<BoardItem>,
}

/// A board held entirely in memory.
pub struct MemoryBoard {
    name: String,
    path: Option<PathBuf>,
    autosave: bool,
    items: Mutex<IndexMap<ItemId, BoardItem>>,
}

impl MemoryBoard {
    /// Creates an empty board that is never written to disk.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            autosave: false,
            items: Mutex::new(IndexMap::new()),
        }
    }

    /// Creates a board pre-populated with `items`.
    ///
    /// Items without an id are given a fresh one.
    #[must_use]
    pub fn with_items(name: impl Into<String>, items: Vec<BoardItem>) -> Self {
        let board = Self::new(name);
        {
            let mut map = board.lock();
            for item in items {
                insert_with_fresh_id(&mut map, item);
            }
        }
        board
    }

    /// Opens a board file, or starts an empty board named `fallback_name`
    /// if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: &Path, fallback_name: &str, autosave: bool) -> BoardResult<Self> {
        let mut board = if path.exists() {
            let contents =
                std::fs::read_to_string(path).map_err(|e| BoardError::file_read(path, e))?;
            let file: BoardFile = serde_json::from_str(&contents)
                .map_err(|e| BoardError::invalid_data(format!("{}: {e}", path.display())))?;
            tracing::info!(
                path = %path.display(),
                items = file.items.len(),
                "Loaded board file"
            );
            Self::with_items(file.name, file.items)
        } else {
            tracing::info!(path = %path.display(), "Board file not found, starting empty board");
            Self::new(fallback_name)
        };

        board.path = Some(path.to_path_buf());
        board.autosave = autosave;
        Ok(board)
    }

    /// Returns the number of items on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the board has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Writes the board to its file.
    ///
    /// Does nothing for boards that were not opened from a path.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub fn save(&self) -> BoardResult<()> {
        let map = self.lock();
        self.write_file(&map)
    }

    fn write_file(&self, items: &IndexMap<ItemId, BoardItem>) -> BoardResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = BoardFile {
            name: self.name.clone(),
            items: items.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| BoardError::invalid_data(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| BoardError::file_write(path, e))?;

        tracing::debug!(path = %path.display(), "Saved board file");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<ItemId, BoardItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `change` to a copy of the items. The copy replaces the live
    /// items only after `change` and the autosave write both succeed.
    fn transact<T>(
        &self,
        change: impl FnOnce(&mut IndexMap<ItemId, BoardItem>) -> BoardResult<T>,
    ) -> BoardResult<T> {
        let mut map = self.lock();
        let mut next = map.clone();
        let output = change(&mut next)?;
        if self.autosave {
            self.write_file(&next)?;
        }
        *map = next;
        Ok(output)
    }
}

/// Inserts `item`, assigning a new id if it has none or the id is taken.
fn insert_with_fresh_id(map: &mut IndexMap<ItemId, BoardItem>, mut item: BoardItem) -> BoardItem {
    if item.id().is_empty() || map.contains_key(item.id()) {
        item.set_id(ItemId::generate());
    }
    map.insert(item.id().clone(), item.clone());
    item
}

impl Board for MemoryBoard {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn get_items(&self, item_type: ItemType) -> BoardResult<Vec<BoardItem>> {
        Ok(self
            .lock()
            .values()
            .filter(|item| item.item_type() == item_type)
            .cloned()
            .collect())
    }

    fn create_items(&self, items: Vec<BoardItem>) -> BoardResult<Vec<BoardItem>> {
        self.transact(|map| {
            Ok(items
                .into_iter()
                .map(|item| insert_with_fresh_id(map, item))
                .collect())
        })
    }

    fn update_items(&self, items: Vec<BoardItem>) -> BoardResult<Vec<BoardItem>> {
        self.transact(|map| {
            for item in &items {
                match map.get(item.id()) {
                    None => return Err(BoardError::ItemNotFound {
                        id: item.id().clone(),
                    }),
                    Some(existing) if existing.item_type() != item.item_type() => {
                        return Err(BoardError::invalid_data(format!(
                            "item {} is a {}, not a {}",
                            item.id(),
                            existing.item_type(),
                            item.item_type()
                        )));
                    }
                    Some(_) => {}
                }
            }

            for item in &items {
                map.insert(item.id().clone(), item.clone());
            }
            Ok(())
        })?;
        Ok(items)
    }

    fn remove_items_by_id(&self, ids: &[ItemId]) -> BoardResult<RemovalResult> {
        self.transact(|map| {
            let mut result = RemovalResult::default();
            for id in ids {
                if map.shift_remove(id).is_some() {
                    result.removed.push(id.clone());
                } else {
                    result.not_found.push(id.clone());
                }
            }
            Ok(result)
        })
    }

    fn item_by_id(&self, item_type: ItemType, id: &ItemId) -> BoardResult<Option<BoardItem>> {
        Ok(self
            .lock()
            .get(id)
            .filter(|item| item.item_type() == item_type)
            .cloned())
    }
}

/// A CAD engine with a single, always-open in-memory board.
pub struct MemoryEngine {
    board: Arc<MemoryBoard>,
}

impl MemoryEngine {
    /// Wraps an existing board.
    #[must_use]
    pub fn new(board: MemoryBoard) -> Self {
        Self {
            board: Arc::new(board),
        }
    }

    /// Returns the concrete board, for inspection.
    #[must_use]
    pub fn board(&self) -> Arc<MemoryBoard> {
        Arc::clone(&self.board)
    }
}

impl CadEngine for MemoryEngine {
    fn get_board(&self) -> BoardResult<Arc<dyn Board>> {
        Ok(self.board.clone() as Arc<dyn Board>)
    }
}
