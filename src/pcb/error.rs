//! Error types for board operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::items::{ItemId, ItemType};

/// Result type for board engine operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors reported by the CAD engine.
#[derive(Debug, Error)]
pub enum BoardError {
    /// No board is currently open in the engine.
    #[error("No board is open: {message}")]
    Unavailable {
        /// Why the board could not be obtained.
        message: String,
    },

    /// An item referenced by id does not exist on the board.
    #[error("Item not found: {id}")]
    ItemNotFound {
        /// The missing item id.
        id: ItemId,
    },

    /// The engine cannot perform the operation for this item type.
    #[error("Operation '{operation}' is not supported for {item_type}")]
    Unsupported {
        /// The attempted operation.
        operation: String,
        /// The item type involved.
        item_type: ItemType,
    },

    /// Failed to read the board file.
    #[error("Failed to read board file: {path}")]
    FileRead {
        /// Path to the board file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write the board file.
    #[error("Failed to write board file: {path}")]
    FileWrite {
        /// Path to the board file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The board file contents could not be (de)serialised.
    #[error("Invalid board data: {message}")]
    InvalidData {
        /// Description of what's wrong.
        message: String,
    },
}

impl BoardError {
    /// Creates a board-unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates an unsupported-operation error.
    pub fn unsupported(operation: impl Into<String>, item_type: ItemType) -> Self {
        Self::Unsupported {
            operation: operation.into(),
            item_type,
        }
    }

    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}

/// Errors raised while turning argument mappings into board items.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The item type name is not one of the known types.
    #[error("Unknown item type '{name}'. Valid types: {valid}")]
    UnknownItemType {
        /// The rejected type name.
        name: String,
        /// Comma-separated list of valid type names.
        valid: String,
    },

    /// The arguments do not describe a valid item of the requested type.
    #[error("Invalid arguments for {item_type}: {message}")]
    InvalidArguments {
        /// The item type being built.
        item_type: ItemType,
        /// Description of what's wrong.
        message: String,
    },

    /// JSON schema generation failed.
    #[error("Failed to generate schema for {item_type}: {message}")]
    Generation {
        /// The item type whose schema failed.
        item_type: ItemType,
        /// Description of what went wrong.
        message: String,
    },
}

/// Errors raised while rendering a board image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Nothing visible on the selected layers.
    #[error("Nothing to render on the selected layers")]
    EmptySelection,

    /// Canvas dimensions are unusable.
    #[error("Invalid canvas: {message}")]
    InvalidCanvas {
        /// Description of what's wrong.
        message: String,
    },

    /// Image encoding failed.
    #[error("Image encoding failed")]
    Encode {
        /// Underlying error from the PNG encoder.
        #[source]
        source: image::ImageError,
    },

    /// The board could not be read while rendering.
    #[error("Failed to read board for rendering: {0}")]
    Board(#[from] BoardError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_not_found_display() {
        let err = BoardError::ItemNotFound {
            id: ItemId::from("abc"),
        };
        assert_eq!(err.to_string(), "Item not found: abc");
    }

    #[test]
    fn unsupported_display_names_type() {
        let err = BoardError::unsupported("rotate", ItemType::Via);
        assert_eq!(
            err.to_string(),
            "Operation 'rotate' is not supported for Via"
        );
    }

    #[test]
    fn render_error_wraps_board_error() {
        let err: RenderError = BoardError::unavailable("closed").into();
        assert!(err.to_string().contains("closed"));
    }
}
