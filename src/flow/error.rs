//! Errors raised by flow steps.

use std::fmt;

use thiserror::Error;

use crate::pcb::{BoardError, RenderError, SchemaError};

/// A step failure. Never reaches the transport: the registrar turns it into
/// an error envelope tagged with [`FlowError::error_type`].
#[derive(Debug, Error)]
pub enum FlowError {
    /// An engine call failed; the message carries what was being attempted.
    #[error("{message}")]
    Runtime {
        /// Contextual message.
        message: String,
    },

    /// Caller arguments are unusable.
    #[error("{0}")]
    InvalidArguments(String),

    /// A commit step ran without an item type in the flow context.
    #[error("No item type selected: call {step} first or pass item_type")]
    MissingItemType {
        /// The step that records the item type.
        step: &'static str,
    },

    /// Object building failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The engine reported a board-level problem.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// Rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl FlowError {
    /// Wraps an engine failure with what the step was doing.
    pub fn runtime(context: &str, source: impl fmt::Display) -> Self {
        Self::Runtime {
            message: format!("{context}: {source}"),
        }
    }

    /// Creates an invalid-arguments error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// Returns the classification placed in the error envelope.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Runtime { .. } => "RuntimeError",
            Self::InvalidArguments(_)
            | Self::Schema(SchemaError::InvalidArguments { .. })
            | Self::Board(BoardError::Unsupported { .. }) => "InvalidArguments",
            Self::MissingItemType { .. } => "MissingItemType",
            Self::Schema(SchemaError::UnknownItemType { .. }) => "UnknownItemType",
            Self::Schema(SchemaError::Generation { .. }) => "SchemaError",
            Self::Board(BoardError::Unavailable { .. }) => "BoardUnavailable",
            Self::Board(BoardError::ItemNotFound { .. }) => "ItemNotFound",
            Self::Board(_) => "RuntimeError",
            Self::Render(_) => "RenderError",
        }
    }
}
