//! Per-call invocation context handed to tools that ask for it.

use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use crate::mcp::protocol::{OutgoingNotification, RequestId};

/// Context for a single `tools/call` invocation.
///
/// Notifications queued here are written to the client before the call's
/// response.
#[derive(Debug, Default)]
pub struct ToolContext {
    request_id: Option<RequestId>,
    progress_token: Option<Value>,
    notifications: Mutex<Vec<OutgoingNotification>>,
}

impl ToolContext {
    /// Creates the context for a request.
    #[must_use]
    pub fn new(request_id: RequestId, progress_token: Option<Value>) -> Self {
        Self {
            request_id: Some(request_id),
            progress_token,
            notifications: Mutex::new(Vec::new()),
        }
    }

    /// Creates a context not tied to any request. Progress reports are dropped.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Returns the id of the request being served.
    #[must_use]
    pub const fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Queues a progress notification if the caller asked for progress.
    pub fn report_progress(&self, progress: u32, total: Option<u32>, message: Option<&str>) {
        let Some(token) = &self.progress_token else {
            return;
        };
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(OutgoingNotification::progress(token, progress, total, message));
    }

    /// Drains the queued notifications.
    pub fn take_notifications(&self) -> Vec<OutgoingNotification> {
        std::mem::take(
            &mut *self
                .notifications
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}
