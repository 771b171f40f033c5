use std::time::Duration;

use thiserror::Error;

use shared_database::StoreError;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("A dispatch cycle is already in progress")]
    CycleInProgress,

    #[error("Failed to fetch due notifications: {0}")]
    Fetch(#[from] StoreError),

    #[error("Fetching due notifications timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

/// Delivery failure reported by a [`crate::NotificationSender`]. The display
/// text is what gets recorded as the notification's `last_error`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SendError {
    #[error("rejected by provider: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("send timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}
