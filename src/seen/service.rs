use std::future::Future;

use thiserror::Error;

use super::Timestamp;

/// Errors from the remote notification service.
///
/// All of these are transient from the tracker's point of view: a failed
/// call leaves local state untouched and is retried on the next cycle.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Connection-level failure.
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Request timed out")]
    Timeout,
}

/// The remote side of notification seen-state.
///
/// Implementations own the authoritative unread counter. Calls may be slow or
/// fail; callers run them off the UI loop (see [`super::sync`]).
pub trait NotificationService: Send + Sync + 'static {
    /// Mark every notification at or before `up_to` as seen.
    fn mark_seen_up_to(
        &self,
        up_to: &Timestamp,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Mark everything seen.
    fn mark_all_seen(&self) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Current unread count. May be stale relative to reads made elsewhere.
    fn unread_count(&self) -> impl Future<Output = Result<u64, ServiceError>> + Send;
}
