//! Background calls to the [`NotificationService`].
//!
//! Each spawn function runs one service call on the tokio runtime and sends
//! its outcome back over the host's event channel. The tracker never awaits
//! the service directly; it only sees these completion events.
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{CommitRequest, MarkAllRequest, NotificationService, ServiceError, Timestamp};
use crate::util::catch_task_panic;

/// Upper bound on a single service call.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitCompleted {
    pub generation: u64,
    pub up_to: Timestamp,
    pub result: Result<(), String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkAllCompleted {
    pub generation: u64,
    pub result: Result<(), String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadCountFetched {
    pub result: Result<u64, String>,
}

/// Issue `mark_seen_up_to(request.up_to)`.
pub fn spawn_commit<S, E>(
    service: Arc<S>,
    request: CommitRequest,
    tx: mpsc::Sender<E>,
) -> JoinHandle<()>
where
    S: NotificationService,
    E: From<CommitCompleted> + Send + 'static,
{
    tokio::spawn(async move {
        let up_to = request.up_to.clone();
        let result = run_call("mark_seen_up_to", service.mark_seen_up_to(&up_to)).await;
        let event = CommitCompleted {
            generation: request.generation,
            up_to: request.up_to,
            result,
        };
        send(&tx, event, "CommitCompleted").await;
    })
}

/// Issue `mark_all_seen()`.
pub fn spawn_mark_all<S, E>(
    service: Arc<S>,
    request: MarkAllRequest,
    tx: mpsc::Sender<E>,
) -> JoinHandle<()>
where
    S: NotificationService,
    E: From<MarkAllCompleted> + Send + 'static,
{
    tokio::spawn(async move {
        let result = run_call("mark_all_seen", service.mark_all_seen()).await;
        let event = MarkAllCompleted {
            generation: request.generation,
            result,
        };
        send(&tx, event, "MarkAllCompleted").await;
    })
}

/// Fetch the remote unread count.
pub fn spawn_unread_fetch<S, E>(service: Arc<S>, tx: mpsc::Sender<E>) -> JoinHandle<()>
where
    S: NotificationService,
    E: From<UnreadCountFetched> + Send + 'static,
{
    tokio::spawn(async move {
        let result = run_call("unread_count", service.unread_count()).await;
        send(&tx, UnreadCountFetched { result }, "UnreadCountFetched").await;
    })
}

async fn run_call<T, F>(name: &'static str, call: F) -> Result<T, String>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    let outcome = catch_task_panic(async {
        match tokio::time::timeout(CALL_TIMEOUT, call).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout),
        }
    })
    .await;

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::warn!(call = name, error = %e, "Notification service call failed");
            Err(e.to_string())
        }
        Err(panic_msg) => {
            tracing::error!(call = name, error = %panic_msg, "Notification service call panicked");
            Err(format!("Task panicked: {panic_msg}"))
        }
    }
}

async fn send<T, E: From<T>>(tx: &mpsc::Sender<E>, event: T, name: &'static str) {
    if let Err(e) = tx.send(E::from(event)).await {
        tracing::warn!(error = %e, event = name, "Channel send failed (receiver dropped)");
    }
}
