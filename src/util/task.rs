use std::panic::AssertUnwindSafe;

use futures::FutureExt;

/// Run `future`, turning a panic inside it into an `Err` with the panic message.
///
/// Background tasks report through the event channel; a panicking task
/// would otherwise drop its sender silently and leave the UI waiting.
pub async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future).catch_unwind().await.map_err(|panic| {
        if let Some(s) = panic.downcast_ref::<&'static str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        }
    })
}
