//! Panic-guarded task spawning.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;

/// Extract a human-readable message from a panic payload.
pub fn extract_panic_message(panic: &(dyn Any + Send)) -> String {
    match (panic.downcast_ref::<&str>(), panic.downcast_ref::<String>()) {
        (Some(message), _) => (*message).to_string(),
        (None, Some(message)) => message.clone(),
        (None, None) => "unknown panic".to_string(),
    }
}

/// Spawn a task with panic catching.
///
/// The returned `JoinHandle` yields `Some(value)` on success or `None` if the
/// task panicked. Must be called from within a tokio runtime.
pub(crate) fn spawn_guarded<F>(label: &'static str, future: F) -> JoinHandle<Option<F::Output>>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(async move {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(value) => Some(value),
            Err(panic) => {
                log::error!("[{}] task panicked: {}", label, extract_panic_message(&*panic));
                None
            }
        }
    })
}
