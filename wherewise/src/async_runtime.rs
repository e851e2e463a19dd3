//! Spawning background tasks from UI event handlers.

use std::future::Future;

/// Spawns the future on the tokio runtime the application was started with.
pub fn spawn<T>(future: T)
where
    T: Future + Send + 'static,
    T::Output: Send + 'static,
{
    tokio::spawn(future);
}
