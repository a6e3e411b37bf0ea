//! Async testing utilities

use std::future::Future;
use std::time::Duration;

/// Poll an async condition until it holds or `timeout` elapses
///
/// Returns `true` as soon as the condition is met. Elapsed time is measured
/// on the tokio clock, so the helper also works under paused time.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use chainview_common::testing::poll_until;
///
/// # tokio_test::block_on(async {
/// let ready = poll_until(Duration::from_millis(50), Duration::from_millis(5), || async { true })
///     .await;
/// assert!(ready);
/// # });
/// ```
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = tokio::time::Instant::now();

    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        tokio::time::sleep(interval).await;
    }

    false
}
