//! Debounced relayout on container resize.
//!
//! Width observations go into a single-slot channel where the newest value
//! replaces any unread one. A timer task waits for the quiescence window to
//! pass without a newer observation, then runs the settle callback once for
//! the final width of the burst.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Default quiescence window after the last resize observation.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(50);

/// Debounces width observations and triggers a repack once they settle.
///
/// Must be created inside a tokio runtime. The timer task stops when the
/// controller is dropped.
pub struct ReflowController {
    width_tx: watch::Sender<Option<f32>>,
    last_settled: Arc<Mutex<Option<f32>>>,
    handle: Option<JoinHandle<()>>,
}

impl ReflowController {
    /// Spawns the timer task. `on_settled` runs on that task for every width
    /// that survives the quiescence window and differs from the previous one.
    pub fn spawn<F>(quiescence: Duration, on_settled: F) -> Self
    where
        F: FnMut(f32) + Send + 'static,
    {
        let (width_tx, width_rx) = watch::channel(None);
        let last_settled = Arc::new(Mutex::new(None));

        let handle = tokio::spawn(reflow_loop(
            width_rx,
            quiescence,
            Arc::clone(&last_settled),
            on_settled,
        ));

        debug!(quiescence_ms = quiescence.as_millis() as u64, "Started reflow controller");

        Self {
            width_tx,
            last_settled,
            handle: Some(handle),
        }
    }

    /// Records a new container width, superseding any pending one.
    pub fn observe(&self, width: f32) {
        trace!(width, "Observed container width");
        self.width_tx.send_replace(Some(width));
    }

    /// The last width a repack was triggered for.
    pub fn last_settled(&self) -> Option<f32> {
        *self.last_settled.lock()
    }

    /// Marks `width` as already laid out, so a later burst ending on the same
    /// width does not trigger a redundant repack.
    pub fn mark_settled(&self, width: f32) {
        *self.last_settled.lock() = Some(width);
    }

    /// Stops the timer task. Pending observations are dropped.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Stopped reflow controller");
        }
    }
}

impl Drop for ReflowController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn reflow_loop<F>(
    mut width_rx: watch::Receiver<Option<f32>>,
    quiescence: Duration,
    last_settled: Arc<Mutex<Option<f32>>>,
    mut on_settled: F,
) where
    F: FnMut(f32) + Send + 'static,
{
    loop {
        if width_rx.changed().await.is_err() {
            return;
        }

        // Restart the window on every newer observation.
        loop {
            tokio::select! {
                changed = width_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    trace!("Width superseded inside quiescence window");
                }
                _ = tokio::time::sleep(quiescence) => break,
            }
        }

        let latest = *width_rx.borrow_and_update();
        let Some(width) = latest else {
            continue;
        };

        {
            let mut last = last_settled.lock();
            if *last == Some(width) {
                trace!(width, "Width unchanged since last repack");
                continue;
            }
            *last = Some(width);
        }

        debug!(width, "Container width settled");
        on_settled(width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_controller(quiescence: Duration) -> (ReflowController, flume::Receiver<f32>) {
        let (tx, rx) = flume::unbounded();
        let controller = ReflowController::spawn(quiescence, move |width| {
            let _ = tx.send(width);
        });
        (controller, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_yields_single_repack() {
        let (controller, settled) = recording_controller(DEFAULT_QUIESCENCE);

        controller.observe(400.0);
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.observe(420.0);
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.observe(430.0);

        tokio::time::sleep(Duration::from_millis(200)).await;

        let widths: Vec<f32> = settled.try_iter().collect();
        assert_eq!(widths, vec![430.0]);
        assert_eq!(controller.last_settled(), Some(430.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_repack() {
        let (controller, settled) = recording_controller(DEFAULT_QUIESCENCE);

        controller.observe(800.0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.observe(900.0);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let widths: Vec<f32> = settled.try_iter().collect();
        assert_eq!(widths, vec![800.0, 900.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_width_not_repacked() {
        let (controller, settled) = recording_controller(DEFAULT_QUIESCENCE);

        controller.observe(640.0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.observe(700.0);
        controller.observe(640.0);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let widths: Vec<f32> = settled.try_iter().collect();
        assert_eq!(widths, vec![640.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_settled_suppresses_repack() {
        let (controller, settled) = recording_controller(DEFAULT_QUIESCENCE);

        controller.mark_settled(1024.0);
        controller.observe(1024.0);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(settled.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_pending() {
        let (mut controller, settled) = recording_controller(DEFAULT_QUIESCENCE);

        controller.observe(500.0);
        controller.shutdown();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(settled.try_recv().is_err());
    }
}
