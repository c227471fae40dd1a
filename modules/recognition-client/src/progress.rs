//! Synthetic progress shown while a recognition request is in flight.
//!
//! The value is cosmetic: it climbs on a timer up to a ceiling below 100 and
//! only reaches 100 when the owner calls [`ProgressTicker::finish`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Receives progress percentages in `[0, 100]`.
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSchedule {
    pub step: u8,
    pub ceiling: u8,
    pub interval: Duration,
}

impl Default for ProgressSchedule {
    fn default() -> Self {
        Self {
            step: 10,
            ceiling: 90,
            interval: Duration::from_millis(200),
        }
    }
}

/// A running progress timer. Dropping it cancels the timer without reporting
/// completion.
pub struct ProgressTicker {
    cancel: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressTicker {
    /// Report 0 and start ticking on the current tokio runtime.
    pub fn start(schedule: ProgressSchedule, sink: Arc<dyn ProgressSink>) -> Self {
        sink.report(0);

        let (cancel, mut cancelled) = watch::channel(false);
        let ticking = Arc::clone(&sink);
        let ceiling = schedule.ceiling.min(99);

        let task = tokio::spawn(async move {
            let mut percent = 0u8;
            let mut interval = time::interval_at(Instant::now() + schedule.interval, schedule.interval);
            while percent < ceiling {
                tokio::select! {
                    biased;
                    _ = cancelled.changed() => break,
                    _ = interval.tick() => {
                        percent = percent.saturating_add(schedule.step).min(ceiling);
                        ticking.report(percent);
                    }
                }
            }
        });

        Self {
            cancel,
            task: Some(task),
            sink,
        }
    }

    /// Stop the timer, then report 100.
    pub fn finish(mut self) {
        self.stop();
        self.sink.report(100);
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn stop(&mut self) {
        let _ = self.cancel.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
