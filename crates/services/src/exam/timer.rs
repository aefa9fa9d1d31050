use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Events emitted by a running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; `remaining_secs` is the time left.
    Tick { remaining_secs: u32 },
    /// The countdown reached zero. Emitted exactly once per run.
    Expired,
}

/// Cancelable one-second countdown for exam mode.
///
/// At most one countdown runs per timer: starting always cancels the
/// previous run first, so a double start never yields two tick streams.
#[derive(Debug, Default)]
pub struct ExamTimer {
    task: Option<JoinHandle<()>>,
}

impl ExamTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the countdown.
    ///
    /// Events are delivered on `events`; the run ends after `Expired` or as
    /// soon as the receiver goes away.
    pub fn start(&mut self, duration_secs: u32, events: mpsc::UnboundedSender<TimerEvent>) {
        self.stop();
        let task = tokio::spawn(async move {
            let mut remaining = duration_secs;
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;
            while remaining > 0 {
                interval.tick().await;
                remaining -= 1;
                let tick = TimerEvent::Tick {
                    remaining_secs: remaining,
                };
                if events.send(tick).is_err() {
                    return;
                }
            }
            let _ = events.send(TimerEvent::Expired);
        });
        self.task = Some(task);
    }

    /// Cancel the countdown if one is running.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether a countdown task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ExamTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
