//! Polling loop.
//!
//! One background thread drives the manager's update tick. The interval
//! is re-read from settings on every iteration, so an interval change
//! takes effect on the next tick without a restart. Sleeps subtract the
//! time the tick itself took and run in short slices so a stop request
//! is honored promptly even with multi-second intervals.

use crate::context::AppContext;
use crate::error::Result;
use crate::hal::HardwareSource;
use crate::manager::HardwareManager;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Handle to the background polling thread.
pub struct Poller {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl Poller {
    pub fn new() -> Self {
        Self {
            handle: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Start polling. Any previous loop is stopped and joined first, so
    /// two loops never run concurrently.
    pub fn start<S>(&mut self, ctx: Arc<AppContext>, manager: Arc<HardwareManager<S>>) -> Result<()>
    where
        S: HardwareSource + Send + 'static,
    {
        self.stop();
        self.stop = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&self.stop);
        let handle = thread::Builder::new()
            .name("panelmon-poll".to_string())
            .spawn(move || {
                log::debug!("polling loop started");
                while !stop.load(Ordering::Relaxed) {
                    let interval = ctx.update_interval();
                    let began = Instant::now();
                    manager.update(&ctx.snapshot());

                    let mut remaining = sleep_budget(interval, began.elapsed());
                    while !remaining.is_zero() && !stop.load(Ordering::Relaxed) {
                        let slice = remaining.min(SLEEP_SLICE);
                        thread::sleep(slice);
                        remaining = remaining.saturating_sub(slice);
                    }
                }
                log::debug!("polling loop stopped");
            })?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Signal the loop to exit and block until the thread is gone. No-op
    /// when not running.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("polling thread panicked");
            }
        }
    }
}

/// Time left to sleep after a tick. A tick that overran the interval
/// yields zero and the loop proceeds immediately.
fn sleep_budget(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

impl Default for Poller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
