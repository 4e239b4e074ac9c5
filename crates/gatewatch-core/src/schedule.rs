//! Fixed-cadence polling loop.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::monitor::SignalMonitor;

pub use crate::config::DEFAULT_POLL_INTERVAL;

/// Longest uninterrupted sleep, so a cleared flag is noticed quickly.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Call `tick` every `period` until `running` is cleared.
///
/// Ticks run sequentially on the calling thread: the next one starts only
/// after the previous one returned and the rest of the period elapsed. A
/// tick that overruns the period is followed immediately by the next.
pub fn run_every(period: Duration, running: &AtomicBool, mut tick: impl FnMut()) {
    while running.load(Ordering::Relaxed) {
        let deadline = Instant::now() + period;
        tick();

        loop {
            if !running.load(Ordering::Relaxed) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

/// Run [`SignalMonitor::tick`] on a background thread every `period`.
///
/// Failures are already logged and counted by the monitor, so the loop just
/// carries on to the next tick.
pub fn spawn_poller(
    monitor: Arc<SignalMonitor>,
    period: Duration,
    running: Arc<AtomicBool>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("gatewatch-poller".into())
        .spawn(move || {
            log::debug!(
                "polling {} every {}ms",
                monitor.source_name(),
                period.as_millis()
            );
            run_every(period, &running, || {
                let _ = monitor.tick();
            });
            log::debug!("poller for {} stopped", monitor.source_name());
        })
}
