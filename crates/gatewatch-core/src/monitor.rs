//! Shared polling state behind every surface.
//!
//! A [`SignalMonitor`] owns one [`SignalSource`], the current bearer
//! credential and the rolling [`History`]. Exactly one tick runs at a time;
//! readers clone a consistent view out under a short lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use serde::Serialize;

use crate::clock::unix_ms;
use crate::error::FetchError;
use crate::history::{ExtremaSummary, History, extrema, troughs};
use crate::sample::NormalizedSample;
use crate::sampler;
use crate::source::{Credential, SignalSource};

/// Outcome of a successful [`SignalMonitor::tick`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// A sample was appended to the history.
    Sampled,
    /// Another tick was still in flight; nothing happened.
    Busy,
}

/// Poll counters for status output and `/health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub ticks: u64,
    pub successes: u64,
    pub failures: u64,
    /// Error from the most recent tick; cleared by the next success.
    pub last_error: Option<String>,
    /// Unix milliseconds of the most recent completed tick.
    pub last_poll_ms: Option<u64>,
}

impl MonitorStatus {
    /// `"waiting"` before the first tick, `"degraded"` while the latest tick
    /// failed, `"ok"` otherwise.
    pub fn health(&self) -> &'static str {
        if self.ticks == 0 {
            "waiting"
        } else if self.last_error.is_some() {
            "degraded"
        } else {
            "ok"
        }
    }
}

/// Everything a frame or an export needs, captured under one lock.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorView {
    pub history: History,
    pub status: MonitorStatus,
    pub best: ExtremaSummary,
    pub worst: ExtremaSummary,
}

impl MonitorView {
    pub fn latest(&self) -> Option<&NormalizedSample> {
        self.history.latest()
    }
}

#[derive(Default)]
struct MonitorState {
    history: History,
    status: MonitorStatus,
}

/// Clears the in-flight flag even if the source panics.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SignalMonitor {
    source: Box<dyn SignalSource>,
    credential: Mutex<Option<Credential>>,
    state: Mutex<MonitorState>,
    in_flight: AtomicBool,
}

impl SignalMonitor {
    pub fn new(source: Box<dyn SignalSource>) -> Self {
        Self {
            source,
            credential: Mutex::new(None),
            state: Mutex::new(MonitorState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_credential(self, credential: Option<Credential>) -> Self {
        self.set_credential(credential);
        self
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Replace the bearer credential used by subsequent ticks.
    pub fn set_credential(&self, credential: Option<Credential>) {
        *self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = credential;
    }

    pub fn credential(&self) -> Option<Credential> {
        self.credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Poll the source once and record the result.
    ///
    /// The fetch runs without the state lock held, so readers are never
    /// blocked on the network. A failure leaves the history untouched.
    pub fn tick(&self) -> Result<Tick, FetchError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Ok(Tick::Busy);
        }
        let _guard = InFlight(&self.in_flight);

        let credential = self.credential();
        let result = sampler::poll(self.source.as_ref(), credential.as_ref());

        let mut s = self.lock_state();
        s.status.ticks += 1;
        s.status.last_poll_ms = Some(unix_ms(SystemTime::now()));
        match result {
            Ok(sample) => {
                log::debug!(
                    "{}: sampled at {} (lte bars {:?}, nr bars {:?})",
                    self.source.name(),
                    sample.time_label,
                    sample.lte.bar_index,
                    sample.nr.bar_index,
                );
                s.history.push(sample);
                s.status.successes += 1;
                s.status.last_error = None;
                Ok(Tick::Sampled)
            }
            Err(e) => {
                log::warn!("{}: poll failed: {e}", self.source.name());
                s.status.failures += 1;
                s.status.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn history(&self) -> History {
        self.lock_state().history.clone()
    }

    pub fn latest(&self) -> Option<NormalizedSample> {
        self.lock_state().history.latest().cloned()
    }

    /// Best-so-far values over the current history.
    pub fn extrema(&self) -> ExtremaSummary {
        extrema(&self.lock_state().history)
    }

    /// Worst-so-far values over the current history.
    pub fn troughs(&self) -> ExtremaSummary {
        troughs(&self.lock_state().history)
    }

    pub fn status(&self) -> MonitorStatus {
        self.lock_state().status.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Capture history, status and both extrema in a single lock.
    pub fn view(&self) -> MonitorView {
        let s = self.lock_state();
        MonitorView {
            best: extrema(&s.history),
            worst: troughs(&s.history),
            history: s.history.clone(),
            status: s.status.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchResult;
    use crate::sample::{Metric, Radio};
    use crate::snapshot::{RawCellSignal, RawSignalSnapshot};
    use std::collections::VecDeque;
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    fn snapshot(rsrp: f64, bars: u8) -> RawSignalSnapshot {
        RawSignalSnapshot {
            primary: RawCellSignal {
                rsrp: Some(rsrp),
                bars: Some(bars),
                ..Default::default()
            },
            secondary: RawCellSignal::default(),
        }
    }

    /// Hands out queued results in order, then fails.
    struct Queue {
        results: Mutex<VecDeque<FetchResult<RawSignalSnapshot>>>,
        tokens: Mutex<Vec<Option<String>>>,
    }

    impl Queue {
        fn new(results: Vec<FetchResult<RawSignalSnapshot>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                tokens: Mutex::new(Vec::new()),
            }
        }
    }

    impl SignalSource for Queue {
        fn name(&self) -> &str {
            "queue"
        }

        fn fetch(&self, credential: Option<&Credential>) -> FetchResult<RawSignalSnapshot> {
            self.tokens
                .lock()
                .unwrap()
                .push(credential.map(|c| c.token().to_string()));
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Malformed("exhausted".into())))
        }
    }

    fn outage() -> FetchError {
        FetchError::Transport {
            endpoint: "/TMI/v1/gateway?get=all".into(),
            reason: "connection refused".into(),
        }
    }

    // -----------------------------------------------------------------------
    // Tick bookkeeping
    // -----------------------------------------------------------------------

    #[test]
    fn fresh_monitor_is_waiting() {
        let m = SignalMonitor::new(Box::new(Queue::new(vec![])));
        assert_eq!(m.status().health(), "waiting");
        assert!(m.history().is_empty());
        assert!(m.latest().is_none());
        assert_eq!(m.extrema().lte.rsrp, Metric::Rsrp.floor());
        assert_eq!(m.troughs().nr.snr, Metric::Snr.ceiling());
    }

    #[test]
    fn successful_tick_appends() {
        let m = SignalMonitor::new(Box::new(Queue::new(vec![Ok(snapshot(-95.0, 3))])));
        assert_eq!(m.tick().unwrap(), Tick::Sampled);
        let status = m.status();
        assert_eq!((status.ticks, status.successes, status.failures), (1, 1, 0));
        assert!(status.last_poll_ms.is_some());
        assert_eq!(status.health(), "ok");
        assert_eq!(m.latest().unwrap().lte.rsrp, Some(-95.0));
        assert_eq!(m.extrema().get(Radio::Lte, Metric::Rsrp), -95.0);
    }

    #[test]
    fn failed_tick_leaves_history_untouched() {
        let m = SignalMonitor::new(Box::new(Queue::new(vec![
            Ok(snapshot(-95.0, 3)),
            Err(outage()),
        ])));
        m.tick().unwrap();
        let before = m.history();

        let err = m.tick().unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert_eq!(m.history(), before);

        let status = m.status();
        assert_eq!((status.ticks, status.successes, status.failures), (2, 1, 1));
        assert!(status.last_error.as_deref().unwrap().contains("refused"));
        assert_eq!(status.health(), "degraded");
    }

    #[test]
    fn success_clears_last_error() {
        let m = SignalMonitor::new(Box::new(Queue::new(vec![
            Err(outage()),
            Ok(snapshot(-90.0, 4)),
        ])));
        assert!(m.tick().is_err());
        m.tick().unwrap();
        assert_eq!(m.status().last_error, None);
        assert_eq!(m.status().health(), "ok");
    }

    #[test]
    fn credential_is_passed_to_source() {
        let queue = Arc::new(Queue::new(vec![Ok(snapshot(-95.0, 3)), Ok(snapshot(-96.0, 3))]));

        struct Shared(Arc<Queue>);
        impl SignalSource for Shared {
            fn name(&self) -> &str {
                self.0.name()
            }
            fn fetch(&self, c: Option<&Credential>) -> FetchResult<RawSignalSnapshot> {
                self.0.fetch(c)
            }
        }

        let m = SignalMonitor::new(Box::new(Shared(Arc::clone(&queue))));
        m.tick().unwrap();
        m.set_credential(Some(Credential::new("tok")));
        m.tick().unwrap();
        assert_eq!(
            *queue.tokens.lock().unwrap(),
            vec![None, Some("tok".to_string())]
        );
    }

    #[test]
    fn view_is_consistent() {
        let m = SignalMonitor::new(Box::new(Queue::new(vec![
            Ok(snapshot(-100.0, 2)),
            Ok(snapshot(-90.0, 2)),
        ])));
        m.tick().unwrap();
        m.tick().unwrap();
        let v = m.view();
        assert_eq!(v.history.len(), 2);
        assert_eq!(v.best.lte.rsrp, -90.0);
        assert_eq!(v.worst.lte.rsrp, -100.0);
        assert_eq!(v.status.successes, 2);
        assert_eq!(v.latest().unwrap().lte.rsrp, Some(-90.0));
    }

    // -----------------------------------------------------------------------
    // Overlap
    // -----------------------------------------------------------------------

    /// Blocks inside `fetch` until released.
    struct Gate {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl SignalSource for Gate {
        fn name(&self) -> &str {
            "gate"
        }

        fn fetch(&self, _: Option<&Credential>) -> FetchResult<RawSignalSnapshot> {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            Ok(snapshot(-99.0, 2))
        }
    }

    #[test]
    fn overlapping_tick_is_busy() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let m = Arc::new(SignalMonitor::new(Box::new(Gate {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        })));

        let worker = {
            let m = Arc::clone(&m);
            thread::spawn(move || m.tick())
        };
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(m.is_polling());
        assert_eq!(m.tick().unwrap(), Tick::Busy);
        // Readers are not blocked while the fetch is outstanding.
        assert!(m.history().is_empty());

        release_tx.send(()).unwrap();
        assert_eq!(worker.join().unwrap().unwrap(), Tick::Sampled);
        assert!(!m.is_polling());
        assert_eq!(m.status().ticks, 1);
        assert_eq!(m.history().len(), 1);
    }
}
