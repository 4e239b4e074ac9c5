//! Bounded rolling history and best/worst-so-far extrema.
//!
//! The history keeps the most recent [`HISTORY_CAPACITY`] samples in arrival
//! order. Extrema are never cached: the window is small, so every read folds
//! the whole history again.

use std::collections::VecDeque;

use serde::Serialize;

use crate::sample::{Metric, NormalizedSample, Radio};

/// Samples retained in the rolling window.
pub const HISTORY_CAPACITY: usize = 24;

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Ordered samples, oldest first, newest last.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    samples: VecDeque<NormalizedSample>,
}

impl History {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append in place, evicting from the front past capacity.
    pub fn push(&mut self, sample: NormalizedSample) {
        self.samples.push_back(sample);
        while self.samples.len() > HISTORY_CAPACITY {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<&NormalizedSample> {
        self.samples.back()
    }

    /// Oldest retained sample.
    pub fn oldest(&self) -> Option<&NormalizedSample> {
        self.samples.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedSample> {
        self.samples.iter()
    }

    /// `(index, value)` points for one metric, skipping absent values.
    ///
    /// Indices are positions in the window, so gaps stay visible on a chart.
    pub fn series(&self, radio: Radio, metric: Metric) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.metric(radio, metric).map(|v| (i as f64, v)))
            .collect()
    }
}

/// Pure append: `history` plus `sample`, trimmed to capacity from the front.
pub fn append(mut history: History, sample: NormalizedSample) -> History {
    history.push(sample);
    history
}

// ---------------------------------------------------------------------------
// Extrema
// ---------------------------------------------------------------------------

/// One value per metric for a single radio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricValues {
    pub rsrp: f64,
    pub snr: f64,
    pub rsrq: f64,
}

impl MetricValues {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Rsrp => self.rsrp,
            Metric::Snr => self.snr,
            Metric::Rsrq => self.rsrq,
        }
    }
}

/// Per radio × metric summary of the current history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtremaSummary {
    pub lte: MetricValues,
    pub nr: MetricValues,
}

impl ExtremaSummary {
    pub fn get(&self, radio: Radio, metric: Metric) -> f64 {
        match radio {
            Radio::Lte => self.lte.get(metric),
            Radio::Nr => self.nr.get(metric),
        }
    }
}

/// Fold one metric over the history, skipping absent values.
fn fold_metric(
    history: &History,
    radio: Radio,
    metric: Metric,
    seed: f64,
    keep: impl Fn(f64, f64) -> f64,
) -> f64 {
    history
        .iter()
        .filter_map(|s| s.metric(radio, metric))
        .fold(seed, keep)
}

fn summarize(
    history: &History,
    seed: impl Fn(Metric) -> f64,
    keep: impl Fn(f64, f64) -> f64 + Copy,
) -> ExtremaSummary {
    let radio_values = |radio| MetricValues {
        rsrp: fold_metric(history, radio, Metric::Rsrp, seed(Metric::Rsrp), keep),
        snr: fold_metric(history, radio, Metric::Snr, seed(Metric::Snr), keep),
        rsrq: fold_metric(history, radio, Metric::Rsrq, seed(Metric::Rsrq), keep),
    };
    ExtremaSummary {
        lte: radio_values(Radio::Lte),
        nr: radio_values(Radio::Nr),
    }
}

/// Best-so-far per metric: highest value seen, never below the metric floor.
pub fn extrema(history: &History) -> ExtremaSummary {
    summarize(history, Metric::floor, |best, v| if v > best { v } else { best })
}

/// Worst-so-far per metric: lowest value seen, never above the metric ceiling.
pub fn troughs(history: &History) -> ExtremaSummary {
    summarize(history, Metric::ceiling, |worst, v| if v < worst { v } else { worst })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{LteReading, NrReading};
    use std::time::{Duration, UNIX_EPOCH};

    fn sample(n: u64, lte_rsrp: Option<f64>, nr_snr: Option<f64>) -> NormalizedSample {
        NormalizedSample {
            timestamp: UNIX_EPOCH + Duration::from_secs(n),
            time_label: format!("0:0:{n}"),
            lte: LteReading {
                rsrp: lte_rsrp,
                ..Default::default()
            },
            nr: NrReading {
                snr: nr_snr,
                ..Default::default()
            },
            carrier_aggregation: None,
        }
    }

    fn numbered(n: u64) -> NormalizedSample {
        sample(n, Some(-100.0 + n as f64), None)
    }

    // -----------------------------------------------------------------------
    // append
    // -----------------------------------------------------------------------

    #[test]
    fn append_grows_until_capacity() {
        let mut h = History::new();
        for n in 1..=HISTORY_CAPACITY as u64 + 5 {
            let before = h.len();
            let s = numbered(n);
            h = append(h, s.clone());
            assert_eq!(h.len(), (before + 1).min(HISTORY_CAPACITY));
            assert_eq!(h.latest(), Some(&s));
        }
    }

    #[test]
    fn append_full_drops_oldest_only() {
        let mut h = History::new();
        for n in 1..=HISTORY_CAPACITY as u64 {
            h = append(h, numbered(n));
        }
        let second = h.iter().nth(1).cloned().unwrap();
        let h2 = append(h.clone(), numbered(99));
        assert_eq!(h2.len(), HISTORY_CAPACITY);
        assert_eq!(h2.oldest(), Some(&second));
        // Everything after the evicted head keeps its order.
        let kept: Vec<_> = h.iter().skip(1).cloned().collect();
        let now: Vec<_> = h2.iter().take(HISTORY_CAPACITY - 1).cloned().collect();
        assert_eq!(kept, now);
    }

    #[test]
    fn thirty_appends_keep_samples_seven_through_thirty() {
        let mut h = History::new();
        for n in 1..=30 {
            h = append(h, numbered(n));
        }
        assert_eq!(h.len(), 24);
        let ids: Vec<u64> = h
            .iter()
            .map(|s| s.timestamp.duration_since(UNIX_EPOCH).unwrap().as_secs())
            .collect();
        assert_eq!(ids, (7..=30).collect::<Vec<_>>());
    }

    #[test]
    fn push_matches_append() {
        let mut a = History::new();
        let mut b = History::new();
        for n in 1..=40 {
            a.push(numbered(n));
            b = append(b, numbered(n));
        }
        assert_eq!(a, b);
    }

    // -----------------------------------------------------------------------
    // extrema / troughs
    // -----------------------------------------------------------------------

    #[test]
    fn extrema_of_empty_history_is_floors() {
        let e = extrema(&History::new());
        for summary in [e.lte, e.nr] {
            assert_eq!(summary.rsrp, -140.0);
            assert_eq!(summary.snr, -19.5);
            assert_eq!(summary.rsrq, -19.5);
        }
    }

    #[test]
    fn extrema_takes_highest_and_skips_absent() {
        let mut h = History::new();
        h.push(sample(1, Some(-110.0), Some(3.0)));
        h.push(sample(2, None, None));
        h.push(sample(3, Some(-95.0), Some(-2.0)));
        h.push(sample(4, Some(-101.0), None));
        let e = extrema(&h);
        assert_eq!(e.lte.rsrp, -95.0);
        assert_eq!(e.nr.snr, 3.0);
        // Nothing reported for these: floor.
        assert_eq!(e.lte.snr, -19.5);
        assert_eq!(e.nr.rsrp, -140.0);
    }

    #[test]
    fn extrema_never_below_floor() {
        let mut h = History::new();
        h.push(sample(1, Some(-150.0), Some(-25.0)));
        let e = extrema(&h);
        assert_eq!(e.lte.rsrp, -140.0);
        assert_eq!(e.nr.snr, -19.5);
    }

    #[test]
    fn extrema_is_idempotent() {
        let mut h = History::new();
        for n in 1..=10 {
            h.push(numbered(n));
        }
        assert_eq!(extrema(&h), extrema(&h));
        assert_eq!(troughs(&h), troughs(&h));
    }

    #[test]
    fn extrema_forgets_evicted_samples() {
        let mut h = History::new();
        h.push(sample(0, Some(-60.0), None));
        for n in 1..=HISTORY_CAPACITY as u64 {
            h.push(sample(n, Some(-100.0), None));
        }
        assert_eq!(extrema(&h).lte.rsrp, -100.0);
    }

    #[test]
    fn troughs_of_empty_history_is_ceilings() {
        let t = troughs(&History::new());
        assert_eq!(t.lte.rsrp, -44.0);
        assert_eq!(t.nr.snr, 40.0);
        assert_eq!(t.nr.rsrq, -3.0);
    }

    #[test]
    fn troughs_takes_lowest() {
        let mut h = History::new();
        h.push(sample(1, Some(-110.0), Some(3.0)));
        h.push(sample(2, Some(-95.0), Some(-2.0)));
        let t = troughs(&h);
        assert_eq!(t.lte.rsrp, -110.0);
        assert_eq!(t.nr.snr, -2.0);
    }

    #[test]
    fn summary_get_matches_fields() {
        let mut h = History::new();
        h.push(sample(1, Some(-90.0), Some(7.5)));
        let e = extrema(&h);
        assert_eq!(e.get(Radio::Lte, Metric::Rsrp), e.lte.rsrp);
        assert_eq!(e.get(Radio::Nr, Metric::Snr), 7.5);
    }

    // -----------------------------------------------------------------------
    // series
    // -----------------------------------------------------------------------

    #[test]
    fn series_keeps_window_positions() {
        let mut h = History::new();
        h.push(sample(1, Some(-100.0), None));
        h.push(sample(2, None, None));
        h.push(sample(3, Some(-98.0), None));
        assert_eq!(
            h.series(Radio::Lte, Metric::Rsrp),
            vec![(0.0, -100.0), (2.0, -98.0)]
        );
        assert!(h.series(Radio::Nr, Metric::Rsrp).is_empty());
    }
}
