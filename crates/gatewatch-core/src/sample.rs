//! Normalized per-poll sample and the zero-bar invalidation rule.
//!
//! Each poll of the gateway yields one [`NormalizedSample`]: a timestamp, a
//! human-readable `H:M:S` label, and one reading per radio. A radio reporting
//! zero bars has no usable signal, so its SNR, RSRP and RSRQ are dropped
//! regardless of what the gateway sent alongside.

use std::time::SystemTime;

use serde::{Serialize, Serializer};

use crate::clock::{local_hms, unix_ms};
use crate::snapshot::{RawCellSignal, RawSignalSnapshot};

// ---------------------------------------------------------------------------
// Radio / Metric
// ---------------------------------------------------------------------------

/// Which radio a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Radio {
    /// 4G LTE (the gateway's "primary" signal).
    Lte,
    /// 5G NR (the gateway's "secondary" signal).
    Nr,
}

impl Radio {
    pub const ALL: [Radio; 2] = [Radio::Lte, Radio::Nr];

    pub fn label(self) -> &'static str {
        match self {
            Self::Lte => "4G LTE",
            Self::Nr => "5G NR",
        }
    }
}

impl std::fmt::Display for Radio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lte => write!(f, "lte"),
            Self::Nr => write!(f, "nr"),
        }
    }
}

/// A tracked signal-quality metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Rsrp,
    Snr,
    Rsrq,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Rsrp, Metric::Snr, Metric::Rsrq];

    /// Seed for the best-so-far fold. Best values never drop below this.
    pub fn floor(self) -> f64 {
        match self {
            Self::Rsrp => -140.0,
            Self::Snr => -19.5,
            Self::Rsrq => -19.5,
        }
    }

    /// Seed for the worst-so-far fold and top of the chart axis.
    pub fn ceiling(self) -> f64 {
        match self {
            Self::Rsrp => -44.0,
            Self::Snr => 40.0,
            Self::Rsrq => -3.0,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Rsrp => "dBm",
            Self::Snr | Self::Rsrq => "dB",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Rsrp => "RSRP",
            Self::Snr => "SNR",
            Self::Rsrq => "RSRQ",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsrp => write!(f, "rsrp"),
            Self::Snr => write!(f, "snr"),
            Self::Rsrq => write!(f, "rsrq"),
        }
    }
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Normalized 4G reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LteReading {
    pub cell_id: Option<u64>,
    pub rssi: Option<f64>,
    pub snr: Option<f64>,
    pub rsrp: Option<f64>,
    pub bar_index: Option<u8>,
    pub rsrq: Option<f64>,
    /// First band label, uppercased (`"B2"`).
    pub band: Option<String>,
    /// Only exposed by the authenticated telemetry endpoint; never filled here.
    pub downlink_earfcn: Option<u32>,
}

/// Normalized 5G reading. Same shape as [`LteReading`] without RSSI.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NrReading {
    pub cell_id: Option<u64>,
    pub snr: Option<f64>,
    pub rsrp: Option<f64>,
    pub bar_index: Option<u8>,
    pub rsrq: Option<f64>,
    /// First band label as reported (`"n71"`).
    pub band: Option<String>,
    pub downlink_nr_arfcn: Option<u32>,
}

/// Carrier aggregation details. Reserved: no modeled endpoint reports them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarrierAggregation {
    pub downlink_carriers: u32,
    pub uplink_carriers: u32,
}

/// The canonical record produced by one poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSample {
    #[serde(rename = "timestamp_ms", serialize_with = "serialize_unix_ms")]
    pub timestamp: SystemTime,
    pub time_label: String,
    pub lte: LteReading,
    pub nr: NrReading,
    pub carrier_aggregation: Option<CarrierAggregation>,
}

fn serialize_unix_ms<S: Serializer>(at: &SystemTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(unix_ms(*at))
}

impl NormalizedSample {
    /// Value of one metric for one radio, `None` when absent.
    pub fn metric(&self, radio: Radio, metric: Metric) -> Option<f64> {
        match (radio, metric) {
            (Radio::Lte, Metric::Rsrp) => self.lte.rsrp,
            (Radio::Lte, Metric::Snr) => self.lte.snr,
            (Radio::Lte, Metric::Rsrq) => self.lte.rsrq,
            (Radio::Nr, Metric::Rsrp) => self.nr.rsrp,
            (Radio::Nr, Metric::Snr) => self.nr.snr,
            (Radio::Nr, Metric::Rsrq) => self.nr.rsrq,
        }
    }

    /// Bar index for one radio.
    pub fn bars(&self, radio: Radio) -> Option<u8> {
        match radio {
            Radio::Lte => self.lte.bar_index,
            Radio::Nr => self.nr.bar_index,
        }
    }

    /// Band label for one radio.
    pub fn band(&self, radio: Radio) -> Option<&str> {
        match radio {
            Radio::Lte => self.lte.band.as_deref(),
            Radio::Nr => self.nr.band.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// `H:M:S` without zero padding, e.g. `9:5:3`.
pub fn format_time_label(hour: u32, minute: u32, second: u32) -> String {
    format!("{hour}:{minute}:{second}")
}

/// Local-time label for a capture instant.
pub fn time_label(at: SystemTime) -> String {
    let (h, m, s) = local_hms(at);
    format_time_label(h, m, s)
}

/// SNR, RSRP and RSRQ with the zero-bar rule applied.
fn usable_levels(raw: &RawCellSignal) -> (Option<f64>, Option<f64>, Option<f64>) {
    if raw.bars == Some(0) {
        (None, None, None)
    } else {
        (raw.sinr, raw.rsrp, raw.rsrq)
    }
}

/// Build a [`NormalizedSample`] from a raw snapshot captured at `at`.
pub fn normalize(raw: &RawSignalSnapshot, at: SystemTime) -> NormalizedSample {
    let primary = &raw.primary;
    let secondary = &raw.secondary;

    let (snr, rsrp, rsrq) = usable_levels(primary);
    let lte = LteReading {
        cell_id: primary.cid,
        rssi: primary.rssi,
        snr,
        rsrp,
        bar_index: primary.bars,
        rsrq,
        band: primary.bands.first().map(|b| b.to_uppercase()),
        downlink_earfcn: None,
    };

    let (snr, rsrp, rsrq) = usable_levels(secondary);
    let nr = NrReading {
        cell_id: secondary.cid,
        snr,
        rsrp,
        bar_index: secondary.bars,
        rsrq,
        band: secondary.bands.first().cloned(),
        downlink_nr_arfcn: None,
    };

    NormalizedSample {
        timestamp: at,
        time_label: time_label(at),
        lte,
        nr,
        carrier_aggregation: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
