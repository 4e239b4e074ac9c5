//! Raw signal snapshot as returned by the gateway.
//!
//! The gateway answers `GET /TMI/v1/gateway?get=all` with
//! `{ "signal": { "4g": {...}, "5g": {...} }, ... }`. Firmware revisions
//! disagree on which fields exist and how they are typed, so every field is
//! parsed leniently: missing, `null` or mistyped values become absent instead
//! of failing the whole poll. Only a body without a `signal` object is
//! rejected.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{FetchError, FetchResult};

/// One radio's worth of raw readings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCellSignal {
    /// Physical cell identifier.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub cid: Option<u64>,
    /// Received signal strength indicator (dBm).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rssi: Option<f64>,
    /// Signal to interference plus noise ratio (dB).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sinr: Option<f64>,
    /// Reference signal received power (dBm).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rsrp: Option<f64>,
    /// Discrete bar index, 0 means no usable signal.
    #[serde(default, deserialize_with = "lenient_bars")]
    pub bars: Option<u8>,
    /// Reference signal received quality (dB).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rsrq: Option<f64>,
    /// Band labels, e.g. `["b2"]` or `["n71"]`.
    #[serde(default, deserialize_with = "lenient_bands")]
    pub bands: Vec<String>,
}

/// A single poll's raw readings: primary (4G) and secondary (5G).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSignalSnapshot {
    pub primary: RawCellSignal,
    pub secondary: RawCellSignal,
}

#[derive(Deserialize)]
struct SignalBlock {
    #[serde(rename = "4g", default, deserialize_with = "lenient_cell")]
    lte: RawCellSignal,
    #[serde(rename = "5g", default, deserialize_with = "lenient_cell")]
    nr: RawCellSignal,
}

impl RawSignalSnapshot {
    /// Extract the snapshot from a full gateway document.
    pub fn from_json(doc: &Value) -> FetchResult<Self> {
        let signal = doc
            .get("signal")
            .filter(|v| v.is_object())
            .ok_or_else(|| FetchError::Malformed("missing `signal` object".to_string()))?;
        let block = SignalBlock::deserialize(signal)?;
        Ok(Self {
            primary: block.lte,
            secondary: block.nr,
        })
    }

    /// Parse a raw response body.
    pub fn from_slice(body: &[u8]) -> FetchResult<Self> {
        let doc: Value = serde_json::from_slice(body)?;
        Self::from_json(&doc)
    }
}

// ---------------------------------------------------------------------------
// Lenient field parsers
// ---------------------------------------------------------------------------

fn value_as_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value_as_f64(&value))
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let value = Value::deserialize(d)?;
    if let Some(n) = value.as_u64() {
        return Ok(Some(n));
    }
    Ok(value_as_f64(&value)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64)
        .map(|v| v as u64))
}

fn lenient_bars<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u8>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value_as_f64(&value).map(|v| v.round().clamp(0.0, u8::MAX as f64) as u8))
}

fn lenient_bands<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_cell<'de, D: Deserializer<'de>>(d: D) -> Result<RawCellSignal, D::Error> {
    let value = Value::deserialize(d)?;
    if !value.is_object() {
        return Ok(RawCellSignal::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
