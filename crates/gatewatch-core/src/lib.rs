//! # gatewatch-core
//!
//! Signal telemetry sampler and rolling aggregator for home cellular gateways
//! that expose the local `TMI` REST API.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gatewatch_core::{GatewayClient, GatewayConfig, SignalMonitor};
//!
//! let config = GatewayConfig::from_env();
//! let client = GatewayClient::new(&config).expect("http client");
//! let monitor = SignalMonitor::new(Box::new(client));
//!
//! monitor.tick().ok();
//! let best = monitor.extrema();
//! println!("best 4G RSRP so far: {} dBm", best.lte.rsrp);
//! ```
//!
//! ## Architecture
//!
//! Source → Sampler (normalize) → History (24 samples) → Extrema
//!
//! Every source implements [`SignalSource`]. [`sampler::poll`] reads one raw
//! snapshot and normalizes it, applying the zero-bar rule: a radio reporting
//! zero bars has its SNR, RSRP and RSRQ dropped. [`SignalMonitor`] owns the
//! history and runs one poll at a time; [`schedule::spawn_poller`] drives it
//! on a fixed cadence.

pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod export;
pub mod gateway;
pub mod history;
pub mod monitor;
pub mod sample;
pub mod sampler;
pub mod schedule;
pub mod snapshot;
pub mod source;

pub use config::{DEFAULT_POLL_INTERVAL, GatewayConfig};
pub use device::{CellSite, ClientCounts, DeviceInfo, GatewayInfo, GpsFix, format_uptime};
pub use error::{AuthError, FetchError, FetchResult};
pub use export::export_snapshot;
pub use gateway::GatewayClient;
pub use history::{
    ExtremaSummary, HISTORY_CAPACITY, History, MetricValues, append, extrema, troughs,
};
pub use monitor::{MonitorStatus, MonitorView, SignalMonitor, Tick};
pub use sample::{LteReading, Metric, NormalizedSample, NrReading, Radio, normalize};
pub use sampler::poll;
pub use schedule::{run_every, spawn_poller};
pub use snapshot::{RawCellSignal, RawSignalSnapshot};
pub use source::{Credential, FileSource, SignalSource};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
