pub mod info;
pub mod monitor;
pub mod server;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gatewatch_core::gateway::parse_gateway_info;
use gatewatch_core::{
    CellSite, ClientCounts, Credential, FileSource, GatewayClient, GatewayConfig, GatewayInfo,
    Metric, NormalizedSample, Radio, SignalMonitor,
};

/// Options shared by every subcommand.
pub struct GlobalOpts {
    pub url: Option<String>,
    pub model: Option<String>,
    pub fixture: Option<PathBuf>,
}

/// Environment configuration with command-line overrides applied.
pub fn load_config(opts: &GlobalOpts, interval_ms: Option<u64>) -> GatewayConfig {
    let mut config = GatewayConfig::from_env();
    if let Some(url) = &opts.url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(model) = &opts.model {
        config.model = Some(model.trim().to_string()).filter(|m| !m.is_empty());
    }
    if let Some(ms) = interval_ms {
        config.poll_interval = Duration::from_millis(ms);
    }
    config
}

/// Where samples come from for this run.
pub enum Origin {
    Gateway(GatewayClient),
    Fixture(PathBuf),
}

/// A configured monitor plus what is needed for the non-signal panels.
pub struct Session {
    pub config: GatewayConfig,
    pub monitor: Arc<SignalMonitor>,
    pub origin: Origin,
}

impl Session {
    pub fn model(&self) -> &str {
        self.config.model.as_deref().unwrap_or("")
    }

    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    /// Device identity and uptime. Fixture runs read them from the same file.
    pub fn gateway_info(&self) -> Option<GatewayInfo> {
        match &self.origin {
            Origin::Gateway(client) => {
                let credential = self.monitor.credential();
                client
                    .gateway_info(credential.as_ref())
                    .map_err(|e| log::warn!("device info unavailable: {e}"))
                    .ok()
            }
            Origin::Fixture(path) => {
                let body = std::fs::read(path)
                    .map_err(|e| log::warn!("cannot read {}: {e}", path.display()))
                    .ok()?;
                let doc: serde_json::Value = serde_json::from_slice(&body)
                    .map_err(|e| log::warn!("{} is not JSON: {e}", path.display()))
                    .ok()?;
                Some(parse_gateway_info(&doc))
            }
        }
    }

    /// Serving cell site; needs a logged-in gateway session.
    pub fn cell_site(&self) -> Option<CellSite> {
        let Origin::Gateway(client) = &self.origin else {
            return None;
        };
        let credential = self.monitor.credential()?;
        client
            .cell_site(&credential)
            .map_err(|e| log::warn!("cell site unavailable: {e}"))
            .ok()
    }

    /// Connected clients; needs a logged-in gateway session.
    pub fn client_counts(&self) -> Option<ClientCounts> {
        let Origin::Gateway(client) = &self.origin else {
            return None;
        };
        let credential = self.monitor.credential()?;
        client
            .client_counts(&credential)
            .map_err(|e| log::warn!("client list unavailable: {e}"))
            .ok()
    }

    /// Log in if a password is configured and no token is held yet.
    ///
    /// Safe to call on every refresh: once a credential is held this is a
    /// lock and a clone. Returns whether a credential is held afterwards.
    pub fn ensure_login(&self) -> bool {
        if self.monitor.credential().is_some() {
            return true;
        }
        let Origin::Gateway(client) = &self.origin else {
            return false;
        };
        if !self.config.has_credentials() {
            return false;
        }
        match login(client, &self.config) {
            Some(credential) => {
                self.monitor.set_credential(Some(credential));
                true
            }
            None => false,
        }
    }
}

/// Build the session, or print why polling is off and return `None`.
///
/// Login failures are reported and the session continues unauthenticated:
/// the signal endpoint works without a token, and [`Session::ensure_login`]
/// retries later.
pub fn open_session(opts: &GlobalOpts, interval_ms: Option<u64>) -> Option<Session> {
    let config = load_config(opts, interval_ms);
    if !config.polling_enabled() {
        eprintln!("Polling disabled: no gateway model configured.");
        eprintln!("Set GATEWATCH_MODEL or pass --model <MODEL> to start polling.");
        return None;
    }

    if let Some(path) = &opts.fixture {
        let monitor = SignalMonitor::new(Box::new(FileSource::new(path)));
        return Some(Session {
            config,
            monitor: Arc::new(monitor),
            origin: Origin::Fixture(path.clone()),
        });
    }

    let client = match GatewayClient::new(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if !config.has_credentials() {
        log::info!("no GATEWATCH_PASSWORD set; cell site and clients need a login");
    }
    let monitor = SignalMonitor::new(Box::new(client.clone()));
    let session = Session {
        config,
        monitor: Arc::new(monitor),
        origin: Origin::Gateway(client),
    };
    session.ensure_login();
    Some(session)
}

fn login(client: &GatewayClient, config: &GatewayConfig) -> Option<Credential> {
    let password = config.password.as_deref().unwrap_or_default();
    client
        .login(&config.username, password)
        .map_err(|e| log::warn!("{e}; continuing without authentication"))
        .ok()
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// A metric value with its unit, or `-` when absent.
pub fn format_metric(value: Option<f64>, metric: Metric) -> String {
    match value {
        Some(v) => format!("{v} {}", metric.unit()),
        None => "-".to_string(),
    }
}

/// Five-cell bar graph for a bar index.
pub fn bar_glyphs(bars: Option<u8>) -> String {
    let n = bars.unwrap_or(0).min(5) as usize;
    format!("{}{}", "▮".repeat(n), "▯".repeat(5 - n))
}

/// One radio's reading on a single line.
pub fn radio_summary(sample: &NormalizedSample, radio: Radio) -> String {
    let band = sample.band(radio).unwrap_or("-");
    let bars = bar_glyphs(sample.bars(radio));
    let levels: Vec<String> = [Metric::Rsrp, Metric::Snr, Metric::Rsrq]
        .into_iter()
        .map(|m| {
            format!(
                "{} {}",
                m.label(),
                format_metric(sample.metric(radio, m), m)
            )
        })
        .collect();
    format!("{} {band:<4} {bars}  {}", radio.label(), levels.join("  "))
}
