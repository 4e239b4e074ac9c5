//! HTTP client for the gateway's local `TMI` REST API.
//!
//! Endpoints:
//! - `GET  /TMI/v1/gateway?get=all`            signal, device, time (open)
//! - `POST /TMI/v1/auth/login`                 bearer token
//! - `GET  /TMI/v1/network/telemetry?get=all`  cell site, clients (token)
//!
//! Response parsing is split into free functions so it can be tested without
//! a gateway on the network.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::device::{CellSite, ClientCounts, DeviceInfo, GatewayInfo, GpsFix, enb_id_from_ecgi};
use crate::error::{AuthError, FetchError, FetchResult};
use crate::snapshot::RawSignalSnapshot;
use crate::source::{Credential, SignalSource};

pub const SIGNAL_PATH: &str = "/TMI/v1/gateway?get=all";
pub const LOGIN_PATH: &str = "/TMI/v1/auth/login";
pub const TELEMETRY_PATH: &str = "/TMI/v1/network/telemetry?get=all";

/// Blocking client bound to one gateway. Clones share the connection pool.
#[derive(Clone)]
pub struct GatewayClient {
    base_url: String,
    client: Client,
    name: String,
}

impl GatewayClient {
    /// Build a client with the configured base URL and request timeout.
    pub fn new(config: &GatewayConfig) -> FetchResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                endpoint: base_url.clone(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;
        let name = format!("gateway:{base_url}");
        Ok(Self {
            base_url,
            client,
            name,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(request: RequestBuilder, credential: Option<&Credential>) -> RequestBuilder {
        match credential {
            Some(c) => request.bearer_auth(c.token()),
            None => request,
        }
    }

    fn get_json(&self, path: &str, credential: Option<&Credential>) -> FetchResult<Value> {
        let request = self
            .client
            .get(self.url(path))
            .header(ACCEPT, "application/json");
        let response = Self::authorize(request, credential)
            .send()
            .map_err(|e| FetchError::Transport {
                endpoint: path.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|e| FetchError::Transport {
            endpoint: path.to_string(),
            reason: format!("read failed: {e}"),
        })?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Exchange username/password for a bearer credential.
    pub fn login(&self, username: &str, password: &str) -> Result<Credential, AuthError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&body)
            .send()
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AuthError::Rejected);
        }
        if !status.is_success() {
            return Err(AuthError::Transport(format!("HTTP {status}")));
        }

        let doc: Value = response
            .json()
            .map_err(|e| AuthError::Transport(format!("unreadable login response: {e}")))?;
        let credential = parse_login(&doc)?;
        log::info!("logged in to {} as {username}", self.base_url);
        Ok(credential)
    }

    /// Device identity and uptime.
    pub fn gateway_info(&self, credential: Option<&Credential>) -> FetchResult<GatewayInfo> {
        let doc = self.get_json(SIGNAL_PATH, credential)?;
        Ok(parse_gateway_info(&doc))
    }

    /// Raw authenticated telemetry document.
    pub fn telemetry(&self, credential: &Credential) -> FetchResult<Value> {
        self.get_json(TELEMETRY_PATH, Some(credential))
    }

    /// Serving cell-site identity.
    pub fn cell_site(&self, credential: &Credential) -> FetchResult<CellSite> {
        let doc = self.telemetry(credential)?;
        parse_cell_site(&doc)
    }

    /// Connected client counts.
    pub fn client_counts(&self, credential: &Credential) -> FetchResult<ClientCounts> {
        let doc = self.telemetry(credential)?;
        Ok(parse_client_counts(&doc))
    }
}

impl SignalSource for GatewayClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, credential: Option<&Credential>) -> FetchResult<RawSignalSnapshot> {
        let doc = self.get_json(SIGNAL_PATH, credential)?;
        parse_signal(&doc)
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// String field that may arrive as a JSON string or number.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    let v: f64 = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Signal block of the gateway document.
pub fn parse_signal(doc: &Value) -> FetchResult<RawSignalSnapshot> {
    RawSignalSnapshot::from_json(doc)
}

/// Pull `auth.token` out of a login reply.
pub fn parse_login(doc: &Value) -> Result<Credential, AuthError> {
    doc.get("auth")
        .and_then(|auth| auth.get("token"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(Credential::new)
        .ok_or(AuthError::Rejected)
}

/// Device block and uptime from the gateway document.
pub fn parse_gateway_info(doc: &Value) -> GatewayInfo {
    let device = doc.get("device");
    let field = |key: &str| text(device.and_then(|d| d.get(key)));
    GatewayInfo {
        device: DeviceInfo {
            manufacturer: field("manufacturer"),
            model: field("model"),
            hardware_version: field("hardwareVersion"),
            software_version: field("softwareVersion"),
            update_state: field("updateState"),
            mac_id: field("macId"),
            serial: field("serial"),
        },
        uptime_secs: number(doc.get("time").and_then(|t| t.get("upTime"))),
    }
}

/// Serving LTE cell site from the telemetry document.
pub fn parse_cell_site(doc: &Value) -> FetchResult<CellSite> {
    let lte = doc
        .get("cell")
        .and_then(|c| c.get("4g"))
        .filter(|v| v.is_object())
        .ok_or_else(|| FetchError::Malformed("missing `cell.4g` object".to_string()))?;

    let gps = doc.get("cell").and_then(|c| c.get("gps")).and_then(|g| {
        Some(GpsFix {
            latitude: number(g.get("latitude"))?,
            longitude: number(g.get("longitude"))?,
        })
    });

    Ok(CellSite {
        enb_id: lte
            .get("ecgi")
            .and_then(Value::as_str)
            .and_then(enb_id_from_ecgi),
        cell_id: number(lte.get("sector").and_then(|s| s.get("cid")))
            .filter(|v| *v >= 0.0)
            .map(|v| v as u64),
        mcc: text(lte.get("mcc")),
        mnc: text(lte.get("mnc")),
        gps,
    })
}

/// Client counts from the telemetry document; missing lists count as zero.
pub fn parse_client_counts(doc: &Value) -> ClientCounts {
    let clients = doc.get("clients");
    let count = |key: &str| {
        clients
            .and_then(|c| c.get(key))
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    };
    ClientCounts {
        wifi_2_4ghz: count("2.4ghz"),
        wifi_5ghz: count("5.0ghz"),
        ethernet: count("ethernet"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
