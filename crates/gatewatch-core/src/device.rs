//! Gateway device details, cell-site identity and connected clients.
//!
//! None of this feeds the sampler; it fills the header of the dashboard and
//! the `info` command.

use serde::Serialize;

/// Hardware and firmware identity from the gateway endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub hardware_version: Option<String>,
    pub software_version: Option<String>,
    pub update_state: Option<String>,
    pub mac_id: Option<String>,
    pub serial: Option<String>,
}

impl DeviceInfo {
    /// "Arcadyan KVD21 1.0", skipping unknown parts.
    pub fn headline(&self) -> String {
        [&self.manufacturer, &self.model, &self.hardware_version]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Device identity plus uptime, from one gateway document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GatewayInfo {
    pub device: DeviceInfo,
    /// Seconds since boot.
    pub uptime_secs: Option<f64>,
}

/// Known PLMN → operator names.
const OPERATORS: &[(&str, &str)] = &[
    ("310-260", "T-Mobile USA"),
    ("311-490", "Sprint"),
    ("312-250", "Sprint Keep Site"),
];

/// Map fallback when the gateway reports no GPS fix.
const DEFAULT_MAP_CENTER: (f64, f64) = (44.967243, -103.771556);

/// GPS fix reported alongside the serving cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
}

/// Serving LTE cell-site identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellSite {
    /// eNodeB ID: the ECGI cell identity divided by 256.
    pub enb_id: Option<u64>,
    /// Sector cell id.
    pub cell_id: Option<u64>,
    pub mcc: Option<String>,
    pub mnc: Option<String>,
    pub gps: Option<GpsFix>,
}

impl CellSite {
    /// `"310-260"`, or `None` when either code is missing.
    pub fn plmn(&self) -> Option<String> {
        match (&self.mcc, &self.mnc) {
            (Some(mcc), Some(mnc)) => Some(format!("{mcc}-{mnc}")),
            _ => None,
        }
    }

    /// Operator name for the PLMN, `"Unknown"` when not in the table.
    pub fn operator_name(&self) -> &'static str {
        let Some(plmn) = self.plmn() else {
            return "Unknown";
        };
        OPERATORS
            .iter()
            .find(|(code, _)| *code == plmn)
            .map_or("Unknown", |(_, name)| *name)
    }

    /// CellMapper link centered on the GPS fix (or a wide default view).
    pub fn cellmapper_url(&self) -> String {
        let (lat, lon, zoom) = match self.gps {
            Some(fix) => (fix.latitude, fix.longitude, 14),
            None => (DEFAULT_MAP_CENTER.0, DEFAULT_MAP_CENTER.1, 5),
        };
        format!(
            "https://www.cellmapper.net/map?MCC={}&MNC={}&type=LTE&latitude={lat}&longitude={lon}&zoom={zoom}&showTowers=true&showTowerLabels=true&clusterEnabled=true&tilesEnabled=true&showSectorColours=true&mapType=roadmap",
            self.mcc.as_deref().unwrap_or(""),
            self.mnc.as_deref().unwrap_or(""),
        )
    }
}

/// eNodeB ID from an ECGI string: skip the 6-digit PLMN prefix, read the
/// leading digits of the rest, divide by 256.
pub fn enb_id_from_ecgi(ecgi: &str) -> Option<u64> {
    let rest = ecgi.get(6..)?.trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let eci: u64 = digits.parse().ok()?;
    Some(eci / 256)
}

/// Connected client counts by medium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClientCounts {
    pub wifi_2_4ghz: usize,
    pub wifi_5ghz: usize,
    pub ethernet: usize,
}

impl ClientCounts {
    pub fn total(&self) -> usize {
        self.wifi_2_4ghz + self.wifi_5ghz + self.ethernet
    }
}

/// Human-readable uptime: `"1 day, 2 hours, 3 minutes, 4 seconds"`.
///
/// Zero components are omitted; a fractional part adds a milliseconds
/// segment.
pub fn format_uptime(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let whole = secs.trunc() as u64;
    let millis = ((secs - secs.trunc()) * 1000.0).round() as u64;

    let parts = [
        (whole / 86_400, "day"),
        ((whole / 3600) % 24, "hour"),
        ((whole / 60) % 60, "minute"),
        (whole % 60, "second"),
        (millis.min(999), "millisecond"),
    ];

    let segments: Vec<String> = parts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| {
            let plural = if *n == 1 { "" } else { "s" };
            format!("{n} {unit}{plural}")
        })
        .collect();

    if segments.is_empty() {
        "0 seconds".to_string()
    } else {
        segments.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_full() {
        assert_eq!(
            format_uptime(93_784.0),
            "1 day, 2 hours, 3 minutes, 4 seconds"
        );
    }

    #[test]
    fn uptime_plurals_and_omissions() {
        assert_eq!(format_uptime(61.0), "1 minute, 1 second");
        assert_eq!(format_uptime(7200.0), "2 hours");
        assert_eq!(format_uptime(2.0 * 86_400.0), "2 days");
        assert_eq!(format_uptime(0.0), "0 seconds");
    }

    #[test]
    fn uptime_fraction_adds_millis() {
        assert_eq!(format_uptime(5.25), "5 seconds, 250 milliseconds");
    }

    #[test]
    fn uptime_negative_or_nan_is_zero() {
        assert_eq!(format_uptime(-3.0), "0 seconds");
        assert_eq!(format_uptime(f64::NAN), "0 seconds");
    }

    #[test]
    fn enb_id_derivation() {
        // PLMN 310260, ECI 12345678 -> 12345678 / 256 = 48225
        assert_eq!(enb_id_from_ecgi("31026012345678"), Some(48_225));
        // Trailing junk ignored like a lenient integer parse.
        assert_eq!(enb_id_from_ecgi("3102601024x9"), Some(4));
        assert_eq!(enb_id_from_ecgi("310260"), None);
        assert_eq!(enb_id_from_ecgi("31026"), None);
        assert_eq!(enb_id_from_ecgi("310260abc"), None);
    }

    #[test]
    fn plmn_and_operator() {
        let site = CellSite {
            mcc: Some("310".into()),
            mnc: Some("260".into()),
            ..Default::default()
        };
        assert_eq!(site.plmn().as_deref(), Some("310-260"));
        assert_eq!(site.operator_name(), "T-Mobile USA");

        let other = CellSite {
            mcc: Some("310".into()),
            mnc: Some("410".into()),
            ..Default::default()
        };
        assert_eq!(other.operator_name(), "Unknown");
        assert_eq!(CellSite::default().plmn(), None);
        assert_eq!(CellSite::default().operator_name(), "Unknown");
    }

    #[test]
    fn cellmapper_defaults_without_gps() {
        let site = CellSite {
            mcc: Some("310".into()),
            mnc: Some("260".into()),
            ..Default::default()
        };
        let url = site.cellmapper_url();
        assert!(url.contains("MCC=310&MNC=260"));
        assert!(url.contains("latitude=44.967243"));
        assert!(url.contains("zoom=5"));
    }

    #[test]
    fn cellmapper_uses_gps_fix() {
        let site = CellSite {
            gps: Some(GpsFix {
                latitude: 47.5,
                longitude: -122.25,
            }),
            ..Default::default()
        };
        let url = site.cellmapper_url();
        assert!(url.contains("latitude=47.5&longitude=-122.25&zoom=14"));
    }

    #[test]
    fn headline_skips_missing_parts() {
        let d = DeviceInfo {
            manufacturer: Some("Arcadyan".into()),
            model: Some("KVD21".into()),
            ..Default::default()
        };
        assert_eq!(d.headline(), "Arcadyan KVD21");
        assert_eq!(DeviceInfo::default().headline(), "");
    }

    #[test]
    fn client_total() {
        let c = ClientCounts {
            wifi_2_4ghz: 3,
            wifi_5ghz: 2,
            ethernet: 1,
        };
        assert_eq!(c.total(), 6);
    }
}
