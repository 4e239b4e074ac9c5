//! Point-in-time JSON export of a monitor's state.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::clock::format_iso8601_compact;
use crate::history::{ExtremaSummary, HISTORY_CAPACITY, History, extrema, troughs};
use crate::monitor::MonitorStatus;

#[derive(Serialize)]
struct ExportDocument<'a> {
    exported_at: String,
    status: &'a MonitorStatus,
    capacity: usize,
    best: ExtremaSummary,
    worst: ExtremaSummary,
    history: &'a History,
}

/// Write `gatewatch-snapshot-<epoch>.json` into `dir` and return its path.
pub fn export_snapshot(dir: &Path, status: &MonitorStatus, history: &History) -> io::Result<PathBuf> {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let doc = ExportDocument {
        exported_at: format_iso8601_compact(since_epoch),
        status,
        capacity: HISTORY_CAPACITY,
        best: extrema(history),
        worst: troughs(history),
        history,
    };
    let contents = serde_json::to_string_pretty(&doc).map_err(io::Error::other)?;

    let path = dir.join(format!(
        "gatewatch-snapshot-{}.json",
        since_epoch.as_secs()
    ));
    std::fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::append;
    use crate::sample::normalize;
    use crate::snapshot::{RawCellSignal, RawSignalSnapshot};

    fn history_of(rsrps: &[f64]) -> History {
        rsrps.iter().fold(History::new(), |h, &rsrp| {
            let raw = RawSignalSnapshot {
                primary: RawCellSignal {
                    rsrp: Some(rsrp),
                    bars: Some(3),
                    bands: vec!["b66".into()],
                    ..Default::default()
                },
                secondary: RawCellSignal::default(),
            };
            append(h, normalize(&raw, SystemTime::now()))
        })
    }

    #[test]
    fn export_writes_status_extrema_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let status = MonitorStatus {
            ticks: 3,
            successes: 2,
            failures: 1,
            last_error: None,
            last_poll_ms: Some(1_700_000_000_000),
        };
        let history = history_of(&[-101.0, -97.0]);

        let path = export_snapshot(dir.path(), &status, &history).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("gatewatch-snapshot-"));
        assert!(name.ends_with(".json"));

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["status"]["ticks"], 3);
        assert_eq!(doc["capacity"], 24);
        assert_eq!(doc["best"]["lte"]["rsrp"], -97.0);
        assert_eq!(doc["worst"]["lte"]["rsrp"], -101.0);
        assert_eq!(doc["history"].as_array().unwrap().len(), 2);
        assert_eq!(doc["history"][0]["lte"]["band"], "B66");
        assert!(doc["exported_at"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn export_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = export_snapshot(&missing, &MonitorStatus::default(), &History::new());
        assert!(err.is_err());
    }
}
