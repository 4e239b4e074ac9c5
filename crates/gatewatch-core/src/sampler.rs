//! One poll: read a source, normalize the snapshot.

use std::time::SystemTime;

use crate::error::FetchResult;
use crate::sample::{NormalizedSample, normalize};
use crate::source::{Credential, SignalSource};

/// Read `source` once and normalize the result at the current time.
///
/// No retry happens here; a failed fetch is handed back as-is and the caller's
/// next scheduled tick tries again.
pub fn poll(
    source: &dyn SignalSource,
    credential: Option<&Credential>,
) -> FetchResult<NormalizedSample> {
    let raw = source.fetch(credential)?;
    Ok(normalize(&raw, SystemTime::now()))
}
