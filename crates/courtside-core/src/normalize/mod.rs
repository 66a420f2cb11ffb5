// Upstream payload normalizers.
//
// Each normalizer is a pure function from one parsed JSON document to an
// ordered list of records. A missing top-level key is an error (the caller
// renders its fallback instead); a single malformed entry is skipped with a
// warning so one bad event does not hide the rest of the schedule.

pub mod roster;
pub mod schedule;
pub mod team;
pub mod weather;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub use roster::normalize_roster;
pub use schedule::normalize_schedule;
pub use team::{normalize_standings, normalize_team};
pub use weather::normalize_weather;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    #[error("unexpected response shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("none of the {0} upstream entries could be normalized")]
    NoUsableEntries(usize),
}

/// Decode upstream list entries one at a time. An entry of the wrong shape
/// comes back as `None` (logged) instead of failing the whole document.
pub(crate) fn decode_entries<T: DeserializeOwned>(entries: Vec<Value>, kind: &str) -> Vec<Option<T>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| match serde_json::from_value(entry) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(index = idx, error = %e, "skipping undecodable {kind}");
                None
            }
        })
        .collect()
}

/// What a normalizer needs to know about the tracked team.
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    pub team_id: String,
    /// Location shown for home games.
    pub venue: String,
}

/// A number that upstream sometimes sends as a JSON number, sometimes as a
/// string, and sometimes as `{ "value": .., "displayValue": ".." }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum LooseNumber {
    Number(f64),
    Text(String),
    #[serde(rename_all = "camelCase")]
    Detailed {
        value: Option<f64>,
        display_value: Option<String>,
    },
}

impl LooseNumber {
    /// Non-negative integer value, or `None` for anything non-numeric.
    pub(crate) fn as_u32(&self) -> Option<u32> {
        match self {
            LooseNumber::Number(n) => f64_to_u32(*n),
            LooseNumber::Text(s) => s.trim().parse().ok(),
            LooseNumber::Detailed {
                value,
                display_value,
            } => value
                .and_then(f64_to_u32)
                .or_else(|| display_value.as_deref()?.trim().parse().ok()),
        }
    }
}

fn f64_to_u32(n: f64) -> Option<u32> {
    (n.is_finite() && n >= 0.0 && n <= u32::MAX as f64).then(|| n.round() as u32)
}

/// Parse upstream timestamps. ESPN often omits seconds ("2025-04-07T00:50Z"),
/// which RFC 3339 does not allow, and fallback data carries bare dates.
pub fn parse_upstream_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%MZ") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
