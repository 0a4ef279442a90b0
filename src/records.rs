//! Typed views of the two source record kinds.
//!
//! Each source tree has its own record struct so that a missing or
//! mistyped field fails at parse time, with file and line context, instead
//! of surfacing as a load-time fault.

use serde::{Deserialize, Deserializer};

/// One catalog file: a single song/artist pair. Fields beyond these are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    /// Release year. The source data carries integers, numeric strings and
    /// junk like "N/A"; anything non-numeric coerces to `None`.
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i64>,
    pub duration: f64,
    pub artist_name: String,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
}

/// One activity-log line. Only `page` and `ts` are present for every event
/// kind; the emitter fills the rest per event type, so they stay optional
/// here and are validated by the activity transformer for the rows it keeps.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub page: String,
    pub ts: i64,
    /// The log writes user ids as numbers, strings, or "" for anonymous
    /// sessions; blank collapses to `None`.
    #[serde(default, deserialize_with = "lenient_user_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn lenient_user_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
            Some(s.trim().to_string())
        }
        _ => None,
    })
}
