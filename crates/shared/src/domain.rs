use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque schedule identifier, stable across requests.
///
/// The server stores integer row ids but the wire format is not pinned down:
/// list responses have been observed carrying both `"id": 1` and `"id": "1"`.
/// Both forms deserialize into the same string-backed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScheduleId(pub String);

impl<'de> Deserialize<'de> for ScheduleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(value) => ScheduleId(value.to_string()),
            Raw::Text(value) => ScheduleId(value),
        })
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One server-owned periodic scan configuration. The client only ever holds a
/// transient read-only copy taken from the latest list fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub url: String,
    pub interval_minutes: u32,
    pub enabled: bool,
    /// Absent until the first execution. Reported as a naive UTC timestamp
    /// (Python `datetime.isoformat()`).
    #[serde(default)]
    pub last_run: Option<NaiveDateTime>,
}
