use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Schedule;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleListResponse {
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub url: String,
    pub interval_minutes: u32,
}

/// Finding payload forwarded to the explanation service. All three fields are
/// opaque to the client and pass through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub issue: Value,
    pub severity: Value,
    pub reasons: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Error body the server attaches to rejected mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
