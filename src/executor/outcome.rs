use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Result of running one work unit; serialized as one entry of the report's `results`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    #[serde(rename = "folder")]
    pub unit_name: String,
    #[serde(rename = "success")]
    pub succeeded: bool,
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    pub timestamp: DateTime<Local>,
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ExecutionOutcome {
    pub fn success(unit_name: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            unit_name: unit_name.into(),
            succeeded: true,
            duration_seconds,
            timestamp: Local::now(),
            error_detail: None,
        }
    }

    pub fn failure(
        unit_name: impl Into<String>,
        duration_seconds: f64,
        error_detail: impl Into<String>,
    ) -> Self {
        Self {
            unit_name: unit_name.into(),
            succeeded: false,
            duration_seconds,
            timestamp: Local::now(),
            error_detail: Some(error_detail.into()),
        }
    }

    pub fn failed(&self) -> bool {
        !self.succeeded
    }
}
