use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::utils::time::deserialize_timestamp_flexible;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    CandidateCreated,
    UserCreated,
    RequisitionPending,
    JobCreated,
    #[serde(other)]
    Other,
}

/// One entry of `GET /dashboard/recent-activities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentActivity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp_flexible")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Either a user id or the literal "Unknown".
    #[serde(default)]
    pub user: Option<JsonValue>,
    /// Only present on server-dismissable items.
    #[serde(default)]
    pub notification_key: Option<String>,
}

/// Raw audit record attached to a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobActivity {
    pub id: String,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub action_type: String,
    #[serde(default)]
    pub details: Option<JsonValue>,
    #[serde(default, deserialize_with = "deserialize_timestamp_flexible")]
    pub timestamp: Option<DateTime<Utc>>,
}
