use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserSummary;
use crate::utils::time::deserialize_timestamp_flexible;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DepartmentStatus {
    #[default]
    Active,
    Inactive,
}

impl DepartmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DepartmentStatus::Active => "Active",
            DepartmentStatus::Inactive => "Inactive",
        }
    }
}

/// Counts are computed server side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub owner: Option<UserSummary>,
    #[serde(default)]
    pub status: DepartmentStatus,
    #[serde(default, deserialize_with = "deserialize_timestamp_flexible")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active_jobs_count: u32,
    #[serde(default)]
    pub total_jobs_count: u32,
    #[serde(default)]
    pub total_members_count: u32,
}

impl Department {
    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_ref().and_then(|o| o.full_name.as_deref())
    }
}
