use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::time::deserialize_timestamp_flexible;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Owner,
    Hr,
    HiringManager,
    #[default]
    Interviewer,
}

impl UserRole {
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Owner => "Owner",
            UserRole::Hr => "HR",
            UserRole::HiringManager => "Hiring Manager",
            UserRole::Interviewer => "Interviewer",
        }
    }

    /// Roles allowed to see the dashboard summary cards.
    pub fn sees_dashboard_summaries(&self) -> bool {
        matches!(self, UserRole::Owner | UserRole::Hr)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_timestamp_flexible")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

/// Embedded owner/manager reference on other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
