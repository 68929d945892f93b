use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use uuid::Uuid;

use crate::utils::time::deserialize_timestamp_flexible;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationItem {
    pub degree: Option<String>,
    pub school: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub title: Option<String>,
    pub company: Option<String>,
    pub dates: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub current_company: Option<String>,
    #[serde(default)]
    pub current_position: Option<String>,
    #[serde(default)]
    pub experience_years: f64,
    #[serde(default)]
    pub notice_period: Option<i32>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub experience_history: Vec<ExperienceItem>,
    #[serde(default)]
    pub social_links: HashMap<String, String>,
    #[serde(default)]
    pub resume_file_path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp_flexible")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A candidate inside one job's pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    #[serde(default = "default_stage")]
    pub current_stage: String,
    #[serde(default)]
    pub application_status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp_flexible")]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub ai_score: Option<f64>,
    #[serde(default)]
    pub ai_analysis: Option<JsonValue>,
    #[serde(default)]
    pub candidate: Option<Candidate>,
}

fn default_stage() -> String {
    "new".to_string()
}

impl JobApplication {
    pub fn candidate_name(&self) -> String {
        self.candidate
            .as_ref()
            .map(Candidate::full_name)
            .unwrap_or_else(|| self.candidate_id.to_string())
    }
}
