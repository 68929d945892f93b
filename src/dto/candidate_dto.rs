use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::models::candidate::{EducationItem, ExperienceItem};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateCandidatePayload {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub current_company: Option<String>,
    pub current_position: Option<String>,
    #[validate(range(min = 0.0, message = "Experience cannot be negative"))]
    pub experience_years: f64,
    pub notice_period: Option<i32>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub experience_history: Vec<ExperienceItem>,
    #[serde(default)]
    pub social_links: HashMap<String, String>,
    pub resume_file_path: Option<String>,
    /// Links the new candidate to a job in the same request.
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCandidatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidateQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}
