use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::job::{JobStatus, PipelineStage};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_salary_range"))]
pub struct CreateJobPayload {
    #[validate(length(min = 1, message = "Job title is required"))]
    pub title: String,
    pub department_id: Uuid,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub employment_type: String,
    #[validate(range(min = 1, message = "Headcount must be at least 1"))]
    pub headcount: u32,
    pub min_salary: Option<Decimal>,
    pub max_salary: Option<Decimal>,
    pub experience_range: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub description: Option<String>,
    pub hiring_manager_id: Option<Uuid>,
    pub recruiter_id: Option<Uuid>,
    pub deadline: Option<DateTime<Utc>>,
    pub pipeline_config: Option<Vec<PipelineStage>>,
    pub status: Option<JobStatus>,
}

fn validate_salary_range(payload: &CreateJobPayload) -> Result<(), ValidationError> {
    match (payload.min_salary, payload.max_salary) {
        (Some(min), Some(max)) if max < min => {
            let mut err = ValidationError::new("salary_range");
            err.message = Some("max_salary must be greater than or equal to min_salary".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateJobPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headcount: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageUpdateRequest {
    pub stage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageUpdateResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub application_id: String,
    pub current_stage: String,
}
