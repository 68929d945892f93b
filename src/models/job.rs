use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::activity::JobActivity;
use crate::utils::time::deserialize_timestamp_flexible;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl PipelineStage {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }
}

/// Stage list used when a job carries no `pipeline_config`.
pub fn default_pipeline() -> Vec<PipelineStage> {
    [
        ("new", "New Candidates"),
        ("shortlisted", "Shortlisted"),
        ("technical_review", "Technical Review"),
        ("interview_round_1", "Interview Round 1"),
        ("interview_round_2", "Interview Round 2"),
        ("offer", "Offer"),
        ("hired", "Hired"),
        ("rejected", "Rejected"),
    ]
    .into_iter()
    .map(|(id, name)| PipelineStage::new(id, name))
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
    Archived,
}

impl JobStatus {
    /// Publish/unpublish toggle on the job detail page.
    pub fn toggled(&self) -> JobStatus {
        match self {
            JobStatus::Draft => JobStatus::Published,
            _ => JobStatus::Draft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub job_code: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub department: Option<DepartmentRef>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default = "default_headcount")]
    pub headcount: u32,
    #[serde(default)]
    pub min_salary: Option<Decimal>,
    #[serde(default)]
    pub max_salary: Option<Decimal>,
    #[serde(default)]
    pub experience_range: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hiring_manager_id: Option<Uuid>,
    #[serde(default)]
    pub recruiter_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_timestamp_flexible")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pipeline_config: Option<Vec<PipelineStage>>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub activities: Vec<JobActivity>,
    #[serde(default, deserialize_with = "deserialize_timestamp_flexible")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp_flexible")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_headcount() -> u32 {
    1
}

impl Job {
    /// Ordered kanban columns for this job.
    pub fn stages(&self) -> Vec<PipelineStage> {
        match &self.pipeline_config {
            Some(config) if !config.is_empty() => config.clone(),
            _ => default_pipeline(),
        }
    }

    pub fn has_stage(&self, stage_id: &str) -> bool {
        self.stages().iter().any(|s| s.id == stage_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job_json(pipeline: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "6f1c2a52-4f6e-4a4b-9d38-5d1e0c9b7a10",
            "title": "Backend Engineer",
            "job_code": "ENG-12",
            "status": "Published",
            "min_salary": 5000.0,
            "pipeline_config": pipeline,
            "created_at": "2024-02-01T08:00:00"
        })
    }

    #[test]
    fn missing_pipeline_uses_default_eight_stages() {
        let job: Job = serde_json::from_value(job_json(serde_json::Value::Null)).unwrap();
        let stages = job.stages();
        assert_eq!(stages.len(), 8);
        assert_eq!(stages[0].id, "new");
        assert_eq!(stages[7].id, "rejected");
        assert!(job.has_stage("offer"));
    }

    #[test]
    fn custom_pipeline_keeps_order() {
        let job: Job = serde_json::from_value(job_json(json!([
            {"id": "applied", "name": "Applied"},
            {"id": "onsite", "name": "Onsite", "color": "#ff0000"}
        ])))
        .unwrap();
        let ids: Vec<_> = job.stages().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["applied", "onsite"]);
        assert!(!job.has_stage("new"));
    }

    #[test]
    fn status_toggle_flips_draft_and_published() {
        assert_eq!(JobStatus::Draft.toggled(), JobStatus::Published);
        assert_eq!(JobStatus::Published.toggled(), JobStatus::Draft);
    }
}
