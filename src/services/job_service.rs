use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::job_dto::{
    CreateJobPayload, StageUpdateRequest, StageUpdateResponse, UpdateJobPayload,
};
use crate::error::Result;
use crate::models::candidate::JobApplication;
use crate::models::job::{Job, PipelineStage};
use crate::services::api_client::ApiClient;
use crate::utils::validation::validate;

/// Endpoints the job detail board depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PipelineApi: Send + Sync {
    async fn get_job(&self, job_id: Uuid) -> Result<Job>;
    async fn job_candidates(&self, job_id: Uuid) -> Result<Vec<JobApplication>>;
    async fn update_job(&self, job_id: Uuid, payload: &UpdateJobPayload) -> Result<Job>;
    async fn update_pipeline(&self, job_id: Uuid, stages: &[PipelineStage]) -> Result<Job>;
    async fn update_candidate_stage(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
        stage: &str,
    ) -> Result<StageUpdateResponse>;
}

#[derive(Debug, Default, Serialize)]
struct JobListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    department_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct JobService {
    api: ApiClient,
}

impl JobService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_jobs(&self, department_id: Option<Uuid>) -> Result<Vec<Job>> {
        self.api
            .get_with_query("jobs", &JobListQuery { department_id })
            .await
    }

    #[instrument(skip(self, payload), fields(title = %payload.title))]
    pub async fn create_job(&self, payload: &CreateJobPayload) -> Result<Job> {
        validate(payload)?;
        let job: Job = self.api.post("jobs", payload).await?;
        info!(job_id = %job.id, "Job created");
        Ok(job)
    }

    pub async fn clone_job(&self, job_id: Uuid) -> Result<Job> {
        let body = serde_json::json!({});
        self.api.post(&format!("jobs/{}/clone", job_id), &body).await
    }

    /// Soft delete; the backend archives the job.
    pub async fn archive_job(&self, job_id: Uuid) -> Result<()> {
        self.api.delete(&format!("jobs/{}", job_id)).await
    }
}

#[async_trait]
impl PipelineApi for JobService {
    async fn get_job(&self, job_id: Uuid) -> Result<Job> {
        self.api.get(&format!("jobs/{}", job_id)).await
    }

    async fn job_candidates(&self, job_id: Uuid) -> Result<Vec<JobApplication>> {
        self.api.get(&format!("jobs/{}/candidates", job_id)).await
    }

    async fn update_job(&self, job_id: Uuid, payload: &UpdateJobPayload) -> Result<Job> {
        self.api.put(&format!("jobs/{}", job_id), payload).await
    }

    #[instrument(skip(self, stages), fields(stages = stages.len()))]
    async fn update_pipeline(&self, job_id: Uuid, stages: &[PipelineStage]) -> Result<Job> {
        self.api
            .put(&format!("jobs/{}/pipeline", job_id), stages)
            .await
    }

    #[instrument(skip(self))]
    async fn update_candidate_stage(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
        stage: &str,
    ) -> Result<StageUpdateResponse> {
        let body = StageUpdateRequest {
            stage: stage.to_string(),
        };
        self.api
            .put(
                &format!("jobs/{}/candidates/{}/stage", job_id, candidate_id),
                &body,
            )
            .await
    }
}
