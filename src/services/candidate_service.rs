use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::candidate_dto::{CandidateQuery, CreateCandidatePayload, UpdateCandidatePayload};
use crate::error::Result;
use crate::models::candidate::Candidate;
use crate::services::api_client::ApiClient;
use crate::utils::validation::validate;

#[derive(Clone)]
pub struct CandidateService {
    api: ApiClient,
}

impl CandidateService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_candidates(&self, query: &CandidateQuery) -> Result<Vec<Candidate>> {
        self.api.get_with_query("candidates/", query).await
    }

    pub async fn get_candidate(&self, id: Uuid) -> Result<Candidate> {
        self.api.get(&format!("candidates/{}", id)).await
    }

    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn create_candidate(&self, payload: &CreateCandidatePayload) -> Result<Candidate> {
        validate(payload)?;
        let candidate: Candidate = self.api.post("candidates/", payload).await?;
        info!(candidate_id = %candidate.id, "Candidate created");
        Ok(candidate)
    }

    pub async fn update_candidate(
        &self,
        id: Uuid,
        payload: &UpdateCandidatePayload,
    ) -> Result<Candidate> {
        validate(payload)?;
        self.api.put(&format!("candidates/{}", id), payload).await
    }

    pub async fn delete_candidate(&self, id: Uuid) -> Result<()> {
        self.api.delete(&format!("candidates/{}", id)).await
    }
}
