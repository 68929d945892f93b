use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::job_dto::UpdateJobPayload;
use crate::error::{Error, Result};
use crate::models::candidate::JobApplication;
use crate::models::job::{Job, JobStatus, PipelineStage};
use crate::services::job_service::PipelineApi;
use crate::utils::cancel::run_cancellable;
use crate::views::activity_log::{build_timeline, TimelineEntry};

#[derive(Debug, Clone, PartialEq)]
pub struct BoardColumn {
    pub stage: PipelineStage,
    pub applications: Vec<JobApplication>,
}

#[derive(Debug, Default)]
struct BoardState {
    job: Option<Job>,
    applications: Vec<JobApplication>,
    /// Last stage the backend accepted, per candidate.
    confirmed: HashMap<Uuid, String>,
    error: Option<String>,
}

impl BoardState {
    fn loaded_job(&self) -> Result<&Job> {
        self.job
            .as_ref()
            .ok_or_else(|| Error::NotFound("Job has not been loaded".to_string()))
    }
}

/// Job detail page: kanban board of applications grouped by pipeline stage.
pub struct JobBoard<A> {
    api: A,
    job_id: Uuid,
    state: Mutex<BoardState>,
    cancel: CancellationToken,
}

impl<A: PipelineApi> JobBoard<A> {
    pub fn new(api: A, job_id: Uuid) -> Self {
        Self {
            api,
            job_id,
            state: Mutex::new(BoardState::default()),
            cancel: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_error(&self, err: &Error) {
        if !err.is_cancelled() {
            self.lock().error = Some(err.inline_message());
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Fetches the job and its applications together.
    #[instrument(skip(self), fields(job_id = %self.job_id))]
    pub async fn load(&self) -> Result<()> {
        let fetch = async {
            tokio::try_join!(
                self.api.get_job(self.job_id),
                self.api.job_candidates(self.job_id)
            )
        };
        match run_cancellable(&self.cancel, fetch).await {
            Ok((job, applications)) => {
                let mut state = self.lock();
                state.job = Some(job);
                state.confirmed = applications
                    .iter()
                    .map(|a| (a.candidate_id, a.current_stage.clone()))
                    .collect();
                state.applications = applications;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    warn!(error = %e, "Failed to load job board");
                }
                self.record_error(&e);
                Err(e)
            }
        }
    }

    pub fn job(&self) -> Option<Job> {
        self.lock().job.clone()
    }

    pub fn stages(&self) -> Vec<PipelineStage> {
        self.lock().job.as_ref().map(Job::stages).unwrap_or_default()
    }

    pub fn applications(&self) -> Vec<JobApplication> {
        self.lock().applications.clone()
    }

    pub fn stage_of(&self, candidate_id: Uuid) -> Option<String> {
        self.lock()
            .applications
            .iter()
            .find(|a| a.candidate_id == candidate_id)
            .map(|a| a.current_stage.clone())
    }

    /// One column per stage, in pipeline order.
    pub fn columns(&self) -> Vec<BoardColumn> {
        let state = self.lock();
        let Some(job) = state.job.as_ref() else {
            return Vec::new();
        };
        job.stages()
            .into_iter()
            .map(|stage| {
                let applications = state
                    .applications
                    .iter()
                    .filter(|a| a.current_stage == stage.id)
                    .cloned()
                    .collect();
                BoardColumn {
                    stage,
                    applications,
                }
            })
            .collect()
    }

    /// Applications whose stage is not in the pipeline; they belong to no column.
    pub fn orphaned_applications(&self) -> Vec<JobApplication> {
        let state = self.lock();
        let Some(job) = state.job.as_ref() else {
            return Vec::new();
        };
        let ids: HashSet<String> = job.stages().into_iter().map(|s| s.id).collect();
        state
            .applications
            .iter()
            .filter(|a| !ids.contains(&a.current_stage))
            .cloned()
            .collect()
    }

    /// Moves a candidate to `new_stage`, optimistically.
    ///
    /// The board shows the new stage while the request is in flight. A failure restores
    /// the last stage the backend accepted, unless a later move already replaced the
    /// optimistic value.
    #[instrument(skip(self), fields(job_id = %self.job_id))]
    pub async fn move_candidate(&self, candidate_id: Uuid, new_stage: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let previous = {
            let mut state = self.lock();
            let job = state.loaded_job()?;
            if !job.has_stage(new_stage) {
                let err = Error::UnknownStage(new_stage.to_string());
                state.error = Some(err.inline_message());
                return Err(err);
            }
            let Some(app) = state
                .applications
                .iter_mut()
                .find(|a| a.candidate_id == candidate_id)
            else {
                let err = Error::NotFound("Candidate is not part of this pipeline".to_string());
                state.error = Some(err.inline_message());
                return Err(err);
            };
            if app.current_stage == new_stage {
                return Ok(());
            }
            std::mem::replace(&mut app.current_stage, new_stage.to_string())
        };

        let result = run_cancellable(
            &self.cancel,
            self.api
                .update_candidate_stage(self.job_id, candidate_id, new_stage),
        )
        .await;

        let mut state = self.lock();
        let state = &mut *state;
        let app = state
            .applications
            .iter_mut()
            .find(|a| a.candidate_id == candidate_id && a.current_stage == new_stage);
        match result {
            Ok(response) => {
                if let Some(app) = app {
                    app.current_stage = response.current_stage.clone();
                }
                state.confirmed.insert(candidate_id, response.current_stage.clone());
                state.error = None;
                info!(%candidate_id, from = %previous, to = %response.current_stage, "Candidate moved");
                Ok(())
            }
            Err(e) => {
                if let (Some(app), Some(confirmed)) = (app, state.confirmed.get(&candidate_id)) {
                    app.current_stage = confirmed.clone();
                }
                if !e.is_cancelled() {
                    warn!(%candidate_id, error = %e, "Stage update failed, reverted");
                    state.error = Some(e.inline_message());
                }
                Err(e)
            }
        }
    }

    /// Replaces the stage list. Local state changes only after the backend accepts it.
    #[instrument(skip(self, stages), fields(job_id = %self.job_id, stages = stages.len()))]
    pub async fn update_pipeline_config(&self, stages: Vec<PipelineStage>) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Err(e) = self.check_pipeline(&stages) {
            self.record_error(&e);
            return Err(e);
        }

        let result = run_cancellable(
            &self.cancel,
            self.api.update_pipeline(self.job_id, &stages),
        )
        .await;

        match result {
            Ok(updated) => {
                let mut state = self.lock();
                if let Some(job) = state.job.as_mut() {
                    job.pipeline_config = updated.pipeline_config.or(Some(stages));
                    job.updated_at = updated.updated_at.or(job.updated_at);
                }
                state.error = None;
                info!("Pipeline configuration saved");
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    warn!(error = %e, "Failed to save pipeline configuration");
                }
                self.record_error(&e);
                Err(e)
            }
        }
    }

    fn check_pipeline(&self, stages: &[PipelineStage]) -> Result<()> {
        if stages.is_empty() {
            return Err(Error::InvalidPipeline(
                "A pipeline needs at least one stage".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for (position, stage) in stages.iter().enumerate() {
            if stage.id.trim().is_empty() {
                return Err(Error::InvalidPipeline(format!(
                    "Stage {} has no id",
                    position + 1
                )));
            }
            if stage.name.trim().is_empty() {
                return Err(Error::InvalidPipeline(format!(
                    "Stage '{}' has no name",
                    stage.id
                )));
            }
            if !seen.insert(stage.id.as_str()) {
                return Err(Error::InvalidPipeline(format!(
                    "Duplicate stage id '{}'",
                    stage.id
                )));
            }
        }

        let state = self.lock();
        let Some(job) = state.job.as_ref() else {
            return Ok(());
        };
        let in_use: Vec<String> = job
            .stages()
            .into_iter()
            .map(|s| s.id)
            .filter(|id| !seen.contains(id.as_str()))
            .filter(|id| state.applications.iter().any(|a| &a.current_stage == id))
            .collect();
        if in_use.is_empty() {
            Ok(())
        } else {
            Err(Error::StageInUse(in_use))
        }
    }

    /// Publish/unpublish toggle.
    pub async fn toggle_status(&self) -> Result<JobStatus> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let next = self.lock().loaded_job()?.status.toggled();
        let payload = UpdateJobPayload {
            status: Some(next),
            ..Default::default()
        };
        match run_cancellable(&self.cancel, self.api.update_job(self.job_id, &payload)).await {
            Ok(updated) => {
                let mut state = self.lock();
                if let Some(job) = state.job.as_mut() {
                    job.status = updated.status;
                    if !updated.activities.is_empty() {
                        job.activities = updated.activities;
                    }
                }
                info!(job_id = %self.job_id, status = ?updated.status, "Job status changed");
                Ok(updated.status)
            }
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    pub fn activity_timeline(&self) -> Vec<TimelineEntry> {
        self.lock()
            .job
            .as_ref()
            .map(|job| build_timeline(&job.activities))
            .unwrap_or_default()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }
}
