pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod views;

use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    api_client::ApiClient, candidate_service::CandidateService,
    dashboard_service::DashboardService, department_service::DepartmentService,
    job_service::JobService, preferences_service::PreferencesStore, user_service::UserService,
};
use crate::views::{
    dashboard::DashboardView, departments::DepartmentsView, job_board::JobBoard,
    notifications::NotificationCenter, team::TeamView,
};

/// Services sharing one authenticated HTTP client. Views are built per page.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub dashboard_service: DashboardService,
    pub job_service: JobService,
    pub candidate_service: CandidateService,
    pub department_service: DepartmentService,
    pub user_service: UserService,
    dashboard_preview: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let api = ApiClient::new(config)?;

        Ok(Self {
            dashboard_service: DashboardService::new(api.clone()),
            job_service: JobService::new(api.clone()),
            candidate_service: CandidateService::new(api.clone()),
            department_service: DepartmentService::new(api.clone()),
            user_service: UserService::new(api.clone()),
            dashboard_preview: config.dashboard_preview,
            api,
        })
    }

    pub fn dashboard(&self) -> DashboardView<DashboardService> {
        DashboardView::new(
            self.dashboard_service.clone(),
            self.dashboard_service.clone(),
            self.dashboard_preview,
        )
    }

    pub fn notifications(&self) -> NotificationCenter<DashboardService> {
        NotificationCenter::new(self.dashboard_service.clone())
    }

    pub fn job_board(&self, job_id: Uuid) -> JobBoard<JobService> {
        JobBoard::new(self.job_service.clone(), job_id)
    }

    pub fn departments(&self) -> DepartmentsView {
        DepartmentsView::new(self.department_service.clone())
    }

    pub fn team(&self) -> TeamView {
        TeamView::new(self.user_service.clone())
    }

    /// Drops the token and every client-side preference.
    pub async fn logout(&self, preferences: &mut PreferencesStore) -> Result<()> {
        self.api.set_token(None);
        preferences.clear().await?;
        tracing::info!("Logged out");
        Ok(())
    }
}
