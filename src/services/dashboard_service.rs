use async_trait::async_trait;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::activity::RecentActivity;
use crate::models::dashboard::{ActionTaken, DashboardOverview, MyPerformance, TopPerformers};
use crate::services::api_client::ApiClient;

/// Source of the notification feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityFeed: Send + Sync {
    async fn recent_activities(&self) -> Result<Vec<RecentActivity>>;
    async fn dismiss_activity(&self, notification_key: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct DashboardService {
    api: ApiClient,
}

impl DashboardService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn overview(&self) -> Result<DashboardOverview> {
        self.api.get("dashboard/overview").await
    }

    pub async fn top_performers(&self) -> Result<TopPerformers> {
        self.api.get("dashboard/top-performers").await
    }

    pub async fn actions_taken(&self) -> Result<Vec<ActionTaken>> {
        self.api.get("dashboard/actions-taken").await
    }

    pub async fn my_performance(&self) -> Result<MyPerformance> {
        self.api.get("dashboard/my-performance").await
    }
}

#[async_trait]
impl ActivityFeed for DashboardService {
    async fn recent_activities(&self) -> Result<Vec<RecentActivity>> {
        self.api.get("dashboard/recent-activities").await
    }

    #[instrument(skip(self))]
    async fn dismiss_activity(&self, notification_key: &str) -> Result<()> {
        let path = format!("dashboard/recent-activities/{}/dismiss", notification_key);
        self.api.post_empty(&path).await?;
        info!("Activity dismissed");
        Ok(())
    }
}
