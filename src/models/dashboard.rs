use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentGrowth {
    #[serde(default)]
    pub jobs_growth: f64,
    #[serde(default)]
    pub candidates_growth: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub total_jobs: u64,
    pub total_candidates: u64,
    pub total_users: u64,
    pub active_jobs: u64,
    pub recent_jobs: u64,
    pub recent_candidates: u64,
    pub hires_count: u64,
    #[serde(default)]
    pub recent_growth: RecentGrowth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Performer {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub jobs_count: Option<u64>,
    #[serde(default)]
    pub activities_count: Option<u64>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopPerformers {
    #[serde(default)]
    pub top_hiring_managers: Vec<Performer>,
    #[serde(default)]
    pub top_interviewers: Vec<Performer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTaken {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub actions_count: u64,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthMetrics {
    pub month: String,
    pub jobs_created: u64,
    pub applications_received: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MyPerformance {
    pub total_jobs_created: u64,
    pub total_applications_received: u64,
    /// Keyed `month_0` (current) .. `month_5`.
    #[serde(default)]
    pub metrics_by_month: BTreeMap<String, MonthMetrics>,
}

impl MyPerformance {
    /// Oldest month first, ready for a chart.
    pub fn months_chronological(&self) -> Vec<&MonthMetrics> {
        let mut keyed: Vec<(u32, &MonthMetrics)> = self
            .metrics_by_month
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix("month_")
                    .and_then(|n| n.parse().ok())
                    .map(|n| (n, v))
            })
            .collect();
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        keyed.into_iter().map(|(_, v)| v).collect()
    }
}
