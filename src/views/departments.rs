use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::department_dto::DepartmentPayload;
use crate::error::{Error, Result};
use crate::models::department::{Department, DepartmentStatus};
use crate::services::department_service::DepartmentService;
use crate::utils::cancel::run_cancellable;
use crate::utils::time::{now, CreatedBucket};

/// Search box plus checkbox filters. An empty set matches everything.
#[derive(Debug, Clone, Default)]
pub struct DepartmentFilters {
    pub search: String,
    pub statuses: HashSet<DepartmentStatus>,
    pub owners: HashSet<String>,
    pub created: HashSet<CreatedBucket>,
}

impl DepartmentFilters {
    pub fn matches(&self, dept: &Department, now: DateTime<Utc>) -> bool {
        let query = self.search.trim().to_lowercase();
        let owner = dept.owner_name().unwrap_or_default();
        let matches_search = query.is_empty()
            || dept.name.to_lowercase().contains(&query)
            || dept
                .location
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&query)
            || owner.to_lowercase().contains(&query);

        let matches_status = self.statuses.is_empty() || self.statuses.contains(&dept.status);
        let matches_owner = self.owners.is_empty()
            || dept.owner_name().is_some_and(|name| self.owners.contains(name));
        let matches_created = self.created.is_empty()
            || dept
                .created_at
                .is_some_and(|ts| self.created.contains(&CreatedBucket::classify(ts, now)));

        matches_search && matches_status && matches_owner && matches_created
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption<T> {
    pub value: T,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub statuses: Vec<FilterOption<DepartmentStatus>>,
    pub owners: Vec<FilterOption<String>>,
    pub created: Vec<FilterOption<CreatedBucket>>,
}

/// Options are derived from the whole list; counts ignore the active filters.
pub fn filter_options(departments: &[Department], now: DateTime<Utc>) -> FilterOptions {
    let mut statuses: Vec<DepartmentStatus> = Vec::new();
    for dept in departments {
        if !statuses.contains(&dept.status) {
            statuses.push(dept.status);
        }
    }
    let owners: BTreeSet<&str> = departments.iter().filter_map(Department::owner_name).collect();

    FilterOptions {
        statuses: statuses
            .into_iter()
            .map(|status| FilterOption {
                value: status,
                label: status.label().to_string(),
                count: departments.iter().filter(|d| d.status == status).count(),
            })
            .collect(),
        owners: owners
            .into_iter()
            .map(|name| FilterOption {
                value: name.to_string(),
                label: name.to_string(),
                count: departments
                    .iter()
                    .filter(|d| d.owner_name() == Some(name))
                    .count(),
            })
            .collect(),
        created: CreatedBucket::ALL
            .into_iter()
            .map(|bucket| FilterOption {
                value: bucket,
                label: bucket.label().to_string(),
                count: departments
                    .iter()
                    .filter_map(|d| d.created_at)
                    .filter(|ts| CreatedBucket::classify(*ts, now) == bucket)
                    .count(),
            })
            .collect(),
    }
}

#[derive(Debug, Default)]
struct DepartmentsState {
    departments: Vec<Department>,
    filters: DepartmentFilters,
    loaded: bool,
    error: Option<String>,
}

pub struct DepartmentsView {
    service: DepartmentService,
    state: Mutex<DepartmentsState>,
    cancel: CancellationToken,
}

impl DepartmentsView {
    pub fn new(service: DepartmentService) -> Self {
        Self {
            service,
            state: Mutex::new(DepartmentsState::default()),
            cancel: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DepartmentsState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn fail<T>(&self, context: &str, err: Error) -> Result<T> {
        if !err.is_cancelled() {
            warn!(error = %err, "{}", context);
            self.lock().error = Some(err.inline_message());
        }
        Err(err)
    }

    pub async fn load(&self) -> Result<()> {
        match run_cancellable(&self.cancel, self.service.list_departments()).await {
            Ok(departments) => {
                let mut state = self.lock();
                state.departments = departments;
                state.loaded = true;
                state.error = None;
                Ok(())
            }
            Err(e) => self.fail("Failed to load departments", e),
        }
    }

    pub fn set_search(&self, query: impl Into<String>) {
        self.lock().filters.search = query.into();
    }

    pub fn set_filters(&self, filters: DepartmentFilters) {
        self.lock().filters = filters;
    }

    pub fn filters(&self) -> DepartmentFilters {
        self.lock().filters.clone()
    }

    pub fn departments(&self) -> Vec<Department> {
        self.lock().departments.clone()
    }

    /// Rows after search and filters, in server order.
    pub fn visible(&self) -> Vec<Department> {
        self.visible_at(now())
    }

    pub fn visible_at(&self, now: DateTime<Utc>) -> Vec<Department> {
        let state = self.lock();
        state
            .departments
            .iter()
            .filter(|d| state.filters.matches(d, now))
            .cloned()
            .collect()
    }

    pub fn filter_options(&self) -> FilterOptions {
        filter_options(&self.lock().departments, now())
    }

    /// Create when `id` is `None`, update otherwise; reloads the list on success.
    pub async fn save(&self, id: Option<Uuid>, form: &DepartmentPayload) -> Result<Department> {
        let result = match id {
            None => {
                run_cancellable(&self.cancel, self.service.create_department(form)).await
            }
            Some(id) => {
                run_cancellable(&self.cancel, self.service.update_department(id, form)).await
            }
        };
        let saved = match result {
            Ok(saved) => saved,
            Err(e) => return self.fail("Failed to save department", e),
        };
        info!(department_id = %saved.id, "Department saved");
        self.load().await?;
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if let Err(e) = run_cancellable(&self.cancel, self.service.delete_department(id)).await {
            return self.fail("Failed to delete department", e);
        }
        info!(department_id = %id, "Department deleted");
        self.load().await
    }

    /// Removes a member and decrements the local member count on success.
    pub async fn remove_member(&self, department_id: Uuid, user_id: Uuid) -> Result<()> {
        let result = run_cancellable(
            &self.cancel,
            self.service.remove_member(department_id, user_id),
        )
        .await;
        if let Err(e) = result {
            return self.fail("Failed to remove department member", e);
        }
        let mut state = self.lock();
        if let Some(dept) = state.departments.iter_mut().find(|d| d.id == department_id) {
            dept.total_members_count = dept.total_members_count.saturating_sub(1);
        }
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().loaded
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }
}
