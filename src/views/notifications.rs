use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::activity::{ActivityKind, RecentActivity};
use crate::services::dashboard_service::ActivityFeed;
use crate::utils::cancel::run_cancellable;

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationView {
    pub id: String,
    pub kind: ActivityKind,
    pub title: String,
    pub description: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub unread: bool,
    pub dismissable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissOutcome {
    Dismissed,
    /// No `notification_key`, or the id is not in the current list.
    NotDismissable,
}

#[derive(Debug, Default)]
struct FeedState {
    items: Vec<RecentActivity>,
    acknowledged: HashSet<String>,
    pending_dismissals: HashSet<String>,
    dismissed: HashSet<String>,
    requested: u64,
    applied: u64,
    loaded: bool,
    error: Option<String>,
}

impl FeedState {
    fn is_hidden(&self, item: &RecentActivity) -> bool {
        item.notification_key
            .as_ref()
            .is_some_and(|k| self.pending_dismissals.contains(k) || self.dismissed.contains(k))
    }

    fn visible(&self) -> impl Iterator<Item = &RecentActivity> {
        self.items.iter().filter(|item| !self.is_hidden(item))
    }

    fn view(&self, item: &RecentActivity) -> NotificationView {
        NotificationView {
            id: item.id.clone(),
            kind: item.kind,
            title: item.title.clone(),
            description: item.description.clone(),
            timestamp: item.timestamp,
            unread: !self.acknowledged.contains(&item.id),
            dismissable: item.notification_key.is_some(),
        }
    }
}

/// Notification bell / recent-activity widget state.
///
/// Read state lives only in this session. Dismissal is persisted by the backend
/// and keyed by `notification_key`, which is distinct from the activity id.
pub struct NotificationCenter<F> {
    feed: F,
    state: Mutex<FeedState>,
    cancel: CancellationToken,
}

impl<F: ActivityFeed> NotificationCenter<F> {
    pub fn new(feed: F) -> Self {
        Self {
            feed,
            state: Mutex::new(FeedState::default()),
            cancel: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetches the feed. Responses older than the last applied one are dropped.
    pub async fn refresh(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let ticket = {
            let mut state = self.lock();
            state.requested += 1;
            state.requested
        };

        let result = run_cancellable(&self.cancel, self.feed.recent_activities()).await;

        let mut state = self.lock();
        if ticket < state.applied {
            debug!(ticket, applied = state.applied, "Dropping stale activity response");
            return result.map(|_| ());
        }
        match result {
            Ok(items) => {
                debug!(count = items.len(), "Activity feed refreshed");
                state.applied = ticket;
                state.items = items;
                state.loaded = true;
                state.error = None;
                Ok(())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                warn!(error = %e, "Failed to fetch recent activities");
                state.error = Some(e.inline_message());
                Err(e)
            }
        }
    }

    /// Visible items in server order.
    pub fn notifications(&self) -> Vec<NotificationView> {
        let state = self.lock();
        state.visible().map(|item| state.view(item)).collect()
    }

    pub fn preview(&self, limit: usize) -> Vec<NotificationView> {
        let state = self.lock();
        state.visible().take(limit).map(|item| state.view(item)).collect()
    }

    pub fn unread_count(&self) -> usize {
        let state = self.lock();
        state
            .visible()
            .filter(|item| !state.acknowledged.contains(&item.id))
            .count()
    }

    pub fn mark_as_read(&self, id: &str) {
        self.lock().acknowledged.insert(id.to_string());
    }

    pub fn mark_all_read(&self) {
        let mut state = self.lock();
        let ids: Vec<String> = state.visible().map(|item| item.id.clone()).collect();
        state.acknowledged.extend(ids);
    }

    /// Dismisses the item server side, then refetches. There is no undo.
    pub async fn dismiss(&self, id: &str) -> Result<DismissOutcome> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let key = {
            let mut state = self.lock();
            let key = state
                .visible()
                .find(|item| item.id == id)
                .and_then(|item| item.notification_key.clone());
            let Some(key) = key else {
                debug!(id, "Activity has no dismissal key, ignoring");
                return Ok(DismissOutcome::NotDismissable);
            };
            state.pending_dismissals.insert(key.clone());
            key
        };

        let result = run_cancellable(&self.cancel, self.feed.dismiss_activity(&key)).await;

        {
            let mut state = self.lock();
            state.pending_dismissals.remove(&key);
            match result {
                Ok(()) => {
                    state.dismissed.insert(key.clone());
                    state.acknowledged.insert(id.to_string());
                }
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    warn!(error = %e, notification_key = %key, "Failed to dismiss activity");
                    state.error = Some(e.inline_message());
                    return Err(e);
                }
            }
        }

        info!(notification_key = %key, "Activity dismissed");
        if let Err(e) = self.refresh().await {
            if !e.is_cancelled() {
                warn!(error = %e, "Refetch after dismissal failed");
            }
        }
        Ok(DismissOutcome::Dismissed)
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().loaded
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    /// Cancels in-flight requests; later responses are discarded.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dashboard_service::MockActivityFeed;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use tokio::sync::oneshot;

    fn activity(id: &str, key: Option<&str>) -> RecentActivity {
        RecentActivity {
            id: id.to_string(),
            kind: ActivityKind::CandidateCreated,
            title: format!("New candidate: {}", id),
            description: None,
            timestamp: None,
            user: None,
            notification_key: key.map(str::to_string),
        }
    }

    fn ids(views: &[NotificationView]) -> Vec<&str> {
        views.iter().map(|v| v.id.as_str()).collect()
    }

    #[tokio::test]
    async fn unread_tracks_acknowledged_ids() {
        let mut feed = MockActivityFeed::new();
        feed.expect_recent_activities().returning(|| {
            Ok(vec![
                activity("c3", Some("k3")),
                activity("c1", None),
                activity("c2", Some("k2")),
            ])
        });
        let center = NotificationCenter::new(feed);
        center.refresh().await.unwrap();

        assert_eq!(ids(&center.notifications()), vec!["c3", "c1", "c2"]);
        assert_eq!(center.unread_count(), 3);

        center.mark_as_read("c1");
        let views = center.notifications();
        assert!(views.iter().all(|v| v.unread == (v.id != "c1")));

        center.mark_all_read();
        assert_eq!(center.unread_count(), 0);
        assert!(center.notifications().iter().all(|v| !v.unread));
    }

    #[tokio::test]
    async fn items_without_key_are_not_dismissable() {
        let mut feed = MockActivityFeed::new();
        feed.expect_recent_activities()
            .times(1)
            .returning(|| Ok(vec![activity("c1", None)]));
        feed.expect_dismiss_activity().never();
        let center = NotificationCenter::new(feed);
        center.refresh().await.unwrap();

        assert!(!center.notifications()[0].dismissable);
        let outcome = center.dismiss("c1").await.unwrap();
        assert_eq!(outcome, DismissOutcome::NotDismissable);
        assert_eq!(center.dismiss("missing").await.unwrap(), DismissOutcome::NotDismissable);
        assert_eq!(ids(&center.notifications()), vec!["c1"]);
    }

    #[tokio::test]
    async fn dismiss_refetches_and_item_disappears() {
        let mut feed = MockActivityFeed::new();
        let mut calls = 0;
        feed.expect_recent_activities().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(vec![activity("c1", Some("k1")), activity("c2", Some("k2"))])
            } else {
                Ok(vec![activity("c2", Some("k2"))])
            }
        });
        feed.expect_dismiss_activity()
            .withf(|key| key == "k1")
            .times(1)
            .returning(|_| Ok(()));

        let center = NotificationCenter::new(feed);
        center.refresh().await.unwrap();
        let outcome = center.dismiss("c1").await.unwrap();

        assert_eq!(outcome, DismissOutcome::Dismissed);
        assert_eq!(ids(&center.notifications()), vec!["c2"]);
        assert!(center.error().is_none());
    }

    #[tokio::test]
    async fn failed_dismiss_restores_item_and_reports_inline() {
        let mut feed = MockActivityFeed::new();
        feed.expect_recent_activities()
            .times(1)
            .returning(|| Ok(vec![activity("c1", Some("k1"))]));
        feed.expect_dismiss_activity().times(1).returning(|_| {
            Err(Error::Api {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Could not dismiss".into(),
            })
        });

        let center = NotificationCenter::new(feed);
        center.refresh().await.unwrap();
        assert!(center.dismiss("c1").await.is_err());

        assert_eq!(ids(&center.notifications()), vec!["c1"]);
        assert_eq!(center.error().as_deref(), Some("Could not dismiss"));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_items() {
        let mut feed = MockActivityFeed::new();
        let mut calls = 0;
        feed.expect_recent_activities().returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(vec![activity("c1", None)])
            } else {
                Err(Error::NotFound("gone".into()))
            }
        });
        let center = NotificationCenter::new(feed);
        center.refresh().await.unwrap();
        assert!(center.refresh().await.is_err());
        assert_eq!(ids(&center.notifications()), vec!["c1"]);
        assert_eq!(center.error().as_deref(), Some("gone"));
    }

    #[tokio::test]
    async fn closed_center_ignores_responses() {
        let mut feed = MockActivityFeed::new();
        feed.expect_recent_activities().never();
        let center = NotificationCenter::new(feed);
        center.close();
        assert!(matches!(center.refresh().await, Err(Error::Cancelled)));
        assert!(!center.is_loaded());
        assert!(center.error().is_none());
    }

    /// Feed whose responses can be held back until the test releases them.
    #[derive(Default)]
    struct ScriptedFeed {
        fetches: Mutex<VecDeque<(Option<oneshot::Receiver<()>>, Vec<RecentActivity>)>>,
        dismiss_gate: Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl ScriptedFeed {
        fn push_fetch(&self, gate: Option<oneshot::Receiver<()>>, items: Vec<RecentActivity>) {
            self.fetches.lock().unwrap().push_back((gate, items));
        }
    }

    #[async_trait]
    impl ActivityFeed for ScriptedFeed {
        async fn recent_activities(&self) -> Result<Vec<RecentActivity>> {
            let next = self.fetches.lock().unwrap().pop_front();
            let (gate, items) = next.expect("unexpected fetch");
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(items)
        }

        async fn dismiss_activity(&self, _notification_key: &str) -> Result<()> {
            let gate = self.dismiss_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn refetch_during_pending_dismissal_does_not_resurrect_item() {
        let feed = ScriptedFeed::default();
        feed.push_fetch(None, vec![activity("c1", Some("k1")), activity("c2", None)]);
        // Fetched while the dismissal is still in flight: server still has c1.
        feed.push_fetch(None, vec![activity("c1", Some("k1")), activity("c2", None)]);
        // Refetch after dismissal resolves.
        feed.push_fetch(None, vec![activity("c2", None)]);
        let (release_dismiss, gate) = oneshot::channel();
        *feed.dismiss_gate.lock().unwrap() = Some(gate);

        let center = NotificationCenter::new(feed);
        center.refresh().await.unwrap();

        let (dismissed, _) = tokio::join!(center.dismiss("c1"), async {
            center.refresh().await.unwrap();
            assert_eq!(ids(&center.notifications()), vec!["c2"]);
            release_dismiss.send(()).unwrap();
        });

        assert_eq!(dismissed.unwrap(), DismissOutcome::Dismissed);
        assert_eq!(ids(&center.notifications()), vec!["c2"]);
    }

    #[tokio::test]
    async fn stale_fetch_resolving_after_dismissal_is_ignored() {
        let feed = ScriptedFeed::default();
        feed.push_fetch(None, vec![activity("c1", Some("k1"))]);
        let (release_fetch, gate) = oneshot::channel();
        feed.push_fetch(Some(gate), vec![activity("c1", Some("k1"))]);
        feed.push_fetch(None, vec![]);

        let center = NotificationCenter::new(feed);
        center.refresh().await.unwrap();

        let (slow_refresh, _) = tokio::join!(center.refresh(), async {
            assert_eq!(center.dismiss("c1").await.unwrap(), DismissOutcome::Dismissed);
            release_fetch.send(()).unwrap();
        });

        slow_refresh.unwrap();
        assert!(center.notifications().is_empty());
        assert_eq!(center.unread_count(), 0);
    }
}
