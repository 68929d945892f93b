use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::dashboard::{ActionTaken, DashboardOverview, MyPerformance, TopPerformers};
use crate::services::dashboard_service::{ActivityFeed, DashboardService};
use crate::utils::cancel::run_cancellable;
use crate::views::notifications::{NotificationCenter, NotificationView};

/// One dashboard widget. Cards fail independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Card<T> {
    #[default]
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Card<T> {
    fn from_result(name: &str, result: Result<T>) -> Option<Self> {
        match result {
            Ok(value) => Some(Card::Ready(value)),
            Err(Error::Cancelled) => None,
            Err(e) => {
                warn!(card = name, error = %e, "Dashboard card failed to load");
                Some(Card::Failed(e.inline_message()))
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Card::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardCards {
    pub overview: Card<DashboardOverview>,
    pub top_performers: Card<TopPerformers>,
    pub actions_taken: Card<Vec<ActionTaken>>,
    pub my_performance: Card<MyPerformance>,
}

#[derive(Debug, Default)]
struct DashboardState {
    cards: DashboardCards,
    show_all: bool,
}

/// Home page: summary cards plus the notifications widget.
pub struct DashboardView<F> {
    service: DashboardService,
    notifications: NotificationCenter<F>,
    preview_limit: usize,
    state: Mutex<DashboardState>,
    cancel: CancellationToken,
}

impl<F: ActivityFeed> DashboardView<F> {
    pub fn new(service: DashboardService, feed: F, preview_limit: usize) -> Self {
        Self {
            service,
            notifications: NotificationCenter::new(feed),
            preview_limit,
            state: Mutex::new(DashboardState::default()),
            cancel: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Loads every card and the notification feed concurrently.
    pub async fn load(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let (overview, top, actions, performance, feed) = tokio::join!(
            run_cancellable(&self.cancel, self.service.overview()),
            run_cancellable(&self.cancel, self.service.top_performers()),
            run_cancellable(&self.cancel, self.service.actions_taken()),
            run_cancellable(&self.cancel, self.service.my_performance()),
            self.notifications.refresh(),
        );

        let mut state = self.lock();
        let cards = &mut state.cards;
        if let Some(card) = Card::from_result("overview", overview) {
            cards.overview = card;
        }
        if let Some(card) = Card::from_result("top_performers", top) {
            cards.top_performers = card;
        }
        if let Some(card) = Card::from_result("actions_taken", actions) {
            cards.actions_taken = card;
        }
        if let Some(card) = Card::from_result("my_performance", performance) {
            cards.my_performance = card;
        }
        drop(state);

        match feed {
            Err(Error::Cancelled) => Err(Error::Cancelled),
            // Surfaced through `notifications().error()`.
            _ => Ok(()),
        }
    }

    pub fn cards(&self) -> DashboardCards {
        self.lock().cards.clone()
    }

    pub fn notifications(&self) -> &NotificationCenter<F> {
        &self.notifications
    }

    /// First few notifications, or all of them once expanded.
    pub fn recent(&self) -> Vec<NotificationView> {
        if self.lock().show_all {
            self.notifications.notifications()
        } else {
            self.notifications.preview(self.preview_limit)
        }
    }

    pub fn has_more(&self) -> bool {
        !self.lock().show_all && self.notifications.notifications().len() > self.preview_limit
    }

    pub fn toggle_show_all(&self) {
        let mut state = self.lock();
        state.show_all = !state.show_all;
    }

    pub fn close(&self) {
        self.cancel.cancel();
        self.notifications.close();
    }
}
