use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::user_dto::TeamMemberForm;
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::services::user_service::UserService;
use crate::utils::cancel::run_cancellable;
use crate::utils::validation::field_error;

/// Which modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Uuid),
}

#[derive(Debug, Default)]
struct TeamState {
    users: Vec<User>,
    mode: Option<FormMode>,
    loaded: bool,
    error: Option<String>,
}

pub struct TeamView {
    service: UserService,
    state: Mutex<TeamState>,
    cancel: CancellationToken,
}

impl TeamView {
    pub fn new(service: UserService) -> Self {
        Self {
            service,
            state: Mutex::new(TeamState::default()),
            cancel: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TeamState> {
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
        match run_cancellable(&self.cancel, self.service.list_users()).await {
            Ok(users) => {
                let mut state = self.lock();
                state.users = users;
                state.loaded = true;
                state.error = None;
                Ok(())
            }
            Err(e) => self.fail("Failed to load team members", e),
        }
    }

    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    pub fn open_create(&self) -> TeamMemberForm {
        let mut state = self.lock();
        state.mode = Some(FormMode::Create);
        state.error = None;
        TeamMemberForm::default()
    }

    /// Opens the edit modal prefilled from the loaded user.
    pub fn open_edit(&self, user_id: Uuid) -> Result<TeamMemberForm> {
        let mut state = self.lock();
        let form = state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(TeamMemberForm::for_user)
            .ok_or_else(|| Error::NotFound("Team member not found".to_string()))?;
        state.mode = Some(FormMode::Edit(user_id));
        state.error = None;
        Ok(form)
    }

    pub fn mode(&self) -> Option<FormMode> {
        self.lock().mode
    }

    pub fn cancel_form(&self) {
        let mut state = self.lock();
        state.mode = None;
        state.error = None;
    }

    /// Validates and sends the open form. On success the form closes and the list reloads.
    pub async fn submit(&self, form: &TeamMemberForm) -> Result<User> {
        let Some(mode) = self.mode() else {
            return Err(Error::BadRequest("No team member form is open".to_string()));
        };
        if let Err(e) = check_form(mode, form) {
            return self.fail("Team member form rejected", e);
        }

        let result = match mode {
            FormMode::Create => {
                run_cancellable(
                    &self.cancel,
                    self.service.create_user(&form.to_create_payload()),
                )
                .await
            }
            FormMode::Edit(id) => {
                run_cancellable(
                    &self.cancel,
                    self.service.update_user(id, &form.to_update_payload()),
                )
                .await
            }
        };
        let user = match result {
            Ok(user) => user,
            Err(e) => return self.fail("Failed to save team member", e),
        };

        {
            let mut state = self.lock();
            state.mode = None;
            state.error = None;
        }
        info!(user_id = %user.id, "Team member saved");
        self.load().await?;
        Ok(user)
    }

    pub async fn delete(&self, user_id: Uuid) -> Result<()> {
        if let Err(e) = run_cancellable(&self.cancel, self.service.delete_user(user_id)).await {
            return self.fail("Failed to delete team member", e);
        }
        self.load().await
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

fn check_form(mode: FormMode, form: &TeamMemberForm) -> Result<()> {
    if mode == FormMode::Create && form.password.is_empty() {
        return Err(field_error("password", "required", "Password is required").into());
    }
    form.validate()?;
    Ok(())
}
