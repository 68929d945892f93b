use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::user_dto::{CreateUserPayload, UpdateUserPayload};
use crate::error::Result;
use crate::models::user::User;
use crate::services::api_client::ApiClient;

#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.api.get("users").await
    }

    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn create_user(&self, payload: &CreateUserPayload) -> Result<User> {
        let user: User = self.api.post("users", payload).await?;
        info!(user_id = %user.id, "Team member created");
        Ok(user)
    }

    pub async fn update_user(&self, id: Uuid, payload: &UpdateUserPayload) -> Result<User> {
        self.api.put(&format!("users/{}", id), payload).await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        self.api.delete(&format!("users/{}", id)).await
    }
}
