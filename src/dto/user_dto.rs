use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{User, UserRole};

/// Team member modal state. `confirm_password` never leaves the client.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TeamMemberForm {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(must_match(other = "confirm_password", message = "Passwords do not match"))]
    pub password: String,
    pub confirm_password: String,
    pub role: UserRole,
}

impl TeamMemberForm {
    /// Prefills the edit modal; password stays blank unless changed.
    pub fn for_user(user: &User) -> Self {
        Self {
            full_name: user.full_name.clone().unwrap_or_default(),
            email: user.email.clone(),
            password: String::new(),
            confirm_password: String::new(),
            role: user.role,
        }
    }

    pub fn to_create_payload(&self) -> CreateUserPayload {
        CreateUserPayload {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
        }
    }

    pub fn to_update_payload(&self) -> UpdateUserPayload {
        UpdateUserPayload {
            full_name: Some(self.full_name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
            role: Some(self.role),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserPayload {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}
