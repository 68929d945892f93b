use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::department::{Department, DepartmentStatus};

/// Department modal fields, used for both create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DepartmentPayload {
    #[validate(length(min = 1, message = "Department name is required"))]
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<Uuid>,
    pub status: DepartmentStatus,
}

impl From<&Department> for DepartmentPayload {
    fn from(dept: &Department) -> Self {
        Self {
            name: dept.name.clone(),
            location: dept.location.clone(),
            description: dept.description.clone(),
            owner_id: dept.owner_id.or_else(|| dept.owner.as_ref().map(|o| o.id)),
            status: dept.status,
        }
    }
}
