use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::department_dto::DepartmentPayload;
use crate::error::Result;
use crate::models::department::Department;
use crate::models::user::User;
use crate::services::api_client::ApiClient;
use crate::utils::validation::validate;

#[derive(Clone)]
pub struct DepartmentService {
    api: ApiClient,
}

impl DepartmentService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>> {
        self.api.get("departments").await
    }

    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create_department(&self, payload: &DepartmentPayload) -> Result<Department> {
        validate(payload)?;
        let dept: Department = self.api.post("departments", payload).await?;
        info!(department_id = %dept.id, "Department created");
        Ok(dept)
    }

    pub async fn update_department(
        &self,
        id: Uuid,
        payload: &DepartmentPayload,
    ) -> Result<Department> {
        validate(payload)?;
        self.api.put(&format!("departments/{}", id), payload).await
    }

    pub async fn delete_department(&self, id: Uuid) -> Result<()> {
        self.api.delete(&format!("departments/{}", id)).await
    }

    pub async fn members(&self, id: Uuid) -> Result<Vec<User>> {
        self.api.get(&format!("departments/{}/members", id)).await
    }

    #[instrument(skip(self))]
    pub async fn remove_member(&self, department_id: Uuid, user_id: Uuid) -> Result<()> {
        self.api
            .delete(&format!("departments/{}/members/{}", department_id, user_id))
            .await
    }
}
