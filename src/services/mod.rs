pub mod api_client;
pub mod candidate_service;
pub mod dashboard_service;
pub mod department_service;
pub mod job_service;
pub mod preferences_service;
pub mod user_service;
