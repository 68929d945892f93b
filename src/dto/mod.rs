pub mod candidate_dto;
pub mod department_dto;
pub mod job_dto;
pub mod user_dto;
