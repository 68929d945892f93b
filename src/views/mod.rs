pub mod activity_log;
pub mod dashboard;
pub mod departments;
pub mod job_board;
pub mod notifications;
pub mod team;
