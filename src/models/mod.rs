pub mod activity;
pub mod candidate;
pub mod dashboard;
pub mod department;
pub mod job;
pub mod user;
