pub mod cancel;
pub mod time;
pub mod validation;
