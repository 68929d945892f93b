use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Session expired, please sign in again")]
    SessionExpired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Stage '{0}' is not part of this job's pipeline")]
    UnknownStage(String),

    #[error("Stages still hold candidates: {}", .0.join(", "))]
    StageInUse(Vec<String>),

    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),
}

impl Error {
    /// Message shown in the single inline error banner of a view.
    pub fn inline_message(&self) -> String {
        match self {
            Error::BadRequest(msg) | Error::Unauthorized(msg) | Error::NotFound(msg) => {
                msg.clone()
            }
            Error::Api { message, .. } => message.clone(),
            Error::Validation(errors) => validation_summary(errors),
            Error::Http(err) if err.is_timeout() => {
                "The server took too long to respond. Please try again.".to_string()
            }
            Error::Http(_) => "Could not reach the server. Please try again.".to_string(),
            Error::Json(_) => "The server returned an unexpected response.".to_string(),
            Error::Io(err) => err.to_string(),
            Error::Config(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

fn validation_summary(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reason = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| {
                    errs.first()
                        .map(|e| e.code.to_string())
                        .unwrap_or_else(|| "invalid".to_string())
                });
            format!("{}: {}", field.replace('_', " "), reason)
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn inline_message_prefers_backend_detail() {
        let err = Error::Api {
            status: StatusCode::CONFLICT,
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.inline_message(), "Email already registered");
    }

    #[test]
    fn inline_message_lists_validation_fields() {
        let mut errors = ValidationErrors::new();
        let mut mismatch = ValidationError::new("must_match");
        mismatch.message = Some("Passwords do not match".into());
        errors.add("password", mismatch);
        errors.add("full_name", ValidationError::new("length"));

        let err = Error::from(errors);
        assert_eq!(
            err.inline_message(),
            "full name: length; password: Passwords do not match"
        );
    }

    #[test]
    fn stage_in_use_names_every_stage() {
        let err = Error::StageInUse(vec!["offer".into(), "hired".into()]);
        assert_eq!(err.to_string(), "Stages still hold candidates: offer, hired");
    }
}
