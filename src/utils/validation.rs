use validator::{Validate, ValidationError, ValidationErrors};

pub fn validate<T: Validate>(val: &T) -> Result<(), validator::ValidationErrors> {
    val.validate()
}

/// Single-field failure with a human readable message.
pub fn field_error(field: &'static str, code: &'static str, message: &str) -> ValidationErrors {
    let mut error = ValidationError::new(code);
    error.message = Some(message.to_string().into());
    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    errors
}
