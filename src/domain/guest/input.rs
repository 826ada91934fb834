//! Input checks applied before any request leaves the process.

use crate::domain::foundation::ValidationError;

const MAX_NAME_CHARS: usize = 100;
const MAX_EMAIL_CHARS: usize = 254;

/// Trims a display name or nickname and rejects empty or oversized values.
pub fn validate_name(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    let chars = trimmed.chars().count();
    if chars > MAX_NAME_CHARS {
        return Err(ValidationError::out_of_range(field, 1, MAX_NAME_CHARS, chars));
    }
    Ok(trimmed.to_string())
}

/// Validates an email address and returns it trimmed.
pub fn validate_email(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("email"));
    }
    if trimmed.len() > MAX_EMAIL_CHARS {
        return Err(ValidationError::out_of_range(
            "email",
            3,
            MAX_EMAIL_CHARS,
            trimmed.len(),
        ));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format("email", "contains whitespace"));
    }

    let (local, domain) = trimmed
        .split_once('@')
        .ok_or_else(|| ValidationError::invalid_format("email", "missing @ symbol"))?;
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::invalid_format("email", "malformed local part"));
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(ValidationError::invalid_format("email", "malformed domain"));
    }
    Ok(trimmed.to_string())
}

/// Optional email from a form: blank means "not given".
pub fn normalize_optional_email(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(email) => validate_email(email).map(Some),
    }
}
