//! Entry name validation.

use stowage_core::error::AppError;
use stowage_core::result::AppResult;

/// Longest accepted folder or file name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Validate a folder or file name and return it trimmed.
pub fn validate_name(label: &str, name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{label} name cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{label} name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    if trimmed.contains(['/', '\\', '\0']) {
        return Err(AppError::validation(format!(
            "{label} name cannot contain '/', '\\' or NUL"
        )));
    }
    Ok(trimmed.to_string())
}
