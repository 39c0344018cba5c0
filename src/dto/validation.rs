//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a text field contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates an optional link: either empty or an absolute http(s) URL.
///
/// # Examples
///
/// ```ignore
/// validate_http_url("")                       // Ok
/// validate_http_url("https://store.example")  // Ok
/// validate_http_url("ftp://store.example")    // Err
/// validate_http_url("https://")               // Err - no host
/// ```
pub fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }

    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) if !rest.is_empty() && !rest.chars().any(char::is_whitespace) => Ok(()),
        _ => {
            let mut err = ValidationError::new("http_url");
            err.message = Some("must be a valid http/https URL".into());
            Err(err)
        }
    }
}
