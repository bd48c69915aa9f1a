//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a submitted text is not empty or whitespace-only.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("Paris") // Ok
/// validate_not_blank("   ")   // Err - whitespace only
/// validate_not_blank("")      // Err - empty
/// ```
pub fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("text must not be empty or whitespace-only".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank_valid() {
        assert!(validate_not_blank("Paris").is_ok());
        assert!(validate_not_blank("  4 ").is_ok());
        assert!(validate_not_blank("a").is_ok());
    }

    #[test]
    fn test_validate_not_blank_invalid() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" ").is_err());
        assert!(validate_not_blank("\t\n").is_err());
    }
}
