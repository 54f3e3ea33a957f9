use crate::errors::AppError;

/// Returns the trimmed value, or a 400 naming the missing field.
pub fn required_text<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// Like `required_text`, but also enforces a character cap.
pub fn bounded_text<'a>(
    value: Option<&'a str>,
    field: &str,
    max_chars: usize,
) -> Result<&'a str, AppError> {
    let text = required_text(value, field)?;
    if text.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text(Some("  hi "), "text").unwrap(), "hi");
    }

    #[test]
    fn test_required_text_rejects_missing_and_blank() {
        for value in [None, Some(""), Some("   ")] {
            match required_text(value, "text") {
                Err(AppError::Validation(msg)) => assert_eq!(msg, "text is required"),
                other => panic!("unexpected: {other:?}"),
            }
        }
    }

    #[test]
    fn test_bounded_text_counts_chars_not_bytes() {
        assert!(bounded_text(Some("ééé"), "text", 3).is_ok());
        assert!(bounded_text(Some("éééé"), "text", 3).is_err());
    }
}
