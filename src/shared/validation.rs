//! Validation Utilities

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use validator::ValidationErrors;

use super::error::{AppError, FieldError};

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
            })
        })
        .collect();

    let message = field_errors
        .first()
        .map(|e| format!("{}: {}", e.field, e.message))
        .unwrap_or_else(|| "Validation failed".into());

    AppError::Validation(message)
}

/// Parse a timestamp coming from a form field.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (treated as UTC) and a bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Require a non-blank string field.
pub fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{}: field is required", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_supported_timestamp_shapes() {
        let rfc = parse_timestamp("2024-03-01T10:00:00+03:00").unwrap();
        assert_eq!(rfc.hour(), 7);

        let local = parse_timestamp("2024-03-01T10:30").unwrap();
        assert_eq!((local.hour(), local.minute()), (10, 30));

        let day = parse_timestamp("2024-03-01").unwrap();
        assert_eq!((day.month(), day.day(), day.hour()), (3, 1, 0));

        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn required_rejects_blank() {
        assert!(required(Some("  "), "title").is_err());
        assert!(required(None, "title").is_err());
        assert_eq!(required(Some(" ok "), "title").unwrap(), "ok");
    }
}
