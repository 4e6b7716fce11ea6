//! Form validation helpers.
//!
//! Validators collect every violation before failing so the response can
//! annotate all offending fields in one round trip, rather than surfacing
//! them one at a time.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use super::ApiError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Accumulates violations across a whole form.
#[derive(Debug, Default)]
pub struct Violations {
    list: Vec<FieldViolation>,
}

impl Violations {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.list.push(FieldViolation::new(field, message));
    }

    /// Record a violation when `value` is blank. Returns whether the value
    /// was present, so callers can chain format checks.
    pub fn require(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.push(field, "This field is required");
            false
        } else {
            true
        }
    }

    pub fn require_email(&mut self, field: &str, value: &str) {
        if self.require(field, value) && !is_valid_email(value.trim()) {
            self.push(field, "Enter a valid email address");
        }
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.list.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError(self.list))
        }
    }
}

/// Minimal shape check, not RFC 5322: one `@`, non-empty local part, and a
/// domain containing a dot.
pub fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !s.contains(char::is_whitespace)
}

/// Normalize a submitted session date-time to a UTC instant.
///
/// Booking forms submit local wall-clock times without zone information;
/// those are interpreted in the studio's configured offset. Stored
/// timestamps are always UTC RFC 3339 so string ordering matches
/// chronological ordering.
pub fn normalize_session_date(raw: &str, studio_offset: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // HTML datetime-local inputs omit seconds
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return localize(naive, studio_offset);
        }
    }

    // A bare date books the start of that day
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return localize(date.and_hms_opt(0, 0, 0)?, studio_offset);
    }

    None
}

fn localize(naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Validate an optional preferred date on an enquiry (YYYY-MM-DD).
pub fn validate_preferred_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b+tag@mail.example.org"));
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("ana@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@.com"));
        assert!(!is_valid_email("ana b@example.com"));
    }

    fn normalized(raw: &str, offset: FixedOffset) -> Option<String> {
        normalize_session_date(raw, offset).map(|dt| dt.to_rfc3339())
    }

    #[test]
    fn test_normalize_datetime_local_input() {
        assert_eq!(
            normalized("2026-03-14T15:30", utc()).as_deref(),
            Some("2026-03-14T15:30:00+00:00")
        );
        assert_eq!(
            normalized("2026-03-14T15:30:45", utc()).as_deref(),
            Some("2026-03-14T15:30:45+00:00")
        );
    }

    #[test]
    fn test_normalize_applies_studio_offset() {
        let lisbon_summer = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            normalized("2026-03-14T15:30", lisbon_summer).as_deref(),
            Some("2026-03-14T14:30:00+00:00")
        );
    }

    #[test]
    fn test_normalize_converts_explicit_offsets_to_utc() {
        assert_eq!(
            normalized("2026-03-14T15:30:00-05:00", utc()).as_deref(),
            Some("2026-03-14T20:30:00+00:00")
        );
    }

    #[test]
    fn test_normalize_bare_date_books_midnight() {
        assert_eq!(
            normalized("2026-03-14", utc()).as_deref(),
            Some("2026-03-14T00:00:00+00:00")
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_session_date("next tuesday", utc()).is_none());
        assert!(normalize_session_date("14/03/2026", utc()).is_none());
        assert!(normalize_session_date("", utc()).is_none());
    }

    #[test]
    fn test_violations_collect_all_fields() {
        let mut v = Violations::default();
        v.require("client_name", "");
        v.require_email("email", "not-an-email");
        v.require("phone", "  ");

        let Err(ApiError::ValidationError(fields)) = v.into_result() else {
            panic!("expected validation error");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["client_name", "email", "phone"]);
    }

    #[test]
    fn test_violations_empty_is_ok() {
        let mut v = Violations::default();
        v.require("client_name", "Ana");
        v.require_email("email", "ana@example.com");
        assert!(v.into_result().is_ok());
    }
}
