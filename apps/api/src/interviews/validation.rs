//! Required-field checks and input coercion, applied before anything reaches a store.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::{Interview, Status};

/// Naive timestamp layouts accepted for `date`, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Request body for create and update.
///
/// Every field keeps the difference between "absent" (`None`) and an explicit
/// JSON `null` (`Some(Value::Null)`). Unknown keys, including `id`,
/// `createdAt` and `updatedAt`, are dropped.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewFields {
    #[serde(default, deserialize_with = "present")]
    pub date: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub company_name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub hr_name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub hr_contact: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub role: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub location: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub rounds: Option<Value>,
    #[serde(default, rename = "offeredCTC", deserialize_with = "present")]
    pub offered_ctc: Option<Value>,
    #[serde(default, rename = "expectedCTC", deserialize_with = "present")]
    pub expected_ctc: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub discussion: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub next_step: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub remarks: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub interview_schedule: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A validated record ready for insertion. Store-managed fields are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInterview {
    pub date: DateTime<Utc>,
    pub company_name: String,
    pub hr_name: Option<String>,
    pub hr_contact: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub rounds: Option<String>,
    pub offered_ctc: Option<String>,
    pub expected_ctc: Option<String>,
    pub discussion: Option<String>,
    pub next_step: Option<String>,
    pub status: Option<String>,
    pub remarks: Option<String>,
    pub interview_schedule: Option<String>,
}

impl NewInterview {
    /// Minimal record with only the required fields set.
    #[cfg(test)]
    pub fn new(date: DateTime<Utc>, company_name: impl Into<String>) -> Self {
        Self {
            date,
            company_name: company_name.into(),
            hr_name: None,
            hr_contact: None,
            role: None,
            location: None,
            rounds: None,
            offered_ctc: None,
            expected_ctc: None,
            discussion: None,
            next_step: None,
            status: None,
            remarks: None,
            interview_schedule: None,
        }
    }

    /// Builds the stored form with store-assigned identity and timestamps.
    pub fn into_record(self, id: Uuid, now: DateTime<Utc>) -> Interview {
        Interview {
            id,
            date: self.date,
            company_name: self.company_name,
            hr_name: self.hr_name,
            hr_contact: self.hr_contact,
            role: self.role,
            location: self.location,
            rounds: self.rounds,
            offered_ctc: self.offered_ctc,
            expected_ctc: self.expected_ctc,
            discussion: self.discussion,
            next_step: self.next_step,
            status: self.status,
            remarks: self.remarks,
            interview_schedule: self.interview_schedule,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A validated partial update.
///
/// Outer `None` leaves a field untouched. For optional fields `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterviewPatch {
    pub date: Option<DateTime<Utc>>,
    pub company_name: Option<String>,
    pub hr_name: Option<Option<String>>,
    pub hr_contact: Option<Option<String>>,
    pub role: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub rounds: Option<Option<String>>,
    pub offered_ctc: Option<Option<String>>,
    pub expected_ctc: Option<Option<String>>,
    pub discussion: Option<Option<String>>,
    pub next_step: Option<Option<String>>,
    pub status: Option<Option<String>>,
    pub remarks: Option<Option<String>>,
    pub interview_schedule: Option<Option<String>>,
}

impl InterviewPatch {
    pub fn is_empty(&self) -> bool {
        *self == InterviewPatch::default()
    }

    /// Merges the patch into `record`. `updated_at` is left to the caller.
    pub fn apply(self, record: &mut Interview) {
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(company_name) = self.company_name {
            record.company_name = company_name;
        }
        merge(&mut record.hr_name, self.hr_name);
        merge(&mut record.hr_contact, self.hr_contact);
        merge(&mut record.role, self.role);
        merge(&mut record.location, self.location);
        merge(&mut record.rounds, self.rounds);
        merge(&mut record.offered_ctc, self.offered_ctc);
        merge(&mut record.expected_ctc, self.expected_ctc);
        merge(&mut record.discussion, self.discussion);
        merge(&mut record.next_step, self.next_step);
        merge(&mut record.status, self.status);
        merge(&mut record.remarks, self.remarks);
        merge(&mut record.interview_schedule, self.interview_schedule);
    }
}

fn merge(slot: &mut Option<String>, update: Option<Option<String>>) {
    if let Some(value) = update {
        *slot = value;
    }
}

impl InterviewFields {
    /// Validates a create body. `date` and `companyName` must both be present.
    pub fn into_new(self) -> Result<NewInterview, AppError> {
        let mut problems = Vec::new();

        let date = match self.date.as_ref().filter(|v| !is_blank(v)) {
            Some(value) => match parse_timestamp(value) {
                Ok(date) => Some(date),
                Err(msg) => {
                    problems.push(msg);
                    None
                }
            },
            None => {
                problems.push("date is required".to_string());
                None
            }
        };

        let company_name = match required_text("companyName", self.company_name) {
            Ok(name) => Some(name),
            Err(msg) => {
                problems.push(msg);
                None
            }
        };

        let (Some(date), Some(company_name)) = (date, company_name) else {
            return Err(validation_failed(problems));
        };

        let new = NewInterview {
            date,
            company_name,
            hr_name: optional_text("hrName", self.hr_name)?.flatten(),
            hr_contact: optional_text("hrContact", self.hr_contact)?.flatten(),
            role: optional_text("role", self.role)?.flatten(),
            location: optional_text("location", self.location)?.flatten(),
            rounds: optional_text("rounds", self.rounds)?.flatten(),
            offered_ctc: optional_text("offeredCTC", self.offered_ctc)?.flatten(),
            expected_ctc: optional_text("expectedCTC", self.expected_ctc)?.flatten(),
            discussion: optional_text("discussion", self.discussion)?.flatten(),
            next_step: optional_text("nextStep", self.next_step)?.flatten(),
            status: optional_text("status", self.status)?.flatten(),
            remarks: optional_text("remarks", self.remarks)?.flatten(),
            interview_schedule: optional_text("interviewSchedule", self.interview_schedule)?
                .flatten(),
        };
        note_unconventional_status(new.status.as_deref());
        Ok(new)
    }

    /// Validates an update body. Provided required fields may change but may
    /// not be cleared.
    pub fn into_patch(self) -> Result<InterviewPatch, AppError> {
        let date = match self.date {
            None => None,
            Some(value) if is_blank(&value) => {
                return Err(validation_failed(vec!["date cannot be cleared".into()]))
            }
            Some(value) => {
                Some(parse_timestamp(&value).map_err(|msg| validation_failed(vec![msg]))?)
            }
        };

        let company_name = match self.company_name {
            None => None,
            Some(value) => Some(
                required_text("companyName", Some(value))
                    .map_err(|_| validation_failed(vec!["companyName cannot be cleared".into()]))?,
            ),
        };

        let patch = InterviewPatch {
            date,
            company_name,
            hr_name: optional_text("hrName", self.hr_name)?,
            hr_contact: optional_text("hrContact", self.hr_contact)?,
            role: optional_text("role", self.role)?,
            location: optional_text("location", self.location)?,
            rounds: optional_text("rounds", self.rounds)?,
            offered_ctc: optional_text("offeredCTC", self.offered_ctc)?,
            expected_ctc: optional_text("expectedCTC", self.expected_ctc)?,
            discussion: optional_text("discussion", self.discussion)?,
            next_step: optional_text("nextStep", self.next_step)?,
            status: optional_text("status", self.status)?,
            remarks: optional_text("remarks", self.remarks)?,
            interview_schedule: optional_text("interviewSchedule", self.interview_schedule)?,
        };
        if let Some(Some(status)) = &patch.status {
            note_unconventional_status(Some(status.as_str()));
        }
        Ok(patch)
    }
}

fn validation_failed(problems: Vec<String>) -> AppError {
    AppError::Validation(format!("Validation failed: {}", problems.join("; ")))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn required_text(field: &str, value: Option<Value>) -> Result<String, String> {
    match value.map(|v| coerce_text(field, v)) {
        Some(Ok(Some(text))) if !text.trim().is_empty() => Ok(text),
        Some(Err(msg)) => Err(msg),
        _ => Err(format!("{field} is required")),
    }
}

/// Absent stays `None`; `null` becomes `Some(None)`.
fn optional_text(field: &str, value: Option<Value>) -> Result<Option<Option<String>>, AppError> {
    value
        .map(|v| coerce_text(field, v))
        .transpose()
        .map_err(|msg| validation_failed(vec![msg]))
}

/// Scalars are stored as their text form, so `"rounds": 3` is kept as `"3"`.
fn coerce_text(field: &str, value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => Err(format!("{field} must be a string")),
    }
}

fn note_unconventional_status(status: Option<&str>) {
    if let Some(status) = status.filter(|s| !s.is_empty()) {
        if Status::parse(status).is_none() {
            debug!("Storing unconventional interview status '{status}'");
        }
    }
}

/// Parses the `date` field: RFC 3339, a naive date-time or date (taken as
/// UTC), or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, String> {
    match value {
        Value::String(raw) => {
            let raw = raw.trim();
            if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
                return Ok(ts.with_timezone(&Utc));
            }
            for format in NAIVE_DATETIME_FORMATS {
                if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
                    return Ok(ts.and_utc());
                }
            }
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ts| ts.and_utc())
                .ok_or_else(|| format!("date '{raw}' is not a valid date"))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| format!("date {n} is out of range")),
        _ => Err("date must be a string or epoch milliseconds".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields(body: Value) -> InterviewFields {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_create_with_required_fields() {
        let new = fields(json!({"date": "2025-01-01T10:00", "companyName": "Acme"}))
            .into_new()
            .unwrap();
        assert_eq!(new.company_name, "Acme");
        assert_eq!(new.date, Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap());
        assert_eq!(new.status, None);
    }

    #[test]
    fn test_create_missing_company_name() {
        let err = fields(json!({"date": "2025-01-01"})).into_new().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("companyName is required")));
    }

    #[test]
    fn test_create_missing_date() {
        let err = fields(json!({"companyName": "Acme"})).into_new().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("date is required")));
    }

    #[test]
    fn test_create_empty_strings_count_as_missing() {
        let err = fields(json!({"date": "", "companyName": "  "}))
            .into_new()
            .unwrap_err();
        let AppError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("date is required"));
        assert!(msg.contains("companyName is required"));
    }

    #[test]
    fn test_create_ignores_store_managed_fields() {
        let new = fields(json!({
            "id": "not-yours",
            "createdAt": "1999-01-01T00:00:00Z",
            "date": "2025-02-03",
            "companyName": "Globex",
            "rounds": 3,
        }))
        .into_new()
        .unwrap();
        assert_eq!(new.company_name, "Globex");
        assert_eq!(new.rounds.as_deref(), Some("3"));
    }

    #[test]
    fn test_create_rejects_object_text() {
        let err = fields(json!({"date": "2025-02-03", "companyName": "Globex", "role": {"a": 1}}))
            .into_new()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("role must be a string")));
    }

    #[test]
    fn test_patch_distinguishes_absent_and_null() {
        let patch = fields(json!({"status": "Selected", "remarks": null}))
            .into_patch()
            .unwrap();
        assert_eq!(patch.status, Some(Some("Selected".into())));
        assert_eq!(patch.remarks, Some(None));
        assert_eq!(patch.hr_name, None);
        assert_eq!(patch.date, None);
    }

    #[test]
    fn test_patch_cannot_clear_required_fields() {
        assert!(fields(json!({"companyName": null})).into_patch().is_err());
        assert!(fields(json!({"companyName": ""})).into_patch().is_err());
        assert!(fields(json!({"date": null})).into_patch().is_err());
    }

    #[test]
    fn test_empty_patch() {
        assert!(fields(json!({})).into_patch().unwrap().is_empty());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 11, 12, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp(&json!("2025-11-12T10:30:00Z")).unwrap(), expected);
        assert_eq!(parse_timestamp(&json!("2025-11-12T16:00:00+05:30")).unwrap(), expected);
        assert_eq!(parse_timestamp(&json!("2025-11-12T10:30")).unwrap(), expected);
        assert_eq!(parse_timestamp(&json!("2025-11-12T10:30:00.000")).unwrap(), expected);
        assert_eq!(
            parse_timestamp(&json!(expected.timestamp_millis())).unwrap(),
            expected
        );
        assert!(parse_timestamp(&json!("next tuesday")).is_err());
        assert!(parse_timestamp(&json!(true)).is_err());
    }
}
