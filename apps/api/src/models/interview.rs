use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored interview record as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub company_name: String,
    pub hr_name: Option<String>,
    pub hr_contact: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub rounds: Option<String>,
    #[serde(rename = "offeredCTC")]
    pub offered_ctc: Option<String>,
    #[serde(rename = "expectedCTC")]
    pub expected_ctc: Option<String>,
    pub discussion: Option<String>,
    pub next_step: Option<String>,
    pub status: Option<String>,
    pub remarks: Option<String>,
    pub interview_schedule: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `interviews` table.
#[derive(Debug, Clone, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InterviewRow> for Interview {
    fn from(row: InterviewRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            company_name: row.company_name,
            hr_name: row.hr_name,
            hr_contact: row.hr_contact,
            role: row.role,
            location: row.location,
            rounds: row.rounds,
            offered_ctc: row.offered_ctc,
            expected_ctc: row.expected_ctc,
            discussion: row.discussion,
            next_step: row.next_step,
            status: row.status,
            remarks: row.remarks,
            interview_schedule: row.interview_schedule,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Interview {
    /// Free-text fields searched by the `q` list filter.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.company_name.as_str()),
            self.hr_name.as_deref(),
            self.hr_contact.as_deref(),
            self.role.as_deref(),
            self.location.as_deref(),
            self.offered_ctc.as_deref(),
            self.expected_ctc.as_deref(),
            self.discussion.as_deref(),
            self.next_step.as_deref(),
            self.remarks.as_deref(),
            self.status.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Pipeline states the UI offers. `status` is stored as free text and is
/// never checked against this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Selected,
    Rejected,
    Awaiting,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::InProgress,
        Status::Selected,
        Status::Rejected,
        Status::Awaiting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::InProgress => "In Progress",
            Status::Selected => "Selected",
            Status::Rejected => "Rejected",
            Status::Awaiting => "Awaiting",
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        Status::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
