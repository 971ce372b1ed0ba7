use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::interviews::pagination::ListQuery;
use crate::interviews::store::{InterviewStore, Page};
use crate::interviews::validation::{InterviewPatch, NewInterview};
use crate::models::interview::{Interview, InterviewRow};

const COLUMNS: &str = "id, date, company_name, hr_name, hr_contact, role, location, rounds, \
    offered_ctc, expected_ctc, discussion, next_step, status, remarks, interview_schedule, \
    created_at, updated_at";

/// Columns scanned by the `q` list filter. Both sides go through `LOWER()` so
/// case folding follows the database collation. Keep in step with
/// `Interview::searchable_fields`.
const SEARCH_COLUMNS: &[&str] = &[
    "company_name",
    "hr_name",
    "hr_contact",
    "role",
    "location",
    "offered_ctc",
    "expected_ctc",
    "discussion",
    "next_step",
    "remarks",
    "status",
];

/// Postgres-backed store over the `interviews` table.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and brings the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = db::create_pool(database_url, max_connections).await?;
        db::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a ListQuery) {
    builder.push(" WHERE TRUE");
    if let Some(status) = &query.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(needle) = &query.search {
        builder.push(" AND (");
        for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder
                .push(format!("STRPOS(LOWER({column}), LOWER("))
                .push_bind(needle.as_str())
                .push(")) > 0");
        }
        builder.push(")");
    }
}

/// Appends `, column = $n` for every field the patch touches.
fn push_assignments<'a>(builder: &mut QueryBuilder<'a, Postgres>, patch: InterviewPatch) {
    if let Some(date) = patch.date {
        builder.push(", date = ").push_bind(date);
    }
    if let Some(company_name) = patch.company_name {
        builder.push(", company_name = ").push_bind(company_name);
    }
    let optional = [
        ("hr_name", patch.hr_name),
        ("hr_contact", patch.hr_contact),
        ("role", patch.role),
        ("location", patch.location),
        ("rounds", patch.rounds),
        ("offered_ctc", patch.offered_ctc),
        ("expected_ctc", patch.expected_ctc),
        ("discussion", patch.discussion),
        ("next_step", patch.next_step),
        ("status", patch.status),
        ("remarks", patch.remarks),
        ("interview_schedule", patch.interview_schedule),
    ];
    for (column, value) in optional {
        if let Some(value) = value {
            builder.push(format!(", {column} = ")).push_bind(value);
        }
    }
}

#[async_trait]
impl InterviewStore for PgStore {
    async fn insert(&self, new: NewInterview) -> Result<Interview, AppError> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            r#"
            INSERT INTO interviews
                (id, date, company_name, hr_name, hr_contact, role, location, rounds,
                 offered_ctc, expected_ctc, discussion, next_step, status, remarks,
                 interview_schedule, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NOW(), NOW())
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.date)
        .bind(new.company_name)
        .bind(new.hr_name)
        .bind(new.hr_contact)
        .bind(new.role)
        .bind(new.location)
        .bind(new.rounds)
        .bind(new.offered_ctc)
        .bind(new.expected_ctc)
        .bind(new.discussion)
        .bind(new.next_step)
        .bind(new.status)
        .bind(new.remarks)
        .bind(new.interview_schedule)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted interview record {}", row.id);
        Ok(row.into())
    }

    async fn list_page(&self, query: &ListQuery) -> Result<Page, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM interviews");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM interviews"));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));
        let rows: Vec<InterviewRow> = select.build_query_as().fetch_all(&self.pool).await?;

        Ok(Page {
            items: rows.into_iter().map(Interview::from).collect(),
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Interview>, AppError> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            "SELECT {COLUMNS} FROM interviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Interview::from))
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        patch: InterviewPatch,
    ) -> Result<Option<Interview>, AppError> {
        let mut builder =
            QueryBuilder::<Postgres>::new("UPDATE interviews SET updated_at = GREATEST(NOW(), updated_at)");
        push_assignments(&mut builder, patch);
        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {COLUMNS}"));

        let row: Option<InterviewRow> = builder.build_query_as().fetch_optional(&self.pool).await?;
        if row.is_some() {
            info!("Updated interview record {id}");
        }
        Ok(row.map(Interview::from))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Interview>, AppError> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            "DELETE FROM interviews WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        if row.is_some() {
            info!("Deleted interview record {id}");
        }
        Ok(row.map(Interview::from))
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL connection pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_update_sql_only_touches_patched_columns() {
        let patch = InterviewPatch {
            status: Some(Some("Selected".into())),
            remarks: Some(None),
            ..InterviewPatch::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE interviews SET updated_at = NOW()");
        push_assignments(&mut builder, patch);
        let sql = builder.sql();
        assert!(sql.contains(", status = $1"));
        assert!(sql.contains(", remarks = $2"));
        assert!(!sql.contains("company_name"));
        assert!(!sql.contains("hr_name"));
    }

    #[test]
    fn test_update_sql_required_fields() {
        let patch = InterviewPatch {
            date: Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()),
            company_name: Some("Hooli".into()),
            ..InterviewPatch::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE interviews SET updated_at = NOW()");
        push_assignments(&mut builder, patch);
        assert_eq!(
            builder.sql(),
            "UPDATE interviews SET updated_at = NOW(), date = $1, company_name = $2"
        );
    }

    #[test]
    fn test_filters_sql() {
        let query = ListQuery {
            status: Some("Awaiting".into()),
            search: Some("acme".into()),
            ..ListQuery::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM interviews");
        push_filters(&mut builder, &query);
        let sql = builder.sql();
        assert!(sql.starts_with("SELECT COUNT(*) FROM interviews WHERE TRUE AND status = $1 AND ("));
        assert!(sql.contains("STRPOS(LOWER(company_name), LOWER($2)) > 0"));
        assert!(sql.ends_with("STRPOS(LOWER(status), LOWER($12)) > 0)"));
    }

    #[test]
    fn test_unfiltered_sql_has_no_predicates() {
        let query = ListQuery::default();
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM interviews");
        push_filters(&mut builder, &query);
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM interviews WHERE TRUE");
    }
}
