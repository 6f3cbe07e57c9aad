use anyhow::Result;
use sqlx::{PgPool, Row};

use crate::schema::{ElectionRecord, LegislationRecord, MeetingRecord};

/// Outcome of a natural-key upsert. `Unchanged` means the row already
/// existed with identical content; the DO UPDATE guard skipped the write
/// so `updated_at` is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(i64),
    Updated(i64),
    Unchanged,
}

impl UpsertOutcome {
    pub fn id(&self) -> Option<i64> {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Updated(id) => Some(*id),
            UpsertOutcome::Unchanged => None,
        }
    }
}

// xmax = 0 distinguishes a fresh insert from a conflict-update on the
// returned row; a no-op update returns no row at all.
fn outcome(row: Option<(i64, bool)>) -> UpsertOutcome {
    match row {
        Some((id, true)) => UpsertOutcome::Inserted(id),
        Some((id, false)) => UpsertOutcome::Updated(id),
        None => UpsertOutcome::Unchanged,
    }
}

pub async fn upsert_legislation(
    pool: &PgPool,
    source_id: i32,
    jurisdiction_id: i32,
    rec: &LegislationRecord,
) -> Result<UpsertOutcome> {
    let tags = serde_json::to_value(&rec.tags)?;
    let row = sqlx::query(
        r#"
        INSERT INTO civic.legislation
            (source_id, jurisdiction_id, external_id, kind, title, status,
             introduced_at, passed_at, effective_at, document_url, pdf_url,
             full_text, ai_summary, tags)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT (source_id, external_id) DO UPDATE SET
            kind = EXCLUDED.kind,
            title = EXCLUDED.title,
            status = EXCLUDED.status,
            introduced_at = EXCLUDED.introduced_at,
            passed_at = EXCLUDED.passed_at,
            effective_at = EXCLUDED.effective_at,
            document_url = EXCLUDED.document_url,
            pdf_url = EXCLUDED.pdf_url,
            full_text = COALESCE(EXCLUDED.full_text, civic.legislation.full_text),
            ai_summary = COALESCE(EXCLUDED.ai_summary, civic.legislation.ai_summary),
            tags = EXCLUDED.tags,
            updated_at = now()
        WHERE (civic.legislation.kind, civic.legislation.title, civic.legislation.status,
               civic.legislation.introduced_at, civic.legislation.passed_at,
               civic.legislation.effective_at, civic.legislation.document_url,
               civic.legislation.pdf_url, civic.legislation.tags)
              IS DISTINCT FROM
              (EXCLUDED.kind, EXCLUDED.title, EXCLUDED.status,
               EXCLUDED.introduced_at, EXCLUDED.passed_at,
               EXCLUDED.effective_at, EXCLUDED.document_url,
               EXCLUDED.pdf_url, EXCLUDED.tags)
           OR EXCLUDED.full_text IS DISTINCT FROM civic.legislation.full_text
              AND EXCLUDED.full_text IS NOT NULL
           OR EXCLUDED.ai_summary IS DISTINCT FROM civic.legislation.ai_summary
              AND EXCLUDED.ai_summary IS NOT NULL
        RETURNING legislation_id, (xmax = 0) AS inserted
        "#,
    )
    .bind(source_id)
    .bind(jurisdiction_id)
    .bind(&rec.external_id)
    .bind(rec.kind.as_str())
    .bind(&rec.title)
    .bind(rec.status.as_str())
    .bind(rec.introduced_at)
    .bind(rec.passed_at)
    .bind(rec.effective_at)
    .bind(&rec.document_url)
    .bind(&rec.pdf_url)
    .bind(&rec.full_text)
    .bind(&rec.ai_summary)
    .bind(&tags)
    .fetch_optional(pool)
    .await?;

    Ok(outcome(row.map(|r| (r.get("legislation_id"), r.get("inserted")))))
}

pub async fn upsert_meeting(
    pool: &PgPool,
    source_id: i32,
    jurisdiction_id: i32,
    rec: &MeetingRecord,
) -> Result<UpsertOutcome> {
    let row = sqlx::query(
        r#"
        INSERT INTO civic.meeting
            (source_id, jurisdiction_id, external_id, title, body_name,
             meeting_kind, is_legislative, starts_at, ends_at, location,
             agenda_url, agenda_status, minutes_url, extracted_text, ai_summary)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (source_id, external_id) DO UPDATE SET
            title = EXCLUDED.title,
            body_name = EXCLUDED.body_name,
            meeting_kind = EXCLUDED.meeting_kind,
            is_legislative = EXCLUDED.is_legislative,
            starts_at = EXCLUDED.starts_at,
            ends_at = EXCLUDED.ends_at,
            location = EXCLUDED.location,
            agenda_url = EXCLUDED.agenda_url,
            agenda_status = EXCLUDED.agenda_status,
            minutes_url = EXCLUDED.minutes_url,
            extracted_text = COALESCE(EXCLUDED.extracted_text, civic.meeting.extracted_text),
            ai_summary = COALESCE(EXCLUDED.ai_summary, civic.meeting.ai_summary),
            updated_at = now()
        WHERE (civic.meeting.title, civic.meeting.body_name, civic.meeting.meeting_kind,
               civic.meeting.is_legislative, civic.meeting.starts_at, civic.meeting.ends_at,
               civic.meeting.location, civic.meeting.agenda_url, civic.meeting.agenda_status,
               civic.meeting.minutes_url)
              IS DISTINCT FROM
              (EXCLUDED.title, EXCLUDED.body_name, EXCLUDED.meeting_kind,
               EXCLUDED.is_legislative, EXCLUDED.starts_at, EXCLUDED.ends_at,
               EXCLUDED.location, EXCLUDED.agenda_url, EXCLUDED.agenda_status,
               EXCLUDED.minutes_url)
           OR EXCLUDED.extracted_text IS DISTINCT FROM civic.meeting.extracted_text
              AND EXCLUDED.extracted_text IS NOT NULL
           OR EXCLUDED.ai_summary IS DISTINCT FROM civic.meeting.ai_summary
              AND EXCLUDED.ai_summary IS NOT NULL
        RETURNING meeting_id, (xmax = 0) AS inserted
        "#,
    )
    .bind(source_id)
    .bind(jurisdiction_id)
    .bind(&rec.external_id)
    .bind(&rec.title)
    .bind(&rec.body_name)
    .bind(rec.kind.as_str())
    .bind(rec.is_legislative)
    .bind(rec.starts_at)
    .bind(rec.ends_at)
    .bind(&rec.location)
    .bind(&rec.agenda_url)
    .bind(&rec.agenda_status)
    .bind(&rec.minutes_url)
    .bind(&rec.extracted_text)
    .bind(&rec.ai_summary)
    .fetch_optional(pool)
    .await?;

    Ok(outcome(row.map(|r| (r.get("meeting_id"), r.get("inserted")))))
}

pub async fn upsert_election(
    pool: &PgPool,
    source_id: i32,
    jurisdiction_id: i32,
    rec: &ElectionRecord,
) -> Result<UpsertOutcome> {
    let row = sqlx::query(
        r#"
        INSERT INTO civic.election
            (source_id, jurisdiction_id, external_id, name, kind,
             election_date, registration_deadline, results)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (source_id, external_id) DO UPDATE SET
            name = EXCLUDED.name,
            kind = EXCLUDED.kind,
            election_date = EXCLUDED.election_date,
            registration_deadline = EXCLUDED.registration_deadline,
            results = COALESCE(EXCLUDED.results, civic.election.results),
            updated_at = now()
        WHERE (civic.election.name, civic.election.kind, civic.election.election_date,
               civic.election.registration_deadline)
              IS DISTINCT FROM
              (EXCLUDED.name, EXCLUDED.kind, EXCLUDED.election_date,
               EXCLUDED.registration_deadline)
           OR EXCLUDED.results IS DISTINCT FROM civic.election.results
              AND EXCLUDED.results IS NOT NULL
        RETURNING election_id, (xmax = 0) AS inserted
        "#,
    )
    .bind(source_id)
    .bind(jurisdiction_id)
    .bind(&rec.external_id)
    .bind(&rec.name)
    .bind(rec.kind.as_str())
    .bind(rec.election_date)
    .bind(rec.registration_deadline)
    .bind(&rec.results)
    .fetch_optional(pool)
    .await?;

    Ok(outcome(row.map(|r| (r.get("election_id"), r.get("inserted")))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_mapping() {
        assert_eq!(outcome(Some((7, true))), UpsertOutcome::Inserted(7));
        assert_eq!(outcome(Some((7, false))), UpsertOutcome::Updated(7));
        assert_eq!(outcome(None), UpsertOutcome::Unchanged);
        assert_eq!(UpsertOutcome::Unchanged.id(), None);
        assert_eq!(UpsertOutcome::Updated(3).id(), Some(3));
    }
}
