use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Shared domain records produced by the per-jurisdiction parsers and
/// consumed by the upsert layer. External IDs are the natural keys that
/// keep repeated ingestion runs idempotent.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegislationKind {
    Ordinance,
    Resolution,
    Bill,
}

impl LegislationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegislationKind::Ordinance => "ordinance",
            LegislationKind::Resolution => "resolution",
            LegislationKind::Bill => "bill",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegislationStatus {
    Introduced,
    Pending,
    Passed,
    Effective,
    Withdrawn,
}

impl LegislationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegislationStatus::Introduced => "introduced",
            LegislationStatus::Pending => "pending",
            LegislationStatus::Passed => "passed",
            LegislationStatus::Effective => "effective",
            LegislationStatus::Withdrawn => "withdrawn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingKind {
    Council,
    Board,
    Committee,
    Commission,
    Authority,
}

impl MeetingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingKind::Council => "council",
            MeetingKind::Board => "board",
            MeetingKind::Committee => "committee",
            MeetingKind::Commission => "commission",
            MeetingKind::Authority => "authority",
        }
    }

    /// Classify a meeting body from its displayed name.
    pub fn from_body_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("council") {
            MeetingKind::Council
        } else if lower.contains("commission") {
            MeetingKind::Commission
        } else if lower.contains("committee") {
            MeetingKind::Committee
        } else if lower.contains("authority") {
            MeetingKind::Authority
        } else {
            MeetingKind::Board
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionKind {
    General,
    Primary,
    Runoff,
    Special,
}

impl ElectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElectionKind::General => "general",
            ElectionKind::Primary => "primary",
            ElectionKind::Runoff => "runoff",
            ElectionKind::Special => "special",
        }
    }

    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("primary") {
            ElectionKind::Primary
        } else if lower.contains("runoff") {
            ElectionKind::Runoff
        } else if lower.contains("special") {
            ElectionKind::Special
        } else {
            ElectionKind::General
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegislationRecord {
    pub external_id: String,
    pub kind: LegislationKind,
    pub title: String,
    pub status: LegislationStatus,
    pub introduced_at: Option<NaiveDate>,
    pub passed_at: Option<NaiveDate>,
    pub effective_at: Option<NaiveDate>,
    pub document_url: Option<String>,
    pub pdf_url: Option<String>,
    pub full_text: Option<String>,
    pub ai_summary: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub external_id: String,
    pub title: String,
    pub body_name: Option<String>,
    pub kind: MeetingKind,
    pub is_legislative: bool,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub agenda_url: Option<String>,
    pub agenda_status: Option<String>,
    pub minutes_url: Option<String>,
    pub extracted_text: Option<String>,
    pub ai_summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionRecord {
    pub external_id: String,
    pub name: String,
    pub kind: ElectionKind,
    pub election_date: NaiveDate,
    pub registration_deadline: Option<NaiveDate>,
    pub results: Option<serde_json::Value>,
}

/// One candidate record out of a parser run, ready for the upsert layer.
#[derive(Debug, Clone)]
pub enum ParsedRecord {
    Legislation(LegislationRecord),
    Meeting(MeetingRecord),
    Election(ElectionRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_kind_classification() {
        assert_eq!(MeetingKind::from_body_name("Austin City Council"), MeetingKind::Council);
        assert_eq!(MeetingKind::from_body_name("Planning Commission"), MeetingKind::Commission);
        assert_eq!(MeetingKind::from_body_name("Audit Committee"), MeetingKind::Committee);
        assert_eq!(MeetingKind::from_body_name("Housing Authority"), MeetingKind::Authority);
        assert_eq!(MeetingKind::from_body_name("Zoning Adjustment"), MeetingKind::Board);
    }

    #[test]
    fn election_kind_from_name() {
        assert_eq!(ElectionKind::from_name("March Primary Election"), ElectionKind::Primary);
        assert_eq!(ElectionKind::from_name("May Special Called Election"), ElectionKind::Special);
        assert_eq!(ElectionKind::from_name("November General Election"), ElectionKind::General);
        assert_eq!(ElectionKind::from_name("December Runoff"), ElectionKind::Runoff);
    }
}
