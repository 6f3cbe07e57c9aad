use chrono::NaiveDate;
use regex::Regex;
use scraper::Html;

use crate::schema::{ElectionKind, ElectionRecord, ParsedRecord};

use super::{normalize_ws, parse_us_date, select_first_text, select_rows, slugify};

/// Travis county election listings.
const ROW_PATTERNS: [&str; 3] = [
    "div.election-listing div.election",
    "table.elections tbody tr",
    "ul.upcoming-elections > li",
];

const NAME_PATTERNS: [&str; 3] = ["h3.election-name", "td.name", ".election-title"];
const DATE_PATTERNS: [&str; 3] = ["span.election-date", "td.date", ".election-date"];
const DEADLINE_PATTERNS: [&str; 2] = ["span.registration-deadline", "td.deadline"];

pub fn parse(html: &str) -> Vec<ParsedRecord> {
    let doc = Html::parse_document(html);
    let mut out = Vec::new();

    for row in select_rows(&doc, &ROW_PATTERNS) {
        let Some(name) = select_first_text(row, &NAME_PATTERNS) else { continue };
        let Some(date_text) = select_first_text(row, &DATE_PATTERNS) else { continue };
        let Some(election_date) = parse_us_date(&date_text) else { continue };

        let registration_deadline = select_first_text(row, &DEADLINE_PATTERNS)
            .as_deref()
            .and_then(deadline_date);

        let name = normalize_ws(&name);
        out.push(ParsedRecord::Election(ElectionRecord {
            external_id: format!("travis-{}-{}", election_date.format("%Y%m%d"), slugify(&name)),
            kind: ElectionKind::from_name(&name),
            name,
            election_date,
            registration_deadline,
            // Result pages are scraped separately; empty until then.
            results: None,
        }));
    }

    out
}

/// Deadlines show up embedded in a sentence ("Last day to register:
/// April 3, 2025"); pull the first parseable date out.
fn deadline_date(text: &str) -> Option<NaiveDate> {
    if let Some(d) = parse_us_date(text) {
        return Some(d);
    }
    let re = Regex::new(r"(?i)([A-Z][a-z]+ \d{1,2}, \d{4}|\d{1,2}/\d{1,2}/\d{4})").ok()?;
    re.captures(text).and_then(|c| parse_us_date(&c[1]))
}

pub fn fixture() -> Vec<ParsedRecord> {
    vec![ParsedRecord::Election(ElectionRecord {
        external_id: "fixture-travis-20251104-general".to_string(),
        name: "November 2025 General Election".to_string(),
        kind: ElectionKind::General,
        election_date: NaiveDate::from_ymd_opt(2025, 11, 4).unwrap(),
        registration_deadline: NaiveDate::from_ymd_opt(2025, 10, 6),
        results: None,
    })]
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
    <div class="election-listing">
      <div class="election">
        <h3 class="election-name">May 2025 Uniform Election</h3>
        <span class="election-date">May 3, 2025</span>
        <span class="registration-deadline">Last day to register: April 3, 2025</span>
      </div>
      <div class="election">
        <h3 class="election-name">June 2025 Runoff Election</h3>
        <span class="election-date">June 7, 2025</span>
      </div>
    </div>
    "#;

    #[test]
    fn parses_election_blocks() {
        let records = parse(LISTING);
        assert_eq!(records.len(), 2);
        let ParsedRecord::Election(e) = &records[0] else { panic!("expected election") };
        assert_eq!(e.external_id, "travis-20250503-may-2025-uniform-election");
        assert_eq!(e.kind, ElectionKind::General);
        assert_eq!(e.registration_deadline, NaiveDate::from_ymd_opt(2025, 4, 3));

        let ParsedRecord::Election(e) = &records[1] else { panic!("expected election") };
        assert_eq!(e.kind, ElectionKind::Runoff);
        assert!(e.registration_deadline.is_none());
    }

    #[test]
    fn deadline_sentence_parsing() {
        assert_eq!(
            deadline_date("Voters must register by 10/06/2025 to participate"),
            NaiveDate::from_ymd_opt(2025, 10, 6)
        );
        assert!(deadline_date("check back later").is_none());
    }
}
