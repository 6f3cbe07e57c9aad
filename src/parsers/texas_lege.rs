use chrono::NaiveDate;
use regex::Regex;
use scraper::Html;

use crate::schema::{LegislationKind, LegislationRecord, LegislationStatus, ParsedRecord};

use super::{normalize_ws, parse_us_date, select_first_attr, select_first_text, select_rows};

/// Texas capitol bill listing pages (search results / report tables).
const ROW_PATTERNS: [&str; 3] = [
    "table#report tbody tr",
    "table.billList tbody tr",
    "ul.bill-list > li",
];

const NUMBER_PATTERNS: [&str; 3] = ["td.billnum a", "td:first-child a", "span.bill-number"];
const CAPTION_PATTERNS: [&str; 3] = ["td.caption", "td.billcaption", ".bill-caption"];
const ACTION_PATTERNS: [&str; 2] = ["td.lastaction", ".last-action"];
const LINK_PATTERNS: [&str; 2] = ["td.billnum a", "td:first-child a"];

pub fn parse(html: &str) -> Vec<ParsedRecord> {
    let doc = Html::parse_document(html);
    let number_re = Regex::new(r"(?i)^(HB|SB|HJR|SJR)\s*0*(\d+)$").expect("static regex");
    let mut out = Vec::new();

    for row in select_rows(&doc, &ROW_PATTERNS) {
        let Some(number_text) = select_first_text(row, &NUMBER_PATTERNS) else { continue };
        let number_norm = normalize_ws(&number_text);
        let Some(caps) = number_re.captures(number_norm.as_str()) else { continue };
        let chamber = caps[1].to_uppercase();
        let number = &caps[2];

        let Some(title) = select_first_text(row, &CAPTION_PATTERNS) else { continue };
        let action = select_first_text(row, &ACTION_PATTERNS).unwrap_or_default();

        out.push(ParsedRecord::Legislation(LegislationRecord {
            external_id: format!("tx-{}-{}", chamber.to_lowercase(), number),
            kind: LegislationKind::Bill,
            title: normalize_ws(&title),
            status: status_from_action(&action),
            introduced_at: date_from_action(&action),
            passed_at: None,
            effective_at: None,
            document_url: select_first_attr(row, &LINK_PATTERNS, "href"),
            pdf_url: None,
            full_text: None,
            ai_summary: None,
            tags: Vec::new(),
        }));
    }

    out
}

/// Bill pages only expose a one-line "last action"; map its wording onto
/// the shared status set.
fn status_from_action(action: &str) -> LegislationStatus {
    let lower = action.to_lowercase();
    if lower.contains("effective") {
        LegislationStatus::Effective
    } else if lower.contains("signed by the governor") || lower.contains("passed") {
        LegislationStatus::Passed
    } else if lower.contains("withdrawn") {
        LegislationStatus::Withdrawn
    } else if lower.contains("committee") || lower.contains("referred") {
        LegislationStatus::Pending
    } else {
        LegislationStatus::Introduced
    }
}

fn date_from_action(action: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"(\d{2}/\d{2}/\d{4})").ok()?;
    re.captures(action).and_then(|c| parse_us_date(&c[1]))
}

pub fn fixture() -> Vec<ParsedRecord> {
    vec![ParsedRecord::Legislation(LegislationRecord {
        external_id: "fixture-tx-hb-1".to_string(),
        kind: LegislationKind::Bill,
        title: "General Appropriations Bill.".to_string(),
        status: LegislationStatus::Introduced,
        introduced_at: NaiveDate::from_ymd_opt(2025, 1, 14),
        passed_at: None,
        effective_at: None,
        document_url: None,
        pdf_url: None,
        full_text: None,
        ai_summary: None,
        tags: Vec::new(),
    })]
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"
    <table id="report"><tbody>
      <tr>
        <td class="billnum"><a href="/BillLookup/History.aspx?Bill=HB123">HB 123</a></td>
        <td class="caption">Relating to the regulation of short-term rental units by municipalities.</td>
        <td class="lastaction">Referred to Land &amp; Resource Management 02/20/2025</td>
      </tr>
      <tr>
        <td class="billnum"><a href="/BillLookup/History.aspx?Bill=SB45">SB 45</a></td>
        <td class="caption">Relating to ad valorem tax relief for disabled veterans.</td>
        <td class="lastaction">Effective on 9/1/25</td>
      </tr>
    </tbody></table>
    "#;

    #[test]
    fn parses_bill_rows() {
        let records = parse(REPORT);
        assert_eq!(records.len(), 2);
        let ParsedRecord::Legislation(bill) = &records[0] else { panic!("expected legislation") };
        assert_eq!(bill.external_id, "tx-hb-123");
        assert_eq!(bill.kind, LegislationKind::Bill);
        assert_eq!(bill.status, LegislationStatus::Pending);
        assert_eq!(bill.introduced_at, NaiveDate::from_ymd_opt(2025, 2, 20));

        let ParsedRecord::Legislation(bill) = &records[1] else { panic!("expected legislation") };
        assert_eq!(bill.external_id, "tx-sb-45");
        assert_eq!(bill.status, LegislationStatus::Effective);
    }

    #[test]
    fn leading_zeroes_do_not_change_the_id() {
        let html = r#"
        <table id="report"><tbody>
          <tr>
            <td class="billnum"><a href="/h">HB 0123</a></td>
            <td class="caption">Relating to the regulation of short-term rental units.</td>
            <td class="lastaction"></td>
          </tr>
        </tbody></table>
        "#;
        let records = parse(html);
        let ParsedRecord::Legislation(bill) = &records[0] else { panic!("expected legislation") };
        assert_eq!(bill.external_id, "tx-hb-123");
    }

    #[test]
    fn non_bill_rows_are_ignored() {
        let html = r#"
        <table id="report"><tbody>
          <tr><td class="billnum"><a href="/x">Header</a></td><td class="caption">Not a bill</td></tr>
        </tbody></table>
        "#;
        assert!(parse(html).is_empty());
    }
}
