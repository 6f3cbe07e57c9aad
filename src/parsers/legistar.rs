use chrono::{NaiveDate, TimeZone, Utc};
use regex::Regex;
use scraper::Html;

use crate::schema::{MeetingKind, MeetingRecord, ParsedRecord};

use super::{normalize_ws, parse_us_datetime, select_first_attr, select_first_text, select_rows};

/// Legistar-hosted county calendars. The grid id carries an ASP.NET
/// control prefix that varies by deployment, so match on the Telerik grid
/// class as well.
const ROW_PATTERNS: [&str; 3] = [
    "table[id$='gridCalendar_ctl00'] tbody tr",
    "table.rgMasterTable tbody tr",
    "table.calendar tbody tr",
];

const NAME_PATTERNS: [&str; 2] = ["td a[id*='hypBody']", "td:first-child a"];
const DATE_PATTERNS: [&str; 2] = ["td font[id*='lblDate']", "td.date"];
const TIME_PATTERNS: [&str; 2] = ["td font[id*='lblTime']", "td.time"];
const LOCATION_PATTERNS: [&str; 2] = ["td[id*='tdLocation']", "td.location"];
const DETAIL_PATTERNS: [&str; 2] = ["a[href*='MeetingDetail.aspx']", "td a[id*='hypMeeting']"];
const AGENDA_PATTERNS: [&str; 2] = ["a[href*='View.ashx?M=A']", "a.agenda"];
const MINUTES_PATTERNS: [&str; 2] = ["a[href*='View.ashx?M=M']", "a.minutes"];

pub fn parse(html: &str) -> Vec<ParsedRecord> {
    let doc = Html::parse_document(html);
    let mut out = Vec::new();

    for row in select_rows(&doc, &ROW_PATTERNS) {
        let Some(body) = select_first_text(row, &NAME_PATTERNS) else { continue };
        let Some(date_text) = select_first_text(row, &DATE_PATTERNS) else { continue };
        let time_text = select_first_text(row, &TIME_PATTERNS).unwrap_or_default();

        let Some(starts_at) = parse_us_datetime(&format!("{} {}", date_text, time_text))
            .or_else(|| parse_us_datetime(&date_text))
        else {
            continue;
        };
        let starts_at = Utc.from_utc_datetime(&starts_at);

        let detail_url = select_first_attr(row, &DETAIL_PATTERNS, "href");
        let Some(external_id) = detail_url.as_deref().and_then(meeting_detail_id) else {
            // Without the Legistar meeting id there is no stable key; skip
            // rather than fabricate one that churns every run.
            continue;
        };

        let agenda_url = select_first_attr(row, &AGENDA_PATTERNS, "href");
        let minutes_url = select_first_attr(row, &MINUTES_PATTERNS, "href");
        let kind = MeetingKind::from_body_name(&body);

        out.push(ParsedRecord::Meeting(MeetingRecord {
            external_id,
            title: format!("{} — {}", normalize_ws(&body), starts_at.format("%B %-d, %Y")),
            body_name: Some(normalize_ws(&body)),
            kind,
            is_legislative: matches!(kind, MeetingKind::Council | MeetingKind::Commission),
            starts_at,
            ends_at: None,
            location: select_first_text(row, &LOCATION_PATTERNS),
            agenda_status: agenda_url.as_ref().map(|_| "posted".to_string()),
            agenda_url,
            minutes_url,
            extracted_text: None,
            ai_summary: None,
        }));
    }

    out
}

fn meeting_detail_id(url: &str) -> Option<String> {
    let re = Regex::new(r"(?i)MeetingDetail\.aspx\?ID=(\d+)").ok()?;
    re.captures(url).map(|c| format!("legistar-{}", &c[1]))
}

pub fn fixture() -> Vec<ParsedRecord> {
    let starts_at = Utc
        .from_utc_datetime(&NaiveDate::from_ymd_opt(2025, 3, 4).unwrap().and_hms_opt(9, 0, 0).unwrap());
    vec![ParsedRecord::Meeting(MeetingRecord {
        external_id: "fixture-legistar-commissioners".to_string(),
        title: "Commissioners Court — March 4, 2025".to_string(),
        body_name: Some("Commissioners Court".to_string()),
        kind: MeetingKind::Commission,
        is_legislative: true,
        starts_at,
        ends_at: None,
        location: Some("700 Lavaca St, Austin, TX".to_string()),
        agenda_url: None,
        agenda_status: None,
        minutes_url: None,
        extracted_text: None,
        ai_summary: None,
    })]
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = r#"
    <table id="ctl00_ContentPlaceHolder1_gridCalendar_ctl00" class="rgMasterTable"><tbody>
      <tr>
        <td><a id="ctl00_hypBody_1" href="/DepartmentDetail.aspx?ID=7">Commissioners Court</a></td>
        <td><font id="ctl00_lblDate_1">3/4/2025</font></td>
        <td><font id="ctl00_lblTime_1">9:00 AM</font></td>
        <td id="ctl00_tdLocation_1">Voting Session Room</td>
        <td><a id="ctl00_hypMeeting_1" href="MeetingDetail.aspx?ID=118234&GUID=abc">Details</a></td>
        <td><a href="View.ashx?M=A&ID=118234">Agenda</a></td>
      </tr>
      <tr>
        <td><a id="ctl00_hypBody_2" href="/DepartmentDetail.aspx?ID=9">Historical Commission</a></td>
        <td><font id="ctl00_lblDate_2">3/6/2025</font></td>
        <td><font id="ctl00_lblTime_2">6:00 PM</font></td>
        <td id="ctl00_tdLocation_2">Airport Blvd Offices</td>
        <td><a id="ctl00_hypMeeting_2" href="MeetingDetail.aspx?ID=118240&GUID=def">Details</a></td>
        <td></td>
      </tr>
    </tbody></table>
    "#;

    #[test]
    fn parses_calendar_grid() {
        let records = parse(GRID);
        assert_eq!(records.len(), 2);
        let ParsedRecord::Meeting(m) = &records[0] else { panic!("expected meeting") };
        assert_eq!(m.external_id, "legistar-118234");
        assert_eq!(m.body_name.as_deref(), Some("Commissioners Court"));
        assert_eq!(m.kind, MeetingKind::Commission);
        assert_eq!(m.agenda_url.as_deref(), Some("View.ashx?M=A&ID=118234"));
        assert_eq!(m.starts_at.format("%Y-%m-%d %H:%M").to_string(), "2025-03-04 09:00");
    }

    #[test]
    fn rows_without_detail_link_are_skipped() {
        let html = r#"
        <table class="rgMasterTable"><tbody>
          <tr>
            <td><a id="x_hypBody" href="/d">Some Board</a></td>
            <td><font id="x_lblDate">3/4/2025</font></td>
            <td><font id="x_lblTime">9:00 AM</font></td>
          </tr>
        </tbody></table>
        "#;
        assert!(parse(html).is_empty());
    }
}
