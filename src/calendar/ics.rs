use chrono::{DateTime, Duration, Utc};

use super::db::{CalendarElection, CalendarMeeting};

const PRODID: &str = "-//civic-ingest//civic calendar//EN";
/// Meetings without a published end time get a two-hour block.
const DEFAULT_MEETING_HOURS: i64 = 2;

/// Render an RFC 5545 calendar for the selected meetings and elections.
/// `dtstamp` is passed in so output is reproducible.
pub fn render(
    meetings: &[CalendarMeeting],
    elections: &[CalendarElection],
    dtstamp: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    line(&mut out, "BEGIN:VCALENDAR");
    line(&mut out, "VERSION:2.0");
    line(&mut out, &format!("PRODID:{PRODID}"));
    line(&mut out, "CALSCALE:GREGORIAN");

    for m in meetings {
        let ends_at = m
            .ends_at
            .unwrap_or_else(|| m.starts_at + Duration::hours(DEFAULT_MEETING_HOURS));

        line(&mut out, "BEGIN:VEVENT");
        line(&mut out, &format!("UID:meeting-{}-{}@civic-ingest", m.meeting_id, m.external_id));
        line(&mut out, &format!("DTSTAMP:{}", utc_stamp(dtstamp)));
        line(&mut out, &format!("DTSTART:{}", utc_stamp(m.starts_at)));
        line(&mut out, &format!("DTEND:{}", utc_stamp(ends_at)));
        line(&mut out, &format!("SUMMARY:{}", escape(&m.title)));
        if let Some(loc) = &m.location {
            line(&mut out, &format!("LOCATION:{}", escape(loc)));
        }
        if let Some(url) = &m.agenda_url {
            line(&mut out, &format!("DESCRIPTION:Agenda: {}", escape(url)));
        }
        line(&mut out, "END:VEVENT");
    }

    for e in elections {
        // All-day event: DTEND is the following day, exclusive.
        line(&mut out, "BEGIN:VEVENT");
        line(&mut out, &format!("UID:election-{}-{}@civic-ingest", e.election_id, e.external_id));
        line(&mut out, &format!("DTSTAMP:{}", utc_stamp(dtstamp)));
        line(&mut out, &format!("DTSTART;VALUE=DATE:{}", e.election_date.format("%Y%m%d")));
        line(
            &mut out,
            &format!(
                "DTEND;VALUE=DATE:{}",
                (e.election_date + Duration::days(1)).format("%Y%m%d")
            ),
        );
        line(&mut out, &format!("SUMMARY:{}", escape(&e.name)));
        if let Some(deadline) = e.registration_deadline {
            line(
                &mut out,
                &format!(
                    "DESCRIPTION:Registration deadline: {}",
                    deadline.format("%Y-%m-%d")
                ),
            );
        }
        line(&mut out, "END:VEVENT");
    }

    line(&mut out, "END:VCALENDAR");
    out
}

fn utc_stamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

// CRLF line endings per the RFC.
fn line(out: &mut String, s: &str) {
    out.push_str(s);
    out.push_str("\r\n");
}

/// TEXT escaping per RFC 5545 §3.3.11.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
    }

    fn sample_meeting() -> CalendarMeeting {
        CalendarMeeting {
            meeting_id: 7,
            external_id: "austin-1234".to_string(),
            title: "City Council; Regular Meeting".to_string(),
            starts_at: Utc.with_ymd_and_hms(2025, 2, 6, 16, 0, 0).unwrap(),
            ends_at: None,
            location: Some("City Hall, 301 W 2nd St".to_string()),
            agenda_url: Some("https://example.org/agenda.pdf".to_string()),
        }
    }

    fn sample_election() -> CalendarElection {
        CalendarElection {
            election_id: 3,
            external_id: "travis-20250503-general".to_string(),
            name: "May General Election".to_string(),
            election_date: NaiveDate::from_ymd_opt(2025, 5, 3).unwrap(),
            registration_deadline: NaiveDate::from_ymd_opt(2025, 4, 3),
        }
    }

    #[test]
    fn default_end_is_two_hours_after_start() {
        let ics = render(&[sample_meeting()], &[], stamp());
        assert!(ics.contains("DTSTART:20250206T160000Z\r\n"));
        assert!(ics.contains("DTEND:20250206T180000Z\r\n"));
    }

    #[test]
    fn explicit_end_time_wins() {
        let mut m = sample_meeting();
        m.ends_at = Some(Utc.with_ymd_and_hms(2025, 2, 6, 21, 30, 0).unwrap());
        let ics = render(&[m], &[], stamp());
        assert!(ics.contains("DTEND:20250206T213000Z\r\n"));
    }

    #[test]
    fn text_fields_are_escaped() {
        let ics = render(&[sample_meeting()], &[], stamp());
        assert!(ics.contains("SUMMARY:City Council\\; Regular Meeting\r\n"));
        assert!(ics.contains("LOCATION:City Hall\\, 301 W 2nd St\r\n"));
    }

    #[test]
    fn elections_are_all_day() {
        let ics = render(&[], &[sample_election()], stamp());
        assert!(ics.contains("DTSTART;VALUE=DATE:20250503\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20250504\r\n"));
        assert!(ics.contains("DESCRIPTION:Registration deadline: 2025-04-03\r\n"));
    }

    #[test]
    fn calendar_envelope_and_uids() {
        let ics = render(&[sample_meeting()], &[sample_election()], stamp());
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("UID:meeting-7-austin-1234@civic-ingest\r\n"));
        assert!(ics.contains("UID:election-3-travis-20250503-general@civic-ingest\r\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    }
}
