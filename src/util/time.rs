use anyhow::{bail, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Accepts relative durations ("30m", "24h", "7d"), bare dates
/// ("2025-02-06"), or full RFC 3339 timestamps. Relative values count
/// backwards from `now`.
pub fn parse_since_str(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if let Some(delta) = parse_relative(s)? {
        return Ok(now - delta);
    }
    parse_absolute(s)
}

/// Same grammar as `parse_since_str`, but relative values count forwards.
pub fn parse_until_str(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if let Some(delta) = parse_relative(s)? {
        return Ok(now + delta);
    }
    parse_absolute(s)
}

fn parse_relative(s: &str) -> Result<Option<Duration>> {
    let s = s.trim();
    let Some(unit) = s.chars().last() else {
        bail!("empty time value");
    };
    if !matches!(unit, 'm' | 'h' | 'd' | 'w') {
        return Ok(None);
    }
    let Ok(n) = s[..s.len() - 1].parse::<i64>() else {
        return Ok(None);
    };
    if n < 0 {
        bail!("negative duration: {}", s);
    }
    let delta = match unit {
        'm' => Duration::minutes(n),
        'h' => Duration::hours(n),
        'd' => Duration::days(n),
        'w' => Duration::weeks(n),
        _ => unreachable!(),
    };
    Ok(Some(delta))
}

fn parse_absolute(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    bail!("unrecognized time value: {} (try 7d, 2025-02-06, or RFC 3339)", s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 6, 12, 0, 0).unwrap()
    }

    #[test]
    fn since_relative_goes_back() {
        assert_eq!(parse_since_str("7d", now()).unwrap(), now() - Duration::days(7));
        assert_eq!(parse_since_str("24h", now()).unwrap(), now() - Duration::hours(24));
        assert_eq!(parse_since_str("2w", now()).unwrap(), now() - Duration::weeks(2));
    }

    #[test]
    fn until_relative_goes_forward() {
        assert_eq!(parse_until_str("30d", now()).unwrap(), now() + Duration::days(30));
    }

    #[test]
    fn absolute_forms() {
        let d = parse_since_str("2025-01-15", now()).unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap());

        let ts = parse_until_str("2025-03-01T09:30:00Z", now()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_since_str("soon", now()).is_err());
        assert!(parse_since_str("", now()).is_err());
        assert!(parse_since_str("-3d", now()).is_err());
    }
}
