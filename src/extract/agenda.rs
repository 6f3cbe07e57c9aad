use regex::Regex;

use crate::schema::{LegislationKind, LegislationStatus};

/// One legislation reference recovered from agenda plaintext. This is a
/// heuristic scanner, not a grammar: precision comes from the strict
/// numbering requirement plus the title validity filter below.
#[derive(Debug, Clone, PartialEq)]
pub struct AgendaItem {
    pub kind: LegislationKind,
    pub number: String,
    pub title: String,
    pub status: LegislationStatus,
}

const TITLE_MIN_CHARS: usize = 20;
const TITLE_MAX_CHARS: usize = 200;
const STATUS_WINDOW_CHARS: usize = 240;

/// Phrases that mark translated legal boilerplate rather than an item
/// title; agendas repeat these next to every numbered entry.
const BOILERPLATE_PHRASES: [&str; 6] = [
    "la ciudad de",
    "aviso legal",
    "para más información",
    "en español",
    "de conformidad con",
    "esta reunión",
];

/// First words that signal list chrome, not a title.
const LEADING_STOPWORDS: [&str; 7] = [
    "item", "agenda", "page", "attachment", "attachments", "backup", "exhibit",
];

pub fn extract_legislation(text: &str) -> Vec<AgendaItem> {
    // Strict numbering ("Ordinance No. 2025-001") keeps false positives down;
    // loosely numbered references are deliberately ignored.
    let re = Regex::new(
        r"(?i)\b(ordinance|resolution)\s+no\.?\s*(\d{4}-\d{1,4})\s*[:;.\-–—]?\s*([^\n]*)",
    )
    .expect("static regex");

    let all: Vec<regex::Captures<'_>> = re.captures_iter(text).collect();
    let mut out: Vec<AgendaItem> = Vec::new();

    for (i, caps) in all.iter().enumerate() {
        let kind = if caps[1].eq_ignore_ascii_case("ordinance") {
            LegislationKind::Ordinance
        } else {
            LegislationKind::Resolution
        };
        let number = caps[2].to_string();
        let title = caps.get(3).map(|m| m.as_str().trim()).unwrap_or("");

        if !title_is_valid(title) {
            continue;
        }
        // An agenda can mention the same item several times; keep the first.
        if out.iter().any(|item| item.number == number && item.kind == kind) {
            continue;
        }

        let whole = caps.get(0).expect("match exists");
        // Bound the context window by the neighboring items so one entry's
        // disposition never bleeds into the next.
        let prev_end = if i > 0 { all[i - 1].get(0).expect("match exists").end() } else { 0 };
        let next_start = all
            .get(i + 1)
            .map(|c| c.get(0).expect("match exists").start())
            .unwrap_or(text.len());
        let status = infer_status(text, whole.start(), whole.end(), prev_end, next_start);

        out.push(AgendaItem {
            kind,
            number,
            title: title.trim_end().to_string(),
            status,
        });
    }

    out
}

fn title_is_valid(title: &str) -> bool {
    let char_len = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&char_len) {
        return false;
    }

    let lower = title.to_lowercase();
    if BOILERPLATE_PHRASES.iter().any(|p| lower.contains(p)) {
        return false;
    }

    if let Some(first) = lower.split_whitespace().next() {
        let first = first.trim_matches(|c: char| !c.is_alphanumeric());
        if LEADING_STOPWORDS.contains(&first) {
            return false;
        }
    }

    // High special-character density means table rubble or encoding damage.
    let special = title
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace() && !",.;:'()-&/".contains(*c))
        .count();
    if special * 4 > char_len {
        return false;
    }

    true
}

/// Scan a fixed window around the match for disposition words; agendas put
/// the outcome near the item, not in it.
fn infer_status(text: &str, start: usize, end: usize, prev_end: usize, next_start: usize) -> LegislationStatus {
    let from = floor_char_boundary(text, start.saturating_sub(STATUS_WINDOW_CHARS).max(prev_end));
    let to = ceil_char_boundary(text, (end + STATUS_WINDOW_CHARS).min(next_start).min(text.len()));
    let window = text[from..to].to_lowercase();

    if window.contains("withdrawn") {
        LegislationStatus::Withdrawn
    } else if window.contains("approved") || window.contains("adopted") || window.contains("passed") {
        LegislationStatus::Passed
    } else if window.contains("continued") || window.contains("tabled") || window.contains("postponed") {
        LegislationStatus::Pending
    } else {
        // "public hearing" and anything unrecognized both read as newly
        // introduced business.
        LegislationStatus::Introduced
    }
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_numbered_items() {
        let text = "\
Item 12. Ordinance No. 2025-001: Amending the land development code to allow accessory dwelling units. Approved on consent.
Item 13. Resolution No. 2025-014 - Authorizing a contract for park maintenance services with Travis Grounds LLC.
";
        let items = extract_legislation(text);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].kind, LegislationKind::Ordinance);
        assert_eq!(items[0].number, "2025-001");
        assert!(items[0].title.starts_with("Amending the land development code"));
        assert_eq!(items[0].status, LegislationStatus::Passed);

        assert_eq!(items[1].kind, LegislationKind::Resolution);
        assert_eq!(items[1].status, LegislationStatus::Introduced);
    }

    #[test]
    fn rejects_short_titles() {
        let text = "Ordinance No. 2025-002: Budget fix.";
        assert!(extract_legislation(text).is_empty());
    }

    #[test]
    fn rejects_overlong_titles() {
        let filler = "regulating municipal operations ".repeat(10);
        let text = format!("Ordinance No. 2025-003: {}", filler);
        assert!(extract_legislation(&text).is_empty());
    }

    #[test]
    fn rejects_spanish_boilerplate() {
        let text = "Ordinance No. 2025-004: La Ciudad de Austin publica este aviso conforme a la ley estatal.";
        assert!(extract_legislation(text).is_empty());
    }

    #[test]
    fn rejects_leading_stopwords() {
        let text = "Ordinance No. 2025-005: Attachment B, supporting materials for the item above.";
        assert!(extract_legislation(text).is_empty());
    }

    #[test]
    fn rejects_special_character_rubble() {
        let text = "Ordinance No. 2025-006: ___ | ### $$$ *** === ~~ ^^ %% @@ !! ?? __ ||";
        assert!(extract_legislation(text).is_empty());
    }

    #[test]
    fn loose_numbering_is_ignored() {
        let text = "The council discussed ordinance 17 regarding noise abatement downtown this week.";
        assert!(extract_legislation(text).is_empty());
    }

    #[test]
    fn status_from_surrounding_window() {
        let text = "\
Resolution No. 2025-020 - Establishing a homestead preservation district in east Austin.
This item was continued to the next regular meeting at staff request.
";
        let items = extract_legislation(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, LegislationStatus::Pending);
    }

    #[test]
    fn withdrawn_beats_other_keywords() {
        let text = "\
Ordinance No. 2025-021: Rezoning parcels along South Congress for mixed-use development.
Withdrawn by the sponsor before the public hearing was approved to proceed.
";
        let items = extract_legislation(text);
        assert_eq!(items[0].status, LegislationStatus::Withdrawn);
    }

    #[test]
    fn duplicate_mentions_collapse() {
        let text = "\
Ordinance No. 2025-022: Adopting the annual service plan for the downtown public improvement district.
Later in the meeting, Ordinance No. 2025-022: Adopting the annual service plan for the downtown public improvement district.
";
        assert_eq!(extract_legislation(text).len(), 1);
    }
}
