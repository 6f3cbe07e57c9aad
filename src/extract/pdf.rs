/// Text extraction from downloaded agenda/minutes PDFs. Extraction failures
/// degrade to `None`; callers count them and move on.
pub fn extract_text(bytes: &[u8]) -> Option<String> {
    let text = match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "pdf text extraction failed");
            return None;
        }
    };

    let cleaned = clean(&text);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Collapse the ragged line breaks PDF extraction produces while keeping
/// paragraph boundaries, which the agenda scanner relies on.
fn clean(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            blank_run += 1;
            if blank_run == 1 && !out.is_empty() {
                out.push('\n');
            }
        } else {
            blank_run = 0;
            out.push_str(trimmed);
            out.push('\n');
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_degrade_to_none() {
        assert!(extract_text(b"not a pdf at all").is_none());
    }

    #[test]
    fn clean_collapses_blank_runs() {
        let raw = "ITEM 1\n\n\n\nITEM 2   \n   \nITEM 3\n";
        assert_eq!(clean(raw), "ITEM 1\n\nITEM 2\n\nITEM 3");
    }
}
