/// Counters for one ingest run (or one source within it). Error messages
/// are sampled, not collected: the first few are enough for the source
/// row's last_error and the rest would just repeat.
const MAX_ERROR_SAMPLES: usize = 10;

#[derive(Debug, Default)]
pub struct RunStats {
    pub new: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub term_matches: usize,
    pub ai_tokens: u64,
    pub degraded: bool,
    error_samples: Vec<String>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_error(&mut self, msg: impl Into<String>) {
        self.errors += 1;
        if self.error_samples.len() < MAX_ERROR_SAMPLES {
            self.error_samples.push(msg.into());
        }
    }

    /// success / degraded / error, for the source's last_status column.
    /// A run that produced nothing but errors is an error; a run that
    /// produced records despite errors or fixture fallback is degraded.
    pub fn status(&self) -> &'static str {
        let produced = self.new + self.updated + self.skipped;
        if self.errors > 0 && produced == 0 {
            "error"
        } else if self.degraded || self.errors > 0 {
            "degraded"
        } else {
            "success"
        }
    }

    pub fn error_report(&self) -> Option<String> {
        if self.error_samples.is_empty() {
            None
        } else {
            Some(self.error_samples.join("; "))
        }
    }

    pub fn absorb(&mut self, other: &RunStats) {
        self.new += other.new;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.errors += other.errors;
        self.term_matches += other.term_matches;
        self.ai_tokens += other.ai_tokens;
        self.degraded |= other.degraded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_run_is_success() {
        let mut s = RunStats::new();
        s.new = 3;
        s.updated = 1;
        assert_eq!(s.status(), "success");
        assert_eq!(s.error_report(), None);
    }

    #[test]
    fn errors_with_output_are_degraded() {
        let mut s = RunStats::new();
        s.new = 2;
        s.record_error("boom");
        assert_eq!(s.status(), "degraded");
        assert_eq!(s.error_report(), Some("boom".to_string()));
    }

    #[test]
    fn only_errors_is_error() {
        let mut s = RunStats::new();
        s.record_error("fetch failed");
        assert_eq!(s.status(), "error");
    }

    #[test]
    fn fixture_fallback_is_degraded() {
        let mut s = RunStats::new();
        s.new = 2;
        s.degraded = true;
        assert_eq!(s.status(), "degraded");
    }

    #[test]
    fn error_samples_are_capped() {
        let mut s = RunStats::new();
        for i in 0..25 {
            s.record_error(format!("error {i}"));
        }
        assert_eq!(s.errors, 25);
        assert_eq!(s.error_report().unwrap().matches("error").count(), MAX_ERROR_SAMPLES);
    }

    #[test]
    fn absorb_accumulates() {
        let mut total = RunStats::new();
        let mut a = RunStats::new();
        a.new = 2;
        a.ai_tokens = 50;
        let mut b = RunStats::new();
        b.updated = 1;
        b.degraded = true;
        total.absorb(&a);
        total.absorb(&b);
        assert_eq!(total.new, 2);
        assert_eq!(total.updated, 1);
        assert_eq!(total.ai_tokens, 50);
        assert!(total.degraded);
    }
}
