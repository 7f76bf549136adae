use std::time::{Duration, Instant};

/// Quiet window between the last edit and a recalculation.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Single-shot edit debouncer: every edit restarts the delay, and `poll`
/// fires once when the document has been quiet for the full window.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn edit(&mut self) {
        self.edit_at(Instant::now());
    }

    pub fn edit_at(&mut self, now: Instant) {
        self.pending = Some(now);
    }

    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(last_edit) if now.duration_since(last_edit) >= self.delay => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn fires_after_quiet_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.edit_at(start);
        assert!(!debouncer.poll_at(start));
        assert!(!debouncer.poll_at(start + Duration::from_millis(499)));
        assert!(debouncer.poll_at(start + DELAY));
    }

    #[test]
    fn fires_only_once() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.edit_at(start);
        assert!(debouncer.poll_at(start + DELAY));
        assert!(!debouncer.poll_at(start + DELAY * 2));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn edits_restart_the_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.edit_at(start);
        debouncer.edit_at(start + Duration::from_millis(400));
        assert!(!debouncer.poll_at(start + DELAY));
        assert!(debouncer.poll_at(start + Duration::from_millis(900)));
    }

    #[test]
    fn idle_never_fires() {
        let mut debouncer = Debouncer::default();
        assert!(!debouncer.poll());
        assert!(!debouncer.is_pending());
    }
}
