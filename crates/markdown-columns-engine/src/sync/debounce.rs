use std::time::{Duration, Instant};

/// Quiet time after the last keystroke before a free-text edit commits.
pub const EDIT_QUIET_PERIOD: Duration = Duration::from_millis(800);

/// Collapses a burst of edits into the last value once input goes quiet.
///
/// Time is passed in by the caller so the event loop owns the clock.
#[derive(Debug, Clone)]
pub struct EditDebouncer<T> {
    quiet: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Default for EditDebouncer<T> {
    fn default() -> Self {
        Self::new(EDIT_QUIET_PERIOD)
    }
}

impl<T> EditDebouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Record a new value, restarting the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.quiet, value));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    /// Take the value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((due, _)) if *due <= now => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Take the value now, quiet or not.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
