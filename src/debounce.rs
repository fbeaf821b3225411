use std::time::{Duration, Instant};

/// Deadline-based debounce for the search field.
///
/// Every keystroke replaces the pending query and pushes its deadline out by
/// `delay`; the event loop polls and gets the query back once input has been
/// quiet long enough. Earlier queries are dropped, never queued.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    min_len: usize,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration, min_len: usize) -> Self {
        Self {
            delay,
            min_len,
            pending: None,
        }
    }

    /// Queries shorter than the minimum length cancel whatever was pending
    pub fn schedule(&mut self, query: &str, now: Instant) {
        let query = query.trim();
        if query.chars().count() < self.min_len {
            self.pending = None;
            return;
        }
        self.pending = Some((query.to_string(), now + self.delay));
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(q, _)| q),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Lets the event loop sleep exactly until the next search is due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}
