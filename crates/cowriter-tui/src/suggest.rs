//! Debounced, single-flight suggestion fetching.
//!
//! Every draft edit takes a new ticket (a monotonically increasing
//! sequence number) and schedules a timer for it. When a timer fires, the
//! ticket it carries is only honored if it is still the newest one — so a
//! burst of keystrokes collapses into a single fetch for the final text,
//! and a fetch that resolves after further typing is discarded as stale.

use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::action::Action;

pub struct SuggestionController {
    ticket: u64,
    in_flight: bool,
    loading_since: Option<Instant>,
    last_error: Option<String>,
    debounce: Duration,
    loading_delay: Duration,
}

impl SuggestionController {
    pub fn new(debounce: Duration, loading_delay: Duration) -> Self {
        Self {
            ticket: 0,
            in_flight: false,
            loading_since: None,
            last_error: None,
            debounce,
            loading_delay,
        }
    }

    /// Record a draft edit: supersede whatever was scheduled or in flight
    /// and start a fresh debounce window. Empty drafts never fetch, but
    /// still take a ticket so older timers go stale.
    pub fn schedule(&mut self, prompt: &str, tx: &mpsc::UnboundedSender<Action>) -> u64 {
        self.ticket += 1;
        self.in_flight = false;
        self.loading_since = None;

        let ticket = self.ticket;
        if prompt.is_empty() {
            return ticket;
        }

        let delay = self.debounce;
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Action::PromptSettled { ticket });
        });
        ticket
    }

    /// A debounce timer fired. Returns true when the ticket is still
    /// current and the fetch should go out.
    pub fn begin_fetch(&mut self, ticket: u64) -> bool {
        if ticket != self.ticket {
            return false;
        }
        self.in_flight = true;
        self.loading_since = Some(Instant::now());
        self.last_error = None;
        true
    }

    /// A fetch resolved. Returns false when it no longer matters.
    pub fn finish(&mut self, ticket: u64) -> bool {
        if ticket != self.ticket {
            return false;
        }
        self.in_flight = false;
        self.loading_since = None;
        true
    }

    /// A fetch failed. Stale failures are dropped like stale results.
    pub fn fail(&mut self, ticket: u64, error: String) -> bool {
        if ticket != self.ticket {
            return false;
        }
        self.in_flight = false;
        self.loading_since = None;
        self.last_error = Some(error);
        true
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    /// The loading indicator only shows once a fetch has been in flight
    /// longer than the configured delay, so quick answers never flash it.
    pub fn loading_visible(&self) -> bool {
        match self.loading_since {
            Some(since) => self.in_flight && since.elapsed() >= self.loading_delay,
            None => false,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SuggestionController {
        SuggestionController::new(Duration::from_millis(40), Duration::from_millis(30))
    }

    #[tokio::test]
    async fn rapid_edits_collapse_into_one_fetch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ctl = controller();

        ctl.schedule("a", &tx);
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctl.schedule("ab", &tx);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let last = ctl.schedule("abc", &tx);

        // let every timer fire
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut accepted = Vec::new();
        while let Ok(action) = rx.try_recv() {
            if let Action::PromptSettled { ticket } = action {
                if ctl.begin_fetch(ticket) {
                    accepted.push(ticket);
                }
            }
        }
        assert_eq!(accepted, vec![last]);
    }

    #[tokio::test]
    async fn empty_drafts_never_schedule_a_fetch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ctl = controller();

        ctl.schedule("", &tx);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn results_for_superseded_tickets_are_dropped() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ctl = controller();

        let first = ctl.schedule("hello", &tx);
        assert!(ctl.begin_fetch(first));
        assert!(ctl.is_fetching());

        // a keystroke lands while the fetch is in flight
        ctl.schedule("hello w", &tx);
        assert!(!ctl.finish(first));
        assert!(!ctl.fail(first, "too late".to_string()));
        assert!(ctl.last_error().is_none());
    }

    #[tokio::test]
    async fn loading_indicator_waits_for_the_delay() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ctl = controller();

        let ticket = ctl.schedule("hello", &tx);
        ctl.begin_fetch(ticket);
        assert!(!ctl.loading_visible());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(ctl.loading_visible());

        ctl.finish(ticket);
        assert!(!ctl.loading_visible());
    }

    #[tokio::test]
    async fn failures_surface_until_the_next_fetch_begins() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ctl = controller();

        let ticket = ctl.schedule("hello", &tx);
        ctl.begin_fetch(ticket);
        assert!(ctl.fail(ticket, "connection refused".to_string()));
        assert_eq!(ctl.last_error(), Some("connection refused"));

        // typing alone does not clear the error; the next fetch does
        let next = ctl.schedule("hello again", &tx);
        assert_eq!(ctl.last_error(), Some("connection refused"));
        ctl.begin_fetch(next);
        assert!(ctl.last_error().is_none());
    }
}
