//! Debounced input handling
//!
//! `Debouncer` is a clock-injected settle timer with no domain knowledge.
//! `InputController` layers the auto-trigger policy on top and owns the
//! "last submitted" guard, so separate instances never share it.

use crate::logging;
use std::time::{Duration, Instant};

// ============ Debouncer ============

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>, // value and the instant it settles
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record a new input value, cancelling any pending settle
    pub fn update(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Settle the pending value if its quiet period has fully elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = matches!(&self.pending, Some((_, deadline)) if *deadline <= now);
        if !ready {
            return None;
        }

        self.pending.take().map(|(value, _)| value)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

// ============ Input Controller ============

#[derive(Debug, Clone)]
pub struct InputController {
    debouncer: Debouncer<String>,
    min_chars: usize,
    last_submitted: Option<String>,
}

impl InputController {
    pub fn new(delay: Duration, min_chars: usize) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            min_chars,
            last_submitted: None,
        }
    }

    pub fn on_input(&mut self, text: &str, now: Instant) {
        self.debouncer.update(text.to_string(), now);
    }

    /// Returns the text to auto-submit when the input settles on something new and long enough.
    /// The guard is updated before the caller issues the request.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let settled = self.debouncer.poll(now)?;

        if settled.trim().chars().count() <= self.min_chars {
            return None;
        }
        if self.last_submitted.as_deref() == Some(settled.as_str()) {
            logging::log_input("Settled text already analyzed, skipping");
            return None;
        }

        logging::log_input(&format!("Auto-trigger for {} chars", settled.chars().count()));
        self.last_submitted = Some(settled.clone());
        Some(settled)
    }

    /// Undo the guard for a trigger that never reached the provider
    pub fn forget_submitted(&mut self, text: &str) {
        if self.last_submitted.as_deref() == Some(text) {
            self.last_submitted = None;
        }
    }

    pub fn last_submitted(&self) -> Option<&str> {
        self.last_submitted.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }
}
