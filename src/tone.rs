//! Tone-improvement session
//!
//! Closed -> Requesting -> {Ready, Failed} -> Closed. Every open and every
//! dismiss bumps the generation, and a response is applied only when it
//! carries the generation of the session that is still open.

use crate::error::{DashboardError, DashboardResult};
use crate::logging;
use crate::models::{AnalysisResult, Sentiment, ToneSuggestion};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneState {
    #[default]
    Closed,
    Requesting,
    Ready,
    Failed,
}

/// Handed to the caller when a session opens; echo it back with the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneTicket {
    pub generation: u64,
    pub source_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneOutcome {
    Applied,
    Failed,
    Stale, // session closed or replaced before the response arrived
}

/// What the presentation layer sees of the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneView {
    pub state: ToneState,
    pub source_id: Option<String>,
    pub source_text: Option<String>,
    pub loading: bool,
    pub suggestion: Option<ToneSuggestion>,
}

#[derive(Debug, Clone, Default)]
pub struct ToneSession {
    generation: u64,
    state: ToneState,
    source: Option<(String, String)>, // (result id, text)
    suggestion: Option<ToneSuggestion>,
}

impl ToneSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ToneState {
        self.state
    }

    pub fn suggestion(&self) -> Option<&ToneSuggestion> {
        self.suggestion.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.state != ToneState::Closed
    }

    /// Open a session for a result whose first analysis is Negative
    pub fn begin(&mut self, result: &AnalysisResult) -> DashboardResult<ToneTicket> {
        if result.primary_sentiment() != Some(Sentiment::Negative) {
            return Err(DashboardError::NotEligible(format!(
                "result {} is not negative",
                result.id
            )));
        }

        self.generation += 1;
        self.state = ToneState::Requesting;
        self.source = Some((result.id.clone(), result.text.clone()));
        self.suggestion = None;

        logging::log_tone(Some(&result.id), &format!("Session opened (generation {})", self.generation));

        Ok(ToneTicket {
            generation: self.generation,
            source_id: result.id.clone(),
            text: result.text.clone(),
        })
    }

    /// Apply a provider response if it belongs to the open session
    pub fn resolve(&mut self, ticket: &ToneTicket, response: Result<ToneSuggestion, String>) -> ToneOutcome {
        if ticket.generation != self.generation || self.state != ToneState::Requesting {
            logging::log_tone(Some(&ticket.source_id), "Discarding stale tone response");
            return ToneOutcome::Stale;
        }

        match response {
            Ok(suggestion) => {
                self.suggestion = Some(suggestion);
                self.state = ToneState::Ready;
                logging::log_tone(Some(&ticket.source_id), "Suggestion ready");
                ToneOutcome::Applied
            }
            Err(e) => {
                self.state = ToneState::Failed;
                logging::log_error(Some(&ticket.source_id), &format!("Tone improvement failed: {}", e));
                ToneOutcome::Failed
            }
        }
    }

    /// Close from any state, discarding source and suggestion
    pub fn dismiss(&mut self) {
        if self.is_open() {
            self.generation += 1;
            logging::log_tone(self.source.as_ref().map(|(id, _)| id.as_str()), "Session dismissed");
        }
        self.state = ToneState::Closed;
        self.source = None;
        self.suggestion = None;
    }

    pub fn view(&self) -> ToneView {
        ToneView {
            state: self.state,
            source_id: self.source.as_ref().map(|(id, _)| id.clone()),
            source_text: self.source.as_ref().map(|(_, text)| text.clone()),
            loading: self.state == ToneState::Requesting,
            suggestion: self.suggestion.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentAnalysis;
    use chrono::Utc;

    fn result(id: &str, sentiment: Sentiment) -> AnalysisResult {
        AnalysisResult {
            id: id.to_string(),
            text: format!("text of {}", id),
            timestamp: Utc::now(),
            analyses: vec![SentimentAnalysis {
                provider: "Flash".into(),
                sentiment,
                confidence: 0.9,
                keywords: vec![],
                explanation: String::new(),
            }],
        }
    }

    fn suggestion() -> ToneSuggestion {
        ToneSuggestion {
            improved_text: "better".into(),
            word_changes: vec![],
            reasoning: "kinder".into(),
        }
    }

    #[test]
    fn test_only_negative_results_open_a_session() {
        let mut session = ToneSession::new();
        let err = session.begin(&result("r1", Sentiment::Positive)).unwrap_err();
        assert!(matches!(err, DashboardError::NotEligible(_)));
        assert_eq!(session.state(), ToneState::Closed);
    }

    #[test]
    fn test_requesting_to_ready() {
        let mut session = ToneSession::new();
        let ticket = session.begin(&result("r1", Sentiment::Negative)).unwrap();
        assert!(session.view().loading);
        assert_eq!(session.resolve(&ticket, Ok(suggestion())), ToneOutcome::Applied);
        assert_eq!(session.state(), ToneState::Ready);
        assert_eq!(session.view().source_text.as_deref(), Some("text of r1"));
    }

    #[test]
    fn test_failure_keeps_session_open_without_suggestion() {
        let mut session = ToneSession::new();
        let ticket = session.begin(&result("r1", Sentiment::Negative)).unwrap();
        assert_eq!(session.resolve(&ticket, Err("boom".into())), ToneOutcome::Failed);
        assert!(session.is_open());
        assert!(!session.view().loading);
        assert!(session.suggestion().is_none());
    }

    #[test]
    fn test_stale_response_after_dismiss_is_discarded() {
        let mut session = ToneSession::new();
        let ticket = session.begin(&result("r1", Sentiment::Negative)).unwrap();
        session.dismiss();
        assert_eq!(session.resolve(&ticket, Ok(suggestion())), ToneOutcome::Stale);
        assert_eq!(session.state(), ToneState::Closed);
        assert!(session.suggestion().is_none());
    }

    #[test]
    fn test_old_ticket_cannot_fill_new_session() {
        let mut session = ToneSession::new();
        let old = session.begin(&result("r1", Sentiment::Negative)).unwrap();
        session.dismiss();
        let new = session.begin(&result("r2", Sentiment::Negative)).unwrap();

        assert_eq!(session.resolve(&old, Ok(suggestion())), ToneOutcome::Stale);
        assert_eq!(session.state(), ToneState::Requesting);
        assert_eq!(session.resolve(&new, Ok(suggestion())), ToneOutcome::Applied);
    }
}
