use crate::logging;
use crate::models::AnalysisResult;
use crate::provider::ValidatedResult;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Current batch plus the newest-first history of every result produced
#[derive(Debug, Default, Clone)]
pub struct ResultStore {
    current: Vec<AnalysisResult>,
    history: Vec<AnalysisResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &[AnalysisResult] {
        &self.current
    }

    pub fn history(&self) -> &[AnalysisResult] {
        &self.history
    }

    /// Assign identity and timestamp, replace the current batch and prepend it to history
    pub fn record_batch(&mut self, batch: Vec<ValidatedResult>, received_at: DateTime<Utc>) -> &[AnalysisResult] {
        let results: Vec<AnalysisResult> = batch
            .into_iter()
            .map(|r| AnalysisResult {
                id: Uuid::new_v4().to_string(),
                text: r.text,
                timestamp: received_at,
                analyses: r.analyses,
            })
            .collect();

        let mut history = results.clone();
        history.append(&mut self.history);
        self.history = history;
        self.current = results;

        logging::log_store(&format!(
            "Recorded batch of {} (history size {})",
            self.current.len(),
            self.history.len()
        ));

        &self.current
    }

    /// Empty history; the current batch is left alone
    pub fn clear_history(&mut self) {
        let cleared = self.history.len();
        self.history.clear();
        logging::log_store(&format!("Cleared {} history entries", cleared));
    }

    /// Look up a result by id in the current batch, then history
    pub fn find(&self, id: &str) -> Option<&AnalysisResult> {
        self.current
            .iter()
            .chain(self.history.iter())
            .find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Sentiment, SentimentAnalysis};
    use std::collections::HashSet;

    fn validated(text: &str) -> ValidatedResult {
        ValidatedResult {
            text: text.to_string(),
            analyses: vec![SentimentAnalysis {
                provider: "Flash".into(),
                sentiment: Sentiment::Neutral,
                confidence: 0.5,
                keywords: vec![],
                explanation: String::new(),
            }],
        }
    }

    #[test]
    fn test_batch_replaces_current_and_prepends_history() {
        let mut store = ResultStore::new();
        store.record_batch(vec![validated("first")], Utc::now());
        store.record_batch(vec![validated("t1"), validated("t2")], Utc::now());

        let texts: Vec<&str> = store.current().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["t1", "t2"]);
        assert_eq!(&store.history()[..2], store.current());
        assert_eq!(store.history()[2].text, "first");
    }

    #[test]
    fn test_ids_unique_for_identical_text() {
        let mut store = ResultStore::new();
        for _ in 0..5 {
            store.record_batch(vec![validated("same"), validated("same")], Utc::now());
        }
        let ids: HashSet<&str> = store.history().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_clear_history_keeps_current() {
        let mut store = ResultStore::new();
        store.record_batch(vec![validated("kept")], Utc::now());
        store.clear_history();
        assert!(store.history().is_empty());
        assert_eq!(store.current().len(), 1);

        let id = store.current()[0].id.clone();
        assert!(store.find(&id).is_some());
    }
}
