//! Provider seams
//!
//! The analysis and tone-improvement backends are opaque. Their raw output
//! carries sentiment as an open string; `validate_batch` coerces it into the
//! closed model before anything reaches the store.

use crate::models::{ProviderMode, Sentiment, SentimentAnalysis, ToneSuggestion};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

pub type ProviderError = Box<dyn Error + Send + Sync>;

// ============ Wire Contract ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAnalysis {
    #[serde(default)]
    pub provider: String,
    pub sentiment: String,
    pub confidence: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAnalysisResult {
    #[serde(default)]
    pub text: String,
    pub analyses: Vec<RawAnalysis>,
}

/// A provider result that passed boundary validation (no id/timestamp yet)
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResult {
    pub text: String,
    pub analyses: Vec<SentimentAnalysis>,
}

// ============ Traits ============

#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Analyze a whole batch in one round trip
    async fn analyze(
        &self,
        texts: &[String],
        mode: ProviderMode,
    ) -> Result<Vec<RawAnalysisResult>, ProviderError>;
}

#[async_trait]
pub trait ToneProvider: Send + Sync {
    async fn improve(&self, text: &str) -> Result<ToneSuggestion, ProviderError>;
}

// ============ Boundary Validation ============

/// Coerce a raw provider response into validated results, in request order
pub fn validate_batch(
    texts: &[String],
    mode: ProviderMode,
    raw: Vec<RawAnalysisResult>,
) -> Result<Vec<ValidatedResult>, String> {
    if raw.is_empty() {
        return Err("empty response".to_string());
    }
    if raw.len() != texts.len() {
        return Err(format!(
            "expected {} results, got {}",
            texts.len(),
            raw.len()
        ));
    }

    let expected = mode.analyses_per_text();
    let labels = mode.provider_labels();

    raw.into_iter()
        .zip(texts.iter())
        .enumerate()
        .map(|(index, (result, submitted))| {
            if result.analyses.len() != expected {
                return Err(format!(
                    "result {} has {} analyses, {} mode requires {}",
                    index,
                    result.analyses.len(),
                    mode.as_str(),
                    expected
                ));
            }

            let analyses = result
                .analyses
                .into_iter()
                .enumerate()
                .map(|(slot, a)| validate_analysis(a, labels[slot]))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| format!("result {}: {}", index, e))?;

            let text = if result.text.trim().is_empty() {
                submitted.clone()
            } else {
                result.text
            };

            Ok(ValidatedResult { text, analyses })
        })
        .collect()
}

fn validate_analysis(raw: RawAnalysis, default_label: &str) -> Result<SentimentAnalysis, String> {
    let sentiment = Sentiment::from_str(&raw.sentiment)
        .ok_or_else(|| format!("unrecognized sentiment '{}'", raw.sentiment))?;

    if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
        return Err(format!("confidence {} outside [0, 1]", raw.confidence));
    }

    let provider = if raw.provider.trim().is_empty() {
        default_label.to_string()
    } else {
        raw.provider
    };

    Ok(SentimentAnalysis {
        provider,
        sentiment,
        confidence: raw.confidence,
        keywords: raw.keywords,
        explanation: raw.explanation,
    })
}

/// Strip markdown code fences a model may wrap around JSON
pub fn strip_code_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
