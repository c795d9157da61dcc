use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Sentiment ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Display order used by every aggregate view
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    pub fn from_str(s: &str) -> Option<Sentiment> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

// ============ Provider Mode ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    #[default]
    Flash,   // fast, shallow
    Pro,     // deep
    Compare, // two judgments per text
}

impl ProviderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderMode::Flash => "flash",
            ProviderMode::Pro => "pro",
            ProviderMode::Compare => "compare",
        }
    }

    pub fn from_str(s: &str) -> Option<ProviderMode> {
        match s.to_lowercase().as_str() {
            "flash" => Some(ProviderMode::Flash),
            "pro" => Some(ProviderMode::Pro),
            "compare" => Some(ProviderMode::Compare),
            _ => None,
        }
    }

    /// Provider labels a response is expected to carry, in order
    pub fn provider_labels(&self) -> &'static [&'static str] {
        match self {
            ProviderMode::Flash => &[FLASH_LABEL],
            ProviderMode::Pro => &[PRO_LABEL],
            ProviderMode::Compare => &[STANDARD_LABEL, EXPERT_LABEL],
        }
    }

    pub fn analyses_per_text(&self) -> usize {
        self.provider_labels().len()
    }
}

pub const FLASH_LABEL: &str = "Flash";
pub const PRO_LABEL: &str = "Pro";
pub const STANDARD_LABEL: &str = "Standard";
pub const EXPERT_LABEL: &str = "Expert";

// ============ Analysis Results ============

/// One judgment from one provider on one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub provider: String,
    pub sentiment: Sentiment,
    pub confidence: f64,       // 0.0 to 1.0
    pub keywords: Vec<String>, // 3 by contract, not enforced
    pub explanation: String,
}

/// One submitted text with its judgment(s)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub analyses: Vec<SentimentAnalysis>,
}

impl AnalysisResult {
    /// Sentiment of the first analysis, which drives mood and tone eligibility
    pub fn primary_sentiment(&self) -> Option<Sentiment> {
        self.analyses.first().map(|a| a.sentiment)
    }
}

// ============ Tone Improvement ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordChange {
    pub original: String,
    pub suggested: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneSuggestion {
    pub improved_text: String,
    #[serde(default)]
    pub word_changes: Vec<WordChange>,
    #[serde(default)]
    pub reasoning: String,
}
