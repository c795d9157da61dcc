//! Derived analytics
//!
//! Every view is a pure function of the current batch and/or history and is
//! recomputed on read.

use crate::config::DashboardConfig;
use crate::models::{AnalysisResult, Sentiment, EXPERT_LABEL, STANDARD_LABEL};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============ View Types ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSlice {
    pub sentiment: Sentiment,
    pub count: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementRow {
    pub sentiment: Sentiment,
    pub standard: u32,
    pub expert: u32,
    pub full_mark: u32, // max(standard, expert, floor)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub label: String,   // "T-15" .. "T-1"
    pub confidence: u32, // mean confidence, percent
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordBubble {
    pub keyword: String,
    pub x: u32, // frequency
    pub y: u32, // average confidence, percent
    pub z: u32, // frequency * 10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTheme {
    Default,
    Sunny,  // positive
    Stormy, // negative
    Calm,   // neutral
}

impl MoodTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodTheme::Default => "default",
            MoodTheme::Sunny => "sunny",
            MoodTheme::Stormy => "stormy",
            MoodTheme::Calm => "calm",
        }
    }

    pub fn accent_color(&self) -> &'static str {
        match self {
            MoodTheme::Default => "#6366f1",
            MoodTheme::Sunny => "#10b981",
            MoodTheme::Stormy => "#f43f5e",
            MoodTheme::Calm => "#64748b",
        }
    }
}

pub fn sentiment_color(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "#10b981",
        Sentiment::Neutral => "#94a3b8",
        Sentiment::Negative => "#f43f5e",
    }
}

// ============ Source Selection ============

/// Current batch when it has anything, otherwise history
pub fn analytics_source<'a>(
    current: &'a [AnalysisResult],
    history: &'a [AnalysisResult],
) -> &'a [AnalysisResult] {
    if current.is_empty() {
        history
    } else {
        current
    }
}

fn to_percent(fraction: f64) -> u32 {
    (fraction * 100.0).round().max(0.0) as u32
}

// ============ Views ============

/// Tally every individual analysis into the three sentiment buckets
pub fn sentiment_distribution(source: &[AnalysisResult]) -> Vec<DistributionSlice> {
    let mut counts: HashMap<Sentiment, u32> = HashMap::new();
    for analysis in source.iter().flat_map(|r| r.analyses.iter()) {
        *counts.entry(analysis.sentiment).or_insert(0) += 1;
    }

    Sentiment::ALL
        .iter()
        .map(|s| DistributionSlice {
            sentiment: *s,
            count: counts.get(s).copied().unwrap_or(0),
            color: sentiment_color(*s).to_string(),
        })
        .collect()
}

/// Per sentiment, how many history entries the Standard and Expert providers each called that way
pub fn provider_agreement(history: &[AnalysisResult], floor: u32) -> Vec<AgreementRow> {
    let entries_with = |label: &str, sentiment: Sentiment| -> u32 {
        history
            .iter()
            .filter(|r| {
                r.analyses
                    .iter()
                    .any(|a| a.provider == label && a.sentiment == sentiment)
            })
            .count() as u32
    };

    Sentiment::ALL
        .iter()
        .map(|s| {
            let standard = entries_with(STANDARD_LABEL, *s);
            let expert = entries_with(EXPERT_LABEL, *s);
            AgreementRow {
                sentiment: *s,
                standard,
                expert,
                full_mark: standard.max(expert).max(floor),
            }
        })
        .collect()
}

/// The newest `window` history entries, oldest first
pub fn sentiment_trend(history: &[AnalysisResult], window: usize) -> Vec<TrendPoint> {
    let recent = &history[..history.len().min(window)];
    let n = recent.len();

    recent
        .iter()
        .rev()
        .enumerate()
        .map(|(i, result)| {
            let count_of = |s: Sentiment| {
                result.analyses.iter().filter(|a| a.sentiment == s).count() as u32
            };
            let mean = if result.analyses.is_empty() {
                0.0
            } else {
                result.analyses.iter().map(|a| a.confidence).sum::<f64>()
                    / result.analyses.len() as f64
            };

            TrendPoint {
                label: format!("T-{}", n - i),
                confidence: to_percent(mean),
                positive: count_of(Sentiment::Positive),
                negative: count_of(Sentiment::Negative),
                neutral: count_of(Sentiment::Neutral),
            }
        })
        .collect()
}

/// Keyword frequency against average confidence, most frequent first
pub fn keyword_bubbles(history: &[AnalysisResult], limit: usize) -> Vec<KeywordBubble> {
    // (keyword, count, summed confidence), in first-seen order so ties stay stable
    let mut tallies: Vec<(String, u32, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for analysis in history.iter().flat_map(|r| r.analyses.iter()) {
        for keyword in &analysis.keywords {
            match index.get(keyword) {
                Some(&i) => {
                    tallies[i].1 += 1;
                    tallies[i].2 += analysis.confidence;
                }
                None => {
                    index.insert(keyword.clone(), tallies.len());
                    tallies.push((keyword.clone(), 1, analysis.confidence));
                }
            }
        }
    }

    let mut bubbles: Vec<KeywordBubble> = tallies
        .into_iter()
        .map(|(keyword, count, total)| KeywordBubble {
            keyword,
            x: count,
            y: to_percent(total / count as f64),
            z: count * 10,
        })
        .collect();

    bubbles.sort_by(|a, b| b.x.cmp(&a.x));
    bubbles.truncate(limit);
    bubbles
}

/// Share of entries whose first analysis is Positive, as a percentage
pub fn satisfaction_score(source: &[AnalysisResult]) -> u32 {
    let positive = source
        .iter()
        .filter(|r| r.primary_sentiment() == Some(Sentiment::Positive))
        .count();
    let denominator = source.len().max(1);
    to_percent(positive as f64 / denominator as f64)
}

/// Theme picked from the first analysis of the first entry
pub fn mood_theme(source: &[AnalysisResult]) -> MoodTheme {
    match source.first().and_then(|r| r.primary_sentiment()) {
        Some(Sentiment::Positive) => MoodTheme::Sunny,
        Some(Sentiment::Negative) => MoodTheme::Stormy,
        Some(Sentiment::Neutral) => MoodTheme::Calm,
        None => MoodTheme::Default,
    }
}

// ============ Report ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub distribution: Vec<DistributionSlice>,
    pub agreement: Vec<AgreementRow>,
    pub trend: Vec<TrendPoint>,
    pub keywords: Vec<KeywordBubble>,
    pub satisfaction: u32,
    pub mood: MoodTheme,
}

impl AnalyticsReport {
    pub fn compute(current: &[AnalysisResult], history: &[AnalysisResult], config: &DashboardConfig) -> Self {
        let source = analytics_source(current, history);
        Self {
            distribution: sentiment_distribution(source),
            agreement: provider_agreement(history, config.radar_floor),
            trend: sentiment_trend(history, config.trend_window),
            keywords: keyword_bubbles(history, config.bubble_limit),
            satisfaction: satisfaction_score(source),
            mood: mood_theme(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentAnalysis;
    use chrono::Utc;

    fn analysis(provider: &str, sentiment: Sentiment, confidence: f64, keywords: &[&str]) -> SentimentAnalysis {
        SentimentAnalysis {
            provider: provider.to_string(),
            sentiment,
            confidence,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            explanation: String::new(),
        }
    }

    fn result(text: &str, analyses: Vec<SentimentAnalysis>) -> AnalysisResult {
        AnalysisResult {
            id: text.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
            analyses,
        }
    }

    fn single(text: &str, sentiment: Sentiment) -> AnalysisResult {
        result(text, vec![analysis("Flash", sentiment, 0.8, &[])])
    }

    #[test]
    fn test_distribution_counts_every_analysis() {
        let history = vec![
            single("a", Sentiment::Positive),
            result("b", vec![
                analysis("Standard", Sentiment::Negative, 0.6, &[]),
                analysis("Expert", Sentiment::Positive, 0.7, &[]),
            ]),
        ];
        let dist = sentiment_distribution(analytics_source(&[], &history));
        let count = |s| dist.iter().find(|d| d.sentiment == s).unwrap().count;
        assert_eq!(count(Sentiment::Positive), 2);
        assert_eq!(count(Sentiment::Negative), 1);
        assert_eq!(count(Sentiment::Neutral), 0);
    }

    #[test]
    fn test_source_prefers_current() {
        let current = vec![single("c", Sentiment::Negative)];
        let history = vec![single("h", Sentiment::Positive)];
        assert_eq!(analytics_source(&current, &history)[0].text, "c");
        assert_eq!(analytics_source(&[], &history)[0].text, "h");
    }

    #[test]
    fn test_agreement_floor_and_counts() {
        let history = vec![
            result("a", vec![
                analysis("Standard", Sentiment::Negative, 0.6, &[]),
                analysis("Expert", Sentiment::Neutral, 0.7, &[]),
            ]),
            result("b", vec![
                analysis("Standard", Sentiment::Negative, 0.6, &[]),
                analysis("Expert", Sentiment::Negative, 0.7, &[]),
            ]),
            single("c", Sentiment::Negative),
        ];
        let rows = provider_agreement(&history, 10);
        let negative = rows.iter().find(|r| r.sentiment == Sentiment::Negative).unwrap();
        assert_eq!((negative.standard, negative.expert, negative.full_mark), (2, 1, 10));

        let many: Vec<_> = (0..12)
            .map(|i| result(&i.to_string(), vec![analysis("Standard", Sentiment::Positive, 0.5, &[])]))
            .collect();
        let positive = provider_agreement(&many, 10)[0].clone();
        assert_eq!(positive.sentiment, Sentiment::Positive);
        assert_eq!(positive.full_mark, 12);
    }

    #[test]
    fn test_trend_is_chronological_and_labelled() {
        // history is newest first
        let history: Vec<_> = (0..20)
            .rev()
            .map(|i| result(&format!("r{}", i), vec![analysis("Flash", Sentiment::Positive, 0.5, &[])]))
            .collect();
        let trend = sentiment_trend(&history, 15);
        assert_eq!(trend.len(), 15);
        assert_eq!(trend[0].label, "T-15");
        assert_eq!(trend[14].label, "T-1");
        assert_eq!(trend[14].confidence, 50);
    }

    #[test]
    fn test_trend_point_mean_and_counts() {
        let history = vec![
            result("newest", vec![
                analysis("Standard", Sentiment::Positive, 0.9, &[]),
                analysis("Expert", Sentiment::Neutral, 0.6, &[]),
            ]),
            single("older", Sentiment::Negative),
        ];
        let trend = sentiment_trend(&history, 15);
        assert_eq!(trend[0].label, "T-2");
        assert_eq!(trend[0].negative, 1);
        assert_eq!(trend[1].label, "T-1");
        assert_eq!(trend[1].confidence, 75);
        assert_eq!((trend[1].positive, trend[1].neutral), (1, 1));
    }

    #[test]
    fn test_keyword_ranking() {
        let mut history = Vec::new();
        for _ in 0..5 {
            history.push(result("x", vec![analysis("Flash", Sentiment::Positive, 0.8, &["a"])]));
        }
        for _ in 0..3 {
            history.push(result("y", vec![analysis("Flash", Sentiment::Positive, 0.4, &["b"])]));
        }
        for _ in 0..12 {
            history.push(result("z", vec![analysis("Flash", Sentiment::Positive, 0.6, &["c", "C"])]));
        }
        let bubbles = keyword_bubbles(&history, 10);
        assert_eq!(bubbles[0].keyword, "c");
        assert_eq!((bubbles[0].x, bubbles[0].y, bubbles[0].z), (12, 60, 120));
        // case-sensitive: "C" is its own keyword
        assert!(bubbles.iter().any(|b| b.keyword == "C" && b.x == 12));
        assert_eq!(bubbles.last().unwrap().keyword, "b");
    }

    #[test]
    fn test_keyword_limit() {
        let keywords: Vec<String> = (0..15).map(|i| format!("k{}", i)).collect();
        let refs: Vec<&str> = keywords.iter().map(|k| k.as_str()).collect();
        let history = vec![result("x", vec![analysis("Flash", Sentiment::Neutral, 0.5, &refs)])];
        assert_eq!(keyword_bubbles(&history, 10).len(), 10);
    }

    #[test]
    fn test_satisfaction_empty_is_zero() {
        assert_eq!(satisfaction_score(analytics_source(&[], &[])), 0);
    }

    #[test]
    fn test_satisfaction_uses_first_analysis() {
        let source = vec![
            single("a", Sentiment::Positive),
            result("b", vec![
                analysis("Standard", Sentiment::Negative, 0.5, &[]),
                analysis("Expert", Sentiment::Positive, 0.5, &[]),
            ]),
            single("c", Sentiment::Positive),
        ];
        assert_eq!(satisfaction_score(&source), 67);
    }

    #[test]
    fn test_mood_theme() {
        assert_eq!(mood_theme(&[]), MoodTheme::Default);
        assert_eq!(mood_theme(&[single("a", Sentiment::Negative)]), MoodTheme::Stormy);
        assert_eq!(mood_theme(&[result("b", vec![])]), MoodTheme::Default);
    }
}
