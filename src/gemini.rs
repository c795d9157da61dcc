use crate::config::DashboardConfig;
use crate::logging;
use crate::models::{ProviderMode, ToneSuggestion, EXPERT_LABEL, STANDARD_LABEL};
use crate::provider::{
    strip_code_fences, AnalysisProvider, ProviderError, RawAnalysisResult, ToneProvider,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    message: String,
    #[serde(default)]
    status: String,
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    flash_model: String,
    pro_model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, config: &DashboardConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            flash_model: config.flash_model.clone(),
            pro_model: config.pro_model.clone(),
        })
    }

    /// Build from the configured key, failing when none is set
    pub fn from_config(config: &DashboardConfig) -> Result<Self, ProviderError> {
        let key = config
            .api_key
            .as_deref()
            .ok_or("GEMINI_API_KEY is not set")?;
        Self::new(key, config)
    }

    fn model_for(&self, mode: ProviderMode) -> &str {
        match mode {
            ProviderMode::Flash => &self.flash_model,
            ProviderMode::Pro | ProviderMode::Compare => &self.pro_model,
        }
    }

    /// Send one JSON-mode generation request and return the text of the first candidate
    pub async fn generate_json(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: String,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: user_prompt }],
            }],
            generation_config: GenerationConfig {
                temperature,
                response_mime_type: "application/json".to_string(),
                max_output_tokens: max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/{}:generateContent", GEMINI_API_BASE, model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            if let Ok(parsed_error) = serde_json::from_str::<GeminiError>(&error_text) {
                return Err(format!(
                    "Gemini API error ({}): {} - {}",
                    status, parsed_error.error.status, parsed_error.error.message
                )
                .into());
            }

            return Err(format!("Gemini API error ({}): {}", status, error_text).into());
        }

        let completion: GenerateContentResponse = response.json().await?;

        completion
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.iter().find_map(|p| p.text.clone()))
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| "No response from Gemini".into())
    }

    /// Validate the Gemini API key
    pub async fn validate_api_key(&self) -> Result<bool, ProviderError> {
        let response = self
            .client
            .get(format!("{}/{}", GEMINI_API_BASE, self.flash_model))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(true)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 400 || status.as_u16() == 403 {
                return Err("Invalid Gemini API key".into());
            } else if status.as_u16() == 429 {
                return Err("Rate limited - too many requests".into());
            }

            Err(format!("Gemini API error ({}): {}", status, error_text).into())
        }
    }
}

#[async_trait]
impl AnalysisProvider for GeminiClient {
    async fn analyze(
        &self,
        texts: &[String],
        mode: ProviderMode,
    ) -> Result<Vec<RawAnalysisResult>, ProviderError> {
        let model = self.model_for(mode).to_string();
        logging::log_analysis(None, &format!(
            "Requesting {} analyses from {} ({} mode)", texts.len(), model, mode.as_str()
        ));

        let response = self
            .generate_json(&model, &analysis_system_prompt(mode), analysis_user_prompt(texts)?, 0.2, None)
            .await?;

        let parsed: Vec<RawAnalysisResult> = serde_json::from_str(strip_code_fences(&response))?;
        Ok(parsed)
    }
}

#[async_trait]
impl ToneProvider for GeminiClient {
    async fn improve(&self, text: &str) -> Result<ToneSuggestion, ProviderError> {
        let user_prompt = format!("ORIGINAL TEXT:\n{}\n\nRewrite it constructively:", text);

        let response = self
            .generate_json(&self.flash_model, TONE_SYSTEM_PROMPT, user_prompt, 0.7, Some(1024))
            .await?;

        let suggestion: ToneSuggestion = serde_json::from_str(strip_code_fences(&response))?;
        Ok(suggestion)
    }
}

fn analysis_user_prompt(texts: &[String]) -> Result<String, ProviderError> {
    let batch = serde_json::to_string(texts)?;
    Ok(format!("TEXTS (JSON array):\n{}\n\nAnalyze each text:", batch))
}

fn analysis_system_prompt(mode: ProviderMode) -> String {
    let analyses_rule = match mode {
        ProviderMode::Compare => format!(
            "Give exactly TWO analyses per text from two independent perspectives: \
             the first labelled \"{}\" (a quick surface reading) and the second labelled \"{}\" \
             (a careful reading that weighs sarcasm, context and nuance).",
            STANDARD_LABEL, EXPERT_LABEL
        ),
        _ => format!(
            "Give exactly ONE analysis per text, labelled \"{}\".",
            mode.provider_labels()[0]
        ),
    };

    format!(
        r#"You are a sentiment analysis engine. For every input text, in the same order, judge its sentiment.

{}

RULES:
- sentiment is exactly one of "Positive", "Negative", "Neutral"
- confidence is a number between 0 and 1
- keywords holds exactly 3 short salient terms taken from the text
- explanation is one short sentence

Respond with ONLY a valid JSON array in this exact format:
[
  {{"text": "...", "analyses": [{{"provider": "...", "sentiment": "Positive", "confidence": 0.9, "keywords": ["...", "...", "..."], "explanation": "..."}}]}}
]"#,
        analyses_rule
    )
}

const TONE_SYSTEM_PROMPT: &str = r#"You are a communication coach. Rewrite negative text so it keeps its meaning but reads as constructive and professional.

Respond with ONLY valid JSON in this exact format:
{
  "improvedText": "...",
  "wordChanges": [{"original": "...", "suggested": "..."}],
  "reasoning": "Brief explanation of the changes"
}"#;
