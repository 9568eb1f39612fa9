//! Validator backed by an OpenAI-compatible chat-completions API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ModelVerdict};
use crate::config::ValidatorConfig;
use crate::error::ValidatorError;
use crate::verdict::{ReportInput, ReportValidator, Verdict, DEFAULT_REASON, DEFAULT_SEVERITY};

const SYSTEM_PROMPT: &str =
    "You are an expert environmental incident validator. Respond only with valid JSON.";

/// Validator that asks a language model to judge each report.
pub struct LlmValidator {
    client: Client,
    config: ValidatorConfig,
}

impl LlmValidator {
    /// Create a validator with the given configuration.
    pub fn new(config: ValidatorConfig) -> Result<Self, ValidatorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ValidatorError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_some() {
            info!("LlmValidator initialized with model: {}", config.model);
        } else {
            warn!("No validator API key configured; reports will need manual review");
        }

        Ok(Self { client, config })
    }

    /// Create a validator from environment variables.
    ///
    /// See [`ValidatorConfig::from_env`].
    pub fn from_env() -> Result<Self, ValidatorError> {
        Self::new(ValidatorConfig::from_env())
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a report, surfacing failures instead of falling back.
    pub async fn try_validate(&self, input: &ReportInput) -> Result<Verdict, ValidatorError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ValidatorError::Configuration("OPENAI_API_KEY not set".to_string()))?;

        let url = format!("{}/v1/chat/completions", self.config.api_url.trim_end_matches('/'));

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(input)),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Validating report '{}' ({})", input.title, input.incident_type);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ValidatorError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&error_text)
                .map(|api_error| api_error.error.message)
                .unwrap_or(error_text);

            return Err(ValidatorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ValidatorError::Network(format!("Failed to read response: {}", e)))?;

        let completion: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| ValidatorError::Parse(format!("unexpected response shape: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ValidatorError::Parse("response has no message content".to_string()))?;

        debug!("Model verdict: {}", content);

        parse_verdict(&content)
    }
}

#[async_trait]
impl ReportValidator for LlmValidator {
    async fn validate(&self, input: &ReportInput) -> Verdict {
        match self.try_validate(input).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("Report validation fell back to manual review: {}", e);
                Verdict::fallback(e.fallback_reason())
            }
        }
    }

    fn name(&self) -> &str {
        "LlmValidator"
    }
}

/// Build the user prompt for a report.
pub(crate) fn build_prompt(input: &ReportInput) -> String {
    format!(
        r#"You are an environmental expert tasked with validating reports about mangrove ecosystems and environmental incidents.

Analyze the following report and determine:
1. Is this a legitimate environmental report? (not spam, joke, or unrelated content)
2. Does it relate to mangrove ecosystems or environmental conservation?
3. Is the description coherent and plausible?
4. What is the severity level of this incident?

Consider these factors:
- Relevance to environmental/conservation topics
- Plausibility of the described incident
- Quality and coherence of the description
- Whether it appears to be spam or nonsensical content
- Impact level and urgency of the environmental threat

For severity, use these levels:
- "Low": Minor incidents with minimal immediate impact
- "Medium": Moderate incidents requiring attention but not urgent
- "High": Serious incidents with significant environmental impact
- "Critical": Urgent threats requiring immediate action

Report Details:
- Title: {}
- Description: {}
- Incident Type: {}
- Location: {}

Respond with a JSON object containing:
- "isValid": boolean (true if legitimate, false if not)
- "severity": string (one of: "Low", "Medium", "High", "Critical")
- "reason": string (brief explanation of your decision)"#,
        input.title, input.description, input.incident_type, input.location
    )
}

/// Parse model output into a verdict, tolerating a markdown code fence.
pub(crate) fn parse_verdict(content: &str) -> Result<Verdict, ValidatorError> {
    let json = strip_code_fence(content);

    let parsed: ModelVerdict =
        serde_json::from_str(json).map_err(|e| ValidatorError::Parse(e.to_string()))?;

    let severity = parsed
        .severity
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SEVERITY.to_string());

    let reason = parsed
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_REASON.to_string());

    Ok(Verdict {
        is_valid: parsed.is_valid,
        severity: Some(severity),
        reason,
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}
