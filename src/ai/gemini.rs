//! Google Gemini client for expression analysis and word problems.

use super::{AiAnalysis, AiConfig, AiError, AiResult, AnalysisService};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: AiConfig,
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

/// Schema every answer must follow; the model returns it as JSON text.
fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "explanation": {
                "type": "STRING",
                "description": "A plain text explanation of the expression."
            },
            "steps": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Step-by-step simplification or evaluation."
            },
            "suggestedFormulas": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Related scientific or mathematical formulas."
            }
        },
        "required": ["explanation", "steps", "suggestedFormulas"]
    })
}

impl GeminiClient {
    pub fn new(config: AiConfig) -> AiResult<Self> {
        if config.api_key.is_empty() {
            return Err(AiError::Authentication);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn expression_prompt(expression: &str) -> String {
        format!(
            "Analyze this mathematical expression and provide a scientific breakdown: {}",
            expression
        )
    }

    fn word_problem_prompt(problem: &str) -> String {
        format!(
            "Solve this scientific/math word problem with detailed steps: {}",
            problem
        )
    }

    fn build_request(prompt: String) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: analysis_schema(),
            },
        }
    }

    async fn send_request(&self, prompt: String) -> AiResult<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.config.model, self.config.api_key
        );
        debug!(
            "Sending request to Gemini API: {}",
            url.replace(&self.config.api_key, "***")
        );

        let response = self
            .client
            .post(&url)
            .json(&Self::build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Gemini API response status: {}", status);

        if !status.is_success() {
            error!("Gemini API error: {} - {}", status, body);
            return Err(AiError::Api(format!("HTTP {}: {}", status, body)));
        }

        extract_text(&body)
    }
}

/// Pulls the first candidate's text out of a `generateContent` response body.
fn extract_text(body: &str) -> AiResult<String> {
    let response: GeminiResponse = serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse Gemini response: {}", e);
        AiError::Json(e)
    })?;

    if let Some(usage) = &response.usage_metadata {
        info!(
            "Gemini API usage - Prompt: {:?} tokens, Response: {:?} tokens",
            usage.prompt_token_count, usage.candidates_token_count
        );
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AiError::InvalidResponse("No candidates in response".to_string()))?;

    candidate
        .content
        .parts
        .into_iter()
        .next()
        .map(|part| part.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AiError::InvalidResponse("No text in candidate".to_string()))
}

/// Parses the model's JSON answer, tolerating a surrounding markdown fence.
fn parse_analysis(raw: &str) -> AiResult<AiAnalysis> {
    let trimmed = raw.trim();
    let cleaned = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed)
        .trim();

    let analysis: AiAnalysis = serde_json::from_str(cleaned)?;
    if analysis.explanation.is_empty() && analysis.steps.is_empty() {
        return Err(AiError::InvalidResponse("Empty analysis".to_string()));
    }
    Ok(analysis)
}

#[async_trait::async_trait]
impl AnalysisService for GeminiClient {
    async fn analyze_expression(&self, expression: &str) -> AiResult<AiAnalysis> {
        info!("Analyzing expression {:?}", expression);
        let raw = self.send_request(Self::expression_prompt(expression)).await?;
        parse_analysis(&raw)
    }

    async fn solve_word_problem(&self, problem: &str) -> AiResult<AiAnalysis> {
        info!("Solving word problem ({} chars)", problem.len());
        let raw = self.send_request(Self::word_problem_prompt(problem)).await?;
        parse_analysis(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> AiConfig {
        AiConfig {
            api_key: "test-key".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_seconds: 30,
        }
    }

    #[test]
    fn test_gemini_client_creation() {
        assert!(GeminiClient::new(create_test_config()).is_ok());
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let mut config = create_test_config();
        config.api_key.clear();
        assert!(matches!(GeminiClient::new(config), Err(AiError::Authentication)));
    }

    #[test]
    fn test_request_carries_schema() {
        let request = GeminiClient::build_request(GeminiClient::expression_prompt("2+2"));
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"][2],
            "suggestedFormulas"
        );
        assert!(body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .ends_with("2+2"));
    }

    #[test]
    fn test_extract_text() {
        let body = r#"{
            "candidates": [{"content": {"parts": [{"text": "{\"explanation\":\"x\"}"}]}}],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 5}
        }"#;
        assert_eq!(extract_text(body).unwrap(), r#"{"explanation":"x"}"#);
    }

    #[test]
    fn test_extract_text_without_candidates() {
        assert!(matches!(
            extract_text(r#"{"candidates": []}"#),
            Err(AiError::InvalidResponse(_))
        ));
        assert!(matches!(extract_text("not json"), Err(AiError::Json(_))));
    }

    #[test]
    fn test_parse_analysis_with_fence() {
        let raw = "```json\n{\"explanation\":\"sum\",\"steps\":[\"2+2=4\"],\"suggestedFormulas\":[]}\n```";
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.explanation, "sum");
        assert_eq!(analysis.steps, vec!["2+2=4"]);
    }

    #[test]
    fn test_parse_analysis_rejects_empty() {
        assert!(parse_analysis(r#"{"explanation":""}"#).is_err());
        assert!(parse_analysis("plain words").is_err());
    }
}
