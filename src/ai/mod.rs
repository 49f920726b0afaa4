//! Natural-language analysis of expressions and word problems.
//!
//! The calculator never waits on this module: front ends run requests in the
//! background and show a fixed offline message on any failure.

pub mod gemini;

use crate::sampler::PlotPoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gemini::GeminiClient;

pub const ANALYSIS_OFFLINE: &str = "Analysis offline. Quantum sync failed.";
pub const SOLVER_OFFLINE: &str = "Problem solver offline.";

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("No API key configured")]
    Authentication,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No analysis service available")]
    Offline,
}

pub type AiResult<T> = Result<T, AiError>;

/// Structured explanation returned for either kind of request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub explanation: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub suggested_formulas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_data: Option<Vec<PlotPoint>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Expression,
    WordProblem,
}

impl AnalysisKind {
    pub fn offline_message(self) -> &'static str {
        match self {
            AnalysisKind::Expression => ANALYSIS_OFFLINE,
            AnalysisKind::WordProblem => SOLVER_OFFLINE,
        }
    }
}

#[async_trait::async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze_expression(&self, expression: &str) -> AiResult<AiAnalysis>;

    async fn solve_word_problem(&self, problem: &str) -> AiResult<AiAnalysis>;

    async fn request(&self, kind: AnalysisKind, text: &str) -> AiResult<AiAnalysis> {
        match kind {
            AnalysisKind::Expression => self.analyze_expression(text).await,
            AnalysisKind::WordProblem => self.solve_word_problem(text).await,
        }
    }
}

/// Stand-in used when no API key is configured.
pub struct OfflineService;

#[async_trait::async_trait]
impl AnalysisService for OfflineService {
    async fn analyze_expression(&self, _expression: &str) -> AiResult<AiAnalysis> {
        Err(AiError::Offline)
    }

    async fn solve_word_problem(&self, _problem: &str) -> AiResult<AiAnalysis> {
        Err(AiError::Offline)
    }
}

/// Picks the Gemini client when it can be built, the offline stand-in otherwise.
pub fn service_from_config(config: &AiConfig) -> Box<dyn AnalysisService> {
    match GeminiClient::new(config.clone()) {
        Ok(client) => Box::new(client),
        Err(e) => {
            tracing::warn!("AI analysis disabled: {}", e);
            Box::new(OfflineService)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedService;

    #[async_trait::async_trait]
    impl AnalysisService for CannedService {
        async fn analyze_expression(&self, expression: &str) -> AiResult<AiAnalysis> {
            Ok(AiAnalysis {
                explanation: format!("about {}", expression),
                steps: vec!["one".to_string()],
                suggested_formulas: vec![],
                plot_data: None,
            })
        }

        async fn solve_word_problem(&self, _problem: &str) -> AiResult<AiAnalysis> {
            Err(AiError::Api("quota".to_string()))
        }
    }

    #[tokio::test]
    async fn request_dispatches_by_kind() {
        let service = CannedService;
        let analysis = service.request(AnalysisKind::Expression, "2+2").await.unwrap();
        assert_eq!(analysis.explanation, "about 2+2");
        assert!(service.request(AnalysisKind::WordProblem, "trains").await.is_err());
    }

    #[tokio::test]
    async fn offline_service_always_fails() {
        let service = OfflineService;
        assert!(matches!(
            service.analyze_expression("1").await,
            Err(AiError::Offline)
        ));
        assert!(matches!(
            service.solve_word_problem("1").await,
            Err(AiError::Offline)
        ));
    }

    #[tokio::test]
    async fn missing_key_selects_offline_service() {
        let config = AiConfig {
            api_key: String::new(),
            model: "m".to_string(),
            timeout_seconds: 1,
        };
        assert!(matches!(
            GeminiClient::new(config.clone()),
            Err(AiError::Authentication)
        ));

        let service = service_from_config(&config);
        assert!(matches!(
            service.analyze_expression("2+2").await,
            Err(AiError::Offline)
        ));
        assert!(matches!(
            service.request(AnalysisKind::WordProblem, "trains").await,
            Err(AiError::Offline)
        ));
    }

    #[test]
    fn offline_messages_per_kind() {
        assert_eq!(AnalysisKind::Expression.offline_message(), ANALYSIS_OFFLINE);
        assert_eq!(AnalysisKind::WordProblem.offline_message(), SOLVER_OFFLINE);
    }

    #[test]
    fn analysis_uses_camel_case_fields() {
        let analysis: AiAnalysis = serde_json::from_str(
            r#"{"explanation":"e","steps":["a","b"],"suggestedFormulas":["E=mc^2"]}"#,
        )
        .unwrap();
        assert_eq!(analysis.steps, vec!["a", "b"]);
        assert_eq!(analysis.suggested_formulas, vec!["E=mc^2"]);
        assert!(analysis.plot_data.is_none());
    }
}
