//! Category classification through an LLM provider.
//!
//! The [`ClassifierService`] sends a rendered thread transcript to the
//! configured provider and validates the answer against the configured
//! label names. A bad answer or a transport failure gets one retry with
//! the same request; a second failure falls back to the informational
//! category rather than failing the thread.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Category, CategoryLabels, ConfidenceSource};
use crate::providers::ai::{CompletionRequest, LlmProvider, LlmResult, Message};

use super::prompt::classification_system_prompt;

/// Token budget for the model's answer. Label names are short.
const ANSWER_MAX_TOKENS: usize = 16;

/// Result of validating one model answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCategory {
    /// The answer named one of the five requestable categories.
    Valid(Category),
    /// The answer did not match any requestable category name.
    Malformed(String),
}

/// Validates a raw model answer against the configured label names.
///
/// The token is trimmed and matched case-insensitively. The aged label
/// name is rejected even though it maps to a category; the model is never
/// offered it.
pub fn parse_category_token(raw: &str, labels: &CategoryLabels) -> ParsedCategory {
    match labels.category_for(raw.trim()) {
        Some(category) if Category::AI_CHOICES.contains(&category) => {
            ParsedCategory::Valid(category)
        }
        _ => ParsedCategory::Malformed(raw.to_string()),
    }
}

/// Where a classification attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    FirstAttempt,
    Retry,
    FallbackApplied,
}

/// Why a single attempt produced no category.
#[derive(Debug, Error)]
enum AttemptFailure {
    #[error("unrecognized label {0:?}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(#[from] crate::providers::ai::LlmError),
}

/// Service that classifies transcripts into categories.
pub struct ClassifierService {
    llm: Arc<dyn LlmProvider>,
    labels: CategoryLabels,
    system_prompt: String,
}

impl ClassifierService {
    /// Creates a classifier for the given provider and label names.
    ///
    /// The system prompt is rendered once here and reused unchanged for
    /// every request, including retries.
    pub fn new(llm: Arc<dyn LlmProvider>, labels: CategoryLabels) -> Self {
        let system_prompt = classification_system_prompt(&labels);
        Self {
            llm,
            labels,
            system_prompt,
        }
    }

    /// Classifies a transcript, never failing the caller.
    ///
    /// One bad attempt is retried with the identical request. Two bad
    /// attempts fall back to ([`Category::Informational`],
    /// [`ConfidenceSource::FallbackDefault`]), logged rather than raised.
    pub async fn classify(&self, transcript: &str) -> (Category, ConfidenceSource) {
        let request = self.build_request(transcript);

        let mut state = Attempt::FirstAttempt;
        loop {
            if state == Attempt::FallbackApplied {
                return (Category::Informational, ConfidenceSource::FallbackDefault);
            }

            match self.attempt(&request).await {
                Ok(category) => return (category, ConfidenceSource::AiJudgment),
                Err(failure) if state == Attempt::FirstAttempt => {
                    debug!(provider = self.llm.name(), %failure, "classification attempt failed, retrying");
                    state = Attempt::Retry;
                }
                Err(failure) => {
                    warn!(
                        provider = self.llm.name(),
                        %failure,
                        fallback = self.labels.name_for(Category::Informational),
                        "classification failed twice, applying fallback"
                    );
                    state = Attempt::FallbackApplied;
                }
            }
        }
    }

    /// Sends a minimal completion to confirm the provider answers at all.
    pub async fn probe(&self) -> LlmResult<()> {
        let request = CompletionRequest::new(vec![Message::user("ping")]).with_max_tokens(1);
        self.llm.complete(&request).await.map(|_| ())
    }

    fn build_request(&self, transcript: &str) -> CompletionRequest {
        CompletionRequest::new(vec![Message::user(transcript)])
            .with_system_prompt(self.system_prompt.clone())
            .with_temperature(0.0)
            .with_max_tokens(ANSWER_MAX_TOKENS)
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<Category, AttemptFailure> {
        let response = self.llm.complete(request).await?;
        match parse_category_token(&response.text, &self.labels) {
            ParsedCategory::Valid(category) => Ok(category),
            ParsedCategory::Malformed(raw) => Err(AttemptFailure::Malformed(raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::providers::ai::{CompletionResponse, FinishReason, LlmError, TokenUsage};

    struct ScriptedLlm {
        answers: Mutex<VecDeque<LlmResult<CompletionResponse>>>,
        calls: AtomicUsize,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedLlm {
        fn new(answers: Vec<LlmResult<CompletionResponse>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "test-model"
        }

        async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::Unavailable("script exhausted".to_string())))
        }
    }

    fn answer(text: &str) -> LlmResult<CompletionResponse> {
        Ok(CompletionResponse {
            text: text.to_string(),
            tokens_used: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
        })
    }

    fn classifier(answers: Vec<LlmResult<CompletionResponse>>) -> (ClassifierService, Arc<ScriptedLlm>) {
        let llm = Arc::new(ScriptedLlm::new(answers));
        let service = ClassifierService::new(llm.clone(), CategoryLabels::default());
        (service, llm)
    }

    #[test]
    fn parses_exact_label_names() {
        let labels = CategoryLabels::default();
        assert_eq!(
            parse_category_token("To Do", &labels),
            ParsedCategory::Valid(Category::ActionNeeded)
        );
        assert_eq!(
            parse_category_token("Done", &labels),
            ParsedCategory::Valid(Category::Completed)
        );
    }

    #[test]
    fn parsing_trims_and_ignores_case() {
        let labels = CategoryLabels::default();
        assert_eq!(
            parse_category_token("  awaiting reply \n", &labels),
            ParsedCategory::Valid(Category::AwaitingReply)
        );
    }

    #[test]
    fn unknown_tokens_are_malformed() {
        let labels = CategoryLabels::default();
        assert_eq!(
            parse_category_token("Classification: To Do", &labels),
            ParsedCategory::Malformed("Classification: To Do".to_string())
        );
    }

    #[test]
    fn aged_label_name_is_rejected() {
        let labels = CategoryLabels::default();
        assert!(matches!(
            parse_category_token("History", &labels),
            ParsedCategory::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn valid_answer_returns_on_first_attempt() {
        let (service, llm) = classifier(vec![answer("FYI")]);

        let (category, source) = service.classify("a transcript").await;
        assert_eq!(category, Category::Informational);
        assert_eq!(source, ConfidenceSource::AiJudgment);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_answer_is_retried_once() {
        let (service, llm) = classifier(vec![answer("I think this is To Do"), answer("To Do")]);

        let (category, source) = service.classify("a transcript").await;
        assert_eq!(category, Category::ActionNeeded);
        assert_eq!(source, ConfidenceSource::AiJudgment);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn two_malformed_answers_fall_back() {
        let (service, llm) = classifier(vec![answer("no idea"), answer("still no idea")]);

        let (category, source) = service.classify("a transcript").await;
        assert_eq!(category, Category::Informational);
        assert_eq!(source, ConfidenceSource::FallbackDefault);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn transport_error_is_retried_once() {
        let (service, llm) = classifier(vec![
            Err(LlmError::Unavailable("connection refused".to_string())),
            answer("SPAM"),
        ]);

        let (category, source) = service.classify("a transcript").await;
        assert_eq!(category, Category::LowValue);
        assert_eq!(source, ConfidenceSource::AiJudgment);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn retry_reuses_the_identical_request() {
        let (service, llm) = classifier(vec![answer("garbage"), answer("Done")]);

        service.classify("the transcript").await;

        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].system_prompt, requests[1].system_prompt);
        assert_eq!(requests[0].messages[0].content, requests[1].messages[0].content);
        assert_eq!(requests[0].temperature, requests[1].temperature);
    }

    #[tokio::test]
    async fn aged_answer_never_validates() {
        let (service, llm) = classifier(vec![answer("History"), answer("History")]);

        let (category, source) = service.classify("a transcript").await;
        assert_eq!(category, Category::Informational);
        assert_eq!(source, ConfidenceSource::FallbackDefault);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn probe_surfaces_provider_failure() {
        let (service, _llm) = classifier(vec![Err(LlmError::AuthenticationError(
            "bad key".to_string(),
        ))]);

        assert!(service.probe().await.is_err());
    }

    #[tokio::test]
    async fn probe_succeeds_when_provider_answers() {
        let (service, llm) = classifier(vec![answer("pong")]);

        assert!(service.probe().await.is_ok());
        assert_eq!(llm.calls(), 1);
    }
}
