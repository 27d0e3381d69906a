//! Completion gateway: the only path to the external LLM endpoint.
//!
//! The client is built at most once, on first use, from the credential and
//! model override found in the environment at that moment. If no credential
//! is present the gateway stays in no-credential mode for the life of the
//! process. Every call yields text; upstream problems become one of three
//! fallback messages.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client as OpenAIClient,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;

/// System instruction sent with every completion.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert AI ethicist with deep knowledge of moral \
philosophy, AI governance, and responsible technology. Give balanced, practical, and specific \
analysis. Follow the requested section structure exactly and answer in Markdown.";

/// One prompt ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Short human label naming what is being analyzed. Appears in fallback text.
    pub subject: String,
    pub prompt: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Generated,
    NoCredential,
    UpstreamFailure,
    EmptyResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub outcome: CompletionOutcome,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    OpenAi(#[from] OpenAIError),

    #[error("{0}")]
    Other(String),
}

/// A chat-completion endpoint.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    /// Returns the first choice's text, or an empty string if there was none.
    async fn complete(&self, system: &str, prompt: &str, temperature: f32) -> Result<String, BackendError>;
}

/// OpenAI-compatible chat completions via async-openai.
pub struct OpenAiBackend {
    client: OpenAIClient<OpenAIConfig>,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, base_url: Option<&str>, model: impl Into<String>) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = base_url {
            config = config.with_api_base(base_url);
        }

        // Single attempt per call, including on 429 and 5xx.
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Self {
            client: OpenAIClient::with_config(config).with_backoff(no_retry),
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, prompt: &str, temperature: f32) -> Result<String, BackendError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(temperature)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

/// Where the API key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read this environment variable on first use.
    Env(String),
    /// Use this value as-is; `None` means no credential.
    Fixed(Option<String>),
}

impl CredentialSource {
    fn resolve(&self) -> Option<String> {
        let value = match self {
            CredentialSource::Env(var) => std::env::var(var).ok(),
            CredentialSource::Fixed(value) => value.clone(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn describe(&self) -> &str {
        match self {
            CredentialSource::Env(var) => var,
            CredentialSource::Fixed(_) => "an API key",
        }
    }
}

/// Everything the gateway needs to build its client.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySettings {
    pub credential: CredentialSource,
    /// Env var that overrides `model` when set.
    pub model_env: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
}

impl GatewaySettings {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            credential: CredentialSource::Env(config.api_key_env.clone()),
            model_env: Some(config.model_env.clone()),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        }
    }

    fn resolve_model(&self) -> String {
        self.model_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.model.clone())
    }
}

pub struct CompletionGateway {
    settings: GatewaySettings,
    backend: OnceLock<Option<Arc<dyn CompletionBackend>>>,
}

impl CompletionGateway {
    pub fn new(settings: GatewaySettings) -> Self {
        Self {
            settings,
            backend: OnceLock::new(),
        }
    }

    /// A gateway that uses `backend` and never touches the environment.
    pub fn with_backend(settings: GatewaySettings, backend: Arc<dyn CompletionBackend>) -> Self {
        let gateway = Self::new(settings);
        let _ = gateway.backend.set(Some(backend));
        gateway
    }

    /// A gateway permanently in no-credential mode.
    pub fn offline(settings: GatewaySettings) -> Self {
        let gateway = Self::new(settings);
        let _ = gateway.backend.set(None);
        gateway
    }

    /// The shared client, building it on first call.
    pub fn client(&self) -> Option<Arc<dyn CompletionBackend>> {
        self.backend.get_or_init(|| self.connect()).clone()
    }

    fn connect(&self) -> Option<Arc<dyn CompletionBackend>> {
        let Some(api_key) = self.settings.credential.resolve() else {
            warn!(
                credential = %self.settings.credential.describe(),
                "no LLM credential configured, tools will return fallback text"
            );
            return None;
        };

        let model = self.settings.resolve_model();
        info!(model = %model, base_url = ?self.settings.base_url, "LLM client initialized");
        Some(Arc::new(OpenAiBackend::new(
            &api_key,
            self.settings.base_url.as_deref(),
            model,
        )))
    }

    /// Send one request. Never fails; see [`CompletionOutcome`].
    pub async fn complete(&self, request: &CompletionRequest) -> Completion {
        let Some(backend) = self.client() else {
            return Completion {
                text: format!(
                    "LLM analysis for {} is unavailable: no API key is configured. \
                     Set {} to enable AI-generated analysis.",
                    request.subject,
                    self.settings.credential.describe()
                ),
                outcome: CompletionOutcome::NoCredential,
            };
        };

        debug!(
            subject = %request.subject,
            model = %backend.model(),
            temperature = request.temperature,
            prompt_chars = request.prompt.len(),
            "requesting completion"
        );

        match backend
            .complete(SYSTEM_INSTRUCTION, &request.prompt, request.temperature)
            .await
        {
            Err(e) => {
                warn!(subject = %request.subject, error = %e, "completion request failed");
                Completion {
                    text: format!("LLM analysis for {} failed: {}", request.subject, e),
                    outcome: CompletionOutcome::UpstreamFailure,
                }
            }
            Ok(text) if text.trim().is_empty() => {
                warn!(subject = %request.subject, "completion returned no text");
                Completion {
                    text: format!(
                        "LLM analysis for {} returned an empty response. Please try again.",
                        request.subject
                    ),
                    outcome: CompletionOutcome::EmptyResult,
                }
            }
            Ok(text) => Completion {
                text: text.trim().to_string(),
                outcome: CompletionOutcome::Generated,
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records calls and answers with a canned result.
    pub(crate) struct StubBackend {
        pub calls: AtomicUsize,
        pub reply: Result<String, String>,
    }

    impl StubBackend {
        pub(crate) fn answering(text: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Ok(text.to_string()),
            })
        }

        pub(crate) fn failing(error: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Err(error.to_string()),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionBackend for StubBackend {
        fn model(&self) -> &str {
            "stub"
        }

        async fn complete(&self, _system: &str, _prompt: &str, _temperature: f32) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(BackendError::Other)
        }
    }

    pub(crate) fn settings() -> GatewaySettings {
        GatewaySettings {
            credential: CredentialSource::Fixed(None),
            model_env: None,
            model: "gpt-4o-mini".to_string(),
            base_url: None,
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            subject: "Bias assessment of: loan data".to_string(),
            prompt: "analyze".to_string(),
            temperature: 0.3,
        }
    }

    #[tokio::test]
    async fn missing_credential_falls_back_with_subject() {
        let gateway = CompletionGateway::new(settings());
        let completion = gateway.complete(&request()).await;

        assert_eq!(completion.outcome, CompletionOutcome::NoCredential);
        assert!(completion.text.contains("Bias assessment of: loan data"));
        assert!(completion.text.contains("no API key"));
    }

    #[tokio::test]
    async fn unset_env_credential_means_offline() {
        let gateway = CompletionGateway::new(GatewaySettings {
            credential: CredentialSource::Env("ETHICIST_TEST_KEY_THAT_IS_NEVER_SET".into()),
            ..settings()
        });

        let completion = gateway.complete(&request()).await;
        assert_eq!(completion.outcome, CompletionOutcome::NoCredential);
        assert!(completion.text.contains("ETHICIST_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn blank_credential_counts_as_absent() {
        assert_eq!(CredentialSource::Fixed(Some("  ".into())).resolve(), None);
    }

    #[tokio::test]
    async fn upstream_error_is_reported_in_text() {
        let gateway = CompletionGateway::with_backend(settings(), StubBackend::failing("connection refused"));
        let completion = gateway.complete(&request()).await;

        assert_eq!(completion.outcome, CompletionOutcome::UpstreamFailure);
        assert!(completion.text.contains("loan data"));
        assert!(completion.text.contains("connection refused"));
    }

    #[tokio::test]
    async fn whitespace_reply_is_empty_result() {
        let gateway = CompletionGateway::with_backend(settings(), StubBackend::answering(" \n\t "));
        let completion = gateway.complete(&request()).await;

        assert_eq!(completion.outcome, CompletionOutcome::EmptyResult);
        assert!(completion.text.contains("loan data"));
    }

    #[tokio::test]
    async fn generated_text_is_trimmed() {
        let backend = StubBackend::answering("\n## Bias Risk Summary\nLow.\n");
        let gateway = CompletionGateway::with_backend(settings(), backend.clone());
        let completion = gateway.complete(&request()).await;

        assert_eq!(completion.outcome, CompletionOutcome::Generated);
        assert_eq!(completion.text, "## Bias Risk Summary\nLow.");
        assert_eq!(backend.call_count(), 1);
    }

    #[test]
    fn racing_first_use_builds_one_client() {
        let gateway = Arc::new(CompletionGateway::new(GatewaySettings {
            credential: CredentialSource::Fixed(Some("sk-test".into())),
            ..settings()
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gateway = Arc::clone(&gateway);
                std::thread::spawn(move || gateway.client())
            })
            .collect();

        let clients: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        assert!(clients.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn model_override_falls_back_to_configured_model() {
        let settings = GatewaySettings {
            model_env: Some("ETHICIST_TEST_MODEL_THAT_IS_NEVER_SET".into()),
            ..settings()
        };
        assert_eq!(settings.resolve_model(), "gpt-4o-mini");
    }
}
