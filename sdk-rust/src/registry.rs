use crate::{
    anthropic::{self, AnthropicModel, AnthropicModelOptions},
    google::{self, GoogleModel, GoogleModelOptions},
    openai::{self, OpenAIChatModel, OpenAIChatModelOptions},
    LanguageModel,
};
use reqwest::Client;
use std::{env, fmt, sync::Arc};

/// The provider families the assistant can talk to, in selection priority
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAI,
    Google,
    Anthropic,
}

impl ProviderKind {
    pub const PRIORITY: [Self; 3] = [Self::OpenAI, Self::Google, Self::Anthropic];

    /// Name reported by the [`LanguageModel`] built for this provider.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Google => "google",
            Self::Anthropic => "anthropic",
        }
    }

    #[must_use]
    pub fn default_model_id(self) -> &'static str {
        match self {
            Self::OpenAI => openai::DEFAULT_MODEL,
            Self::Google => google::DEFAULT_MODEL,
            Self::Anthropic => anthropic::DEFAULT_MODEL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything needed to talk to one provider. Endpoint and model fall back
/// to the provider defaults when unset.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub endpoint: Option<String>,
    pub model_id: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model_id", &self.model_id)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            endpoint: None,
            model_id: None,
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    #[must_use]
    pub fn model_id(&self) -> &str {
        self.model_id
            .as_deref()
            .unwrap_or_else(|| self.kind.default_model_id())
    }
}

/// API keys the host application may or may not have. At most one provider
/// is ever selected from them.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    /// Model override applied to whichever provider is selected.
    pub model_id: Option<String>,
    /// Endpoint override applied to whichever provider is selected.
    pub endpoint: Option<String>,
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("ProviderCredentials")
            .field("openai_api_key", &present(&self.openai_api_key))
            .field("gemini_api_key", &present(&self.gemini_api_key))
            .field("anthropic_api_key", &present(&self.anthropic_api_key))
            .field("model_id", &self.model_id)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ProviderCredentials {
    /// Read credentials from the process environment:
    ///
    /// - `OPENAI_API_KEY`
    /// - `GEMINI_API_KEY`, or `GOOGLE_API_KEY` when the former is unset
    /// - `ANTHROPIC_API_KEY`
    /// - `AUTOFLEET_LLM_MODEL` and `AUTOFLEET_LLM_ENDPOINT` overrides
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| non_blank(lookup(name));
        Self {
            openai_api_key: read("OPENAI_API_KEY"),
            gemini_api_key: read("GEMINI_API_KEY").or_else(|| read("GOOGLE_API_KEY")),
            anthropic_api_key: read("ANTHROPIC_API_KEY"),
            model_id: read("AUTOFLEET_LLM_MODEL"),
            endpoint: read("AUTOFLEET_LLM_ENDPOINT"),
        }
    }

    fn api_key(&self, kind: ProviderKind) -> Option<&str> {
        let key = match kind {
            ProviderKind::OpenAI => &self.openai_api_key,
            ProviderKind::Google => &self.gemini_api_key,
            ProviderKind::Anthropic => &self.anthropic_api_key,
        };
        key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }

    /// Pick the first provider with a usable key, in
    /// [`ProviderKind::PRIORITY`] order.
    #[must_use]
    pub fn select(&self) -> Option<ProviderConfig> {
        let kind = ProviderKind::PRIORITY
            .into_iter()
            .find(|kind| self.api_key(*kind).is_some())?;
        let api_key = self.api_key(kind)?;

        Some(ProviderConfig {
            kind,
            api_key: api_key.to_string(),
            endpoint: non_blank(self.endpoint.clone()),
            model_id: non_blank(self.model_id.clone()),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Build the [`LanguageModel`] for a provider configuration. A shared
/// `client` lets the host reuse its connection pool and timeouts.
#[must_use]
pub fn create_language_model(
    config: ProviderConfig,
    client: Option<Client>,
) -> Arc<dyn LanguageModel> {
    let model_id = config.model_id().to_string();
    let ProviderConfig {
        kind,
        api_key,
        endpoint,
        ..
    } = config;

    match kind {
        ProviderKind::OpenAI => Arc::new(OpenAIChatModel::new(
            model_id,
            OpenAIChatModelOptions {
                endpoint,
                api_key,
                headers: None,
                client,
            },
        )),
        ProviderKind::Google => Arc::new(GoogleModel::new(
            model_id,
            GoogleModelOptions {
                api_key,
                endpoint,
                headers: None,
                client,
            },
        )),
        ProviderKind::Anthropic => Arc::new(AnthropicModel::new(
            model_id,
            AnthropicModelOptions {
                endpoint,
                api_key,
                api_version: None,
                headers: None,
                client,
            },
        )),
    }
}
