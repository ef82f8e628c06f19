//! Configuration types and defaults for OpenAI-compatible providers.
//!
//! Groq is the default backend. Any other endpoint that speaks the OpenAI
//! chat completions protocol can be selected through `[provider]` in the
//! config file.

use secrecy::SecretString;

use scriptorium_types::config::ProviderSettings;
use scriptorium_types::llm::ProviderCapabilities;

/// Base URL of Groq's OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "groq").
    pub provider_name: String,
    /// Base URL for the API.
    pub base_url: String,
    /// API key for authentication.
    pub api_key: SecretString,
    /// Model used when a request does not name one.
    pub model: String,
    /// What this provider supports.
    pub capabilities: ProviderCapabilities,
}

/// Groq default configuration.
///
/// Capabilities: JSON-schema structured output; 32K context, 8K output.
pub fn groq_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "groq".into(),
        base_url: GROQ_BASE_URL.into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            structured_output: true,
            max_context_tokens: 32_768,
            max_output_tokens: 8_192,
        },
    }
}

/// Configuration for the endpoint named in `[provider]`.
///
/// Starts from the Groq defaults and overrides the name and base URL.
pub fn from_settings(
    settings: &ProviderSettings,
    api_key: SecretString,
    model: &str,
) -> OpenAiCompatConfig {
    let mut config = groq_defaults(api_key, model);
    config.provider_name = settings.name.clone();
    config.base_url = settings.base_url.trim_end_matches('/').to_string();
    config
}
