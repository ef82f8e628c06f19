//! LLM provider implementations.

pub mod openai_compat;

use secrecy::SecretString;

use scriptorium_core::llm::box_provider::BoxLlmProvider;
use scriptorium_types::config::ProviderSettings;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::from_settings;

/// Build the shared provider from configuration.
///
/// `default_model` is only used for requests that leave `model` empty;
/// both flows set it per request.
pub fn build_provider(
    settings: &ProviderSettings,
    api_key: SecretString,
    default_model: &str,
) -> BoxLlmProvider {
    let config = from_settings(settings, api_key, default_model);
    tracing::info!(
        provider = %config.provider_name,
        base_url = %config.base_url,
        "LLM provider configured"
    );
    BoxLlmProvider::new(OpenAiCompatibleProvider::new(config))
}
