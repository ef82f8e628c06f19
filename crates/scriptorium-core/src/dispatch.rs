//! Prompt dispatcher: the single call-out point to the remote model.
//!
//! Every generation step merges a fixed instruction with user text and
//! forwards it through [`PromptDispatcher`]. Sampling temperature is pinned
//! to zero. There is no retry, caching, or rate limiting; provider failures
//! propagate as [`LlmError`].

use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use scriptorium_types::llm::{
    CompletionRequest, LlmError, Message, OutputConfig, OutputFormat, OutputJsonSchema,
    add_additional_properties_false,
};

use crate::llm::box_provider::BoxLlmProvider;

/// Returned in place of model output when the provider sends no content.
pub const FALLBACK_RESPONSE: &str = "Error generating response.";

/// Sends prompts to one model on a shared provider.
#[derive(Clone)]
pub struct PromptDispatcher {
    provider: Arc<BoxLlmProvider>,
    model: String,
    max_tokens: u32,
}

impl PromptDispatcher {
    pub fn new(provider: Arc<BoxLlmProvider>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `template + "\n" + input` as a single user message.
    pub async fn generate(&self, template: &str, input: &str) -> Result<String, LlmError> {
        let prompt = format!("{template}\n{input}");
        self.send(None, vec![Message::user(prompt)], None).await
    }

    /// Send a system instruction followed by one human message.
    pub async fn generate_with_system(&self, system: &str, human: &str) -> Result<String, LlmError> {
        self.send(Some(system.to_string()), vec![Message::user(human)], None)
            .await
    }

    /// Send a system instruction followed by an explicit message list.
    pub async fn generate_conversation(
        &self,
        system: &str,
        messages: Vec<Message>,
    ) -> Result<String, LlmError> {
        self.send(Some(system.to_string()), messages, None).await
    }

    /// Request output constrained to `T`'s JSON schema and deserialize it.
    ///
    /// Output that does not parse as `T` is an error; it is not retried.
    /// Providers without structured output are refused before any call.
    pub async fn generate_structured<T>(&self, system: &str, human: &str) -> Result<T, LlmError>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let name = T::schema_name().to_string();
        if !self.provider.capabilities().structured_output {
            return Err(LlmError::InvalidRequest(format!(
                "provider {} does not support structured output for {name}",
                self.provider.name()
            )));
        }
        let output_config = structured_output_config::<T>(&name)?;
        let request = self.request(
            Some(system.to_string()),
            vec![Message::user(human)],
            Some(output_config),
        );

        let response = self.provider.complete(&request).await?;
        serde_json::from_str::<T>(response.content.trim()).map_err(|e| {
            LlmError::Deserialization(format!(
                "failed to parse {name}: {e}\nraw content: {}",
                response.content
            ))
        })
    }

    fn request(
        &self,
        system: Option<String>,
        messages: Vec<Message>,
        output_config: Option<OutputConfig>,
    ) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages,
            system,
            max_tokens: self.max_tokens,
            temperature: Some(0.0),
            output_config,
        }
    }

    #[tracing::instrument(name = "dispatch", skip_all, fields(model = %self.model, provider = %self.provider.name()))]
    async fn send(
        &self,
        system: Option<String>,
        messages: Vec<Message>,
        output_config: Option<OutputConfig>,
    ) -> Result<String, LlmError> {
        let request = self.request(system, messages, output_config);
        let response = self.provider.complete(&request).await?;
        tracing::debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            "completion received"
        );
        Ok(content_or_fallback(response.content))
    }
}

/// Replace empty or whitespace-only content with [`FALLBACK_RESPONSE`].
pub fn content_or_fallback(content: String) -> String {
    if content.trim().is_empty() {
        tracing::warn!("provider returned no content, using fallback text");
        FALLBACK_RESPONSE.to_string()
    } else {
        content
    }
}

fn structured_output_config<T: JsonSchema>(name: &str) -> Result<OutputConfig, LlmError> {
    let schema = schemars::schema_for!(T);
    let mut schema_value = serde_json::to_value(schema)
        .map_err(|e| LlmError::InvalidRequest(format!("schema serialization failed: {e}")))?;
    add_additional_properties_false(&mut schema_value);

    Ok(OutputConfig {
        format: OutputFormat {
            type_field: "json_schema".to_string(),
            json_schema: OutputJsonSchema {
                name: name.to_string(),
                schema: schema_value,
                strict: Some(true),
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use scriptorium_types::llm::MessageRole;
    use scriptorium_types::research::Perspectives;

    fn dispatcher(provider: ScriptedProvider) -> PromptDispatcher {
        PromptDispatcher::new(Arc::new(BoxLlmProvider::new(provider)), "test-model", 512)
    }

    #[tokio::test]
    async fn test_generate_concatenates_template_and_input() {
        let provider = ScriptedProvider::new(["an outline"]);
        let requests = provider.requests();
        let d = dispatcher(provider);

        let out = d.generate("Write an outline.", "Tidal energy").await.unwrap();
        assert_eq!(out, "an outline");

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].system.is_none());
        assert_eq!(sent[0].messages.len(), 1);
        assert_eq!(sent[0].messages[0].role, MessageRole::User);
        assert_eq!(sent[0].messages[0].content, "Write an outline.\nTidal energy");
        assert_eq!(sent[0].temperature, Some(0.0));
        assert_eq!(sent[0].model, "test-model");
        assert_eq!(sent[0].max_tokens, 512);
    }

    #[tokio::test]
    async fn test_empty_content_returns_fallback() {
        let d = dispatcher(ScriptedProvider::new([""]));
        let out = d.generate("T", "U").await.unwrap();
        assert_eq!(out, FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn test_whitespace_content_returns_fallback() {
        let d = dispatcher(ScriptedProvider::new(["  \n "]));
        let out = d.generate_with_system("S", "H").await.unwrap();
        assert_eq!(out, "Error generating response.");
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let d = dispatcher(ScriptedProvider::failing("boom"));
        let err = d.generate("T", "U").await.unwrap_err();
        assert!(matches!(err, LlmError::Provider { ref message } if message == "boom"));
    }

    #[tokio::test]
    async fn test_generate_with_system_sets_system_prompt() {
        let provider = ScriptedProvider::new(["ok"]);
        let requests = provider.requests();
        let d = dispatcher(provider);

        d.generate_with_system("You are terse.", "Why?").await.unwrap();
        let sent = requests.lock().unwrap();
        assert_eq!(sent[0].system.as_deref(), Some("You are terse."));
        assert_eq!(sent[0].messages[0].content, "Why?");
    }

    #[tokio::test]
    async fn test_generate_structured_parses_output() {
        let json = r#"{"analysts":[{"affiliation":"MIT","name":"Ada","role":"Economist","description":"Labor markets"}]}"#;
        let provider = ScriptedProvider::new([json]);
        let requests = provider.requests();
        let d = dispatcher(provider);

        let perspectives: Perspectives = d.generate_structured("sys", "go").await.unwrap();
        assert_eq!(perspectives.analysts.len(), 1);
        assert_eq!(perspectives.analysts[0].name, "Ada");

        let sent = requests.lock().unwrap();
        let config = sent[0].output_config.as_ref().unwrap();
        assert_eq!(config.format.type_field, "json_schema");
        assert_eq!(config.format.json_schema.name, "Perspectives");
        assert_eq!(config.format.json_schema.schema["additionalProperties"], false);
    }

    #[tokio::test]
    async fn test_generate_structured_rejects_malformed_output() {
        let d = dispatcher(ScriptedProvider::new([r#"{"analysts": "none"}"#]));
        let err = d.generate_structured::<Perspectives>("sys", "go").await.unwrap_err();
        assert!(matches!(err, LlmError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_generate_structured_requires_capability() {
        let provider = ScriptedProvider::new(["{}"]).without_structured_output();
        let requests = provider.requests();
        let d = dispatcher(provider);

        let err = d.generate_structured::<Perspectives>("sys", "go").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(ref m) if m.contains("Perspectives")));
        assert!(requests.lock().unwrap().is_empty());

        // Plain text generation is unaffected.
        assert_eq!(d.generate("T", "U").await.unwrap(), "{}");
    }
}
