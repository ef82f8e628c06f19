//! Configuration types for Scriptorium.
//!
//! `AppConfig` represents the top-level `config.toml`. Every section and
//! field has a default, so an empty file (or no file) is a valid config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::research::{MAX_ANALYSTS, MIN_ANALYSTS};

/// Top-level configuration.
///
/// Loaded from `--config` or `~/.scriptorium/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderSettings,
    pub essay: EssaySettings,
    pub research: ResearchSettings,
    pub server: ServerSettings,
    pub interaction_log: InteractionLogSettings,
    pub logging: LoggingSettings,
}

/// Remote chat-completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Human-readable provider name used in logs.
    pub name: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: "groq".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
        }
    }
}

/// Essay writer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EssaySettings {
    pub model: String,
    /// Default revise/critique rounds after the first critique.
    pub max_revisions: u32,
    /// Upper bound a request may ask for.
    pub revision_limit: u32,
    pub max_tokens: u32,
}

impl Default for EssaySettings {
    fn default() -> Self {
        Self {
            model: "qwen-2.5-32b".to_string(),
            max_revisions: 0,
            revision_limit: 3,
            max_tokens: 4096,
        }
    }
}

/// Research assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchSettings {
    pub model: String,
    /// Initial slider position on the research form.
    pub default_analysts: u32,
    pub max_tokens: u32,
    /// Send earlier turns with the same analyst as conversation context.
    /// Off by default: each interview turn is answered in isolation.
    pub carry_history: bool,
}

impl ResearchSettings {
    /// Team size used when a request names none, kept inside the
    /// accepted analyst range whatever the config says.
    pub fn analyst_count_default(&self) -> u32 {
        self.default_analysts.clamp(MIN_ANALYSTS, MAX_ANALYSTS)
    }
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            model: "gemma2-9b-it".to_string(),
            default_analysts: 3,
            max_tokens: 2048,
            carry_history: false,
        }
    }
}

/// HTTP listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Seconds a session may go untouched before it is dropped.
    pub session_idle_secs: u64,
    /// Seconds between idle-session sweeps.
    pub session_sweep_secs: u64,
}

impl ServerSettings {
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// Never zero, so the sweep timer stays valid.
    pub fn session_sweep(&self) -> Duration {
        Duration::from_secs(self.session_sweep_secs.max(1))
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            session_idle_secs: 3600,
            session_sweep_secs: 60,
        }
    }
}

/// Where interaction records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionLogBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionLogSettings {
    pub backend: InteractionLogBackend,
    /// SQLite URL; defaults to `{data_dir}/interactions.db` when unset.
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
    /// Export spans to stdout through OpenTelemetry.
    pub otel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.provider.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.essay.model, "qwen-2.5-32b");
        assert_eq!(config.essay.max_revisions, 0);
        assert_eq!(config.research.model, "gemma2-9b-it");
        assert_eq!(config.research.default_analysts, 3);
        assert!(!config.research.carry_history);
        assert_eq!(config.interaction_log.backend, InteractionLogBackend::Memory);
    }

    #[test]
    fn test_app_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.server.session_idle(), Duration::from_secs(3600));
        assert_eq!(config.server.session_sweep(), Duration::from_secs(60));
        assert_eq!(config.provider.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_app_config_deserialize_partial_sections() {
        let toml_str = r#"
[provider]
base_url = "http://localhost:11434/v1"

[essay]
max_revisions = 2

[research]
carry_history = true

[interaction_log]
backend = "sqlite"
database_url = "sqlite://interactions.db?mode=rwc"

[logging]
json = true
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.base_url, "http://localhost:11434/v1");
        assert_eq!(config.provider.name, "groq");
        assert_eq!(config.essay.max_revisions, 2);
        assert_eq!(config.essay.revision_limit, 3);
        assert!(config.research.carry_history);
        assert_eq!(config.interaction_log.backend, InteractionLogBackend::Sqlite);
        assert!(config.logging.json);
        assert!(!config.logging.otel);
    }

    #[test]
    fn test_analyst_count_default_is_clamped() {
        let mut research = ResearchSettings::default();
        assert_eq!(research.analyst_count_default(), 3);

        research.default_analysts = 10;
        assert_eq!(research.analyst_count_default(), MAX_ANALYSTS);

        research.default_analysts = 0;
        assert_eq!(research.analyst_count_default(), MIN_ANALYSTS);
    }

    #[test]
    fn test_zero_sweep_interval_is_raised() {
        let config: AppConfig = toml::from_str("[server]\nsession_sweep_secs = 0\nsession_idle_secs = 5\n").unwrap();
        assert_eq!(config.server.session_sweep(), Duration::from_secs(1));
        assert_eq!(config.server.session_idle(), Duration::from_secs(5));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = toml::from_str::<AppConfig>("[interaction_log]\nbackend = \"redis\"\n");
        assert!(result.is_err());
    }
}
