//! Application state wiring all services together.
//!
//! AppState holds the generation flows, the per-visit session stores, and
//! the interaction log. It is used by both CLI commands and HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};

use scriptorium_core::dispatch::PromptDispatcher;
use scriptorium_core::essay::writer::EssayWriter;
use scriptorium_core::interaction::box_log::BoxInteractionLog;
use scriptorium_core::interaction::memory::MemoryInteractionLog;
use scriptorium_core::llm::box_provider::BoxLlmProvider;
use scriptorium_core::research::assistant::ResearchAssistant;
use scriptorium_core::session::store::SessionStore;
use scriptorium_infra::config::{default_database_url, resolve_data_dir};
use scriptorium_infra::credentials::resolve_api_key;
use scriptorium_infra::llm::build_provider;
use scriptorium_infra::sqlite::interaction_log::SqliteInteractionLog;
use scriptorium_infra::sqlite::pool::DatabasePool;
use scriptorium_types::config::{AppConfig, InteractionLogBackend};
use scriptorium_types::essay::EssaySession;
use scriptorium_types::research::ResearchSession;

use crate::http::templates::Templates;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub essay_writer: Arc<EssayWriter>,
    pub research: Arc<ResearchAssistant>,
    pub essays: Arc<SessionStore<EssaySession>>,
    pub research_sessions: Arc<SessionStore<ResearchSession>>,
    pub interactions: Arc<BoxInteractionLog>,
    pub templates: Arc<Templates>,
}

impl AppState {
    /// Initialize the application state: resolve the API key, build the
    /// provider, open the interaction log.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let api_key = resolve_api_key(&config.provider.api_key_env)?;
        let provider = build_provider(&config.provider, api_key, &config.essay.model);
        let interactions = open_interaction_log(&config).await?;
        Self::from_parts(config, Arc::new(provider), Arc::new(interactions))
    }

    /// Wire state around an already-built provider and log.
    pub fn from_parts(
        config: AppConfig,
        provider: Arc<BoxLlmProvider>,
        interactions: Arc<BoxInteractionLog>,
    ) -> anyhow::Result<Self> {
        let essay_dispatcher = PromptDispatcher::new(
            Arc::clone(&provider),
            config.essay.model.clone(),
            config.essay.max_tokens,
        );
        let research_dispatcher = PromptDispatcher::new(
            provider,
            config.research.model.clone(),
            config.research.max_tokens,
        );

        let essay_writer = EssayWriter::new(
            essay_dispatcher,
            Arc::clone(&interactions),
            config.essay.max_revisions,
            config.essay.revision_limit,
        );
        let research = ResearchAssistant::new(
            research_dispatcher,
            Arc::clone(&interactions),
            config.research.carry_history,
        );

        Ok(Self {
            config: Arc::new(config),
            essay_writer: Arc::new(essay_writer),
            research: Arc::new(research),
            essays: Arc::new(SessionStore::new()),
            research_sessions: Arc::new(SessionStore::new()),
            interactions,
            templates: Arc::new(Templates::new()?),
        })
    }

    /// Drop sessions idle for at least `max_idle`, along with their
    /// process-local interaction records. Returns how many sessions
    /// left the stores.
    pub async fn evict_idle_sessions(&self, max_idle: Duration) -> usize {
        let evicted = self.essays.evict_idle(max_idle) + self.research_sessions.evict_idle(max_idle);

        let cutoff = TimeDelta::from_std(max_idle)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle));
        if let Some(cutoff) = cutoff {
            match self.interactions.expire_idle(cutoff).await {
                Ok(released) if released > 0 => {
                    tracing::debug!(released, "released idle interaction logs");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "failed to expire idle interaction logs"),
            }
        }

        if evicted > 0 {
            tracing::info!(evicted, "evicted idle sessions");
        }
        evicted
    }

    /// Periodically evict idle sessions using the `[server]` settings.
    pub fn spawn_session_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        let max_idle = self.config.server.session_idle();
        let period = self.config.server.session_sweep();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                state.evict_idle_sessions(max_idle).await;
            }
        })
    }
}

async fn open_interaction_log(config: &AppConfig) -> anyhow::Result<BoxInteractionLog> {
    match config.interaction_log.backend {
        InteractionLogBackend::Memory => Ok(BoxInteractionLog::new(MemoryInteractionLog::new())),
        InteractionLogBackend::Sqlite => {
            let url = match &config.interaction_log.database_url {
                Some(url) => url.clone(),
                None => {
                    tokio::fs::create_dir_all(resolve_data_dir()).await?;
                    default_database_url()
                }
            };
            let pool = DatabasePool::new(&url).await?;
            tracing::info!(url = %url, "interaction log stored in SQLite");
            Ok(BoxInteractionLog::new(SqliteInteractionLog::new(pool)))
        }
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use scriptorium_core::testing::{RequestLog, ScriptedProvider};

    /// State backed by a scripted provider and an in-memory log.
    pub fn state_with(provider: ScriptedProvider) -> (AppState, RequestLog) {
        state_with_config(AppConfig::default(), provider)
    }

    pub fn state_with_config(config: AppConfig, provider: ScriptedProvider) -> (AppState, RequestLog) {
        let requests = provider.requests();
        let state = AppState::from_parts(
            config,
            Arc::new(BoxLlmProvider::new(provider)),
            Arc::new(BoxInteractionLog::new(MemoryInteractionLog::new())),
        )
        .unwrap();
        (state, requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptorium_core::testing::ScriptedProvider;
    use scriptorium_types::error::ConfigError;
    use scriptorium_types::interaction::{InteractionKind, InteractionRecord};
    use uuid::Uuid;

    use super::test_support::state_with;

    #[tokio::test]
    async fn test_evict_idle_sessions_clears_stores_and_memory_log() {
        let (state, _) = state_with(ScriptedProvider::new(Vec::<String>::new()));
        let essay_id = Uuid::now_v7();
        state.essays.insert(essay_id, EssaySession::new("Wolves", 0));
        let research_id = Uuid::now_v7();
        state
            .research_sessions
            .insert(research_id, ResearchSession::new("Reefs", Vec::new()));
        state
            .interactions
            .append(InteractionRecord::new(essay_id, InteractionKind::Plan, "p", "r", "m"))
            .await
            .unwrap();

        assert_eq!(state.evict_idle_sessions(Duration::ZERO).await, 2);
        assert!(state.essays.is_empty());
        assert!(state.research_sessions.is_empty());
        assert!(state.interactions.list(&essay_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_sessions_survive_eviction() {
        let (state, _) = state_with(ScriptedProvider::new(Vec::<String>::new()));
        let id = Uuid::now_v7();
        state.essays.insert(id, EssaySession::new("Wolves", 0));
        state
            .interactions
            .append(InteractionRecord::new(id, InteractionKind::Plan, "p", "r", "m"))
            .await
            .unwrap();

        assert_eq!(state.evict_idle_sessions(Duration::from_secs(3600)).await, 0);
        assert!(state.essays.contains(&id));
        assert_eq!(state.interactions.list(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_api_key_halts_before_any_setup() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("interactions.db");

        let mut config = AppConfig::default();
        config.provider.api_key_env = "SCRIPTORIUM_TEST_UNSET_API_KEY".to_string();
        config.interaction_log.backend = InteractionLogBackend::Sqlite;
        config.interaction_log.database_url =
            Some(format!("sqlite://{}?mode=rwc", db_path.display()));

        let err = match AppState::init(config).await {
            Ok(_) => panic!("init must fail without an API key"),
            Err(err) => err,
        };
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingApiKey { env_var })
                if env_var == "SCRIPTORIUM_TEST_UNSET_API_KEY"
        ));
        assert!(!db_path.exists());
    }
}
