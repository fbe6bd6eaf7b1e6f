//! Application state: problem registry, learner field store, event publisher
//! and asset resolver.
//!
//! This module owns:
//!   - the registry of normalized problems (by id)
//!   - the host collaborators (store, publisher, assets)
//!   - the learner lock that serializes learner record mutations
//!
//! Problems come from the TOML config (if any) and the built-in seeds; config
//! entries win over seeds with the same id.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{error, info, instrument};

use crate::assets::{AssetResolver, StaticAssets};
use crate::config::{load_config_from_env, EventSink, ServiceConfig};
use crate::domain::{Mode, Problem, ProblemSettings};
use crate::error::DragDropError;
use crate::events::{EventPublisher, PreviewPublisher, TracingPublisher};
use crate::normalize::normalize_definition;
use crate::seeds::seed_problems;
use crate::store::{FieldStore, MemoryFieldStore};

#[derive(Clone)]
pub struct AppState {
    pub problems: Arc<RwLock<HashMap<String, Problem>>>,
    pub store: Arc<dyn FieldStore>,
    pub publisher: Arc<dyn EventPublisher>,
    pub assets: Arc<dyn AssetResolver>,
    learners: Arc<Mutex<()>>,
}

impl AppState {
    /// Build state from env: load config, seed problems, pick the event sink.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        Self::from_config(&cfg)
    }

    pub fn from_config(cfg: &ServiceConfig) -> Self {
        let publisher: Arc<dyn EventPublisher> = match cfg.server.events {
            EventSink::Log => Arc::new(TracingPublisher),
            EventSink::Preview => Arc::new(PreviewPublisher),
        };
        Self::with_collaborators(cfg, Arc::new(MemoryFieldStore::new()), publisher)
    }

    /// Build state around host-provided collaborators.
    pub fn with_collaborators(
        cfg: &ServiceConfig,
        store: Arc<dyn FieldStore>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let mut problems = HashMap::<String, Problem>::new();

        for pc in &cfg.problems {
            match build_problem(&pc.id, pc.settings.clone(), &pc.data) {
                Ok(p) => {
                    problems.insert(p.id.clone(), p);
                }
                Err(e) => {
                    error!(target: "dragdrop_backend", id = %pc.id, error = %e, "Skipping configured problem");
                }
            }
        }

        // Built-in seeds never overwrite configured problems.
        for (id, settings, data) in seed_problems() {
            if problems.contains_key(&id) {
                continue;
            }
            match build_problem(&id, settings, &data) {
                Ok(p) => {
                    problems.insert(id, p);
                }
                Err(e) => error!(target: "dragdrop_backend", %id, error = %e, "Built-in problem failed to normalize"),
            }
        }

        let (standard, assessment) = problems.values().fold((0, 0), |(s, a), p| match p.settings.mode {
            Mode::Standard => (s + 1, a),
            Mode::Assessment => (s, a + 1),
        });
        info!(target: "dragdrop_backend", standard, assessment, events = ?cfg.server.events, "Startup problem inventory");

        Self {
            problems: Arc::new(RwLock::new(problems)),
            store,
            publisher,
            assets: Arc::new(StaticAssets::new(cfg.server.static_url_base.clone())),
            learners: Arc::new(Mutex::new(())),
        }
    }

    /// Insert or replace a problem.
    #[instrument(level = "debug", skip(self, p), fields(id = %p.id))]
    pub async fn insert_problem(&self, p: Problem) {
        self.problems.write().await.insert(p.id.clone(), p);
    }

    /// Read-only access to a problem by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_problem(&self, id: &str) -> Result<Problem, DragDropError> {
        let problems = self.problems.read().await;
        problems
            .get(id)
            .cloned()
            .ok_or_else(|| DragDropError::UnknownProblem(id.to_string()))
    }

    /// Held for the whole load-act-save cycle of a learner action.
    pub async fn lock_learners(&self) -> MutexGuard<'_, ()> {
        self.learners.lock().await
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

/// Normalize authored data once and bundle it with its settings.
pub fn build_problem(
    id: &str,
    settings: ProblemSettings,
    data: &serde_json::Value,
) -> Result<Problem, DragDropError> {
    let definition = normalize_definition(data)?;
    Ok(Problem { id: id.to_string(), settings, definition })
}
