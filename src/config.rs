//! Loading service configuration (server options + problem bank) from TOML.
//!
//! See `ServiceConfig` and `ProblemCfg` for the expected schema. Problem data
//! may use any of the historical authored shapes; it is normalized on load.

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::domain::ProblemSettings;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ServiceConfig {
  #[serde(default)]
  pub server: ServerCfg,
  #[serde(default)]
  pub problems: Vec<ProblemCfg>,
}

/// Which event publisher the service wires in.
#[derive(Clone, Copy, Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventSink {
  /// Structured log lines on the `events` target.
  #[default]
  Log,
  /// Behave like an authoring preview host: publication is not supported.
  Preview,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerCfg {
  /// Public base that `/static/...` asset paths are rewritten to.
  #[serde(default = "default_static_base")]
  pub static_url_base: String,
  #[serde(default)]
  pub events: EventSink,
}

fn default_static_base() -> String { "/static".into() }

impl Default for ServerCfg {
  fn default() -> Self {
    Self { static_url_base: default_static_base(), events: EventSink::default() }
  }
}

/// Problem entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ProblemCfg {
  pub id: String,
  #[serde(flatten)]
  pub settings: ProblemSettings,
  /// Authored zones/items/feedback.
  pub data: Value,
}

pub fn parse_config(s: &str) -> Result<ServiceConfig, toml::de::Error> {
  toml::from_str::<ServiceConfig>(s)
}

/// Attempt to load `ServiceConfig` from DND_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<ServiceConfig> {
  let path = std::env::var("DND_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "dragdrop_backend", %path, problems = cfg.problems.len(), "Loaded service config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "dragdrop_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "dragdrop_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
