//! Arena configuration loaded from TOML.

use crate::orchestrator::Orchestrator;
use crate::provider::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, HeuristicProvider, LlmConfig, LlmProvider, MoveProvider,
    ProviderKind,
};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use strictly_grid::{BoardSize, Difficulty, GameMode};
use tracing::{debug, info, instrument};

/// Top-level configuration for a play session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Board side length (3, 4 or 5).
    board_size: BoardSize,

    /// Opponent kind.
    mode: GameMode,

    /// Requested opponent strength.
    difficulty: Difficulty,

    /// Display name for X; defaults depend on the mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[getter(skip)]
    player_x_name: Option<String>,

    /// Display name for O; defaults depend on the mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[getter(skip)]
    player_o_name: Option<String>,

    /// Print the opponent's explanation after each of its moves.
    show_reasoning: bool,

    /// Automated opponent settings.
    opponent: OpponentConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            board_size: BoardSize::Three,
            mode: GameMode::VsAuto,
            difficulty: Difficulty::Hard,
            player_x_name: None,
            player_o_name: None,
            show_reasoning: true,
            opponent: OpponentConfig::default(),
        }
    }
}

/// `[opponent]` table.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Which provider answers move requests.
    provider: ProviderKind,

    /// Cosmetic delay before the provider is asked, in milliseconds.
    pacing_ms: u64,

    /// Upper bound on one provider call, in milliseconds.
    timeout_ms: u64,

    /// Seed for random choices; unset means nondeterministic.
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,

    /// Language model settings, used when `provider = "llm"`.
    llm: LlmSettings,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Heuristic,
            pacing_ms: 600,
            timeout_ms: 15_000,
            seed: None,
            llm: LlmSettings::default(),
        }
    }
}

/// `[opponent.llm]` table.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Model name.
    model: String,

    /// Environment variable holding the API key.
    api_key_env: String,

    /// REST endpoint base URL.
    base_url: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Values given on the command line; each one replaces the file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Board size.
    pub board_size: Option<BoardSize>,
    /// Mode.
    pub mode: Option<GameMode>,
    /// Difficulty.
    pub difficulty: Option<Difficulty>,
    /// Provider.
    pub provider: Option<ProviderKind>,
    /// Random seed.
    pub seed: Option<u64>,
}

impl ArenaConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(mode = %config.mode, size = %config.board_size, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path))]
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            Some(path) => {
                info!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Applies command-line values on top of the file values.
    #[instrument(skip(self))]
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(size) = overrides.board_size {
            self.board_size = size;
        }
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if let Some(difficulty) = overrides.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(provider) = overrides.provider {
            self.opponent.provider = provider;
        }
        if let Some(seed) = overrides.seed {
            self.opponent.seed = Some(seed);
        }
    }

    /// Serializes the effective configuration.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to serialize config: {}", e)))
    }

    /// Display name for X in `mode`.
    pub fn player_x_name(&self, mode: GameMode) -> String {
        self.player_x_name.clone().unwrap_or_else(|| match mode {
            GameMode::VsAuto => "Player".to_string(),
            GameMode::VsHuman => "Player 1".to_string(),
        })
    }

    /// Display name for O in `mode`.
    pub fn player_o_name(&self, mode: GameMode) -> String {
        self.player_o_name.clone().unwrap_or_else(|| match mode {
            GameMode::VsAuto => "Computer".to_string(),
            GameMode::VsHuman => "Player 2".to_string(),
        })
    }

    /// Builds the configured move provider.
    ///
    /// The LLM provider reads its API key from the configured environment
    /// variable.
    #[instrument(skip(self), fields(provider = %self.opponent.provider))]
    pub fn build_provider(&self) -> Result<Arc<dyn MoveProvider>, ConfigError> {
        match self.opponent.provider {
            ProviderKind::Heuristic => Ok(Arc::new(HeuristicProvider::new(self.opponent.seed))),
            ProviderKind::Llm => {
                let settings = &self.opponent.llm;
                let config = LlmConfig::from_env(
                    &settings.api_key_env,
                    settings.model.clone(),
                    settings.base_url.clone(),
                )
                .map_err(|e| ConfigError::new(e.to_string()))?;
                Ok(Arc::new(LlmProvider::new(config)))
            }
        }
    }

    /// Builds an orchestrator around the configured provider.
    pub fn build_orchestrator(&self) -> Result<Orchestrator, ConfigError> {
        let orchestrator = Orchestrator::new(self.build_provider()?)
            .with_pacing(Duration::from_millis(self.opponent.pacing_ms))
            .with_timeout(Duration::from_millis(self.opponent.timeout_ms));
        Ok(match self.opponent.seed {
            Some(seed) => orchestrator.with_seed(seed),
            None => orchestrator,
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ArenaConfig::default();
        assert_eq!(*config.board_size(), BoardSize::Three);
        assert_eq!(*config.mode(), GameMode::VsAuto);
        assert_eq!(*config.difficulty(), Difficulty::Hard);
        assert!(*config.show_reasoning());
        assert_eq!(*config.opponent().pacing_ms(), 600);
        assert_eq!(*config.opponent().timeout_ms(), 15_000);
        assert_eq!(config.opponent().llm().model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_names_follow_mode() {
        let config = ArenaConfig::default();
        assert_eq!(config.player_x_name(GameMode::VsAuto), "Player");
        assert_eq!(config.player_o_name(GameMode::VsAuto), "Computer");
        assert_eq!(config.player_x_name(GameMode::VsHuman), "Player 1");
        assert_eq!(config.player_o_name(GameMode::VsHuman), "Player 2");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ArenaConfig::from_toml(
            r#"
            board_size = 5
            mode = "human"
            player_o_name = "Alice"

            [opponent]
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(*config.board_size(), BoardSize::Five);
        assert_eq!(*config.mode(), GameMode::VsHuman);
        assert_eq!(config.player_o_name(GameMode::VsHuman), "Alice");
        assert_eq!(*config.opponent().seed(), Some(42));
        assert_eq!(*config.opponent().pacing_ms(), 600);
    }

    #[test]
    fn test_invalid_board_size_rejected() {
        let error = ArenaConfig::from_toml("board_size = 7").unwrap_err();
        assert!(error.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = ArenaConfig::default();
        config.apply(&Overrides {
            board_size: Some(BoardSize::Four),
            difficulty: Some(Difficulty::Easy),
            provider: Some(ProviderKind::Llm),
            ..Overrides::default()
        });
        assert_eq!(*config.board_size(), BoardSize::Four);
        assert_eq!(*config.difficulty(), Difficulty::Easy);
        assert_eq!(*config.mode(), GameMode::VsAuto);
        assert_eq!(*config.opponent().provider(), ProviderKind::Llm);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ArenaConfig::default();
        config.apply(&Overrides {
            seed: Some(9),
            ..Overrides::default()
        });
        let text = config.to_toml().unwrap();
        assert!(text.contains("board_size = 3"));
        assert_eq!(ArenaConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_llm_provider_needs_key() {
        let mut config = ArenaConfig::from_toml(
            r#"
            [opponent]
            provider = "llm"

            [opponent.llm]
            api_key_env = "STRICTLY_ARENA_UNSET_KEY"
            "#,
        )
        .unwrap();
        assert!(config.build_provider().is_err());

        config.apply(&Overrides {
            provider: Some(ProviderKind::Heuristic),
            ..Overrides::default()
        });
        assert!(config.build_provider().is_ok());
    }
}
