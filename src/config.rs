//! Settings for the terminal game: TOML file plus command-line overrides

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use cake_engine::{ConfigError, GameConfig};
use cake_session::{ClientConfig, DEFAULT_SUBMISSION_HOLD};

/// Contents of a `--config` file. Every key is optional.
///
/// ```toml
/// max_mistakes = 3
/// max_orders = 5
/// hold_ms = 800
/// seed = 7
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    #[serde(flatten)]
    pub game: GameConfig,
    pub hold_ms: Option<u64>,
    pub seed: Option<u64>,
}

/// Values given on the command line; `None` means "not given"
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    pub max_mistakes: Option<u32>,
    pub max_orders: Option<u32>,
    pub hold_ms: Option<u64>,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub game: GameConfig,
    pub client: ClientConfig,
    pub seed: Option<u64>,
}

pub fn parse_file(raw: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str(raw)
}

pub fn load_file(path: &Path) -> anyhow::Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_file(&raw).with_context(|| format!("failed to parse config file {}", path.display()))
}

impl Settings {
    /// Flags win over the file, the file wins over defaults
    pub fn resolve(file: FileConfig, overrides: &Overrides) -> Result<Self, ConfigError> {
        let game = GameConfig {
            max_mistakes: overrides.max_mistakes.unwrap_or(file.game.max_mistakes),
            max_orders: overrides.max_orders.unwrap_or(file.game.max_orders),
        };
        game.validate()?;

        let submission_hold = overrides
            .hold_ms
            .or(file.hold_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_SUBMISSION_HOLD);

        Ok(Settings {
            game,
            client: ClientConfig { submission_hold },
            seed: overrides.seed.or(file.seed),
        })
    }
}
