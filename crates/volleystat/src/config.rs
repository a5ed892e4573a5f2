//! Configuration management for volleystat.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::game::{GameRules, DEFAULT_DECIDING_SET_POINTS, DEFAULT_SET_POINTS, DEFAULT_WIN_BY};
use crate::schedule::{PointsToWin, SetFormat};
use crate::storage::DataLayout;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "volleystat";

/// Environment variable prefix.
const ENV_PREFIX: &str = "VOLLEYSTAT_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `VOLLEYSTAT_`, sections split
///    on `__`, e.g. `VOLLEYSTAT_GAME__WIN_BY`)
/// 2. TOML config file at `~/.config/volleystat/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Rally log export configuration.
    pub export: ExportConfig,
    /// Defaults for newly scheduled matches.
    pub match_defaults: MatchDefaults,
    /// Scoring configuration.
    pub game: GameConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `team.json`, `schedule.json` and
    /// `archived_matches.json`.
    /// Defaults to `~/.local/share/volleystat`
    pub data_dir: Option<PathBuf>,
}

/// Rally log export configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for exported rally logs. Defaults to the data directory.
    pub dir: Option<PathBuf>,
}

/// Defaults applied by `schedule add`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchDefaults {
    /// Set format.
    pub set_format: SetFormat,
    /// Points rule.
    pub points_to_win: PointsToWin,
    /// Our team name. Falls back to the name in `team.json`.
    pub our_team: Option<String>,
}

/// Scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Target of a regular set.
    pub set_points: u32,
    /// Target of a short deciding set.
    pub deciding_set_points: u32,
    /// Required winning margin.
    pub win_by: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            set_points: DEFAULT_SET_POINTS,
            deciding_set_points: DEFAULT_DECIDING_SET_POINTS,
            win_by: DEFAULT_WIN_BY,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let game = &self.game;
        if game.win_by == 0 {
            return Err(Error::ConfigValidation {
                message: "win_by must be greater than 0".to_string(),
            });
        }

        if game.set_points == 0 || game.deciding_set_points == 0 {
            return Err(Error::ConfigValidation {
                message: "set_points and deciding_set_points must be greater than 0".to_string(),
            });
        }

        if game.deciding_set_points > game.set_points {
            return Err(Error::ConfigValidation {
                message: format!(
                    "deciding_set_points ({}) cannot be greater than set_points ({})",
                    game.deciding_set_points, game.set_points
                ),
            });
        }

        if let Some(name) = &self.match_defaults.our_team {
            if name.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "match_defaults.our_team cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export.dir.clone().unwrap_or_else(|| self.data_dir())
    }

    /// File locations derived from this configuration.
    #[must_use]
    pub fn data_layout(&self) -> DataLayout {
        DataLayout::new(self.data_dir(), self.export_dir())
    }

    /// Scoring rules for a match played with `set_format` and
    /// `points_to_win`.
    #[must_use]
    pub fn game_rules(&self, set_format: SetFormat, points_to_win: PointsToWin) -> GameRules {
        GameRules::new(set_format, points_to_win).with_targets(
            self.game.set_points,
            self.game.deciding_set_points,
            self.game.win_by,
        )
    }
}
