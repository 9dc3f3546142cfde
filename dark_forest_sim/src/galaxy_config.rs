use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use bevy::prelude::Resource;
use serde::Deserialize;
use thiserror::Error;

use crate::{civilization::CivilizationTraits, fleet::ShipType, ledger::ResourceBundle};

pub const BUILTIN_GALAXY_CONFIG: &str = include_str!("data/galaxy_config.json");
pub const GALAXY_CONFIG_ENV: &str = "DARK_FOREST_CONFIG_PATH";

/// Every tunable constant of world generation and the turn rules.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
    pub seed: u64,
    pub grid: GridConfig,
    pub civilizations: CivilizationSetupConfig,
    pub durations: DurationConfig,
    pub ships: ShipConfig,
    pub visibility: VisibilityConfig,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            seed: 0x0DA2_F0E5,
            grid: GridConfig::default(),
            civilizations: CivilizationSetupConfig::default(),
            durations: DurationConfig::default(),
            ships: ShipConfig::default(),
            visibility: VisibilityConfig::default(),
        }
    }
}

impl GalaxyConfig {
    pub fn builtin() -> Result<Self, GalaxyConfigError> {
        Ok(Self::from_json_str(BUILTIN_GALAXY_CONFIG)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, GalaxyConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| GalaxyConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let config = GalaxyConfig::from_json_str(&contents)?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Error)]
pub enum GalaxyConfigError {
    #[error("failed to parse galaxy config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read galaxy config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Half-open `[min, max)` integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct YieldRange {
    pub min: i64,
    pub max: i64,
}

impl YieldRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value < self.max
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    pub planet_count: u32,
    pub planet_minerals: YieldRange,
    pub planet_energy: YieldRange,
    pub homeworld_minerals: YieldRange,
    pub homeworld_energy: YieldRange,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            planet_count: 20,
            planet_minerals: YieldRange::new(50, 150),
            planet_energy: YieldRange::new(30, 100),
            homeworld_minerals: YieldRange::new(100, 200),
            homeworld_energy: YieldRange::new(80, 150),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CivilizationSetupConfig {
    pub human_count: u32,
    pub ai_count: u32,
    pub human_starting_resources: ResourceBundle,
    pub ai_starting_resources: ResourceBundle,
    pub traits: CivilizationTraits,
}

impl Default for CivilizationSetupConfig {
    fn default() -> Self {
        Self {
            human_count: 2,
            ai_count: 2,
            human_starting_resources: ResourceBundle::new(1000, 500, 100),
            ai_starting_resources: ResourceBundle::default(),
            traits: CivilizationTraits::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DurationConfig {
    pub research_divisor: i64,
    pub construction_divisor: i64,
    pub colonization_divisor: i64,
    pub weapon_speed: i64,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            research_divisor: 50,
            construction_divisor: 50,
            colonization_divisor: 2,
            weapon_speed: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub costs: ShipCosts,
    pub base_stealth: f64,
    pub base_speed: f64,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            costs: ShipCosts::default(),
            base_stealth: 1.0,
            base_speed: 1.0,
        }
    }
}

/// Mineral cost per hull type.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ShipCosts {
    pub exploration: i64,
    pub combat: i64,
    pub espionage: i64,
    pub colonization: i64,
}

impl Default for ShipCosts {
    fn default() -> Self {
        Self {
            exploration: 100,
            combat: 200,
            espionage: 150,
            colonization: 250,
        }
    }
}

impl ShipCosts {
    pub fn cost(&self, ship_type: ShipType) -> i64 {
        match ship_type {
            ShipType::Exploration => self.exploration,
            ShipType::Combat => self.combat,
            ShipType::Espionage => self.espionage,
            ShipType::Colonization => self.colonization,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    pub initial: f64,
    pub colonization_increase: f64,
    pub message_increase: f64,
    pub tech_level_factor: f64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            initial: 10.0,
            colonization_increase: 5.0,
            message_increase: 2.0,
            tech_level_factor: 0.5,
        }
    }
}

/// Where the active configuration came from; `None` means the builtin document.
#[derive(Resource, Debug, Clone, Default)]
pub struct GalaxyConfigMetadata {
    path: Option<PathBuf>,
}

impl GalaxyConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Load from `path` when given, otherwise from the builtin document.
pub fn load_galaxy_config(path: Option<&Path>) -> (GalaxyConfig, GalaxyConfigMetadata) {
    if let Some(path) = path {
        match GalaxyConfig::from_file(path) {
            Ok(config) => {
                tracing::info!(
                    target: "dark_forest::config",
                    path = %path.display(),
                    "galaxy_config.loaded=file"
                );
                return (config, GalaxyConfigMetadata::new(Some(path.to_path_buf())));
            }
            Err(err) => {
                tracing::warn!(
                    target: "dark_forest::config",
                    path = %path.display(),
                    error = %err,
                    "galaxy_config.load_failed"
                );
            }
        }
    }

    match GalaxyConfig::builtin() {
        Ok(config) => {
            tracing::info!(target: "dark_forest::config", "galaxy_config.loaded=builtin");
            (config, GalaxyConfigMetadata::new(None))
        }
        Err(err) => {
            tracing::warn!(
                target: "dark_forest::config",
                error = %err,
                "galaxy_config.builtin_invalid=using_defaults"
            );
            (GalaxyConfig::default(), GalaxyConfigMetadata::new(None))
        }
    }
}

pub fn load_galaxy_config_from_env() -> (GalaxyConfig, GalaxyConfigMetadata) {
    let override_path = env::var(GALAXY_CONFIG_ENV).ok().map(PathBuf::from);
    load_galaxy_config(override_path.as_deref())
}
