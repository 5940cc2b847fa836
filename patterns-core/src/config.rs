use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::strategy::OperationId;

/// Script for the weather broadcast demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Names of the apps registered with the weather service, in order.
    pub apps: Vec<String>,

    /// Updates broadcast while every app is registered.
    pub updates: Vec<String>,

    /// App to unsubscribe once `updates` have gone out. A file that leaves
    /// this out removes nobody.
    #[serde(default)]
    pub remove: Option<String>,

    /// Updates broadcast after the removal.
    pub after_remove: Vec<String>,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            apps: vec!["WeatherApp One".into(), "WeatherApp Two".into()],
            updates: vec!["Sunny, 25°C".into(), "Rainy, 18°C".into()],
            remove: Some("WeatherApp One".into()),
            after_remove: vec!["Cloudy, 20°C".into()],
        }
    }
}

/// Script for the strategy demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Operation the context starts with.
    pub initial: OperationId,

    /// Operations switched to, one after another.
    pub sequence: Vec<OperationId>,

    pub a: i32,
    pub b: i32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            initial: OperationId::Addition,
            sequence: vec![OperationId::Subtraction, OperationId::Multiplication],
            a: 10,
            b: 5,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [observer]
/// apps = ["WeatherApp One", "WeatherApp Two"]
/// remove = "WeatherApp One"
///
/// [strategy]
/// initial = "addition"
/// sequence = ["subtraction", "multiplication"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub observer: ObserverConfig,
    pub strategy: StrategyConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use the built-in demo script.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "design-patterns", "patterns-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        let observer = &self.observer;

        if observer.apps.is_empty() {
            bail!("observer.apps must name at least one app");
        }

        let mut names = HashSet::new();
        for app in &observer.apps {
            if !names.insert(app.as_str()) {
                bail!("observer.apps lists '{app}' more than once");
            }
        }

        if let Some(remove) = &observer.remove
            && !names.contains(remove.as_str())
        {
            bail!(
                "observer.remove names '{remove}', which is not in observer.apps.\n\
                 Hint: use one of: {}.",
                observer.apps.join(", ")
            );
        }

        Ok(())
    }
}
