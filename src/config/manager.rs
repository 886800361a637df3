use super::{
    canvas::CanvasConfig,
    evolution::EvolutionConfig,
    output::OutputConfig,
    traits::ConfigSection,
};
use crate::error::GaImageError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Prefix for environment overrides, e.g. `GAIMAGE__EVOLUTION__POPULATION_SIZE=80`
pub const ENV_PREFIX: &str = "GAIMAGE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub canvas: CanvasConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), GaImageError> {
        self.evolution.validate()?;
        self.canvas.validate()?;
        self.output.validate()?;
        Ok(())
    }

    pub fn locus_count(&self) -> usize {
        self.canvas.locus_count()
    }
}

/// Builds the run configuration. Once frozen the configuration is shared
/// read-only for the whole run.
pub struct ConfigManager {
    config: AppConfig,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Layer a TOML/JSON file (format picked by extension) and environment
    /// overrides on top of the defaults.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), GaImageError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GaImageError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(Self::environment())
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        log::debug!("Loaded configuration from {}", path.display());
        self.config = config;
        Ok(())
    }

    /// Defaults plus environment overrides, no file.
    pub fn load_from_env(&mut self) -> Result<(), GaImageError> {
        let settings = config::Config::builder()
            .add_source(Self::environment())
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GaImageError> {
        let toml_str = toml::to_string_pretty(&self.config)
            .map_err(|e| GaImageError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    pub fn update<F>(&mut self, f: F) -> Result<(), GaImageError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.config.clone();
        f(&mut candidate);
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }

    pub fn freeze(self) -> Arc<AppConfig> {
        Arc::new(self.config)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionMethod;
    use crate::types::LocusMode;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("gaimage-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_load_partial_toml_keeps_defaults() {
        let path = temp_path("partial.toml");
        std::fs::write(
            &path,
            "[evolution]\npopulation_size = 12\nelite_count = 3\nselection_method = \"tournament\"\n\n[canvas]\nlocus_mode = \"colored\"\n",
        )
        .unwrap();

        let mut manager = ConfigManager::new();
        manager.load_from_file(&path).unwrap();
        let config = manager.get();

        assert_eq!(config.evolution.population_size, 12);
        assert_eq!(config.evolution.elite_count, 3);
        assert_eq!(config.evolution.selection_method, SelectionMethod::Tournament);
        assert_eq!(config.evolution.gene_count, 300);
        assert_eq!(config.canvas.locus_mode, LocusMode::Colored);
        assert_eq!(config.locus_count(), 10);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let path = temp_path("invalid.toml");
        std::fs::write(&path, "[evolution]\npopulation_size = 2\nelite_count = 5\n").unwrap();

        let mut manager = ConfigManager::new();
        assert!(manager.load_from_file(&path).is_err());
        // previous configuration survives a failed load
        assert_eq!(manager.get().evolution.population_size, 40);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("saved.toml");
        let mut manager = ConfigManager::new();
        manager
            .update(|c| {
                c.evolution.generations = 7;
                c.canvas.width = 64;
                c.canvas.height = 48;
            })
            .unwrap();
        manager.save_to_file(&path).unwrap();

        let mut reloaded = ConfigManager::new();
        reloaded.load_from_file(&path).unwrap();
        assert_eq!(reloaded.get().evolution.generations, 7);
        assert_eq!(reloaded.get().canvas.width, 64);
        assert_eq!(reloaded.get().canvas.height, 48);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_update_rejects_invalid_change() {
        let mut manager = ConfigManager::new();
        let result = manager.update(|c| c.canvas.width = 0);
        assert!(result.is_err());
        assert_eq!(manager.get().canvas.width, 200);
    }
}
