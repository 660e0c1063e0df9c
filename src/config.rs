use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::HumError;

/// Knobs for the structural analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    rhythmic_types: Vec<String>,
    recip_type: String,
    layout_namespace: String,
    csv_separator: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rhythmic_types: vec![Self::KERN.to_string(), Self::RECIP.to_string()],
            recip_type: Self::RECIP.to_string(),
            layout_namespace: Self::LAYOUT.to_string(),
            csv_separator: ",".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub const KERN: &'static str = "**kern";
    pub const RECIP: &'static str = "**recip";
    const LAYOUT: &'static str = "LO";

    /// Exclusive interpretations whose data tokens carry durations.
    pub fn rhythmic_types(&self) -> &[String] {
        &self.rhythmic_types
    }

    pub fn is_rhythmic(&self, data_type: &str) -> bool {
        self.rhythmic_types.iter().any(|t| t == data_type)
    }

    pub fn set_rhythmic_types(&mut self, types: Vec<String>) {
        self.rhythmic_types = types;
    }

    pub fn recip_type(&self) -> &str {
        &self.recip_type
    }

    pub fn layout_namespace(&self) -> &str {
        &self.layout_namespace
    }

    /// Prefix of local layout comments, e.g. `!LO:`
    pub fn local_layout_prefix(&self) -> String {
        format!("!{}:", self.layout_namespace)
    }

    /// Prefix of global layout comments, e.g. `!!LO:`
    pub fn global_layout_prefix(&self) -> String {
        format!("!!{}:", self.layout_namespace)
    }

    pub fn csv_separator(&self) -> &str {
        &self.csv_separator
    }

    pub fn read_config(path: &Path) -> Result<Self, HumError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: AnalysisConfig = serde_json::from_reader(reader).map_err(|err| {
            HumError::ConfigError(format!("Could not read configuration {path:?}: {err}"))
        })?;
        if config.csv_separator.is_empty() {
            return Err(HumError::ConfigError(
                "csv_separator must not be empty".to_string(),
            ));
        }
        log::debug!("Loaded configuration {config:?}");
        Ok(config)
    }

    pub fn save_config(&self, path: &Path) -> Result<(), HumError> {
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            HumError::ConfigError(format!("Could not save configuration {err:}"))
        })?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert!(config.is_rhythmic("**kern"));
        assert!(config.is_rhythmic("**recip"));
        assert!(!config.is_rhythmic("**text"));
        assert_eq!(config.local_layout_prefix(), "!LO:");
        assert_eq!(config.global_layout_prefix(), "!!LO:");
    }

    #[test]
    fn test_config_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AnalysisConfig::default();
        config.set_rhythmic_types(vec!["**kern".to_string(), "**mens".to_string()]);
        config.save_config(&path).unwrap();
        let read = AnalysisConfig::read_config(&path).unwrap();
        assert_eq!(read, config);
        assert!(read.is_rhythmic("**mens"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "layout_namespace": "XY" }"#).unwrap();
        let read = AnalysisConfig::read_config(&path).unwrap();
        assert_eq!(read.local_layout_prefix(), "!XY:");
        assert_eq!(read.recip_type(), "**recip");
        assert_eq!(read.csv_separator(), ",");
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        let err = AnalysisConfig::read_config(&path).unwrap_err();
        assert!(matches!(err, HumError::ConfigError(_)));
    }
}
