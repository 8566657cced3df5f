//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! defuzzifier = "thresholded"
//! tie_break = "conservative"
//!
//! [partitions.gpa]
//! low_full = 1.8
//! low_zero = 2.2
//! medium_peak = 2.5
//! medium_zero = 3.2
//! high_zero = 2.8
//! high_full = 3.2
//!
//! [thresholds]
//! Poor = 0.3
//! "Needs Improvement" = 0.25
//! Satisfactory = 0.4
//! Good = 0.5
//! Excellent = 0.7
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::defuzzify::{default_thresholds, Strategy, TieBreak};
use crate::error::EngineError;
use crate::membership::PartitionSet;
use crate::models::{Category, CategoryDegrees};

pub const CONFIG_ENV: &str = "FUZZY_PERFORMANCE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub defuzzifier: Strategy,
    pub tie_break: TieBreak,
    pub partitions: PartitionSet,
    pub thresholds: CategoryDegrees,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            defuzzifier: Strategy::default(),
            tie_break: TieBreak::default(),
            partitions: PartitionSet::default(),
            thresholds: default_thresholds(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.partitions.validate()?;
        self.tie_break.validate()?;
        for category in Category::ALL {
            let threshold = self.thresholds.get(category);
            if !(0.0..=1.0).contains(&threshold) {
                return Err(EngineError::InvalidThreshold { category, threshold });
            }
        }
        Ok(())
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(text).context("failed to parse engine config")?;
        config.validate()?;
        Ok(config)
    }
}

/// Resolves the config file: an explicit path wins, then `FUZZY_PERFORMANCE_CONFIG`,
/// otherwise the built-in defaults are used.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let path: Option<PathBuf> = match path {
        Some(path) => Some(path.to_path_buf()),
        None => std::env::var_os(CONFIG_ENV).map(PathBuf::from),
    };

    let Some(path) = path else {
        tracing::debug!("no config file given, using built-in defaults");
        return Ok(EngineConfig::default());
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = EngineConfig::from_toml(&text)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded engine config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_default() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn overrides_only_named_sections() {
        let config = EngineConfig::from_toml(
            r#"
            defuzzifier = "weighted_average"
            tie_break = "conservative"

            [partitions.cca]
            low_full = 45.0
            low_zero = 55.0
            medium_peak = 65.0
            medium_zero = 75.0
            high_zero = 70.0
            high_full = 85.0
            "#,
        )
        .unwrap();

        assert_eq!(config.defuzzifier, Strategy::WeightedAverage);
        assert_eq!(config.tie_break, TieBreak::Conservative);
        assert_eq!(config.partitions.cca.low_full, 45.0);
        assert_eq!(config.partitions.gpa, PartitionSet::default().gpa);
    }

    #[test]
    fn custom_priority_parses() {
        let config = EngineConfig::from_toml(
            r#"
            [tie_break]
            custom = ["Good", "Excellent", "Satisfactory", "Needs Improvement", "Poor"]
            "#,
        )
        .unwrap();
        assert_eq!(config.tie_break.priority()[0], Category::Good);
    }

    #[test]
    fn thresholds_table_must_name_every_category() {
        let err = EngineConfig::from_toml(
            r#"
            [thresholds]
            "Needs Improvement" = 0.25
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse engine config"));

        let config = EngineConfig::from_toml(
            r#"
            [thresholds]
            Poor = 0.3
            "Needs Improvement" = 0.25
            Satisfactory = 0.4
            Good = 0.5
            Excellent = 0.7
            "#,
        )
        .unwrap();
        assert_eq!(config.thresholds.needs_improvement, 0.25);
    }

    #[test]
    fn rejects_invalid_partition() {
        let err = EngineConfig::from_toml(
            r#"
            [partitions.attendance]
            low_full = 0.7
            low_zero = 0.65
            medium_peak = 0.75
            medium_zero = 0.85
            high_zero = 0.80
            high_full = 0.90
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("attendance"));
    }

    #[test]
    fn rejects_threshold_above_one() {
        let err = EngineConfig::from_toml(
            r#"
            [thresholds]
            Poor = 0.3
            "Needs Improvement" = 0.2
            Satisfactory = 0.4
            Good = 1.5
            Excellent = 0.7
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("Good"));
    }

    #[test]
    fn loads_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tie_break = \"conservative\"").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.tie_break, TieBreak::Conservative);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/fuzzy.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
    }
}
