use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::Thresholds;

fn default_min_callers() -> i64 {
    1
}

///
/// Settings for a picking run. Loadable from TOML:
///
/// ```toml
/// min_snv_callers = 2
/// min_indel_callers = 1
/// threads = 4
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PickingConfig {
    #[serde(default = "default_min_callers")]
    pub min_snv_callers: i64,
    #[serde(default = "default_min_callers")]
    pub min_indel_callers: i64,
    /// Worker threads for reading sources. Defaults to rayon's global pool.
    pub threads: Option<usize>,
}

impl Default for PickingConfig {
    fn default() -> Self {
        PickingConfig {
            min_snv_callers: default_min_callers(),
            min_indel_callers: default_min_callers(),
            threads: None,
        }
    }
}

impl PickingConfig {
    /// Clamped per-kind thresholds.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.min_snv_callers, self.min_indel_callers)
    }
}

#[derive(Error, Debug)]
pub enum PickingConfigError {
    #[error("Picking config file must have a `toml` extension")]
    InvalidFileType,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl TryFrom<&Path> for PickingConfig {
    type Error = PickingConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            return Err(PickingConfigError::InvalidFileType);
        }
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
