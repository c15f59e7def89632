//! Configuration types for cluepath.
//!
//! - [`ReconstructionConfig`]: path search limits
//! - [`DisplayConfig`]: defaults for the display mode and stage selection
//! - [`CluePathConfig`]: the file-level configuration stored in
//!   `~/.cluepath/config.yaml`
//!
//! Every field is optional in YAML; missing fields take the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::display::DisplayMode;
use crate::errors::CluePathError;
use crate::stage::Stage;

/// Default cap on the number of paths recorded per reconstruction run.
pub const DEFAULT_MAX_PATHS: usize = 500;

/// Above this many paths the renderer is likely to struggle.
const MAX_PATHS_WARN_THRESHOLD: usize = 10_000;

/// Name of the global config directory under the home directory.
pub const CLUEPATH_HOME_DIR: &str = ".cluepath";

/// Name of the config file inside [`CLUEPATH_HOME_DIR`].
pub const CONFIG_FILENAME: &str = "config.yaml";

// ============================================================================
// ReconstructionConfig
// ============================================================================

/// Limits applied while reconstructing clue paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructionConfig {
    /// Maximum number of paths recorded across one aggregation run.
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
}

fn default_max_paths() -> usize {
    DEFAULT_MAX_PATHS
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            max_paths: DEFAULT_MAX_PATHS,
        }
    }
}

impl ReconstructionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path cap.
    pub fn with_max_paths(mut self, max: usize) -> Self {
        self.max_paths = max;
        self
    }

    /// Validates the configuration, returning warnings for questionable values.
    ///
    /// # Errors
    /// Returns an error if `max_paths` is 0, which would hide every path.
    pub fn validate(&self) -> Result<Vec<String>, CluePathError> {
        let mut warnings = Vec::new();

        if self.max_paths == 0 {
            return Err(CluePathError::InvalidConfiguration {
                message: "reconstruction.maxPaths cannot be 0".to_string(),
                hint: format!("Set maxPaths to at least 1 (default: {})", DEFAULT_MAX_PATHS),
            });
        }

        if self.max_paths > MAX_PATHS_WARN_THRESHOLD {
            warnings.push(format!(
                "reconstruction.maxPaths={} is very large; rendering that many paths may be slow",
                self.max_paths
            ));
        }

        Ok(warnings)
    }
}

// ============================================================================
// DisplayConfig
// ============================================================================

/// Defaults used when the caller does not pass a mode or stage selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    #[serde(default)]
    pub default_mode: DisplayMode,

    #[serde(default = "default_stages")]
    pub default_stages: Vec<Stage>,
}

fn default_stages() -> Vec<Stage> {
    Stage::ALL.to_vec()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_mode: DisplayMode::default(),
            default_stages: default_stages(),
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.default_stages.is_empty() && self.default_mode == DisplayMode::Simplified {
            warnings.push(
                "display.defaultStages is empty; simplified mode will show nothing unless stages are passed"
                    .to_string(),
            );
        }
        warnings
    }
}

// ============================================================================
// CluePathConfig
// ============================================================================

/// File-level configuration.
///
/// # Example YAML
///
/// ```yaml
/// reconstruction:
///   maxPaths: 200
/// display:
///   defaultMode: simplified
///   defaultStages: [recall, expand]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CluePathConfig {
    #[serde(default)]
    pub reconstruction: ReconstructionConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

impl CluePathConfig {
    /// Load from `~/.cluepath/config.yaml`, or defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CluePathError::InvalidConfig`] if the file exists but cannot be parsed.
    pub fn load_default() -> Result<Self, CluePathError> {
        match Self::default_path() {
            Some(path) => Self::from_path(&path),
            None => {
                tracing::debug!("Could not determine home directory, using default config");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CluePathError::InvalidConfig`] if the file cannot be read or parsed.
    /// Returns [`CluePathError::InvalidConfiguration`] if validation fails.
    pub fn from_path(path: &Path) -> Result<Self, CluePathError> {
        if !path.exists() {
            tracing::debug!("Config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            CluePathError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config = Self::from_yaml(&content).map_err(|e| match e {
            CluePathError::Yaml(inner) => {
                CluePathError::InvalidConfig(format!("Failed to parse {}: {}", path.display(), inner))
            }
            other => other,
        })?;

        Ok(config)
    }

    /// Parse and validate YAML text, logging warnings.
    pub fn from_yaml(content: &str) -> Result<Self, CluePathError> {
        // An empty file deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(content)?;

        for warning in config.validate()? {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    /// The default config directory (`~/.cluepath`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CLUEPATH_HOME_DIR))
    }

    /// The default config file path (`~/.cluepath/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        Self::default_dir().map(|d| d.join(CONFIG_FILENAME))
    }

    /// Validate all sections, returning collected warnings.
    pub fn validate(&self) -> Result<Vec<String>, CluePathError> {
        let mut warnings = self.reconstruction.validate()?;
        warnings.extend(self.display.validate());
        Ok(warnings)
    }
}

// ============================================================================
// Tests
// ============================================================================
