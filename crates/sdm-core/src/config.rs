//! Workspace configuration
//!
//! Loaded from TOML; every field has a default so a partial file is valid.
//!
//! ```toml
//! shape_sources = ["https://shapes.example/registry.ttl"]
//! shape_cache_capacity = 256
//! shape_cache_ttl_secs = 3600
//! instance_cache_capacity = 512
//! include_expired = false
//! attach_validity = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sdm_lifecycle::{ListOptions, SaveOptions};
use sdm_shapes::ShapeTextCache;

/// Configuration errors; all of them indicate a setup defect
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("config file {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered
    #[error("config serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Value out of range
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Workspace settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Shape document URLs (or file paths) to discover descriptors from
    pub shape_sources: Vec<String>,
    /// Maximum cached shape documents
    pub shape_cache_capacity: u64,
    /// Shape document time-to-live; unset keeps documents until reset
    pub shape_cache_ttl_secs: Option<u64>,
    /// Maximum cached instance snapshots
    pub instance_cache_capacity: usize,
    /// Whether listings show retired resources
    pub include_expired: bool,
    /// Whether saves attach a validity interval to new resources
    pub attach_validity: bool,
}

impl WorkspaceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape source
    #[inline]
    #[must_use]
    pub fn with_shape_source(mut self, source: impl Into<String>) -> Self {
        self.shape_sources.push(source.into());
        self
    }

    /// Replace the shape sources
    #[must_use]
    pub fn with_shape_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shape_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// With shape cache capacity and time-to-live
    #[inline]
    #[must_use]
    pub fn with_shape_cache(mut self, capacity: u64, ttl: Option<Duration>) -> Self {
        self.shape_cache_capacity = capacity;
        self.shape_cache_ttl_secs = ttl.map(|t| t.as_secs());
        self
    }

    /// With instance cache capacity
    #[inline]
    #[must_use]
    pub fn with_instance_cache_capacity(mut self, capacity: usize) -> Self {
        self.instance_cache_capacity = capacity;
        self
    }

    /// With retired resources listed
    #[inline]
    #[must_use]
    pub fn with_include_expired(mut self, include: bool) -> Self {
        self.include_expired = include;
        self
    }

    /// With validity attached on save
    #[inline]
    #[must_use]
    pub fn with_attach_validity(mut self, attach: bool) -> Self {
        self.attach_validity = attach;
        self
    }

    /// Reject out-of-range values
    ///
    /// # Errors
    /// - `ConfigError::Invalid` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shape_cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "shape_cache_capacity",
                reason: "must be at least 1".into(),
            });
        }
        if self.shape_cache_ttl_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "shape_cache_ttl_secs",
                reason: "must be positive when set".into(),
            });
        }
        if let Some(blank) = self.shape_sources.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "shape_sources",
                reason: format!("entry {blank} is blank"),
            });
        }
        Ok(())
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML or unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// - `ConfigError::Serialize` if rendering fails
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` / `ConfigError::Invalid` for bad contents
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Listing options implied by this configuration
    #[must_use]
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            include_expired: self.include_expired,
        }
    }

    /// Save options implied by this configuration
    #[must_use]
    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            attach_validity: self.attach_validity,
            ..SaveOptions::default()
        }
    }

    /// Shape text cache sized by this configuration
    #[must_use]
    pub fn shape_cache(&self) -> ShapeTextCache {
        match self.shape_cache_ttl_secs {
            Some(secs) => {
                ShapeTextCache::with_ttl(self.shape_cache_capacity, Duration::from_secs(secs))
            }
            None => ShapeTextCache::new(self.shape_cache_capacity),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            shape_sources: Vec::new(),
            shape_cache_capacity: 256,
            shape_cache_ttl_secs: None,
            instance_cache_capacity: 512,
            include_expired: false,
            attach_validity: false,
        }
    }
}
