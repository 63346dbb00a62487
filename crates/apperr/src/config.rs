//! Process-wide stack capture settings.
//!
//! Every capture reads the current [`StackConfig`]; changing it only
//! affects errors wrapped afterwards. Callers that want to bypass the
//! global state pass a config explicitly to [`crate::Error::wrap_with`].

use std::fs;
use std::path::Path;

use parking_lot::RwLock;
use serde::Deserialize;

use crate::{Fault, Result};

/// Default maximum number of captured frames.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 32;

/// Upper bound accepted for `max_depth`.
pub const MAX_STACK_DEPTH_LIMIT: usize = 256;

static CURRENT: RwLock<StackConfig> = RwLock::new(StackConfig::DEFAULT);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    /// Frames beyond this depth are dropped.
    #[serde(default = "StackConfig::default_max_depth")]
    pub max_depth: usize,
    /// Capture a stack in `Error::new` / `Error::without_body` as well.
    #[serde(default)]
    pub capture_on_new: bool,
}

impl StackConfig {
    pub const DEFAULT: StackConfig = StackConfig {
        max_depth: DEFAULT_MAX_STACK_DEPTH,
        capture_on_new: false,
    };

    fn default_max_depth() -> usize {
        DEFAULT_MAX_STACK_DEPTH
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_capture_on_new(mut self, capture_on_new: bool) -> Self {
        self.capture_on_new = capture_on_new;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 || self.max_depth > MAX_STACK_DEPTH_LIMIT {
            return Err(Fault::invalid_config(format!(
                "max_depth must be within 1..={}",
                MAX_STACK_DEPTH_LIMIT
            ))
            .with_operation("config::validate")
            .with_context("max_depth", self.max_depth.to_string()));
        }
        Ok(())
    }

    /// Parse and validate a config from TOML text.
    ///
    /// ```toml
    /// max_depth = 64
    /// capture_on_new = true
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: StackConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|err| Fault::from(err).with_context("path", path.display().to_string()))?;
        Self::from_toml_str(&text)
            .map_err(|fault| fault.with_context("path", path.display().to_string()))
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Snapshot of the process-wide config.
pub fn current() -> StackConfig {
    *CURRENT.read()
}

/// Replace the process-wide config after validating it.
pub fn set(config: StackConfig) -> Result<()> {
    config
        .validate()
        .map_err(|fault| fault.with_operation("config::set"))?;
    *CURRENT.write() = config;
    tracing::debug!(
        max_depth = config.max_depth,
        capture_on_new = config.capture_on_new,
        "apperr stack config updated"
    );
    Ok(())
}

/// Restore the default config.
pub fn reset() {
    *CURRENT.write() = StackConfig::DEFAULT;
    tracing::debug!("apperr stack config reset");
}

pub fn max_stack_depth() -> usize {
    CURRENT.read().max_depth
}

pub fn set_max_stack_depth(max_depth: usize) -> Result<()> {
    set(current().with_max_depth(max_depth))
}
