//! Container configuration and the builder that validates it.

use crate::container::Container;
use crate::error::{Error, Result};

/// Default bound on nested resolutions within one container on one thread.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Tunables for a [`Container`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContainerConfig {
  /// Fail with `CircularDependency` when an identifier is re-entered while it
  /// is still being constructed.
  pub detect_cycles: bool,
  /// Fail with `DepthExceeded` past this many nested resolutions. `None`
  /// leaves depth bounded only by the stack.
  pub max_depth: Option<usize>,
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      detect_cycles: true,
      max_depth: Some(DEFAULT_MAX_DEPTH),
    }
  }
}

impl ContainerConfig {
  pub(crate) fn validate(&self) -> Result<()> {
    if self.max_depth == Some(0) {
      return Err(Error::InvalidConfig {
        field: "max_depth".to_string(),
        message: "must be at least 1, use None to disable the limit".to_string(),
      });
    }
    Ok(())
  }
}

/// A builder for creating [`Container`] instances.
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
  config: ContainerConfig,
}

impl ContainerBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Starts from an existing configuration, e.g. one deserialized from a file.
  pub fn from_config(config: ContainerConfig) -> Self {
    Self { config }
  }

  /// Enables or disables circular dependency detection.
  pub fn detect_cycles(mut self, enabled: bool) -> Self {
    self.config.detect_cycles = enabled;
    self
  }

  /// Sets the maximum resolution depth.
  pub fn max_depth(mut self, depth: usize) -> Self {
    self.config.max_depth = Some(depth);
    self
  }

  /// Removes the resolution depth limit.
  pub fn unbounded_depth(mut self) -> Self {
    self.config.max_depth = None;
    self
  }

  pub fn build(self) -> Result<Container> {
    self.config.validate()?;
    Ok(Container::with_config(self.config))
  }
}
