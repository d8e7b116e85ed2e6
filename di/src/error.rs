use thiserror::Error;

/// The broad category an [`Error`] belongs to.
///
/// Every error is a container error; the two resolution failures that a
/// nullable parameter may absorb have their own kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// Operational misuse or any failure without a more specific kind.
  Container,
  /// A target type could not be constructed.
  UnableToInstantiate,
  /// A required parameter had no way of being resolved.
  UnableToResolveParameter,
}

/// The main error type for the `fibre_di` library.
#[derive(Debug, Clone, Error)]
pub enum Error {
  #[error("Unable to replace [ {0} ] as it hasn't been registered.")]
  NotRegistered(String),

  #[error("Unable to resolve [ {0} ].")]
  Unresolvable(String),

  #[error("Unable to create a [ {identifier} ] instance: {reason}")]
  UnableToInstantiate { identifier: String, reason: String },

  #[error("Unable to resolve the [ ${parameter} ] parameter of [ {declaring} ].")]
  UnableToResolveParameter { parameter: String, declaring: String },

  #[error("Circular dependency detected while resolving [ {identifier} ] (chain: {chain})")]
  CircularDependency { identifier: String, chain: String },

  #[error("Resolution depth limit of {limit} exceeded while resolving [ {identifier} ]")]
  DepthExceeded { identifier: String, limit: usize },

  #[error("Positional argument {index} has no matching parameter in [ {declaring} ]")]
  ArgumentOutOfRange { index: usize, declaring: String },

  #[error("The [ ${parameter} ] argument of [ {declaring} ] is not a {expected}")]
  ArgumentType {
    parameter: String,
    declaring: String,
    expected: &'static str,
  },

  #[error("The instance resolved for [ {identifier} ] is not a {expected}")]
  InstanceType {
    identifier: String,
    expected: &'static str,
  },

  #[error("The container is no longer available")]
  ContainerDropped,

  #[error("Invalid configuration value for '{field}': {message}")]
  InvalidConfig { field: String, message: String },
}

impl Error {
  /// Returns the category of this error.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::UnableToInstantiate { .. } => ErrorKind::UnableToInstantiate,
      Error::UnableToResolveParameter { .. } => ErrorKind::UnableToResolveParameter,
      _ => ErrorKind::Container,
    }
  }

  /// Whether a nullable parameter may resolve to "no value" instead of
  /// propagating this error.
  pub(crate) fn is_absorbed_by_nullable(&self) -> bool {
    self.kind() != ErrorKind::Container
  }

  pub(crate) fn instantiate(identifier: &str, reason: impl Into<String>) -> Self {
    Error::UnableToInstantiate {
      identifier: identifier.to_owned(),
      reason: reason.into(),
    }
  }

  pub(crate) fn unresolved(parameter: &str, declaring: &str) -> Self {
    Error::UnableToResolveParameter {
      parameter: parameter.to_owned(),
      declaring: declaring.to_owned(),
    }
  }
}

/// A specialized `Result` type for `fibre_di` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
