//! Core registry data structures and the resolution guard.

use crate::container::Container;
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::parameters::Parameters;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

thread_local! {
  // The identifiers currently being constructed on this thread, outermost
  // first, tagged with the container they belong to.
  static RESOLVING_STACK: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// An RAII guard that detects circular dependencies and bounds resolution depth.
///
/// Entering pushes the identifier onto the thread-local resolution stack and
/// fails if it is already there. Dropping the guard pops it again.
pub(crate) struct ResolutionGuard {
  container_id: usize,
  identifier: String,
}

impl ResolutionGuard {
  pub(crate) fn enter(
    container_id: usize,
    identifier: &str,
    detect_cycles: bool,
    max_depth: Option<usize>,
  ) -> Result<Self> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      let depth = stack.iter().filter(|(id, _)| *id == container_id).count();

      if detect_cycles
        && stack
          .iter()
          .any(|(id, key)| *id == container_id && key == identifier)
      {
        let chain = stack
          .iter()
          .filter(|(id, _)| *id == container_id)
          .map(|(_, key)| key.as_str())
          .chain(std::iter::once(identifier))
          .collect::<Vec<_>>()
          .join(" -> ");
        return Err(Error::CircularDependency {
          identifier: identifier.to_owned(),
          chain,
        });
      }

      if let Some(limit) = max_depth {
        if depth >= limit {
          return Err(Error::DepthExceeded {
            identifier: identifier.to_owned(),
            limit,
          });
        }
      }

      stack.push((container_id, identifier.to_owned()));
      Ok(())
    })?;

    Ok(Self {
      container_id,
      identifier: identifier.to_owned(),
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(position) = stack
        .iter()
        .rposition(|(id, key)| *id == self.container_id && *key == self.identifier)
      {
        stack.remove(position);
      }
    });
  }
}

/// The key a binding is registered under: a bare identifier, or a canonical
/// identifier together with an alias for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
  Bare(String),
  Aliased { canonical: String, alias: String },
}

impl Hint {
  pub fn canonical(&self) -> &str {
    match self {
      Hint::Bare(canonical) | Hint::Aliased { canonical, .. } => canonical,
    }
  }
}

impl From<&str> for Hint {
  fn from(identifier: &str) -> Self {
    Hint::Bare(identifier.to_owned())
  }
}

impl From<String> for Hint {
  fn from(identifier: String) -> Self {
    Hint::Bare(identifier)
  }
}

impl From<(&str, &str)> for Hint {
  fn from((canonical, alias): (&str, &str)) -> Self {
    Hint::Aliased {
      canonical: canonical.to_owned(),
      alias: alias.to_owned(),
    }
  }
}

impl From<[&str; 2]> for Hint {
  fn from([canonical, alias]: [&str; 2]) -> Self {
    (canonical, alias).into()
  }
}

type FactoryFn = Arc<dyn Fn(&Container, &Parameters) -> Result<Instance> + Send + Sync>;

/// What a hint resolves to: a concrete type identifier built from its
/// blueprint, or a factory closure.
#[derive(Clone)]
pub enum Target {
  Type(String),
  Factory(FactoryFn),
}

impl Target {
  /// A factory closure. It receives the container followed by the
  /// caller-supplied parameters.
  ///
  /// Components must be returned through [`Instance::component`] (or
  /// `component_arc`/`component_as`) to keep their capabilities. A component
  /// wrapped with [`Instance::new`] is never handed the container.
  pub fn factory<F>(factory: F) -> Self
  where
    F: Fn(&Container, &Parameters) -> Result<Instance> + Send + Sync + 'static,
  {
    Target::Factory(Arc::new(factory))
  }
}

impl From<&str> for Target {
  fn from(identifier: &str) -> Self {
    Target::Type(identifier.to_owned())
  }
}

impl From<String> for Target {
  fn from(identifier: String) -> Self {
    Target::Type(identifier)
  }
}

impl fmt::Debug for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Target::Type(identifier) => write!(f, "Type({})", identifier),
      Target::Factory(_) => write!(f, "Factory(..)"),
    }
  }
}

/// A registered hint.
#[derive(Debug, Clone)]
pub(crate) struct HintEntry {
  pub(crate) target: Target,
  pub(crate) singleton: bool,
}

pub(crate) type Listener = Arc<dyn Fn(&Instance) + Send + Sync>;

/// Replace listeners for one identifier, in registration order. Named
/// listeners keep their position when re-registered.
#[derive(Default, Clone)]
pub(crate) struct Listeners {
  entries: Vec<(Option<String>, Listener)>,
}

impl Listeners {
  pub(crate) fn add(&mut self, name: Option<String>, listener: Listener) {
    if let Some(name) = &name {
      if let Some(entry) = self
        .entries
        .iter_mut()
        .find(|(n, _)| n.as_deref() == Some(name.as_str()))
      {
        entry.1 = listener;
        return;
      }
    }
    self.entries.push((name, listener));
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }

  pub(crate) fn iter(&self) -> impl Iterator<Item = &Listener> {
    self.entries.iter().map(|(_, l)| l)
  }
}
