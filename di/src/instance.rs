//! The type-erased handle every resolution produces.

use crate::capability::{component_is_container_aware, CapabilitySet, Component};
use crate::container::Container;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Injector = Arc<dyn Fn(&Container) + Send + Sync>;

#[derive(Clone)]
struct ComponentHooks {
  container_aware: bool,
  capabilities: fn() -> CapabilitySet,
  inject: Injector,
}

impl ComponentHooks {
  fn of<T: Component>(component: &Arc<T>) -> Self {
    let component = Arc::clone(component);
    Self {
      container_aware: component_is_container_aware::<T>(),
      capabilities: T::capabilities,
      inject: Arc::new(move |container: &Container| component.set_container(container)),
    }
  }
}

/// A shared, type-erased handle to a value produced by the container.
///
/// Cloning is cheap and every clone points at the same value, so singleton
/// identity can be checked with [`Instance::ptr_eq`]. The value is stored as
/// an `Arc<T>` internally, which lets trait objects (`Arc<dyn Trait>`) be
/// handed out as well as concrete types.
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
  hooks: Option<ComponentHooks>,
}

impl Instance {
  /// Wraps a plain value. The value declares no capabilities.
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  /// Wraps an already shared value, possibly a trait object.
  pub fn from_arc<T: ?Sized + Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      value: Arc::new(value),
      type_name: std::any::type_name::<T>(),
      hooks: None,
    }
  }

  /// Wraps a [`Component`], keeping its capabilities and its
  /// `set_container` hook available to the container.
  pub fn component<T: Component>(value: T) -> Self {
    Self::component_arc(Arc::new(value))
  }

  /// Like [`Instance::component`] for a value that is already shared.
  pub fn component_arc<T: Component>(value: Arc<T>) -> Self {
    let hooks = ComponentHooks::of(&value);
    Self {
      hooks: Some(hooks),
      ..Self::from_arc(value)
    }
  }

  /// Wraps a [`Component`] but hands it out as `I`, usually a trait object
  /// the component implements. Capabilities and the container hook still
  /// come from `T`.
  pub fn component_as<T, I, F>(value: Arc<T>, cast: F) -> Self
  where
    T: Component,
    I: ?Sized + Any + Send + Sync,
    F: FnOnce(Arc<T>) -> Arc<I>,
  {
    let hooks = ComponentHooks::of(&value);
    Self {
      hooks: Some(hooks),
      ..Self::from_arc(cast(value))
    }
  }

  /// Returns the value as `Arc<T>` if it was stored as a `T`.
  pub fn downcast<T: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.value.downcast_ref::<Arc<T>>().cloned()
  }

  /// Whether the value was stored as a `T`.
  pub fn is<T: ?Sized + Any + Send + Sync>(&self) -> bool {
    self.value.is::<Arc<T>>()
  }

  /// Whether both handles point at the same value.
  pub fn ptr_eq(&self, other: &Instance) -> bool {
    Arc::ptr_eq(&self.value, &other.value)
  }

  /// The name of the stored type, for diagnostics.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  /// The capabilities the stored value declares.
  pub fn capabilities(&self) -> CapabilitySet {
    match &self.hooks {
      Some(hooks) => (hooks.capabilities)(),
      None => CapabilitySet::empty(),
    }
  }

  /// Whether the stored value wants the container injected after construction.
  pub fn is_container_aware(&self) -> bool {
    self.hooks.as_ref().is_some_and(|h| h.container_aware)
  }

  pub(crate) fn inject_container(&self, container: &Container) {
    if let Some(hooks) = &self.hooks {
      (hooks.inject)(container);
    }
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Instance")
      .field("type", &self.type_name)
      .field("container_aware", &self.is_container_aware())
      .finish()
  }
}
