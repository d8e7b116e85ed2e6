//! A reusable building block for container-aware components.

use crate::capability::{Capability, CapabilitySet, Component};
use crate::container::{Container, WeakContainer};
use crate::error::{Error, Result};
use crate::instance::Instance;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Holds the container handed to a component and resolves services through it.
///
/// Embed a `ContainerSlot` in a component, compose it into the component's
/// capabilities and forward `set_container` to it:
///
/// ```
/// use fibre_di::{
///   Arguments, CapabilitySet, Component, Constructible, Container, ContainerSlot, Result,
/// };
///
/// #[derive(Default)]
/// struct Controller { slot: ContainerSlot }
///
/// impl Component for Controller {
///   fn capabilities() -> CapabilitySet {
///     CapabilitySet::new().compose::<ContainerSlot>()
///   }
///   fn set_container(&self, container: &Container) {
///     self.slot.set_container(container);
///   }
/// }
///
/// impl Constructible for Controller {
///   fn construct(_: &Arguments) -> Result<Self> {
///     Ok(Controller::default())
///   }
/// }
///
/// let container = Container::new();
/// container.define::<Controller>("Controller");
/// container.register_value("greeting", String::from("hello"));
///
/// let controller = container.get_as::<Controller>("Controller").unwrap();
/// let greeting = controller.slot.resolve_as::<String>("greeting").unwrap();
/// assert_eq!(*greeting, "hello");
/// ```
///
/// Every injection overwrites the previous one, and injecting a different
/// container forgets the singletons remembered from the old one. The slot
/// holds a [`WeakContainer`], so a cached component never keeps its container
/// alive.
#[derive(Default)]
pub struct ContainerSlot {
  container: RwLock<Option<WeakContainer>>,
  resolved: DashMap<String, Instance>,
}

impl ContainerSlot {
  pub fn new() -> Self {
    Self::default()
  }

  /// Whether a container has been injected.
  pub fn is_set(&self) -> bool {
    self.container.read().is_some()
  }

  /// The injected container, if it is still alive.
  pub fn container(&self) -> Result<Container> {
    self
      .container
      .read()
      .as_ref()
      .and_then(WeakContainer::upgrade)
      .ok_or(Error::ContainerDropped)
  }

  /// Resolves `identifier` through the injected container.
  ///
  /// Fails with `Unresolvable` when the container has no registration for
  /// the identifier. Singleton results are remembered by the slot, transient
  /// ones are resolved anew on every call.
  pub fn resolve(&self, identifier: &str) -> Result<Instance> {
    if let Some(instance) = self.resolved.get(identifier).map(|i| i.clone()) {
      return Ok(instance);
    }

    let container = self.container()?;
    if !container.has(identifier) {
      return Err(Error::Unresolvable(identifier.to_owned()));
    }

    let instance = container.get(identifier)?;
    if container.is_singleton(identifier) {
      self
        .resolved
        .insert(identifier.to_owned(), instance.clone());
    }
    Ok(instance)
  }

  /// [`ContainerSlot::resolve`] followed by a downcast to `T`.
  pub fn resolve_as<T: ?Sized + Any + Send + Sync>(&self, identifier: &str) -> Result<Arc<T>> {
    self
      .resolve(identifier)?
      .downcast::<T>()
      .ok_or_else(|| Error::InstanceType {
        identifier: identifier.to_owned(),
        expected: std::any::type_name::<T>(),
      })
  }

  /// Forgets every remembered singleton.
  pub fn forget(&self) {
    self.resolved.clear();
  }
}

impl Component for ContainerSlot {
  fn capabilities() -> CapabilitySet {
    CapabilitySet::new().with(Capability::ContainerAware)
  }

  fn set_container(&self, container: &Container) {
    let handle = container.downgrade();
    let mut current = self.container.write();
    if current.as_ref().is_some_and(|old| !old.same_as(&handle)) {
      self.resolved.clear();
    }
    *current = Some(handle);
  }
}

impl fmt::Debug for ContainerSlot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ContainerSlot")
      .field("container", &*self.container.read())
      .field("resolved", &self.resolved.len())
      .finish()
  }
}
