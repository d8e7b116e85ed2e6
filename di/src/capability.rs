//! Capability declarations and the inspector that decides whether a
//! constructed component wants the container handed to it.
//!
//! A type declares its capabilities statically through [`Component::capabilities`].
//! Capabilities may be declared directly or pulled in by composing other
//! components (for example a [`ContainerSlot`](crate::ContainerSlot) field),
//! and composition may nest to any depth. The inspector walks that closure
//! once per type and remembers the answer.

use crate::container::Container;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::collections::HashSet;

// Inspector verdicts, keyed by the component type they were computed for.
static CONTAINER_AWARE_TYPES: Lazy<DashMap<TypeId, bool>> = Lazy::new(DashMap::new);

/// A single capability a component can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
  /// The component receives the container through
  /// [`Component::set_container`] right after construction.
  ContainerAware,
  /// An application-defined marker.
  Custom(&'static str),
}

#[derive(Clone, Copy)]
struct Composed {
  type_id: TypeId,
  type_name: &'static str,
  capabilities: fn() -> CapabilitySet,
}

/// The capabilities a component declares, directly and through the
/// components it is composed of.
#[derive(Clone, Default)]
pub struct CapabilitySet {
  declared: Vec<Capability>,
  composed: Vec<Composed>,
}

impl CapabilitySet {
  /// An empty set.
  pub const fn empty() -> Self {
    Self {
      declared: Vec::new(),
      composed: Vec::new(),
    }
  }

  /// Alias for [`CapabilitySet::empty`], reads better at the start of a chain.
  pub const fn new() -> Self {
    Self::empty()
  }

  /// Declares `capability` directly.
  pub fn with(mut self, capability: Capability) -> Self {
    if !self.declared.contains(&capability) {
      self.declared.push(capability);
    }
    self
  }

  /// Composes the component `U`, inheriting everything it declares.
  pub fn compose<U: Component>(mut self) -> Self {
    let type_id = TypeId::of::<U>();
    if !self.composed.iter().any(|c| c.type_id == type_id) {
      self.composed.push(Composed {
        type_id,
        type_name: std::any::type_name::<U>(),
        capabilities: U::capabilities,
      });
    }
    self
  }

  /// Capabilities declared directly on this set, ignoring composition.
  pub fn declared(&self) -> &[Capability] {
    &self.declared
  }

  /// Names of the components composed directly into this set.
  pub fn composed(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.composed.iter().map(|c| c.type_name)
  }

  /// Walks the full composition closure and returns every capability found.
  ///
  /// Each composed component is visited once, so composition cycles terminate.
  pub fn closure(&self) -> Vec<Capability> {
    let mut found: Vec<Capability> = Vec::new();
    let mut visited: HashSet<TypeId> = HashSet::new();
    let mut pending: Vec<CapabilitySet> = vec![self.clone()];

    while let Some(set) = pending.pop() {
      for capability in set.declared {
        if !found.contains(&capability) {
          found.push(capability);
        }
      }
      for unit in set.composed {
        if visited.insert(unit.type_id) {
          pending.push((unit.capabilities)());
        }
      }
    }

    found
  }

  /// Whether `capability` is declared anywhere in the closure.
  pub fn contains(&self, capability: Capability) -> bool {
    self.closure().contains(&capability)
  }
}

impl std::fmt::Debug for CapabilitySet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CapabilitySet")
      .field("declared", &self.declared)
      .field("composed", &self.composed().collect::<Vec<_>>())
      .finish()
  }
}

/// A value the container can construct and hand out with its capabilities
/// attached.
///
/// Only components declaring [`Capability::ContainerAware`] have
/// `set_container` invoked; the default implementation ignores the call.
pub trait Component: Any + Send + Sync {
  /// The capabilities this type declares.
  fn capabilities() -> CapabilitySet
  where
    Self: Sized,
  {
    CapabilitySet::empty()
  }

  /// Receives the container after construction.
  fn set_container(&self, _container: &Container) {}
}

/// Returns true if the set declares the container-aware capability anywhere
/// in its composition closure.
pub fn is_container_aware(capabilities: &CapabilitySet) -> bool {
  capabilities.contains(Capability::ContainerAware)
}

/// Type-level form of [`is_container_aware`], computed once per type.
pub fn component_is_container_aware<T: Component>() -> bool {
  let type_id = TypeId::of::<T>();
  if let Some(verdict) = CONTAINER_AWARE_TYPES.get(&type_id) {
    return *verdict;
  }
  let verdict = is_container_aware(&T::capabilities());
  CONTAINER_AWARE_TYPES.insert(type_id, verdict);
  verdict
}
