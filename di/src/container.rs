//! The main `Container` struct and its associated methods.

use crate::blueprint::{Blueprint, Callable, Constructible};
use crate::config::{ContainerBuilder, ContainerConfig};
use crate::core::{Hint, HintEntry, Listeners, ResolutionGuard, Target};
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::parameters::{merge, Arguments, Parameter, ParameterKey, Parameters, Slot};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

static NEXT_CONTAINER_ID: AtomicUsize = AtomicUsize::new(0);

struct Registry {
  id: usize,
  config: ContainerConfig,
  hints: DashMap<String, HintEntry>,
  aliases: DashMap<String, String>,
  instances: DashMap<String, Instance>,
  replacers: RwLock<HashMap<String, Listeners>>,
  // consumer -> (dependency -> override)
  dependencies: DashMap<String, HashMap<String, String>>,
  blueprints: DashMap<String, Arc<Blueprint>>,
}

/// The Inversion of Control (IoC) container.
///
/// A `Container` is a cheap, clonable handle; every clone shares the same
/// registry. It is thread-safe, and no internal lock is held while
/// constructors, factories or replace listeners run, so those may freely call
/// back into the container.
#[derive(Clone)]
pub struct Container {
  inner: Arc<Registry>,
}

/// A non-owning handle to a [`Container`].
///
/// Components cached by the container should keep this rather than a
/// `Container`, otherwise the registry and the component keep each other
/// alive.
#[derive(Clone)]
pub struct WeakContainer {
  inner: Weak<Registry>,
}

impl WeakContainer {
  /// Returns the container if it is still alive.
  pub fn upgrade(&self) -> Option<Container> {
    self.inner.upgrade().map(|inner| Container { inner })
  }

  pub(crate) fn same_as(&self, other: &WeakContainer) -> bool {
    Weak::ptr_eq(&self.inner, &other.inner)
  }
}

impl fmt::Debug for WeakContainer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WeakContainer")
      .field("alive", &(self.inner.strong_count() > 0))
      .finish()
  }
}

impl Default for Container {
  fn default() -> Self {
    Self::with_config(ContainerConfig::default())
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("id", &self.inner.id)
      .field("hints", &self.inner.hints.len())
      .field("aliases", &self.inner.aliases.len())
      .field("instances", &self.inner.instances.len())
      .field("blueprints", &self.inner.blueprints.len())
      .finish_non_exhaustive()
  }
}

impl Container {
  /// Creates a new, empty `Container` with the default configuration.
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns a builder for a container with a custom configuration.
  pub fn builder() -> ContainerBuilder {
    ContainerBuilder::new()
  }

  pub(crate) fn with_config(config: ContainerConfig) -> Self {
    Self {
      inner: Arc::new(Registry {
        id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
        config,
        hints: DashMap::new(),
        aliases: DashMap::new(),
        instances: DashMap::new(),
        replacers: RwLock::new(HashMap::new()),
        dependencies: DashMap::new(),
        blueprints: DashMap::new(),
      }),
    }
  }

  /// The configuration this container was built with.
  pub fn config(&self) -> &ContainerConfig {
    &self.inner.config
  }

  /// Returns a non-owning handle to this container.
  pub fn downgrade(&self) -> WeakContainer {
    WeakContainer {
      inner: Arc::downgrade(&self.inner),
    }
  }

  /// Whether both handles refer to the same registry.
  pub fn same_as(&self, other: &Container) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }

  // --- PRIVATE HELPERS ---

  fn resolve_alias(&self, identifier: &str) -> String {
    self
      .inner
      .aliases
      .get(identifier)
      .map(|canonical| canonical.clone())
      .unwrap_or_else(|| identifier.to_owned())
  }

  fn resolve_hint(&self, identifier: &str) -> Target {
    self
      .inner
      .hints
      .get(identifier)
      .map(|entry| entry.target.clone())
      .unwrap_or_else(|| Target::Type(identifier.to_owned()))
  }

  fn resolve_contextual_dependency(&self, consumer: &str, dependency: &str) -> String {
    self
      .inner
      .dependencies
      .get(consumer)
      .and_then(|overrides| overrides.get(dependency).cloned())
      .unwrap_or_else(|| dependency.to_owned())
  }

  // Records the alias, if any, and returns the canonical identifier.
  fn parse_hint(&self, hint: Hint) -> String {
    match hint {
      Hint::Bare(canonical) => canonical,
      Hint::Aliased { canonical, alias } => {
        trace!(alias = %alias, canonical = %canonical, "Registering alias");
        self.inner.aliases.insert(alias, canonical.clone());
        canonical
      }
    }
  }

  fn is_singleton_hint(&self, identifier: &str) -> bool {
    self
      .inner
      .hints
      .get(identifier)
      .is_some_and(|entry| entry.singleton)
  }

  fn construct(&self, identifier: &str, parameters: &Parameters) -> Result<Instance> {
    let blueprint = self
      .inner
      .blueprints
      .get(identifier)
      .map(|b| Arc::clone(b.value()))
      .ok_or_else(|| Error::instantiate(identifier, "no blueprint is defined for it"))?;

    if !blueprint.is_instantiable() {
      return Err(Error::instantiate(
        blueprint.identifier(),
        "the type is not instantiable",
      ));
    }

    let args = self.resolve_parameters(
      blueprint.parameters(),
      parameters,
      blueprint.constructor_name(),
      Some(blueprint.identifier()),
    )?;
    blueprint.instantiate(&args)
  }

  fn resolve_parameters(
    &self,
    declared: &[Parameter],
    provided: &Parameters,
    declaring: &str,
    consumer: Option<&str>,
  ) -> Result<Arguments> {
    let mut args = Arguments::new(declaring);

    // Nothing declared: hand the caller's values through in order.
    if declared.is_empty() {
      for (key, value) in provided.iter() {
        let name = match key {
          ParameterKey::Name(name) => Some(name.clone()),
          ParameterKey::Position(_) => None,
        };
        args.push(name, Some(value.clone()));
      }
      return Ok(args);
    }

    for slot in merge(declared, provided, declaring)? {
      match slot {
        Slot::Supplied(name, value) => args.push(Some(name), Some(value)),
        Slot::Declared(parameter) => {
          let value = self.resolve_parameter(&parameter, declaring, consumer)?;
          args.push(Some(parameter.name), value);
        }
      }
    }

    Ok(args)
  }

  fn resolve_parameter(
    &self,
    parameter: &Parameter,
    declaring: &str,
    consumer: Option<&str>,
  ) -> Result<Option<Instance>> {
    if let Some(hint) = parameter.type_hint() {
      let identifier = match consumer {
        Some(consumer) => self.resolve_contextual_dependency(consumer, hint),
        None => hint.to_owned(),
      };

      return match self.get(&identifier) {
        Ok(instance) => Ok(Some(instance)),
        Err(err) if parameter.is_nullable() && err.is_absorbed_by_nullable() => {
          trace!(
            parameter = parameter.name(),
            declaring,
            error = %err,
            "Nullable parameter resolved to no value"
          );
          Ok(None)
        }
        Err(err) => Err(err),
      };
    }

    if let Some(default) = &parameter.default {
      return Ok(Some(default.clone()));
    }

    if parameter.is_nullable() {
      return Ok(None);
    }

    Err(Error::unresolved(parameter.name(), declaring))
  }

  // Re-resolves the identifier and hands it to every replace listener.
  fn replace_instances(&self, identifier: &str) -> Result<()> {
    let listeners = match self.inner.replacers.read().get(identifier) {
      Some(listeners) if !listeners.is_empty() => listeners.clone(),
      _ => return Ok(()),
    };

    let instance = self.get(identifier)?;
    debug!(
      identifier,
      listeners = listeners.len(),
      "Notifying replace listeners"
    );
    for listener in listeners.iter() {
      listener(&instance);
    }
    Ok(())
  }

  // --- PUBLIC API ---

  // --- Type Definitions ---

  /// Defines how the type identifier `identifier` is constructed, using the
  /// parameter table of `T`.
  pub fn define<T: Constructible>(&self, identifier: &str) {
    self.define_blueprint(Blueprint::of::<T>(identifier));
  }

  /// Like [`Container::define`], handing instances out as `I`.
  pub fn define_as<T, I>(&self, identifier: &str, cast: fn(Arc<T>) -> Arc<I>)
  where
    T: Constructible,
    I: ?Sized + Any + Send + Sync,
  {
    self.define_blueprint(Blueprint::of_as::<T, I>(identifier, cast));
  }

  /// Stores a hand-written construction recipe.
  pub fn define_blueprint(&self, blueprint: Blueprint) {
    trace!(
      identifier = blueprint.identifier(),
      instantiable = blueprint.is_instantiable(),
      "Defining blueprint"
    );
    self
      .inner
      .blueprints
      .insert(blueprint.identifier().to_owned(), Arc::new(blueprint));
  }

  /// Declares a type identifier that exists but cannot be constructed.
  pub fn define_abstract(&self, identifier: &str) {
    self.define_blueprint(Blueprint::abstract_type(identifier));
  }

  // --- Registration ---

  /// Registers a type hint. The last registration for a hint wins.
  ///
  /// `hint` is either a bare identifier or a `(canonical, alias)` pair, in
  /// which case the alias is recorded too.
  pub fn register(&self, hint: impl Into<Hint>, target: impl Into<Target>, singleton: bool) {
    let hint = self.parse_hint(hint.into());
    let target = target.into();
    debug!(hint = %hint, target = ?target, singleton, "Registering hint");
    self.inner.hints.insert(hint, HintEntry { target, singleton });
  }

  /// Registers a type hint whose resolved instance is cached and reused.
  pub fn register_singleton(&self, hint: impl Into<Hint>, target: impl Into<Target>) {
    self.register(hint, target, true);
  }

  /// Places a ready-made instance straight into the singleton cache.
  pub fn register_instance(&self, hint: impl Into<Hint>, instance: Instance) {
    let hint = self.parse_hint(hint.into());
    debug!(hint = %hint, instance = instance.type_name(), "Registering instance");
    self.inner.instances.insert(hint, instance);
  }

  /// Convenience for [`Container::register_instance`] with a plain value.
  pub fn register_value<T: Any + Send + Sync>(&self, hint: impl Into<Hint>, value: T) {
    self.register_instance(hint, Instance::new(value));
  }

  /// Makes `consumer` receive `implementation` wherever its constructor asks
  /// for `dependency`.
  pub fn register_contextual_dependency(
    &self,
    consumer: &str,
    dependency: &str,
    implementation: &str,
  ) {
    debug!(consumer, dependency, implementation, "Registering contextual dependency");
    self
      .inner
      .dependencies
      .entry(consumer.to_owned())
      .or_default()
      .insert(dependency.to_owned(), implementation.to_owned());
  }

  /// Registers a listener invoked with the freshly resolved instance whenever
  /// `hint`'s binding or cached instance is replaced.
  ///
  /// Listeners run in registration order. A listener registered under an
  /// `event_name` that is already in use replaces the earlier one.
  pub fn on_replace<F>(&self, hint: &str, listener: F, event_name: Option<&str>)
  where
    F: Fn(&Instance) + Send + Sync + 'static,
  {
    let hint = self.resolve_alias(hint);
    trace!(hint = %hint, event_name, "Registering replace listener");
    self
      .inner
      .replacers
      .write()
      .entry(hint)
      .or_default()
      .add(event_name.map(str::to_owned), Arc::new(listener));
  }

  // --- Queries ---

  /// Whether a hint or a cached instance exists for `identifier`.
  pub fn has(&self, identifier: &str) -> bool {
    let identifier = self.resolve_alias(identifier);
    self.inner.hints.contains_key(&identifier) || self.inner.instances.contains_key(&identifier)
  }

  /// Whether `identifier` has a cached instance or a singleton hint.
  pub fn is_singleton(&self, identifier: &str) -> bool {
    let identifier = self.resolve_alias(identifier);
    self.inner.instances.contains_key(&identifier) || self.is_singleton_hint(&identifier)
  }

  // --- Resolution ---

  /// Resolves `identifier`, reusing a cached instance when there is one.
  pub fn get(&self, identifier: &str) -> Result<Instance> {
    self.resolve(identifier, &Parameters::new(), true)
  }

  /// Resolves `identifier` with caller-supplied constructor parameters.
  pub fn get_with(&self, identifier: &str, parameters: &Parameters) -> Result<Instance> {
    self.resolve(identifier, parameters, true)
  }

  /// Always constructs a new instance, never reading or writing the
  /// singleton cache.
  pub fn get_fresh(&self, identifier: &str, parameters: &Parameters) -> Result<Instance> {
    self.resolve(identifier, parameters, false)
  }

  /// Resolves `identifier` and downcasts it to `T`.
  pub fn get_as<T: ?Sized + Any + Send + Sync>(&self, identifier: &str) -> Result<Arc<T>> {
    let instance = self.get(identifier)?;
    downcast_instance(identifier, &instance)
  }

  /// Like [`Container::get_fresh`], downcasting the new instance to `T`.
  pub fn get_fresh_as<T: ?Sized + Any + Send + Sync>(
    &self,
    identifier: &str,
    parameters: &Parameters,
  ) -> Result<Arc<T>> {
    let instance = self.get_fresh(identifier, parameters)?;
    downcast_instance(identifier, &instance)
  }

  /// The full resolution routine behind `get`, `get_with` and `get_fresh`.
  ///
  /// The identifier is alias-resolved first. With `reuse_instance`, a cached
  /// instance is returned unchanged and a freshly built singleton is cached.
  /// Identifiers without a hint are built directly from their blueprint.
  pub fn resolve(
    &self,
    identifier: &str,
    parameters: &Parameters,
    reuse_instance: bool,
  ) -> Result<Instance> {
    let identifier = self.resolve_alias(identifier);

    if reuse_instance {
      if let Some(instance) = self.inner.instances.get(&identifier).map(|i| i.clone()) {
        trace!(identifier = %identifier, "Returning cached instance");
        return Ok(instance);
      }
    }

    // Held until construction finishes; pops the stack on every return path.
    let _guard = ResolutionGuard::enter(
      self.inner.id,
      &identifier,
      self.inner.config.detect_cycles,
      self.inner.config.max_depth,
    )?;

    trace!(identifier = %identifier, reuse_instance, "Resolving");
    let instance = self.factory(self.resolve_hint(&identifier), parameters)?;

    if reuse_instance && self.is_singleton_hint(&identifier) {
      // A concurrent resolution may have won the race; everyone gets its instance.
      let cached = self
        .inner
        .instances
        .entry(identifier)
        .or_insert(instance)
        .clone();
      return Ok(cached);
    }

    Ok(instance)
  }

  /// Builds an instance from `target`.
  ///
  /// A factory closure is called with the container and `parameters`; a type
  /// identifier is built from its blueprint with every constructor parameter
  /// resolved. Container-aware instances then receive the container.
  pub fn factory(&self, target: impl Into<Target>, parameters: &Parameters) -> Result<Instance> {
    let instance = match target.into() {
      Target::Factory(factory) => factory(self, parameters)?,
      Target::Type(identifier) => self.construct(&identifier, parameters)?,
    };

    if instance.is_container_aware() {
      trace!(instance = instance.type_name(), "Injecting container");
      instance.inject_container(self);
    }

    Ok(instance)
  }

  /// Invokes `callable` with its parameters resolved through the container.
  ///
  /// Caller-supplied values win; contextual dependencies are not consulted.
  pub fn call<R>(&self, callable: &Callable<R>, parameters: &Parameters) -> Result<R> {
    let args = self.resolve_parameters(callable.parameters(), parameters, callable.name(), None)?;
    trace!(callable = callable.name(), arguments = args.len(), "Calling");
    callable.invoke(&args)
  }

  // --- Replacement ---

  /// Replaces the target of a registered hint and notifies its listeners.
  ///
  /// With `singleton`, any cached instance is evicted first so that the
  /// listeners, and every later `get`, see an instance of the new target.
  pub fn replace(&self, hint: &str, target: impl Into<Target>, singleton: bool) -> Result<()> {
    let hint = self.resolve_alias(hint);

    match self.inner.hints.get_mut(&hint) {
      Some(mut entry) => entry.target = target.into(),
      None => return Err(Error::NotRegistered(hint)),
    }

    if singleton {
      self.inner.instances.remove(&hint);
    }

    debug!(hint = %hint, singleton, "Replaced hint");
    self.replace_instances(&hint)
  }

  /// [`Container::replace`] with eviction of the cached instance.
  pub fn replace_singleton(&self, hint: &str, target: impl Into<Target>) -> Result<()> {
    self.replace(hint, target, true)
  }

  /// Overwrites an already cached instance and notifies the listeners.
  pub fn replace_instance(&self, hint: &str, instance: Instance) -> Result<()> {
    let hint = self.resolve_alias(hint);

    match self.inner.instances.get_mut(&hint) {
      Some(mut cached) => *cached = instance,
      None => return Err(Error::NotRegistered(hint)),
    }

    debug!(hint = %hint, "Replaced instance");
    self.replace_instances(&hint)
  }
}

fn downcast_instance<T: ?Sized + Any + Send + Sync>(
  identifier: &str,
  instance: &Instance,
) -> Result<Arc<T>> {
  instance.downcast::<T>().ok_or_else(|| Error::InstanceType {
    identifier: identifier.to_owned(),
    expected: std::any::type_name::<T>(),
  })
}
