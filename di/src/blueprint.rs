//! Construction recipes for concrete types and descriptors for callables.
//!
//! These tables stand in for runtime signature inspection: every type the
//! container builds by itself, and every function it invokes, declares its
//! parameters up front.

use crate::capability::Component;
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::parameters::{Arguments, Parameter};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type the container can build from resolved arguments.
///
/// # Examples
///
/// ```
/// use fibre_di::{Arguments, Component, Constructible, Container, Parameter, Result};
/// use std::sync::Arc;
///
/// struct Config { dsn: String }
/// impl Component for Config {}
/// impl Constructible for Config {
///   fn parameters() -> Vec<Parameter> {
///     vec![Parameter::new("dsn").default_value(String::from("sqlite::memory:"))]
///   }
///   fn construct(args: &Arguments) -> Result<Self> {
///     Ok(Config { dsn: args.value("dsn")? })
///   }
/// }
///
/// let container = Container::new();
/// container.define::<Config>("Config");
/// let config: Arc<Config> = container.get_as("Config").unwrap();
/// assert_eq!(config.dsn, "sqlite::memory:");
/// ```
pub trait Constructible: Component + Sized {
  /// The declared constructor parameters, in order.
  fn parameters() -> Vec<Parameter> {
    Vec::new()
  }

  /// Builds the value from its resolved arguments.
  fn construct(args: &Arguments) -> Result<Self>;

  /// The constructor name used in diagnostics.
  fn constructor_name(identifier: &str) -> String {
    format!("{}::new", identifier)
  }
}

type Constructor = Arc<dyn Fn(&Arguments) -> Result<Instance> + Send + Sync>;

/// The stored construction recipe for one type identifier.
#[derive(Clone)]
pub struct Blueprint {
  identifier: String,
  constructor_name: String,
  parameters: Vec<Parameter>,
  constructor: Option<Constructor>,
}

impl Blueprint {
  /// A recipe built from a hand-written parameter table and constructor.
  pub fn new<F>(identifier: impl Into<String>, parameters: Vec<Parameter>, constructor: F) -> Self
  where
    F: Fn(&Arguments) -> Result<Instance> + Send + Sync + 'static,
  {
    let identifier = identifier.into();
    Self {
      constructor_name: format!("{}::new", identifier),
      identifier,
      parameters,
      constructor: Some(Arc::new(constructor)),
    }
  }

  /// The recipe for a [`Constructible`] type.
  pub fn of<T: Constructible>(identifier: impl Into<String>) -> Self {
    let identifier = identifier.into();
    Self {
      constructor_name: T::constructor_name(&identifier),
      identifier,
      parameters: T::parameters(),
      constructor: Some(Arc::new(|args: &Arguments| {
        T::construct(args).map(Instance::component)
      })),
    }
  }

  /// The recipe for a [`Constructible`] type handed out as `I`, usually a
  /// trait object it implements.
  pub fn of_as<T, I>(identifier: impl Into<String>, cast: fn(Arc<T>) -> Arc<I>) -> Self
  where
    T: Constructible,
    I: ?Sized + Any + Send + Sync,
  {
    let identifier = identifier.into();
    Self {
      constructor_name: T::constructor_name(&identifier),
      identifier,
      parameters: T::parameters(),
      constructor: Some(Arc::new(move |args: &Arguments| {
        T::construct(args).map(|value| Instance::component_as(Arc::new(value), cast))
      })),
    }
  }

  /// A type that exists but cannot be instantiated, such as an interface.
  pub fn abstract_type(identifier: impl Into<String>) -> Self {
    let identifier = identifier.into();
    Self {
      constructor_name: format!("{}::new", identifier),
      identifier,
      parameters: Vec::new(),
      constructor: None,
    }
  }

  /// Overrides the constructor name shown in diagnostics.
  pub fn named(mut self, constructor_name: impl Into<String>) -> Self {
    self.constructor_name = constructor_name.into();
    self
  }

  pub fn identifier(&self) -> &str {
    &self.identifier
  }

  pub fn constructor_name(&self) -> &str {
    &self.constructor_name
  }

  pub fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }

  pub fn is_instantiable(&self) -> bool {
    self.constructor.is_some()
  }

  pub(crate) fn instantiate(&self, args: &Arguments) -> Result<Instance> {
    match &self.constructor {
      Some(constructor) => constructor(args),
      None => Err(Error::instantiate(&self.identifier, "the type is not instantiable")),
    }
  }
}

impl fmt::Debug for Blueprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Blueprint")
      .field("identifier", &self.identifier)
      .field("constructor", &self.constructor_name)
      .field("parameters", &self.parameters)
      .field("instantiable", &self.is_instantiable())
      .finish()
  }
}

/// A function the container can invoke with resolved arguments.
pub struct Callable<R> {
  name: String,
  parameters: Vec<Parameter>,
  body: Box<dyn Fn(&Arguments) -> Result<R> + Send + Sync>,
}

impl<R> Callable<R> {
  /// A named free function.
  pub fn function<F>(name: impl Into<String>, parameters: Vec<Parameter>, body: F) -> Self
  where
    F: Fn(&Arguments) -> Result<R> + Send + Sync + 'static,
  {
    Self {
      name: name.into(),
      parameters,
      body: Box::new(body),
    }
  }

  /// A method, reported as `Type::method`.
  pub fn method<F>(
    owner: impl AsRef<str>,
    method: impl AsRef<str>,
    parameters: Vec<Parameter>,
    body: F,
  ) -> Self
  where
    F: Fn(&Arguments) -> Result<R> + Send + Sync + 'static,
  {
    Self::function(
      format!("{}::{}", owner.as_ref(), method.as_ref()),
      parameters,
      body,
    )
  }

  /// An anonymous closure, reported as `Closure`.
  pub fn closure<F>(parameters: Vec<Parameter>, body: F) -> Self
  where
    F: Fn(&Arguments) -> Result<R> + Send + Sync + 'static,
  {
    Self::function("Closure", parameters, body)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }

  pub(crate) fn invoke(&self, args: &Arguments) -> Result<R> {
    (self.body)(args)
  }
}

impl<R> fmt::Debug for Callable<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Callable")
      .field("name", &self.name)
      .field("parameters", &self.parameters)
      .finish_non_exhaustive()
  }
}
