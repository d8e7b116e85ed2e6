//! Parameter descriptors, caller-supplied parameters and the resolved
//! argument list handed to constructors and callables.

use crate::error::{Error, Result};
use crate::instance::Instance;
use std::any::Any;
use std::sync::Arc;

/// Describes one declared parameter of a constructor or callable.
#[derive(Debug, Clone)]
pub struct Parameter {
  pub(crate) name: String,
  pub(crate) hint: Option<String>,
  pub(crate) default: Option<Instance>,
  pub(crate) nullable: bool,
}

impl Parameter {
  /// A required parameter with no type hint.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      hint: None,
      default: None,
      nullable: false,
    }
  }

  /// A parameter whose declared type is the identifier `hint`.
  pub fn typed(name: impl Into<String>, hint: impl Into<String>) -> Self {
    Self::new(name).hint(hint)
  }

  /// Sets the declared type identifier.
  pub fn hint(mut self, hint: impl Into<String>) -> Self {
    self.hint = Some(hint.into());
    self
  }

  /// Sets the value used when nothing else resolves the parameter.
  pub fn default_value<T: Any + Send + Sync>(self, value: T) -> Self {
    self.default_instance(Instance::new(value))
  }

  /// Like [`Parameter::default_value`] for an already wrapped value.
  pub fn default_instance(mut self, value: Instance) -> Self {
    self.default = Some(value);
    self
  }

  /// Marks the parameter as accepting "no value".
  pub fn nullable(mut self) -> Self {
    self.nullable = true;
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn type_hint(&self) -> Option<&str> {
    self.hint.as_deref()
  }

  pub fn is_nullable(&self) -> bool {
    self.nullable
  }

  pub fn has_default(&self) -> bool {
    self.default.is_some()
  }
}

/// How a caller-supplied value is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKey {
  Position(usize),
  Name(String),
}

impl From<usize> for ParameterKey {
  fn from(index: usize) -> Self {
    ParameterKey::Position(index)
  }
}

// Unsuffixed integer literals default to `i32`; negative positions can never
// match a declared parameter.
impl From<i32> for ParameterKey {
  fn from(index: i32) -> Self {
    ParameterKey::Position(usize::try_from(index).unwrap_or(usize::MAX))
  }
}

impl From<&str> for ParameterKey {
  fn from(name: &str) -> Self {
    ParameterKey::Name(name.to_owned())
  }
}

impl From<String> for ParameterKey {
  fn from(name: String) -> Self {
    ParameterKey::Name(name)
  }
}

/// Caller-supplied arguments, kept in insertion order.
///
/// Later values for the same key replace earlier ones in place.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
  entries: Vec<(ParameterKey, Instance)>,
}

impl Parameters {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a value addressed by position or by name.
  pub fn with<T: Any + Send + Sync>(self, key: impl Into<ParameterKey>, value: T) -> Self {
    self.with_instance(key, Instance::new(value))
  }

  /// Adds an already wrapped value.
  pub fn with_instance(mut self, key: impl Into<ParameterKey>, value: Instance) -> Self {
    self.insert(key.into(), value);
    self
  }

  /// Appends a value at the next free position.
  pub fn push<T: Any + Send + Sync>(mut self, value: T) -> Self {
    let index = self
      .entries
      .iter()
      .filter(|(k, _)| matches!(k, ParameterKey::Position(_)))
      .count();
    self.insert(ParameterKey::Position(index), Instance::new(value));
    self
  }

  pub fn insert(&mut self, key: ParameterKey, value: Instance) {
    match self.entries.iter_mut().find(|(k, _)| *k == key) {
      Some(entry) => entry.1 = value,
      None => self.entries.push((key, value)),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&ParameterKey, &Instance)> {
    self.entries.iter().map(|(k, v)| (k, v))
  }

  /// Looks a value up by name.
  pub fn named(&self, name: &str) -> Option<&Instance> {
    self
      .entries
      .iter()
      .find(|(k, _)| matches!(k, ParameterKey::Name(n) if n == name))
      .map(|(_, v)| v)
  }

  /// Looks a value up by position.
  pub fn positional(&self, index: usize) -> Option<&Instance> {
    self
      .entries
      .iter()
      .find(|(k, _)| *k == ParameterKey::Position(index))
      .map(|(_, v)| v)
  }

  /// All values in insertion order, keys dropped.
  pub fn values(&self) -> impl Iterator<Item = &Instance> {
    self.entries.iter().map(|(_, v)| v)
  }
}

/// One slot of a merged parameter list.
#[derive(Debug)]
pub(crate) enum Slot {
  /// Still needs resolving.
  Declared(Parameter),
  /// Supplied by the caller.
  Supplied(String, Instance),
}

/// Merges caller-supplied values onto the declared list.
///
/// Positional values take the name of the declared parameter at their index,
/// named values replace by name, and names matching no declared parameter are
/// appended after the declared ones.
pub(crate) fn merge(
  declared: &[Parameter],
  provided: &Parameters,
  declaring: &str,
) -> Result<Vec<Slot>> {
  let mut slots: Vec<Slot> = declared.iter().cloned().map(Slot::Declared).collect();

  for (key, value) in provided.iter() {
    let name = match key {
      ParameterKey::Position(index) => match declared.get(*index) {
        Some(parameter) => parameter.name.clone(),
        None => {
          return Err(Error::ArgumentOutOfRange {
            index: *index,
            declaring: declaring.to_owned(),
          })
        }
      },
      ParameterKey::Name(name) => name.clone(),
    };

    let existing = slots.iter().position(|slot| match slot {
      Slot::Declared(p) => p.name == name,
      Slot::Supplied(n, _) => *n == name,
    });
    match existing {
      Some(position) => slots[position] = Slot::Supplied(name, value.clone()),
      None => slots.push(Slot::Supplied(name, value.clone())),
    }
  }

  Ok(slots)
}

/// The resolved, ordered argument list for one constructor or callable.
///
/// A slot holding `None` is a nullable parameter that resolved to no value.
#[derive(Debug, Clone)]
pub struct Arguments {
  declaring: String,
  values: Vec<(Option<String>, Option<Instance>)>,
}

impl Arguments {
  pub(crate) fn new(declaring: impl Into<String>) -> Self {
    Self {
      declaring: declaring.into(),
      values: Vec::new(),
    }
  }

  pub(crate) fn push(&mut self, name: Option<String>, value: Option<Instance>) {
    self.values.push((name, value));
  }

  /// The qualified name of the constructor or function being invoked.
  pub fn declaring(&self) -> &str {
    &self.declaring
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  fn slot(&self, name: &str) -> Option<&Option<Instance>> {
    self
      .values
      .iter()
      .find(|(n, _)| n.as_deref() == Some(name))
      .map(|(_, v)| v)
  }

  fn cast<T: ?Sized + Any + Send + Sync>(&self, name: &str, instance: &Instance) -> Result<Arc<T>> {
    instance.downcast::<T>().ok_or_else(|| Error::ArgumentType {
      parameter: name.to_owned(),
      declaring: self.declaring.clone(),
      expected: std::any::type_name::<T>(),
    })
  }

  /// The raw value of `name`, `None` if it resolved to no value.
  pub fn instance(&self, name: &str) -> Result<Option<Instance>> {
    self
      .slot(name)
      .cloned()
      .ok_or_else(|| Error::unresolved(name, &self.declaring))
  }

  /// A required argument.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    match self.slot(name) {
      Some(Some(instance)) => self.cast(name, instance),
      _ => Err(Error::unresolved(name, &self.declaring)),
    }
  }

  /// An argument that may have resolved to no value.
  pub fn optional<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Option<Arc<T>>> {
    match self.slot(name) {
      Some(Some(instance)) => self.cast(name, instance).map(Some),
      Some(None) => Ok(None),
      None => Err(Error::unresolved(name, &self.declaring)),
    }
  }

  /// A required argument, cloned out of its shared handle.
  pub fn value<T: Any + Send + Sync + Clone>(&self, name: &str) -> Result<T> {
    self.get::<T>(name).map(|v| (*v).clone())
  }

  /// The value at `index`, counting every slot including appended extras.
  pub fn positional(&self, index: usize) -> Option<&Instance> {
    self.values.get(index).and_then(|(_, v)| v.as_ref())
  }

  /// Every slot in order.
  pub fn iter(&self) -> impl Iterator<Item = Option<&Instance>> {
    self.values.iter().map(|(_, v)| v.as_ref())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn names(slots: &[Slot]) -> Vec<(String, bool)> {
    slots
      .iter()
      .map(|slot| match slot {
        Slot::Declared(p) => (p.name.clone(), false),
        Slot::Supplied(n, _) => (n.clone(), true),
      })
      .collect()
  }

  #[test]
  fn positional_values_take_the_declared_name() {
    let declared = vec![Parameter::new("a"), Parameter::new("b").default_value(10)];
    let provided = Parameters::new().with(0, 5);

    let slots = merge(&declared, &provided, "f").unwrap();
    assert_eq!(
      names(&slots),
      vec![("a".to_string(), true), ("b".to_string(), false)]
    );
  }

  #[test]
  fn named_values_override_and_unknown_names_append() {
    let declared = vec![Parameter::new("a"), Parameter::new("b")];
    let provided = Parameters::new().with("b", 1).with("extra", 2);

    let slots = merge(&declared, &provided, "f").unwrap();
    assert_eq!(
      names(&slots),
      vec![
        ("a".to_string(), false),
        ("b".to_string(), true),
        ("extra".to_string(), true)
      ]
    );
  }

  #[test]
  fn positional_out_of_range_is_rejected() {
    let declared = vec![Parameter::new("a")];
    let provided = Parameters::new().with(3, 1);

    let err = merge(&declared, &provided, "Foo::new").unwrap_err();
    assert!(matches!(err, Error::ArgumentOutOfRange { index: 3, .. }));
  }

  #[test]
  fn later_parameters_replace_earlier_ones_in_place() {
    let provided = Parameters::new().with("x", 1).with("y", 2).with("x", 3);
    assert_eq!(provided.len(), 2);
    assert_eq!(*provided.named("x").unwrap().downcast::<i32>().unwrap(), 3);
  }

  #[test]
  fn push_fills_the_next_position() {
    let provided = Parameters::new().push("first").push("second");
    assert_eq!(
      *provided.positional(1).unwrap().downcast::<&str>().unwrap(),
      "second"
    );
  }

  #[test]
  fn argument_accessors_report_the_declaring_function() {
    let mut args = Arguments::new("Mailer::new");
    args.push(Some("port".into()), Some(Instance::new(25u16)));
    args.push(Some("logger".into()), None);

    assert_eq!(args.value::<u16>("port").unwrap(), 25);
    assert!(args.optional::<String>("logger").unwrap().is_none());
    assert!(matches!(
      args.get::<String>("port"),
      Err(Error::ArgumentType { .. })
    ));
    let err = args.get::<String>("logger").unwrap_err();
    assert_eq!(
      err.to_string(),
      "Unable to resolve the [ $logger ] parameter of [ Mailer::new ]."
    );
  }
}
