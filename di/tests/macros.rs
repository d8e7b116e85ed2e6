use fibre_di::{params, resolve, Container, Instance, ParameterKey};
use std::sync::Arc;

// --- Test Fixtures ---

trait Clock: Send + Sync {
  fn now(&self) -> u64;
}

struct FixedClock;
impl Clock for FixedClock {
  fn now(&self) -> u64 {
    42
  }
}

fn container() -> Container {
  let container = Container::new();
  container.register_value("name", String::from("fibre"));
  container.register_instance("Clock", Instance::from_arc(Arc::new(FixedClock) as Arc<dyn Clock>));
  container
}

// --- Tests ---

#[test]
fn test_resolve_typed() {
  let container = container();

  let name = resolve!(container, "name" => String);
  let clock = resolve!(container, "Clock" => dyn Clock);

  assert_eq!(*name, "fibre");
  assert_eq!(clock.now(), 42);
}

#[test]
fn test_resolve_untyped() {
  let container = container();

  let instance = resolve!(container, "name");
  assert!(instance.is::<String>());
}

#[test]
#[should_panic(expected = "Failed to resolve required service 'missing'")]
fn test_resolve_panics_on_missing_service() {
  let container = container();
  let _ = resolve!(container, "missing");
}

#[test]
#[should_panic(expected = "Failed to resolve required service 'name' as u32")]
fn test_resolve_panics_on_wrong_type() {
  let container = container();
  let _ = resolve!(container, "name" => u32);
}

#[test]
fn test_params_keys() {
  let empty = params![];
  assert!(empty.is_empty());

  let parameters = params![1 => "second", "mode" => "fast", 0 => "first",];
  let keys: Vec<_> = parameters.iter().map(|(key, _)| key.clone()).collect();

  assert_eq!(
    keys,
    vec![
      ParameterKey::Position(1),
      ParameterKey::Name("mode".into()),
      ParameterKey::Position(0),
    ]
  );
  let first = parameters.positional(0).and_then(|i| i.downcast::<&str>());
  assert_eq!(first.as_deref(), Some(&"first"));
}
