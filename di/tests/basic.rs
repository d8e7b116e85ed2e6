use fibre_di::{
  Arguments, Component, Constructible, Container, Error, ErrorKind, Instance, Parameter,
  Parameters, Result, Target,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// --- Test Fixtures ---

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

// Every construction gets a unique id.
#[derive(Debug)]
struct Foo {
  id: usize,
}
impl Component for Foo {}
impl Constructible for Foo {
  fn construct(_: &Arguments) -> Result<Self> {
    Ok(Foo {
      id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
    })
  }
}

#[derive(Debug)]
struct NewFoo;
impl Component for NewFoo {}
impl Constructible for NewFoo {
  fn construct(_: &Arguments) -> Result<Self> {
    Ok(NewFoo)
  }
}

struct Greeting {
  text: String,
}
impl Component for Greeting {}
impl Constructible for Greeting {
  fn parameters() -> Vec<Parameter> {
    vec![Parameter::new("text").default_value(String::from("hello"))]
  }
  fn construct(args: &Arguments) -> Result<Self> {
    Ok(Greeting {
      text: args.value("text")?,
    })
  }
}

fn container() -> Container {
  let container = Container::new();
  container.define::<Foo>("Foo");
  container.define::<NewFoo>("NewFoo");
  container.define::<Greeting>("Greeting");
  container
}

// --- Basic Tests ---

#[test]
fn test_singleton_is_reused_and_fresh_is_not() {
  // Arrange
  let container = container();
  container.register_singleton("Foo", "Foo");

  // Act
  let r1 = container.get_as::<Foo>("Foo").unwrap();
  let r2 = container.get_as::<Foo>("Foo").unwrap();
  let fresh = container.get_fresh_as::<Foo>("Foo", &Parameters::new()).unwrap();

  // Assert
  assert!(Arc::ptr_eq(&r1, &r2));
  assert!(!Arc::ptr_eq(&r1, &fresh));
  // The fresh instance never replaced the cached one.
  let r3 = container.get_as::<Foo>("Foo").unwrap();
  assert!(Arc::ptr_eq(&r1, &r3));
}

#[test]
fn test_get_fresh_does_not_populate_the_cache() {
  let container = container();
  container.register_singleton("Foo", "Foo");

  let fresh = container.get_fresh("Foo", &Parameters::new()).unwrap();
  let cached = container.get("Foo").unwrap();

  assert!(!fresh.ptr_eq(&cached));
}

#[test]
fn test_transient_hint_builds_every_time() {
  let container = container();
  container.register("Foo", "Foo", false);

  let r1 = container.get_as::<Foo>("Foo").unwrap();
  let r2 = container.get_as::<Foo>("Foo").unwrap();

  assert!(r1.id != r2.id);
  assert!(!container.is_singleton("Foo"));
}

#[test]
fn test_alias_resolves_to_canonical() {
  let container = container();
  container.register_singleton(["Foo", "bar"], "Foo");

  assert!(container.has("bar"));
  assert!(container.is_singleton("bar"));
  let via_alias = container.get("bar").unwrap();
  let via_canonical = container.get("Foo").unwrap();
  assert!(via_alias.ptr_eq(&via_canonical));
}

#[test]
fn test_alias_is_single_hop() {
  let container = container();
  container.register(("Foo", "bar"), "Foo", false);
  container.register(("bar", "baz"), "NewFoo", false);

  // "baz" -> "bar" stops there and uses the hint stored under "bar",
  // while "bar" itself is an alias for "Foo".
  assert!(container.get("baz").unwrap().is::<NewFoo>());
  assert!(container.get("bar").unwrap().is::<Foo>());
}

#[test]
fn test_register_instance_is_singleton_and_returned_as_is() {
  let container = Container::new();
  let instance = Instance::new(String::from("application"));
  container.register_instance("App", instance.clone());

  assert!(container.has("App"));
  assert!(container.is_singleton("App"));
  assert!(container.get("App").unwrap().ptr_eq(&instance));
  assert_eq!(*container.get_as::<String>("App").unwrap(), "application");
}

#[test]
fn test_unknown_identifier_reports_nothing_registered() {
  let container = Container::new();
  assert!(!container.has("Nope"));
  assert!(!container.is_singleton("Nope"));

  let err = container.get("Nope").unwrap_err();
  assert_eq!(err.kind(), ErrorKind::UnableToInstantiate);
}

#[test]
fn test_abstract_type_cannot_be_instantiated() {
  let container = Container::new();
  container.define_abstract("Logger");

  let err = container.get("Logger").unwrap_err();
  assert!(matches!(
    err,
    Error::UnableToInstantiate { ref identifier, .. } if identifier == "Logger"
  ));
}

#[test]
fn test_self_binding_without_hint() {
  let container = container();

  // No hint registered: the identifier itself is the type.
  let greeting = container.get_as::<Greeting>("Greeting").unwrap();
  assert_eq!(greeting.text, "hello");
  assert!(!container.has("Greeting"));
}

#[test]
fn test_caller_parameters_override_defaults() {
  let container = container();

  let named = container
    .get_fresh_as::<Greeting>("Greeting", &Parameters::new().with("text", String::from("hi")))
    .unwrap();
  let positional = container
    .get_fresh_as::<Greeting>("Greeting", &Parameters::new().with(0, String::from("hey")))
    .unwrap();

  assert_eq!(named.text, "hi");
  assert_eq!(positional.text, "hey");
}

#[test]
fn test_factory_closure_receives_container_and_parameters() {
  let container = container();
  container.register_value("prefix", String::from(">> "));
  container.register(
    "Banner",
    Target::factory(|c: &Container, params: &Parameters| {
      let prefix = c.get_as::<String>("prefix")?;
      let body = params
        .positional(0)
        .and_then(|i| i.downcast::<&str>())
        .map(|s| *s)
        .unwrap_or("default");
      Ok(Instance::new(format!("{}{}", prefix, body)))
    }),
    false,
  );

  let banner = container
    .get_fresh_as::<String>("Banner", &Parameters::new().push("welcome"))
    .unwrap();
  assert_eq!(*banner, ">> welcome");
  assert_eq!(*container.get_as::<String>("Banner").unwrap(), ">> default");
}

#[test]
fn test_last_registration_wins() {
  let container = container();
  container.register("Thing", "Foo", false);
  container.register("Thing", "NewFoo", false);

  assert!(container.get("Thing").unwrap().is::<NewFoo>());
}

#[test]
fn test_get_as_with_wrong_type_fails() {
  let container = Container::new();
  container.register_value("number", 7u32);

  let err = container.get_as::<String>("number").unwrap_err();
  assert!(matches!(err, Error::InstanceType { .. }));
  assert_eq!(err.kind(), ErrorKind::Container);
}

#[test]
fn test_containers_are_isolated() {
  let first = Container::new();
  let second = Container::new();
  first.register_value("only_first", 1u8);

  assert!(first.has("only_first"));
  assert!(!second.has("only_first"));
  assert!(first.clone().same_as(&first));
  assert!(!first.same_as(&second));
}
