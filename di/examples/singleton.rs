use fibre_di::{Arguments, Component, Constructible, Container, Parameters, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

impl Component for RequestTracker {}
impl Constructible for RequestTracker {
  fn construct(_: &Arguments) -> Result<Self> {
    println!("Creating RequestTracker...");
    Ok(RequestTracker {
      id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
    })
  }
}

fn main() -> Result<()> {
  let container = Container::new();
  container.define::<RequestTracker>("RequestTracker");

  // Both hints are built from the same type; only one is cached.
  container.register_singleton("singleton_tracker", "RequestTracker");
  container.register("transient_tracker", "RequestTracker", false);

  println!("--- Resolving Singletons ---");
  let s1 = container.get_as::<RequestTracker>("singleton_tracker")?;
  let s2 = container.get_as::<RequestTracker>("singleton_tracker")?;
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert!(Arc::ptr_eq(&s1, &s2), "Singleton instances should be identical");

  println!("--- Resolving Transients ---");
  let t1 = container.get_as::<RequestTracker>("transient_tracker")?;
  let t2 = container.get_as::<RequestTracker>("transient_tracker")?;
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id, t2.id);
  assert!(!Arc::ptr_eq(&t1, &t2), "Transient instances should be different");

  // A fresh build of a singleton hint bypasses the cache entirely.
  let fresh = container.get_fresh_as::<RequestTracker>("singleton_tracker", &Parameters::new())?;
  println!("Fresh ID: {}, cached ID still {}", fresh.id, s1.id);
  Ok(())
}
