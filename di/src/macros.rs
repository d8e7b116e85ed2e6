//! Public macros for ergonomic resolution and parameter building.

/// Resolves a service from a container, panicking if it cannot be resolved.
///
/// This is the shortest way to pull in a dependency that must exist. For a
/// non-panicking version, use `Container::get` or `Container::get_as`
/// directly.
///
/// # Panics
///
/// Panics with the identifier and the underlying error if resolution fails
/// or, in the typed form, if the instance is not of the requested type.
///
/// # Examples
///
/// ```
/// use fibre_di::{resolve, Container};
///
/// let container = Container::new();
/// container.register_value("greeting", String::from("hello"));
///
/// // Typed: yields `Arc<String>`.
/// let message = resolve!(container, "greeting" => String);
/// assert_eq!(*message, "hello");
///
/// // Untyped: yields the `Instance`.
/// let instance = resolve!(container, "greeting");
/// assert!(instance.is::<String>());
/// ```
#[macro_export]
macro_rules! resolve {
  // Arm for a typed resolution: resolve!(container, "id" => Type)
  ($container:expr, $identifier:expr => $type:ty) => {
    $container
      .get_as::<$type>($identifier)
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required service '{}' as {}: {}",
          $identifier,
          std::any::type_name::<$type>(),
          err
        )
      })
  };

  // Arm for an untyped resolution: resolve!(container, "id")
  ($container:expr, $identifier:expr) => {
    $container
      .get($identifier)
      .unwrap_or_else(|err| panic!("Failed to resolve required service '{}': {}", $identifier, err))
  };
}

/// Builds [`Parameters`](crate::Parameters) from `key => value` pairs.
///
/// Integer keys address parameters by position, string keys by name.
///
/// ```
/// use fibre_di::params;
///
/// let parameters = params![0 => 5, "retries" => 3u8];
/// assert_eq!(parameters.len(), 2);
/// assert!(parameters.positional(0).is_some());
/// assert!(parameters.named("retries").is_some());
/// ```
#[macro_export]
macro_rules! params {
  () => {
    $crate::Parameters::new()
  };
  ($($key:expr => $value:expr),+ $(,)?) => {
    $crate::Parameters::new()$(.with($key, $value))+
  };
}
