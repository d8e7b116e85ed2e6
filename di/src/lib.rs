//! # Fibre DI
//!
//! A hint-driven dependency resolution container for Rust.
//!
//! Fibre DI maps string identifiers ("hints") to construction targets and
//! builds object graphs on demand. Concrete types declare their constructor
//! parameters in a table, and the container resolves each parameter in turn,
//! recursively, before building the value.
//!
//! ## Core Concepts
//!
//! - **Container**: A clonable handle to the registry. There is no global
//!   instance; the application creates one and passes it around.
//! - **Hints**: `register` binds an identifier (optionally with an alias) to a
//!   type identifier or a factory closure, as transient or singleton.
//! - **Blueprints**: `define::<T>()` tells the container how to build a type
//!   identifier from its declared [`Parameter`]s.
//! - **Contextual dependencies**: one consumer can receive a different
//!   implementation of a dependency than everyone else.
//! - **Replacement**: bindings and cached instances can be swapped at
//!   runtime; `on_replace` listeners receive the new instance.
//! - **Container awareness**: components declaring
//!   [`Capability::ContainerAware`] get the container handed to them after
//!   construction, typically through a [`ContainerSlot`].
//!
//! ## Quick Start
//!
//! ```
//! use fibre_di::{Arguments, Component, Constructible, Container, Instance, Parameter, Result};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!   fn name(&self) -> &'static str;
//! }
//!
//! struct StdoutLogger;
//! impl Logger for StdoutLogger {
//!   fn name(&self) -> &'static str { "stdout" }
//! }
//!
//! struct Mailer { logger: Arc<dyn Logger>, port: u16 }
//! impl Component for Mailer {}
//! impl Constructible for Mailer {
//!   fn parameters() -> Vec<Parameter> {
//!     vec![
//!       Parameter::typed("logger", "Logger"),
//!       Parameter::new("port").default_value(25u16),
//!     ]
//!   }
//!   fn construct(args: &Arguments) -> Result<Self> {
//!     Ok(Mailer {
//!       logger: args.get::<dyn Logger>("logger")?,
//!       port: args.value("port")?,
//!     })
//!   }
//! }
//!
//! let container = Container::new();
//! let logger: Arc<dyn Logger> = Arc::new(StdoutLogger);
//! container.register_instance("Logger", Instance::from_arc(logger));
//! container.define::<Mailer>("Mailer");
//! container.register_singleton(("Mailer", "mailer"), "Mailer");
//!
//! let mailer = container.get_as::<Mailer>("mailer").unwrap();
//! assert_eq!(mailer.logger.name(), "stdout");
//! assert_eq!(mailer.port, 25);
//! assert!(container.get("Mailer").unwrap().ptr_eq(&container.get("mailer").unwrap()));
//! ```

mod aware;
mod blueprint;
mod capability;
mod config;
mod container;
mod core;
mod error;
mod instance;
mod macros;
mod parameters;

pub use aware::ContainerSlot;
pub use blueprint::{Blueprint, Callable, Constructible};
pub use capability::{
  component_is_container_aware, is_container_aware, Capability, CapabilitySet, Component,
};
pub use config::{ContainerBuilder, ContainerConfig, DEFAULT_MAX_DEPTH};
pub use container::{Container, WeakContainer};
pub use crate::core::{Hint, Target};
pub use error::{Error, ErrorKind, Result};
pub use instance::Instance;
pub use parameters::{Arguments, Parameter, ParameterKey, Parameters};
