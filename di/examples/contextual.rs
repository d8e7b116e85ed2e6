use fibre_di::{
  params, Arguments, Callable, Component, Constructible, Container, Parameter, Result,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// 1. The abstraction and two implementations.
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE]: {}", message);
  }
}
impl Component for ConsoleLogger {}
impl Constructible for ConsoleLogger {
  fn construct(_: &Arguments) -> Result<Self> {
    Ok(ConsoleLogger)
  }
}

struct AuditLogger;
impl Logger for AuditLogger {
  fn log(&self, message: &str) {
    println!("[AUDIT]: {}", message);
  }
}
impl Component for AuditLogger {}
impl Constructible for AuditLogger {
  fn construct(_: &Arguments) -> Result<Self> {
    Ok(AuditLogger)
  }
}

// 2. Services that only know about the abstraction.
struct ReportService {
  logger: Arc<dyn Logger>,
}
impl Component for ReportService {}
impl Constructible for ReportService {
  fn parameters() -> Vec<Parameter> {
    vec![Parameter::typed("logger", "Logger")]
  }
  fn construct(args: &Arguments) -> Result<Self> {
    Ok(ReportService {
      logger: args.get("logger")?,
    })
  }
}

struct BillingService {
  logger: Arc<dyn Logger>,
}
impl Component for BillingService {}
impl Constructible for BillingService {
  fn parameters() -> Vec<Parameter> {
    vec![Parameter::typed("logger", "Logger")]
  }
  fn construct(args: &Arguments) -> Result<Self> {
    Ok(BillingService {
      logger: args.get("logger")?,
    })
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let container = Container::new();
  container.define_abstract("Logger");
  container.define_as::<ConsoleLogger, dyn Logger>("ConsoleLogger", |l| l as Arc<dyn Logger>);
  container.define_as::<AuditLogger, dyn Logger>("AuditLogger", |l| l as Arc<dyn Logger>);
  container.define::<ReportService>("ReportService");
  container.define::<BillingService>("BillingService");

  // --- Registration ---
  container.register_singleton(("Logger", "logger"), "ConsoleLogger");
  // Billing gets the audit logger, everyone else the console one.
  container.register_contextual_dependency("BillingService", "Logger", "AuditLogger");

  // --- Resolution ---
  container.get_as::<ReportService>("ReportService")?.logger.log("report generated");
  container.get_as::<BillingService>("BillingService")?.logger.log("invoice issued");

  // --- Replacement ---
  container.on_replace(
    "logger",
    |instance| println!("Logger replaced with {}", instance.type_name()),
    Some("announce"),
  );
  container.replace_singleton("logger", "AuditLogger")?;
  container.get_as::<ReportService>("ReportService")?.logger.log("report regenerated");

  // --- Calling functions ---
  let total = container.call(
    &Callable::function(
      "total",
      vec![
        Parameter::new("amount"),
        Parameter::new("tax").default_value(20u32),
      ],
      |args| Ok(args.value::<u32>("amount")? + args.value::<u32>("tax")?),
    ),
    &params![0 => 100u32],
  )?;
  println!("Total: {}", total);
  Ok(())
}
