//! Binding an interface and resolving a dependent service
//!
//! ```bash
//! cargo run --example wiring
//! ```

use autowire::{Component, Container, DiError, Wiring, provides};
use std::sync::Arc;

trait Logger: Send + Sync {
    fn log(&self, line: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, line: &str) {
        println!("  [log] {line}");
    }
}

impl Component for ConsoleLogger {
    type Dependencies = ();
    fn construct(_: ()) -> Self {
        println!("  [app] ConsoleLogger constructed");
        ConsoleLogger
    }
}

provides!(ConsoleLogger => dyn Logger);

struct Service {
    logger: Arc<dyn Logger>,
}

impl Service {
    fn run(&self) {
        self.logger.log("Service is running");
    }
}

impl Component for Service {
    type Dependencies = Arc<dyn Logger>;
    fn construct(logger: Arc<dyn Logger>) -> Self {
        println!("  [app] Service constructed");
        Service { logger }
    }
}

struct Orphan;

impl Component for Orphan {
    type Dependencies = (Arc<Service>, Arc<String>);
    fn construct(_: Self::Dependencies) -> Self {
        Orphan
    }
}

fn main() -> Result<(), DiError> {
    println!("=== Dynamic container ===\n");

    let container = Container::new();
    container.bind::<dyn Logger, ConsoleLogger>().add::<Service>();
    println!("  bound {} interfaces, nothing constructed yet", container.len());

    let service = container.get::<Service>()?;
    service.run();

    let again = container.get::<Service>()?;
    println!("  same instance: {}", Arc::ptr_eq(&service, &again));

    container.add::<Orphan>();
    match container.verify() {
        Ok(()) => println!("  graph complete"),
        Err(err) => println!("  verify: {err}"),
    }

    println!("\n=== Compile-time wiring ===\n");

    let resolver = Wiring::new()
        .bind::<dyn Logger, ConsoleLogger, _>()
        .add::<Service, _>()
        .build();
    resolver.get::<Service, _>().run();

    Ok(())
}
