//! Derived constructor signatures
//!
//! ```bash
//! cargo run --example derive --features derive
//! ```

use autowire::{Component, Container, DiError, component, provides};
use std::sync::Arc;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Component)]
struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        1_700_000_000
    }
}

provides!(FixedClock => dyn Clock);

#[derive(Component)]
struct Config;

// Fields are the constructor parameters.
#[derive(Component)]
struct Database {
    config: Arc<Config>,
    clock: Arc<dyn Clock>,
}

struct Repository {
    db: Arc<Database>,
    table: &'static str,
}

// Parameters of `new` are the constructor parameters.
#[component]
impl Repository {
    fn new(db: Arc<Database>) -> Self {
        Repository { db, table: "users" }
    }
}

fn main() -> Result<(), DiError> {
    println!("Database signature:   {}", Database::signature());
    println!("Repository signature: {}", Repository::signature());

    let container = Container::new();
    container
        .add::<Config>()
        .bind::<dyn Clock, FixedClock>()
        .add::<Database>()
        .add::<Repository>();
    container.verify()?;

    let repo = container.get::<Repository>()?;
    println!(
        "\n{} resolved at {}, config shared: {}",
        repo.table,
        repo.db.clock.now(),
        Arc::ptr_eq(&repo.db.config, &container.get::<Config>()?)
    );

    Ok(())
}
