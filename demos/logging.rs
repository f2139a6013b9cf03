//! Container events through `tracing`
//!
//! Pretty output:
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```
//!
//! JSON output:
//! ```bash
//! cargo run --example logging --features logging-json
//! ```

use autowire::{BindingState, Component, Container};
use std::sync::Arc;

struct Database;

impl Component for Database {
    type Dependencies = ();
    fn construct(_: ()) -> Self {
        Database
    }
}

struct UserService {
    #[allow(dead_code)]
    db: Arc<Database>,
}

impl Component for UserService {
    type Dependencies = Arc<Database>;
    fn construct(db: Arc<Database>) -> Self {
        UserService { db }
    }
}

struct Unregistered;

fn main() {
    autowire::logging::builder().trace().autowire_only().init();

    println!("=== autowire logging demo ===\n");

    // "Creating new DI container"
    let container = Container::new();

    // "Registered lazy singleton" twice, then "keeping first registration"
    container.add::<Database>().add::<UserService>().add::<Database>();

    // "Constructing singleton on first access" for both components
    let _ = container.get::<UserService>();

    // Cache hit at TRACE
    let _ = container.get::<UserService>();
    assert_eq!(container.state::<UserService>(), BindingState::Realized);

    // Resolution failure
    if let Err(err) = container.get::<Unregistered>() {
        println!("\nexpected failure: {err}");
    }
}
