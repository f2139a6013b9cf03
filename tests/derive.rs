//! Signature discovery through the derive and attribute macros.

use autowire::{BindingState, Component, Container, Wiring, component, provides};
use std::sync::Arc;

trait Logger: Send + Sync {
    fn prefix(&self) -> &'static str;
}

#[derive(Component)]
struct StdoutLogger;

impl Logger for StdoutLogger {
    fn prefix(&self) -> &'static str {
        "stdout"
    }
}

provides!(StdoutLogger => dyn Logger);

#[derive(Component)]
struct Config;

#[derive(Component)]
struct Database {
    config: Arc<Config>,
    logger: Arc<dyn Logger>,
}

#[derive(Component)]
struct Cache(Arc<Config>);

struct Repository {
    db: Arc<Database>,
    cache: Arc<Cache>,
    table: &'static str,
}

#[component]
impl Repository {
    fn new(db: Arc<Database>, cache: Arc<Cache>) -> Self {
        Repository {
            db,
            cache,
            table: "users",
        }
    }
}

struct Handler {
    repo: Arc<Repository>,
    route: String,
}

#[component]
impl Handler {
    #[allow(dead_code)]
    fn new() -> Self {
        unreachable!("the #[inject] constructor is used")
    }

    #[inject]
    fn with_repo(repo: Arc<Repository>) -> Self {
        Handler {
            repo,
            route: "/users".to_string(),
        }
    }
}

#[test]
fn derived_signatures_follow_declaration_order() {
    assert!(StdoutLogger::signature().is_empty());
    assert_eq!(Cache::signature().arity(), 1);
    assert_eq!(
        Database::signature().type_names(),
        vec![
            std::any::type_name::<Config>(),
            std::any::type_name::<dyn Logger>()
        ]
    );
    assert_eq!(Repository::signature().arity(), 2);
    assert_eq!(
        Handler::signature().type_names(),
        vec![std::any::type_name::<Repository>()]
    );
}

#[test]
fn derived_components_resolve_from_container() {
    let container = Container::new();
    container
        .bind::<dyn Logger, StdoutLogger>()
        .add::<Config>()
        .add::<Database>()
        .add::<Cache>()
        .add::<Repository>()
        .add::<Handler>();

    container.verify().unwrap();
    assert_eq!(container.state::<Handler>(), BindingState::Bound);

    let handler = container.get::<Handler>().unwrap();
    assert_eq!(handler.route, "/users");
    assert_eq!(handler.repo.table, "users");
    assert_eq!(handler.repo.db.logger.prefix(), "stdout");

    let config = container.get::<Config>().unwrap();
    assert!(Arc::ptr_eq(&handler.repo.db.config, &config));
    assert!(Arc::ptr_eq(&handler.repo.cache.0, &config));
}

#[test]
fn derived_components_in_typed_wiring() {
    let resolver = Wiring::new()
        .add::<Config, _>()
        .bind::<dyn Logger, StdoutLogger, _>()
        .add::<Database, _>()
        .add::<Cache, _>()
        .add::<Repository, _>()
        .add::<Handler, _>()
        .build();

    let handler = resolver.get::<Handler, _>();
    assert!(Arc::ptr_eq(&handler.repo, &resolver.get::<Repository, _>()));
}
