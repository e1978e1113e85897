//! Basic example of the Kodi registry.

use kodi::prelude::*;
use std::sync::Arc;
use tracing::info;

// === Define your traits and types ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Config {
    database_url: String,
    debug: bool,
}

struct Database {
    url: String,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

struct UserService {
    repo: Arc<UserRepository>,
    logger: Arc<dyn Logger>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.logger.log(&format!("Getting user {id}"));
        self.repo.find_user(id)
    }
}

// === A module bound into its own scope ===

struct SessionModule;

impl Bindings for SessionModule {
    fn register(&self, m: &ModuleBinder<'_>) -> Result<()> {
        m.bind::<UserRepository>().single(|k| {
            Ok(UserRepository {
                db: k.instance::<Database>()?,
            })
        })?;
        m.bind_tag("request_id")?
            .provider_with_param(|_, id: Option<u64>| Ok(id.unwrap_or_default()))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "session"
    }

    fn scope(&self) -> Scope {
        Scope::new("session")
    }
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter("basic=info,kodi_container=debug")
        .init();

    let kodi = Kodi::new();

    // Config — constant value (already created)
    kodi.bind::<Config>().constant(Config {
        database_url: "postgres://localhost/myapp".to_string(),
        debug: true,
    })?;

    // Logger — single
    kodi.bind::<Arc<dyn Logger>>()
        .single(|_| Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>))?;

    // Database — single (depends on Config + Logger)
    kodi.bind::<Database>().single(|k| {
        let config = k.instance::<Config>()?;
        let logger = k.instance::<Arc<dyn Logger>>()?;
        Ok(Database {
            url: config.database_url.clone(),
            logger: Arc::clone(&*logger),
        })
    })?;

    // UserService — provider (new each time)
    kodi.bind::<UserService>().provider(|k| {
        Ok(UserService {
            repo: k.instance_in::<UserRepository>(None, Some("session"))?,
            logger: Arc::clone(&*k.instance::<Arc<dyn Logger>>()?),
        })
    })?;

    kodi.import(&SessionModule)?;

    info!(registered = kodi.registry().len(), "Registry ready");
    println!("{kodi:?}");
    print!("{}", kodi.describe());

    let config = kodi.instance::<Config>()?;
    println!("Config: database_url={}, debug={}", config.database_url, config.debug);

    let service = kodi.instance::<UserService>()?;
    println!("{}", service.get_user(42));

    let request = kodi.instance_with_param::<u64, _>(Some("request_id"), Some("session"), 7u64)?;
    println!("Request id: {request}");

    // Drop the whole session scope; the default-scope bindings stay.
    let removed = kodi.unbind_scope("session");
    info!(removed, "Session scope dropped");
    println!("Session bound: {}", kodi.has_scope::<UserRepository>(None));
    println!("Config still bound: {}", kodi.is_bound::<Config>(None));

    Ok(())
}
