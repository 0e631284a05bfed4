// # phonebookd - Phonebook HTTP Daemon
//
// The phonebookd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering contact stores and creating the configured one
// 4. Serving the REST API until SIGINT/SIGTERM, then flushing the store
//
// Contact handling lives in phonebook-core and phonebook-api; this binary
// only wires them together.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Server
// - `PHONEBOOK_BIND`: Address to bind (default: 0.0.0.0)
// - `PHONEBOOK_PORT` or `PORT`: Listening port (default: 5000)
// - `PHONEBOOK_API_PREFIX`: Route prefix (default: /api)
// - `PHONEBOOK_CORS_ORIGIN`: Allowed browser origin, or `*` (default: http://localhost:3000)
//
// ### Store
// - `PHONEBOOK_STORE_TYPE`: Store type (mongo, file, memory; default: mongo)
// - `PHONEBOOK_STORE_PATH`: Path to the contacts file (for file store)
// - `PHONEBOOK_MONGO_URI`: Connection string (default: mongodb://127.0.0.1:27017)
// - `PHONEBOOK_MONGO_DATABASE`: Database name (default: phonebook)
// - `PHONEBOOK_MONGO_COLLECTION`: Collection name (default: contacts)
//
// ### Logging
// - `PHONEBOOK_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export PHONEBOOK_STORE_TYPE=file
// export PHONEBOOK_STORE_PATH=/var/lib/phonebook/contacts.json
// export PHONEBOOK_PORT=5000
//
// phonebookd
// ```

use anyhow::{Context, Result};
use phonebook_api::{AppState, build_router};
use phonebook_core::{ContactService, PhonebookConfig, ServerConfig, StoreConfig, StoreRegistry};
use std::env;
use std::future::Future;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    bind_address: String,
    port: u16,
    api_prefix: String,
    cors_origin: String,
    store_type: String,
    store_path: Option<String>,
    mongo_uri: Option<String>,
    mongo_database: Option<String>,
    mongo_collection: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = ServerConfig::default();

        let port = match lookup("PHONEBOOK_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PHONEBOOK_PORT must be a port number. Got: {}", raw))?,
            None => defaults.port,
        };

        Ok(Self {
            bind_address: lookup("PHONEBOOK_BIND").unwrap_or(defaults.bind_address),
            port,
            api_prefix: lookup("PHONEBOOK_API_PREFIX").unwrap_or(defaults.api_prefix),
            cors_origin: lookup("PHONEBOOK_CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            store_type: lookup("PHONEBOOK_STORE_TYPE").unwrap_or_else(|| "mongo".to_string()),
            store_path: lookup("PHONEBOOK_STORE_PATH"),
            mongo_uri: lookup("PHONEBOOK_MONGO_URI"),
            mongo_database: lookup("PHONEBOOK_MONGO_DATABASE"),
            mongo_collection: lookup("PHONEBOOK_MONGO_COLLECTION"),
            log_level: lookup("PHONEBOOK_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.store_type.as_str() {
            "mongo" | "file" | "memory" => {}
            _ => anyhow::bail!(
                "PHONEBOOK_STORE_TYPE '{}' is not supported. \
                Supported types: mongo, file, memory",
                self.store_type
            ),
        }

        if self.store_type == "file" {
            match self.store_path.as_deref() {
                None | Some("") => anyhow::bail!(
                    "PHONEBOOK_STORE_PATH is required when PHONEBOOK_STORE_TYPE=file. \
                    Set it via: export PHONEBOOK_STORE_PATH=/var/lib/phonebook/contacts.json"
                ),
                Some(path) => {
                    let parent = std::path::Path::new(path).parent();
                    if let Some(parent) = parent.filter(|p| !p.as_os_str().is_empty()) {
                        if !parent.exists() {
                            anyhow::bail!(
                                "PHONEBOOK_STORE_PATH parent directory does not exist: {}. \
                                Create it first: mkdir -p {}",
                                parent.display(),
                                parent.display()
                            );
                        }
                    }
                }
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "PHONEBOOK_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.phonebook_config()
            .validate()
            .context("Invalid configuration")?;

        Ok(())
    }

    /// Build the core configuration from the environment settings
    fn phonebook_config(&self) -> PhonebookConfig {
        let store = match self.store_type.as_str() {
            "file" => StoreConfig::File {
                path: self.store_path.clone().unwrap_or_default(),
            },
            "memory" => StoreConfig::Memory,
            _ => match StoreConfig::mongo_default() {
                StoreConfig::Mongo {
                    uri,
                    database,
                    collection,
                } => StoreConfig::Mongo {
                    uri: self.mongo_uri.clone().unwrap_or(uri),
                    database: self.mongo_database.clone().unwrap_or(database),
                    collection: self.mongo_collection.clone().unwrap_or(collection),
                },
                other => other,
            },
        };

        PhonebookConfig {
            server: ServerConfig {
                bind_address: self.bind_address.clone(),
                port: self.port,
                api_prefix: self.api_prefix.clone(),
                cors_origin: self.cors_origin.clone(),
            },
            store,
        }
    }

    fn tracing_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DaemonExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting phonebookd");
    info!(
        "Store type: {}, listening on {}",
        config.store_type,
        config.phonebook_config().server.listen_address()
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run_daemon(config.phonebook_config()).await {
            Ok(()) => DaemonExitCode::CleanShutdown,
            Err(DaemonError::Startup(e)) => {
                error!("Startup error: {:#}", e);
                DaemonExitCode::ConfigError
            }
            Err(DaemonError::Runtime(e)) => {
                error!("Daemon error: {:#}", e);
                DaemonExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Failure phase, mapped onto the exit code
#[derive(Debug)]
enum DaemonError {
    Startup(anyhow::Error),
    Runtime(anyhow::Error),
}

/// Registry with every store this build supports
fn store_registry() -> StoreRegistry {
    let registry = StoreRegistry::with_builtin();

    #[cfg(feature = "mongo")]
    {
        info!("Registering MongoDB store");
        phonebook_store_mongo::register(&registry);
    }

    registry
}

/// Run the daemon
async fn run_daemon(config: PhonebookConfig) -> std::result::Result<(), DaemonError> {
    let registry = store_registry();
    if !registry.has_store(config.store.type_name()) {
        return Err(DaemonError::Startup(anyhow::anyhow!(
            "Store '{}' is not available in this build. Available: {}",
            config.store.type_name(),
            registry.list_stores().join(", ")
        )));
    }

    let store = registry
        .create_store(&config.store)
        .await
        .context("Failed to create contact store")
        .map_err(DaemonError::Startup)?;
    let service = ContactService::new(store);
    info!("Using {} store", service.store_name());

    let router = build_router(AppState::new(service.clone()), &config.server)
        .context("Failed to build router")
        .map_err(DaemonError::Startup)?;

    let address = config.server.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))
        .map_err(DaemonError::Startup)?;
    info!("Server running on {}", address);

    let shutdown = shutdown_signal().map_err(DaemonError::Startup)?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")
        .map_err(DaemonError::Runtime)?;

    info!("Shutting down, flushing store");
    service
        .flush()
        .await
        .context("Failed to flush store")
        .map_err(DaemonError::Runtime)?;

    info!("Shutdown complete");
    Ok(())
}

/// Future resolving on the first SIGTERM or SIGINT
///
/// Handlers are installed before the server starts so a failure to install
/// them is a startup error rather than an immediate shutdown.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Future resolving on CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: SIGINT"),
            Err(e) => error!("Failed to wait for CTRL-C: {}", e),
        }
    })
}
