//! Configuration types for the phonebook service
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main phonebook configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhonebookConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Contact store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

impl PhonebookConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.server.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (e.g., "0.0.0.0")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Listening port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Common prefix of every route (e.g., "/api")
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Origin allowed to call the API from a browser, or "*" for any
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl ServerConfig {
    /// Validate the server configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.bind_address.is_empty() {
            return Err(crate::Error::config("Bind address cannot be empty"));
        }
        if self.port == 0 {
            return Err(crate::Error::config("Port must be > 0"));
        }
        if !self.api_prefix.is_empty()
            && (!self.api_prefix.starts_with('/') || self.api_prefix.ends_with('/'))
        {
            return Err(crate::Error::config(format!(
                "API prefix must start with '/' and not end with '/': {}",
                self.api_prefix
            )));
        }
        if self.cors_origin != "*"
            && !self.cors_origin.starts_with("http://")
            && !self.cors_origin.starts_with("https://")
        {
            return Err(crate::Error::config(format!(
                "CORS origin must be '*' or an http(s) origin: {}",
                self.cors_origin
            )));
        }
        Ok(())
    }

    /// Socket address string to bind
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            api_prefix: default_api_prefix(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Contact store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory store (not persistent)
    #[default]
    Memory,

    /// JSON file store
    File {
        /// Path to the contacts file
        path: String,
    },

    /// MongoDB document store
    Mongo {
        /// Connection string
        #[serde(default = "default_mongo_uri")]
        uri: String,
        /// Database name
        #[serde(default = "default_mongo_database")]
        database: String,
        /// Collection name
        #[serde(default = "default_mongo_collection")]
        collection: String,
    },

    /// Custom store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl StoreConfig {
    /// MongoDB store with the default connection settings
    pub fn mongo_default() -> Self {
        StoreConfig::Mongo {
            uri: default_mongo_uri(),
            database: default_mongo_database(),
            collection: default_mongo_collection(),
        }
    }

    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::Memory => Ok(()),
            StoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("File store path cannot be empty"));
                }
                Ok(())
            }
            StoreConfig::Mongo {
                uri,
                database,
                collection,
            } => {
                if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
                    return Err(crate::Error::config(
                        "Mongo URI must use the mongodb:// or mongodb+srv:// scheme",
                    ));
                }
                if database.is_empty() || collection.is_empty() {
                    return Err(crate::Error::config(
                        "Mongo database and collection names cannot be empty",
                    ));
                }
                Ok(())
            }
            StoreConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom store factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom store config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the store type name used for registry lookup
    pub fn type_name(&self) -> &str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::File { .. } => "file",
            StoreConfig::Mongo { .. } => "mongo",
            StoreConfig::Custom { factory, .. } => factory,
        }
    }
}

fn default_mongo_uri() -> String {
    "mongodb://127.0.0.1:27017".to_string()
}

fn default_mongo_database() -> String {
    "phonebook".to_string()
}

fn default_mongo_collection() -> String {
    "contacts".to_string()
}
