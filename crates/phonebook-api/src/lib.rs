//! REST surface of the phonebook service.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `{prefix}/contacts` | 200, contacts sorted by name |
//! | POST | `{prefix}/contacts` | 201, created contact |
//! | PUT | `{prefix}/contacts/:id` | 200, updated contact |
//! | DELETE | `{prefix}/contacts/:id` | 200, `{ "success": true }` |
//!
//! Handlers are stateless; all state lives behind the shared
//! [`ContactService`].

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, put},
};
use phonebook_core::{ContactService, Error, Result, ServerConfig};
use tower_http::cors::{Any, CorsLayer};

pub mod error;
pub mod routes;

pub use error::ApiError;
use routes::{create_contact, delete_contact, list_contacts, update_contact};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ContactService>,
}

impl AppState {
    pub fn new(service: ContactService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build the application router for the given server configuration
pub fn build_router(state: AppState, config: &ServerConfig) -> Result<Router> {
    let contacts = Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/:id", put(update_contact).delete(delete_contact));

    // axum refuses to nest at the root
    let app = if config.api_prefix.is_empty() {
        Router::new().merge(contacts)
    } else {
        Router::new().nest(&config.api_prefix, contacts)
    };

    tracing::debug!(
        "Routes mounted under '{}' (CORS origin: {})",
        config.api_prefix,
        config.cors_origin
    );

    Ok(app.layer(cors_layer(&config.cors_origin)?).with_state(state))
}

fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    if origin == "*" {
        // Credentials cannot be combined with a wildcard origin
        return Ok(cors.allow_origin(Any));
    }

    let origin = HeaderValue::from_str(origin)
        .map_err(|e| Error::config(format!("Invalid CORS origin '{}': {}", origin, e)))?;
    Ok(cors.allow_origin(origin).allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use phonebook_core::MemoryContactStore;

    fn state() -> AppState {
        AppState::new(ContactService::new(Arc::new(MemoryContactStore::new())))
    }

    #[test]
    fn test_router_builds_with_defaults() {
        assert!(build_router(state(), &ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_router_builds_without_prefix_and_any_origin() {
        let config = ServerConfig {
            api_prefix: String::new(),
            cors_origin: "*".to_string(),
            ..Default::default()
        };
        assert!(build_router(state(), &config).is_ok());
    }

    #[test]
    fn test_invalid_origin_rejected() {
        assert!(cors_layer("http://bad\norigin").is_err());
    }
}
