// # Contacts API Client
//
// HTTP access to the phonebook service.
//
// ## Error Mapping
//
// | Response | Result |
// |----------|--------|
// | 2xx | decoded body |
// | non-2xx with `{ "message": ... }` | `ClientError::Server` with that message |
// | non-2xx otherwise | `ClientError::Server` without a message |
// | connect failure / timeout / bad body | `ClientError::Transport` |
//
// No request is ever retried.

use async_trait::async_trait;
use phonebook_core::{Contact, ContactDraft, ContactId, ContactPatch};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Default API location
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the client needs from the contacts service
#[async_trait]
pub trait ContactApi: Send + Sync {
    /// Every contact, sorted by name
    async fn list(&self) -> Result<Vec<Contact>>;

    /// Create a contact and return it as stored
    async fn create(&self, draft: &ContactDraft) -> Result<Contact>;

    /// Overwrite fields of a contact and return the result
    async fn update(&self, id: &ContactId, patch: &ContactPatch) -> Result<Contact>;

    /// Remove a contact
    async fn delete(&self, id: &ContactId) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// reqwest-backed [`ContactApi`]
#[derive(Debug, Clone)]
pub struct HttpContactApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpContactApi {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `http://localhost:5000/api`)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn contacts_url(&self) -> String {
        format!("{}/contacts", self.base_url)
    }

    fn contact_url(&self, id: &ContactId) -> String {
        format!("{}/contacts/{}", self.base_url, id)
    }

    /// Turn a non-success status into a `ClientError::Server`
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        tracing::warn!(
            "API responded {}: {}",
            status,
            message.as_deref().unwrap_or("no details")
        );

        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ContactApi for HttpContactApi {
    async fn list(&self) -> Result<Vec<Contact>> {
        let response = self.client.get(self.contacts_url()).send().await?;
        let contacts: Vec<Contact> = Self::check(response).await?.json().await?;
        tracing::debug!("Fetched {} contacts", contacts.len());
        Ok(contacts)
    }

    async fn create(&self, draft: &ContactDraft) -> Result<Contact> {
        tracing::debug!("Creating contact: {:?}", draft);
        let response = self
            .client
            .post(self.contacts_url())
            .json(draft)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn update(&self, id: &ContactId, patch: &ContactPatch) -> Result<Contact> {
        tracing::debug!("Updating contact {}: {:?}", id, patch);
        let response = self
            .client
            .put(self.contact_url(id))
            .json(patch)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete(&self, id: &ContactId) -> Result<()> {
        tracing::debug!("Deleting contact {}", id);
        let response = self.client.delete(self.contact_url(id)).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
