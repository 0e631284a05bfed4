// # MongoDB Contact Store
//
// This crate provides a MongoDB-backed ContactStore for the phonebook
// service.
//
// ## Document Shape
//
// ```json
// {
//   "_id": ObjectId("65a1c0ffee0000000000beef"),
//   "name": "Jane Doe",
//   "phoneNumber": "99988 87777",
//   "birthDate": ISODate("1990-05-01T00:00:00Z"),
//   "address": "12 Harbour Road",
//   "createdAt": ISODate("2025-01-09T12:00:00Z")
// }
// ```
//
// Documents written by earlier versions of the app (with a `__v` key) load
// unchanged; unknown keys are ignored.
//
// ## Identifiers
//
// `_id` is an ObjectId inside the store and a 24-character hex string
// everywhere else. A string that is not valid hex behaves exactly like an
// id that matches nothing.
//
// ## Security
//
// The connection URI may carry credentials and is never logged.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use mongodb::bson::{DateTime as BsonDateTime, Document, doc, oid::ObjectId};
use mongodb::options::{ClientOptions, FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Client, Collection};
use phonebook_core::config::StoreConfig;
use phonebook_core::{
    Contact, ContactDraft, ContactId, ContactPatch, ContactStore, ContactStoreFactory, Error,
    Result, StoreRegistry,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// How long the driver waits for a reachable server before failing a call
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Contact as stored in the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    birth_date: Option<BsonDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    created_at: BsonDateTime,
}

impl ContactDocument {
    fn from_draft(id: ObjectId, draft: ContactDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            phone_number: draft.phone_number,
            birth_date: draft.birth_date.map(date_to_bson),
            address: draft.address,
            created_at: BsonDateTime::from_millis(created_at.timestamp_millis()),
        }
    }

    fn into_contact(self) -> Result<Contact> {
        let created_at = bson_to_utc(self.created_at).ok_or_else(|| {
            Error::store(format!("Contact {} has an out-of-range createdAt", self.id))
        })?;

        Ok(Contact {
            id: ContactId::new(self.id.to_hex()),
            name: self.name,
            phone_number: self.phone_number,
            birth_date: self
                .birth_date
                .and_then(bson_to_utc)
                .map(|dt| dt.date_naive()),
            address: self.address,
            created_at,
        })
    }
}

fn date_to_bson(date: NaiveDate) -> BsonDateTime {
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    BsonDateTime::from_millis(midnight.timestamp_millis())
}

fn bson_to_utc(value: BsonDateTime) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value.timestamp_millis()).single()
}

fn parse_id(id: &ContactId) -> Option<ObjectId> {
    ObjectId::parse_str(id.as_str()).ok()
}

/// Translate a patch into `$set` / `$unset` modifications
fn update_document(patch: &ContactPatch) -> Document {
    let mut set = Document::new();
    let mut unset = Document::new();

    if let Some(name) = &patch.name {
        set.insert("name", name.clone());
    }
    if let Some(phone_number) = &patch.phone_number {
        set.insert("phoneNumber", phone_number.clone());
    }
    match patch.birth_date {
        Some(Some(date)) => {
            set.insert("birthDate", date_to_bson(date));
        }
        Some(None) => {
            unset.insert("birthDate", "");
        }
        None => {}
    }
    match &patch.address {
        Some(Some(address)) => {
            set.insert("address", address.clone());
        }
        Some(None) => {
            unset.insert("address", "");
        }
        None => {}
    }

    let mut update = Document::new();
    if !set.is_empty() {
        update.insert("$set", set);
    }
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}

fn store_error(err: mongodb::error::Error) -> Error {
    Error::store(format!("MongoDB: {}", err))
}

/// MongoDB contact store
///
/// Holds a collection handle; the driver pools connections internally, so
/// the store is shared across request handlers without extra locking.
#[derive(Debug, Clone)]
pub struct MongoContactStore {
    collection: Collection<ContactDocument>,
}

impl MongoContactStore {
    /// Connect to MongoDB
    ///
    /// The server is pinged once. An unreachable server is logged, not
    /// fatal: each request fails on its own until the server comes up.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let mut options = ClientOptions::parse(uri).await.map_err(store_error)?;
        options.app_name = Some("phonebook".to_string());
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        let client = Client::with_options(options).map_err(store_error)?;
        let db = client.database(database);

        match db.run_command(doc! { "ping": 1 }, None).await {
            Ok(_) => tracing::info!("MongoDB connected (database: {})", database),
            Err(e) => tracing::error!("MongoDB connection error: {}", e),
        }

        Ok(Self {
            collection: db.collection(collection),
        })
    }
}

#[async_trait]
impl ContactStore for MongoContactStore {
    async fn list(&self) -> Result<Vec<Contact>> {
        let options = FindOptions::builder()
            .sort(doc! { "name": 1, "createdAt": 1, "_id": 1 })
            .build();

        let mut cursor = self
            .collection
            .find(None, options)
            .await
            .map_err(store_error)?;

        let mut contacts = Vec::new();
        while cursor.advance().await.map_err(store_error)? {
            let document = cursor.deserialize_current().map_err(store_error)?;
            contacts.push(document.into_contact()?);
        }
        Ok(contacts)
    }

    async fn insert(&self, draft: ContactDraft, created_at: DateTime<Utc>) -> Result<Contact> {
        let document = ContactDocument::from_draft(ObjectId::new(), draft, created_at);
        self.collection
            .insert_one(&document, None)
            .await
            .map_err(store_error)?;
        document.into_contact()
    }

    async fn update(&self, id: &ContactId, patch: &ContactPatch) -> Result<Option<Contact>> {
        let Some(oid) = parse_id(id) else {
            tracing::debug!("Not an ObjectId: {}", id);
            return Ok(None);
        };

        let update = update_document(patch);
        let document = if update.is_empty() {
            self.collection
                .find_one(doc! { "_id": oid }, None)
                .await
                .map_err(store_error)?
        } else {
            let options = FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build();
            self.collection
                .find_one_and_update(doc! { "_id": oid }, update, options)
                .await
                .map_err(store_error)?
        };

        document.map(ContactDocument::into_contact).transpose()
    }

    async fn delete(&self, id: &ContactId) -> Result<bool> {
        let Some(oid) = parse_id(id) else {
            return Ok(false);
        };

        let result = self
            .collection
            .delete_one(doc! { "_id": oid }, None)
            .await
            .map_err(store_error)?;
        Ok(result.deleted_count > 0)
    }

    async fn flush(&self) -> Result<()> {
        // Writes are acknowledged by the server
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "mongo"
    }
}

/// Factory for creating MongoDB stores
pub struct MongoContactStoreFactory;

#[async_trait]
impl ContactStoreFactory for MongoContactStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn ContactStore>> {
        match config {
            StoreConfig::Mongo {
                uri,
                database,
                collection,
            } => Ok(Arc::new(
                MongoContactStore::connect(uri, database, collection).await?,
            )),
            _ => Err(Error::config("Invalid config for mongo store")),
        }
    }
}

/// Register the MongoDB store with a registry
///
/// # Example
///
/// ```rust
/// use phonebook_core::StoreRegistry;
///
/// let registry = StoreRegistry::with_builtin();
/// phonebook_store_mongo::register(&registry);
/// assert!(registry.has_store("mongo"));
/// ```
pub fn register(registry: &StoreRegistry) {
    registry.register_store("mongo", Box::new(MongoContactStoreFactory));
}
