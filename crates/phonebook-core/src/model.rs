// # Contact Model
//
// The contact record and the payloads that create and modify it.
//
// ## Wire Format
//
// ```json
// {
//   "id": "0b1c6f0e-4d7e-4c4e-9a55-2f3e2a1d9c11",
//   "name": "Jane Doe",
//   "phoneNumber": "99988 87777",
//   "birthDate": "1990-05-01",
//   "address": "12 Harbour Road",
//   "createdAt": "2025-01-09T12:00:00Z"
// }
// ```
//
// `birthDate` and `address` are omitted when absent. The id is an opaque
// string; whatever the backing store uses internally stays inside the store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque contact identifier assigned by the store on creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    /// Wrap an identifier produced by a store
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier (UUID v4)
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContactId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ContactId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A persisted contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Store-assigned identifier, immutable
    #[serde(alias = "_id")]
    pub id: ContactId,

    /// Display name (required, non-empty)
    pub name: String,

    /// Phone number as the user entered it (required, non-empty)
    pub phone_number: String,

    /// Optional birth date
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "birth_date::deserialize"
    )]
    pub birth_date: Option<NaiveDate>,

    /// Optional postal address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Creation timestamp, set once
    pub created_at: DateTime<Utc>,
}

impl Contact {
    /// Build a contact from a validated draft
    ///
    /// Stores call this after generating the identifier; the creation
    /// timestamp is chosen by the service.
    pub fn from_draft(id: ContactId, draft: ContactDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            phone_number: draft.phone_number,
            birth_date: draft.birth_date,
            address: draft.address,
            created_at,
        }
    }
}

/// Create payload: every contact field except the generated ones
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Phone number
    #[serde(default)]
    pub phone_number: String,

    /// Optional birth date
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "birth_date::deserialize"
    )]
    pub birth_date: Option<NaiveDate>,

    /// Optional address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ContactDraft {
    /// Create a draft with the two required fields
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
            birth_date: None,
            address: None,
        }
    }

    /// Set the birth date
    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    /// Set the address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Enforce the required fields
    pub fn validate(&self) -> crate::Result<()> {
        require("name", &self.name)?;
        require("phoneNumber", &self.phone_number)
    }
}

/// Update payload: flat field overwrite
///
/// A missing key leaves the stored value untouched. For the optional
/// fields an explicit `null` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatch {
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// New birth date (`Some(None)` clears it)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "birth_date::deserialize_patch"
    )]
    pub birth_date: Option<Option<NaiveDate>>,

    /// New address (`Some(None)` clears it)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub address: Option<Option<String>>,
}

impl ContactPatch {
    /// Build a patch that replaces every mutable field of a contact
    pub fn replace_with(draft: ContactDraft) -> Self {
        Self {
            name: Some(draft.name),
            phone_number: Some(draft.phone_number),
            birth_date: Some(draft.birth_date),
            address: Some(draft.address),
        }
    }

    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone_number.is_none()
            && self.birth_date.is_none()
            && self.address.is_none()
    }

    /// Reject patches that would blank out a required field
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(name) = &self.name {
            require("name", name)?;
        }
        if let Some(phone_number) = &self.phone_number {
            require("phoneNumber", phone_number)?;
        }
        Ok(())
    }

    /// Overwrite the fields present in this patch
    ///
    /// `id` and `created_at` are never touched.
    pub fn apply_to(&self, contact: &mut Contact) {
        if let Some(name) = &self.name {
            contact.name = name.clone();
        }
        if let Some(phone_number) = &self.phone_number {
            contact.phone_number = phone_number.clone();
        }
        if let Some(birth_date) = self.birth_date {
            contact.birth_date = birth_date;
        }
        if let Some(address) = &self.address {
            contact.address = address.clone();
        }
    }
}

fn require(field: &str, value: &str) -> crate::Result<()> {
    if value.trim().is_empty() {
        return Err(crate::Error::invalid_input(format!("{field} is required")));
    }
    Ok(())
}

/// Distinguish an explicit `null` from a missing key
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Lenient birth date parsing
///
/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (truncated to its UTC
/// date). Empty strings and `null` mean "no birth date".
pub mod birth_date {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    /// Parse a birth date from user or wire input
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse(value)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid birth date: {value}"))),
        }
    }

    pub(crate) fn deserialize_patch<'de, D>(
        deserializer: D,
    ) -> Result<Option<Option<NaiveDate>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize(deserializer).map(Some)
    }
}
