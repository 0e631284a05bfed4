// # View State
//
// Everything the phonebook screen shows, and the transitions that change
// it.
//
// `ViewState::apply` is pure: it updates the state and returns the
// effects (requests, timers) the caller must run. Results come back as
// further actions.
//
// ## Flow
//
// ```text
// Load ──> Fetch ──> ContactsLoaded | LoadFailed
// Submit ──> Create | Update ──> Saved | SaveFailed
//                                  └─> Fetch + ClearSuccess (3s)
// RequestDelete ──> ConfirmDelete ──> Delete ──> Deleted | DeleteFailed
//               └─> AbortDelete                    └─> Fetch + ClearSuccess
// ```
//
// Only one request runs at a time: while `loading` is set, Submit and
// RequestDelete are ignored.

use phonebook_core::{Contact, ContactDraft, ContactId, ContactPatch};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ValidationError;
use crate::filter::filter_contacts;
use crate::validation::{format_phone_input, parse_birth_date, validate_name, validate_phone};

/// How long a success banner stays up
pub const SUCCESS_BANNER_DURATION: Duration = Duration::from_secs(3);

pub const LOAD_FAILED: &str = "Failed to load contacts. Please try again.";
pub const SAVE_FAILED: &str = "Failed to save contact. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete contact. Please try again.";
pub const CONTACT_ADDED: &str = "Contact added successfully!";
pub const CONTACT_UPDATED: &str = "Contact updated successfully!";
pub const CONTACT_DELETED: &str = "Contact deleted successfully!";

/// Editable form input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    PhoneNumber,
    BirthDate,
    Address,
}

/// Raw form contents, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    pub name: String,
    pub phone_number: String,
    /// `YYYY-MM-DD` or empty
    pub birth_date: String,
    pub address: String,
}

impl FormFields {
    /// Form pre-filled for editing a contact
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            phone_number: contact.phone_number.clone(),
            birth_date: contact
                .birth_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            address: contact.address.clone().unwrap_or_default(),
        }
    }

    /// Set one input; phone input is reformatted as it is typed
    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::PhoneNumber => self.phone_number = format_phone_input(&value),
            Field::BirthDate => self.birth_date = value,
            Field::Address => self.address = value,
        }
    }

    /// Validate the form and build the payload
    ///
    /// Empty birth date and address become absent fields.
    pub fn to_draft(&self) -> Result<ContactDraft, ValidationError> {
        validate_name(&self.name)?;
        validate_phone(&self.phone_number)?;
        let birth_date = parse_birth_date(&self.birth_date)?;
        let address = self.address.trim();

        Ok(ContactDraft {
            name: self.name.clone(),
            phone_number: self.phone_number.clone(),
            birth_date,
            address: (!address.is_empty()).then(|| address.to_string()),
        })
    }
}

/// Whether the form creates a contact or edits one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Mode {
    #[default]
    Add,
    Edit {
        target: ContactId,
    },
}

/// A success message and the generation that may clear it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessBanner {
    pub message: String,
    pub generation: u64,
}

/// Which kind of save completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

/// Everything that can happen to the screen
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Load,
    ContactsLoaded(Vec<Contact>),
    LoadFailed,
    SetField(Field, String),
    SearchChanged(String),
    Edit(ContactId),
    CancelEdit,
    Submit,
    Saved(SaveKind),
    /// Carries the server's message when it sent one
    SaveFailed(Option<String>),
    RequestDelete(ContactId),
    ConfirmDelete,
    AbortDelete,
    Deleted,
    DeleteFailed,
    DismissError,
    SuccessExpired(u64),
}

/// Work the caller performs on behalf of the state
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch,
    Create(ContactDraft),
    Update(ContactId, ContactPatch),
    Delete(ContactId),
    /// Deliver `SuccessExpired(generation)` after `after`
    ClearSuccess { generation: u64, after: Duration },
}

/// The phonebook screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Last fetched contacts, sorted by the server
    pub contacts: Vec<Contact>,
    pub form: FormFields,
    pub mode: Mode,
    pub search: String,
    /// A request is in flight
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<SuccessBanner>,
    /// Contact awaiting delete confirmation
    pub pending_delete: Option<ContactId>,
    success_generation: u64,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contacts matching the current search term
    pub fn visible_contacts(&self) -> Vec<&Contact> {
        filter_contacts(&self.contacts, &self.search)
    }

    /// The contact awaiting delete confirmation, if it is still listed
    pub fn pending_delete_contact(&self) -> Option<&Contact> {
        let id = self.pending_delete.as_ref()?;
        self.contacts.iter().find(|c| &c.id == id)
    }

    /// Apply an action and return the effects to run
    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Load => vec![self.begin_fetch()],
            Action::ContactsLoaded(contacts) => {
                self.contacts = contacts;
                self.loading = false;
                Vec::new()
            }
            Action::LoadFailed => {
                self.loading = false;
                self.error = Some(LOAD_FAILED.to_string());
                Vec::new()
            }
            Action::SetField(field, value) => {
                self.form.set(field, value);
                Vec::new()
            }
            Action::SearchChanged(term) => {
                self.search = term;
                Vec::new()
            }
            Action::Edit(id) => {
                match self.contacts.iter().find(|c| c.id == id) {
                    Some(contact) => {
                        self.form = FormFields::from_contact(contact);
                        self.mode = Mode::Edit { target: id };
                    }
                    None => tracing::warn!("Edit of unlisted contact {}", id),
                }
                Vec::new()
            }
            Action::CancelEdit => {
                self.reset_form();
                Vec::new()
            }
            Action::Submit => self.submit(),
            Action::Saved(kind) => {
                let message = match kind {
                    SaveKind::Created => CONTACT_ADDED,
                    SaveKind::Updated => CONTACT_UPDATED,
                };
                self.reset_form();
                let clear = self.show_success(message);
                vec![self.begin_fetch(), clear]
            }
            Action::SaveFailed(message) => {
                self.loading = false;
                self.error = Some(message.unwrap_or_else(|| SAVE_FAILED.to_string()));
                Vec::new()
            }
            Action::RequestDelete(id) => {
                if self.loading {
                    tracing::debug!("Delete ignored while a request is in flight");
                } else if self.contacts.iter().any(|c| c.id == id) {
                    self.pending_delete = Some(id);
                }
                Vec::new()
            }
            Action::ConfirmDelete => match self.pending_delete.take() {
                Some(id) => {
                    self.loading = true;
                    vec![Effect::Delete(id)]
                }
                None => Vec::new(),
            },
            Action::AbortDelete => {
                self.pending_delete = None;
                Vec::new()
            }
            Action::Deleted => {
                let clear = self.show_success(CONTACT_DELETED);
                vec![self.begin_fetch(), clear]
            }
            Action::DeleteFailed => {
                self.loading = false;
                self.error = Some(DELETE_FAILED.to_string());
                Vec::new()
            }
            Action::DismissError => {
                self.error = None;
                Vec::new()
            }
            Action::SuccessExpired(generation) => {
                if self
                    .success
                    .as_ref()
                    .is_some_and(|banner| banner.generation == generation)
                {
                    self.success = None;
                }
                Vec::new()
            }
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        if self.loading {
            tracing::debug!("Submit ignored while a request is in flight");
            return Vec::new();
        }

        let draft = match self.form.to_draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.error = Some(e.to_string());
                return Vec::new();
            }
        };

        self.loading = true;
        self.error = None;
        match &self.mode {
            Mode::Add => vec![Effect::Create(draft)],
            Mode::Edit { target } => {
                vec![Effect::Update(target.clone(), ContactPatch::replace_with(draft))]
            }
        }
    }

    fn begin_fetch(&mut self) -> Effect {
        self.loading = true;
        self.error = None;
        Effect::Fetch
    }

    fn reset_form(&mut self) {
        self.mode = Mode::Add;
        self.form = FormFields::default();
    }

    fn show_success(&mut self, message: &str) -> Effect {
        self.success_generation += 1;
        self.success = Some(SuccessBanner {
            message: message.to_string(),
            generation: self.success_generation,
        });
        Effect::ClearSuccess {
            generation: self.success_generation,
            after: SUCCESS_BANNER_DURATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn contact(id: &str, name: &str, phone: &str) -> Contact {
        Contact::from_draft(
            ContactId::new(id),
            ContactDraft::new(name, phone),
            Utc::now(),
        )
    }

    fn loaded() -> ViewState {
        let mut state = ViewState::new();
        assert_eq!(state.apply(Action::Load), vec![Effect::Fetch]);
        state.apply(Action::ContactsLoaded(vec![
            contact("1", "Ann", "1112223333"),
            contact("2", "Bob", "4445556666"),
        ]));
        state
    }

    fn fill(state: &mut ViewState, name: &str, phone: &str) {
        state.apply(Action::SetField(Field::Name, name.to_string()));
        state.apply(Action::SetField(Field::PhoneNumber, phone.to_string()));
    }

    #[test]
    fn test_load_cycle() {
        let mut state = ViewState::new();
        state.error = Some("stale".to_string());

        assert_eq!(state.apply(Action::Load), vec![Effect::Fetch]);
        assert!(state.loading);
        assert_eq!(state.error, None);

        state.apply(Action::LoadFailed);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some(LOAD_FAILED));
    }

    #[test]
    fn test_invalid_phone_issues_no_request() {
        let mut state = loaded();
        fill(&mut state, "Jane Doe", "12345");

        assert!(state.apply(Action::Submit).is_empty());
        assert_eq!(
            state.error.as_deref(),
            Some("Please enter a valid 10-digit phone number")
        );
        assert!(!state.loading);
    }

    #[test]
    fn test_missing_name_issues_no_request() {
        let mut state = loaded();
        fill(&mut state, "", "9998887777");

        assert!(state.apply(Action::Submit).is_empty());
        assert_eq!(state.error.as_deref(), Some("Please enter a name"));
    }

    #[test]
    fn test_phone_input_is_formatted() {
        let mut state = ViewState::new();
        state.apply(Action::SetField(Field::PhoneNumber, "9998887777".to_string()));
        assert_eq!(state.form.phone_number, "99988 87777");
    }

    #[test]
    fn test_add_flow() {
        let mut state = loaded();
        fill(&mut state, "Jane Doe", "9998887777");

        let effects = state.apply(Action::Submit);
        assert_eq!(
            effects,
            vec![Effect::Create(ContactDraft::new("Jane Doe", "99988 87777"))]
        );
        assert!(state.loading);

        // Second submit while the first is in flight is ignored
        assert!(state.apply(Action::Submit).is_empty());

        let effects = state.apply(Action::Saved(SaveKind::Created));
        assert_eq!(
            effects,
            vec![
                Effect::Fetch,
                Effect::ClearSuccess {
                    generation: 1,
                    after: SUCCESS_BANNER_DURATION
                }
            ]
        );
        assert_eq!(state.form, FormFields::default());
        assert_eq!(state.mode, Mode::Add);
        assert_eq!(
            state.success.as_ref().map(|b| b.message.as_str()),
            Some(CONTACT_ADDED)
        );
    }

    #[test]
    fn test_edit_populates_form_and_submits_full_patch() {
        let mut state = loaded();
        state.contacts[0].birth_date = NaiveDate::from_ymd_opt(1990, 5, 1);

        state.apply(Action::Edit(ContactId::new("1")));
        assert_eq!(
            state.mode,
            Mode::Edit {
                target: ContactId::new("1")
            }
        );
        assert_eq!(state.form.name, "Ann");
        assert_eq!(state.form.birth_date, "1990-05-01");
        assert_eq!(state.form.address, "");

        state.apply(Action::SetField(Field::Address, "9 Elm St".to_string()));
        state.apply(Action::SetField(Field::BirthDate, String::new()));

        let effects = state.apply(Action::Submit);
        let expected = ContactPatch {
            name: Some("Ann".to_string()),
            phone_number: Some("1112223333".to_string()),
            birth_date: Some(None),
            address: Some(Some("9 Elm St".to_string())),
        };
        assert_eq!(effects, vec![Effect::Update(ContactId::new("1"), expected)]);

        state.apply(Action::Saved(SaveKind::Updated));
        assert_eq!(state.mode, Mode::Add);
        assert_eq!(
            state.success.as_ref().map(|b| b.message.as_str()),
            Some(CONTACT_UPDATED)
        );
    }

    #[test]
    fn test_cancel_edit() {
        let mut state = loaded();
        state.apply(Action::Edit(ContactId::new("2")));
        assert!(state.apply(Action::CancelEdit).is_empty());
        assert_eq!(state.mode, Mode::Add);
        assert_eq!(state.form, FormFields::default());
    }

    #[test]
    fn test_save_failed_prefers_server_message() {
        let mut state = loaded();
        fill(&mut state, "Jane Doe", "9998887777");
        state.apply(Action::Submit);

        state.apply(Action::SaveFailed(Some("Validation failed".to_string())));
        assert_eq!(state.error.as_deref(), Some("Validation failed"));
        assert!(!state.loading);

        state.apply(Action::Submit);
        state.apply(Action::SaveFailed(None));
        assert_eq!(state.error.as_deref(), Some(SAVE_FAILED));

        // Form is kept for another try
        assert_eq!(state.form.name, "Jane Doe");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut state = loaded();

        assert!(state.apply(Action::RequestDelete(ContactId::new("2"))).is_empty());
        assert_eq!(state.pending_delete_contact().map(|c| c.name.as_str()), Some("Bob"));

        assert!(state.apply(Action::AbortDelete).is_empty());
        assert_eq!(state.pending_delete, None);
        // Nothing pending, nothing issued
        assert!(state.apply(Action::ConfirmDelete).is_empty());

        state.apply(Action::RequestDelete(ContactId::new("2")));
        assert_eq!(
            state.apply(Action::ConfirmDelete),
            vec![Effect::Delete(ContactId::new("2"))]
        );
        assert!(state.loading);

        let effects = state.apply(Action::Deleted);
        assert_eq!(effects[0], Effect::Fetch);
        assert_eq!(
            state.success.as_ref().map(|b| b.message.as_str()),
            Some(CONTACT_DELETED)
        );
    }

    #[test]
    fn test_delete_failed() {
        let mut state = loaded();
        state.apply(Action::RequestDelete(ContactId::new("1")));
        state.apply(Action::ConfirmDelete);
        state.apply(Action::DeleteFailed);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some(DELETE_FAILED));
    }

    #[test]
    fn test_success_expiry_respects_generation() {
        let mut state = loaded();
        state.apply(Action::RequestDelete(ContactId::new("1")));
        state.apply(Action::ConfirmDelete);
        state.apply(Action::Deleted);
        state.apply(Action::ContactsLoaded(vec![contact("2", "Bob", "4445556666")]));

        state.apply(Action::RequestDelete(ContactId::new("2")));
        state.apply(Action::ConfirmDelete);
        state.apply(Action::Deleted);

        // The first banner's timer must not clear the second banner
        state.apply(Action::SuccessExpired(1));
        assert_eq!(state.success.as_ref().map(|b| b.generation), Some(2));

        state.apply(Action::SuccessExpired(2));
        assert_eq!(state.success, None);
    }

    #[test]
    fn test_dismiss_error() {
        let mut state = ViewState::new();
        state.apply(Action::LoadFailed);
        state.apply(Action::DismissError);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_search_filters_visible_contacts() {
        let mut state = loaded();
        state.apply(Action::SearchChanged("444".to_string()));
        let visible: Vec<&str> = state
            .visible_contacts()
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(visible, vec!["Bob"]);
    }

    #[test]
    fn test_state_serializes() {
        let state = loaded();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["mode"]["mode"], "add");
        assert_eq!(json["contacts"].as_array().map(Vec::len), Some(2));
    }
}
