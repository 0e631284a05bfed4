//! Drives a [`ViewState`] against a [`ContactApi`].
//!
//! `dispatch` applies an action, runs the resulting effects and feeds their
//! outcomes back in until nothing is left to do. Banner expiry runs on a
//! spawned timer and arrives later on the channel returned by
//! [`Controller::new`]; the caller dispatches those actions when they come.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::api::ContactApi;
use crate::view::{Action, Effect, SaveKind, ViewState};

pub struct Controller {
    api: Arc<dyn ContactApi>,
    state: ViewState,
    timers: mpsc::UnboundedSender<Action>,
}

impl Controller {
    /// Create a controller and the receiver for its delayed actions
    pub fn new(api: Arc<dyn ContactApi>) -> (Self, mpsc::UnboundedReceiver<Action>) {
        let (timers, delayed) = mpsc::unbounded_channel();
        let controller = Self {
            api,
            state: ViewState::new(),
            timers,
        };
        (controller, delayed)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Apply an action and everything it leads to
    pub async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);

        while let Some(action) = queue.pop_front() {
            debug!("Dispatching {:?}", action);
            for effect in self.state.apply(action) {
                if let Some(outcome) = self.run(effect).await {
                    queue.push_back(outcome);
                }
            }
        }
    }

    async fn run(&self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::Fetch => Some(match self.api.list().await {
                Ok(contacts) => Action::ContactsLoaded(contacts),
                Err(e) => {
                    error!("Error fetching contacts: {}", e);
                    Action::LoadFailed
                }
            }),
            Effect::Create(draft) => Some(match self.api.create(&draft).await {
                Ok(contact) => {
                    info!("Contact created: {}", contact.id);
                    Action::Saved(SaveKind::Created)
                }
                Err(e) => {
                    error!("Error saving contact: {}", e);
                    Action::SaveFailed(e.server_message().map(str::to_string))
                }
            }),
            Effect::Update(id, patch) => Some(match self.api.update(&id, &patch).await {
                Ok(contact) => {
                    info!("Contact updated: {}", contact.id);
                    Action::Saved(SaveKind::Updated)
                }
                Err(e) => {
                    error!("Error saving contact {}: {}", id, e);
                    Action::SaveFailed(e.server_message().map(str::to_string))
                }
            }),
            Effect::Delete(id) => Some(match self.api.delete(&id).await {
                Ok(()) => {
                    info!("Contact deleted: {}", id);
                    Action::Deleted
                }
                Err(e) => {
                    error!("Error deleting contact {}: {}", id, e);
                    Action::DeleteFailed
                }
            }),
            Effect::ClearSuccess { generation, after } => {
                let timers = self.timers.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    // Receiver gone means the front end has exited
                    let _ = timers.send(Action::SuccessExpired(generation));
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, Result};
    use crate::view::{CONTACT_ADDED, DELETE_FAILED, Field, LOAD_FAILED};
    use async_trait::async_trait;
    use chrono::Utc;
    use phonebook_core::{Contact, ContactDraft, ContactId, ContactPatch};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-process API double
    #[derive(Default)]
    struct FakeApi {
        contacts: Mutex<Vec<Contact>>,
        next_id: AtomicUsize,
        fail_list: AtomicBool,
        fail_delete: AtomicBool,
    }

    #[async_trait]
    impl ContactApi for FakeApi {
        async fn list(&self) -> Result<Vec<Contact>> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(ClientError::Transport("connection refused".to_string()));
            }
            Ok(self.contacts.lock().unwrap().clone())
        }

        async fn create(&self, draft: &ContactDraft) -> Result<Contact> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let contact =
                Contact::from_draft(ContactId::new(id.to_string()), draft.clone(), Utc::now());
            self.contacts.lock().unwrap().push(contact.clone());
            Ok(contact)
        }

        async fn update(&self, id: &ContactId, patch: &ContactPatch) -> Result<Contact> {
            let mut contacts = self.contacts.lock().unwrap();
            let contact = contacts
                .iter_mut()
                .find(|c| &c.id == id)
                .ok_or(ClientError::Server {
                    status: 404,
                    message: Some("Contact not found".to_string()),
                })?;
            patch.apply_to(contact);
            Ok(contact.clone())
        }

        async fn delete(&self, id: &ContactId) -> Result<()> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(ClientError::Server {
                    status: 500,
                    message: None,
                });
            }
            self.contacts.lock().unwrap().retain(|c| &c.id != id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_add_refreshes_list() {
        let api = Arc::new(FakeApi::default());
        let (mut controller, _delayed) = Controller::new(api.clone());

        controller.dispatch(Action::Load).await;
        assert!(controller.state().contacts.is_empty());
        assert!(!controller.state().loading);

        controller
            .dispatch(Action::SetField(Field::Name, "Jane Doe".to_string()))
            .await;
        controller
            .dispatch(Action::SetField(Field::PhoneNumber, "9998887777".to_string()))
            .await;
        controller.dispatch(Action::Submit).await;

        let state = controller.state();
        assert_eq!(state.contacts.len(), 1);
        assert_eq!(state.contacts[0].phone_number, "99988 87777");
        assert!(!state.loading);
        assert_eq!(
            state.success.as_ref().map(|b| b.message.as_str()),
            Some(CONTACT_ADDED)
        );
    }

    #[tokio::test]
    async fn test_update_not_found_surfaces_server_message() {
        let api = Arc::new(FakeApi::default());
        api.create(&ContactDraft::new("Ann", "1112223333"))
            .await
            .unwrap();
        let (mut controller, _delayed) = Controller::new(api.clone());
        controller.dispatch(Action::Load).await;
        controller.dispatch(Action::Edit(ContactId::new("0"))).await;

        // Someone else removed it meanwhile
        api.contacts.lock().unwrap().clear();
        controller.dispatch(Action::Submit).await;

        assert_eq!(controller.state().error.as_deref(), Some("Contact not found"));
        assert!(!controller.state().loading);
    }

    #[tokio::test]
    async fn test_failures_set_error_banner() {
        let api = Arc::new(FakeApi::default());
        api.fail_list.store(true, Ordering::SeqCst);
        let (mut controller, _delayed) = Controller::new(api.clone());

        controller.dispatch(Action::Load).await;
        assert_eq!(controller.state().error.as_deref(), Some(LOAD_FAILED));

        api.fail_list.store(false, Ordering::SeqCst);
        api.create(&ContactDraft::new("Ann", "1112223333"))
            .await
            .unwrap();
        controller.dispatch(Action::Load).await;
        assert_eq!(controller.state().error, None);

        api.fail_delete.store(true, Ordering::SeqCst);
        controller
            .dispatch(Action::RequestDelete(ContactId::new("0")))
            .await;
        controller.dispatch(Action::ConfirmDelete).await;
        assert_eq!(controller.state().error.as_deref(), Some(DELETE_FAILED));
        assert_eq!(controller.state().contacts.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_banner_expires() {
        let api = Arc::new(FakeApi::default());
        api.create(&ContactDraft::new("Ann", "1112223333"))
            .await
            .unwrap();
        let (mut controller, mut delayed) = Controller::new(api);
        controller.dispatch(Action::Load).await;
        controller
            .dispatch(Action::RequestDelete(ContactId::new("0")))
            .await;
        controller.dispatch(Action::ConfirmDelete).await;
        assert!(controller.state().success.is_some());

        let expired = delayed.recv().await.expect("timer fires");
        assert_eq!(expired, Action::SuccessExpired(1));
        controller.dispatch(expired).await;
        assert_eq!(controller.state().success, None);
    }
}
