// # phonebook-client
//
// Client side of the phonebook: HTTP access to the contacts API, the
// screen state machine, and a plain-text renderer.
//
// - **ContactApi**: list/create/update/delete against the service
// - **ViewState**: pure state transitions; requests come out as effects
// - **Controller**: runs effects through a ContactApi and feeds results back
// - **render**: text view of a ViewState
//
// The `phonebook` binary wires these to a terminal.

pub mod api;
pub mod controller;
pub mod error;
pub mod filter;
pub mod render;
pub mod validation;
pub mod view;

pub use api::{ContactApi, DEFAULT_API_URL, HttpContactApi};
pub use controller::Controller;
pub use error::{ClientError, ValidationError};
pub use filter::filter_contacts;
pub use render::render;
pub use view::{Action, Effect, Field, FormFields, Mode, ViewState};
