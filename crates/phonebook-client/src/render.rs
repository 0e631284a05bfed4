//! Plain-text rendering of the phonebook screen

use std::fmt::Write as _;

use phonebook_core::Contact;

use crate::view::{Mode, ViewState};

/// Render banners, the form, and the filtered contact list
///
/// Contacts are numbered from 1 in the order shown; `edit N` and
/// `delete N` refer to those numbers.
pub fn render(state: &ViewState) -> String {
    let mut out = String::new();

    if let Some(banner) = &state.success {
        let _ = writeln!(out, "[ok] {}", banner.message);
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "[error] {}  (dismiss to close)", error);
    }

    let heading = match state.mode {
        Mode::Add => "Add New Contact",
        Mode::Edit { .. } => "Edit Contact",
    };
    let _ = writeln!(out, "\n== {} ==", heading);
    let _ = writeln!(out, "  Name:       {}", state.form.name);
    let _ = writeln!(out, "  Phone:      {}", state.form.phone_number);
    let _ = writeln!(out, "  Birth date: {}", state.form.birth_date);
    let _ = writeln!(out, "  Address:    {}", state.form.address);

    let visible = state.visible_contacts();
    let _ = writeln!(out, "\n== My Contacts ({}) ==", visible.len());
    if !state.search.is_empty() {
        let _ = writeln!(out, "  search: {}", state.search);
    }

    if state.loading && state.contacts.is_empty() {
        let _ = writeln!(out, "  Loading contacts...");
    } else if visible.is_empty() {
        let empty = if state.search.is_empty() {
            "No contacts yet. Add your first contact!"
        } else {
            "No contacts match your search"
        };
        let _ = writeln!(out, "  {}", empty);
    } else {
        for (index, contact) in visible.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {}", index + 1, contact_line(contact));
        }
    }

    if state.loading {
        let _ = writeln!(out, "\nProcessing...");
    }

    if let Some(contact) = state.pending_delete_contact() {
        let _ = writeln!(
            out,
            "\nAre you sure you want to delete {}? [y/n]",
            contact.name
        );
    }

    out
}

fn contact_line(contact: &Contact) -> String {
    let mut line = format!("{}  {}", contact.name, contact.phone_number);
    if let Some(date) = contact.birth_date {
        let _ = write!(line, "  born {}", date.format("%Y-%m-%d"));
    }
    if let Some(address) = contact.address.as_deref().filter(|a| !a.is_empty()) {
        let _ = write!(line, "  {}", address);
    }
    line
}
