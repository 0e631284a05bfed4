use phonebook_core::Contact;

/// Contacts matching a search term
///
/// A contact matches when its name contains the term ignoring case, or its
/// phone number contains the term as typed. An empty term matches all.
pub fn filter_contacts<'a>(contacts: &'a [Contact], term: &str) -> Vec<&'a Contact> {
    let needle = term.to_lowercase();
    contacts
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle) || c.phone_number.contains(term))
        .collect()
}
