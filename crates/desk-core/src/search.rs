//! Patient search fields and the controller that turns keystrokes into filter updates.
//!
//! The search box offers one field at a time. Each widget reports `(key, raw value)`; the
//! controller answers with a [`SearchUpdate`] naming exactly one field, or nothing when a
//! phone number is still being typed.

use crate::constants::PHONE_SEARCH_MIN_LEN;
use crate::query::{QueryParamStore, QueryParams, QueryValue};
use desk_types::compact_phone;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchKind {
    Text,
    Phone,
}

/// The fixed set of patient search fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchField {
    Name,
    PatientNo,
    PhoneNumber,
    EmergencyPhoneNumber,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [
        SearchField::Name,
        SearchField::PatientNo,
        SearchField::PhoneNumber,
        SearchField::EmergencyPhoneNumber,
    ];

    /// Key reported by the input widget.
    pub fn widget_key(self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::PatientNo => "patient_no",
            SearchField::PhoneNumber => "phone_number",
            SearchField::EmergencyPhoneNumber => "emergency_contact_number",
        }
    }

    /// Key stored in the URL query.
    pub fn query_key(self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::PatientNo => "patient_no",
            SearchField::PhoneNumber => "phone_number",
            SearchField::EmergencyPhoneNumber => "emergency_phone_number",
        }
    }

    pub fn kind(self) -> SearchKind {
        match self {
            SearchField::Name | SearchField::PatientNo => SearchKind::Text,
            SearchField::PhoneNumber | SearchField::EmergencyPhoneNumber => SearchKind::Phone,
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            SearchField::Name => "search_by_patient_name",
            SearchField::PatientNo => "search_by_patient_no",
            SearchField::PhoneNumber => "Search_by_phone_number",
            SearchField::EmergencyPhoneNumber => "search_by_emergency_phone_number",
        }
    }

    /// Keyboard shortcut that focuses the field.
    pub fn shortcut(self) -> char {
        match self {
            SearchField::Name => 'n',
            SearchField::PatientNo => 'u',
            SearchField::PhoneNumber => 'p',
            SearchField::EmergencyPhoneNumber => 'e',
        }
    }

    pub fn from_widget_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.widget_key() == key)
    }

    /// The field's current value in `params`, or empty.
    pub fn current_value(self, params: &QueryParams) -> &str {
        params.text(self.query_key()).unwrap_or("")
    }
}

/// A sparse update touching exactly one search field.
///
/// Every other field is `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchUpdate {
    pub name: Option<String>,
    pub patient_no: Option<String>,
    pub phone_number: Option<String>,
    pub emergency_phone_number: Option<String>,
}

impl SearchUpdate {
    fn single(field: SearchField, value: String) -> Self {
        let mut update = Self::default();
        *update.slot_mut(field) = Some(value);
        update
    }

    fn slot_mut(&mut self, field: SearchField) -> &mut Option<String> {
        match field {
            SearchField::Name => &mut self.name,
            SearchField::PatientNo => &mut self.patient_no,
            SearchField::PhoneNumber => &mut self.phone_number,
            SearchField::EmergencyPhoneNumber => &mut self.emergency_phone_number,
        }
    }

    pub fn get(&self, field: SearchField) -> Option<&str> {
        match field {
            SearchField::Name => self.name.as_deref(),
            SearchField::PatientNo => self.patient_no.as_deref(),
            SearchField::PhoneNumber => self.phone_number.as_deref(),
            SearchField::EmergencyPhoneNumber => self.emergency_phone_number.as_deref(),
        }
    }

    /// Query-key/value pairs for every search field, `None` where unset.
    pub fn changes(&self) -> impl Iterator<Item = (&'static str, Option<QueryValue>)> + '_ {
        SearchField::ALL
            .into_iter()
            .map(|f| (f.query_key(), self.get(f).map(QueryValue::text)))
    }
}

impl QueryParamStore {
    /// Writes the populated search key and removes its siblings.
    pub fn apply_search(&mut self, update: &SearchUpdate) {
        self.update(update.changes());
    }
}

/// Stateless mapping from widget input to search updates.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchController;

impl SearchController {
    pub fn new() -> Self {
        Self
    }

    /// Builds the update for a raw widget value.
    ///
    /// Returns `None` for unknown keys and for phone values that are neither empty nor
    /// long enough to be a full international number.
    pub fn update(&self, widget_key: &str, raw: &str) -> Option<SearchUpdate> {
        let Some(field) = SearchField::from_widget_key(widget_key) else {
            tracing::debug!(widget_key, "ignoring unknown search key");
            return None;
        };
        self.update_field(field, raw)
    }

    pub fn update_field(&self, field: SearchField, raw: &str) -> Option<SearchUpdate> {
        match field.kind() {
            SearchKind::Text => Some(SearchUpdate::single(field, raw.to_string())),
            SearchKind::Phone => {
                let compact = compact_phone(raw);
                if compact.is_empty() || compact.len() >= PHONE_SEARCH_MIN_LEN {
                    Some(SearchUpdate::single(field, compact))
                } else {
                    None
                }
            }
        }
    }

    /// True iff any search field currently holds a non-empty value.
    pub fn is_valid_search(&self, params: &QueryParams) -> bool {
        SearchField::ALL
            .into_iter()
            .any(|f| !f.current_value(params).is_empty())
    }

    /// Routes a widget value into the store; returns whether an update was applied.
    pub fn search(&self, store: &mut QueryParamStore, widget_key: &str, raw: &str) -> bool {
        match self.update(widget_key, raw) {
            Some(update) => {
                store.apply_search(&update);
                true
            }
            None => false,
        }
    }

    /// Removes every search field from the store.
    pub fn clear_search(&self, store: &mut QueryParamStore) {
        store.update(SearchField::ALL.into_iter().map(|f| (f.query_key(), None)));
    }
}
