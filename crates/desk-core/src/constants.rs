//! Constants used throughout the Care Desk core crate.
//!
//! Lookup tables mirror the options offered by the registration and listing screens.
//! Labels are i18n keys unless noted otherwise.

use std::time::Duration;

/// Results shown per listing page when nothing else is configured.
pub const DEFAULT_RESULTS_PER_PAGE: u32 = 12;

/// Quiet period after the last pincode edit before the lookup runs.
pub const PINCODE_DEBOUNCE: Duration = Duration::from_millis(1000);

/// How long the "auto-filled from pincode" notice stays visible.
pub const AUTOFILL_NOTICE: Duration = Duration::from_millis(2000);

/// Minimum compact length of a phone search value before it is dispatched.
///
/// Matches `+` followed by a twelve digit Indian number.
pub const PHONE_SEARCH_MIN_LEN: usize = 13;

/// Nationality preselected on a new registration.
pub const DEFAULT_NATIONALITY: &str = "India";

/// Months subtracted from today for the antenatal "last menstruation" lower bound.
pub const ANTENATAL_WINDOW_MONTHS: u32 = 9;

/// Gender codes used by patient records, with display labels.
pub const GENDER_TYPES: &[(i32, &str)] = &[(1, "Male"), (2, "Female"), (3, "Transgender")];

/// Occupation codes offered on the social profile section.
pub const OCCUPATION_TYPES: &[(i32, &str)] = &[
    (1, "Student"),
    (2, "Businessman"),
    (3, "Healthcare Worker"),
    (4, "Others"),
    (5, "Healthcare Lab Worker"),
    (6, "Animal Handler"),
    (7, "Not Applicable"),
];

/// Ration card categories offered on the social profile section.
pub const RATION_CARD_CATEGORIES: &[&str] = &["NO_CARD", "BPL", "APL"];

/// Query key carrying the discharge-reason filter; its presence lists inactive patients.
pub const DISCHARGE_REASON_KEY: &str = "last_consultation__new_discharge_reason";

/// Query key under which the filter panel stores the selected local body.
pub const LOCAL_BODY_FILTER_KEY: &str = "lsgBody";

/// Returns the display label for a gender code.
pub fn gender_label(code: i32) -> Option<&'static str> {
    GENDER_TYPES
        .iter()
        .find(|(id, _)| *id == code)
        .map(|(_, label)| *label)
}
