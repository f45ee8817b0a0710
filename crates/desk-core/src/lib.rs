//! # Care Desk Core
//!
//! Client-side state for the patient search, filter and registration screens:
//! - URL query-parameter store with volatile keys and a per-route filter cache
//! - Search controller and listing request mapping
//! - Cascading state → district → local body → ward selection
//! - Debounced, best-effort pincode enrichment
//! - Registration form model and facility navigation rules
//!
//! **No transport concerns**: remote services are reached through the traits in
//! [`remote`]; the HTTP implementation lives in `desk-api`.

pub mod config;
pub mod constants;
pub mod debounce;
pub mod enrichment;
pub mod error;
pub mod listing;
pub mod locality;
pub mod location;
pub mod navigation;
pub mod query;
pub mod registration;
pub mod remote;
pub mod search;
pub mod session;

pub use config::DeskConfig;
pub use error::{DeskError, DeskResult};
pub use listing::{Pagination, PatientRow, PatientSearch};
pub use location::{LocationCascade, Tier};
pub use navigation::{CurrentUser, Navigation, Notice, PatientNavigator, UserRole};
pub use query::{FilterCache, QueryParamStore, QueryParams, QueryValue};
pub use registration::{DraftField, PatientDraft, RegistrationForm};
pub use remote::{CareApi, Facility, GeographyNode, PatientPage, PincodeDetails, PincodeLookup};
pub use search::{SearchController, SearchField, SearchUpdate};
pub use session::RegistrationSession;

// Re-export validated primitives so callers need only one dependency.
pub use desk_types::{NonEmptyText, Pincode, PhoneNumber};
