//! Registration form model.
//!
//! [`RegistrationForm`] holds the in-progress [`PatientDraft`] together with the form's
//! toggles. Rules that the screen used to express as render-time substitutions live here
//! as explicit state:
//!
//! - "Same as phone number" and "same as current address" mirror a source field into a
//!   target. While a toggle is on the target displays the source, reports itself disabled
//!   and ignores edits; its own stored value is left untouched. Switching the toggle off
//!   shows that stored value again (empty if it was never typed).
//! - Date of birth and age are alternative entry modes. Switching modes keeps both inputs;
//!   only the active one is reported by [`RegistrationForm::birth_input`].
//! - Geography goes through a [`LocationCascade`], so choosing a state clears district,
//!   local body and ward.

use crate::constants::{DEFAULT_NATIONALITY, OCCUPATION_TYPES, RATION_CARD_CATEGORIES};
use crate::enrichment::{AutofillNotice, Enrichment};
use crate::location::{LocationCascade, ParentKey, Tier};
use desk_types::NonEmptyText;
use serde::Serialize;
use std::time::Duration;

/// Sections of the registration page, in navigator order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormSection {
    GeneralInfo,
    SocialProfile,
    VolunteerContact,
    InsuranceDetails,
}

impl FormSection {
    pub const ALL: [FormSection; 4] = [
        FormSection::GeneralInfo,
        FormSection::SocialProfile,
        FormSection::VolunteerContact,
        FormSection::InsuranceDetails,
    ];

    /// Anchor id used by the section navigator.
    pub fn anchor(self) -> &'static str {
        match self {
            FormSection::GeneralInfo => "general-info",
            FormSection::SocialProfile => "social-profile",
            FormSection::VolunteerContact => "volunteer-contact",
            FormSection::InsuranceDetails => "insurance-details",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormSection::GeneralInfo => "patient__general-info",
            FormSection::SocialProfile => "social_profile",
            FormSection::VolunteerContact => "volunteer_contact",
            FormSection::InsuranceDetails => "patient__insurance-details",
        }
    }
}

/// Free-text fields of the draft that widgets bind to.
///
/// Coded choices (gender, occupation, ration card) go through their own setters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    PhoneNumber,
    EmergencyPhoneNumber,
    Address,
    PermanentAddress,
    Pincode,
    Nationality,
    Village,
    Age,
    InsurerName,
    PolicyId,
    SubscriberId,
}

impl DraftField {
    pub const ALL: [DraftField; 12] = [
        DraftField::Name,
        DraftField::PhoneNumber,
        DraftField::EmergencyPhoneNumber,
        DraftField::Address,
        DraftField::PermanentAddress,
        DraftField::Pincode,
        DraftField::Nationality,
        DraftField::Village,
        DraftField::Age,
        DraftField::InsurerName,
        DraftField::PolicyId,
        DraftField::SubscriberId,
    ];

    pub fn section(self) -> FormSection {
        match self {
            DraftField::InsurerName | DraftField::PolicyId | DraftField::SubscriberId => {
                FormSection::InsuranceDetails
            }
            _ => FormSection::GeneralInfo,
        }
    }
}

/// A patient record being filled in. Every field is optional until submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientDraft {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub emergency_phone_number: Option<String>,
    pub gender: Option<i32>,
    /// `D-M-Y` as typed, each part possibly empty.
    pub date_of_birth: Option<String>,
    pub age: Option<String>,
    pub address: Option<String>,
    pub permanent_address: Option<String>,
    pub pincode: Option<String>,
    pub nationality: Option<String>,
    pub state: Option<i64>,
    pub district: Option<i64>,
    pub local_body: Option<i64>,
    pub ward: Option<i64>,
    pub village: Option<String>,
    pub occupation: Option<String>,
    pub ration_card_category: Option<String>,
    pub insurer_name: Option<String>,
    pub policy_id: Option<String>,
    pub subscriber_id: Option<String>,
}

impl Default for PatientDraft {
    fn default() -> Self {
        Self {
            name: None,
            phone_number: None,
            emergency_phone_number: None,
            gender: None,
            date_of_birth: None,
            age: None,
            address: None,
            permanent_address: None,
            pincode: None,
            nationality: Some(DEFAULT_NATIONALITY.to_string()),
            state: None,
            district: None,
            local_body: None,
            ward: None,
            village: None,
            occupation: None,
            ration_card_category: None,
            insurer_name: None,
            policy_id: None,
            subscriber_id: None,
        }
    }
}

impl PatientDraft {
    fn slot(&self, field: DraftField) -> &Option<String> {
        match field {
            DraftField::Name => &self.name,
            DraftField::PhoneNumber => &self.phone_number,
            DraftField::EmergencyPhoneNumber => &self.emergency_phone_number,
            DraftField::Address => &self.address,
            DraftField::PermanentAddress => &self.permanent_address,
            DraftField::Pincode => &self.pincode,
            DraftField::Nationality => &self.nationality,
            DraftField::Village => &self.village,
            DraftField::Age => &self.age,
            DraftField::InsurerName => &self.insurer_name,
            DraftField::PolicyId => &self.policy_id,
            DraftField::SubscriberId => &self.subscriber_id,
        }
    }

    fn slot_mut(&mut self, field: DraftField) -> &mut Option<String> {
        match field {
            DraftField::Name => &mut self.name,
            DraftField::PhoneNumber => &mut self.phone_number,
            DraftField::EmergencyPhoneNumber => &mut self.emergency_phone_number,
            DraftField::Address => &mut self.address,
            DraftField::PermanentAddress => &mut self.permanent_address,
            DraftField::Pincode => &mut self.pincode,
            DraftField::Nationality => &mut self.nationality,
            DraftField::Village => &mut self.village,
            DraftField::Age => &mut self.age,
            DraftField::InsurerName => &mut self.insurer_name,
            DraftField::PolicyId => &mut self.policy_id,
            DraftField::SubscriberId => &mut self.subscriber_id,
        }
    }

    /// The stored value of `field`.
    pub fn get(&self, field: DraftField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Returns a copy with `field` replaced and every other field unchanged.
    pub fn with(&self, field: DraftField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        *next.slot_mut(field) = Some(value.into());
        next
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BirthEntryMode {
    #[default]
    Dob,
    Age,
}

/// Day, month and year inputs of the date of birth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DobPart {
    Day,
    Month,
    Year,
}

impl DobPart {
    fn index(self) -> usize {
        match self {
            DobPart::Day => 0,
            DobPart::Month => 1,
            DobPart::Year => 2,
        }
    }
}

/// The birth information the active entry mode would submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BirthInput<'a> {
    DateOfBirth(&'a str),
    Age(&'a str),
    Missing,
}

#[derive(Clone, Debug, Default)]
pub struct RegistrationForm {
    draft: PatientDraft,
    same_phone_number: bool,
    same_address: bool,
    entry_mode: BirthEntryMode,
    dob_parts: [String; 3],
    location: LocationCascade,
    autofill: AutofillNotice,
}

/// A widget's view of one draft field.
pub struct FieldBinding<'a> {
    form: &'a mut RegistrationForm,
    field: DraftField,
}

impl FieldBinding<'_> {
    /// The value the widget should display.
    pub fn value(&self) -> &str {
        self.form.display_value(self.field)
    }

    pub fn is_disabled(&self) -> bool {
        self.form.is_mirrored(self.field)
    }

    /// Merges an edit into the draft. Returns `false` if the field is mirrored.
    pub fn set(&mut self, value: impl Into<String>) -> bool {
        if self.is_disabled() {
            tracing::debug!(field = ?self.field, "ignoring edit to mirrored field");
            return false;
        }
        self.form.draft = self.form.draft.with(self.field, value);
        true
    }
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// The draft as stored, without mirroring applied.
    pub fn draft(&self) -> &PatientDraft {
        &self.draft
    }

    pub fn bind(&mut self, field: DraftField) -> FieldBinding<'_> {
        FieldBinding { form: self, field }
    }

    fn is_mirrored(&self, field: DraftField) -> bool {
        match field {
            DraftField::EmergencyPhoneNumber => self.same_phone_number,
            DraftField::PermanentAddress => self.same_address,
            _ => false,
        }
    }

    /// Displayed value of `field` after mirroring.
    pub fn display_value(&self, field: DraftField) -> &str {
        let source = match field {
            DraftField::EmergencyPhoneNumber if self.same_phone_number => DraftField::PhoneNumber,
            DraftField::PermanentAddress if self.same_address => DraftField::Address,
            other => other,
        };
        self.draft.get(source).unwrap_or("")
    }

    pub fn emergency_phone_number(&self) -> &str {
        self.display_value(DraftField::EmergencyPhoneNumber)
    }

    pub fn permanent_address(&self) -> &str {
        self.display_value(DraftField::PermanentAddress)
    }

    pub fn same_phone_number(&self) -> bool {
        self.same_phone_number
    }

    pub fn set_same_phone_number(&mut self, on: bool) {
        self.same_phone_number = on;
    }

    pub fn same_address(&self) -> bool {
        self.same_address
    }

    pub fn set_same_address(&mut self, on: bool) {
        self.same_address = on;
    }

    pub fn set_gender(&mut self, code: i32) {
        self.draft.gender = Some(code);
    }

    /// Stores an occupation code offered on the social profile; unknown codes are ignored.
    pub fn set_occupation(&mut self, code: i32) -> bool {
        if !OCCUPATION_TYPES.iter().any(|(id, _)| *id == code) {
            tracing::debug!(code, "ignoring unknown occupation");
            return false;
        }
        self.draft.occupation = Some(code.to_string());
        true
    }

    pub fn set_ration_card_category(&mut self, category: &str) -> bool {
        if !RATION_CARD_CATEGORIES.contains(&category) {
            tracing::debug!(category, "ignoring unknown ration card category");
            return false;
        }
        self.draft.ration_card_category = Some(category.to_string());
        true
    }

    pub fn entry_mode(&self) -> BirthEntryMode {
        self.entry_mode
    }

    pub fn set_entry_mode(&mut self, mode: BirthEntryMode) {
        self.entry_mode = mode;
    }

    /// Current text of one date-of-birth input.
    pub fn dob_part(&self, part: DobPart) -> &str {
        &self.dob_parts[part.index()]
    }

    /// Records one date-of-birth input and rebuilds the `D-M-Y` value from all three.
    ///
    /// Anything but ASCII digits is rejected and leaves every part as it was.
    pub fn set_dob_part(&mut self, part: DobPart, value: &str) -> bool {
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            tracing::debug!(?part, "ignoring non-numeric date of birth input");
            return false;
        }
        self.dob_parts[part.index()] = value.to_string();
        self.draft.date_of_birth = Some(self.dob_parts.join("-"));
        true
    }

    pub fn birth_input(&self) -> BirthInput<'_> {
        let value = match self.entry_mode {
            BirthEntryMode::Dob => self
                .draft
                .date_of_birth
                .as_deref()
                .map(BirthInput::DateOfBirth),
            BirthEntryMode::Age => self.draft.age.as_deref().map(BirthInput::Age),
        };
        value.unwrap_or(BirthInput::Missing)
    }

    pub fn location(&self) -> &LocationCascade {
        &self.location
    }

    /// Option loading only; selections go through [`Self::select_location`] so the draft
    /// stays in step.
    pub(crate) fn location_mut(&mut self) -> &mut LocationCascade {
        &mut self.location
    }

    /// Chooses a geography tier, clearing the tiers below it.
    pub fn select_location(&mut self, tier: Tier, id: Option<i64>) {
        self.location.select(tier, id);
        self.sync_location();
    }

    fn sync_location(&mut self) {
        self.draft.state = self.location.selected(Tier::State);
        self.draft.district = self.location.selected(Tier::District);
        self.draft.local_body = self.location.selected(Tier::LocalBody);
        self.draft.ward = self.location.selected(Tier::Ward);
    }

    /// Applies a pincode resolution if the pincode has not changed since the lookup.
    pub fn apply_enrichment(&mut self, enrichment: Enrichment, notice: Duration) -> bool {
        if self.draft.pincode.as_deref() != Some(enrichment.pincode.as_str()) {
            tracing::debug!(
                pincode = %enrichment.pincode,
                "discarding enrichment for stale pincode"
            );
            return false;
        }

        self.location.select(Tier::State, Some(enrichment.state_id));
        self.location.seed(
            Tier::District,
            ParentKey::Node(enrichment.state_id),
            enrichment.districts,
        );
        self.location.select(Tier::District, Some(enrichment.district_id));
        self.sync_location();
        self.autofill.show_for(notice);
        true
    }

    pub fn autofill_visible(&self) -> bool {
        self.autofill.is_visible()
    }

    /// The draft as it would be submitted: mirrors resolved, text trimmed with blanks
    /// dropped, and only the active birth entry mode kept.
    pub fn snapshot(&self) -> PatientDraft {
        let mut draft = self.draft.clone();
        for field in DraftField::ALL {
            *draft.slot_mut(field) = non_empty(self.display_value(field));
        }
        match self.entry_mode {
            BirthEntryMode::Dob => draft.age = None,
            BirthEntryMode::Age => draft.date_of_birth = None,
        }
        draft
    }
}

fn non_empty(value: &str) -> Option<String> {
    NonEmptyText::new(value).ok().map(NonEmptyText::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::GeographyNode;

    #[test]
    fn new_draft_defaults_nationality() {
        let form = RegistrationForm::new();
        assert_eq!(form.draft().nationality.as_deref(), Some("India"));
        assert_eq!(form.display_value(DraftField::Name), "");
    }

    #[test]
    fn with_is_a_shallow_merge() {
        let draft = PatientDraft::default().with(DraftField::Name, "Asha");
        let next = draft.with(DraftField::Village, "Kumbalangi");
        assert_eq!(draft.village, None);
        assert_eq!(next.name.as_deref(), Some("Asha"));
        assert_eq!(next.village.as_deref(), Some("Kumbalangi"));
        assert_eq!(next.nationality.as_deref(), Some("India"));
    }

    #[test]
    fn binding_reads_and_writes() {
        let mut form = RegistrationForm::new();
        let mut name = form.bind(DraftField::Name);
        assert!(name.set("Asha"));
        assert_eq!(name.value(), "Asha");
        assert!(!name.is_disabled());
        assert_eq!(form.draft().name.as_deref(), Some("Asha"));
    }

    #[test]
    fn same_phone_number_mirrors_without_mutating() {
        let mut form = RegistrationForm::new();
        form.bind(DraftField::PhoneNumber).set("9999999999");
        form.set_same_phone_number(true);

        assert_eq!(form.emergency_phone_number(), "9999999999");
        assert_eq!(form.draft().emergency_phone_number, None);

        let mut emergency = form.bind(DraftField::EmergencyPhoneNumber);
        assert!(emergency.is_disabled());
        assert!(!emergency.set("8888888888"));
        assert_eq!(form.draft().emergency_phone_number, None);

        form.set_same_phone_number(false);
        assert_eq!(form.emergency_phone_number(), "");
    }

    #[test]
    fn toggle_off_restores_last_explicit_value() {
        let mut form = RegistrationForm::new();
        form.bind(DraftField::Address).set("12 Beach Road");
        form.bind(DraftField::PermanentAddress).set("Old House, Alappuzha");

        form.set_same_address(true);
        assert_eq!(form.permanent_address(), "12 Beach Road");
        assert_eq!(form.snapshot().permanent_address.as_deref(), Some("12 Beach Road"));

        form.set_same_address(false);
        assert_eq!(form.permanent_address(), "Old House, Alappuzha");
    }

    #[test]
    fn snapshot_trims_and_drops_blank_text() {
        let mut form = RegistrationForm::new();
        form.bind(DraftField::Name).set("  Asha ");
        form.bind(DraftField::Village).set("   ");

        let snapshot = form.snapshot();
        assert_eq!(snapshot.name.as_deref(), Some("Asha"));
        assert_eq!(snapshot.village, None);
        assert_eq!(snapshot.nationality.as_deref(), Some("India"));
        assert_eq!(form.draft().village.as_deref(), Some("   "));
    }

    #[test]
    fn dob_is_rebuilt_per_keystroke() {
        let mut form = RegistrationForm::new();
        form.set_dob_part(DobPart::Month, "3");
        assert_eq!(form.draft().date_of_birth.as_deref(), Some("-3-"));

        form.set_dob_part(DobPart::Day, "20");
        form.set_dob_part(DobPart::Year, "199");
        form.set_dob_part(DobPart::Year, "1992");
        assert_eq!(form.draft().date_of_birth.as_deref(), Some("20-3-1992"));
        assert_eq!(form.dob_part(DobPart::Month), "3");
    }

    #[test]
    fn non_numeric_dob_input_keeps_other_parts() {
        let mut form = RegistrationForm::new();
        assert!(form.set_dob_part(DobPart::Day, "12"));
        assert!(!form.set_dob_part(DobPart::Day, "-"));
        assert!(!form.set_dob_part(DobPart::Year, "19-2"));
        assert!(form.set_dob_part(DobPart::Month, "3"));

        assert_eq!(form.dob_part(DobPart::Day), "12");
        assert_eq!(form.dob_part(DobPart::Year), "");
        assert_eq!(form.draft().date_of_birth.as_deref(), Some("12-3-"));

        assert!(form.set_dob_part(DobPart::Day, ""));
        assert_eq!(form.draft().date_of_birth.as_deref(), Some("-3-"));
        assert_eq!(form.dob_part(DobPart::Month), "3");
    }

    #[test]
    fn entry_modes_keep_both_inputs() {
        let mut form = RegistrationForm::new();
        assert_eq!(form.birth_input(), BirthInput::Missing);

        form.set_dob_part(DobPart::Day, "1");
        form.set_entry_mode(BirthEntryMode::Age);
        form.bind(DraftField::Age).set("34");
        assert_eq!(form.birth_input(), BirthInput::Age("34"));
        assert!(form.snapshot().date_of_birth.is_none());

        form.set_entry_mode(BirthEntryMode::Dob);
        assert_eq!(form.birth_input(), BirthInput::DateOfBirth("1--"));
        assert!(form.snapshot().age.is_none());
        assert_eq!(form.draft().age.as_deref(), Some("34"));
    }

    #[test]
    fn choosing_state_clears_lower_tiers_in_draft() {
        let mut form = RegistrationForm::new();
        form.select_location(Tier::State, Some(1));
        form.select_location(Tier::District, Some(8));
        form.select_location(Tier::LocalBody, Some(80));
        form.select_location(Tier::Ward, Some(801));

        form.select_location(Tier::State, Some(2));
        let draft = form.draft();
        assert_eq!(draft.state, Some(2));
        assert_eq!((draft.district, draft.local_body, draft.ward), (None, None, None));
    }

    fn enrichment(pincode: &str) -> Enrichment {
        Enrichment {
            pincode: pincode.to_string(),
            state_id: 1,
            district_id: 8,
            districts: vec![
                GeographyNode::new(7, "Thiruvananthapuram"),
                GeographyNode::new(8, "ernakulam "),
            ],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn enrichment_fills_state_and_district() {
        let mut form = RegistrationForm::new();
        form.select_location(Tier::State, Some(2));
        form.select_location(Tier::District, Some(20));
        form.select_location(Tier::LocalBody, Some(200));
        form.bind(DraftField::Pincode).set("682001");

        assert!(form.apply_enrichment(enrichment("682001"), Duration::from_secs(2)));
        assert_eq!(form.draft().state, Some(1));
        assert_eq!(form.draft().district, Some(8));
        assert_eq!(form.draft().local_body, None);
        assert_eq!(form.location().options(Tier::District).len(), 2);
        assert!(form.autofill_visible());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!form.autofill_visible());
    }

    #[test]
    fn enrichment_for_stale_pincode_is_ignored() {
        let mut form = RegistrationForm::new();
        form.bind(DraftField::Pincode).set("682002");
        assert!(!form.apply_enrichment(enrichment("682001"), Duration::from_secs(2)));
        assert_eq!(form.draft().state, None);
        assert!(!form.autofill_visible());
    }

    #[test]
    fn social_profile_choices_are_validated() {
        let mut form = RegistrationForm::new();
        assert!(form.set_occupation(3));
        assert!(!form.set_occupation(42));
        assert_eq!(form.draft().occupation.as_deref(), Some("3"));

        assert!(form.set_ration_card_category("BPL"));
        assert!(!form.set_ration_card_category("GOLD"));
        assert_eq!(form.draft().ration_card_category.as_deref(), Some("BPL"));
    }

    #[test]
    fn coded_choices_survive_free_text_edits() {
        let mut form = RegistrationForm::new();
        form.set_occupation(3);
        for field in DraftField::ALL {
            form.bind(field).set("garbage");
        }
        assert_eq!(form.draft().occupation.as_deref(), Some("3"));
        assert_eq!(form.draft().ration_card_category, None);
        assert_eq!(form.snapshot().occupation.as_deref(), Some("3"));
    }

    #[test]
    fn sections_and_fields() {
        let anchors: Vec<&str> = FormSection::ALL.iter().map(|s| s.anchor()).collect();
        assert_eq!(
            anchors,
            ["general-info", "social-profile", "volunteer-contact", "insurance-details"]
        );
        assert_eq!(DraftField::PolicyId.section(), FormSection::InsuranceDetails);
        assert_eq!(DraftField::Village.section(), FormSection::GeneralInfo);
    }
}
