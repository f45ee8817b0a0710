//! Facility-scoped navigation for patient creation and discharged-patient listing.
//!
//! Both screens live under a facility route. The facility is taken from an explicit
//! selection, the user's home facility, or the user's only permitted facility; otherwise
//! the caller has to ask the user with a selection dialog. Facility staff (volunteers,
//! staff, doctors and nurses) may only register patients in their home facility.

use crate::remote::CareApi;
use crate::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Volunteer,
    StaffReadOnly,
    Staff,
    Doctor,
    Nurse,
    WardAdmin,
    LocalBodyAdmin,
    DistrictLabAdmin,
    DistrictReadOnlyAdmin,
    DistrictAdmin,
    StateLabAdmin,
    StateReadOnlyAdmin,
    StateAdmin,
}

impl UserRole {
    const ALL: [UserRole; 13] = [
        UserRole::Volunteer,
        UserRole::StaffReadOnly,
        UserRole::Staff,
        UserRole::Doctor,
        UserRole::Nurse,
        UserRole::WardAdmin,
        UserRole::LocalBodyAdmin,
        UserRole::DistrictLabAdmin,
        UserRole::DistrictReadOnlyAdmin,
        UserRole::DistrictAdmin,
        UserRole::StateLabAdmin,
        UserRole::StateReadOnlyAdmin,
        UserRole::StateAdmin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Volunteer => "Volunteer",
            UserRole::StaffReadOnly => "StaffReadOnly",
            UserRole::Staff => "Staff",
            UserRole::Doctor => "Doctor",
            UserRole::Nurse => "Nurse",
            UserRole::WardAdmin => "WardAdmin",
            UserRole::LocalBodyAdmin => "LocalBodyAdmin",
            UserRole::DistrictLabAdmin => "DistrictLabAdmin",
            UserRole::DistrictReadOnlyAdmin => "DistrictReadOnlyAdmin",
            UserRole::DistrictAdmin => "DistrictAdmin",
            UserRole::StateLabAdmin => "StateLabAdmin",
            UserRole::StateReadOnlyAdmin => "StateReadOnlyAdmin",
            UserRole::StateAdmin => "StateAdmin",
        }
    }

    /// Whether patient creation is limited to the user's home facility.
    ///
    /// Only facility staff are bound; admin tiers pick the facility themselves.
    pub fn is_home_facility_bound(self) -> bool {
        matches!(
            self,
            UserRole::Volunteer
                | UserRole::StaffReadOnly
                | UserRole::Staff
                | UserRole::Doctor
                | UserRole::Nurse
        )
    }
}

impl FromStr for UserRole {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DeskError::InvalidInput(format!("unknown user role: {s}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub role: UserRole,
    pub home_facility: Option<Uuid>,
}

/// A user-visible notification that blocks navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    NoHomeFacility,
    NotHomeFacility,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::NoHomeFacility => "Oops! No home facility found",
            Notice::NotHomeFacility => {
                "Oops! Non-Home facility users don't have permission to perform this action."
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Go(String),
    /// Ask the user to pick a facility.
    SelectFacility,
    Notify(Notice),
}

pub fn registration_route(facility: Uuid) -> String {
    format!("/facility/{facility}/patient")
}

pub fn discharged_route(facility: Uuid) -> String {
    format!("/facility/{facility}/discharged-patients")
}

pub struct PatientNavigator<'a, A: ?Sized> {
    api: &'a A,
    user: &'a CurrentUser,
}

impl<'a, A: CareApi + ?Sized> PatientNavigator<'a, A> {
    pub fn new(api: &'a A, user: &'a CurrentUser) -> Self {
        Self { api, user }
    }

    /// Decides where "add patient" goes.
    pub async fn add_patient(&self, selected: Option<Uuid>) -> DeskResult<Navigation> {
        if self.user.role.is_home_facility_bound() {
            let Some(home) = self.user.home_facility else {
                tracing::info!(
                    role = self.user.role.as_str(),
                    "patient creation blocked: no home facility"
                );
                return Ok(Navigation::Notify(Notice::NoHomeFacility));
            };
            if selected.is_some_and(|facility| facility != home) {
                tracing::info!(
                    role = self.user.role.as_str(),
                    "patient creation blocked: not home facility"
                );
                return Ok(Navigation::Notify(Notice::NotHomeFacility));
            }
            return Ok(Navigation::Go(registration_route(home)));
        }

        match selected {
            Some(facility) => Ok(Navigation::Go(registration_route(facility))),
            None => Ok(self
                .sole_permitted_facility()
                .await?
                .map_or(Navigation::SelectFacility, |f| {
                    Navigation::Go(registration_route(f))
                })),
        }
    }

    /// Decides where "discharged patients" goes.
    pub async fn discharged_patients(&self, selected: Option<Uuid>) -> DeskResult<Navigation> {
        if let Some(facility) = selected.or(self.user.home_facility) {
            return Ok(Navigation::Go(discharged_route(facility)));
        }
        Ok(self
            .sole_permitted_facility()
            .await?
            .map_or(Navigation::SelectFacility, |f| {
                Navigation::Go(discharged_route(f))
            }))
    }

    async fn sole_permitted_facility(&self) -> DeskResult<Option<Uuid>> {
        let facilities = self.api.permitted_facilities().await?;
        Ok(match facilities.as_slice() {
            [only] => Some(only.id),
            _ => None,
        })
    }
}
