//! Remote collaborators consumed by the core.
//!
//! The core never speaks HTTP itself. It depends on these traits; `desk-api` implements
//! them against the CARE REST API and the public pincode directory, and tests implement
//! them in memory.

use crate::query::QueryParams;
use crate::DeskResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One node of the state → district → local body → ward hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyNode {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

impl GeographyNode {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastConsultation {
    #[serde(default)]
    pub patient_no: Option<String>,
}

/// A patient as returned by the listing endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientListItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub year_of_birth: Option<i32>,
    #[serde(default)]
    pub gender: Option<i32>,
    #[serde(default)]
    pub last_consultation: Option<LastConsultation>,
}

/// A page of listing results.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientPage {
    pub count: u64,
    pub results: Vec<PatientListItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: Uuid,
    pub name: String,
}

/// Locality record returned by the pincode directory; names are free text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PincodeDetails {
    #[serde(rename = "statename")]
    pub state_name: String,
    #[serde(rename = "districtname")]
    pub district_name: String,
    #[serde(default, rename = "officename")]
    pub office_name: Option<String>,
}

/// The CARE records API.
#[async_trait]
pub trait CareApi: Send + Sync {
    /// Lists patients matching already-cleaned request parameters.
    async fn list_patients(&self, params: &QueryParams) -> DeskResult<PatientPage>;

    async fn list_states(&self) -> DeskResult<Vec<GeographyNode>>;

    async fn districts_by_state(&self, state_id: i64) -> DeskResult<Vec<GeographyNode>>;

    async fn local_bodies_by_district(&self, district_id: i64) -> DeskResult<Vec<GeographyNode>>;

    async fn wards_by_local_body(&self, local_body_id: i64) -> DeskResult<Vec<GeographyNode>>;

    /// Facilities the current user may act in.
    async fn permitted_facilities(&self) -> DeskResult<Vec<Facility>>;
}

/// External pincode directory.
#[async_trait]
pub trait PincodeLookup: Send + Sync {
    /// Returns `Ok(None)` when the directory has no locality for the code.
    async fn lookup(&self, pincode: &str) -> DeskResult<Option<PincodeDetails>>;
}

#[cfg(test)]
pub(crate) mod fakes {
    //! In-memory stand-ins for the remote collaborators.

    use super::*;
    use crate::DeskError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeCareApi {
        pub states: Vec<GeographyNode>,
        pub districts: HashMap<i64, Vec<GeographyNode>>,
        pub local_bodies: HashMap<i64, Vec<GeographyNode>>,
        pub wards: HashMap<i64, Vec<GeographyNode>>,
        pub facilities: Vec<Facility>,
        pub page: PatientPage,
        pub fail_districts: bool,
        pub listing_calls: Mutex<Vec<QueryParams>>,
        pub district_calls: Mutex<Vec<i64>>,
    }

    impl FakeCareApi {
        pub fn kerala() -> Self {
            let mut districts = HashMap::new();
            districts.insert(
                1,
                vec![
                    GeographyNode::new(7, "Thiruvananthapuram").with_parent(1),
                    GeographyNode::new(8, "ernakulam ").with_parent(1),
                ],
            );
            districts.insert(2, vec![GeographyNode::new(20, "Chennai").with_parent(2)]);

            let mut local_bodies = HashMap::new();
            local_bodies.insert(
                8,
                vec![GeographyNode::new(80, "Kochi Corporation").with_parent(8)],
            );

            let mut wards = HashMap::new();
            wards.insert(80, vec![GeographyNode::new(801, "Fort Kochi").with_parent(80)]);

            Self {
                states: vec![GeographyNode::new(1, "Kerala"), GeographyNode::new(2, "Tamil Nadu")],
                districts,
                local_bodies,
                wards,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl CareApi for FakeCareApi {
        async fn list_patients(&self, params: &QueryParams) -> DeskResult<PatientPage> {
            self.listing_calls.lock().unwrap().push(params.clone());
            Ok(self.page.clone())
        }

        async fn list_states(&self) -> DeskResult<Vec<GeographyNode>> {
            Ok(self.states.clone())
        }

        async fn districts_by_state(&self, state_id: i64) -> DeskResult<Vec<GeographyNode>> {
            self.district_calls.lock().unwrap().push(state_id);
            if self.fail_districts {
                return Err(DeskError::Remote("districts unavailable".into()));
            }
            Ok(self.districts.get(&state_id).cloned().unwrap_or_default())
        }

        async fn local_bodies_by_district(
            &self,
            district_id: i64,
        ) -> DeskResult<Vec<GeographyNode>> {
            Ok(self.local_bodies.get(&district_id).cloned().unwrap_or_default())
        }

        async fn wards_by_local_body(&self, local_body_id: i64) -> DeskResult<Vec<GeographyNode>> {
            Ok(self.wards.get(&local_body_id).cloned().unwrap_or_default())
        }

        async fn permitted_facilities(&self) -> DeskResult<Vec<Facility>> {
            Ok(self.facilities.clone())
        }
    }

    #[derive(Default)]
    pub struct FakePincodeLookup {
        pub records: HashMap<String, PincodeDetails>,
        pub unreachable: bool,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakePincodeLookup {
        pub fn with(pincode: &str, state: &str, district: &str) -> Self {
            let mut records = HashMap::new();
            records.insert(
                pincode.to_string(),
                PincodeDetails {
                    state_name: state.to_string(),
                    district_name: district.to_string(),
                    office_name: None,
                },
            );
            Self {
                records,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl PincodeLookup for FakePincodeLookup {
        async fn lookup(&self, pincode: &str) -> DeskResult<Option<PincodeDetails>> {
            self.calls.lock().unwrap().push(pincode.to_string());
            if self.unreachable {
                return Err(DeskError::Remote("pincode directory unreachable".into()));
            }
            Ok(self.records.get(pincode).cloned())
        }
    }
}
