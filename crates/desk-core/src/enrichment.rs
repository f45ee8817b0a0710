//! Best-effort state/district auto-fill from a pincode.
//!
//! Enrichment is never required: every failure (bad format, directory unreachable, no
//! locality, no matching state or district) yields `None` and leaves the form as it was.

use crate::locality::find_locality;
use crate::remote::{CareApi, GeographyNode, PincodeLookup};
use desk_types::Pincode;
use std::time::Duration;
use tokio::time::Instant;

/// A successful pincode resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enrichment {
    pub pincode: String,
    pub state_id: i64,
    pub district_id: i64,
    /// The matched state's districts, reusable as district options.
    pub districts: Vec<GeographyNode>,
}

pub struct PincodeEnricher<'a, A: ?Sized, L: ?Sized> {
    api: &'a A,
    lookup: &'a L,
}

impl<'a, A, L> PincodeEnricher<'a, A, L>
where
    A: CareApi + ?Sized,
    L: PincodeLookup + ?Sized,
{
    pub fn new(api: &'a A, lookup: &'a L) -> Self {
        Self { api, lookup }
    }

    /// Resolves `raw` against the already-loaded `states`.
    pub async fn resolve(&self, raw: &str, states: &[GeographyNode]) -> Option<Enrichment> {
        let pincode = Pincode::parse(raw).ok()?;

        let details = match self.lookup.lookup(pincode.as_str()).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                tracing::debug!(%pincode, "no locality for pincode");
                return None;
            }
            Err(e) => {
                tracing::debug!(%pincode, error = %e, "pincode lookup failed");
                return None;
            }
        };

        let Some(state) = find_locality(states, &details.state_name) else {
            tracing::debug!(%pincode, state = %details.state_name, "no matching state");
            return None;
        };

        let districts = match self.api.districts_by_state(state.id).await {
            Ok(districts) => districts,
            Err(e) => {
                tracing::debug!(%pincode, error = %e, "district fetch failed");
                return None;
            }
        };

        let Some(district) = find_locality(&districts, &details.district_name) else {
            tracing::debug!(%pincode, district = %details.district_name, "no matching district");
            return None;
        };

        tracing::info!(%pincode, state = state.id, district = district.id, "pincode resolved");
        Some(Enrichment {
            pincode: pincode.to_string(),
            state_id: state.id,
            district_id: district.id,
            districts: districts.clone(),
        })
    }
}

/// Transient "auto-filled from pincode" indicator.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutofillNotice {
    visible_until: Option<Instant>,
}

impl AutofillNotice {
    pub fn show_for(&mut self, duration: Duration) {
        self.visible_until = Some(Instant::now() + duration);
    }

    pub fn is_visible(&self) -> bool {
        self.visible_until
            .is_some_and(|until| Instant::now() < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fakes::{FakeCareApi, FakePincodeLookup};

    #[tokio::test]
    async fn resolves_with_fuzzy_district_match() {
        let api = FakeCareApi::kerala();
        let lookup = FakePincodeLookup::with("682001", "KERALA", "Ernakulam");
        let enricher = PincodeEnricher::new(&api, &lookup);

        let enrichment = enricher
            .resolve("682001", &api.states)
            .await
            .expect("resolves");
        assert_eq!(enrichment.state_id, 1);
        assert_eq!(enrichment.district_id, 8);
        assert_eq!(enrichment.districts.len(), 2);
    }

    #[tokio::test]
    async fn invalid_format_short_circuits() {
        let api = FakeCareApi::kerala();
        let lookup = FakePincodeLookup::with("682001", "Kerala", "Ernakulam");
        let enricher = PincodeEnricher::new(&api, &lookup);

        assert!(enricher.resolve("68200", &api.states).await.is_none());
        assert!(enricher.resolve("082001", &api.states).await.is_none());
        assert!(lookup.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn every_failure_is_silent() {
        let api = FakeCareApi::kerala();

        let missing = FakePincodeLookup::default();
        assert!(PincodeEnricher::new(&api, &missing)
            .resolve("682001", &api.states)
            .await
            .is_none());

        let unreachable = FakePincodeLookup {
            unreachable: true,
            ..FakePincodeLookup::default()
        };
        assert!(PincodeEnricher::new(&api, &unreachable)
            .resolve("682001", &api.states)
            .await
            .is_none());

        let wrong_state = FakePincodeLookup::with("560001", "Karnataka", "Bangalore");
        assert!(PincodeEnricher::new(&api, &wrong_state)
            .resolve("560001", &api.states)
            .await
            .is_none());
        assert!(api.district_calls.lock().unwrap().is_empty());

        let wrong_district = FakePincodeLookup::with("682001", "Kerala", "Kottayam");
        assert!(PincodeEnricher::new(&api, &wrong_district)
            .resolve("682001", &api.states)
            .await
            .is_none());

        let failing_api = FakeCareApi {
            fail_districts: true,
            ..FakeCareApi::kerala()
        };
        let lookup = FakePincodeLookup::with("682001", "Kerala", "Ernakulam");
        assert!(PincodeEnricher::new(&failing_api, &lookup)
            .resolve("682001", &failing_api.states)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn no_states_loaded_means_no_match() {
        let api = FakeCareApi::kerala();
        let lookup = FakePincodeLookup::with("682001", "Kerala", "Ernakulam");
        assert!(PincodeEnricher::new(&api, &lookup)
            .resolve("682001", &[])
            .await
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn notice_expires() {
        let mut notice = AutofillNotice::default();
        assert!(!notice.is_visible());

        notice.show_for(Duration::from_secs(2));
        assert!(notice.is_visible());
        tokio::time::advance(Duration::from_millis(1999)).await;
        assert!(notice.is_visible());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!notice.is_visible());
    }
}
