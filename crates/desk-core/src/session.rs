//! Registration screen session: the form wired to its remote collaborators.
//!
//! The session owns the [`RegistrationForm`], loads geography options lazily as parents
//! are chosen, and runs pincode enrichment behind a [`Debouncer`].

use crate::config::DeskConfig;
use crate::debounce::Debouncer;
use crate::enrichment::PincodeEnricher;
use crate::location::Tier;
use crate::registration::{DraftField, RegistrationForm};
use crate::remote::{CareApi, PincodeLookup};
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct RegistrationSession<A: ?Sized, L: ?Sized> {
    cfg: Arc<DeskConfig>,
    api: Arc<A>,
    lookup: Arc<L>,
    form: RegistrationForm,
    pincode_debouncer: Debouncer<String>,
    pincode_rx: mpsc::UnboundedReceiver<String>,
}

impl<A, L> RegistrationSession<A, L>
where
    A: CareApi + ?Sized,
    L: PincodeLookup + ?Sized,
{
    pub fn new(cfg: Arc<DeskConfig>, api: Arc<A>, lookup: Arc<L>) -> Self {
        let (pincode_debouncer, pincode_rx) = Debouncer::new(cfg.pincode_debounce());
        Self {
            cfg,
            api,
            lookup,
            form: RegistrationForm::new(),
            pincode_debouncer,
            pincode_rx,
        }
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RegistrationForm {
        &mut self.form
    }

    /// Loads the state list.
    pub async fn load_states(&mut self) -> bool {
        self.form.location_mut().refresh(&*self.api, Tier::State).await
    }

    /// Chooses a tier and loads the options of the tier below it.
    pub async fn select_location(&mut self, tier: Tier, id: Option<i64>) {
        self.form.select_location(tier, id);
        if let Some(child) = tier.child() {
            self.form.location_mut().refresh(&*self.api, child).await;
        }
    }

    /// Records a pincode edit and restarts the enrichment quiet period.
    pub fn set_pincode(&mut self, value: &str) {
        self.form.bind(DraftField::Pincode).set(value);
        self.pincode_debouncer.push(value.to_string());
    }

    /// Waits for the next debounced pincode and tries to enrich the form with it.
    ///
    /// Returns `true` if state and district were filled in; `false` if the lookup failed,
    /// matched nothing, or was overtaken by a newer edit.
    pub async fn next_enrichment(&mut self) -> bool {
        let Some(pincode) = self.pincode_rx.recv().await else {
            return false;
        };

        let states = self.form.location().options(Tier::State).to_vec();
        let enricher = PincodeEnricher::new(&*self.api, &*self.lookup);
        let Some(enrichment) = enricher.resolve(&pincode, &states).await else {
            return false;
        };
        if !self
            .form
            .apply_enrichment(enrichment, self.cfg.autofill_notice())
        {
            return false;
        }

        // the filled-in district is a new parent for the local body select
        self.form
            .location_mut()
            .refresh(&*self.api, Tier::LocalBody)
            .await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fakes::{FakeCareApi, FakePincodeLookup};
    use std::time::Duration;
    use url::Url;

    fn cfg() -> Arc<DeskConfig> {
        Arc::new(
            DeskConfig::new(
                Url::parse("http://care.test").unwrap(),
                Url::parse("http://pincode.test").unwrap(),
            )
            .unwrap(),
        )
    }

    fn session(
        lookup: FakePincodeLookup,
    ) -> RegistrationSession<FakeCareApi, FakePincodeLookup> {
        RegistrationSession::new(cfg(), Arc::new(FakeCareApi::kerala()), Arc::new(lookup))
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_pincode_fills_location() {
        let mut session = session(FakePincodeLookup::with("682001", "Kerala", "Ernakulam"));
        assert!(session.load_states().await);

        for partial in ["6", "68", "682", "6820", "68200", "682001"] {
            session.set_pincode(partial);
            tokio::time::sleep(Duration::from_millis(200)).await;
        }

        assert!(session.next_enrichment().await);
        assert_eq!(session.lookup.calls.lock().unwrap().as_slice(), ["682001"]);

        let draft = session.form().draft();
        assert_eq!((draft.state, draft.district), (Some(1), Some(8)));
        assert!(session.form().autofill_visible());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!session.form().autofill_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn autofilled_district_loads_local_bodies() {
        let mut session = session(FakePincodeLookup::with("682001", "Kerala", "Ernakulam"));
        session.load_states().await;

        session.set_pincode("682001");
        assert!(session.next_enrichment().await);

        let location = session.form().location();
        assert_eq!(location.selected(Tier::District), Some(8));
        assert_eq!(location.options(Tier::LocalBody).len(), 1);
        assert_eq!(location.options(Tier::LocalBody)[0].id, 80);
        assert!(!location.is_disabled(Tier::LocalBody));
        assert!(location.is_disabled(Tier::Ward));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_pincode_leaves_form_unchanged() {
        let mut session = session(FakePincodeLookup::default());
        session.load_states().await;
        session.select_location(Tier::State, Some(2)).await;

        session.set_pincode("682001");
        assert!(!session.next_enrichment().await);
        assert_eq!(session.form().draft().state, Some(2));
        assert!(!session.form().autofill_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_parents_loads_children() {
        let mut session = session(FakePincodeLookup::default());
        session.load_states().await;

        session.select_location(Tier::State, Some(1)).await;
        assert_eq!(session.form().location().options(Tier::District).len(), 2);

        session.select_location(Tier::District, Some(8)).await;
        session.select_location(Tier::LocalBody, Some(80)).await;
        assert!(!session.form().location().is_disabled(Tier::Ward));

        session.select_location(Tier::State, Some(2)).await;
        let location = session.form().location();
        assert!(location.options(Tier::LocalBody).is_empty());
        assert!(location.is_disabled(Tier::Ward));
        assert_eq!(location.options(Tier::District)[0].name, "Chennai");
    }
}
