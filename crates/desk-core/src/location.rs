//! Cascading geography selection: state → district → local body → ward.
//!
//! [`LocationCascade`] is a small state machine over the four tiers. Selecting a tier
//! clears every tier below it. Each tier's options live in a slot keyed by the parent id
//! they were fetched for; a fetch is only started once the parent is chosen, and its
//! result is only accepted while that parent is still selected and no newer fetch for the
//! tier has been started. Switching parents therefore supersedes in-flight fetches without
//! cancelling them.

use crate::remote::{CareApi, GeographyNode};
use crate::DeskResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    State,
    District,
    LocalBody,
    Ward,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::State, Tier::District, Tier::LocalBody, Tier::Ward];

    fn index(self) -> usize {
        self as usize
    }

    pub fn parent(self) -> Option<Tier> {
        match self {
            Tier::State => None,
            Tier::District => Some(Tier::State),
            Tier::LocalBody => Some(Tier::District),
            Tier::Ward => Some(Tier::LocalBody),
        }
    }

    pub fn child(self) -> Option<Tier> {
        match self {
            Tier::State => Some(Tier::District),
            Tier::District => Some(Tier::LocalBody),
            Tier::LocalBody => Some(Tier::Ward),
            Tier::Ward => None,
        }
    }

    /// Tiers strictly below this one, nearest first.
    pub fn descendants(self) -> impl Iterator<Item = Tier> {
        Tier::ALL.into_iter().filter(move |t| *t > self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::State => "state",
            Tier::District => "district",
            Tier::LocalBody => "local_body",
            Tier::Ward => "ward",
        }
    }
}

/// What a tier's options were fetched for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentKey {
    /// The state list has no parent.
    Root,
    Node(i64),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OptionsStatus {
    #[default]
    Idle,
    Loading,
    Ready(Vec<GeographyNode>),
    Failed,
}

#[derive(Clone, Debug, Default)]
struct OptionSlot {
    key: Option<ParentKey>,
    generation: u64,
    status: OptionsStatus,
}

/// Receipt for a started fetch; hand it back with the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub tier: Tier,
    pub key: ParentKey,
    generation: u64,
}

#[derive(Clone, Debug, Default)]
pub struct LocationCascade {
    selection: [Option<i64>; 4],
    slots: [OptionSlot; 4],
}

impl LocationCascade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self, tier: Tier) -> Option<i64> {
        self.selection[tier.index()]
    }

    pub fn selected_node(&self, tier: Tier) -> Option<&GeographyNode> {
        let id = self.selected(tier)?;
        self.options(tier).iter().find(|n| n.id == id)
    }

    /// Sets `tier` and clears every descendant selection.
    pub fn select(&mut self, tier: Tier, id: Option<i64>) {
        self.selection[tier.index()] = id;
        for descendant in tier.descendants() {
            self.selection[descendant.index()] = None;
        }
        for descendant in tier.descendants() {
            let current = self.parent_key(descendant);
            let slot = &mut self.slots[descendant.index()];
            if slot.key.is_some() && slot.key != current {
                slot.key = None;
                slot.status = OptionsStatus::Idle;
            }
        }
    }

    /// The key a fetch for `tier` would use, or `None` while its parent is unset.
    pub fn parent_key(&self, tier: Tier) -> Option<ParentKey> {
        match tier.parent() {
            None => Some(ParentKey::Root),
            Some(parent) => self.selected(parent).map(ParentKey::Node),
        }
    }

    pub fn is_enabled(&self, tier: Tier) -> bool {
        self.parent_key(tier).is_some()
    }

    fn current_slot(&self, tier: Tier) -> Option<&OptionSlot> {
        let slot = &self.slots[tier.index()];
        (slot.key.is_some() && slot.key == self.parent_key(tier)).then_some(slot)
    }

    /// Options valid for the currently selected parent.
    pub fn options(&self, tier: Tier) -> &[GeographyNode] {
        match self.current_slot(tier).map(|s| &s.status) {
            Some(OptionsStatus::Ready(nodes)) => nodes,
            _ => &[],
        }
    }

    pub fn is_loading(&self, tier: Tier) -> bool {
        matches!(
            self.current_slot(tier).map(|s| &s.status),
            Some(OptionsStatus::Loading)
        )
    }

    /// Whether the select for `tier` should refuse input.
    ///
    /// The state select is only disabled while loading; lower tiers are also disabled
    /// until their parent is chosen and while they have no options.
    pub fn is_disabled(&self, tier: Tier) -> bool {
        match tier {
            Tier::State => self.is_loading(tier),
            _ => !self.is_enabled(tier) || self.is_loading(tier) || self.options(tier).is_empty(),
        }
    }

    /// Starts a fetch for `tier`, or returns `None` if its parent is unset.
    pub fn begin_fetch(&mut self, tier: Tier) -> Option<FetchTicket> {
        let key = self.parent_key(tier)?;
        let slot = &mut self.slots[tier.index()];
        slot.generation += 1;
        slot.key = Some(key);
        slot.status = OptionsStatus::Loading;
        Some(FetchTicket {
            tier,
            key,
            generation: slot.generation,
        })
    }

    /// Applies a fetch result unless it has been superseded.
    ///
    /// Returns `true` if the result was applied.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: DeskResult<Vec<GeographyNode>>,
    ) -> bool {
        let current_key = self.parent_key(ticket.tier);
        let slot = &mut self.slots[ticket.tier.index()];
        if slot.generation != ticket.generation || current_key != Some(ticket.key) {
            tracing::debug!(
                tier = ticket.tier.label(),
                key = ?ticket.key,
                "discarding stale options"
            );
            return false;
        }

        slot.status = match result {
            Ok(nodes) => OptionsStatus::Ready(nodes),
            Err(e) => {
                tracing::warn!(tier = ticket.tier.label(), error = %e, "failed to load options");
                OptionsStatus::Failed
            }
        };
        true
    }

    /// Installs options fetched elsewhere for the given parent.
    ///
    /// Ignored unless `key` is the tier's current parent. Any in-flight fetch for the tier
    /// is superseded.
    pub fn seed(&mut self, tier: Tier, key: ParentKey, nodes: Vec<GeographyNode>) -> bool {
        if self.parent_key(tier) != Some(key) {
            return false;
        }
        let slot = &mut self.slots[tier.index()];
        slot.generation += 1;
        slot.key = Some(key);
        slot.status = OptionsStatus::Ready(nodes);
        true
    }

    /// Fetches and applies options for `tier` in one step.
    pub async fn refresh<A: CareApi + ?Sized>(&mut self, api: &A, tier: Tier) -> bool {
        let Some(ticket) = self.begin_fetch(tier) else {
            return false;
        };
        let result = fetch_options(api, ticket).await;
        self.finish_fetch(ticket, result)
    }
}

/// Issues the remote call behind a ticket.
pub async fn fetch_options<A: CareApi + ?Sized>(
    api: &A,
    ticket: FetchTicket,
) -> DeskResult<Vec<GeographyNode>> {
    match (ticket.tier, ticket.key) {
        (Tier::State, _) => api.list_states().await,
        (_, ParentKey::Root) => Ok(Vec::new()),
        (Tier::District, ParentKey::Node(id)) => api.districts_by_state(id).await,
        (Tier::LocalBody, ParentKey::Node(id)) => api.local_bodies_by_district(id).await,
        (Tier::Ward, ParentKey::Node(id)) => api.wards_by_local_body(id).await,
    }
}
