//! Credential store owning one adapter per configured provider.
//!
//! All writes are serialized through an async writer lock. Searches only take
//! the table's read lock long enough to clone the ready adapters, so an
//! in-flight search keeps the adapter it started with even if credentials
//! change underneath it.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::ProviderState;
use super::ProviderHealth;
use crate::errors::GlobalFoodError;
use crate::models::{BundleValidity, CredentialBundle, Credentials, ProviderKind, SkipReason};
use crate::provider::{ProviderAdapter, ProviderConnector};

/// What an `update` did to one provider.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// Bundle was already valid and did not change; the adapter was kept.
    Unchanged,
    /// A new adapter was built and is ready.
    Connected,
    /// A background handshake was started.
    Authenticating,
    /// Credentials were dropped; the adapter is gone.
    Removed,
    /// Still missing required fields.
    Incomplete,
    /// Bundle is unusable or building the adapter failed.
    Rejected(GlobalFoodError),
}

/// Per-provider outcomes of one `update`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CredentialReport {
    pub outcomes: BTreeMap<ProviderKind, UpdateOutcome>,
}

impl CredentialReport {
    pub fn outcome(&self, kind: ProviderKind) -> Option<&UpdateOutcome> {
        self.outcomes.get(&kind)
    }

    /// Providers whose credentials were rejected.
    pub fn errors(&self) -> Vec<(ProviderKind, &GlobalFoodError)> {
        self.outcomes
            .iter()
            .filter_map(|(kind, outcome)| match outcome {
                UpdateOutcome::Rejected(error) => Some((*kind, error)),
                _ => None,
            })
            .collect()
    }
}

/// Ready adapters plus the reason every other provider sits out.
pub struct StoreSnapshot {
    pub ready: Vec<Arc<dyn ProviderAdapter>>,
    pub unavailable: Vec<(ProviderKind, SkipReason)>,
}

struct Slot {
    bundle: CredentialBundle,
    state: ProviderState,
    /// Bumped on every rebuild or removal; stale handshakes compare against it.
    generation: u64,
}

impl Slot {
    fn new() -> Self {
        Self {
            bundle: CredentialBundle::new(),
            state: ProviderState::Unconfigured,
            generation: 0,
        }
    }
}

type SlotTable = BTreeMap<ProviderKind, Slot>;

/// Holds credential bundles and the provider state derived from them.
pub struct CredentialStore {
    connector: Arc<dyn ProviderConnector>,
    slots: Arc<RwLock<SlotTable>>,
    /// Writer lock. Guards the in-flight handshake tasks.
    handshakes: Mutex<BTreeMap<ProviderKind, JoinHandle<()>>>,
}

fn read_slots(slots: &RwLock<SlotTable>) -> RwLockReadGuard<'_, SlotTable> {
    slots.read().unwrap_or_else(|poisoned| {
        warn!("Credential table lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

fn write_slots(slots: &RwLock<SlotTable>) -> RwLockWriteGuard<'_, SlotTable> {
    slots.write().unwrap_or_else(|poisoned| {
        warn!("Credential table lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Store a handshake result unless a newer update superseded it.
fn install(
    slots: &RwLock<SlotTable>,
    kind: ProviderKind,
    generation: u64,
    result: Result<Arc<dyn ProviderAdapter>, GlobalFoodError>,
) {
    let mut slots = write_slots(slots);
    let Some(slot) = slots.get_mut(&kind) else {
        return;
    };
    if slot.generation != generation {
        debug!(
            "Discarding stale handshake for '{}' (generation {} != {})",
            kind, generation, slot.generation
        );
        return;
    }
    slot.state = match result {
        Ok(adapter) => {
            info!("Provider '{}' is ready", kind);
            ProviderState::Ready(adapter)
        }
        Err(error) => {
            warn!("Provider '{}' handshake failed: {}", kind, error);
            ProviderState::Failed(error)
        }
    };
}

impl CredentialStore {
    pub fn new(connector: Arc<dyn ProviderConnector>) -> Self {
        let slots = ProviderKind::ALL
            .iter()
            .map(|kind| (*kind, Slot::new()))
            .collect();
        Self {
            connector,
            slots: Arc::new(RwLock::new(slots)),
            handshakes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Merge partial credentials and rebuild the providers they affect.
    ///
    /// For each provider in `partial`:
    /// 1. Merge its fields over the stored bundle
    /// 2. Valid and unchanged: keep the current adapter
    /// 3. Valid and new or changed: rebuild (in the background when the
    ///    provider needs a handshake)
    /// 4. Invalid: drop the adapter
    pub async fn update(&self, partial: &Credentials) -> CredentialReport {
        let mut handshakes = self.handshakes.lock().await;
        let mut report = CredentialReport::default();

        for (kind, patch) in partial.iter() {
            let kind = *kind;
            let previous = read_slots(&self.slots)
                .get(&kind)
                .map(|slot| slot.bundle.clone())
                .unwrap_or_default();
            let mut merged = previous.clone();
            merged.merge(patch);

            let was_valid = previous.check(kind) == BundleValidity::Valid;
            let outcome = match merged.check(kind) {
                BundleValidity::Valid if was_valid && merged == previous => {
                    debug!("Credentials for '{}' unchanged, keeping adapter", kind);
                    UpdateOutcome::Unchanged
                }
                BundleValidity::Valid => {
                    if let Some(handle) = handshakes.remove(&kind) {
                        handle.abort();
                    }
                    let generation =
                        self.replace(kind, merged.clone(), ProviderState::Authenticating);
                    self.rebuild(kind, merged, generation, &mut handshakes).await
                }
                BundleValidity::Missing { field } => {
                    if let Some(handle) = handshakes.remove(&kind) {
                        handle.abort();
                    }
                    self.replace(kind, merged, ProviderState::Unconfigured);
                    if was_valid {
                        info!("Provider '{}' removed: '{}' no longer set", kind, field);
                        UpdateOutcome::Removed
                    } else {
                        debug!("Provider '{}' still missing '{}'", kind, field);
                        UpdateOutcome::Incomplete
                    }
                }
                BundleValidity::Blank { field } => {
                    if let Some(handle) = handshakes.remove(&kind) {
                        handle.abort();
                    }
                    let error = GlobalFoodError::InvalidCredentials {
                        provider: kind,
                        field: field.to_string(),
                    };
                    warn!("Rejected credentials: {}", error);
                    self.replace(kind, merged, ProviderState::Failed(error.clone()));
                    UpdateOutcome::Rejected(error)
                }
            };
            report.outcomes.insert(kind, outcome);
        }

        report
    }

    /// Forget every credential field of `kind` and drop its adapter.
    pub async fn remove(&self, kind: ProviderKind) -> UpdateOutcome {
        let mut handshakes = self.handshakes.lock().await;
        if let Some(handle) = handshakes.remove(&kind) {
            handle.abort();
        }
        let had_credentials = read_slots(&self.slots)
            .get(&kind)
            .map(|slot| !slot.bundle.is_empty())
            .unwrap_or(false);
        self.replace(kind, CredentialBundle::new(), ProviderState::Unconfigured);

        if had_credentials {
            info!("Provider '{}' removed", kind);
            UpdateOutcome::Removed
        } else {
            UpdateOutcome::Incomplete
        }
    }

    /// Swap in a new bundle and state, returning the new generation.
    fn replace(&self, kind: ProviderKind, bundle: CredentialBundle, state: ProviderState) -> u64 {
        let mut slots = write_slots(&self.slots);
        let slot = slots.entry(kind).or_insert_with(Slot::new);
        slot.bundle = bundle;
        slot.state = state;
        slot.generation += 1;
        slot.generation
    }

    async fn rebuild(
        &self,
        kind: ProviderKind,
        bundle: CredentialBundle,
        generation: u64,
        handshakes: &mut BTreeMap<ProviderKind, JoinHandle<()>>,
    ) -> UpdateOutcome {
        if self.connector.requires_handshake(kind) {
            info!("Starting handshake for '{}'", kind);
            let connector = Arc::clone(&self.connector);
            let slots = Arc::clone(&self.slots);
            let handle = tokio::spawn(async move {
                let result = connector.connect(kind, &bundle).await;
                install(&slots, kind, generation, result);
            });
            handshakes.insert(kind, handle);
            return UpdateOutcome::Authenticating;
        }

        let result = self.connector.connect(kind, &bundle).await;
        let outcome = match &result {
            Ok(_) => UpdateOutcome::Connected,
            Err(error) => UpdateOutcome::Rejected(error.clone()),
        };
        install(&self.slots, kind, generation, result);
        outcome
    }

    /// Ready adapters in provider order, plus skip reasons for the rest.
    pub fn snapshot(&self) -> StoreSnapshot {
        let slots = read_slots(&self.slots);
        let mut snapshot = StoreSnapshot {
            ready: Vec::new(),
            unavailable: Vec::new(),
        };
        for (kind, slot) in slots.iter() {
            match slot.state.adapter() {
                Some(adapter) => snapshot.ready.push(adapter),
                None => {
                    if let Some(reason) = slot.state.skip_reason() {
                        snapshot.unavailable.push((*kind, reason));
                    }
                }
            }
        }
        snapshot
    }

    pub fn state(&self, kind: ProviderKind) -> ProviderState {
        read_slots(&self.slots)
            .get(&kind)
            .map(|slot| slot.state.clone())
            .unwrap_or(ProviderState::Unconfigured)
    }

    pub fn states(&self) -> BTreeMap<ProviderKind, ProviderHealth> {
        read_slots(&self.slots)
            .iter()
            .map(|(kind, slot)| (*kind, slot.state.health()))
            .collect()
    }

    /// Wait until every handshake started so far has finished.
    pub async fn wait_for_handshakes(&self) {
        let pending: Vec<(ProviderKind, JoinHandle<()>)> = {
            let mut handshakes = self.handshakes.lock().await;
            std::mem::take(&mut *handshakes).into_iter().collect()
        };
        for (kind, handle) in pending {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Handshake task for '{}' ended abnormally: {}", kind, e);
                }
            }
        }
    }
}
