//! Host/screen state synchronization
//!
//! The host keeps a [`SyncSession`] holding the last snapshot it transmitted
//! for every element. Each cycle it diffs the live [`ElementState`] against
//! that snapshot and emits a [`StateUpdate`]: the whole state on first
//! contact or a forced resync, otherwise only the changed attributes. The
//! screen feeds the updates into a [`ScreenMirror`], which reports which
//! attribute categories it has to repaint.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SyncError};
use crate::flags::UpdateFlags;
use crate::state::{ElementState, StateChanges};

/// Identifies an element across host and screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One element's update for a sync cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateUpdate {
    /// Entire state; first contact, reconnect or forced resync
    Full { id: ElementId, state: ElementState },
    /// Only the attributes named by `flags`
    Incremental {
        id: ElementId,
        flags: UpdateFlags,
        changes: StateChanges,
    },
    /// The element no longer exists on the host
    Removed { id: ElementId },
}

impl StateUpdate {
    pub fn id(&self) -> ElementId {
        match self {
            StateUpdate::Full { id, .. }
            | StateUpdate::Incremental { id, .. }
            | StateUpdate::Removed { id } => *id,
        }
    }

    /// Flags describing the update on the wire
    pub fn flags(&self) -> UpdateFlags {
        match self {
            StateUpdate::Full { .. } => UpdateFlags::FULL | UpdateFlags::ATTRIBUTES,
            StateUpdate::Incremental { flags, .. } => *flags,
            StateUpdate::Removed { .. } => UpdateFlags::REMOVED,
        }
    }
}

/// Updates produced by one sync cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBatch {
    pub cycle: u64,
    pub updates: Vec<StateUpdate>,
}

impl UpdateBatch {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }
}

/// Host side of the protocol
#[derive(Debug, Default)]
pub struct SyncSession {
    sent: FxHashMap<ElementId, ElementState>,
    cycle: u64,
    /// Force a full resync every N cycles; 0 disables
    full_every: u64,
    force_full: bool,
}

impl SyncSession {
    pub fn new(full_every: u64) -> Self {
        Self {
            full_every,
            ..Default::default()
        }
    }

    /// Cycles started so far
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Start a new cycle
    pub fn begin_cycle(&mut self) -> u64 {
        self.cycle += 1;
        if self.full_every > 0 && self.cycle % self.full_every == 0 {
            debug!(cycle = self.cycle, "periodic full resync");
            self.force_full = true;
        }
        self.cycle
    }

    /// Send the whole state of every element synced before the cycle ends,
    /// e.g. after the screen asked for a resync
    pub fn force_full(&mut self) {
        self.force_full = true;
    }

    /// Finish the current cycle; a pending forced resync is considered done
    pub fn end_cycle(&mut self) {
        self.force_full = false;
    }

    /// Forget every transmitted snapshot; used when the screen reconnects
    pub fn reset(&mut self) {
        debug!(elements = self.sent.len(), "sync session reset");
        self.sent.clear();
    }

    /// Whether a snapshot for `id` has been transmitted
    pub fn is_known(&self, id: ElementId) -> bool {
        self.sent.contains_key(&id)
    }

    /// Diff `state` against the last transmitted snapshot.
    ///
    /// Clears the element's change flag. Returns `None` when nothing needs to
    /// be transmitted.
    pub fn sync(&mut self, id: ElementId, state: &mut ElementState) -> Option<StateUpdate> {
        if self.force_full {
            return Some(self.sync_full(id, state));
        }
        let Some(prior) = self.sent.get_mut(&id) else {
            return Some(self.sync_full(id, state));
        };
        if !state.is_changed() {
            return None;
        }
        state.clear_changed();

        let flags = state.update_flags(prior);
        if flags.is_empty() {
            return None;
        }
        let changes = state.changes(flags);
        *prior = state.clone();
        Some(StateUpdate::Incremental { id, flags, changes })
    }

    /// Transmit the whole state of `id` regardless of what was sent before
    pub fn sync_full(&mut self, id: ElementId, state: &mut ElementState) -> StateUpdate {
        state.clear_changed();
        self.sent.insert(id, state.clone());
        StateUpdate::Full {
            id,
            state: state.clone(),
        }
    }

    /// Run one cycle over every live element
    pub fn collect_cycle<'a>(
        &mut self,
        elements: impl IntoIterator<Item = (ElementId, &'a mut ElementState)>,
    ) -> UpdateBatch {
        let cycle = self.begin_cycle();
        let updates = elements
            .into_iter()
            .filter_map(|(id, state)| self.sync(id, state))
            .collect();
        self.end_cycle();
        UpdateBatch { cycle, updates }
    }

    /// Drop the snapshot of a removed element, producing the removal notice
    /// when the screen knew about it
    pub fn forget(&mut self, id: ElementId) -> Option<StateUpdate> {
        self.sent
            .remove(&id)
            .map(|_| StateUpdate::Removed { id })
    }
}

/// Result of applying a batch on the screen
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Elements to repaint and what changed
    pub repaint: Vec<(ElementId, UpdateFlags)>,
    /// Elements whose incremental update couldn't be applied
    pub resync: Vec<ElementId>,
}

/// Screen side of the protocol
#[derive(Debug, Default)]
pub struct ScreenMirror {
    elements: FxHashMap<ElementId, ElementState>,
}

impl ScreenMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementState> {
        self.elements.get(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.keys().copied()
    }

    /// Apply one update, returning the categories the screen has to repaint
    pub fn apply(&mut self, update: StateUpdate) -> Result<UpdateFlags> {
        match update {
            StateUpdate::Full { id, mut state } => {
                state.clear_changed();
                let flags = match self.elements.insert(id, state) {
                    Some(old) => self.elements[&id].update_flags(&old),
                    None => UpdateFlags::ATTRIBUTES,
                };
                Ok(UpdateFlags::FULL | flags)
            }
            StateUpdate::Incremental { id, flags, changes } => {
                let Some(state) = self.elements.get_mut(&id) else {
                    warn!(element = %id, "incremental update for unknown element");
                    return Err(SyncError::UnknownElement(id));
                };
                let mut applied = UpdateFlags::empty();
                for change in changes {
                    applied |= change.flag();
                    state.apply_change(change);
                }
                state.clear_changed();
                if applied != flags {
                    debug!(element = %id, ?flags, ?applied, "update flags disagree with changes");
                }
                Ok(applied)
            }
            StateUpdate::Removed { id } => {
                self.elements.remove(&id);
                Ok(UpdateFlags::REMOVED)
            }
        }
    }

    /// Apply every update in `batch`; failures are collected for resync
    pub fn apply_batch(&mut self, batch: UpdateBatch) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for update in batch.updates {
            let id = update.id();
            match self.apply(update) {
                Ok(flags) => outcome.repaint.push((id, flags)),
                Err(SyncError::UnknownElement(id)) => outcome.resync.push(id),
                Err(err) => warn!(element = %id, "failed to apply update: {err}"),
            }
        }
        outcome
    }
}
