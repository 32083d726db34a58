//! The active-project selection state machine.
//!
//! A client session is scoped to at most one active project. This module
//! owns that choice as an explicit state machine driven by discrete events,
//! so the core invariant - a selected id is always an element of the current
//! catalog - holds by construction at every transition rather than being
//! re-derived inside view code.
//!
//! # States
//!
//! ```text
//! Uninitialized -> Loading -> { Empty, Selected }
//! ```
//!
//! - `Uninitialized`: no session established yet.
//! - `Loading`: the session exists but the catalog has not arrived.
//! - `Empty`: the catalog is empty (or the fetch failed); nothing selected.
//! - `Selected`: exactly one project from the catalog is active.
//!
//! # Ownership of persistence
//!
//! The machine never touches storage itself. Each transition returns a
//! [`PersistEffect`] describing what the single persisted slot should become;
//! the driver applies it synchronously before the transition is considered
//! complete (write-before-return).
//!
//! # Stale results
//!
//! Every event except [`SelectionEvent::LoggedOut`] carries the identity it
//! was produced for. An event whose owner does not match the machine's
//! current owner is discarded without a state change, which is what stops a
//! slow catalog fetch from a previous login clobbering a newer session.

use serde::{Deserialize, Serialize};

use crate::types::{ProjectId, UserId};

/// What the driver must do to the persisted selection slot after a
/// transition. Exactly one slot exists per browser session; nothing outside
/// the driver writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistEffect {
    /// Leave the slot as it is.
    KeepAsIs,
    /// Write this project id into the slot.
    Write(ProjectId),
    /// Remove the slot.
    Clear,
}

/// Events driving the selection machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// A client session has been established; the catalog is not loaded yet.
    SessionStarted { owner: UserId },
    /// The first catalog load for this session finished. `restored` is the
    /// id read from the persisted slot at initialization, if any.
    CatalogLoaded {
        owner: UserId,
        restored: Option<ProjectId>,
        catalog: Vec<ProjectId>,
    },
    /// The visible catalog changed mid-session. The persisted slot is NOT
    /// re-consulted here; only the in-memory selection is reconciled.
    CatalogChanged {
        owner: UserId,
        catalog: Vec<ProjectId>,
    },
    /// The user explicitly switched projects (or cleared the selection).
    Switched {
        owner: UserId,
        selection: Option<ProjectId>,
    },
    /// The session ended.
    LoggedOut,
}

/// Current state of the selection machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionState {
    Uninitialized,
    Loading {
        owner: UserId,
    },
    Empty {
        owner: UserId,
    },
    Selected {
        owner: UserId,
        catalog: Vec<ProjectId>,
        selected: ProjectId,
    },
}

/// The selection state machine.
///
/// Non-client roles never construct one of these; their sessions have no
/// single-project scope and the consuming layer treats the absent handle as
/// "no restriction".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMachine {
    state: SelectionState,
}

impl Default for SelectionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionMachine {
    /// Create a machine in the `Uninitialized` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SelectionState::Uninitialized,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    /// The active project, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<ProjectId> {
        match &self.state {
            SelectionState::Selected { selected, .. } => Some(*selected),
            _ => None,
        }
    }

    /// The owner of the current session, if one is established.
    #[must_use]
    pub const fn owner(&self) -> Option<UserId> {
        match &self.state {
            SelectionState::Uninitialized => None,
            SelectionState::Loading { owner }
            | SelectionState::Empty { owner }
            | SelectionState::Selected { owner, .. } => Some(*owner),
        }
    }

    /// Apply an event, returning the persistence effect the driver must
    /// execute before the transition is considered durable.
    ///
    /// Events carrying an owner that does not match the current session are
    /// discarded: the state is unchanged and the effect is `KeepAsIs`.
    pub fn apply(&mut self, event: SelectionEvent) -> PersistEffect {
        match event {
            SelectionEvent::SessionStarted { owner } => self.on_session_started(owner),
            SelectionEvent::CatalogLoaded {
                owner,
                restored,
                catalog,
            } => self.on_catalog_loaded(owner, restored, catalog),
            SelectionEvent::CatalogChanged { owner, catalog } => {
                self.on_catalog_changed(owner, catalog)
            }
            SelectionEvent::Switched { owner, selection } => self.on_switched(owner, selection),
            SelectionEvent::LoggedOut => {
                self.state = SelectionState::Uninitialized;
                PersistEffect::Clear
            }
        }
    }

    fn owner_matches(&self, owner: UserId) -> bool {
        self.owner() == Some(owner)
    }

    fn on_session_started(&mut self, owner: UserId) -> PersistEffect {
        // A new login over an existing session replaces the owner; anything
        // in flight for the previous owner is now stale by definition.
        self.state = SelectionState::Loading { owner };
        PersistEffect::KeepAsIs
    }

    fn on_catalog_loaded(
        &mut self,
        owner: UserId,
        restored: Option<ProjectId>,
        catalog: Vec<ProjectId>,
    ) -> PersistEffect {
        if !matches!(self.state, SelectionState::Loading { owner: o } if o == owner) {
            // Stale load for a superseded session, or a load arriving before
            // the session was established. Either way: discard.
            return PersistEffect::KeepAsIs;
        }

        // 1. A valid persisted choice wins.
        if let Some(id) = restored
            && catalog.contains(&id)
        {
            self.state = SelectionState::Selected {
                owner,
                catalog,
                selected: id,
            };
            return PersistEffect::KeepAsIs;
        }

        // 2. Otherwise default to the catalog's first entry, keeping the
        //    slot in step with the in-memory state.
        if let Some(first) = catalog.first().copied() {
            self.state = SelectionState::Selected {
                owner,
                catalog,
                selected: first,
            };
            return PersistEffect::Write(first);
        }

        // 3. Nothing visible. A stale slot from a previous catalog is
        //    cleared so the next login starts clean.
        self.state = SelectionState::Empty { owner };
        if restored.is_some() {
            PersistEffect::Clear
        } else {
            PersistEffect::KeepAsIs
        }
    }

    fn on_catalog_changed(&mut self, owner: UserId, catalog: Vec<ProjectId>) -> PersistEffect {
        if !self.owner_matches(owner) {
            return PersistEffect::KeepAsIs;
        }

        match &self.state {
            SelectionState::Selected { selected, .. } => {
                let selected = *selected;
                if catalog.contains(&selected) {
                    self.state = SelectionState::Selected {
                        owner,
                        catalog,
                        selected,
                    };
                    PersistEffect::KeepAsIs
                } else if let Some(first) = catalog.first().copied() {
                    // The previous choice vanished: silent fallback, and the
                    // slot follows the new selection.
                    self.state = SelectionState::Selected {
                        owner,
                        catalog,
                        selected: first,
                    };
                    PersistEffect::Write(first)
                } else {
                    self.state = SelectionState::Empty { owner };
                    PersistEffect::Clear
                }
            }
            SelectionState::Empty { .. } => {
                if let Some(first) = catalog.first().copied() {
                    self.state = SelectionState::Selected {
                        owner,
                        catalog,
                        selected: first,
                    };
                    PersistEffect::Write(first)
                } else {
                    PersistEffect::KeepAsIs
                }
            }
            // A catalog change cannot outrun the initial load.
            SelectionState::Uninitialized | SelectionState::Loading { .. } => {
                PersistEffect::KeepAsIs
            }
        }
    }

    fn on_switched(&mut self, owner: UserId, selection: Option<ProjectId>) -> PersistEffect {
        if !self.owner_matches(owner) {
            return PersistEffect::KeepAsIs;
        }

        let (catalog, current) = match &self.state {
            SelectionState::Selected {
                catalog, selected, ..
            } => (catalog.clone(), Some(*selected)),
            // Switching requires a loaded, non-empty catalog.
            _ => return PersistEffect::KeepAsIs,
        };

        match selection {
            Some(id) => {
                if !catalog.contains(&id) {
                    // Not visible to this identity; refuse silently.
                    return PersistEffect::KeepAsIs;
                }
                if current == Some(id) {
                    // Idempotent: same choice, no storage churn.
                    return PersistEffect::KeepAsIs;
                }
                self.state = SelectionState::Selected {
                    owner,
                    catalog,
                    selected: id,
                };
                PersistEffect::Write(id)
            }
            None => {
                self.state = SelectionState::Empty { owner };
                PersistEffect::Clear
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pid(n: i32) -> ProjectId {
        ProjectId::new(n)
    }

    fn uid(n: i32) -> UserId {
        UserId::new(n)
    }

    fn started(owner: UserId) -> SelectionMachine {
        let mut m = SelectionMachine::new();
        m.apply(SelectionEvent::SessionStarted { owner });
        m
    }

    // No persisted selection, two visible projects: the first one wins.
    #[test]
    fn test_first_login_defaults_to_first_project() {
        let mut m = started(uid(1));
        let effect = m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![pid(1), pid(2)],
        });

        assert_eq!(m.selected(), Some(pid(1)));
        assert_eq!(effect, PersistEffect::Write(pid(1)));
    }

    // A persisted id that is still visible is restored without rewriting it.
    #[test]
    fn test_valid_persisted_selection_is_restored() {
        let mut m = started(uid(1));
        let effect = m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: Some(pid(2)),
            catalog: vec![pid(1), pid(2)],
        });

        assert_eq!(m.selected(), Some(pid(2)));
        assert_eq!(effect, PersistEffect::KeepAsIs);
    }

    // A persisted id that is no longer visible falls back to the first
    // entry, and the slot is rewritten to match.
    #[test]
    fn test_invalid_persisted_selection_falls_back_and_overwrites() {
        let mut m = started(uid(1));
        let effect = m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: Some(pid(9)),
            catalog: vec![pid(1), pid(2)],
        });

        assert_eq!(m.selected(), Some(pid(1)));
        assert_eq!(effect, PersistEffect::Write(pid(1)));
    }

    // An empty catalog lands in Empty and wipes whatever the slot held.
    #[test]
    fn test_empty_catalog_clears_stale_slot() {
        let mut m = started(uid(1));
        let effect = m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: Some(pid(9)),
            catalog: vec![],
        });

        assert!(matches!(m.state(), SelectionState::Empty { .. }));
        assert_eq!(effect, PersistEffect::Clear);
    }

    #[test]
    fn test_empty_catalog_without_slot_writes_nothing() {
        let mut m = started(uid(1));
        let effect = m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![],
        });

        assert!(matches!(m.state(), SelectionState::Empty { .. }));
        assert_eq!(effect, PersistEffect::KeepAsIs);
    }

    // A selected id is always an element of the current catalog.
    #[test]
    fn test_selected_is_always_in_catalog() {
        let mut m = started(uid(1));
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![pid(1), pid(2), pid(3)],
        });

        let events = [
            SelectionEvent::Switched {
                owner: uid(1),
                selection: Some(pid(3)),
            },
            SelectionEvent::CatalogChanged {
                owner: uid(1),
                catalog: vec![pid(2), pid(3)],
            },
            SelectionEvent::CatalogChanged {
                owner: uid(1),
                catalog: vec![pid(2)],
            },
            SelectionEvent::Switched {
                owner: uid(1),
                selection: Some(pid(9)),
            },
        ];

        for event in events {
            m.apply(event);
            if let SelectionState::Selected {
                catalog, selected, ..
            } = m.state()
            {
                assert!(catalog.contains(selected));
            }
        }
    }

    // A switch writes the slot; re-running
    // initialization with that slot restores the same selection.
    #[test]
    fn test_persistence_round_trip() {
        let mut m = started(uid(1));
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![pid(1), pid(2)],
        });
        let effect = m.apply(SelectionEvent::Switched {
            owner: uid(1),
            selection: Some(pid(2)),
        });
        assert_eq!(effect, PersistEffect::Write(pid(2)));

        // Simulated reload: fresh machine initialized from the written slot.
        let mut reloaded = started(uid(1));
        reloaded.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: Some(pid(2)),
            catalog: vec![pid(1), pid(2)],
        });
        assert_eq!(reloaded.selected(), Some(pid(2)));
    }

    // Reconciliation when the selected project disappears.
    #[test]
    fn test_reconciliation_falls_back_to_first() {
        let mut m = started(uid(1));
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: Some(pid(2)),
            catalog: vec![pid(1), pid(2)],
        });

        let effect = m.apply(SelectionEvent::CatalogChanged {
            owner: uid(1),
            catalog: vec![pid(1), pid(3)],
        });

        assert_eq!(m.selected(), Some(pid(1)));
        assert_eq!(effect, PersistEffect::Write(pid(1)));
    }

    #[test]
    fn test_reconciliation_to_empty_clears_slot() {
        let mut m = started(uid(1));
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![pid(1)],
        });

        let effect = m.apply(SelectionEvent::CatalogChanged {
            owner: uid(1),
            catalog: vec![],
        });

        assert!(matches!(m.state(), SelectionState::Empty { .. }));
        assert_eq!(effect, PersistEffect::Clear);
    }

    #[test]
    fn test_reconciliation_keeps_valid_selection() {
        let mut m = started(uid(1));
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![pid(1), pid(2)],
        });
        m.apply(SelectionEvent::Switched {
            owner: uid(1),
            selection: Some(pid(2)),
        });

        // The explicit choice survives a catalog change and does not
        // reset to the first entry.
        let effect = m.apply(SelectionEvent::CatalogChanged {
            owner: uid(1),
            catalog: vec![pid(2), pid(3)],
        });

        assert_eq!(m.selected(), Some(pid(2)));
        assert_eq!(effect, PersistEffect::KeepAsIs);
    }

    #[test]
    fn test_empty_recovers_when_catalog_grows() {
        let mut m = started(uid(1));
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![],
        });

        let effect = m.apply(SelectionEvent::CatalogChanged {
            owner: uid(1),
            catalog: vec![pid(4)],
        });

        assert_eq!(m.selected(), Some(pid(4)));
        assert_eq!(effect, PersistEffect::Write(pid(4)));
    }

    // A stale catalog load for a previous identity must not clobber the
    // state of the session that replaced it.
    #[test]
    fn test_stale_catalog_load_is_discarded() {
        let mut m = started(uid(1));

        // User B logs in before A's catalog arrives.
        m.apply(SelectionEvent::SessionStarted { owner: uid(2) });
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(2),
            restored: None,
            catalog: vec![pid(5)],
        });
        assert_eq!(m.selected(), Some(pid(5)));

        // A's fetch finally resolves. Nothing may change.
        let effect = m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![pid(1), pid(2)],
        });

        assert_eq!(effect, PersistEffect::KeepAsIs);
        assert_eq!(m.selected(), Some(pid(5)));
        assert_eq!(m.owner(), Some(uid(2)));
    }

    #[test]
    fn test_stale_switch_and_catalog_change_are_discarded() {
        let mut m = started(uid(2));
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(2),
            restored: None,
            catalog: vec![pid(5), pid(6)],
        });

        assert_eq!(
            m.apply(SelectionEvent::Switched {
                owner: uid(1),
                selection: Some(pid(6)),
            }),
            PersistEffect::KeepAsIs
        );
        assert_eq!(
            m.apply(SelectionEvent::CatalogChanged {
                owner: uid(1),
                catalog: vec![],
            }),
            PersistEffect::KeepAsIs
        );
        assert_eq!(m.selected(), Some(pid(5)));
    }

    #[test]
    fn test_switch_to_invisible_project_is_refused() {
        let mut m = started(uid(1));
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![pid(1), pid(2)],
        });

        let effect = m.apply(SelectionEvent::Switched {
            owner: uid(1),
            selection: Some(pid(99)),
        });

        assert_eq!(effect, PersistEffect::KeepAsIs);
        assert_eq!(m.selected(), Some(pid(1)));
    }

    #[test]
    fn test_switch_is_idempotent_for_storage() {
        let mut m = started(uid(1));
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![pid(1), pid(2)],
        });
        m.apply(SelectionEvent::Switched {
            owner: uid(1),
            selection: Some(pid(2)),
        });

        let effect = m.apply(SelectionEvent::Switched {
            owner: uid(1),
            selection: Some(pid(2)),
        });
        assert_eq!(effect, PersistEffect::KeepAsIs);
        assert_eq!(m.selected(), Some(pid(2)));
    }

    #[test]
    fn test_switch_to_none_clears() {
        let mut m = started(uid(1));
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![pid(1)],
        });

        let effect = m.apply(SelectionEvent::Switched {
            owner: uid(1),
            selection: None,
        });
        assert!(matches!(m.state(), SelectionState::Empty { .. }));
        assert_eq!(effect, PersistEffect::Clear);
    }

    #[test]
    fn test_logout_resets_and_clears() {
        let mut m = started(uid(1));
        m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![pid(1)],
        });

        let effect = m.apply(SelectionEvent::LoggedOut);
        assert_eq!(m.state(), &SelectionState::Uninitialized);
        assert_eq!(effect, PersistEffect::Clear);
    }

    #[test]
    fn test_load_before_session_is_discarded() {
        let mut m = SelectionMachine::new();
        let effect = m.apply(SelectionEvent::CatalogLoaded {
            owner: uid(1),
            restored: None,
            catalog: vec![pid(1)],
        });
        assert_eq!(effect, PersistEffect::KeepAsIs);
        assert_eq!(m.state(), &SelectionState::Uninitialized);
    }
}
