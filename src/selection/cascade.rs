//! Multi-level dependent chains.
//!
//! The vehicle screens chain more than two linked dropdowns: brand → model →
//! year, or state → city. [`CascadeController`] applies the two-field rules of
//! [`SelectionController`](super::SelectionController) transitively down an
//! ordered list of levels: selecting at level *k* invalidates every deeper
//! level, and each level's option namespace is keyed by the selection above
//! it, so a stale child list can never survive a parent change.

use crate::core::{EntityId, FormlinkError};
use crate::selection::{DependentOption, ValidationState};
use crate::store::StoreError;

/// Static description of one cascade level.
#[derive(Debug, Clone)]
pub struct LevelSpec {
    /// Name of the level, also the base of its option namespace
    pub name: String,
    /// Whether submission requires a selection at this level
    pub required: bool,
}

impl LevelSpec {
    /// A required level.
    pub fn required(name: impl Into<String>) -> Self {
        Self { name: name.into(), required: true }
    }

    /// An optional level.
    pub fn optional(name: impl Into<String>) -> Self {
        Self { name: name.into(), required: false }
    }
}

/// Load state of one level's option list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LevelState {
    /// No options loaded; a fetch may be issued once the parent is selected.
    NotReady,
    /// A fetch is in flight.
    Loading { token: u64 },
    /// Options are loaded and selectable.
    Loaded(Vec<DependentOption>),
    /// The fetch failed; retry via [`CascadeController::retry_level`].
    Unavailable,
}

#[derive(Debug)]
struct Level {
    spec: LevelSpec,
    selected: Option<EntityId>,
    state: LevelState,
}

/// Handle for one outstanding level fetch.
///
/// `namespace` already encodes the parent selection (`"model:7"` for models of
/// brand 7), so the option source can be queried without re-deriving context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelFetch {
    /// Index of the level being loaded
    pub level: usize,
    /// Namespace to query the option source with
    pub namespace: String,
    token: u64,
}

/// An ordered chain of dependent selection levels.
///
/// Drive it with a fetch loop: call [`next_fetch`], perform the fetch, feed
/// the result to [`complete_fetch`], repeat until `next_fetch` returns `None`.
/// After every [`select`] the loop picks up whichever deeper level became
/// fetchable.
///
/// [`next_fetch`]: CascadeController::next_fetch
/// [`complete_fetch`]: CascadeController::complete_fetch
/// [`select`]: CascadeController::select
#[derive(Debug)]
pub struct CascadeController {
    levels: Vec<Level>,
    next_token: u64,
}

impl CascadeController {
    /// Create a chain from its level specs, in root-to-leaf order.
    pub fn new(specs: impl IntoIterator<Item = LevelSpec>) -> Self {
        let levels = specs
            .into_iter()
            .map(|spec| Level { spec, selected: None, state: LevelState::NotReady })
            .collect();
        Self { levels, next_token: 0 }
    }

    /// Number of levels in the chain.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the chain has no levels.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The selected id at `level`, if the level exists and has one.
    pub fn selected(&self, level: usize) -> Option<&EntityId> {
        self.levels.get(level).and_then(|l| l.selected.as_ref())
    }

    /// The loaded option list at `level`, if it finished loading.
    pub fn loaded_options(&self, level: usize) -> Option<&[DependentOption]> {
        match self.levels.get(level).map(|l| &l.state) {
            Some(LevelState::Loaded(options)) => Some(options),
            _ => None,
        }
    }

    /// Issue the next pending fetch, marking that level as loading.
    ///
    /// A level is fetchable when it has never been loaded (`NotReady`) and its
    /// parent level has a selection (the root level is always eligible).
    /// Failed levels are not retried automatically; see
    /// [`retry_level`](Self::retry_level).
    pub fn next_fetch(&mut self) -> Option<LevelFetch> {
        let idx = self.levels.iter().enumerate().position(|(i, level)| {
            matches!(level.state, LevelState::NotReady)
                && (i == 0 || self.levels[i - 1].selected.is_some())
        })?;

        self.next_token += 1;
        let token = self.next_token;
        let namespace = self.namespace_for(idx);
        self.levels[idx].state = LevelState::Loading { token };
        tracing::debug!(level = idx, namespace = %namespace, "issuing cascade fetch");
        Some(LevelFetch { level: idx, namespace, token })
    }

    /// Reset a failed level so the fetch loop picks it up again.
    pub fn retry_level(&mut self, level: usize) -> Result<(), FormlinkError> {
        let len = self.levels.len();
        let entry = self
            .levels
            .get_mut(level)
            .ok_or(FormlinkError::InvalidLevel { level, len })?;
        if entry.state == LevelState::Unavailable {
            entry.state = LevelState::NotReady;
        }
        Ok(())
    }

    /// Install the result of a level fetch.
    ///
    /// Returns `true` if applied. Stale fetches - the level was invalidated by
    /// a parent change, or a newer fetch superseded this one - are discarded
    /// without touching state.
    pub fn complete_fetch(
        &mut self,
        fetch: LevelFetch,
        result: Result<Vec<DependentOption>, StoreError>,
    ) -> bool {
        let Some(level) = self.levels.get_mut(fetch.level) else {
            return false;
        };
        match level.state {
            LevelState::Loading { token } if token == fetch.token => {}
            _ => {
                tracing::debug!(level = fetch.level, "discarding stale cascade fetch");
                return false;
            }
        }

        level.state = match result {
            Ok(options) => LevelState::Loaded(options),
            Err(error) => {
                tracing::warn!(level = fetch.level, %error, "cascade fetch failed");
                LevelState::Unavailable
            }
        };
        true
    }

    /// Set or clear the selection at `level`.
    ///
    /// Every deeper level is cleared unconditionally - selections and loaded
    /// option lists both, since their namespaces were keyed by the value that
    /// just changed. A non-empty id must be present in the level's loaded
    /// options or the call is rejected with state unchanged.
    pub fn select(&mut self, level: usize, id: Option<EntityId>) -> Result<(), FormlinkError> {
        let len = self.levels.len();
        let entry = self
            .levels
            .get_mut(level)
            .ok_or(FormlinkError::InvalidLevel { level, len })?;

        match id {
            None => entry.selected = None,
            Some(id) => {
                let valid = matches!(
                    &entry.state,
                    LevelState::Loaded(options) if options.iter().any(|o| o.id == id)
                );
                if !valid {
                    tracing::warn!(level, id = %id, "rejected cascade selection");
                    return Err(FormlinkError::InvalidSelection { id });
                }
                entry.selected = Some(id);
            }
        }

        for deeper in &mut self.levels[level + 1..] {
            deeper.selected = None;
            deeper.state = LevelState::NotReady;
        }
        tracing::debug!(level, "cascade selection changed, deeper levels cleared");
        Ok(())
    }

    /// Validate the whole chain.
    ///
    /// `Incomplete` while any level is still loading, or while any required
    /// level has no selection.
    pub fn validation_state(&self) -> ValidationState {
        for level in &self.levels {
            if matches!(level.state, LevelState::Loading { .. }) {
                return ValidationState::Incomplete;
            }
            if level.spec.required && level.selected.is_none() {
                return ValidationState::Incomplete;
            }
        }
        ValidationState::Valid
    }

    /// Namespace for a level fetch: the root level queries by its own name,
    /// deeper levels append the parent selection (`"model:7"`).
    fn namespace_for(&self, level: usize) -> String {
        if level == 0 {
            return self.levels[0].spec.name.clone();
        }
        match &self.levels[level - 1].selected {
            Some(parent) => format!("{}:{}", self.levels[level].spec.name, parent),
            None => self.levels[level].spec.name.clone(),
        }
    }
}
