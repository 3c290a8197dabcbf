//! Dependent selection control.
//!
//! A create/edit screen pairs a classifier field (holder type, vehicle
//! category) with a dependent field whose valid choices are scoped to the
//! classifier's namespace. The two rules every screen used to reimplement by
//! hand live here once:
//!
//! 1. Changing the classifier *always* clears the dependent value. Two
//!    namespaces may reuse the same raw id (individual #7 and organization #7
//!    are unrelated), so a carried-over id is never valid.
//! 2. A dependent id is only accepted if it exists in the option list loaded
//!    for the current classifier. An id applied before the option fetch
//!    finished, or left over from a previous classifier, is rejected with
//!    state unchanged.
//!
//! The controller is a plain invariant-preserving data structure: it performs
//! no IO itself. When a namespace needs loading it hands the caller a
//! [`FetchTicket`]; the caller fetches through its [`OptionSource`] and passes
//! the result back to [`SelectionController::complete_fetch`], which discards
//! stale tickets. One controller per form instance; nothing is shared between
//! forms.
//!
//! [`OptionSource`]: crate::store::OptionSource

pub mod cascade;
mod options;


use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::core::{EntityId, FormlinkError};
use crate::store::StoreError;

pub use options::{DependentOption, FetchTicket, NamespaceState};

/// A classifier value: the top-level category that scopes which dependent
/// options are valid.
///
/// Forms typically implement this on an enum; the namespace name is what the
/// option source is queried with.
pub trait Classifier: Clone + Eq + Hash + fmt::Debug {
    /// Stable name of the option namespace this value selects from.
    fn namespace(&self) -> &str;
}

/// Plain strings act as their own namespace; handy in tests and for screens
/// whose classifier set is data-driven.
impl Classifier for String {
    fn namespace(&self) -> &str {
        self
    }
}

/// Caller-supplied rule for whether a classifier value requires a dependent.
///
/// The screens disagree on this ("general client" needs no organization, a
/// titled policy always needs a holder), so the rule is policy, not hard-coded.
pub trait DependentPolicy<C> {
    /// Whether submission requires a non-empty dependent for `classifier`.
    fn requires_dependent(&self, classifier: &C) -> bool;
}

/// Policy: every classifier value requires a dependent.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRequired;

impl<C> DependentPolicy<C> for AlwaysRequired {
    fn requires_dependent(&self, _classifier: &C) -> bool {
        true
    }
}

/// Policy: the dependent is always optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRequired;

impl<C> DependentPolicy<C> for NeverRequired {
    fn requires_dependent(&self, _classifier: &C) -> bool {
        false
    }
}

/// Result of validating a selection ahead of submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    /// The selection cannot be submitted yet.
    Incomplete,
    /// The selection satisfies the policy.
    Valid,
}

/// A snapshot of the two linked fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<C> {
    /// The classifier value, if one is chosen
    pub classifier: Option<C>,
    /// The dependent id, if one is chosen
    pub dependent_id: Option<EntityId>,
}

/// Keeps a classifier field and its dependent field internally consistent.
///
/// See the [module docs](self) for the invariants. All state is owned by the
/// controller; option lists are cached per namespace for the lifetime of the
/// form instance.
#[derive(Debug)]
pub struct SelectionController<C: Classifier> {
    classifier: Option<C>,
    dependent: Option<EntityId>,
    namespaces: HashMap<C, NamespaceState>,
    next_token: u64,
}

impl<C: Classifier> Default for SelectionController<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Classifier> SelectionController<C> {
    /// Create a controller with nothing selected and no namespaces cached.
    pub fn new() -> Self {
        Self { classifier: None, dependent: None, namespaces: HashMap::new(), next_token: 0 }
    }

    /// The currently selected classifier, if any.
    pub fn classifier(&self) -> Option<&C> {
        self.classifier.as_ref()
    }

    /// The currently selected dependent id, if any.
    pub fn dependent(&self) -> Option<&EntityId> {
        self.dependent.as_ref()
    }

    /// Snapshot both fields.
    pub fn selection(&self) -> Selection<C> {
        Selection { classifier: self.classifier.clone(), dependent_id: self.dependent.clone() }
    }

    /// Replace the classifier.
    ///
    /// The dependent id is cleared unconditionally, even when `classifier`
    /// equals the current value; the clear is idempotent and always safe.
    /// Returns a [`FetchTicket`] whenever the namespace is not already loaded:
    /// never fetched, previously failed, or still in flight (the new ticket
    /// supersedes the old one, whose late result will be discarded by the
    /// token check - this is also the recovery path when a caller abandoned an
    /// earlier fetch).
    pub fn set_classifier(&mut self, classifier: Option<C>) -> Option<FetchTicket<C>> {
        self.dependent = None;
        tracing::debug!(classifier = ?classifier, "classifier changed, dependent cleared");
        self.classifier = classifier.clone();

        let classifier = classifier?;
        match self.namespaces.get(&classifier) {
            Some(NamespaceState::Loaded(_)) => None,
            Some(NamespaceState::Unavailable | NamespaceState::Loading { .. }) | None => {
                self.next_token += 1;
                let token = self.next_token;
                self.namespaces
                    .insert(classifier.clone(), NamespaceState::Loading { token });
                Some(FetchTicket { classifier, token })
            }
        }
    }

    /// Install the result of an option fetch.
    ///
    /// Returns `true` if the result was applied. A ticket whose token is no
    /// longer the one recorded for its namespace is stale - the fetch was
    /// superseded - and is discarded without touching state.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket<C>,
        result: Result<Vec<DependentOption>, StoreError>,
    ) -> bool {
        let current = match self.namespaces.get(&ticket.classifier) {
            Some(NamespaceState::Loading { token }) => *token,
            _ => {
                tracing::debug!(ticket = ticket.token, "discarding fetch for settled namespace");
                return false;
            }
        };
        if current != ticket.token {
            tracing::debug!(
                ticket = ticket.token,
                current,
                "discarding stale fetch result"
            );
            return false;
        }

        let state = match result {
            Ok(options) => NamespaceState::Loaded(options),
            Err(error) => {
                tracing::warn!(
                    namespace = ticket.classifier.namespace(),
                    %error,
                    "option fetch failed; namespace unavailable until retried"
                );
                NamespaceState::Unavailable
            }
        };
        self.namespaces.insert(ticket.classifier, state);
        true
    }

    /// Set or clear the dependent id.
    ///
    /// Clearing always succeeds. A non-empty id is accepted only when it is
    /// present in the *loaded* option list of the current classifier;
    /// otherwise the call is rejected with
    /// [`FormlinkError::InvalidSelection`] and the selection is unchanged.
    pub fn set_dependent(&mut self, id: Option<EntityId>) -> Result<(), FormlinkError> {
        let Some(id) = id else {
            self.dependent = None;
            return Ok(());
        };

        if self.loaded_options().is_some_and(|opts| opts.iter().any(|o| o.id == id)) {
            self.dependent = Some(id);
            Ok(())
        } else {
            tracing::warn!(id = %id, "rejected dependent id outside the active option list");
            Err(FormlinkError::InvalidSelection { id })
        }
    }

    /// The loaded option list for the active classifier, if it finished
    /// loading.
    pub fn loaded_options(&self) -> Option<&[DependentOption]> {
        match self.active_namespace() {
            Some(NamespaceState::Loaded(options)) => Some(options),
            _ => None,
        }
    }

    /// Load state of the active classifier's namespace.
    pub fn active_namespace(&self) -> Option<&NamespaceState> {
        self.classifier.as_ref().and_then(|c| self.namespaces.get(c))
    }

    /// Validate the selection against a [`DependentPolicy`].
    ///
    /// `Incomplete` when no classifier is chosen, when the active namespace is
    /// still loading (a pending fetch must block submission rather than let an
    /// empty dependent slip through), or when the policy requires a dependent
    /// and none is set.
    pub fn validation_state(&self, policy: &impl DependentPolicy<C>) -> ValidationState {
        let Some(classifier) = &self.classifier else {
            return ValidationState::Incomplete;
        };
        if matches!(self.namespaces.get(classifier), Some(NamespaceState::Loading { .. }) | None) {
            return ValidationState::Incomplete;
        }
        if self.dependent.is_none() && policy.requires_dependent(classifier) {
            return ValidationState::Incomplete;
        }
        ValidationState::Valid
    }
}
