//! Per-form submission orchestration.
//!
//! A [`FormFlow`] owns everything one create/edit screen needs between open
//! and save: the selection controller for its classifier/dependent pair and
//! the association set as the user edits it. `submit` runs the persistence
//! sequence in the only order that is valid:
//!
//! 1. validate the selection (a loading option list blocks submission),
//! 2. save the parent record,
//! 3. reconcile associations against the id the save returned.
//!
//! The outcome encodes the severity split the screens must surface: an error
//! from `submit` means *nothing was saved*; an `Ok` outcome always means the
//! parent record is persisted, with [`SubmitOutcome`] describing how much of
//! the link set made it.
//!
//! `submit` takes `&mut self`, so a second submission for the same form
//! instance cannot start while one is outstanding - the "no overlapping
//! reconcile calls per parent" contract is enforced by the borrow checker
//! rather than a runtime lock. A caller that abandons a submission mid-await
//! simply drops the future; results of abandoned store calls are never
//! applied to the flow.


use std::collections::BTreeSet;

use uuid::Uuid;

use crate::core::{EntityId, FormlinkError};
use crate::reconcile::{PartialReconciliation, ReconcileOutcome, reconcile};
use crate::selection::{
    Classifier, DependentPolicy, FetchTicket, NamespaceState, SelectionController,
    ValidationState,
};
use crate::store::{AssociationStore, OptionSource, ParentStore, StoreError};

/// Result of a submission whose parent record was persisted.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Parent and every association operation applied.
    Saved {
        /// Id of the saved parent record
        parent: EntityId,
        /// What the reconciliation did
        links: ReconcileOutcome,
    },
    /// Parent saved; some association operations failed.
    LinksIncomplete {
        /// Id of the saved parent record
        parent: EntityId,
        /// Which operations applied and which did not
        partial: PartialReconciliation,
    },
    /// Parent saved; no association operation could be applied.
    LinksFailed {
        /// Id of the saved parent record
        parent: EntityId,
        /// The store failure that stopped the reconciliation
        error: StoreError,
    },
}

impl SubmitOutcome {
    /// Id of the parent record, which is persisted in every variant.
    pub const fn parent(&self) -> &EntityId {
        match self {
            Self::Saved { parent, .. }
            | Self::LinksIncomplete { parent, .. }
            | Self::LinksFailed { parent, .. } => parent,
        }
    }

    /// Whether the association set fully matches what the user edited.
    pub const fn fully_applied(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// The link-phase failure as a typed error, for user-facing rendering.
    ///
    /// `None` when everything applied. The returned error renders at warning
    /// severity: the record itself was saved.
    pub fn link_failure(&self) -> Option<FormlinkError> {
        match self {
            Self::Saved { .. } => None,
            Self::LinksIncomplete { partial, .. } => {
                Some(FormlinkError::PartialReconciliation(partial.clone()))
            }
            Self::LinksFailed { parent, error } => Some(FormlinkError::ReconciliationFailed {
                parent: parent.clone(),
                source: error.clone(),
            }),
        }
    }
}

/// State of one form instance: its selection pair and its edited link set.
#[derive(Debug)]
pub struct FormFlow<C: Classifier> {
    id: Uuid,
    selection: SelectionController<C>,
    desired_children: BTreeSet<EntityId>,
}

impl<C: Classifier> Default for FormFlow<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Classifier> FormFlow<C> {
    /// Create a fresh form instance with nothing selected and no links.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            selection: SelectionController::new(),
            desired_children: BTreeSet::new(),
        }
    }

    /// Instance id, carried on every log event of this form.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The selection controller for read access.
    pub const fn selection(&self) -> &SelectionController<C> {
        &self.selection
    }

    /// The selection controller for edits.
    pub fn selection_mut(&mut self) -> &mut SelectionController<C> {
        &mut self.selection
    }

    /// Replace the desired link set wholesale (ids are normalized on entry).
    pub fn set_desired_children(&mut self, children: impl IntoIterator<Item = EntityId>) {
        self.desired_children = children.into_iter().collect();
    }

    /// Tick one child in the link set.
    pub fn add_child(&mut self, child: EntityId) {
        self.desired_children.insert(child);
    }

    /// Untick one child from the link set.
    pub fn remove_child(&mut self, child: &EntityId) {
        self.desired_children.remove(child);
    }

    /// The link set as currently edited.
    pub const fn desired_children(&self) -> &BTreeSet<EntityId> {
        &self.desired_children
    }

    /// Fetch the options for `ticket` and install the result.
    ///
    /// Convenience glue between [`SelectionController::set_classifier`] and an
    /// [`OptionSource`]. A fetch failure marks the namespace unavailable
    /// (zero options until the classifier is re-selected) and surfaces as
    /// [`FormlinkError::OptionsUnavailable`] so the screen can tell the user.
    pub async fn fetch_into<S: OptionSource + ?Sized>(
        &mut self,
        source: &S,
        ticket: FetchTicket<C>,
    ) -> Result<(), FormlinkError> {
        let namespace = ticket.classifier.namespace().to_string();
        let result = source.fetch_options(&namespace).await;
        let error = result.as_ref().err().cloned();
        self.selection.complete_fetch(ticket, result);
        match error {
            Some(source) => Err(FormlinkError::OptionsUnavailable { namespace, source }),
            None => Ok(()),
        }
    }

    /// Run the submission sequence: validate, save the parent, reconcile.
    ///
    /// # Errors
    ///
    /// - [`FormlinkError::IncompleteForm`] - the selection did not validate;
    ///   nothing was persisted
    /// - [`FormlinkError::NothingSaved`] - the parent save failed; nothing was
    ///   persisted and the reconciler was never invoked
    ///
    /// Association problems are *not* errors here: the parent is already
    /// saved at that point, and the [`SubmitOutcome`] variants carry the
    /// detail.
    pub async fn submit<P, A, D>(
        &mut self,
        record: &P::Record,
        parents: &P,
        associations: &A,
        policy: &D,
    ) -> Result<SubmitOutcome, FormlinkError>
    where
        P: ParentStore + ?Sized,
        A: AssociationStore + ?Sized,
        D: DependentPolicy<C>,
    {
        if let Some(reason) = self.incomplete_reason(policy) {
            tracing::warn!(form = %self.id, reason = %reason, "submission refused");
            return Err(FormlinkError::IncompleteForm { reason });
        }

        let parent = parents
            .save(record)
            .await
            .map_err(|source| FormlinkError::NothingSaved { source })?;
        tracing::info!(form = %self.id, parent = %parent, "parent record saved");

        // The save has completed; only now is there a valid id to reconcile
        // against.
        match reconcile(associations, &parent, &self.desired_children).await {
            Ok(links) => {
                tracing::info!(form = %self.id, parent = %parent, "associations reconciled");
                Ok(SubmitOutcome::Saved { parent, links })
            }
            Err(FormlinkError::PartialReconciliation(partial)) => {
                Ok(SubmitOutcome::LinksIncomplete { parent, partial })
            }
            Err(FormlinkError::ReconciliationFailed { source, .. }) => {
                Ok(SubmitOutcome::LinksFailed { parent, error: source })
            }
            Err(other) => Err(other),
        }
    }

    /// Why the selection cannot be submitted, if it cannot.
    fn incomplete_reason<D: DependentPolicy<C>>(&self, policy: &D) -> Option<String> {
        if self.selection.validation_state(policy) == ValidationState::Valid {
            return None;
        }
        let Some(classifier) = self.selection.classifier() else {
            return Some("no classifier selected".to_string());
        };
        match self.selection.active_namespace() {
            Some(NamespaceState::Loading { .. }) | None => {
                Some(format!("options for '{}' are still loading", classifier.namespace()))
            }
            _ => Some(format!("a selection is required for '{}'", classifier.namespace())),
        }
    }
}
