//! Diff-based association reconciliation.
//!
//! A parent record (a policy, a vehicle) owns a many-to-many association set
//! persisted as join-table rows. When a form is saved, the set the user edited
//! must replace the persisted one. The screens historically did this by
//! deleting every row and reinserting the desired ones, which loses data when
//! the reinsert phase dies halfway. [`reconcile`] instead:
//!
//! 1. reads the persisted child ids,
//! 2. computes the minimal add/remove sets ([`AssociationDiff`]) on normalized
//!    ids,
//! 3. applies them one at a time, continuing past individual failures,
//! 4. reports exactly which ids were applied and which were not.
//!
//! Ids present in both sets are never touched, so the call is naturally
//! idempotent: running it twice in a row performs zero operations the second
//! time, and retrying after a partial failure picks up only what is missing.
//!
//! The parent record and its associations are deliberately not transactional:
//! a reconcile failure never invalidates the parent's own save, it only
//! changes what the form reports to the user.

mod diff;
mod report;


use std::collections::BTreeSet;

use chrono::Utc;

use crate::core::{EntityId, FormlinkError};
use crate::store::AssociationStore;

pub use diff::AssociationDiff;
pub use report::{FailedOp, OpKind, PartialReconciliation, ReconcileOutcome};

/// Synchronize the join table for `parent` to match `desired`.
///
/// Removals are applied before insertions; the two phases commute under the
/// join table's `(parent, child)` uniqueness constraint, and the diff is
/// computed post-normalization so the same id can never appear in both. Each
/// operation gets a single attempt - retry policy belongs to the caller, and
/// retrying the whole call is always safe.
///
/// # Errors
///
/// - [`FormlinkError::ReconciliationFailed`] - the initial read failed, or
///   every attempted operation failed; the join table was not changed (read
///   failure) or no assumption about it held to begin with (total apply
///   failure). Retry the call.
/// - [`FormlinkError::PartialReconciliation`] - some operations applied, some
///   failed; the report names every id on both sides.
pub async fn reconcile<S: AssociationStore + ?Sized>(
    store: &S,
    parent: &EntityId,
    desired: &BTreeSet<EntityId>,
) -> Result<ReconcileOutcome, FormlinkError> {
    let current = store.read_associations(parent).await.map_err(|source| {
        FormlinkError::ReconciliationFailed { parent: parent.clone(), source }
    })?;

    let diff = AssociationDiff::between(&current, desired);
    tracing::debug!(
        parent = %parent,
        add = diff.to_add.len(),
        remove = diff.to_remove.len(),
        unchanged = diff.unchanged.len(),
        "reconciling associations"
    );

    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut failed = Vec::new();

    for child in &diff.to_remove {
        match store.remove_association(parent, child).await {
            Ok(()) => removed.push(child.clone()),
            Err(error) => {
                failed.push(FailedOp { child: child.clone(), kind: OpKind::Remove, error });
            }
        }
    }
    for child in &diff.to_add {
        match store.add_association(parent, child).await {
            Ok(()) => added.push(child.clone()),
            Err(error) => {
                failed.push(FailedOp { child: child.clone(), kind: OpKind::Add, error });
            }
        }
    }

    let Some(first_failure) = failed.first().map(|op| op.error.clone()) else {
        return Ok(ReconcileOutcome {
            parent: parent.clone(),
            added,
            removed,
            unchanged: diff.unchanged,
            applied_at: Utc::now(),
        });
    };

    if added.is_empty() && removed.is_empty() {
        // Nothing went through at all - typically the store is unreachable.
        tracing::warn!(parent = %parent, attempted = failed.len(), "reconciliation failed");
        return Err(FormlinkError::ReconciliationFailed {
            parent: parent.clone(),
            source: first_failure,
        });
    }

    tracing::warn!(
        parent = %parent,
        applied = added.len() + removed.len(),
        failed = failed.len(),
        "partial reconciliation"
    );
    Err(FormlinkError::PartialReconciliation(PartialReconciliation {
        parent: parent.clone(),
        added,
        removed,
        failed,
    }))
}
