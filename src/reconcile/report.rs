//! Reconciliation outcome reports.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::core::EntityId;
use crate::store::StoreError;

/// Which join-table operation a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpKind {
    /// An insertion into the join table
    Add,
    /// A deletion from the join table
    Remove,
}

/// One association operation that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedOp {
    /// The child id the operation was for
    pub child: EntityId,
    /// Whether it was an addition or a removal
    pub kind: OpKind,
    /// The store failure that stopped it
    pub error: StoreError,
}

/// A fully applied reconciliation.
///
/// `added`/`removed`/`unchanged` are in id order; `unchanged` lists the ids
/// that were already correct and required no store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// The parent whose associations were reconciled
    pub parent: EntityId,
    /// Child ids inserted by this call
    pub added: Vec<EntityId>,
    /// Child ids removed by this call
    pub removed: Vec<EntityId>,
    /// Child ids already correct, left untouched
    pub unchanged: Vec<EntityId>,
    /// When the reconciliation completed
    pub applied_at: DateTime<Utc>,
}

impl ReconcileOutcome {
    /// Whether the call found the join table already matching the desired set.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Some operations applied, some failed.
///
/// After this error the join table reflects exactly `added` and `removed`
/// on top of the prior state - no silent rollback, no silent completion. The
/// caller must not assume the table matches the desired set, but the parent
/// record itself remains valid; retrying the whole reconcile call picks up
/// only what is still missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "associations for parent '{parent}' partially reconciled: {applied} applied, {failures} failed",
    applied = .added.len() + .removed.len(),
    failures = .failed.len()
)]
pub struct PartialReconciliation {
    /// The parent whose associations were being reconciled
    pub parent: EntityId,
    /// Child ids that were confirmed added
    pub added: Vec<EntityId>,
    /// Child ids that were confirmed removed
    pub removed: Vec<EntityId>,
    /// Operations that did not complete, with their store errors
    pub failed: Vec<FailedOp>,
}

impl PartialReconciliation {
    /// The child ids named by the failed operations, in report order.
    pub fn failed_children(&self) -> Vec<&EntityId> {
        self.failed.iter().map(|op| &op.child).collect()
    }
}
