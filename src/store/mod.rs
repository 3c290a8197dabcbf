//! External collaborator traits.
//!
//! formlink never talks to a database directly. The three seams a form needs
//! are expressed as async traits, implemented by the console's persistence
//! layer:
//!
//! - [`OptionSource`] - read-only option lists per classifier namespace
//! - [`AssociationStore`] - the join table behind a parent's association set
//! - [`ParentStore`] - saving the parent record itself (opaque here; the
//!   reconciler only needs the resulting id)
//!
//! The join table carries a uniqueness constraint on `(parent, child)`, and
//! the store contract leans on it: adding a pair that is already present and
//! removing one that is already absent are both idempotent no-ops, not errors.
//!
//! [`memory::MemoryStore`] implements all three traits in memory and backs the
//! test suites.

pub mod memory;

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::EntityId;
use crate::selection::DependentOption;

/// Failure reported by an external store.
///
/// Cloneable so that per-child failures can be carried inside a partial
/// reconciliation report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached at all.
    #[error("backend unreachable during {operation}: {reason}")]
    Unreachable {
        /// The store operation that was being attempted
        operation: String,
        /// Transport-level reason
        reason: String,
    },

    /// The backend rejected or failed the query.
    #[error("query failed: {reason}")]
    Query {
        /// Backend-reported reason
        reason: String,
    },

    /// A relational constraint other than the join-table uniqueness rule
    /// rejected the write (e.g. a foreign key on a deleted child).
    #[error("constraint violation: {reason}")]
    Constraint {
        /// Backend-reported constraint detail
        reason: String,
    },
}

/// Read-only source of dependent options, filtered by namespace.
///
/// A failed fetch means the namespace is treated as having zero options until
/// retried; the selection layer keeps that state distinct from a fetch that is
/// still in flight.
#[async_trait]
pub trait OptionSource: Send + Sync {
    /// Fetch all options belonging to one classifier namespace.
    async fn fetch_options(&self, namespace: &str) -> Result<Vec<DependentOption>, StoreError>;
}

/// The join table backing one parent's association set.
///
/// `(parent, child)` is unique; implementations must make [`add_association`]
/// on an already-present pair and [`remove_association`] on an already-absent
/// pair succeed without effect.
///
/// [`add_association`]: AssociationStore::add_association
/// [`remove_association`]: AssociationStore::remove_association
#[async_trait]
pub trait AssociationStore: Send + Sync {
    /// Read the persisted child ids for `parent`.
    async fn read_associations(&self, parent: &EntityId) -> Result<BTreeSet<EntityId>, StoreError>;

    /// Insert one `(parent, child)` row. Idempotent.
    async fn add_association(&self, parent: &EntityId, child: &EntityId)
    -> Result<(), StoreError>;

    /// Delete one `(parent, child)` row. Idempotent.
    async fn remove_association(
        &self,
        parent: &EntityId,
        child: &EntityId,
    ) -> Result<(), StoreError>;
}

/// Persistence for the parent record itself.
///
/// The record type is the store's own business; formlink only requires that a
/// successful save yields the parent id to reconcile against.
#[async_trait]
pub trait ParentStore: Send + Sync {
    /// The parent record representation this store accepts.
    type Record: Send + Sync;

    /// Insert or update the record, returning its id.
    async fn save(&self, record: &Self::Record) -> Result<EntityId, StoreError>;
}
