//! Shared fixtures for unit and integration tests.
//!
//! Available to integration tests through the `test-utils` feature (enabled by
//! the self dev-dependency in `Cargo.toml`). Everything here is test
//! infrastructure: failure-injecting wrappers around the in-memory store so
//! partial and total reconciliation failures can be produced on demand.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::EntityId;
use crate::selection::DependentOption;
use crate::store::memory::MemoryStore;
use crate::store::{AssociationStore, OptionSource, ParentStore, StoreError};

/// Association store wrapper that fails selected operations.
///
/// Delegates to an inner [`MemoryStore`]; adds and removes for the configured
/// child ids fail with [`StoreError::Unreachable`] before reaching the inner
/// store, and reads can be failed wholesale.
#[derive(Debug, Default)]
pub struct FlakyAssociationStore {
    inner: MemoryStore,
    fail_adds: Mutex<HashSet<EntityId>>,
    fail_removes: Mutex<HashSet<EntityId>>,
    fail_reads: Mutex<bool>,
}

impl FlakyAssociationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped store, for seeding and snapshots.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Make `add_association` fail for `child`.
    pub async fn fail_add(&self, child: EntityId) {
        self.fail_adds.lock().await.insert(child);
    }

    /// Make `remove_association` fail for `child`.
    pub async fn fail_remove(&self, child: EntityId) {
        self.fail_removes.lock().await.insert(child);
    }

    /// Make `read_associations` fail until cleared.
    pub async fn fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().await = fail;
    }

    /// Clear every injected failure.
    pub async fn clear_failures(&self) {
        self.fail_adds.lock().await.clear();
        self.fail_removes.lock().await.clear();
        *self.fail_reads.lock().await = false;
    }

    fn unreachable(operation: &str) -> StoreError {
        StoreError::Unreachable {
            operation: operation.to_string(),
            reason: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl AssociationStore for FlakyAssociationStore {
    async fn read_associations(&self, parent: &EntityId) -> Result<BTreeSet<EntityId>, StoreError> {
        if *self.fail_reads.lock().await {
            return Err(Self::unreachable("read_associations"));
        }
        self.inner.read_associations(parent).await
    }

    async fn add_association(
        &self,
        parent: &EntityId,
        child: &EntityId,
    ) -> Result<(), StoreError> {
        if self.fail_adds.lock().await.contains(child) {
            return Err(Self::unreachable("add_association"));
        }
        self.inner.add_association(parent, child).await
    }

    async fn remove_association(
        &self,
        parent: &EntityId,
        child: &EntityId,
    ) -> Result<(), StoreError> {
        if self.fail_removes.lock().await.contains(child) {
            return Err(Self::unreachable("remove_association"));
        }
        self.inner.remove_association(parent, child).await
    }
}

/// Parent store that always fails, for "nothing saved" paths.
#[derive(Debug, Default)]
pub struct FailingParentStore;

#[async_trait]
impl ParentStore for FailingParentStore {
    type Record = serde_json::Value;

    async fn save(&self, _record: &Self::Record) -> Result<EntityId, StoreError> {
        Err(StoreError::Unreachable {
            operation: "save".to_string(),
            reason: "injected failure".to_string(),
        })
    }
}

/// Option source that always fails, for unavailable-namespace paths.
#[derive(Debug, Default)]
pub struct FailingOptionSource;

#[async_trait]
impl OptionSource for FailingOptionSource {
    async fn fetch_options(&self, namespace: &str) -> Result<Vec<DependentOption>, StoreError> {
        Err(StoreError::Unreachable {
            operation: format!("fetch_options({namespace})"),
            reason: "injected failure".to_string(),
        })
    }
}

/// Build a `BTreeSet` of numeric ids.
pub fn id_set(values: &[i64]) -> BTreeSet<EntityId> {
    values.iter().map(|&v| EntityId::from(v)).collect()
}
