//! In-memory reference implementation of the store traits.
//!
//! [`MemoryStore`] implements [`OptionSource`], [`AssociationStore`], and
//! [`ParentStore`] over plain maps. It backs the unit and integration suites
//! and doubles as the form-lifetime cache store in tools that run without a
//! database.
//!
//! Every association mutation is appended to an operation log so tests can
//! assert not just end state but the *number* of store calls a reconcile
//! performed (the no-op and idempotence laws).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::EntityId;
use crate::selection::DependentOption;
use crate::store::{AssociationStore, OptionSource, ParentStore, StoreError};

/// One recorded mutation against the join table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOp {
    /// An `add_association` call (whether or not the row already existed).
    Add { parent: EntityId, child: EntityId },
    /// A `remove_association` call (whether or not the row existed).
    Remove { parent: EntityId, child: EntityId },
}

#[derive(Debug, Default)]
struct Inner {
    options: HashMap<String, Vec<DependentOption>>,
    associations: HashMap<EntityId, BTreeSet<EntityId>>,
    parents: BTreeMap<EntityId, serde_json::Value>,
    join_log: Vec<JoinOp>,
    next_parent_id: i64,
}

/// In-memory store over all three collaborator traits.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { next_parent_id: 1, ..Inner::default() }) }
    }

    /// Seed the option list for one namespace.
    pub async fn seed_namespace(
        &self,
        namespace: impl Into<String>,
        options: impl IntoIterator<Item = DependentOption>,
    ) {
        let mut inner = self.inner.lock().await;
        inner.options.insert(namespace.into(), options.into_iter().collect());
    }

    /// Seed the association set for one parent.
    pub async fn seed_associations(
        &self,
        parent: impl Into<EntityId>,
        children: impl IntoIterator<Item = EntityId>,
    ) {
        let mut inner = self.inner.lock().await;
        inner.associations.insert(parent.into(), children.into_iter().collect());
    }

    /// Snapshot of the persisted child ids for `parent`.
    pub async fn associations_of(&self, parent: &EntityId) -> BTreeSet<EntityId> {
        let inner = self.inner.lock().await;
        inner.associations.get(parent).cloned().unwrap_or_default()
    }

    /// Every join-table mutation performed so far, in order.
    pub async fn join_log(&self) -> Vec<JoinOp> {
        self.inner.lock().await.join_log.clone()
    }

    /// Number of join-table mutations performed so far.
    pub async fn join_op_count(&self) -> usize {
        self.inner.lock().await.join_log.len()
    }

    /// Forget the recorded join-table mutations.
    pub async fn clear_join_log(&self) {
        self.inner.lock().await.join_log.clear();
    }

    /// The saved parent record for `id`, if any.
    pub async fn parent_record(&self, id: &EntityId) -> Option<serde_json::Value> {
        self.inner.lock().await.parents.get(id).cloned()
    }

    /// Number of parent records saved so far.
    pub async fn parent_count(&self) -> usize {
        self.inner.lock().await.parents.len()
    }
}

#[async_trait]
impl OptionSource for MemoryStore {
    async fn fetch_options(&self, namespace: &str) -> Result<Vec<DependentOption>, StoreError> {
        let inner = self.inner.lock().await;
        match inner.options.get(namespace) {
            Some(options) => Ok(options.clone()),
            None => Err(StoreError::Query { reason: format!("unknown namespace '{namespace}'") }),
        }
    }
}

#[async_trait]
impl AssociationStore for MemoryStore {
    async fn read_associations(&self, parent: &EntityId) -> Result<BTreeSet<EntityId>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.associations.get(parent).cloned().unwrap_or_default())
    }

    async fn add_association(
        &self,
        parent: &EntityId,
        child: &EntityId,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .join_log
            .push(JoinOp::Add { parent: parent.clone(), child: child.clone() });
        // Insert on an already-present pair is an idempotent no-op.
        inner.associations.entry(parent.clone()).or_default().insert(child.clone());
        Ok(())
    }

    async fn remove_association(
        &self,
        parent: &EntityId,
        child: &EntityId,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .join_log
            .push(JoinOp::Remove { parent: parent.clone(), child: child.clone() });
        if let Some(children) = inner.associations.get_mut(parent) {
            children.remove(child);
            if children.is_empty() {
                inner.associations.remove(parent);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ParentStore for MemoryStore {
    type Record = serde_json::Value;

    async fn save(&self, record: &Self::Record) -> Result<EntityId, StoreError> {
        let mut inner = self.inner.lock().await;
        // An explicit "id" field means update-in-place; otherwise allocate.
        let id = match record.get("id").and_then(|v| v.as_i64()) {
            Some(existing) => EntityId::from(existing),
            None => {
                let id = EntityId::from(inner.next_parent_id);
                inner.next_parent_id += 1;
                id
            }
        };
        inner.parents.insert(id.clone(), record.clone());
        Ok(id)
    }
}
