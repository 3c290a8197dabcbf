//! Dependent options and per-namespace load state.

use serde::{Deserialize, Serialize};

use crate::core::EntityId;

/// One selectable value scoped to a classifier namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentOption {
    /// Identifier of the underlying entity
    pub id: EntityId,
    /// Human-readable label shown in the dropdown
    pub label: String,
}

impl DependentOption {
    /// Convenience constructor.
    pub fn new(id: impl Into<EntityId>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into() }
    }
}

/// Load state of one classifier namespace's option list.
///
/// `Unavailable` (the fetch failed; zero options until retried) is deliberately
/// distinct from `Loading`: a loading namespace blocks form submission, a
/// failed one does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceState {
    /// A fetch is in flight; `token` identifies the ticket it belongs to.
    Loading {
        /// Token of the outstanding fetch ticket
        token: u64,
    },
    /// Options are loaded and selectable.
    Loaded(Vec<DependentOption>),
    /// The fetch failed; the namespace behaves as empty until retried.
    Unavailable,
}

/// Handle for one outstanding option fetch.
///
/// Issued by the controller when a classifier change requires loading a
/// namespace. The caller performs the fetch and hands the result back together
/// with the ticket; a ticket whose token is no longer current for its
/// namespace is discarded, which is what suppresses results that arrive after
/// the user has already moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<C> {
    /// The classifier value whose namespace needs loading
    pub classifier: C,
    pub(crate) token: u64,
}

impl<C> FetchTicket<C> {
    /// The monotonically increasing token tying this ticket to one fetch.
    pub const fn token(&self) -> u64 {
        self.token
    }
}
