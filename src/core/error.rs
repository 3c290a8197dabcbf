//! Error handling for formlink.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** so form handlers can branch on exactly what
//!    went wrong
//! 2. **User-friendly rendering** (see [`error_formatting`]) that keeps the
//!    severity distinction between "nothing saved" and "saved, but linked
//!    items may be incomplete"
//!
//! All failures from external collaborators propagate as variants of
//! [`FormlinkError`]; nothing is silently swallowed except the idempotent
//! no-ops the join-table store defines (adding a pair that already exists,
//! removing one that is already gone).
//!
//! [`error_formatting`]: super::error_formatting

use thiserror::Error;

use crate::core::EntityId;
use crate::reconcile::PartialReconciliation;
use crate::store::StoreError;

/// The error taxonomy for selection, reconciliation, and form submission.
///
/// # Error Categories
///
/// ## Selection
/// - [`InvalidSelection`] - a dependent id outside the active classifier's options
/// - [`OptionsUnavailable`] - an option namespace could not be fetched
/// - [`InvalidLevel`] - a cascade operation addressed a level that does not exist
///
/// ## Reconciliation
/// - [`PartialReconciliation`] - some association operations applied, some failed
/// - [`ReconciliationFailed`] - no association operation could be applied
///
/// ## Submission
/// - [`IncompleteForm`] - the selection did not validate; nothing was persisted
/// - [`NothingSaved`] - the parent save itself failed; nothing was persisted
///
/// ## Configuration
/// - [`ConfigParseError`], [`IoError`] - policy configuration problems
///
/// [`InvalidSelection`]: FormlinkError::InvalidSelection
/// [`OptionsUnavailable`]: FormlinkError::OptionsUnavailable
/// [`InvalidLevel`]: FormlinkError::InvalidLevel
/// [`PartialReconciliation`]: FormlinkError::PartialReconciliation
/// [`ReconciliationFailed`]: FormlinkError::ReconciliationFailed
/// [`IncompleteForm`]: FormlinkError::IncompleteForm
/// [`NothingSaved`]: FormlinkError::NothingSaved
/// [`ConfigParseError`]: FormlinkError::ConfigParseError
/// [`IoError`]: FormlinkError::IoError
#[derive(Error, Debug)]
pub enum FormlinkError {
    /// A dependent id was set that does not belong to the active classifier's
    /// option set.
    ///
    /// Raised when a stale id survives a classifier change, or when an id is
    /// applied before the option fetch for the namespace has completed. The
    /// call is rejected and the selection is left unchanged; the form should
    /// re-prompt.
    #[error("'{id}' is not a valid option for the current selection")]
    InvalidSelection {
        /// The rejected dependent id
        id: EntityId,
    },

    /// The option source failed to return a list for a namespace.
    ///
    /// The namespace is treated as having zero options until the classifier is
    /// selected again (which retries the fetch). Distinct from a namespace that
    /// is still loading.
    #[error("options for '{namespace}' could not be loaded")]
    OptionsUnavailable {
        /// The namespace whose fetch failed
        namespace: String,
        /// The underlying store failure
        #[source]
        source: StoreError,
    },

    /// A cascade operation addressed a level outside the configured chain.
    #[error("cascade level {level} does not exist (chain has {len} levels)")]
    InvalidLevel {
        /// The level index that was addressed
        level: usize,
        /// Number of levels in the chain
        len: usize,
    },

    /// Some association operations in a reconcile call did not complete.
    ///
    /// The join table reflects exactly the operations that were applied; the
    /// report names every child id on both sides. Not fatal to the parent
    /// record.
    #[error(transparent)]
    PartialReconciliation(#[from] PartialReconciliation),

    /// No association operation could be applied.
    ///
    /// Either the initial read of the current associations failed, or every
    /// attempted add/remove failed (store unreachable). The whole reconcile
    /// call is safe to retry: the diff-based design makes it naturally
    /// idempotent.
    #[error("could not reconcile associations for parent '{parent}'")]
    ReconciliationFailed {
        /// The parent whose associations were being reconciled
        parent: EntityId,
        /// The first underlying store failure
        #[source]
        source: StoreError,
    },

    /// The form's selection state did not validate; submission was refused
    /// before anything was persisted.
    ///
    /// Covers an empty classifier, a missing required dependent, and options
    /// that are still loading (a loading namespace must block submission
    /// rather than letting an empty dependent slip through).
    #[error("the form is incomplete: {reason}")]
    IncompleteForm {
        /// Which part of the selection failed validation
        reason: String,
    },

    /// The parent record's own save failed; nothing was persisted.
    #[error("the record could not be saved")]
    NothingSaved {
        /// The underlying store failure
        #[source]
        source: StoreError,
    },

    /// Policy configuration file could not be parsed.
    #[error("invalid policy configuration in {file}")]
    ConfigParseError {
        /// Path of the file that failed to parse
        file: String,
        /// Specific reason for the parse failure
        reason: String,
    },

    /// IO error wrapper for reading configuration files.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FormlinkError {
    /// Whether the parent record was persisted despite this error.
    ///
    /// Drives the user-facing severity split: reconciliation problems happen
    /// strictly after a successful parent save, so the record itself is intact
    /// and the error only concerns the linked items.
    pub const fn parent_was_saved(&self) -> bool {
        matches!(self, Self::PartialReconciliation(_) | Self::ReconciliationFailed { .. })
    }
}
