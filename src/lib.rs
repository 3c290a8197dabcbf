//! formlink - form selection and association synchronization
//!
//! The reusable core behind the console's create/edit screens. Every screen in the
//! admin console follows the same shape: a classifier dropdown gates a dependent
//! dropdown (holder type → holder, state → city, brand → model → year), and the
//! record being edited carries one or more many-to-many link sets (policy ↔
//! coverages, vehicle ↔ drivers) that must be written back when the form is saved.
//! Historically each screen reimplemented this logic by hand; this crate is the
//! single implementation all of them share.
//!
//! # Architecture Overview
//!
//! formlink is a library contract, not a service. It owns two pieces of logic and
//! the seam between them:
//!
//! - **Selection**: [`selection::SelectionController`] keeps a classifier field and
//!   its dependent field internally consistent. Changing the classifier always
//!   clears the dependent value, and a dependent id is only accepted when it exists
//!   in the option list loaded for the active classifier. Option lists are fetched
//!   asynchronously per namespace and cached for the lifetime of the form;
//!   [`selection::FetchTicket`] tokens suppress stale fetch results.
//!   [`selection::cascade::CascadeController`] generalizes the same rules to
//!   chains of three or more linked dropdowns.
//! - **Reconciliation**: [`reconcile::reconcile`] diffs the persisted child-id set
//!   of a parent record against the set the user edited, and applies only the
//!   minimal additions and removals. Partial failures are reported id-by-id and
//!   never invalidate the parent record itself.
//! - **Submission**: [`form::FormFlow`] ties the two together in the mandated
//!   order: validate the selection, save the parent, then reconcile associations
//!   against the returned parent id.
//!
//! Persistence is abstracted behind the [`store`] traits; the console's database
//! layer implements them, and [`store::memory::MemoryStore`] provides the
//! in-memory reference implementation used throughout the test suites.
//!
//! # Core Modules
//!
//! - [`core`] - Identifier normalization, the error taxonomy, and user-facing
//!   error rendering
//! - [`selection`] - Dependent selection controller and multi-level cascades
//! - [`reconcile`] - Diff-based association reconciliation
//! - [`form`] - Per-form submission orchestration
//! - [`store`] - Collaborator traits and the in-memory reference store
//! - [`config`] - TOML-backed dependent-requirement policies
//!
//! # Example
//!
//! ```rust,no_run
//! use formlink::form::FormFlow;
//! use formlink::selection::AlwaysRequired;
//! use formlink::store::memory::MemoryStore;
//! use formlink::core::EntityId;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = MemoryStore::new();
//! let mut form: FormFlow<String> = FormFlow::new();
//!
//! // Classifier first; the returned ticket drives the option fetch.
//! if let Some(ticket) = form.selection_mut().set_classifier(Some("individual".to_string())) {
//!     form.fetch_into(&store, ticket).await?;
//! }
//! form.selection_mut().set_dependent(Some(EntityId::from(7)))?;
//!
//! // Desired link set as edited on screen, then one submit call.
//! form.set_desired_children([EntityId::from(2), EntityId::from(3)]);
//! let record = serde_json::json!({ "kind": "policy" });
//! let outcome = form.submit(&record, &store, &store, &AlwaysRequired).await?;
//! println!("saved parent {}", outcome.parent());
//! # Ok(())
//! # }
//! ```
//!
//! # Failure Semantics
//!
//! The taxonomy in [`core::FormlinkError`] mirrors what the screens need to tell
//! the user. The critical distinction: a submit that fails before the parent save
//! means *nothing was saved*, while a reconciliation problem after the save means
//! *the record saved but its linked items may be incomplete*. The two must never
//! be collapsed into one generic failure message, and
//! [`core::user_friendly_error`] renders them at different severities.

// Core functionality modules
pub mod config;
pub mod constants;
pub mod core;
pub mod form;
pub mod reconcile;
pub mod selection;
pub mod store;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
