//! Core types, error handling, and identifier normalization.
//!
//! This module provides the foundation types shared by every other part of
//! formlink:
//!
//! - [`EntityId`] - the normalized identifier used for parents, children, and
//!   dependent options
//! - [`FormlinkError`] - the error taxonomy surfaced to calling forms
//! - [`ErrorContext`] / [`user_friendly_error`] - user-facing rendering with
//!   the "saved but incomplete" vs "nothing saved" severity split

pub mod error;
pub mod error_formatting;
pub mod id;

pub use error::FormlinkError;
pub use error_formatting::{ErrorContext, Severity, user_friendly_error};
pub use id::EntityId;
