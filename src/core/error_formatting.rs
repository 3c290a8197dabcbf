//! User-facing error formatting.
//!
//! Converts [`FormlinkError`] values into the messages the console shows next
//! to a form. The one rule that matters here: a failure after the parent save
//! ("your record saved, but its linked items may be incomplete") and a failure
//! before it ("nothing was saved") are different severities and are never
//! merged into one generic message.

use std::fmt;

use colored::Colorize;

use crate::core::FormlinkError;

/// How prominently an error should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The main record was persisted; only secondary data is affected.
    Warning,
    /// Nothing was persisted, or the form state itself is invalid.
    Error,
}

/// Wrapper that adds a user-facing message, suggestion, and details to a
/// [`FormlinkError`].
///
/// # Examples
///
/// ```rust,no_run
/// use formlink::core::{ErrorContext, FormlinkError};
///
/// let error = FormlinkError::IncompleteForm { reason: "no holder selected".to_string() };
/// let context = ErrorContext::new(error)
///     .with_suggestion("Select a holder before saving")
///     .with_details("The holder list may still be loading");
///
/// // Display with colors in a terminal
/// context.display();
///
/// // Or get as string for logging
/// let message = format!("{}", context);
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying formlink error
    pub error: FormlinkError,
    /// How prominently to present the error
    pub severity: Severity,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context.
    ///
    /// The severity is derived from the error: anything that happened after a
    /// successful parent save is a [`Severity::Warning`], everything else a
    /// [`Severity::Error`].
    #[must_use]
    pub fn new(error: FormlinkError) -> Self {
        let severity =
            if error.parent_was_saved() { Severity::Warning } else { Severity::Error };
        Self { error, severity, suggestion: None, details: None }
    }

    /// Add an actionable suggestion, shown in green in the terminal.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error, shown in yellow in the terminal.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    pub fn display(&self) {
        match self.severity {
            Severity::Warning => eprintln!("{}: {}", "warning".yellow().bold(), self.error),
            Severity::Error => eprintln!("{}: {}", "error".red().bold(), self.error),
        }

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert a [`FormlinkError`] into a user-friendly context with suggestions
/// appropriate for each failure mode.
#[must_use]
pub fn user_friendly_error(error: FormlinkError) -> ErrorContext {
    match &error {
        FormlinkError::InvalidSelection { .. } => ErrorContext::new(error)
            .with_suggestion("Pick one of the listed options")
            .with_details("The previous choice no longer matches the selected category"),
        FormlinkError::OptionsUnavailable { namespace, .. } => {
            let details = format!("The option list for '{namespace}' could not be fetched");
            ErrorContext::new(error)
                .with_suggestion("Re-select the category to retry loading its options")
                .with_details(details)
        }
        FormlinkError::PartialReconciliation(partial) => {
            let details = format!(
                "{} linked item(s) could not be updated; the record itself was saved",
                partial.failed.len()
            );
            ErrorContext::new(error)
                .with_suggestion("Save the form again to retry the remaining linked items")
                .with_details(details)
        }
        FormlinkError::ReconciliationFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Save the form again to retry updating the linked items")
            .with_details("The record itself was saved; none of its linked items were changed"),
        FormlinkError::IncompleteForm { .. } => {
            ErrorContext::new(error).with_suggestion("Complete the highlighted fields and retry")
        }
        FormlinkError::NothingSaved { .. } => ErrorContext::new(error)
            .with_suggestion("Check the connection and save again")
            .with_details("Neither the record nor its linked items were changed"),
        _ => ErrorContext::new(error),
    }
}
