//! Error types for diffform-engine

use thiserror::Error;

/// Wiring mistakes in how the engine is used
///
/// These indicate programmer error rather than bad user input; the
/// non-`try_` entry points panic with them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
	/// A field was bound outside any provided form
	#[error("no form context is available; bind fields inside `provide_form` or pass a context")]
	NoContext,

	/// The form that produced this context has been dropped
	#[error("the form context has been released; its form was torn down")]
	ContextReleased,

	/// The schema declares no fields
	#[error("the schema declares no fields")]
	EmptySchema,
}

/// Failure to load a [`FormPolicy`](crate::config::FormPolicy)
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PolicyError {
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),
}
