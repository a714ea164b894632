//! Errors

// Imports
use crate::track::SourceKind;

/// Reactive error.
///
/// None of these are fatal: the operation that produced one is
/// skipped (or falls back to the raw value) and the error is logged.
#[derive(PartialEq, Eq, Clone, Debug, thiserror::Error)]
pub enum ReactiveError {
	/// Value isn't an object
	#[error("Value of type `{type_name}` cannot be made reactive")]
	InvalidTarget { type_name: &'static str },

	/// Target was marked raw
	#[error("Target was marked raw and cannot be made reactive")]
	MarkedRaw,

	/// Target is not extensible
	#[error("Target is not extensible and cannot be made reactive")]
	NotExtensible,

	/// Mutation through a readonly handle
	#[error("Cannot {op} key `{key}`: target is readonly")]
	ReadonlyMutation { op: &'static str, key: String },

	/// Operation doesn't apply to the target's shape
	#[error("Operation `{op}` is not supported on a {kind}")]
	Unsupported { op: &'static str, kind: SourceKind },

	/// Both the raw and observed version of an object are keys of the same collection
	#[error(
		"Both the raw and reactive versions of the same object were used as keys of a {kind}, which can lead to \
		 inconsistencies"
	)]
	IdentityKeyConflict { kind: SourceKind },

	/// Write to a computed cell without a setter
	#[error("Computed value is readonly")]
	ReadonlyComputed,

	/// Sequence length isn't a valid index
	#[error("Invalid sequence length: {value}")]
	InvalidLength { value: String },

	/// Sequence couldn't be grown
	#[error("Unable to grow sequence to length {len}: {err}")]
	OutOfMemory { len: usize, err: String },
}

impl ReactiveError {
	/// Logs this error
	pub fn report(&self) {
		match self {
			Self::MarkedRaw => tracing::trace!("{self}"),
			_ => tracing::warn!("{self}"),
		}
	}
}
