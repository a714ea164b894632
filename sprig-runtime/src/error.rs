//! Errors

/// Flush error.
///
/// Returned by the flush that produced it. The rest of
/// that flush, including any queued jobs, is dropped.
#[derive(PartialEq, Eq, Clone, Debug, thiserror::Error)]
pub enum FlushError {
	/// A job kept re-queueing itself
	#[error("Maximum recursive updates exceeded: {job} ran more than {limit} extra times within a single flush")]
	RecursiveUpdate { job: String, limit: usize },
}

/// Lifecycle error
#[derive(PartialEq, Eq, Clone, Debug, thiserror::Error)]
pub enum LifecycleError {
	/// Hook registered outside of `with_lifecycle`
	#[error("`{hook}` was called outside of a component, the hook will never run")]
	OutsideComponent { hook: &'static str },

	/// Hook registered outside of any owner scope
	#[error("`{hook}` was called outside of an owner scope, the hook will never run")]
	OutsideScope { hook: &'static str },
}

impl LifecycleError {
	/// Logs this error
	pub fn report(&self) {
		tracing::warn!("{self}");
	}
}
