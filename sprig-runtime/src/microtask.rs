//! Microtasks
//!
//! Stands in for the host's microtask checkpoint: work deferred
//! with [`queue_microtask`] runs at the next [`run_microtasks`].

// Imports
use {
	crate::FlushError,
	core::{
		cell::{Cell, RefCell},
		future::Future,
	},
	futures::FutureExt,
	std::collections::VecDeque,
};

/// Microtask
type Microtask = Box<dyn FnOnce() -> Result<(), FlushError>>;

thread_local! {
	/// Pending microtasks
	static MICROTASKS: RefCell<VecDeque<Microtask>> = const { RefCell::new(VecDeque::new()) };

	/// Whether microtasks are currently being drained
	static DRAINING: Cell<bool> = const { Cell::new(false) };
}

/// Queues `task` to run at the next checkpoint
pub fn queue_microtask(task: impl FnOnce() -> Result<(), FlushError> + 'static) {
	MICROTASKS.with_borrow_mut(|tasks| tasks.push_back(Box::new(task)));
}

/// Returns whether any microtasks are pending
#[must_use]
pub fn has_pending() -> bool {
	MICROTASKS.with_borrow(|tasks| !tasks.is_empty())
}

/// Runs all pending microtasks, including any queued while running.
///
/// Returns the first error, logging any others. Does nothing
/// when called from within a microtask.
pub fn run_microtasks() -> Result<(), FlushError> {
	if DRAINING.replace(true) {
		return Ok(());
	}
	scopeguard::defer! {
		DRAINING.set(false);
	}

	let mut first_err = None;
	while let Some(task) = MICROTASKS.with_borrow_mut(VecDeque::pop_front) {
		let Err(err) = task() else {
			continue;
		};

		match first_err {
			None => first_err = Some(err),
			Some(_) => tracing::error!(%err, "Additional error while running microtasks"),
		}
	}

	first_err.map_or(Ok(()), Err)
}

/// Returns whether microtasks are currently being drained
#[must_use]
pub fn is_draining() -> bool {
	DRAINING.get()
}

/// Returns a future that resolves once all pending work has been flushed.
///
/// When polled from within a microtask, the drain in progress can't be
/// awaited, so this resolves immediately, before the rest of the flush.
pub fn next_tick() -> impl Future<Output = Result<(), FlushError>> {
	futures::future::lazy(|_| {
		if self::is_draining() {
			tracing::trace!("Polled `next_tick` while draining microtasks, resolving before the flush ends");
		}
		self::run_microtasks()
	})
}

/// Returns a future that runs `f` once all pending work has been flushed
pub fn next_tick_then<F, O>(f: F) -> impl Future<Output = Result<O, FlushError>>
where
	F: FnOnce() -> O,
{
	self::next_tick().map(|res| res.map(|()| f()))
}
