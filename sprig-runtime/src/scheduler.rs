//! Job scheduler
//!
//! Jobs (usually effects re-runs) are queued and flushed together in a
//! microtask, in creation order, followed by all post-flush callbacks.

// Imports
use {
	crate::{FlushError, microtask},
	core::{
		cell::{Cell, RefCell},
		fmt,
		hash::{Hash, Hasher},
		mem,
	},
	itertools::Itertools,
	sprig_reactive::{Effect, EffectId, EffectOptions, Loc},
	std::{collections::HashMap, rc::Rc},
};

/// Number of extra times a job may run within a single flush
pub const RECURSION_LIMIT: usize = 100;

/// Callback inner
struct CallbackInner {
	/// Function
	run: Box<dyn Fn()>,

	/// Id, used for ordering
	id: Cell<Option<EffectId>>,

	/// Whether this callback may re-queue itself while running
	allow_recurse: Cell<bool>,

	/// Where this callback was defined
	defined_loc: Loc,
}

/// Callback job.
///
/// Callbacks are compared by identity, so queueing the
/// same callback twice only runs it once.
#[derive(Clone)]
pub struct Callback {
	/// Inner
	inner: Rc<CallbackInner>,
}

impl Callback {
	/// Creates a new callback
	#[track_caller]
	pub fn new<F>(run: F) -> Self
	where
		F: Fn() + 'static,
	{
		let inner = CallbackInner {
			run:           Box::new(run),
			id:            Cell::new(None),
			allow_recurse: Cell::new(false),
			defined_loc:   Loc::caller(),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Orders this callback as if it were effect `id`
	#[must_use]
	pub fn with_id(self, id: EffectId) -> Self {
		self.inner.id.set(Some(id));
		self
	}

	/// Sets whether this callback may re-queue itself while running
	#[must_use]
	pub fn with_allow_recurse(self, allow_recurse: bool) -> Self {
		self.inner.allow_recurse.set(allow_recurse);
		self
	}

	/// Returns this callback's id
	#[must_use]
	pub fn id(&self) -> Option<EffectId> {
		self.inner.id.get()
	}

	/// Returns whether this callback may re-queue itself
	#[must_use]
	pub fn allows_recurse(&self) -> bool {
		self.inner.allow_recurse.get()
	}

	/// Returns where this callback was defined
	#[must_use]
	pub fn defined_loc(&self) -> Loc {
		self.inner.defined_loc
	}

	/// Calls this callback
	pub fn call(&self) {
		(self.inner.run)();
	}
}

impl PartialEq for Callback {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Callback {}

impl Hash for Callback {
	fn hash<H: Hasher>(&self, state: &mut H) {
		Rc::as_ptr(&self.inner).hash(state);
	}
}

impl fmt::Debug for Callback {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callback")
			.field("id", &self.inner.id.get())
			.field("allow_recurse", &self.inner.allow_recurse.get())
			.field("defined_loc", &self.inner.defined_loc)
			.finish_non_exhaustive()
	}
}

/// Job
#[derive(PartialEq, Eq, Clone, Hash, Debug)]
#[derive(derive_more::Display, derive_more::From)]
pub enum Job {
	/// Effect re-run
	#[display("effect {} @ {}", _0.id(), _0.defined_loc())]
	Effect(Effect),

	/// Plain callback
	#[display("callback @ {}", _0.defined_loc())]
	Callback(Callback),
}

impl Job {
	/// Returns the id this job is ordered by.
	///
	/// Jobs without an id run after those with one.
	#[must_use]
	pub fn id(&self) -> Option<EffectId> {
		match self {
			Self::Effect(effect) => Some(effect.id()),
			Self::Callback(callback) => callback.id(),
		}
	}

	/// Returns whether this job may re-queue itself while running
	#[must_use]
	pub fn allows_recurse(&self) -> bool {
		match self {
			Self::Effect(effect) => effect.allows_recurse(),
			Self::Callback(callback) => callback.allows_recurse(),
		}
	}

	/// Runs this job.
	///
	/// Stopped effects with a scheduler don't run.
	pub fn run(&self) {
		match self {
			Self::Effect(effect) => effect.run(),
			Self::Callback(callback) => callback.call(),
		}
	}
}

/// Sort key, placing jobs without an id last
fn sort_key(id: Option<EffectId>) -> (bool, Option<EffectId>) {
	(id.is_none(), id)
}

/// Queues
#[derive(Default)]
struct Queues {
	/// Jobs
	jobs: Vec<Job>,

	/// Index of the job being run
	flush_idx: usize,

	/// Whether jobs are being flushed
	is_flushing: bool,

	/// Whether a flush has been queued
	is_flush_pending: bool,

	/// Post-flush callbacks waiting for the next pass
	pending_post: Vec<Callback>,

	/// Post-flush callbacks of the current pass
	active_post: Option<Vec<Callback>>,

	/// Index of the post-flush callback being run
	post_idx: usize,
}

thread_local! {
	/// Queues
	static QUEUES: RefCell<Queues> = RefCell::new(Queues::default());
}

/// Visits per job, within a flush
type Seen = HashMap<Job, usize>;

/// Queues `job` to run in the next flush.
///
/// A job already queued at or after the current flush position isn't
/// queued again, so a running job can only re-queue itself if it allows
/// recursion.
pub fn queue_job(job: impl Into<Job>) {
	let job = job.into();
	QUEUES.with_borrow_mut(|queues| {
		let start = match queues.is_flushing && job.allows_recurse() {
			true => queues.flush_idx + 1,
			false => queues.flush_idx,
		};

		if !queues.jobs.iter().skip(start).contains(&job) {
			tracing::trace!(%job, "Queued job");
			queues.jobs.push(job);
		}
	});

	self::queue_flush();
}

/// Queues `callback` to run after the next flush's jobs
pub fn queue_post_flush_cb(callback: Callback) {
	QUEUES.with_borrow_mut(|queues| {
		let start = queues.post_idx + usize::from(callback.allows_recurse());
		let is_active = queues
			.active_post
			.as_ref()
			.is_some_and(|active| active.iter().skip(start).contains(&callback));

		if !is_active {
			queues.pending_post.push(callback);
		}
	});

	self::queue_flush();
}

/// Queues every callback in `callbacks` to run after the next flush's jobs.
///
/// Unlike [`queue_post_flush_cb`], no callback is checked against the current pass.
pub fn queue_post_flush_cbs(callbacks: impl IntoIterator<Item = Callback>) {
	QUEUES.with_borrow_mut(|queues| queues.pending_post.extend(callbacks));
	self::queue_flush();
}

/// Queues a flush, if one isn't already pending or running
fn queue_flush() {
	let should_queue = QUEUES.with_borrow_mut(|queues| {
		let should_queue = !queues.is_flushing && !queues.is_flush_pending;
		queues.is_flush_pending |= should_queue;
		should_queue
	});

	if should_queue {
		microtask::queue_microtask(self::flush_jobs);
	}
}

/// Returns whether a job is queued or a flush is running
#[must_use]
pub fn is_flushing() -> bool {
	QUEUES.with_borrow(|queues| queues.is_flushing || queues.is_flush_pending)
}

/// Records a visit of `job`, failing once it ran too many times
fn check_recursive_updates(seen: &mut Seen, job: &Job) -> Result<(), FlushError> {
	let Some(count) = seen.get_mut(job) else {
		seen.insert(job.clone(), 1);
		return Ok(());
	};

	if *count > RECURSION_LIMIT {
		return Err(FlushError::RecursiveUpdate {
			job:   job.to_string(),
			limit: RECURSION_LIMIT,
		});
	}

	*count += 1;
	Ok(())
}

/// Resets all queues, after a flush was aborted
fn reset_queues() {
	let queues = QUEUES.with_borrow_mut(mem::take);

	tracing::trace!(
		jobs = queues.jobs.len(),
		callbacks = queues.pending_post.len(),
		"Dropped queued jobs after aborted flush"
	);
	drop(queues);
}

/// Flushes all queued jobs, then all post-flush callbacks.
///
/// Repeats until both queues are empty.
fn flush_jobs() -> Result<(), FlushError> {
	QUEUES.with_borrow_mut(|queues| {
		queues.is_flush_pending = false;
		queues.is_flushing = true;
	});
	let mut completed = scopeguard::guard(false, |completed| {
		if !completed {
			self::reset_queues();
		}
	});

	let mut seen = Seen::new();
	loop {
		QUEUES.with_borrow_mut(|queues| queues.jobs.sort_by_key(|job| self::sort_key(job.id())));
		tracing::trace!(jobs = QUEUES.with_borrow(|queues| queues.jobs.len()), "Flushing jobs");

		while let Some(job) = QUEUES.with_borrow(|queues| queues.jobs.get(queues.flush_idx).cloned()) {
			self::check_recursive_updates(&mut seen, &job)?;
			job.run();
			QUEUES.with_borrow_mut(|queues| queues.flush_idx += 1);
		}

		let jobs = QUEUES.with_borrow_mut(|queues| {
			queues.flush_idx = 0;
			mem::take(&mut queues.jobs)
		});
		drop(jobs);

		self::flush_post(&mut seen)?;

		let is_done = QUEUES.with_borrow_mut(|queues| {
			let is_done = queues.jobs.is_empty() && queues.pending_post.is_empty();
			if is_done {
				queues.is_flushing = false;
			}
			is_done
		});
		if is_done {
			break;
		}
	}

	*completed = true;
	Ok(())
}

/// Runs all pending post-flush callbacks.
///
/// Used by hosts that mount synchronously.
pub fn flush_post_flush_cbs() -> Result<(), FlushError> {
	self::flush_post(&mut Seen::new())
}

/// Runs all pending post-flush callbacks, counting visits in `seen`.
///
/// If a pass is already running, the callbacks are appended to it instead.
fn flush_post(seen: &mut Seen) -> Result<(), FlushError> {
	let started = QUEUES.with_borrow_mut(|queues| {
		if queues.pending_post.is_empty() {
			return false;
		}

		let pending = mem::take(&mut queues.pending_post).into_iter().unique();
		if let Some(active) = &mut queues.active_post {
			active.extend(pending);
			return false;
		}

		let active = pending
			.sorted_by_key(|callback| self::sort_key(callback.id()))
			.collect::<Vec<_>>();
		queues.active_post = Some(active);
		queues.post_idx = 0;
		true
	});
	if !started {
		return Ok(());
	}

	scopeguard::defer! {
		let active = QUEUES.with_borrow_mut(|queues| {
			queues.post_idx = 0;
			queues.active_post.take()
		});
		drop(active);
	}

	while let Some(callback) = QUEUES.with_borrow(|queues| {
		queues
			.active_post
			.as_ref()
			.and_then(|active| active.get(queues.post_idx))
			.cloned()
	}) {
		self::check_recursive_updates(seen, &Job::Callback(callback.clone()))?;
		callback.call();
		QUEUES.with_borrow_mut(|queues| queues.post_idx += 1);
	}

	Ok(())
}

/// Extension trait to schedule effects through the job queue
#[extend::ext(name = EffectOptionsQueued)]
pub impl EffectOptions {
	/// Re-runs the effect in the next flush instead of synchronously
	#[must_use]
	fn queued(self) -> Self {
		self.scheduler(|effect| self::queue_job(effect.clone()))
	}
}
