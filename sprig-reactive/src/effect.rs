//! Effect
//!
//! An effect is a function that is re-run whenever
//! one of the values it read changes.
//!
//! Each run first drops every subscription gathered by the previous
//! run, so an effect only ever depends on what its latest run read.

// Modules
mod options;
mod stack;

// Exports
pub use self::{
	options::{DebuggerHook, EffectOptions, Scheduler},
	stack::running,
};

// Imports
use {
	crate::{
		dep_graph::{self, DepInfo},
		loc::Loc,
		owner,
	},
	core::{
		cell::Cell,
		fmt,
		hash::{Hash, Hasher},
	},
	std::rc::Rc,
};

thread_local! {
	/// Next effect id
	static NEXT_ID: Cell<u64> = const { Cell::new(0) };
}

/// Effect id.
///
/// Ids are handed out in creation order, so an effect
/// always has a smaller id than any effect it created.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Debug)]
#[derive(derive_more::Display)]
pub struct EffectId(u64);

/// Effect inner
struct Inner {
	/// Id
	id: EffectId,

	/// Whether this effect is still active
	active: Cell<bool>,

	/// Effect runner
	run: Box<dyn Fn()>,

	/// Options
	options: EffectOptions,

	/// Where this effect was defined
	defined_loc: Loc,
}

/// Effect
#[derive(Clone)]
pub struct Effect {
	/// Inner
	inner: Rc<Inner>,
}

impl Effect {
	/// Creates a new effect and runs it once to gather dependencies.
	#[track_caller]
	pub fn new<F>(run: F) -> Self
	where
		F: Fn() + 'static,
	{
		Self::with_options(run, EffectOptions::new())
	}

	/// Creates a new effect with options.
	///
	/// Unless the effect is lazy, it is run once to gather dependencies.
	#[track_caller]
	pub fn with_options<F>(run: F, options: EffectOptions) -> Self
	where
		F: Fn() + 'static,
	{
		let id = NEXT_ID.with(|next| {
			let id = next.get();
			next.set(id + 1);
			EffectId(id)
		});

		let lazy = options.is_lazy();
		let inner = Inner {
			id,
			active: Cell::new(true),
			run: Box::new(run),
			options,
			defined_loc: Loc::caller(),
		};
		let effect = Self { inner: Rc::new(inner) };

		if !lazy {
			effect.run();
		}
		owner::adopt(&effect);

		effect
	}

	/// Returns this effect's id
	#[must_use]
	pub fn id(&self) -> EffectId {
		self.inner.id
	}

	/// Returns where this effect was defined
	#[must_use]
	pub fn defined_loc(&self) -> Loc {
		self.inner.defined_loc
	}

	/// Returns the options of this effect
	#[must_use]
	pub fn options(&self) -> &EffectOptions {
		&self.inner.options
	}

	/// Returns whether this effect is still active
	#[must_use]
	pub fn is_active(&self) -> bool {
		self.inner.active.get()
	}

	/// Returns whether this effect may re-trigger itself
	#[must_use]
	pub fn allows_recurse(&self) -> bool {
		self.inner.options.allows_recurse()
	}

	/// Returns the pointer of this effect
	///
	/// This can be used for creating maps based on equality
	#[must_use]
	pub fn inner_ptr(&self) -> *const () {
		Rc::as_ptr(&self.inner).cast()
	}

	/// Runs the effect.
	///
	/// A stopped effect with a scheduler does nothing, while one
	/// without a scheduler runs without gathering dependencies.
	/// An effect that's already running is not re-entered.
	pub fn run(&self) {
		if !self.is_active() {
			if self.inner.options.get_scheduler().is_none() {
				(self.inner.run)();
			}
			return;
		}

		if stack::contains(self) {
			return;
		}

		dep_graph::with(|graph| graph.clear_effect(self));
		let _gatherer = stack::EffectGuard::enter(self);
		(self.inner.run)();
	}

	/// Hands this effect to its scheduler, or runs it if it has none
	pub fn schedule(&self) {
		match self.inner.options.get_scheduler() {
			Some(scheduler) => scheduler(self),
			None => self.run(),
		}
	}

	/// Stops this effect.
	///
	/// Removes all of its subscriptions and prevents it from being
	/// tracked ever again. Stopping twice does nothing.
	pub fn stop(&self) {
		if !self.inner.active.replace(false) {
			return;
		}

		dep_graph::with(|graph| graph.clear_effect(self));
		tracing::trace!(effect = %self.id(), "Stopped effect");
		if let Some(on_stop) = self.inner.options.get_on_stop() {
			on_stop();
		}
	}

	/// Returns all current dependencies of this effect
	#[must_use]
	pub fn deps(&self) -> Vec<DepInfo> {
		dep_graph::with(|graph| graph.effect_deps(self))
	}
}

impl PartialEq for Effect {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Effect {}

impl Hash for Effect {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.inner_ptr().hash(state);
	}
}

impl fmt::Debug for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Effect")
			.field("id", &self.inner.id)
			.field("active", &self.inner.active.get())
			.field("defined_loc", &self.inner.defined_loc)
			.finish_non_exhaustive()
	}
}

/// Creates a new effect and runs it once
#[track_caller]
pub fn effect<F>(run: F) -> Effect
where
	F: Fn() + 'static,
{
	Effect::new(run)
}

/// Stops `effect`
pub fn stop(effect: &Effect) {
	effect.stop();
}
