//! Computed cells
//!
//! A computed cell caches the result of a getter. The getter runs
//! inside a lazy effect, whose scheduler, instead of re-running it,
//! marks the cell dirty and notifies everything that read the cell.
//! The next read then re-computes the value.

// Imports
use {
	crate::{
		Effect,
		EffectOptions,
		dep_graph,
		error::ReactiveError,
		loc::Loc,
		track::{self, SourceId, SourceKind, TrackKey, TrackOp, TriggerEvent, TriggerOp},
	},
	core::{
		cell::{Cell, RefCell},
		fmt,
	},
	std::rc::{Rc, Weak},
};

/// Inner
struct Inner<T> {
	/// Id
	id: SourceId,

	/// Cached value
	value: RefCell<Option<T>>,

	/// Whether the cached value is stale
	dirty: Cell<bool>,

	/// Getter
	getter: Box<dyn Fn() -> T>,

	/// Setter
	setter: Option<Box<dyn Fn(T)>>,

	/// Effect running the getter
	effect: Effect,

	/// Where this computed was defined
	defined_loc: Loc,
}

impl<T> Inner<T> {
	/// Marks the cached value stale and notifies readers.
	fn invalidate(&self) {
		if self.dirty.replace(true) {
			return;
		}

		track::trigger(TriggerEvent::new(
			self.id,
			SourceKind::Cell,
			TriggerOp::Set,
			Some(TrackKey::Value),
		));
	}

	/// Re-computes the cached value
	fn compute(&self) {
		let value = (self.getter)();
		*self.value.borrow_mut() = Some(value);
	}
}

impl<T> Drop for Inner<T> {
	fn drop(&mut self) {
		dep_graph::release_source(self.id);
	}
}

/// Computed cell
pub struct Computed<T> {
	/// Inner
	inner: Rc<Inner<T>>,
}

impl<T: Clone + 'static> Computed<T> {
	/// Creates a new read-only computed cell.
	///
	/// The getter isn't run until the value is first read.
	#[track_caller]
	pub fn new<F>(getter: F) -> Self
	where
		F: Fn() -> T + 'static,
	{
		Self::build(Box::new(getter), None)
	}

	/// Creates a new computed cell with a setter
	#[track_caller]
	pub fn new_writable<F, S>(getter: F, setter: S) -> Self
	where
		F: Fn() -> T + 'static,
		S: Fn(T) + 'static,
	{
		Self::build(Box::new(getter), Some(Box::new(setter)))
	}

	#[track_caller]
	fn build(getter: Box<dyn Fn() -> T>, setter: Option<Box<dyn Fn(T)>>) -> Self {
		let defined_loc = Loc::caller();
		let inner = Rc::new_cyclic(|weak: &Weak<Inner<T>>| {
			let run = {
				let weak = Weak::clone(weak);
				move || {
					if let Some(inner) = weak.upgrade() {
						inner.compute();
					}
				}
			};
			let options = EffectOptions::new().lazy(true).scheduler({
				let weak = Weak::clone(weak);
				move |_| {
					if let Some(inner) = weak.upgrade() {
						inner.invalidate();
					}
				}
			});

			Inner {
				id: SourceId::next(),
				value: RefCell::new(None),
				dirty: Cell::new(true),
				getter,
				setter,
				effect: Effect::with_options(run, options),
				defined_loc,
			}
		});

		Self { inner }
	}

	/// Returns the value, re-computing it if stale.
	///
	/// Reading the value subscribes the running effect to this cell.
	pub fn get(&self) -> T {
		let inner = &self.inner;
		if inner.dirty.get() {
			match inner.effect.is_active() {
				true => inner.effect.run(),
				false => inner.compute(),
			}
			inner.dirty.set(false);
		}

		track::track(inner.id, TrackOp::Get, TrackKey::Value);

		// Note: The effect refuses to run when the getter reads this
		//       cell recursively, so there may be no value yet.
		let value = inner.value.borrow().clone();
		value.unwrap_or_else(|| (inner.getter)())
	}

	/// Writes the value through the setter.
	///
	/// Cells without a setter report the write and ignore it.
	pub fn set(&self, value: T) {
		match &self.inner.setter {
			Some(setter) => setter(value),
			None => ReactiveError::ReadonlyComputed.report(),
		}
	}
}

impl<T> Computed<T> {
	/// Returns this cell's source id
	#[must_use]
	pub fn id(&self) -> SourceId {
		self.inner.id
	}

	/// Returns the effect running the getter
	#[must_use]
	pub fn effect(&self) -> &Effect {
		&self.inner.effect
	}

	/// Returns whether this cell accepts writes
	#[must_use]
	pub fn is_writable(&self) -> bool {
		self.inner.setter.is_some()
	}

	/// Returns whether the cached value is stale
	#[must_use]
	pub fn is_dirty(&self) -> bool {
		self.inner.dirty.get()
	}
}

impl<T> Clone for Computed<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T> PartialEq for Computed<T> {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<T> Eq for Computed<T> {}

impl<T> fmt::Debug for Computed<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Computed")
			.field("id", &self.inner.id)
			.field("dirty", &self.inner.dirty.get())
			.field("defined_loc", &self.inner.defined_loc)
			.finish_non_exhaustive()
	}
}

/// Creates a read-only computed cell
#[track_caller]
pub fn computed<T, F>(getter: F) -> Computed<T>
where
	T: Clone + 'static,
	F: Fn() -> T + 'static,
{
	Computed::new(getter)
}

/// Creates a writable computed cell
#[track_caller]
pub fn computed_writable<T, F, S>(getter: F, setter: S) -> Computed<T>
where
	T: Clone + 'static,
	F: Fn() -> T + 'static,
	S: Fn(T) + 'static,
{
	Computed::new_writable(getter, setter)
}
