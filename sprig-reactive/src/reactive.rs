//! Reactive handles
//!
//! A [`Reactive`] handle observes a single [`Target`]: reads through it
//! are tracked and writes through it trigger the effects that read them.
//!
//! Deep handles wrap nested objects lazily, when they're read, using the
//! same mode as the handle they were read through.

// Modules
mod base;
mod collection;
mod sequence;

// Imports
use {
	crate::{
		Target,
		Value,
		error::ReactiveError,
		track::{self, SourceKind, TrackKey, TrackOp, TriggerEvent, TriggerOp},
	},
	core::{
		fmt,
		hash::{Hash, Hasher},
	},
	std::rc::Rc,
};

/// Observation mode
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
pub enum Mode {
	/// Tracked and mutable, wrapping nested objects
	Reactive,

	/// Tracked and mutable, top-level only
	ShallowReactive,

	/// Untracked and immutable, wrapping nested objects
	Readonly,

	/// Untracked and immutable, top-level only
	ShallowReadonly,

	/// Immutable view over a reactive handle.
	///
	/// Reads are tracked, writes are refused.
	ReadonlyReactive,
}

impl Mode {
	/// Returns whether handles in this mode refuse writes
	#[must_use]
	pub const fn is_readonly(self) -> bool {
		matches!(self, Self::Readonly | Self::ShallowReadonly | Self::ReadonlyReactive)
	}

	/// Returns whether handles in this mode leave nested objects raw
	#[must_use]
	pub const fn is_shallow(self) -> bool {
		matches!(self, Self::ShallowReactive | Self::ShallowReadonly)
	}

	/// Returns whether handles in this mode track reads
	#[must_use]
	pub const fn tracks(self) -> bool {
		matches!(self, Self::Reactive | Self::ShallowReactive | Self::ReadonlyReactive)
	}
}

/// Handle inner
pub(crate) struct HandleInner {
	/// Target
	target: Target,

	/// Mode
	mode: Mode,
}

/// Reactive handle
#[derive(Clone)]
pub struct Reactive {
	/// Inner
	inner: Rc<HandleInner>,
}

impl Reactive {
	/// Observes `value` in `mode`.
	///
	/// Observing the same target twice in the same mode yields the same handle.
	/// Observing a handle returns it as-is, except that a readonly view may be
	/// taken of a tracked handle.
	pub fn try_new(value: impl Into<Value>, mode: Mode) -> Result<Self, ReactiveError> {
		match value.into() {
			Value::Reactive(handle) => handle.rewrap(mode),
			Value::Target(target) => Self::observe(&target, mode),
			value => Err(ReactiveError::InvalidTarget {
				type_name: value.type_name(),
			}),
		}
	}

	/// Wraps an existing handle
	fn rewrap(self, mode: Mode) -> Result<Self, ReactiveError> {
		let current = self.mode();
		match mode.is_readonly() && !current.is_readonly() {
			true => Self::observe(self.target(), Mode::ReadonlyReactive),
			false => Ok(self),
		}
	}

	/// Observes a raw target
	fn observe(target: &Target, mode: Mode) -> Result<Self, ReactiveError> {
		if target.is_marked_raw() {
			return Err(ReactiveError::MarkedRaw);
		}
		if !target.is_extensible() {
			return Err(ReactiveError::NotExtensible);
		}

		if let Some(handle) = target.cached_handle(mode) {
			return Ok(handle);
		}

		let inner = Rc::new(HandleInner {
			target: target.clone(),
			mode,
		});
		target.cache_handle(mode, &inner);

		Ok(Self { inner })
	}

	/// Creates a handle from it's inner
	pub(crate) const fn from_inner(inner: Rc<HandleInner>) -> Self {
		Self { inner }
	}

	/// Returns the observed target
	#[must_use]
	pub fn target(&self) -> &Target {
		&self.inner.target
	}

	/// Returns this handle's mode
	#[must_use]
	pub fn mode(&self) -> Mode {
		self.inner.mode
	}

	/// Returns the shape of the observed target
	#[must_use]
	pub fn kind(&self) -> SourceKind {
		self.inner.target.kind()
	}

	/// Returns whether reads through this handle are tracked
	#[must_use]
	pub fn is_reactive(&self) -> bool {
		self.mode().tracks()
	}

	/// Returns whether this handle refuses writes
	#[must_use]
	pub fn is_readonly(&self) -> bool {
		self.mode().is_readonly()
	}

	/// Returns whether this handle leaves nested objects raw
	#[must_use]
	pub fn is_shallow(&self) -> bool {
		self.mode().is_shallow()
	}

	/// Reads a field, index, or map entry
	pub fn get(&self, key: impl Into<Value>) -> Value {
		let key = key.into();
		match self.kind() {
			SourceKind::Record | SourceKind::Sequence => self.base_get(&key),
			SourceKind::Map => self.collection_get(&key),
			SourceKind::Set | SourceKind::Cell => {
				self.unsupported("get");
				Value::Undefined
			},
		}
	}

	/// Writes a field, index, or map entry.
	///
	/// Returns `false` if the write was rejected.
	pub fn set(&self, key: impl Into<Value>, value: impl Into<Value>) -> bool {
		let key = key.into();
		let value = value.into();
		match self.kind() {
			SourceKind::Record | SourceKind::Sequence => self.base_set(&key, value),
			SourceKind::Map => self.collection_set(key, value),
			SourceKind::Set | SourceKind::Cell => {
				self.unsupported("set");
				false
			},
		}
	}

	/// Returns whether a field, index, or entry exists
	pub fn has(&self, key: impl Into<Value>) -> bool {
		let key = key.into();
		match self.kind() {
			SourceKind::Record | SourceKind::Sequence => self.base_has(&key),
			SourceKind::Map | SourceKind::Set => self.collection_has(&key),
			SourceKind::Cell => false,
		}
	}

	/// Deletes a field, index, or entry.
	///
	/// Returns whether it existed.
	pub fn delete(&self, key: impl Into<Value>) -> bool {
		let key = key.into();
		match self.kind() {
			SourceKind::Record | SourceKind::Sequence => self.base_delete(&key),
			SourceKind::Map | SourceKind::Set => self.collection_delete(&key),
			SourceKind::Cell => false,
		}
	}

	/// Returns all keys.
	///
	/// Records yield their field names, sequences their indices,
	/// maps their keys and sets their values.
	pub fn keys(&self) -> Vec<Value> {
		match self.kind() {
			SourceKind::Record | SourceKind::Sequence => self.base_keys(),
			SourceKind::Map | SourceKind::Set => self.collection_keys(),
			SourceKind::Cell => vec![],
		}
	}

	/// Returns all values
	pub fn values(&self) -> Vec<Value> {
		self.entries().into_iter().map(|(_, value)| value).collect()
	}

	/// Returns all entries as `(key, value)` pairs
	pub fn entries(&self) -> Vec<(Value, Value)> {
		match self.kind() {
			SourceKind::Record | SourceKind::Sequence => self
				.base_keys()
				.into_iter()
				.map(|key| {
					let value = self.base_get(&key);
					(key, value)
				})
				.collect(),
			SourceKind::Map | SourceKind::Set => self.collection_entries(),
			SourceKind::Cell => vec![],
		}
	}

	/// Calls `f` with every `(value, key)` pair
	pub fn for_each(&self, mut f: impl FnMut(Value, Value)) {
		for (key, value) in self.entries() {
			f(value, key);
		}
	}

	/// Returns the number of fields, values or entries
	pub fn len(&self) -> usize {
		match self.kind() {
			SourceKind::Record => self.base_keys().len(),
			SourceKind::Sequence => self.get_prop(&base::PropKey::Length).as_index().unwrap_or(0),
			SourceKind::Map | SourceKind::Set => self.collection_len(),
			SourceKind::Cell => 0,
		}
	}

	/// Returns whether there are no fields, values or entries
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Tracks a read, if this handle tracks
	fn track(&self, op: TrackOp, key: TrackKey) {
		if self.mode().tracks() {
			track::track(self.target().id(), op, key);
		}
	}

	/// Triggers a write
	fn trigger(&self, op: TriggerOp, key: Option<TrackKey>) {
		track::trigger(TriggerEvent::new(self.target().id(), self.kind(), op, key));
	}

	/// Wraps a value read through this handle
	fn wrap(&self, value: Value) -> Value {
		if !value.is_object() {
			return value;
		}

		let wrapped = match self.mode() {
			Mode::Reactive => Self::try_new(value.clone(), Mode::Reactive),
			Mode::Readonly => Self::try_new(value.clone(), Mode::Readonly),
			Mode::ReadonlyReactive =>
				Self::try_new(value.clone(), Mode::Reactive).and_then(|handle| Self::try_new(handle, Mode::Readonly)),
			Mode::ShallowReactive | Mode::ShallowReadonly => return value,
		};

		// Note: Nested objects that can't be observed are handed out raw
		wrapped.map_or(value, Value::Reactive)
	}

	/// Reports a rejected write
	fn readonly_violation(op: &'static str, key: impl fmt::Display) {
		ReactiveError::ReadonlyMutation {
			op,
			key: key.to_string(),
		}
		.report();
	}

	/// Reports an operation that doesn't apply to this target
	fn unsupported(&self, op: &'static str) {
		ReactiveError::Unsupported { op, kind: self.kind() }.report();
	}
}

impl PartialEq for Reactive {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Reactive {}

impl Hash for Reactive {
	fn hash<H: Hasher>(&self, state: &mut H) {
		Rc::as_ptr(&self.inner).hash(state);
	}
}

impl fmt::Debug for Reactive {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Reactive")
			.field("mode", &self.inner.mode)
			.field("target", &self.inner.target)
			.finish()
	}
}

/// Observes `value` in `mode`, logging and returning it unchanged on failure
fn observe_value(value: Value, mode: Mode) -> Value {
	match Reactive::try_new(value.clone(), mode) {
		Ok(handle) => Value::Reactive(handle),
		Err(err) => {
			err.report();
			value
		},
	}
}

/// Returns a deep, mutable, tracked view of `value`
pub fn reactive(value: impl Into<Value>) -> Value {
	self::observe_value(value.into(), Mode::Reactive)
}

/// Returns a top-level-only, mutable, tracked view of `value`
pub fn shallow_reactive(value: impl Into<Value>) -> Value {
	self::observe_value(value.into(), Mode::ShallowReactive)
}

/// Returns a deep, immutable view of `value`
pub fn readonly(value: impl Into<Value>) -> Value {
	self::observe_value(value.into(), Mode::Readonly)
}

/// Returns a top-level-only, immutable view of `value`
pub fn shallow_readonly(value: impl Into<Value>) -> Value {
	self::observe_value(value.into(), Mode::ShallowReadonly)
}

/// Returns whether reads through `value` are tracked
#[must_use]
pub fn is_reactive(value: &Value) -> bool {
	value.as_reactive().is_some_and(Reactive::is_reactive)
}

/// Returns whether `value` is a readonly handle
#[must_use]
pub fn is_readonly(value: &Value) -> bool {
	value.as_reactive().is_some_and(Reactive::is_readonly)
}

/// Returns whether `value` is any handle
#[must_use]
pub const fn is_proxy(value: &Value) -> bool {
	matches!(value, Value::Reactive(_))
}

/// Returns the raw target behind `value`, or `value` itself
#[must_use]
pub fn to_raw(value: &Value) -> Value {
	match value {
		Value::Reactive(handle) => Value::Target(handle.target().clone()),
		value => value.clone(),
	}
}

/// Marks `value` so it's never observed, returning it
pub fn mark_raw(value: impl Into<Value>) -> Value {
	let value = value.into();
	if let Value::Target(target) = &value {
		target.mark_raw();
	}

	value
}
