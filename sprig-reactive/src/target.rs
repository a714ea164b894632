//! Targets
//!
//! A target is a raw, untracked, object. Observing it through a
//! [`Reactive`] handle is what makes reads and writes visible to effects.

// Imports
use {
	crate::{
		Reactive,
		Value,
		dep_graph,
		reactive::{HandleInner, Mode},
		track::{SourceId, SourceKind},
	},
	core::{
		cell::{Cell, RefCell},
		fmt,
		hash::{Hash, Hasher},
	},
	indexmap::{IndexMap, IndexSet},
	std::{
		collections::HashMap,
		rc::{Rc, Weak},
	},
};

/// Target contents
#[derive(Clone, Debug)]
pub enum Data {
	/// Named fields, in insertion order
	Record(IndexMap<Rc<str>, Value>),

	/// Indexed values
	Sequence(Vec<Value>),

	/// Key-value entries, in insertion order
	Map(IndexMap<Value, Value>),

	/// Unique values, in insertion order
	Set(IndexSet<Value>),
}

impl Data {
	/// Returns the shape of this data
	#[must_use]
	pub const fn kind(&self) -> SourceKind {
		match self {
			Self::Record(_) => SourceKind::Record,
			Self::Sequence(_) => SourceKind::Sequence,
			Self::Map(_) => SourceKind::Map,
			Self::Set(_) => SourceKind::Set,
		}
	}

	/// Returns the number of fields, values or entries
	#[must_use]
	pub fn len(&self) -> usize {
		match self {
			Self::Record(fields) => fields.len(),
			Self::Sequence(values) => values.len(),
			Self::Map(entries) => entries.len(),
			Self::Set(values) => values.len(),
		}
	}

	/// Returns whether this data is empty
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Target inner
struct Inner {
	/// Id
	id: SourceId,

	/// Data
	data: RefCell<Data>,

	/// Whether new fields may be added
	extensible: Cell<bool>,

	/// Whether this target must never be observed
	skip: Cell<bool>,

	/// Observed handles, by mode
	handles: RefCell<HashMap<Mode, Weak<HandleInner>>>,
}

impl Drop for Inner {
	fn drop(&mut self) {
		dep_graph::release_source(self.id);
	}
}

/// Target
#[derive(Clone)]
pub struct Target {
	/// Inner
	inner: Rc<Inner>,
}

impl Target {
	/// Creates a target from its data
	#[must_use]
	pub fn new(data: Data) -> Self {
		let inner = Inner {
			id:         SourceId::next(),
			data:       RefCell::new(data),
			extensible: Cell::new(true),
			skip:       Cell::new(false),
			handles:    RefCell::new(HashMap::new()),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Creates a record target
	pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<Rc<str>>,
		V: Into<Value>,
	{
		let fields = fields
			.into_iter()
			.map(|(key, value)| (key.into(), value.into()))
			.collect();
		Self::new(Data::Record(fields))
	}

	/// Creates a sequence target
	pub fn sequence<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
		Self::new(Data::Sequence(values.into_iter().map(V::into).collect()))
	}

	/// Creates a map target
	pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<Value>,
		V: Into<Value>,
	{
		let entries = entries
			.into_iter()
			.map(|(key, value)| (key.into(), value.into()))
			.collect();
		Self::new(Data::Map(entries))
	}

	/// Creates a set target
	pub fn set<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
		Self::new(Data::Set(values.into_iter().map(V::into).collect()))
	}

	/// Returns this target's id
	#[must_use]
	pub fn id(&self) -> SourceId {
		self.inner.id
	}

	/// Returns this target's shape
	#[must_use]
	pub fn kind(&self) -> SourceKind {
		self.inner.data.borrow().kind()
	}

	/// Returns the raw number of fields, values or entries
	#[must_use]
	pub fn len(&self) -> usize {
		self.inner.data.borrow().len()
	}

	/// Returns whether this target is empty
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns whether new fields may be added to this target
	#[must_use]
	pub fn is_extensible(&self) -> bool {
		self.inner.extensible.get()
	}

	/// Prevents new fields from being added to this target.
	///
	/// A non-extensible target can't be observed.
	pub fn prevent_extensions(&self) {
		self.inner.extensible.set(false);
	}

	/// Returns whether this target was marked raw
	#[must_use]
	pub fn is_marked_raw(&self) -> bool {
		self.inner.skip.get()
	}

	/// Marks this target so it's never observed
	pub fn mark_raw(&self) {
		self.inner.skip.set(true);
	}

	/// Reads a value without tracking.
	///
	/// Records are indexed by property name, sequences by index (or `"length"`),
	/// and maps by key. Missing entries, and sets, yield `undefined`.
	#[must_use]
	pub fn get(&self, key: &Value) -> Value {
		match &*self.inner.data.borrow() {
			Data::Record(fields) => fields.get(&*key.to_property_key()).cloned().unwrap_or_default(),
			Data::Sequence(values) => match key.as_index() {
				Some(idx) => values.get(idx).cloned().unwrap_or_default(),
				None if key.as_str() == Some("length") => Value::from(values.len()),
				None => Value::Undefined,
			},
			Data::Map(entries) => entries.get(key).cloned().unwrap_or_default(),
			Data::Set(_) => Value::Undefined,
		}
	}

	/// Accesses the data of this target
	pub fn with_data<O>(&self, f: impl FnOnce(&Data) -> O) -> O {
		f(&self.inner.data.borrow())
	}

	/// Mutably accesses the data of this target, without triggering anything
	pub fn with_data_mut<O>(&self, f: impl FnOnce(&mut Data) -> O) -> O {
		f(&mut self.inner.data.borrow_mut())
	}

	/// Returns the live handle for `mode`, if any
	pub(crate) fn cached_handle(&self, mode: Mode) -> Option<Reactive> {
		self.inner
			.handles
			.borrow()
			.get(&mode)
			.and_then(Weak::upgrade)
			.map(Reactive::from_inner)
	}

	/// Caches `handle` as the handle for `mode`
	pub(crate) fn cache_handle(&self, mode: Mode, handle: &Rc<HandleInner>) {
		self.inner.handles.borrow_mut().insert(mode, Rc::downgrade(handle));
	}
}

impl PartialEq for Target {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Target {}

impl Hash for Target {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.inner.id.hash(state);
	}
}

impl fmt::Debug for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("Target");
		s.field("id", &self.inner.id);
		match self.inner.data.try_borrow() {
			Ok(data) => s.field("kind", &data.kind()).field("len", &data.len()),
			Err(_) => s.field("data", &"<borrowed>"),
		};
		s.finish_non_exhaustive()
	}
}

impl fmt::Display for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self.inner.data.try_borrow().map(|data| data.kind()) {
			Ok(SourceKind::Sequence) => "[object Array]",
			Ok(SourceKind::Map) => "[object Map]",
			Ok(SourceKind::Set) => "[object Set]",
			_ => "[object Object]",
		};
		f.pad(name)
	}
}

/// Creates a record target
///
/// ```
/// let point = sprig_reactive::record! { x: 1, y: 2 };
/// assert_eq!(point.len(), 2);
/// ```
#[macro_export]
macro_rules! record {
	() => {
		$crate::Target::new($crate::Data::Record(::core::default::Default::default()))
	};

	($($key:ident: $value:expr),* $(,)?) => {
		$crate::Target::record([$((stringify!($key), $crate::Value::from($value))),*])
	};
}
