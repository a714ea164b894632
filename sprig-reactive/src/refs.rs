//! Refs
//!
//! A ref is a settable, tracked, box holding a single value.
//! Objects stored in a ref are observed deeply.

// Imports
use {
	crate::{
		Computed,
		Value,
		dep_graph,
		reactive::{self, to_raw},
		track::{self, SourceId, SourceKind, TrackKey, TrackOp, TriggerEvent, TriggerOp},
		value::has_changed,
	},
	core::{
		cell::RefCell,
		fmt,
		hash::{Hash, Hasher},
	},
	std::rc::Rc,
};

/// Ref inner
enum Inner {
	/// Plain box
	Plain {
		/// Id
		id: SourceId,

		/// Raw value, used for change detection
		raw: RefCell<Value>,

		/// Value handed out
		value: RefCell<Value>,
	},

	/// View over a computed cell
	Computed(Computed<Value>),
}

impl Drop for Inner {
	fn drop(&mut self) {
		if let Self::Plain { id, .. } = self {
			dep_graph::release_source(*id);
		}
	}
}

/// Ref
#[derive(Clone)]
pub struct Ref {
	/// Inner
	inner: Rc<Inner>,
}

impl Ref {
	/// Creates a new ref
	pub fn new(value: impl Into<Value>) -> Self {
		let value = value.into();
		let inner = Inner::Plain {
			id:    SourceId::next(),
			raw:   RefCell::new(to_raw(&value)),
			value: RefCell::new(self::convert(value)),
		};

		Self { inner: Rc::new(inner) }
	}

	/// Returns the id of the source this ref reads from
	#[must_use]
	pub fn id(&self) -> SourceId {
		match &*self.inner {
			Inner::Plain { id, .. } => *id,
			Inner::Computed(computed) => computed.id(),
		}
	}

	/// Reads the value, subscribing the running effect
	#[must_use]
	pub fn get(&self) -> Value {
		match &*self.inner {
			Inner::Plain { id, value, .. } => {
				track::track(*id, TrackOp::Get, TrackKey::Value);
				value.borrow().clone()
			},
			Inner::Computed(computed) => computed.get(),
		}
	}

	/// Writes the value.
	///
	/// Effects are only triggered if the raw value changed.
	pub fn set(&self, new_value: impl Into<Value>) {
		let new_value = new_value.into();
		match &*self.inner {
			Inner::Plain { id, raw, value } => {
				let new_raw = to_raw(&new_value);
				if !has_changed(&new_raw, &raw.borrow()) {
					return;
				}

				let old_raw = raw.replace(new_raw);
				let old_value = value.replace(self::convert(new_value));
				track::trigger(TriggerEvent::new(*id, SourceKind::Cell, TriggerOp::Set, Some(TrackKey::Value)));

				drop((old_raw, old_value));
			},
			Inner::Computed(computed) => computed.set(new_value),
		}
	}
}

impl From<Computed<Value>> for Ref {
	fn from(computed: Computed<Value>) -> Self {
		Self {
			inner: Rc::new(Inner::Computed(computed)),
		}
	}
}

impl PartialEq for Ref {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Ref {}

impl Hash for Ref {
	fn hash<H: Hasher>(&self, state: &mut H) {
		Rc::as_ptr(&self.inner).hash(state);
	}
}

impl fmt::Debug for Ref {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &*self.inner {
			Inner::Plain { id, value, .. } => f
				.debug_struct("Ref")
				.field("id", id)
				.field("value", &value.try_borrow().map(|value| value.to_string()).ok())
				.finish(),
			Inner::Computed(computed) => f.debug_tuple("Ref").field(computed).finish(),
		}
	}
}

/// Observes objects deeply, leaving everything else as-is
fn convert(value: Value) -> Value {
	match value.is_object() {
		true => reactive::reactive(value),
		false => value,
	}
}

/// Returns whether `value` is a ref
#[must_use]
pub const fn is_ref(value: &Value) -> bool {
	matches!(value, Value::Ref(_))
}

/// Returns the inner value of `value` if it's a ref, or `value` itself
#[must_use]
pub fn unref(value: &Value) -> Value {
	match value {
		Value::Ref(inner) => inner.get(),
		value => value.clone(),
	}
}
