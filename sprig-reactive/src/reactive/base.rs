//! Record and sequence access

// Imports
use {
	super::Reactive,
	crate::{
		Value,
		error::ReactiveError,
		target::Data,
		track::{self, SourceKind, TrackKey, TrackOp, TriggerEvent, TriggerOp},
		value::has_changed,
	},
	core::{fmt, mem},
	std::rc::Rc,
};

/// Property key of a record or sequence
#[derive(PartialEq, Eq, Clone, Debug)]
pub(super) enum PropKey {
	/// Record field
	Name(Rc<str>),

	/// Sequence index
	Index(usize),

	/// Sequence length
	Length,
}

impl PropKey {
	/// Returns the tracking key for this property
	fn track_key(&self) -> TrackKey {
		match self {
			Self::Name(name) => TrackKey::Prop(Rc::clone(name)),
			Self::Index(idx) => TrackKey::Index(*idx),
			Self::Length => TrackKey::Length,
		}
	}
}

impl fmt::Display for PropKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Name(name) => f.pad(name),
			Self::Index(idx) => fmt::Display::fmt(idx, f),
			Self::Length => f.pad("length"),
		}
	}
}

impl Reactive {
	/// Parses `key` as a property of this target
	fn prop_key(&self, key: &Value) -> Option<PropKey> {
		match self.kind() {
			SourceKind::Sequence => match key.as_index() {
				Some(idx) => Some(PropKey::Index(idx)),
				None if key.as_str() == Some("length") => Some(PropKey::Length),
				None => None,
			},
			_ => Some(PropKey::Name(key.to_property_key())),
		}
	}

	/// Reads a property without tracking
	pub(super) fn raw_prop(&self, prop: &PropKey) -> Value {
		self.target().with_data(|data| match (data, prop) {
			(Data::Record(fields), PropKey::Name(name)) => fields.get(name).cloned().unwrap_or_default(),
			(Data::Sequence(values), PropKey::Index(idx)) => values.get(*idx).cloned().unwrap_or_default(),
			(Data::Sequence(values), PropKey::Length) => Value::from(values.len()),
			_ => Value::Undefined,
		})
	}

	/// Returns whether a property exists, without tracking
	fn raw_has(&self, prop: &PropKey) -> bool {
		self.target().with_data(|data| match (data, prop) {
			(Data::Record(fields), PropKey::Name(name)) => fields.contains_key(name),
			(Data::Sequence(values), PropKey::Index(idx)) => *idx < values.len(),
			(Data::Sequence(_), PropKey::Length) => true,
			_ => false,
		})
	}

	pub(super) fn base_get(&self, key: &Value) -> Value {
		let Some(prop) = self.prop_key(key) else {
			self.unsupported("get");
			return Value::Undefined;
		};

		self.get_prop(&prop)
	}

	/// Reads a property.
	///
	/// Refs are unwrapped, except when read from a sequence index.
	pub(super) fn get_prop(&self, prop: &PropKey) -> Value {
		let value = self.raw_prop(prop);
		self.track(TrackOp::Get, prop.track_key());

		if self.is_shallow() {
			return value;
		}

		if let Value::Ref(inner) = &value {
			if !matches!(prop, PropKey::Index(_)) {
				return inner.get();
			}
		}

		self.wrap(value)
	}

	pub(super) fn base_set(&self, key: &Value, value: Value) -> bool {
		let Some(prop) = self.prop_key(key) else {
			self.unsupported("set");
			return false;
		};

		if self.is_readonly() {
			Self::readonly_violation("set", &prop);
			return true;
		}

		self.set_prop(&prop, value)
	}

	/// Writes a property.
	///
	/// Deep handles store the raw version of `value`, and a ref
	/// stored in a record field is written through, unless
	/// `value` is itself a ref.
	pub(super) fn set_prop(&self, prop: &PropKey, value: Value) -> bool {
		let old = self.raw_prop(prop);
		let mut value = value;
		if !self.is_shallow() {
			value = super::to_raw(&value);

			if self.kind() != SourceKind::Sequence {
				if let Value::Ref(old) = &old {
					if !matches!(value, Value::Ref(_)) {
						old.set(value);
						return true;
					}
				}
			}
		}

		if *prop == PropKey::Length {
			return self.set_len_raw(&value);
		}

		let extensible = self.target().is_extensible();
		let had_key = self.target().with_data_mut(|data| match (data, prop) {
			(Data::Record(fields), PropKey::Name(name)) => {
				let had_key = fields.contains_key(name);
				if !had_key && !extensible {
					return None;
				}

				fields.insert(Rc::clone(name), value.clone());
				Some(had_key)
			},
			(Data::Sequence(values), PropKey::Index(idx)) => {
				let had_key = *idx < values.len();
				if !had_key {
					self::grow(values, *idx + 1)?;
				}

				let slot = values.get_mut(*idx)?;
				*slot = value.clone();
				Some(had_key)
			},
			_ => None,
		});

		match had_key {
			None => false,
			Some(false) => {
				self.trigger(TriggerOp::Add, Some(prop.track_key()));
				true
			},
			Some(true) => {
				if has_changed(&value, &old) {
					self.trigger(TriggerOp::Set, Some(prop.track_key()));
				}
				true
			},
		}
	}

	/// Sets the length of a sequence
	fn set_len_raw(&self, value: &Value) -> bool {
		let Some(new_len) = value.as_index() else {
			ReactiveError::InvalidLength {
				value: value.to_string(),
			}
			.report();
			return false;
		};

		let old_len = self.target().with_data_mut(|data| match data {
			Data::Sequence(values) => {
				let old_len = values.len();
				self::grow(values, new_len)?;
				values.truncate(new_len);
				Some(old_len)
			},
			_ => None,
		});

		match old_len {
			Some(old_len) if old_len != new_len => {
				track::trigger(TriggerEvent {
					new_len: Some(new_len),
					..TriggerEvent::new(self.target().id(), SourceKind::Sequence, TriggerOp::Set, Some(TrackKey::Length))
				});
				true
			},
			Some(_) => true,
			None => false,
		}
	}

	pub(super) fn base_has(&self, key: &Value) -> bool {
		let Some(prop) = self.prop_key(key) else {
			return false;
		};

		self.track(TrackOp::Has, prop.track_key());
		self.raw_has(&prop)
	}

	pub(super) fn base_delete(&self, key: &Value) -> bool {
		let Some(prop) = self.prop_key(key) else {
			return false;
		};

		if self.is_readonly() {
			Self::readonly_violation("delete", &prop);
			return false;
		}

		self.delete_prop(&prop)
	}

	/// Deletes a property.
	///
	/// Sequences are dense: deleting an index writes `undefined` to it,
	/// keeping it in range of the length. Deleting an index that already
	/// holds `undefined` succeeds without triggering.
	pub(super) fn delete_prop(&self, prop: &PropKey) -> bool {
		let deleted = self.target().with_data_mut(|data| match (data, prop) {
			(Data::Record(fields), PropKey::Name(name)) => fields.shift_remove(name).map(|_| true),
			(Data::Sequence(values), PropKey::Index(idx)) => values
				.get_mut(*idx)
				.map(|slot| !matches!(mem::take(slot), Value::Undefined)),
			_ => None,
		});

		match deleted {
			Some(true) => {
				self.trigger(TriggerOp::Delete, Some(prop.track_key()));
				true
			},
			Some(false) => true,
			None => false,
		}
	}

	/// Returns all keys, tracking iteration.
	///
	/// Iterating a sequence depends on its length.
	pub(super) fn base_keys(&self) -> Vec<Value> {
		match self.kind() {
			SourceKind::Sequence => {
				self.track(TrackOp::Iterate, TrackKey::Length);
				(0..self.target().len()).map(Value::from).collect()
			},
			_ => {
				self.track(TrackOp::Iterate, TrackKey::Iterate);
				self.target().with_data(|data| match data {
					Data::Record(fields) => fields.keys().map(|name| Value::String(Rc::clone(name))).collect(),
					_ => vec![],
				})
			},
		}
	}
}

/// Grows `values` to at least `len`, filling with `undefined`.
///
/// Returns `None`, reporting it, if the memory can't be reserved.
fn grow(values: &mut Vec<Value>, len: usize) -> Option<()> {
	let additional = len.saturating_sub(values.len());
	if let Err(err) = values.try_reserve(additional) {
		ReactiveError::OutOfMemory {
			len,
			err: err.to_string(),
		}
		.report();
		return None;
	}

	values.resize(len.max(values.len()), Value::Undefined);
	Some(())
}
