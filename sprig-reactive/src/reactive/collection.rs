//! Map and set access
//!
//! Collection entries may be keyed by either the raw or observed version
//! of an object. Lookups try the key as given, then its raw version.

// Imports
use {
	super::{Reactive, to_raw},
	crate::{
		Value,
		error::ReactiveError,
		target::Data,
		track::{SourceKind, TrackKey, TrackOp, TriggerOp},
		value::has_changed,
	},
};

impl Reactive {
	/// Returns whether the raw collection contains `key`
	fn raw_contains(&self, key: &Value) -> bool {
		self.target().with_data(|data| match data {
			Data::Map(entries) => entries.contains_key(key),
			Data::Set(values) => values.contains(key),
			_ => false,
		})
	}

	/// Tracks `key`, along with its raw version if it differs
	fn track_entry(&self, op: TrackOp, key: &Value, raw_key: &Value) {
		if key != raw_key {
			self.track(op, TrackKey::Entry(key.clone()));
		}
		self.track(op, TrackKey::Entry(raw_key.clone()));
	}

	/// Resolves `key` to the key actually stored, if any
	fn resolve_key(&self, key: &Value, raw_key: &Value) -> Option<Value> {
		match self.raw_contains(key) {
			true => Some(key.clone()),
			false => self.raw_contains(raw_key).then(|| raw_key.clone()),
		}
	}

	/// Warns if both `key` and it's raw version are stored
	fn check_identity_keys(&self, key: &Value) {
		let raw_key = to_raw(key);
		if raw_key != *key && self.raw_contains(&raw_key) {
			ReactiveError::IdentityKeyConflict { kind: self.kind() }.report();
		}
	}

	pub(super) fn collection_get(&self, key: &Value) -> Value {
		let raw_key = to_raw(key);
		self.track_entry(TrackOp::Get, key, &raw_key);

		let Some(key) = self.resolve_key(key, &raw_key) else {
			return Value::Undefined;
		};
		let value = self.target().with_data(|data| match data {
			Data::Map(entries) => entries.get(&key).cloned(),
			_ => None,
		});

		value.map_or(Value::Undefined, |value| self.wrap(value))
	}

	pub(super) fn collection_has(&self, key: &Value) -> bool {
		let raw_key = to_raw(key);
		self.track_entry(TrackOp::Has, key, &raw_key);
		self.resolve_key(key, &raw_key).is_some()
	}

	pub(super) fn collection_set(&self, key: Value, value: Value) -> bool {
		if self.is_readonly() {
			Self::readonly_violation("set", &key);
			return true;
		}

		let value = to_raw(&value);
		let (key, had_key) = match self.raw_contains(&key) {
			true => {
				self.check_identity_keys(&key);
				(key, true)
			},
			false => {
				let key = to_raw(&key);
				let had_key = self.raw_contains(&key);
				(key, had_key)
			},
		};

		let old = self.target().with_data_mut(|data| match data {
			Data::Map(entries) => entries.insert(key.clone(), value.clone()),
			_ => None,
		});

		match had_key {
			false => self.trigger(TriggerOp::Add, Some(TrackKey::Entry(key))),
			true =>
				if old.is_none_or(|old| has_changed(&value, &old)) {
					self.trigger(TriggerOp::Set, Some(TrackKey::Entry(key)));
				},
		}

		true
	}

	/// Adds a value to a set.
	///
	/// The raw version of `value` is stored.
	pub fn add(&self, value: impl Into<Value>) -> &Self {
		let value = value.into();
		if self.kind() != SourceKind::Set {
			self.unsupported("add");
			return self;
		}
		if self.is_readonly() {
			Self::readonly_violation("add", &value);
			return self;
		}

		let value = to_raw(&value);
		let added = self.target().with_data_mut(|data| match data {
			Data::Set(values) => values.insert(value.clone()),
			_ => false,
		});
		if added {
			self.trigger(TriggerOp::Add, Some(TrackKey::Entry(value)));
		}

		self
	}

	pub(super) fn collection_delete(&self, key: &Value) -> bool {
		if self.is_readonly() {
			Self::readonly_violation("delete", key);
			return false;
		}

		let key = match self.raw_contains(key) {
			true => {
				self.check_identity_keys(key);
				key.clone()
			},
			false => to_raw(key),
		};

		let removed = self.target().with_data_mut(|data| match data {
			Data::Map(entries) => entries.shift_remove(&key).is_some(),
			Data::Set(values) => values.shift_remove(&key),
			_ => false,
		});
		if removed {
			self.trigger(TriggerOp::Delete, Some(TrackKey::Entry(key)));
		}

		removed
	}

	/// Removes every entry of a map or set
	pub fn clear(&self) {
		if !matches!(self.kind(), SourceKind::Map | SourceKind::Set) {
			self.unsupported("clear");
			return;
		}
		if self.is_readonly() {
			Self::readonly_violation("clear", "*");
			return;
		}

		let old = self.target().with_data_mut(|data| match data {
			Data::Map(entries) => !core::mem::take(entries).is_empty(),
			Data::Set(values) => !core::mem::take(values).is_empty(),
			_ => false,
		});
		if old {
			self.trigger(TriggerOp::Clear, None);
		}
	}

	pub(super) fn collection_len(&self) -> usize {
		self.track(TrackOp::Iterate, TrackKey::Iterate);
		self.target().len()
	}

	/// Returns all keys.
	///
	/// Iterating only the keys of a map isn't affected by value changes.
	pub(super) fn collection_keys(&self) -> Vec<Value> {
		let key = match self.kind() {
			SourceKind::Map => TrackKey::MapKeyIterate,
			_ => TrackKey::Iterate,
		};
		self.track(TrackOp::Iterate, key);

		let keys = self.target().with_data(|data| match data {
			Data::Map(entries) => entries.keys().cloned().collect(),
			Data::Set(values) => values.iter().cloned().collect(),
			_ => vec![],
		});
		keys.into_iter().map(|key| self.wrap(key)).collect()
	}

	pub(super) fn collection_entries(&self) -> Vec<(Value, Value)> {
		self.track(TrackOp::Iterate, TrackKey::Iterate);

		let entries = self.target().with_data(|data| match data {
			Data::Map(entries) => entries
				.iter()
				.map(|(key, value)| (key.clone(), value.clone()))
				.collect(),
			Data::Set(values) => values.iter().map(|value| (value.clone(), value.clone())).collect(),
			_ => vec![],
		});
		entries
			.into_iter()
			.map(|(key, value)| (self.wrap(key), self.wrap(value)))
			.collect()
	}
}
