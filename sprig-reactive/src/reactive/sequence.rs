//! Sequence methods
//!
//! Mutators read the length they work with, so they run untracked to
//! avoid subscribing the running effect to the very sequence it mutates.

// Imports
use {
	super::{Reactive, base::PropKey, to_raw},
	crate::{
		Value,
		target::Data,
		track::{self, SourceKind, TrackKey, TrackOp},
	},
	core::cmp::Ordering,
};

impl Reactive {
	/// Checks that this is a mutable sequence
	fn check_sequence_mut(&self, op: &'static str) -> bool {
		if self.kind() != SourceKind::Sequence {
			self.unsupported(op);
			return false;
		}
		if self.is_readonly() {
			Self::readonly_violation(op, "length");
			return false;
		}

		true
	}

	/// Returns the raw length
	fn raw_len(&self) -> usize {
		self.raw_prop(&PropKey::Length).as_index().unwrap_or(0)
	}

	/// Moves the value at `from` to `to`
	fn move_index(&self, from: usize, to: usize) {
		let value = self.get_prop(&PropKey::Index(from));
		self.set_prop(&PropKey::Index(to), value);
	}

	/// Sets the length of a sequence
	pub fn set_len(&self, len: usize) -> bool {
		self.set("length", len)
	}

	/// Appends values to a sequence, returning the new length
	pub fn push<I>(&self, values: I) -> usize
	where
		I: IntoIterator<Item: Into<Value>>,
	{
		if !self.check_sequence_mut("push") {
			return self.target().len();
		}

		track::untracked(|| {
			let mut len = self.raw_len();
			for value in values {
				self.set_prop(&PropKey::Index(len), value.into());
				len += 1;
			}
			self.set_prop(&PropKey::Length, Value::from(len));

			len
		})
	}

	/// Removes the last value of a sequence
	pub fn pop(&self) -> Value {
		if !self.check_sequence_mut("pop") {
			return Value::Undefined;
		}

		track::untracked(|| {
			let len = self.raw_len();
			let Some(last) = len.checked_sub(1) else {
				self.set_prop(&PropKey::Length, Value::from(0_usize));
				return Value::Undefined;
			};

			let value = self.get_prop(&PropKey::Index(last));
			self.delete_prop(&PropKey::Index(last));
			self.set_prop(&PropKey::Length, Value::from(last));

			value
		})
	}

	/// Removes the first value of a sequence
	pub fn shift(&self) -> Value {
		if !self.check_sequence_mut("shift") {
			return Value::Undefined;
		}

		track::untracked(|| {
			let len = self.raw_len();
			let Some(last) = len.checked_sub(1) else {
				self.set_prop(&PropKey::Length, Value::from(0_usize));
				return Value::Undefined;
			};

			let first = self.get_prop(&PropKey::Index(0));
			for idx in 1..len {
				self.move_index(idx, idx - 1);
			}
			self.delete_prop(&PropKey::Index(last));
			self.set_prop(&PropKey::Length, Value::from(last));

			first
		})
	}

	/// Prepends values to a sequence, returning the new length
	pub fn unshift<I>(&self, values: I) -> usize
	where
		I: IntoIterator<Item: Into<Value>>,
	{
		if !self.check_sequence_mut("unshift") {
			return self.target().len();
		}

		let values = values.into_iter().map(Into::into).collect::<Vec<Value>>();
		track::untracked(|| {
			let len = self.raw_len();
			let count = values.len();
			if count > 0 {
				for idx in (0..len).rev() {
					self.move_index(idx, idx + count);
				}
				for (idx, value) in values.into_iter().enumerate() {
					self.set_prop(&PropKey::Index(idx), value);
				}
			}
			self.set_prop(&PropKey::Length, Value::from(len + count));

			len + count
		})
	}

	/// Removes `delete_count` values starting at `start`, inserting `values`
	/// in their place.
	///
	/// Returns the removed values.
	pub fn splice<I>(&self, start: usize, delete_count: usize, values: I) -> Vec<Value>
	where
		I: IntoIterator<Item: Into<Value>>,
	{
		if !self.check_sequence_mut("splice") {
			return vec![];
		}

		let values = values.into_iter().map(Into::into).collect::<Vec<Value>>();
		track::untracked(|| {
			let len = self.raw_len();
			let start = start.min(len);
			let delete_count = delete_count.min(len - start);
			let insert_count = values.len();

			let removed = (start..start + delete_count)
				.map(|idx| self.get_prop(&PropKey::Index(idx)))
				.collect::<Vec<_>>();

			match insert_count.cmp(&delete_count) {
				Ordering::Less => {
					for idx in start..len - delete_count {
						self.move_index(idx + delete_count, idx + insert_count);
					}
					for idx in (len - delete_count + insert_count..len).rev() {
						self.delete_prop(&PropKey::Index(idx));
					}
				},
				Ordering::Greater =>
					for idx in (start..len - delete_count).rev() {
						self.move_index(idx + delete_count, idx + insert_count);
					},
				Ordering::Equal => (),
			}

			for (offset, value) in values.into_iter().enumerate() {
				self.set_prop(&PropKey::Index(start + offset), value);
			}
			self.set_prop(&PropKey::Length, Value::from(len - delete_count + insert_count));

			removed
		})
	}

	/// Tracks the length and every index of a sequence
	fn track_all_indices(&self) {
		self.track(TrackOp::Get, TrackKey::Length);
		for idx in 0..self.target().len() {
			self.track(TrackOp::Get, TrackKey::Index(idx));
		}
	}

	/// Searches the raw values of a sequence for `value`, then for its raw version
	fn search(&self, value: &Value, op: &'static str, find: impl Fn(&[Value], &Value) -> Option<usize>) -> Option<usize> {
		if self.kind() != SourceKind::Sequence {
			self.unsupported(op);
			return None;
		}

		self.track_all_indices();
		self.target().with_data(|data| {
			let Data::Sequence(values) = data else {
				return None;
			};

			find(values, value).or_else(|| {
				let raw = to_raw(value);
				(raw != *value).then(|| find(values, &raw)).flatten()
			})
		})
	}

	/// Returns whether a sequence contains `value`.
	///
	/// `NaN` is found by this method.
	pub fn includes(&self, value: impl Into<Value>) -> bool {
		self.search(&value.into(), "includes", |values, value| {
			values.iter().position(|item| item == value)
		})
		.is_some()
	}

	/// Returns the first index of `value` in a sequence
	pub fn index_of(&self, value: impl Into<Value>) -> Option<usize> {
		self.search(&value.into(), "index_of", |values, value| {
			values.iter().position(|item| self::strict_eq(item, value))
		})
	}

	/// Returns the last index of `value` in a sequence
	pub fn last_index_of(&self, value: impl Into<Value>) -> Option<usize> {
		self.search(&value.into(), "last_index_of", |values, value| {
			values.iter().rposition(|item| self::strict_eq(item, value))
		})
	}
}

/// Strict equality, under which `NaN` equals nothing
fn strict_eq(lhs: &Value, rhs: &Value) -> bool {
	match (lhs, rhs) {
		(Value::Number(lhs), Value::Number(rhs)) => lhs == rhs,
		_ => lhs == rhs,
	}
}
