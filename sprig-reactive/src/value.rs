//! Values
//!
//! Everything stored inside a [`Target`] is a [`Value`].
//! Equality between values follows `SameValueZero`: objects
//! compare by identity, `NaN` equals itself and `0.0 == -0.0`.

// Imports
use {
	crate::{Reactive, Ref, Target},
	core::{
		fmt,
		hash::{Hash, Hasher},
		mem,
	},
	duplicate::duplicate_item,
	std::rc::Rc,
};

/// Dynamic value
#[derive(Clone, Default, Debug)]
pub enum Value {
	/// Missing value
	#[default]
	Undefined,

	/// Explicit null
	Null,

	/// Boolean
	Bool(bool),

	/// Number
	Number(f64),

	/// String
	String(Rc<str>),

	/// Raw object
	Target(Target),

	/// Observed object
	Reactive(Reactive),

	/// Settable box
	Ref(Ref),
}

impl Value {
	/// Returns if this value is an object that may be observed
	#[must_use]
	pub const fn is_object(&self) -> bool {
		matches!(self, Self::Target(_) | Self::Reactive(_))
	}

	/// Returns if this value is `undefined` or `null`
	#[must_use]
	pub const fn is_nullish(&self) -> bool {
		matches!(self, Self::Undefined | Self::Null)
	}

	/// Returns this value as a boolean
	#[must_use]
	pub const fn as_bool(&self) -> Option<bool> {
		match *self {
			Self::Bool(value) => Some(value),
			_ => None,
		}
	}

	/// Returns this value as a number
	#[must_use]
	pub const fn as_number(&self) -> Option<f64> {
		match *self {
			Self::Number(value) => Some(value),
			_ => None,
		}
	}

	/// Returns this value as a string
	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Returns this value as a raw target
	#[must_use]
	pub const fn as_target(&self) -> Option<&Target> {
		match self {
			Self::Target(target) => Some(target),
			_ => None,
		}
	}

	/// Returns this value as a reactive handle
	#[must_use]
	pub const fn as_reactive(&self) -> Option<&Reactive> {
		match self {
			Self::Reactive(handle) => Some(handle),
			_ => None,
		}
	}

	/// Returns this value as a ref
	#[must_use]
	pub const fn as_ref_handle(&self) -> Option<&Ref> {
		match self {
			Self::Ref(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the name of this value's type, for diagnostics
	#[must_use]
	pub const fn type_name(&self) -> &'static str {
		match self {
			Self::Undefined => "undefined",
			Self::Null => "null",
			Self::Bool(_) => "boolean",
			Self::Number(_) => "number",
			Self::String(_) => "string",
			Self::Target(_) | Self::Reactive(_) => "object",
			Self::Ref(_) => "ref",
		}
	}

	/// Interprets this value as a sequence index.
	///
	/// Accepts non-negative integral numbers below [`MAX_INDEX`] and
	/// their canonical string forms (`"3"`, but not `"03"` or `"3.0"`).
	/// Anything larger is an ordinary property name.
	#[must_use]
	pub fn as_index(&self) -> Option<usize> {
		let idx = match self {
			Self::Number(value) if value.fract() == 0.0 && *value >= 0.0 && *value < MAX_INDEX as f64 =>
				*value as usize,
			Self::String(value) => {
				let idx = value.parse::<usize>().ok()?;
				if idx.to_string() != **value {
					return None;
				}
				idx
			},
			_ => return None,
		};

		(idx < MAX_INDEX).then_some(idx)
	}

	/// Converts this value into a property name
	#[must_use]
	pub fn to_property_key(&self) -> Rc<str> {
		match self {
			Self::String(value) => Rc::clone(value),
			value => value.to_string().into(),
		}
	}
}

/// Exclusive upper bound of sequence indices, `2^32 - 1`
pub const MAX_INDEX: usize = u32::MAX as usize;

/// Returns whether `value` differs from `old`.
///
/// Uses strict identity, except that `NaN` is unchanged relative to `NaN`.
#[must_use]
pub fn has_changed(value: &Value, old: &Value) -> bool {
	value != old
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
			(Self::Bool(lhs), Self::Bool(rhs)) => lhs == rhs,
			(Self::Number(lhs), Self::Number(rhs)) => lhs == rhs || (lhs.is_nan() && rhs.is_nan()),
			(Self::String(lhs), Self::String(rhs)) => lhs == rhs,
			(Self::Target(lhs), Self::Target(rhs)) => lhs == rhs,
			(Self::Reactive(lhs), Self::Reactive(rhs)) => lhs == rhs,
			(Self::Ref(lhs), Self::Ref(rhs)) => lhs == rhs,
			_ => false,
		}
	}
}

impl Eq for Value {}

impl Hash for Value {
	fn hash<H: Hasher>(&self, state: &mut H) {
		mem::discriminant(self).hash(state);
		match self {
			Self::Undefined | Self::Null => (),
			Self::Bool(value) => value.hash(state),
			Self::Number(value) => match value {
				value if *value == 0.0 => 0_u64.hash(state),
				value if value.is_nan() => f64::NAN.to_bits().hash(state),
				value => value.to_bits().hash(state),
			},
			Self::String(value) => value.hash(state),
			Self::Target(target) => target.hash(state),
			Self::Reactive(handle) => handle.hash(state),
			Self::Ref(value) => value.hash(state),
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Undefined => f.pad("undefined"),
			Self::Null => f.pad("null"),
			Self::Bool(value) => fmt::Display::fmt(value, f),
			Self::Number(value) => match *value {
				value if value.is_nan() => f.pad("NaN"),
				value if value.is_infinite() => f.pad(if value > 0.0 { "Infinity" } else { "-Infinity" }),
				value if value == 0.0 => f.pad("0"),
				value => fmt::Display::fmt(&value, f),
			},
			Self::String(value) => f.pad(value),
			Self::Target(target) => fmt::Display::fmt(target, f),
			Self::Reactive(handle) => fmt::Display::fmt(handle.target(), f),
			Self::Ref(_) => f.pad("[object Ref]"),
		}
	}
}

#[duplicate_item(
	Ty           body;
	[()]         [{ let () = value; Self::Undefined }];
	[bool]       [Self::Bool(value)];
	[f64]        [Self::Number(value)];
	[i32]        [Self::Number(f64::from(value))];
	[u32]        [Self::Number(f64::from(value))];
	[&str]       [Self::String(value.into())];
	[String]     [Self::String(value.into())];
	[Rc<str>]    [Self::String(value)];
	[Target]     [Self::Target(value)];
	[Reactive]   [Self::Reactive(value)];
	[Ref]        [Self::Ref(value)];
)]
impl From<Ty> for Value {
	fn from(value: Ty) -> Self {
		body
	}
}

impl From<usize> for Value {
	fn from(value: usize) -> Self {
		Self::Number(value as f64)
	}
}

impl<T: Into<Self>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, T::into)
	}
}
