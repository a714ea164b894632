//! Observation tests

// Imports
use sprig_reactive::{
	Mode,
	Reactive,
	Ref,
	Target,
	Value,
	is_proxy,
	is_reactive,
	is_readonly,
	mark_raw,
	reactive,
	readonly,
	record,
	shallow_reactive,
	shallow_readonly,
	to_raw,
};

/// Extracts the handle out of an observed value
fn handle(value: &Value) -> Reactive {
	value.as_reactive().cloned().expect("Value wasn't observed")
}

#[test]
fn same_handle() {
	sprig_logger::init_test();

	let target = record! { x: 1 };
	let lhs = reactive(target.clone());
	let rhs = reactive(target.clone());
	assert_eq!(lhs, rhs, "Observing twice yielded different handles");

	// Observing a handle yields it back
	assert_eq!(reactive(lhs.clone()), lhs);

	// But other modes have their own handle
	let ro = readonly(target);
	assert_ne!(ro, lhs);
	assert_eq!(handle(&ro).mode(), Mode::Readonly);
}

#[test]
fn primitives_unchanged() {
	sprig_logger::init_test();

	assert_eq!(reactive(1), Value::from(1));
	assert_eq!(reactive("a"), Value::from("a"));
	assert_eq!(readonly(()), Value::Undefined);
	assert!(!is_proxy(&reactive(true)));
}

#[test]
fn skipped_targets() {
	sprig_logger::init_test();

	let raw = mark_raw(record! { x: 1 });
	assert!(!is_proxy(&reactive(raw.clone())));
	assert_eq!(reactive(raw.clone()), raw);

	let frozen = record! { x: 1 };
	frozen.prevent_extensions();
	assert!(!is_proxy(&reactive(frozen)));
}

#[test]
fn predicates() {
	sprig_logger::init_test();

	let target = record! { x: 1 };
	let observed = reactive(target.clone());
	assert!(is_reactive(&observed));
	assert!(!is_readonly(&observed));

	let ro = readonly(target.clone());
	assert!(!is_reactive(&ro));
	assert!(is_readonly(&ro));

	// A readonly view over a reactive handle still tracks
	let ro_observed = readonly(observed.clone());
	assert!(is_reactive(&ro_observed));
	assert!(is_readonly(&ro_observed));
	assert_eq!(handle(&ro_observed).mode(), Mode::ReadonlyReactive);

	assert_eq!(to_raw(&observed), Value::Target(target.clone()));
	assert_eq!(to_raw(&ro_observed), Value::Target(target));
	assert_eq!(to_raw(&Value::from(5)), Value::from(5));
}

#[test]
fn readonly_mutations_ignored() {
	sprig_logger::init_test();

	let ro = handle(&readonly(record! { x: 1 }));
	assert!(ro.set("x", 2), "Readonly set should report success");
	assert_eq!(ro.get("x"), Value::from(1));

	assert!(!ro.delete("x"), "Readonly delete should report failure");
	assert!(ro.has("x"));
}

#[test]
fn deep_wrapping() {
	sprig_logger::init_test();

	let inner = record! { y: 1 };
	let outer = record! { inner: inner.clone() };

	let deep = handle(&reactive(outer.clone()));
	let nested = handle(&deep.get("inner"));
	assert_eq!(nested.mode(), Mode::Reactive);
	assert_eq!(*nested.target(), inner);

	let ro = handle(&readonly(outer.clone()));
	assert_eq!(handle(&ro.get("inner")).mode(), Mode::Readonly);

	let shallow = handle(&shallow_reactive(outer.clone()));
	assert_eq!(shallow.get("inner"), Value::Target(inner.clone()));

	let shallow_ro = handle(&shallow_readonly(outer));
	assert_eq!(shallow_ro.get("inner"), Value::Target(inner));
}

#[test]
fn deep_writes_store_raw() {
	sprig_logger::init_test();

	let inner = record! { y: 1 };
	let outer = record! {};
	let observed = handle(&reactive(outer.clone()));

	assert!(observed.set("inner", reactive(inner.clone())));
	assert_eq!(outer.get(&Value::from("inner")), Value::Target(inner));
}

#[test]
fn refs_unwrapped() {
	sprig_logger::init_test();

	let count = Ref::new(1);
	let observed = handle(&reactive(record! { count: count.clone() }));
	assert_eq!(observed.get("count"), Value::from(1));

	// Writing a non-ref writes through the ref
	assert!(observed.set("count", 2));
	assert_eq!(count.get(), Value::from(2));
	assert_eq!(observed.get("count"), Value::from(2));

	// But writing another ref replaces it
	let other = Ref::new(3);
	assert!(observed.set("count", other.clone()));
	assert_eq!(observed.get("count"), Value::from(3));
	assert_eq!(count.get(), Value::from(2));
}

#[test]
fn refs_in_sequences_kept() {
	sprig_logger::init_test();

	let count = Ref::new(1);
	let observed = handle(&reactive(Target::sequence([count.clone()])));
	assert_eq!(observed.get(0), Value::Ref(count));
}

#[test]
fn record_keys() {
	sprig_logger::init_test();

	let observed = handle(&reactive(record! { a: 1, b: 2 }));
	assert_eq!(observed.keys(), [Value::from("a"), Value::from("b")]);
	assert_eq!(observed.len(), 2);

	assert!(observed.delete("a"));
	assert!(!observed.delete("a"));
	assert_eq!(observed.keys(), [Value::from("b")]);
}
