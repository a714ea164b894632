//! Sequence tests

// Imports
use {
	core::cell::Cell,
	sprig_reactive::{Reactive, Target, Value, effect, reactive, readonly, record},
	std::rc::Rc,
};

/// Counts how many times something happened
#[derive(Clone, Default)]
struct Counter(Rc<Cell<usize>>);

impl Counter {
	fn inc(&self) {
		self.0.set(self.0.get() + 1);
	}

	fn get(&self) -> usize {
		self.0.get()
	}
}

/// Extracts the handle out of an observed value
fn handle(value: &Value) -> Reactive {
	value.as_reactive().cloned().expect("Value wasn't observed")
}

/// Creates an observed sequence of numbers
fn numbers(values: &[i32]) -> Reactive {
	handle(&reactive(Target::sequence(values.iter().copied())))
}

/// Creates an effect that reads `read` and counts its runs
fn counted(state: &Reactive, read: impl Fn(&Reactive) + 'static) -> (Counter, sprig_reactive::Effect) {
	let runs = Counter::default();
	let effect = effect({
		let state = state.clone();
		let runs = runs.clone();
		move || {
			read(&state);
			runs.inc();
		}
	});

	(runs, effect)
}

#[test]
fn set_len_truncates() {
	sprig_logger::init_test();

	let seq = numbers(&[1, 2, 3]);
	let (first_runs, _first) = counted(&seq, |seq| {
		let _: Value = seq.get(0);
	});
	let (last_runs, _last) = counted(&seq, |seq| {
		let _: Value = seq.get(2);
	});
	let (len_runs, _len) = counted(&seq, |seq| {
		let _: usize = seq.len();
	});

	assert!(seq.set("length", 1));
	assert_eq!(first_runs.get(), 1, "Kept index was triggered");
	assert_eq!(last_runs.get(), 2, "Removed index wasn't triggered");
	assert_eq!(len_runs.get(), 2, "Length wasn't triggered");
	assert_eq!(seq.values(), [Value::from(1)]);

	// Extending fills with `undefined`
	assert!(seq.set_len(3));
	assert_eq!(seq.values(), [Value::from(1), Value::Undefined, Value::Undefined]);
}

#[test]
fn invalid_len() {
	sprig_logger::init_test();

	let seq = numbers(&[1, 2]);
	assert!(!seq.set("length", -1));
	assert!(!seq.set("length", 1.5));
	assert_eq!(seq.len(), 2);
}

#[test]
fn index_add_triggers_len() {
	sprig_logger::init_test();

	let seq = numbers(&[1]);
	let (len_runs, _len) = counted(&seq, |seq| {
		let _: usize = seq.len();
	});

	seq.set(0, 5);
	assert_eq!(len_runs.get(), 1, "Writing an existing index triggered length");

	seq.set(3, 5);
	assert_eq!(len_runs.get(), 2, "Adding an index didn't trigger length");
	assert_eq!(seq.len(), 4);
}

#[test]
fn push_pop() {
	sprig_logger::init_test();

	let seq = numbers(&[1, 2]);
	let (len_runs, _len) = counted(&seq, |seq| {
		let _: usize = seq.len();
	});

	assert_eq!(seq.push([3, 4]), 4);
	assert_eq!(seq.values(), [1, 2, 3, 4].map(Value::from));
	assert!(len_runs.get() > 1, "Pushing didn't trigger length");

	assert_eq!(seq.pop(), Value::from(4));
	assert_eq!(seq.len(), 3);

	let empty = numbers(&[]);
	assert_eq!(empty.pop(), Value::Undefined);
}

#[test]
fn push_inside_effect_untracked() {
	sprig_logger::init_test();

	let seq = numbers(&[]);
	let (runs, _effect) = counted(&seq, |seq| {
		seq.push([1]);
	});
	assert_eq!(runs.get(), 1);

	seq.push([2]);
	assert_eq!(runs.get(), 1, "Pushing effect was subscribed to the sequence");
	assert_eq!(seq.len(), 2);
}

#[test]
fn shift_unshift() {
	sprig_logger::init_test();

	let seq = numbers(&[1, 2, 3]);
	assert_eq!(seq.shift(), Value::from(1));
	assert_eq!(seq.values(), [2, 3].map(Value::from));

	assert_eq!(seq.unshift([7, 8]), 4);
	assert_eq!(seq.values(), [7, 8, 2, 3].map(Value::from));
}

#[test]
fn splice() {
	sprig_logger::init_test();

	let seq = numbers(&[1, 2, 3, 4]);
	assert_eq!(seq.splice(1, 2, [9]), [2, 3].map(Value::from));
	assert_eq!(seq.values(), [1, 9, 4].map(Value::from));

	assert!(seq.splice(1, 0, [5, 6]).is_empty());
	assert_eq!(seq.values(), [1, 5, 6, 9, 4].map(Value::from));

	// Out of range arguments are clamped
	assert_eq!(seq.splice(4, 10, Vec::<Value>::new()), [Value::from(4)]);
	assert_eq!(seq.values(), [1, 5, 6, 9].map(Value::from));
}

#[test]
fn search() {
	sprig_logger::init_test();

	let seq = handle(&reactive(Target::sequence([Value::from(1), Value::from(f64::NAN), Value::from(1)])));
	assert!(seq.includes(1));
	assert!(seq.includes(f64::NAN), "`includes` didn't find NaN");
	assert_eq!(seq.index_of(f64::NAN), None, "`index_of` found NaN");
	assert_eq!(seq.index_of(1), Some(0));
	assert_eq!(seq.last_index_of(1), Some(2));
	assert_eq!(seq.index_of(2), None);
}

#[test]
fn search_observed_values() {
	sprig_logger::init_test();

	let inner = record! { x: 1 };
	let seq = handle(&reactive(Target::sequence([inner.clone()])));

	// Values read are observed, but the sequence stores them raw
	let observed = seq.get(0);
	assert!(observed.as_reactive().is_some());
	assert!(seq.includes(observed.clone()));
	assert_eq!(seq.index_of(observed), Some(0));
	assert_eq!(seq.index_of(inner), Some(0));
}

#[test]
fn search_tracks() {
	sprig_logger::init_test();

	let seq = numbers(&[1, 2]);
	let (runs, _effect) = counted(&seq, |seq| {
		let _: bool = seq.includes(3);
	});

	seq.set(1, 3);
	assert_eq!(runs.get(), 2, "Searching didn't track the values");
}

#[test]
fn search_tracks_growth() {
	sprig_logger::init_test();

	let seq = numbers(&[]);
	let found = Rc::new(Cell::new(false));
	let (runs, _effect) = counted(&seq, {
		let found = Rc::clone(&found);
		move |seq| found.set(seq.includes(3))
	});
	assert!(!found.get());

	seq.push([3]);
	assert!(runs.get() > 1, "Searching didn't track the length");
	assert!(found.get(), "Pushed value wasn't found");

	let seq = numbers(&[1]);
	let idx = Rc::new(Cell::new(None));
	let (_runs, _effect) = counted(&seq, {
		let idx = Rc::clone(&idx);
		move |seq| idx.set(seq.index_of(2))
	});
	assert_eq!(idx.get(), None);

	seq.set(1, 2);
	assert_eq!(idx.get(), Some(1), "Value at a new index wasn't found");
}

#[test]
fn huge_index_ignored() {
	sprig_logger::init_test();

	let seq = numbers(&[1]);
	let (len_runs, _len) = counted(&seq, |seq| {
		let _: usize = seq.len();
	});

	assert!(!seq.set(1e12, 1), "Writing a huge index succeeded");
	assert!(!seq.set(4_294_967_295.0, 1), "Writing past the last index succeeded");
	assert!(!seq.set("4294967295", 1));
	assert!(!seq.set("length", 1e12), "Setting a huge length succeeded");
	assert_eq!(seq.len(), 1);
	assert_eq!(len_runs.get(), 1, "Ignored write triggered the length");

	// The last valid index is still an index
	assert_eq!(Value::from(4_294_967_294.0).as_index(), Some(4_294_967_294));
}

#[test]
fn delete_index_dense() {
	sprig_logger::init_test();

	let seq = numbers(&[1, 2]);
	let (runs, _effect) = counted(&seq, |seq| {
		let _: Value = seq.get(0);
	});

	assert!(seq.delete(0));
	assert_eq!(runs.get(), 2, "Deleting didn't trigger");
	assert_eq!(seq.values(), [Value::Undefined, Value::from(2)]);
	assert_eq!(seq.len(), 2, "Deleting changed the length");

	// Deleting again changes nothing
	assert!(seq.delete(0));
	assert_eq!(runs.get(), 2, "Deleting a deleted index triggered");

	assert!(!seq.delete(5), "Deleted an index out of range");
}

#[test]
fn readonly_mutators() {
	sprig_logger::init_test();

	let seq = handle(&readonly(Target::sequence([1, 2])));
	assert_eq!(seq.push([3]), 2);
	assert_eq!(seq.pop(), Value::Undefined);
	assert!(seq.splice(0, 1, Vec::<Value>::new()).is_empty());
	assert_eq!(seq.len(), 2);
}
