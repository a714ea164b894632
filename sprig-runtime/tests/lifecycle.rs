//! Lifecycle tests

// Imports
use {
	core::cell::Cell,
	sprig_reactive::{Reactive, Value, reactive, record},
	sprig_runtime::{
		Block,
		block,
		container,
		mount,
		on_mounted,
		on_unmounted,
		on_updated,
		run_microtasks,
		text,
		with_lifecycle,
		with_parent,
	},
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

#[test]
fn mounted() {
	sprig_logger::init_test();

	let mounts = Counter::default();
	let root = container();
	mount(&root, || {
		with_lifecycle(|| {
			let mounts = mounts.clone();
			on_mounted(move || mounts.inc());
			text("component");
		});
		assert_eq!(mounts.get(), 0, "Mount hook ran while building");
	})
	.expect("Unable to mount");
	assert_eq!(mounts.get(), 1);

	run_microtasks().expect("Unable to flush");
	assert_eq!(mounts.get(), 1, "Mount hook ran twice");
}

#[test]
fn outside_component() {
	sprig_logger::init_test();

	let calls = Counter::default();
	on_mounted({
		let calls = calls.clone();
		move || calls.inc()
	});
	on_unmounted({
		let calls = calls.clone();
		move || calls.inc()
	});
	on_updated({
		let calls = calls.clone();
		move || calls.inc()
	});

	run_microtasks().expect("Unable to flush");
	assert_eq!(calls.get(), 0, "Hook outside of a component ran");
}

#[test]
fn unmounted() {
	sprig_logger::init_test();

	let unmounts = Counter::default();
	let root = container();
	let block = with_parent(&root, || {
		block({
			let unmounts = unmounts.clone();
			move || {
				with_lifecycle(|| {
					let unmounts = unmounts.clone();
					on_unmounted(move || unmounts.inc());
				});
			}
		})
	});

	run_microtasks().expect("Unable to flush");
	assert_eq!(unmounts.get(), 0);

	block.remove();
	assert_eq!(unmounts.get(), 0, "Unmount hook ran synchronously");
	run_microtasks().expect("Unable to flush");
	assert_eq!(unmounts.get(), 1);
}

#[test]
fn updated() {
	sprig_logger::init_test();

	let state = handle(&reactive(record! { count: 0 }));
	let updates = Counter::default();
	let root = container();
	mount(&root, || {
		with_lifecycle(|| {
			let updates = updates.clone();
			on_updated(move || updates.inc());

			let state = state.clone();
			let _: Block = block(move || {
				text(state.get("count"));
			});
		});
	})
	.expect("Unable to mount");
	assert_eq!(updates.get(), 1);

	state.set("count", 1);
	run_microtasks().expect("Unable to flush");
	assert_eq!(updates.get(), 2, "Update hook didn't run after the block re-built");

	run_microtasks().expect("Unable to flush");
	assert_eq!(updates.get(), 2);
}
