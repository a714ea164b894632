//! Scheduler tests

// Imports
use {
	core::cell::{Cell, OnceCell, RefCell},
	sprig_reactive::{Effect, EffectOptions, Reactive, Value, reactive, record},
	sprig_runtime::{
		Callback,
		EffectOptionsQueued,
		FlushError,
		RECURSION_LIMIT,
		flush_post_flush_cbs,
		is_draining,
		next_tick,
		next_tick_then,
		queue_job,
		queue_microtask,
		queue_post_flush_cb,
		queue_post_flush_cbs,
		run_microtasks,
		scheduler,
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

/// Ordered log of events
#[derive(Clone, Default)]
struct Log(Rc<RefCell<Vec<&'static str>>>);

impl Log {
	/// Returns a callback that pushes `event`
	fn callback(&self, event: &'static str) -> Callback {
		let log = self.clone();
		Callback::new(move || log.0.borrow_mut().push(event))
	}

	fn take(&self) -> Vec<&'static str> {
		self.0.take()
	}
}

/// Extracts the handle out of an observed value
fn handle(value: &Value) -> Reactive {
	value.as_reactive().cloned().expect("Value wasn't observed")
}

#[test]
fn deferred_until_microtasks() {
	sprig_logger::init_test();

	let runs = Counter::default();
	queue_job(Callback::new({
		let runs = runs.clone();
		move || runs.inc()
	}));

	assert_eq!(runs.get(), 0, "Job ran before the microtask checkpoint");
	assert!(scheduler::is_flushing());
	run_microtasks().expect("Unable to flush");
	assert_eq!(runs.get(), 1);
	assert!(!scheduler::is_flushing());
}

#[test]
fn dedupe() {
	sprig_logger::init_test();

	let runs = Counter::default();
	let job = Callback::new({
		let runs = runs.clone();
		move || runs.inc()
	});
	for _ in 0..3 {
		queue_job(job.clone());
	}

	run_microtasks().expect("Unable to flush");
	assert_eq!(runs.get(), 1, "Job ran once per queue");
}

#[test]
fn creation_order() {
	sprig_logger::init_test();

	let log = Log::default();
	let lazy_effect = |event| {
		let log = log.clone();
		Effect::with_options(move || log.0.borrow_mut().push(event), EffectOptions::new().lazy(true))
	};
	let first = lazy_effect("first");
	let second = lazy_effect("second");

	queue_job(log.callback("no id"));
	queue_job(second.clone());
	queue_job(first.clone());
	queue_job(log.callback("with id").with_id(first.id()));

	run_microtasks().expect("Unable to flush");
	assert_eq!(log.take(), ["first", "with id", "second", "no id"]);
}

#[test]
fn post_flush_after_jobs() {
	sprig_logger::init_test();

	let log = Log::default();
	let post = log.callback("post");
	queue_post_flush_cb(post.clone());
	queue_post_flush_cb(post.clone());
	queue_job(log.callback("job"));

	run_microtasks().expect("Unable to flush");
	assert_eq!(log.take(), ["job", "post"]);

	// The list form doesn't check duplicates, but the pass still runs each once
	queue_post_flush_cbs([post.clone(), post]);
	run_microtasks().expect("Unable to flush");
	assert_eq!(log.take(), ["post"]);
}

#[test]
fn post_flush_queues_jobs() {
	sprig_logger::init_test();

	let log = Log::default();
	let job = log.callback("job");
	queue_post_flush_cb(Callback::new({
		let log = log.clone();
		move || {
			log.0.borrow_mut().push("post");
			queue_job(job.clone());
		}
	}));

	run_microtasks().expect("Unable to flush");
	assert_eq!(log.take(), ["post", "job"], "Flush didn't repeat for the new job");
}

#[test]
fn sync_post_flush() {
	sprig_logger::init_test();

	let log = Log::default();
	queue_post_flush_cb(log.callback("post"));
	flush_post_flush_cbs().expect("Unable to flush");
	assert_eq!(log.take(), ["post"]);

	// Nothing is left for the pending flush
	run_microtasks().expect("Unable to flush");
	assert!(log.take().is_empty());
}

#[test]
fn self_requeue_ignored() {
	sprig_logger::init_test();

	let runs = Counter::default();
	let slot = Rc::new(OnceCell::<Callback>::new());
	let job = Callback::new({
		let runs = runs.clone();
		let slot = Rc::clone(&slot);
		move || {
			runs.inc();
			if let Some(job) = slot.get() {
				queue_job(job.clone());
			}
		}
	});
	slot.set(job.clone()).expect("Slot was already set");

	queue_job(job);
	run_microtasks().expect("Unable to flush");
	assert_eq!(runs.get(), 1, "Job re-queued itself without allowing recursion");
}

#[test]
fn recursion_limit() {
	sprig_logger::init_test();

	let runs = Counter::default();
	let slot = Rc::new(OnceCell::<Callback>::new());
	let job = Callback::new({
		let runs = runs.clone();
		let slot = Rc::clone(&slot);
		move || {
			runs.inc();
			if let Some(job) = slot.get() {
				queue_job(job.clone());
			}
		}
	})
	.with_allow_recurse(true);
	slot.set(job.clone()).expect("Slot was already set");

	queue_job(job);
	let err = run_microtasks().expect_err("Recursive job didn't fail");
	assert!(
		matches!(err, FlushError::RecursiveUpdate { limit: RECURSION_LIMIT, .. }),
		"Unexpected error: {err:?}"
	);
	assert_eq!(runs.get(), RECURSION_LIMIT + 1);

	// The rest of the flush was dropped, but the scheduler still works
	assert!(!scheduler::is_flushing());
	let after = Counter::default();
	queue_job(Callback::new({
		let after = after.clone();
		move || after.inc()
	}));
	run_microtasks().expect("Unable to flush");
	assert_eq!(after.get(), 1);
	assert_eq!(runs.get(), RECURSION_LIMIT + 1);
}

#[test]
fn batched_writes() {
	sprig_logger::init_test();

	let state = handle(&reactive(record! { x: 0 }));
	let runs = Counter::default();
	let _effect = Effect::with_options(
		{
			let state = state.clone();
			let runs = runs.clone();
			move || {
				let _: Value = state.get("x");
				runs.inc();
			}
		},
		EffectOptions::new().queued(),
	);
	assert_eq!(runs.get(), 1);

	for value in 1..=3 {
		state.set("x", value);
	}
	assert_eq!(runs.get(), 1, "Queued effect ran synchronously");

	run_microtasks().expect("Unable to flush");
	assert_eq!(runs.get(), 2, "Effect didn't run exactly once per flush");
}

#[test]
fn stopped_before_flush() {
	sprig_logger::init_test();

	let state = handle(&reactive(record! { x: 0 }));
	let runs = Counter::default();
	let effect = Effect::with_options(
		{
			let state = state.clone();
			let runs = runs.clone();
			move || {
				let _: Value = state.get("x");
				runs.inc();
			}
		},
		EffectOptions::new().queued(),
	);

	state.set("x", 1);
	effect.stop();
	run_microtasks().expect("Unable to flush");
	assert_eq!(runs.get(), 1, "Stopped effect ran");
}

#[test]
fn next_tick_flushes() {
	sprig_logger::init_test();

	let runs = Counter::default();
	queue_job(Callback::new({
		let runs = runs.clone();
		move || runs.inc()
	}));

	futures::executor::block_on(next_tick()).expect("Unable to flush");
	assert_eq!(runs.get(), 1);

	let value = futures::executor::block_on(next_tick_then(|| runs.get())).expect("Unable to flush");
	assert_eq!(value, 1);
}

#[test]
fn next_tick_within_microtask() {
	sprig_logger::init_test();

	let runs = Counter::default();
	let runs_at_tick = Rc::new(Cell::new(None));
	queue_microtask({
		let runs = runs.clone();
		let runs_at_tick = Rc::clone(&runs_at_tick);
		move || {
			assert!(is_draining());
			futures::executor::block_on(next_tick())?;
			runs_at_tick.set(Some(runs.get()));
			Ok(())
		}
	});
	queue_job(Callback::new({
		let runs = runs.clone();
		move || runs.inc()
	}));

	run_microtasks().expect("Unable to flush");
	assert_eq!(runs_at_tick.get(), Some(0), "Nested tick waited for the flush");
	assert_eq!(runs.get(), 1);
	assert!(!is_draining());
}
