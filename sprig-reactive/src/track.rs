//! Tracking and triggering
//!
//! Reads of observed values are reported with [`track`], which subscribes
//! the running effect. Writes are reported with [`trigger`], which
//! re-runs (or schedules) every subscribed effect.

// Imports
use {
	crate::{Effect, Value, dep_graph, effect},
	core::cell::{Cell, RefCell},
	std::rc::Rc,
};

thread_local! {
	/// Next source id
	static NEXT_SOURCE_ID: Cell<u64> = const { Cell::new(0) };

	/// Whether reads are currently tracked
	static SHOULD_TRACK: Cell<bool> = const { Cell::new(true) };

	/// Previous values of `SHOULD_TRACK`
	static TRACK_STACK: RefCell<Vec<bool>> = const { RefCell::new(vec![]) };
}

/// Identity of an observable source (a target, ref or computed cell)
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Debug)]
#[derive(derive_more::Display)]
#[display("#{_0}")]
pub struct SourceId(u64);

impl SourceId {
	/// Allocates a new source id
	pub(crate) fn next() -> Self {
		NEXT_SOURCE_ID.with(|next| {
			let id = next.get();
			next.set(id + 1);
			Self(id)
		})
	}
}

/// Shape of a source
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
#[derive(derive_more::Display)]
pub enum SourceKind {
	/// Record of named fields
	#[display("record")]
	Record,

	/// Indexed sequence
	#[display("sequence")]
	Sequence,

	/// Key-value collection
	#[display("map")]
	Map,

	/// Value collection
	#[display("set")]
	Set,

	/// Single-value cell (refs and computed cells)
	#[display("cell")]
	Cell,
}

/// Key that effects may depend on
#[derive(PartialEq, Eq, Clone, Hash, Debug)]
#[derive(derive_more::Display)]
pub enum TrackKey {
	/// Record property
	#[display("{_0}")]
	Prop(Rc<str>),

	/// Sequence index
	#[display("[{_0}]")]
	Index(usize),

	/// Sequence length
	#[display("length")]
	Length,

	/// Collection entry
	#[display("entry({_0})")]
	Entry(Value),

	/// Iteration over all entries
	#[display("<iterate>")]
	Iterate,

	/// Iteration over the keys of a map
	#[display("<map-key-iterate>")]
	MapKeyIterate,

	/// Value of a cell
	#[display("value")]
	Value,
}

/// Kind of read
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
#[derive(derive_more::Display)]
pub enum TrackOp {
	#[display("get")]
	Get,

	#[display("has")]
	Has,

	#[display("iterate")]
	Iterate,
}

/// Kind of write
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
#[derive(derive_more::Display)]
pub enum TriggerOp {
	#[display("set")]
	Set,

	#[display("add")]
	Add,

	#[display("delete")]
	Delete,

	#[display("clear")]
	Clear,
}

/// A write to a source
#[derive(Clone, Debug)]
pub struct TriggerEvent {
	/// Source written to
	pub source: SourceId,

	/// Shape of the source
	pub kind: SourceKind,

	/// Operation
	pub op: TriggerOp,

	/// Key written, absent for [`TriggerOp::Clear`]
	pub key: Option<TrackKey>,

	/// New length, for writes of [`TrackKey::Length`]
	pub new_len: Option<usize>,
}

impl TriggerEvent {
	/// Creates a new event without a length
	#[must_use]
	pub const fn new(source: SourceId, kind: SourceKind, op: TriggerOp, key: Option<TrackKey>) -> Self {
		Self {
			source,
			kind,
			op,
			key,
			new_len: None,
		}
	}
}

/// Event passed to the `on_track` and `on_trigger` effect hooks
#[derive(Clone, Debug)]
pub struct DebuggerEvent {
	/// Effect being tracked or triggered
	pub effect: Effect,

	/// Source involved
	pub source: SourceId,

	/// What happened
	pub kind: DebuggerEventKind,

	/// Key involved
	pub key: Option<TrackKey>,
}

/// Debugger event kind
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum DebuggerEventKind {
	Track(TrackOp),
	Trigger(TriggerOp),
}

/// Returns whether reads are currently being tracked
#[must_use]
pub fn is_tracking() -> bool {
	SHOULD_TRACK.get()
}

/// Suspends tracking until the matching [`reset_tracking`]
pub fn pause_tracking() {
	TRACK_STACK.with_borrow_mut(|stack| stack.push(SHOULD_TRACK.get()));
	SHOULD_TRACK.set(false);
}

/// Enables tracking until the matching [`reset_tracking`]
pub fn enable_tracking() {
	TRACK_STACK.with_borrow_mut(|stack| stack.push(SHOULD_TRACK.get()));
	SHOULD_TRACK.set(true);
}

/// Restores the tracking state from before the last pause/enable
pub fn reset_tracking() {
	let last = TRACK_STACK.with_borrow_mut(Vec::pop);
	SHOULD_TRACK.set(last.unwrap_or(true));
}

/// Runs `f` without tracking any reads
pub fn untracked<O>(f: impl FnOnce() -> O) -> O {
	/// Resets tracking on drop
	struct ResetOnDrop;

	impl Drop for ResetOnDrop {
		fn drop(&mut self) {
			reset_tracking();
		}
	}

	pause_tracking();
	let _reset = ResetOnDrop;
	f()
}

/// Subscribes the running effect to `key` of `source`
pub fn track(source: SourceId, op: TrackOp, key: TrackKey) {
	if !self::is_tracking() {
		return;
	}
	let Some(effect) = effect::running() else {
		return;
	};

	let added = dep_graph::with(|graph| graph.track(&effect, source, key.clone()));
	if !added {
		return;
	}

	tracing::trace!(effect = %effect.id(), %source, %key, %op, "Tracked dependency");
	if let Some(on_track) = effect.options().get_on_track() {
		on_track(&DebuggerEvent {
			effect: effect.clone(),
			source,
			kind: DebuggerEventKind::Track(op),
			key: Some(key),
		});
	}
}

/// Runs or schedules every effect affected by `event`
pub fn trigger(event: TriggerEvent) {
	let effects = dep_graph::with(|graph| graph.subscribers(&event));
	if effects.is_empty() {
		return;
	}

	let running = effect::running();
	let effects = effects
		.into_iter()
		.filter(|effect| running.as_ref() != Some(effect) || effect.allows_recurse())
		.collect::<Vec<_>>();

	tracing::trace!(source = %event.source, op = %event.op, effects = effects.len(), "Triggering");
	for effect in effects {
		if let Some(on_trigger) = effect.options().get_on_trigger() {
			on_trigger(&DebuggerEvent {
				effect: effect.clone(),
				source: event.source,
				kind: DebuggerEventKind::Trigger(event.op),
				key: event.key.clone(),
			});
		}

		effect.schedule();
	}
}
