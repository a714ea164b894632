//! Reactivity for `sprig`
//!
//! Objects ([`Target`]s) are observed through [`Reactive`] handles. Reading
//! through a handle while an [`Effect`] runs subscribes that effect to what was
//! read, and writing through a handle re-runs (or schedules) every subscriber.

// Modules
pub mod computed;
pub mod dep_graph;
pub mod effect;
pub mod error;
pub mod loc;
pub mod owner;
pub mod reactive;
pub mod refs;
pub mod target;
pub mod track;
pub mod value;

// Exports
pub use self::{
	computed::{Computed, computed, computed_writable},
	dep_graph::{DepGraph, DepInfo},
	effect::{Effect, EffectId, EffectOptions, effect, stop},
	error::ReactiveError,
	loc::Loc,
	owner::{EffectOwner, current_owner, with_owner},
	reactive::{
		Mode,
		Reactive,
		is_proxy,
		is_readonly,
		is_reactive,
		mark_raw,
		reactive,
		readonly,
		shallow_reactive,
		shallow_readonly,
		to_raw,
	},
	refs::{Ref, is_ref, unref},
	target::{Data, Target},
	track::{
		DebuggerEvent,
		DebuggerEventKind,
		SourceId,
		SourceKind,
		TrackKey,
		TrackOp,
		TriggerEvent,
		TriggerOp,
		enable_tracking,
		pause_tracking,
		reset_tracking,
		untracked,
	},
	value::{MAX_INDEX, Value, has_changed},
};
