//! Sprig framework
//!
//! Fine-grained reactivity ([`sprig_reactive`]) together with batched
//! scheduling and owned regions of output ([`sprig_runtime`]).

// Exports
pub use {
	sprig_reactive::{
		self as reactive_core,
		Computed,
		Data,
		Effect,
		EffectId,
		EffectOptions,
		Reactive,
		Ref,
		Target,
		Value,
		computed,
		computed_writable,
		effect,
		is_proxy,
		is_reactive,
		is_readonly,
		is_ref,
		mark_raw,
		reactive,
		readonly,
		record,
		shallow_reactive,
		shallow_readonly,
		stop,
		to_raw,
		unref,
	},
	sprig_runtime::{
		self as runtime,
		Block,
		Callback,
		EffectOptionsQueued,
		FlushError,
		Node,
		block,
		container,
		element,
		mount,
		next_tick,
		next_tick_then,
		on_element_unmounted,
		on_mounted,
		on_unmounted,
		on_updated,
		queue_job,
		queue_post_flush_cb,
		queue_post_flush_cbs,
		run_microtasks,
		text,
		with_lifecycle,
	},
};
