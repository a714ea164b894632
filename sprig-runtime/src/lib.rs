//! Scheduling and ownership for `sprig`
//!
//! Effects scheduled through [`queue_job`] are re-run together in a single
//! flush, at the next microtask checkpoint. [`Block`]s build regions of
//! output, and own every effect and hook created while building them.

// Modules
pub mod block;
pub mod builder;
pub mod error;
pub mod lifecycle;
pub mod microtask;
pub mod node;
pub mod scheduler;
pub mod scope;

// Exports
pub use self::{
	block::{Block, block},
	builder::{container, element, mount, text, with_parent},
	error::{FlushError, LifecycleError},
	lifecycle::{on_element_unmounted, on_mounted, on_unmounted, on_updated, with_lifecycle},
	microtask::{is_draining, next_tick, next_tick_then, queue_microtask, run_microtasks},
	node::{Node, NodeKind, SlotKey},
	scheduler::{
		Callback,
		EffectOptionsQueued,
		Job,
		RECURSION_LIMIT,
		flush_post_flush_cbs,
		queue_job,
		queue_post_flush_cb,
		queue_post_flush_cbs,
	},
	scope::{Collection, OwnerScope, Resource, ResourceKind, with_scope},
};
