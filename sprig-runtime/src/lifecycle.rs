//! Lifecycle hooks
//!
//! Components run within a lifecycle frame, which collects the
//! hooks registered while building them.

// Imports
use {
	crate::{
		LifecycleError,
		SlotKey,
		scheduler::{self, Callback},
		scope::{self, Hooks, Resource, ResourceKind},
	},
	core::cell::RefCell,
	std::rc::Rc,
};

/// Lifecycle frame
#[derive(Default, Debug)]
struct Frame {
	/// Mount hooks
	mounted: Hooks,

	/// Unmount hooks
	unmounted: Hooks,

	/// Update hooks
	updated: Hooks,
}

thread_local! {
	/// Frame stack
	static FRAME_STACK: RefCell<Vec<Rc<Frame>>> = const { RefCell::new(vec![]) };
}

/// Returns the current frame
fn current_frame() -> Option<Rc<Frame>> {
	FRAME_STACK.with_borrow(|frames| frames.last().map(Rc::clone))
}

/// Returns the update hooks of the current frame
pub(crate) fn current_updated() -> Option<Hooks> {
	self::current_frame().map(|frame| Rc::clone(&frame.updated))
}

/// Runs `f` within a new lifecycle frame.
///
/// The frame's unmount hooks run once the current scope is disposed.
pub fn with_lifecycle<O>(f: impl FnOnce() -> O) -> O {
	let frame = Rc::new(Frame::default());
	if let Some(scope) = scope::current() {
		let resource = Resource::new(ResourceKind::Hooks(Rc::clone(&frame.unmounted)));
		scope.register(&resource, SlotKey::Unmounted);
	}

	FRAME_STACK.with_borrow_mut(|frames| frames.push(frame));
	scopeguard::defer! {
		let frame = FRAME_STACK.with_borrow_mut(Vec::pop);
		drop(frame.expect("Lifecycle frame stack was empty"));
	}

	f()
}

/// Adds `hook` to the frame's hooks selected by `hooks`.
///
/// Returns the callback, or `None` if called outside of a frame.
#[track_caller]
fn add_hook<F>(name: &'static str, hook: F, hooks: impl FnOnce(&Frame) -> &Hooks) -> Option<Callback>
where
	F: Fn() + 'static,
{
	let Some(frame) = self::current_frame() else {
		LifecycleError::OutsideComponent { hook: name }.report();
		return None;
	};

	let callback = Callback::new(hook);
	hooks(&frame).borrow_mut().push(callback.clone());
	Some(callback)
}

/// Runs `hook` once the current component is mounted
#[track_caller]
pub fn on_mounted<F>(hook: F)
where
	F: Fn() + 'static,
{
	if let Some(callback) = self::add_hook("on_mounted", hook, |frame| &frame.mounted) {
		scheduler::queue_post_flush_cb(callback);
	}
}

/// Runs `hook` once the current component is unmounted
#[track_caller]
pub fn on_unmounted<F>(hook: F)
where
	F: Fn() + 'static,
{
	let _: Option<Callback> = self::add_hook("on_unmounted", hook, |frame| &frame.unmounted);
}

/// Runs `hook` once, and after every build of a block within the current component
#[track_caller]
pub fn on_updated<F>(hook: F)
where
	F: Fn() + 'static,
{
	if let Some(callback) = self::add_hook("on_updated", hook, |frame| &frame.updated) {
		scheduler::queue_post_flush_cb(callback);
	}
}

/// Runs `hook` once the current scope's output is removed
#[track_caller]
pub fn on_element_unmounted<F>(hook: F)
where
	F: Fn() + 'static,
{
	let Some(scope) = scope::current() else {
		LifecycleError::OutsideScope {
			hook: "on_element_unmounted",
		}
		.report();
		return;
	};

	let resource = Resource::new(ResourceKind::Hook(Callback::new(hook)));
	scope.register(&resource, SlotKey::ElementUnmounted);
}
