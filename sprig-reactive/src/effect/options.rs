//! Effect options

// Imports
use {
	super::Effect,
	crate::track::DebuggerEvent,
	core::fmt,
	std::rc::Rc,
};

/// Scheduler, called instead of running the effect when it's triggered
pub type Scheduler = Rc<dyn Fn(&Effect)>;

/// Debugger hook, called when an effect is tracked or triggered
pub type DebuggerHook = Rc<dyn Fn(&DebuggerEvent)>;

/// Effect options
#[derive(Clone, Default)]
pub struct EffectOptions {
	/// Whether to skip the initial run
	lazy: bool,

	/// Scheduler
	scheduler: Option<Scheduler>,

	/// Whether the effect may trigger itself while running
	allow_recurse: bool,

	/// Called when a new dependency is tracked
	on_track: Option<DebuggerHook>,

	/// Called when the effect is triggered
	on_trigger: Option<DebuggerHook>,

	/// Called when the effect is stopped
	on_stop: Option<Rc<dyn Fn()>>,
}

impl EffectOptions {
	/// Creates the default options
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets whether the initial run is skipped
	#[must_use]
	pub const fn lazy(mut self, lazy: bool) -> Self {
		self.lazy = lazy;
		self
	}

	/// Sets the scheduler
	#[must_use]
	pub fn scheduler(mut self, scheduler: impl Fn(&Effect) + 'static) -> Self {
		self.scheduler = Some(Rc::new(scheduler));
		self
	}

	/// Sets whether the effect may trigger itself
	#[must_use]
	pub const fn allow_recurse(mut self, allow_recurse: bool) -> Self {
		self.allow_recurse = allow_recurse;
		self
	}

	/// Sets the track hook
	#[must_use]
	pub fn on_track(mut self, on_track: impl Fn(&DebuggerEvent) + 'static) -> Self {
		self.on_track = Some(Rc::new(on_track));
		self
	}

	/// Sets the trigger hook
	#[must_use]
	pub fn on_trigger(mut self, on_trigger: impl Fn(&DebuggerEvent) + 'static) -> Self {
		self.on_trigger = Some(Rc::new(on_trigger));
		self
	}

	/// Sets the stop hook
	#[must_use]
	pub fn on_stop(mut self, on_stop: impl Fn() + 'static) -> Self {
		self.on_stop = Some(Rc::new(on_stop));
		self
	}

	/// Returns whether the initial run is skipped
	#[must_use]
	pub const fn is_lazy(&self) -> bool {
		self.lazy
	}

	/// Returns whether the effect may trigger itself
	#[must_use]
	pub const fn allows_recurse(&self) -> bool {
		self.allow_recurse
	}

	/// Returns the scheduler
	#[must_use]
	pub const fn get_scheduler(&self) -> Option<&Scheduler> {
		self.scheduler.as_ref()
	}

	/// Returns the track hook
	#[must_use]
	pub const fn get_on_track(&self) -> Option<&DebuggerHook> {
		self.on_track.as_ref()
	}

	/// Returns the trigger hook
	#[must_use]
	pub const fn get_on_trigger(&self) -> Option<&DebuggerHook> {
		self.on_trigger.as_ref()
	}

	/// Returns the stop hook
	#[must_use]
	pub const fn get_on_stop(&self) -> Option<&Rc<dyn Fn()>> {
		self.on_stop.as_ref()
	}
}

impl fmt::Debug for EffectOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EffectOptions")
			.field("lazy", &self.lazy)
			.field("scheduler", &self.scheduler.is_some())
			.field("allow_recurse", &self.allow_recurse)
			.field("on_track", &self.on_track.is_some())
			.field("on_trigger", &self.on_trigger.is_some())
			.field("on_stop", &self.on_stop.is_some())
			.finish()
	}
}
