//! Effect stack

// Imports
use {
	super::Effect,
	crate::track,
	core::cell::RefCell,
};

thread_local! {
	/// Effect stack
	static EFFECT_STACK: RefCell<Vec<Effect>> = const { RefCell::new(vec![]) };
}

/// Returns the currently running effect
#[must_use]
pub fn running() -> Option<Effect> {
	EFFECT_STACK.with_borrow(|effects| effects.last().cloned())
}

/// Returns whether `effect` is anywhere on the stack
pub(super) fn contains(effect: &Effect) -> bool {
	EFFECT_STACK.with_borrow(|effects| effects.contains(effect))
}

/// Keeps an effect on the stack while alive.
///
/// Also enables tracking, restoring it on drop, including when
/// the effect panics.
pub(super) struct EffectGuard(());

impl EffectGuard {
	/// Pushes `effect` onto the stack
	pub(super) fn enter(effect: &Effect) -> Self {
		EFFECT_STACK.with_borrow_mut(|effects| effects.push(effect.clone()));
		track::enable_tracking();

		Self(())
	}
}

impl Drop for EffectGuard {
	fn drop(&mut self) {
		track::reset_tracking();
		let effect = EFFECT_STACK.with_borrow_mut(Vec::pop);

		// Note: Dropped outside of the borrow, in case this was the last reference.
		drop(effect.expect("Effect stack was empty"));
	}
}
