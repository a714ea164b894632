//! Effect owners
//!
//! An owner is notified of every effect created while it's the
//! current owner, so it can stop them when it's torn down.

// Imports
use {
	crate::Effect,
	core::cell::RefCell,
	std::rc::Rc,
};

thread_local! {
	/// Owner stack
	static OWNER_STACK: RefCell<Vec<Rc<dyn EffectOwner>>> = const { RefCell::new(vec![]) };
}

/// Effect owner
pub trait EffectOwner {
	/// Takes ownership of a newly created effect
	fn adopt(&self, effect: &Effect);
}

/// Runs `f` with `owner` as the current owner
pub fn with_owner<O>(owner: Rc<dyn EffectOwner>, f: impl FnOnce() -> O) -> O {
	/// Pops the owner on drop
	struct PopOnDrop;

	impl Drop for PopOnDrop {
		fn drop(&mut self) {
			let owner = OWNER_STACK.with_borrow_mut(Vec::pop);
			drop(owner.expect("Owner stack was empty"));
		}
	}

	OWNER_STACK.with_borrow_mut(|owners| owners.push(owner));
	let _pop = PopOnDrop;
	f()
}

/// Returns the current owner
#[must_use]
pub fn current_owner() -> Option<Rc<dyn EffectOwner>> {
	OWNER_STACK.with_borrow(|owners| owners.last().map(Rc::clone))
}

/// Hands `effect` to the current owner, if any
pub(crate) fn adopt(effect: &Effect) {
	if let Some(owner) = self::current_owner() {
		owner.adopt(effect);
	}
}
