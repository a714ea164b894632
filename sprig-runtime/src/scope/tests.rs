//! Tests

// Imports
use {
	super::*,
	sprig_reactive::EffectOptions,
};

/// Creates an effect that counts how many times it was stopped
fn stop_counted(stops: &Rc<Cell<usize>>) -> Effect {
	let stops = Rc::clone(stops);
	Effect::with_options(|| {}, EffectOptions::new().on_stop(move || stops.set(stops.get() + 1)))
}

#[test]
fn register_ancestors() {
	let outer = OwnerScope::new(Node::placeholder("outer"), None);
	let inner = OwnerScope::new(Node::placeholder("inner"), Some(&outer));
	assert_eq!(inner.parent(), Some(outer.clone()));

	let stops = Rc::new(Cell::new(0));
	let effect = self::with_scope(&inner, || self::stop_counted(&stops));

	let outer_effects = outer.anchor().slot(SlotKey::Effects);
	let inner_effects = inner.anchor().slot(SlotKey::Effects);
	assert_eq!(outer_effects.len(), 1);
	assert_eq!(inner_effects.len(), 1);
	assert!(effect.is_active());
}

#[test]
fn dispose_inner() {
	let outer = OwnerScope::new(Node::placeholder("outer"), None);
	let inner = OwnerScope::new(Node::placeholder("inner"), Some(&outer));

	let stops = Rc::new(Cell::new(0));
	let outer_effect = self::with_scope(&outer, || self::stop_counted(&stops));
	let inner_effect = self::with_scope(&inner, || self::stop_counted(&stops));

	inner.dispose();
	assert!(!inner_effect.is_active());
	assert!(outer_effect.is_active());
	assert_eq!(stops.get(), 1);

	// Only the inner effect was forgotten by the outer scope
	let outer_effects = outer.anchor().slot(SlotKey::Effects);
	assert_eq!(outer_effects.len(), 1);
	assert!(inner.anchor().slot(SlotKey::Effects).is_empty());
}

#[test]
fn dispose_outer_once() {
	let outer = OwnerScope::new(Node::placeholder("outer"), None);
	let middle = OwnerScope::new(Node::placeholder("middle"), Some(&outer));
	let inner = OwnerScope::new(Node::placeholder("inner"), Some(&middle));

	let stops = Rc::new(Cell::new(0));
	let _effects = [&outer, &middle, &inner, &inner].map(|scope| self::with_scope(scope, || self::stop_counted(&stops)));

	outer.dispose();
	assert_eq!(stops.get(), 4);
	for scope in [&outer, &middle, &inner] {
		assert!(scope.anchor().slot(SlotKey::Effects).is_empty());
	}

	// Disposing again, in any order, does nothing
	inner.dispose();
	middle.dispose();
	outer.dispose();
	assert_eq!(stops.get(), 4);
}

#[test]
fn dispose_empty() {
	let scope = OwnerScope::new(Node::placeholder("scope"), None);
	scope.dispose();

	let collection = scope.anchor().slot(SlotKey::Unmounted);
	self::dispose(&collection);
	assert!(collection.is_empty());
}

#[test]
fn hooks_queued_once() {
	let outer = OwnerScope::new(Node::placeholder("outer"), None);
	let inner = OwnerScope::new(Node::placeholder("inner"), Some(&outer));

	let calls = Rc::new(Cell::new(0));
	let hook = Callback::new({
		let calls = Rc::clone(&calls);
		move || calls.set(calls.get() + 1)
	});
	let resource = Resource::new(ResourceKind::Hook(hook));
	inner.register(&resource, SlotKey::ElementUnmounted);

	outer.dispose();
	inner.dispose();
	assert!(resource.is_disposed());

	scheduler::flush_post_flush_cbs().expect("Unable to flush");
	assert_eq!(calls.get(), 1);
}

#[test]
fn scope_stack() {
	let outer = OwnerScope::new(Node::placeholder("outer"), None);
	let inner = OwnerScope::new(Node::placeholder("inner"), Some(&outer));
	assert_eq!(self::current(), None);

	self::with_scope(&outer, || {
		assert_eq!(self::current(), Some(outer.clone()));
		self::with_scope(&inner, || assert_eq!(self::current(), Some(inner.clone())));
		assert_eq!(self::current(), Some(outer.clone()));
	});
	assert_eq!(self::current(), None);
}
