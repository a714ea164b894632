//! Owner scopes
//!
//! Every effect and hook created while a scope is current is registered in
//! that scope, and in every ancestor scope, so that removing any region of
//! output can find everything that was created within it.
//!
//! Each resource remembers the collections it's registered in, innermost
//! first. When a collection is disposed, every resource in it is disposed,
//! then every collection nested deeper than it is cleared wholesale, while
//! the collections of ancestor scopes only forget that one resource.

// Modules
#[cfg(test)]
mod tests;

// Imports
use {
	crate::{
		node::{Node, SlotKey},
		scheduler::{self, Callback},
	},
	core::{
		cell::{Cell, RefCell},
		cmp::Ordering,
		fmt,
		hash::{Hash, Hasher},
		mem,
	},
	indexmap::IndexSet,
	sprig_reactive::{Effect, EffectOwner},
	std::rc::{Rc, Weak},
};

/// Hook list, shared with a lifecycle frame
pub type Hooks = Rc<RefCell<Vec<Callback>>>;

/// Resource kind
#[derive(Clone, Debug)]
pub enum ResourceKind {
	/// Effect, stopped on disposal
	Effect(Effect),

	/// Hook, queued as a post-flush callback on disposal
	Hook(Callback),

	/// Hook list, all queued as post-flush callbacks on disposal
	Hooks(Hooks),
}

/// Resource inner
struct ResourceInner {
	/// Kind
	kind: ResourceKind,

	/// Whether this resource was disposed
	disposed: Cell<bool>,

	/// Collections this resource is registered in, innermost first
	memberships: RefCell<Vec<Weak<Collection>>>,
}

/// Resource owned by a scope
#[derive(Clone)]
pub struct Resource {
	/// Inner
	inner: Rc<ResourceInner>,
}

impl Resource {
	/// Creates a new resource
	#[must_use]
	pub fn new(kind: ResourceKind) -> Self {
		let inner = ResourceInner {
			kind,
			disposed:    Cell::new(false),
			memberships: RefCell::new(vec![]),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Returns this resource's kind
	#[must_use]
	pub fn kind(&self) -> &ResourceKind {
		&self.inner.kind
	}

	/// Returns whether this resource was disposed
	#[must_use]
	pub fn is_disposed(&self) -> bool {
		self.inner.disposed.get()
	}

	/// Disposes of this resource, if it wasn't already.
	///
	/// Returns whether this resource was disposed now.
	fn dispose(&self) -> bool {
		if self.inner.disposed.replace(true) {
			return false;
		}

		match &self.inner.kind {
			ResourceKind::Effect(effect) => effect.stop(),
			ResourceKind::Hook(hook) => scheduler::queue_post_flush_cb(hook.clone()),
			ResourceKind::Hooks(hooks) => {
				let hooks = hooks.borrow().clone();
				scheduler::queue_post_flush_cbs(hooks);
			},
		}

		true
	}
}

impl PartialEq for Resource {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Resource {}

impl Hash for Resource {
	fn hash<H: Hasher>(&self, state: &mut H) {
		Rc::as_ptr(&self.inner).hash(state);
	}
}

impl fmt::Debug for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Resource")
			.field("kind", &self.inner.kind)
			.field("disposed", &self.inner.disposed.get())
			.finish_non_exhaustive()
	}
}

/// Resource collection
#[derive(Default, Debug)]
pub struct Collection {
	/// Resources, in registration order
	resources: RefCell<IndexSet<Resource>>,
}

impl Collection {
	/// Returns the number of resources in this collection
	#[must_use]
	pub fn len(&self) -> usize {
		self.resources.borrow().len()
	}

	/// Returns whether this collection is empty
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.resources.borrow().is_empty()
	}

	/// Returns whether `resource` is in this collection
	#[must_use]
	pub fn contains(&self, resource: &Resource) -> bool {
		self.resources.borrow().contains(resource)
	}

	/// Adds `resource` to this collection
	fn insert(self: &Rc<Self>, resource: &Resource) {
		if self.resources.borrow_mut().insert(resource.clone()) {
			resource.inner.memberships.borrow_mut().push(Rc::downgrade(self));
		}
	}

	/// Removes `resource` from this collection
	fn remove(&self, resource: &Resource) {
		let removed = self.resources.borrow_mut().shift_take(resource);
		drop(removed);
	}

	/// Removes all resources from this collection
	fn clear(&self) {
		let resources = mem::take(&mut *self.resources.borrow_mut());
		drop(resources);
	}
}

/// Disposes of every resource in `collection`, then clears it.
///
/// Disposing an empty collection does nothing.
pub fn dispose(collection: &Rc<Collection>) {
	let resources = collection.resources.borrow().iter().cloned().collect::<Vec<_>>();
	for resource in resources {
		if resource.dispose() {
			tracing::trace!(?resource, "Disposed resource");
		}

		let memberships = resource.inner.memberships.borrow().clone();
		let cur_idx = memberships
			.iter()
			.position(|membership| membership.as_ptr() == Rc::as_ptr(collection));
		for (idx, membership) in memberships.iter().enumerate() {
			let Some(membership) = membership.upgrade() else {
				continue;
			};

			match cur_idx.map_or(Ordering::Greater, |cur_idx| idx.cmp(&cur_idx)) {
				Ordering::Less => membership.clear(),
				Ordering::Equal => (),
				Ordering::Greater => membership.remove(&resource),
			}
		}
	}

	collection.clear();
}

/// Disposes of all resources owned by `node` and its descendants
pub fn dispose_node(node: &Node) {
	for key in SlotKey::DISPOSAL_ORDER {
		if let Some(collection) = node.existing_slot(key) {
			self::dispose(&collection);
		}
	}

	for child in node.children() {
		self::dispose_node(&child);
	}
}

/// Scope inner
struct ScopeInner {
	/// Anchor, holding the resource collections
	anchor: Node,

	/// Parent
	parent: Option<Weak<Self>>,
}

/// Owner scope
#[derive(Clone)]
pub struct OwnerScope {
	/// Inner
	inner: Rc<ScopeInner>,
}

impl OwnerScope {
	/// Creates a new scope anchored at `anchor`
	#[must_use]
	pub fn new(anchor: Node, parent: Option<&Self>) -> Self {
		let inner = ScopeInner {
			anchor,
			parent: parent.map(|parent| Rc::downgrade(&parent.inner)),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Returns this scope's anchor
	#[must_use]
	pub fn anchor(&self) -> &Node {
		&self.inner.anchor
	}

	/// Returns this scope's parent, if it's still alive
	#[must_use]
	pub fn parent(&self) -> Option<Self> {
		let parent = self.inner.parent.as_ref()?.upgrade()?;
		Some(Self { inner: parent })
	}

	/// Downgrades this scope
	#[must_use]
	pub fn downgrade(&self) -> WeakOwnerScope {
		WeakOwnerScope {
			inner: Rc::downgrade(&self.inner),
		}
	}

	/// Registers `resource` at `key` in this scope and all of its ancestors
	pub fn register(&self, resource: &Resource, key: SlotKey) {
		let mut cur = Some(self.clone());
		while let Some(scope) = cur {
			scope.anchor().slot(key).insert(resource);
			cur = scope.parent();
		}
	}

	/// Disposes of every resource registered in this scope
	pub fn dispose(&self) {
		self::dispose_node(self.anchor());
	}
}

impl EffectOwner for OwnerScope {
	fn adopt(&self, effect: &Effect) {
		let resource = Resource::new(ResourceKind::Effect(effect.clone()));
		self.register(&resource, SlotKey::Effects);
	}
}

impl PartialEq for OwnerScope {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for OwnerScope {}

impl fmt::Debug for OwnerScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OwnerScope")
			.field("anchor", &self.inner.anchor)
			.finish_non_exhaustive()
	}
}

/// Weak owner scope
#[derive(Clone, Debug)]
pub struct WeakOwnerScope {
	/// Inner
	inner: Weak<ScopeInner>,
}

impl WeakOwnerScope {
	/// Upgrades this scope
	#[must_use]
	pub fn upgrade(&self) -> Option<OwnerScope> {
		self.inner.upgrade().map(|inner| OwnerScope { inner })
	}
}

thread_local! {
	/// Scope stack
	static SCOPE_STACK: RefCell<Vec<OwnerScope>> = const { RefCell::new(vec![]) };
}

/// Returns the current scope
#[must_use]
pub fn current() -> Option<OwnerScope> {
	SCOPE_STACK.with_borrow(|scopes| scopes.last().cloned())
}

/// Runs `f` with `scope` as the current scope.
///
/// Effects created within `f` are owned by `scope`.
pub fn with_scope<O>(scope: &OwnerScope, f: impl FnOnce() -> O) -> O {
	SCOPE_STACK.with_borrow_mut(|scopes| scopes.push(scope.clone()));
	scopeguard::defer! {
		let scope = SCOPE_STACK.with_borrow_mut(Vec::pop);
		drop(scope.expect("Scope stack was empty"));
	}

	sprig_reactive::with_owner(Rc::new(scope.clone()), f)
}
