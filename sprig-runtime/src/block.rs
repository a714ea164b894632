//! Blocks
//!
//! A block re-builds a region of output, between two markers, every time
//! anything it read changes. Each run discards everything built by the
//! previous one, disposing of all the effects and hooks created within it.

// Imports
use {
	crate::{
		EffectOptionsQueued,
		Node,
		builder,
		lifecycle,
		scheduler,
		scope::{self, Hooks, OwnerScope, WeakOwnerScope},
	},
	core::{
		cell::{Cell, RefCell},
		fmt,
	},
	sprig_reactive::{Effect, EffectOptions, Loc},
	std::rc::Rc,
};

/// Block inner
struct Inner {
	/// Start marker
	start: Node,

	/// End marker
	end: Node,

	/// Fragment holding the markers, while not inserted anywhere else
	_root: Option<Node>,

	/// Range builder
	range: Box<dyn Fn()>,

	/// Scope the block was created in
	parent_scope: Option<WeakOwnerScope>,

	/// Scope of the current run
	scope: RefCell<Option<OwnerScope>>,

	/// Update hooks of the lifecycle frame the block was created in.
	///
	/// Queued after every build.
	updated: Option<Hooks>,

	/// Whether the block was removed
	removed: Cell<bool>,

	/// Where the block was defined
	defined_loc: Loc,
}

impl Inner {
	/// Builds the range again, replacing the previous output
	fn render(&self) {
		if self.removed.get() {
			return;
		}
		let Some(parent) = self.end.parent() else {
			tracing::trace!(block = %self.defined_loc, "Block markers were removed externally, skipping");
			return;
		};

		let parent_scope = self.parent_scope.as_ref().and_then(WeakOwnerScope::upgrade);
		let anchor = Node::placeholder("scope");
		let scope = OwnerScope::new(anchor.clone(), parent_scope.as_ref());

		let fragment = Node::fragment();
		fragment.append_child(&anchor);
		builder::with_parent(&fragment, || scope::with_scope(&scope, &self.range));

		parent.insert_before(&fragment, Some(&self.end));
		self.clear_until(&anchor);

		let prev_scope = self.scope.replace(Some(scope));
		drop(prev_scope);

		if let Some(updated) = &self.updated {
			let updated = updated.borrow().clone();
			scheduler::queue_post_flush_cbs(updated);
		}
	}

	/// Disposes and removes every node after the start marker, until `until`
	fn clear_until(&self, until: &Node) {
		while let Some(node) = self.start.next_sibling() &&
			node != *until
		{
			scope::dispose_node(&node);
			node.remove();
		}
	}
}

/// Block
#[derive(Clone)]
pub struct Block {
	/// Inner
	inner: Rc<Inner>,

	/// Effect
	effect: Effect,
}

impl Block {
	/// Creates a new block and builds it.
	///
	/// The markers are appended to the current builder parent.
	#[track_caller]
	pub fn new<F>(range: F) -> Self
	where
		F: Fn() + 'static,
	{
		let start = Node::placeholder("block");
		let end = Node::placeholder("/block");
		let root = match builder::current_parent() {
			Some(parent) => {
				parent.append_child(&start);
				parent.append_child(&end);
				None
			},
			None => {
				let root = Node::fragment();
				root.append_child(&start);
				root.append_child(&end);
				Some(root)
			},
		};

		let inner = Rc::new(Inner {
			start,
			end,
			_root:        root,
			range:        Box::new(range),
			parent_scope: scope::current().as_ref().map(OwnerScope::downgrade),
			scope:        RefCell::new(None),
			updated:      lifecycle::current_updated(),
			removed:      Cell::new(false),
			defined_loc:  Loc::caller(),
		});

		let effect = Effect::with_options(
			{
				let inner = Rc::clone(&inner);
				move || inner.render()
			},
			EffectOptions::new().queued(),
		);

		Self { inner, effect }
	}

	/// Returns the effect re-building this block
	#[must_use]
	pub fn effect(&self) -> &Effect {
		&self.effect
	}

	/// Returns the start marker
	#[must_use]
	pub fn start(&self) -> &Node {
		&self.inner.start
	}

	/// Returns the end marker
	#[must_use]
	pub fn end(&self) -> &Node {
		&self.inner.end
	}

	/// Returns the scope of the current output
	#[must_use]
	pub fn scope(&self) -> Option<OwnerScope> {
		self.inner.scope.borrow().clone()
	}

	/// Returns whether this block was removed
	#[must_use]
	pub fn is_removed(&self) -> bool {
		self.inner.removed.get()
	}

	/// Removes this block's output and markers, and stops it.
	///
	/// Removing a block twice does nothing.
	pub fn remove(&self) {
		if self.inner.removed.replace(true) {
			return;
		}

		self.inner.clear_until(&self.inner.end);
		self.inner.start.remove();
		self.inner.end.remove();
		self.effect.stop();

		let scope = self.inner.scope.take();
		drop(scope);
	}
}

impl fmt::Debug for Block {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Block")
			.field("effect", &self.effect)
			.field("removed", &self.inner.removed.get())
			.field("defined_loc", &self.inner.defined_loc)
			.finish_non_exhaustive()
	}
}

/// Creates a new block and builds it
#[track_caller]
pub fn block<F>(range: F) -> Block
where
	F: Fn() + 'static,
{
	Block::new(range)
}
