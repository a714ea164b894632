//! Output builder

// Imports
use {
	crate::{FlushError, Node, scheduler},
	core::cell::RefCell,
	sprig_reactive::Value,
};

thread_local! {
	/// Parent stack
	static PARENT_STACK: RefCell<Vec<Node>> = const { RefCell::new(vec![]) };
}

/// Returns the node that built nodes are currently appended to
#[must_use]
pub fn current_parent() -> Option<Node> {
	PARENT_STACK.with_borrow(|parents| parents.last().cloned())
}

/// Runs `f`, appending every node built within it to `parent`
pub fn with_parent<O>(parent: &Node, f: impl FnOnce() -> O) -> O {
	PARENT_STACK.with_borrow_mut(|parents| parents.push(parent.clone()));
	scopeguard::defer! {
		let parent = PARENT_STACK.with_borrow_mut(Vec::pop);
		drop(parent.expect("Parent stack was empty"));
	}

	f()
}

/// Appends `node` to the current parent, if any
fn append(node: &Node) {
	if let Some(parent) = self::current_parent() {
		parent.append_child(node);
	}
}

/// Builds an element, with all nodes built in `children` as its children
pub fn element(tag: &str, children: impl FnOnce()) -> Node {
	let node = Node::element(tag);
	self::with_parent(&node, children);
	self::append(&node);

	node
}

/// Builds a text node
pub fn text(value: impl Into<Value>) -> Node {
	let node = Node::text(&value.into().to_string());
	self::append(&node);

	node
}

/// Creates a detached container to mount into
#[must_use]
pub fn container() -> Node {
	Node::element("div")
}

/// Builds `view` and appends it to `target`.
///
/// Runs all post-flush callbacks queued while building, such as
/// mount hooks, before returning.
pub fn mount(target: &Node, view: impl FnOnce()) -> Result<(), FlushError> {
	let root = Node::fragment();
	self::with_parent(&root, view);
	target.append_child(&root);

	scheduler::flush_post_flush_cbs()
}
