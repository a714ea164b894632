//! Output tree
//!
//! A minimal in-memory tree, standing in for the host's document.

// Imports
use {
	crate::scope::Collection,
	core::{
		cell::RefCell,
		fmt,
		hash::{Hash, Hasher},
		mem,
	},
	std::{
		collections::HashMap,
		rc::{Rc, Weak},
	},
};

/// Node kind
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum NodeKind {
	/// Element with a tag
	Element(Rc<str>),

	/// Text
	Text(Rc<str>),

	/// Placeholder, used as a position marker
	Placeholder(Rc<str>),

	/// Fragment.
	///
	/// Inserting a fragment moves its children instead.
	Fragment,
}

/// Well-known resource slot keys
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
pub enum SlotKey {
	/// Effects
	Effects,

	/// Unmount hooks of lifecycle frames
	Unmounted,

	/// Element unmount hooks
	ElementUnmounted,
}

impl SlotKey {
	/// All keys, in disposal order
	pub const DISPOSAL_ORDER: [Self; 3] = [Self::Effects, Self::ElementUnmounted, Self::Unmounted];
}

/// Node inner
struct Inner {
	/// Kind
	kind: NodeKind,

	/// Parent
	parent: RefCell<Weak<Self>>,

	/// Children
	children: RefCell<Vec<Node>>,

	/// Resource slots
	slots: RefCell<HashMap<SlotKey, Rc<Collection>>>,
}

/// Node
#[derive(Clone)]
pub struct Node {
	/// Inner
	inner: Rc<Inner>,
}

impl Node {
	/// Creates a new node
	fn new(kind: NodeKind) -> Self {
		let inner = Inner {
			kind,
			parent:   RefCell::new(Weak::new()),
			children: RefCell::new(vec![]),
			slots:    RefCell::new(HashMap::new()),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Creates an element
	#[must_use]
	pub fn element(tag: &str) -> Self {
		Self::new(NodeKind::Element(tag.into()))
	}

	/// Creates a text node
	#[must_use]
	pub fn text(text: &str) -> Self {
		Self::new(NodeKind::Text(text.into()))
	}

	/// Creates a placeholder
	#[must_use]
	pub fn placeholder(label: &str) -> Self {
		Self::new(NodeKind::Placeholder(label.into()))
	}

	/// Creates an empty fragment
	#[must_use]
	pub fn fragment() -> Self {
		Self::new(NodeKind::Fragment)
	}

	/// Returns this node's kind
	#[must_use]
	pub fn kind(&self) -> &NodeKind {
		&self.inner.kind
	}

	/// Returns this node's parent
	#[must_use]
	pub fn parent(&self) -> Option<Self> {
		self.inner.parent.borrow().upgrade().map(|inner| Self { inner })
	}

	/// Returns this node's children
	#[must_use]
	pub fn children(&self) -> Vec<Self> {
		self.inner.children.borrow().clone()
	}

	/// Returns the node after this one in its parent
	#[must_use]
	pub fn next_sibling(&self) -> Option<Self> {
		let parent = self.parent()?;
		let children = parent.inner.children.borrow();
		let idx = children.iter().position(|child| child == self)?;
		children.get(idx + 1).cloned()
	}

	/// Returns whether `node` is this node or one of its descendants
	#[must_use]
	pub fn contains(&self, node: &Self) -> bool {
		let mut cur = Some(node.clone());
		while let Some(node) = cur {
			if node == *self {
				return true;
			}
			cur = node.parent();
		}

		false
	}

	/// Appends `child` to this node.
	///
	/// If `child` is a fragment, its children are moved instead.
	pub fn append_child(&self, child: &Self) {
		self.insert_before(child, None);
	}

	/// Inserts `child` before `reference`, or at the end if `None`.
	///
	/// If `child` is a fragment, its children are moved instead.
	pub fn insert_before(&self, child: &Self, reference: Option<&Self>) {
		let nodes = match child.inner.kind {
			NodeKind::Fragment => {
				let nodes = mem::take(&mut *child.inner.children.borrow_mut());
				for node in &nodes {
					*node.inner.parent.borrow_mut() = Weak::new();
				}
				nodes
			},
			_ => {
				if child.contains(self) {
					tracing::warn!("Attempted to insert a node into itself");
					return;
				}
				child.remove();
				vec![child.clone()]
			},
		};

		for node in &nodes {
			*node.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
		}

		let mut children = self.inner.children.borrow_mut();
		let idx = match reference {
			Some(reference) => match children.iter().position(|child| child == reference) {
				Some(idx) => idx,
				None => {
					tracing::warn!("Reference node wasn't a child, appending instead");
					children.len()
				},
			},
			None => children.len(),
		};
		children.splice(idx..idx, nodes);
	}

	/// Removes this node from its parent
	pub fn remove(&self) {
		let Some(parent) = self.parent() else {
			return;
		};

		parent.inner.children.borrow_mut().retain(|child| child != self);
		*self.inner.parent.borrow_mut() = Weak::new();
	}

	/// Returns the resource collection at `key`, creating it if it doesn't exist
	#[must_use]
	pub fn slot(&self, key: SlotKey) -> Rc<Collection> {
		let mut slots = self.inner.slots.borrow_mut();
		Rc::clone(slots.entry(key).or_default())
	}

	/// Returns the resource collection at `key`, if it exists
	#[must_use]
	pub fn existing_slot(&self, key: SlotKey) -> Option<Rc<Collection>> {
		self.inner.slots.borrow().get(&key).map(Rc::clone)
	}

	/// Renders this node as html
	#[must_use]
	pub fn to_html(&self) -> String {
		self.to_string()
	}
}

impl Node {
	/// Writes all children as html
	fn fmt_children(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.inner
			.children
			.borrow()
			.iter()
			.try_for_each(|child| fmt::Display::fmt(child, f))
	}
}

/// Writes `text`, escaping html characters
fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
	for ch in text.chars() {
		match ch {
			'&' => f.write_str("&amp;")?,
			'<' => f.write_str("&lt;")?,
			'>' => f.write_str("&gt;")?,
			ch => fmt::Write::write_char(f, ch)?,
		}
	}

	Ok(())
}

impl fmt::Display for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.inner.kind {
			NodeKind::Element(tag) => {
				write!(f, "<{tag}>")?;
				self.fmt_children(f)?;
				write!(f, "</{tag}>")
			},
			NodeKind::Text(text) => self::write_escaped(f, text),
			NodeKind::Placeholder(label) => write!(f, "<!--{label}-->"),
			NodeKind::Fragment => self.fmt_children(f),
		}
	}
}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Node")
			.field("kind", &self.inner.kind)
			.field("children", &self.inner.children.borrow().len())
			.finish_non_exhaustive()
	}
}

impl PartialEq for Node {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Node {}

impl Hash for Node {
	fn hash<H: Hasher>(&self, state: &mut H) {
		Rc::as_ptr(&self.inner).hash(state);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fragments_move_children() {
		let parent = Node::element("div");
		let end = Node::placeholder("end");
		parent.append_child(&end);

		let fragment = Node::fragment();
		fragment.append_child(&Node::text("a"));
		fragment.append_child(&Node::element("br"));
		parent.insert_before(&fragment, Some(&end));

		assert!(fragment.children().is_empty());
		assert_eq!(parent.to_html(), "<div>a<br></br><!--end--></div>");
	}

	#[test]
	fn reparent() {
		let a = Node::element("a");
		let b = Node::element("b");
		let child = Node::text("<x>");
		a.append_child(&child);
		b.append_child(&child);

		assert!(a.children().is_empty());
		assert_eq!(child.parent(), Some(b.clone()));
		assert_eq!(b.to_html(), "<b>&lt;x&gt;</b>");

		child.remove();
		assert_eq!(child.parent(), None);
		child.remove();
	}

	#[test]
	fn siblings() {
		let parent = Node::fragment();
		let first = Node::text("1");
		let second = Node::text("2");
		parent.append_child(&first);
		parent.append_child(&second);

		assert_eq!(first.next_sibling(), Some(second.clone()));
		assert_eq!(second.next_sibling(), None);
		assert!(parent.contains(&second));
		assert!(!second.contains(&parent));
	}

	#[test]
	fn slots_lazy() {
		let node = Node::placeholder("scope");
		assert!(node.existing_slot(SlotKey::Effects).is_none());

		let slot = node.slot(SlotKey::Effects);
		assert!(Rc::ptr_eq(&slot, &node.slot(SlotKey::Effects)));
		assert!(node.existing_slot(SlotKey::Unmounted).is_none());
	}
}
