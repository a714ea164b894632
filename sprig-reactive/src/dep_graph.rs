//! Dependency graph
//!
//! Stores, for every `(source, key)` pair that was read by an effect,
//! a dependency node with an edge to each subscribed effect.

// Imports
use {
	crate::{
		Effect,
		effect::EffectId,
		track::{SourceId, SourceKind, TrackKey, TriggerEvent, TriggerOp},
	},
	core::{cell::RefCell, mem},
	itertools::Itertools,
	petgraph::{
		Direction,
		prelude::{NodeIndex, StableGraph},
	},
	std::{collections::HashMap, thread::AccessError},
};

thread_local! {
	/// Dependency graph
	static DEP_GRAPH: DepGraph = DepGraph::new();

	/// Sources dropped while the graph was borrowed
	static PENDING_RELEASE: RefCell<Vec<SourceId>> = const { RefCell::new(vec![]) };
}

/// Uses the dependency graph of this thread
pub fn with<O>(f: impl FnOnce(&DepGraph) -> O) -> O {
	DEP_GRAPH.with(f)
}

/// Releases all dependency entries of `source`.
///
/// Called when a source is dropped. Does nothing if the
/// graph has already been destroyed.
pub(crate) fn release_source(source: SourceId) {
	let _: Result<(), AccessError> = DEP_GRAPH.try_with(|graph| graph.release_source(source));
}

/// Dependency entry info
#[derive(PartialEq, Eq, Clone, Hash, Debug)]
pub struct DepInfo {
	/// Source
	pub source: SourceId,

	/// Key within the source
	pub key: TrackKey,
}

/// Graph node
#[derive(Clone, Debug)]
enum Node {
	/// Dependency entry
	Dep(DepInfo),

	/// Subscribed effect
	Effect(Effect),
}

/// Inner
#[derive(Debug)]
struct Inner {
	/// Dependency entries, by source and key
	sources: HashMap<SourceId, HashMap<TrackKey, NodeIndex>>,

	/// Effect nodes
	effects: HashMap<EffectId, NodeIndex>,

	/// Graph
	graph: StableGraph<Node, ()>,
}

impl Inner {
	/// Removes all entries of `source`, returning the removed nodes
	fn remove_source(&mut self, source: SourceId) -> Vec<Node> {
		let Some(deps) = self.sources.remove(&source) else {
			return vec![];
		};

		let mut removed = vec![];
		let mut orphan_candidates = vec![];
		let dep_idxs = deps.into_values().collect::<Vec<_>>();
		for dep_idx in dep_idxs {
			orphan_candidates.extend(self.graph.neighbors_directed(dep_idx, Direction::Outgoing));
			removed.extend(self.graph.remove_node(dep_idx));
		}

		// Effects left without any dependency can't be triggered anymore
		for effect_idx in orphan_candidates.into_iter().unique() {
			let is_orphan = self
				.graph
				.neighbors_directed(effect_idx, Direction::Incoming)
				.next()
				.is_none();
			if !is_orphan {
				continue;
			}

			if let Some(node) = self.graph.remove_node(effect_idx) {
				if let Node::Effect(effect) = &node {
					self.effects.remove(&effect.id());
				}
				removed.push(node);
			}
		}

		removed
	}

	/// Removes all sources that were dropped while we were borrowed
	fn remove_pending(&mut self) -> Vec<Node> {
		let pending = PENDING_RELEASE.with_borrow_mut(mem::take);
		pending
			.into_iter()
			.flat_map(|source| self.remove_source(source))
			.collect()
	}
}

/// Dependency graph
#[derive(Debug)]
pub struct DepGraph {
	/// Inner
	inner: RefCell<Inner>,
}

impl DepGraph {
	/// Creates a new, empty, dependency graph
	#[must_use]
	pub fn new() -> Self {
		Self {
			inner: RefCell::new(Inner {
				sources: HashMap::new(),
				effects: HashMap::new(),
				graph:   StableGraph::new(),
			}),
		}
	}

	/// Subscribes `effect` to `key` of `source`.
	///
	/// Returns whether the subscription is new.
	pub fn track(&self, effect: &Effect, source: SourceId, key: TrackKey) -> bool {
		let mut guard = self.inner.borrow_mut();
		let released = guard.remove_pending();

		let inner = &mut *guard;
		let dep_idx = *inner
			.sources
			.entry(source)
			.or_default()
			.entry(key)
			.or_insert_with_key(|key| {
				inner.graph.add_node(Node::Dep(DepInfo {
					source,
					key: key.clone(),
				}))
			});
		let effect_idx = *inner
			.effects
			.entry(effect.id())
			.or_insert_with(|| inner.graph.add_node(Node::Effect(effect.clone())));

		let added = inner.graph.find_edge(dep_idx, effect_idx).is_none();
		if added {
			inner.graph.add_edge(dep_idx, effect_idx, ());
		}

		// Note: Dropping released nodes may drop sources, which borrow the graph again
		drop(guard);
		drop(released);

		added
	}

	/// Removes all subscriptions of `effect`
	pub fn clear_effect(&self, effect: &Effect) {
		let removed = {
			let mut inner = self.inner.borrow_mut();
			let Some(effect_idx) = inner.effects.remove(&effect.id()) else {
				return;
			};
			inner.graph.remove_node(effect_idx)
		};

		drop(removed);
	}

	/// Releases all dependency entries of `source`
	pub fn release_source(&self, source: SourceId) {
		let Ok(mut inner) = self.inner.try_borrow_mut() else {
			PENDING_RELEASE.with_borrow_mut(|pending| pending.push(source));
			return;
		};

		let mut removed = inner.remove_pending();
		removed.extend(inner.remove_source(source));

		drop(inner);
		drop(removed);
	}

	/// Returns all effects affected by `event`, in creation order
	#[must_use]
	pub fn subscribers(&self, event: &TriggerEvent) -> Vec<Effect> {
		let inner = self.inner.borrow();
		let Some(deps) = inner.sources.get(&event.source) else {
			return vec![];
		};

		let mut dep_idxs = vec![];
		match (event.op, &event.key) {
			(TriggerOp::Clear, _) => dep_idxs.extend(deps.values().copied()),

			(_, Some(TrackKey::Length)) if event.kind == SourceKind::Sequence => {
				let new_len = event.new_len.unwrap_or(0);
				dep_idxs.extend(
					deps.iter()
						.filter(|(key, _)| match key {
							TrackKey::Length => true,
							TrackKey::Index(idx) => *idx >= new_len,
							_ => false,
						})
						.map(|(_, &idx)| idx),
				);
			},

			(op, key) => {
				let mut push = |key: &TrackKey| dep_idxs.extend(deps.get(key).copied());
				if let Some(key) = key {
					push(key);
				}

				match (op, event.kind) {
					(TriggerOp::Add, SourceKind::Sequence) =>
						if matches!(key, Some(TrackKey::Index(_))) {
							push(&TrackKey::Length);
						},
					(TriggerOp::Add | TriggerOp::Delete, SourceKind::Map) => {
						push(&TrackKey::Iterate);
						push(&TrackKey::MapKeyIterate);
					},
					(TriggerOp::Add | TriggerOp::Delete, SourceKind::Record | SourceKind::Set) |
					(TriggerOp::Set, SourceKind::Map) => push(&TrackKey::Iterate),
					_ => (),
				}
			},
		}

		dep_idxs
			.into_iter()
			.flat_map(|dep_idx| inner.graph.neighbors_directed(dep_idx, Direction::Outgoing))
			.filter_map(|effect_idx| match &inner.graph[effect_idx] {
				Node::Effect(effect) => Some(effect.clone()),
				Node::Dep(_) => None,
			})
			.unique_by(Effect::id)
			.sorted_by_key(Effect::id)
			.collect()
	}

	/// Returns all current dependencies of `effect`
	#[must_use]
	pub fn effect_deps(&self, effect: &Effect) -> Vec<DepInfo> {
		let inner = self.inner.borrow();
		let Some(&effect_idx) = inner.effects.get(&effect.id()) else {
			return vec![];
		};

		inner
			.graph
			.neighbors_directed(effect_idx, Direction::Incoming)
			.filter_map(|dep_idx| match &inner.graph[dep_idx] {
				Node::Dep(info) => Some(info.clone()),
				Node::Effect(_) => None,
			})
			.collect()
	}

	/// Returns the number of effects subscribed to `key` of `source`
	#[must_use]
	pub fn subscriber_count(&self, source: SourceId, key: &TrackKey) -> usize {
		let inner = self.inner.borrow();
		inner
			.sources
			.get(&source)
			.and_then(|deps| deps.get(key))
			.map_or(0, |&dep_idx| {
				inner.graph.neighbors_directed(dep_idx, Direction::Outgoing).count()
			})
	}

	/// Returns whether `source` has any dependency entries
	#[must_use]
	pub fn has_source(&self, source: SourceId) -> bool {
		self.inner.borrow().sources.contains_key(&source)
	}

	/// Exports the dependency graph as a dot graph.
	#[must_use]
	pub fn export_dot(&self) -> String {
		let inner = &self.inner.borrow();
		let graph = inner.graph.map(
			|_node_idx, node| match node {
				Node::Dep(info) => format!("Dep({}.{})", info.source, info.key),
				Node::Effect(effect) => format!("Effect({} @ {})", effect.id(), effect.defined_loc()),
			},
			|_edge_idx, ()| "",
		);

		petgraph::dot::Dot::new(&graph).to_string()
	}
}

impl Default for DepGraph {
	fn default() -> Self {
		Self::new()
	}
}
