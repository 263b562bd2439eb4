//! Parent -> child connections and the cascade walk.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use super::error::{DiagramError, Result};
use super::store::NodeStore;
use super::types::{Connectivity, Edge};

/// Directed parent -> child edges.
///
/// The edge list is the only record of parentage. Per child, at most one
/// incoming edge is flagged primary, and whenever a child has any incoming
/// edge exactly one of them is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionGraph {
	edges: Vec<Edge>,
}

impl ConnectionGraph {
	/// A graph with no edges.
	pub fn new() -> Self {
		Self::default()
	}

	/// Every edge in insertion order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Number of edges.
	pub fn len(&self) -> usize {
		self.edges.len()
	}

	/// Whether there are no edges.
	pub fn is_empty(&self) -> bool {
		self.edges.is_empty()
	}

	/// Whether `from` -> `to` exists, primary or not.
	pub fn contains(&self, from: &str, to: &str) -> bool {
		self.edges.iter().any(|e| e.joins(from, to))
	}

	/// Replace every edge with one primary edge per `(child, parent)` pair.
	///
	/// Empty parents and self-parents are skipped. Parents need not exist;
	/// such edges are shown as missing rather than dropped.
	pub fn rebuild_from_parents<'a, I>(&mut self, pairs: I)
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		self.edges = pairs
			.into_iter()
			.filter(|(child, parent)| !parent.is_empty() && child != parent)
			.map(|(child, parent)| Edge::new(parent, child, true))
			.collect();
	}

	/// Connect `from` -> `to`. The edge becomes primary when `to` had no
	/// primary parent yet.
	pub fn add_edge(&mut self, from: &str, to: &str, nodes: &NodeStore) -> Result<&Edge> {
		if from == to {
			return Err(DiagramError::SelfLoop(from.to_string()));
		}
		if self.contains(from, to) {
			return Err(DiagramError::DuplicateEdge {
				from: from.to_string(),
				to: to.to_string(),
			});
		}
		if !nodes.contains(from) || !nodes.contains(to) {
			return Err(DiagramError::UnknownEndpoint {
				from: from.to_string(),
				to: to.to_string(),
			});
		}

		let primary = self.parent_of(to).is_none();
		debug!("connecting {from} -> {to} (primary: {primary})");
		self.edges.push(Edge::new(from, to, primary));
		Ok(&self.edges[self.edges.len() - 1])
	}

	/// Push a primary edge for a freshly created child. The parent may be dangling.
	pub(crate) fn attach_primary(&mut self, parent: &str, child: &str) {
		if parent.is_empty() || parent == child || self.parent_of(child).is_some() {
			return;
		}
		self.edges.push(Edge::new(parent, child, true));
	}

	/// Disconnect `from` -> `to`. Returns whether an edge was removed.
	///
	/// Removing the primary edge promotes the child's first remaining incoming
	/// edge, if any.
	pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
		let Some(pos) = self.edges.iter().position(|e| e.joins(from, to)) else {
			return false;
		};
		let removed = self.edges.remove(pos);
		if removed.primary {
			if let Some(next) = self.edges.iter_mut().find(|e| e.to == to) {
				next.primary = true;
				debug!("{} is now the primary parent of {to}", next.from);
			}
		}
		true
	}

	/// Primary parent of `child`, if it has one.
	pub fn parent_of(&self, child: &str) -> Option<&str> {
		self.edges
			.iter()
			.find(|e| e.to == child && e.primary)
			.map(|e| e.from.as_str())
	}

	/// Parents of `child` in insertion order, primary included.
	pub fn incoming(&self, child: &str) -> Vec<&str> {
		self.edges
			.iter()
			.filter(|e| e.to == child)
			.map(|e| e.from.as_str())
			.collect()
	}

	/// Parents of `child` other than the primary, deduplicated, in insertion order.
	pub fn extra_parents(&self, child: &str) -> Vec<&str> {
		let mut seen = HashSet::new();
		self.edges
			.iter()
			.filter(|e| e.to == child && !e.primary)
			.map(|e| e.from.as_str())
			.filter(|from| seen.insert(*from))
			.collect()
	}

	/// Bucket `child` by its number of incoming edges.
	pub fn connectivity(&self, child: &str) -> Connectivity {
		match self.edges.iter().filter(|e| e.to == child).count() {
			0 => Connectivity::Disconnected,
			1 => Connectivity::PrimaryOnly,
			_ => Connectivity::Multi,
		}
	}

	/// `root` plus everything reachable from it along primary edges,
	/// breadth-first. Terminates on cyclic data.
	pub fn primary_descendants(&self, root: &str) -> Vec<String> {
		let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
		for edge in self.edges.iter().filter(|e| e.primary) {
			children.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
		}

		let mut visited: HashSet<&str> = HashSet::from([root]);
		let mut order = vec![root.to_string()];
		let mut queue = VecDeque::from([root]);
		while let Some(id) = queue.pop_front() {
			for &child in children.get(id).into_iter().flatten() {
				if visited.insert(child) {
					order.push(child.to_string());
					queue.push_back(child);
				}
			}
		}
		order
	}

	/// Strip every edge touching a removed node. Returns how many went.
	pub fn cascade_remove_for_nodes(&mut self, removed: &HashSet<String>) -> usize {
		let before = self.edges.len();
		self.edges
			.retain(|e| !removed.contains(&e.from) && !removed.contains(&e.to));
		// `removed` need not be closed under primary parentage; re-elect a
		// primary for any surviving child that lost it.
		let orphaned: Vec<String> = self
			.edges
			.iter()
			.filter(|e| self.parent_of(&e.to).is_none())
			.map(|e| e.to.clone())
			.collect();
		for child in orphaned {
			if let Some(next) = self.edges.iter_mut().find(|e| e.to == child) {
				next.primary = true;
			}
		}
		before - self.edges.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::diagram::types::Level;

	fn store_with(ids: &[&str]) -> NodeStore {
		let mut store = NodeStore::new();
		for id in ids {
			store.create(Level::Primary, id, "", id).unwrap();
		}
		store
	}

	#[test]
	fn first_edge_into_a_child_becomes_primary() {
		let store = store_with(&["p", "q", "c"]);
		let mut graph = ConnectionGraph::new();
		assert!(graph.add_edge("p", "c", &store).unwrap().primary);
		assert!(!graph.add_edge("q", "c", &store).unwrap().primary);
		assert_eq!(graph.parent_of("c"), Some("p"));
		assert_eq!(graph.incoming("c"), vec!["p", "q"]);
		assert_eq!(graph.extra_parents("c"), vec!["q"]);
		assert_eq!(graph.connectivity("c"), Connectivity::Multi);
	}

	#[test]
	fn duplicate_edge_is_rejected() {
		let store = store_with(&["x", "y"]);
		let mut graph = ConnectionGraph::new();
		graph.add_edge("x", "y", &store).unwrap();
		assert!(matches!(
			graph.add_edge("x", "y", &store),
			Err(DiagramError::DuplicateEdge { .. })
		));
		assert_eq!(graph.len(), 1);
	}

	#[test]
	fn unknown_endpoints_and_self_loops_are_rejected() {
		let store = store_with(&["x"]);
		let mut graph = ConnectionGraph::new();
		assert!(matches!(
			graph.add_edge("x", "ghost", &store),
			Err(DiagramError::UnknownEndpoint { .. })
		));
		assert!(matches!(graph.add_edge("x", "x", &store), Err(DiagramError::SelfLoop(_))));
		assert!(graph.is_empty());
	}

	#[test]
	fn removing_primary_promotes_remaining_parent() {
		let store = store_with(&["p", "q", "c"]);
		let mut graph = ConnectionGraph::new();
		graph.add_edge("p", "c", &store).unwrap();
		graph.add_edge("q", "c", &store).unwrap();

		assert!(graph.remove_edge("p", "c"));
		assert_eq!(graph.parent_of("c"), Some("q"));
		assert_eq!(graph.connectivity("c"), Connectivity::PrimaryOnly);

		assert!(graph.remove_edge("q", "c"));
		assert_eq!(graph.parent_of("c"), None);
		assert_eq!(graph.connectivity("c"), Connectivity::Disconnected);

		assert!(!graph.remove_edge("q", "c"));
	}

	#[test]
	fn removing_extra_edge_keeps_primary() {
		let store = store_with(&["p", "q", "c"]);
		let mut graph = ConnectionGraph::new();
		graph.add_edge("p", "c", &store).unwrap();
		graph.add_edge("q", "c", &store).unwrap();
		graph.remove_edge("q", "c");
		assert_eq!(graph.parent_of("c"), Some("p"));
	}

	#[test]
	fn rebuild_replaces_edges_with_primaries() {
		let store = store_with(&["a", "b"]);
		let mut graph = ConnectionGraph::new();
		graph.add_edge("a", "b", &store).unwrap();
		graph.rebuild_from_parents([("b", "a"), ("c", "b"), ("a", ""), ("d", "d")]);
		assert_eq!(graph.len(), 2);
		assert!(graph.edges().iter().all(|e| e.primary));
		assert_eq!(graph.parent_of("c"), Some("b"));
	}

	#[test]
	fn descendants_follow_primary_chain_only() {
		let store = store_with(&["a", "b", "c", "d"]);
		let mut graph = ConnectionGraph::new();
		graph.add_edge("a", "b", &store).unwrap();
		graph.add_edge("b", "c", &store).unwrap();
		graph.add_edge("d", "c", &store).unwrap();

		assert_eq!(graph.primary_descendants("a"), vec!["a", "b", "c"]);
		assert_eq!(graph.primary_descendants("b"), vec!["b", "c"]);
		assert_eq!(graph.primary_descendants("d"), vec!["d"]);
	}

	#[test]
	fn descendants_terminate_on_cycles() {
		let mut graph = ConnectionGraph::new();
		graph.rebuild_from_parents([("a", "b"), ("b", "a")]);
		let mut found = graph.primary_descendants("a");
		found.sort();
		assert_eq!(found, vec!["a", "b"]);
	}

	#[test]
	fn cascade_strips_edges_touching_removed_nodes() {
		let store = store_with(&["a", "b", "c", "d"]);
		let mut graph = ConnectionGraph::new();
		graph.add_edge("a", "b", &store).unwrap();
		graph.add_edge("d", "c", &store).unwrap();
		graph.add_edge("b", "c", &store).unwrap();

		let removed = HashSet::from(["a".to_string(), "b".to_string()]);
		assert_eq!(graph.cascade_remove_for_nodes(&removed), 2);
		assert_eq!(graph.edges(), &[Edge::new("d", "c", true)]);
	}
}
