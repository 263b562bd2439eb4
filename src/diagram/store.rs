//! Node storage and id allocation.

use std::collections::HashSet;

use log::debug;

use super::error::{DiagramError, Result};
use super::types::{Level, Node};

/// Leading decimal digits of `id`, if any and if they fit a `u64`.
fn leading_number(id: &str) -> Option<u64> {
	let id = id.trim_start();
	let id = id.strip_prefix('+').unwrap_or(id);
	let end = id.find(|c: char| !c.is_ascii_digit()).unwrap_or(id.len());
	id[..end].parse().ok()
}

/// Owns every node of a diagram, in insertion order, plus the id counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeStore {
	nodes: Vec<Node>,
	next_id: u64,
}

impl Default for NodeStore {
	fn default() -> Self {
		Self {
			nodes: Vec::new(),
			next_id: 1,
		}
	}
}

impl NodeStore {
	/// An empty store whose first id is `1`.
	pub fn new() -> Self {
		Self::default()
	}

	/// All nodes in insertion order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the store holds no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// The node with this exact id.
	pub fn get(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	/// Whether a node with this exact id exists.
	pub fn contains(&self, id: &str) -> bool {
		self.get(id).is_some()
	}

	/// The id the next auto-allocated node would receive.
	pub fn next_id(&self) -> u64 {
		self.next_id
	}

	/// Add a node. An empty `explicit_id` allocates the next free numeric id.
	pub fn create(&mut self, level: Level, text: &str, color: &str, explicit_id: &str) -> Result<Node> {
		let text = text.trim();
		if text.is_empty() {
			return Err(DiagramError::EmptyText);
		}

		let explicit_id = explicit_id.trim();
		let id = if explicit_id.is_empty() {
			self.allocate_id()
		} else if self.contains(explicit_id) {
			return Err(DiagramError::DuplicateId(explicit_id.to_string()));
		} else {
			if let Some(n) = leading_number(explicit_id) {
				self.next_id = self.next_id.max(n.saturating_add(1));
			}
			explicit_id.to_string()
		};

		let node = Node {
			id,
			level,
			text: text.to_string(),
			color: color.trim().to_string(),
		};
		debug!("created node {} ({})", node.id, node.level.key());
		self.nodes.push(node.clone());
		Ok(node)
	}

	// Explicit ids can occupy numbers ahead of the counter, so skip those.
	fn allocate_id(&mut self) -> String {
		loop {
			let candidate = self.next_id.to_string();
			let taken = self.contains(&candidate);
			match self.next_id.checked_add(1) {
				Some(next) => self.next_id = next,
				None if taken => return self.lowest_free_id(),
				None => return candidate,
			}
			if !taken {
				return candidate;
			}
		}
	}

	// Counter exhausted: reuse the smallest number no node holds.
	fn lowest_free_id(&self) -> String {
		let used: HashSet<u64> = self.nodes.iter().filter_map(|n| leading_number(&n.id)).collect();
		let free = (1..=u64::MAX).find(|n| !used.contains(n)).unwrap_or(u64::MAX);
		debug!("id counter exhausted, reusing {free}");
		free.to_string()
	}

	/// Reset the counter to one past the largest numeric id, or 1 when empty.
	///
	/// An id counts as numeric when it starts with digits, so `12abc` reads as 12.
	pub fn recompute_next_id(&mut self) {
		self.next_id = self
			.nodes
			.iter()
			.filter_map(|n| leading_number(&n.id))
			.max()
			.map_or(1, |max| max.saturating_add(1));
	}

	/// Replace a node's text. Blank text is rejected before the lookup.
	pub fn update_text(&mut self, id: &str, text: &str) -> Result<()> {
		let text = text.trim();
		if text.is_empty() {
			return Err(DiagramError::EmptyText);
		}
		let node = self
			.get_mut(id)
			.ok_or_else(|| DiagramError::NotFound(id.to_string()))?;
		node.text = text.to_string();
		Ok(())
	}

	/// Set or clear (with `""`) a node's colour.
	pub fn set_color(&mut self, id: &str, color: &str) -> Result<()> {
		let node = self
			.get_mut(id)
			.ok_or_else(|| DiagramError::NotFound(id.to_string()))?;
		node.color = color.trim().to_string();
		Ok(())
	}

	/// Replace every node colour matching `from` (case-insensitive) with `to`.
	/// Returns how many nodes changed.
	pub fn recolor(&mut self, from: &str, to: &str) -> usize {
		let mut changed = 0;
		for node in &mut self.nodes {
			if !node.color.is_empty() && node.color.eq_ignore_ascii_case(from) {
				node.color = to.to_string();
				changed += 1;
			}
		}
		changed
	}

	/// Drop every node whose id is in `ids`, then recompute the counter.
	pub fn remove_all(&mut self, ids: &HashSet<String>) -> Vec<Node> {
		let (removed, kept): (Vec<Node>, Vec<Node>) = std::mem::take(&mut self.nodes)
			.into_iter()
			.partition(|n| ids.contains(&n.id));
		self.nodes = kept;
		self.recompute_next_id();
		removed
	}

	/// Swap in a whole new node list (import, clear-all).
	pub fn replace_all(&mut self, nodes: Vec<Node>) {
		self.nodes = nodes;
		self.recompute_next_id();
	}
}
