//! Driver diagram model: nodes, connections, palette and settings, plus the
//! CSV import/export that carries all of it.
//!
//! A [`Diagram`] is a plain value. The view layer owns one, calls its
//! operations, and re-renders from it afterwards.

use std::collections::HashSet;

use log::{debug, info, warn};

pub mod codec;
mod error;
pub mod graph;
pub mod palette;
pub mod settings;
pub mod store;
mod types;

pub use codec::{ImportReport, ImportWarning, PaletteSource};
pub use error::{DiagramError, Result};
pub use graph::ConnectionGraph;
pub use palette::{Palette, PaletteEntry};
pub use settings::{Appearance, ColumnTitles};
pub use store::NodeStore;
pub use types::{Connectivity, Edge, Level, NewNode, Node};

/// Text of the node a cleared diagram starts with.
pub const DEFAULT_AIM_TEXT: &str = "Aim";

/// Suggested download name for CSV exports.
pub const CSV_FILENAME: &str = "driver-diagram.csv";

const OPTION_TEXT_MAX: usize = 50;
const OPTION_TEXT_KEEP: usize = 47;

/// What a cascading delete of `root` would take with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadePlan {
	/// The node asked for.
	pub root: String,
	/// Its descendants along the primary-parent chain, breadth-first.
	pub dependents: Vec<String>,
}

impl CascadePlan {
	/// Number of nodes the delete removes, root included.
	pub fn total(&self) -> usize {
		self.dependents.len() + 1
	}
}

/// Outcome of a committed cascading delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deletion {
	/// Every node id that was removed.
	pub removed_ids: HashSet<String>,
	/// Number of connections that went with them.
	pub edges_removed: usize,
}

/// A whole driver diagram.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagram {
	store: NodeStore,
	graph: ConnectionGraph,
	/// Colours offered for nodes.
	pub palette: Palette,
	/// Shared box and font settings.
	pub appearance: Appearance,
	/// Column heading overrides.
	pub titles: ColumnTitles,
}

impl Diagram {
	/// An empty diagram with default palette and settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// A diagram holding just the default aim node.
	pub fn with_default_aim() -> Self {
		let mut diagram = Self::new();
		diagram.clear_all();
		diagram
	}

	pub(crate) fn from_parts(
		store: NodeStore,
		graph: ConnectionGraph,
		palette: Palette,
		appearance: Appearance,
		titles: ColumnTitles,
	) -> Self {
		Self {
			store,
			graph,
			palette,
			appearance,
			titles,
		}
	}

	/// All nodes in insertion order.
	pub fn nodes(&self) -> &[Node] {
		self.store.nodes()
	}

	/// All connections in insertion order.
	pub fn edges(&self) -> &[Edge] {
		self.graph.edges()
	}

	/// Look a node up by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.store.get(id)
	}

	/// The number the next auto-allocated id will start from.
	pub fn next_id(&self) -> u64 {
		self.store.next_id()
	}

	/// Primary parent of `id`, which may name a missing node.
	pub fn parent_of(&self, id: &str) -> Option<&str> {
		self.graph.parent_of(id)
	}

	/// Every parent of `id`, primary included.
	pub fn incoming(&self, id: &str) -> Vec<&str> {
		self.graph.incoming(id)
	}

	/// Parents of `id` besides the primary.
	pub fn extra_parents(&self, id: &str) -> Vec<&str> {
		self.graph.extra_parents(id)
	}

	/// How many connections lead into `id`, bucketed.
	pub fn connectivity(&self, id: &str) -> Connectivity {
		self.graph.connectivity(id)
	}

	/// Add a node, attaching it to `parent_id` when one is given.
	///
	/// A parent that does not exist is kept as a dangling reference.
	pub fn create_node(&mut self, req: NewNode) -> Result<Node> {
		let node = self.store.create(req.level, &req.text, &req.color, &req.id)?;
		let parent = req.parent_id.trim();
		if !parent.is_empty() {
			if parent == node.id {
				warn!("node {} cannot be its own parent, leaving it top level", node.id);
			} else {
				if !self.store.contains(parent) {
					warn!("node {} refers to missing parent {parent}", node.id);
				}
				self.graph.attach_primary(parent, &node.id);
			}
		}
		Ok(node)
	}

	/// Replace a node's text; blank text is rejected.
	pub fn update_node_text(&mut self, id: &str, text: &str) -> Result<()> {
		self.store.update_text(id, text)
	}

	/// Set a node's colour, or clear it with `""`.
	pub fn set_node_color(&mut self, id: &str, color: &str) -> Result<()> {
		self.store.set_color(id, color)
	}

	/// Work out a cascading delete without committing it.
	pub fn cascade_preview(&self, id: &str) -> Result<CascadePlan> {
		if !self.store.contains(id) {
			return Err(DiagramError::NotFound(id.to_string()));
		}
		let mut closure = self.graph.primary_descendants(id);
		let dependents = closure.split_off(1);
		Ok(CascadePlan {
			root: id.to_string(),
			dependents,
		})
	}

	/// Remove `id` and everything hanging off it along primary parents.
	pub fn delete_node_cascade(&mut self, id: &str) -> Result<Deletion> {
		let plan = self.cascade_preview(id)?;
		let removed_ids: HashSet<String> = std::iter::once(plan.root)
			.chain(plan.dependents)
			.collect();
		self.store.remove_all(&removed_ids);
		let edges_removed = self.graph.cascade_remove_for_nodes(&removed_ids);
		debug!(
			"deleted {} node(s) and {edges_removed} connection(s) from {id}",
			removed_ids.len()
		);
		Ok(Deletion {
			removed_ids,
			edges_removed,
		})
	}

	/// Connect `from` -> `to`. See [`ConnectionGraph::add_edge`].
	pub fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
		self.graph.add_edge(from, to, &self.store).map(|_| ())
	}

	/// Disconnect `from` -> `to`, promoting another parent if needed.
	pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
		self.graph.remove_edge(from, to)
	}

	/// Reset to a single default aim node. Palette and settings are kept.
	pub fn clear_all(&mut self) {
		self.store.replace_all(vec![Node {
			id: "1".to_string(),
			level: Level::Aim,
			text: DEFAULT_AIM_TEXT.to_string(),
			color: String::new(),
		}]);
		self.graph = ConnectionGraph::new();
		info!("diagram cleared");
	}

	/// Append a palette colour.
	pub fn add_colour(&mut self, label: &str, value: &str) -> Result<()> {
		self.palette.add(label, value).map(|_| ())
	}

	/// Edit a palette entry; nodes using the old value follow it.
	pub fn edit_colour(&mut self, old_value: &str, label: &str, new_value: &str) -> Result<()> {
		self.palette.edit(old_value, label, new_value)?;
		let recoloured = self.store.recolor(old_value, new_value.trim());
		debug!("recoloured {recoloured} node(s) from {old_value}");
		Ok(())
	}

	/// Drop a palette entry and clear it from any node using it.
	pub fn remove_colour(&mut self, value: &str) -> Result<PaletteEntry> {
		let entry = self
			.palette
			.remove(value)
			.ok_or_else(|| DiagramError::ColourNotFound(value.trim().to_string()))?;
		self.store.recolor(&entry.value, "");
		Ok(entry)
	}

	/// Short description of a node's primary parent for tables and tooltips.
	pub fn describe_parent(&self, id: &str) -> String {
		match self.parent_of(id) {
			None => "—".to_string(),
			Some(parent) => match self.node(parent) {
				Some(p) => format!("[{}] {}", p.id, p.level.label()),
				None => format!("(Missing: {parent})"),
			},
		}
	}

	/// Serialize nodes, connections, palette and settings as CSV.
	pub fn to_csv(&self) -> Result<String> {
		codec::encode(self)
	}

	/// Replace this diagram with the contents of `input`.
	///
	/// On error nothing changes. Row and field problems do not error; they
	/// come back in the report.
	pub fn import_csv(&mut self, input: &str) -> Result<ImportReport> {
		let (next, report) = codec::decode(input, &self.appearance, &self.titles)?;
		*self = next;
		info!("{}", report.summary());
		Ok(report)
	}
}

/// `[id] Level – text`, with long text shortened, for parent pickers.
pub fn parent_option_label(node: &Node) -> String {
	let text = if node.text.chars().count() > OPTION_TEXT_MAX {
		let short: String = node.text.chars().take(OPTION_TEXT_KEEP).collect();
		format!("{short}…")
	} else {
		node.text.clone()
	};
	format!("[{}] {} – {}", node.id, node.level.label(), text)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chain() -> Diagram {
		let mut d = Diagram::new();
		d.create_node(NewNode::new(Level::Aim, "A")).unwrap();
		d.create_node(NewNode::new(Level::Primary, "B").parent("1")).unwrap();
		d.create_node(NewNode::new(Level::Secondary, "C").parent("2")).unwrap();
		d.create_node(NewNode::new(Level::Primary, "D")).unwrap();
		d
	}

	fn set(ids: &[&str]) -> HashSet<String> {
		ids.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn create_node_attaches_primary_parent() {
		let d = chain();
		assert_eq!(d.parent_of("2"), Some("1"));
		assert_eq!(d.parent_of("3"), Some("2"));
		assert_eq!(d.parent_of("4"), None);
		assert_eq!(d.edges().len(), 2);
	}

	#[test]
	fn create_node_keeps_dangling_parent() {
		let mut d = Diagram::new();
		d.create_node(NewNode::new(Level::Primary, "orphan").parent("99")).unwrap();
		assert_eq!(d.parent_of("1"), Some("99"));
		assert_eq!(d.describe_parent("1"), "(Missing: 99)");
	}

	#[test]
	fn cascade_delete_removes_descendants() {
		let mut d = chain();
		assert_eq!(d.delete_node_cascade("1").unwrap().removed_ids, set(&["1", "2", "3"]));
		assert_eq!(d.nodes().len(), 1);
		assert!(d.edges().is_empty());

		let mut d = chain();
		assert_eq!(d.delete_node_cascade("2").unwrap().removed_ids, set(&["2", "3"]));
		assert!(d.node("1").is_some());

		let mut d = chain();
		assert_eq!(d.delete_node_cascade("4").unwrap().removed_ids, set(&["4"]));
		assert_eq!(d.nodes().len(), 3);
	}

	#[test]
	fn cascade_preview_does_not_mutate() {
		let d = chain();
		let plan = d.cascade_preview("1").unwrap();
		assert_eq!(plan.dependents, vec!["2", "3"]);
		assert_eq!(plan.total(), 3);
		assert_eq!(d.nodes().len(), 4);
		assert!(matches!(d.cascade_preview("nope"), Err(DiagramError::NotFound(_))));
	}

	#[test]
	fn extra_parent_does_not_pull_child_into_cascade() {
		let mut d = chain();
		d.add_edge("4", "3").unwrap();
		let gone = d.delete_node_cascade("4").unwrap();
		assert_eq!(gone.removed_ids, set(&["4"]));
		assert_eq!(gone.edges_removed, 1);
		assert_eq!(d.parent_of("3"), Some("2"));
	}

	#[test]
	fn clear_all_leaves_one_aim() {
		let mut d = chain();
		d.clear_all();
		assert_eq!(d.nodes().len(), 1);
		assert_eq!(d.nodes()[0].id, "1");
		assert_eq!(d.nodes()[0].level, Level::Aim);
		assert!(d.edges().is_empty());
		assert_eq!(d.next_id(), 2);
	}

	#[test]
	fn clear_all_after_huge_ids_restarts_at_one() {
		let mut d = Diagram::new();
		d.create_node(NewNode::new(Level::Aim, "A").id(u64::MAX.to_string())).unwrap();
		d.clear_all();
		assert_eq!(d.node("1").unwrap().text, DEFAULT_AIM_TEXT);
		assert_eq!(d.create_node(NewNode::new(Level::Primary, "B")).unwrap().id, "2");
	}

	#[test]
	fn node_colour_can_be_set_and_cleared() {
		let mut d = chain();
		d.set_node_color("2", " #123456 ").unwrap();
		assert_eq!(d.node("2").unwrap().color, "#123456");
		d.set_node_color("2", "").unwrap();
		assert_eq!(d.node("2").unwrap().color, "");
		assert!(matches!(d.set_node_color("9", "#000000"), Err(DiagramError::NotFound(_))));
	}

	#[test]
	fn colour_edits_follow_nodes() {
		let mut d = Diagram::new();
		d.palette = Palette::empty();
		d.add_colour("Sun", "#FFD700").unwrap();
		d.create_node(NewNode::new(Level::Aim, "A").color("#ffd700")).unwrap();

		d.edit_colour("#FFD700", "Gold", "#DAA520").unwrap();
		assert_eq!(d.node("1").unwrap().color, "#DAA520");

		d.remove_colour("#daa520").unwrap();
		assert_eq!(d.node("1").unwrap().color, "");
		assert!(d.palette.is_empty());
	}

	#[test]
	fn option_label_truncates_long_text() {
		let node = Node {
			id: "7".into(),
			level: Level::Change,
			text: "x".repeat(60),
			color: String::new(),
		};
		let label = parent_option_label(&node);
		assert_eq!(label, format!("[7] Change idea – {}…", "x".repeat(47)));

		let short = Node {
			text: "Short".into(),
			..node
		};
		assert_eq!(parent_option_label(&short), "[7] Change idea – Short");
	}
}
