//! Plain data types of the diagram model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DiagramError;

/// Column a node belongs to. Ordered left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
	/// The single outcome the diagram works towards.
	Aim,
	/// High-level factors that drive the aim.
	Primary,
	/// Factors feeding a primary driver.
	Secondary,
	/// Concrete interventions to test.
	Change,
}

impl Level {
	/// Every level in column order.
	pub const ALL: [Level; 4] = [Level::Aim, Level::Primary, Level::Secondary, Level::Change];

	/// Key used in CSV files and form values.
	pub fn key(self) -> &'static str {
		match self {
			Level::Aim => "aim",
			Level::Primary => "primary",
			Level::Secondary => "secondary",
			Level::Change => "change",
		}
	}

	/// Human readable name, also the default column title.
	pub fn label(self) -> &'static str {
		match self {
			Level::Aim => "Aim",
			Level::Primary => "Primary",
			Level::Secondary => "Secondary",
			Level::Change => "Change idea",
		}
	}

	/// Zero-based column index.
	pub fn column(self) -> usize {
		self as usize
	}
}

impl fmt::Display for Level {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

impl FromStr for Level {
	type Err = DiagramError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"aim" => Ok(Level::Aim),
			"primary" => Ok(Level::Primary),
			"secondary" => Ok(Level::Secondary),
			"change" | "change idea" => Ok(Level::Change),
			_ => Err(DiagramError::UnknownLevel(s.trim().to_string())),
		}
	}
}

/// A box on the diagram.
///
/// The primary parent is not stored here; it lives on the incoming edges
/// (see [`super::graph::ConnectionGraph::parent_of`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
	/// Unique within a diagram.
	pub id: String,
	/// Column.
	pub level: Level,
	/// Display text, never blank.
	pub text: String,
	/// Palette value, empty for none.
	pub color: String,
}

/// A directed parent -> child connector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
	/// Parent id.
	pub from: String,
	/// Child id.
	pub to: String,
	/// Whether `from` is the child's primary parent.
	pub primary: bool,
}

impl Edge {
	pub(crate) fn new(from: impl Into<String>, to: impl Into<String>, primary: bool) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			primary,
		}
	}

	/// True when this edge joins `from` to `to`.
	pub fn joins(&self, from: &str, to: &str) -> bool {
		self.from == from && self.to == to
	}
}

/// Where a node stands in terms of incoming edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connectivity {
	/// No incoming edges, no primary parent.
	Disconnected,
	/// Exactly one incoming edge, which is the primary.
	PrimaryOnly,
	/// Two or more incoming edges, one of them primary.
	Multi,
}

/// Request for [`super::Diagram::create_node`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNode {
	/// Column.
	pub level: Level,
	/// Display text.
	pub text: String,
	/// Primary parent id; empty for top level.
	pub parent_id: String,
	/// Palette value; empty for none.
	pub color: String,
	/// Explicit id; empty to allocate one.
	pub id: String,
}

impl NewNode {
	/// A parentless, uncoloured node with an allocated id.
	pub fn new(level: Level, text: impl Into<String>) -> Self {
		Self {
			level,
			text: text.into(),
			parent_id: String::new(),
			color: String::new(),
			id: String::new(),
		}
	}

	/// Sets the primary parent.
	pub fn parent(mut self, parent_id: impl Into<String>) -> Self {
		self.parent_id = parent_id.into();
		self
	}

	/// Sets the colour.
	pub fn color(mut self, color: impl Into<String>) -> Self {
		self.color = color.into();
		self
	}

	/// Uses an explicit id instead of allocating one.
	pub fn id(mut self, id: impl Into<String>) -> Self {
		self.id = id.into();
		self
	}
}
