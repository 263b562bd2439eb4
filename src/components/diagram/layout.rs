use std::collections::HashMap;

use crate::diagram::{Diagram, Level};

pub const COLUMN_WIDTH: f64 = 220.0;
pub const COLUMN_GAP: f64 = 80.0;
pub const PADDING: f64 = 24.0;
pub const HEADER_HEIGHT: f64 = 40.0;

/// Where a node's box sits on the board.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxRect {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl BoxRect {
	fn right_mid(&self) -> (f64, f64) {
		(self.x + self.width, self.y + self.height / 2.0)
	}

	fn left_mid(&self) -> (f64, f64) {
		(self.x, self.y + self.height / 2.0)
	}
}

/// An SVG path joining a parent's box to a child's.
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
	pub from: String,
	pub to: String,
	pub primary: bool,
	pub path: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardLayout {
	pub boxes: Vec<BoxRect>,
	pub connectors: Vec<Connector>,
	pub width: f64,
	pub height: f64,
}

pub fn column_x(level: Level) -> f64 {
	PADDING + level.column() as f64 * (COLUMN_WIDTH + COLUMN_GAP)
}

/// Cubic curve leaving `start` and entering `end` horizontally.
pub fn connector_path(start: (f64, f64), end: (f64, f64)) -> String {
	let bend = ((end.0 - start.0) / 2.0).abs().max(COLUMN_GAP / 2.0);
	format!(
		"M {} {} C {} {}, {} {}, {} {}",
		start.0,
		start.1,
		start.0 + bend,
		start.1,
		end.0 - bend,
		end.1,
		end.0,
		end.1
	)
}

/// Stack every column's boxes top to bottom and join them up.
///
/// Edges whose parent is missing get no connector.
pub fn layout(diagram: &Diagram) -> BoardLayout {
	let (height, gap) = (diagram.appearance.box_height, diagram.appearance.vertical_gap);
	let mut next_y: HashMap<Level, f64> = HashMap::new();
	let mut boxes = Vec::with_capacity(diagram.nodes().len());

	for node in diagram.nodes() {
		let y = next_y.entry(node.level).or_insert(PADDING + HEADER_HEIGHT);
		boxes.push(BoxRect {
			id: node.id.clone(),
			x: column_x(node.level),
			y: *y,
			width: COLUMN_WIDTH,
			height,
		});
		*y += height + gap;
	}

	let by_id: HashMap<&str, &BoxRect> = boxes.iter().map(|b| (b.id.as_str(), b)).collect();
	let connectors = diagram
		.edges()
		.iter()
		.filter_map(|edge| {
			let (from, to) = (by_id.get(edge.from.as_str())?, by_id.get(edge.to.as_str())?);
			Some(Connector {
				from: edge.from.clone(),
				to: edge.to.clone(),
				primary: edge.primary,
				path: connector_path(from.right_mid(), to.left_mid()),
			})
		})
		.collect();

	let tallest = next_y.values().copied().fold(PADDING + HEADER_HEIGHT, f64::max);
	BoardLayout {
		boxes,
		connectors,
		width: column_x(Level::Change) + COLUMN_WIDTH + PADDING,
		height: tallest + PADDING,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::diagram::NewNode;

	fn rect<'a>(board: &'a BoardLayout, id: &str) -> &'a BoxRect {
		board.boxes.iter().find(|b| b.id == id).unwrap()
	}

	fn sample() -> Diagram {
		let mut d = Diagram::new();
		d.create_node(NewNode::new(Level::Aim, "Aim")).unwrap();
		d.create_node(NewNode::new(Level::Primary, "P1").parent("1")).unwrap();
		d.create_node(NewNode::new(Level::Primary, "P2").parent("1")).unwrap();
		d.create_node(NewNode::new(Level::Change, "Lost").parent("ghost")).unwrap();
		d
	}

	#[test]
	fn boxes_stack_within_their_column() {
		let board = layout(&sample());
		let (p1, p2) = (rect(&board, "2"), rect(&board, "3"));
		assert_eq!(p1.x, column_x(Level::Primary));
		assert_eq!(p1.x, p2.x);
		assert_eq!(p2.y - p1.y, 80.0 + 24.0);
		assert_eq!(rect(&board, "1").y, p1.y);
	}

	#[test]
	fn dangling_edges_get_no_connector() {
		let board = layout(&sample());
		assert_eq!(board.connectors.len(), 2);
		assert!(board.connectors.iter().all(|c| c.from == "1"));
	}

	#[test]
	fn connector_runs_from_parent_right_to_child_left() {
		let board = layout(&sample());
		let aim = rect(&board, "1");
		let path = &board.connectors[0].path;
		assert!(path.starts_with(&format!("M {} {}", aim.x + aim.width, aim.y + 40.0)));
	}

	#[test]
	fn board_grows_with_tallest_column() {
		let empty = layout(&Diagram::new());
		let board = layout(&sample());
		assert_eq!(empty.height, PADDING + HEADER_HEIGHT + PADDING);
		assert_eq!(board.height, empty.height + 2.0 * (80.0 + 24.0));
		assert_eq!(board.width, empty.width);
	}
}
