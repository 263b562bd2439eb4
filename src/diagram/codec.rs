//! CSV import/export.
//!
//! One row per node. Diagram-wide settings and the palette (as JSON) are
//! repeated on every row so any single row carries them. Import is lenient:
//! only a missing `id`, `level` or `text` column fails the whole file, every
//! other problem is skipped and recorded in the [`ImportReport`].

use std::collections::HashMap;
use std::fmt;

use csv::{ReaderBuilder, StringRecord, Writer};
use log::warn;
use thiserror::Error;

use super::error::{DiagramError, Result};
use super::graph::ConnectionGraph;
use super::palette::Palette;
use super::settings::{Appearance, ColumnTitles};
use super::store::NodeStore;
use super::types::{Level, Node};
use super::Diagram;

/// Column order written on export.
pub const COLUMNS: [&str; 16] = [
	"id",
	"level",
	"parent_id",
	"text",
	"color",
	"extra_parents",
	"box_height",
	"vertical_gap",
	"font_size",
	"font_family",
	"font_bold",
	"title_aim",
	"title_primary",
	"title_secondary",
	"title_change",
	"palette_json",
];

const SETTINGS_COLUMNS: [&str; 9] = [
	"box_height",
	"vertical_gap",
	"font_size",
	"font_family",
	"font_bold",
	"title_aim",
	"title_primary",
	"title_secondary",
	"title_change",
];

/// Something an import tolerated instead of failing.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ImportWarning {
	/// A row lacked a required cell or had an unknown level.
	#[error("line {line}: skipped row, {reason}")]
	MalformedRow {
		/// 1-based CSV line.
		line: u64,
		/// What was wrong.
		reason: String,
	},

	/// A later row reused an id.
	#[error("line {line}: skipped row, id {id} is already used")]
	DuplicateId {
		/// 1-based CSV line.
		line: u64,
		/// The repeated id.
		id: String,
	},

	/// A row named itself as parent.
	#[error("node {id} listed itself as parent, ignored")]
	SelfParent {
		/// The node.
		id: String,
	},

	/// An extra parent named a node the file does not contain.
	#[error("dropped connection {from} -> {to}, a node is missing")]
	UnknownEndpoint {
		/// Parent id.
		from: String,
		/// Child id.
		to: String,
	},

	/// A `palette_json` cell was not a JSON array of entries.
	#[error("line {line}: palette_json unreadable ({reason})")]
	MalformedPalette {
		/// 1-based CSV line.
		line: u64,
		/// Parser message.
		reason: String,
	},

	/// A setting was out of range or unparsable.
	#[error("{field} value {value:?} rejected, kept the previous value")]
	MalformedAppearance {
		/// Column name.
		field: &'static str,
		/// Cell as found.
		value: String,
	},
}

/// Where the imported palette came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteSource {
	/// A `palette_json` cell.
	Embedded,
	/// Rebuilt from the colours the nodes use.
	DerivedFromNodes,
}

/// Summary of a CSV import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportReport {
	/// Nodes that made it in.
	pub imported: usize,
	/// Connections created, primary and extra.
	pub edges: usize,
	/// Whether the palette was read or rebuilt.
	pub palette_source: PaletteSource,
	/// Everything tolerated along the way.
	pub warnings: Vec<ImportWarning>,
}

impl ImportReport {
	/// Rows left out of the diagram.
	pub fn skipped_rows(&self) -> usize {
		self.warnings
			.iter()
			.filter(|w| {
				matches!(
					w,
					ImportWarning::MalformedRow { .. } | ImportWarning::DuplicateId { .. }
				)
			})
			.count()
	}

	/// Extra-parent connections that could not be made.
	pub fn dropped_edges(&self) -> usize {
		self.warnings
			.iter()
			.filter(|w| matches!(w, ImportWarning::UnknownEndpoint { .. }))
			.count()
	}

	/// One line for the status bar.
	pub fn summary(&self) -> String {
		let mut out = format!("Imported {} node(s)", self.imported);
		if self.skipped_rows() > 0 {
			out.push_str(&format!(", skipped {} row(s)", self.skipped_rows()));
		}
		if self.dropped_edges() > 0 {
			out.push_str(&format!(", dropped {} connection(s)", self.dropped_edges()));
		}
		if self.palette_source == PaletteSource::DerivedFromNodes {
			out.push_str(", palette rebuilt from node colours");
		}
		out
	}
}

impl fmt::Display for ImportReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.summary())
	}
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn format_number(v: f64) -> String {
	format!("{v}")
}

/// Write `diagram` as CSV text with a header row.
pub fn encode(diagram: &Diagram) -> Result<String> {
	let mut writer = Writer::from_writer(Vec::new());
	writer.write_record(COLUMNS)?;

	let palette_json = diagram.palette.to_json()?;
	let a = &diagram.appearance;
	let t = &diagram.titles;
	let settings = [
		format_number(a.box_height),
		format_number(a.vertical_gap),
		format_number(a.font_size),
		a.font_family.clone(),
		a.font_bold.to_string(),
		t.aim.clone(),
		t.primary.clone(),
		t.secondary.clone(),
		t.change.clone(),
	];

	for node in diagram.nodes() {
		let parent = diagram.parent_of(&node.id).unwrap_or_default();
		let extra = diagram.extra_parents(&node.id).join(";");
		let mut row = vec![
			node.id.as_str(),
			node.level.key(),
			parent,
			node.text.as_str(),
			node.color.as_str(),
			extra.as_str(),
		];
		row.extend(settings.iter().map(String::as_str));
		row.push(palette_json.as_str());
		writer.write_record(&row)?;
	}

	let bytes = writer
		.into_inner()
		.map_err(|e| DiagramError::Csv(e.into_error().into()))?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

struct Row {
	line: u64,
	record: StringRecord,
}

/// Header name -> position, names trimmed and lowercased.
struct Columns(HashMap<String, usize>);

impl Columns {
	fn new(headers: &StringRecord) -> Self {
		Self(
			headers
				.iter()
				.enumerate()
				.map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase(), i))
				.collect(),
		)
	}

	fn has(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	/// Trimmed cell, empty when the column or cell is missing.
	fn get<'r>(&self, record: &'r StringRecord, name: &str) -> &'r str {
		self.0
			.get(name)
			.and_then(|&i| record.get(i))
			.map(str::trim)
			.unwrap_or_default()
	}
}

struct PendingNode {
	node: Node,
	parent: String,
	extra: Vec<String>,
}

fn split_parents(cell: &str) -> Vec<String> {
	cell.split([';', ','])
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

/// Parse CSV text into a fresh diagram.
///
/// `appearance` and `titles` are the values to keep for any setting the file
/// lacks or gets wrong.
pub fn decode(
	input: &str,
	appearance: &Appearance,
	titles: &ColumnTitles,
) -> Result<(Diagram, ImportReport)> {
	let mut reader = ReaderBuilder::new()
		.flexible(true)
		.trim(csv::Trim::None)
		.from_reader(input.as_bytes());

	let columns = Columns::new(reader.headers()?);
	for required in ["id", "level", "text"] {
		if !columns.has(required) {
			return Err(DiagramError::MissingColumn(required));
		}
	}

	let mut warnings = Vec::new();
	let mut rows = Vec::new();
	for (idx, result) in reader.records().enumerate() {
		let fallback_line = idx as u64 + 2;
		match result {
			Ok(record) => rows.push(Row {
				line: record.position().map_or(fallback_line, |p| p.line()),
				record,
			}),
			Err(e) => {
				let line = e.position().map_or(fallback_line, |p| p.line());
				warnings.push(ImportWarning::MalformedRow {
					line,
					reason: e.to_string(),
				});
			}
		}
	}

	let pending = read_nodes(&rows, &columns, &mut warnings);

	let mut store = NodeStore::new();
	store.replace_all(pending.iter().map(|p| p.node.clone()).collect());

	let mut graph = ConnectionGraph::new();
	for p in &pending {
		if p.parent == p.node.id {
			warnings.push(ImportWarning::SelfParent { id: p.node.id.clone() });
		}
	}
	graph.rebuild_from_parents(pending.iter().map(|p| (p.node.id.as_str(), p.parent.as_str())));

	for p in &pending {
		for from in &p.extra {
			if graph.contains(from, &p.node.id) {
				continue;
			}
			match graph.add_edge(from, &p.node.id, &store) {
				Ok(_) => {}
				Err(DiagramError::SelfLoop(id)) => {
					warnings.push(ImportWarning::SelfParent { id });
				}
				Err(_) => warnings.push(ImportWarning::UnknownEndpoint {
					from: from.clone(),
					to: p.node.id.clone(),
				}),
			}
		}
	}

	let (palette, palette_source) = read_palette(&rows, &columns, store.nodes(), &mut warnings);
	let (appearance, titles) = read_settings(&rows, &columns, appearance, titles, &mut warnings);

	for w in &warnings {
		warn!("CSV import: {w}");
	}

	let report = ImportReport {
		imported: store.len(),
		edges: graph.len(),
		palette_source,
		warnings,
	};
	let diagram = Diagram::from_parts(store, graph, palette, appearance, titles);
	Ok((diagram, report))
}

fn read_nodes(rows: &[Row], columns: &Columns, warnings: &mut Vec<ImportWarning>) -> Vec<PendingNode> {
	let mut pending: Vec<PendingNode> = Vec::new();
	for row in rows {
		let id = columns.get(&row.record, "id");
		let level = columns.get(&row.record, "level");
		let text = columns.get(&row.record, "text");

		let missing: Vec<&str> = [("id", id), ("level", level), ("text", text)]
			.into_iter()
			.filter(|(_, v)| v.is_empty())
			.map(|(name, _)| name)
			.collect();
		if !missing.is_empty() {
			warnings.push(ImportWarning::MalformedRow {
				line: row.line,
				reason: format!("missing {}", missing.join(", ")),
			});
			continue;
		}

		let level = match level.parse::<Level>() {
			Ok(level) => level,
			Err(e) => {
				warnings.push(ImportWarning::MalformedRow {
					line: row.line,
					reason: e.to_string(),
				});
				continue;
			}
		};

		if pending.iter().any(|p| p.node.id == id) {
			warnings.push(ImportWarning::DuplicateId {
				line: row.line,
				id: id.to_string(),
			});
			continue;
		}

		let parent = columns.get(&row.record, "parent_id").to_string();
		let extra = split_parents(columns.get(&row.record, "extra_parents"))
			.into_iter()
			.filter(|from| *from != parent)
			.collect();
		pending.push(PendingNode {
			node: Node {
				id: id.to_string(),
				level,
				text: text.to_string(),
				color: columns.get(&row.record, "color").to_string(),
			},
			parent,
			extra,
		});
	}
	pending
}

fn read_palette(
	rows: &[Row],
	columns: &Columns,
	nodes: &[Node],
	warnings: &mut Vec<ImportWarning>,
) -> (Palette, PaletteSource) {
	let mut reported = false;
	for row in rows {
		let cell = columns.get(&row.record, "palette_json");
		if cell.is_empty() {
			continue;
		}
		match Palette::from_json(cell) {
			Ok(palette) => return (palette, PaletteSource::Embedded),
			// Every row repeats the cell, so one warning is enough.
			Err(e) if !reported => {
				reported = true;
				warnings.push(ImportWarning::MalformedPalette {
					line: row.line,
					reason: e.to_string(),
				});
			}
			Err(_) => {}
		}
	}
	let derived = Palette::from_used(nodes.iter().map(|n| n.color.as_str()));
	(derived, PaletteSource::DerivedFromNodes)
}

fn read_number(
	cell: &str,
	field: &'static str,
	valid: fn(f64) -> bool,
	current: f64,
	warnings: &mut Vec<ImportWarning>,
) -> f64 {
	if cell.is_empty() {
		return current;
	}
	match cell.parse::<f64>() {
		Ok(v) if valid(v) => v,
		_ => {
			warnings.push(ImportWarning::MalformedAppearance {
				field,
				value: cell.to_string(),
			});
			current
		}
	}
}

fn read_bool(cell: &str, current: bool, warnings: &mut Vec<ImportWarning>) -> bool {
	match cell.to_ascii_lowercase().as_str() {
		"" => current,
		"true" | "1" | "yes" => true,
		"false" | "0" | "no" => false,
		_ => {
			warnings.push(ImportWarning::MalformedAppearance {
				field: "font_bold",
				value: cell.to_string(),
			});
			current
		}
	}
}

fn read_settings(
	rows: &[Row],
	columns: &Columns,
	appearance: &Appearance,
	titles: &ColumnTitles,
	warnings: &mut Vec<ImportWarning>,
) -> (Appearance, ColumnTitles) {
	let mut appearance = appearance.clone();
	let mut titles = titles.clone();

	let Some(row) = rows.iter().find(|row| {
		SETTINGS_COLUMNS
			.iter()
			.any(|c| !columns.get(&row.record, c).is_empty())
	}) else {
		return (appearance, titles);
	};
	let cell = |name: &str| columns.get(&row.record, name);

	appearance.box_height = read_number(
		cell("box_height"),
		"box_height",
		Appearance::valid_box_height,
		appearance.box_height,
		warnings,
	);
	appearance.vertical_gap = read_number(
		cell("vertical_gap"),
		"vertical_gap",
		Appearance::valid_vertical_gap,
		appearance.vertical_gap,
		warnings,
	);
	appearance.font_size = read_number(
		cell("font_size"),
		"font_size",
		Appearance::valid_font_size,
		appearance.font_size,
		warnings,
	);
	if !cell("font_family").is_empty() {
		appearance.font_family = cell("font_family").to_string();
	}
	appearance.font_bold = read_bool(cell("font_bold"), appearance.font_bold, warnings);

	for level in Level::ALL {
		let name = format!("title_{}", level.key());
		if columns.has(&name) {
			titles.set(level, cell(&name));
		}
	}

	(appearance, titles)
}
