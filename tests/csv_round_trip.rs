use std::collections::BTreeSet;

use driver_diagram::diagram::{
	Appearance, ColumnTitles, Diagram, ImportWarning, Level, NewNode, Palette, PaletteSource,
};

type NodeRow = (String, Level, String, String, String);

fn node_set(d: &Diagram) -> BTreeSet<NodeRow> {
	d.nodes()
		.iter()
		.map(|n| {
			(
				n.id.clone(),
				n.level,
				n.text.clone(),
				n.color.clone(),
				d.parent_of(&n.id).unwrap_or_default().to_string(),
			)
		})
		.collect()
}

fn edge_set(d: &Diagram) -> BTreeSet<(String, String)> {
	d.edges().iter().map(|e| (e.from.clone(), e.to.clone())).collect()
}

fn palette_set(d: &Diagram) -> BTreeSet<(String, String)> {
	d.palette
		.entries()
		.iter()
		.map(|e| (e.label.clone(), e.value.clone()))
		.collect()
}

fn rich_diagram() -> Diagram {
	let mut d = Diagram::new();
	d.palette = Palette::empty();
	d.add_colour("Urgent", "#D62728").unwrap();
	d.add_colour("", "#2ca02c").unwrap();
	d.appearance = Appearance {
		box_height: 96.5,
		vertical_gap: 0.0,
		font_size: 12.0,
		font_family: "Georgia, \"Times New Roman\", serif".to_string(),
		font_bold: true,
	};
	d.titles.set(Level::Primary, "Primary drivers");
	d.titles.set(Level::Change, "Ideas, to test");

	// Children created before one of their parents, so rows are not topological.
	d.create_node(NewNode::new(Level::Aim, "Cut A&E waits to 4h").id("10")).unwrap();
	d.create_node(NewNode::new(Level::Secondary, "Bed \"flow\"").id("s1").parent("p1")).unwrap();
	d.create_node(NewNode::new(Level::Primary, "Flow").id("p1").parent("10").color("#d62728"))
		.unwrap();
	d.create_node(NewNode::new(Level::Primary, "Staffing;\nrota").parent("10").color("#2CA02C"))
		.unwrap();
	d.create_node(NewNode::new(Level::Change, "Discharge lounge").parent("s1")).unwrap();
	d.add_edge("11", "s1").unwrap();
	d.add_edge("p1", "12").unwrap();
	d.add_edge("11", "12").unwrap();
	d.create_node(NewNode::new(Level::Change, "Loose idea")).unwrap();
	d
}

#[test]
fn decode_of_encode_preserves_everything() {
	let original = rich_diagram();
	let csv = original.to_csv().unwrap();

	let mut imported = Diagram::new();
	let report = imported.import_csv(&csv).unwrap();

	assert!(report.warnings.is_empty(), "{:?}", report.warnings);
	assert_eq!(report.imported, original.nodes().len());
	assert_eq!(report.palette_source, PaletteSource::Embedded);
	assert_eq!(node_set(&imported), node_set(&original));
	assert_eq!(edge_set(&imported), edge_set(&original));
	assert_eq!(palette_set(&imported), palette_set(&original));
	assert_eq!(imported.appearance, original.appearance);
	assert_eq!(imported.titles, original.titles);
}

#[test]
fn round_trip_ignores_row_order() {
	let original = rich_diagram();
	let csv = original.to_csv().unwrap();
	let mut lines: Vec<&str> = csv.lines().collect();
	// Node texts with embedded newlines span two physical lines; keep those
	// records intact by reversing whole records rather than lines.
	let header = lines.remove(0);
	let mut records: Vec<String> = Vec::new();
	for line in lines {
		match records.last_mut() {
			Some(last) if last.matches('"').count() % 2 == 1 => {
				last.push('\n');
				last.push_str(line);
			}
			_ => records.push(line.to_string()),
		}
	}
	records.reverse();
	let shuffled = format!("{header}\n{}\n", records.join("\n"));

	let mut imported = Diagram::new();
	let report = imported.import_csv(&shuffled).unwrap();
	assert_eq!(report.imported, original.nodes().len());
	assert_eq!(node_set(&imported), node_set(&original));
	assert_eq!(edge_set(&imported), edge_set(&original));
	assert_eq!(palette_set(&imported), palette_set(&original));
}

#[test]
fn import_recomputes_next_id() {
	let mut d = Diagram::new();
	d.import_csv(&rich_diagram().to_csv().unwrap()).unwrap();
	let node = d.create_node(NewNode::new(Level::Change, "After import")).unwrap();
	assert_eq!(node.id, "14");
}

#[test]
fn dangling_extra_parent_only_drops_that_edge() {
	let csv = "id,level,parent_id,text,color,extra_parents\n\
		1,aim,,Aim,,\n\
		2,primary,1,Driver,,nobody;1\n\
		3,secondary,2,Sub,,\n";
	let mut d = Diagram::new();
	let report = d.import_csv(csv).unwrap();

	assert_eq!(report.imported, 3);
	assert_eq!(report.dropped_edges(), 1);
	assert_eq!(
		report.warnings,
		vec![ImportWarning::UnknownEndpoint {
			from: "nobody".into(),
			to: "2".into()
		}]
	);
	assert_eq!(
		edge_set(&d),
		BTreeSet::from([("1".into(), "2".into()), ("2".into(), "3".into())])
	);
}

#[test]
fn failed_import_keeps_current_diagram() {
	let mut d = rich_diagram();
	let before = d.clone();
	assert!(d.import_csv("name,kind\nx,y\n").is_err());
	assert_eq!(d, before);
}

#[test]
fn older_files_keep_current_settings() {
	let mut d = Diagram::new();
	d.appearance.font_size = 18.0;
	d.titles.set(Level::Aim, "Goal");
	d.import_csv("id,level,parent_id,text\n1,aim,,A\n2,primary,1,B\n").unwrap();

	assert_eq!(d.appearance.font_size, 18.0);
	assert_eq!(d.titles, {
		let mut t = ColumnTitles::default();
		t.set(Level::Aim, "Goal");
		t
	});
	assert_eq!(d.parent_of("2"), Some("1"));
}
