use leptos::prelude::*;
use log::warn;

use super::layout::{self, BoxRect, COLUMN_WIDTH, PADDING};
use super::{confirm, mutate, prompt};
use crate::diagram::{Diagram, Level, Node};

const NO_COLOUR: &str = "#9aa5b1";

/// Everything a single box needs, snapshotted from the diagram.
#[derive(Clone, Debug)]
struct NodeCard {
	rect: BoxRect,
	node: Node,
	parent: String,
	extras: Vec<String>,
}

fn cards(diagram: &Diagram, boxes: &[BoxRect]) -> Vec<NodeCard> {
	boxes
		.iter()
		.filter_map(|rect| {
			let node = diagram.node(&rect.id)?.clone();
			Some(NodeCard {
				parent: diagram.describe_parent(&node.id),
				extras: diagram
					.extra_parents(&node.id)
					.into_iter()
					.map(str::to_string)
					.collect(),
				rect: rect.clone(),
				node,
			})
		})
		.collect()
}

fn delete_with_confirmation(diagram: RwSignal<Diagram>, status: RwSignal<String>, id: &str) {
	let plan = match diagram.with_untracked(|d| d.cascade_preview(id)) {
		Ok(plan) => plan,
		Err(e) => {
			warn!("{e}");
			status.set(e.to_string());
			return;
		}
	};
	let message = if plan.dependents.is_empty() {
		format!("Delete node {id}?")
	} else {
		format!(
			"Delete node {id} and {} dependent node(s) ({})?",
			plan.dependents.len(),
			plan.dependents.join(", ")
		)
	};
	if !confirm(&message) {
		return;
	}
	match mutate(diagram, |d| d.delete_node_cascade(id)) {
		Ok(done) => status.set(format!("Deleted {} node(s)", done.removed_ids.len())),
		Err(e) => status.set(e.to_string()),
	}
}

/// The four columns with their boxes and connectors.
#[component]
pub fn DiagramBoard(diagram: RwSignal<Diagram>, status: RwSignal<String>) -> impl IntoView {
	let board = Memo::new(move |_| diagram.with(layout::layout));

	let font_style = move || {
		diagram.with(|d| {
			let a = &d.appearance;
			format!(
				"font-family: {}; font-size: {}px; font-weight: {};",
				a.font_family,
				a.font_size,
				if a.font_bold { "bold" } else { "normal" }
			)
		})
	};

	let headers = Level::ALL
		.into_iter()
		.map(|level| {
			let style = format!(
				"left: {}px; top: {}px; width: {}px;",
				layout::column_x(level),
				PADDING,
				COLUMN_WIDTH
			);
			view! {
				<div class="column-title" style=style>
					{move || diagram.with(|d| d.titles.title_for(level).to_string())}
				</div>
			}
		})
		.collect_view();

	let connectors = move || {
		board
			.get()
			.connectors
			.into_iter()
			.map(|c| {
				let class = if c.primary { "connector primary" } else { "connector extra" };
				view! { <path d=c.path class=class fill="none" /> }
			})
			.collect_view()
	};

	let boxes = move || {
		let board = board.get();
		diagram
			.with(|d| cards(d, &board.boxes))
			.into_iter()
			.map(|card| view! { <NodeBox diagram=diagram status=status card=card /> })
			.collect_view()
	};

	view! {
		<div
			class="diagram-board"
			style=move || {
				board.with(|b| format!("width: {}px; height: {}px; {}", b.width, b.height, font_style()))
			}
		>
			<svg
				class="connectors"
				width=move || board.with(|b| b.width.to_string())
				height=move || board.with(|b| b.height.to_string())
			>
				{connectors}
			</svg>
			{headers}
			{boxes}
		</div>
	}
}

#[component]
fn NodeBox(diagram: RwSignal<Diagram>, status: RwSignal<String>, card: NodeCard) -> impl IntoView {
	let NodeCard {
		rect,
		node,
		parent,
		extras,
	} = card;
	let colour = if node.color.is_empty() { NO_COLOUR.to_string() } else { node.color.clone() };
	let style = format!(
		"left: {}px; top: {}px; width: {}px; height: {}px; border-left-color: {colour};",
		rect.x, rect.y, rect.width, rect.height
	);
	let title = format!("[{}] parent: {parent}", node.id);
	let class = if node.level == Level::Aim { "node-box aim" } else { "node-box" };

	let id_edit = node.id.clone();
	let text_edit = node.text.clone();
	let on_edit = move |_| {
		let Some(text) = prompt("Edit text", &text_edit) else {
			return;
		};
		if let Err(e) = mutate(diagram, |d| d.update_node_text(&id_edit, &text)) {
			status.set(e.to_string());
		}
	};

	let id_colour = node.id.clone();
	let current = node.color.clone();
	let on_colour = move |ev: leptos::ev::Event| {
		let value = event_target_value(&ev);
		if let Err(e) = mutate(diagram, |d| d.set_node_color(&id_colour, &value)) {
			status.set(e.to_string());
		}
	};
	let colour_options = diagram
		.with_untracked(|d| d.palette.entries().to_vec())
		.into_iter()
		.map(|entry| {
			let selected = entry.value.eq_ignore_ascii_case(&current);
			view! {
				<option value=entry.value selected=selected>
					{entry.label}
				</option>
			}
		})
		.collect_view();

	let id_delete = node.id.clone();
	let on_delete = move |_| delete_with_confirmation(diagram, status, &id_delete);

	let chips = extras
		.into_iter()
		.map(|from| {
			let (child, label) = (node.id.clone(), format!("× {from}"));
			let on_click = move |_| {
				let mut next = diagram.get_untracked();
				if next.remove_edge(&from, &child) {
					diagram.set(next);
					status.set(format!("Disconnected {from} -> {child}"));
				}
			};
			view! {
				<button class="chip" title="Remove this connection" on:click=on_click>
					{label}
				</button>
			}
		})
		.collect_view();

	view! {
		<div class=class style=style title=title>
			<span class="node-text" on:dblclick=on_edit>
				{node.text.clone()}
			</span>
			<div class="node-actions">
				{chips}
				<select class="node-colour" title="Colour" on:change=on_colour>
					<option value="" selected=node.color.is_empty()>
						"No colour"
					</option>
					{colour_options}
				</select>
				<button class="danger" on:click=on_delete>
					"Delete"
				</button>
			</div>
		</div>
	}
}
