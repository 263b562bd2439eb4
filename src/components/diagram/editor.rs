use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use log::{info, warn};
use web_sys::HtmlInputElement;

use super::{confirm, files, mutate};
use crate::diagram::{
	CSV_FILENAME, Diagram, DiagramError, Level, NewNode, Node, parent_option_label,
};

// A picked node stays picked while the same node sits under its id. A clear
// or import can reuse the id for a different node, so level and text count too.
fn keeps_selection(before: Option<&Node>, now: Option<&Node>, id: &str) -> bool {
	if id.is_empty() {
		return true;
	}
	match (before, now) {
		(_, None) => false,
		(Some(b), Some(n)) if b.id == n.id => b.level == n.level && b.text == n.text,
		_ => true,
	}
}

/// Reset `selected` to "" once the node it names is gone or replaced.
fn drop_stale_selection(diagram: RwSignal<Diagram>, selected: RwSignal<String>) {
	Effect::new(move |seen: Option<Option<Node>>| {
		let id = selected.get();
		let now = diagram.with(|d| d.node(&id).cloned());
		if keeps_selection(seen.flatten().as_ref(), now.as_ref(), &id) {
			now
		} else {
			selected.set(String::new());
			None
		}
	});
}

fn node_options(diagram: RwSignal<Diagram>, selected: RwSignal<String>) -> impl IntoView {
	move || {
		diagram
			.with(|d| {
				d.nodes()
					.iter()
					.map(|n| (n.id.clone(), parent_option_label(n)))
					.collect::<Vec<_>>()
			})
			.into_iter()
			.map(|(id, label)| {
				let is_selected = id.clone();
				view! {
					<option value=id selected=move || selected.get() == is_selected>
						{label}
					</option>
				}
			})
			.collect_view()
	}
}

/// Form for adding a node under an optional parent.
#[component]
pub fn NodeForm(diagram: RwSignal<Diagram>, status: RwSignal<String>) -> impl IntoView {
	let level = RwSignal::new(Level::Primary);
	let text = RwSignal::new(String::new());
	let parent = RwSignal::new(String::new());
	let colour = RwSignal::new(String::new());
	drop_stale_selection(diagram, parent);

	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let req = NewNode::new(level.get_untracked(), text.get_untracked())
			.parent(parent.get_untracked())
			.color(colour.get_untracked());
		match mutate(diagram, |d| d.create_node(req)) {
			Ok(node) => {
				status.set(format!("Added [{}] {}", node.id, node.level));
				text.set(String::new());
			}
			Err(e) => status.set(e.to_string()),
		}
	};

	let level_options = Level::ALL
		.into_iter()
		.map(|l| {
			view! {
				<option value=l.key() selected=move || level.get() == l>
					{l.label()}
				</option>
			}
		})
		.collect_view();

	let colour_options = move || {
		diagram
			.with(|d| d.palette.entries().to_vec())
			.into_iter()
			.map(|entry| view! { <option value=entry.value>{entry.label}</option> })
			.collect_view()
	};

	view! {
		<form class="node-form" on:submit=on_submit>
			<select on:change=move |ev| {
				if let Ok(l) = event_target_value(&ev).parse::<Level>() {
					level.set(l);
				}
			}>{level_options}</select>
			<input
				type="text"
				placeholder="Text"
				prop:value=move || text.get()
				on:input=move |ev| text.set(event_target_value(&ev))
			/>
			<select on:change=move |ev| parent.set(event_target_value(&ev))>
				<option value="">"— None / top level —"</option>
				{node_options(diagram, parent)}
			</select>
			<select on:change=move |ev| colour.set(event_target_value(&ev))>
				<option value="">"No colour"</option>
				{colour_options}
			</select>
			<button type="submit">"Add"</button>
		</form>
	}
}

/// Adds an extra parent -> child connection.
#[component]
pub fn ConnectForm(diagram: RwSignal<Diagram>, status: RwSignal<String>) -> impl IntoView {
	let from = RwSignal::new(String::new());
	let to = RwSignal::new(String::new());
	drop_stale_selection(diagram, from);
	drop_stale_selection(diagram, to);

	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let (f, t) = (from.get_untracked(), to.get_untracked());
		match mutate(diagram, |d| d.add_edge(&f, &t)) {
			Ok(()) => status.set(format!("Connected {f} -> {t}")),
			Err(e @ DiagramError::DuplicateEdge { .. }) => {
				info!("{e}");
				status.set(e.to_string());
			}
			Err(e) => {
				warn!("{e}");
				status.set(e.to_string());
			}
		}
	};

	view! {
		<form class="connect-form" on:submit=on_submit>
			<select on:change=move |ev| from.set(event_target_value(&ev))>
				<option value="">"Parent…"</option>
				{node_options(diagram, from)}
			</select>
			<select on:change=move |ev| to.set(event_target_value(&ev))>
				<option value="">"Child…"</option>
				{node_options(diagram, to)}
			</select>
			<button type="submit">"Connect"</button>
		</form>
	}
}

/// Clear, CSV export and CSV import, plus the status line.
#[component]
pub fn Toolbar(diagram: RwSignal<Diagram>, status: RwSignal<String>) -> impl IntoView {
	// Guards against a second import racing the first.
	let importing = RwSignal::new(false);

	let on_clear = move |_| {
		if confirm("Clear the whole diagram? This cannot be undone.") {
			diagram.update(Diagram::clear_all);
			status.set("Diagram cleared".to_string());
		}
	};

	let on_export = move |_| {
		let result = diagram
			.with_untracked(Diagram::to_csv)
			.map_err(|e| e.to_string())
			.and_then(|csv| {
				files::download_text(CSV_FILENAME, &csv, "text/csv;charset=utf-8")
					.map_err(|e| format!("{e:?}"))
			});
		match result {
			Ok(()) => status.set(format!("Exported {CSV_FILENAME}")),
			Err(e) => {
				warn!("export failed: {e}");
				status.set(format!("Export failed: {e}"));
			}
		}
	};

	let on_import = move |ev: leptos::ev::Event| {
		if importing.get_untracked() {
			return;
		}
		let input: HtmlInputElement = event_target(&ev);
		let Some(file) = input.files().and_then(|files| files.get(0)) else {
			return;
		};
		input.set_value("");
		importing.set(true);

		let started = files::read_text(&file, move |result| {
			importing.set(false);
			let outcome = result.and_then(|text| {
				mutate(diagram, |d| d.import_csv(&text)).map_err(|e| e.to_string())
			});
			match outcome {
				Ok(report) => status.set(report.summary()),
				Err(e) => {
					warn!("import failed: {e}");
					status.set(format!("Import failed: {e}"));
				}
			}
		});
		if let Err(e) = started {
			importing.set(false);
			status.set(format!("Import failed: {e:?}"));
		}
	};

	view! {
		<div class="toolbar">
			<button class="danger" on:click=on_clear>
				"Clear all"
			</button>
			<button on:click=on_export>"Export CSV"</button>
			<label class="import">
				"Import CSV "
				<input
					type="file"
					accept=".csv,text/csv"
					disabled=move || importing.get()
					on:change=on_import
				/>
			</label>
			<span class="status">{move || status.get()}</span>
		</div>
	}
}
