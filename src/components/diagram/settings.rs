use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use super::mutate;
use crate::diagram::{Appearance, Diagram, Level};

fn number_input(
	diagram: RwSignal<Diagram>,
	label: &'static str,
	get: fn(&Appearance) -> f64,
	set: fn(&mut Appearance, f64),
	valid: fn(f64) -> bool,
) -> impl IntoView {
	view! {
		<label>
			{label}
			<input
				type="number"
				prop:value=move || diagram.with(|d| get(&d.appearance).to_string())
				on:change=move |ev| {
					if let Ok(v) = event_target_value(&ev).parse::<f64>() {
						if valid(v) {
							diagram.update(|d| set(&mut d.appearance, v));
						}
					}
				}
			/>
		</label>
	}
}

/// Appearance, column titles and palette.
#[component]
pub fn SettingsPanel(diagram: RwSignal<Diagram>, status: RwSignal<String>) -> impl IntoView {
	let new_label = RwSignal::new(String::new());
	let new_value = RwSignal::new("#000000".to_string());

	let on_add_colour = move |ev: SubmitEvent| {
		ev.prevent_default();
		let (label, value) = (new_label.get_untracked(), new_value.get_untracked());
		match mutate(diagram, |d| d.add_colour(&label, &value)) {
			Ok(()) => new_label.set(String::new()),
			Err(e) => status.set(e.to_string()),
		}
	};

	let titles = Level::ALL
		.into_iter()
		.map(|level| {
			view! {
				<label>
					{level.label()}
					<input
						type="text"
						placeholder=level.label()
						prop:value=move || diagram.with(|d| d.titles.get(level).to_string())
						on:change=move |ev| {
							let title = event_target_value(&ev);
							diagram.update(|d| d.titles.set(level, &title));
						}
					/>
				</label>
			}
		})
		.collect_view();

	let palette = move || {
		diagram
			.with(|d| d.palette.entries().to_vec())
			.into_iter()
			.map(|entry| {
				let value = entry.value.clone();
				let on_remove = move |_| {
					if let Err(e) = mutate(diagram, |d| d.remove_colour(&value)) {
						status.set(e.to_string());
					}
				};
				let value = entry.value.clone();
				let on_relabel = move |ev: leptos::ev::Event| {
					let label = event_target_value(&ev);
					if let Err(e) = mutate(diagram, |d| d.edit_colour(&value, &label, &value)) {
						status.set(e.to_string());
					}
				};
				let value = entry.value.clone();
				let on_recolour = move |ev: leptos::ev::Event| {
					let next = event_target_value(&ev);
					match mutate(diagram, |d| d.edit_colour(&value, "", &next)) {
						Ok(()) => status.set(format!("Colour {value} is now {next}")),
						Err(e) => status.set(e.to_string()),
					}
				};
				view! {
					<li>
						<input type="color" prop:value=entry.value.clone() on:change=on_recolour />
						<input type="text" prop:value=entry.label on:change=on_relabel />
						<button class="chip" title="Remove colour" on:click=on_remove>
							"×"
						</button>
					</li>
				}
			})
			.collect_view()
	};

	view! {
		<details class="settings-panel">
			<summary>"Appearance & palette"</summary>
			<fieldset>
				<legend>"Boxes"</legend>
				{number_input(
					diagram,
					"Box height",
					|a| a.box_height,
					|a, v| a.box_height = v,
					Appearance::valid_box_height,
				)}
				{number_input(
					diagram,
					"Vertical gap",
					|a| a.vertical_gap,
					|a, v| a.vertical_gap = v,
					Appearance::valid_vertical_gap,
				)}
				{number_input(
					diagram,
					"Font size",
					|a| a.font_size,
					|a, v| a.font_size = v,
					Appearance::valid_font_size,
				)}
				<label>
					"Font"
					<input
						type="text"
						prop:value=move || diagram.with(|d| d.appearance.font_family.clone())
						on:change=move |ev| {
							let family = event_target_value(&ev);
							if !family.trim().is_empty() {
								diagram.update(|d| d.appearance.font_family = family.trim().to_string());
							}
						}
					/>
				</label>
				<label>
					<input
						type="checkbox"
						prop:checked=move || diagram.with(|d| d.appearance.font_bold)
						on:change=move |ev| {
							let bold = event_target_checked(&ev);
							diagram.update(|d| d.appearance.font_bold = bold);
						}
					/>
					"Bold"
				</label>
			</fieldset>
			<fieldset>
				<legend>"Column titles"</legend>
				{titles}
			</fieldset>
			<fieldset>
				<legend>"Palette"</legend>
				<ul class="palette">{palette}</ul>
				<form on:submit=on_add_colour>
					<input
						type="text"
						placeholder="Label"
						prop:value=move || new_label.get()
						on:input=move |ev| new_label.set(event_target_value(&ev))
					/>
					<input
						type="color"
						prop:value=move || new_value.get()
						on:input=move |ev| new_value.set(event_target_value(&ev))
					/>
					<button type="submit">"Add colour"</button>
				</form>
			</fieldset>
		</details>
	}
}
