use leptos::prelude::*;

use crate::components::diagram::{ConnectForm, DiagramBoard, NodeForm, SettingsPanel, Toolbar};
use crate::diagram::Diagram;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	// The one authoritative diagram; everything below re-renders from it.
	let diagram = RwSignal::new(Diagram::with_default_aim());
	let status = RwSignal::new(String::new());

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="editor">
				<header class="editor-header">
					<h1>"Driver Diagram"</h1>
					<Toolbar diagram=diagram status=status />
				</header>
				<section class="editor-forms">
					<NodeForm diagram=diagram status=status />
					<ConnectForm diagram=diagram status=status />
					<SettingsPanel diagram=diagram status=status />
				</section>
				<DiagramBoard diagram=diagram status=status />
			</div>
		</ErrorBoundary>
	}
}
