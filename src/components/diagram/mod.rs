mod board;
mod editor;
mod files;
pub mod layout;
mod settings;

use leptos::prelude::*;

use crate::diagram::{self, Diagram};

pub use board::DiagramBoard;
pub use editor::{ConnectForm, NodeForm, Toolbar};
pub use settings::SettingsPanel;

/// Run `f` on a copy of the diagram and publish it only if `f` succeeds,
/// so a failed mutation never shows up half-applied.
pub(crate) fn mutate<T>(
	diagram: RwSignal<Diagram>,
	f: impl FnOnce(&mut Diagram) -> diagram::Result<T>,
) -> diagram::Result<T> {
	let mut next = diagram.get_untracked();
	let out = f(&mut next)?;
	diagram.set(next);
	Ok(out)
}

fn confirm(message: &str) -> bool {
	web_sys::window()
		.and_then(|w| w.confirm_with_message(message).ok())
		.unwrap_or(false)
}

fn prompt(message: &str, default: &str) -> Option<String> {
	web_sys::window()
		.and_then(|w| w.prompt_with_message_and_default(message, default).ok())
		.flatten()
}
