//! The colour palette offered for nodes.

use serde::{Deserialize, Serialize};

use super::error::{DiagramError, Result};

/// A named colour nodes can be tinted with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
	/// Display name.
	pub label: String,
	/// Hex colour, the entry's key.
	pub value: String,
}

// `label` may be missing in hand-edited files.
#[derive(Deserialize)]
struct RawEntry {
	#[serde(default)]
	label: String,
	value: String,
}

const DEFAULT_COLOURS: &[(&str, &str)] = &[
	("Blue", "#1f77b4"),
	("Orange", "#ff7f0e"),
	("Green", "#2ca02c"),
	("Red", "#d62728"),
	("Purple", "#9467bd"),
];

/// Ordered list of colours, keyed case-insensitively by value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
	entries: Vec<PaletteEntry>,
}

impl Default for Palette {
	fn default() -> Self {
		Self {
			entries: DEFAULT_COLOURS
				.iter()
				.map(|(label, value)| PaletteEntry {
					label: label.to_string(),
					value: value.to_string(),
				})
				.collect(),
		}
	}
}

fn default_label(n: usize) -> String {
	format!("Colour {n}")
}

impl Palette {
	/// A palette with no colours.
	pub fn empty() -> Self {
		Self { entries: Vec::new() }
	}

	/// Entries in display order.
	pub fn entries(&self) -> &[PaletteEntry] {
		&self.entries
	}

	/// Whether there are no colours.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	fn position(&self, value: &str) -> Option<usize> {
		let value = value.trim();
		self.entries
			.iter()
			.position(|e| e.value.eq_ignore_ascii_case(value))
	}

	/// Append a colour. A blank label becomes `Colour N`.
	pub fn add(&mut self, label: &str, value: &str) -> Result<&PaletteEntry> {
		let value = value.trim();
		if self.position(value).is_some() {
			return Err(DiagramError::DuplicateColour(value.to_string()));
		}
		let label = match label.trim() {
			"" => default_label(self.entries.len() + 1),
			l => l.to_string(),
		};
		self.entries.push(PaletteEntry {
			label,
			value: value.to_string(),
		});
		Ok(&self.entries[self.entries.len() - 1])
	}

	/// Relabel and/or change the value of the entry keyed by `old_value`.
	pub fn edit(&mut self, old_value: &str, label: &str, new_value: &str) -> Result<()> {
		let idx = self
			.position(old_value)
			.ok_or_else(|| DiagramError::ColourNotFound(old_value.trim().to_string()))?;
		let new_value = new_value.trim();
		if let Some(other) = self.position(new_value) {
			if other != idx {
				return Err(DiagramError::DuplicateColour(new_value.to_string()));
			}
		}
		let label = match label.trim() {
			"" => self.entries[idx].label.clone(),
			l => l.to_string(),
		};
		self.entries[idx] = PaletteEntry {
			label,
			value: new_value.to_string(),
		};
		Ok(())
	}

	/// Drop the entry keyed by `value`, case-insensitively.
	pub fn remove(&mut self, value: &str) -> Option<PaletteEntry> {
		self.position(value).map(|i| self.entries.remove(i))
	}

	/// A palette made of the distinct colours in `used`, in encounter order.
	pub fn from_used<'a>(used: impl IntoIterator<Item = &'a str>) -> Self {
		let mut palette = Self::empty();
		for value in used {
			if !value.trim().is_empty() {
				let _ = palette.add("", value);
			}
		}
		palette
	}

	/// The entries as a JSON array of `{label, value}` objects.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(&self.entries)?)
	}

	/// Parse a JSON array of `{label, value}` objects. Blank values are dropped,
	/// repeated values keep their first occurrence.
	pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
		let raw: Vec<RawEntry> = serde_json::from_str(json)?;
		let mut palette = Self::empty();
		for entry in raw {
			if !entry.value.trim().is_empty() {
				let _ = palette.add(&entry.label, &entry.value);
			}
		}
		Ok(palette)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_defaults_label_and_rejects_case_insensitive_duplicates() {
		let mut palette = Palette::empty();
		palette.add("", "#AABBCC").unwrap();
		assert_eq!(palette.entries()[0].label, "Colour 1");
		assert!(matches!(
			palette.add("Again", "#aabbcc"),
			Err(DiagramError::DuplicateColour(_))
		));
		assert_eq!(palette.entries().len(), 1);
		assert!(palette.remove("#aAbBcC").is_some());
		assert!(palette.is_empty());
	}

	#[test]
	fn edit_keeps_label_when_blank_and_checks_collisions() {
		let mut palette = Palette::empty();
		palette.add("Teal", "#008080").unwrap();
		palette.add("Navy", "#000080").unwrap();

		palette.edit("#008080", "", "#00a0a0").unwrap();
		assert_eq!(palette.entries()[0].label, "Teal");
		assert_eq!(palette.entries()[0].value, "#00a0a0");

		assert!(matches!(
			palette.edit("#00a0a0", "x", "#000080"),
			Err(DiagramError::DuplicateColour(_))
		));
		assert!(matches!(
			palette.edit("#123456", "x", "#654321"),
			Err(DiagramError::ColourNotFound(_))
		));
		palette.edit("#000080", "Dark", "#000080").unwrap();
		assert_eq!(palette.entries()[1].label, "Dark");
	}

	#[test]
	fn from_used_dedupes_in_encounter_order() {
		let palette = Palette::from_used(["#111111", "", "#222222", "#111111"]);
		let labels: Vec<_> = palette.entries().iter().map(|e| e.label.as_str()).collect();
		assert_eq!(labels, vec!["Colour 1", "Colour 2"]);
		assert_eq!(palette.entries()[1].value, "#222222");
	}

	#[test]
	fn json_accepts_missing_labels_and_rejects_non_arrays() {
		let palette = Palette::from_json(r##"[{"value":"#101010"},{"label":"Sky","value":"#87ceeb"}]"##).unwrap();
		assert_eq!(palette.entries()[0].label, "Colour 1");
		assert_eq!(palette.entries()[1].label, "Sky");

		assert!(Palette::from_json(r##"{"label":"x","value":"#000"}"##).is_err());
		assert!(Palette::from_json("not json").is_err());
	}

	#[test]
	fn json_round_trips() {
		let palette = Palette::default();
		let back = Palette::from_json(&palette.to_json().unwrap()).unwrap();
		assert_eq!(back, palette);
	}
}
