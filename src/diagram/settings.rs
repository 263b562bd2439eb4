//! Appearance and column titles.

use serde::{Deserialize, Serialize};

use super::types::Level;

/// Box and font settings shared by every node on the board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
	/// Box height in px, > 0.
	pub box_height: f64,
	/// Gap between stacked boxes in px, >= 0.
	pub vertical_gap: f64,
	/// Font size in px, > 0.
	pub font_size: f64,
	/// CSS font-family.
	pub font_family: String,
	/// Bold node text.
	pub font_bold: bool,
}

impl Default for Appearance {
	fn default() -> Self {
		Self {
			box_height: 80.0,
			vertical_gap: 24.0,
			font_size: 14.0,
			font_family: "system-ui, sans-serif".to_string(),
			font_bold: false,
		}
	}
}

impl Appearance {
	/// Accepts finite heights above zero.
	pub fn valid_box_height(v: f64) -> bool {
		v.is_finite() && v > 0.0
	}

	/// Accepts finite, non-negative gaps.
	pub fn valid_vertical_gap(v: f64) -> bool {
		v.is_finite() && v >= 0.0
	}

	/// Accepts finite sizes above zero.
	pub fn valid_font_size(v: f64) -> bool {
		v.is_finite() && v > 0.0
	}
}

/// Per-level column heading overrides. Empty means the level's own label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTitles {
	/// Aim column.
	pub aim: String,
	/// Primary driver column.
	pub primary: String,
	/// Secondary driver column.
	pub secondary: String,
	/// Change idea column.
	pub change: String,
}

impl ColumnTitles {
	/// The raw override for `level`.
	pub fn get(&self, level: Level) -> &str {
		match level {
			Level::Aim => &self.aim,
			Level::Primary => &self.primary,
			Level::Secondary => &self.secondary,
			Level::Change => &self.change,
		}
	}

	/// Store a trimmed override; empty restores the default.
	pub fn set(&mut self, level: Level, title: &str) {
		let slot = match level {
			Level::Aim => &mut self.aim,
			Level::Primary => &mut self.primary,
			Level::Secondary => &mut self.secondary,
			Level::Change => &mut self.change,
		};
		*slot = title.trim().to_string();
	}

	/// Heading to show above the column.
	pub fn title_for(&self, level: Level) -> &str {
		match self.get(level) {
			"" => level.label(),
			custom => custom,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn titles_fall_back_to_level_labels() {
		let mut titles = ColumnTitles::default();
		assert_eq!(titles.title_for(Level::Change), "Change idea");
		titles.set(Level::Change, "  Ideas to test ");
		assert_eq!(titles.title_for(Level::Change), "Ideas to test");
		assert_eq!(titles.title_for(Level::Aim), "Aim");
	}

	#[test]
	fn appearance_bounds() {
		assert!(Appearance::valid_box_height(1.0));
		assert!(!Appearance::valid_box_height(0.0));
		assert!(Appearance::valid_vertical_gap(0.0));
		assert!(!Appearance::valid_vertical_gap(-1.0));
		assert!(!Appearance::valid_font_size(f64::NAN));
		assert!(!Appearance::valid_font_size(f64::INFINITY));
	}
}
