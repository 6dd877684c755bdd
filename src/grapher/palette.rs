//! Named swatches owned by a single grapher.

use std::collections::HashMap;

use log::warn;

use super::color::{self, ColorValue, PackedColor};

/// Maps application color keys to packed colors.
///
/// Built from a swatch list, swatch `i` is stored under `"i"` and the 50%
/// blend of swatches `j < i` under `"j-i"`, so link colors between two
/// swatch-colored nodes are a lookup rather than a blend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
	colors: HashMap<String, PackedColor>,
}

impl Palette {
	/// Empty palette.
	pub fn new() -> Self {
		Self::default()
	}

	/// Index swatches and precompute every in-between link color.
	///
	/// Swatches that fail to parse are skipped but keep their index.
	pub fn from_swatches<I, C>(swatches: I) -> Self
	where
		I: IntoIterator<Item = C>,
		C: Into<ColorValue>,
	{
		let parsed: Vec<(usize, PackedColor)> = swatches
			.into_iter()
			.enumerate()
			.filter_map(|(i, swatch)| {
				let swatch = swatch.into();
				let parsed = color::parse(&swatch);
				if parsed.is_none() {
					warn!("palette swatch {i} ({swatch:?}) is not a color, skipping");
				}
				parsed.map(|c| (i, c))
			})
			.collect();

		let mut palette = Self::new();
		for (n, &(i, swatch)) in parsed.iter().enumerate() {
			palette.insert(i.to_string(), swatch);
			for &(j, earlier) in &parsed[..n] {
				palette.insert(format!("{j}-{i}"), color::midpoint(earlier, swatch));
			}
		}
		palette
	}

	/// Store a color under `key`.
	pub fn insert(&mut self, key: impl Into<String>, color: PackedColor) -> &mut Self {
		self.colors.insert(key.into(), color);
		self
	}

	/// Color stored under `key`.
	pub fn get(&self, key: &str) -> Option<PackedColor> {
		self.colors.get(key).copied()
	}

	/// Precomputed link color between two swatch keys, in either order.
	pub fn pair(&self, a: &str, b: &str) -> Option<PackedColor> {
		if a == b {
			return self.get(a);
		}
		self.get(&format!("{a}-{b}"))
			.or_else(|| self.get(&format!("{b}-{a}")))
	}

	/// Number of stored keys, pair keys included.
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	/// Whether nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn swatches_are_indexed_with_pairs() {
		let palette = Palette::from_swatches(["#ff0000", "#0000ff", "#00ff00"]);
		assert_eq!(palette.len(), 6);
		assert_eq!(palette.get("0"), Some(0xffff_0000));
		assert_eq!(palette.get("2"), Some(0xff00_ff00));
		assert_eq!(palette.get("0-1"), Some(0xff7f_007f));
		assert_eq!(palette.pair("1", "0"), palette.get("0-1"));
		assert_eq!(palette.pair("2", "2"), palette.get("2"));
		assert_eq!(palette.pair("0", "9"), None);
	}

	#[test]
	fn bad_swatches_keep_their_index() {
		let palette = Palette::from_swatches(vec![
			ColorValue::from("nope"),
			ColorValue::from(0xff12_3456),
		]);
		assert_eq!(palette.get("0"), None);
		assert_eq!(palette.get("1"), Some(0xff12_3456));
		assert_eq!(palette.len(), 1);
	}
}
