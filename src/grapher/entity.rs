//! Render-side records, one per node and link.

use super::color::PackedColor;

/// Last computed attributes of a node, in data space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
	/// Center x.
	pub x: f64,
	/// Center y.
	pub y: f64,
	/// Radius.
	pub r: f64,
	/// Fill color.
	pub color: PackedColor,
}

impl Default for Node {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			r: 10.0,
			color: 0,
		}
	}
}

impl Node {
	/// Overwrite every attribute.
	pub fn update(&mut self, x: f64, y: f64, r: f64, color: PackedColor) -> &mut Self {
		*self = Self { x, y, r, color };
		self
	}

	/// Whether a data-space point falls inside this node's bounding box.
	pub fn bounds_contain(&self, x: f64, y: f64) -> bool {
		let r = self.r.abs();
		(self.x - r..=self.x + r).contains(&x) && (self.y - r..=self.y + r).contains(&y)
	}
}

/// Last computed attributes of a link. Endpoints are copies, not references.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Link {
	/// Source x.
	pub x1: f64,
	/// Source y.
	pub y1: f64,
	/// Target x.
	pub x2: f64,
	/// Target y.
	pub y2: f64,
	/// Stroke color.
	pub color: PackedColor,
}

impl Link {
	/// Overwrite every attribute.
	pub fn update(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: PackedColor) -> &mut Self {
		*self = Self {
			x1,
			y1,
			x2,
			y2,
			color,
		};
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_defaults_match_fresh_entities() {
		let node = Node::default();
		assert_eq!((node.x, node.y, node.r, node.color), (0.0, 0.0, 10.0, 0));
	}

	#[test]
	fn bounding_box_is_inclusive() {
		let mut node = Node::default();
		node.update(5.0, 5.0, 2.0, 0xff00_0000);
		assert!(node.bounds_contain(7.0, 3.0));
		assert!(node.bounds_contain(5.0, 5.0));
		assert!(!node.bounds_contain(7.1, 5.0));
		assert!(!node.bounds_contain(5.0, 2.9));
	}
}
