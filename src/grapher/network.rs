//! Caller-supplied network data.

use serde::{Deserialize, Serialize};

use super::color::ColorValue;

/// Input description of one node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
	/// Center x in data space.
	pub x: f64,
	/// Center y in data space.
	pub y: f64,
	/// Radius in data space.
	pub r: f64,
	/// Fill color or palette key. Falls back to the foreground color.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<ColorValue>,
}

impl NodeData {
	/// Node without an explicit color.
	pub const fn new(x: f64, y: f64, r: f64) -> Self {
		Self { x, y, r, color: None }
	}

	/// Attach a color.
	pub fn with_color(mut self, color: impl Into<ColorValue>) -> Self {
		self.color = Some(color.into());
		self
	}
}

/// Input description of one link. `from` and `to` index [`Network::nodes`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
	/// Source node index.
	pub from: usize,
	/// Target node index.
	pub to: usize,
	/// Stroke color. Without one the endpoint colors are blended.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<ColorValue>,
}

impl LinkData {
	/// Link without an explicit color.
	pub const fn new(from: usize, to: usize) -> Self {
		Self {
			from,
			to,
			color: None,
		}
	}

	/// Attach a color.
	pub fn with_color(mut self, color: impl Into<ColorValue>) -> Self {
		self.color = Some(color.into());
		self
	}
}

/// A whole network.
///
/// Link indices are not validated; links pointing past the node list are
/// skipped when geometry is computed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
	/// Nodes, addressed by position.
	pub nodes: Vec<NodeData>,
	/// Links, addressed by position.
	pub links: Vec<LinkData>,
}
