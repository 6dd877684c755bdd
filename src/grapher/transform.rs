//! Data space to display space mapping.
//!
//! A [`Transform`] maps data coordinates to CSS pixels. Device pixels are a
//! separate concern handled by [`Viewport`], which backends own.

/// A point in either data or display space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Build a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Per-axis scale factor. A bare `f64` converts to a uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
	/// Horizontal factor.
	pub x: f64,
	/// Vertical factor.
	pub y: f64,
}

impl Scale {
	/// Same factor on both axes.
	pub const fn uniform(factor: f64) -> Self {
		Self {
			x: factor,
			y: factor,
		}
	}

	/// Whether both axes share a factor.
	pub fn is_uniform(&self) -> bool {
		self.x == self.y
	}

	/// Factor applied to lengths such as radii and line widths.
	///
	/// Equals `|s|` for a uniform scale.
	pub fn length_factor(&self) -> f64 {
		(self.x.abs() * self.y.abs()).sqrt()
	}
}

impl Default for Scale {
	fn default() -> Self {
		Self::uniform(1.0)
	}
}

impl From<f64> for Scale {
	fn from(factor: f64) -> Self {
		Self::uniform(factor)
	}
}

impl From<[f64; 2]> for Scale {
	fn from([x, y]: [f64; 2]) -> Self {
		Self { x, y }
	}
}

/// Scale followed by translate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
	/// Scale, must be non-zero on both axes for the inverse to exist.
	pub scale: Scale,
	/// Translation in display units.
	pub translate: [f64; 2],
}

impl Transform {
	/// Map a data x coordinate to display space.
	pub fn transform_x(&self, x: f64) -> f64 {
		x * self.scale.x + self.translate[0]
	}

	/// Map a data y coordinate to display space.
	pub fn transform_y(&self, y: f64) -> f64 {
		y * self.scale.y + self.translate[1]
	}

	/// Inverse of [`Self::transform_x`]. Zero scale yields a non-finite result.
	pub fn untransform_x(&self, x: f64) -> f64 {
		(x - self.translate[0]) / self.scale.x
	}

	/// Inverse of [`Self::transform_y`]. Zero scale yields a non-finite result.
	pub fn untransform_y(&self, y: f64) -> f64 {
		(y - self.translate[1]) / self.scale.y
	}

	/// Map a data point to display space.
	pub fn apply(&self, point: Point) -> Point {
		Point::new(self.transform_x(point.x), self.transform_y(point.y))
	}

	/// Map a display point back to data space.
	pub fn invert(&self, point: Point) -> Point {
		Point::new(self.untransform_x(point.x), self.untransform_y(point.y))
	}
}

/// Transform plus device pixel ratio, as seen by a backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Data to CSS pixel transform.
	pub transform: Transform,
	/// Device pixels per CSS pixel.
	pub resolution: f64,
}

impl Viewport {
	/// Build a viewport.
	pub const fn new(transform: Transform, resolution: f64) -> Self {
		Self {
			transform,
			resolution,
		}
	}

	/// Data x to device pixels.
	pub fn device_x(&self, x: f64) -> f64 {
		self.transform.transform_x(x) * self.resolution
	}

	/// Data y to device pixels.
	pub fn device_y(&self, y: f64) -> f64 {
		self.transform.transform_y(y) * self.resolution
	}

	/// A data-space length in device pixels.
	pub fn device_length(&self, length: f64) -> f64 {
		length * self.transform.scale.length_factor() * self.resolution
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(Transform::default(), 1.0)
	}
}
