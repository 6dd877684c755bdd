//! Construction options.

use super::color::{ColorValue, PackedColor};
use super::renderer::ShaderSources;
use super::transform::{Scale, Transform};

/// Default foreground color, used whenever a node color cannot be resolved.
pub const DEFAULT_COLOR: PackedColor = 0xff22_2222;

/// Default link width in CSS pixels at scale 1.
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

/// Every option a grapher understands. Build with struct update syntax:
///
/// ```
/// use network_grapher::grapher::GrapherConfig;
///
/// let config = GrapherConfig {
///     scale: 0.5.into(),
///     translate: [100.0, 200.0],
///     ..GrapherConfig::default()
/// };
/// assert_eq!(config.translate, [100.0, 200.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GrapherConfig {
	/// Initial scale.
	pub scale: Scale,
	/// Initial translation.
	pub translate: [f64; 2],
	/// Foreground color; unparseable values keep [`DEFAULT_COLOR`].
	pub color: Option<ColorValue>,
	/// Device pixel ratio. The web glue fills in `devicePixelRatio`.
	pub resolution: Option<f64>,
	/// Link width in CSS pixels at scale 1.
	pub line_width: f64,
	/// Clear color; transparent when unset.
	pub background: Option<ColorValue>,
	/// Skip WebGL and rasterize with the 2D context.
	pub force_canvas: bool,
	/// Replacement node shaders for the WebGL backend.
	pub node_shaders: Option<ShaderSources>,
	/// Replacement link shaders for the WebGL backend.
	pub link_shaders: Option<ShaderSources>,
	/// Initial CSS width; the canvas client width when unset.
	pub width: Option<f64>,
	/// Initial CSS height; the canvas client height when unset.
	pub height: Option<f64>,
}

impl Default for GrapherConfig {
	fn default() -> Self {
		Self {
			scale: Scale::default(),
			translate: [0.0, 0.0],
			color: None,
			resolution: None,
			line_width: DEFAULT_LINE_WIDTH,
			background: None,
			force_canvas: false,
			node_shaders: None,
			link_shaders: None,
			width: None,
			height: None,
		}
	}
}

impl GrapherConfig {
	/// The initial transform.
	pub fn transform(&self) -> Transform {
		Transform {
			scale: self.scale,
			translate: self.translate,
		}
	}

	/// Device pixel ratio, 1 when unset.
	pub fn resolution(&self) -> f64 {
		self.resolution.unwrap_or(1.0)
	}
}
