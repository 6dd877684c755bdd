//! Rasterization backends.
//!
//! Both backends redraw the full scene on every call. They never own entity
//! data: the grapher lends its node and link slices for the duration of one
//! [`RendererBackend::render`] call. Geometry is projected to device pixels by
//! the shared [`DeviceCircle`] and [`DeviceSegment`] helpers, so both
//! backends draw identical geometry.

mod canvas;
mod shaders;
mod surface;
mod webgl;

use log::{info, warn};
use web_sys::HtmlCanvasElement;

pub use canvas::CanvasRenderer;
pub use shaders::ShaderSources;
pub use webgl::{
	LINK_ATTRIBUTES, NODE_ATTRIBUTES, WebGlRenderer, clamp_line_width, pack_links, pack_nodes,
};

use super::color::Rgba;
use super::config::GrapherConfig;
use super::entity::{Link, Node};
use super::error::Result;
use super::transform::{Scale, Viewport};

/// Borrowed view of the entities to draw.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scene<'a> {
	/// Node records, drawn on top.
	pub nodes: &'a [Node],
	/// Link records, drawn first.
	pub links: &'a [Link],
}

/// Which rasterizer is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
	/// GPU path.
	WebGl,
	/// 2D context path.
	Canvas,
}

/// The contract both rasterizers implement.
pub trait RendererBackend {
	/// Which backend this is.
	fn kind(&self) -> BackendKind;

	/// Replace the scale used for projection.
	fn set_scale(&mut self, scale: Scale);

	/// Replace the translation used for projection.
	fn set_translate(&mut self, translate: [f64; 2]);

	/// Current projection.
	fn viewport(&self) -> Viewport;

	/// Set the CSS size of the surface. `None` keeps the current value on that axis.
	fn resize(&mut self, width: Option<f64>, height: Option<f64>);

	/// CSS size of the surface.
	fn size(&self) -> (f64, f64);

	/// Draw every link, then every node, from scratch.
	fn render(&mut self, scene: Scene<'_>);

	/// The drawing context went away; drawing must become a no-op.
	fn context_lost(&mut self) {}

	/// A new context is available; rebuild whatever the old one held.
	fn context_restored(&mut self) -> Result<()> {
		Ok(())
	}
}

/// A node projected to device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceCircle {
	/// Center x.
	pub cx: f64,
	/// Center y.
	pub cy: f64,
	/// Radius.
	pub r: f64,
	/// Fill channels.
	pub color: Rgba,
}

impl DeviceCircle {
	/// Project `node` through `viewport`.
	pub fn project(node: &Node, viewport: &Viewport) -> Self {
		Self {
			cx: viewport.device_x(node.x),
			cy: viewport.device_y(node.y),
			r: viewport.device_length(node.r).abs(),
			color: Rgba::from_packed(node.color),
		}
	}
}

/// A link projected to device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceSegment {
	/// Source x.
	pub x1: f64,
	/// Source y.
	pub y1: f64,
	/// Target x.
	pub x2: f64,
	/// Target y.
	pub y2: f64,
	/// Stroke channels.
	pub color: Rgba,
}

impl DeviceSegment {
	/// Project `link` through `viewport`.
	pub fn project(link: &Link, viewport: &Viewport) -> Self {
		Self {
			x1: viewport.device_x(link.x1),
			y1: viewport.device_y(link.y1),
			x2: viewport.device_x(link.x2),
			y2: viewport.device_y(link.y2),
			color: Rgba::from_packed(link.color),
		}
	}
}

/// Link width in device pixels for a CSS width at scale 1.
pub fn device_line_width(line_width: f64, viewport: &Viewport) -> f64 {
	viewport.device_length(line_width).abs()
}

/// Whichever backend the canvas supports, chosen once at construction.
#[derive(Debug)]
pub enum Renderer {
	/// GPU backend.
	WebGl(WebGlRenderer),
	/// 2D backend.
	Canvas(CanvasRenderer),
}

impl Renderer {
	/// Prefer WebGL and fall back to the 2D context when it is unavailable.
	///
	/// # Errors
	///
	/// Fails when neither context can be created. Also fails when WebGL was
	/// acquired but its programs do not build: the canvas is then bound to
	/// WebGL and can no longer hand out a 2D context.
	pub fn new(canvas: &HtmlCanvasElement, config: &GrapherConfig) -> Result<Self> {
		if !config.force_canvas {
			match WebGlRenderer::new(canvas.clone(), config) {
				Ok(renderer) => {
					info!("rendering with webgl");
					return Ok(Self::WebGl(renderer));
				}
				Err(err) => warn!("webgl unavailable ({err}), falling back to canvas"),
			}
		}
		let renderer = CanvasRenderer::new(canvas.clone(), config)?;
		info!("rendering with canvas 2d");
		Ok(Self::Canvas(renderer))
	}

	fn backend(&self) -> &dyn RendererBackend {
		match self {
			Self::WebGl(renderer) => renderer,
			Self::Canvas(renderer) => renderer,
		}
	}

	fn backend_mut(&mut self) -> &mut dyn RendererBackend {
		match self {
			Self::WebGl(renderer) => renderer,
			Self::Canvas(renderer) => renderer,
		}
	}
}

impl RendererBackend for Renderer {
	fn kind(&self) -> BackendKind {
		self.backend().kind()
	}

	fn set_scale(&mut self, scale: Scale) {
		self.backend_mut().set_scale(scale);
	}

	fn set_translate(&mut self, translate: [f64; 2]) {
		self.backend_mut().set_translate(translate);
	}

	fn viewport(&self) -> Viewport {
		self.backend().viewport()
	}

	fn resize(&mut self, width: Option<f64>, height: Option<f64>) {
		self.backend_mut().resize(width, height);
	}

	fn size(&self) -> (f64, f64) {
		self.backend().size()
	}

	fn render(&mut self, scene: Scene<'_>) {
		self.backend_mut().render(scene);
	}

	fn context_lost(&mut self) {
		self.backend_mut().context_lost();
	}

	fn context_restored(&mut self) -> Result<()> {
		self.backend_mut().context_restored()
	}
}
