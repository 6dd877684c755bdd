//! Immediate-mode 2D rasterizer.

use std::f64::consts::PI;

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::Surface;
use super::{
	BackendKind, DeviceCircle, DeviceSegment, RendererBackend, Scene, device_line_width,
};
use crate::grapher::color::{self, PackedColor, Rgba};
use crate::grapher::config::GrapherConfig;
use crate::grapher::error::{GrapherError, Result};
use crate::grapher::transform::{Scale, Viewport};

/// Draws filled arcs and stroked segments with a `CanvasRenderingContext2d`.
#[derive(Debug)]
pub struct CanvasRenderer {
	surface: Surface,
	context: CanvasRenderingContext2d,
	viewport: Viewport,
	line_width: f64,
	background: Option<PackedColor>,
}

impl CanvasRenderer {
	/// Acquire the 2D context of `canvas`.
	///
	/// # Errors
	///
	/// Fails when the canvas already holds another context type.
	pub fn new(canvas: HtmlCanvasElement, config: &GrapherConfig) -> Result<Self> {
		let context = canvas
			.get_context("2d")?
			.ok_or(GrapherError::ContextUnavailable("2d"))?
			.dyn_into::<CanvasRenderingContext2d>()
			.map_err(|_| GrapherError::ContextUnavailable("2d"))?;

		let mut renderer = Self {
			surface: Surface::new(canvas, config.resolution()),
			context,
			viewport: Viewport::new(config.transform(), config.resolution()),
			line_width: config.line_width,
			background: config.background.as_ref().and_then(color::parse),
		};
		renderer.resize(config.width, config.height);
		Ok(renderer)
	}

	fn clear(&self) {
		let (width, height) = self.surface.pixels();
		let (width, height) = (f64::from(width), f64::from(height));
		self.context.clear_rect(0.0, 0.0, width, height);
		if let Some(background) = self.background {
			self.context
				.set_fill_style_str(&color::to_rgba_string(background));
			self.context.fill_rect(0.0, 0.0, width, height);
		}
	}

	fn render_links(&self, scene: &Scene<'_>) {
		let width = device_line_width(self.line_width, &self.viewport);
		for link in scene.links {
			let segment = DeviceSegment::project(link, &self.viewport);
			self.context.begin_path();
			self.context.move_to(segment.x1, segment.y1);
			self.context.line_to(segment.x2, segment.y2);
			self.context.set_line_width(width);
			self.context.set_stroke_style_str(&css(segment.color));
			self.context.stroke();
		}
	}

	fn render_nodes(&self, scene: &Scene<'_>) {
		for node in scene.nodes {
			let circle = DeviceCircle::project(node, &self.viewport);
			self.context.begin_path();
			if let Err(err) = self
				.context
				.arc(circle.cx, circle.cy, circle.r, 0.0, 2.0 * PI)
			{
				debug!("skipping node arc: {err:?}");
				continue;
			}
			self.context.set_fill_style_str(&css(circle.color));
			self.context.fill();
		}
	}
}

fn css(rgba: Rgba) -> String {
	color::to_rgba_string(rgba.pack())
}

impl RendererBackend for CanvasRenderer {
	fn kind(&self) -> BackendKind {
		BackendKind::Canvas
	}

	fn set_scale(&mut self, scale: Scale) {
		self.viewport.transform.scale = scale;
	}

	fn set_translate(&mut self, translate: [f64; 2]) {
		self.viewport.transform.translate = translate;
	}

	fn viewport(&self) -> Viewport {
		self.viewport
	}

	fn resize(&mut self, width: Option<f64>, height: Option<f64>) {
		self.surface.resize(width, height);
	}

	fn size(&self) -> (f64, f64) {
		self.surface.size()
	}

	fn render(&mut self, scene: Scene<'_>) {
		self.surface.fit();
		self.clear();
		self.render_links(&scene);
		self.render_nodes(&scene);
	}
}
