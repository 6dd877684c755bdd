//! GPU rasterizer.
//!
//! Every frame the whole scene is packed into one interleaved `f32` array per
//! primitive kind and uploaded into a single reused buffer object. Links are
//! drawn as `LINES`, nodes as one covering triangle each whose fragment stage
//! discards everything outside the circle.

use std::f64::consts::SQRT_2;

use js_sys::Float32Array;
use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{
	HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl, WebGlShader,
	WebGlUniformLocation,
};

use super::shaders::ShaderSources;
use super::surface::Surface;
use super::{
	BackendKind, DeviceCircle, DeviceSegment, RendererBackend, Scene, device_line_width,
};
use crate::grapher::color::{self, PackedColor, Rgba};
use crate::grapher::config::GrapherConfig;
use crate::grapher::entity::{Link, Node};
use crate::grapher::error::{GrapherError, Result};
use crate::grapher::transform::{Scale, Viewport};

/// Floats per node vertex: position, color, center, radius.
pub const NODE_ATTRIBUTES: usize = 9;

/// Floats per link vertex: position, color.
pub const LINK_ATTRIBUTES: usize = 6;

/// Extra device pixels around each node so the soft edge is never clipped.
const ANTIALIAS_MARGIN: f64 = 10.0;

const FLOAT_BYTES: i32 = 4;

/// Append three vertices per node; the triangle covers the circle plus margin.
pub fn pack_nodes(out: &mut Vec<f32>, nodes: &[Node], viewport: &Viewport) {
	out.clear();
	out.reserve(nodes.len() * 3 * NODE_ATTRIBUTES);
	for node in nodes {
		let circle = DeviceCircle::project(node, viewport);
		let side = circle.r + ANTIALIAS_MARGIN;
		let far = (1.0 + SQRT_2) * side;
		let corners = [
			(circle.cx - side, circle.cy - side),
			(circle.cx + far, circle.cy - side),
			(circle.cx - side, circle.cy + far),
		];
		for (x, y) in corners {
			out.extend_from_slice(&[x as f32, y as f32]);
			push_rgba(out, circle.color);
			out.extend_from_slice(&[circle.cx as f32, circle.cy as f32, circle.r as f32]);
		}
	}
}

/// Append two vertices per link.
pub fn pack_links(out: &mut Vec<f32>, links: &[Link], viewport: &Viewport) {
	out.clear();
	out.reserve(links.len() * 2 * LINK_ATTRIBUTES);
	for link in links {
		let segment = DeviceSegment::project(link, viewport);
		for (x, y) in [(segment.x1, segment.y1), (segment.x2, segment.y2)] {
			out.extend_from_slice(&[x as f32, y as f32]);
			push_rgba(out, segment.color);
		}
	}
}

fn push_rgba(out: &mut Vec<f32>, color: Rgba) {
	out.extend_from_slice(&[
		f32::from(color.r),
		f32::from(color.g),
		f32::from(color.b),
		f32::from(color.a),
	]);
}

/// Fit a requested width into the implementation's supported line range.
pub fn clamp_line_width(width: f64, range: [f32; 2]) -> f32 {
	(width as f32).max(range[0]).min(range[1])
}

struct Attribute {
	name: &'static str,
	size: i32,
	offset: i32,
}

const LINK_LAYOUT: [Attribute; 2] = [
	Attribute { name: "a_position", size: 2, offset: 0 },
	Attribute { name: "a_rgba", size: 4, offset: 2 },
];

const NODE_LAYOUT: [Attribute; 4] = [
	Attribute { name: "a_position", size: 2, offset: 0 },
	Attribute { name: "a_rgba", size: 4, offset: 2 },
	Attribute { name: "a_center", size: 2, offset: 6 },
	Attribute { name: "a_radius", size: 1, offset: 8 },
];

#[derive(Debug)]
struct Program {
	program: WebGlProgram,
	resolution: Option<WebGlUniformLocation>,
}

#[derive(Debug)]
struct Programs {
	nodes: Program,
	links: Program,
}

/// Draws the scene through a `WebGlRenderingContext`.
#[derive(Debug)]
pub struct WebGlRenderer {
	surface: Surface,
	gl: Gl,
	viewport: Viewport,
	line_width: f64,
	background: Option<PackedColor>,
	node_shaders: ShaderSources,
	link_shaders: ShaderSources,
	programs: Option<Programs>,
	buffer: Option<WebGlBuffer>,
	node_vertices: Vec<f32>,
	link_vertices: Vec<f32>,
	line_width_range: [f32; 2],
	lost: bool,
}

impl WebGlRenderer {
	/// Acquire a WebGL context and build both programs.
	///
	/// # Errors
	///
	/// Fails when no WebGL context is available or the shaders do not build.
	pub fn new(canvas: HtmlCanvasElement, config: &GrapherConfig) -> Result<Self> {
		let gl = acquire(&canvas)?;
		let mut renderer = Self {
			surface: Surface::new(canvas, config.resolution()),
			gl,
			viewport: Viewport::new(config.transform(), config.resolution()),
			line_width: config.line_width,
			background: config.background.as_ref().and_then(color::parse),
			node_shaders: config.node_shaders.clone().unwrap_or_else(ShaderSources::nodes),
			link_shaders: config.link_shaders.clone().unwrap_or_else(ShaderSources::links),
			programs: None,
			buffer: None,
			node_vertices: Vec::new(),
			link_vertices: Vec::new(),
			line_width_range: [1.0, 1.0],
			lost: false,
		};
		renderer.init_gl()?;
		renderer.resize(config.width, config.height);
		Ok(renderer)
	}

	fn init_gl(&mut self) -> Result<()> {
		let gl = &self.gl;
		let links = build_program(gl, &self.link_shaders)?;
		let nodes = build_program(gl, &self.node_shaders)?;
		let buffer = gl
			.create_buffer()
			.ok_or(GrapherError::ResourceCreation("buffer"))?;

		gl.blend_func_separate(
			Gl::SRC_ALPHA,
			Gl::ONE_MINUS_SRC_ALPHA,
			Gl::ONE,
			Gl::ONE_MINUS_SRC_ALPHA,
		);
		gl.enable(Gl::BLEND);

		self.line_width_range = line_width_range(gl);
		self.programs = Some(Programs { nodes, links });
		self.buffer = Some(buffer);
		self.lost = false;
		debug!("webgl programs ready, line width range {:?}", self.line_width_range);
		Ok(())
	}

	fn clear(&self) {
		let (width, height) = self.surface.pixels();
		self.gl.viewport(0, 0, width as i32, height as i32);
		let Rgba { r, g, b, a } = color::to_rgba(self.background.unwrap_or(0));
		self.gl.clear_color(
			f32::from(r) / 255.0,
			f32::from(g) / 255.0,
			f32::from(b) / 255.0,
			f32::from(a) / 255.0,
		);
		self.gl.clear(Gl::COLOR_BUFFER_BIT);
	}

	fn draw(
		&self,
		program: &Program,
		layout: &[Attribute],
		stride: usize,
		vertices: &[f32],
		mode: u32,
	) {
		if vertices.is_empty() {
			return;
		}
		let gl = &self.gl;
		let (width, height) = self.surface.pixels();
		gl.use_program(Some(&program.program));
		gl.uniform2f(program.resolution.as_ref(), width as f32, height as f32);
		gl.bind_buffer(Gl::ARRAY_BUFFER, self.buffer.as_ref());
		let data = Float32Array::from(vertices);
		gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &data, Gl::STREAM_DRAW);

		let stride_bytes = stride as i32 * FLOAT_BYTES;
		for attribute in layout {
			let location = gl.get_attrib_location(&program.program, attribute.name);
			if location < 0 {
				continue;
			}
			let location = location as u32;
			gl.enable_vertex_attrib_array(location);
			gl.vertex_attrib_pointer_with_i32(
				location,
				attribute.size,
				Gl::FLOAT,
				false,
				stride_bytes,
				attribute.offset * FLOAT_BYTES,
			);
		}
		gl.draw_arrays(mode, 0, (vertices.len() / stride) as i32);
	}
}

fn acquire(canvas: &HtmlCanvasElement) -> Result<Gl> {
	for id in ["webgl", "experimental-webgl"] {
		if let Ok(Some(context)) = canvas.get_context(id) {
			if let Ok(gl) = context.dyn_into::<Gl>() {
				return Ok(gl);
			}
		}
	}
	Err(GrapherError::ContextUnavailable("webgl"))
}

fn line_width_range(gl: &Gl) -> [f32; 2] {
	let range = gl
		.get_parameter(Gl::ALIASED_LINE_WIDTH_RANGE)
		.ok()
		.and_then(|value| value.dyn_into::<Float32Array>().ok())
		.map(|array| array.to_vec());
	match range.as_deref() {
		Some([min, max, ..]) => [*min, *max],
		_ => {
			warn!("could not read the supported line width range");
			[1.0, 1.0]
		}
	}
}

fn build_program(gl: &Gl, sources: &ShaderSources) -> Result<Program> {
	let vertex = compile_shader(gl, Gl::VERTEX_SHADER, "vertex", &sources.vertex)?;
	let fragment = compile_shader(gl, Gl::FRAGMENT_SHADER, "fragment", &sources.fragment)?;
	let program = gl
		.create_program()
		.ok_or(GrapherError::ResourceCreation("program"))?;
	gl.attach_shader(&program, &vertex);
	gl.attach_shader(&program, &fragment);
	gl.link_program(&program);

	let linked = gl
		.get_program_parameter(&program, Gl::LINK_STATUS)
		.as_bool()
		.unwrap_or(false);
	if !linked {
		let log = gl.get_program_info_log(&program).unwrap_or_default();
		return Err(GrapherError::ProgramLink(log));
	}

	let resolution = gl.get_uniform_location(&program, "u_resolution");
	Ok(Program { program, resolution })
}

fn compile_shader(gl: &Gl, kind: u32, stage: &'static str, source: &str) -> Result<WebGlShader> {
	let shader = gl
		.create_shader(kind)
		.ok_or(GrapherError::ResourceCreation("shader"))?;
	gl.shader_source(&shader, source);
	gl.compile_shader(&shader);

	let compiled = gl
		.get_shader_parameter(&shader, Gl::COMPILE_STATUS)
		.as_bool()
		.unwrap_or(false);
	if compiled {
		Ok(shader)
	} else {
		Err(GrapherError::ShaderCompile {
			stage,
			log: gl.get_shader_info_log(&shader).unwrap_or_default(),
		})
	}
}

impl RendererBackend for WebGlRenderer {
	fn kind(&self) -> BackendKind {
		BackendKind::WebGl
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
		if self.lost || self.gl.is_context_lost() {
			return;
		}
		let Some(programs) = self.programs.as_ref() else {
			return;
		};

		self.surface.fit();
		self.clear();

		let mut link_vertices = std::mem::take(&mut self.link_vertices);
		let mut node_vertices = std::mem::take(&mut self.node_vertices);
		pack_links(&mut link_vertices, scene.links, &self.viewport);
		pack_nodes(&mut node_vertices, scene.nodes, &self.viewport);

		let width = device_line_width(self.line_width, &self.viewport);
		self.gl
			.line_width(clamp_line_width(width, self.line_width_range));
		self.draw(&programs.links, &LINK_LAYOUT, LINK_ATTRIBUTES, &link_vertices, Gl::LINES);
		self.draw(&programs.nodes, &NODE_LAYOUT, NODE_ATTRIBUTES, &node_vertices, Gl::TRIANGLES);

		self.link_vertices = link_vertices;
		self.node_vertices = node_vertices;
	}

	fn context_lost(&mut self) {
		self.lost = true;
		self.programs = None;
		self.buffer = None;
	}

	fn context_restored(&mut self) -> Result<()> {
		self.gl = acquire(&self.surface.canvas)?;
		self.init_gl()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::grapher::transform::Transform;

	#[test]
	fn node_triangle_covers_circle_with_margin() {
		let nodes = [Node {
			x: 10.0,
			y: 20.0,
			r: 5.0,
			color: 0x80ff_4020,
		}];
		let mut out = Vec::new();
		pack_nodes(&mut out, &nodes, &Viewport::default());
		assert_eq!(out.len(), 3 * NODE_ATTRIBUTES);

		let far = (1.0 + SQRT_2) * 15.0;
		let first = &out[..NODE_ATTRIBUTES];
		assert_eq!(first, &[-5.0, 5.0, 255.0, 64.0, 32.0, 128.0, 10.0, 20.0, 5.0]);

		let second = &out[NODE_ATTRIBUTES..2 * NODE_ATTRIBUTES];
		assert!((f64::from(second[0]) - (10.0 + far)).abs() < 1e-4);
		assert_eq!(second[1], 5.0);

		let third = &out[2 * NODE_ATTRIBUTES..];
		assert_eq!(third[0], -5.0);
		assert!((f64::from(third[1]) - (20.0 + far)).abs() < 1e-4);
		assert_eq!(&third[6..], &[10.0, 20.0, 5.0]);
	}

	#[test]
	fn node_geometry_follows_the_viewport() {
		let nodes = [Node {
			x: 1.0,
			y: 1.0,
			r: 2.0,
			color: 0xff00_0000,
		}];
		let viewport = Viewport::new(
			Transform {
				scale: Scale::uniform(2.0),
				translate: [3.0, 4.0],
			},
			2.0,
		);
		let mut out = Vec::new();
		pack_nodes(&mut out, &nodes, &viewport);
		assert_eq!(&out[6..9], &[10.0, 12.0, 8.0]);
	}

	#[test]
	fn links_pack_two_vertices_each() {
		let links = [
			Link {
				x1: 0.0,
				y1: 1.0,
				x2: 2.0,
				y2: 3.0,
				color: 0xff01_0203,
			},
			Link::default(),
		];
		let mut out = vec![42.0];
		pack_links(&mut out, &links, &Viewport::default());
		assert_eq!(out.len(), 2 * 2 * LINK_ATTRIBUTES);
		assert_eq!(
			&out[..2 * LINK_ATTRIBUTES],
			&[0.0, 1.0, 1.0, 2.0, 3.0, 255.0, 2.0, 3.0, 1.0, 2.0, 3.0, 255.0]
		);
	}

	#[test]
	fn line_width_respects_supported_range() {
		assert_eq!(clamp_line_width(4.0, [1.0, 1.0]), 1.0);
		assert_eq!(clamp_line_width(4.0, [1.0, 8.0]), 4.0);
		assert_eq!(clamp_line_width(0.25, [1.0, 8.0]), 1.0);
		assert_eq!(clamp_line_width(20.0, [0.5, 10.0]), 10.0);
	}
}
