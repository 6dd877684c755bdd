//! The scene manager.
//!
//! [`Grapher`] owns one [`Node`] and one [`Link`] record per entry of the bound
//! [`Network`]. Mutations only queue indices; geometry is recomputed for the
//! queued indices on the next [`Grapher::render`], which then hands the full
//! entity slices to the backend.

use std::ops::Range;
use std::rc::Rc;

use log::{debug, error, info, warn};

use super::color::{self, ColorValue, PackedColor};
use super::config::{DEFAULT_COLOR, GrapherConfig};
use super::entity::{Link, Node};
use super::error::Result;
use super::events::{EventHandlers, GraphEvent, Handler, HandlerId, PointerEventKind};
use super::network::{LinkData, Network};
use super::palette::Palette;
use super::queue::{EntityClass, Pending, UpdateQueue, find_links};
use super::renderer::{Renderer, RendererBackend, Scene};
use super::scheduler::{FrameId, FrameScheduler, RafScheduler};
use super::transform::{Point, Scale, Transform};

/// Whether the drawing context can currently be used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContextState {
	/// Renders reach the backend.
	#[default]
	Active,
	/// Renders are skipped until the context is restored.
	Lost,
}

/// Incremental renderer for one network on one surface.
pub struct Grapher<B = Renderer, S = RafScheduler> {
	backend: B,
	scheduler: S,
	data: Network,
	nodes: Vec<Node>,
	links: Vec<Link>,
	queue: UpdateQueue,
	transform: Transform,
	color: PackedColor,
	palette: Palette,
	handlers: EventHandlers,
	current_frame: Option<FrameId>,
	rendered: bool,
	context: ContextState,
	resume_on_restore: bool,
}

impl<B: RendererBackend, S: FrameScheduler> Grapher<B, S> {
	/// Wrap a backend already built from `config`.
	pub fn new(backend: B, scheduler: S, config: &GrapherConfig) -> Self {
		let GrapherConfig {
			scale,
			translate,
			color,
			// consumed by the backend
			resolution: _,
			line_width: _,
			background: _,
			force_canvas: _,
			node_shaders: _,
			link_shaders: _,
			width: _,
			height: _,
		} = config;

		let mut grapher = Self {
			backend,
			scheduler,
			data: Network::default(),
			nodes: Vec::new(),
			links: Vec::new(),
			queue: UpdateQueue::new(),
			transform: Transform {
				scale: *scale,
				translate: *translate,
			},
			color: DEFAULT_COLOR,
			palette: Palette::new(),
			handlers: EventHandlers::default(),
			current_frame: None,
			rendered: false,
			context: ContextState::Active,
			resume_on_restore: false,
		};
		if let Some(color) = color {
			grapher.set_color(color.clone());
		}
		grapher.queue.mark_transform();
		grapher
	}

	/// Bind a network, reconcile entity counts and queue everything.
	pub fn set_data(&mut self, data: Network) -> &mut Self {
		self.data = data;
		self.exit().enter().update()
	}

	/// The bound network.
	pub fn data(&self) -> &Network {
		&self.data
	}

	/// Mutable access to the bound network.
	///
	/// Changes are not tracked: follow up with [`Self::enter`], [`Self::exit`]
	/// and the matching `update_*` call.
	pub fn data_mut(&mut self) -> &mut Network {
		&mut self.data
	}

	/// Append default records until counts match the data.
	pub fn enter(&mut self) -> &mut Self {
		if self.nodes.len() < self.data.nodes.len() {
			self.nodes.resize_with(self.data.nodes.len(), Node::default);
		}
		if self.links.len() < self.data.links.len() {
			self.links.resize_with(self.data.links.len(), Link::default);
		}
		self
	}

	/// Drop trailing records the data no longer has.
	pub fn exit(&mut self) -> &mut Self {
		self.nodes.truncate(self.data.nodes.len());
		self.links.truncate(self.data.links.len());
		self
	}

	/// Queue every node and link.
	pub fn update(&mut self) -> &mut Self {
		self.update_class(EntityClass::Nodes)
			.update_class(EntityClass::Links)
	}

	/// Queue every entity of `class`.
	pub fn update_class(&mut self, class: EntityClass) -> &mut Self {
		self.queue.mark_all(class);
		self
	}

	/// Queue `indices` of `class`. Nodes also queue every link touching them.
	pub fn update_indices(&mut self, class: EntityClass, indices: &[usize]) -> &mut Self {
		let count = self.count(class);
		self.queue
			.mark_indices(class, indices.iter().copied(), count);
		if class == EntityClass::Nodes {
			self.cascade(indices);
		}
		self
	}

	/// Queue the half-open range `range` of `class`, cascading like [`Self::update_indices`].
	pub fn update_range(&mut self, class: EntityClass, range: Range<usize>) -> &mut Self {
		let indices: Vec<usize> = range.collect();
		self.update_indices(class, &indices)
	}

	/// Queue one node, and its links when `cascade_links` is set.
	pub fn update_node(&mut self, index: usize, cascade_links: bool) -> &mut Self {
		let count = self.nodes.len();
		self.queue.mark_indices(EntityClass::Nodes, [index], count);
		if cascade_links {
			self.cascade(&[index]);
		}
		self
	}

	/// Queue one link.
	pub fn update_link(&mut self, index: usize) -> &mut Self {
		let count = self.links.len();
		self.queue.mark_indices(EntityClass::Links, [index], count);
		self
	}

	fn cascade(&mut self, nodes: &[usize]) {
		if self.queue.is_all(EntityClass::Links) {
			return;
		}
		let links = find_links(&self.data.links, nodes);
		if !links.is_empty() {
			let count = self.links.len();
			self.queue.mark_indices(EntityClass::Links, links, count);
		}
	}

	fn count(&self, class: EntityClass) -> usize {
		match class {
			EntityClass::Nodes => self.nodes.len(),
			EntityClass::Links => self.links.len(),
		}
	}

	/// Recompute queued geometry, sync the transform and draw.
	///
	/// Skipped entirely while the context is lost; the queue is kept for the
	/// first render after restore.
	pub fn render(&mut self) -> &mut Self {
		if self.context == ContextState::Lost {
			debug!("render skipped, context lost");
			return self;
		}
		self.rendered = true;

		match self.queue.drain(EntityClass::Links, self.links.len()) {
			Pending::All => (0..self.links.len()).for_each(|i| self.recompute_link(i)),
			Pending::Indices(indices) => indices.into_iter().for_each(|i| self.recompute_link(i)),
		}
		match self.queue.drain(EntityClass::Nodes, self.nodes.len()) {
			Pending::All => (0..self.nodes.len()).for_each(|i| self.recompute_node(i)),
			Pending::Indices(indices) => indices.into_iter().for_each(|i| self.recompute_node(i)),
		}
		if self.queue.take_transform() {
			self.backend.set_scale(self.transform.scale);
			self.backend.set_translate(self.transform.translate);
		}

		self.backend.render(Scene {
			nodes: &self.nodes,
			links: &self.links,
		});
		self
	}

	fn recompute_node(&mut self, index: usize) {
		let (Some(data), Some(node)) = (self.data.nodes.get(index), self.nodes.get(index)) else {
			return;
		};
		let color = self.find_color(data.color.as_ref());
		let mut updated = *node;
		updated.update(data.x, data.y, data.r, color);
		self.nodes[index] = updated;
	}

	fn recompute_link(&mut self, index: usize) {
		let Some(data) = self.data.links.get(index) else {
			return;
		};
		let LinkData { from, to, .. } = *data;
		let (Some(source), Some(target)) = (self.data.nodes.get(from), self.data.nodes.get(to))
		else {
			debug!("link {index} points at a missing node ({from} -> {to}), skipping");
			return;
		};
		let color = match data.color.as_ref() {
			Some(explicit) => self.find_color(Some(explicit)),
			None => self.blend(source.color.as_ref(), target.color.as_ref()),
		};
		let (x1, y1, x2, y2) = (source.x, source.y, target.x, target.y);
		if let Some(link) = self.links.get_mut(index) {
			link.update(x1, y1, x2, y2, color);
		}
	}

	/// Palette entry, else parsed color, else the foreground color.
	fn find_color(&self, value: Option<&ColorValue>) -> PackedColor {
		let Some(value) = value else {
			return self.color;
		};
		self.palette
			.get(&value.key())
			.or_else(|| color::parse(value))
			.unwrap_or(self.color)
	}

	/// Link color between two node colors.
	fn blend(&self, a: Option<&ColorValue>, b: Option<&ColorValue>) -> PackedColor {
		if let (Some(a), Some(b)) = (a, b) {
			let (a, b) = (a.key(), b.key());
			if self.palette.get(&a).is_some() && self.palette.get(&b).is_some() {
				if let Some(pair) = self.palette.pair(&a, &b) {
					return pair;
				}
			}
		}
		color::midpoint(self.find_color(a), self.find_color(b))
	}

	/// Render on every frame until [`Self::pause`].
	pub fn play(&mut self) -> &mut Self {
		if self.current_frame.is_none() {
			self.current_frame = self.scheduler.request_frame();
		}
		self
	}

	/// Stop the loop. Does nothing when not playing.
	pub fn pause(&mut self) -> &mut Self {
		if let Some(id) = self.current_frame.take() {
			self.scheduler.cancel_frame(id);
		}
		self
	}

	/// One frame of the loop: render, then ask for the next frame.
	///
	/// The host calls this from its frame callback. Without an outstanding
	/// request, i.e. after [`Self::pause`], it does nothing.
	pub fn animate(&mut self) {
		if self.current_frame.take().is_none() {
			return;
		}
		self.render();
		self.current_frame = self.scheduler.request_frame();
	}

	/// Whether a frame is outstanding.
	pub fn is_playing(&self) -> bool {
		self.current_frame.is_some()
	}

	/// Whether anything was drawn since construction.
	pub fn is_rendered(&self) -> bool {
		self.rendered
	}

	/// Current context state.
	pub fn context_state(&self) -> ContextState {
		self.context
	}

	/// The context went away: stop the loop and make renders no-ops.
	pub fn context_lost(&mut self) {
		if self.context == ContextState::Lost {
			return;
		}
		self.resume_on_restore = self.is_playing();
		self.pause();
		self.context = ContextState::Lost;
		self.backend.context_lost();
		warn!("rendering context lost");
	}

	/// The context is back: rebuild backend state, then resume the loop if it
	/// was running, otherwise redraw once if anything was drawn before.
	///
	/// # Errors
	///
	/// Returns the backend error when it cannot rebuild; the grapher stays lost.
	pub fn context_restored(&mut self) -> Result<()> {
		if let Err(err) = self.backend.context_restored() {
			error!("failed to restore rendering context: {err}");
			return Err(err);
		}
		self.context = ContextState::Active;
		self.queue.mark_transform();
		info!("rendering context restored");

		if std::mem::take(&mut self.resume_on_restore) {
			self.play();
		} else if self.rendered {
			self.render();
		}
		Ok(())
	}

	/// Bind an empty network and draw it.
	pub fn clear(&mut self) -> &mut Self {
		self.set_data(Network::default()).render()
	}

	/// Set the CSS size of the surface; `None` keeps that axis.
	pub fn resize(&mut self, width: Option<f64>, height: Option<f64>) -> &mut Self {
		self.backend.resize(width, height);
		self
	}

	/// CSS width of the surface.
	pub fn width(&self) -> f64 {
		self.backend.size().0
	}

	/// CSS height of the surface.
	pub fn height(&self) -> f64 {
		self.backend.size().1
	}

	/// The data to display transform.
	pub fn transform(&self) -> Transform {
		self.transform
	}

	/// Replace scale and translation.
	pub fn set_transform(&mut self, transform: Transform) -> &mut Self {
		self.transform = transform;
		self.queue.mark_transform();
		self
	}

	/// Current scale.
	pub fn scale(&self) -> Scale {
		self.transform.scale
	}

	/// Replace the scale, uniform (`f64`) or per axis (`[f64; 2]`).
	pub fn set_scale(&mut self, scale: impl Into<Scale>) -> &mut Self {
		self.transform.scale = scale.into();
		self.queue.mark_transform();
		self
	}

	/// Current translation.
	pub fn translate(&self) -> [f64; 2] {
		self.transform.translate
	}

	/// Replace the translation.
	pub fn set_translate(&mut self, translate: [f64; 2]) -> &mut Self {
		self.transform.translate = translate;
		self.queue.mark_transform();
		self
	}

	/// Foreground color, used for anything without a resolvable color.
	pub fn color(&self) -> PackedColor {
		self.color
	}

	/// Replace the foreground color. Unparseable values keep the current one.
	///
	/// Applies to entities recomputed from now on.
	pub fn set_color(&mut self, color: impl Into<ColorValue>) -> &mut Self {
		let color = color.into();
		match color::parse(&color) {
			Some(parsed) => self.color = parsed,
			None => warn!("foreground color {color:?} is not a color, keeping the current one"),
		}
		self
	}

	/// Palette consulted before parsing node colors.
	pub fn palette(&self) -> &Palette {
		&self.palette
	}

	/// Replace the palette. Applies to entities recomputed from now on.
	pub fn set_palette(&mut self, palette: Palette) -> &mut Self {
		self.palette = palette;
		self
	}

	/// Display (CSS pixel) position to data space.
	pub fn get_data_position(&self, point: Point) -> Point {
		self.transform.invert(point)
	}

	/// Data position to display (CSS pixel) space.
	pub fn get_display_position(&self, point: Point) -> Point {
		self.transform.apply(point)
	}

	/// Lowest index whose bounding box contains the display point.
	pub fn get_node_id_at(&self, point: Point) -> Option<usize> {
		let Point { x, y } = self.get_data_position(point);
		self.nodes.iter().position(|node| node.bounds_contain(x, y))
	}

	/// Node records as of the last render.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Link records as of the last render.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Register a pointer handler.
	pub fn on(
		&mut self,
		kind: PointerEventKind,
		handler: impl Fn(&GraphEvent) + 'static,
	) -> HandlerId {
		self.handlers.on(kind, Rc::new(handler))
	}

	/// Remove one handler, or every handler of `kind` when `id` is `None`.
	pub fn off(&mut self, kind: PointerEventKind, id: Option<HandlerId>) -> &mut Self {
		self.handlers.off(kind, id);
		self
	}

	/// Build the event for a pointer at `offset` and collect the handlers to run.
	///
	/// Handlers are returned rather than invoked so the caller can release its
	/// borrow of the grapher first; handlers may call back into it.
	pub fn pointer_event(
		&self,
		kind: PointerEventKind,
		offset: Point,
	) -> (GraphEvent, Vec<Handler>) {
		let event = GraphEvent {
			kind,
			offset,
			data: self.get_data_position(offset),
		};
		(event, self.handlers.handlers(kind))
	}

	/// The rasterizer.
	pub fn backend(&self) -> &B {
		&self.backend
	}

	/// Mutable rasterizer.
	pub fn backend_mut(&mut self) -> &mut B {
		&mut self.backend
	}

	/// The frame scheduler.
	pub fn scheduler(&self) -> &S {
		&self.scheduler
	}

	/// Mutable frame scheduler.
	pub fn scheduler_mut(&mut self) -> &mut S {
		&mut self.scheduler
	}
}

impl<B, S> std::fmt::Debug for Grapher<B, S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Grapher")
			.field("nodes", &self.nodes.len())
			.field("links", &self.links.len())
			.field("transform", &self.transform)
			.field("playing", &self.current_frame.is_some())
			.field("context", &self.context)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::grapher::network::NodeData;
	use crate::grapher::renderer::BackendKind;
	use crate::grapher::scheduler::ManualScheduler;
	use crate::grapher::transform::Viewport;

	#[derive(Default)]
	struct Counting {
		viewport: Viewport,
		renders: usize,
	}

	impl RendererBackend for Counting {
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

		fn resize(&mut self, _: Option<f64>, _: Option<f64>) {}

		fn size(&self) -> (f64, f64) {
			(300.0, 150.0)
		}

		fn render(&mut self, _: Scene<'_>) {
			self.renders += 1;
		}
	}

	fn grapher() -> Grapher<Counting, ManualScheduler> {
		Grapher::new(
			Counting::default(),
			ManualScheduler::new(),
			&GrapherConfig::default(),
		)
	}

	fn network(colors: [Option<&str>; 2], link: Option<&str>) -> Network {
		let node = |x, color: Option<&str>| NodeData {
			x,
			y: 0.0,
			r: 1.0,
			color: color.map(ColorValue::from),
		};
		Network {
			nodes: vec![node(0.0, colors[0]), node(10.0, colors[1])],
			links: vec![LinkData {
				from: 0,
				to: 1,
				color: link.map(ColorValue::from),
			}],
		}
	}

	#[test]
	fn node_colors_fall_back_to_foreground() {
		let mut g = grapher();
		g.set_color("#ff0000")
			.set_data(network([Some("nope"), None], None))
			.render();
		assert_eq!(g.nodes()[0].color, 0xffff_0000);
		assert_eq!(g.nodes()[1].color, 0xffff_0000);
	}

	#[test]
	fn invalid_foreground_keeps_the_previous_one() {
		let mut g = grapher();
		g.set_color("blue-ish");
		assert_eq!(g.color(), DEFAULT_COLOR);
	}

	#[test]
	fn link_color_prefers_explicit_then_palette_then_blend() {
		let mut g = grapher();
		g.set_data(network([Some("#000000"), Some("#ffffff")], None))
			.render();
		assert_eq!(g.links()[0].color, 0xff7f_7f7f);

		g.set_data(network([Some("#000000"), Some("#ffffff")], Some("#00ff00")))
			.render();
		assert_eq!(g.links()[0].color, 0xff00_ff00);

		let mut palette = Palette::from_swatches(["#ff0000", "#0000ff"]);
		assert_eq!(palette.pair("1", "0"), Some(0xff7f_007f));
		palette.insert("0-1", 0xff12_3456);
		g.set_palette(palette)
			.set_data(network([Some("1"), Some("0")], None))
			.render();
		assert_eq!(g.nodes()[0].color, 0xff00_00ff);
		assert_eq!(g.links()[0].color, 0xff12_3456);
	}

	#[test]
	fn links_to_missing_nodes_are_skipped() {
		let mut g = grapher();
		let mut data = network([None, None], None);
		data.links.push(LinkData::new(0, 7));
		g.set_data(data).render();
		assert_eq!(g.links().len(), 2);
		assert_eq!(g.links()[1], Link::default());
		assert_eq!(g.links()[0].x2, 10.0);
	}

	#[test]
	fn transform_is_pushed_on_render_only() {
		let mut g = grapher();
		g.set_scale(2.0).set_translate([5.0, 6.0]);
		assert_eq!(g.backend().viewport().transform, Transform::default());
		g.render();
		assert_eq!(g.backend().viewport().transform, g.transform());
		assert_eq!(g.backend().renders, 1);
	}

	#[test]
	fn hit_test_uses_display_space() {
		let mut g = grapher();
		g.set_data(network([None, None], None))
			.set_scale(2.0)
			.set_translate([100.0, 0.0])
			.render();
		assert_eq!(g.get_node_id_at(Point::new(100.0, 0.0)), Some(0));
		assert_eq!(g.get_node_id_at(Point::new(121.5, 1.5)), Some(1));
		assert_eq!(g.get_node_id_at(Point::new(110.0, 0.0)), None);
	}

	#[test]
	fn pointer_events_carry_data_positions() {
		let mut g = grapher();
		g.set_translate([10.0, 20.0]);
		g.on(PointerEventKind::MouseUp, |_: &GraphEvent| {});
		let (event, handlers) = g.pointer_event(PointerEventKind::MouseUp, Point::new(15.0, 25.0));
		assert_eq!(event.data, Point::new(5.0, 5.0));
		assert_eq!(handlers.len(), 1);
		assert!(
			g.pointer_event(PointerEventKind::MouseDown, Point::default())
				.1
				.is_empty()
		);
	}
}
