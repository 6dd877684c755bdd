//! Browser glue: canvas creation, frame callbacks and DOM listeners.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlCanvasElement, MouseEvent};

use super::config::GrapherConfig;
use super::error::{GrapherError, Result};
use super::events::PointerEventKind;
use super::renderer::{BackendKind, Renderer, RendererBackend};
use super::scene::Grapher;
use super::scheduler::RafScheduler;
use super::transform::Point;

type Listener = Closure<dyn FnMut(Event)>;

/// A [`Grapher`] bound to a canvas element and the browser frame loop.
///
/// Listeners are removed and the loop is stopped on drop.
pub struct WebGrapher {
	grapher: Rc<RefCell<Grapher>>,
	canvas: HtmlCanvasElement,
	listeners: Vec<(&'static str, Listener)>,
}

impl WebGrapher {
	/// Attach to `canvas`, or to a new detached canvas when `None`.
	///
	/// `config.resolution` defaults to `window.devicePixelRatio`.
	///
	/// # Errors
	///
	/// Fails without a window or document, when no drawing context can be
	/// created, or when a listener cannot be registered.
	pub fn new(canvas: Option<HtmlCanvasElement>, mut config: GrapherConfig) -> Result<Self> {
		let window = web_sys::window().ok_or(GrapherError::WindowNotAvailable)?;
		let canvas = match canvas {
			Some(canvas) => canvas,
			None => window
				.document()
				.ok_or(GrapherError::DocumentNotAvailable)?
				.create_element("canvas")?
				.dyn_into::<HtmlCanvasElement>()
				.map_err(|_| GrapherError::Js("created element is not a canvas".to_owned()))?,
		};
		if config.resolution.is_none() {
			config.resolution = Some(window.device_pixel_ratio());
		}

		let renderer = Renderer::new(&canvas, &config)?;
		let gpu = renderer.kind() == BackendKind::WebGl;
		let grapher = Rc::new(RefCell::new(Grapher::new(
			renderer,
			RafScheduler::new(window),
			&config,
		)));

		let weak = Rc::downgrade(&grapher);
		let frame = Closure::<dyn FnMut(f64)>::new(move |_: f64| {
			if let Some(grapher) = weak.upgrade() {
				match grapher.try_borrow_mut() {
					Ok(mut grapher) => grapher.animate(),
					Err(_) => warn!("frame fired while the grapher was busy, skipping"),
				}
			}
		});
		grapher.borrow_mut().scheduler_mut().bind(frame);

		let mut web = Self {
			grapher,
			canvas,
			listeners: Vec::new(),
		};
		if gpu {
			web.listen_context()?;
		}
		for kind in PointerEventKind::ALL {
			web.listen_pointer(kind)?;
		}
		Ok(web)
	}

	fn listen(&mut self, name: &'static str, listener: Listener) -> Result<()> {
		self.canvas
			.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
		self.listeners.push((name, listener));
		Ok(())
	}

	fn listen_context(&mut self) -> Result<()> {
		let weak = self.weak();
		let lost = Listener::new(move |event: Event| {
			event.prevent_default();
			if let Some(grapher) = weak.upgrade() {
				match grapher.try_borrow_mut() {
					Ok(mut grapher) => grapher.context_lost(),
					Err(_) => warn!("context lost while the grapher was busy, ignoring"),
				}
			}
		});
		self.listen("webglcontextlost", lost)?;

		let weak = self.weak();
		let restored = Listener::new(move |_: Event| {
			if let Some(grapher) = weak.upgrade() {
				match grapher.try_borrow_mut() {
					Ok(mut grapher) => {
						// already logged by the grapher; it stays lost
						let _ = grapher.context_restored();
					}
					Err(_) => warn!("context restored while the grapher was busy, ignoring"),
				}
			}
		});
		self.listen("webglcontextrestored", restored)
	}

	fn listen_pointer(&mut self, kind: PointerEventKind) -> Result<()> {
		let weak = self.weak();
		let listener = Listener::new(move |event: Event| {
			let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
				return;
			};
			let offset = Point::new(f64::from(mouse.offset_x()), f64::from(mouse.offset_y()));
			let dispatch = weak.upgrade().and_then(|grapher| {
				grapher
					.try_borrow()
					.ok()
					.map(|grapher| grapher.pointer_event(kind, offset))
			});
			if let Some((event, handlers)) = dispatch {
				for handler in handlers {
					handler(&event);
				}
			}
		});
		self.listen(kind.dom_name(), listener)
	}

	fn weak(&self) -> Weak<RefCell<Grapher>> {
		Rc::downgrade(&self.grapher)
	}

	/// Run `f` with the grapher borrowed mutably.
	///
	/// Must not be called from inside another `with` on the same instance.
	pub fn with<R>(&self, f: impl FnOnce(&mut Grapher) -> R) -> R {
		f(&mut self.grapher.borrow_mut())
	}

	/// The drawing surface; append it to the document when it was created here.
	pub fn canvas(&self) -> &HtmlCanvasElement {
		&self.canvas
	}
}

impl Drop for WebGrapher {
	fn drop(&mut self) {
		if let Ok(mut grapher) = self.grapher.try_borrow_mut() {
			grapher.pause();
		}
		for (name, listener) in self.listeners.drain(..) {
			if let Err(err) = self
				.canvas
				.remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
			{
				warn!("failed to remove {name} listener: {err:?}");
			}
		}
		debug!("grapher detached from canvas");
	}
}

impl std::fmt::Debug for WebGrapher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WebGrapher")
			.field("grapher", &self.grapher)
			.field("listeners", &self.listeners.len())
			.finish_non_exhaustive()
	}
}
