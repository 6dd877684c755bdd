use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::layout::Layout;
use crate::grapher::{
	EntityClass, GraphEvent, GrapherConfig, Network, Palette, Point, PointerEventKind, WebGrapher,
};

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

/// Everything the canvas handlers share.
struct ViewState {
	web: WebGrapher,
	layout: Layout,
	drag: Option<usize>,
	pan: Option<Pan>,
}

struct Pan {
	start: Point,
	translate_start: [f64; 2],
}

type Shared = Rc<RefCell<Option<ViewState>>>;

fn window_size(window: &Window) -> (f64, f64) {
	let dimension = |value: Result<JsValue, JsValue>| {
		value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
	};
	(dimension(window.inner_width()), dimension(window.inner_height()))
}

fn offset(canvas_ref: NodeRef<leptos::html::Canvas>, client_x: i32, client_y: i32) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		f64::from(client_x) - rect.left(),
		f64::from(client_y) - rect.top(),
	))
}

fn hover_logger(state: Weak<RefCell<Option<ViewState>>>) -> impl Fn(&GraphEvent) + 'static {
	let hovered = Cell::new(None);
	move |event: &GraphEvent| {
		let Some(state) = state.upgrade() else {
			return;
		};
		let Ok(state) = state.try_borrow() else {
			return;
		};
		let Some(view) = state.as_ref() else {
			return;
		};
		let node = view.web.with(|g| g.get_node_id_at(event.offset));
		if hovered.replace(node) != node {
			if let Some(index) = node {
				info!(
					"hovering node {index} at ({:.1}, {:.1})",
					event.data.x, event.data.y
				);
			}
		}
	}
}

/// A `<canvas>` driven by a [`WebGrapher`], laid out by a force simulation.
///
/// Drag a node to pin it, drag the background to pan, scroll to zoom.
#[component]
pub fn NetworkView(
	#[prop(into)] data: Signal<Network>,
	#[prop(optional)] palette: Option<Vec<String>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Shared = Rc::new(RefCell::new(None));
	let step: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, step_init, resize_cb_init) = (state.clone(), step.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window, network view stays empty");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| f64::from(p.client_width()))
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| f64::from(p.client_height()))
						.unwrap_or(600.0)
				}),
			)
		};

		let network = data.get();
		let config = GrapherConfig {
			translate: [w / 2.0, h / 2.0],
			background: Some("#1a1a2e".into()),
			color: Some("#9aa5ce".into()),
			line_width: 1.5,
			width: Some(w),
			height: Some(h),
			..GrapherConfig::default()
		};
		let web = match WebGrapher::new(Some(canvas), config) {
			Ok(web) => web,
			Err(err) => {
				error!("failed to attach grapher: {err}");
				return;
			}
		};
		let layout = Layout::new(&network);
		let hover = hover_logger(Rc::downgrade(&state_init));
		web.with(|g| {
			if let Some(swatches) = &palette {
				g.set_palette(Palette::from_swatches(swatches.iter().map(String::as_str)));
			}
			g.on(PointerEventKind::MouseMove, hover);
			g.set_data(network).play();
		});
		*state_init.borrow_mut() = Some(ViewState {
			web,
			layout,
			drag: None,
			pan: None,
		});

		if fullscreen && resize_cb_init.borrow().is_none() {
			let state_resize = state_init.clone();
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				if let Some(ref view) = *state_resize.borrow() {
					view.web.with(|g| {
						g.resize(Some(nw), Some(nh));
					});
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		if step_init.borrow().is_some() {
			return;
		}
		let (state_step, step_inner) = (state_init.clone(), step_init.clone());
		*step_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut view) = *state_step.borrow_mut() {
				let ViewState { web, layout, .. } = view;
				web.with(|g| {
					let moved = layout.step(0.016, g.data_mut());
					if !moved.is_empty() {
						g.update_indices(EntityClass::Nodes, &moved);
					}
				});
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), step_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *step_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(at) = offset(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut view) = *state_md.borrow_mut() {
			let (node, translate) = view.web.with(|g| (g.get_node_id_at(at), g.translate()));
			match node {
				Some(index) => view.drag = Some(index),
				None => {
					view.pan = Some(Pan {
						start: at,
						translate_start: translate,
					})
				}
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(at) = offset(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut view) = *state_mm.borrow_mut() {
			if let Some(index) = view.drag {
				let Point { x, y } = view.web.with(|g| g.get_data_position(at));
				view.layout.pin(index, x, y);
			} else if let Some(pan) = &view.pan {
				let translate = [
					pan.translate_start[0] + (at.x - pan.start.x),
					pan.translate_start[1] + (at.y - pan.start.y),
				];
				view.web.with(|g| {
					g.set_translate(translate);
				});
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut view) = *state_mu.borrow_mut() {
			view.drag = None;
			view.pan = None;
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut view) = *state_ml.borrow_mut() {
			if let Some(index) = view.drag.take() {
				view.layout.release(index);
			}
			view.pan = None;
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(at) = offset(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref view) = *state_wh.borrow() {
			view.web.with(|g| {
				let k = g.scale().x;
				let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
				let new_k = (k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
				let ratio = new_k / k;
				let [tx, ty] = g.translate();
				g.set_scale(new_k)
					.set_translate([at.x - (at.x - tx) * ratio, at.y - (at.y - ty) * ratio]);
			});
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="network-view-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
