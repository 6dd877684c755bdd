//! Browser tests for the canvas glue.
//!
//! Run with: wasm-pack test --headless --firefox
//!
//! WebGL cases return early when the browser hands out no WebGL context.

#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use js_sys::Promise;
use network_grapher::grapher::{
	BackendKind, ContextState, GraphEvent, GrapherConfig, LinkData, Network, NodeData,
	PointerEventKind, Renderer, RendererBackend, ShaderSources, WebGrapher,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{
	CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, WebGlRenderingContext as Gl,
	WebglLoseContext,
};

wasm_bindgen_test_configure!(run_in_browser);

const SIDE: f64 = 41.0;

fn network() -> Network {
	Network {
		nodes: vec![
			NodeData::new(20.0, 20.0, 5.0).with_color("#ff0000"),
			NodeData::new(80.0, 40.0, 5.0),
		],
		links: vec![LinkData::new(0, 1)],
	}
}

/// A red link crossing the whole surface under a blue node in the middle.
fn crossing() -> Network {
	Network {
		nodes: vec![
			NodeData::new(20.5, 20.5, 8.0).with_color("#0000ff"),
			NodeData::new(0.0, 20.5, 1.0).with_color("#0000ff"),
			NodeData::new(SIDE, 20.5, 1.0).with_color("#0000ff"),
		],
		links: vec![LinkData::new(1, 2).with_color("#ff0000")],
	}
}

fn sized(force_canvas: bool) -> GrapherConfig {
	GrapherConfig {
		force_canvas,
		resolution: Some(1.0),
		width: Some(SIDE),
		height: Some(SIDE),
		..GrapherConfig::default()
	}
}

fn fresh_canvas() -> HtmlCanvasElement {
	web_sys::window()
		.and_then(|w| w.document())
		.expect("document")
		.create_element("canvas")
		.expect("element")
		.dyn_into()
		.expect("canvas")
}

fn gl(canvas: &HtmlCanvasElement) -> Gl {
	["webgl", "experimental-webgl"]
		.into_iter()
		.find_map(|id| canvas.get_context(id).ok().flatten())
		.expect("webgl context")
		.dyn_into()
		.expect("webgl rendering context")
}

/// Resolves on the next `name` event, after the grapher's own listener ran.
fn next_event(canvas: &HtmlCanvasElement, name: &str) -> JsFuture {
	let promise = Promise::new(&mut |resolve, _| {
		canvas
			.add_event_listener_with_callback(name, &resolve)
			.expect("listener registers");
	});
	JsFuture::from(promise)
}

fn is_blue(pixel: &[u8]) -> bool {
	pixel[2] > 200 && pixel[0] < 60
}

fn is_red(pixel: &[u8]) -> bool {
	pixel[0] > 128 && pixel[0] > pixel[2]
}

#[wasm_bindgen_test]
fn canvas_backend_sizes_the_backing_store() {
	let config = GrapherConfig {
		force_canvas: true,
		resolution: Some(2.0),
		width: Some(120.0),
		height: Some(60.0),
		..GrapherConfig::default()
	};
	let web = WebGrapher::new(None, config).expect("grapher attaches");
	web.with(|g| {
		assert_eq!(g.backend().kind(), BackendKind::Canvas);
		g.set_data(network()).render();
		assert_eq!((g.width(), g.height()), (120.0, 60.0));
	});
	assert_eq!((web.canvas().width(), web.canvas().height()), (240, 120));
}

#[wasm_bindgen_test]
fn default_backend_draws_either_way() {
	let web = WebGrapher::new(None, GrapherConfig::default()).expect("grapher attaches");
	web.with(|g| {
		g.resize(Some(100.0), Some(100.0)).set_data(network()).render();
		assert!(g.is_rendered());
		assert_eq!(g.nodes().len(), 2);
	});
}

#[wasm_bindgen_test]
fn dom_events_reach_handlers() {
	let web = WebGrapher::new(None, GrapherConfig::default()).expect("grapher attaches");
	let seen = Rc::new(Cell::new(0));
	let counter = Rc::clone(&seen);
	let id = web.with(|g| {
		g.on(PointerEventKind::MouseDown, move |event: &GraphEvent| {
			assert_eq!(event.kind, PointerEventKind::MouseDown);
			counter.set(counter.get() + 1);
		})
	});

	let event = MouseEvent::new("mousedown").expect("event builds");
	web.canvas().dispatch_event(&event).expect("dispatches");
	assert_eq!(seen.get(), 1);

	web.with(|g| {
		g.off(PointerEventKind::MouseDown, Some(id));
	});
	web.canvas().dispatch_event(&event).expect("dispatches");
	assert_eq!(seen.get(), 1);
}

#[wasm_bindgen_test]
fn forced_canvas_skips_webgl() {
	let renderer = Renderer::new(&fresh_canvas(), &sized(true)).expect("2d context");
	assert_eq!(renderer.kind(), BackendKind::Canvas);
}

#[wasm_bindgen_test]
fn canvas_bound_to_2d_falls_back() {
	let canvas = fresh_canvas();
	canvas.get_context("2d").expect("query").expect("2d context");
	let renderer = Renderer::new(&canvas, &sized(false)).expect("2d context is reused");
	assert_eq!(renderer.kind(), BackendKind::Canvas);
}

#[wasm_bindgen_test]
fn broken_shaders_fail_once_webgl_is_bound() {
	let default = Renderer::new(&fresh_canvas(), &sized(false)).expect("some backend");
	if default.kind() != BackendKind::WebGl {
		return;
	}
	let broken = ShaderSources {
		vertex: "not glsl".to_owned(),
		fragment: "not glsl either".to_owned(),
	};
	let config = GrapherConfig {
		node_shaders: Some(broken),
		..sized(false)
	};
	assert!(Renderer::new(&fresh_canvas(), &config).is_err());
}

#[wasm_bindgen_test]
fn canvas_draws_nodes_over_links() {
	let web = WebGrapher::new(None, sized(true)).expect("grapher attaches");
	web.with(|g| {
		g.set_data(crossing()).render();
	});
	let context: CanvasRenderingContext2d = web
		.canvas()
		.get_context("2d")
		.expect("query")
		.expect("2d context")
		.dyn_into()
		.expect("2d rendering context");
	let pixel = |x: f64, y: f64| {
		context
			.get_image_data(x, y, 1.0, 1.0)
			.expect("readback")
			.data()
			.0
	};
	assert!(is_blue(&pixel(20.0, 20.0)));
	assert!(is_red(&pixel(32.0, 20.0)));
}

#[wasm_bindgen_test]
fn webgl_draws_nodes_over_links() {
	let web = WebGrapher::new(None, sized(false)).expect("grapher attaches");
	if web.with(|g| g.backend().kind()) != BackendKind::WebGl {
		return;
	}
	web.with(|g| {
		g.set_data(crossing()).render();
	});
	let gl = gl(web.canvas());
	let height = web.canvas().height() as i32;
	let pixel = |x: i32, y: i32| {
		let mut out = [0u8; 4];
		gl.read_pixels_with_opt_u8_array(
			x,
			height - 1 - y,
			1,
			1,
			Gl::RGBA,
			Gl::UNSIGNED_BYTE,
			Some(&mut out[..]),
		)
		.expect("readback");
		out
	};
	assert!(is_blue(&pixel(20, 20)));
	assert!(is_red(&pixel(32, 20)));
}

#[wasm_bindgen_test]
async fn webgl_context_survives_loss_and_restore() {
	let web = WebGrapher::new(None, sized(false)).expect("grapher attaches");
	if web.with(|g| g.backend().kind()) != BackendKind::WebGl {
		return;
	}
	web.with(|g| {
		g.set_data(crossing()).play();
	});
	let extension: WebglLoseContext = gl(web.canvas())
		.get_extension("WEBGL_lose_context")
		.expect("query")
		.expect("lose context extension")
		.unchecked_into();

	let lost = next_event(web.canvas(), "webglcontextlost");
	extension.lose_context();
	lost.await.expect("lost event fires");
	web.with(|g| {
		assert_eq!(g.context_state(), ContextState::Lost);
		assert!(!g.is_playing());
		g.update().render();
	});

	let restored = next_event(web.canvas(), "webglcontextrestored");
	extension.restore_context();
	restored.await.expect("restored event fires");
	web.with(|g| {
		assert_eq!(g.context_state(), ContextState::Active);
		assert!(g.is_playing());
	});
}

#[wasm_bindgen_test]
fn context_event_while_busy_is_ignored() {
	let web = WebGrapher::new(None, sized(false)).expect("grapher attaches");
	if web.with(|g| g.backend().kind()) != BackendKind::WebGl {
		return;
	}
	web.with(|g| {
		let event = Event::new("webglcontextlost").expect("event builds");
		web.canvas().dispatch_event(&event).expect("dispatches");
		assert_eq!(g.context_state(), ContextState::Active);
	});
	assert_eq!(web.with(|g| g.context_state()), ContextState::Active);
}
