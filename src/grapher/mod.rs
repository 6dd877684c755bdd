//! Incremental network renderer.
//!
//! A [`Grapher`] binds a [`Network`] of caller-positioned nodes and links,
//! tracks which entities changed since the last frame, recomputes only those,
//! and draws the whole scene through WebGL or, when unavailable, the 2D canvas
//! context. [`WebGrapher`] wires one to a `<canvas>` element and the browser
//! frame loop.

pub mod color;
mod config;
mod entity;
mod error;
mod events;
mod network;
mod palette;
mod queue;
pub mod renderer;
mod scene;
mod scheduler;
mod transform;
mod web;

pub use color::{ColorValue, PackedColor, Rgba};
pub use config::{DEFAULT_COLOR, DEFAULT_LINE_WIDTH, GrapherConfig};
pub use entity::{Link, Node};
pub use error::{GrapherError, Result};
pub use events::{EventHandlers, GraphEvent, Handler, HandlerId, PointerEventKind};
pub use network::{LinkData, Network, NodeData};
pub use palette::Palette;
pub use queue::{EntityClass, Pending, UpdateQueue, find_links};
pub use renderer::{BackendKind, Renderer, RendererBackend, Scene, ShaderSources};
pub use scene::{ContextState, Grapher};
pub use scheduler::{FrameId, FrameScheduler, ManualScheduler, RafScheduler};
pub use transform::{Point, Scale, Transform, Viewport};
pub use web::WebGrapher;
