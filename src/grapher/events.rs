//! Pointer event handlers, called with graph coordinates attached.

use std::collections::HashMap;
use std::rc::Rc;

use super::transform::Point;

/// Pointer events forwarded from the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
	/// `mousedown`
	MouseDown,
	/// `mouseover`
	MouseOver,
	/// `mouseout`
	MouseOut,
	/// `mousemove`
	MouseMove,
	/// `mouseup`
	MouseUp,
}

impl PointerEventKind {
	/// Every forwarded kind.
	pub const ALL: [Self; 5] = [
		Self::MouseDown,
		Self::MouseOver,
		Self::MouseOut,
		Self::MouseMove,
		Self::MouseUp,
	];

	/// DOM event name.
	pub const fn dom_name(self) -> &'static str {
		match self {
			Self::MouseDown => "mousedown",
			Self::MouseOver => "mouseover",
			Self::MouseOut => "mouseout",
			Self::MouseMove => "mousemove",
			Self::MouseUp => "mouseup",
		}
	}
}

/// What a handler receives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphEvent {
	/// Which event fired.
	pub kind: PointerEventKind,
	/// Pointer position relative to the canvas, CSS pixels.
	pub offset: Point,
	/// The same position in data space.
	pub data: Point,
}

/// A registered handler.
pub type Handler = Rc<dyn Fn(&GraphEvent)>;

/// Token returned by registration, used to remove one handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Handlers grouped by event kind, in registration order.
#[derive(Default)]
pub struct EventHandlers {
	next_id: u64,
	handlers: HashMap<PointerEventKind, Vec<(HandlerId, Handler)>>,
}

impl EventHandlers {
	/// Register `handler` for `kind`.
	pub fn on(&mut self, kind: PointerEventKind, handler: Handler) -> HandlerId {
		let id = HandlerId(self.next_id);
		self.next_id += 1;
		self.handlers.entry(kind).or_default().push((id, handler));
		id
	}

	/// Remove one handler, or all handlers of `kind` when `id` is `None`.
	pub fn off(&mut self, kind: PointerEventKind, id: Option<HandlerId>) {
		match id {
			Some(id) => {
				if let Some(list) = self.handlers.get_mut(&kind) {
					list.retain(|(existing, _)| *existing != id);
				}
			}
			None => {
				self.handlers.remove(&kind);
			}
		}
	}

	/// Handlers for `kind`, cloned so they can run without borrowing the registry.
	pub fn handlers(&self, kind: PointerEventKind) -> Vec<Handler> {
		self.handlers
			.get(&kind)
			.map(|list| list.iter().map(|(_, handler)| Rc::clone(handler)).collect())
			.unwrap_or_default()
	}

	/// Number of handlers registered for `kind`.
	pub fn count(&self, kind: PointerEventKind) -> usize {
		self.handlers.get(&kind).map_or(0, Vec::len)
	}
}

impl std::fmt::Debug for EventHandlers {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let counts: HashMap<_, _> = self
			.handlers
			.iter()
			.map(|(kind, list)| (kind, list.len()))
			.collect();
		f.debug_struct("EventHandlers").field("handlers", &counts).finish()
	}
}
