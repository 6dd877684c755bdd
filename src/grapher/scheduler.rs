//! Host frame scheduling for the play/pause loop.

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

/// Handle of a requested frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(pub i32);

/// Something that can call back once on the next frame.
pub trait FrameScheduler {
	/// Ask for one callback. `None` means the request could not be made.
	fn request_frame(&mut self) -> Option<FrameId>;

	/// Withdraw a request that has not fired yet.
	fn cancel_frame(&mut self, id: FrameId);
}

/// `requestAnimationFrame` with a callback bound after construction.
pub struct RafScheduler {
	window: Window,
	callback: Option<Closure<dyn FnMut(f64)>>,
}

impl RafScheduler {
	/// A scheduler with no callback yet; requests fail until [`Self::bind`].
	pub fn new(window: Window) -> Self {
		Self {
			window,
			callback: None,
		}
	}

	/// Set the closure run on every frame.
	pub fn bind(&mut self, callback: Closure<dyn FnMut(f64)>) {
		self.callback = Some(callback);
	}
}

impl std::fmt::Debug for RafScheduler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RafScheduler")
			.field("bound", &self.callback.is_some())
			.finish()
	}
}

impl FrameScheduler for RafScheduler {
	fn request_frame(&mut self) -> Option<FrameId> {
		let Some(callback) = self.callback.as_ref() else {
			warn!("animation frame requested before a callback was bound");
			return None;
		};
		match self
			.window
			.request_animation_frame(callback.as_ref().unchecked_ref())
		{
			Ok(id) => Some(FrameId(id)),
			Err(err) => {
				warn!("requestAnimationFrame failed: {err:?}");
				None
			}
		}
	}

	fn cancel_frame(&mut self, id: FrameId) {
		if let Err(err) = self.window.cancel_animation_frame(id.0) {
			warn!("cancelAnimationFrame failed: {err:?}");
		}
	}
}

/// A scheduler for hosts that fire frames themselves, one at a time.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
	next: i32,
	pending: Option<FrameId>,
	requests: usize,
}

impl ManualScheduler {
	/// Nothing requested yet.
	pub fn new() -> Self {
		Self::default()
	}

	/// The outstanding request, if any.
	pub fn pending(&self) -> Option<FrameId> {
		self.pending
	}

	/// Consume the outstanding request; the caller then runs its frame.
	pub fn fire(&mut self) -> Option<FrameId> {
		self.pending.take()
	}

	/// Total requests made so far.
	pub fn requests(&self) -> usize {
		self.requests
	}
}

impl FrameScheduler for ManualScheduler {
	fn request_frame(&mut self) -> Option<FrameId> {
		self.next += 1;
		self.requests += 1;
		let id = FrameId(self.next);
		self.pending = Some(id);
		Some(id)
	}

	fn cancel_frame(&mut self, id: FrameId) {
		if self.pending == Some(id) {
			self.pending = None;
		}
	}
}
