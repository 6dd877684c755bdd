//! Canvas sizing shared by both backends.

use log::warn;
use web_sys::HtmlCanvasElement;

/// The drawable plus its CSS size and device pixel ratio.
///
/// The backing store is kept at `css size * resolution` device pixels.
#[derive(Debug)]
pub(crate) struct Surface {
	pub(crate) canvas: HtmlCanvasElement,
	width: Option<f64>,
	height: Option<f64>,
	pub(crate) resolution: f64,
}

impl Surface {
	pub(crate) fn new(canvas: HtmlCanvasElement, resolution: f64) -> Self {
		Self {
			canvas,
			width: None,
			height: None,
			resolution,
		}
	}

	/// Pin the CSS size on the given axes, then refit the backing store.
	pub(crate) fn resize(&mut self, width: Option<f64>, height: Option<f64>) {
		let style = self.canvas.style();
		if let Some(width) = width {
			self.width = Some(width);
			if let Err(err) = style.set_property("width", &format!("{width}px")) {
				warn!("failed to set canvas width: {err:?}");
			}
		}
		if let Some(height) = height {
			self.height = Some(height);
			if let Err(err) = style.set_property("height", &format!("{height}px")) {
				warn!("failed to set canvas height: {err:?}");
			}
		}
		self.fit();
	}

	/// CSS size; falls back to layout size, then to the backing store size.
	pub(crate) fn size(&self) -> (f64, f64) {
		let fallback = |client: i32, pixels: u32| {
			if client > 0 {
				f64::from(client)
			} else {
				f64::from(pixels) / self.resolution
			}
		};
		(
			self.width
				.unwrap_or_else(|| fallback(self.canvas.client_width(), self.canvas.width())),
			self.height
				.unwrap_or_else(|| fallback(self.canvas.client_height(), self.canvas.height())),
		)
	}

	/// Device pixel size of the backing store.
	pub(crate) fn pixels(&self) -> (u32, u32) {
		(self.canvas.width(), self.canvas.height())
	}

	/// Match the backing store to the CSS size; only touches it on change.
	pub(crate) fn fit(&self) {
		let (width, height) = self.size();
		let (display_width, display_height) = (
			backing_size(width, self.resolution),
			backing_size(height, self.resolution),
		);
		if self.canvas.width() != display_width {
			self.canvas.set_width(display_width);
		}
		if self.canvas.height() != display_height {
			self.canvas.set_height(display_height);
		}
	}
}

/// Device pixels for a CSS length, rounded so a size read back from the
/// backing store maps onto the same store.
pub(crate) fn backing_size(css: f64, resolution: f64) -> u32 {
	(css * resolution).round() as u32
}
