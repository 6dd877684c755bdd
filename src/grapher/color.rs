//! Packed color parsing, formatting and blending.
//!
//! Colors travel through the engine as a single `u32` laid out as
//! `0xAARRGGBB`. Parsing never fails loudly: anything that is not a color
//! yields `None` and callers substitute their foreground color.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A color in `0xAARRGGBB` layout.
pub type PackedColor = u32;

const OPAQUE: PackedColor = 0xff00_0000;

/// A color as it appears in caller data: a CSS-like string or a packed integer.
///
/// Either form may also be a palette key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
	/// Packed `0xAARRGGBB` integer, passed through untouched.
	Packed(PackedColor),
	/// `#rgb`, `#rrggbb`, `#aarrggbb`, `rgb(..)`, `rgba(..)` or a palette key.
	Text(String),
}

impl ColorValue {
	/// The key under which a palette may hold this value.
	pub fn key(&self) -> Cow<'_, str> {
		match self {
			Self::Packed(value) => Cow::Owned(value.to_string()),
			Self::Text(text) => Cow::Borrowed(text),
		}
	}
}

impl From<PackedColor> for ColorValue {
	fn from(value: PackedColor) -> Self {
		Self::Packed(value)
	}
}

impl From<&str> for ColorValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}

impl From<String> for ColorValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

/// Unpacked channels, each 0-255.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha, 255 is opaque.
	pub a: u8,
}

impl Rgba {
	/// Split a packed color into channels.
	pub const fn from_packed(color: PackedColor) -> Self {
		Self {
			a: (color >> 24) as u8,
			r: (color >> 16) as u8,
			g: (color >> 8) as u8,
			b: color as u8,
		}
	}

	/// Pack channels back into `0xAARRGGBB`.
	pub const fn pack(self) -> PackedColor {
		((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
	}

	fn channels(self) -> [u8; 4] {
		[self.r, self.g, self.b, self.a]
	}

	fn from_channels([r, g, b, a]: [u8; 4]) -> Self {
		Self { r, g, b, a }
	}
}

/// Parse caller color data into a packed color.
pub fn parse(input: &ColorValue) -> Option<PackedColor> {
	match input {
		ColorValue::Packed(value) => Some(*value),
		ColorValue::Text(text) => parse_str(text),
	}
}

/// Parse a hex, `rgb()` or `rgba()` string. Whitespace is ignored.
pub fn parse_str(text: &str) -> Option<PackedColor> {
	let compact: String = text
		.chars()
		.filter(|c| !c.is_whitespace())
		.collect::<String>()
		.to_ascii_lowercase();

	if let Some(hex) = compact.strip_prefix('#') {
		parse_hex(hex)
	} else if let Some(body) = compact.strip_prefix("rgba(") {
		parse_rgba(body.strip_suffix(')')?)
	} else if let Some(body) = compact.strip_prefix("rgb(") {
		parse_rgb(body.strip_suffix(')')?)
	} else {
		None
	}
}

fn parse_hex(hex: &str) -> Option<PackedColor> {
	if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
		return None;
	}
	let value = u32::from_str_radix(hex, 16).ok()?;
	match hex.len() {
		3 => {
			let expand = |nibble: u32| (nibble & 0xf) * 0x11;
			Some(
				OPAQUE
					| (expand(value >> 8) << 16)
					| (expand(value >> 4) << 8)
					| expand(value),
			)
		}
		6 => Some(OPAQUE | value),
		8 => Some(value),
		_ => None,
	}
}

fn components<const N: usize>(body: &str) -> Option<[f64; N]> {
	let mut out = [0.0; N];
	let mut parts = body.split(',');
	for slot in &mut out {
		let value: f64 = parts.next()?.parse().ok()?;
		if !value.is_finite() {
			return None;
		}
		*slot = value;
	}
	match parts.next() {
		Some(_) => None,
		None => Some(out),
	}
}

fn parse_rgb(body: &str) -> Option<PackedColor> {
	let [r, g, b] = components::<3>(body)?;
	Some(Rgba::from_channels([channel(r), channel(g), channel(b), 0xff]).pack())
}

fn parse_rgba(body: &str) -> Option<PackedColor> {
	let [r, g, b, a] = components::<4>(body)?;
	// alpha at or below 1 is taken as normalized
	let alpha = if a <= 1.0 { (a * 255.0).round() } else { a };
	Some(Rgba::from_channels([channel(r), channel(g), channel(b), channel(alpha)]).pack())
}

fn channel(value: f64) -> u8 {
	// `as` saturates at the byte bounds and truncates toward zero
	value as u8
}

/// Blend two packed colors channel by channel.
///
/// `amount` of 0 yields `a`, 1 yields `b`. Values outside `[0, 1]`
/// extrapolate; the packed result saturates each channel at 0 or 255 and
/// truncates fractional channel values toward zero.
pub fn interpolate(a: PackedColor, b: PackedColor, amount: f64) -> PackedColor {
	let (from, to) = (Rgba::from_packed(a).channels(), Rgba::from_packed(b).channels());
	let mut out = [0u8; 4];
	for ((slot, ca), cb) in out.iter_mut().zip(from).zip(to) {
		let (ca, cb) = (f64::from(ca), f64::from(cb));
		*slot = channel(ca + (cb - ca) * amount);
	}
	Rgba::from_channels(out).pack()
}

/// Midpoint blend, the default used for link colors.
pub fn midpoint(a: PackedColor, b: PackedColor) -> PackedColor {
	interpolate(a, b, 0.5)
}

/// Unpack into channels.
pub const fn to_rgba(color: PackedColor) -> Rgba {
	Rgba::from_packed(color)
}

/// Render a packed color as a CSS `rgba()` string with normalized alpha.
pub fn to_rgba_string(color: PackedColor) -> String {
	let Rgba { r, g, b, a } = to_rgba(color);
	format!("rgba({r},{g},{b},{})", f64::from(a) / 255.0)
}
