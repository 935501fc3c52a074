//! World ↔ screen mapping.
//!
//! Pure value math so it can be tested without a canvas or event loop.

use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;

/// Per wheel notch, independent of the delta magnitude.
pub const WHEEL_ZOOM_IN: f64 = 1.02;
pub const WHEEL_ZOOM_OUT: f64 = 0.98;

pub const BUTTON_ZOOM_IN: f64 = 1.2;
pub const BUTTON_ZOOM_OUT: f64 = 0.8;

/// Labels are drawn only above this scale.
pub const LABEL_MIN_SCALE: f64 = 0.6;

/// Pointer travel (screen px) beyond which a press is a drag, not a click.
pub const CLICK_SLOP: f64 = 3.0;

/// Pan offset plus uniform scale; `scale` always lies in
/// `[MIN_SCALE, MAX_SCALE]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTransform")]
pub struct ViewTransform {
	pub pan_x: f64,
	pub pan_y: f64,
	scale: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			pan_x: 0.0,
			pan_y: 0.0,
			scale: 1.0,
		}
	}
}

#[derive(Deserialize)]
struct RawTransform {
	pan_x: f64,
	pan_y: f64,
	scale: f64,
}

impl From<RawTransform> for ViewTransform {
	fn from(raw: RawTransform) -> Self {
		Self::new(raw.pan_x, raw.pan_y, raw.scale)
	}
}

impl ViewTransform {
	pub fn new(pan_x: f64, pan_y: f64, scale: f64) -> Self {
		Self {
			pan_x,
			pan_y,
			scale: scale.clamp(MIN_SCALE, MAX_SCALE),
		}
	}

	pub fn scale(&self) -> f64 {
		self.scale
	}

	/// `screen = center + world * scale + pan`
	pub fn to_screen(&self, center: (f64, f64), wx: f64, wy: f64) -> (f64, f64) {
		(
			center.0 + wx * self.scale + self.pan_x,
			center.1 + wy * self.scale + self.pan_y,
		)
	}

	/// `world = (screen - center - pan) / scale`
	pub fn to_world(&self, center: (f64, f64), sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - center.0 - self.pan_x) / self.scale,
			(sy - center.1 - self.pan_y) / self.scale,
		)
	}

	pub fn zoom_by(&mut self, factor: f64) {
		self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
	}

	/// One wheel notch; scrolling down zooms out.
	pub fn wheel(&mut self, delta_y: f64) {
		self.zoom_by(if delta_y > 0.0 {
			WHEEL_ZOOM_OUT
		} else {
			WHEEL_ZOOM_IN
		});
	}

	pub fn zoom_in(&mut self) {
		self.zoom_by(BUTTON_ZOOM_IN);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_by(BUTTON_ZOOM_OUT);
	}

	pub fn reset(&mut self) {
		*self = Self::default();
	}

	pub fn show_labels(&self) -> bool {
		self.scale > LABEL_MIN_SCALE
	}
}

/// A background drag in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanGesture {
	anchor_x: f64,
	anchor_y: f64,
	press_x: f64,
	press_y: f64,
	travelled: f64,
}

impl PanGesture {
	/// Remember where the pointer went down relative to the current pan.
	pub fn begin(view: &ViewTransform, px: f64, py: f64) -> Self {
		Self {
			anchor_x: px - view.pan_x,
			anchor_y: py - view.pan_y,
			press_x: px,
			press_y: py,
			travelled: 0.0,
		}
	}

	/// Move the pan so the anchor stays under the pointer.
	pub fn drag_to(&mut self, view: &mut ViewTransform, px: f64, py: f64) {
		view.pan_x = px - self.anchor_x;
		view.pan_y = py - self.anchor_y;
		let (dx, dy) = (px - self.press_x, py - self.press_y);
		self.travelled = self.travelled.max((dx * dx + dy * dy).sqrt());
	}

	pub fn is_drag(&self) -> bool {
		self.travelled > CLICK_SLOP
	}
}
