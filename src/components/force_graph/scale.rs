//! Coordinate mapping between the host page and the drawing surface.
//!
//! Three spaces are involved: client (page event coordinates), surface
//! (canvas pixels at device-pixel ratio 1) and logical (graph layout space,
//! `logical = (surface - pan) / zoom`).

use super::types::Point;

/// Drawing-surface geometry as last observed in the page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceMetrics {
	/// Left edge of the canvas element's bounding client rect.
	pub rect_left: f64,
	/// Top edge of the bounding client rect.
	pub rect_top: f64,
	/// Displayed width in CSS pixels.
	pub rect_width: f64,
	/// Displayed height in CSS pixels.
	pub rect_height: f64,
	/// Backing store width in device pixels.
	pub backing_width: f64,
	/// Backing store height in device pixels.
	pub backing_height: f64,
	/// Device pixels per CSS pixel.
	pub device_pixel_ratio: f64,
	/// Visual viewport offset where it diverges from the layout viewport
	/// (pinch-zoomed mobile browsers). Zero elsewhere.
	pub viewport_offset: Point,
}

impl Default for SurfaceMetrics {
	fn default() -> Self {
		Self {
			rect_left: 0.0,
			rect_top: 0.0,
			rect_width: 0.0,
			rect_height: 0.0,
			backing_width: 0.0,
			backing_height: 0.0,
			device_pixel_ratio: 1.0,
			viewport_offset: Point::default(),
		}
	}
}

fn ratio(surface: f64, rect: f64) -> f64 {
	if rect > 0.0 && surface > 0.0 { surface / rect } else { 1.0 }
}

impl SurfaceMetrics {
	/// Metrics for a canvas laid out at `width` x `height` CSS pixels at the
	/// page origin.
	pub fn for_size(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
		let dpr = sanitize_dpr(device_pixel_ratio);
		Self {
			rect_width: width,
			rect_height: height,
			backing_width: (width * dpr).round(),
			backing_height: (height * dpr).round(),
			device_pixel_ratio: dpr,
			..Self::default()
		}
	}

	/// Surface size in pixels at ratio 1.
	pub fn surface_size(&self) -> (f64, f64) {
		let dpr = sanitize_dpr(self.device_pixel_ratio);
		(self.backing_width / dpr, self.backing_height / dpr)
	}

	/// Map page event coordinates onto the surface, undoing any CSS scaling
	/// of the element.
	pub fn client_to_surface(&self, client: Point) -> Point {
		let (sw, sh) = self.surface_size();
		Point::new(
			(client.x + self.viewport_offset.x - self.rect_left) * ratio(sw, self.rect_width),
			(client.y + self.viewport_offset.y - self.rect_top) * ratio(sh, self.rect_height),
		)
	}
}

/// Non-finite or non-positive ratios count as 1.
pub fn sanitize_dpr(dpr: f64) -> f64 {
	if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 }
}
