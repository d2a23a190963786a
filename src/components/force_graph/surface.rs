//! Drawing-surface abstraction and its HTML canvas implementation.

use log::warn;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::types::{Point, ViewTransform};

/// Failures talking to the browser canvas.
#[derive(Debug, Error)]
pub enum CanvasError {
	/// Not running in a window, e.g. inside a worker.
	#[error("no browser window available")]
	NoWindow,
	/// `getContext("2d")` returned nothing usable.
	#[error("canvas has no 2d rendering context")]
	NoContext,
	/// A DOM call threw.
	#[error("canvas call failed: {0}")]
	Js(String),
}

impl From<JsValue> for CanvasError {
	fn from(value: JsValue) -> Self {
		CanvasError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}

/// Horizontal anchoring of text relative to its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
	/// Text starts at the position.
	Left,
	/// Text is centred on the position.
	Center,
	/// Text ends at the position.
	Right,
}

impl TextAlign {
	fn as_str(self) -> &'static str {
		match self {
			TextAlign::Left => "left",
			TextAlign::Center => "center",
			TextAlign::Right => "right",
		}
	}
}

/// How a label is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
	/// CSS font shorthand, e.g. `bold 12px sans-serif`.
	pub font: String,
	/// Fill colour.
	pub color: String,
	/// Anchoring.
	pub align: TextAlign,
}

/// Primitive drawing operations the renderer needs. Coordinates passed
/// after [`Surface::begin_frame`] are logical; the surface applies the
/// device-pixel ratio and the pan/zoom transform.
pub trait Surface {
	/// Clear to `background` and install `transform` for the calls that follow.
	fn begin_frame(
		&mut self,
		size: (f64, f64),
		device_pixel_ratio: f64,
		background: &str,
		transform: &ViewTransform,
	);
	/// Undo the frame transform.
	fn end_frame(&mut self);
	/// Straight segment.
	fn line(&mut self, from: Point, to: Point, color: &str, width: f64);
	/// Filled circle, optionally outlined with `(colour, width)`.
	fn circle(&mut self, center: Point, radius: f64, fill: &str, stroke: Option<(&str, f64)>);
	/// Single line of text, vertically centred on `at`.
	fn text(&mut self, text: &str, at: Point, style: &TextStyle);
	/// Width of `text` in `font`, in the same units as the font size.
	fn measure_text(&mut self, text: &str, font: &str) -> f64;
}

/// [`Surface`] drawing into an HTML canvas 2d context.
pub struct CanvasSurface {
	ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
	/// Acquire the canvas's 2d context.
	pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, CanvasError> {
		let ctx = canvas
			.get_context("2d")?
			.ok_or(CanvasError::NoContext)?
			.dyn_into::<CanvasRenderingContext2d>()
			.map_err(|_| CanvasError::NoContext)?;
		Ok(Self { ctx })
	}
}

impl Surface for CanvasSurface {
	fn begin_frame(
		&mut self,
		size: (f64, f64),
		device_pixel_ratio: f64,
		background: &str,
		transform: &ViewTransform,
	) {
		let ctx = &self.ctx;
		let dpr = device_pixel_ratio;
		if let Err(err) = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0) {
			warn!("{}", CanvasError::from(err));
		}
		ctx.set_fill_style_str(background);
		ctx.fill_rect(0.0, 0.0, size.0, size.1);
		ctx.save();
		let _ = ctx.translate(transform.x, transform.y);
		let _ = ctx.scale(transform.k, transform.k);
		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_line_cap("round");
		ctx.set_text_baseline("middle");
	}

	fn end_frame(&mut self) {
		self.ctx.restore();
	}

	fn line(&mut self, from: Point, to: Point, color: &str, width: f64) {
		let ctx = &self.ctx;
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		ctx.line_to(to.x, to.y);
		ctx.stroke();
	}

	fn circle(&mut self, center: Point, radius: f64, fill: &str, stroke: Option<(&str, f64)>) {
		let ctx = &self.ctx;
		ctx.begin_path();
		let _ = ctx.arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU);
		ctx.set_fill_style_str(fill);
		ctx.fill();
		if let Some((color, width)) = stroke {
			ctx.set_stroke_style_str(color);
			ctx.set_line_width(width);
			ctx.stroke();
		}
	}

	fn text(&mut self, text: &str, at: Point, style: &TextStyle) {
		let ctx = &self.ctx;
		ctx.set_font(&style.font);
		ctx.set_fill_style_str(&style.color);
		ctx.set_text_align(style.align.as_str());
		let _ = ctx.fill_text(text, at.x, at.y);
	}

	fn measure_text(&mut self, text: &str, font: &str) -> f64 {
		self.ctx.set_font(font);
		self.ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
	}
}
