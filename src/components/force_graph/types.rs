use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw graph record as delivered by the data layer.
///
/// Records are loosely shaped JSON objects. A record carrying non-null
/// `source` and `target` keys is an edge, anything else is a node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphElement(pub Map<String, Value>);

impl GraphElement {
	/// Wrap a JSON value; non-object values become an empty record.
	pub fn from_value(value: Value) -> Self {
		match value {
			Value::Object(map) => Self(map),
			_ => Self::default(),
		}
	}

	/// Value under `key`, treating JSON null as absent.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key).filter(|v| !v.is_null())
	}

	/// First non-null value among `keys`, in order.
	pub fn first_of<S: AsRef<str>>(&self, keys: &[S]) -> Option<&Value> {
		keys.iter().find_map(|k| self.get(k.as_ref()))
	}
}

impl From<Value> for GraphElement {
	fn from(value: Value) -> Self {
		Self::from_value(value)
	}
}

/// A 2D point; which space it lives in depends on the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downward.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Squared euclidean distance.
	pub fn distance_sq(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		dx * dx + dy * dy
	}

	/// Halfway between `self` and `other`.
	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}
}

/// Logical rectangle every node position is clamped into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Top-left corner.
	pub min: Point,
	/// Bottom-right corner.
	pub max: Point,
}

impl Bounds {
	/// Layout-space bounds for a `width` x `height` area, inset by `padding`.
	pub fn from_size(width: f64, height: f64, padding: f64) -> Self {
		let pad_x = padding.min(width / 2.0);
		let pad_y = padding.min(height / 2.0);
		Self {
			min: Point::new(pad_x, pad_y),
			max: Point::new(width - pad_x, height - pad_y),
		}
	}

	/// Bounds of `width` x `height` centred on `center`, inset by `padding`.
	pub fn around(center: Point, width: f64, height: f64, padding: f64) -> Self {
		let b = Self::from_size(width, height, padding);
		let (ox, oy) = (center.x - width / 2.0, center.y - height / 2.0);
		Self {
			min: Point::new(b.min.x + ox, b.min.y + oy),
			max: Point::new(b.max.x + ox, b.max.y + oy),
		}
	}

	/// Nearest point inside the bounds.
	pub fn clamp(&self, p: Point) -> Point {
		Point::new(
			p.x.clamp(self.min.x, self.max.x),
			p.y.clamp(self.min.y, self.max.y),
		)
	}

	/// Inclusive containment test.
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
	}

	/// Centre of the rectangle.
	pub fn center(&self) -> Point {
		self.min.midpoint(self.max)
	}
}

/// Adapted node, the unit the layout, hit-test and renderer work on.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewNode {
	/// Unique node id.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Size tier in `1..=5`; drives radius and font weight.
	pub tier: u8,
	/// Fill colour as a CSS colour string.
	pub color: String,
	/// Logical x position.
	pub x: f64,
	/// Logical y position.
	pub y: f64,
	/// Simulation velocity along x.
	pub vx: f64,
	/// Simulation velocity along y.
	pub vy: f64,
	/// Position fixed by the user. Overrides the simulation while set.
	pub pinned: Option<Point>,
}

impl ViewNode {
	/// Unplaced node; `tier` is clamped into `1..=5`.
	pub fn new(
		id: impl Into<String>,
		label: impl Into<String>,
		tier: u8,
		color: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			tier: tier.clamp(1, 5),
			color: color.into(),
			x: 0.0,
			y: 0.0,
			vx: 0.0,
			vy: 0.0,
			pinned: None,
		}
	}

	/// Current logical position.
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}

	/// Move without touching velocity or pin.
	pub fn set_position(&mut self, p: Point) {
		self.x = p.x;
		self.y = p.y;
	}

	/// Fix the node at `p` against the simulation.
	pub fn pin(&mut self, p: Point) {
		self.set_position(p);
		self.vx = 0.0;
		self.vy = 0.0;
		self.pinned = Some(p);
	}
}

/// Adapted edge before id de-duplication, endpoints still as ids.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkSpec {
	pub id: String,
	pub label: String,
	pub source: String,
	pub target: String,
}

/// Rendered edge. Endpoints index into the view-model node array, so they
/// always observe live node positions.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewLink {
	/// Unique edge id.
	pub id: String,
	/// Edge label; may be empty.
	pub label: String,
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
}

impl ViewLink {
	/// True if `node` is either endpoint.
	pub fn touches(&self, node: usize) -> bool {
		self.source == node || self.target == node
	}
}

/// Output of the element adapter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdaptedGraph {
	pub nodes: Vec<ViewNode>,
	pub links: Vec<LinkSpec>,
}

/// Pan offset and zoom scale shared by the whole canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal pan in surface pixels.
	pub x: f64,
	/// Vertical pan in surface pixels.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Surface pixels to logical coordinates.
	pub fn screen_to_graph(&self, p: Point) -> Point {
		Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	/// Logical coordinates to surface pixels.
	pub fn graph_to_screen(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Zoom to `k` (clamped to `[min, max]`) keeping the graph point under
	/// `anchor` fixed on screen.
	pub fn zoom_about(&self, anchor: Point, k: f64, min: f64, max: f64) -> Self {
		let k = k.clamp(min, max);
		let g = self.screen_to_graph(anchor);
		Self {
			x: anchor.x - g.x * k,
			y: anchor.y - g.y * k,
			k,
		}
	}

	/// Transform placing graph point `g` at screen point `screen`.
	pub fn centered_on(g: Point, screen: Point, k: f64) -> Self {
		Self {
			x: screen.x - g.x * k,
			y: screen.y - g.y * k,
			k,
		}
	}
}

/// Click events surfaced to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphEvent {
	/// A node was clicked or tapped; carries its id.
	NodeClick(String),
	/// An edge was clicked or tapped; carries its id.
	EdgeClick(String),
}
