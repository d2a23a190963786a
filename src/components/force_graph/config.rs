use serde::Deserialize;

/// Which [`LayoutStrategy`](super::layout::LayoutStrategy) settles a new graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
	/// Built-in alpha-cooled simulation.
	#[default]
	Force,
	/// Spring integrator from the `force_graph` crate.
	Spring,
}

/// Tunables for the graph view. Defaults reproduce the reference look and feel.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Smallest allowed zoom factor.
	pub zoom_min: f64,
	/// Largest allowed zoom factor.
	pub zoom_max: f64,
	/// Zoom multiplier per wheel notch.
	pub wheel_zoom_step: f64,
	/// Mouse movement (px) before a press turns into a drag or pan.
	pub drag_threshold: f64,
	/// Touch movement (px) before a touch turns into a pan instead of a tap.
	pub touch_pan_threshold: f64,
	/// Distance (px) from an edge segment that still counts as a hit.
	pub edge_hit_threshold: f64,
	/// Extra logical radius around nodes for hit-testing.
	pub node_hit_slop: f64,
	/// Incident edge labels are suppressed above this hovered-node degree.
	pub label_degree_cap: usize,
	/// Inactive node labels are truncated to this width (px).
	pub max_label_width: f64,
	/// Node radius for size tiers 1 to 5.
	pub tier_radius: [f64; 5],
	/// Strategy used to settle newly loaded data.
	pub layout: LayoutKind,
	/// Forces and cooling schedule for [`LayoutKind::Force`].
	pub simulation: SimulationConfig,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			zoom_min: 0.5,
			zoom_max: 1.5,
			wheel_zoom_step: 1.1,
			drag_threshold: 4.0,
			touch_pan_threshold: 10.0,
			edge_hit_threshold: 6.0,
			node_hit_slop: 2.0,
			label_degree_cap: 12,
			max_label_width: 120.0,
			tier_radius: [6.0, 8.0, 11.0, 14.0, 18.0],
			layout: LayoutKind::Force,
			simulation: SimulationConfig::default(),
		}
	}
}

impl GraphConfig {
	/// Radius of a node in size tier `tier`, clamped to 1..=5.
	pub fn radius(&self, tier: u8) -> f64 {
		let idx = usize::from(tier.clamp(1, 5)) - 1;
		self.tier_radius[idx]
	}

	/// Clamp `k` into the zoom range; NaN maps to the minimum.
	pub fn clamp_zoom(&self, k: f64) -> f64 {
		if k.is_nan() {
			return self.zoom_min;
		}
		k.clamp(self.zoom_min, self.zoom_max)
	}
}

/// Force simulation parameters, d3-style alpha cooling.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Settling stops once alpha drops below this.
	pub settle_alpha_min: f64,
	/// Interactive ticking stops (the layout freezes) below this.
	pub alpha_min: f64,
	/// Fraction of alpha lost per tick.
	pub alpha_decay: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// One-shot energy added when a drag starts. Kept just above
	/// `alpha_min` so neighbours shift by a pixel or two, not a re-layout.
	pub drag_alpha: f64,
	/// Rest length of a link.
	pub link_distance: f64,
	/// Many-body strength; negative repels.
	pub charge_strength: f64,
	/// Pull of every node toward the centre of the bounds.
	pub center_strength: f64,
	/// Gap kept between node circles by the collision force.
	pub collision_padding: f64,
	/// Hard cap on settle iterations.
	pub max_settle_ticks: usize,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			settle_alpha_min: 0.01,
			alpha_min: 0.001,
			alpha_decay: 0.0228,
			velocity_decay: 0.4,
			drag_alpha: 0.003,
			link_distance: 70.0,
			charge_strength: -220.0,
			center_strength: 0.05,
			collision_padding: 4.0,
			max_settle_ticks: 600,
		}
	}
}

/// Field names the adapter reads. For the key lists the first present,
/// non-null key wins.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
	/// Node (and optional edge) identifier.
	pub id_keys: Vec<String>,
	/// Display label; falls back to the id.
	pub label_keys: Vec<String>,
	/// Category, used for colour and size tier.
	pub category_keys: Vec<String>,
	/// Explicit colour overriding the category palette.
	pub color_keys: Vec<String>,
	/// A record with non-null values under both `source_key` and
	/// `target_key` is an edge.
	pub source_key: String,
	/// See `source_key`.
	pub target_key: String,
	/// Edge label.
	pub edge_label_keys: Vec<String>,
	/// Category names (matched case-insensitively as substrings) that get
	/// `prominent_tier`.
	pub prominent_categories: Vec<String>,
	/// Size tier for prominent categories.
	pub prominent_tier: u8,
	/// Size tier for everything else.
	pub default_tier: u8,
}

fn keys(names: &[&str]) -> Vec<String> {
	names.iter().map(|s| s.to_string()).collect()
}

impl Default for AdapterConfig {
	fn default() -> Self {
		Self {
			id_keys: keys(&["id", "node_id", "nodeId", "entity_id", "uuid", "key"]),
			label_keys: keys(&["label", "name", "title"]),
			category_keys: keys(&["type", "category", "kind", "entity_type"]),
			color_keys: keys(&["color", "colour"]),
			source_key: "source".to_string(),
			target_key: "target".to_string(),
			edge_label_keys: keys(&["label", "relation", "predicate", "type", "name"]),
			prominent_categories: keys(&["topic"]),
			prominent_tier: 4,
			default_tier: 2,
		}
	}
}
