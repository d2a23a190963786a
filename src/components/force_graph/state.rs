use std::collections::HashSet;

use log::debug;

use super::adapter::{adapt, resolve_links};
use super::config::{AdapterConfig, GraphConfig, LayoutKind};
use super::interaction::InteractionState;
use super::layout::{ForceSimulation, LayoutStrategy};
use super::scale::SurfaceMetrics;
use super::spring_layout::SpringLayout;
use super::types::{AdaptedGraph, Bounds, GraphElement, Point, ViewLink, ViewNode, ViewTransform};

/// Externally controlled selection and highlight.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Selection {
	pub node: Option<String>,
	pub edge: Option<String>,
	pub highlighted: HashSet<String>,
}

/// One graph view: owns the view model, the pan/zoom transform, the
/// interaction state and the dirty flag the frame loop paints on.
pub struct GraphView {
	pub(super) config: GraphConfig,
	adapter: AdapterConfig,
	pub(super) strategy: Box<dyn LayoutStrategy>,
	pub(super) nodes: Vec<ViewNode>,
	pub(super) links: Vec<ViewLink>,
	rest: Vec<Point>,
	pub(super) bounds: Bounds,
	pub(super) transform: ViewTransform,
	pub(super) metrics: SurfaceMetrics,
	pub(super) interaction: InteractionState,
	pub(super) selection: Selection,
	center_node: Option<String>,
	pending: Option<AdaptedGraph>,
	dirty: bool,
}

impl GraphView {
	/// Empty view; nothing is laid out until the surface has a size.
	pub fn new(config: GraphConfig) -> Self {
		let strategy: Box<dyn LayoutStrategy> = match config.layout {
			LayoutKind::Force => Box::new(ForceSimulation::new(
				config.simulation.clone(),
				config.tier_radius,
			)),
			LayoutKind::Spring => Box::new(SpringLayout::new(config.simulation.clone())),
		};
		Self {
			config,
			adapter: AdapterConfig::default(),
			strategy,
			nodes: Vec::new(),
			links: Vec::new(),
			rest: Vec::new(),
			bounds: Bounds::from_size(0.0, 0.0, 0.0),
			transform: ViewTransform::default(),
			metrics: SurfaceMetrics::default(),
			interaction: InteractionState::default(),
			selection: Selection::default(),
			center_node: None,
			pending: None,
			dirty: true,
		}
	}

	/// Replace the layout strategy picked from `GraphConfig::layout`.
	pub fn with_strategy(mut self, strategy: Box<dyn LayoutStrategy>) -> Self {
		self.strategy = strategy;
		self
	}

	/// Read records with different field names.
	pub fn with_adapter_config(mut self, adapter: AdapterConfig) -> Self {
		self.adapter = adapter;
		self
	}

	/// Active tunables.
	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// Nodes in load order.
	pub fn nodes(&self) -> &[ViewNode] {
		&self.nodes
	}

	/// Links with unique ids, endpoints as indices into [`Self::nodes`].
	pub fn links(&self) -> &[ViewLink] {
		&self.links
	}

	/// Node by id.
	pub fn node(&self, id: &str) -> Option<&ViewNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Index of a node by id.
	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}

	/// Index of a link by its de-duplicated id.
	pub fn link_index(&self, id: &str) -> Option<usize> {
		self.links.iter().position(|l| l.id == id)
	}

	/// Current pan and zoom.
	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	/// Logical area nodes are kept inside.
	pub fn bounds(&self) -> Bounds {
		self.bounds
	}

	/// Last known surface geometry.
	pub fn metrics(&self) -> &SurfaceMetrics {
		&self.metrics
	}

	/// Ask for a repaint on the next frame.
	pub fn request_frame(&mut self) {
		self.dirty = true;
	}

	/// Clear and return the dirty flag.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}

	fn has_size(&self) -> bool {
		let (w, h) = self.metrics.surface_size();
		w > 0.0 && h > 0.0
	}

	/// Replace the graph with a freshly adapted element list.
	///
	/// Layout is deferred while the surface has no size; an empty list
	/// clears the view.
	pub fn set_elements(&mut self, elements: &[GraphElement]) {
		let graph = adapt(elements, &self.adapter);
		self.interaction.reset();
		if graph.nodes.is_empty() {
			self.clear();
			return;
		}
		if !self.has_size() {
			debug!(
				"surface has no size yet, deferring layout of {} nodes",
				graph.nodes.len()
			);
			self.strategy.freeze();
			self.pending = Some(graph);
			return;
		}
		self.load(graph);
	}

	/// Drop every node and link.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.links.clear();
		self.rest.clear();
		self.pending = None;
		self.interaction.reset();
		self.strategy.freeze();
		self.request_frame();
	}

	/// Node to centre the viewport on after the next layout.
	pub fn set_center_node(&mut self, id: Option<String>) {
		self.center_node = id;
	}

	fn load(&mut self, graph: AdaptedGraph) {
		let AdaptedGraph { nodes, links } = graph;
		self.links = resolve_links(&nodes, &links);
		self.nodes = nodes;

		let (w, h) = self.metrics.surface_size();
		let padding = self.config.tier_radius.iter().copied().fold(0.0, f64::max);
		let center = Point::new(w / 2.0, h / 2.0);
		let zoom_min = self.config.zoom_min;
		self.bounds = Bounds::around(center, w / zoom_min, h / zoom_min, padding);

		let positions = self.strategy.settle(&self.nodes, &self.links, self.bounds);
		for (node, p) in self.nodes.iter_mut().zip(positions) {
			node.set_position(self.bounds.clamp(p));
			node.vx = 0.0;
			node.vy = 0.0;
			node.pinned = None;
		}
		self.strategy.freeze();
		self.rest = self.nodes.iter().map(ViewNode::position).collect();
		self.transform = self.initial_transform();
		self.request_frame();
	}

	fn viewport_center(&self) -> Point {
		let (w, h) = self.metrics.surface_size();
		Point::new(w / 2.0, h / 2.0)
	}

	fn initial_transform(&self) -> ViewTransform {
		let k = self.config.clamp_zoom(1.0);
		let focus = self
			.center_node
			.as_deref()
			.and_then(|id| self.node(id))
			.map(ViewNode::position)
			.unwrap_or_else(|| self.graph_center());
		ViewTransform::centered_on(focus, self.viewport_center(), k)
	}

	/// Centre of the bounding box of all nodes.
	fn graph_center(&self) -> Point {
		let mut min = Point::new(f64::INFINITY, f64::INFINITY);
		let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
		for n in &self.nodes {
			min = Point::new(min.x.min(n.x), min.y.min(n.y));
			max = Point::new(max.x.max(n.x), max.y.max(n.y));
		}
		if self.nodes.is_empty() {
			return self.bounds.center();
		}
		min.midpoint(max)
	}

	/// Record new surface geometry. Positions are never re-simulated: a size
	/// change shifts the pan by half the delta so the view stays centred.
	/// Returns whether the surface size changed.
	pub fn resize(&mut self, metrics: SurfaceMetrics) -> bool {
		let (old_w, old_h) = self.metrics.surface_size();
		let old_dpr = self.metrics.device_pixel_ratio;
		self.metrics = metrics;
		let (w, h) = metrics.surface_size();
		if w == old_w && h == old_h && metrics.device_pixel_ratio == old_dpr {
			return false;
		}
		debug!("surface resized to {}x{} @{}", w, h, metrics.device_pixel_ratio);
		if w <= 0.0 || h <= 0.0 {
			return true;
		}
		if let Some(graph) = self.pending.take() {
			self.load(graph);
		} else if old_w > 0.0 && old_h > 0.0 {
			self.transform.x += (w - old_w) / 2.0;
			self.transform.y += (h - old_h) / 2.0;
		}
		self.request_frame();
		true
	}

	/// Update where the surface sits on the page, without a redraw.
	pub fn observe_rect(
		&mut self,
		left: f64,
		top: f64,
		width: f64,
		height: f64,
		viewport_offset: Point,
	) {
		self.metrics.rect_left = left;
		self.metrics.rect_top = top;
		self.metrics.rect_width = width;
		self.metrics.rect_height = height;
		self.metrics.viewport_offset = viewport_offset;
	}

	/// Put every node back at its settled position and drop all pins.
	pub fn reset_layout(&mut self) {
		for (node, rest) in self.nodes.iter_mut().zip(&self.rest) {
			node.set_position(*rest);
			node.pinned = None;
			node.vx = 0.0;
			node.vy = 0.0;
		}
		self.strategy.freeze();
		self.request_frame();
	}

	/// Externally selected node; drawn emphasised.
	pub fn set_selected_node(&mut self, id: Option<String>) {
		if self.selection.node != id {
			self.selection.node = id;
			self.request_frame();
		}
	}

	/// Externally selected edge; drawn emphasised.
	pub fn set_selected_edge(&mut self, id: Option<String>) {
		if self.selection.edge != id {
			self.selection.edge = id;
			self.request_frame();
		}
	}

	/// Nodes to keep at full strength while everything else dims. An empty
	/// set turns highlighting off.
	pub fn set_highlighted<I: IntoIterator<Item = String>>(&mut self, ids: I) {
		let ids: HashSet<String> = ids.into_iter().collect();
		if self.selection.highlighted != ids {
			self.selection.highlighted = ids;
			self.request_frame();
		}
	}

	/// Centre the viewport on `id` once, keeping the zoom. `done` is always
	/// called, with whether the node was found, so the caller can clear the
	/// request.
	pub fn pan_to_node(&mut self, id: &str, done: impl FnOnce(bool)) {
		let found = self.node(id).map(ViewNode::position);
		if let Some(p) = found {
			let k = self.transform.k;
			self.transform = ViewTransform::centered_on(p, self.viewport_center(), k);
			self.request_frame();
		}
		done(found.is_some());
	}

	/// Per-frame work: let the layout strategy advance any interactive
	/// motion. Returns whether the frame needs painting.
	pub fn step(&mut self) -> bool {
		if !self.nodes.is_empty() && self.strategy.tick(&mut self.nodes, &self.links, self.bounds) {
			self.request_frame();
		}
		self.take_dirty()
	}
}

#[cfg(test)]
pub(super) mod tests {
	use super::*;
	use crate::components::force_graph::interaction::PointerKind;
	use serde_json::json;

	pub(crate) fn sample_elements() -> Vec<GraphElement> {
		[
			json!({"id": "A", "label": "Alpha", "type": "topic"}),
			json!({"id": "B", "label": "Beta"}),
			json!({"id": "C", "label": "Gamma"}),
			json!({"source": "A", "target": "B", "label": "relates"}),
			json!({"source": "B", "target": "C", "label": "cites"}),
		]
		.into_iter()
		.map(GraphElement::from)
		.collect()
	}

	pub(crate) fn loaded_view() -> GraphView {
		let mut view = GraphView::new(GraphConfig::default());
		view.resize(SurfaceMetrics::for_size(800.0, 600.0, 1.0));
		view.set_elements(&sample_elements());
		view.take_dirty();
		view
	}

	#[test]
	fn layout_waits_for_a_sized_surface() {
		let mut view = GraphView::new(GraphConfig::default());
		view.set_elements(&sample_elements());
		assert!(view.nodes().is_empty());
		view.resize(SurfaceMetrics::for_size(800.0, 600.0, 1.0));
		assert_eq!(view.nodes().len(), 3);
		assert_eq!(view.links().len(), 2);
		assert!(view.nodes().iter().all(|n| view.bounds().contains(n.position())));
	}

	#[test]
	fn spring_layout_is_selectable() {
		let config = GraphConfig {
			layout: LayoutKind::Spring,
			..GraphConfig::default()
		};
		let mut view = GraphView::new(config);
		view.resize(SurfaceMetrics::for_size(800.0, 600.0, 1.0));
		view.set_elements(&sample_elements());
		assert_eq!(view.nodes().len(), 3);
		assert!(view.nodes().iter().all(|n| view.bounds().contains(n.position())));
	}

	struct Diagonal;

	impl LayoutStrategy for Diagonal {
		fn settle(&mut self, nodes: &[ViewNode], _: &[ViewLink], bounds: Bounds) -> Vec<Point> {
			(0..nodes.len())
				.map(|i| i as f64 * 50.0)
				.map(|d| Point::new(bounds.min.x + d, bounds.min.y + d))
				.collect()
		}
	}

	#[test]
	fn layout_strategy_is_pluggable() {
		let mut view = GraphView::new(GraphConfig::default()).with_strategy(Box::new(Diagonal));
		view.resize(SurfaceMetrics::for_size(800.0, 600.0, 1.0));
		view.set_elements(&sample_elements());
		let min = view.bounds().min;
		assert_eq!(
			view.node("B").map(ViewNode::position),
			Some(Point::new(min.x + 50.0, min.y + 50.0))
		);
	}

	#[test]
	fn adapter_keys_are_configurable() {
		let adapter = AdapterConfig {
			id_keys: vec!["slug".into()],
			..AdapterConfig::default()
		};
		let mut view = GraphView::new(GraphConfig::default()).with_adapter_config(adapter);
		view.resize(SurfaceMetrics::for_size(800.0, 600.0, 1.0));
		view.set_elements(&[GraphElement::from(json!({"slug": "s", "id": "ignored"}))]);
		assert!(view.node("s").is_some());
		assert!(view.node("ignored").is_none());
	}

	#[test]
	fn empty_elements_clear_the_view() {
		let mut view = loaded_view();
		view.set_elements(&[]);
		assert!(view.nodes().is_empty());
		assert!(view.links().is_empty());
		assert!(view.take_dirty());
	}

	#[test]
	fn initial_transform_centres_requested_node() {
		let mut view = GraphView::new(GraphConfig::default());
		view.set_center_node(Some("C".into()));
		view.resize(SurfaceMetrics::for_size(800.0, 600.0, 1.0));
		view.set_elements(&sample_elements());
		let c = view.node("C").map(ViewNode::position).unwrap();
		let screen = view.transform().graph_to_screen(c);
		assert!((screen.x - 400.0).abs() < 1e-9);
		assert!((screen.y - 300.0).abs() < 1e-9);
	}

	#[test]
	fn unchanged_size_is_a_no_op() {
		let mut view = loaded_view();
		let before: Vec<_> = view.nodes().iter().map(ViewNode::position).collect();
		assert!(!view.resize(SurfaceMetrics::for_size(800.0, 600.0, 1.0)));
		assert!(!view.take_dirty());
		assert!(view.resize(SurfaceMetrics::for_size(1000.0, 600.0, 2.0)));
		let after: Vec<_> = view.nodes().iter().map(ViewNode::position).collect();
		assert_eq!(before, after);
		assert!(view.take_dirty());
	}

	#[test]
	fn resize_keeps_view_centred() {
		let mut view = loaded_view();
		let t = view.transform();
		view.resize(SurfaceMetrics::for_size(1000.0, 700.0, 1.0));
		assert_eq!(view.transform().x, t.x + 100.0);
		assert_eq!(view.transform().y, t.y + 50.0);
		assert_eq!(view.transform().k, t.k);
	}

	#[test]
	fn pan_to_missing_node_still_completes() {
		let mut view = loaded_view();
		let t = view.transform();
		let mut completed = None;
		view.pan_to_node("nope", |found| completed = Some(found));
		assert_eq!(completed, Some(false));
		assert_eq!(view.transform(), t);
	}

	#[test]
	fn pan_to_node_centres_once_without_moving_nodes() {
		let mut view = loaded_view();
		let before: Vec<_> = view.nodes().iter().map(ViewNode::position).collect();
		let mut completed = None;
		view.pan_to_node("B", |found| completed = Some(found));
		assert_eq!(completed, Some(true));
		let b = view.node("B").map(ViewNode::position).unwrap();
		let screen = view.transform().graph_to_screen(b);
		assert!((screen.x - 400.0).abs() < 1e-9 && (screen.y - 300.0).abs() < 1e-9);
		let after: Vec<_> = view.nodes().iter().map(ViewNode::position).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn reset_layout_restores_rest_positions() {
		let mut view = loaded_view();
		let rest = view.node("A").map(ViewNode::position).unwrap();
		view.nodes[0].pin(Point::new(rest.x + 40.0, rest.y));
		view.reset_layout();
		assert_eq!(view.node("A").map(ViewNode::position), Some(rest));
		assert!(view.nodes().iter().all(|n| n.pinned.is_none()));
	}

	#[test]
	fn frozen_layout_does_not_tick() {
		let mut view = loaded_view();
		let before: Vec<_> = view.nodes().iter().map(ViewNode::position).collect();
		assert!(!view.step());
		let after: Vec<_> = view.nodes().iter().map(ViewNode::position).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn deferred_reload_mid_drag_leaves_layout_frozen() {
		let mut view = loaded_view();
		let a = view.transform().graph_to_screen(view.node("A").map(ViewNode::position).unwrap());
		view.pointer_down(PointerKind::Mouse, 0, a);
		view.pointer_move(PointerKind::Mouse, 0, Point::new(a.x + 30.0, a.y));
		assert!(view.is_dragging());
		view.resize(SurfaceMetrics::for_size(0.0, 0.0, 1.0));
		view.set_elements(&sample_elements());
		view.take_dirty();
		let before: Vec<_> = view.nodes().iter().map(ViewNode::position).collect();
		assert!(!view.step());
		let after: Vec<_> = view.nodes().iter().map(ViewNode::position).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn stale_page_offset_is_refreshed_before_hit_testing() {
		let mut view = loaded_view();
		let a = view.transform().graph_to_screen(view.node("A").map(ViewNode::position).unwrap());
		// the page scrolled by 100px since the last resize
		view.observe_rect(0.0, -100.0, 800.0, 600.0, Point::new(0.0, 0.0));
		view.pointer_move(PointerKind::Mouse, 0, Point::new(a.x, a.y - 100.0));
		assert_eq!(view.hovered_node(), Some("A"));
	}

	#[test]
	fn selection_changes_request_a_frame() {
		let mut view = loaded_view();
		view.set_selected_node(Some("A".into()));
		assert!(view.take_dirty());
		view.set_selected_node(Some("A".into()));
		assert!(!view.take_dirty());
		view.set_highlighted(vec!["B".to_string()]);
		assert!(view.take_dirty());
	}
}
