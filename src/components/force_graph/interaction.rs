//! Pointer-session state machine shared by mouse and touch input.
//!
//! Every gesture is one [`Session`]: a press on a node (which becomes a
//! drag once the threshold is crossed), a pan over empty space, or a
//! two-contact pinch. Releasing a press that neither dragged nor committed
//! a pan resolves to a node or edge click.

use log::trace;

use super::hit_test::{edge_at, node_at};
use super::state::GraphView;
use super::types::{GraphEvent, Point, ViewTransform};

/// Input device behind a pointer event; picks the movement threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
	/// Mouse or pen.
	Mouse,
	/// One touch contact.
	Touch,
}

/// What was under the pointer when it went down.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PressRecord {
	start: Point,
	node: Option<usize>,
	edge: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Session {
	#[default]
	Idle,
	Node {
		pointer: i32,
		kind: PointerKind,
		press: PressRecord,
		node: usize,
		/// Node position minus pointer position, in logical units.
		grab: Point,
		dragging: bool,
	},
	Pan {
		pointer: i32,
		kind: PointerKind,
		press: Option<PressRecord>,
		anchor: Point,
		origin: ViewTransform,
		committed: bool,
	},
	Pinch {
		a: i32,
		b: i32,
		distance: f64,
		center: Point,
		origin: ViewTransform,
	},
}

/// Transient gesture and hover state; reset on release.
#[derive(Clone, Debug, Default)]
pub struct InteractionState {
	pub(super) hovered_node: Option<usize>,
	pub(super) hovered_edge: Option<usize>,
	session: Session,
	contacts: Vec<(i32, Point)>,
}

impl InteractionState {
	pub(super) fn reset(&mut self) {
		*self = Self::default();
	}

	pub(super) fn dragged_node(&self) -> Option<usize> {
		match self.session {
			Session::Node {
				node, dragging: true, ..
			} => Some(node),
			_ => None,
		}
	}

	fn contact(&self, pointer: i32) -> Option<Point> {
		self.contacts.iter().find(|(id, _)| *id == pointer).map(|(_, p)| *p)
	}
}

impl GraphView {
	fn threshold(&self, kind: PointerKind) -> f64 {
		match kind {
			PointerKind::Mouse => self.config.drag_threshold,
			PointerKind::Touch => self.config.touch_pan_threshold,
		}
	}

	fn pick(&self, surface: Point) -> (Option<usize>, Option<usize>) {
		let logical = self.transform.screen_to_graph(surface);
		if let Some(node) = node_at(&self.nodes, logical, &self.config) {
			return (Some(node), None);
		}
		let threshold = self.config.edge_hit_threshold / self.transform.k;
		(None, edge_at(&self.nodes, &self.links, logical, threshold))
	}

	fn click_at(&self, surface: Point, fallback: Option<PressRecord>) -> Option<GraphEvent> {
		let (node, edge) = match self.pick(surface) {
			(None, None) => fallback.map(|p| (p.node, p.edge)).unwrap_or_default(),
			hit => hit,
		};
		if let Some(i) = node {
			return Some(GraphEvent::NodeClick(self.nodes[i].id.clone()));
		}
		edge.map(|i| GraphEvent::EdgeClick(self.links[i].id.clone()))
	}

	/// Node under the mouse, if any.
	pub fn hovered_node(&self) -> Option<&str> {
		self.interaction.hovered_node.map(|i| self.nodes[i].id.as_str())
	}

	/// Edge under the mouse, if no node is.
	pub fn hovered_edge(&self) -> Option<&str> {
		self.interaction.hovered_edge.map(|i| self.links[i].id.as_str())
	}

	/// True once a node press has crossed the drag threshold.
	pub fn is_dragging(&self) -> bool {
		self.interaction.dragged_node().is_some()
	}

	/// CSS cursor for the current state.
	pub fn cursor(&self) -> &'static str {
		match self.interaction.session {
			Session::Node { dragging: true, .. } => "grabbing",
			Session::Pan { committed: true, .. } | Session::Pinch { .. } => "grabbing",
			_ if self.interaction.hovered_node.is_some()
				|| self.interaction.hovered_edge.is_some() =>
			{
				"pointer"
			}
			_ => "grab",
		}
	}

	fn set_hover(&mut self, node: Option<usize>, edge: Option<usize>) {
		if self.interaction.hovered_node != node || self.interaction.hovered_edge != edge {
			self.interaction.hovered_node = node;
			self.interaction.hovered_edge = edge;
			self.request_frame();
		}
	}

	/// Leave a dragged node pinned where it is.
	fn drop_dragged(&mut self) {
		if let Some(i) = self.interaction.dragged_node() {
			let p = self.nodes[i].position();
			self.nodes[i].pin(p);
		}
	}

	fn start_pinch(&mut self) {
		let contacts = &self.interaction.contacts;
		let (Some(&(a, pa)), Some(&(b, pb))) = (contacts.first(), contacts.get(1)) else {
			return;
		};
		self.drop_dragged();
		trace!("pinch started between contacts {} and {}", a, b);
		self.interaction.session = Session::Pinch {
			a,
			b,
			distance: pa.distance_sq(pb).sqrt(),
			center: pa.midpoint(pb),
			origin: self.transform,
		};
	}

	fn start_pan(
		&mut self,
		pointer: i32,
		kind: PointerKind,
		at: Point,
		press: Option<PressRecord>,
		committed: bool,
	) {
		self.interaction.session = Session::Pan {
			pointer,
			kind,
			press,
			anchor: at,
			origin: self.transform,
			committed,
		};
	}

	/// Pointer or touch contact went down at `client` coordinates.
	pub fn pointer_down(&mut self, kind: PointerKind, pointer: i32, client: Point) {
		let p = self.metrics.client_to_surface(client);
		if kind == PointerKind::Touch {
			self.interaction.contacts.retain(|(id, _)| *id != pointer);
			self.interaction.contacts.push((pointer, p));
			if self.interaction.contacts.len() >= 2 {
				if !matches!(self.interaction.session, Session::Pinch { .. }) {
					self.start_pinch();
					self.request_frame();
				}
				return;
			}
		}
		if self.interaction.session != Session::Idle {
			return;
		}

		let (node, edge) = self.pick(p);
		let press = PressRecord { start: p, node, edge };
		match node {
			Some(i) => {
				let logical = self.transform.screen_to_graph(p);
				let pos = self.nodes[i].position();
				self.interaction.session = Session::Node {
					pointer,
					kind,
					press,
					node: i,
					grab: Point::new(pos.x - logical.x, pos.y - logical.y),
					dragging: false,
				};
			}
			None => self.start_pan(pointer, kind, p, Some(press), false),
		}
		self.request_frame();
	}

	/// Pointer or touch contact moved to `client` coordinates.
	pub fn pointer_move(&mut self, kind: PointerKind, pointer: i32, client: Point) {
		let p = self.metrics.client_to_surface(client);
		if kind == PointerKind::Touch {
			let contacts = &mut self.interaction.contacts;
			if let Some(entry) = contacts.iter_mut().find(|(id, _)| *id == pointer) {
				entry.1 = p;
			}
		}

		match self.interaction.session {
			Session::Idle => {
				if kind == PointerKind::Mouse {
					let (node, edge) = self.pick(p);
					self.set_hover(node, edge);
				}
			}
			Session::Node {
				pointer: owner,
				kind: owner_kind,
				press,
				node,
				grab,
				dragging,
			} if owner == pointer && owner_kind == kind => {
				if !dragging {
					let limit = self.threshold(kind);
					if press.start.distance_sq(p) <= limit * limit {
						return;
					}
					trace!("drag threshold crossed on node {}", self.nodes[node].id);
					let at = self.nodes[node].position();
					self.nodes[node].pin(at);
					self.strategy.nudge();
					self.interaction.session = Session::Node {
						pointer,
						kind,
						press,
						node,
						grab,
						dragging: true,
					};
				}
				let logical = self.transform.screen_to_graph(p);
				let target = self.bounds.clamp(Point::new(logical.x + grab.x, logical.y + grab.y));
				self.nodes[node].pin(target);
				self.request_frame();
			}
			Session::Pan {
				pointer: owner,
				kind: owner_kind,
				press,
				anchor,
				origin,
				committed,
			} if owner == pointer && owner_kind == kind => {
				self.transform.x = origin.x + (p.x - anchor.x);
				self.transform.y = origin.y + (p.y - anchor.y);
				if !committed {
					let limit = self.threshold(kind);
					if anchor.distance_sq(p) > limit * limit {
						self.interaction.session = Session::Pan {
							pointer,
							kind,
							press,
							anchor,
							origin,
							committed: true,
						};
					}
				}
				self.request_frame();
			}
			Session::Pinch {
				a,
				b,
				distance,
				center,
				origin,
			} if kind == PointerKind::Touch => {
				let contacts = (self.interaction.contact(a), self.interaction.contact(b));
				let (Some(pa), Some(pb)) = contacts else {
					return;
				};
				let now = pa.distance_sq(pb).sqrt();
				if distance < f64::EPSILON || now < f64::EPSILON {
					return;
				}
				let k = self.config.clamp_zoom(origin.k * now / distance);
				let anchor = origin.screen_to_graph(center);
				self.transform = ViewTransform::centered_on(anchor, pa.midpoint(pb), k);
				self.request_frame();
			}
			_ => {}
		}
	}

	/// Pointer or touch contact released at `client` coordinates. Returns
	/// the click this release resolves to, if any.
	pub fn pointer_up(
		&mut self,
		kind: PointerKind,
		pointer: i32,
		client: Point,
	) -> Option<GraphEvent> {
		let p = self.metrics.client_to_surface(client);
		if kind == PointerKind::Touch {
			self.interaction.contacts.retain(|(id, _)| *id != pointer);
		}

		let event = match self.interaction.session {
			Session::Pinch { a, b, .. } if kind == PointerKind::Touch => {
				if pointer == a || pointer == b {
					match self.interaction.contacts.as_slice() {
						[] => self.interaction.session = Session::Idle,
						[(rest, at)] => {
							let (rest, at) = (*rest, *at);
							trace!("pinch ended, panning with contact {}", rest);
							self.start_pan(rest, PointerKind::Touch, at, None, true);
						}
						_ => self.start_pinch(),
					}
				}
				None
			}
			Session::Node {
				pointer: owner,
				kind: owner_kind,
				press,
				dragging,
				..
			} if owner == pointer && owner_kind == kind => {
				let event = if dragging {
					self.drop_dragged();
					None
				} else {
					self.click_at(p, Some(press))
				};
				self.interaction.session = Session::Idle;
				event
			}
			Session::Pan {
				pointer: owner,
				kind: owner_kind,
				press,
				committed,
				..
			} if owner == pointer && owner_kind == kind => {
				self.interaction.session = Session::Idle;
				if committed { None } else { self.click_at(p, press) }
			}
			_ => None,
		};
		self.request_frame();
		event
	}

	/// Pointer left the surface or the touch was cancelled: abandon the
	/// gesture without a click and clear hover.
	pub fn pointer_cancel(&mut self) {
		self.drop_dragged();
		self.interaction.session = Session::Idle;
		self.interaction.contacts.clear();
		self.set_hover(None, None);
		self.request_frame();
	}

	/// Double click at `client`. Over empty space this puts every node back
	/// at its settled position; returns whether it did.
	pub fn double_click(&mut self, client: Point) -> bool {
		let p = self.metrics.client_to_surface(client);
		if self.pick(p) != (None, None) {
			return false;
		}
		self.reset_layout();
		true
	}

	/// Wheel zoom about the cursor.
	pub fn wheel(&mut self, client: Point, delta_y: f64) {
		if delta_y == 0.0 || !delta_y.is_finite() {
			return;
		}
		let p = self.metrics.client_to_surface(client);
		let step = self.config.wheel_zoom_step;
		let factor = if delta_y > 0.0 { 1.0 / step } else { step };
		self.transform = self.transform.zoom_about(
			p,
			self.transform.k * factor,
			self.config.zoom_min,
			self.config.zoom_max,
		);
		self.request_frame();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::config::{GraphConfig, LayoutKind};
	use crate::components::force_graph::scale::SurfaceMetrics;
	use crate::components::force_graph::state::tests::{loaded_view, sample_elements};
	use crate::components::force_graph::types::{GraphElement, ViewNode};
	use proptest::prelude::*;
	use serde_json::json;

	const MOUSE: PointerKind = PointerKind::Mouse;
	const TOUCH: PointerKind = PointerKind::Touch;

	fn screen_of(view: &GraphView, id: &str) -> Point {
		let p = view.node(id).map(ViewNode::position).unwrap();
		view.transform().graph_to_screen(p)
	}

	fn positions(view: &GraphView) -> Vec<Point> {
		view.nodes().iter().map(ViewNode::position).collect()
	}

	/// A point on screen far from every node and edge.
	fn empty_spot(view: &GraphView) -> Point {
		let mut p = Point::new(5.0, 5.0);
		while view.pick(p) != (None, None) {
			p.x += 7.0;
		}
		p
	}

	fn offset(p: Point, dx: f64, dy: f64) -> Point {
		Point::new(p.x + dx, p.y + dy)
	}

	#[test]
	fn press_release_on_node_is_a_click_and_does_not_move_it() {
		let mut view = loaded_view();
		let before = positions(&view);
		let a = screen_of(&view, "A");
		view.pointer_down(MOUSE, 0, a);
		view.pointer_move(MOUSE, 0, offset(a, 2.0, 1.0));
		let event = view.pointer_up(MOUSE, 0, offset(a, 2.0, 1.0));
		assert_eq!(event, Some(GraphEvent::NodeClick("A".into())));
		assert_eq!(positions(&view), before);
		assert!(view.node("A").unwrap().pinned.is_none());
	}

	/// `sample_elements` plus a chain F0..F5 that shares no link with A.
	fn view_with_detached_chain(layout: LayoutKind) -> GraphView {
		let mut elements = sample_elements();
		for i in 0..6 {
			elements.push(GraphElement::from(json!({"id": format!("F{i}")})));
		}
		for i in 0..5 {
			let (s, t) = (format!("F{i}"), format!("F{}", i + 1));
			elements.push(GraphElement::from(json!({"source": s, "target": t})));
		}
		let config = GraphConfig {
			layout,
			..GraphConfig::default()
		};
		let mut view = GraphView::new(config);
		view.resize(SurfaceMetrics::for_size(800.0, 600.0, 1.0));
		view.set_elements(&elements);
		view.take_dirty();
		view
	}

	/// Drag A by (50, 10) in ten frames, release, then run 600 frames.
	fn drag_a_and_run(view: &mut GraphView) {
		let a = screen_of(view, "A");
		view.pointer_down(MOUSE, 0, a);
		for m in 1..=10 {
			let m = f64::from(m);
			view.pointer_move(MOUSE, 0, offset(a, 5.0 * m, m));
			view.step();
		}
		assert!(view.is_dragging());
		assert_eq!(view.pointer_up(MOUSE, 0, offset(a, 50.0, 10.0)), None);
		for _ in 0..600 {
			view.step();
		}
	}

	fn moved(before: &[Point], after: &[Point], i: usize) -> f64 {
		before[i].distance_sq(after[i]).sqrt()
	}

	#[test]
	fn drag_barely_disturbs_the_rest_of_the_graph() {
		let mut view = view_with_detached_chain(LayoutKind::Force);
		let before = positions(&view);
		let start = view.node("A").unwrap().position();
		drag_a_and_run(&mut view);

		let k = view.transform().k;
		let dropped = Point::new(start.x + 50.0 / k, start.y + 10.0 / k);
		let a_node = view.node("A").unwrap();
		assert!((a_node.x - dropped.x).abs() < 1e-9 && (a_node.y - dropped.y).abs() < 1e-9);
		assert_eq!(a_node.pinned, Some(a_node.position()));

		let after = positions(&view);
		let b = view.node_index("B").unwrap();
		assert!(moved(&before, &after, b) < 3.0, "B moved {}", moved(&before, &after, b));
		for id in ["C", "F0", "F1", "F2", "F3", "F4", "F5"] {
			let i = view.node_index(id).unwrap();
			let d = moved(&before, &after, i);
			assert!(d < 1.0, "{id} moved {d}");
		}
		// the nudge has cooled off
		assert!(!view.step());

		// edge A-B follows A's live position
		let ab = &view.links()[0];
		assert_eq!(view.nodes()[ab.source].position(), view.node("A").unwrap().position());
	}

	#[test]
	fn drag_with_settle_only_layout_moves_nothing_else() {
		let mut view = view_with_detached_chain(LayoutKind::Spring);
		let before = positions(&view);
		drag_a_and_run(&mut view);
		let after = positions(&view);
		let a = view.node_index("A").unwrap();
		for i in (0..after.len()).filter(|&i| i != a) {
			assert_eq!(after[i], before[i], "{} moved", view.nodes()[i].id);
		}
		assert_ne!(after[a], before[a]);
	}

	#[test]
	fn dropped_node_stays_pinned_while_simulation_cools() {
		let mut view = loaded_view();
		let a = screen_of(&view, "A");
		view.pointer_down(MOUSE, 0, a);
		view.pointer_move(MOUSE, 0, offset(a, 40.0, 0.0));
		view.pointer_up(MOUSE, 0, offset(a, 40.0, 0.0));
		let dropped = view.node("A").unwrap().position();
		for _ in 0..50 {
			view.step();
		}
		assert_eq!(view.node("A").unwrap().position(), dropped);
	}

	#[test]
	fn drag_is_clamped_to_bounds() {
		let mut view = loaded_view();
		let a = screen_of(&view, "A");
		view.pointer_down(MOUSE, 0, a);
		view.pointer_move(MOUSE, 0, offset(a, 10_000.0, -10_000.0));
		let p = view.node("A").unwrap().position();
		assert!(view.bounds().contains(p));
		assert_eq!(p.x, view.bounds().max.x);
		assert_eq!(p.y, view.bounds().min.y);
	}

	#[test]
	fn pan_over_empty_space_moves_transform_only() {
		let mut view = loaded_view();
		let before = positions(&view);
		let t = view.transform();
		let start = empty_spot(&view);
		view.pointer_down(MOUSE, 0, start);
		view.pointer_move(MOUSE, 0, offset(start, 40.0, 20.0));
		view.pointer_move(MOUSE, 0, offset(start, 100.0, 50.0));
		let event = view.pointer_up(MOUSE, 0, offset(start, 100.0, 50.0));
		assert_eq!(event, None);
		assert_eq!(view.transform().x, t.x + 100.0);
		assert_eq!(view.transform().y, t.y + 50.0);
		assert_eq!(view.transform().k, t.k);
		assert_eq!(positions(&view), before);
	}

	#[test]
	fn click_near_edge_reports_edge() {
		let mut view = loaded_view();
		let (a, b) = (screen_of(&view, "A"), screen_of(&view, "B"));
		let mid = a.midpoint(b);
		assert_eq!(view.pick(mid), (None, Some(0)));
		view.pointer_down(MOUSE, 0, mid);
		let event = view.pointer_up(MOUSE, 0, mid);
		assert_eq!(event, Some(GraphEvent::EdgeClick("A->B:relates".into())));
	}

	#[test]
	fn click_on_nothing_is_ignored() {
		let mut view = loaded_view();
		let p = empty_spot(&view);
		view.pointer_down(MOUSE, 0, p);
		assert_eq!(view.pointer_up(MOUSE, 0, p), None);
	}

	#[test]
	fn hover_tracks_node_then_edge_without_mutating() {
		let mut view = loaded_view();
		let before = positions(&view);
		let t = view.transform();
		let a = screen_of(&view, "A");
		view.pointer_move(MOUSE, 0, a);
		assert_eq!(view.hovered_node(), Some("A"));
		assert_eq!(view.cursor(), "pointer");
		assert!(view.take_dirty());
		let mid = a.midpoint(screen_of(&view, "B"));
		view.pointer_move(MOUSE, 0, mid);
		assert_eq!(view.hovered_node(), None);
		assert_eq!(view.hovered_edge(), Some("A->B:relates"));
		assert_eq!(positions(&view), before);
		assert_eq!(view.transform(), t);
	}

	#[test]
	fn touch_tap_on_node_clicks() {
		let mut view = loaded_view();
		let b = screen_of(&view, "B");
		view.pointer_down(TOUCH, 7, b);
		view.pointer_move(TOUCH, 7, offset(b, 3.0, 3.0));
		let event = view.pointer_up(TOUCH, 7, offset(b, 3.0, 3.0));
		assert_eq!(event, Some(GraphEvent::NodeClick("B".into())));
	}

	#[test]
	fn touch_drag_moves_and_pins_the_node() {
		let mut view = loaded_view();
		let b = screen_of(&view, "B");
		let start = view.node("B").unwrap().position();
		view.pointer_down(TOUCH, 3, b);
		// within the touch threshold: still a potential tap
		view.pointer_move(TOUCH, 3, offset(b, 6.0, 0.0));
		assert!(!view.is_dragging());
		view.pointer_move(TOUCH, 3, offset(b, 30.0, -20.0));
		assert!(view.is_dragging());
		assert_eq!(view.pointer_up(TOUCH, 3, offset(b, 30.0, -20.0)), None);

		let k = view.transform().k;
		let dropped = Point::new(start.x + 30.0 / k, start.y - 20.0 / k);
		let node = view.node("B").unwrap();
		assert!((node.x - dropped.x).abs() < 1e-9 && (node.y - dropped.y).abs() < 1e-9);
		assert_eq!(node.pinned, Some(node.position()));
	}

	#[test]
	fn second_finger_mid_drag_turns_into_pinch() {
		let mut view = loaded_view();
		let b = screen_of(&view, "B");
		view.pointer_down(TOUCH, 1, b);
		view.pointer_move(TOUCH, 1, offset(b, 40.0, 0.0));
		assert!(view.is_dragging());
		let dropped = view.node("B").unwrap().position();

		let other = offset(b, 40.0, 120.0);
		view.pointer_down(TOUCH, 2, other);
		assert!(!view.is_dragging());
		assert!(matches!(view.interaction.session, Session::Pinch { .. }));
		assert_eq!(view.node("B").unwrap().pinned, Some(dropped));

		// moving the first finger now zooms instead of dragging
		view.pointer_move(TOUCH, 1, offset(b, 40.0, -60.0));
		assert_eq!(view.node("B").unwrap().position(), dropped);
		assert_eq!(view.pointer_up(TOUCH, 1, offset(b, 40.0, -60.0)), None);
		assert_eq!(view.pointer_up(TOUCH, 2, other), None);
		assert_eq!(view.node("B").unwrap().pinned, Some(dropped));
	}

	#[test]
	fn touch_beyond_pan_threshold_is_not_a_tap() {
		let mut view = loaded_view();
		let p = empty_spot(&view);
		let t = view.transform();
		view.pointer_down(TOUCH, 1, p);
		view.pointer_move(TOUCH, 1, offset(p, 0.0, 30.0));
		assert_eq!(view.pointer_up(TOUCH, 1, offset(p, 0.0, 30.0)), None);
		assert_eq!(view.transform().y, t.y + 30.0);
	}

	#[test]
	fn pinch_zooms_about_the_midpoint() {
		let mut view = loaded_view();
		view.transform = ViewTransform { x: 0.0, y: 0.0, k: 0.8 };
		let center = Point::new(400.0, 300.0);
		let anchor = view.transform().screen_to_graph(center);
		view.pointer_down(TOUCH, 1, offset(center, -50.0, 0.0));
		view.pointer_down(TOUCH, 2, offset(center, 50.0, 0.0));
		view.pointer_move(TOUCH, 1, offset(center, -75.0, 0.0));
		view.pointer_move(TOUCH, 2, offset(center, 75.0, 0.0));
		let t = view.transform();
		assert!((t.k - 1.2).abs() < 1e-9);
		let after = t.screen_to_graph(center);
		assert!((after.x - anchor.x).abs() < 1e-9 && (after.y - anchor.y).abs() < 1e-9);
	}

	#[test]
	fn pinch_is_clamped_to_zoom_max() {
		let mut view = loaded_view();
		let center = Point::new(400.0, 300.0);
		view.pointer_down(TOUCH, 1, offset(center, -50.0, 0.0));
		view.pointer_down(TOUCH, 2, offset(center, 50.0, 0.0));
		view.pointer_move(TOUCH, 2, offset(center, 250.0, 0.0));
		assert_eq!(view.transform().k, view.config().zoom_max);
	}

	#[test]
	fn lifting_one_finger_continues_as_pan() {
		let mut view = loaded_view();
		let center = Point::new(400.0, 300.0);
		view.pointer_down(TOUCH, 1, offset(center, -50.0, 0.0));
		view.pointer_down(TOUCH, 2, offset(center, 50.0, 0.0));
		assert_eq!(view.pointer_up(TOUCH, 1, offset(center, -50.0, 0.0)), None);
		let t = view.transform();
		view.pointer_move(TOUCH, 2, offset(center, 80.0, 20.0));
		assert_eq!(view.transform().x, t.x + 30.0);
		assert_eq!(view.transform().y, t.y + 20.0);
		// the pan was committed by the pinch, so lifting is not a tap
		assert_eq!(view.pointer_up(TOUCH, 2, offset(center, 80.0, 20.0)), None);
	}

	#[test]
	fn zero_distance_pinch_is_skipped() {
		let mut view = loaded_view();
		let p = Point::new(300.0, 300.0);
		let t = view.transform();
		view.pointer_down(TOUCH, 1, p);
		view.pointer_down(TOUCH, 2, p);
		view.pointer_move(TOUCH, 2, offset(p, 10.0, 0.0));
		assert_eq!(view.transform(), t);
	}

	#[test]
	fn cancel_mid_drag_keeps_node_and_fires_nothing() {
		let mut view = loaded_view();
		let a = screen_of(&view, "A");
		view.pointer_down(MOUSE, 0, a);
		view.pointer_move(MOUSE, 0, offset(a, 30.0, 0.0));
		let moved = view.node("A").unwrap().position();
		view.pointer_cancel();
		assert!(!view.is_dragging());
		assert_eq!(view.node("A").unwrap().pinned, Some(moved));
		assert_eq!(view.pointer_up(MOUSE, 0, a), None);
		assert_eq!(view.cursor(), "grab");
	}

	#[test]
	fn double_click_on_empty_space_undoes_drags() {
		let mut view = loaded_view();
		let before = positions(&view);
		let a = screen_of(&view, "A");
		view.pointer_down(MOUSE, 0, a);
		view.pointer_move(MOUSE, 0, offset(a, 60.0, 0.0));
		view.pointer_up(MOUSE, 0, offset(a, 60.0, 0.0));

		let moved_to = offset(a, 60.0, 0.0);
		assert!(!view.double_click(moved_to));
		assert_ne!(positions(&view), before);

		assert!(view.double_click(empty_spot(&view)));
		assert_eq!(positions(&view), before);
		assert!(view.nodes().iter().all(|n| n.pinned.is_none()));
		// the drag's nudge does not outlive the reset
		view.take_dirty();
		assert!(!view.step());
	}

	#[test]
	fn client_coordinates_are_mapped_through_the_surface() {
		let mut view = GraphView::new(GraphConfig::default());
		let mut metrics = SurfaceMetrics::for_size(800.0, 600.0, 2.0);
		metrics.rect_left = 100.0;
		metrics.rect_top = 40.0;
		view.resize(metrics);
		view.set_elements(&sample_elements());
		let a = screen_of(&view, "A");
		let client = offset(a, 100.0, 40.0);
		view.pointer_down(MOUSE, 0, client);
		assert_eq!(view.pointer_up(MOUSE, 0, client), Some(GraphEvent::NodeClick("A".into())));
	}

	proptest! {
		#[test]
		fn zoom_stays_in_range(deltas in proptest::collection::vec(-500.0f64..500.0, 1..40)) {
			let mut view = loaded_view();
			for d in deltas {
				view.wheel(Point::new(200.0, 100.0), d);
				let k = view.transform().k;
				prop_assert!(k >= view.config().zoom_min && k <= view.config().zoom_max);
			}
		}

		#[test]
		fn pinch_ratio_never_escapes_zoom_range(spread in 0.0f64..2000.0) {
			let mut view = loaded_view();
			let c = Point::new(400.0, 300.0);
			view.pointer_down(TOUCH, 1, offset(c, -20.0, 0.0));
			view.pointer_down(TOUCH, 2, offset(c, 20.0, 0.0));
			view.pointer_move(TOUCH, 2, offset(c, spread, 0.0));
			let k = view.transform().k;
			prop_assert!(k >= view.config().zoom_min && k <= view.config().zoom_max);
		}

		#[test]
		fn panning_never_moves_nodes(
			moves in proptest::collection::vec((-200.0f64..200.0, -200.0f64..200.0), 1..20),
		) {
			let mut view = loaded_view();
			let before = positions(&view);
			let start = empty_spot(&view);
			view.pointer_down(MOUSE, 0, start);
			for (dx, dy) in moves {
				view.pointer_move(MOUSE, 0, offset(start, dx, dy));
			}
			view.pointer_up(MOUSE, 0, start);
			prop_assert_eq!(positions(&view), before);
		}
	}
}
