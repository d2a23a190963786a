//! Force-directed layout: springs along edges, charge between every pair,
//! a centring pull and radius-aware collision, cooled by a decaying alpha.

use std::f64::consts::PI;

use log::debug;

use super::config::SimulationConfig;
use super::types::{Bounds, Point, ViewLink, ViewNode};

/// Computes rest positions for a freshly loaded graph and, optionally,
/// keeps nudging them while the user drags.
pub trait LayoutStrategy {
	/// Run to convergence on the calling thread. Returns one position per
	/// node, in node order, inside `bounds`.
	fn settle(&mut self, nodes: &[ViewNode], links: &[ViewLink], bounds: Bounds) -> Vec<Point>;

	/// A drag crossed its threshold. Strategies without an interactive phase
	/// ignore it, so dragging only moves the dragged node.
	fn nudge(&mut self) {}

	/// Stop all interactive motion.
	fn freeze(&mut self) {}

	/// Advance one animation frame. Returns whether any node may have moved.
	fn tick(&mut self, _nodes: &mut [ViewNode], _links: &[ViewLink], _bounds: Bounds) -> bool {
		false
	}
}

/// Phyllotaxis seed placement around `center`, same input gives same output.
pub fn seed_positions(nodes: &mut [ViewNode], center: Point) {
	let golden = PI * (3.0 - 5f64.sqrt());
	for (i, node) in nodes.iter_mut().enumerate() {
		if let Some(p) = node.pinned {
			node.set_position(p);
		} else {
			let radius = 10.0 * (0.5 + i as f64).sqrt();
			let angle = i as f64 * golden;
			node.x = center.x + radius * angle.cos();
			node.y = center.y + radius * angle.sin();
		}
		node.vx = 0.0;
		node.vy = 0.0;
	}
}

// Tiny deterministic offset for coincident points.
fn jiggle(seed: usize) -> f64 {
	((seed % 7) as f64 + 1.0) * 1e-6
}

/// Alpha-cooled force simulation.
///
/// Settles a new graph from alpha 1 down to the settle floor, then stays
/// frozen. A drag start adds a small amount of energy that decays below the
/// interactive floor within a few dozen frames.
#[derive(Clone, Debug)]
pub struct ForceSimulation {
	config: SimulationConfig,
	tier_radius: [f64; 5],
	alpha: f64,
}

impl ForceSimulation {
	/// Simulation with the given forces; node radii come from `tier_radius`.
	pub fn new(config: SimulationConfig, tier_radius: [f64; 5]) -> Self {
		Self {
			config,
			tier_radius,
			alpha: 0.0,
		}
	}

	/// True while ticking still moves things.
	pub fn is_hot(&self) -> bool {
		self.alpha >= self.config.alpha_min
	}

	fn radius(&self, node: &ViewNode) -> f64 {
		self.tier_radius[usize::from(node.tier.clamp(1, 5)) - 1]
	}

	/// Seed positions and run until alpha falls below the settle floor.
	/// Returns the number of ticks taken.
	pub fn settle_in_place(
		&mut self,
		nodes: &mut [ViewNode],
		links: &[ViewLink],
		bounds: Bounds,
	) -> usize {
		seed_positions(nodes, bounds.center());
		self.alpha = 1.0;
		let mut ticks = 0;
		while self.alpha >= self.config.settle_alpha_min && ticks < self.config.max_settle_ticks {
			self.advance(nodes, links, bounds);
			ticks += 1;
		}
		debug!(
			"layout settled after {} ticks (alpha {:.4}), {} nodes, {} links",
			ticks,
			self.alpha,
			nodes.len(),
			links.len()
		);
		self.alpha = 0.0;
		for node in nodes.iter_mut() {
			node.vx = 0.0;
			node.vy = 0.0;
		}
		ticks
	}

	/// Advance one step regardless of alpha. Pinned nodes stay at their pin;
	/// every node ends inside `bounds`.
	pub fn advance(&mut self, nodes: &mut [ViewNode], links: &[ViewLink], bounds: Bounds) {
		self.alpha *= 1.0 - self.config.alpha_decay;
		let alpha = self.alpha;
		if nodes.is_empty() {
			return;
		}

		self.apply_links(nodes, links, alpha);
		self.apply_charge(nodes, alpha);
		self.apply_center(nodes, bounds.center(), alpha);
		self.apply_collision(nodes);

		let keep = 1.0 - self.config.velocity_decay;
		for node in nodes.iter_mut() {
			if let Some(p) = node.pinned {
				node.set_position(bounds.clamp(p));
				node.vx = 0.0;
				node.vy = 0.0;
				continue;
			}
			node.vx *= keep;
			node.vy *= keep;
			let next = Point::new(node.x + node.vx, node.y + node.vy);
			let clamped = bounds.clamp(next);
			if clamped.x != next.x {
				node.vx = 0.0;
			}
			if clamped.y != next.y {
				node.vy = 0.0;
			}
			node.set_position(clamped);
		}
	}

	fn apply_links(&self, nodes: &mut [ViewNode], links: &[ViewLink], alpha: f64) {
		let mut degree = vec![0usize; nodes.len()];
		for link in links {
			degree[link.source] += 1;
			degree[link.target] += 1;
		}
		for (i, link) in links.iter().enumerate() {
			if link.source == link.target {
				continue;
			}
			let (s, t) = (&nodes[link.source], &nodes[link.target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 && dy == 0.0 {
				dx = jiggle(i);
				dy = jiggle(i + 3);
			}
			let len = (dx * dx + dy * dy).sqrt();
			let (ds, dt) = (degree[link.source] as f64, degree[link.target] as f64);
			let strength = 1.0 / ds.min(dt);
			let l = (len - self.config.link_distance) / len * alpha * strength;
			let (fx, fy) = (dx * l, dy * l);
			let bias = ds / (ds + dt);
			let target = &mut nodes[link.target];
			target.vx -= fx * bias;
			target.vy -= fy * bias;
			let source = &mut nodes[link.source];
			source.vx += fx * (1.0 - bias);
			source.vy += fy * (1.0 - bias);
		}
	}

	fn apply_charge(&self, nodes: &mut [ViewNode], alpha: f64) {
		let strength = self.config.charge_strength * alpha;
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let mut dx = nodes[j].x - nodes[i].x;
				let mut dy = nodes[j].y - nodes[i].y;
				if dx == 0.0 && dy == 0.0 {
					dx = jiggle(i + j);
					dy = jiggle(i * 31 + j);
				}
				let l2 = (dx * dx + dy * dy).max(1.0);
				let w = strength / l2;
				nodes[i].vx += dx * w;
				nodes[i].vy += dy * w;
				nodes[j].vx -= dx * w;
				nodes[j].vy -= dy * w;
			}
		}
	}

	fn apply_center(&self, nodes: &mut [ViewNode], center: Point, alpha: f64) {
		let k = self.config.center_strength * alpha;
		for node in nodes.iter_mut() {
			node.vx += (center.x - node.x) * k;
			node.vy += (center.y - node.y) * k;
		}
	}

	fn apply_collision(&self, nodes: &mut [ViewNode]) {
		let pad = self.config.collision_padding;
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let (ri, rj) = (self.radius(&nodes[i]) + pad, self.radius(&nodes[j]) + pad);
				let r = ri + rj;
				let mut dx = nodes[j].x + nodes[j].vx - nodes[i].x - nodes[i].vx;
				let mut dy = nodes[j].y + nodes[j].vy - nodes[i].y - nodes[i].vy;
				let mut l2 = dx * dx + dy * dy;
				if l2 >= r * r {
					continue;
				}
				if l2 == 0.0 {
					dx = jiggle(i + j);
					dy = jiggle(i + 2 * j);
					l2 = dx * dx + dy * dy;
				}
				let l = l2.sqrt();
				let push = (r - l) / l * 0.7;
				let share = rj * rj / (ri * ri + rj * rj);
				nodes[i].vx -= dx * push * share;
				nodes[i].vy -= dy * push * share;
				nodes[j].vx += dx * push * (1.0 - share);
				nodes[j].vy += dy * push * (1.0 - share);
			}
		}
	}
}

impl LayoutStrategy for ForceSimulation {
	fn settle(&mut self, nodes: &[ViewNode], links: &[ViewLink], bounds: Bounds) -> Vec<Point> {
		let mut working = nodes.to_vec();
		self.settle_in_place(&mut working, links, bounds);
		working.iter().map(ViewNode::position).collect()
	}

	fn nudge(&mut self) {
		self.alpha = self.alpha.max(self.config.drag_alpha);
	}

	fn freeze(&mut self) {
		self.alpha = 0.0;
	}

	fn tick(&mut self, nodes: &mut [ViewNode], links: &[ViewLink], bounds: Bounds) -> bool {
		if !self.is_hot() {
			return false;
		}
		self.advance(nodes, links, bounds);
		true
	}
}
