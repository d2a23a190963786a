//! Layout strategy backed by the `force_graph` crate's spring/charge
//! integrator, driven by the same alpha cooling schedule as
//! [`ForceSimulation`](super::layout::ForceSimulation).

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::config::SimulationConfig;
use super::layout::{LayoutStrategy, seed_positions};
use super::types::{Bounds, Point, ViewLink, ViewNode};

const FRAME_DT: f32 = 0.016;

/// Settle-only layout: nodes never move after load except when dragged.
pub struct SpringLayout {
	config: SimulationConfig,
}

impl SpringLayout {
	/// Uses the cooling schedule of `config`; the forces are the crate's own.
	pub fn new(config: SimulationConfig) -> Self {
		Self { config }
	}

	fn parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

impl LayoutStrategy for SpringLayout {
	fn settle(&mut self, nodes: &[ViewNode], links: &[ViewLink], bounds: Bounds) -> Vec<Point> {
		let mut seeded = nodes.to_vec();
		seed_positions(&mut seeded, bounds.center());

		let mut graph: ForceGraph<usize, ()> = ForceGraph::new(self.parameters());
		let indices: Vec<_> = seeded
			.iter()
			.enumerate()
			.map(|(i, node)| {
				graph.add_node(NodeData {
					x: node.x as f32,
					y: node.y as f32,
					mass: 10.0,
					is_anchor: node.pinned.is_some(),
					user_data: i,
				})
			})
			.collect();
		for link in links {
			if link.source != link.target {
				graph.add_edge(indices[link.source], indices[link.target], EdgeData::default());
			}
		}

		let mut alpha = 1.0;
		let mut ticks = 0;
		while alpha >= self.config.settle_alpha_min && ticks < self.config.max_settle_ticks {
			graph.update(FRAME_DT * alpha as f32);
			alpha *= 1.0 - self.config.alpha_decay;
			ticks += 1;
		}
		debug!("spring layout settled after {} ticks", ticks);

		let mut positions: Vec<Point> = seeded.iter().map(ViewNode::position).collect();
		graph.visit_nodes(|node| {
			let p = Point::new(f64::from(node.x()), f64::from(node.y()));
			if p.x.is_finite() && p.y.is_finite() {
				positions[node.data.user_data] = bounds.clamp(p);
			}
		});
		positions
	}
}
