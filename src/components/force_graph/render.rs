use super::color::{ACTIVE_EDGE_COLOR, BACKGROUND, EDGE_COLOR, LABEL_COLOR, darken};
use super::state::GraphView;
use super::surface::{Surface, TextAlign, TextStyle};
use super::types::Point;

const ELLIPSIS: char = '\u{2026}';

/// Emphasis of a drawn element relative to the hovered node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
	/// Unrelated to the hovered node; drawn darkened underneath everything.
	Dimmed,
	/// Nothing is hovered, or not involved in the hover.
	Normal,
	/// In the highlight set or the selected (but not active) edge.
	Highlighted,
	/// Incident to, or a neighbour of, the hovered node.
	Incident,
	/// Hovered, selected or dragged.
	Active,
}

/// One paint step; indices refer to [`GraphView::nodes`] and [`GraphView::links`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOp {
	/// Edge line.
	Edge {
		/// Link index.
		link: usize,
		/// Emphasis.
		tone: Tone,
	},
	/// Edge label at the segment midpoint.
	EdgeLabel {
		/// Link index.
		link: usize,
		/// Emphasis.
		tone: Tone,
	},
	/// Node circle and its label.
	Node {
		/// Node index.
		node: usize,
		/// Emphasis.
		tone: Tone,
		/// Draw the label untruncated.
		full_label: bool,
	},
}

/// Everything to draw this frame, in paint order.
///
/// The order is a fixed priority stack so that important elements are never
/// covered by unimportant ones: dimmed edges, dimmed edge labels, dimmed
/// nodes, ordinary edges, incident edges, the active edge, ordinary edge
/// labels, incident edge labels (skipped when the hovered node's degree is
/// above the cap), the active edge label, then every non-dimmed node.
pub fn plan_frame(view: &GraphView) -> Vec<DrawOp> {
	let (nodes, links) = (view.nodes(), view.links());
	let hovered = view.interaction.hovered_node;
	let dragged = view.interaction.dragged_node();
	let selected_node = view.selection.node.as_deref().and_then(|id| view.node_index(id));
	let selected_edge = view.selection.edge.as_deref().and_then(|id| view.link_index(id));
	let active_edge = match hovered {
		None => view.interaction.hovered_edge.or(selected_edge),
		Some(_) => selected_edge,
	};

	let mut neighbor = vec![false; nodes.len()];
	let mut degree = 0;
	if let Some(h) = hovered {
		for link in links.iter().filter(|l| l.touches(h)) {
			degree += 1;
			neighbor[if link.source == h { link.target } else { link.source }] = true;
		}
	}

	let node_focus =
		|i: usize| Some(i) == hovered || Some(i) == selected_node || Some(i) == dragged;
	let node_tone = |i: usize| {
		if node_focus(i) {
			Tone::Active
		} else if neighbor[i] {
			Tone::Incident
		} else if view.selection.highlighted.contains(&nodes[i].id) {
			Tone::Highlighted
		} else if hovered.is_some() {
			Tone::Dimmed
		} else {
			Tone::Normal
		}
	};
	let edge_tones: Vec<Tone> = links
		.iter()
		.enumerate()
		.map(|(i, link)| {
			if Some(i) == active_edge {
				Tone::Active
			} else if hovered.is_some_and(|h| link.touches(h)) {
				Tone::Incident
			} else if Some(i) == selected_edge {
				Tone::Highlighted
			} else if hovered.is_some() {
				Tone::Dimmed
			} else {
				Tone::Normal
			}
		})
		.collect();
	let node_tones: Vec<Tone> = (0..nodes.len()).map(node_tone).collect();

	let edges_where = |pred: fn(Tone) -> bool| {
		edge_tones
			.iter()
			.enumerate()
			.filter(move |(_, t)| pred(**t))
			.map(|(link, tone)| (link, *tone))
	};
	let labelled = |link: &usize| !links[*link].label.is_empty();

	let mut ops = Vec::with_capacity(nodes.len() + links.len() * 2);
	let edge = |(link, tone): (usize, Tone)| DrawOp::Edge { link, tone };
	ops.extend(edges_where(|t| t == Tone::Dimmed).map(edge));
	ops.extend(
		edges_where(|t| t == Tone::Dimmed)
			.filter(|(l, _)| labelled(l))
			.map(|(link, tone)| DrawOp::EdgeLabel { link, tone }),
	);
	ops.extend(
		node_tones
			.iter()
			.enumerate()
			.filter(|(_, t)| **t == Tone::Dimmed)
			.map(|(node, tone)| DrawOp::Node {
				node,
				tone: *tone,
				full_label: false,
			}),
	);
	let ordinary = |t: Tone| matches!(t, Tone::Normal | Tone::Highlighted);
	ops.extend(edges_where(ordinary).map(edge));
	ops.extend(edges_where(|t| t == Tone::Incident).map(edge));
	ops.extend(edges_where(|t| t == Tone::Active).map(edge));
	ops.extend(
		edges_where(ordinary)
			.filter(|(l, _)| labelled(l))
			.map(|(link, tone)| DrawOp::EdgeLabel { link, tone }),
	);
	if degree <= view.config.label_degree_cap {
		ops.extend(
			edges_where(|t| t == Tone::Incident)
				.filter(|(l, _)| labelled(l))
				.map(|(link, tone)| DrawOp::EdgeLabel { link, tone }),
		);
	}
	ops.extend(
		edges_where(|t| t == Tone::Active)
			.filter(|(l, _)| labelled(l))
			.map(|(link, tone)| DrawOp::EdgeLabel { link, tone }),
	);
	ops.extend(
		node_tones
			.iter()
			.enumerate()
			.filter(|(_, t)| **t != Tone::Dimmed)
			.map(|(node, tone)| DrawOp::Node {
				node,
				tone: *tone,
				full_label: node_focus(node),
			}),
	);
	ops
}

/// Shorten `label` with an ellipsis until it fits `max_width`.
fn fit_label<S: Surface>(surface: &mut S, label: &str, font: &str, max_width: f64) -> String {
	if surface.measure_text(label, font) <= max_width {
		return label.to_string();
	}
	let chars: Vec<char> = label.chars().collect();
	let truncated = |end: usize| -> String {
		let mut candidate: String = chars[..end].iter().collect();
		candidate.push(ELLIPSIS);
		candidate
	};
	// longest prefix that still fits; width grows with the prefix length
	let (mut lo, mut hi) = (0, chars.len());
	while lo < hi {
		let mid = lo + (hi - lo).div_ceil(2);
		if surface.measure_text(&truncated(mid), font) <= max_width {
			lo = mid;
		} else {
			hi = mid - 1;
		}
	}
	truncated(lo)
}

/// Paint the current frame onto `surface`.
pub fn render<S: Surface>(view: &GraphView, surface: &mut S) {
	let transform = view.transform();
	let metrics = view.metrics();
	surface.begin_frame(metrics.surface_size(), metrics.device_pixel_ratio, BACKGROUND, &transform);

	let k = transform.k;
	let (nodes, links) = (view.nodes(), view.links());
	let hovered_color = view.interaction.hovered_node.map(|i| nodes[i].color.as_str());
	let edge_font = format!("{}px sans-serif", 10.0 / k.max(0.5));
	let layout_center = view.bounds().center();

	for op in plan_frame(view) {
		match op {
			DrawOp::Edge { link, tone } => {
				let link = &links[link];
				let (a, b) = (nodes[link.source].position(), nodes[link.target].position());
				if a.distance_sq(b) < 1e-6 {
					continue;
				}
				let (color, width) = match tone {
					Tone::Dimmed => (darken(EDGE_COLOR), 1.0),
					Tone::Normal => (EDGE_COLOR.to_string(), 1.2),
					Tone::Highlighted => (ACTIVE_EDGE_COLOR.to_string(), 2.0),
					Tone::Incident => (hovered_color.unwrap_or(EDGE_COLOR).to_string(), 2.0),
					Tone::Active => (ACTIVE_EDGE_COLOR.to_string(), 3.0),
				};
				surface.line(a, b, &color, width / k);
			}
			DrawOp::EdgeLabel { link, tone } => {
				let link = &links[link];
				let (a, b) = (nodes[link.source].position(), nodes[link.target].position());
				let color = match tone {
					Tone::Dimmed => darken(LABEL_COLOR),
					Tone::Active => ACTIVE_EDGE_COLOR.to_string(),
					_ => LABEL_COLOR.to_string(),
				};
				let style = TextStyle {
					font: edge_font.clone(),
					color,
					align: TextAlign::Center,
				};
				surface.text(&link.label, a.midpoint(b), &style);
			}
			DrawOp::Node {
				node,
				tone,
				full_label,
			} => {
				let node = &nodes[node];
				let radius = view.config.radius(node.tier);
				let pos = node.position();
				let fill = match tone {
					Tone::Dimmed => darken(&node.color),
					_ => node.color.clone(),
				};
				let stroke = match tone {
					Tone::Active => Some(("#ffffff", 2.0 / k)),
					Tone::Highlighted => Some((ACTIVE_EDGE_COLOR, 2.0 / k)),
					Tone::Incident => Some((LABEL_COLOR, 1.0 / k)),
					_ => None,
				};
				surface.circle(pos, radius, &fill, stroke);

				if node.label.is_empty() {
					continue;
				}
				let weight = if node.tier >= 4 { "bold " } else { "" };
				let size = (9.0 + f64::from(node.tier)) / k.max(0.5);
				let font = format!("{weight}{size}px sans-serif");
				let text = if full_label {
					node.label.clone()
				} else {
					fit_label(surface, &node.label, &font, view.config.max_label_width / k)
				};

				// labels sit outside the node on the ray from the layout centre
				let (dx, dy) = (pos.x - layout_center.x, pos.y - layout_center.y);
				let len = (dx * dx + dy * dy).sqrt();
				let (ux, uy) = if len < 1e-6 { (0.0, 1.0) } else { (dx / len, dy / len) };
				let gap = radius + 4.0 / k;
				let align = if ux > 0.25 {
					TextAlign::Left
				} else if ux < -0.25 {
					TextAlign::Right
				} else {
					TextAlign::Center
				};
				let style = TextStyle {
					font,
					color: match tone {
						Tone::Dimmed => darken(LABEL_COLOR),
						_ => LABEL_COLOR.to_string(),
					},
					align,
				};
				surface.text(&text, Point::new(pos.x + ux * gap, pos.y + uy * gap), &style);
			}
		}
	}
	surface.end_frame();
}
