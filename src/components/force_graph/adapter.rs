//! Normalises loosely shaped node/edge records into the view model.
//!
//! Upstream data is expected to be occasionally incomplete, so nothing here
//! fails: records without a usable identifier and edges with unresolvable
//! endpoints are dropped and only counted.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde_json::Value;

use super::color::category_color;
use super::config::AdapterConfig;
use super::types::{AdaptedGraph, GraphElement, LinkSpec, ViewLink, ViewNode};

fn value_to_id(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

fn value_to_text(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Endpoints may be plain ids or embedded node objects.
fn endpoint_id(value: &Value, config: &AdapterConfig) -> Option<String> {
	match value {
		Value::Object(map) => config
			.id_keys
			.iter()
			.find_map(|k| map.get(k).filter(|v| !v.is_null()))
			.and_then(value_to_id),
		other => value_to_id(other),
	}
}

fn tier_for(category: Option<&str>, config: &AdapterConfig) -> u8 {
	let Some(category) = category else {
		return config.default_tier;
	};
	let category = category.to_lowercase();
	let prominent = config
		.prominent_categories
		.iter()
		.any(|name| category.contains(&name.to_lowercase()));
	if prominent {
		config.prominent_tier
	} else {
		config.default_tier
	}
}

/// `None` for node records. Endpoints that are present but unusable come
/// back as inner `None`s so the edge is dropped rather than read as a node.
fn edge_endpoints(
	el: &GraphElement,
	config: &AdapterConfig,
) -> Option<(Option<String>, Option<String>)> {
	let source = el.get(&config.source_key)?;
	let target = el.get(&config.target_key)?;
	Some((endpoint_id(source, config), endpoint_id(target, config)))
}

/// Split `elements` into adapted nodes and edge specs.
///
/// The result is a pure function of the input. Edge specs only reference
/// node ids present in `nodes`; their ids are not yet de-duplicated (see
/// [`resolve_links`]).
pub fn adapt(elements: &[GraphElement], config: &AdapterConfig) -> AdaptedGraph {
	let mut nodes = Vec::new();
	let mut known = HashSet::new();
	let mut edge_records = Vec::new();
	let mut dropped = 0usize;

	for el in elements {
		if let Some(endpoints) = edge_endpoints(el, config) {
			edge_records.push((el, endpoints));
			continue;
		}
		let Some(id) = el.first_of(&config.id_keys).and_then(value_to_id) else {
			dropped += 1;
			continue;
		};
		if !known.insert(id.clone()) {
			dropped += 1;
			continue;
		}
		let category = value_to_text(el.first_of(&config.category_keys));
		let label = value_to_text(el.first_of(&config.label_keys))
			.filter(|l| !l.is_empty())
			.unwrap_or_else(|| id.clone());
		let color = value_to_text(el.first_of(&config.color_keys))
			.unwrap_or_else(|| category_color(category.as_deref()).to_string());
		let tier = tier_for(category.as_deref(), config);
		nodes.push(ViewNode::new(id, label, tier, color));
	}

	let mut links = Vec::with_capacity(edge_records.len());
	for (el, endpoints) in edge_records {
		let (Some(source), Some(target)) = endpoints else {
			dropped += 1;
			continue;
		};
		if !known.contains(&source) || !known.contains(&target) {
			dropped += 1;
			continue;
		}
		let label = value_to_text(el.first_of(&config.edge_label_keys)).unwrap_or_default();
		let id = el
			.first_of(&config.id_keys)
			.and_then(value_to_id)
			.unwrap_or_else(|| {
				if label.is_empty() {
					format!("{source}->{target}")
				} else {
					format!("{source}->{target}:{label}")
				}
			});
		links.push(LinkSpec {
			id,
			label,
			source,
			target,
		});
	}

	if dropped > 0 {
		debug!(
			"adapter kept {} nodes and {} edges, dropped {} records",
			nodes.len(),
			links.len(),
			dropped
		);
	}
	AdaptedGraph { nodes, links }
}

/// Bind edge specs to node indices and make edge ids unique.
///
/// The second and later edges sharing an id become `id#2`, `id#3`, ... so
/// each stays independently addressable. Specs whose endpoints are not in
/// `nodes` are dropped.
pub fn resolve_links(nodes: &[ViewNode], specs: &[LinkSpec]) -> Vec<ViewLink> {
	let index: HashMap<&str, usize> = nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.id.as_str(), i))
		.collect();
	let mut taken: HashSet<String> = HashSet::with_capacity(specs.len());
	let mut links = Vec::with_capacity(specs.len());

	for spec in specs {
		let (Some(&source), Some(&target)) =
			(index.get(spec.source.as_str()), index.get(spec.target.as_str()))
		else {
			continue;
		};
		let mut id = spec.id.clone();
		let mut suffix = 2;
		while taken.contains(&id) {
			id = format!("{}#{}", spec.id, suffix);
			suffix += 1;
		}
		taken.insert(id.clone());
		links.push(ViewLink {
			id,
			label: spec.label.clone(),
			source,
			target,
		});
	}
	links
}
