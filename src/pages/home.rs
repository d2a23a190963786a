use leptos::ev::MouseEvent;
use leptos::prelude::*;
use serde_json::{Value, json};

use crate::components::force_graph::{ForceGraphCanvas, GraphElement};

const TOPICS: [&str; 3] = ["rust", "web", "graphics"];

/// Sample records in the loose shapes real backends emit: mixed id keys,
/// numeric ids, a nested endpoint, a dangling edge and a repeated edge.
fn sample_records() -> Vec<Value> {
	vec![
		json!({"id": "rust", "name": "Rust", "type": "Topic"}),
		json!({"id": "web", "name": "Web platform", "type": "topic"}),
		json!({"id": "graphics", "title": "Graphics", "category": "topic"}),
		json!({"node_id": "leptos", "label": "Leptos", "kind": "framework"}),
		json!({"node_id": "wasm", "label": "WebAssembly", "kind": "runtime"}),
		json!({"uuid": "canvas", "name": "Canvas 2D", "kind": "api", "color": "#d95f02"}),
		json!({"id": 7, "label": "wasm-bindgen", "entity_type": "tool"}),
		json!({"id": "serde", "label": "serde", "type": "library"}),
		json!({"id": "d3", "label": "d3-force", "type": "library"}),
		json!({
			"id": "layout",
			"label": "Force-directed layout with a deliberately long name",
			"type": "concept"
		}),
		json!({"source": "leptos", "target": "rust", "relation": "written in"}),
		json!({"source": "leptos", "target": "wasm", "relation": "compiles to"}),
		json!({"source": "wasm", "target": "web", "predicate": "runs on"}),
		json!({"source": 7, "target": "wasm", "label": "binds"}),
		json!({"source": {"id": "canvas"}, "target": "web", "label": "part of"}),
		json!({"source": "canvas", "target": "graphics", "label": "draws"}),
		json!({"source": "serde", "target": "rust", "label": "crate for"}),
		json!({"source": "d3", "target": "layout", "label": "implements"}),
		json!({"source": "layout", "target": "graphics", "label": "part of"}),
		json!({"source": "layout", "target": "graphics", "label": "part of"}),
		json!({"source": "d3", "target": "web"}),
		json!({"source": "leptos", "target": "missing", "label": "dangling"}),
	]
}

fn sample_elements() -> Vec<GraphElement> {
	sample_records().into_iter().map(GraphElement::from).collect()
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (elements, set_elements) = signal(sample_elements());
	let (selected_node, set_selected_node) = signal(None::<String>);
	let (selected_edge, set_selected_edge) = signal(None::<String>);
	let (highlighted, set_highlighted) = signal(None::<Vec<String>>);
	let (pan_target, set_pan_target) = signal(None::<String>);

	let on_node_click = move |id: String| {
		set_selected_edge.set(None);
		set_selected_node.set(Some(id));
	};
	let on_edge_click = move |id: String| {
		set_selected_node.set(None);
		set_selected_edge.set(Some(id));
	};
	let toggle_topics = move |_: MouseEvent| {
		set_highlighted.update(|h| {
			*h = if h.is_some() {
				None
			} else {
				Some(TOPICS.iter().map(|t| t.to_string()).collect())
			}
		})
	};
	let focus_selected = move |_: MouseEvent| {
		let target = selected_node.get_untracked().unwrap_or_else(|| "rust".to_string());
		set_pan_target.set(Some(target));
	};
	let reload = move |_: MouseEvent| {
		set_selected_node.set(None);
		set_selected_edge.set(None);
		set_elements.set(sample_elements());
	};

	let status = move || match (selected_node.get(), selected_edge.get()) {
		(Some(node), _) => format!("Node: {node}"),
		(None, Some(edge)) => format!("Edge: {edge}"),
		(None, None) => "Nothing selected".to_string(),
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas
					elements=elements
					selected_node_id=selected_node
					selected_edge_id=selected_edge
					highlighted_node_ids=highlighted
					center_node_id="rust".to_string()
					pan_to_node_id=pan_target
					on_pan_to_node_complete=move |()| set_pan_target.set(None)
					on_node_click=on_node_click
					on_edge_click=on_edge_click
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Knowledge Graph"</h1>
					<p class="subtitle">
						"Drag nodes to reposition. Scroll or pinch to zoom. \
							Drag background to pan. Double-click background to reset the layout."
					</p>
					<p class="selection">{status}</p>
					<button on:click=focus_selected>"Focus"</button>
					<button on:click=toggle_topics>"Highlight topics"</button>
					<button on:click=reload>"Reload"</button>
				</div>
			</div>
		</ErrorBoundary>
	}
}
