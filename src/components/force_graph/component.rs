use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, ResizeObserver, TouchEvent, TouchList, WheelEvent};

use super::config::GraphConfig;
use super::interaction::PointerKind;
use super::render;
use super::scale::{SurfaceMetrics, sanitize_dpr};
use super::state::GraphView;
use super::surface::{CanvasError, CanvasSurface};
use super::types::{GraphElement, GraphEvent, Point};

const MOUSE_POINTER: i32 = -1;

type Shared<T> = Rc<RefCell<T>>;

/// Size the backing store to the container and feed the new geometry to the view.
fn sync_size(
	view: &mut GraphView,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
) -> Result<bool, CanvasError> {
	let window = web_sys::window().ok_or(CanvasError::NoWindow)?;
	let dpr = sanitize_dpr(window.device_pixel_ratio());
	let (w, h) = if fullscreen {
		(
			window.inner_width()?.as_f64().unwrap_or(0.0),
			window.inner_height()?.as_f64().unwrap_or(0.0),
		)
	} else {
		canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64))
			.unwrap_or((0.0, 0.0))
	};

	let metrics = SurfaceMetrics::for_size(w, h, dpr);
	let (bw, bh) = (metrics.backing_width as u32, metrics.backing_height as u32);
	if canvas.width() != bw || canvas.height() != bh {
		canvas.set_width(bw);
		canvas.set_height(bh);
	}
	let style = web_sys::HtmlElement::style(canvas);
	style.set_property("width", &format!("{w}px"))?;
	style.set_property("height", &format!("{h}px"))?;

	let changed = view.resize(metrics);
	observe_rect(view, canvas);
	Ok(changed)
}

fn observe_rect(view: &mut GraphView, canvas: &HtmlCanvasElement) {
	let rect = canvas.get_bounding_client_rect();
	let offset = web_sys::window()
		.and_then(|w| w.visual_viewport())
		.map(|vv| Point::new(vv.offset_left(), vv.offset_top()))
		.unwrap_or_default();
	view.observe_rect(rect.left(), rect.top(), rect.width(), rect.height(), offset);
}

fn client_point(ev: &MouseEvent) -> Point {
	Point::new(ev.client_x() as f64, ev.client_y() as f64)
}

fn touches(list: &TouchList) -> impl Iterator<Item = (i32, Point)> + '_ {
	(0..list.length()).filter_map(move |i| {
		list.get(i)
			.map(|t| (t.identifier(), Point::new(t.client_x() as f64, t.client_y() as f64)))
	})
}

fn dispatch(
	event: Option<GraphEvent>,
	on_node_click: Option<Callback<String>>,
	on_edge_click: Option<Callback<String>>,
) {
	match event {
		Some(GraphEvent::NodeClick(id)) => {
			if let Some(cb) = on_node_click {
				cb.run(id);
			}
		}
		Some(GraphEvent::EdgeClick(id)) => {
			if let Some(cb) = on_edge_click {
				cb.run(id);
			}
		}
		None => {}
	}
}

/// Interactive force-directed view of a list of node/edge records.
#[component]
pub fn ForceGraphCanvas(
	/// Node and edge records; replaced wholesale on change.
	#[prop(into)]
	elements: Signal<Vec<GraphElement>>,
	/// Externally selected node.
	#[prop(into, optional)]
	selected_node_id: MaybeProp<String>,
	/// Externally selected edge.
	#[prop(into, optional)]
	selected_edge_id: MaybeProp<String>,
	/// Nodes to keep bright while the rest dims.
	#[prop(into, optional)]
	highlighted_node_ids: MaybeProp<Vec<String>>,
	/// Node to centre on after each full layout.
	#[prop(into, optional)]
	center_node_id: MaybeProp<String>,
	/// One-shot recentre request, acknowledged through `on_pan_to_node_complete`.
	#[prop(into, optional)]
	pan_to_node_id: MaybeProp<String>,
	/// Called once per pan request, whether or not the node exists.
	#[prop(optional, into)]
	on_pan_to_node_complete: Option<Callback<()>>,
	/// Receives the id of a clicked or tapped node.
	#[prop(optional, into)]
	on_node_click: Option<Callback<String>>,
	/// Receives the id of a clicked or tapped edge.
	#[prop(optional, into)]
	on_edge_click: Option<Callback<String>>,
	/// Tunables; defaults when absent.
	#[prop(optional)]
	config: Option<GraphConfig>,
	/// Fill the window instead of the parent element.
	#[prop(default = false)]
	fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let view: Shared<GraphView> =
		Rc::new(RefCell::new(GraphView::new(config.unwrap_or_default())));
	let animate: Shared<Option<Closure<dyn FnMut()>>> = Rc::new(RefCell::new(None));
	let resize: Shared<Option<(ResizeObserver, Closure<dyn FnMut()>)>> =
		Rc::new(RefCell::new(None));
	let window_resize: Shared<Option<Closure<dyn FnMut()>>> = Rc::new(RefCell::new(None));
	let started = Rc::new(Cell::new(false));

	let view_setup = view.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if started.replace(true) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let mut surface = match CanvasSurface::new(&canvas) {
			Ok(surface) => surface,
			Err(err) => {
				warn!("graph canvas unavailable: {err}");
				return;
			}
		};
		if let Err(err) = sync_size(&mut view_setup.borrow_mut(), &canvas, fullscreen) {
			warn!("initial canvas sizing failed: {err}");
		}

		let (view_resize, canvas_resize) = (view_setup.clone(), canvas.clone());
		let on_resize = move || {
			if let Err(err) = sync_size(&mut view_resize.borrow_mut(), &canvas_resize, fullscreen) {
				warn!("canvas resize failed: {err}");
			}
		};
		let Some(window) = web_sys::window() else {
			warn!("{}", CanvasError::NoWindow);
			return;
		};
		if fullscreen {
			let cb = Closure::<dyn FnMut()>::new(on_resize);
			let listener = cb.as_ref().unchecked_ref();
			if let Err(err) = window.add_event_listener_with_callback("resize", listener) {
				warn!("{}", CanvasError::from(err));
			}
			*window_resize.borrow_mut() = Some(cb);
		} else if let Some(parent) = canvas.parent_element() {
			let cb = Closure::<dyn FnMut()>::new(on_resize);
			match ResizeObserver::new(cb.as_ref().unchecked_ref()) {
				Ok(observer) => {
					observer.observe(&parent);
					*resize.borrow_mut() = Some((observer, cb));
				}
				Err(err) => warn!("{}", CanvasError::from(err)),
			}
		}

		let view_anim = view_setup.clone();
		let (animate_inner, canvas_anim) = (animate.clone(), canvas.clone());
		let cursor = Cell::new("");
		*animate.borrow_mut() = Some(Closure::new(move || {
			{
				let mut v = view_anim.borrow_mut();
				if v.step() {
					render::render(&v, &mut surface);
				}
				let next = v.cursor();
				if cursor.replace(next) != next {
					let style = web_sys::HtmlElement::style(&canvas_anim);
					let _ = style.set_property("cursor", next);
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// centre target must be in place before the elements effect lays out
	let view_center = view.clone();
	Effect::new(move |_| view_center.borrow_mut().set_center_node(center_node_id.get()));

	let view_elements = view.clone();
	Effect::new(move |_| {
		let els = elements.get();
		debug!("graph received {} elements", els.len());
		view_elements.borrow_mut().set_elements(&els);
	});

	let view_selection = view.clone();
	Effect::new(move |_| {
		let mut v = view_selection.borrow_mut();
		v.set_selected_node(selected_node_id.get());
		v.set_selected_edge(selected_edge_id.get());
		v.set_highlighted(highlighted_node_ids.get().unwrap_or_default());
	});

	let view_pan = view.clone();
	Effect::new(move |_| {
		let Some(id) = pan_to_node_id.get() else {
			return;
		};
		view_pan.borrow_mut().pan_to_node(&id, |found| {
			if !found {
				debug!("pan target {id} is not in the graph");
			}
		});
		if let Some(cb) = on_pan_to_node_complete {
			cb.run(());
		}
	});

	let view_md = view.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let mut v = view_md.borrow_mut();
		if let Some(canvas) = canvas_ref.get_untracked() {
			observe_rect(&mut v, &canvas);
		}
		v.pointer_down(PointerKind::Mouse, MOUSE_POINTER, client_point(&ev));
	};

	let view_mm = view.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let mut v = view_mm.borrow_mut();
		// the page may have scrolled since the last event
		if let Some(canvas) = canvas_ref.get_untracked() {
			observe_rect(&mut v, &canvas);
		}
		v.pointer_move(PointerKind::Mouse, MOUSE_POINTER, client_point(&ev));
	};

	let view_mu = view.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let event = view_mu
			.borrow_mut()
			.pointer_up(PointerKind::Mouse, MOUSE_POINTER, client_point(&ev));
		dispatch(event, on_node_click, on_edge_click);
	};

	let view_dc = view.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let mut v = view_dc.borrow_mut();
		if let Some(canvas) = canvas_ref.get_untracked() {
			observe_rect(&mut v, &canvas);
		}
		if v.double_click(client_point(&ev)) {
			debug!("layout reset to settled positions");
		}
	};

	let view_ml = view.clone();
	let on_mouseleave = move |_: MouseEvent| view_ml.borrow_mut().pointer_cancel();

	let view_wh = view.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mut v = view_wh.borrow_mut();
		if let Some(canvas) = canvas_ref.get_untracked() {
			observe_rect(&mut v, &canvas);
		}
		v.wheel(client_point(&ev), ev.delta_y());
	};

	let view_ts = view.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let mut v = view_ts.borrow_mut();
		if let Some(canvas) = canvas_ref.get_untracked() {
			observe_rect(&mut v, &canvas);
		}
		for (id, p) in touches(&ev.changed_touches()) {
			v.pointer_down(PointerKind::Touch, id, p);
		}
	};

	let view_tm = view.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let mut v = view_tm.borrow_mut();
		if let Some(canvas) = canvas_ref.get_untracked() {
			observe_rect(&mut v, &canvas);
		}
		for (id, p) in touches(&ev.changed_touches()) {
			v.pointer_move(PointerKind::Touch, id, p);
		}
	};

	let view_te = view.clone();
	let on_touchend = move |ev: TouchEvent| {
		ev.prevent_default();
		let events: Vec<_> = {
			let mut v = view_te.borrow_mut();
			touches(&ev.changed_touches())
				.filter_map(|(id, p)| v.pointer_up(PointerKind::Touch, id, p))
				.collect()
		};
		for event in events {
			dispatch(Some(event), on_node_click, on_edge_click);
		}
	};

	let view_tc = view;
	let on_touchcancel = move |_: TouchEvent| view_tc.borrow_mut().pointer_cancel();

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:dblclick=on_dblclick
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:touchcancel=on_touchcancel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
