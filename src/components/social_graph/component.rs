use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, DragEvent, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::interaction::Event;
use super::render;
use super::state::SocialGraphState;
use super::types::GraphData;

/// MIME type the hobby tokens put on the drag payload.
pub const ATTRIBUTE_MIME: &str = "text/plain";
const ZOOM_BUTTON_FACTOR: f64 = 1.2;

fn canvas_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((800.0, 600.0))
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas view of the user graph. Gestures are reported through `on_event`;
/// the canvas never mutates records itself.
#[component]
pub fn SocialGraphCanvas(
	#[prop(into)] graph: Signal<GraphData>,
	#[prop(into)] linking_source: Signal<Option<String>>,
	#[prop(into)] drop_target: Signal<Option<String>>,
	on_event: impl Fn(Event) + 'static,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<SocialGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let on_event = Rc::new(on_event);
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = canvas_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("2d canvas context unavailable");
			return;
		};
		let mut initial = SocialGraphState::new(graph.get_untracked(), w, h);
		initial.fit_once();
		*state_init.borrow_mut() = Some(initial);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = canvas_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_graph = state.clone();
	Effect::new(move |_| {
		let data = graph.get();
		if let Some(ref mut s) = *state_graph.borrow_mut() {
			s.set_graph(data);
			s.fit_once();
		}
	});

	let state_marks = state.clone();
	Effect::new(move |_| {
		let (source, target) = (linking_source.get(), drop_target.get());
		if let Some(ref mut s) = *state_marks.borrow_mut() {
			s.linking_source = source;
			s.drop_target = target;
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let (state_mu, emit_mu) = (state.clone(), on_event.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let event = state_mu
			.borrow_mut()
			.as_mut()
			.and_then(|s| s.pointer_up(x, y));
		if let Some(event) = event {
			emit_mu(event);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom(x, y, ev.delta_y());
		}
	};

	let (state_do, emit_do) = (state.clone(), on_event.clone());
	let on_dragover = move |ev: DragEvent| {
		// Accepting the drop requires cancelling dragover.
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let events = state_do
			.borrow_mut()
			.as_mut()
			.map(|s| s.drag_over(x, y))
			.unwrap_or_default();
		events.into_iter().for_each(|e| emit_do(e));
	};

	let (state_dl, emit_dl) = (state.clone(), on_event.clone());
	let on_dragleave = move |_: DragEvent| {
		let events = state_dl
			.borrow_mut()
			.as_mut()
			.map(|s| s.drag_leave())
			.unwrap_or_default();
		events.into_iter().for_each(|e| emit_dl(e));
	};

	let (state_dr, emit_dr) = (state.clone(), on_event.clone());
	let on_drop = move |ev: DragEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let value = ev
			.data_transfer()
			.and_then(|dt| dt.get_data(ATTRIBUTE_MIME).ok())
			.unwrap_or_default();
		let events = state_dr
			.borrow_mut()
			.as_mut()
			.map(|s| s.drop_attribute(x, y, value))
			.unwrap_or_default();
		events.into_iter().for_each(|e| emit_dr(e));
	};

	let view_control = |action: fn(&mut SocialGraphState)| {
		let state = state.clone();
		move |_: MouseEvent| {
			if let Some(ref mut s) = *state.borrow_mut() {
				action(s);
			}
		}
	};

	view! {
		<div class="social-graph">
			<canvas
				node_ref=canvas_ref
				class="social-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:dragover=on_dragover
				on:dragleave=on_dragleave
				on:drop=on_drop
				style="display: block; cursor: grab;"
			/>
			<div class="graph-controls">
				<button title="Zoom in" on:click=view_control(|s| s.zoom_step(ZOOM_BUTTON_FACTOR))>
					"+"
				</button>
				<button title="Zoom out" on:click=view_control(|s| s.zoom_step(1.0 / ZOOM_BUTTON_FACTOR))>
					"−"
				</button>
				<button title="Fit view" on:click=view_control(SocialGraphState::fit_to_content)>
					"Fit"
				</button>
			</div>
		</div>
	}
}
