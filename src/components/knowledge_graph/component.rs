use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use leptos::prelude::*;
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::frame_loop::{AnimationFrames, LoopSlot};
use super::render;
use super::state::GraphState;
use super::types::{HubSelector, KnowledgeNode};

const FALLBACK_WIDTH: f64 = 1200.0;
const FALLBACK_HEIGHT: f64 = 600.0;

fn layout_rng() -> SmallRng {
	let hi = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
	let lo = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
	SmallRng::seed_from_u64(hi << 32 | lo)
}

/// Window-level listeners that live for one pan gesture, so the drag keeps
/// tracking after the pointer leaves the canvas.
struct DragListeners {
	window: Window,
	on_move: Closure<dyn FnMut(MouseEvent)>,
	on_up: Closure<dyn FnMut(MouseEvent)>,
	attached: Cell<bool>,
}

impl DragListeners {
	fn attach(
		window: Window,
		on_move: impl FnMut(MouseEvent) + 'static,
		on_up: impl FnMut(MouseEvent) + 'static,
	) -> Self {
		let listeners = Self {
			window,
			on_move: Closure::new(on_move),
			on_up: Closure::new(on_up),
			attached: Cell::new(true),
		};
		let _ = listeners
			.window
			.add_event_listener_with_callback("mousemove", listeners.on_move.as_ref().unchecked_ref());
		let _ = listeners
			.window
			.add_event_listener_with_callback("mouseup", listeners.on_up.as_ref().unchecked_ref());
		listeners
	}

	/// Unhook from the window. The closures stay alive until `self` drops,
	/// which lets `on_up` call this on itself.
	fn detach(&self) {
		if !self.attached.replace(false) {
			return;
		}
		let _ = self.window.remove_event_listener_with_callback(
			"mousemove",
			self.on_move.as_ref().unchecked_ref(),
		);
		let _ = self
			.window
			.remove_event_listener_with_callback("mouseup", self.on_up.as_ref().unchecked_ref());
	}
}

impl Drop for DragListeners {
	fn drop(&mut self) {
		self.detach();
	}
}

/// Canvas view of the knowledge-point map.
///
/// The layout restarts whenever `nodes` changes; pan and zoom survive.
/// Clicking a node (without dragging) reports it through `on_node_selected`.
#[component]
pub fn KnowledgeGraphCanvas(
	#[prop(into)] nodes: Signal<Vec<KnowledgeNode>>,
	#[prop(into)] on_node_selected: Callback<KnowledgeNode>,
	#[prop(optional)] hub: HubSelector,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<GraphState>>> = Rc::new(RefCell::new(None));
	let frames = Rc::new(LoopSlot::new());
	let drag: Rc<RefCell<Option<DragListeners>>> = Rc::new(RefCell::new(None));

	let teardown = StoredValue::new_local(frames.clone());
	on_cleanup(move || {
		let _ = teardown.try_with_value(|frames| frames.stop());
		info!("knowledge graph unmounted");
	});

	let (state_init, frames_init) = (state.clone(), frames.clone());
	Effect::new(move |_| {
		let nodes = nodes.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		let (w, h) = (
			width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.filter(|w| *w > 0.0)
					.unwrap_or(FALLBACK_WIDTH)
			}),
			height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.filter(|h| *h > 0.0)
					.unwrap_or(FALLBACK_HEIGHT)
			}),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match render::context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(err) => {
				error!("knowledge graph disabled: {err}");
				frames_init.stop();
				return;
			}
		};

		// Old loop goes first so nothing ticks a half-replaced layout.
		frames_init.stop();
		{
			let mut slot = state_init.borrow_mut();
			match slot.as_mut() {
				Some(s) => {
					s.resize(w, h);
					s.replace_nodes(nodes, &mut layout_rng());
				}
				None => {
					info!("knowledge graph mounted with {} nodes", nodes.len());
					*slot = Some(GraphState::new(nodes, hub.clone(), w, h, &mut layout_rng()));
				}
			}
		}

		let state_anim = state_init.clone();
		frames_init.restart(AnimationFrames::new(), move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick();
				render::render(&s.scene(), &ctx);
			}
		});
	});

	let surface_point = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let (state_md, drag_md) = (state.clone(), drag.clone());
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.begin_pan(ev.client_x() as f64, ev.client_y() as f64);
		} else {
			return;
		}

		let (state_mm, state_mu) = (state_md.clone(), state_md.clone());
		let drag_weak: Weak<RefCell<Option<DragListeners>>> = Rc::downgrade(&drag_md);
		let listeners = DragListeners::attach(
			window,
			move |ev: MouseEvent| {
				if let Some(ref mut s) = *state_mm.borrow_mut() {
					s.drag_pan(ev.client_x() as f64, ev.client_y() as f64);
				}
			},
			move |_: MouseEvent| {
				if let Some(ref mut s) = *state_mu.borrow_mut() {
					s.end_pan();
				}
				if let Some(drag) = drag_weak.upgrade() {
					if let Some(listeners) = drag.borrow().as_ref() {
						listeners.detach();
					}
				}
			},
		);
		// Replacing drops the previous gesture's closures, which are detached by now.
		*drag_md.borrow_mut() = Some(listeners);
	};

	let state_cl = state.clone();
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = surface_point(&ev) else {
			return;
		};
		let selected = {
			let mut slot = state_cl.borrow_mut();
			let Some(s) = slot.as_mut() else {
				return;
			};
			if !s.take_click() {
				return;
			}
			s.node_at_position(x, y).and_then(|idx| s.node(idx)).cloned()
		};
		if let Some(node) = selected {
			info!("selected knowledge point {} ({})", node.id, node.name);
			on_node_selected.run(node);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(ev.delta_y());
		}
	};

	let control = move |action: fn(&mut GraphState)| {
		let state = state.clone();
		move |_: MouseEvent| {
			if let Some(ref mut s) = *state.borrow_mut() {
				action(s);
			}
		}
	};

	view! {
		<div class="knowledge-graph">
			<canvas
				node_ref=canvas_ref
				class="knowledge-graph-canvas"
				on:mousedown=on_mousedown
				on:click=on_click
				on:wheel=on_wheel
				style="display: block; width: 100%; height: 100%; cursor: move;"
			/>
			<div class="knowledge-graph-controls">
				<button title="Zoom in" on:click=control(GraphState::zoom_in)>"+"</button>
				<button title="Zoom out" on:click=control(GraphState::zoom_out)>"−"</button>
				<button title="Reset view" on:click=control(GraphState::reset_view)>"⤢"</button>
			</div>
		</div>
	}
}
