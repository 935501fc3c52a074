use log::{debug, info};
use rand::Rng;

use super::layout::{LayoutConfig, LayoutEngine};
use super::scene::{self, Scene};
use super::transform::{PanGesture, ViewTransform};
use super::types::{HubSelector, KnowledgeNode};

/// Extra world-space slack around each disc when hit-testing clicks.
pub const HIT_MARGIN: f64 = 15.0;

/// Below this mean speed the layout is reported as settled.
const SETTLED_SPEED: f64 = 0.01;

/// Everything the canvas needs between frames.
///
/// The layout is only ever advanced through [`GraphState::tick`]; the view
/// is read live by every frame, so pointer updates show up on the next one.
pub struct GraphState {
	pub layout: LayoutEngine,
	pub transform: ViewTransform,
	pub width: f64,
	pub height: f64,
	hub_selector: HubSelector,
	hub: Option<usize>,
	pan: Option<PanGesture>,
	swallow_click: bool,
	settled: bool,
}

impl GraphState {
	pub fn new(
		nodes: Vec<KnowledgeNode>,
		hub_selector: HubSelector,
		width: f64,
		height: f64,
		rng: &mut impl Rng,
	) -> Self {
		let hub = hub_selector.find(&nodes);
		Self {
			layout: LayoutEngine::new(nodes, LayoutConfig::default(), rng),
			transform: ViewTransform::default(),
			width,
			height,
			hub_selector,
			hub,
			pan: None,
			swallow_click: false,
			settled: false,
		}
	}

	/// Swap in a new node set. Physical state restarts from scratch; the
	/// view is left where the user put it.
	pub fn replace_nodes(&mut self, nodes: Vec<KnowledgeNode>, rng: &mut impl Rng) {
		self.hub = self.hub_selector.find(&nodes);
		self.layout.reset(nodes, rng);
		self.settled = false;
		info!(
			"knowledge graph reset with {} nodes (hub: {:?})",
			self.layout.len(),
			self.hub
		);
	}

	pub fn hub(&self) -> Option<usize> {
		self.hub
	}

	pub fn tick(&mut self) {
		self.layout.tick();
		if !self.settled && self.layout.len() > 1 && self.layout.mean_speed() < SETTLED_SPEED {
			self.settled = true;
			debug!("layout settled");
		}
	}

	pub fn scene(&self) -> Scene<'_> {
		scene::build(
			&self.layout,
			&self.transform,
			self.hub,
			self.width,
			self.height,
		)
	}

	fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}

	/// First node (in list order) whose disc plus margin contains the point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (wx, wy) = self.transform.to_world(self.center(), sx, sy);
		self.layout.iter().position(|(node, body)| {
			let (dx, dy) = (body.x - wx, body.y - wy);
			(dx * dx + dy * dy).sqrt() < node.radius() + HIT_MARGIN
		})
	}

	pub fn node(&self, idx: usize) -> Option<&KnowledgeNode> {
		self.layout.nodes().get(idx)
	}

	pub fn wheel(&mut self, delta_y: f64) {
		self.transform.wheel(delta_y);
	}

	pub fn zoom_in(&mut self) {
		self.transform.zoom_in();
	}

	pub fn zoom_out(&mut self) {
		self.transform.zoom_out();
	}

	pub fn reset_view(&mut self) {
		self.transform.reset();
	}

	pub fn begin_pan(&mut self, px: f64, py: f64) {
		self.pan = Some(PanGesture::begin(&self.transform, px, py));
		self.swallow_click = false;
	}

	pub fn drag_pan(&mut self, px: f64, py: f64) {
		if let Some(gesture) = self.pan.as_mut() {
			gesture.drag_to(&mut self.transform, px, py);
		}
	}

	/// Finish the gesture; returns whether the pointer moved far enough to
	/// count as a drag.
	pub fn end_pan(&mut self) -> bool {
		let dragged = self.pan.take().is_some_and(|g| g.is_drag());
		self.swallow_click = dragged;
		dragged
	}

	/// Whether a click event should be hit-tested. The click that closes a
	/// drag is consumed here.
	pub fn take_click(&mut self) -> bool {
		!std::mem::take(&mut self.swallow_click)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
