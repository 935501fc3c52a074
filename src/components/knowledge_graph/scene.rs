//! Screen-space description of one frame.
//!
//! Building the scene is pure; [`super::render`] only paints it.

use super::layout::LayoutEngine;
use super::transform::ViewTransform;

/// Edge stroke width in world units.
pub const EDGE_WIDTH: f64 = 1.0;
/// Node outline width in world units.
pub const NODE_STROKE_WIDTH: f64 = 2.0;
/// Label size in screen pixels, at every zoom level.
pub const LABEL_FONT_PX: f64 = 11.0;
/// Gap between a disc's bottom edge and its label baseline, screen pixels.
pub const LABEL_GAP_PX: f64 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeStyle {
	Hub,
	Regular,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label<'a> {
	pub text: &'a str,
	pub x: f64,
	pub y: f64,
	pub font_px: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSprite<'a> {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub stroke_width: f64,
	pub style: NodeStyle,
	pub label: Option<Label<'a>>,
}

/// A line from the hub to one other node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSegment {
	pub from: (f64, f64),
	pub to: (f64, f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene<'a> {
	pub width: f64,
	pub height: f64,
	pub edge_width: f64,
	/// Painted before `nodes`.
	pub edges: Vec<EdgeSegment>,
	pub nodes: Vec<NodeSprite<'a>>,
}

pub fn build<'a>(
	layout: &'a LayoutEngine,
	view: &ViewTransform,
	hub: Option<usize>,
	width: f64,
	height: f64,
) -> Scene<'a> {
	let center = (width / 2.0, height / 2.0);
	let scale = view.scale();
	let screen: Vec<(f64, f64)> = layout
		.bodies()
		.iter()
		.map(|body| view.to_screen(center, body.x, body.y))
		.collect();

	let edges = match hub {
		Some(h) if h < screen.len() => (0..screen.len())
			.filter(|&i| i != h)
			.map(|i| EdgeSegment {
				from: screen[h],
				to: screen[i],
			})
			.collect(),
		_ => Vec::new(),
	};

	let show_labels = view.show_labels();
	let nodes = layout
		.nodes()
		.iter()
		.zip(&screen)
		.enumerate()
		.map(|(index, (node, &(x, y)))| {
			let radius = node.radius() * scale;
			NodeSprite {
				x,
				y,
				radius,
				stroke_width: NODE_STROKE_WIDTH * scale,
				style: if Some(index) == hub {
					NodeStyle::Hub
				} else {
					NodeStyle::Regular
				},
				label: show_labels.then(|| Label {
					text: node.name.as_str(),
					x,
					y: y + radius + LABEL_GAP_PX,
					font_px: LABEL_FONT_PX,
				}),
			}
		})
		.collect();

	Scene {
		width,
		height,
		edge_width: EDGE_WIDTH * scale,
		edges,
		nodes,
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::knowledge_graph::layout::LayoutConfig;
	use crate::components::knowledge_graph::types::{HubSelector, KnowledgeNode};

	fn hub_and_two() -> LayoutEngine {
		LayoutEngine::new(
			vec![
				KnowledgeNode::new(1, "Hub", 9),
				KnowledgeNode::new(2, "A", 0),
				KnowledgeNode::new(3, "B", 0),
			],
			LayoutConfig::default(),
			&mut SmallRng::seed_from_u64(11),
		)
	}

	#[test]
	fn hub_links_to_every_other_node_only() {
		let mut layout = hub_and_two();
		for _ in 0..500 {
			layout.tick();
		}
		let hub = HubSelector::Label("Hub".into()).find(layout.nodes());
		let scene = build(&layout, &ViewTransform::default(), hub, 1200.0, 600.0);

		let ends: Vec<_> = scene.edges.iter().map(|e| e.to).collect();
		let others: Vec<_> = scene.nodes[1..].iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(ends, others, "hub to A and hub to B, never A to B");
		for edge in &scene.edges {
			assert_eq!(edge.from, (scene.nodes[0].x, scene.nodes[0].y));
		}

		let radii: Vec<_> = scene.nodes.iter().map(|n| n.radius).collect();
		assert_eq!(radii, [11.0, 5.0, 5.0]);
		assert_eq!(scene.nodes[0].style, NodeStyle::Hub);
		assert!(scene.nodes[1..].iter().all(|n| n.style == NodeStyle::Regular));
	}

	#[test]
	fn missing_hub_draws_no_edges() {
		let layout = hub_and_two();
		let hub = HubSelector::default().find(layout.nodes());
		let scene = build(&layout, &ViewTransform::default(), hub, 800.0, 600.0);

		assert!(scene.edges.is_empty());
		assert_eq!(scene.nodes.len(), 3);
		assert!(scene.nodes.iter().all(|n| n.style == NodeStyle::Regular));
	}

	#[test]
	fn geometry_follows_the_view() {
		let layout = hub_and_two();
		let view = ViewTransform::new(25.0, -10.0, 2.0);
		let scene = build(&layout, &view, Some(0), 800.0, 600.0);

		let body = layout.bodies()[1];
		let node = &scene.nodes[1];
		assert_eq!((node.x, node.y), view.to_screen((400.0, 300.0), body.x, body.y));
		assert_eq!(node.radius, 10.0);
		assert_eq!(node.stroke_width, 4.0);
		assert_eq!(scene.edge_width, 2.0);

		let label = node.label.as_ref().unwrap();
		assert_eq!(label.text, "A");
		assert_eq!(label.y, node.y + 10.0 + LABEL_GAP_PX);
		assert_eq!(label.font_px, LABEL_FONT_PX);
	}

	#[test]
	fn labels_hidden_when_zoomed_out() {
		let layout = hub_and_two();
		let view = ViewTransform::new(0.0, 0.0, 0.5);
		let scene = build(&layout, &view, Some(0), 800.0, 600.0);
		assert!(scene.nodes.iter().all(|n| n.label.is_none()));
	}

	#[test]
	fn empty_layout_builds_empty_scene() {
		let layout = LayoutEngine::new(
			Vec::new(),
			LayoutConfig::default(),
			&mut SmallRng::seed_from_u64(0),
		);
		let scene = build(&layout, &ViewTransform::default(), None, 800.0, 600.0);
		assert!(scene.edges.is_empty() && scene.nodes.is_empty());
	}
}
