use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::error::GraphError;
use super::scene::{NodeStyle, Scene};

const EDGE_COLOR: &str = "rgba(0, 0, 0, 0.05)";
const HUB_FILL: &str = "#4f46e5";
const NODE_FILL: &str = "white";
const NODE_STROKE: &str = "#e2e8f0";
const LABEL_COLOR: &str = "#1e293b";

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, GraphError> {
	canvas
		.get_context("2d")
		.map_err(|err| GraphError::ContextUnavailable(format!("{err:?}")))?
		.ok_or_else(|| GraphError::ContextUnavailable("no 2d context".into()))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| GraphError::ContextUnavailable("not a CanvasRenderingContext2d".into()))
}

pub fn render(scene: &Scene<'_>, ctx: &CanvasRenderingContext2d) {
	ctx.clear_rect(0.0, 0.0, scene.width, scene.height);
	draw_edges(scene, ctx);
	draw_nodes(scene, ctx);
}

/// All hub edges go into one path, stroked once.
fn draw_edges(scene: &Scene<'_>, ctx: &CanvasRenderingContext2d) {
	if scene.edges.is_empty() {
		return;
	}
	ctx.begin_path();
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_line_width(scene.edge_width);
	for edge in &scene.edges {
		ctx.move_to(edge.from.0, edge.from.1);
		ctx.line_to(edge.to.0, edge.to.1);
	}
	ctx.stroke();
}

fn draw_nodes(scene: &Scene<'_>, ctx: &CanvasRenderingContext2d) {
	ctx.set_text_align("center");
	for node in &scene.nodes {
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, node.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(match node.style {
			NodeStyle::Hub => HUB_FILL,
			NodeStyle::Regular => NODE_FILL,
		});
		ctx.fill();
		ctx.set_stroke_style_str(NODE_STROKE);
		ctx.set_line_width(node.stroke_width);
		ctx.stroke();

		if let Some(label) = &node.label {
			ctx.set_fill_style_str(LABEL_COLOR);
			ctx.set_font(&format!("bold {}px sans-serif", label.font_px));
			let _ = ctx.fill_text(label.text, label.x, label.y);
		}
	}
}
