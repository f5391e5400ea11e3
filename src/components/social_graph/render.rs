use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{HANDLE_RADIUS, NODE_HEIGHT, NODE_WIDTH, SocialGraphState, handle_center};
use super::types::GraphNode;

const EDGE_COLOR: &str = "#3b82f6";
const LINK_SOURCE_COLOR: &str = "#16a34a";
const DROP_TARGET_COLOR: &str = "#f59e0b";
const HOBBY_PREVIEW: usize = 3;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Card fill: more opaque for more popular users, saturating at a score of 10.
pub fn node_fill(score: f64) -> String {
	let intensity = (score / 10.0).clamp(0.0, 1.0);
	format!("rgba(59, 130, 246, {})", 0.3 + intensity * 0.7)
}

pub fn node_border_width(score: f64) -> f64 {
	(score / 5.0).clamp(2.0, 4.0)
}

/// First few hobbies, plus a "+N" marker for the rest.
pub fn hobby_summary(hobbies: &[String]) -> String {
	let (shown, rest) = crate::model::preview(hobbies, HOBBY_PREVIEW);
	let mut text = shown.join(", ");
	if rest > 0 {
		text.push_str(&format!(" +{rest}"));
	}
	text
}

pub fn render(state: &SocialGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#f9fafb");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_connect_preview(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &SocialGraphState, ctx: &CanvasRenderingContext2d) {
	let (dash, gap, arrow_size) = (5.0, 5.0, 10.0);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);
	let has_hover = state.hover.node.is_some();

	for edge in &state.graph.edges {
		let (Some(n1), Some(n2)) = (state.graph.node(&edge.source), state.graph.node(&edge.target))
		else {
			continue;
		};
		let (x1, y1) = handle_center(n1);
		let (x2, y2) = (n2.position.x, n2.position.y + NODE_HEIGHT / 2.0);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		// Edges touching the hovered node brighten, the rest fade.
		let touches_hover = state.is_highlighted(&edge.source) && state.is_highlighted(&edge.target);
		let alpha = if has_hover && !touches_hover {
			1.0 - 0.7 * t
		} else {
			1.0
		};
		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(EDGE_COLOR);
		ctx.set_line_width(2.0);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2 - ux * arrow_size, y2 - uy * arrow_size);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(EDGE_COLOR);
		let (back_x, back_y) = (x2 - ux * arrow_size, y2 - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(x2, y2);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_connect_preview(state: &SocialGraphState, ctx: &CanvasRenderingContext2d) {
	let Some(drag) = &state.connect else {
		return;
	};
	let Some(source) = state.graph.node(&drag.source) else {
		return;
	};
	let (x1, y1) = handle_center(source);
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_line_width(2.0);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(4.0),
		&JsValue::from_f64(4.0),
	));
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(drag.x, drag.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	ctx.line_to(x + w - r, y);
	ctx.quadratic_curve_to(x + w, y, x + w, y + r);
	ctx.line_to(x + w, y + h - r);
	ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
	ctx.line_to(x + r, y + h);
	ctx.quadratic_curve_to(x, y + h, x, y + h - r);
	ctx.line_to(x, y + r);
	ctx.quadratic_curve_to(x, y, x + r, y);
	ctx.close_path();
}

fn draw_nodes(state: &SocialGraphState, ctx: &CanvasRenderingContext2d) {
	for node in &state.graph.nodes {
		draw_node(state, ctx, node);
	}
}

fn draw_node(state: &SocialGraphState, ctx: &CanvasRenderingContext2d, node: &GraphNode) {
	let (x, y) = (node.position.x, node.position.y);
	let is_source = state.linking_source.as_deref() == Some(node.id.as_str());
	let is_drop_target = state.drop_target.as_deref() == Some(node.id.as_str());

	// White underlay keeps the translucent fill readable over edges.
	rounded_rect(ctx, x, y, NODE_WIDTH, NODE_HEIGHT, 12.0);
	ctx.set_fill_style_str("white");
	ctx.fill();
	ctx.set_fill_style_str(&node_fill(node.popularity_score));
	ctx.fill();

	let (border_color, border_width) = if is_drop_target {
		(DROP_TARGET_COLOR, 4.0)
	} else if is_source {
		(LINK_SOURCE_COLOR, 4.0)
	} else {
		(EDGE_COLOR, node_border_width(node.popularity_score))
	};
	if is_drop_target {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(6.0),
			&JsValue::from_f64(4.0),
		));
	}
	ctx.set_stroke_style_str(border_color);
	ctx.set_line_width(border_width);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	let cx = x + NODE_WIDTH / 2.0;
	ctx.set_text_align("center");
	ctx.set_fill_style_str("#111827");
	ctx.set_font("bold 16px sans-serif");
	let _ = ctx.fill_text(&node.label, cx, y + 28.0);
	ctx.set_fill_style_str("#374151");
	ctx.set_font("13px sans-serif");
	let _ = ctx.fill_text(&format!("Age: {}", node.age), cx, y + 50.0);
	ctx.set_font("12px sans-serif");
	let _ = ctx.fill_text(
		&format!("Popularity: {:.1}", node.popularity_score),
		cx,
		y + 72.0,
	);
	ctx.set_font("bold 11px sans-serif");
	let _ = ctx.fill_text("Hobbies:", cx, y + 100.0);
	ctx.set_font("11px sans-serif");
	let _ = ctx.fill_text_with_max_width(&hobby_summary(&node.hobbies), cx, y + 118.0, NODE_WIDTH - 16.0);
	ctx.set_text_align("start");

	let (hx, hy) = handle_center(node);
	ctx.begin_path();
	let _ = ctx.arc(hx, hy, HANDLE_RADIUS, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(if state.connect.is_some() { LINK_SOURCE_COLOR } else { EDGE_COLOR });
	ctx.fill();
	ctx.set_stroke_style_str("white");
	ctx.set_line_width(2.0);
	ctx.stroke();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fill_saturates_at_ten() {
		assert_eq!(node_fill(0.0), "rgba(59, 130, 246, 0.3)");
		assert_eq!(node_fill(10.0), "rgba(59, 130, 246, 1)");
		assert_eq!(node_fill(25.0), node_fill(10.0));
	}

	#[test]
	fn border_width_is_clamped() {
		assert_eq!(node_border_width(0.0), 2.0);
		assert_eq!(node_border_width(15.0), 3.0);
		assert_eq!(node_border_width(100.0), 4.0);
	}

	#[test]
	fn hobby_summary_truncates() {
		let hobbies: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
		assert_eq!(hobby_summary(&hobbies), "a, b, c +2");
		assert_eq!(hobby_summary(&hobbies[..2]), "a, b");
	}
}
