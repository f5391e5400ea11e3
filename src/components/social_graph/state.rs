use std::collections::HashSet;

use super::interaction::Event;
use super::types::{GraphData, GraphNode};

pub const NODE_WIDTH: f64 = 180.0;
pub const NODE_HEIGHT: f64 = 140.0;
pub const HANDLE_RADIUS: f64 = 7.0;
/// Hit slop around the connection handle, in graph space.
const HANDLE_HIT_RADIUS: f64 = 12.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;
/// Screen-space margin kept around the cards when fitting the view.
const FIT_PADDING: f64 = 40.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Pointer drag started on a node's connection handle.
#[derive(Clone, Debug)]
pub struct ConnectDrag {
	pub source: String,
	/// Current pointer position in graph space.
	pub x: f64,
	pub y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<String>,
	pub neighbors: HashSet<String>,
	pub highlight_t: f64,
}

pub struct SocialGraphState {
	pub graph: GraphData,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub connect: Option<ConnectDrag>,
	pub hover: HoverState,
	/// Node under a pressed pointer; a release on the same node is a click.
	pub pressed: Option<String>,
	pub linking_source: Option<String>,
	pub drop_target: Option<String>,
	/// Node under an in-progress attribute drag, as last reported to the controller.
	drag_over: Option<String>,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	fitted: bool,
}

impl SocialGraphState {
	pub fn new(graph: GraphData, width: f64, height: f64) -> Self {
		Self {
			graph,
			transform: ViewTransform { x: 0.0, y: 0.0, k: 1.0 },
			pan: PanState::default(),
			connect: None,
			hover: HoverState::default(),
			pressed: None,
			linking_source: None,
			drop_target: None,
			drag_over: None,
			width,
			height,
			flow_time: 0.0,
			fitted: false,
		}
	}

	/// Swaps in a freshly projected graph, dropping hover state for vanished nodes.
	pub fn set_graph(&mut self, graph: GraphData) {
		self.graph = graph;
		let hovered = self.hover.node.take();
		if let Some(id) = hovered.filter(|id| self.graph.node(id).is_some()) {
			self.set_hover(Some(id));
		} else {
			self.hover.neighbors.clear();
		}
		if self
			.connect
			.as_ref()
			.is_some_and(|c| self.graph.node(&c.source).is_none())
		{
			self.connect = None;
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node whose card contains the point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<&GraphNode> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.graph.nodes.iter().rev().find(|n| {
			gx >= n.position.x
				&& gx <= n.position.x + NODE_WIDTH
				&& gy >= n.position.y
				&& gy <= n.position.y + NODE_HEIGHT
		})
	}

	/// Node whose connection handle (right edge, vertically centred) is under the point.
	pub fn handle_at_position(&self, sx: f64, sy: f64) -> Option<&GraphNode> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.graph.nodes.iter().rev().find(|n| {
			let (hx, hy) = handle_center(n);
			let (dx, dy) = (hx - gx, hy - gy);
			(dx * dx + dy * dy).sqrt() < HANDLE_HIT_RADIUS
		})
	}

	pub fn set_hover(&mut self, node: Option<String>) {
		if self.hover.node == node {
			return;
		}
		self.hover.neighbors.clear();
		if let Some(id) = &node {
			for edge in &self.graph.edges {
				if edge.source == *id {
					self.hover.neighbors.insert(edge.target.clone());
				} else if edge.target == *id {
					self.hover.neighbors.insert(edge.source.clone());
				}
			}
		}
		self.hover.node = node;
	}

	pub fn is_highlighted(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id) || self.hover.neighbors.contains(id)
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if let Some(node) = self.handle_at_position(sx, sy) {
			let (x, y) = handle_center(node);
			self.connect = Some(ConnectDrag {
				source: node.id.clone(),
				x,
				y,
			});
		} else if let Some(node) = self.node_at_position(sx, sy) {
			self.pressed = Some(node.id.clone());
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		if let Some(c) = &mut self.connect {
			c.x = gx;
			c.y = gy;
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
		let hovered = self.node_at_position(sx, sy).map(|n| n.id.clone());
		self.set_hover(hovered);
	}

	/// Ends the gesture; a completed click or connection becomes a controller event.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Option<Event> {
		let target = self.node_at_position(sx, sy).map(|n| n.id.clone());
		self.pan.active = false;
		let pressed = self.pressed.take();

		if let Some(drag) = self.connect.take() {
			return target.map(|target| Event::Connect {
				source: drag.source,
				target,
			});
		}
		match (pressed, target) {
			(Some(p), Some(t)) if p == t => Some(Event::NodeSelected(t)),
			_ => None,
		}
	}

	pub fn pointer_leave(&mut self) {
		self.connect = None;
		self.pressed = None;
		self.pan.active = false;
		self.set_hover(None);
	}

	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.zoom_at(sx, sy, factor);
	}

	/// Scales by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Zoom button: scales around the middle of the canvas.
	pub fn zoom_step(&mut self, factor: f64) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, factor);
	}

	/// Bounding box of all node cards in graph space.
	fn content_bounds(&self) -> Option<(f64, f64, f64, f64)> {
		self.graph.nodes.iter().fold(None, |acc, n| {
			let (x0, y0) = (n.position.x, n.position.y);
			let (x1, y1) = (x0 + NODE_WIDTH, y0 + NODE_HEIGHT);
			Some(match acc {
				None => (x0, y0, x1, y1),
				Some((ax0, ay0, ax1, ay1)) => (ax0.min(x0), ay0.min(y0), ax1.max(x1), ay1.max(y1)),
			})
		})
	}

	/// Centres every card in the viewport, shrinking as needed but never enlarging past 1:1.
	pub fn fit_to_content(&mut self) {
		let Some((x0, y0, x1, y1)) = self.content_bounds() else {
			return;
		};
		let (w, h) = (x1 - x0, y1 - y0);
		let k = ((self.width - 2.0 * FIT_PADDING) / w)
			.min((self.height - 2.0 * FIT_PADDING) / h)
			.clamp(MIN_ZOOM, 1.0);
		self.transform = ViewTransform {
			x: (self.width - w * k) / 2.0 - x0 * k,
			y: (self.height - h * k) / 2.0 - y0 * k,
			k,
		};
	}

	/// Fits the view the first time there is something to show; later graphs keep
	/// whatever pan and zoom the operator chose.
	pub fn fit_once(&mut self) {
		if !self.fitted && !self.graph.nodes.is_empty() {
			self.fit_to_content();
			self.fitted = true;
		}
	}

	/// Tracks an attribute drag across nodes, emitting leave/enter pairs on change.
	pub fn drag_over(&mut self, sx: f64, sy: f64) -> Vec<Event> {
		let over = self.node_at_position(sx, sy).map(|n| n.id.clone());
		if over == self.drag_over {
			return Vec::new();
		}
		let mut events = Vec::new();
		if let Some(old) = self.drag_over.take() {
			events.push(Event::DragLeave(old));
		}
		if let Some(new) = &over {
			events.push(Event::DragEnter(new.clone()));
		}
		self.drag_over = over;
		events
	}

	pub fn drag_leave(&mut self) -> Vec<Event> {
		self.drag_over
			.take()
			.map(Event::DragLeave)
			.into_iter()
			.collect()
	}

	pub fn drop_attribute(&mut self, sx: f64, sy: f64, value: String) -> Vec<Event> {
		let target = self.node_at_position(sx, sy).map(|n| n.id.clone());
		let mut events = self.drag_leave();
		if let Some(target) = target {
			events.push(Event::AttributeDropped { target, value });
		}
		events
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
		let target = if self.hover.node.is_some() { 1.0 } else { 0.0 };
		self.hover.highlight_t += (target - self.hover.highlight_t) * 1.8 * dt;
		if self.hover.highlight_t < 0.01 && self.hover.node.is_none() {
			self.hover.highlight_t = 0.0;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

pub fn handle_center(node: &GraphNode) -> (f64, f64) {
	(
		node.position.x + NODE_WIDTH,
		node.position.y + NODE_HEIGHT / 2.0,
	)
}
