/// Top-left corner of a node card, in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

/// Renderable projection of one user record.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub position: Position,
	pub label: String,
	pub age: u16,
	pub hobbies: Vec<String>,
	pub popularity_score: f64,
}

/// Whether an edge came from confirmed records or from a pending gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
	Authoritative,
	Provisional,
}

/// One undirected friendship. `source`/`target` keep the orientation the edge was first seen in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub kind: EdgeKind,
}

impl GraphEdge {
	pub fn new(source: &str, target: &str, kind: EdgeKind) -> Self {
		Self {
			id: format!("{source}-{target}"),
			source: source.to_string(),
			target: target.to_string(),
			kind,
		}
	}

	pub fn pair_key(&self) -> PairKey {
		PairKey::new(&self.source, &self.target)
	}
}

/// Order-independent key for an unordered pair of user ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(String, String);

impl PairKey {
	pub fn new(a: &str, b: &str) -> Self {
		if a <= b {
			Self(a.to_string(), b.to_string())
		} else {
			Self(b.to_string(), a.to_string())
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl GraphData {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn has_pair(&self, key: &PairKey) -> bool {
		self.edges.iter().any(|e| &e.pair_key() == key)
	}
}

/// Fixed grid placement: `columns` nodes per row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
	pub columns: usize,
	pub cell_width: f64,
	pub cell_height: f64,
	pub x_offset: f64,
	pub y_offset: f64,
}

impl Default for GridLayout {
	fn default() -> Self {
		Self {
			columns: 5,
			cell_width: 250.0,
			cell_height: 250.0,
			x_offset: 50.0,
			y_offset: 50.0,
		}
	}
}

impl GridLayout {
	pub fn position(&self, index: usize) -> Position {
		let columns = self.columns.max(1);
		Position {
			x: (index % columns) as f64 * self.cell_width + self.x_offset,
			y: (index / columns) as f64 * self.cell_height + self.y_offset,
		}
	}
}
