//! Derives the renderable graph from the record list.
//!
//! The whole graph is rebuilt on every call; nothing is patched in place.

use std::collections::HashSet;

use super::types::{EdgeKind, GraphData, GraphEdge, GraphNode, GridLayout, PairKey};
use crate::model::UserRecord;

/// Why an adjacency entry produced no edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
	/// The friend id has no record in the current list.
	UnknownFriend,
	SelfReference,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFriend {
	pub owner: String,
	pub friend: String,
	pub reason: SkipReason,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
	pub graph: GraphData,
	pub skipped: Vec<SkippedFriend>,
}

pub fn project(records: &[UserRecord], layout: &GridLayout) -> Projection {
	let nodes: Vec<GraphNode> = records
		.iter()
		.enumerate()
		.map(|(i, r)| GraphNode {
			id: r.id.clone(),
			position: layout.position(i),
			label: r.username.clone(),
			age: r.age,
			hobbies: r.hobbies.clone(),
			popularity_score: r.popularity_score,
		})
		.collect();

	let known: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
	let mut seen: HashSet<PairKey> = HashSet::new();
	let mut edges = Vec::new();
	let mut skipped = Vec::new();

	for record in records {
		for friend in &record.friends {
			let reason = if friend == &record.id {
				Some(SkipReason::SelfReference)
			} else if !known.contains(friend.as_str()) {
				Some(SkipReason::UnknownFriend)
			} else {
				None
			};
			if let Some(reason) = reason {
				skipped.push(SkippedFriend {
					owner: record.id.clone(),
					friend: friend.clone(),
					reason,
				});
				continue;
			}
			// First orientation encountered names the edge.
			if seen.insert(PairKey::new(&record.id, friend)) {
				edges.push(GraphEdge::new(&record.id, friend, EdgeKind::Authoritative));
			}
		}
	}

	Projection {
		graph: GraphData { nodes, edges },
		skipped,
	}
}

/// Appends pending links that are not already present in the graph.
pub fn overlay_provisional<'a>(
	graph: &mut GraphData,
	pending: impl IntoIterator<Item = (&'a str, &'a str)>,
) {
	for (source, target) in pending {
		if graph.node(source).is_none() || graph.node(target).is_none() {
			continue;
		}
		if graph.has_pair(&PairKey::new(source, target)) {
			continue;
		}
		graph
			.edges
			.push(GraphEdge::new(source, target, EdgeKind::Provisional));
	}
}
