use std::collections::BTreeSet;

use super::record::UserRecord;

/// Summary figures shown in the stats panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkStats {
	pub total_users: usize,
	pub connections: usize,
	pub average_score: f64,
}

impl NetworkStats {
	/// `connections` is the rendered edge count, not the sum of adjacency lists.
	pub fn new(records: &[UserRecord], connections: usize) -> Self {
		let average_score = if records.is_empty() {
			0.0
		} else {
			records.iter().map(|r| r.popularity_score).sum::<f64>() / records.len() as f64
		};
		Self {
			total_users: records.len(),
			connections,
			average_score,
		}
	}

	pub fn average_score_label(&self) -> String {
		format!("{:.1}", self.average_score)
	}
}

/// Sorted, unique union of every user's hobbies.
pub fn hobby_catalog(records: &[UserRecord]) -> Vec<String> {
	records
		.iter()
		.flat_map(|r| r.hobbies.iter().cloned())
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect()
}

/// Case-insensitive substring filter over the catalog.
pub fn filter_hobbies<'a>(catalog: &'a [String], search: &str) -> Vec<&'a String> {
	let needle = search.to_lowercase();
	catalog
		.iter()
		.filter(|h| h.to_lowercase().contains(&needle))
		.collect()
}

/// Users by popularity, highest first; ties keep list order.
pub fn ranked_by_popularity(records: &[UserRecord]) -> Vec<&UserRecord> {
	let mut ranked: Vec<&UserRecord> = records.iter().collect();
	ranked.sort_by(|a, b| b.popularity_score.total_cmp(&a.popularity_score));
	ranked
}

/// Medal for the top three ranks.
pub fn rank_badge(rank: usize) -> Option<&'static str> {
	match rank {
		0 => Some("🥇"),
		1 => Some("🥈"),
		2 => Some("🥉"),
		_ => None,
	}
}

/// First `limit` items plus the count of the rest.
pub fn preview<T>(items: &[T], limit: usize) -> (&[T], usize) {
	let shown = items.len().min(limit);
	(&items[..shown], items.len() - shown)
}
