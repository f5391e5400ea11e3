//! Application settings.

use crate::components::social_graph::GridLayout;

/// Backend used when `SOCIAL_GRAPH_API_BASE` is not set at build time.
pub const DEFAULT_API_BASE: &str = "https://hobbymanagement.onrender.com/api";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
	/// Base URL of the user service, without a trailing slash.
	pub api_base: String,
	pub layout: GridLayout,
	/// How long a toast stays up before dismissing itself.
	pub toast_timeout_ms: u64,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base: option_env!("SOCIAL_GRAPH_API_BASE")
				.filter(|s| !s.is_empty())
				.unwrap_or(DEFAULT_API_BASE)
				.to_string(),
			layout: GridLayout::default(),
			toast_timeout_ms: 4000,
		}
	}
}
