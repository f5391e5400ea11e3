//! User record schema and derived summaries.

mod record;
mod stats;

pub use record::{FormErrors, UserDraft, UserRecord, normalize_records};
pub use stats::{NetworkStats, filter_hobbies, hobby_catalog, preview, rank_badge, ranked_by_popularity};
