//! Authoritative user list plus the status the UI shows around it.
//!
//! Every mutation follows the same shape: mark busy, call the remote, refetch the
//! whole list on success, set a message, clear busy. Failures are also returned to
//! the caller so follow-up steps (closing a dialog) can depend on the outcome.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::api::UserApi;
use crate::components::social_graph::{GridLayout, Projection, overlay_provisional, project};
use crate::error::Error;
use crate::model::{UserDraft, UserRecord, normalize_records};

/// A link drawn by a gesture before the backend has confirmed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionalLink {
	pub id: u64,
	pub source: String,
	pub target: String,
	/// First fetch ticket whose response includes the link. `None` while the
	/// link request is still pending.
	pub settles_at: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct StoreState {
	pub records: Vec<UserRecord>,
	pub provisional: Vec<ProvisionalLink>,
	pub in_flight: usize,
	pub error: Option<String>,
	pub success: Option<String>,
	fetch_issued: u64,
	fetch_applied: u64,
	next_provisional: u64,
}

impl StoreState {
	pub fn is_busy(&self) -> bool {
		self.in_flight > 0
	}

	/// Projects the records and overlays pending links.
	pub fn graph(&self, layout: &GridLayout) -> Projection {
		let mut projection = project(&self.records, layout);
		overlay_provisional(
			&mut projection.graph,
			self.provisional.iter().map(|p| (p.source.as_str(), p.target.as_str())),
		);
		for skipped in &projection.skipped {
			warn!(
				"user {} lists friend {} which cannot be drawn ({:?})",
				skipped.owner, skipped.friend, skipped.reason
			);
		}
		projection
	}
}

type Listener = Rc<dyn Fn()>;

pub struct RecordStore<A> {
	api: Rc<A>,
	state: Rc<RefCell<StoreState>>,
	listeners: Rc<RefCell<Vec<Listener>>>,
}

impl<A> Clone for RecordStore<A> {
	fn clone(&self) -> Self {
		Self {
			api: self.api.clone(),
			state: self.state.clone(),
			listeners: self.listeners.clone(),
		}
	}
}

/// Decrements the in-flight count when the operation ends, however it ends.
struct BusyGuard<A> {
	store: RecordStore<A>,
}

impl<A> Drop for BusyGuard<A> {
	fn drop(&mut self) {
		{
			let mut state = self.store.state.borrow_mut();
			state.in_flight = state.in_flight.saturating_sub(1);
		}
		self.store.notify();
	}
}

impl<A> RecordStore<A> {
	#[cfg(test)]
	pub(crate) fn api_handle(&self) -> Rc<A> {
		self.api.clone()
	}

	pub fn snapshot(&self) -> StoreState {
		self.state.borrow().clone()
	}

	pub fn records(&self) -> Vec<UserRecord> {
		self.state.borrow().records.clone()
	}

	#[cfg(test)]
	pub(crate) fn find(&self, id: &str) -> Option<UserRecord> {
		self.state.borrow().records.iter().find(|r| r.id == id).cloned()
	}

	/// Advisory only; nothing stops a second operation from starting.
	#[cfg(test)]
	pub(crate) fn is_busy(&self) -> bool {
		self.state.borrow().is_busy()
	}

	pub fn error(&self) -> Option<String> {
		self.state.borrow().error.clone()
	}

	pub fn success(&self) -> Option<String> {
		self.state.borrow().success.clone()
	}

	/// Registers a callback run after every state change.
	pub fn subscribe(&self, listener: impl Fn() + 'static) {
		self.listeners.borrow_mut().push(Rc::new(listener));
	}

	fn notify(&self) {
		let listeners: Vec<Listener> = self.listeners.borrow().clone();
		for listener in listeners {
			listener();
		}
	}

	fn update(&self, f: impl FnOnce(&mut StoreState)) {
		f(&mut self.state.borrow_mut());
		self.notify();
	}

	pub fn report_error(&self, message: impl Into<String>) {
		let message = message.into();
		self.update(|s| {
			s.error = Some(message);
			s.success = None;
		});
	}

	pub fn report_success(&self, message: impl Into<String>) {
		let message = message.into();
		self.update(|s| {
			s.success = Some(message);
			s.error = None;
		});
	}

	pub fn dismiss_error(&self) {
		self.update(|s| s.error = None);
	}

	pub fn dismiss_success(&self) {
		self.update(|s| s.success = None);
	}

	/// Draws `source -> target` until the link request settles. Each call is
	/// tracked separately, even for a pair that is already pending.
	pub fn add_provisional_link(&self, source: &str, target: &str) -> u64 {
		let mut id = 0;
		self.update(|s| {
			s.next_provisional += 1;
			id = s.next_provisional;
			s.provisional.push(ProvisionalLink {
				id,
				source: source.to_string(),
				target: target.to_string(),
				settles_at: None,
			});
		});
		id
	}

	/// The backend accepted the link; the next fetch issued from now on carries it.
	fn acknowledge_provisional_link(&self, id: u64) {
		self.update(|s| {
			let settles_at = s.fetch_issued + 1;
			if let Some(link) = s.provisional.iter_mut().find(|p| p.id == id) {
				link.settles_at = Some(settles_at);
			}
		});
	}

	fn discard_provisional_link(&self, id: u64) {
		self.update(|s| s.provisional.retain(|p| p.id != id));
	}

	/// Current records projected onto the grid, with pending links overlaid.
	#[cfg(test)]
	pub(crate) fn graph(&self, layout: &GridLayout) -> Projection {
		self.state.borrow().graph(layout)
	}

	fn begin(&self) -> BusyGuard<A> {
		self.update(|s| s.in_flight += 1);
		BusyGuard { store: self.clone() }
	}
}

impl<A: UserApi> RecordStore<A> {
	pub fn new(api: A) -> Self {
		Self {
			api: Rc::new(api),
			state: Rc::new(RefCell::new(StoreState::default())),
			listeners: Rc::new(RefCell::new(Vec::new())),
		}
	}

	/// Replaces the record list with a fresh fetch.
	///
	/// A response is applied only if no later-issued fetch has already been applied,
	/// so the list always reflects the most recently issued request that completed.
	pub async fn fetch_users(&self) -> Result<(), Error> {
		let _busy = self.begin();
		let ticket = {
			let mut state = self.state.borrow_mut();
			state.fetch_issued += 1;
			state.fetch_issued
		};

		match self.api.list_users().await {
			Ok(records) => {
				let records = normalize_records(records);
				let mut state = self.state.borrow_mut();
				if ticket < state.fetch_applied {
					debug!("discarding stale user list (fetch #{ticket}, have #{})", state.fetch_applied);
					return Ok(());
				}
				debug!("applying user list #{ticket} ({} users)", records.len());
				state.records = records;
				state
					.provisional
					.retain(|p| p.settles_at.is_none_or(|needed| needed > ticket));
				state.fetch_applied = ticket;
				state.error = None;
				Ok(())
			}
			Err(err) => {
				warn!("failed to fetch users: {err}");
				self.state.borrow_mut().error = Some(err.to_string());
				Err(err)
			}
		}
	}

	async fn mutate<F>(&self, action: &str, success: &str, op: F) -> Result<(), Error>
	where
		F: Future<Output = Result<(), Error>>,
	{
		let _busy = self.begin();
		debug!("{action}");
		match op.await {
			Ok(()) => {
				// The mutation itself succeeded; the success text replaces a refetch error.
				if let Err(err) = self.fetch_users().await {
					warn!("{action}: refetch failed: {err}");
				}
				info!("{action}: ok");
				self.report_success(success);
				Ok(())
			}
			Err(err) => {
				warn!("{action}: {err}");
				self.report_error(err.to_string());
				Err(err)
			}
		}
	}

	pub async fn create_user(&self, draft: &UserDraft) -> Result<(), Error> {
		self.mutate(
			&format!("create user {:?}", draft.username),
			"User created successfully!",
			self.api.create_user(draft),
		)
		.await
	}

	pub async fn update_user(&self, id: &str, draft: &UserDraft) -> Result<(), Error> {
		self.mutate(
			&format!("update user {id}"),
			"User updated successfully!",
			self.api.update_user(id, draft),
		)
		.await
	}

	pub async fn delete_user(&self, id: &str) -> Result<(), Error> {
		self.mutate(
			&format!("delete user {id}"),
			"User deleted successfully!",
			self.api.delete_user(id),
		)
		.await
	}

	pub async fn link_users(&self, user_id: &str, friend_id: &str) -> Result<(), Error> {
		self.link(user_id, friend_id, None).await
	}

	/// Links on behalf of the provisional link `pending`. The provisional link stays
	/// drawn until a fetch issued after the backend accepted it is applied, and is
	/// removed if the request fails.
	pub async fn link_provisional(&self, pending: u64, user_id: &str, friend_id: &str) -> Result<(), Error> {
		self.link(user_id, friend_id, Some(pending)).await
	}

	async fn link(&self, user_id: &str, friend_id: &str, pending: Option<u64>) -> Result<(), Error> {
		let request = async {
			self.api.link_users(user_id, friend_id).await?;
			if let Some(id) = pending {
				self.acknowledge_provisional_link(id);
			}
			Ok::<(), Error>(())
		};
		let result = self
			.mutate(
				&format!("link {user_id} -> {friend_id}"),
				"Users linked successfully!",
				request,
			)
			.await;
		if let (Err(_), Some(id)) = (&result, pending) {
			self.discard_provisional_link(id);
		}
		result
	}

	pub async fn unlink_users(&self, user_id: &str, friend_id: &str) -> Result<(), Error> {
		self.mutate(
			&format!("unlink {user_id} -> {friend_id}"),
			"Users unlinked successfully!",
			self.api.unlink_users(user_id, friend_id),
		)
		.await
	}

	pub async fn health_check(&self) -> Result<(), Error> {
		let result = self.api.health_check().await;
		match &result {
			Ok(()) => info!("user service is healthy"),
			Err(err) => warn!("user service health check failed: {err}"),
		}
		result
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use futures::executor::{LocalPool, block_on};
	use futures::task::LocalSpawnExt;

	use super::*;
	use crate::api::memory::MemoryUserApi;

	fn user(id: &str, friends: &[&str]) -> UserRecord {
		UserRecord {
			id: id.into(),
			username: format!("user{id}"),
			age: 30,
			hobbies: vec!["chess".into()],
			friends: friends.iter().map(|f| f.to_string()).collect(),
			popularity_score: 0.0,
		}
	}

	fn store_with(users: Vec<UserRecord>) -> RecordStore<MemoryUserApi> {
		let store = RecordStore::new(MemoryUserApi::with_users(users));
		block_on(store.fetch_users()).unwrap();
		store
	}

	#[test]
	fn create_refetches_and_reports_success() {
		let store = store_with(vec![]);
		let draft = UserDraft::from_form("Ann", "31", "chess").unwrap();
		block_on(store.create_user(&draft)).unwrap();

		assert_eq!(store.records().len(), 1);
		assert_eq!(store.records()[0].username, "Ann");
		assert_eq!(store.success().as_deref(), Some("User created successfully!"));
		assert!(store.error().is_none());
		assert!(!store.is_busy());
		assert_eq!(store.api.calls(), vec!["list", "create Ann", "list"]);
	}

	#[test]
	fn failed_refetch_does_not_fail_the_mutation() {
		let store = store_with(vec![]);
		store.api.fail_next_list();
		let draft = UserDraft::from_form("Ann", "31", "chess").unwrap();
		block_on(store.create_user(&draft)).unwrap();

		assert!(store.records().is_empty());
		assert_eq!(store.api.users().len(), 1);
		assert_eq!(store.success().as_deref(), Some("User created successfully!"));
		assert!(store.error().is_none());
		assert!(!store.is_busy());
	}

	#[test]
	fn delete_with_friendships_fails_and_user_remains() {
		let store = store_with(vec![user("1", &["2"]), user("2", &[])]);
		let err = block_on(store.delete_user("2")).unwrap_err();

		assert!(matches!(err, Error::Remote { status: 400, .. }));
		assert_eq!(store.error(), Some(err.to_string()));
		assert!(!store.is_busy());

		block_on(store.fetch_users()).unwrap();
		assert!(store.find("2").is_some());
	}

	#[test]
	fn transport_failure_surfaces_and_keeps_records() {
		let store = store_with(vec![user("1", &[]), user("2", &[])]);
		store.api.set_offline(true);
		let err = block_on(store.link_users("1", "2")).unwrap_err();

		assert!(matches!(err, Error::Transport(_)));
		assert_eq!(store.records().len(), 2);
		assert!(store.error().unwrap().starts_with("Network error"));
		assert!(store.success().is_none());
	}

	#[test]
	fn link_then_unlink_round_trip_through_refetch() {
		let store = store_with(vec![user("1", &[]), user("2", &[])]);
		block_on(store.link_users("1", "2")).unwrap();
		assert_eq!(store.find("1").unwrap().friends, vec!["2"]);
		assert_eq!(store.success().as_deref(), Some("Users linked successfully!"));

		block_on(store.unlink_users("2", "1")).unwrap();
		assert!(store.find("1").unwrap().friends.is_empty());
		assert_eq!(store.success().as_deref(), Some("Users unlinked successfully!"));
	}

	#[test]
	fn provisional_link_survives_fetches_until_acknowledged() {
		let store = store_with(vec![user("1", &[]), user("2", &[])]);
		let id = store.add_provisional_link("1", "2");
		assert_eq!(store.graph(&GridLayout::default()).graph.edges.len(), 1);

		block_on(store.fetch_users()).unwrap();
		assert_eq!(store.snapshot().provisional.len(), 1);
		assert_eq!(store.graph(&GridLayout::default()).graph.edges.len(), 1);

		block_on(store.link_provisional(id, "1", "2")).unwrap();
		assert!(store.snapshot().provisional.is_empty());
		let edges = store.graph(&GridLayout::default()).graph.edges;
		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0].id, "1-2");
	}

	#[test]
	fn failed_link_discards_only_its_own_provisional_link() {
		let store = store_with(vec![user("1", &[]), user("2", &[])]);
		let first = store.add_provisional_link("1", "2");
		let second = store.add_provisional_link("1", "2");
		store.api.set_offline(true);
		assert!(block_on(store.link_provisional(first, "1", "2")).is_err());

		let pending: Vec<u64> = store.snapshot().provisional.iter().map(|p| p.id).collect();
		assert_eq!(pending, vec![second]);
		assert_eq!(store.graph(&GridLayout::default()).graph.edges.len(), 1);
	}

	#[test]
	fn concurrent_mutations_are_not_coalesced() {
		let store = store_with(vec![]);
		let peak = Rc::new(Cell::new(0));
		let (seen, s) = (peak.clone(), store.clone());
		store.subscribe(move || seen.set(seen.get().max(s.snapshot().in_flight)));

		let mut pool = LocalPool::new();
		let spawner = pool.spawner();
		let first_gate = store.api.hold_next_list();
		let second_gate = store.api.hold_next_list();
		for name in ["Ann", "Bo"] {
			let s = store.clone();
			let draft = UserDraft::from_form(name, "30", "chess").unwrap();
			spawner.spawn_local(async move { s.create_user(&draft).await.unwrap() }).unwrap();
			pool.run_until_stalled();
		}

		assert_eq!(store.api.calls(), vec!["list", "create Ann", "list", "create Bo", "list"]);
		assert!(peak.get() >= 2);
		assert!(store.is_busy());

		second_gate.send(()).unwrap();
		pool.run_until_stalled();
		assert_eq!(store.records().len(), 2);
		assert!(store.is_busy());

		first_gate.send(()).unwrap();
		pool.run_until_stalled();
		assert_eq!(store.records().len(), 2);
		assert!(!store.is_busy());
		assert_eq!(store.success().as_deref(), Some("User created successfully!"));
	}

	#[test]
	fn stale_refetch_is_discarded() {
		let store = store_with(vec![user("1", &[])]);
		let mut pool = LocalPool::new();
		let spawner = pool.spawner();

		// The first fetch snapshots one user, the second sees two.
		let first_gate = store.api.hold_next_list();
		let s = store.clone();
		spawner.spawn_local(async move { s.fetch_users().await.unwrap() }).unwrap();
		pool.run_until_stalled();

		block_on(store.api.create_user(&UserDraft::from_form("Bo", "20", "go").unwrap())).unwrap();
		let second_gate = store.api.hold_next_list();
		let s = store.clone();
		spawner.spawn_local(async move { s.fetch_users().await.unwrap() }).unwrap();
		pool.run_until_stalled();
		assert!(store.is_busy());

		second_gate.send(()).unwrap();
		pool.run_until_stalled();
		assert_eq!(store.records().len(), 2);

		first_gate.send(()).unwrap();
		pool.run_until_stalled();
		assert_eq!(store.records().len(), 2);
		assert!(!store.is_busy());
	}

	#[test]
	fn listeners_observe_busy_transitions() {
		let store = store_with(vec![]);
		let busy_seen = Rc::new(Cell::new(false));
		let (flag, s) = (busy_seen.clone(), store.clone());
		store.subscribe(move || {
			if s.is_busy() {
				flag.set(true);
			}
		});
		block_on(store.fetch_users()).unwrap();
		assert!(busy_seen.get());
		assert!(!store.is_busy());
	}
}
