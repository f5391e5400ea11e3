//! In-memory user service used by store and controller tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use futures::channel::oneshot;

use super::UserApi;
use crate::error::Error;
use crate::model::{UserDraft, UserRecord};

/// Backend double that enforces the remote's rules and records every call.
#[derive(Default)]
pub struct MemoryUserApi {
	users: RefCell<Vec<UserRecord>>,
	next_id: Cell<u32>,
	calls: RefCell<Vec<String>>,
	offline: Cell<bool>,
	fail_next_list: Cell<bool>,
	list_gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
}

fn rejected(status: u16, message: &str) -> Error {
	Error::Remote {
		status,
		message: message.to_string(),
	}
}

/// Either side's adjacency list naming the other counts as a friendship.
fn are_friends(a: &UserRecord, b: &UserRecord) -> bool {
	a.friends.contains(&b.id) || b.friends.contains(&a.id)
}

impl MemoryUserApi {
	pub fn with_users(users: Vec<UserRecord>) -> Self {
		let api = Self::default();
		api.next_id.set(users.len() as u32 + 1);
		*api.users.borrow_mut() = users;
		api
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.borrow().clone()
	}

	/// Calls other than `list_users`.
	pub fn mutation_calls(&self) -> Vec<String> {
		self.calls
			.borrow()
			.iter()
			.filter(|c| !c.starts_with("list"))
			.cloned()
			.collect()
	}

	pub fn users(&self) -> Vec<UserRecord> {
		self.users.borrow().clone()
	}

	pub fn set_offline(&self, offline: bool) {
		self.offline.set(offline);
	}

	/// Makes the next `list_users` call fail with a transport error.
	pub fn fail_next_list(&self) {
		self.fail_next_list.set(true);
	}

	/// Makes the next `list_users` call snapshot the data, then wait for the returned sender.
	pub fn hold_next_list(&self) -> oneshot::Sender<()> {
		let (tx, rx) = oneshot::channel();
		self.list_gates.borrow_mut().push_back(rx);
		tx
	}

	fn record(&self, call: String) -> Result<(), Error> {
		self.calls.borrow_mut().push(call);
		if self.offline.get() {
			return Err(Error::Transport("connection refused".into()));
		}
		Ok(())
	}

	fn position(&self, id: &str) -> Result<usize, Error> {
		self.users
			.borrow()
			.iter()
			.position(|u| u.id == id)
			.ok_or_else(|| rejected(404, "User not found"))
	}
}

#[async_trait(?Send)]
impl UserApi for MemoryUserApi {
	async fn list_users(&self) -> Result<Vec<UserRecord>, Error> {
		self.record("list".into())?;
		if self.fail_next_list.replace(false) {
			return Err(Error::Transport("list timed out".into()));
		}
		let snapshot = self.users();
		let gate = self.list_gates.borrow_mut().pop_front();
		if let Some(gate) = gate {
			let _ = gate.await;
		}
		Ok(snapshot)
	}

	async fn create_user(&self, draft: &UserDraft) -> Result<(), Error> {
		self.record(format!("create {}", draft.username))?;
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		self.users.borrow_mut().push(UserRecord {
			id: id.to_string(),
			username: draft.username.clone(),
			age: draft.age,
			hobbies: draft.hobbies.clone(),
			friends: vec![],
			popularity_score: 0.0,
		});
		Ok(())
	}

	async fn update_user(&self, id: &str, draft: &UserDraft) -> Result<(), Error> {
		self.record(format!("update {id} {}", draft.hobbies.join(",")))?;
		let idx = self.position(id)?;
		let mut users = self.users.borrow_mut();
		users[idx].username = draft.username.clone();
		users[idx].age = draft.age;
		users[idx].hobbies = draft.hobbies.clone();
		Ok(())
	}

	async fn delete_user(&self, id: &str) -> Result<(), Error> {
		self.record(format!("delete {id}"))?;
		let idx = self.position(id)?;
		let linked = {
			let users = self.users.borrow();
			!users[idx].friends.is_empty() || users.iter().any(|u| u.friends.iter().any(|f| f == id))
		};
		if linked {
			return Err(rejected(
				400,
				"Cannot delete user with existing friendships. Please unlink first.",
			));
		}
		self.users.borrow_mut().remove(idx);
		Ok(())
	}

	async fn link_users(&self, user_id: &str, friend_id: &str) -> Result<(), Error> {
		self.record(format!("link {user_id} {friend_id}"))?;
		if user_id == friend_id {
			return Err(rejected(400, "Cannot link user to themselves"));
		}
		let (a, b) = (self.position(user_id)?, self.position(friend_id)?);
		let mut users = self.users.borrow_mut();
		if are_friends(&users[a], &users[b]) {
			return Err(rejected(400, "Users are already friends"));
		}
		users[a].friends.push(friend_id.to_string());
		users[b].friends.push(user_id.to_string());
		Ok(())
	}

	async fn unlink_users(&self, user_id: &str, friend_id: &str) -> Result<(), Error> {
		self.record(format!("unlink {user_id} {friend_id}"))?;
		let (a, b) = (self.position(user_id)?, self.position(friend_id)?);
		let mut users = self.users.borrow_mut();
		if !are_friends(&users[a], &users[b]) {
			return Err(rejected(400, "Users are not friends"));
		}
		users[a].friends.retain(|f| f != friend_id);
		users[b].friends.retain(|f| f != user_id);
		Ok(())
	}

	async fn health_check(&self) -> Result<(), Error> {
		self.record("health".into())
	}
}
