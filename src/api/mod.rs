//! The remote user service the record store talks to.

use async_trait::async_trait;

use crate::error::Error;
use crate::model::{UserDraft, UserRecord};

mod http;
#[cfg(test)]
pub(crate) mod memory;

pub use http::HttpUserApi;

/// CRUD and friendship operations offered by the persistence backend.
///
/// Futures are not required to be `Send`; in the browser they run on the
/// single-threaded task queue.
#[async_trait(?Send)]
pub trait UserApi {
	/// All users, in the order the backend returns them.
	async fn list_users(&self) -> Result<Vec<UserRecord>, Error>;

	async fn create_user(&self, draft: &UserDraft) -> Result<(), Error>;

	/// Replaces username, age and hobbies of `id`.
	async fn update_user(&self, id: &str, draft: &UserDraft) -> Result<(), Error>;

	/// Rejected by the backend while the user still has friendships.
	async fn delete_user(&self, id: &str) -> Result<(), Error>;

	async fn link_users(&self, user_id: &str, friend_id: &str) -> Result<(), Error>;

	async fn unlink_users(&self, user_id: &str, friend_id: &str) -> Result<(), Error>;

	async fn health_check(&self) -> Result<(), Error>;
}
