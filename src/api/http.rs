use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::UserApi;
use crate::error::Error;
use crate::model::{UserDraft, UserRecord};

/// JSON-over-HTTP client for the user service.
#[derive(Clone, Debug)]
pub struct HttpUserApi {
	client: Client,
	base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LinkBody<'a> {
	friend_id: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
	message: Option<String>,
}

impl HttpUserApi {
	pub fn new(base_url: &str) -> Self {
		Self {
			client: Client::new(),
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	/// Sends the request and maps a non-success status to [`Error::Remote`],
	/// preferring the `message` field of the response body.
	async fn send(request: RequestBuilder, fallback: &str) -> Result<Response, Error> {
		let response = request.send().await?;
		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}
		let text = response.text().await.unwrap_or_default();
		let message = serde_json::from_str::<ErrorBody>(&text)
			.ok()
			.and_then(|b| b.message)
			.filter(|m| !m.is_empty())
			.unwrap_or_else(|| fallback.to_string());
		Err(Error::Remote {
			status: status.as_u16(),
			message,
		})
	}
}

#[async_trait(?Send)]
impl UserApi for HttpUserApi {
	async fn list_users(&self) -> Result<Vec<UserRecord>, Error> {
		let response = Self::send(self.client.get(self.url("/users")), "Failed to fetch users").await?;
		Ok(response.json::<Vec<UserRecord>>().await?)
	}

	async fn create_user(&self, draft: &UserDraft) -> Result<(), Error> {
		let request = self.client.post(self.url("/users")).json(draft);
		Self::send(request, "Failed to create user").await?;
		Ok(())
	}

	async fn update_user(&self, id: &str, draft: &UserDraft) -> Result<(), Error> {
		let request = self.client.put(self.url(&format!("/users/{id}"))).json(draft);
		Self::send(request, "Failed to update user").await?;
		Ok(())
	}

	async fn delete_user(&self, id: &str) -> Result<(), Error> {
		let request = self.client.delete(self.url(&format!("/users/{id}")));
		Self::send(request, "Failed to delete user").await?;
		Ok(())
	}

	async fn link_users(&self, user_id: &str, friend_id: &str) -> Result<(), Error> {
		let request = self
			.client
			.post(self.url(&format!("/users/{user_id}/link")))
			.json(&LinkBody { friend_id });
		Self::send(request, "Failed to link users").await?;
		Ok(())
	}

	async fn unlink_users(&self, user_id: &str, friend_id: &str) -> Result<(), Error> {
		let request = self
			.client
			.delete(self.url(&format!("/users/{user_id}/unlink")))
			.json(&LinkBody { friend_id });
		Self::send(request, "Failed to unlink users").await?;
		Ok(())
	}

	async fn health_check(&self) -> Result<(), Error> {
		Self::send(self.client.get(self.url("/health")), "Health check failed").await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn base_url_trailing_slash_is_trimmed() {
		let api = HttpUserApi::new("http://localhost:5000/api/");
		assert_eq!(api.url("/users"), "http://localhost:5000/api/users");
	}

	#[test]
	fn link_body_uses_camel_case() {
		let body = serde_json::to_string(&LinkBody { friend_id: "7" }).unwrap();
		assert_eq!(body, r#"{"friendId":"7"}"#);
	}
}
