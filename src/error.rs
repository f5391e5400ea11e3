//! Error taxonomy shared by the store, the remote API and the interaction controller.

use thiserror::Error;

/// Failures detected locally, before any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
	#[error("Username is required")]
	MissingUsername,

	#[error("Username must be at least 2 characters")]
	UsernameTooShort,

	#[error("Age is required")]
	MissingAge,

	#[error("Age must be between 1 and 150")]
	AgeOutOfRange,

	#[error("At least one hobby is required")]
	NoHobbies,

	#[error("{username} already has the hobby \"{value}\"")]
	DuplicateAttribute { username: String, value: String },

	#[error("A user cannot be linked to themselves")]
	SelfLink,

	#[error("No user with id '{0}' in the current list")]
	UnknownUser(String),
}

/// Any failure a store or controller operation can report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	/// The remote completed the call but rejected it.
	#[error("{message}")]
	Remote { status: u16, message: String },

	/// The call could not complete at all.
	#[error("Network error: {0}")]
	Transport(String),

	#[error("Malformed response: {0}")]
	Decode(String),
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		if err.is_decode() {
			Error::Decode(err.to_string())
		} else {
			Error::Transport(err.to_string())
		}
	}
}
