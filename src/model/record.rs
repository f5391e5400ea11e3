use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lowest and highest age the editor accepts.
pub const AGE_RANGE: std::ops::RangeInclusive<u16> = 1..=150;

/// One user as held by the record store.
///
/// Records are normalized on ingestion: hobby and friend lists are deduplicated
/// (first occurrence wins) and a missing or negative popularity score becomes `0.0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawUserRecord")]
pub struct UserRecord {
	pub id: String,
	pub username: String,
	pub age: u16,
	pub hobbies: Vec<String>,
	pub friends: Vec<String>,
	pub popularity_score: f64,
}

/// Wire shape accepted from the remote before normalization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUserRecord {
	#[serde(alias = "_id")]
	id: String,
	#[serde(default)]
	username: String,
	#[serde(default)]
	age: u16,
	#[serde(default)]
	hobbies: Vec<String>,
	#[serde(default)]
	friends: Option<Vec<String>>,
	#[serde(default)]
	popularity_score: Option<f64>,
}

impl From<RawUserRecord> for UserRecord {
	fn from(raw: RawUserRecord) -> Self {
		let popularity_score = match raw.popularity_score {
			Some(score) if score.is_finite() && score > 0.0 => score,
			_ => 0.0,
		};
		Self {
			id: raw.id,
			username: raw.username,
			age: raw.age,
			hobbies: dedup_preserving_order(raw.hobbies),
			friends: dedup_preserving_order(raw.friends.unwrap_or_default()),
			popularity_score,
		}
	}
}

impl UserRecord {
	/// Full replacement payload carrying this record's editable fields unchanged.
	pub fn to_draft(&self) -> UserDraft {
		UserDraft {
			username: self.username.clone(),
			age: self.age,
			hobbies: self.hobbies.clone(),
		}
	}
}

/// Drops records the graph cannot key (empty id) and repeated ids, keeping the first.
pub fn normalize_records(records: Vec<UserRecord>) -> Vec<UserRecord> {
	let mut seen = std::collections::HashSet::new();
	records
		.into_iter()
		.filter(|r| {
			if r.id.is_empty() {
				log::warn!("dropping user record without id ({:?})", r.username);
				return false;
			}
			if !seen.insert(r.id.clone()) {
				log::warn!("dropping duplicate user record {}", r.id);
				return false;
			}
			true
		})
		.collect()
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
	let mut out: Vec<String> = Vec::with_capacity(values.len());
	for v in values {
		if !out.contains(&v) {
			out.push(v);
		}
	}
	out
}

/// Payload for create and update: the full set of editable fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserDraft {
	pub username: String,
	pub age: u16,
	pub hobbies: Vec<String>,
}

/// Per-field editor errors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrors {
	pub username: Option<ValidationError>,
	pub age: Option<ValidationError>,
	pub hobbies: Option<ValidationError>,
}

impl FormErrors {
	pub fn is_empty(&self) -> bool {
		self.username.is_none() && self.age.is_none() && self.hobbies.is_none()
	}
}

impl UserDraft {
	/// Validates raw form input. Hobbies are comma separated; blanks are ignored.
	pub fn from_form(username: &str, age: &str, hobbies: &str) -> Result<Self, FormErrors> {
		let mut errors = FormErrors::default();

		let username = username.trim();
		if username.is_empty() {
			errors.username = Some(ValidationError::MissingUsername);
		} else if username.chars().count() < 2 {
			errors.username = Some(ValidationError::UsernameTooShort);
		}

		let age_text = age.trim();
		let parsed_age = if age_text.is_empty() {
			errors.age = Some(ValidationError::MissingAge);
			None
		} else {
			match age_text.parse::<u16>() {
				Ok(a) if AGE_RANGE.contains(&a) => Some(a),
				_ => {
					errors.age = Some(ValidationError::AgeOutOfRange);
					None
				}
			}
		};

		let hobbies = parse_hobby_list(hobbies);
		if hobbies.is_empty() {
			errors.hobbies = Some(ValidationError::NoHobbies);
		}

		match parsed_age {
			Some(age) if errors.is_empty() => Ok(Self {
				username: username.to_string(),
				age,
				hobbies,
			}),
			_ => Err(errors),
		}
	}

	/// Appends `value` to the hobby list, rejecting an exact duplicate.
	pub fn with_hobby(mut self, value: &str) -> Result<Self, ValidationError> {
		if self.hobbies.iter().any(|h| h == value) {
			return Err(ValidationError::DuplicateAttribute {
				username: self.username,
				value: value.to_string(),
			});
		}
		self.hobbies.push(value.to_string());
		Ok(self)
	}
}

/// Splits a comma separated hobby string into trimmed, unique, non-empty entries.
pub fn parse_hobby_list(input: &str) -> Vec<String> {
	dedup_preserving_order(
		input
			.split(',')
			.map(str::trim)
			.filter(|h| !h.is_empty())
			.map(String::from)
			.collect(),
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ingestion_fills_defaults_and_dedups() {
		let json = r#"[{"id":"1","username":"ann","age":30,"hobbies":["chess","chess","go"]}]"#;
		let records: Vec<UserRecord> = serde_json::from_str(json).unwrap();
		assert_eq!(records[0].hobbies, vec!["chess", "go"]);
		assert!(records[0].friends.is_empty());
		assert_eq!(records[0].popularity_score, 0.0);
	}

	#[test]
	fn ingestion_accepts_mongo_style_id_and_clamps_score() {
		let json = r#"{"_id":"x","username":"b","age":4,"hobbies":[],"friends":["y","y"],"popularityScore":-3}"#;
		let record: UserRecord = serde_json::from_str(json).unwrap();
		assert_eq!(record.id, "x");
		assert_eq!(record.friends, vec!["y"]);
		assert_eq!(record.popularity_score, 0.0);
	}

	#[test]
	fn normalize_drops_blank_and_repeated_ids() {
		let rec = |id: &str| UserRecord {
			id: id.into(),
			username: "u".into(),
			age: 20,
			hobbies: vec![],
			friends: vec![],
			popularity_score: 0.0,
		};
		let out = normalize_records(vec![rec("a"), rec(""), rec("a"), rec("b")]);
		let ids: Vec<_> = out.iter().map(|r| r.id.as_str()).collect();
		assert_eq!(ids, vec!["a", "b"]);
	}

	#[test]
	fn form_accepts_valid_input() {
		let draft = UserDraft::from_form("  Ann ", "30", "chess, go ,, chess").unwrap();
		assert_eq!(draft.username, "Ann");
		assert_eq!(draft.age, 30);
		assert_eq!(draft.hobbies, vec!["chess", "go"]);
	}

	#[test]
	fn form_reports_every_bad_field() {
		let errors = UserDraft::from_form("A", "151", " , ").unwrap_err();
		assert_eq!(errors.username, Some(ValidationError::UsernameTooShort));
		assert_eq!(errors.age, Some(ValidationError::AgeOutOfRange));
		assert_eq!(errors.hobbies, Some(ValidationError::NoHobbies));

		let errors = UserDraft::from_form("", "", "x").unwrap_err();
		assert_eq!(errors.username, Some(ValidationError::MissingUsername));
		assert_eq!(errors.age, Some(ValidationError::MissingAge));
		assert!(errors.hobbies.is_none());
	}

	#[test]
	fn with_hobby_appends_or_rejects() {
		let draft = UserDraft {
			username: "ann".into(),
			age: 30,
			hobbies: vec!["chess".into()],
		};
		let extended = draft.clone().with_hobby("Chess").unwrap();
		assert_eq!(extended.hobbies, vec!["chess", "Chess"]);
		assert_eq!(
			draft.with_hobby("chess"),
			Err(ValidationError::DuplicateAttribute {
				username: "ann".into(),
				value: "chess".into()
			})
		);
	}
}
