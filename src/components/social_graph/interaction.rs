//! Transient interaction state and its transition function.
//!
//! `transition` is pure: it maps the current state and one UI event to the next
//! state plus the side effects to run. Nothing here touches the network.

use crate::error::ValidationError;
use crate::model::{UserDraft, UserRecord};

/// Progress through the two-click linking flow.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LinkingSession {
	#[default]
	Idle,
	/// Linking mode is on, no endpoint chosen yet.
	Armed,
	/// First endpoint chosen. `snapshot` is for display; the request re-resolves ids.
	SourceSelected { source_id: String, snapshot: UserRecord },
}

impl LinkingSession {
	pub fn is_active(&self) -> bool {
		!matches!(self, LinkingSession::Idle)
	}

	pub fn source_id(&self) -> Option<&str> {
		match self {
			LinkingSession::SourceSelected { source_id, .. } => Some(source_id),
			_ => None,
		}
	}

	pub fn snapshot(&self) -> Option<&UserRecord> {
		match self {
			LinkingSession::SourceSelected { snapshot, .. } => Some(snapshot),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
	pub linking: LinkingSession,
	/// Node currently hovered by an attribute drag.
	pub drop_target: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
	/// Turns linking mode on; no effect if it is already on.
	StartLinking,
	ToggleLinking,
	CancelLinking,
	NodeSelected(String),
	/// Pointer drag from one node's handle released over another node.
	Connect { source: String, target: String },
	DragEnter(String),
	DragLeave(String),
	AttributeDropped { target: String, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
	/// Draw the link immediately, before the backend confirms it.
	ShowProvisionalEdge { source: String, target: String },
	CreateFriendship { source: String, target: String, provisional: bool },
	AssignAttribute {
		user_id: String,
		username: String,
		value: String,
		update: UserDraft,
	},
	Reject(ValidationError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
	pub state: InteractionState,
	pub commands: Vec<Command>,
}

fn find<'a>(records: &'a [UserRecord], id: &str) -> Option<&'a UserRecord> {
	records.iter().find(|r| r.id == id)
}

pub fn transition(state: &InteractionState, event: Event, records: &[UserRecord]) -> Transition {
	let mut next = state.clone();
	let mut commands = Vec::new();

	match event {
		Event::StartLinking => {
			if !next.linking.is_active() {
				next.linking = LinkingSession::Armed;
			}
		}
		Event::ToggleLinking => {
			next.linking = if next.linking.is_active() {
				LinkingSession::Idle
			} else {
				LinkingSession::Armed
			};
		}
		Event::CancelLinking => next.linking = LinkingSession::Idle,
		Event::NodeSelected(id) => match &state.linking {
			LinkingSession::Idle => {}
			LinkingSession::Armed => match find(records, &id) {
				Some(record) => {
					next.linking = LinkingSession::SourceSelected {
						source_id: id,
						snapshot: record.clone(),
					};
				}
				None => commands.push(Command::Reject(ValidationError::UnknownUser(id))),
			},
			LinkingSession::SourceSelected { source_id, .. } if *source_id == id => {}
			LinkingSession::SourceSelected { source_id, .. } => {
				// The session ends here whatever happens to the request.
				next.linking = LinkingSession::Idle;
				if find(records, source_id).is_none() {
					commands.push(Command::Reject(ValidationError::UnknownUser(source_id.clone())));
				} else if find(records, &id).is_none() {
					commands.push(Command::Reject(ValidationError::UnknownUser(id)));
				} else {
					commands.push(Command::CreateFriendship {
						source: source_id.clone(),
						target: id,
						provisional: false,
					});
				}
			}
		},
		Event::Connect { source, target } => {
			let missing = [&source, &target]
				.into_iter()
				.find(|id| find(records, id).is_none())
				.cloned();
			if source == target {
				// self-loop: ignored without a message
			} else if let Some(missing) = missing {
				commands.push(Command::Reject(ValidationError::UnknownUser(missing)));
			} else {
				commands.push(Command::ShowProvisionalEdge {
					source: source.clone(),
					target: target.clone(),
				});
				commands.push(Command::CreateFriendship {
					source,
					target,
					provisional: true,
				});
			}
		}
		Event::DragEnter(id) => next.drop_target = Some(id),
		Event::DragLeave(id) => {
			if next.drop_target.as_deref() == Some(id.as_str()) {
				next.drop_target = None;
			}
		}
		Event::AttributeDropped { target, value } => {
			next.drop_target = None;
			// Exact value, case and whitespace included; an empty payload is not a hobby.
			if !value.is_empty() {
				match find(records, &target) {
					None => commands.push(Command::Reject(ValidationError::UnknownUser(target))),
					Some(record) => match record.to_draft().with_hobby(&value) {
						Ok(update) => commands.push(Command::AssignAttribute {
							user_id: record.id.clone(),
							username: record.username.clone(),
							value,
							update,
						}),
						Err(err) => commands.push(Command::Reject(err)),
					},
				}
			}
		}
	}

	Transition {
		state: next,
		commands,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn user(id: &str, hobbies: &[&str]) -> UserRecord {
		UserRecord {
			id: id.into(),
			username: format!("name-{id}"),
			age: 40,
			hobbies: hobbies.iter().map(|h| h.to_string()).collect(),
			friends: vec![],
			popularity_score: 0.0,
		}
	}

	fn users() -> Vec<UserRecord> {
		vec![user("u1", &["chess"]), user("u2", &["go"])]
	}

	fn step(state: &InteractionState, event: Event) -> Transition {
		transition(state, event, &users())
	}

	#[test]
	fn linking_walkthrough() {
		let idle = InteractionState::default();
		let armed = step(&idle, Event::ToggleLinking);
		assert_eq!(armed.state.linking, LinkingSession::Armed);
		assert!(armed.commands.is_empty());

		let selected = step(&armed.state, Event::NodeSelected("u1".into()));
		assert_eq!(selected.state.linking.source_id(), Some("u1"));
		assert_eq!(selected.state.linking.snapshot().unwrap().username, "name-u1");

		let again = step(&selected.state, Event::NodeSelected("u1".into()));
		assert_eq!(again.state, selected.state);
		assert!(again.commands.is_empty());

		let done = step(&again.state, Event::NodeSelected("u2".into()));
		assert_eq!(done.state.linking, LinkingSession::Idle);
		assert_eq!(
			done.commands,
			vec![Command::CreateFriendship {
				source: "u1".into(),
				target: "u2".into(),
				provisional: false
			}]
		);
	}

	#[test]
	fn start_linking_is_idempotent() {
		let armed = step(&InteractionState::default(), Event::StartLinking).state;
		let selected = step(&armed, Event::NodeSelected("u1".into())).state;
		let still = step(&selected, Event::StartLinking);
		assert_eq!(still.state, selected);
	}

	#[test]
	fn toggle_off_and_cancel_clear_the_source() {
		let armed = step(&InteractionState::default(), Event::ToggleLinking).state;
		let selected = step(&armed, Event::NodeSelected("u2".into())).state;
		assert_eq!(step(&selected, Event::ToggleLinking).state.linking, LinkingSession::Idle);
		assert_eq!(step(&selected, Event::CancelLinking).state.linking, LinkingSession::Idle);
		assert_eq!(step(&armed, Event::CancelLinking).state.linking, LinkingSession::Idle);
	}

	#[test]
	fn clicks_outside_linking_mode_do_nothing() {
		let t = step(&InteractionState::default(), Event::NodeSelected("u1".into()));
		assert_eq!(t.state, InteractionState::default());
		assert!(t.commands.is_empty());
	}

	#[test]
	fn vanished_source_is_rejected_on_second_click() {
		let state = InteractionState {
			linking: LinkingSession::SourceSelected {
				source_id: "gone".into(),
				snapshot: user("gone", &[]),
			},
			drop_target: None,
		};
		let t = step(&state, Event::NodeSelected("u2".into()));
		assert_eq!(t.state.linking, LinkingSession::Idle);
		assert_eq!(
			t.commands,
			vec![Command::Reject(ValidationError::UnknownUser("gone".into()))]
		);
	}

	#[test]
	fn connect_gesture_is_optimistic() {
		let t = step(
			&InteractionState::default(),
			Event::Connect {
				source: "u2".into(),
				target: "u1".into(),
			},
		);
		assert_eq!(
			t.commands,
			vec![
				Command::ShowProvisionalEdge {
					source: "u2".into(),
					target: "u1".into()
				},
				Command::CreateFriendship {
					source: "u2".into(),
					target: "u1".into(),
					provisional: true
				},
			]
		);
	}

	#[test]
	fn connect_to_self_is_silently_ignored() {
		let t = step(
			&InteractionState::default(),
			Event::Connect {
				source: "u1".into(),
				target: "u1".into(),
			},
		);
		assert!(t.commands.is_empty());
	}

	#[test]
	fn drop_of_held_attribute_is_rejected_locally() {
		let hovering = step(&InteractionState::default(), Event::DragEnter("u1".into())).state;
		assert_eq!(hovering.drop_target.as_deref(), Some("u1"));

		let t = step(
			&hovering,
			Event::AttributeDropped {
				target: "u1".into(),
				value: "chess".into(),
			},
		);
		assert_eq!(t.state.drop_target, None);
		assert_eq!(
			t.commands,
			vec![Command::Reject(ValidationError::DuplicateAttribute {
				username: "name-u1".into(),
				value: "chess".into()
			})]
		);
	}

	#[test]
	fn drop_of_new_attribute_appends_it() {
		let t = step(
			&InteractionState::default(),
			Event::AttributeDropped {
				target: "u1".into(),
				value: "Chess".into(),
			},
		);
		match t.commands.as_slice() {
			[Command::AssignAttribute { user_id, update, .. }] => {
				assert_eq!(user_id, "u1");
				assert_eq!(update.username, "name-u1");
				assert_eq!(update.age, 40);
				assert_eq!(update.hobbies, vec!["chess", "Chess"]);
			}
			other => panic!("unexpected commands {other:?}"),
		}
	}

	#[test]
	fn dropped_value_is_matched_and_appended_verbatim() {
		let t = step(
			&InteractionState::default(),
			Event::AttributeDropped {
				target: "u1".into(),
				value: " chess".into(),
			},
		);
		match t.commands.as_slice() {
			[Command::AssignAttribute { value, update, .. }] => {
				assert_eq!(value, " chess");
				assert_eq!(update.hobbies, vec!["chess", " chess"]);
			}
			other => panic!("unexpected commands {other:?}"),
		}
	}

	#[test]
	fn drag_leave_only_clears_the_matching_node() {
		let over_u1 = step(&InteractionState::default(), Event::DragEnter("u1".into())).state;
		assert_eq!(step(&over_u1, Event::DragLeave("u2".into())).state, over_u1);
		assert_eq!(step(&over_u1, Event::DragLeave("u1".into())).state.drop_target, None);
	}
}
