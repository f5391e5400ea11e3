use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use crate::model::{FormErrors, UserDraft, UserRecord};

#[derive(Clone, Debug, PartialEq)]
pub enum FormMode {
	Create,
	Edit(UserRecord),
}

impl FormMode {
	fn editing_id(&self) -> Option<String> {
		match self {
			FormMode::Create => None,
			FormMode::Edit(user) => Some(user.id.clone()),
		}
	}
}

fn field_error(errors: RwSignal<FormErrors>, pick: fn(&FormErrors) -> Option<String>) -> impl IntoView {
	move || {
		errors
			.with(pick)
			.map(|message| view! { <p class="field-error">{message}</p> })
	}
}

/// Create/edit dialog. Submits a validated draft together with the id being edited.
#[component]
pub fn UserFormModal(
	#[prop(into)] mode: Signal<Option<FormMode>>,
	#[prop(into)] on_submit: Callback<(Option<String>, UserDraft)>,
	#[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
	let username = RwSignal::new(String::new());
	let age = RwSignal::new(String::new());
	let hobbies = RwSignal::new(String::new());
	let errors = RwSignal::new(FormErrors::default());

	// Reload the fields whenever the dialog opens for a different target.
	Effect::new(move |_| {
		let draft = match mode.get() {
			Some(FormMode::Edit(user)) => Some(user.to_draft()),
			_ => None,
		};
		username.set(draft.as_ref().map(|d| d.username.clone()).unwrap_or_default());
		age.set(draft.as_ref().map(|d| d.age.to_string()).unwrap_or_default());
		hobbies.set(draft.map(|d| d.hobbies.join(", ")).unwrap_or_default());
		errors.set(FormErrors::default());
	});

	let on_form_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let Some(current) = mode.get_untracked() else {
			return;
		};
		let parsed = UserDraft::from_form(
			&username.get_untracked(),
			&age.get_untracked(),
			&hobbies.get_untracked(),
		);
		match parsed {
			Ok(draft) => {
				errors.set(FormErrors::default());
				on_submit.run((current.editing_id(), draft));
			}
			Err(field_errors) => errors.set(field_errors),
		}
	};

	move || {
		mode.get().map(|current| {
			let (title, action) = match current {
				FormMode::Create => ("Create New User", "Create User"),
				FormMode::Edit(_) => ("Edit User", "Update User"),
			};
			view! {
				<div class="modal-backdrop">
					<form class="modal" on:submit=on_form_submit>
						<h2>{title}</h2>
						<label>"Username"</label>
						<input
							type="text"
							placeholder="Enter username"
							prop:value=move || username.get()
							on:input=move |ev| username.set(event_target_value(&ev))
						/>
						{field_error(errors, |e| e.username.as_ref().map(|e| e.to_string()))}
						<label>"Age"</label>
						<input
							type="number"
							placeholder="Enter age"
							prop:value=move || age.get()
							on:input=move |ev| age.set(event_target_value(&ev))
						/>
						{field_error(errors, |e| e.age.as_ref().map(|e| e.to_string()))}
						<label>"Hobbies (comma-separated)"</label>
						<input
							type="text"
							placeholder="e.g., reading, gaming, hiking"
							prop:value=move || hobbies.get()
							on:input=move |ev| hobbies.set(event_target_value(&ev))
						/>
						{field_error(errors, |e| e.hobbies.as_ref().map(|e| e.to_string()))}
						<div class="modal-actions">
							<button type="submit" class="primary">{action}</button>
							<button type="button" on:click=move |_| on_close.run(())>
								"Cancel"
							</button>
						</div>
					</form>
				</div>
			}
		})
	}
}
