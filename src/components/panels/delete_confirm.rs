use leptos::prelude::*;

use crate::model::UserRecord;

#[component]
pub fn DeleteConfirmModal(
	#[prop(into)] target: Signal<Option<UserRecord>>,
	#[prop(into)] on_confirm: Callback<UserRecord>,
	#[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
	move || {
		target.get().map(|user| {
			let username = user.username.clone();
			view! {
				<div class="modal-backdrop">
					<div class="modal">
						<h2>"Delete User"</h2>
						<p>
							"Are you sure you want to delete " <strong>{username}</strong> "?"
						</p>
						<p class="muted">"Users with friendships must be unlinked first."</p>
						<div class="modal-actions">
							<button class="danger" on:click=move |_| on_confirm.run(user.clone())>
								"Delete"
							</button>
							<button on:click=move |_| on_close.run(())>"Cancel"</button>
						</div>
					</div>
				</div>
			}
		})
	}
}
