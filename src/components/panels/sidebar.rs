use leptos::prelude::*;
use web_sys::{DragEvent, MouseEvent};

use crate::components::social_graph::ATTRIBUTE_MIME;
use crate::model::{UserRecord, filter_hobbies, hobby_catalog, preview, rank_badge, ranked_by_popularity};

/// Hobby catalog (the drag source for attribute drops) and the ranked user list.
#[component]
pub fn Sidebar(
	#[prop(into)] users: Signal<Vec<UserRecord>>,
	#[prop(into)] on_create: Callback<()>,
	#[prop(into)] on_edit: Callback<UserRecord>,
	#[prop(into)] on_delete: Callback<UserRecord>,
	#[prop(into)] on_unlink: Callback<(String, String)>,
) -> impl IntoView {
	let search = RwSignal::new(String::new());
	let selected = RwSignal::new(None::<String>);
	let catalog = Memo::new(move |_| users.with(|u| hobby_catalog(u)));

	let hobby_tokens = move || {
		let needle = search.get();
		let visible: Vec<String> = catalog.with(|c| filter_hobbies(c, &needle).into_iter().cloned().collect());
		if visible.is_empty() {
			return view! { <p class="empty-hint">"No hobbies found"</p> }.into_any();
		}
		visible
			.into_iter()
			.map(|hobby| {
				let payload = hobby.clone();
				let on_dragstart = move |ev: DragEvent| {
					if let Some(dt) = ev.data_transfer() {
						let _ = dt.set_data(ATTRIBUTE_MIME, &payload);
						dt.set_effect_allowed("copy");
					}
				};
				view! {
					<span class="hobby-token" draggable="true" on:dragstart=on_dragstart>
						{hobby}
					</span>
				}
			})
			.collect_view()
			.into_any()
	};

	let user_cards = move || {
		let all = users.get();
		let name_of = |id: &str| {
			all.iter()
				.find(|u| u.id == id)
				.map(|u| u.username.clone())
				.unwrap_or_else(|| id.to_string())
		};
		ranked_by_popularity(&all)
			.into_iter()
			.enumerate()
			.map(|(rank, user)| {
				let id = user.id.clone();
				let select_id = id.clone();
				let (edit_user, delete_user) = (user.clone(), user.clone());
				let (shown, more) = preview(&user.hobbies, 3);
				let chips = shown
					.iter()
					.map(|h| view! { <span class="hobby-chip">{h.clone()}</span> })
					.collect_view();
				let friends = user
					.friends
					.iter()
					.map(|fid| {
						let pair = (id.clone(), fid.clone());
						view! {
							<span class="friend-chip">
								{name_of(fid)}
								<button
									class="unlink"
									title="Unlink"
									on:click=move |ev: MouseEvent| {
										ev.stop_propagation();
										on_unlink.run(pair.clone());
									}
								>
									"×"
								</button>
							</span>
						}
					})
					.collect_view();
				view! {
					<div
						class=move || {
							if selected.get().as_deref() == Some(id.as_str()) {
								"user-card selected"
							} else {
								"user-card"
							}
						}
						on:click=move |_| selected.set(Some(select_id.clone()))
					>
						<div class="user-card-header">
							<div>
								<h4>{rank_badge(rank).unwrap_or("")} " " {user.username.clone()}</h4>
								<p class="muted">"Age: " {user.age}</p>
								<span class="score">{format!("Score: {:.1}", user.popularity_score)}</span>
								<span class="muted">{format!(" {} friends", user.friends.len())}</span>
							</div>
							<div class="card-actions">
								<button
									title="Edit user"
									on:click=move |ev: MouseEvent| {
										ev.stop_propagation();
										on_edit.run(edit_user.clone());
									}
								>
									"Edit"
								</button>
								<button
									title="Delete user"
									on:click=move |ev: MouseEvent| {
										ev.stop_propagation();
										on_delete.run(delete_user.clone());
									}
								>
									"Delete"
								</button>
							</div>
						</div>
						<div class="chips">
							{chips}
							{(more > 0).then(|| view! { <span class="muted">{format!("+{more} more")}</span> })}
						</div>
						<div class="chips">{friends}</div>
					</div>
				}
			})
			.collect_view()
	};

	view! {
		<aside class="sidebar">
			<div class="sidebar-header">
				<h2>"User Network"</h2>
				<button class="primary" on:click=move |_| on_create.run(())>
					"Create New User"
				</button>
			</div>
			<div class="sidebar-body">
				<section class="hobbies">
					<label>"Search Hobbies"</label>
					<input
						type="text"
						placeholder="Type to filter..."
						prop:value=move || search.get()
						on:input=move |ev| search.set(event_target_value(&ev))
					/>
					<p class="muted">"Drag a hobby onto a user to add it."</p>
					<div class="chips">{hobby_tokens}</div>
				</section>
				<section class="users">
					<h3>{move || format!("All Users ({})", users.with(|u| u.len()))}</h3>
					<Show
						when=move || users.with(|u| !u.is_empty())
						fallback=|| view! { <p class="empty-hint">"No users yet. Create one to get started!"</p> }
					>
						{user_cards}
					</Show>
				</section>
			</div>
		</aside>
	}
}
