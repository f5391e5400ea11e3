use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::HttpUserApi;
use crate::components::panels::{
	DeleteConfirmModal, FormMode, LinkingPanel, Sidebar, StatsPanel, Toast, ToastKind, UserFormModal,
};
use crate::components::social_graph::{
	Event, InteractionController, InteractionState, SocialGraphCanvas,
};
use crate::config::AppConfig;
use crate::model::{NetworkStats, UserDraft, UserRecord};
use crate::store::{RecordStore, StoreState};

type Controller = InteractionController<HttpUserApi>;

/// Graph workspace: sidebar, canvas, overlays and dialogs.
#[component]
pub fn Home() -> impl IntoView {
	let config = AppConfig::default();
	let toast_timeout_ms = config.toast_timeout_ms;
	let layout = config.layout.clone();

	let store = RecordStore::new(HttpUserApi::new(&config.api_base));
	let controller = Controller::new(store.clone());

	// Mirror the store and controller into signals so the view can track them.
	let store_state = RwSignal::new(store.snapshot());
	let interaction = RwSignal::new(InteractionState::default());
	{
		let source = store.clone();
		store.subscribe(move || store_state.set(source.snapshot()));
		let source = controller.clone();
		controller.subscribe(move || interaction.set(source.state()));
	}
	let controller = StoredValue::new_local(controller);

	let projection = Memo::new(move |_| store_state.with(|s| s.graph(&layout)));
	let graph = Signal::derive(move || projection.with(|p| p.graph.clone()));
	let users = Signal::derive(move || store_state.with(|s| s.records.clone()));
	let stats = Signal::derive(move || {
		let connections = projection.with(|p| p.graph.edges.len());
		store_state.with(|s| NetworkStats::new(&s.records, connections))
	});
	let session = Signal::derive(move || interaction.with(|i| i.linking.clone()));
	let linking_source =
		Signal::derive(move || interaction.with(|i| i.linking.source_id().map(str::to_string)));
	let drop_target = Signal::derive(move || interaction.with(|i| i.drop_target.clone()));
	let busy = Signal::derive(move || store_state.with(StoreState::is_busy));

	let form_mode = RwSignal::new(None::<FormMode>);
	let delete_target = RwSignal::new(None::<UserRecord>);

	let with_store = move || controller.with_value(|c| c.store().clone());

	let dispatch = move |event: Event| {
		let work = controller.with_value(|c| c.dispatch(event));
		spawn_local(async move {
			// Failures are already reported through the store's error message.
			let _ = work.await;
		});
	};

	let escape = window_event_listener(ev::keydown, move |key| {
		if key.key() == "Escape" {
			dispatch(Event::CancelLinking);
		}
	});
	on_cleanup(move || escape.remove());

	let store_init = store.clone();
	spawn_local(async move {
		if store_init.fetch_users().await.is_ok() {
			let _ = store_init.health_check().await;
		}
	});

	let on_submit = Callback::new(move |(id, draft): (Option<String>, UserDraft)| {
		let store = with_store();
		spawn_local(async move {
			let result = match id {
				Some(id) => store.update_user(&id, &draft).await,
				None => store.create_user(&draft).await,
			};
			if result.is_ok() {
				form_mode.set(None);
			}
		});
	});

	let on_confirm_delete = Callback::new(move |user: UserRecord| {
		let store = with_store();
		delete_target.set(None);
		spawn_local(async move {
			let _ = store.delete_user(&user.id).await;
		});
	});

	let on_unlink = Callback::new(move |(user_id, friend_id): (String, String)| {
		let store = with_store();
		spawn_local(async move {
			let _ = store.unlink_users(&user_id, &friend_id).await;
		});
	});

	let dismiss_success = Callback::new(move |shown: String| {
		let store = with_store();
		if store.success().as_deref() == Some(shown.as_str()) {
			store.dismiss_success();
		}
	});
	let dismiss_error = Callback::new(move |shown: String| {
		let store = with_store();
		if store.error().as_deref() == Some(shown.as_str()) {
			store.dismiss_error();
		}
	});

	// Memoised so a toast is only rebuilt (and its timer restarted) for a new message.
	let success = Memo::new(move |_| store_state.with(|s| s.success.clone()));
	let error = Memo::new(move |_| store_state.with(|s| s.error.clone()));
	let success_toast = move || {
		success.get().map(|message| {
			view! {
				<Toast
					message=message
					kind=ToastKind::Success
					timeout_ms=toast_timeout_ms
					on_close=dismiss_success
				/>
			}
		})
	};
	let error_toast = move || {
		error.get().map(|message| {
			view! {
				<Toast
					message=message
					kind=ToastKind::Error
					timeout_ms=toast_timeout_ms
					on_close=dismiss_error
				/>
			}
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="workspace">
				<Sidebar
					users=users
					on_create=move |_: ()| form_mode.set(Some(FormMode::Create))
					on_edit=move |user: UserRecord| form_mode.set(Some(FormMode::Edit(user)))
					on_delete=move |user: UserRecord| delete_target.set(Some(user))
					on_unlink=on_unlink
				/>
				<main class="graph-area">
					<SocialGraphCanvas
						graph=graph
						linking_source=linking_source
						drop_target=drop_target
						on_event=dispatch
					/>
					<div class="graph-overlay">
						<LinkingPanel
							session=session
							on_start=move |_: ()| dispatch(Event::StartLinking)
							on_toggle=move |_: ()| dispatch(Event::ToggleLinking)
						/>
						<StatsPanel stats=stats />
					</div>
					<Show when=move || busy.get()>
						<div class="loading-overlay">
							<div class="spinner"></div>
						</div>
					</Show>
				</main>
			</div>

			<UserFormModal
				mode=form_mode
				on_submit=on_submit
				on_close=move |_: ()| form_mode.set(None)
			/>
			<DeleteConfirmModal
				target=delete_target
				on_confirm=on_confirm_delete
				on_close=move |_: ()| delete_target.set(None)
			/>
			<div class="toasts">{success_toast} {error_toast}</div>
		</ErrorBoundary>
	}
}
