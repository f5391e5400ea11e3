use leptos::prelude::*;

use crate::components::social_graph::LinkingSession;

/// Guides the operator through the two-click linking flow.
#[component]
pub fn LinkingPanel(
	#[prop(into)] session: Signal<LinkingSession>,
	#[prop(into)] on_start: Callback<()>,
	#[prop(into)] on_toggle: Callback<()>,
) -> impl IntoView {
	let body = move || match session.get() {
		LinkingSession::Idle => view! {
			<div>
				<p class="muted">"Click to start linking users together"</p>
				<button class="primary" on:click=move |_| on_start.run(())>
					"Start Linking"
				</button>
			</div>
		}
		.into_any(),
		LinkingSession::Armed => {
			view! { <p class="step">"Step 1: Click on the first user node"</p> }.into_any()
		}
		selected @ LinkingSession::SourceSelected { .. } => view! {
			<div>
				<p class="selected">
					"Selected: " <strong>{selected.snapshot().map(|u| u.username.clone())}</strong>
				</p>
				<p class="step">"Step 2: Click on the second user to link"</p>
			</div>
		}
		.into_any(),
	};

	view! {
		<div class="panel linking-panel">
			<div class="panel-header">
				<h3>"Link Users"</h3>
				<Show when=move || session.with(|s| s.is_active())>
					<button class="cancel" title="Stop linking (Esc)" on:click=move |_| on_toggle.run(())>
						"✕"
					</button>
				</Show>
			</div>
			{body}
			<p class="muted">"Or drag from a node's handle onto another node."</p>
		</div>
	}
}
