use std::time::Duration;

use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
	Success,
	Error,
}

/// Self-dismissing notification. `on_close` receives the message it was showing,
/// so a stale timer cannot close a newer message.
#[component]
pub fn Toast(
	message: String,
	kind: ToastKind,
	timeout_ms: u64,
	#[prop(into)] on_close: Callback<String>,
) -> impl IntoView {
	let timed = message.clone();
	set_timeout(move || on_close.run(timed), Duration::from_millis(timeout_ms));

	let class = match kind {
		ToastKind::Success => "toast toast-success",
		ToastKind::Error => "toast toast-error",
	};
	let closed = message.clone();
	view! {
		<div class=class role="status">
			<span>{message}</span>
			<button on:click=move |_| on_close.run(closed.clone())>"×"</button>
		</div>
	}
}
