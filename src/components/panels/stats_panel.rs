use leptos::prelude::*;

use crate::model::NetworkStats;

#[component]
pub fn StatsPanel(#[prop(into)] stats: Signal<NetworkStats>) -> impl IntoView {
	view! {
		<div class="panel stats-panel">
			<h3>"Network Stats"</h3>
			<dl>
				<dt>"Total Users:"</dt>
				<dd class="blue">{move || stats.with(|s| s.total_users)}</dd>
				<dt>"Connections:"</dt>
				<dd class="green">{move || stats.with(|s| s.connections)}</dd>
				<dt>"Avg Score:"</dt>
				<dd class="purple">{move || stats.with(|s| s.average_score_label())}</dd>
			</dl>
		</div>
	}
}
