//! Dashboard page component.

use leptos::prelude::*;

use crate::app::Protected;
use crate::auth_context::use_auth;
use crate::requests::request_stats;

/// The dashboard shell: greeting, request counts, and quick links.
#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let stats = Resource::new(|| (), |_| request_stats());

    view! {
        <div class="dashboard-page">
            <Protected>
                <h1>"Dashboard"</h1>
                {move || {
                    let snap = auth.snapshot();
                    snap.user.map(|user_info| view! {
                        <p class="dashboard-greeting">
                            {format!("Signed in as {} ({})", user_info.label(), user_info.role)}
                        </p>
                    })
                }}
                <Suspense fallback=move || view! { <p>"Loading stats..."</p> }>
                    {move || {
                        stats.get().map(|result| {
                            match result {
                                Ok(stats) => view! {
                                    <div class="stat-cards">
                                        <div class="stat-card">
                                            <span class="stat-value">{stats.pending}</span>
                                            <span class="stat-label">"Pending"</span>
                                        </div>
                                        <div class="stat-card">
                                            <span class="stat-value">{stats.approved}</span>
                                            <span class="stat-label">"Approved"</span>
                                        </div>
                                        <div class="stat-card">
                                            <span class="stat-value">{stats.rejected}</span>
                                            <span class="stat-label">"Rejected"</span>
                                        </div>
                                        <div class="stat-card">
                                            <span class="stat-value">{stats.fulfilled}</span>
                                            <span class="stat-label">"Fulfilled"</span>
                                        </div>
                                        <div class="stat-card stat-card-total">
                                            <span class="stat-value">{stats.total()}</span>
                                            <span class="stat-label">"Total"</span>
                                        </div>
                                    </div>
                                }.into_any(),
                                Err(_) => view! {
                                    <p class="error">"Failed to load request stats."</p>
                                }.into_any(),
                            }
                        })
                    }}
                </Suspense>
                <div class="dashboard-links">
                    <a href="/requests" class="link-button">"Browse requests"</a>
                    {move || {
                        auth.snapshot().can_submit().then(|| view! {
                            <a href="/requests/new" class="link-button">"New request"</a>
                        })
                    }}
                </div>
            </Protected>
        </div>
    }
}
