//! Home page component.

use leptos::prelude::*;

use crate::auth_context::use_auth;

/// The public landing page.
#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();

    view! {
        <div class="home-page">
            <Suspense fallback=move || view! { <p>"Loading..."</p> }>
                {move || {
                    let snap = auth.snapshot();
                    match snap.user {
                        Some(user_info) => {
                            let greeting = user_info.display_name.clone()
                                .map(|n| format!("Welcome back, {}!", n))
                                .unwrap_or_else(|| "Welcome back!".to_string());
                            view! {
                                <div>
                                    <h1>{greeting}</h1>
                                    <p>"Track your team's supply requests in one place."</p>
                                    <a href="/dashboard" class="cta-button">"Go to dashboard"</a>
                                </div>
                            }.into_any()
                        }
                        None => view! {
                            <div>
                                <h1>"stockroom"</h1>
                                <p>"The internal supply-requisition portal."</p>
                                <p>"Please log in to file and track supply requests."</p>
                                <a href="/auth/login" class="cta-button">"Log in"</a>
                            </div>
                        }.into_any(),
                    }
                }}
            </Suspense>
        </div>
    }
}
