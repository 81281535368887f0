//! Login page component.

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

/// Login page: hands off to the OAuth initiation endpoint, forwarding the
/// return target the route guard put in the `redirect` query parameter.
#[component]
pub fn LoginPage() -> impl IntoView {
    let query = use_query_map();

    let oauth_href = move || match query.get().get("redirect") {
        Some(target) => format!("/auth/oauth?redirect={}", urlencoding::encode(&target)),
        None => "/auth/oauth".to_string(),
    };

    view! {
        <div class="login-page">
            <div class="login-box">
                <h1>"Log in to stockroom"</h1>
                <p>"Click below to authenticate with your identity provider."</p>
                <a href=oauth_href rel="external" class="login-button">"Log in with SSO"</a>
            </div>
        </div>
    }
}
