//! Unauthorized page component.

use leptos::prelude::*;

/// Shown when a signed-in user lacks the role a page requires, or when a
/// deactivated account attempts to sign in.
#[component]
pub fn UnauthorizedPage() -> impl IntoView {
    view! {
        <div class="unauthorized-page">
            <h1>"Not authorized"</h1>
            <p>"Your account does not have access to that page."</p>
            <p>"If you believe this is a mistake, contact an administrator."</p>
            <a href="/dashboard" class="link-button">"Back to dashboard"</a>
        </div>
    }
}
