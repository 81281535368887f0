//! Main Leptos application component and routing.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    components::{Redirect, Route, Router, Routes},
    path,
};
use stockroom_platform_access::Role;

use crate::auth_context::{provide_auth_context, use_auth};
use crate::pages::{
    AdminPage, DashboardPage, HomePage, LoginPage, RequestFormPage, RequestsPage,
    UnauthorizedPage,
};
use crate::types::UserInfo;

/// The main application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_auth_context();

    view! {
        <Title text="stockroom"/>
        <Router>
            <Header/>
            <main class="container">
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/auth/login") view=LoginPage/>
                    <Route path=path!("/dashboard") view=DashboardPage/>
                    <Route path=path!("/requests") view=RequestsPage/>
                    <Route path=path!("/requests/new") view=RequestFormPage/>
                    <Route path=path!("/requests/:id") view=RequestFormPage/>
                    <Route path=path!("/admin") view=AdminPage/>
                    <Route path=path!("/unauthorized") view=UnauthorizedPage/>
                </Routes>
            </main>
        </Router>
    }
}

/// Header component with navigation and user menu.
#[component]
fn Header() -> impl IntoView {
    let auth = use_auth();

    view! {
        <header class="header">
            <div class="header-left">
                <a href="/" class="logo">"stockroom"</a>
            </div>
            <div class="header-right">
                <Suspense fallback=move || view! { <span>"Loading..."</span> }>
                    {move || {
                        let snap = auth.snapshot();
                        match snap.user {
                            Some(user_info) => view! {
                                <nav class="header-nav">
                                    <a href="/dashboard">"Dashboard"</a>
                                    <a href="/requests">"Requests"</a>
                                </nav>
                                <UserMenu user_info=user_info/>
                            }.into_any(),
                            None => view! {
                                <a href="/auth/login" class="login-button">"Log in"</a>
                            }.into_any(),
                        }
                    }}
                </Suspense>
            </div>
        </header>
    }
}

/// User menu dropdown component.
#[component]
fn UserMenu(user_info: UserInfo) -> impl IntoView {
    let display_name = user_info.label();
    let is_admin = user_info.role.is_admin();

    view! {
        <div class="user-menu">
            <span class="user-name">{display_name}</span>
            <span class="user-role">{user_info.role.as_str()}</span>
            <div class="user-dropdown">
                {if is_admin {
                    view! { <a href="/admin">"Admin"</a> }.into_any()
                } else {
                    view! { <span></span> }.into_any()
                }}
                <a href="/auth/logout" rel="external">"Log out"</a>
            </div>
        </div>
    }
}

/// Client-side protected-route wrapper over the auth snapshot.
///
/// The edge middleware already gates unauthenticated requests; this layer
/// covers the role floor and in-app navigation. A role mismatch routes to
/// the unauthorized page.
#[component]
pub fn Protected(
    /// Minimum role required to see the children, if any.
    #[prop(optional, into)]
    min_role: Option<Role>,
    children: ChildrenFn,
) -> impl IntoView {
    let auth = use_auth();

    view! {
        <Suspense fallback=move || view! { <p class="loading">"Checking access..."</p> }>
            {move || {
                let snap = auth.snapshot();
                if let Some(message) = snap.error {
                    view! { <p class="error">{message}</p> }.into_any()
                } else if snap.is_loading {
                    view! { <p class="loading">"Checking access..."</p> }.into_any()
                } else if !snap.is_authenticated() {
                    view! {
                        <div class="auth-prompt">
                            <p>"Please log in to access this page."</p>
                            <a href="/auth/login" class="login-button">"Log in"</a>
                        </div>
                    }.into_any()
                } else if min_role.is_some_and(|required| !snap.has_at_least(required)) {
                    view! { <Redirect path="/unauthorized"/> }.into_any()
                } else {
                    children().into_any()
                }
            }}
        </Suspense>
    }
}
