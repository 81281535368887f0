//! Supply request list page.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::app::Protected;
use crate::auth_context::use_auth;
use crate::requests::{delete_request, list_requests, set_request_status};
use crate::types::RequestStatus;

/// Paginated request list with per-row lifecycle actions.
#[component]
pub fn RequestsPage() -> impl IntoView {
    let auth = use_auth();
    let (page, set_page) = signal(1u32);
    let requests = Resource::new(move || page.get(), list_requests);

    view! {
        <div class="requests-page">
            <Protected>
                <div class="requests-header">
                    <h1>"Supply Requests"</h1>
                    {move || {
                        auth.snapshot().can_submit().then(|| view! {
                            <a href="/requests/new" class="cta-button">"New request"</a>
                        })
                    }}
                </div>
                <Suspense fallback=move || view! { <p>"Loading requests..."</p> }>
                    {move || {
                        requests.get().map(|result| {
                            match result {
                                Ok(listing) if listing.items.is_empty() => view! {
                                    <p class="empty-state">"No supply requests yet."</p>
                                }.into_any(),
                                Ok(listing) => {
                                    let snap = auth.snapshot();
                                    let can_manage = snap.can_manage();
                                    let current_user_id = snap.user.map(|u| u.id);
                                    let total_pages = listing.total_pages();
                                    let has_prev = listing.has_prev();
                                    let has_next = listing.has_next();
                                    let current = listing.page;
                                    view! {
                                        <table class="requests-table">
                                            <thead>
                                                <tr>
                                                    <th>"Item"</th>
                                                    <th>"Qty"</th>
                                                    <th>"Requested by"</th>
                                                    <th>"Department"</th>
                                                    <th>"Status"</th>
                                                    <th>"Actions"</th>
                                                </tr>
                                            </thead>
                                            <tbody>
                                                {listing.items.into_iter().map(|req| {
                                                    let is_requester = current_user_id
                                                        .as_deref()
                                                        .is_some_and(|uid| uid == req.requester_id);
                                                    let can_delete = can_manage
                                                        || (is_requester && req.status == RequestStatus::Pending);
                                                    let edit_href = format!("/requests/{}", req.id);
                                                    let approve_id = req.id.clone();
                                                    let reject_id = req.id.clone();
                                                    let fulfill_id = req.id.clone();
                                                    let delete_id = req.id.clone();
                                                    view! {
                                                        <tr>
                                                            <td><a href=edit_href>{req.item_name}</a></td>
                                                            <td>{req.quantity}</td>
                                                            <td>{req.requester_name}</td>
                                                            <td>{req.department_name.unwrap_or_else(|| "—".to_string())}</td>
                                                            <td>
                                                                <span class=format!("status-badge status-{}", req.status)>
                                                                    {req.status.label()}
                                                                </span>
                                                            </td>
                                                            <td class="request-actions">
                                                                {can_manage.then(|| view! {
                                                                    <button on:click=move |_| {
                                                                        let id = approve_id.clone();
                                                                        spawn_local(async move {
                                                                            let _ = set_request_status(id, "approved".to_string()).await;
                                                                            requests.refetch();
                                                                        });
                                                                    }>"Approve"</button>
                                                                    <button on:click=move |_| {
                                                                        let id = reject_id.clone();
                                                                        spawn_local(async move {
                                                                            let _ = set_request_status(id, "rejected".to_string()).await;
                                                                            requests.refetch();
                                                                        });
                                                                    }>"Reject"</button>
                                                                    <button on:click=move |_| {
                                                                        let id = fulfill_id.clone();
                                                                        spawn_local(async move {
                                                                            let _ = set_request_status(id, "fulfilled".to_string()).await;
                                                                            requests.refetch();
                                                                        });
                                                                    }>"Fulfill"</button>
                                                                })}
                                                                {can_delete.then(|| view! {
                                                                    <button class="danger" on:click=move |_| {
                                                                        let id = delete_id.clone();
                                                                        spawn_local(async move {
                                                                            let _ = delete_request(id).await;
                                                                            requests.refetch();
                                                                        });
                                                                    }>"Delete"</button>
                                                                })}
                                                            </td>
                                                        </tr>
                                                    }
                                                }).collect_view()}
                                            </tbody>
                                        </table>
                                        <div class="pagination">
                                            <button
                                                disabled=!has_prev
                                                on:click=move |_| set_page.update(|p| *p = p.saturating_sub(1).max(1))
                                            >"Previous"</button>
                                            <span class="pagination-label">
                                                {format!("Page {} of {}", current, total_pages)}
                                            </span>
                                            <button
                                                disabled=!has_next
                                                on:click=move |_| set_page.update(|p| *p += 1)
                                            >"Next"</button>
                                        </div>
                                    }.into_any()
                                }
                                Err(_) => view! {
                                    <p class="error">"Failed to load supply requests."</p>
                                }.into_any(),
                            }
                        })
                    }}
                </Suspense>
            </Protected>
        </div>
    }
}
