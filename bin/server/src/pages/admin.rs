//! Admin page component and server functions.

use leptos::prelude::*;
use leptos::task::spawn_local;
use stockroom_platform_access::Role;

use crate::app::Protected;
use crate::types::AdminUserInfo;

/// Server function to list all users (admin only).
#[server]
pub async fn list_users() -> Result<Vec<AdminUserInfo>, ServerFnError> {
    use crate::auth::db::UserRepository;
    use crate::error::UserAdminError;
    use crate::server_helpers::{get_admin_session, get_db_pool};

    let auth = get_admin_session().await.map_err(|e| {
        tracing::debug!(error = %e, "Authentication failed for list_users");
        e.into_server_error()
    })?;

    let user_repo = UserRepository::new(get_db_pool());
    let users = user_repo.list_all().await.map_err(|e| {
        tracing::error!(error = %e, user_id = %auth.user_id, "Failed to list users");
        UserAdminError::DatabaseError {
            details: e.to_string(),
        }
        .into_server_error()
    })?;

    Ok(users
        .into_iter()
        .map(|u| AdminUserInfo {
            id: u.id().to_string(),
            display_name: u.display_name().map(|s| s.to_string()),
            email: u.email().map(|s| s.to_string()),
            role: u.role(),
            active: u.is_active(),
            created_at: u.created_at().to_rfc3339(),
        })
        .collect())
}

/// Server function to change a user's role (admin only).
///
/// Takes effect on the target's next sign-in; their current session keeps
/// its role snapshot until it expires.
#[server]
pub async fn set_user_role(id: String, role: String) -> Result<(), ServerFnError> {
    use crate::auth::db::UserRepository;
    use crate::error::UserAdminError;
    use crate::server_helpers::{get_admin_session, get_db_pool};
    use std::str::FromStr;
    use stockroom_core::UserId;

    let auth = get_admin_session()
        .await
        .map_err(|e| e.into_server_error())?;

    let user_id = UserId::from_str(&id).map_err(|e| {
        UserAdminError::InvalidId {
            id: id.clone(),
            reason: e.to_string(),
        }
        .into_server_error()
    })?;

    let role = Role::from_str(&role)
        .map_err(|_| UserAdminError::InvalidRole { role }.into_server_error())?;

    let user_repo = UserRepository::new(get_db_pool());
    let affected = user_repo.set_role(user_id, role).await.map_err(|e| {
        tracing::error!(error = %e, target = %id, "Failed to set user role");
        UserAdminError::DatabaseError {
            details: e.to_string(),
        }
        .into_server_error()
    })?;

    if affected == 0 {
        return Err(UserAdminError::NotFound { id }.into_server_error());
    }

    tracing::info!(target = %id, role = %role, admin = %auth.user_id, "user role changed");
    Ok(())
}

/// Server function to activate or deactivate a user (admin only).
///
/// Deactivation refuses the next sign-in; the short session duration bounds
/// how long an existing session survives it.
#[server]
pub async fn set_user_active(id: String, active: bool) -> Result<(), ServerFnError> {
    use crate::auth::db::{SessionRepository, UserRepository};
    use crate::error::UserAdminError;
    use crate::server_helpers::{get_admin_session, get_db_pool};
    use std::str::FromStr;
    use stockroom_core::UserId;

    let auth = get_admin_session()
        .await
        .map_err(|e| e.into_server_error())?;

    let user_id = UserId::from_str(&id).map_err(|e| {
        UserAdminError::InvalidId {
            id: id.clone(),
            reason: e.to_string(),
        }
        .into_server_error()
    })?;

    let user_repo = UserRepository::new(get_db_pool());
    let affected = user_repo.set_active(user_id, active).await.map_err(|e| {
        tracing::error!(error = %e, target = %id, "Failed to set user active flag");
        UserAdminError::DatabaseError {
            details: e.to_string(),
        }
        .into_server_error()
    })?;

    if affected == 0 {
        return Err(UserAdminError::NotFound { id }.into_server_error());
    }

    // Deactivation also drops the user's live sessions immediately.
    if !active {
        let session_repo = SessionRepository::new(get_db_pool());
        if let Err(e) = session_repo.delete_all_for_user(user_id).await {
            tracing::warn!(error = %e, target = %id, "Failed to drop sessions for deactivated user");
        }
    }

    tracing::info!(target = %id, active, admin = %auth.user_id, "user active flag changed");
    Ok(())
}

/// Admin page: user and role management.
#[component]
pub fn AdminPage() -> impl IntoView {
    let users = Resource::new(|| (), |_| list_users());

    view! {
        <div class="admin-page">
            <Protected min_role=Role::Admin>
                <h1>"Admin"</h1>
                <p>"Manage user roles and account access."</p>
                <Suspense fallback=move || view! { <p>"Loading users..."</p> }>
                    {move || {
                        users.get().map(|result| {
                            match result {
                                Ok(items) if items.is_empty() => view! {
                                    <p class="empty-state">"No users have signed in yet."</p>
                                }.into_any(),
                                Ok(items) => view! {
                                    <table class="users-table">
                                        <thead>
                                            <tr>
                                                <th>"User"</th>
                                                <th>"Email"</th>
                                                <th>"Role"</th>
                                                <th>"Status"</th>
                                                <th>"Actions"</th>
                                            </tr>
                                        </thead>
                                        <tbody>
                                            {items.into_iter().map(|user| {
                                                let role_id = user.id.clone();
                                                let active_id = user.id.clone();
                                                let next_active = !user.active;
                                                let name = user.display_name
                                                    .unwrap_or_else(|| "—".to_string());
                                                let email = user.email
                                                    .unwrap_or_else(|| "—".to_string());
                                                view! {
                                                    <tr>
                                                        <td>{name}</td>
                                                        <td>{email}</td>
                                                        <td>
                                                            <select on:change=move |ev| {
                                                                let id = role_id.clone();
                                                                let role = event_target_value(&ev);
                                                                spawn_local(async move {
                                                                    let _ = set_user_role(id, role).await;
                                                                    users.refetch();
                                                                });
                                                            }>
                                                                {Role::all().into_iter().map(|role| {
                                                                    let selected = role == user.role;
                                                                    view! {
                                                                        <option value=role.as_str() selected=selected>
                                                                            {role.as_str()}
                                                                        </option>
                                                                    }
                                                                }).collect_view()}
                                                            </select>
                                                        </td>
                                                        <td>{if user.active { "Active" } else { "Inactive" }}</td>
                                                        <td>
                                                            <button on:click=move |_| {
                                                                let id = active_id.clone();
                                                                spawn_local(async move {
                                                                    let _ = set_user_active(id, next_active).await;
                                                                    users.refetch();
                                                                });
                                                            }>
                                                                {if user.active { "Deactivate" } else { "Activate" }}
                                                            </button>
                                                        </td>
                                                    </tr>
                                                }
                                            }).collect_view()}
                                        </tbody>
                                    </table>
                                }.into_any(),
                                Err(_) => view! {
                                    <p class="error">"Failed to load users."</p>
                                }.into_any(),
                            }
                        })
                    }}
                </Suspense>
            </Protected>
        </div>
    }
}
