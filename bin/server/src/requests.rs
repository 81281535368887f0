//! Supply-request server functions.
//!
//! Every function authenticates through the shared session-resolution path;
//! write operations additionally check the caller's role. Validation reuses
//! the same pure functions the form runs client-side.

use leptos::prelude::*;

use crate::types::{
    DepartmentInfo, Paginated, RequestDetail, RequestStats, RequestSummary,
};
use crate::validate::RequestForm;

/// Fixed page size for request listings.
pub const PAGE_SIZE: u32 = 20;

/// Server function to list one page of supply requests, newest first.
#[server]
pub async fn list_requests(page: u32) -> Result<Paginated<RequestSummary>, ServerFnError> {
    use crate::db::SupplyRequestRepository;
    use crate::error::RequestError;
    use crate::server_helpers::{get_authenticated_session, get_db_pool};

    let auth = get_authenticated_session().await.map_err(|e| {
        tracing::debug!(error = %e, "Authentication failed for list_requests");
        e.into_server_error()
    })?;

    let page = page.max(1);
    let repo = SupplyRequestRepository::new(get_db_pool());
    let (items, total) = repo.list_page(page, PAGE_SIZE).await.map_err(|e| {
        tracing::error!(error = %e, user_id = %auth.user_id, page, "Failed to list supply requests");
        RequestError::DatabaseError {
            details: e.to_string(),
        }
        .into_server_error()
    })?;

    let items = items
        .into_iter()
        .map(|listed| RequestSummary {
            id: listed.record.id.to_string(),
            item_name: listed.record.item_name,
            quantity: listed.record.quantity,
            status: listed.record.status,
            requester_id: listed.record.requester_id.to_string(),
            requester_name: listed
                .requester_display_name
                .or(listed.requester_email)
                .unwrap_or_else(|| "User".to_string()),
            department_name: listed.department_name,
            created_at: listed.record.created_at.to_rfc3339(),
        })
        .collect();

    Ok(Paginated {
        items,
        page,
        per_page: PAGE_SIZE,
        total,
    })
}

/// Server function to fetch one request for the edit form.
#[server]
pub async fn get_request(id: String) -> Result<RequestDetail, ServerFnError> {
    use crate::db::SupplyRequestRepository;
    use crate::error::RequestError;
    use crate::server_helpers::{get_authenticated_session, get_db_pool};
    use std::str::FromStr;
    use stockroom_core::SupplyRequestId;

    get_authenticated_session()
        .await
        .map_err(|e| e.into_server_error())?;

    let request_id = SupplyRequestId::from_str(&id).map_err(|e| {
        RequestError::InvalidId {
            id: id.clone(),
            reason: e.to_string(),
        }
        .into_server_error()
    })?;

    let repo = SupplyRequestRepository::new(get_db_pool());
    let record = repo
        .find_by_id(request_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, request_id = %id, "Failed to load supply request");
            RequestError::DatabaseError {
                details: e.to_string(),
            }
            .into_server_error()
        })?
        .ok_or_else(|| RequestError::NotFound { id }.into_server_error())?;

    Ok(RequestDetail {
        id: record.id.to_string(),
        item_name: record.item_name,
        description: record.description,
        quantity: record.quantity,
        department_id: record.department_id.map(|d| d.to_string()),
        status: record.status,
        requester_id: record.requester_id.to_string(),
        created_at: record.created_at.to_rfc3339(),
        updated_at: record.updated_at.to_rfc3339(),
    })
}

/// Server function to create a request. Requires employee access.
#[server]
pub async fn create_request(form: RequestForm) -> Result<String, ServerFnError> {
    use crate::db::{SupplyRequestRecord, SupplyRequestRepository};
    use crate::error::{RequestError, SessionError};
    use crate::server_helpers::{get_authenticated_session, get_db_pool};
    use crate::validate::validate_request_form;

    let auth = get_authenticated_session()
        .await
        .map_err(|e| e.into_server_error())?;

    if !auth.role.can_submit() {
        tracing::warn!(user_id = %auth.user_id, role = %auth.role, "Viewer attempted to create a request");
        return Err(SessionError::RoleRequired {
            required: "employee",
        }
        .into_server_error());
    }

    let input = validate_request_form(&form).map_err(|errors| {
        let details = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        RequestError::Validation { details }.into_server_error()
    })?;

    let record = SupplyRequestRecord::new(auth.user_id, input);
    let repo = SupplyRequestRepository::new(get_db_pool());
    repo.create(&record).await.map_err(|e| {
        tracing::error!(error = %e, user_id = %auth.user_id, "Failed to create supply request");
        RequestError::DatabaseError {
            details: e.to_string(),
        }
        .into_server_error()
    })?;

    tracing::info!(request_id = %record.id, user_id = %auth.user_id, "supply request created");
    Ok(record.id.to_string())
}

/// Server function to update a request's fields.
///
/// The requester may edit their own request while it is pending; managers
/// and admins may always edit.
#[server]
pub async fn update_request(id: String, form: RequestForm) -> Result<(), ServerFnError> {
    use crate::db::SupplyRequestRepository;
    use crate::error::RequestError;
    use crate::server_helpers::{get_authenticated_session, get_db_pool};
    use crate::validate::validate_request_form;
    use std::str::FromStr;
    use stockroom_core::SupplyRequestId;

    let auth = get_authenticated_session()
        .await
        .map_err(|e| e.into_server_error())?;

    let request_id = SupplyRequestId::from_str(&id).map_err(|e| {
        RequestError::InvalidId {
            id: id.clone(),
            reason: e.to_string(),
        }
        .into_server_error()
    })?;

    let repo = SupplyRequestRepository::new(get_db_pool());
    let mut record = repo
        .find_by_id(request_id)
        .await
        .map_err(|e| {
            RequestError::DatabaseError {
                details: e.to_string(),
            }
            .into_server_error()
        })?
        .ok_or_else(|| RequestError::NotFound { id: id.clone() }.into_server_error())?;

    let is_requester = record.requester_id == auth.user_id;
    if !auth.role.can_manage() {
        if !is_requester {
            return Err(RequestError::AccessDenied { id }.into_server_error());
        }
        if !record.is_editable() {
            return Err(RequestError::InvalidState {
                id,
                status: record.status.to_string(),
            }
            .into_server_error());
        }
    }

    let input = validate_request_form(&form).map_err(|errors| {
        let details = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        RequestError::Validation { details }.into_server_error()
    })?;

    record.apply(input);
    repo.update(&record).await.map_err(|e| {
        tracing::error!(error = %e, request_id = %record.id, "Failed to update supply request");
        RequestError::DatabaseError {
            details: e.to_string(),
        }
        .into_server_error()
    })?;

    Ok(())
}

/// Server function to move a request through its lifecycle.
/// Requires manager access.
#[server]
pub async fn set_request_status(id: String, status: String) -> Result<(), ServerFnError> {
    use crate::db::SupplyRequestRepository;
    use crate::error::RequestError;
    use crate::server_helpers::{get_db_pool, get_manager_session};
    use crate::types::RequestStatus;
    use std::str::FromStr;
    use stockroom_core::SupplyRequestId;

    let auth = get_manager_session()
        .await
        .map_err(|e| e.into_server_error())?;

    let request_id = SupplyRequestId::from_str(&id).map_err(|e| {
        RequestError::InvalidId {
            id: id.clone(),
            reason: e.to_string(),
        }
        .into_server_error()
    })?;

    let status = RequestStatus::from_str(&status)
        .map_err(|_| ServerFnError::new("Unknown request status"))?;

    let repo = SupplyRequestRepository::new(get_db_pool());
    let affected = repo.set_status(request_id, status).await.map_err(|e| {
        tracing::error!(error = %e, request_id = %id, "Failed to set request status");
        RequestError::DatabaseError {
            details: e.to_string(),
        }
        .into_server_error()
    })?;

    if affected == 0 {
        return Err(RequestError::NotFound { id }.into_server_error());
    }

    tracing::info!(request_id = %id, status = %status, user_id = %auth.user_id, "request status changed");
    Ok(())
}

/// Server function to delete a request.
///
/// The requester may withdraw their own pending request; managers and
/// admins may delete any request.
#[server]
pub async fn delete_request(id: String) -> Result<(), ServerFnError> {
    use crate::db::SupplyRequestRepository;
    use crate::error::RequestError;
    use crate::server_helpers::{get_authenticated_session, get_db_pool};
    use std::str::FromStr;
    use stockroom_core::SupplyRequestId;

    let auth = get_authenticated_session()
        .await
        .map_err(|e| e.into_server_error())?;

    let request_id = SupplyRequestId::from_str(&id).map_err(|e| {
        RequestError::InvalidId {
            id: id.clone(),
            reason: e.to_string(),
        }
        .into_server_error()
    })?;

    let repo = SupplyRequestRepository::new(get_db_pool());
    let record = repo
        .find_by_id(request_id)
        .await
        .map_err(|e| {
            RequestError::DatabaseError {
                details: e.to_string(),
            }
            .into_server_error()
        })?
        .ok_or_else(|| RequestError::NotFound { id: id.clone() }.into_server_error())?;

    let is_requester = record.requester_id == auth.user_id;
    if !auth.role.can_manage() && !(is_requester && record.is_editable()) {
        return Err(RequestError::AccessDenied { id }.into_server_error());
    }

    repo.delete(request_id).await.map_err(|e| {
        tracing::error!(error = %e, request_id = %id, "Failed to delete supply request");
        RequestError::DatabaseError {
            details: e.to_string(),
        }
        .into_server_error()
    })?;

    tracing::info!(request_id = %id, user_id = %auth.user_id, "supply request deleted");
    Ok(())
}

/// Server function returning request counts by status for the dashboard.
#[server(name = RequestStatsFn)]
pub async fn request_stats() -> Result<RequestStats, ServerFnError> {
    use crate::db::SupplyRequestRepository;
    use crate::error::RequestError;
    use crate::server_helpers::{get_authenticated_session, get_db_pool};

    get_authenticated_session()
        .await
        .map_err(|e| e.into_server_error())?;

    let repo = SupplyRequestRepository::new(get_db_pool());
    let counts = repo.count_by_status().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count supply requests");
        RequestError::DatabaseError {
            details: e.to_string(),
        }
        .into_server_error()
    })?;

    Ok(RequestStats {
        pending: counts.pending,
        approved: counts.approved,
        rejected: counts.rejected,
        fulfilled: counts.fulfilled,
    })
}

/// Server function to list departments for the request form.
#[server]
pub async fn list_departments() -> Result<Vec<DepartmentInfo>, ServerFnError> {
    use crate::db::DepartmentRepository;
    use crate::error::RequestError;
    use crate::server_helpers::{get_authenticated_session, get_db_pool};

    get_authenticated_session()
        .await
        .map_err(|e| e.into_server_error())?;

    let repo = DepartmentRepository::new(get_db_pool());
    let departments = repo.list_all().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list departments");
        RequestError::DatabaseError {
            details: e.to_string(),
        }
        .into_server_error()
    })?;

    Ok(departments
        .into_iter()
        .map(|d| DepartmentInfo {
            id: d.id.to_string(),
            name: d.name,
        })
        .collect())
}
