//! Database repository for supply requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use stockroom_core::{DepartmentId, SupplyRequestId, UserId};

use crate::types::RequestStatus;
use crate::validate::ValidRequest;

fn decode_err(what: &str, value: &str, err: impl std::fmt::Display) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("invalid {what} '{value}': {err}"),
    )))
}

/// A supply request record from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyRequestRecord {
    /// Request ID.
    pub id: SupplyRequestId,
    /// Who filed the request.
    pub requester_id: UserId,
    /// What is being requested.
    pub item_name: String,
    /// Optional free-form detail.
    pub description: Option<String>,
    /// How many.
    pub quantity: i32,
    /// Department the request is for, if any.
    pub department_id: Option<DepartmentId>,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// When created.
    pub created_at: DateTime<Utc>,
    /// When last updated.
    pub updated_at: DateTime<Utc>,
}

impl SupplyRequestRecord {
    /// Creates a new pending request from validated form input.
    #[must_use]
    pub fn new(requester_id: UserId, input: ValidRequest) -> Self {
        let now = Utc::now();
        Self {
            id: SupplyRequestId::new(),
            requester_id,
            item_name: input.item_name,
            description: input.description,
            quantity: input.quantity,
            department_id: input.department_id,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies validated form input to an existing request.
    pub fn apply(&mut self, input: ValidRequest) {
        self.item_name = input.item_name;
        self.description = input.description;
        self.quantity = input.quantity;
        self.department_id = input.department_id;
        self.updated_at = Utc::now();
    }

    /// Returns true while the requester may still edit or withdraw it.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// Row type for supply request queries.
#[derive(FromRow)]
struct SupplyRequestRow {
    id: String,
    requester_id: String,
    item_name: String,
    description: Option<String>,
    quantity: i32,
    department_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SupplyRequestRow {
    fn try_into_record(self) -> Result<SupplyRequestRecord, sqlx::Error> {
        let id = SupplyRequestId::from_str(&self.id)
            .map_err(|e| decode_err("request id", &self.id, e))?;
        let requester_id = UserId::from_str(&self.requester_id)
            .map_err(|e| decode_err("user id", &self.requester_id, e))?;
        let status = RequestStatus::from_str(&self.status)
            .map_err(|e| decode_err("status", &self.status, e))?;
        let department_id = self
            .department_id
            .as_deref()
            .map(|raw| DepartmentId::from_str(raw).map_err(|e| decode_err("department id", raw, e)))
            .transpose()?;

        Ok(SupplyRequestRecord {
            id,
            requester_id,
            item_name: self.item_name,
            description: self.description,
            quantity: self.quantity,
            department_id,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row type for the list view, joined with requester and department names.
#[derive(FromRow)]
struct ListedRequestRow {
    id: String,
    requester_id: String,
    item_name: String,
    description: Option<String>,
    quantity: i32,
    department_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    requester_display_name: Option<String>,
    requester_email: Option<String>,
    department_name: Option<String>,
}

/// A request joined with the display fields the list view needs.
#[derive(Debug, Clone)]
pub struct ListedRequest {
    pub record: SupplyRequestRecord,
    pub requester_display_name: Option<String>,
    pub requester_email: Option<String>,
    pub department_name: Option<String>,
}

impl ListedRequestRow {
    fn try_into_listed(self) -> Result<ListedRequest, sqlx::Error> {
        let record = SupplyRequestRow {
            id: self.id,
            requester_id: self.requester_id,
            item_name: self.item_name,
            description: self.description,
            quantity: self.quantity,
            department_id: self.department_id,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_record()?;

        Ok(ListedRequest {
            record,
            requester_display_name: self.requester_display_name,
            requester_email: self.requester_email,
            department_name: self.department_name,
        })
    }
}

/// Counts of requests by status.
#[derive(FromRow, Debug, Default)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub fulfilled: i64,
}

/// Repository for supply request operations.
pub struct SupplyRequestRepository {
    pool: PgPool,
}

impl SupplyRequestRepository {
    /// Creates a new supply request repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists one page of requests, newest first, with the total count.
    pub async fn list_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<ListedRequest>, i64), sqlx::Error> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);

        let rows: Vec<ListedRequestRow> = sqlx::query_as(
            r#"
            SELECT r.id, r.requester_id, r.item_name, r.description, r.quantity,
                   r.department_id, r.status, r.created_at, r.updated_at,
                   u.display_name AS requester_display_name,
                   u.email AS requester_email,
                   d.name AS department_name
            FROM supply_requests r
            JOIN users u ON u.id = r.requester_id
            LEFT JOIN departments d ON d.id = r.department_id
            ORDER BY r.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(ListedRequestRow::try_into_listed)
            .collect::<Result<Vec<_>, _>>()?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM supply_requests")
            .fetch_one(&self.pool)
            .await?;

        Ok((items, total))
    }

    /// Finds a request by ID.
    pub async fn find_by_id(
        &self,
        id: SupplyRequestId,
    ) -> Result<Option<SupplyRequestRecord>, sqlx::Error> {
        let row: Option<SupplyRequestRow> = sqlx::query_as(
            r#"
            SELECT id, requester_id, item_name, description, quantity,
                   department_id, status, created_at, updated_at
            FROM supply_requests
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SupplyRequestRow::try_into_record).transpose()
    }

    /// Creates a new request.
    pub async fn create(&self, record: &SupplyRequestRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO supply_requests
                (id, requester_id, item_name, description, quantity,
                 department_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.requester_id.to_string())
        .bind(&record.item_name)
        .bind(record.description.as_deref())
        .bind(record.quantity)
        .bind(record.department_id.map(|d| d.to_string()))
        .bind(record.status.as_str())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a request's editable fields.
    pub async fn update(&self, record: &SupplyRequestRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE supply_requests
            SET item_name = $2, description = $3, quantity = $4,
                department_id = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.item_name)
        .bind(record.description.as_deref())
        .bind(record.quantity)
        .bind(record.department_id.map(|d| d.to_string()))
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Sets a request's status.
    pub async fn set_status(
        &self,
        id: SupplyRequestId,
        status: RequestStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE supply_requests
            SET status = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a request.
    pub async fn delete(&self, id: SupplyRequestId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM supply_requests
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Counts requests by status for the dashboard.
    pub async fn count_by_status(&self) -> Result<StatusCounts, sqlx::Error> {
        let counts: StatusCounts = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = 'pending')   AS pending,
                   COUNT(*) FILTER (WHERE status = 'approved')  AS approved,
                   COUNT(*) FILTER (WHERE status = 'rejected')  AS rejected,
                   COUNT(*) FILTER (WHERE status = 'fulfilled') AS fulfilled
            FROM supply_requests
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{RequestForm, validate_request_form};

    fn valid_input() -> ValidRequest {
        validate_request_form(&RequestForm {
            item_name: "Label printer".to_string(),
            description: "For the shipping desk".to_string(),
            quantity: "2".to_string(),
            department_id: String::new(),
        })
        .expect("valid form")
    }

    #[test]
    fn new_record_starts_pending() {
        let requester = UserId::new();
        let record = SupplyRequestRecord::new(requester, valid_input());

        assert!(record.id.to_string().starts_with("req_"));
        assert_eq!(record.requester_id, requester);
        assert_eq!(record.status, RequestStatus::Pending);
        assert!(record.is_editable());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn apply_overwrites_fields_and_bumps_updated_at() {
        let mut record = SupplyRequestRecord::new(UserId::new(), valid_input());
        let original_updated_at = record.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(1));
        let edited = validate_request_form(&RequestForm {
            item_name: "Label printer, wide format".to_string(),
            description: String::new(),
            quantity: "1".to_string(),
            department_id: String::new(),
        })
        .expect("valid form");
        record.apply(edited);

        assert_eq!(record.item_name, "Label printer, wide format");
        assert!(record.description.is_none());
        assert_eq!(record.quantity, 1);
        assert!(record.updated_at > original_updated_at);
    }

    #[test]
    fn only_pending_requests_are_editable() {
        let mut record = SupplyRequestRecord::new(UserId::new(), valid_input());
        for status in [
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Fulfilled,
        ] {
            record.status = status;
            assert!(!record.is_editable(), "{status}");
        }
    }
}
