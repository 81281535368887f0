//! Database repository for departments.

use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use stockroom_core::DepartmentId;

/// A department record.
#[derive(Debug, Clone)]
pub struct DepartmentRecord {
    pub id: DepartmentId,
    pub name: String,
}

/// Row type for department queries.
#[derive(FromRow)]
struct DepartmentRow {
    id: String,
    name: String,
}

impl DepartmentRow {
    fn try_into_record(self) -> Result<DepartmentRecord, sqlx::Error> {
        let id = DepartmentId::from_str(&self.id).map_err(|e| {
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid department id '{}': {}", self.id, e),
            )))
        })?;
        Ok(DepartmentRecord {
            id,
            name: self.name,
        })
    }
}

/// Repository for department operations.
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    /// Creates a new department repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists all departments, alphabetically.
    pub async fn list_all(&self) -> Result<Vec<DepartmentRecord>, sqlx::Error> {
        let rows: Vec<DepartmentRow> = sqlx::query_as(
            r#"
            SELECT id, name
            FROM departments
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DepartmentRow::try_into_record).collect()
    }
}
