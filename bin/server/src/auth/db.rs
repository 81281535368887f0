//! Database repositories for users, sessions, and profile sync.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use stockroom_core::UserId;
use stockroom_platform_access::{ProfileDetails, Role, Session, SessionId, User};

fn decode_err(what: &str, value: &str, err: impl std::fmt::Display) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("invalid {what} '{value}': {err}"),
    )))
}

/// Row type for user queries.
#[derive(FromRow)]
struct UserRow {
    id: String,
    subject: String,
    issuer: String,
    email: Option<String>,
    display_name: Option<String>,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, sqlx::Error> {
        let id = UserId::from_str(&self.id).map_err(|e| decode_err("user id", &self.id, e))?;
        let role = Role::from_str(&self.role).map_err(|e| decode_err("role", &self.role, e))?;
        Ok(User::with_all_fields(
            id,
            self.subject,
            self.issuer,
            self.email,
            self.display_name,
            role,
            self.active,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// Row type for session queries.
#[derive(FromRow)]
struct SessionRow {
    id: String,
    user_id: String,
    role: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl SessionRow {
    fn try_into_session(self) -> Result<Session, sqlx::Error> {
        let user_id =
            UserId::from_str(&self.user_id).map_err(|e| decode_err("user id", &self.user_id, e))?;
        let role = Role::from_str(&self.role).map_err(|e| decode_err("role", &self.role, e))?;

        let session =
            if let (Some(access_token), refresh_token) = (self.access_token, self.refresh_token) {
                Session::with_tokens(
                    SessionId::new(self.id),
                    user_id,
                    role,
                    self.expires_at - self.created_at,
                    access_token,
                    refresh_token,
                )
            } else {
                Session::new(
                    SessionId::new(self.id),
                    user_id,
                    role,
                    self.expires_at - self.created_at,
                )
            };
        Ok(session)
    }
}

/// Repository for user operations.
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a user by their OIDC subject and issuer.
    pub async fn find_by_subject_issuer(
        &self,
        subject: &str,
        issuer: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, subject, issuer, email, display_name, role, active, created_at, updated_at
            FROM users
            WHERE subject = $1 AND issuer = $2
            "#,
        )
        .bind(subject)
        .bind(issuer)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::try_into_user).transpose()
    }

    /// Finds a user by their internal ID.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, subject, issuer, email, display_name, role, active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::try_into_user).transpose()
    }

    /// Lists all users, newest first, for the admin page.
    pub async fn list_all(&self) -> Result<Vec<User>, sqlx::Error> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, subject, issuer, email, display_name, role, active, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRow::try_into_user).collect()
    }

    /// Creates a new user.
    pub async fn create(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (id, subject, issuer, email, display_name, role, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id().to_string())
        .bind(user.subject())
        .bind(user.issuer())
        .bind(user.email())
        .bind(user.display_name())
        .bind(user.role().as_str())
        .bind(user.is_active())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing user's claim-derived fields.
    pub async fn update(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET email = $2, display_name = $3, role = $4, active = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id().to_string())
        .bind(user.email())
        .bind(user.display_name())
        .bind(user.role().as_str())
        .bind(user.is_active())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Sets a user's role (admin operation).
    pub async fn set_role(&self, id: UserId, role: Role) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .bind(role.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Sets a user's active flag (admin operation).
    pub async fn set_active(&self, id: UserId, active: bool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET active = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .bind(active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Repository for session operations.
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Creates a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a session by ID.
    pub async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, sqlx::Error> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, role, created_at, expires_at, access_token, refresh_token
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionRow::try_into_session).transpose()
    }

    /// Creates a new session.
    pub async fn create(&self, session: &Session) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, role, created_at, expires_at, access_token, refresh_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.id().as_str())
        .bind(session.user_id().to_string())
        .bind(session.role().as_str())
        .bind(session.created_at())
        .bind(session.expires_at())
        .bind(session.access_token())
        .bind(session.refresh_token())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a session by ID (logout).
    pub async fn delete(&self, id: &SessionId) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes all sessions for a user.
    pub async fn delete_all_for_user(&self, user_id: UserId) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes expired sessions.
    pub async fn delete_expired(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Repository for the best-effort profile-detail mirror.
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Creates a new profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent upsert keyed by user id.
    ///
    /// Identical inputs converge to the same stored row no matter how many
    /// times the sync runs; the callback invokes this once per successful
    /// sign-in and only logs on failure.
    pub async fn sync(&self, user_id: UserId, details: &ProfileDetails) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, phone, employee_code, department_id, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET phone = EXCLUDED.phone,
                employee_code = EXCLUDED.employee_code,
                department_id = EXCLUDED.department_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id.to_string())
        .bind(details.phone.as_deref())
        .bind(details.employee_code.as_deref())
        .bind(details.department_id.map(|id| id.to_string()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Generates a unique session ID using ULID.
pub fn generate_session_id() -> SessionId {
    SessionId::new(ulid::Ulid::new().to_string())
}
