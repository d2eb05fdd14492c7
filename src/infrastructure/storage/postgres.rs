//! PostgreSQL account and session store with connection pooling

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use crate::domain::{
    Account, AccountDraft, AccountId, AccountProfile, AccountRole, AccountStore, AuthStore,
    AuthTransaction, DomainError, Session, SessionId, SessionStore,
};

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/quora_auth".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }
}

/// PostgreSQL implementation of [`AuthStore`]
///
/// Every transaction maps onto a database transaction; the unique constraints
/// on username, email and token are enforced by the schema.
#[derive(Debug, Clone)]
pub struct PostgresAuthStore {
    pool: PgPool,
}

impl PostgresAuthStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new store with its own connection pool
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AuthStore for PostgresAuthStore {
    type Transaction = PostgresTransaction;

    async fn begin(&self) -> Result<PostgresTransaction, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        Ok(PostgresTransaction { tx })
    }
}

/// Open database transaction; rolled back when dropped without commit
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

impl std::fmt::Debug for PostgresTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresTransaction").finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthTransaction for PostgresTransaction {
    async fn commit(self) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transaction: {}", e)))
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to roll back transaction: {}", e)))
    }
}

const ACCOUNT_COLUMNS: &str = r#"
    id, username, email, password_hash, salt, role,
    first_name, last_name, country, about_me, date_of_birth, contact_number,
    created_at, updated_at, last_sign_in_at
"#;

impl PostgresTransaction {
    async fn find_account_where(
        &mut self,
        column: &str,
        value: AccountLookup<'_>,
    ) -> Result<Option<Account>, DomainError> {
        let query = format!("SELECT {} FROM accounts WHERE {} = $1", ACCOUNT_COLUMNS, column);
        let query = sqlx::query(&query);
        let query = match value {
            AccountLookup::Id(id) => query.bind(*id.as_uuid()),
            AccountLookup::Text(text) => query.bind(text),
        };

        let row = query
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get account: {}", e)))?;

        row.as_ref().map(row_to_account).transpose()
    }
}

enum AccountLookup<'a> {
    Id(&'a AccountId),
    Text(&'a str),
}

#[async_trait]
impl AccountStore for PostgresTransaction {
    async fn find_account_by_id(&mut self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        self.find_account_where("id", AccountLookup::Id(id)).await
    }

    async fn find_account_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<Account>, DomainError> {
        self.find_account_where("username", AccountLookup::Text(username))
            .await
    }

    async fn find_account_by_email(&mut self, email: &str) -> Result<Option<Account>, DomainError> {
        self.find_account_where("email", AccountLookup::Text(email))
            .await
    }

    async fn insert_account(&mut self, account: Account) -> Result<Account, DomainError> {
        let profile = account.profile();

        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, email, password_hash, salt, role,
                                  first_name, last_name, country, about_me, date_of_birth,
                                  contact_number, created_at, updated_at, last_sign_in_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(*account.id().as_uuid())
        .bind(account.username())
        .bind(account.email())
        .bind(account.password_hash())
        .bind(account.salt())
        .bind(account.role().as_str())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.country)
        .bind(&profile.about_me)
        .bind(&profile.date_of_birth)
        .bind(&profile.contact_number)
        .bind(account.created_at())
        .bind(account.updated_at())
        .bind(account.last_sign_in_at())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to create account"))?;

        Ok(account)
    }

    async fn update_account(&mut self, account: &Account) -> Result<Account, DomainError> {
        let profile = account.profile();

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET username = $2, email = $3, password_hash = $4, salt = $5, role = $6,
                first_name = $7, last_name = $8, country = $9, about_me = $10,
                date_of_birth = $11, contact_number = $12, updated_at = $13,
                last_sign_in_at = $14
            WHERE id = $1
            "#,
        )
        .bind(*account.id().as_uuid())
        .bind(account.username())
        .bind(account.email())
        .bind(account.password_hash())
        .bind(account.salt())
        .bind(account.role().as_str())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.country)
        .bind(&profile.about_me)
        .bind(&profile.date_of_birth)
        .bind(&profile.contact_number)
        .bind(account.updated_at())
        .bind(account.last_sign_in_at())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to update account"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Account '{}' not found",
                account.id()
            )));
        }

        Ok(account.clone())
    }

    async fn delete_account(&mut self, id: &AccountId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete account: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SessionStore for PostgresTransaction {
    async fn find_session_by_token(&mut self, token: &str) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, token, issued_at, expires_at, logged_out_at
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get session: {}", e)))?;

        Ok(row.as_ref().map(row_to_session))
    }

    async fn insert_session(&mut self, session: Session) -> Result<Session, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, account_id, token, issued_at, expires_at, logged_out_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*session.id().as_uuid())
        .bind(*session.account_id().as_uuid())
        .bind(session.token())
        .bind(session.issued_at())
        .bind(session.expires_at())
        .bind(session.logged_out_at())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to create session"))?;

        Ok(session)
    }

    async fn update_session(&mut self, session: &Session) -> Result<Session, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET expires_at = $2, logged_out_at = $3
            WHERE token = $1
            "#,
        )
        .bind(session.token())
        .bind(session.expires_at())
        .bind(session.logged_out_at())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update session: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Session '{}' not found",
                session.id()
            )));
        }

        Ok(session.clone())
    }

    async fn delete_sessions_for_account(
        &mut self,
        account_id: &AccountId,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE account_id = $1")
            .bind(*account_id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete sessions: {}", e)))?;

        Ok(result.rows_affected())
    }
}

/// Translate unique-constraint violations into [`DomainError::Duplicate`]
fn map_write_error(err: sqlx::Error, context: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = db_err
                .constraint()
                .map(constraint_field)
                .unwrap_or("unknown");

            return DomainError::duplicate(field, format!("{}: {}", context, db_err.message()));
        }
    }

    DomainError::storage(format!("{}: {}", context, err))
}

fn constraint_field(constraint: &str) -> &'static str {
    match constraint {
        "accounts_username_key" => "username",
        "accounts_email_key" => "email",
        "accounts_pkey" => "id",
        "sessions_token_key" => "token",
        "sessions_pkey" => "session_id",
        _ => "unknown",
    }
}

fn row_to_account(row: &PgRow) -> Result<Account, DomainError> {
    let id: Uuid = row.get("id");
    let role: String = row.get("role");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let role = AccountRole::parse(&role)
        .ok_or_else(|| DomainError::storage(format!("Invalid role in database: '{}'", role)))?;

    let profile = AccountProfile {
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        country: row.get("country"),
        about_me: row.get("about_me"),
        date_of_birth: row.get("date_of_birth"),
        contact_number: row.get("contact_number"),
    };

    let account = Account::register(
        AccountDraft::new().with_profile(profile).with_role(role),
        row.get::<String, _>("username"),
        row.get::<String, _>("email"),
        row.get::<String, _>("salt"),
        row.get::<String, _>("password_hash"),
        created_at,
    )
    .with_id(AccountId::from_uuid(id))
    .with_timestamps(created_at, updated_at)
    .with_last_sign_in_at(row.get("last_sign_in_at"));

    Ok(account)
}

fn row_to_session(row: &PgRow) -> Session {
    let id: Uuid = row.get("id");
    let account_id: Uuid = row.get("account_id");
    let token: String = row.get("token");
    let issued_at: DateTime<Utc> = row.get("issued_at");
    let expires_at: DateTime<Utc> = row.get("expires_at");
    let logged_out_at: Option<DateTime<Utc>> = row.get("logged_out_at");

    Session::new(
        SessionId::from_uuid(id),
        AccountId::from_uuid(account_id),
        token,
        issued_at,
        expires_at,
    )
    .with_logged_out_at(logged_out_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_config_builder() {
        let config = PostgresConfig::new("postgres://db/auth")
            .with_max_connections(20)
            .with_min_connections(2)
            .with_connect_timeout(5)
            .with_idle_timeout(60);

        assert_eq!(config.url, "postgres://db/auth");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.idle_timeout_secs, 60);
    }

    #[test]
    fn test_constraint_field_mapping() {
        assert_eq!(constraint_field("accounts_username_key"), "username");
        assert_eq!(constraint_field("accounts_email_key"), "email");
        assert_eq!(constraint_field("sessions_token_key"), "token");
        assert_eq!(constraint_field("something_else"), "unknown");
    }

    #[test]
    fn test_account_columns_include_last_sign_in() {
        assert!(ACCOUNT_COLUMNS.contains("last_sign_in_at"));
    }

    #[test]
    fn test_non_database_error_maps_to_storage() {
        let err = map_write_error(sqlx::Error::RowNotFound, "Failed to create account");
        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(err.to_string().contains("Failed to create account"));
    }
}
