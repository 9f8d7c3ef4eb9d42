use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Transaction;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountName;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::NewAccount;
use crate::domain::account::models::PhoneNumber;
use crate::domain::account::models::RefreshTokenRecord;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::AccountTransaction;
use crate::domain::errors::DomainError;

const DATABASE: &str = "postgresql";
const EMAIL_CONSTRAINT: &str = "accounts_email_key";

const ACCOUNT_COLUMNS: &str = "id, name, email, phone, password_hash, refresh_token, \
     refresh_token_expires_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    password_hash: String,
    refresh_token: Option<String>,
    refresh_token_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let refresh_token = match (row.refresh_token, row.refresh_token_expires_at) {
            (Some(token), Some(expires_at)) => Some(RefreshTokenRecord { token, expires_at }),
            _ => None,
        };

        Ok(Account {
            id: AccountId(row.id),
            name: AccountName::new(row.name)?,
            email: EmailAddress::new(row.email)?,
            phone: PhoneNumber::new(row.phone)?,
            password_hash: row.password_hash,
            refresh_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_account(row: Option<AccountRow>) -> Result<Option<Account>, DomainError> {
    row.map(Account::try_from).transpose()
}

/// Translate a driver failure into the nearest domain error kind.
fn map_sqlx_error(error: sqlx::Error) -> DomainError {
    if let Some(db_error) = error.as_database_error() {
        if db_error.is_unique_violation() {
            return match db_error.constraint() {
                Some(EMAIL_CONSTRAINT) => DomainError::duplicate("email"),
                _ => DomainError::conflict("a unique value is already in use"),
            };
        }
    }

    let connection_failure = matches!(
        error,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    );

    if connection_failure {
        DomainError::database_connection(DATABASE, "database unavailable", error)
    } else {
        DomainError::internal("database operation failed", error)
    }
}

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub struct PostgresAccountTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    type Transaction = PostgresAccountTransaction;

    async fn begin(&self) -> Result<Self::Transaction, DomainError> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(PostgresAccountTransaction { tx })
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        into_account(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        into_account(row)
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::database_connection(DATABASE, "database ping failed", e))
    }
}

#[async_trait]
impl AccountTransaction for PostgresAccountTransaction {
    async fn find_by_id(&mut self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE id = $1 FOR UPDATE",
            ACCOUNT_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        into_account(row)
    }

    async fn find_by_refresh_token(
        &mut self,
        token: &str,
    ) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE refresh_token = $1 FOR UPDATE",
            ACCOUNT_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        into_account(row)
    }

    async fn create(&mut self, account: NewAccount) -> Result<Account, DomainError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO accounts (name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(account.name.as_str())
        .bind(account.email.as_str())
        .bind(account.phone.as_str())
        .bind(&account.password_hash)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Account::try_from(row)
    }

    async fn update(&mut self, account: &Account) -> Result<Account, DomainError> {
        let (refresh_token, refresh_token_expires_at) = match &account.refresh_token {
            Some(record) => (Some(record.token.as_str()), Some(record.expires_at)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE accounts
            SET name = $2, email = $3, phone = $4, password_hash = $5,
                refresh_token = $6, refresh_token_expires_at = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(account.id.0)
        .bind(account.name.as_str())
        .bind(account.email.as_str())
        .bind(account.phone.as_str())
        .bind(&account.password_hash)
        .bind(refresh_token)
        .bind(refresh_token_expires_at)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        into_account(row)?.ok_or_else(|| {
            DomainError::not_found(format!("account with ID {} not found", account.id))
        })
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failures_are_classified() {
        let err = map_sqlx_error(sqlx::Error::PoolTimedOut);
        assert_eq!(err.code(), "DATABASE_CONNECTION");

        let err = map_sqlx_error(sqlx::Error::Io(std::io::Error::from(
            std::io::ErrorKind::ConnectionRefused,
        )));
        assert!(matches!(
            err,
            DomainError::DatabaseConnection { ref database, .. } if database == "postgresql"
        ));
    }

    #[test]
    fn test_other_failures_are_internal() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), "INTERNAL_SERVER");
        assert_eq!(err.to_string(), "database operation failed");
    }

    #[test]
    fn test_row_conversion_pairs_refresh_columns() {
        let now = Utc::now();
        let row = AccountRow {
            id: 1,
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            phone: "555-0100".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            refresh_token: Some("token".to_string()),
            refresh_token_expires_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        let account = Account::try_from(row).expect("valid row");
        assert_eq!(
            account.refresh_token,
            Some(RefreshTokenRecord {
                token: "token".to_string(),
                expires_at: now,
            })
        );
    }
}
