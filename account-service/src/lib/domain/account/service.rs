use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::TokenKind;
use chrono::Utc;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountName;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::NewAccount;
use crate::domain::account::models::Password;
use crate::domain::account::models::PhoneNumber;
use crate::domain::account::models::RefreshTokenRecord;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::Session;
use crate::domain::account::models::UpdateAccountCommand;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::ports::AccountTransaction;
use crate::domain::errors::DomainError;
use crate::logging::AccountLogRegistry;

fn invalid_credentials() -> DomainError {
    DomainError::unauthorized("invalid email or password")
}

fn invalid_refresh_token() -> DomainError {
    DomainError::unauthorized("invalid token")
}

fn account_not_found(id: &AccountId) -> DomainError {
    DomainError::not_found(format!("account with ID {} not found", id))
}

/// Domain service implementation for account operations.
///
/// Composes the account store, password hashing and token issuance. Every
/// operation runs under the configured deadline; when it elapses the
/// in-flight work is dropped, which rolls back any open transaction.
pub struct AccountService<R>
where
    R: AccountRepository,
{
    repository: Arc<R>,
    authenticator: Arc<Authenticator>,
    loggers: Arc<AccountLogRegistry>,
    operation_timeout: Option<Duration>,
}

impl<R> AccountService<R>
where
    R: AccountRepository,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    /// * `loggers` - Per-account log sinks
    ///
    /// # Returns
    /// Configured account service instance without a deadline
    pub fn new(
        repository: Arc<R>,
        authenticator: Arc<Authenticator>,
        loggers: Arc<AccountLogRegistry>,
    ) -> Self {
        Self {
            repository,
            authenticator,
            loggers,
            operation_timeout: None,
        }
    }

    /// Bound every operation by `timeout`.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    async fn with_deadline<T, F>(&self, operation: &str, work: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match self.operation_timeout {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        operation,
                        timeout_ms = limit.as_millis() as u64,
                        "Operation timed out"
                    );
                    // Round up so sub-second deadlines never report zero
                    let seconds = limit.as_secs() + u64::from(limit.subsec_nanos() > 0);
                    Err(DomainError::timeout(operation, seconds))
                }
            },
            None => work.await,
        }
    }

    async fn hash_password(&self, password: Password) -> Result<String, DomainError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
            .await
            .map_err(|e| DomainError::internal("password hashing task failed", e))?
            .map_err(|e| DomainError::internal("password hashing failed", e))
    }

    async fn verify_password(
        &self,
        password: &str,
        stored_hash: Option<String>,
    ) -> Result<(), DomainError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();

        let outcome = tokio::task::spawn_blocking(move || {
            authenticator.verify_credentials(&password, stored_hash.as_deref())
        })
        .await
        .map_err(|e| DomainError::internal("credential verification task failed", e))?;

        match outcome {
            Ok(()) => Ok(()),
            Err(AuthenticationError::InvalidCredentials) => Err(invalid_credentials()),
            Err(e) => Err(DomainError::internal("credential verification failed", e)),
        }
    }

    /// Issue a fresh pair and store its refresh half, replacing any previous one.
    async fn rotate_tokens(
        &self,
        tx: &mut R::Transaction,
        mut account: Account,
    ) -> Result<Session, DomainError> {
        let tokens = self
            .authenticator
            .issue_tokens(account.id.0, account.email.as_str())
            .map_err(|e| DomainError::internal("token issuance failed", e))?;

        account.refresh_token = Some(RefreshTokenRecord {
            token: tokens.refresh_token.clone(),
            expires_at: tokens.refresh_expires_at,
        });

        let account = tx.update(&account).await.map_err(|e| {
            self.loggers
                .logger_for(account.id)
                .warn(&format!("failed to store refresh token: {}", e));
            e
        })?;

        Ok(Session { account, tokens })
    }

    async fn register_account(&self, command: RegisterCommand) -> Result<Account, DomainError> {
        let email = EmailAddress::new(command.email)?;
        let password = Password::new(command.password)?;
        let name = AccountName::new(command.name)?;
        let phone = PhoneNumber::new(command.phone)?;

        let password_hash = self.hash_password(password).await?;

        let mut tx = self.repository.begin().await?;
        let account = tx
            .create(NewAccount {
                name,
                email,
                phone,
                password_hash,
            })
            .await?;
        let session = self.rotate_tokens(&mut tx, account).await?;
        tx.commit().await?;

        let account = session.account;
        tracing::info!(account_id = %account.id, "Account registered");
        self.loggers.logger_for(account.id).info("account registered");

        Ok(account)
    }

    async fn login_account(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let existing = self.repository.find_by_email(email.trim()).await?;
        let stored_hash = existing.as_ref().map(|account| account.password_hash.clone());

        if let Err(e) = self.verify_password(password, stored_hash).await {
            if let Some(account) = &existing {
                self.loggers
                    .logger_for(account.id)
                    .warn("login rejected: wrong password");
            }
            return Err(e);
        }

        let Some(existing) = existing else {
            return Err(invalid_credentials());
        };

        let mut tx = self.repository.begin().await?;
        let account = tx
            .find_by_id(&existing.id)
            .await?
            .ok_or_else(invalid_credentials)?;
        let session = self.rotate_tokens(&mut tx, account).await?;
        tx.commit().await?;

        tracing::info!(account_id = %session.account.id, "Account logged in");
        self.loggers
            .logger_for(session.account.id)
            .info("login succeeded");

        Ok(session)
    }

    async fn rotate_session(&self, refresh_token: &str) -> Result<Session, DomainError> {
        let claims = self
            .authenticator
            .validate_token(refresh_token)
            .map_err(|_| invalid_refresh_token())?;

        if claims.kind != TokenKind::Refresh {
            return Err(DomainError::unauthorized("invalid token type"));
        }

        // The stored value is authoritative, not the subject in the token
        let mut tx = self.repository.begin().await?;
        let account = tx
            .find_by_refresh_token(refresh_token)
            .await?
            .ok_or_else(invalid_refresh_token)?;

        let expired = account
            .refresh_token
            .as_ref()
            .map_or(true, |record| record.is_expired_at(Utc::now()));
        if expired {
            self.loggers
                .logger_for(account.id)
                .warn("refresh rejected: stored token expired");
            return Err(invalid_refresh_token());
        }

        let session = self.rotate_tokens(&mut tx, account).await?;
        tx.commit().await?;

        tracing::info!(account_id = %session.account.id, "Refresh token rotated");
        self.loggers
            .logger_for(session.account.id)
            .info("refresh token rotated");

        Ok(session)
    }

    async fn modify_account(
        &self,
        id: &AccountId,
        command: UpdateAccountCommand,
    ) -> Result<Account, DomainError> {
        let name = command.name.map(AccountName::new).transpose()?;
        let email = command.email.map(EmailAddress::new).transpose()?;

        let mut tx = self.repository.begin().await?;
        let mut account = tx
            .find_by_id(id)
            .await?
            .ok_or_else(|| account_not_found(id))?;

        if let Some(name) = name {
            account.name = name;
        }
        if let Some(email) = email {
            account.email = email;
        }

        let account = tx.update(&account).await.map_err(|e| {
            self.loggers
                .logger_for(*id)
                .warn(&format!("account update failed: {}", e));
            e
        })?;
        tx.commit().await?;

        tracing::info!(account_id = %account.id, "Account updated");
        self.loggers.logger_for(account.id).info("account updated");

        Ok(account)
    }
}

#[async_trait]
impl<R> AccountServicePort for AccountService<R>
where
    R: AccountRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<Account, DomainError> {
        self.with_deadline("register", self.register_account(command))
            .await
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        self.with_deadline("login", self.login_account(email, password))
            .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, DomainError> {
        self.with_deadline("refresh_session", self.rotate_session(refresh_token))
            .await
    }

    async fn get_account(&self, id: &AccountId) -> Result<Account, DomainError> {
        self.with_deadline("get_account", async {
            self.repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| account_not_found(id))
        })
        .await
    }

    async fn update_account(
        &self,
        id: &AccountId,
        command: UpdateAccountCommand,
    ) -> Result<Account, DomainError> {
        self.with_deadline("update_account", self.modify_account(id, command))
            .await
    }

    async fn delete_account(&self, id: &AccountId) -> Result<(), DomainError> {
        self.with_deadline("delete_account", async {
            if !self.repository.delete(id).await? {
                return Err(account_not_found(id));
            }

            tracing::info!(account_id = %id, "Account deleted");
            self.loggers.logger_for(*id).info("account deleted");
            Ok(())
        })
        .await
    }

    async fn check_health(&self) -> Result<(), DomainError> {
        self.with_deadline("check_health", self.repository.ping())
            .await
    }
}
