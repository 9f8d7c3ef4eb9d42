use async_trait::async_trait;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::NewAccount;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::Session;
use crate::domain::account::models::UpdateAccountCommand;
use crate::domain::errors::DomainError;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// A token pair is issued and its refresh half persisted, but only the
    /// account is returned.
    ///
    /// # Arguments
    /// * `command` - Raw name, email, password and phone
    ///
    /// # Returns
    /// Created account entity
    ///
    /// # Errors
    /// * `Validation` - A field is empty or the password is shorter than 6 characters
    /// * `Duplicate` - Email is already registered
    /// * `Timeout` - Operation exceeded its deadline
    async fn register(&self, command: RegisterCommand) -> Result<Account, DomainError>;

    /// Authenticate with email and password and start a new session.
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown email or wrong password (indistinguishable)
    async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError>;

    /// Exchange a refresh token for a brand-new token pair.
    ///
    /// The presented token stops working as soon as this succeeds.
    ///
    /// # Errors
    /// * `Unauthorized` - Token invalid, of the wrong kind, rotated away or expired
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, DomainError>;

    /// Retrieve account by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn get_account(&self, id: &AccountId) -> Result<Account, DomainError>;

    /// Update mutable account fields.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Validation` - A provided field is invalid
    /// * `Duplicate` - New email is already registered
    async fn update_account(
        &self,
        id: &AccountId,
        command: UpdateAccountCommand,
    ) -> Result<Account, DomainError>;

    /// Delete an account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn delete_account(&self, id: &AccountId) -> Result<(), DomainError>;

    /// Check that the backing store is reachable.
    ///
    /// # Errors
    /// * `DatabaseConnection` - Store did not answer
    async fn check_health(&self) -> Result<(), DomainError>;
}

/// Persistence operations for the account aggregate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    type Transaction: AccountTransaction;

    /// Open a transaction. Dropping it without `commit` rolls back.
    ///
    /// # Errors
    /// * `DatabaseConnection` - No connection available
    async fn begin(&self) -> Result<Self::Transaction, DomainError>;

    /// Retrieve account by identifier.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    /// Retrieve account by email address.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Remove account from storage.
    ///
    /// # Returns
    /// False if no account had this identifier
    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError>;

    /// Round-trip to the store.
    ///
    /// # Errors
    /// * `DatabaseConnection` - Store did not answer
    async fn ping(&self) -> Result<(), DomainError>;
}

/// Unit of work against the account store.
///
/// Reads through a transaction lock the returned row until commit or drop,
/// so concurrent read-modify-write cycles on one account serialize.
#[async_trait]
pub trait AccountTransaction: Send {
    /// Retrieve and lock account by identifier.
    async fn find_by_id(&mut self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    /// Retrieve and lock the account whose stored refresh token equals `token`.
    async fn find_by_refresh_token(&mut self, token: &str)
        -> Result<Option<Account>, DomainError>;

    /// Persist a new account and return it with its assigned identifier.
    ///
    /// # Errors
    /// * `Duplicate` - Email is already registered
    async fn create(&mut self, account: NewAccount) -> Result<Account, DomainError>;

    /// Overwrite the mutable columns of an existing account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Duplicate` - New email is already registered
    async fn update(&mut self, account: &Account) -> Result<Account, DomainError>;

    /// Make all changes visible atomically.
    async fn commit(self) -> Result<(), DomainError>;
}
