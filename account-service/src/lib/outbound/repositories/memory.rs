use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::sync::OwnedMutexGuard;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::NewAccount;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::AccountTransaction;
use crate::domain::errors::DomainError;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    accounts: BTreeMap<AccountId, Account>,
    last_id: i64,
}

impl MemoryState {
    fn email_taken(&self, email: &str, except: Option<AccountId>) -> bool {
        self.accounts
            .values()
            .any(|account| account.email.as_str() == email && Some(account.id) != except)
    }
}

/// Account store kept in process memory.
///
/// A transaction holds the store lock until it is committed or dropped and
/// works on a staged copy, so uncommitted changes are never observed and a
/// dropped transaction leaves no trace.
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct InMemoryAccountTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    type Transaction = InMemoryAccountTransaction;

    async fn begin(&self) -> Result<Self::Transaction, DomainError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(InMemoryAccountTransaction { guard, staged })
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        Ok(self.state.lock().await.accounts.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .accounts
            .values()
            .find(|account| account.email.as_str() == email)
            .cloned())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError> {
        Ok(self.state.lock().await.accounts.remove(id).is_some())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[async_trait]
impl AccountTransaction for InMemoryAccountTransaction {
    async fn find_by_id(&mut self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        Ok(self.staged.accounts.get(id).cloned())
    }

    async fn find_by_refresh_token(
        &mut self,
        token: &str,
    ) -> Result<Option<Account>, DomainError> {
        Ok(self
            .staged
            .accounts
            .values()
            .find(|account| {
                account
                    .refresh_token
                    .as_ref()
                    .is_some_and(|record| record.token == token)
            })
            .cloned())
    }

    async fn create(&mut self, account: NewAccount) -> Result<Account, DomainError> {
        if self.staged.email_taken(account.email.as_str(), None) {
            return Err(DomainError::duplicate("email"));
        }

        self.staged.last_id += 1;
        let now = Utc::now();
        let created = Account {
            id: AccountId(self.staged.last_id),
            name: account.name,
            email: account.email,
            phone: account.phone,
            password_hash: account.password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        self.staged.accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&mut self, account: &Account) -> Result<Account, DomainError> {
        if !self.staged.accounts.contains_key(&account.id) {
            return Err(DomainError::not_found(format!(
                "account with ID {} not found",
                account.id
            )));
        }
        if self
            .staged
            .email_taken(account.email.as_str(), Some(account.id))
        {
            return Err(DomainError::duplicate("email"));
        }
        if let Some(record) = &account.refresh_token {
            let token_taken = self.staged.accounts.values().any(|other| {
                other.id != account.id
                    && other
                        .refresh_token
                        .as_ref()
                        .is_some_and(|existing| existing.token == record.token)
            });
            if token_taken {
                return Err(DomainError::conflict("refresh token already in use"));
            }
        }

        let mut updated = account.clone();
        updated.updated_at = Utc::now();
        self.staged.accounts.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn commit(self) -> Result<(), DomainError> {
        let InMemoryAccountTransaction { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::account::models::AccountName;
    use crate::domain::account::models::EmailAddress;
    use crate::domain::account::models::PhoneNumber;
    use crate::domain::account::models::RefreshTokenRecord;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            name: AccountName::new("Alice".to_string()).expect("valid name"),
            email: EmailAddress::new(email.to_string()).expect("valid email"),
            phone: PhoneNumber::new("555-0100".to_string()).expect("valid phone"),
            password_hash: "$argon2id$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repository = InMemoryAccountRepository::new();

        let mut tx = repository.begin().await.expect("begin");
        let first = tx.create(new_account("a@x.com")).await.expect("create");
        let second = tx.create(new_account("b@x.com")).await.expect("create");
        tx.commit().await.expect("commit");

        assert_eq!(first.id, AccountId(1));
        assert_eq!(second.id, AccountId(2));
        assert!(repository
            .find_by_email("b@x.com")
            .await
            .expect("find")
            .is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repository = InMemoryAccountRepository::new();

        let mut tx = repository.begin().await.expect("begin");
        tx.create(new_account("a@x.com")).await.expect("create");
        let result = tx.create(new_account("a@x.com")).await;

        assert!(matches!(
            result,
            Err(DomainError::Duplicate { ref field, .. }) if field == "email"
        ));
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let repository = InMemoryAccountRepository::new();

        {
            let mut tx = repository.begin().await.expect("begin");
            tx.create(new_account("a@x.com")).await.expect("create");
        }

        assert!(repository
            .find_by_email("a@x.com")
            .await
            .expect("find")
            .is_none());
    }

    #[tokio::test]
    async fn test_find_by_refresh_token() {
        let repository = InMemoryAccountRepository::new();

        let mut tx = repository.begin().await.expect("begin");
        let mut account = tx.create(new_account("a@x.com")).await.expect("create");
        account.refresh_token = Some(RefreshTokenRecord {
            token: "token-1".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        });
        tx.update(&account).await.expect("update");
        tx.commit().await.expect("commit");

        let mut tx = repository.begin().await.expect("begin");
        let found = tx
            .find_by_refresh_token("token-1")
            .await
            .expect("find")
            .expect("account should exist");
        assert_eq!(found.id, account.id);
        assert!(tx
            .find_by_refresh_token("token-2")
            .await
            .expect("find")
            .is_none());
    }

    #[tokio::test]
    async fn test_update_missing_account() {
        let repository = InMemoryAccountRepository::new();

        let mut tx = repository.begin().await.expect("begin");
        let mut account = tx.create(new_account("a@x.com")).await.expect("create");
        account.id = AccountId(99);

        let result = tx.update(&account).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete() {
        let repository = InMemoryAccountRepository::new();

        let mut tx = repository.begin().await.expect("begin");
        let account = tx.create(new_account("a@x.com")).await.expect("create");
        tx.commit().await.expect("commit");

        assert!(repository.delete(&account.id).await.expect("delete"));
        assert!(!repository.delete(&account.id).await.expect("delete"));
    }
}
