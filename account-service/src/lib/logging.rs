use std::collections::HashMap;
use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::account::models::AccountId;
use crate::domain::errors::DomainError;

const DEFAULT_FILTER: &str = "account_service=debug,tower_http=debug";

/// Install the process-wide subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Log sink dedicated to one account.
pub struct AccountLogger {
    account_id: AccountId,
    dispatch: Dispatch,
    to_file: bool,
}

impl AccountLogger {
    pub fn info(&self, message: &str) {
        tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::info!(account_id = self.account_id.0, "{}", message);
        });
    }

    pub fn warn(&self, message: &str) {
        tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::warn!(account_id = self.account_id.0, "{}", message);
        });
    }

    /// Whether events go to the account's own file rather than the global sink.
    pub fn writes_to_file(&self) -> bool {
        self.to_file
    }
}

/// Lazily created per-account log sinks.
///
/// Sinks are created on first use and kept for the lifetime of the
/// registry. A single lock covers both lookup and insertion, so concurrent
/// first access for one account yields exactly one sink.
pub struct AccountLogRegistry {
    directory: Option<PathBuf>,
    sinks: Mutex<HashMap<AccountId, Arc<AccountLogger>>>,
}

impl AccountLogRegistry {
    /// Create a registry writing `account_<id>.log` files under `directory`.
    ///
    /// With `None` every sink forwards to the global dispatcher.
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self {
            directory,
            sinks: Mutex::new(HashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Get the sink for an account, creating it on first access.
    pub fn logger_for(&self, account_id: AccountId) -> Arc<AccountLogger> {
        let mut sinks = self.sinks.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(logger) = sinks.get(&account_id) {
            return Arc::clone(logger);
        }

        let logger = Arc::new(self.create_logger(account_id));
        sinks.insert(account_id, Arc::clone(&logger));
        logger
    }

    fn create_logger(&self, account_id: AccountId) -> AccountLogger {
        let Some(directory) = &self.directory else {
            return Self::fallback(account_id);
        };

        match open_log_file(directory, account_id) {
            Ok(file) => {
                let subscriber = tracing_subscriber::fmt()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .finish();

                AccountLogger {
                    account_id,
                    dispatch: Dispatch::new(subscriber),
                    to_file: true,
                }
            }
            Err(e) => {
                let error = classify_io_error(directory, e);
                tracing::warn!(
                    account_id = account_id.0,
                    code = error.code(),
                    error = %error,
                    "Failed to open account log file, using global logger"
                );
                Self::fallback(account_id)
            }
        }
    }

    fn fallback(account_id: AccountId) -> AccountLogger {
        AccountLogger {
            account_id,
            dispatch: tracing::dispatcher::get_default(|dispatch| dispatch.clone()),
            to_file: false,
        }
    }
}

fn open_log_file(directory: &Path, account_id: AccountId) -> io::Result<File> {
    fs::create_dir_all(directory)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(directory.join(format!("account_{}.log", account_id)))
}

fn classify_io_error(directory: &Path, error: io::Error) -> DomainError {
    let path = directory.display().to_string();
    match error.kind() {
        io::ErrorKind::NotFound => DomainError::file_not_found(path),
        io::ErrorKind::PermissionDenied => DomainError::permission_denied(path, "write"),
        _ => DomainError::internal("failed to open account log file", error),
    }
}
