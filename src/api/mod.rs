//! Remote store client modules.
//!
//! Everything that talks to the cloud store over HTTP lives here. The remote
//! client implements the same record contract as the local store in
//! [`crate::db`], plus the session management every request needs: tokens are
//! cached on disk, credentials come from encrypted storage or an interactive
//! prompt, and an expired session triggers a bounded re-login loop.

use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::secret::Secret;
use crate::msg_error_anyhow;
use anyhow::Result;
use std::fs;

// Remote client modules
pub mod remote;

pub use remote::{RemoteError, RemoteTasks};

/// Maximum number of authentication retry attempts before giving up.
///
/// Prevents infinite loops when credentials are consistently invalid while
/// still allowing for a few typos.
pub const MAX_RETRY_COUNT: i32 = 3;

/// Common session management for remote clients.
///
/// Implementors provide the actual login call and the file the session token
/// is cached under; the trait supplies the shared restore/login/retry cycle.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Performs authentication and returns a fresh session token.
    async fn login(&self) -> Result<String>;

    /// File name (within the data directory) caching the session token.
    fn session_file(&self) -> &str;

    /// Secret manager holding this client's credentials.
    fn secret(&self) -> &Secret;

    /// Current failed-attempt count.
    fn retry(&self) -> i32;

    /// Records one more failed attempt.
    fn inc_retry(&self);

    /// Retrieves a valid session token, restoring it from the cache or
    /// logging in (with a bounded number of retries) when there is none.
    async fn session_token(&self) -> Result<String> {
        let token_path = DataStorage::new().get_path(self.session_file())?;

        if let Ok(token) = fs::read_to_string(&token_path) {
            if !token.trim().is_empty() {
                return Ok(token.trim().to_string());
            }
        }

        loop {
            match self.login().await {
                Ok(token) => {
                    let _ = fs::write(&token_path, &token);
                    return Ok(token);
                }
                Err(_) if self.retry() < MAX_RETRY_COUNT => {
                    self.inc_retry();
                    continue;
                }
                Err(_) => return Err(msg_error_anyhow!(Message::WrongPassword(MAX_RETRY_COUNT))),
            }
        }
    }

    /// Forgets the cached session token, forcing a re-login next time.
    fn drop_session(&self) -> Result<()> {
        let token_path = DataStorage::new().get_path(self.session_file())?;
        if token_path.exists() {
            fs::remove_file(token_path)?;
        }
        Ok(())
    }
}
