use std::path::PathBuf;
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::app::domain::account::{Account, LoginData, StoredToken};
use crate::app::domain::config::config_dir;
use crate::app::infrastructure::error::AppError;
use crate::app::services::preference_store::StorageBackend;

/// `account.json` in the app config directory.
pub fn default_account_path() -> PathBuf {
    let mut path = config_dir();
    path.push("account.json");
    path
}

/// Portal sign-in and token persistence, kept apart from guide preferences.
pub struct AccountStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> AccountStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Stored account. Missing or corrupt storage reads as signed out.
    pub fn load(&self) -> Account {
        match self.backend.read() {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Discarding unreadable account data: {}", e);
                Account::default()
            }),
            Ok(None) => Account::default(),
            Err(e) => {
                warn!("Account data is not accessible: {}", e);
                Account::default()
            }
        }
    }

    fn store(&self, account: &Account) -> Result<(), AppError> {
        let json = serde_json::to_string(account)?;
        self.backend.write(&json)?;
        Ok(())
    }

    pub fn login(&self) -> Option<LoginData> {
        self.load().login
    }

    pub fn set_login(&self, data: LoginData) -> Result<(), AppError> {
        let mut account = self.load();
        info!(user = %data.username, verified = data.verified, "signed in");
        // A token issued to someone else is of no use to the new account
        if account
            .token
            .as_ref()
            .is_some_and(|token| token.discord_id != data.discord_id())
        {
            account.token = None;
        }
        account.login = Some(data);
        self.store(&account)
    }

    /// Forget the signed-in user and any token issued for them.
    pub fn logout(&self) -> Result<(), AppError> {
        info!("signed out");
        self.store(&Account::default())
    }

    /// Record the portal's verdict. Returns false when nobody is signed in.
    pub fn update_verification_status(&self, verified: bool) -> Result<bool, AppError> {
        let mut account = self.load();
        let Some(login) = account.login.as_mut() else {
            return Ok(false);
        };
        login.verified = verified;
        self.store(&account)?;
        Ok(true)
    }

    /// The stored token if it is still live at `now`.
    pub fn token(&self, now: SystemTime) -> Option<StoredToken> {
        self.load().token.filter(|token| {
            let live = token.is_live(now);
            if !live {
                debug!("stored verification token has expired");
            }
            live
        })
    }

    pub fn set_token(&self, value: &str, discord_id: &str, now: SystemTime) -> Result<StoredToken, AppError> {
        let mut account = self.load();
        let token = StoredToken::issue(value, discord_id, now);
        account.token = Some(token.clone());
        self.store(&account)?;
        Ok(token)
    }

    pub fn remove_token(&self) -> Result<(), AppError> {
        let mut account = self.load();
        if account.token.take().is_some() {
            self.store(&account)?;
        }
        Ok(())
    }
}
