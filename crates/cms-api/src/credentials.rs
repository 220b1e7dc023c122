use std::sync::Arc;

use tracing::{info, warn};

use cms_db::Database;
use cms_db::models::UserRow;

use crate::error::StoreError;
use crate::password;
use crate::run_blocking;

/// Users and their password hashes. Hashing and every query run on the
/// blocking pool.
#[derive(Clone)]
pub struct CredentialStore {
    db: Arc<Database>,
}

impl CredentialStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Fails with `UserExists` before hashing when the handle is taken.
    pub async fn create_user(
        &self,
        handle: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<i64, StoreError> {
        let db = self.db.clone();
        let handle = handle.to_string();
        let password = password.to_string();

        let id = run_blocking(move || {
            if db.get_user_by_handle(&handle)?.is_some() {
                return Err(StoreError::UserExists(handle));
            }
            let hash = password::hash_password(&password)?;
            Ok(db.create_user(&handle, &hash, is_admin)?)
        })
        .await?;

        info!("User {} created (admin: {})", id, is_admin);
        Ok(id)
    }

    pub async fn get_user(&self, handle: &str) -> Result<UserRow, StoreError> {
        let db = self.db.clone();
        let handle = handle.to_string();
        run_blocking(move || db.get_user_by_handle(&handle)?.ok_or(StoreError::NotFound)).await
    }

    /// Returns the user when `password` matches the stored hash.
    pub async fn verify_password(
        &self,
        handle: &str,
        password: &str,
    ) -> Result<UserRow, StoreError> {
        let db = self.db.clone();
        let handle = handle.to_string();
        let password = password.to_string();

        run_blocking(move || {
            let user = db.get_user_by_handle(&handle)?.ok_or(StoreError::NotFound)?;
            if password::verify_password(&password, &user.password_hash)? {
                Ok(user)
            } else {
                Err(StoreError::BadCredential)
            }
        })
        .await
    }

    pub async fn change_password(
        &self,
        handle: &str,
        new_password: &str,
    ) -> Result<(), StoreError> {
        let db = self.db.clone();
        let handle = handle.to_string();
        let new_password = new_password.to_string();

        run_blocking(move || {
            let hash = password::hash_password(&new_password)?;
            db.update_password(&handle, &hash)?;
            info!("Password changed for {}", handle);
            Ok(())
        })
        .await
    }

    pub async fn list_handles(&self) -> Result<Vec<String>, StoreError> {
        let db = self.db.clone();
        run_blocking(move || Ok(db.list_handles()?)).await
    }

    /// Creates the admin account unless the handle already exists.
    /// Returns whether a user was created. An existing non-admin account is
    /// left as is and reported with a warning.
    pub async fn ensure_admin(&self, handle: &str, password: &str) -> Result<bool, StoreError> {
        match self.create_user(handle, password, true).await {
            Ok(_) => Ok(true),
            Err(StoreError::UserExists(_)) => {
                let existing = self.get_user(handle).await?;
                if !existing.is_admin {
                    warn!(
                        "Admin handle {} belongs to a non-admin account; it has no admin rights",
                        handle
                    );
                }
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
