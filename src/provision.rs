//! One-shot administrator provisioning.
//!
//! [`provision_admin`] creates the admin account if it does not exist yet.
//! Running it again is a success that reports [`ProvisionOutcome::AlreadyExists`];
//! only real failures (unreadable directory, bad input) are errors.
//!
//! Accounts live behind the [`AuthDirectory`] seam. [`JsonAuthDirectory`]
//! keeps them in `<data_dir>/auth_users.json` with Argon2id password hashes
//! stored as PHC strings (`$argon2id$v=19$...`), salt included.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const USERS_FILE: &str = "auth_users.json";
pub const MIN_PASSWORD_LEN: usize = 8;
const SALT_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("user {0} has already been registered")]
    AlreadyRegistered(String),
    #[error("'{0}' is not an email address")]
    InvalidEmail(String),
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created { user_id: String },
    AlreadyExists,
}

impl fmt::Display for ProvisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { .. } => f.write_str("Admin user created successfully"),
            Self::AlreadyExists => f.write_str("Admin user already exists"),
        }
    }
}

/// Account registry. `create_user` fails with
/// [`ProvisionError::AlreadyRegistered`] for a known email.
pub trait AuthDirectory {
    fn create_user(&self, email: &str, password: &str) -> Result<String, ProvisionError>;
}

pub fn provision_admin(
    directory: &dyn AuthDirectory,
    email: &str,
    password: &str,
) -> Result<ProvisionOutcome, ProvisionError> {
    let email = email.trim();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(ProvisionError::InvalidEmail(email.to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ProvisionError::WeakPassword);
    }
    match directory.create_user(email, password) {
        Ok(user_id) => {
            tracing::info!(%email, %user_id, "admin user created");
            Ok(ProvisionOutcome::Created { user_id })
        }
        Err(ProvisionError::AlreadyRegistered(_)) => {
            tracing::info!(%email, "admin user already exists");
            Ok(ProvisionOutcome::AlreadyExists)
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    /// PHC string.
    pub password_hash: String,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl AuthUser {
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }

    /// False for a wrong password and for an unparseable stored hash.
    pub fn check_password(&self, password: &str) -> bool {
        PasswordHash::new(&self.password_hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

fn hash_password(password: &str) -> Result<String, ProvisionError> {
    let bytes: [u8; SALT_LEN] = rand::rng().random();
    let salt = SaltString::encode_b64(&bytes).map_err(ProvisionError::Hash)?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(ProvisionError::Hash)?;
    Ok(hash.to_string())
}

/// Accounts stored as a JSON array in one file.
#[derive(Debug, Clone)]
pub struct JsonAuthDirectory {
    path: PathBuf,
}

impl JsonAuthDirectory {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(USERS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn users(&self) -> Result<Vec<AuthUser>, ProvisionError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn verify(&self, email: &str, password: &str) -> Result<bool, ProvisionError> {
        Ok(self
            .users()?
            .iter()
            .any(|u| u.matches_email(email) && u.check_password(password)))
    }

    fn write(&self, users: &[AuthUser]) -> Result<(), ProvisionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(users)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl AuthDirectory for JsonAuthDirectory {
    fn create_user(&self, email: &str, password: &str) -> Result<String, ProvisionError> {
        let mut users = self.users()?;
        if users.iter().any(|u| u.matches_email(email)) {
            return Err(ProvisionError::AlreadyRegistered(email.to_string()));
        }
        let user = AuthUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.trim().to_string(),
            password_hash: hash_password(password)?,
            email_confirmed: true,
            created_at: Utc::now(),
        };
        let id = user.id.clone();
        users.push(user);
        self.write(&users)?;
        Ok(id)
    }
}
