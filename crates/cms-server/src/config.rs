use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub docs_path: PathBuf,
    pub static_dir: PathBuf,
    pub admin: Option<AdminSeed>,
}

/// Credentials for an admin account created at startup if missing.
pub struct AdminSeed {
    pub handle: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("handle", &self.handle)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = var_or("CMS_PORT", "8080")
            .parse()
            .context("CMS_PORT must be a port number")?;

        let admin = match (env::var("CMS_ADMIN_HANDLE").ok(), env::var("CMS_ADMIN_PASSWORD").ok()) {
            (Some(handle), Some(password)) if !handle.is_empty() && !password.is_empty() => {
                Some(AdminSeed { handle, password })
            }
            (None, None) => None,
            _ => bail!("CMS_ADMIN_HANDLE and CMS_ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            host: var_or("CMS_HOST", "0.0.0.0"),
            port,
            db_path: var_or("CMS_DB_PATH", "cms.db").into(),
            docs_path: var_or("CMS_DOCS_PATH", "./docs").into(),
            static_dir: var_or("CMS_STATIC_DIR", "./static").into(),
            admin,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}
