use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8750;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Top-level config (volley.toml + VOLLEY_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VolleyConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub discord: DiscordApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Dashboard access control.
///
/// Each `[[auth.users]]` entry maps a bearer token to an operator email.
/// The email must additionally appear in `allowed_emails` before any
/// /api route is served; `owner_email` gates config writes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub users: Vec<AuthUser>,
    #[serde(default)]
    pub allowed_emails: Vec<String>,
    pub owner_email: Option<String>,
}

/// A single token → identity mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub token: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Directory where uploaded images are stored and served from
    /// (the /uploads/ URL prefix maps here).
    #[serde(default = "default_uploads_dir")]
    pub dir: String,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordApiConfig {
    /// Base URL of the Discord REST API, without trailing slash.
    /// Overridable for tests and proxies.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for DiscordApiConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.volley/volley.db", home)
}
fn default_uploads_dir() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.volley/uploads", home)
}
fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

impl VolleyConfig {
    /// Load config from a TOML file with VOLLEY_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.volley/volley.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: VolleyConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("VOLLEY_").split("_"))
            .extract()
            .map_err(|e| crate::error::VolleyError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Create the database parent directory and the uploads directory.
    pub fn ensure_dirs(&self) -> crate::error::Result<()> {
        if let Some(parent) = std::path::Path::new(&self.database.path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(&self.uploads.dir)?;
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.volley/volley.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = VolleyConfig::default();
        assert_eq!(cfg.gateway.port, DEFAULT_PORT);
        assert_eq!(cfg.discord.api_base, "https://discord.com/api/v10");
        assert!(cfg.auth.users.is_empty());
        assert!(cfg.auth.owner_email.is_none());
    }

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volley.toml");
        std::fs::write(
            &path,
            r#"
                [gateway]
                port = 9000

                [auth]
                allowed_emails = ["ops@example.com"]
                owner_email = "ops@example.com"

                [[auth.users]]
                token = "secret"
                email = "ops@example.com"
            "#,
        )
        .unwrap();

        let cfg = VolleyConfig::load(path.to_str()).unwrap();
        assert_eq!(cfg.gateway.port, 9000);
        assert_eq!(cfg.auth.users.len(), 1);
        assert_eq!(cfg.auth.users[0].email, "ops@example.com");
        assert_eq!(cfg.auth.owner_email.as_deref(), Some("ops@example.com"));
        // Unset sections fall back to defaults.
        assert_eq!(cfg.gateway.bind, DEFAULT_BIND);
    }
}
