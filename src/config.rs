use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{MindTraceError, Result};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default)]
    pub access_token: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_days_per_load")]
    pub days_per_load: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            days_per_load: default_days_per_load(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_hide_hidden")]
    pub hide_hidden: bool,
    #[serde(default = "default_pages")]
    pub pages: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            hide_hidden: default_hide_hidden(),
            pages: default_pages(),
        }
    }
}

fn default_days_per_load() -> usize {
    mindtrace::DAYS_PER_LOAD
}

fn default_hide_hidden() -> bool {
    true
}

fn default_pages() -> usize {
    1
}

impl AppConfig {
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::defaults()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("MINDTRACE_").split("__"))
            .extract()
            .map_err(|e| MindTraceError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.url.is_empty() {
            return Err(MindTraceError::Config("backend.url is required".into()));
        }
        if self.backend.anon_key.is_empty() {
            return Err(MindTraceError::Config(
                "backend.anon_key is required (set in config or MINDTRACE_BACKEND__ANON_KEY env var)"
                    .into(),
            ));
        }
        if self.backend.access_token.is_empty() {
            return Err(MindTraceError::Config(
                "backend.access_token is required (set in config or MINDTRACE_BACKEND__ACCESS_TOKEN env var)"
                    .into(),
            ));
        }
        if self.session.user_id.is_empty() {
            return Err(MindTraceError::Config("session.user_id is required".into()));
        }
        if self.session.days_per_load == 0 {
            return Err(MindTraceError::Config(
                "session.days_per_load must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(|xdg| PathBuf::from(xdg).join("mindtrace"))
            .or_else(|| {
                directories::BaseDirs::new()
                    .map(|dirs| dirs.home_dir().join(".config").join("mindtrace"))
            })
    }

    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = r#"[backend]
url = "https://your-project.supabase.co"
anon_key = ""      # or set MINDTRACE_BACKEND__ANON_KEY env var
access_token = ""  # or set MINDTRACE_BACKEND__ACCESS_TOKEN env var

[session]
user_id = ""
days_per_load = 2

[display]
hide_hidden = true
pages = 1
"#;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Effective configuration as TOML with credentials masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        shown.backend.anon_key = mask(&shown.backend.anon_key);
        shown.backend.access_token = mask(&shown.backend.access_token);
        Ok(toml::to_string_pretty(&shown)?)
    }

    fn defaults() -> Self {
        Self {
            backend: BackendConfig {
                url: String::new(),
                anon_key: String::new(),
                access_token: String::new(),
            },
            session: SessionConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    const VALID: &str = r#"
[backend]
url = "https://demo.supabase.co"
anon_key = "anon-123"
access_token = "token-123"

[session]
user_id = "user-1"
"#;

    #[test]
    fn loads_valid_config_from_toml() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
url = "https://demo.supabase.co"
anon_key = "anon-123"
access_token = "token-123"

[session]
user_id = "user-1"
days_per_load = 3

[display]
hide_hidden = false
pages = 2
"#,
        );

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.backend.url, "https://demo.supabase.co");
        assert_eq!(config.backend.anon_key, "anon-123");
        assert_eq!(config.session.user_id, "user-1");
        assert_eq!(config.session.days_per_load, 3);
        assert!(!config.display.hide_hidden);
        assert_eq!(config.display.pages, 2);
    }

    #[test]
    fn defaults_apply_for_missing_optional_fields() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), VALID);

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.session.days_per_load, 2);
        assert!(config.display.hide_hidden);
        assert_eq!(config.display.pages, 1);
    }

    #[test]
    fn validate_fails_without_url() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
url = ""
anon_key = "anon-123"
access_token = "token-123"

[session]
user_id = "user-1"
"#,
        );

        let msg = AppConfig::load_from_path(&path).unwrap_err().to_string();
        assert!(msg.contains("backend.url"));
    }

    #[test]
    fn validate_fails_without_user_id() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
url = "https://demo.supabase.co"
anon_key = "anon-123"
access_token = "token-123"
"#,
        );

        let msg = AppConfig::load_from_path(&path).unwrap_err().to_string();
        assert!(msg.contains("session.user_id"));
    }

    #[test]
    fn validate_rejects_zero_days_per_load() {
        let mut config = AppConfig::defaults();
        config.backend.url = "https://demo.supabase.co".into();
        config.backend.anon_key = "anon".into();
        config.backend.access_token = "token".into();
        config.session.user_id = "user-1".into();
        config.session.days_per_load = 0;

        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("days_per_load"));
    }

    #[test]
    fn env_var_supplies_access_token() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
url = "https://demo.supabase.co"
anon_key = "anon-123"

[session]
user_id = "user-1"
"#,
        );

        env::set_var("MINDTRACE_BACKEND__ACCESS_TOKEN", "env-token");
        let config = AppConfig::load_from_path(&path);
        env::remove_var("MINDTRACE_BACKEND__ACCESS_TOKEN");

        assert_eq!(config.unwrap().backend.access_token, "env-token");
    }

    #[test]
    fn write_default_creates_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("subdir").join("config.toml");

        AppConfig::write_default(&path).unwrap();

        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("your-project.supabase.co"));
        assert!(content.contains("days_per_load = 2"));
    }

    #[test]
    fn redacted_toml_masks_credentials() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), VALID);
        let config = AppConfig::load_from_path(&path).unwrap();

        let rendered = config.to_redacted_toml().unwrap();
        assert!(rendered.contains("https://demo.supabase.co"));
        assert!(!rendered.contains("token-123"));
        assert!(!rendered.contains("anon-123"));
        assert!(rendered.contains("********"));
    }

    #[test]
    fn config_dir_returns_some() {
        assert!(AppConfig::config_dir().is_some());
    }
}
