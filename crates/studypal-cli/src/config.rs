//! Configuration file management for studypal.
//!
//! Provides a TOML-based config file at `~/.config/studypal/config.toml` and
//! a resolution chain per value: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default bind address when nothing else is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default listen port when nothing else is configured.
pub const DEFAULT_PORT: u16 = 5000;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: ServerSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            server: ServerSection {
                bind: DEFAULT_BIND.to_string(),
                port: DEFAULT_PORT,
            },
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the studypal config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/studypal` or
/// `~/.config/studypal`. We intentionally ignore the platform-specific
/// `dirs::config_dir()` (which returns `~/Library/Application Support` on
/// macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("studypal");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("studypal")
}

/// Return the path to the studypal config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // Set permissions to 0600 (owner read/write only) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved server configuration, ready for use.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl ServerConfig {
    /// Resolve using the chain: CLI flag > env var > config file > default.
    ///
    /// - Bind: `cli_bind` > `STUDYPAL_BIND` env > `config_file.server.bind` > `127.0.0.1`
    /// - Port: `cli_port` > `STUDYPAL_PORT` env > `config_file.server.port` > `5000`
    pub fn resolve(cli_bind: Option<&str>, cli_port: Option<u16>) -> Result<Self> {
        let file_config = load_config().ok();

        let bind = if let Some(bind) = cli_bind {
            bind.to_string()
        } else if let Ok(bind) = std::env::var("STUDYPAL_BIND") {
            bind
        } else if let Some(ref cfg) = file_config {
            cfg.server.bind.clone()
        } else {
            DEFAULT_BIND.to_string()
        };

        let port = if let Some(port) = cli_port {
            port
        } else if let Ok(port_str) = std::env::var("STUDYPAL_PORT") {
            port_str
                .parse::<u16>()
                .with_context(|| format!("STUDYPAL_PORT is not a valid port: {port_str:?}"))?
        } else if let Some(ref cfg) = file_config {
            cfg.server.port
        } else {
            DEFAULT_PORT
        };

        Ok(Self { bind, port })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_env() {
        unsafe { std::env::remove_var("STUDYPAL_BIND") };
        unsafe { std::env::remove_var("STUDYPAL_PORT") };
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("studypal");
        let path = dir.join("config.toml");

        let original = ConfigFile {
            server: ServerSection {
                bind: "0.0.0.0".to_string(),
                port: 8080,
            },
        };

        std::fs::create_dir_all(&dir).unwrap();
        let contents = toml::to_string_pretty(&original).unwrap();
        std::fs::write(&path, &contents).unwrap();

        let loaded_contents = std::fs::read_to_string(&path).unwrap();
        let loaded: ConfigFile = toml::from_str(&loaded_contents).unwrap();

        assert_eq!(loaded.server.bind, original.server.bind);
        assert_eq!(loaded.server.port, original.server.port);
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();

        // Point XDG_CONFIG_HOME at a temp dir so save_config writes there.
        let tmp = tempfile::TempDir::new().unwrap();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };

        let result = save_config(&ConfigFile::default());
        let mode = std::fs::metadata(config_path()).map(|m| m.permissions().mode() & 0o777);

        // Restore env before asserting, to avoid poisoning the mutex on
        // failure.
        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        result.unwrap();
        assert_eq!(mode.unwrap(), 0o600);
    }

    #[test]
    fn resolve_with_cli_flags_overrides_all() {
        let _lock = lock_env();

        // Even if env vars are set, CLI flags win.
        unsafe { std::env::set_var("STUDYPAL_BIND", "10.0.0.1") };
        unsafe { std::env::set_var("STUDYPAL_PORT", "9999") };

        let config = ServerConfig::resolve(Some("0.0.0.0"), Some(8080)).unwrap();
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 8080);

        clear_env();
    }

    #[test]
    fn resolve_with_env_vars() {
        let _lock = lock_env();

        unsafe { std::env::set_var("STUDYPAL_BIND", "10.0.0.1") };
        unsafe { std::env::set_var("STUDYPAL_PORT", "9999") };

        let config = ServerConfig::resolve(None, None).unwrap();
        assert_eq!(config.bind, "10.0.0.1");
        assert_eq!(config.port, 9999);

        clear_env();
    }

    #[test]
    fn resolve_errors_on_unparseable_env_port() {
        let _lock = lock_env();

        unsafe { std::env::set_var("STUDYPAL_PORT", "not-a-port") };

        let result = ServerConfig::resolve(None, None);

        clear_env();

        let msg = result.unwrap_err().to_string();
        assert!(
            msg.contains("not a valid port"),
            "unexpected error: {msg}"
        );
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        clear_env();

        // Point HOME and XDG_CONFIG_HOME at a temp dir so load_config()
        // cannot find a real config file.
        let tmp = tempfile::TempDir::new().unwrap();
        let orig_home = std::env::var("HOME").ok();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("HOME", tmp.path()) };
        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };

        let result = ServerConfig::resolve(None, None);

        // Restore env before asserting, to avoid poisoning the mutex on
        // failure.
        match orig_home {
            Some(h) => unsafe { std::env::set_var("HOME", h) },
            None => unsafe { std::env::remove_var("HOME") },
        }
        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        let config = result.unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("studypal/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
