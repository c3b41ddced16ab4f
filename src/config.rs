// Configuration store: a flat `key=value` text file with the connection
// credentials and the selected device family.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Known keys, in the order they are written back.
pub const KEYS: [&str; 6] = ["model", "username", "password", "api_key", "customer_id", "host"];

pub const DEFAULT_CUSTOMER_ID: &str = "99";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Default location: `<config dir>/ojm-thermostat/config.txt`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ojm-thermostat")
        .join("config.txt")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub model: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub customer_id: Option<String>,
    pub host: Option<String>,
    /// Keys this program does not know, kept so a save does not drop them.
    extra: Vec<(String, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: None,
            username: None,
            password: None,
            api_key: None,
            customer_id: Some(DEFAULT_CUSTOMER_ID.to_string()),
            host: None,
            extra: Vec::new(),
        }
    }
}

impl Config {
    /// Read `path` if it exists; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Config::parse(&text))
    }

    /// Rewrite `path` with every key that has a value.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, self.render()).map_err(write_err)?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    pub fn parse(text: &str) -> Self {
        let mut config = Config::default();
        for line in text.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            // Empty values keep whatever default the key has.
            if !value.is_empty() {
                config.set(key, Some(value.to_string()));
            }
        }
        config
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.entries() {
            if let Some(value) = value {
                out.push_str(key);
                out.push('=');
                out.push_str(value);
                out.push('\n');
            }
        }
        out
    }

    /// Known keys first in `KEYS` order, then unknown keys in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        let known = KEYS.into_iter().map(move |k| (k, self.get(k)));
        let extra = self.extra.iter().map(|(k, v)| (k.as_str(), Some(v.as_str())));
        known.chain(extra)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "model" => self.model.as_deref(),
            "username" => self.username.as_deref(),
            "password" => self.password.as_deref(),
            "api_key" => self.api_key.as_deref(),
            "customer_id" => self.customer_id.as_deref(),
            "host" => self.host.as_deref(),
            other => self
                .extra
                .iter()
                .find(|(k, _)| k == other)
                .map(|(_, v)| v.as_str()),
        }
    }

    pub fn set(&mut self, key: &str, value: Option<String>) {
        match key {
            "model" => self.model = value,
            "username" => self.username = value,
            "password" => self.password = value,
            "api_key" => self.api_key = value,
            "customer_id" => self.customer_id = value,
            "host" => self.host = value,
            other => {
                self.extra.retain(|(k, _)| k != other);
                if let Some(value) = value {
                    self.extra.push((other.to_string(), value));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("config.txt")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.customer_id.as_deref(), Some("99"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.txt");

        let mut config = Config::default();
        config.model = Some("WD5 series".into());
        config.username = Some("me@example.com".into());
        config.password = Some("p=ss".into());
        config.api_key = Some("abc-123".into());
        config.customer_id = Some("42".into());
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded, config);
        let pairs: Vec<_> = reloaded.entries().filter_map(|(k, v)| v.map(|v| (k, v))).collect();
        assert_eq!(
            pairs,
            vec![
                ("model", "WD5 series"),
                ("username", "me@example.com"),
                ("password", "p=ss"),
                ("api_key", "abc-123"),
                ("customer_id", "42"),
            ]
        );
    }

    #[test]
    fn test_render_skips_null_keys_in_key_order() {
        let mut config = Config::default();
        config.host = Some("example.com".into());
        config.model = Some("WG4 series".into());
        assert_eq!(
            config.render(),
            "model=WG4 series\ncustomer_id=99\nhost=example.com\n"
        );
    }

    #[test]
    fn test_parse_ignores_junk_and_empty_values() {
        let config = Config::parse("model=WG4 series\nnot a pair\nhost=\ncustomer_id=\n  username=bob  \n");
        assert_eq!(config.model.as_deref(), Some("WG4 series"));
        assert_eq!(config.host, None);
        assert_eq!(config.customer_id.as_deref(), Some("99"));
        assert_eq!(config.username.as_deref(), Some("bob"));
    }

    #[test]
    fn test_unknown_keys_survive_a_save() {
        let config = Config::parse("theme=dark\nmodel=WD5 series\n");
        assert_eq!(config.get("theme"), Some("dark"));
        assert_eq!(
            config.render(),
            "model=WD5 series\ncustomer_id=99\ntheme=dark\n"
        );
    }
}
