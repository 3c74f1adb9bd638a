//! Shared configuration for UpCloud tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `upcloud_api::ClientConfig`. The CLI layers its global
//! flags on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use upcloud_api::{ClientConfig, PollConfig, TransportConfig, TransportErrorPolicy};

/// Service name under which passwords are kept in the OS keyring.
pub const KEYRING_SERVICE: &str = "upcloud";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{0}' not found in config")]
    UnknownProfile(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The profile name to use when none is given explicitly.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between state polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    upcloud_api::wait::DEFAULT_POLL_INTERVAL.as_secs()
}

/// A named API account profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API username.
    pub username: Option<String>,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// API root override (e.g. a proxy), defaults to the public 1.2 API.
    pub api_url: Option<String>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override poll interval.
    pub poll_interval: Option<u64>,

    /// Keep polling through connection errors and HTTP 5xx responses.
    pub retry_transient: Option<bool>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "upcloud", "upcloud").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("upcloud");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment.
///
/// A missing file is not an error. Environment overrides use the
/// `UPCLOUD_` prefix with `__` as the nesting separator
/// (`UPCLOUD_DEFAULTS__TIMEOUT=60`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("UPCLOUD_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Somewhere passwords can be looked up by key (`{profile}/password`).
pub trait SecretStore {
    fn get(&self, key: &str) -> Option<String>;
}

/// The OS keyring.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keyring;

impl SecretStore for Keyring {
    fn get(&self, key: &str) -> Option<String> {
        keyring::Entry::new(KEYRING_SERVICE, key)
            .ok()?
            .get_password()
            .ok()
    }
}

/// Store a profile's password in the OS keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &password_key(profile_name))?.set_password(password)?;
    Ok(())
}

fn password_key(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Resolve username + password for a profile, consulting the OS keyring.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    resolve_credentials_with(profile, profile_name, &Keyring)
}

/// Resolve username + password for a profile against `store`.
///
/// Username: profile, then `UPCLOUD_USERNAME`. Password: the profile's
/// `password_env` variable, `UPCLOUD_PASSWORD`, `store`, then the
/// plaintext profile field.
pub fn resolve_credentials_with(
    profile: &Profile,
    profile_name: &str,
    store: &impl SecretStore,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("UPCLOUD_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok((username, SecretString::from(pw)));
        }
    }

    // 2. Env var
    if let Ok(pw) = std::env::var("UPCLOUD_PASSWORD") {
        return Ok((username, SecretString::from(pw)));
    }

    // 3. Keyring
    if let Some(pw) = store.get(&password_key(profile_name)) {
        return Ok((username, SecretString::from(pw)));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok((username, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build a `ClientConfig` from a profile, no CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let (username, password) = resolve_credentials(profile, profile_name)?;
    build_client_config(profile, defaults, username, password)
}

/// Assemble a `ClientConfig` from already resolved credentials.
pub fn build_client_config(
    profile: &Profile,
    defaults: &Defaults,
    username: String,
    password: SecretString,
) -> Result<ClientConfig, ConfigError> {
    let mut transport = TransportConfig::default()
        .with_timeout(Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)));
    if let Some(ref raw) = profile.api_url {
        transport = transport
            .with_base_url(raw)
            .map_err(|e| ConfigError::Validation {
                field: "api_url".into(),
                reason: e.to_string(),
            })?;
    }

    let interval = profile.poll_interval.unwrap_or(defaults.poll_interval);
    if interval == 0 {
        return Err(ConfigError::Validation {
            field: "poll_interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    let poll = PollConfig {
        interval: Duration::from_secs(interval),
        on_transport_error: if profile.retry_transient.unwrap_or(false) {
            TransportErrorPolicy::Retry
        } else {
            TransportErrorPolicy::Abort
        },
    };

    Ok(ClientConfig {
        username,
        password,
        transport,
        poll,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use figment::Jail;
    use secrecy::ExposeSecret;

    use super::*;

    struct MapStore(HashMap<String, String>);

    impl SecretStore for MapStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }
    }

    fn empty_store() -> MapStore {
        MapStore(HashMap::new())
    }

    #[test]
    fn loads_profiles_from_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "work"

                [defaults]
                timeout = 45

                [profiles.work]
                username = "apiuser"
                password_env = "WORK_PASSWORD"
                poll_interval = 2
                "#,
            )?;

            let config = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.default_profile_name(), "work");
            assert_eq!(config.defaults.timeout, 45);
            assert_eq!(config.defaults.output, "table");
            let work = &config.profiles["work"];
            assert_eq!(work.username.as_deref(), Some("apiuser"));
            assert_eq!(work.poll_interval, Some(2));
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let config = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.default_profile_name(), "default");
            assert_eq!(config.defaults.poll_interval, 5);
            assert!(config.profiles.is_empty());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("UPCLOUD_DEFAULTS__TIMEOUT", "90");
            jail.set_env("UPCLOUD_DEFAULT_PROFILE", "staging");
            let config = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.defaults.timeout, 90);
            assert_eq!(config.default_profile_name(), "staging");
            Ok(())
        });
    }

    #[test]
    fn password_env_wins_over_keyring_and_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env("WORK_PASSWORD", "from-env");
            let profile = Profile {
                username: Some("apiuser".into()),
                password: Some("plaintext".into()),
                password_env: Some("WORK_PASSWORD".into()),
                ..Profile::default()
            };
            let store = MapStore(HashMap::from([("work/password".into(), "from-keyring".into())]));

            let (user, pw) =
                resolve_credentials_with(&profile, "work", &store).map_err(|e| e.to_string())?;
            assert_eq!(user, "apiuser");
            assert_eq!(pw.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn keyring_wins_over_plaintext() {
        Jail::expect_with(|_| {
            let profile = Profile {
                username: Some("apiuser".into()),
                password: Some("plaintext".into()),
                ..Profile::default()
            };
            let store = MapStore(HashMap::from([("work/password".into(), "from-keyring".into())]));

            let (_, pw) =
                resolve_credentials_with(&profile, "work", &store).map_err(|e| e.to_string())?;
            assert_eq!(pw.expose_secret(), "from-keyring");

            let (_, pw) =
                resolve_credentials_with(&profile, "other", &store).map_err(|e| e.to_string())?;
            assert_eq!(pw.expose_secret(), "plaintext");
            Ok(())
        });
    }

    #[test]
    fn username_falls_back_to_env() {
        Jail::expect_with(|jail| {
            jail.set_env("UPCLOUD_USERNAME", "envuser");
            jail.set_env("UPCLOUD_PASSWORD", "envpass");

            let (user, pw) =
                resolve_credentials_with(&Profile::default(), "default", &empty_store())
                    .map_err(|e| e.to_string())?;
            assert_eq!(user, "envuser");
            assert_eq!(pw.expose_secret(), "envpass");
            Ok(())
        });
    }

    #[test]
    fn missing_password_is_an_error() {
        let profile = Profile {
            username: Some("apiuser".into()),
            ..Profile::default()
        };
        Jail::expect_with(|_| {
            let err = resolve_credentials_with(&profile, "work", &empty_store()).unwrap_err();
            assert!(
                matches!(err, ConfigError::NoCredentials { ref profile } if profile == "work"),
                "{err:?}"
            );
            Ok(())
        });
    }

    #[test]
    fn client_config_applies_overrides() {
        let profile = Profile {
            api_url: Some("http://127.0.0.1:9000/1.2".into()),
            timeout: Some(10),
            poll_interval: Some(1),
            retry_transient: Some(true),
            ..Profile::default()
        };

        let config = build_client_config(
            &profile,
            &Defaults::default(),
            "apiuser".into(),
            SecretString::from("pw".to_owned()),
        )
        .unwrap();

        assert_eq!(config.transport.base_url.as_str(), "http://127.0.0.1:9000/1.2/");
        assert_eq!(config.transport.timeout, Duration::from_secs(10));
        assert_eq!(config.poll.interval, Duration::from_secs(1));
        assert_eq!(config.poll.on_transport_error, TransportErrorPolicy::Retry);
    }

    #[test]
    fn invalid_api_url_is_a_validation_error() {
        let profile = Profile {
            api_url: Some("not a url".into()),
            ..Profile::default()
        };
        let err = build_client_config(
            &profile,
            &Defaults::default(),
            "apiuser".into(),
            SecretString::from("pw".to_owned()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
    }

    #[test]
    fn saved_config_loads_back() {
        Jail::expect_with(|jail| {
            let mut config = Config::default();
            config.profiles.insert(
                "default".into(),
                Profile {
                    username: Some("apiuser".into()),
                    timeout: Some(60),
                    ..Profile::default()
                },
            );
            let path = jail.directory().join("nested/config.toml");
            save_config_to(&config, &path).map_err(|e| e.to_string())?;

            let loaded = load_config_from(&path).map_err(|e| e.to_string())?;
            assert_eq!(loaded.profiles["default"].timeout, Some(60));
            Ok(())
        });
    }
}
