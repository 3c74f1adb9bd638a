//! Config subcommand handlers.
//!
//! These run without an API client, so they work before any profile
//! has credentials.

use upcloud_config::{ConfigError, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

const REDACTED: &str = "********";

/// Keys accepted by `config set`.
const KEYS: &str = "username, password_env, api_url, timeout, poll_interval, retry_transient";

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = upcloud_config::config_path().display().to_string();
            output::print_output(&path, global.quiet)
        }

        ConfigCommand::Show => {
            let mut cfg = upcloud_config::load_config()?;
            for profile in cfg.profiles.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some(REDACTED.into());
                }
            }
            let rendered = toml::to_string_pretty(&cfg).map_err(ConfigError::from)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| rendered.trim_end().to_owned(),
                |c| c.default_profile_name().to_owned(),
            )?;
            output::print_output(&out, global.quiet)
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = upcloud_config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, value)?;

            upcloud_config::save_config(&cfg)?;
            util::status(&format!("Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = upcloud_config::load_config()?;
            if cfg.profiles.is_empty() {
                util::status(
                    "No profiles configured. Run: upcloud config set username <name>",
                    global.quiet,
                );
                return Ok(());
            }
            let default = cfg.default_profile_name();
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort_unstable();
            let out = names
                .into_iter()
                .map(|name| {
                    if name == default {
                        format!("{name} *")
                    } else {
                        name.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            output::print_output(&out, global.quiet)
        }

        ConfigCommand::Use { name } => {
            let mut cfg = upcloud_config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            upcloud_config::save_config(&cfg)?;
            util::status(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = upcloud_config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(config::profile_not_found(profile_name, &cfg));
            }

            let password = dialoguer::Password::new()
                .with_prompt(format!("Password for profile '{profile_name}'"))
                .interact()
                .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }

            upcloud_config::store_password(&profile_name, &password)?;
            util::status(
                &format!("Password stored in system keyring for profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }
    }
}

fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "username" => profile.username = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "api_url" | "api-url" => profile.api_url = Some(value),
        "timeout" => profile.timeout = Some(parse(key, &value, "a number of seconds")?),
        "poll_interval" | "poll-interval" => {
            profile.poll_interval = Some(parse(key, &value, "a number of seconds")?);
        }
        "retry_transient" | "retry-transient" => {
            profile.retry_transient = Some(parse(key, &value, "'true' or 'false'")?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key. Valid keys: {KEYS}"),
            });
        }
    }
    Ok(())
}

fn parse<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}, got '{value}'"),
    })
}
