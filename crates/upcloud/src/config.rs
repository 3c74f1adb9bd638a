//! CLI configuration: thin wrapper around `upcloud_config`.
//!
//! Picks the active profile and layers `GlobalOpts` flag overrides
//! (--username, --timeout) on top of it before building a `ClientConfig`.

use upcloud_api::ClientConfig;
use upcloud_config::{Config, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Build the client configuration for this invocation.
///
/// A profile named explicitly with `--profile` must exist. Without one,
/// a missing default profile is fine: credentials may come from the
/// environment alone.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let mut cfg = upcloud_config::load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.remove(&profile_name) {
        Some(profile) => profile,
        None if global.profile.is_some() => {
            return Err(profile_not_found(profile_name, &cfg));
        }
        None => Profile::default(),
    };

    let profile = apply_overrides(profile, global);
    tracing::debug!(profile = %profile_name, "resolved profile");
    Ok(upcloud_config::profile_to_client_config(
        &profile,
        &profile_name,
        &cfg.defaults,
    )?)
}

/// Error for a profile name missing from `cfg`, listing the ones it has.
pub fn profile_not_found(name: String, cfg: &Config) -> CliError {
    let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    available.sort_unstable();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
        path: upcloud_config::config_path().display().to_string(),
    }
}

/// CLI flags take priority over profile values.
fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile
}
