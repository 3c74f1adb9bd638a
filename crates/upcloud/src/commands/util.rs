//! Shared helpers for command handlers.

use std::io::IsTerminal;

use upcloud_api::models::{ServerState, StorageAccess, StorageState, StorageType};
use upcloud_api::requests::StorageFilter;

use crate::cli::{ServerStateArg, StorageFilterArg, StorageStateArg};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, destructive actions need `--yes`.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Print a status line to stderr unless `--quiet`.
pub fn status(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}

// ── Argument conversions ────────────────────────────────────────────

impl From<ServerStateArg> for ServerState {
    fn from(arg: ServerStateArg) -> Self {
        match arg {
            ServerStateArg::Started => Self::Started,
            ServerStateArg::Stopped => Self::Stopped,
            ServerStateArg::Maintenance => Self::Maintenance,
            ServerStateArg::Error => Self::Error,
        }
    }
}

impl From<StorageStateArg> for StorageState {
    fn from(arg: StorageStateArg) -> Self {
        match arg {
            StorageStateArg::Online => Self::Online,
            StorageStateArg::Maintenance => Self::Maintenance,
            StorageStateArg::Cloning => Self::Cloning,
            StorageStateArg::Backuping => Self::Backuping,
            StorageStateArg::Syncing => Self::Syncing,
            StorageStateArg::Error => Self::Error,
        }
    }
}

impl From<StorageFilterArg> for StorageFilter {
    fn from(arg: StorageFilterArg) -> Self {
        match arg {
            StorageFilterArg::Public => Self::Access(StorageAccess::Public),
            StorageFilterArg::Private => Self::Access(StorageAccess::Private),
            StorageFilterArg::Normal => Self::Type(StorageType::Normal),
            StorageFilterArg::Backup => Self::Type(StorageType::Backup),
            StorageFilterArg::Cdrom => Self::Type(StorageType::Cdrom),
            StorageFilterArg::Template => Self::Type(StorageType::Template),
            StorageFilterArg::Favorite => Self::Favorite,
        }
    }
}

/// `"-"` for empty strings, for table cells.
pub fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".into()
    } else {
        value.to_owned()
    }
}
