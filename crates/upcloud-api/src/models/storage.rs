use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::envelope::{blank_as_none, nested, string_int};

// ── Enumerations ─────────────────────────────────────────────────────

/// Storage lifecycle state.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageState {
    Online,
    Maintenance,
    Cloning,
    Backuping,
    Syncing,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageTier {
    Hdd,
    #[default]
    Maxiops,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageType {
    Normal,
    Disk,
    Cdrom,
    Template,
    Backup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageAccess {
    Public,
    Private,
}

// ── Storage ──────────────────────────────────────────────────────────

/// Storage overview, as listed by `GET /storage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Storage {
    pub access: String,
    pub license: f64,
    /// Size in GiB.
    pub size: u64,
    pub state: StorageState,
    pub tier: String,
    pub title: String,
    #[serde(rename = "type")]
    pub storage_type: String,
    pub uuid: String,
    pub zone: String,
}

/// Automatic backup schedule of a storage device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupRule {
    /// `daily` or a weekday (`mon` .. `sun`).
    pub interval: String,
    /// `hhmm`, UTC.
    pub time: String,
    /// Days to keep each backup.
    #[serde(with = "string_int")]
    pub retention: u32,
}

/// Full storage details, from `GET /storage/{uuid}` and every
/// storage-mutating endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageDetails {
    #[serde(flatten)]
    pub storage: Storage,

    #[serde(with = "blank_as_none")]
    pub backup_rule: Option<BackupRule>,
    /// UUIDs of the backups taken from this storage.
    #[serde(with = "nested::backup")]
    pub backups: Vec<String>,
    /// UUIDs of the servers this storage is attached to.
    #[serde(with = "nested::server")]
    pub servers: Vec<String>,
    /// For backups, the UUID of the storage it was taken from.
    pub origin: String,
    pub created: String,
}

impl StorageDetails {
    /// The UUID of the storage.
    pub fn uuid(&self) -> &str {
        &self.storage.uuid
    }

    /// The current lifecycle state.
    pub fn state(&self) -> StorageState {
        self.storage.state
    }
}
