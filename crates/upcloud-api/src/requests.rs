// Request payloads
//
// Each struct mirrors the inner object of one request body; the client wraps
// it in the named layer the endpoint expects (`{"server": {...}}`). Path
// parameters ride along on the struct but are never serialized. Optional
// fields are left out of the body when unset.

use std::time::Duration;

use serde::{Serialize, Serializer};
use strum::{Display, EnumString};

use crate::envelope::{nested, on_off, string_int, yes_no};
use crate::error::Error;
use crate::models::{
    BackupRule, FirewallRule, IpAddressAccess, IpAddressFamily, Label, ServerState, StopType,
    StorageAccess, StorageState, StorageTier, StorageType, TimeoutAction,
};
use crate::wait::StateTarget;

/// Durations the API expects as a whole number of seconds in a string.
#[allow(clippy::ref_option)]
fn seconds<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.collect_str(&d.as_secs()),
        None => serializer.serialize_none(),
    }
}

// ── Servers ──────────────────────────────────────────────────────────

/// How the initial root password of a new server is delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PasswordDelivery {
    #[default]
    None,
    Email,
    Sms,
}

/// What to do with a storage device when creating a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageDeviceAction {
    /// Create a new empty disk.
    Create,
    /// Clone an existing storage or template.
    Clone,
    /// Attach an existing storage as is.
    Attach,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateServerStorageDevice {
    pub action: StorageDeviceAction,
    /// Source storage UUID for `clone` and `attach`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Size in GiB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<StorageTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl CreateServerStorageDevice {
    /// Clone `template` into a new disk of `size` GiB.
    pub fn clone_from(template: impl Into<String>, title: impl Into<String>, size: u64) -> Self {
        Self {
            action: StorageDeviceAction::Clone,
            storage: Some(template.into()),
            title: Some(title.into()),
            size: Some(size),
            tier: None,
            address: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CreateServerIpAddress {
    pub access: IpAddressAccess,
    pub family: IpAddressFamily,
}

/// `POST /server`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateServerRequest {
    pub zone: String,
    pub title: String,
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "string_int::option::serialize"
    )]
    pub core_number: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "string_int::option::serialize"
    )]
    pub memory_amount: Option<u32>,
    pub password_delivery: PasswordDelivery,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "on_off::option::serialize"
    )]
    pub firewall: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "yes_no::option::serialize"
    )]
    pub metadata: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "nested::label::serialize")]
    pub labels: Vec<Label>,
    #[serde(serialize_with = "nested::storage_device::serialize")]
    pub storage_devices: Vec<CreateServerStorageDevice>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "nested::ip_address::serialize"
    )]
    pub ip_addresses: Vec<CreateServerIpAddress>,
}

/// `PUT /server/{uuid}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModifyServerRequest {
    #[serde(skip)]
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "string_int::option::serialize"
    )]
    pub core_number: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "string_int::option::serialize"
    )]
    pub memory_amount: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "on_off::option::serialize"
    )]
    pub firewall: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_order: Option<String>,
}

/// `POST /server/{uuid}/start`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartServerRequest {
    #[serde(skip)]
    pub uuid: String,
    /// Start on this host (private cloud only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avoid_host: Option<u64>,
}

/// `POST /server/{uuid}/stop`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StopServerRequest {
    #[serde(skip)]
    pub uuid: String,
    pub stop_type: StopType,
    /// Grace period of a soft stop before the server is hard stopped.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "seconds")]
    pub timeout: Option<Duration>,
}

/// `POST /server/{uuid}/restart`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestartServerRequest {
    #[serde(skip)]
    pub uuid: String,
    pub stop_type: StopType,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "seconds")]
    pub timeout: Option<Duration>,
    pub timeout_action: TimeoutAction,
}

// ── Storage ──────────────────────────────────────────────────────────

/// Narrows `GET /storage` to one class of storages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageFilter {
    #[default]
    All,
    Access(StorageAccess),
    Type(StorageType),
    Favorite,
}

impl StorageFilter {
    pub(crate) fn path(self) -> String {
        match self {
            Self::All => "storage".into(),
            Self::Access(access) => format!("storage/{access}"),
            Self::Type(storage_type) => format!("storage/{storage_type}"),
            Self::Favorite => "storage/favorite".into(),
        }
    }
}

/// `POST /storage`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateStorageRequest {
    /// Size in GiB.
    pub size: u64,
    pub tier: StorageTier,
    pub title: String,
    pub zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_rule: Option<BackupRule>,
}

/// `PUT /storage/{uuid}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModifyStorageRequest {
    #[serde(skip)]
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_rule: Option<BackupRule>,
}

/// `POST /server/{uuid}/storage/attach`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachStorageRequest {
    #[serde(skip)]
    pub server_uuid: String,
    /// Omitted for an empty CD-ROM drive.
    #[serde(rename = "storage", skip_serializing_if = "Option::is_none")]
    pub storage_uuid: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<StorageType>,
    /// Bus address; the API picks one when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// `POST /server/{uuid}/storage/detach`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetachStorageRequest {
    #[serde(skip)]
    pub server_uuid: String,
    pub address: String,
}

/// `POST /server/{uuid}/cdrom/load`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadCdromRequest {
    #[serde(skip)]
    pub server_uuid: String,
    #[serde(rename = "storage")]
    pub storage_uuid: String,
}

/// `POST /storage/{uuid}/clone`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CloneStorageRequest {
    #[serde(skip)]
    pub uuid: String,
    pub title: String,
    pub zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<StorageTier>,
}

/// `POST /storage/{uuid}/templatize`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplatizeStorageRequest {
    #[serde(skip)]
    pub uuid: String,
    pub title: String,
}

/// `POST /storage/{uuid}/backup`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateBackupRequest {
    #[serde(skip)]
    pub uuid: String,
    pub title: String,
}

// ── IP addresses ─────────────────────────────────────────────────────

/// `POST /ip_address`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignIpAddressRequest {
    pub access: IpAddressAccess,
    pub family: IpAddressFamily,
    #[serde(rename = "server")]
    pub server_uuid: String,
}

/// `PUT /ip_address/{address}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModifyIpAddressRequest {
    #[serde(skip)]
    pub address: String,
    pub ptr_record: String,
}

// ── Firewall ─────────────────────────────────────────────────────────

/// `POST /server/{uuid}/firewall_rule`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateFirewallRuleRequest {
    pub server_uuid: String,
    pub rule: FirewallRule,
}

// ── Waiting ──────────────────────────────────────────────────────────

/// Wait for a server to reach `desired_state` or leave `undesired_state`.
///
/// Exactly one of the two must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitForServerStateRequest {
    pub uuid: String,
    pub desired_state: Option<ServerState>,
    pub undesired_state: Option<ServerState>,
    pub timeout: Duration,
}

impl WaitForServerStateRequest {
    pub fn target(&self) -> Result<StateTarget<ServerState>, Error> {
        StateTarget::from_options(self.desired_state, self.undesired_state)
    }
}

/// Wait for a storage to reach `desired_state` or leave `undesired_state`.
///
/// Exactly one of the two must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitForStorageStateRequest {
    pub uuid: String,
    pub desired_state: Option<StorageState>,
    pub undesired_state: Option<StorageState>,
    pub timeout: Duration,
}

impl WaitForStorageStateRequest {
    pub fn target(&self) -> Result<StateTarget<StorageState>, Error> {
        StateTarget::from_options(self.desired_state, self.undesired_state)
    }
}
