// UpCloud domain models
//
// Resource types as returned by the API after envelope normalization.
// Structs use `#[serde(default)]` at the container level: the API omits
// fields freely, and an omitted field decodes to its zero value.

mod account;
mod firewall;
mod ip_address;
mod server;
mod storage;

pub use account::{Account, ServerConfiguration, Zone};
pub use firewall::FirewallRule;
pub use ip_address::{IpAddress, IpAddressAccess, IpAddressFamily};
pub use server::{
    Label, Server, ServerDetails, ServerState, ServerStorageDevice, StopType, TimeoutAction,
};
pub use storage::{
    BackupRule, Storage, StorageAccess, StorageDetails, StorageState, StorageTier, StorageType,
};
