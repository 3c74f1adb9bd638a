use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::ip_address::IpAddress;
use crate::envelope::{nested, on_off, string_int, yes_no};

// ── Enumerations ─────────────────────────────────────────────────────

/// Server lifecycle state.
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
pub enum ServerState {
    Started,
    Stopped,
    Maintenance,
    Error,
    /// A state this client does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

/// How a server is stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StopType {
    /// ACPI shutdown, hard stop once the timeout expires.
    #[default]
    Soft,
    Hard,
}

/// What a restart does when a soft stop times out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeoutAction {
    #[default]
    Destroy,
    Ignore,
}

// ── Server ───────────────────────────────────────────────────────────

/// Server overview, as listed by `GET /server`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    #[serde(with = "string_int")]
    pub core_number: u32,
    pub hostname: String,
    pub license: f64,
    /// Memory in MiB.
    #[serde(with = "string_int")]
    pub memory_amount: u32,
    pub plan: String,
    pub progress: String,
    pub state: ServerState,
    #[serde(with = "nested::tag")]
    pub tags: Vec<String>,
    pub title: String,
    pub uuid: String,
    pub zone: String,
}

/// A key/value label attached to a server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub key: String,
    pub value: String,
}

/// A storage device as seen from the server it is attached to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerStorageDevice {
    /// Bus address, e.g. `virtio:0` or `scsi:0:0`.
    pub address: String,
    #[serde(rename = "storage")]
    pub uuid: String,
    /// Size in GiB.
    pub storage_size: u64,
    pub storage_title: String,
    #[serde(rename = "type")]
    pub storage_type: String,
    #[serde(with = "string_int")]
    pub boot_disk: u8,
}

/// Full server details, from `GET /server/{uuid}` and every server-mutating
/// endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerDetails {
    #[serde(flatten)]
    pub server: Server,

    pub boot_order: String,
    #[serde(with = "on_off")]
    pub firewall: bool,
    pub host: u64,
    #[serde(with = "nested::ip_address")]
    pub ip_addresses: Vec<IpAddress>,
    #[serde(with = "nested::label")]
    pub labels: Vec<Label>,
    #[serde(with = "yes_no")]
    pub metadata: bool,
    pub nic_model: String,
    pub simple_backup: String,
    #[serde(with = "nested::storage_device")]
    pub storage_devices: Vec<ServerStorageDevice>,
    pub timezone: String,
    pub video_model: String,
    #[serde(with = "yes_no")]
    pub remote_access_enabled: bool,
    pub remote_access_type: String,
    pub remote_access_host: String,
    pub remote_access_password: String,
    pub remote_access_port: String,
}

impl ServerDetails {
    /// The UUID of the server.
    pub fn uuid(&self) -> &str {
        &self.server.uuid
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ServerState {
        self.server.state
    }

    /// Find an attached storage device by its storage UUID.
    pub fn storage_device(&self, storage_uuid: &str) -> Option<&ServerStorageDevice> {
        self.storage_devices.iter().find(|d| d.uuid == storage_uuid)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::envelope::{normalize, normalize_list, wrap};
    use crate::error::Error;

    const DETAILS: &str = r#"{
        "server": {
            "boot_order": "disk",
            "core_number": "2",
            "firewall": "on",
            "host": 7653311107,
            "hostname": "debian.example.com",
            "ip_addresses": {
                "ip_address": [
                    { "access": "private", "address": "10.0.0.1", "family": "IPv4" },
                    { "access": "public", "address": "94.237.0.1", "family": "IPv4", "part_of_plan": "yes" }
                ]
            },
            "labels": { "label": [ { "key": "env", "value": "test" } ] },
            "license": 0,
            "memory_amount": "2048",
            "metadata": "no",
            "nic_model": "virtio",
            "plan": "2xCPU-4GB",
            "remote_access_enabled": "no",
            "simple_backup": "no",
            "state": "started",
            "storage_devices": {
                "storage_device": [
                    {
                        "address": "virtio:0",
                        "boot_disk": "1",
                        "storage": "012580a1-32a1-466e-a323-689ca16f2d43",
                        "storage_size": 30,
                        "storage_title": "disk1",
                        "type": "disk"
                    }
                ]
            },
            "tags": { "tag": ["DEV"] },
            "timezone": "UTC",
            "title": "Integration test server #1",
            "uuid": "0077fa3d-32db-4b09-9f5f-30d9e9afb565",
            "video_model": "cirrus",
            "zone": "fi-hel1"
        }
    }"#;

    #[test]
    fn decode_server_details() {
        let details: ServerDetails = normalize(DETAILS.as_bytes()).unwrap();

        assert_eq!(details.uuid(), "0077fa3d-32db-4b09-9f5f-30d9e9afb565");
        assert_eq!(details.state(), ServerState::Started);
        assert_eq!(details.server.core_number, 2);
        assert_eq!(details.server.memory_amount, 2048);
        assert_eq!(details.server.tags, ["DEV"]);
        assert!(details.firewall);
        assert!(!details.metadata);
        assert_eq!(details.host, 7_653_311_107);
        assert_eq!(details.ip_addresses.len(), 2);
        assert_eq!(details.ip_addresses[1].address, "94.237.0.1");
        assert!(details.ip_addresses[1].part_of_plan);
        assert_eq!(details.labels[0].key, "env");
        assert_eq!(details.storage_devices[0].boot_disk, 1);
        assert_eq!(details.storage_devices[0].storage_size, 30);
    }

    #[test]
    fn bad_boot_disk_in_storage_device_reports_the_value() {
        let raw = DETAILS.replace(r#""boot_disk": "1""#, r#""boot_disk": "first""#);
        match normalize::<ServerDetails>(raw.as_bytes()) {
            Err(Error::Deserialization { source, .. }) => {
                let cause = source.to_string();
                assert!(cause.contains("invalid integer string"), "{cause}");
                assert!(cause.contains("first"), "{cause}");
            }
            other => panic!("expected Deserialization error, got: {other:?}"),
        }
    }

    #[test]
    fn storage_device_lookup() {
        let details: ServerDetails = normalize(DETAILS.as_bytes()).unwrap();

        let device = details
            .storage_device("012580a1-32a1-466e-a323-689ca16f2d43")
            .unwrap();
        assert_eq!(device.address, "virtio:0");
        assert!(details.storage_device("missing").is_none());
    }

    #[test]
    fn details_round_trip_through_envelope() {
        let details: ServerDetails = normalize(DETAILS.as_bytes()).unwrap();
        let raw = serde_json::to_vec(&wrap("server", &details)).unwrap();
        let again: ServerDetails = normalize(&raw).unwrap();
        assert_eq!(again, details);
    }

    #[test]
    fn unknown_state_does_not_fail_decoding() {
        let raw = br#"{"servers": {"server": [
            {"uuid": "a", "state": "started"},
            {"uuid": "b", "state": "hibernating"}
        ]}}"#;
        let servers: Vec<Server> = normalize_list(raw).unwrap();
        assert_eq!(servers[0].state, ServerState::Started);
        assert_eq!(servers[1].state, ServerState::Unknown);
    }

    #[test]
    fn server_state_parses_from_cli_strings() {
        assert_eq!("maintenance".parse::<ServerState>().unwrap(), ServerState::Maintenance);
        assert_eq!(ServerState::Stopped.to_string(), "stopped");
    }
}
