use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::envelope::yes_no;

/// Whether an address is reachable from the internet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IpAddressAccess {
    #[default]
    Public,
    Private,
    Utility,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum IpAddressFamily {
    #[default]
    #[serde(rename = "IPv4")]
    #[strum(to_string = "IPv4")]
    Ipv4,
    #[serde(rename = "IPv6")]
    #[strum(to_string = "IPv6")]
    Ipv6,
}

/// An IP address, from `GET /ip_address` or embedded in server details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpAddress {
    pub access: String,
    pub address: String,
    pub family: String,
    #[serde(with = "yes_no")]
    pub part_of_plan: bool,
    pub ptr_record: String,
    /// UUID of the server the address is attached to.
    pub server: String,
    pub mac: String,
    #[serde(with = "yes_no")]
    pub floating: bool,
    pub zone: String,
}
