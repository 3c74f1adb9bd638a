use serde::{Deserialize, Serialize};

use crate::envelope::string_int;

/// A firewall rule of a server, addressed by server UUID and `position`.
///
/// Text fields left empty are omitted from request bodies; the API treats
/// a missing bound as "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallRule {
    /// `accept` or `drop`.
    pub action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub destination_address_end: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub destination_address_start: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub destination_port_end: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub destination_port_start: String,
    /// `in` or `out`.
    pub direction: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub family: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icmp_type: String,
    /// 1-based position in the rule list.
    #[serde(with = "string_int")]
    pub position: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_address_end: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_address_start: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_port_end: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_port_start: String,
}
