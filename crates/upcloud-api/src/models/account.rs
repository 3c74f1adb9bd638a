use serde::{Deserialize, Serialize};

use crate::envelope::{string_int, yes_no};

/// The authenticated account, from `GET /account`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// Remaining credits, in hundredths of the account currency.
    pub credits: f64,
    pub username: String,
}

/// A zone (data center), from `GET /zone`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Zone {
    pub id: String,
    pub description: String,
    #[serde(with = "yes_no")]
    pub public: bool,
}

/// A valid CPU/memory combination, from `GET /server_size`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfiguration {
    #[serde(with = "string_int")]
    pub core_number: u32,
    /// Memory in MiB.
    #[serde(with = "string_int")]
    pub memory_amount: u32,
}
