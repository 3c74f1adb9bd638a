// Endpoint groups, implemented as inherent methods on `Client`.

mod account;
mod firewall;
mod ip_addresses;
mod servers;
mod storage;
