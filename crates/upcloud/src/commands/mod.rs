//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod account;
pub mod config_cmd;
pub mod firewall;
pub mod ip;
pub mod servers;
pub mod storage;
pub mod util;

use upcloud_api::Client;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Account => account::account(client, global).await,
        Command::Zones => account::zones(client, global).await,
        Command::Sizes => account::sizes(client, global).await,
        Command::Servers(args) => servers::handle(client, args, global).await,
        Command::Storage(args) => storage::handle(client, args, global).await,
        Command::Ip(args) => ip::handle(client, args, global).await,
        Command::Firewall(args) => firewall::handle(client, args, global).await,
        // Config and Completions are handled before a client is built
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
