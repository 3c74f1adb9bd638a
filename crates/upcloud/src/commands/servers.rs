//! Server command handlers.

use std::time::Duration;

use tokio::time::Instant;

use tabled::Tabled;
use upcloud_api::Client;
use upcloud_api::models::{Server, ServerDetails, ServerState, StopType};
use upcloud_api::requests::{
    RestartServerRequest, StartServerRequest, StopServerRequest, WaitForServerStateRequest,
};

use crate::cli::{GlobalOpts, ServersArgs, ServersCommand, WaitArgs};
use crate::error::{self, CliError};
use crate::output::{self, Painter};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "State")]
    state: String,
}

impl ServerRow {
    fn new(s: &Server, painter: Painter) -> Self {
        Self {
            uuid: s.uuid.clone(),
            hostname: s.hostname.clone(),
            title: s.title.clone(),
            zone: s.zone.clone(),
            plan: util::or_dash(&s.plan),
            state: painter.state(s.state.as_ref()),
        }
    }
}

fn detail(d: &ServerDetails) -> String {
    let s = &d.server;
    let ips = d
        .ip_addresses
        .iter()
        .map(|ip| format!("{} ({} {})", ip.address, ip.access, ip.family))
        .collect::<Vec<_>>()
        .join(", ");
    let storages = d
        .storage_devices
        .iter()
        .map(|dev| format!("{} {} ({} GiB)", dev.address, dev.uuid, dev.storage_size))
        .collect::<Vec<_>>()
        .join(", ");

    output::detail_block(&[
        ("UUID", s.uuid.clone()),
        ("Title", s.title.clone()),
        ("Hostname", s.hostname.clone()),
        ("Zone", s.zone.clone()),
        ("Plan", s.plan.clone()),
        ("Cores", s.core_number.to_string()),
        ("Memory", format!("{} MiB", s.memory_amount)),
        ("State", s.state.to_string()),
        ("Firewall", if d.firewall { "on" } else { "off" }.into()),
        ("Tags", s.tags.join(", ")),
        ("IPs", ips),
        ("Storage", storages),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &Client,
    args: ServersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ServersCommand::List => {
            let servers = client.get_servers().await?;
            let painter = Painter::new(&global.color);
            let out = output::render_list(
                &global.output,
                &servers,
                |s| ServerRow::new(s, painter),
                |s| s.uuid.clone(),
            )?;
            output::print_output(&out, global.quiet)
        }

        ServersCommand::Get { uuid } => {
            let details = client
                .get_server_details(&uuid)
                .await
                .map_err(|e| error::not_found(e, "server", &uuid, "servers list"))?;
            print_details(&details, global)
        }

        ServersCommand::Start {
            uuid,
            wait,
            wait_args,
        } => {
            let details = client
                .start_server(&StartServerRequest {
                    uuid: uuid.clone(),
                    ..StartServerRequest::default()
                })
                .await
                .map_err(|e| error::not_found(e, "server", &uuid, "servers list"))?;
            util::status("Server starting", global.quiet);
            let wait = wait.then_some(&wait_args);
            finish(client, details, wait, ServerState::Started, global).await
        }

        ServersCommand::Stop {
            uuid,
            hard,
            stop_timeout,
            wait,
            wait_args,
        } => {
            let details = client
                .stop_server(&StopServerRequest {
                    uuid: uuid.clone(),
                    stop_type: stop_type(hard),
                    timeout: stop_timeout.map(Duration::from_secs),
                })
                .await
                .map_err(|e| error::not_found(e, "server", &uuid, "servers list"))?;
            util::status("Server stopping", global.quiet);
            let wait = wait.then_some(&wait_args);
            finish(client, details, wait, ServerState::Stopped, global).await
        }

        ServersCommand::Restart {
            uuid,
            hard,
            stop_timeout,
            wait,
            wait_args,
        } => {
            let details = client
                .restart_server(&RestartServerRequest {
                    uuid: uuid.clone(),
                    stop_type: stop_type(hard),
                    timeout: stop_timeout.map(Duration::from_secs),
                    ..RestartServerRequest::default()
                })
                .await
                .map_err(|e| error::not_found(e, "server", &uuid, "servers list"))?;
            util::status("Server restarting", global.quiet);
            let details = if wait {
                settle_restart(client, details, wait_args.wait_timeout).await?
            } else {
                details
            };
            print_details(&details, global)
        }

        ServersCommand::Delete { uuid } => {
            if !util::confirm(
                &format!("Delete server '{uuid}'? Its storages are kept."),
                "servers delete",
                global.yes,
            )? {
                return Ok(());
            }
            client
                .delete_server(&uuid)
                .await
                .map_err(|e| error::not_found(e, "server", &uuid, "servers list"))?;
            util::status("Server deleted", global.quiet);
            Ok(())
        }

        ServersCommand::Wait {
            uuid,
            state,
            leave,
            wait_args,
        } => {
            let details = wait_for(
                client,
                &uuid,
                state.map(Into::into),
                leave.map(Into::into),
                wait_args.wait_timeout,
            )
            .await?;
            print_details(&details, global)
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Longest a restart wait looks for the server to go down.
const RESTART_GRACE: Duration = Duration::from_secs(30);

fn stop_type(hard: bool) -> StopType {
    if hard { StopType::Hard } else { StopType::Soft }
}

/// Print the server after a lifecycle operation, first waiting for it to
/// reach `settled` when `--wait` was given.
async fn finish(
    client: &Client,
    details: ServerDetails,
    wait: Option<&WaitArgs>,
    settled: ServerState,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let details = match wait {
        Some(wait_args) => {
            let uuid = details.uuid().to_owned();
            wait_for(client, &uuid, Some(settled), None, wait_args.wait_timeout).await?
        }
        None => details,
    };
    print_details(&details, global)
}

/// Wait for a restarted server to come back up.
///
/// A server that still reports `started` right after the restart call has
/// not gone down yet, so the wait first looks for it to leave `started`.
/// That phase is capped at [`RESTART_GRACE`]: a restart fast enough to fall
/// between two polls is never observed, and the wait then settles on the
/// server simply being `started`.
async fn settle_restart(
    client: &Client,
    details: ServerDetails,
    timeout: Duration,
) -> Result<ServerDetails, CliError> {
    let begun = Instant::now();
    let uuid = details.uuid().to_owned();

    if details.state() == ServerState::Started {
        let grace = RESTART_GRACE.min(timeout);
        match wait_for(client, &uuid, None, Some(ServerState::Started), grace).await {
            Ok(_) => {}
            Err(CliError::Timeout { .. }) => {
                tracing::debug!(%uuid, "restart not observed, assuming it already finished");
            }
            Err(e) => return Err(e),
        }
    }

    let remaining = timeout.saturating_sub(begun.elapsed());
    wait_for(client, &uuid, Some(ServerState::Started), None, remaining).await
}

async fn wait_for(
    client: &Client,
    uuid: &str,
    desired_state: Option<ServerState>,
    undesired_state: Option<ServerState>,
    timeout: Duration,
) -> Result<ServerDetails, CliError> {
    let details = client
        .wait_for_server_state(&WaitForServerStateRequest {
            uuid: uuid.to_owned(),
            desired_state,
            undesired_state,
            timeout,
        })
        .await
        .map_err(|e| error::not_found(e, "server", uuid, "servers list"))?;
    Ok(details)
}

fn print_details(details: &ServerDetails, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, details, detail, |d| d.uuid().to_owned())?;
    output::print_output(&out, global.quiet)
}
