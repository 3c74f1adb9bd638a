//! Storage command handlers.

use tabled::Tabled;
use upcloud_api::Client;
use upcloud_api::models::{Storage, StorageDetails};
use upcloud_api::requests::{StorageFilter, WaitForStorageStateRequest};

use crate::cli::{GlobalOpts, StorageArgs, StorageCommand};
use crate::error::{self, CliError};
use crate::output::{self, Painter};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StorageRow {
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    storage_type: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Size (GiB)")]
    size: u64,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "State")]
    state: String,
}

impl StorageRow {
    fn new(s: &Storage, painter: Painter) -> Self {
        Self {
            uuid: s.uuid.clone(),
            title: s.title.clone(),
            storage_type: s.storage_type.clone(),
            tier: util::or_dash(&s.tier),
            size: s.size,
            zone: util::or_dash(&s.zone),
            state: painter.state(s.state.as_ref()),
        }
    }
}

fn detail(d: &StorageDetails) -> String {
    let s = &d.storage;
    let backup_rule = d
        .backup_rule
        .as_ref()
        .map(|r| format!("{} at {}, keep {} days", r.interval, r.time, r.retention))
        .unwrap_or_default();

    output::detail_block(&[
        ("UUID", s.uuid.clone()),
        ("Title", s.title.clone()),
        ("Type", s.storage_type.clone()),
        ("Access", s.access.clone()),
        ("Tier", s.tier.clone()),
        ("Size", format!("{} GiB", s.size)),
        ("Zone", s.zone.clone()),
        ("State", s.state.to_string()),
        ("Servers", d.servers.join(", ")),
        ("Backups", d.backups.join(", ")),
        ("Backup rule", backup_rule),
        ("Origin", d.origin.clone()),
        ("Created", d.created.clone()),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &Client,
    args: StorageArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        StorageCommand::List { filter } => {
            let filter = filter.map_or(StorageFilter::All, Into::into);
            let storages = client.get_storages(filter).await?;
            let painter = Painter::new(&global.color);
            let out = output::render_list(
                &global.output,
                &storages,
                |s| StorageRow::new(s, painter),
                |s| s.uuid.clone(),
            )?;
            output::print_output(&out, global.quiet)
        }

        StorageCommand::Get { uuid } => {
            let details = client
                .get_storage_details(&uuid)
                .await
                .map_err(|e| error::not_found(e, "storage", &uuid, "storage list"))?;
            print_details(&details, global)
        }

        StorageCommand::Delete { uuid } => {
            if !util::confirm(
                &format!("Delete storage '{uuid}'? Its data is lost."),
                "storage delete",
                global.yes,
            )? {
                return Ok(());
            }
            client
                .delete_storage(&uuid)
                .await
                .map_err(|e| error::not_found(e, "storage", &uuid, "storage list"))?;
            util::status("Storage deleted", global.quiet);
            Ok(())
        }

        StorageCommand::Wait {
            uuid,
            state,
            leave,
            wait_args,
        } => {
            let details = client
                .wait_for_storage_state(&WaitForStorageStateRequest {
                    uuid: uuid.clone(),
                    desired_state: state.map(Into::into),
                    undesired_state: leave.map(Into::into),
                    timeout: wait_args.wait_timeout,
                })
                .await
                .map_err(|e| error::not_found(e, "storage", &uuid, "storage list"))?;
            print_details(&details, global)
        }
    }
}

fn print_details(details: &StorageDetails, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, details, detail, |d| d.uuid().to_owned())?;
    output::print_output(&out, global.quiet)
}
