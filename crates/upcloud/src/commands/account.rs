//! Account, zone and server size handlers.

use tabled::Tabled;
use upcloud_api::Client;
use upcloud_api::models::{Account, ServerConfiguration, Zone};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Public")]
    public: String,
}

impl From<&Zone> for ZoneRow {
    fn from(z: &Zone) -> Self {
        Self {
            id: z.id.clone(),
            description: z.description.clone(),
            public: if z.public { "yes" } else { "no" }.into(),
        }
    }
}

#[derive(Tabled)]
struct SizeRow {
    #[tabled(rename = "Cores")]
    cores: u32,
    #[tabled(rename = "Memory (MiB)")]
    memory: u32,
}

impl From<&ServerConfiguration> for SizeRow {
    fn from(c: &ServerConfiguration) -> Self {
        Self {
            cores: c.core_number,
            memory: c.memory_amount,
        }
    }
}

fn detail(a: &Account) -> String {
    output::detail_block(&[
        ("Username", a.username.clone()),
        ("Credits", format!("{:.2}", a.credits)),
    ])
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn account(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let account = client.get_account().await?;
    let out = output::render_single(&global.output, &account, detail, |a| a.username.clone())?;
    output::print_output(&out, global.quiet)
}

pub async fn zones(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let zones = client.get_zones().await?;
    let out = output::render_list(&global.output, &zones, |z| ZoneRow::from(z), |z| z.id.clone())?;
    output::print_output(&out, global.quiet)
}

pub async fn sizes(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let sizes = client.get_server_configurations().await?;
    let out = output::render_list(&global.output, &sizes, |c| SizeRow::from(c), |c| {
        format!("{}xCPU-{}MB", c.core_number, c.memory_amount)
    })?;
    output::print_output(&out, global.quiet)
}
