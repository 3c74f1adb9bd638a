//! IP address command handlers.

use tabled::Tabled;
use upcloud_api::Client;
use upcloud_api::models::IpAddress;

use crate::cli::{GlobalOpts, IpArgs, IpCommand};
use crate::error::{self, CliError};
use crate::output;

use super::util;

#[derive(Tabled)]
struct IpRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Access")]
    access: String,
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "PTR")]
    ptr_record: String,
}

impl From<&IpAddress> for IpRow {
    fn from(ip: &IpAddress) -> Self {
        Self {
            address: ip.address.clone(),
            access: ip.access.clone(),
            family: ip.family.clone(),
            server: util::or_dash(&ip.server),
            ptr_record: util::or_dash(&ip.ptr_record),
        }
    }
}

fn detail(ip: &IpAddress) -> String {
    output::detail_block(&[
        ("Address", ip.address.clone()),
        ("Access", ip.access.clone()),
        ("Family", ip.family.clone()),
        ("Server", ip.server.clone()),
        ("PTR", ip.ptr_record.clone()),
        ("MAC", ip.mac.clone()),
        ("Zone", ip.zone.clone()),
        ("Floating", if ip.floating { "yes" } else { "no" }.into()),
        ("Part of plan", if ip.part_of_plan { "yes" } else { "no" }.into()),
    ])
}

pub async fn handle(client: &Client, args: IpArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        IpCommand::List => {
            let ips = client.get_ip_addresses().await?;
            let out = output::render_list(
                &global.output,
                &ips,
                |ip| IpRow::from(ip),
                |ip| ip.address.clone(),
            )?;
            output::print_output(&out, global.quiet)
        }

        IpCommand::Get { address } => {
            let ip = client
                .get_ip_address_details(&address)
                .await
                .map_err(|e| error::not_found(e, "IP address", &address, "ip list"))?;
            let out = output::render_single(&global.output, &ip, detail, |ip| ip.address.clone())?;
            output::print_output(&out, global.quiet)
        }

        IpCommand::Release { address } => {
            if !util::confirm(
                &format!("Release IP address {address}?"),
                "ip release",
                global.yes,
            )? {
                return Ok(());
            }
            client
                .release_ip_address(&address)
                .await
                .map_err(|e| error::not_found(e, "IP address", &address, "ip list"))?;
            util::status("IP address released", global.quiet);
            Ok(())
        }
    }
}
