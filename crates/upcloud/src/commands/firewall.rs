//! Firewall rule command handlers.

use tabled::Tabled;
use upcloud_api::Client;
use upcloud_api::models::FirewallRule;

use crate::cli::{FirewallArgs, FirewallCommand, GlobalOpts};
use crate::error::{self, CliError};
use crate::output;

use super::util;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Pos")]
    position: u32,
    #[tabled(rename = "Direction")]
    direction: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Comment")]
    comment: String,
}

impl From<&FirewallRule> for RuleRow {
    fn from(r: &FirewallRule) -> Self {
        Self {
            position: r.position,
            direction: r.direction.clone(),
            action: r.action.clone(),
            protocol: util::or_dash(&r.protocol),
            source: endpoint(
                &r.source_address_start,
                &r.source_address_end,
                &r.source_port_start,
                &r.source_port_end,
            ),
            destination: endpoint(
                &r.destination_address_start,
                &r.destination_address_end,
                &r.destination_port_start,
                &r.destination_port_end,
            ),
            comment: r.comment.clone(),
        }
    }
}

/// `start-end:port-port`, collapsing equal bounds and empty parts.
fn endpoint(addr_start: &str, addr_end: &str, port_start: &str, port_end: &str) -> String {
    let addrs = range(addr_start, addr_end);
    let ports = range(port_start, port_end);
    match (addrs.is_empty(), ports.is_empty()) {
        (true, true) => "any".into(),
        (false, true) => addrs,
        (true, false) => format!("*:{ports}"),
        (false, false) => format!("{addrs}:{ports}"),
    }
}

fn range(start: &str, end: &str) -> String {
    if end.is_empty() || start == end {
        start.to_owned()
    } else {
        format!("{start}-{end}")
    }
}

fn detail(r: &FirewallRule) -> String {
    output::detail_block(&[
        ("Position", r.position.to_string()),
        ("Direction", r.direction.clone()),
        ("Action", r.action.clone()),
        ("Family", r.family.clone()),
        ("Protocol", r.protocol.clone()),
        ("ICMP type", r.icmp_type.clone()),
        (
            "Source",
            endpoint(
                &r.source_address_start,
                &r.source_address_end,
                &r.source_port_start,
                &r.source_port_end,
            ),
        ),
        (
            "Destination",
            endpoint(
                &r.destination_address_start,
                &r.destination_address_end,
                &r.destination_port_start,
                &r.destination_port_end,
            ),
        ),
        ("Comment", r.comment.clone()),
    ])
}

pub async fn handle(
    client: &Client,
    args: FirewallArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FirewallCommand::List { server } => {
            let rules = client
                .get_firewall_rules(&server)
                .await
                .map_err(|e| error::not_found(e, "server", &server, "servers list"))?;
            let out = output::render_list(
                &global.output,
                &rules,
                |r| RuleRow::from(r),
                |r| r.position.to_string(),
            )?;
            output::print_output(&out, global.quiet)
        }

        FirewallCommand::Get { server, position } => {
            let rule = client
                .get_firewall_rule_details(&server, position)
                .await
                .map_err(|e| {
                    error::not_found(
                        e,
                        "firewall rule",
                        &position.to_string(),
                        &format!("firewall list {server}"),
                    )
                })?;
            let out =
                output::render_single(&global.output, &rule, detail, |r| r.position.to_string())?;
            output::print_output(&out, global.quiet)
        }

        FirewallCommand::Delete { server, position } => {
            if !util::confirm(
                &format!("Delete firewall rule {position} of server '{server}'?"),
                "firewall delete",
                global.yes,
            )? {
                return Ok(());
            }
            client
                .delete_firewall_rule(&server, position)
                .await
                .map_err(|e| {
                    error::not_found(
                        e,
                        "firewall rule",
                        &position.to_string(),
                        &format!("firewall list {server}"),
                    )
                })?;
            util::status("Firewall rule deleted", global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_collapses_ranges() {
        assert_eq!(endpoint("", "", "", ""), "any");
        assert_eq!(endpoint("10.0.0.1", "10.0.0.1", "22", "22"), "10.0.0.1:22");
        assert_eq!(endpoint("10.0.0.1", "10.0.0.9", "", ""), "10.0.0.1-10.0.0.9");
        assert_eq!(endpoint("", "", "80", "443"), "*:80-443");
    }
}
