// Firewall rule endpoints
//
// Rules belong to a server and are addressed by their 1-based position.

use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::FirewallRule;
use crate::requests::CreateFirewallRuleRequest;
use crate::transport::Transport;
use crate::wait::Clock;

impl<T: Transport, C: Clock> Client<T, C> {
    /// `GET /server/{uuid}/firewall_rule`
    pub async fn get_firewall_rules(&self, server_uuid: &str) -> Result<Vec<FirewallRule>, Error> {
        self.get_list(&format!("server/{server_uuid}/firewall_rule")).await
    }

    /// `GET /server/{uuid}/firewall_rule/{position}`
    pub async fn get_firewall_rule_details(
        &self,
        server_uuid: &str,
        position: u32,
    ) -> Result<FirewallRule, Error> {
        self.get(&format!("server/{server_uuid}/firewall_rule/{position}")).await
    }

    /// `POST /server/{uuid}/firewall_rule`
    pub async fn create_firewall_rule(
        &self,
        req: &CreateFirewallRuleRequest,
    ) -> Result<FirewallRule, Error> {
        debug!(server = %req.server_uuid, position = req.rule.position, "creating firewall rule");
        self.post(
            &format!("server/{}/firewall_rule", req.server_uuid),
            "firewall_rule",
            &req.rule,
        )
        .await
    }

    /// `DELETE /server/{uuid}/firewall_rule/{position}`
    pub async fn delete_firewall_rule(
        &self,
        server_uuid: &str,
        position: u32,
    ) -> Result<(), Error> {
        debug!(server = server_uuid, position, "deleting firewall rule");
        self.delete(&format!("server/{server_uuid}/firewall_rule/{position}")).await
    }
}
