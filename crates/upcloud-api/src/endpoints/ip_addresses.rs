// IP address endpoints
//
// Addresses are identified by the address itself, not a UUID.

use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::IpAddress;
use crate::requests::{AssignIpAddressRequest, ModifyIpAddressRequest};
use crate::transport::Transport;
use crate::wait::Clock;

impl<T: Transport, C: Clock> Client<T, C> {
    /// `GET /ip_address`
    pub async fn get_ip_addresses(&self) -> Result<Vec<IpAddress>, Error> {
        self.get_list("ip_address").await
    }

    /// `GET /ip_address/{address}`
    pub async fn get_ip_address_details(&self, address: &str) -> Result<IpAddress, Error> {
        self.get(&format!("ip_address/{address}")).await
    }

    /// Assign an additional address to a server.
    ///
    /// `POST /ip_address`
    pub async fn assign_ip_address(
        &self,
        req: &AssignIpAddressRequest,
    ) -> Result<IpAddress, Error> {
        debug!(server = %req.server_uuid, family = %req.family, "assigning ip address");
        self.post("ip_address", "ip_address", req).await
    }

    /// Change the reverse DNS record of an address.
    ///
    /// `PUT /ip_address/{address}`
    pub async fn modify_ip_address(
        &self,
        req: &ModifyIpAddressRequest,
    ) -> Result<IpAddress, Error> {
        debug!(address = %req.address, "modifying ip address");
        self.put(&format!("ip_address/{}", req.address), "ip_address", req).await
    }

    /// `DELETE /ip_address/{address}`
    pub async fn release_ip_address(&self, address: &str) -> Result<(), Error> {
        debug!(address, "releasing ip address");
        self.delete(&format!("ip_address/{address}")).await
    }
}
