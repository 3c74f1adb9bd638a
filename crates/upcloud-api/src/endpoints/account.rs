// Account, zone and server size endpoints

use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::{Account, ServerConfiguration, Zone};
use crate::transport::Transport;
use crate::wait::Clock;

impl<T: Transport, C: Clock> Client<T, C> {
    /// The account the credentials belong to.
    ///
    /// `GET /account`
    pub async fn get_account(&self) -> Result<Account, Error> {
        debug!("fetching account");
        self.get("account").await
    }

    /// Available zones.
    ///
    /// `GET /zone`
    pub async fn get_zones(&self) -> Result<Vec<Zone>, Error> {
        self.get_list("zone").await
    }

    /// Allowed CPU/memory combinations for custom server sizes.
    ///
    /// `GET /server_size`
    pub async fn get_server_configurations(&self) -> Result<Vec<ServerConfiguration>, Error> {
        self.get_list("server_size").await
    }
}
