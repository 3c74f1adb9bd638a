// Server endpoints
//
// Lifecycle operations return the full server details as reported right
// after the request was accepted; the server is typically still in
// `maintenance` at that point. Use `wait_for_server_state` to block until
// the transition finishes.

use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::{Server, ServerDetails};
use crate::requests::{
    CreateServerRequest, ModifyServerRequest, RestartServerRequest, StartServerRequest,
    StopServerRequest, WaitForServerStateRequest,
};
use crate::transport::Transport;
use crate::wait::{Clock, wait_for_state};

impl<T: Transport, C: Clock> Client<T, C> {
    /// List all servers of the account.
    ///
    /// `GET /server`
    pub async fn get_servers(&self) -> Result<Vec<Server>, Error> {
        self.get_list("server").await
    }

    /// `GET /server/{uuid}`
    pub async fn get_server_details(&self, uuid: &str) -> Result<ServerDetails, Error> {
        self.get(&format!("server/{uuid}")).await
    }

    /// Create (and start) a server.
    ///
    /// `POST /server`
    pub async fn create_server(&self, req: &CreateServerRequest) -> Result<ServerDetails, Error> {
        debug!(zone = %req.zone, title = %req.title, "creating server");
        self.post("server", "server", req).await
    }

    /// `PUT /server/{uuid}`
    pub async fn modify_server(&self, req: &ModifyServerRequest) -> Result<ServerDetails, Error> {
        debug!(uuid = %req.uuid, "modifying server");
        self.put(&format!("server/{}", req.uuid), "server", req).await
    }

    /// `POST /server/{uuid}/start`
    pub async fn start_server(&self, req: &StartServerRequest) -> Result<ServerDetails, Error> {
        debug!(uuid = %req.uuid, "starting server");
        self.post(&format!("server/{}/start", req.uuid), "server", req).await
    }

    /// `POST /server/{uuid}/stop`
    pub async fn stop_server(&self, req: &StopServerRequest) -> Result<ServerDetails, Error> {
        debug!(uuid = %req.uuid, stop_type = %req.stop_type, "stopping server");
        self.post(&format!("server/{}/stop", req.uuid), "stop_server", req).await
    }

    /// `POST /server/{uuid}/restart`
    pub async fn restart_server(&self, req: &RestartServerRequest) -> Result<ServerDetails, Error> {
        debug!(uuid = %req.uuid, stop_type = %req.stop_type, "restarting server");
        self.post(&format!("server/{}/restart", req.uuid), "restart_server", req).await
    }

    /// Delete a stopped server. Attached storages are kept.
    ///
    /// `DELETE /server/{uuid}`
    pub async fn delete_server(&self, uuid: &str) -> Result<(), Error> {
        debug!(uuid, "deleting server");
        self.delete(&format!("server/{uuid}")).await
    }

    /// Poll the server until it reaches (or leaves) the requested state.
    ///
    /// Fails fast with [`Error::InvalidWaitRequest`] unless exactly one of
    /// `desired_state` and `undesired_state` is set.
    pub async fn wait_for_server_state(
        &self,
        req: &WaitForServerStateRequest,
    ) -> Result<ServerDetails, Error> {
        let target = req.target()?;
        let resource = format!("server {}", req.uuid);
        wait_for_state(
            &resource,
            target,
            req.timeout,
            self.poll_config(),
            self.clock(),
            || self.get_server_details(&req.uuid),
        )
        .await
    }
}
