// Storage endpoints
//
// Covers disks, CD-ROMs, templates and backups, plus attaching storages to
// servers. Attach/detach and CD-ROM operations are addressed through the
// server and return the server's details.

use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::{ServerDetails, Storage, StorageDetails};
use crate::requests::{
    AttachStorageRequest, CloneStorageRequest, CreateBackupRequest, CreateStorageRequest,
    DetachStorageRequest, LoadCdromRequest, ModifyStorageRequest, StorageFilter,
    TemplatizeStorageRequest, WaitForStorageStateRequest,
};
use crate::transport::Transport;
use crate::wait::{Clock, wait_for_state};

impl<T: Transport, C: Clock> Client<T, C> {
    /// `GET /storage[/{access|type|favorite}]`
    pub async fn get_storages(&self, filter: StorageFilter) -> Result<Vec<Storage>, Error> {
        self.get_list(&filter.path()).await
    }

    /// `GET /storage/{uuid}`
    pub async fn get_storage_details(&self, uuid: &str) -> Result<StorageDetails, Error> {
        self.get(&format!("storage/{uuid}")).await
    }

    /// `POST /storage`
    pub async fn create_storage(
        &self,
        req: &CreateStorageRequest,
    ) -> Result<StorageDetails, Error> {
        debug!(zone = %req.zone, size = req.size, "creating storage");
        self.post("storage", "storage", req).await
    }

    /// `PUT /storage/{uuid}`
    pub async fn modify_storage(
        &self,
        req: &ModifyStorageRequest,
    ) -> Result<StorageDetails, Error> {
        debug!(uuid = %req.uuid, "modifying storage");
        self.put(&format!("storage/{}", req.uuid), "storage", req).await
    }

    /// `DELETE /storage/{uuid}`
    pub async fn delete_storage(&self, uuid: &str) -> Result<(), Error> {
        debug!(uuid, "deleting storage");
        self.delete(&format!("storage/{uuid}")).await
    }

    // ── Server attachment ────────────────────────────────────────────

    /// `POST /server/{uuid}/storage/attach`
    pub async fn attach_storage(&self, req: &AttachStorageRequest) -> Result<ServerDetails, Error> {
        debug!(server = %req.server_uuid, storage = ?req.storage_uuid, "attaching storage");
        self.post(
            &format!("server/{}/storage/attach", req.server_uuid),
            "storage_device",
            req,
        )
        .await
    }

    /// `POST /server/{uuid}/storage/detach`
    pub async fn detach_storage(&self, req: &DetachStorageRequest) -> Result<ServerDetails, Error> {
        debug!(server = %req.server_uuid, address = %req.address, "detaching storage");
        self.post(
            &format!("server/{}/storage/detach", req.server_uuid),
            "storage_device",
            req,
        )
        .await
    }

    /// Insert a CD-ROM image into the server's CD-ROM drive.
    ///
    /// `POST /server/{uuid}/cdrom/load`
    pub async fn load_cdrom(&self, req: &LoadCdromRequest) -> Result<ServerDetails, Error> {
        debug!(server = %req.server_uuid, storage = %req.storage_uuid, "loading cd-rom");
        self.post(
            &format!("server/{}/cdrom/load", req.server_uuid),
            "storage_device",
            req,
        )
        .await
    }

    /// `POST /server/{uuid}/cdrom/eject`
    pub async fn eject_cdrom(&self, server_uuid: &str) -> Result<ServerDetails, Error> {
        debug!(server = server_uuid, "ejecting cd-rom");
        self.post_empty(&format!("server/{server_uuid}/cdrom/eject")).await
    }

    // ── Copies ───────────────────────────────────────────────────────

    /// `POST /storage/{uuid}/clone`
    pub async fn clone_storage(&self, req: &CloneStorageRequest) -> Result<StorageDetails, Error> {
        debug!(uuid = %req.uuid, zone = %req.zone, "cloning storage");
        self.post(&format!("storage/{}/clone", req.uuid), "storage", req).await
    }

    /// Turn a storage into a template. The source must not be attached to a
    /// running server.
    ///
    /// `POST /storage/{uuid}/templatize`
    pub async fn templatize_storage(
        &self,
        req: &TemplatizeStorageRequest,
    ) -> Result<StorageDetails, Error> {
        debug!(uuid = %req.uuid, "templatizing storage");
        self.post(&format!("storage/{}/templatize", req.uuid), "storage", req).await
    }

    /// Returns the details of the new backup storage.
    ///
    /// `POST /storage/{uuid}/backup`
    pub async fn create_backup(&self, req: &CreateBackupRequest) -> Result<StorageDetails, Error> {
        debug!(uuid = %req.uuid, "creating backup");
        self.post(&format!("storage/{}/backup", req.uuid), "storage", req).await
    }

    /// Restore a backup over the storage it was taken from.
    ///
    /// `POST /storage/{uuid}/restore`
    pub async fn restore_backup(&self, backup_uuid: &str) -> Result<(), Error> {
        debug!(uuid = backup_uuid, "restoring backup");
        self.post_no_content(&format!("storage/{backup_uuid}/restore")).await
    }

    /// Poll the storage until it reaches (or leaves) the requested state.
    pub async fn wait_for_storage_state(
        &self,
        req: &WaitForStorageStateRequest,
    ) -> Result<StorageDetails, Error> {
        let target = req.target()?;
        let resource = format!("storage {}", req.uuid);
        wait_for_state(
            &resource,
            target,
            req.timeout,
            self.poll_config(),
            self.clock(),
            || self.get_storage_details(&req.uuid),
        )
        .await
    }
}
