//! Content packaging: two strictly sequential content-addressed uploads.
//!
//! The image goes up first; the metadata object references the image's
//! content address, so it can only be built and uploaded afterwards.
//! Either upload failing fails the whole operation — no partial metadata
//! URI is ever returned.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{WorkflowError, WorkflowResult};
use crate::form::IssuanceForm;
use crate::metadata::{ipfs_uri, MetadataObject, METADATA_FILENAME};
use certibadge_core::{ContentStore, GatewayError};

/// A badge image attached to the draft, keeping its original filename —
/// the filename becomes part of the image's content address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeImage {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl BadgeImage {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
        }
    }
}

/// Result of a successful packaging run.
#[derive(Debug, Clone)]
pub struct PackagedMetadata {
    /// `ipfs://<metaCid>/metadata.json`
    pub metadata_uri: String,
    /// `ipfs://<imageCid>/<originalFilename>`
    pub image_uri: String,
    pub metadata: MetadataObject,
}

pub struct ContentPackager {
    store: Arc<dyn ContentStore>,
}

impl ContentPackager {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Upload the image, build the metadata object referencing it, upload
    /// the metadata. Requires an attached image; nothing is uploaded
    /// otherwise.
    pub async fn package_and_upload(
        &self,
        image: Option<&BadgeImage>,
        form: &IssuanceForm,
    ) -> WorkflowResult<PackagedMetadata> {
        let image = image.ok_or(WorkflowError::MissingImage)?;

        let image_cid = self
            .store
            .upload(&image.bytes, &image.filename)
            .await
            .map_err(WorkflowError::Upload)?;
        let image_uri = ipfs_uri(&image_cid, &image.filename);
        debug!(cid = %image_cid, "badge image uploaded");

        let metadata = MetadataObject::for_badge(
            &image_uri,
            &form.course_id,
            &form.issued_by,
            &form.issued_date,
        );
        let metadata_bytes = metadata
            .to_canonical_json()
            .map_err(|e| WorkflowError::Upload(GatewayError::Serialization(e.to_string())))?;

        let meta_cid = self
            .store
            .upload(&metadata_bytes, METADATA_FILENAME)
            .await
            .map_err(WorkflowError::Upload)?;
        let metadata_uri = ipfs_uri(&meta_cid, METADATA_FILENAME);
        info!(metadata_uri = %metadata_uri, "badge metadata uploaded");

        Ok(PackagedMetadata {
            metadata_uri,
            image_uri,
            metadata,
        })
    }
}
