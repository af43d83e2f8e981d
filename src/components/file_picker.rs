use async_trait::async_trait;
use dioxus::html::FileData;
use tracing::debug;

use crate::upload::assets::{DocumentRequest, ImageRequest};
use crate::upload::{Asset, HostPicker, PickTarget, PickerError};

/// Files chosen through an `<input type="file">`, served through the picker
/// interface. An empty selection reads as a dismissed picker.
pub struct SelectedFiles(pub Vec<FileData>);

impl SelectedFiles {
    async fn first_asset(&self, target: PickTarget) -> Result<Option<Asset>, PickerError> {
        let Some(file) = self.0.first() else {
            return Ok(None);
        };
        let name = file.name();
        let bytes = file.read_bytes().await.map_err(|e| PickerError::Io {
            target,
            message: e.to_string(),
        })?;
        debug!(%name, size = bytes.len(), "read picked file");
        let mime_type = file.content_type().filter(|mime| !mime.trim().is_empty());
        Ok(Some(Asset::from_bytes(name, mime_type, bytes.to_vec())))
    }
}

#[async_trait(?Send)]
impl HostPicker for SelectedFiles {
    async fn pick_document(
        &self,
        request: &DocumentRequest,
    ) -> Result<Option<Asset>, PickerError> {
        debug!(filter = request.type_filter, "document pick");
        self.first_asset(PickTarget::Media).await
    }

    async fn pick_image(&self, request: &ImageRequest) -> Result<Option<Asset>, PickerError> {
        debug!(quality = request.quality, "image pick");
        self.first_asset(PickTarget::Cover).await
    }
}
