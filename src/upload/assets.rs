use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::{PickTarget, PickerError};

/// A file chosen on the host device, pending upload.
///
/// `data` is filled when the host hands over the bytes directly (web file
/// inputs); otherwise `uri` is a local path read at submission time.
#[derive(Clone, PartialEq)]
pub struct Asset {
    pub uri: String,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub data: Option<Arc<[u8]>>,
}

pub type MediaAsset = Asset;
pub type CoverAsset = Asset;

impl Asset {
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            uri: path.into(),
            name: None,
            mime_type: None,
            data: None,
        }
    }

    pub fn from_bytes(name: impl Into<String>, mime_type: Option<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            uri: format!("memory://{name}"),
            name: Some(name),
            mime_type,
            data: Some(Arc::from(data)),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Name shown in the form; falls back to the last path segment.
    pub fn display_name(&self) -> &str {
        if let Some(name) = self.name.as_deref().filter(|name| !name.trim().is_empty()) {
            return name;
        }
        self.uri
            .rsplit(['/', '\\'])
            .find(|segment| !segment.is_empty())
            .unwrap_or(self.uri.as_str())
    }

    fn declared_mime(&self) -> Option<String> {
        self.mime_type
            .as_deref()
            .map(|mime| mime.trim().to_ascii_lowercase())
            .filter(|mime| !mime.is_empty())
    }

    /// Loads the asset contents for the multipart body.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, String> {
        if let Some(data) = &self.data {
            return Ok(data.to_vec());
        }
        read_local(&self.uri).await
    }
}

impl std::fmt::Debug for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Asset")
            .field("uri", &self.uri)
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.as_ref().map(|data| data.len()))
            .finish()
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_local(uri: &str) -> Result<Vec<u8>, String> {
    let path = uri.strip_prefix("file://").unwrap_or(uri);
    tokio::fs::read(path).await.map_err(|e| e.to_string())
}

#[cfg(target_arch = "wasm32")]
async fn read_local(uri: &str) -> Result<Vec<u8>, String> {
    Err(format!("{uri} has no in-memory contents"))
}

/// Document picker request used for the song file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentRequest {
    pub type_filter: &'static str,
    pub copy_to_cache: bool,
}

/// Image picker request used for the cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRequest {
    pub allows_editing: bool,
    pub aspect: (u32, u32),
    pub quality: f32,
}

pub const MEDIA_REQUEST: DocumentRequest = DocumentRequest {
    type_filter: "audio/*",
    copy_to_cache: true,
};

pub const COVER_REQUEST: ImageRequest = ImageRequest {
    allows_editing: true,
    aspect: (1, 1),
    quality: 0.8,
};

/// The host device's file and image pickers. `Ok(None)` means the user
/// dismissed the picker.
#[async_trait(?Send)]
pub trait HostPicker {
    async fn pick_document(&self, request: &DocumentRequest)
        -> Result<Option<Asset>, PickerError>;
    async fn pick_image(&self, request: &ImageRequest) -> Result<Option<Asset>, PickerError>;
}

/// Asks the host for a song file. The result is applied with
/// [`AssetSelector::resolve_media`] once the picker closes.
pub async fn pick_media(picker: &dyn HostPicker) -> Result<Option<MediaAsset>, PickerError> {
    picker.pick_document(&MEDIA_REQUEST).await
}

/// Asks the host for a square cover image.
pub async fn pick_cover(picker: &dyn HostPicker) -> Result<Option<CoverAsset>, PickerError> {
    picker.pick_image(&COVER_REQUEST).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    Selected,
    Cancelled,
}

/// Holds the song and cover picked for the current form session.
#[derive(Debug, Clone, Default)]
pub struct AssetSelector {
    media: Option<MediaAsset>,
    cover: Option<CoverAsset>,
}

impl AssetSelector {
    pub fn media(&self) -> Option<&MediaAsset> {
        self.media.as_ref()
    }

    pub fn cover(&self) -> Option<&CoverAsset> {
        self.cover.as_ref()
    }

    /// Applies a finished media pick. Errors and cancellations leave the
    /// current selection untouched.
    pub fn resolve_media(
        &mut self,
        picked: Result<Option<MediaAsset>, PickerError>,
    ) -> Result<PickOutcome, PickerError> {
        let Some(asset) = accept(PickTarget::Media, picked)? else {
            return Ok(PickOutcome::Cancelled);
        };
        debug!(uri = %asset.uri, "song selected");
        self.media = Some(asset);
        Ok(PickOutcome::Selected)
    }

    pub fn resolve_cover(
        &mut self,
        picked: Result<Option<CoverAsset>, PickerError>,
    ) -> Result<PickOutcome, PickerError> {
        let Some(asset) = accept(PickTarget::Cover, picked)? else {
            return Ok(PickOutcome::Cancelled);
        };
        debug!(uri = %asset.uri, "cover selected");
        self.cover = Some(asset);
        Ok(PickOutcome::Selected)
    }

    pub fn clear(&mut self) {
        self.media = None;
        self.cover = None;
    }
}

fn accept(
    target: PickTarget,
    picked: Result<Option<Asset>, PickerError>,
) -> Result<Option<Asset>, PickerError> {
    let asset = match picked {
        Ok(Some(asset)) => asset,
        Ok(None) => {
            debug!(?target, "picker dismissed");
            return Ok(None);
        }
        Err(err) => {
            warn!(%err, "picker failed");
            return Err(err);
        }
    };

    if asset.uri.trim().is_empty() {
        warn!(?target, "picker returned an empty reference");
        return Err(PickerError::EmptyReference { target });
    }

    if let Some(mime) = asset.declared_mime() {
        let allowed = match target {
            PickTarget::Media => {
                mime.starts_with("audio/") || mime == "application/octet-stream"
            }
            PickTarget::Cover => mime.starts_with("image/"),
        };
        if !allowed {
            warn!(?target, %mime, "picker returned unsupported type");
            return Err(PickerError::UnsupportedType { target, mime });
        }
    }

    Ok(Some(asset))
}
