use std::rc::Rc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use super::assets::{CoverAsset, MediaAsset};
use super::error::UploadError;
use super::flight::{FlightPermit, SingleFlight};
use super::metadata::UploadMetadata;
use super::payload::UploadPayload;
use crate::api::models::UploadAck;
use crate::diagnostics::log_perf;

/// Delivers one payload to the upload endpoint and waits for a terminal answer.
#[async_trait(?Send)]
pub trait UploadTransport {
    async fn send(&self, payload: UploadPayload) -> Result<UploadAck, UploadError>;
}

/// Single-flight submission of the form's payload.
#[derive(Clone)]
pub struct UploadSubmitter {
    transport: Rc<dyn UploadTransport>,
    flight: SingleFlight,
}

impl UploadSubmitter {
    pub fn new(transport: Rc<dyn UploadTransport>) -> Self {
        Self {
            transport,
            flight: SingleFlight::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.flight.is_busy()
    }

    /// Claims the flight slot and freezes the payload. `loading` stays true
    /// until the returned upload is sent (or dropped).
    pub fn reserve(
        &self,
        media: Option<&MediaAsset>,
        cover: Option<&CoverAsset>,
        metadata: &UploadMetadata,
    ) -> Result<ReservedUpload, UploadError> {
        let permit = self.flight.try_acquire().ok_or(UploadError::Busy)?;
        let payload = UploadPayload::build(media, cover, metadata)?;
        Ok(ReservedUpload {
            transport: self.transport.clone(),
            payload,
            permit,
        })
    }

    pub async fn submit(
        &self,
        media: &MediaAsset,
        cover: Option<&CoverAsset>,
        metadata: &UploadMetadata,
    ) -> Result<UploadAck, UploadError> {
        self.reserve(Some(media), cover, metadata)?.send().await
    }
}

/// An upload that holds the flight slot but has not been sent yet.
pub struct ReservedUpload {
    transport: Rc<dyn UploadTransport>,
    payload: UploadPayload,
    permit: FlightPermit,
}

impl ReservedUpload {
    pub fn payload(&self) -> &UploadPayload {
        &self.payload
    }

    /// Performs the single network call. There is no retry.
    pub async fn send(self) -> Result<UploadAck, UploadError> {
        let ReservedUpload {
            transport,
            payload,
            permit,
        } = self;
        let started_at = Utc::now();
        let title = payload.title.clone();
        info!(%title, has_cover = payload.cover.is_some(), "upload started");

        let result = transport.send(payload).await;
        drop(permit);

        match &result {
            Ok(ack) => log_perf(
                "upload",
                started_at,
                &format!("title={title} id={}", ack.id.as_deref().unwrap_or("-")),
            ),
            Err(err) => warn!(%title, %err, "upload failed"),
        }
        result
    }
}
