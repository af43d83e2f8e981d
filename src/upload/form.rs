use std::rc::Rc;

use tracing::{debug, info, warn};

use super::assets::{AssetSelector, CoverAsset, MediaAsset, PickOutcome};
use super::error::{PickerError, UploadError, ValidationError};
use super::hold::{
    AccentColor, HapticFeedback, HoldController, HoldPhase, HoldRejection, HoldTiming, TimerHost,
    TimerId, TimerSignal,
};
use super::metadata::{Genre, UploadMetadata};
use super::submitter::{ReservedUpload, UploadSubmitter};
use crate::api::models::UploadAck;

/// Signals the form raises to the screen hosting it. The screen owns
/// navigation and alert presentation.
pub trait UploadListener {
    fn on_upload_success(&self, ack: &UploadAck);
    fn on_upload_failure(&self, reason: &UploadError);
    fn on_validation_error(&self, error: ValidationError);
    fn on_picker_error(&self, error: &PickerError);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldStart {
    Started,
    Rejected(HoldRejection),
    Invalid(ValidationError),
}

/// One upload screen's worth of state: picked assets, typed metadata, the
/// hold controller and the single-flight submitter.
///
/// Events arrive one at a time from the host. When a hold completes,
/// [`UploadForm::on_timer`] hands back a [`ReservedUpload`]; the host sends it
/// without holding the form and reports the result through
/// [`UploadForm::settle`].
pub struct UploadForm {
    assets: AssetSelector,
    metadata: UploadMetadata,
    controller: HoldController,
    submitter: UploadSubmitter,
    timers: Box<dyn TimerHost>,
    haptics: Rc<dyn HapticFeedback>,
    listener: Rc<dyn UploadListener>,
}

impl UploadForm {
    pub fn new(
        submitter: UploadSubmitter,
        timers: Box<dyn TimerHost>,
        haptics: Rc<dyn HapticFeedback>,
        listener: Rc<dyn UploadListener>,
        timing: HoldTiming,
    ) -> Self {
        Self {
            assets: AssetSelector::default(),
            metadata: UploadMetadata::default(),
            controller: HoldController::new(timing),
            submitter,
            timers,
            haptics,
            listener,
        }
    }

    pub fn media(&self) -> Option<&MediaAsset> {
        self.assets.media()
    }

    pub fn cover(&self) -> Option<&CoverAsset> {
        self.assets.cover()
    }

    pub fn metadata(&self) -> &UploadMetadata {
        &self.metadata
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.metadata.title = title.into();
    }

    pub fn set_artist_name(&mut self, artist_name: &str) {
        self.metadata.set_artist_name(artist_name);
    }

    pub fn set_genre(&mut self, genre: Option<Genre>) {
        self.metadata.genre = genre;
    }

    pub fn set_timing(&mut self, timing: HoldTiming) {
        self.controller.set_timing(timing);
    }

    pub fn is_loading(&self) -> bool {
        self.submitter.is_loading()
    }

    pub fn phase(&self) -> HoldPhase {
        self.controller.phase()
    }

    pub fn accent(&self) -> AccentColor {
        self.controller.accent()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.metadata.validate_title()?;
        self.assets.media().ok_or(ValidationError::MissingMedia)?;
        Ok(())
    }

    /// Applies a finished host pick; failures are reported to the screen.
    pub fn resolve_media_pick(
        &mut self,
        picked: Result<Option<MediaAsset>, PickerError>,
    ) -> Option<PickOutcome> {
        let result = self.assets.resolve_media(picked);
        self.report_pick(result)
    }

    pub fn resolve_cover_pick(
        &mut self,
        picked: Result<Option<CoverAsset>, PickerError>,
    ) -> Option<PickOutcome> {
        let result = self.assets.resolve_cover(picked);
        self.report_pick(result)
    }

    fn report_pick(&self, result: Result<PickOutcome, PickerError>) -> Option<PickOutcome> {
        match result {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                self.listener.on_picker_error(&err);
                None
            }
        }
    }

    /// Press-and-hold began. An invalid form is refused before any timer or
    /// haptic starts.
    pub fn press_begin(&mut self) -> HoldStart {
        if self.is_loading() {
            debug!("hold ignored while uploading");
            return HoldStart::Rejected(HoldRejection::Busy);
        }
        if let Err(err) = self.validate() {
            debug!(%err, "hold refused");
            self.listener.on_validation_error(err);
            return HoldStart::Invalid(err);
        }
        match self
            .controller
            .press_begin(self.timers.as_mut(), self.haptics.as_ref(), false)
        {
            Ok(()) => HoldStart::Started,
            Err(rejection) => HoldStart::Rejected(rejection),
        }
    }

    pub fn press_end(&mut self) -> bool {
        self.controller
            .press_end(self.timers.as_mut(), self.haptics.as_ref())
    }

    /// Delivers a fired timer. Returns the upload to send when this timer
    /// completed the hold.
    pub fn on_timer(&mut self, timer: TimerId) -> Option<ReservedUpload> {
        let signal = self
            .controller
            .on_timer(self.timers.as_mut(), self.haptics.as_ref(), timer);
        if signal != TimerSignal::Commit {
            return None;
        }

        match self
            .submitter
            .reserve(self.assets.media(), self.assets.cover(), &self.metadata)
        {
            Ok(reserved) => Some(reserved),
            Err(UploadError::Validation(err)) => {
                warn!(%err, "form became invalid during hold");
                self.controller.settle();
                self.listener.on_validation_error(err);
                None
            }
            Err(err) => {
                warn!(%err, "could not start upload");
                self.controller.settle();
                self.listener.on_upload_failure(&err);
                None
            }
        }
    }

    /// Reports the outcome of a sent upload to the screen and re-arms the
    /// hold control.
    pub fn settle(&mut self, outcome: Result<UploadAck, UploadError>) {
        self.controller.settle();
        report_outcome(self.listener.as_ref(), outcome);
    }

    /// Discards picked assets and typed metadata. Refused while uploading.
    pub fn reset(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.controller.abandon(self.timers.as_mut());
        self.assets.clear();
        self.metadata = UploadMetadata::default();
        true
    }
}

/// Settles a sent upload. The screen may have been closed while the request
/// was in flight; the listener still hears the outcome exactly once.
pub fn settle_upload(
    form: Option<&mut UploadForm>,
    listener: &dyn UploadListener,
    outcome: Result<UploadAck, UploadError>,
) {
    match form {
        Some(form) => form.settle(outcome),
        None => {
            debug!("upload settled after its form closed");
            report_outcome(listener, outcome);
        }
    }
}

fn report_outcome(listener: &dyn UploadListener, outcome: Result<UploadAck, UploadError>) {
    match outcome {
        Ok(ack) => {
            info!("upload acknowledged");
            listener.on_upload_success(&ack);
        }
        Err(err) => listener.on_upload_failure(&err),
    }
}

impl Drop for UploadForm {
    fn drop(&mut self) {
        self.controller.abandon(self.timers.as_mut());
    }
}
