//! Hold-to-confirm song upload: asset selection, the timed confirmation
//! gesture and the single-flight multipart submission.

pub mod assets;
pub mod error;
pub mod flight;
pub mod form;
pub mod hold;
pub mod metadata;
pub mod payload;
pub mod submitter;

#[cfg(test)]
pub(crate) mod sim;

pub use assets::{Asset, HostPicker, PickOutcome};
pub use error::{PickTarget, PickerError, UploadError, ValidationError};
pub use form::{settle_upload, UploadForm, UploadListener};
pub use hold::{AccentColor, HapticFeedback, HapticKind, HoldTiming, TimerHost, TimerId};
pub use metadata::{Genre, UploadMetadata};
pub use submitter::{UploadSubmitter, UploadTransport};
