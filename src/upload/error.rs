use thiserror::Error;

pub const VALIDATION_MESSAGE: &str = "Please fill in the required fields and select a song";
pub const UPLOAD_FAILURE_MESSAGE: &str = "Failed to upload song";
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Song uploaded successfully!";

/// A required field was missing when a submission was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("song title is required")]
    MissingTitle,
    #[error("no song file selected")]
    MissingMedia,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        VALIDATION_MESSAGE
    }
}

/// Which picker produced a [`PickerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    Media,
    Cover,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickerError {
    #[error("{target:?} picker permission denied")]
    PermissionDenied { target: PickTarget },
    #[error("{target:?} picker failed: {message}")]
    Io { target: PickTarget, message: String },
    #[error("{target:?} picker returned unsupported type `{mime}`")]
    UnsupportedType { target: PickTarget, mime: String },
    #[error("{target:?} picker returned an empty file reference")]
    EmptyReference { target: PickTarget },
}

impl PickerError {
    pub fn target(&self) -> PickTarget {
        match self {
            Self::PermissionDenied { target }
            | Self::Io { target, .. }
            | Self::UnsupportedType { target, .. }
            | Self::EmptyReference { target } => *target,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self.target() {
            PickTarget::Media => "Failed to pick song",
            PickTarget::Cover => "Failed to pick cover image",
        }
    }
}

/// Anything that went wrong between committing a hold and the server's answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("an upload is already in flight")]
    Busy,
    #[error("no upload server configured")]
    NotConfigured,
    #[error("failed to read {part} from {reference}: {message}")]
    AssetRead {
        part: &'static str,
        reference: String,
        message: String,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed upload response: {0}")]
    MalformedResponse(String),
}

impl UploadError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.user_message(),
            _ => UPLOAD_FAILURE_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picker_messages_follow_target() {
        let media = PickerError::PermissionDenied {
            target: PickTarget::Media,
        };
        let cover = PickerError::Io {
            target: PickTarget::Cover,
            message: "disk gone".to_string(),
        };
        assert_eq!(media.user_message(), "Failed to pick song");
        assert_eq!(cover.user_message(), "Failed to pick cover image");
    }

    #[test]
    fn upload_failures_share_generic_message() {
        let errors = [
            UploadError::Network("reset".to_string()),
            UploadError::Status {
                status: 500,
                message: "boom".to_string(),
            },
            UploadError::MalformedResponse("<html>".to_string()),
        ];
        for err in errors {
            assert_eq!(err.user_message(), UPLOAD_FAILURE_MESSAGE);
        }
        assert_eq!(
            UploadError::from(ValidationError::MissingTitle).user_message(),
            VALIDATION_MESSAGE
        );
    }
}
