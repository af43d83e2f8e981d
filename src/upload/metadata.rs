use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Genre tags accepted by the upload endpoint. The wire value is the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Pop,
    Rap,
    Acoustic,
    Lofi,
    #[serde(rename = "R&B")]
    RnB,
    Rock,
    Electronic,
    Alternative,
    Jazz,
    Trap,
    Country,
    Other,
}

impl Genre {
    pub const ALL: [Genre; 12] = [
        Genre::Pop,
        Genre::Rap,
        Genre::Acoustic,
        Genre::Lofi,
        Genre::RnB,
        Genre::Rock,
        Genre::Electronic,
        Genre::Alternative,
        Genre::Jazz,
        Genre::Trap,
        Genre::Country,
        Genre::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Genre::Pop => "Pop",
            Genre::Rap => "Rap",
            Genre::Acoustic => "Acoustic",
            Genre::Lofi => "Lofi",
            Genre::RnB => "R&B",
            Genre::Rock => "Rock",
            Genre::Electronic => "Electronic",
            Genre::Alternative => "Alternative",
            Genre::Jazz => "Jazz",
            Genre::Trap => "Trap",
            Genre::Country => "Country",
            Genre::Other => "Other",
        }
    }

    /// Parses a select value; the empty "Select a genre" entry yields `None`.
    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|genre| genre.label() == value)
    }
}

/// Text metadata typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadMetadata {
    pub title: String,
    pub artist_name: Option<String>,
    pub genre: Option<Genre>,
}

impl UploadMetadata {
    /// Keeps the text as typed so the bound input is not rewritten under the
    /// cursor. Trimming happens when the payload is built.
    pub fn set_artist_name(&mut self, value: &str) {
        self.artist_name = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }

    pub fn trimmed_title(&self) -> &str {
        self.title.trim()
    }

    pub fn validate_title(&self) -> Result<(), ValidationError> {
        if self.trimmed_title().is_empty() {
            Err(ValidationError::MissingTitle)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_labels_round_trip_through_select_values() {
        for genre in Genre::ALL {
            assert_eq!(Genre::from_label(genre.label()), Some(genre));
        }
        assert_eq!(Genre::from_label(""), None);
        assert_eq!(Genre::from_label("Polka"), None);
    }

    #[test]
    fn rnb_serializes_with_ampersand() {
        let json = serde_json::to_string(&Genre::RnB).unwrap();
        assert_eq!(json, "\"R&B\"");
    }

    #[test]
    fn whitespace_title_is_missing() {
        let mut metadata = UploadMetadata::default();
        assert_eq!(
            metadata.validate_title(),
            Err(ValidationError::MissingTitle)
        );
        metadata.title = "   ".to_string();
        assert_eq!(
            metadata.validate_title(),
            Err(ValidationError::MissingTitle)
        );
        metadata.title = " Midnight ".to_string();
        assert!(metadata.validate_title().is_ok());
        assert_eq!(metadata.trimmed_title(), "Midnight");
    }

    #[test]
    fn artist_keeps_text_as_typed() {
        let mut metadata = UploadMetadata::default();
        metadata.set_artist_name(" ");
        assert_eq!(metadata.artist_name.as_deref(), Some(" "));
        metadata.set_artist_name(" Nova");
        assert_eq!(metadata.artist_name.as_deref(), Some(" Nova"));
        metadata.set_artist_name("");
        assert_eq!(metadata.artist_name, None);
    }
}
