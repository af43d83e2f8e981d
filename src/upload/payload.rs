use super::assets::{CoverAsset, MediaAsset};
use super::error::ValidationError;
use super::metadata::UploadMetadata;

pub const SONG_PART: &str = "song";
pub const COVER_PART: &str = "cover";
pub const TITLE_FIELD: &str = "title";
pub const ARTIST_FIELD: &str = "artistName";
pub const GENRE_FIELD: &str = "genre";

pub const DEFAULT_SONG_FILE_NAME: &str = "song.mp3";
pub const DEFAULT_SONG_MIME: &str = "audio/mpeg";
pub const COVER_FILE_NAME: &str = "cover.jpg";
pub const COVER_MIME: &str = "image/jpeg";

/// A binary part of the multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: &'static str,
    pub file_name: String,
    pub mime_type: String,
    pub asset: MediaAsset,
}

/// Everything one upload request carries. Optional text fields are sent as
/// empty strings; the cover part is omitted when no cover was picked.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPayload {
    pub song: FilePart,
    pub cover: Option<FilePart>,
    pub title: String,
    pub artist_name: String,
    pub genre: String,
}

impl UploadPayload {
    pub fn build(
        media: Option<&MediaAsset>,
        cover: Option<&CoverAsset>,
        metadata: &UploadMetadata,
    ) -> Result<Self, ValidationError> {
        metadata.validate_title()?;
        let media = media.ok_or(ValidationError::MissingMedia)?;

        let song = FilePart {
            field: SONG_PART,
            file_name: song_file_name(media),
            mime_type: song_mime(media),
            asset: media.clone(),
        };

        let cover = cover.map(|cover| FilePart {
            field: COVER_PART,
            file_name: COVER_FILE_NAME.to_string(),
            mime_type: COVER_MIME.to_string(),
            asset: cover.clone(),
        });

        Ok(Self {
            song,
            cover,
            title: metadata.trimmed_title().to_string(),
            artist_name: metadata
                .artist_name
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            genre: metadata
                .genre
                .map(|genre| genre.label().to_string())
                .unwrap_or_default(),
        })
    }

    /// Text fields in wire order.
    pub fn text_fields(&self) -> [(&'static str, &str); 3] {
        [
            (TITLE_FIELD, self.title.as_str()),
            (ARTIST_FIELD, self.artist_name.as_str()),
            (GENRE_FIELD, self.genre.as_str()),
        ]
    }

    /// Part names in wire order.
    pub fn part_names(&self) -> Vec<&'static str> {
        let mut names = vec![self.song.field];
        if let Some(cover) = &self.cover {
            names.push(cover.field);
        }
        names.extend(self.text_fields().iter().map(|(name, _)| *name));
        names
    }
}

fn song_file_name(media: &MediaAsset) -> String {
    media
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_SONG_FILE_NAME)
        .to_string()
}

/// Declared `audio/*` type first, then the file extension, then `audio/mpeg`.
pub fn song_mime(media: &MediaAsset) -> String {
    if let Some(declared) = media
        .mime_type
        .as_deref()
        .map(|mime| mime.trim().to_ascii_lowercase())
        .filter(|mime| mime.starts_with("audio/"))
    {
        return declared;
    }

    let name = media.name.as_deref().unwrap_or(media.uri.as_str());
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "m4a" | "mp4" => "audio/mp4",
        "aac" => "audio/aac",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "opus" => "audio/opus",
        _ => DEFAULT_SONG_MIME,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::assets::Asset;
    use crate::upload::metadata::Genre;

    fn metadata(title: &str) -> UploadMetadata {
        UploadMetadata {
            title: title.to_string(),
            ..UploadMetadata::default()
        }
    }

    #[test]
    fn minimal_payload_sends_empty_optionals_and_no_cover() {
        let media = Asset::from_path("/tmp/track");
        let payload = UploadPayload::build(Some(&media), None, &metadata("Midnight")).unwrap();

        assert_eq!(
            payload.part_names(),
            vec!["song", "title", "artistName", "genre"]
        );
        assert_eq!(
            payload.text_fields(),
            [("title", "Midnight"), ("artistName", ""), ("genre", "")]
        );
        assert_eq!(payload.song.file_name, DEFAULT_SONG_FILE_NAME);
        assert_eq!(payload.song.mime_type, DEFAULT_SONG_MIME);
    }

    #[test]
    fn full_payload_carries_cover_and_metadata() {
        let media = Asset::from_path("/tmp/a.flac").with_name("demo.flac");
        let cover = Asset::from_path("/tmp/art.png");
        let meta = UploadMetadata {
            title: "  Dawn ".to_string(),
            artist_name: Some("Nova ".to_string()),
            genre: Some(Genre::RnB),
        };
        let payload = UploadPayload::build(Some(&media), Some(&cover), &meta).unwrap();

        assert_eq!(
            payload.part_names(),
            vec!["song", "cover", "title", "artistName", "genre"]
        );
        assert_eq!(
            payload.text_fields(),
            [("title", "Dawn"), ("artistName", "Nova"), ("genre", "R&B")]
        );
        let cover_part = payload.cover.as_ref().unwrap();
        assert_eq!(cover_part.file_name, COVER_FILE_NAME);
        assert_eq!(cover_part.mime_type, COVER_MIME);
        assert_eq!(payload.song.file_name, "demo.flac");
        assert_eq!(payload.song.mime_type, "audio/flac");
    }

    #[test]
    fn whitespace_artist_is_sent_empty() {
        let media = Asset::from_path("/tmp/a.mp3");
        let mut meta = metadata("Midnight");
        meta.set_artist_name("   ");
        let payload = UploadPayload::build(Some(&media), None, &meta).unwrap();
        assert_eq!(payload.text_fields()[1], ("artistName", ""));
    }

    #[test]
    fn missing_fields_are_validation_errors() {
        let media = Asset::from_path("/tmp/a.mp3");
        assert_eq!(
            UploadPayload::build(Some(&media), None, &metadata("")),
            Err(ValidationError::MissingTitle)
        );
        assert_eq!(
            UploadPayload::build(None, None, &metadata("Midnight")),
            Err(ValidationError::MissingMedia)
        );
    }

    #[test]
    fn declared_audio_type_wins_over_extension() {
        let media = Asset::from_path("/tmp/a.wav").with_mime_type("audio/x-wav");
        assert_eq!(song_mime(&media), "audio/x-wav");

        let generic = Asset::from_path("/tmp/a.ogg").with_mime_type("application/octet-stream");
        assert_eq!(song_mime(&generic), "audio/ogg");
    }
}
