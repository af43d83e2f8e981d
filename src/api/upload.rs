use crate::api::models::*;
use crate::upload::payload::{FilePart, UploadPayload};
use crate::upload::{UploadError, UploadTransport};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::multipart::{Form, Part};
use std::rc::Rc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::debug;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

const CLIENT_NAME: &str = "SongDrop";
const UPLOAD_PATH: &str = "api/songs/upload";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub struct UploadClient {
    pub server: ServerConfig,
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    timeout_secs: u64,
}

impl UploadClient {
    pub fn new(server: ServerConfig) -> Self {
        Self {
            server,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs.max(1);
        self
    }

    pub fn upload_url(&self) -> String {
        format!("{}/{}", normalize_server_url(&self.server.url), UPLOAD_PATH)
    }

    pub async fn upload_song(&self, payload: UploadPayload) -> Result<UploadAck, UploadError> {
        let url = self.upload_url();
        let form = build_form(payload).await?;

        let mut request = HTTP_CLIENT
            .post(&url)
            .header("X-Client-Name", CLIENT_NAME)
            .multipart(form);
        if self.server.has_token() {
            request = request.bearer_auth(self.server.token.trim());
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            request = request.timeout(Duration::from_secs(self.timeout_secs));
        }

        debug!(%url, "posting upload");
        let response = request
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        parse_upload_response(status, &body)
    }
}

#[async_trait(?Send)]
impl UploadTransport for UploadClient {
    async fn send(&self, payload: UploadPayload) -> Result<UploadAck, UploadError> {
        self.upload_song(payload).await
    }
}

/// Stands in until a server has been saved. Every send fails with
/// [`UploadError::NotConfigured`].
pub struct UnconfiguredTransport;

#[async_trait(?Send)]
impl UploadTransport for UnconfiguredTransport {
    async fn send(&self, _payload: UploadPayload) -> Result<UploadAck, UploadError> {
        Err(UploadError::NotConfigured)
    }
}

/// Picks the transport for the saved server, if any.
pub fn transport_for(server: Option<ServerConfig>, timeout_secs: u64) -> Rc<dyn UploadTransport> {
    match server.filter(|server| !server.url.trim().is_empty()) {
        Some(server) => Rc::new(UploadClient::new(server).with_timeout_secs(timeout_secs)),
        None => Rc::new(UnconfiguredTransport),
    }
}

async fn build_form(payload: UploadPayload) -> Result<Form, UploadError> {
    let mut form = Form::new().part(payload.song.field, file_part(&payload.song).await?);
    if let Some(cover) = &payload.cover {
        form = form.part(cover.field, file_part(cover).await?);
    }
    for (name, value) in payload.text_fields() {
        form = form.text(name, value.to_string());
    }
    Ok(form)
}

async fn file_part(part: &FilePart) -> Result<Part, UploadError> {
    let bytes = part
        .asset
        .read_bytes()
        .await
        .map_err(|message| UploadError::AssetRead {
            part: part.field,
            reference: part.asset.uri.clone(),
            message,
        })?;

    Part::bytes(bytes)
        .file_name(part.file_name.clone())
        .mime_str(&part.mime_type)
        .map_err(|e| UploadError::AssetRead {
            part: part.field,
            reference: part.asset.uri.clone(),
            message: e.to_string(),
        })
}

fn json_pick_string(value: &serde_json::Value, keys: &[&str]) -> Option<String> {
    let object = value.as_object()?;
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(|picked| match picked {
            serde_json::Value::String(text) if !text.trim().is_empty() => {
                Some(text.trim().to_string())
            }
            _ => None,
        })
}

/// Maps the endpoint's answer to an acknowledgment or an [`UploadError`].
pub(crate) fn parse_upload_response(status: u16, body: &str) -> Result<UploadAck, UploadError> {
    let trimmed = body.trim();

    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<serde_json::Value>(trimmed)
            .ok()
            .and_then(|value| json_pick_string(&value, &["message", "error", "detail"]))
            .unwrap_or_else(|| {
                if trimmed.is_empty() {
                    "Unknown error".to_string()
                } else {
                    trimmed.chars().take(200).collect()
                }
            });
        return Err(UploadError::Status { status, message });
    }

    if trimmed.is_empty() {
        return Ok(UploadAck::default());
    }

    serde_json::from_str::<UploadAck>(trimmed)
        .map_err(|e| UploadError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{Asset, UploadMetadata};

    fn client(url: &str) -> UploadClient {
        UploadClient::new(ServerConfig::new(
            "Test".to_string(),
            url.to_string(),
            String::new(),
        ))
    }

    #[test]
    fn upload_url_joins_without_double_slash() {
        assert_eq!(
            client("https://api.example.com/").upload_url(),
            "https://api.example.com/api/songs/upload"
        );
    }

    #[test]
    fn empty_success_body_is_an_ack() {
        assert_eq!(parse_upload_response(201, ""), Ok(UploadAck::default()));
    }

    #[test]
    fn json_success_body_is_parsed() {
        let ack = parse_upload_response(200, r#"{"id":"42","message":"stored"}"#).unwrap();
        assert_eq!(ack.id.as_deref(), Some("42"));
        assert_eq!(ack.message.as_deref(), Some("stored"));
    }

    #[test]
    fn numeric_id_is_still_a_success() {
        let ack = parse_upload_response(201, r#"{"id":42,"message":"stored"}"#).unwrap();
        assert_eq!(ack.id.as_deref(), Some("42"));
        assert_eq!(ack.message.as_deref(), Some("stored"));
    }

    #[test]
    fn garbage_success_body_is_malformed() {
        assert!(matches!(
            parse_upload_response(200, "<html>ok</html>"),
            Err(UploadError::MalformedResponse(_))
        ));
    }

    #[test]
    fn error_status_carries_server_message() {
        assert_eq!(
            parse_upload_response(413, r#"{"error":"file too large"}"#),
            Err(UploadError::Status {
                status: 413,
                message: "file too large".to_string()
            })
        );
        assert_eq!(
            parse_upload_response(500, ""),
            Err(UploadError::Status {
                status: 500,
                message: "Unknown error".to_string()
            })
        );
    }

    #[tokio::test]
    async fn unreadable_song_fails_before_network() {
        let metadata = UploadMetadata {
            title: "Midnight".to_string(),
            ..UploadMetadata::default()
        };
        let media = Asset::from_path("/nonexistent/songdrop/missing.mp3");
        let payload = UploadPayload::build(Some(&media), None, &metadata).unwrap();

        let result = client("http://127.0.0.1:9").upload_song(payload).await;
        assert!(matches!(
            result,
            Err(UploadError::AssetRead { part: "song", .. })
        ));
    }

    #[tokio::test]
    async fn missing_server_fails_as_not_configured() {
        let metadata = UploadMetadata {
            title: "Midnight".to_string(),
            ..UploadMetadata::default()
        };
        let media = Asset::from_bytes("a.mp3", None, vec![0; 4]);
        let payload = UploadPayload::build(Some(&media), None, &metadata).unwrap();

        let blank = ServerConfig::new(String::new(), "  ".to_string(), String::new());
        let transport = transport_for(Some(blank), DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(
            transport.send(payload).await,
            Err(UploadError::NotConfigured)
        );
    }
}
