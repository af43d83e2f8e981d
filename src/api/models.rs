use serde::{Deserialize, Deserializer, Serialize};

/// Backend the songs are uploaded to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub token: String,
}

impl ServerConfig {
    pub fn new(name: String, url: String, token: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            url: normalize_server_url(&url),
            token: token.trim().to_string(),
        }
    }

    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

pub fn normalize_server_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// What the upload endpoint returns on success. Every field is optional; an
/// empty 2xx body is a valid acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UploadAck {
    #[serde(
        default,
        alias = "_id",
        alias = "songId",
        deserialize_with = "string_or_number"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        alias = "songUrl",
        alias = "downloadUrl",
        deserialize_with = "string_or_number"
    )]
    pub url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Backends disagree on whether ids are strings or integers; take either.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) if !text.trim().is_empty() => {
            Some(text.trim().to_string())
        }
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_url_is_normalized() {
        let server = ServerConfig::new(
            "Home".to_string(),
            " https://music.example.com/// ".to_string(),
            " abc ".to_string(),
        );
        assert_eq!(server.url, "https://music.example.com");
        assert_eq!(server.token, "abc");
        assert!(server.has_token());
    }

    #[test]
    fn ack_accepts_backend_aliases() {
        let ack: UploadAck =
            serde_json::from_str(r#"{"_id":"s1","songUrl":"https://cdn/s1.mp3"}"#).unwrap();
        assert_eq!(ack.id.as_deref(), Some("s1"));
        assert_eq!(ack.url.as_deref(), Some("https://cdn/s1.mp3"));
        assert_eq!(ack.message, None);
    }

    #[test]
    fn ack_accepts_numeric_ids() {
        let ack: UploadAck = serde_json::from_str(r#"{"songId":7,"url":null}"#).unwrap();
        assert_eq!(ack.id.as_deref(), Some("7"));
        assert_eq!(ack.url, None);
    }
}
