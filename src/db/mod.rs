use crate::api::models::ServerConfig;
use crate::upload::hold::{DEFAULT_FEEDBACK_INTERVAL_MS, DEFAULT_HOLD_DURATION_MS};
use crate::upload::HoldTiming;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[cfg(target_arch = "wasm32")]
use gloo_storage::{errors::StorageError, LocalStorage, Storage};

/// Error type for settings persistence.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[cfg(not(target_arch = "wasm32"))]
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[cfg(target_arch = "wasm32")]
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("settings encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no data directory available")]
    NoDataDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(target_arch = "wasm32")]
const SETTINGS_KEY: &str = "songdrop.upload_settings";
#[cfg(not(target_arch = "wasm32"))]
const SETTINGS_ROW: &str = "upload_settings";

/// The most recent successful upload, shown on the home screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastUpload {
    pub title: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Upload settings stored on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSettings {
    #[serde(default)]
    pub server: Option<ServerConfig>,
    #[serde(default = "default_hold_duration_ms")]
    pub hold_duration_ms: u64,
    #[serde(default = "default_feedback_interval_ms")]
    pub feedback_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub last_upload: Option<LastUpload>,
}

fn default_hold_duration_ms() -> u64 {
    DEFAULT_HOLD_DURATION_MS
}

fn default_feedback_interval_ms() -> u64 {
    DEFAULT_FEEDBACK_INTERVAL_MS
}

fn default_request_timeout_secs() -> u64 {
    crate::api::upload::DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            server: None,
            hold_duration_ms: default_hold_duration_ms(),
            feedback_interval_ms: default_feedback_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            last_upload: None,
        }
    }
}

impl UploadSettings {
    pub fn hold_timing(&self) -> HoldTiming {
        HoldTiming::from_millis(self.hold_duration_ms, self.feedback_interval_ms)
    }

    pub fn record_upload(&mut self, title: &str) {
        self.last_upload = Some(LastUpload {
            title: title.trim().to_string(),
            uploaded_at: Utc::now(),
        });
    }
}

// Native platforms keep settings in SQLite as a JSON row.

#[cfg(not(target_arch = "wasm32"))]
pub async fn initialize_database() -> Result<(), DbError> {
    let conn = get_db_connection()?;
    create_tables(&conn)
}

#[cfg(target_arch = "wasm32")]
pub async fn initialize_database() -> Result<(), DbError> {
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn save_settings(settings: UploadSettings) -> Result<(), DbError> {
    let conn = get_db_connection()?;
    write_settings(&conn, &settings)
}

#[cfg(target_arch = "wasm32")]
pub async fn save_settings(settings: UploadSettings) -> Result<(), DbError> {
    LocalStorage::set(SETTINGS_KEY, settings)?;
    Ok(())
}

/// Absent settings are normal on first launch. Anything else unreadable is
/// logged, then defaults apply.
fn settings_or_default<E: std::fmt::Display>(
    loaded: Result<UploadSettings, E>,
    is_missing: impl Fn(&E) -> bool,
) -> UploadSettings {
    match loaded {
        Ok(settings) => settings,
        Err(err) if is_missing(&err) => UploadSettings::default(),
        Err(err) => {
            warn!(%err, "stored settings unreadable, using defaults");
            UploadSettings::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn load_settings() -> Result<UploadSettings, DbError> {
    let conn = get_db_connection()?;
    // A missing row already reads as defaults.
    Ok(settings_or_default(read_settings(&conn), |_| false))
}

#[cfg(target_arch = "wasm32")]
pub async fn load_settings() -> Result<UploadSettings, DbError> {
    let loaded = LocalStorage::get::<UploadSettings>(SETTINGS_KEY);
    Ok(settings_or_default(loaded, |err| {
        matches!(err, StorageError::KeyNotFound(_))
    }))
}

#[cfg(not(target_arch = "wasm32"))]
fn create_tables(conn: &rusqlite::Connection) -> Result<(), DbError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn write_settings(conn: &rusqlite::Connection, settings: &UploadSettings) -> Result<(), DbError> {
    let settings_json = serde_json::to_string(settings)?;
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        [SETTINGS_ROW, settings_json.as_str()],
    )?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn read_settings(conn: &rusqlite::Connection) -> Result<UploadSettings, DbError> {
    use rusqlite::OptionalExtension;

    let json: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            [SETTINGS_ROW],
            |row| row.get(0),
        )
        .optional()?;

    match json {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(UploadSettings::default()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn get_db_connection() -> Result<rusqlite::Connection, DbError> {
    let data_dir = dirs::data_dir().ok_or(DbError::NoDataDir)?.join("songdrop");
    std::fs::create_dir_all(&data_dir)?;
    let conn = rusqlite::Connection::open(data_dir.join("songdrop.db"))?;
    Ok(conn)
}
