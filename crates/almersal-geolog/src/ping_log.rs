//! Append-only storage for location pings.
//!
//! Handlers only see the [`PingLog`] trait. [`FilePingLog`] appends one JSON
//! object per line and replays the file on open; [`MemoryPingLog`] keeps
//! everything in process memory.

use std::path::{Path, PathBuf};

use axum::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::GeologError;

/// One GPS report. Coordinates are stored exactly as the client sent them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeoPing {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<String>,
    /// Server-assigned, ISO-8601 UTC with millisecond precision.
    pub time: String,
}

impl GeoPing {
    /// Stamp a ping with the current time.
    pub fn now(uid: String, lat: Option<String>, lon: Option<String>) -> Self {
        Self {
            uid,
            lat,
            lon,
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[async_trait]
pub trait PingLog: Send + Sync {
    async fn append(&self, ping: GeoPing) -> Result<(), GeologError>;

    /// Every ping whose `uid` matches exactly, in insertion order.
    async fn query_by_uid(&self, uid: &str) -> Result<Vec<GeoPing>, GeologError>;

    /// Full history, in insertion order.
    async fn all(&self) -> Result<Vec<GeoPing>, GeologError>;
}

/// Write the whole history to `dest` as a pretty-printed JSON array.
pub async fn export_json(log: &dyn PingLog, dest: &Path) -> Result<usize, GeologError> {
    let pings = log.all().await?;
    fs::write(dest, serde_json::to_string_pretty(&pings)?).await?;
    info!(path = %dest.display(), count = pings.len(), "Exported ping history");
    Ok(pings.len())
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryPingLog {
    pings: RwLock<Vec<GeoPing>>,
}

impl MemoryPingLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PingLog for MemoryPingLog {
    async fn append(&self, ping: GeoPing) -> Result<(), GeologError> {
        self.pings.write().await.push(ping);
        Ok(())
    }

    async fn query_by_uid(&self, uid: &str) -> Result<Vec<GeoPing>, GeologError> {
        Ok(matching(&self.pings.read().await, uid))
    }

    async fn all(&self) -> Result<Vec<GeoPing>, GeologError> {
        Ok(self.pings.read().await.clone())
    }
}

// ---------------------------------------------------------------------------
// JSON Lines file
// ---------------------------------------------------------------------------

struct FileState {
    file: fs::File,
    pings: Vec<GeoPing>,
    /// The file may end mid-record; terminate it before the next append.
    needs_newline: bool,
}

pub struct FilePingLog {
    path: PathBuf,
    state: Mutex<FileState>,
}

impl FilePingLog {
    /// Open (or create) the log at `path`, replaying any existing history.
    ///
    /// Lines that fail to parse, such as a line cut short by a crash, are
    /// skipped with a warning.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, GeologError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let existing = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut pings = Vec::new();
        for (lineno, line) in existing.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<GeoPing>(line) {
                Ok(ping) => pings.push(ping),
                Err(e) => warn!(line = lineno + 1, error = %e, "Skipping corrupt ping line"),
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        let needs_newline = !existing.is_empty() && !existing.ends_with('\n');

        info!(path = %path.display(), replayed = pings.len(), "Ping log opened");

        Ok(Self {
            path,
            state: Mutex::new(FileState {
                file,
                pings,
                needs_newline,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PingLog for FilePingLog {
    async fn append(&self, ping: GeoPing) -> Result<(), GeologError> {
        let mut line = serde_json::to_vec(&ping)?;
        line.push(b'\n');

        let mut state = self.state.lock().await;
        if state.needs_newline {
            state.file.write_all(b"\n").await?;
            state.needs_newline = false;
        }

        // A failed write may leave part of the record behind.
        state.needs_newline = true;
        state.file.write_all(&line).await?;
        state.file.flush().await?;
        state.needs_newline = false;

        debug!(uid = %ping.uid, "Ping appended");
        state.pings.push(ping);
        Ok(())
    }

    async fn query_by_uid(&self, uid: &str) -> Result<Vec<GeoPing>, GeologError> {
        Ok(matching(&self.state.lock().await.pings, uid))
    }

    async fn all(&self) -> Result<Vec<GeoPing>, GeologError> {
        Ok(self.state.lock().await.pings.clone())
    }
}

fn matching(pings: &[GeoPing], uid: &str) -> Vec<GeoPing> {
    pings.iter().filter(|p| p.uid == uid).cloned().collect()
}
