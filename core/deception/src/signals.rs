// Path and File Name : /home/decepticloud/core/deception/src/signals.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Attack signal extraction - watermark-based tailing of honeypot logs, rotation detection, strict fail-closed record classification

use std::collections::VecDeque;
use std::io::SeekFrom;
use std::path::PathBuf;
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{warn, info, debug};

use crate::asset::AssetKind;
use crate::errors::DeceptionError;
use crate::registry::HoneypotRegistry;

/// Upper bound on bytes consumed from one source per poll; the remainder is read next poll.
pub const DEFAULT_MAX_READ_BYTES: u64 = 4 * 1024 * 1024;

/// Leading bytes kept to recognise a replaced file with the same length profile.
const HEAD_FINGERPRINT_BYTES: usize = 256;

/// Device and inode of an open file, where the platform exposes them.
type FileIdentity = (u64, u64);

#[cfg(unix)]
fn file_identity(meta: &std::fs::Metadata) -> Option<FileIdentity> {
    use std::os::unix::fs::MetadataExt;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn file_identity(_meta: &std::fs::Metadata) -> Option<FileIdentity> {
    None
}

/// Attack flags for one timestep window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttackSignals {
    pub ssh_attack: bool,
    pub web_attack: bool,
}

impl AttackSignals {
    pub fn new(ssh_attack: bool, web_attack: bool) -> Self {
        Self { ssh_attack, web_attack }
    }

    /// Fail-safe default: never fabricate an attack.
    pub fn none() -> Self {
        Self::default()
    }

    fn set(&mut self, kind: AssetKind, value: bool) {
        match kind {
            AssetKind::Ssh => self.ssh_attack = value,
            AssetKind::Web => self.web_attack = value,
        }
    }
}

/// Source of per-timestep attack flags.
#[async_trait]
pub trait SignalExtractor: Send {
    /// Flags for records newer than the previous poll.
    async fn poll(&mut self) -> Result<AttackSignals, DeceptionError>;

    /// Number of independently bounded reads one poll performs.
    fn source_count(&self) -> usize {
        1
    }

    /// Discard anything not yet polled.
    async fn clear(&mut self) -> Result<(), DeceptionError>;
}

/// On-disk layout of a honeypot log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFormat {
    /// One JSON object per line with string `eventid` and RFC 3339 `timestamp` (Cowrie).
    JsonEvent,
    /// `"<asctime> - <source> - <message>"` lines.
    TextLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Attack,
    Benign,
    Unparseable,
}

#[derive(Debug, Deserialize)]
struct JsonEventRecord {
    eventid: String,
    timestamp: String,
}

const TEXT_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S,%3f", "%Y-%m-%d %H:%M:%S"];

/// Strict per-line classifier. Anything that does not parse is a non-event.
#[derive(Debug, Clone)]
pub struct RecordClassifier {
    format: RecordFormat,
    markers: Vec<String>,
}

impl RecordClassifier {
    pub fn new(format: RecordFormat, markers: Vec<String>) -> Self {
        Self { format, markers }
    }

    pub fn classify(&self, line: &str) -> Classification {
        let line = line.trim();
        if line.is_empty() {
            return Classification::Unparseable;
        }
        match self.format {
            RecordFormat::JsonEvent => self.classify_json(line),
            RecordFormat::TextLine => self.classify_text(line),
        }
    }

    fn classify_json(&self, line: &str) -> Classification {
        let record: JsonEventRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(_) => return Classification::Unparseable,
        };
        if DateTime::parse_from_rfc3339(&record.timestamp).is_err() {
            return Classification::Unparseable;
        }
        if self.matches(&record.eventid) {
            Classification::Attack
        } else {
            Classification::Benign
        }
    }

    fn classify_text(&self, line: &str) -> Classification {
        let mut parts = line.splitn(3, " - ");
        let (timestamp, source, message) = match (parts.next(), parts.next(), parts.next()) {
            (Some(t), Some(s), Some(m)) => (t.trim(), s.trim(), m.trim()),
            _ => return Classification::Unparseable,
        };
        let timestamp_ok = TEXT_TIMESTAMP_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(timestamp, fmt).is_ok());
        if !timestamp_ok || source.is_empty() || message.is_empty() {
            return Classification::Unparseable;
        }
        if self.matches(message) {
            Classification::Attack
        } else {
            Classification::Benign
        }
    }

    fn matches(&self, value: &str) -> bool {
        self.markers.iter().any(|marker| value.starts_with(marker.as_str()))
    }
}

/// Counters for one source read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub records: usize,
    pub attacks: usize,
    pub unparseable: usize,
    pub bytes: u64,
}

/// One tailed log file with its byte-offset watermark.
///
/// The watermark is tied to the file it was measured on: a new inode, a
/// shorter file or different leading bytes all mean the log was replaced and
/// reading restarts at offset 0.
#[derive(Debug)]
pub struct LogSource {
    kind: AssetKind,
    path: PathBuf,
    classifier: RecordClassifier,
    watermark: u64,
    max_read_bytes: u64,
    identity: Option<FileIdentity>,
    /// First `min(watermark, HEAD_FINGERPRINT_BYTES)` bytes of the file.
    head: Vec<u8>,
}

impl LogSource {
    pub fn new(kind: AssetKind, path: PathBuf, classifier: RecordClassifier) -> Self {
        Self {
            kind,
            path,
            classifier,
            watermark: 0,
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
            identity: None,
            head: Vec::new(),
        }
    }

    pub fn with_max_read_bytes(mut self, max_read_bytes: u64) -> Self {
        self.max_read_bytes = max_read_bytes.max(1);
        self
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn watermark(&self) -> u64 {
        self.watermark
    }

    fn reset_watermark(&mut self) {
        self.watermark = 0;
        self.head.clear();
    }

    async fn open(&mut self) -> Result<tokio::fs::File, DeceptionError> {
        match tokio::fs::File::open(&self.path).await {
            Ok(file) => Ok(file),
            Err(e) => {
                self.reset_watermark();
                self.identity = None;
                Err(DeceptionError::SignalSourceUnavailable(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        }
    }

    /// Why the file no longer continues the bytes already consumed, if it doesn't.
    async fn discontinuity(
        &self,
        file: &mut tokio::fs::File,
        len: u64,
        identity: Option<FileIdentity>,
    ) -> Result<Option<&'static str>, DeceptionError> {
        if self.watermark == 0 {
            return Ok(None);
        }
        if len < self.watermark {
            return Ok(Some("file shrank"));
        }
        if self.identity.is_some() && identity != self.identity {
            return Ok(Some("file identity changed"));
        }
        let mut head = vec![0u8; self.head.len()];
        file.seek(SeekFrom::Start(0)).await?;
        file.read_exact(&mut head).await?;
        if head != self.head {
            return Ok(Some("leading bytes changed"));
        }
        Ok(None)
    }

    /// Classify complete lines appended since the watermark, then advance it.
    pub async fn read_new(&mut self) -> Result<ReadStats, DeceptionError> {
        let mut file = self.open().await?;

        let meta = file.metadata().await?;
        let len = meta.len();
        let identity = file_identity(&meta);
        if let Some(reason) = self.discontinuity(&mut file, len, identity).await? {
            info!(
                "Signal source {} rotated ({}), resetting watermark {} -> 0",
                self.path.display(),
                reason,
                self.watermark
            );
            self.reset_watermark();
        }
        self.identity = identity;
        if len == self.watermark {
            return Ok(ReadStats::default());
        }

        let to_read = (len - self.watermark).min(self.max_read_bytes);
        file.seek(SeekFrom::Start(self.watermark)).await?;
        let mut chunk = Vec::with_capacity(to_read as usize);
        file.take(to_read).read_to_end(&mut chunk).await?;

        // A trailing partial line waits for the next poll.
        let complete = match chunk.iter().rposition(|b| *b == b'\n') {
            Some(pos) => pos + 1,
            None if chunk.len() as u64 >= self.max_read_bytes => {
                warn!(
                    "Oversized record in {} at offset {}, skipping {} bytes",
                    self.path.display(),
                    self.watermark,
                    chunk.len()
                );
                self.advance(&chunk);
                return Ok(ReadStats {
                    unparseable: 1,
                    bytes: chunk.len() as u64,
                    ..ReadStats::default()
                });
            }
            None => 0,
        };

        let mut stats = ReadStats {
            bytes: complete as u64,
            ..ReadStats::default()
        };
        for raw in chunk[..complete].split(|b| *b == b'\n') {
            if raw.is_empty() {
                continue;
            }
            stats.records += 1;
            match self.classifier.classify(&String::from_utf8_lossy(raw)) {
                Classification::Attack => stats.attacks += 1,
                Classification::Benign => {}
                Classification::Unparseable => stats.unparseable += 1,
            }
        }

        self.advance(&chunk[..complete]);
        debug!(
            "Signal source {}: {} records, {} attacks, {} unparseable, watermark={}",
            self.path.display(),
            stats.records,
            stats.attacks,
            stats.unparseable,
            self.watermark
        );
        Ok(stats)
    }

    fn advance(&mut self, consumed: &[u8]) {
        if self.head.len() < HEAD_FINGERPRINT_BYTES {
            let take = (HEAD_FINGERPRINT_BYTES - self.head.len()).min(consumed.len());
            self.head.extend_from_slice(&consumed[..take]);
        }
        self.watermark += consumed.len() as u64;
    }

    /// Move the watermark to the current end of the file.
    pub async fn skip_to_end(&mut self) -> Result<(), DeceptionError> {
        let file = self.open().await?;
        let meta = file.metadata().await?;
        let len = meta.len();
        let mut head = Vec::with_capacity(HEAD_FINGERPRINT_BYTES);
        file.take(len.min(HEAD_FINGERPRINT_BYTES as u64))
            .read_to_end(&mut head)
            .await?;

        self.identity = file_identity(&meta);
        self.head = head;
        self.watermark = len;
        Ok(())
    }
}

/// Tails the SSH and web honeypot logs.
pub struct LogSignalExtractor {
    sources: Vec<LogSource>,
    poll_timeout: Duration,
}

impl LogSignalExtractor {
    pub fn new(sources: Vec<LogSource>, poll_timeout: Duration) -> Self {
        Self { sources, poll_timeout }
    }

    pub fn from_registry(registry: &HoneypotRegistry, poll_timeout: Duration) -> Self {
        let sources = registry
            .definitions()
            .iter()
            .map(|def| {
                LogSource::new(
                    def.kind,
                    def.log_path.clone(),
                    RecordClassifier::new(def.record_format(), def.markers()),
                )
            })
            .collect();
        Self::new(sources, poll_timeout)
    }

    pub fn sources(&self) -> &[LogSource] {
        &self.sources
    }
}

#[async_trait]
impl SignalExtractor for LogSignalExtractor {
    async fn poll(&mut self) -> Result<AttackSignals, DeceptionError> {
        let mut signals = AttackSignals::none();
        for source in self.sources.iter_mut() {
            let kind = source.kind;
            match tokio::time::timeout(self.poll_timeout, source.read_new()).await {
                Ok(Ok(stats)) => {
                    if stats.attacks > 0 {
                        signals.set(kind, true);
                    }
                }
                Ok(Err(e)) => {
                    warn!("{} signal source unavailable, reporting no attack: {}", kind, e);
                }
                Err(_) => {
                    warn!(
                        "{} signal poll exceeded {:?}, reporting no attack",
                        kind, self.poll_timeout
                    );
                }
            }
        }
        Ok(signals)
    }

    fn source_count(&self) -> usize {
        self.sources.len()
    }

    async fn clear(&mut self) -> Result<(), DeceptionError> {
        for source in self.sources.iter_mut() {
            if let Err(e) = source.skip_to_end().await {
                warn!("Cannot clear {} signal source: {}", source.kind, e);
            }
        }
        Ok(())
    }
}

/// Replays a fixed script of polls. `None` entries simulate an unreachable source.
#[derive(Debug, Default)]
pub struct ScriptedSignals {
    script: VecDeque<Option<AttackSignals>>,
}

impl ScriptedSignals {
    pub fn new(script: Vec<AttackSignals>) -> Self {
        Self {
            script: script.into_iter().map(Some).collect(),
        }
    }

    pub fn push(&mut self, signals: AttackSignals) {
        self.script.push_back(Some(signals));
    }

    pub fn push_outage(&mut self) {
        self.script.push_back(None);
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[async_trait]
impl SignalExtractor for ScriptedSignals {
    async fn poll(&mut self) -> Result<AttackSignals, DeceptionError> {
        match self.script.pop_front() {
            Some(Some(signals)) => Ok(signals),
            Some(None) => Err(DeceptionError::SignalSourceUnavailable(
                "scripted outage".to_string(),
            )),
            None => Ok(AttackSignals::none()),
        }
    }

    async fn clear(&mut self) -> Result<(), DeceptionError> {
        Ok(())
    }
}
