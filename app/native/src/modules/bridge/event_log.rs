//! Append-only JSONL event record store.
//!
//! One JSON object per line: `{"event": ..., "payload": ..., "timestamp": ...}`.
//! Writes are best effort. A failed append is logged locally and never
//! reaches the serving path.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single record in the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

impl EventRecord {
    #[must_use]
    pub fn now(event: &str, payload: Value) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0.0, |elapsed| elapsed.as_secs_f64());
        Self {
            event: event.to_string(),
            payload,
            timestamp,
        }
    }
}

/// Bytes read per step when scanning the store backwards.
const READ_CHUNK: u64 = 8 * 1024;

/// Handle to the record store. `None` path disables persistence.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: Some(path.into()) } }

    /// A store that drops every record.
    #[must_use]
    pub const fn disabled() -> Self { Self { path: None } }

    #[must_use]
    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    /// Appends one record.
    pub fn append(&self, event: &str, payload: Value) {
        let Some(path) = &self.path else {
            return;
        };

        if let Err(e) = write_record(path, &EventRecord::now(event, payload)) {
            tracing::warn!("bridge: failed to append '{event}' to event log: {e}");
        }
    }

    /// The last `n` records, oldest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<EventRecord> {
        self.path.as_deref().map_or_else(Vec::new, |path| read_recent(path, n))
    }
}

fn write_record(path: &Path, record: &EventRecord) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

/// Reads the last `n` well-formed records of a store file.
///
/// The file is scanned backwards from its end, so the cost follows `n`
/// rather than the size of the store. A missing or unreadable file yields
/// no records. Malformed lines are skipped.
#[must_use]
pub fn read_recent(path: &Path, n: usize) -> Vec<EventRecord> {
    match read_tail(path, n) {
        Ok(records) => records,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("bridge: failed to read event log {}: {e}", path.display());
            }
            Vec::new()
        }
    }
}

fn read_tail(path: &Path, n: usize) -> std::io::Result<Vec<EventRecord>> {
    let mut file = File::open(path)?;
    let mut pos = file.metadata()?.len();
    // Unscanned bytes at the front of what has been read so far.
    let mut pending: Vec<u8> = Vec::new();
    let mut newest_first = Vec::new();

    while pos > 0 && newest_first.len() < n {
        let step = pos.min(READ_CHUNK);
        pos -= step;

        let mut chunk = vec![0; usize::try_from(step).map_err(std::io::Error::other)?];
        file.seek(SeekFrom::Start(pos))?;
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&pending);
        pending = chunk;

        // Until the start of the file, the bytes before the first newline
        // may belong to a line that starts before this chunk.
        let whole_from = if pos == 0 {
            0
        } else {
            let Some(newline) = pending.iter().position(|&b| b == b'\n') else {
                continue;
            };
            newline + 1
        };

        collect_newest(&pending[whole_from..], n, &mut newest_first);
        pending.truncate(whole_from);
    }

    newest_first.reverse();
    Ok(newest_first)
}

/// Parses whole lines last to first until `out` holds `n` records.
fn collect_newest(bytes: &[u8], n: usize, out: &mut Vec<EventRecord>) {
    for line in bytes.split(|&b| b == b'\n').rev() {
        if out.len() >= n {
            return;
        }
        if let Ok(record) = serde_json::from_slice(line) {
            out.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_append_writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.jsonl");
        let log = EventLog::new(&path);

        log.append("client_new", json!({"window_id": 1, "name": "xterm"}));
        log.append("focus_change", Value::Null);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "client_new");
        assert_eq!(first["payload"]["name"], "xterm");
        assert!(first["timestamp"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_recent_returns_tail_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::new(dir.path().join("events.jsonl"));
        for i in 0..5 {
            log.append("tick", json!(i));
        }

        let recent = log.recent(2);
        let payloads: Vec<_> = recent.iter().map(|r| r.payload.clone()).collect();
        assert_eq!(payloads, [json!(3), json!(4)]);
        assert_eq!(log.recent(50).len(), 5);
    }

    #[test]
    fn test_recent_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        std::fs::write(
            &path,
            "{\"event\":\"a\",\"payload\":null,\"timestamp\":1.0}\ngarbage\n\n{\"event\":\"b\",\"payload\":null,\"timestamp\":2.0}\n",
        )
        .unwrap();

        let names: Vec<_> = read_recent(&path, 10).into_iter().map(|r| r.event).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_recent_spans_many_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::new(dir.path().join("events.jsonl"));
        for i in 0..2000 {
            log.append("tick", json!({ "seq": i, "note": "x".repeat(i % 37) }));
        }

        let recent = log.recent(700);
        let seqs: Vec<_> = recent.iter().filter_map(|r| r.payload["seq"].as_u64()).collect();
        assert_eq!(seqs, (1300..2000).collect::<Vec<_>>());

        let all = log.recent(5000);
        assert_eq!(all.len(), 2000);
        assert_eq!(all[0].payload["seq"], 0);
    }

    #[test]
    fn test_recent_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        std::fs::write(
            &path,
            "{\"event\":\"a\",\"payload\":null,\"timestamp\":1.0}\n{\"event\":\"b\",\"payload\":null,\"timestamp\":2.0}",
        )
        .unwrap();

        let names: Vec<_> = read_recent(&path, 1).into_iter().map(|r| r.event).collect();
        assert_eq!(names, ["b"]);
        assert!(read_recent(&path, 0).is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_recent(&dir.path().join("none.jsonl"), 10).is_empty());
    }

    #[test]
    fn test_unwritable_path_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let log = EventLog::new(dir.path());
        log.append("client_new", Value::Null);
        assert!(log.recent(10).is_empty());
    }

    #[test]
    fn test_disabled_log() {
        let log = EventLog::disabled();
        log.append("client_new", Value::Null);
        assert!(log.path().is_none());
        assert!(log.recent(10).is_empty());
    }
}
