//! JSONL storage: one schema record per line.
//!
//! The portable on-disk form of a schema store. A file holds each widget
//! key at most once; blank lines and `#` comments are skipped on read.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use widgetry_kernel::SchemaRecord;

/// First line of every file written by [`write_records`].
pub const STORE_HEADER: &str = "# widgetry schema records v1";

/// Errors from JSONL operations.
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: read error: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("write error: {0}")]
    Write(#[source] io::Error),

    #[error("line {line}: parse error: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: widget key must not be empty")]
    EmptyWidgetKey { line: usize },

    #[error("line {line}: duplicate widget key {widget_key} (first on line {first_line})")]
    DuplicateWidgetKey {
        widget_key: String,
        first_line: usize,
        line: usize,
    },

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("{}: corrupted payload: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: &'static str },
}

pub(crate) fn io_error(path: &Path) -> impl FnOnce(io::Error) -> JsonlError + '_ {
    move |source| JsonlError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read records from a JSONL reader, rejecting blank or repeated keys.
pub fn read_records(reader: impl BufRead) -> Result<Vec<SchemaRecord>, JsonlError> {
    let mut records = Vec::new();
    let mut first_lines: BTreeMap<String, usize> = BTreeMap::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| JsonlError::Read {
            line: line_no,
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: SchemaRecord =
            serde_json::from_str(trimmed).map_err(|e| JsonlError::Parse {
                line: line_no,
                message: e.to_string(),
            })?;
        if record.widget_key.trim().is_empty() {
            return Err(JsonlError::EmptyWidgetKey { line: line_no });
        }
        if let Some(&first_line) = first_lines.get(&record.widget_key) {
            return Err(JsonlError::DuplicateWidgetKey {
                widget_key: record.widget_key,
                first_line,
                line: line_no,
            });
        }
        first_lines.insert(record.widget_key.clone(), line_no);
        records.push(record);
    }
    Ok(records)
}

/// Write the store header, then one record per line.
pub fn write_records(
    writer: &mut impl Write,
    records: &[SchemaRecord],
) -> Result<(), JsonlError> {
    writeln!(writer, "{STORE_HEADER}").map_err(JsonlError::Write)?;
    for record in records {
        serde_json::to_writer(&mut *writer, record)
            .map_err(|e| JsonlError::Serialize(e.to_string()))?;
        writer.write_all(b"\n").map_err(JsonlError::Write)?;
    }
    Ok(())
}

/// Read records from a JSONL file path.
pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<SchemaRecord>, JsonlError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(io_error(path))?;
    validate_payload_bytes(path, &bytes)?;
    read_records(BufReader::new(bytes.as_slice()))
}

/// Write records to a JSONL file path, replacing it atomically.
pub fn write_records_to_path(
    path: impl AsRef<Path>,
    records: &[SchemaRecord],
) -> Result<(), JsonlError> {
    write_atomically(path.as_ref(), |writer| write_records(writer, records))
}

/// Write `path` through a hidden sibling temp file, then rename over it.
///
/// The temp file is synced before the rename and the parent directory
/// after it, so a crash leaves either the old or the new contents.
pub(crate) fn write_atomically(
    path: &Path,
    body: impl FnOnce(&mut BufWriter<File>) -> Result<(), JsonlError>,
) -> Result<(), JsonlError> {
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir).map_err(io_error(dir))?;
    }

    let staging = staging_path(path);
    let staged = stage(&staging, body);
    if let Err(error) = staged {
        let _ = fs::remove_file(&staging);
        return Err(error);
    }
    if let Err(source) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(JsonlError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    match parent {
        Some(dir) => sync_dir(dir),
        None => Ok(()),
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), JsonlError> {
    File::open(dir)
        .and_then(|handle| handle.sync_all())
        .map_err(io_error(dir))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), JsonlError> {
    Ok(())
}

fn stage(
    staging: &Path,
    body: impl FnOnce(&mut BufWriter<File>) -> Result<(), JsonlError>,
) -> Result<(), JsonlError> {
    let mut writer = BufWriter::new(File::create(staging).map_err(io_error(staging))?);
    body(&mut writer)?;
    let file = writer
        .into_inner()
        .map_err(|e| io_error(staging)(e.into_error()))?;
    file.sync_all().map_err(io_error(staging))
}

/// `dir/.name.<pid>.<nanos>.tmp`, next to the target so rename stays atomic.
fn staging_path(path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(".{}.{nanos}.tmp", std::process::id()));
    path.with_file_name(name)
}

pub(crate) fn validate_payload_bytes(path: &Path, bytes: &[u8]) -> Result<(), JsonlError> {
    let reason = if bytes.contains(&0) {
        "contains NUL byte(s)"
    } else if std::str::from_utf8(bytes).is_err() {
        "contains non-UTF-8 byte sequence(s)"
    } else {
        return Ok(());
    };
    Err(JsonlError::Corrupt {
        path: path.to_path_buf(),
        reason,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use widgetry_kernel::UiNode;

    pub(crate) fn temp_path(prefix: &str, extension: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "widgetry-{prefix}-{}-{unique}.{extension}",
            std::process::id()
        ))
    }

    #[test]
    fn read_records_skips_comments_and_blank_lines() {
        let payload = "# widgets\n\n{\"widgetKey\":\"w.a\",\"tree\":{\"kind\":\"text\"}}\n";
        let records = read_records(payload.as_bytes()).expect("payload should parse");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].widget_key, "w.a");
    }

    #[test]
    fn parse_errors_report_line_numbers() {
        let payload = "{\"widgetKey\":\"w.a\",\"tree\":{}}\n{not json}\n";
        match read_records(payload.as_bytes()) {
            Err(JsonlError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn blank_widget_key_is_rejected_with_its_line() {
        let payload = "# header\n{\"widgetKey\":\"  \",\"tree\":{}}\n";
        match read_records(payload.as_bytes()) {
            Err(JsonlError::EmptyWidgetKey { line }) => assert_eq!(line, 2),
            other => panic!("expected empty key error, got {other:?}"),
        }
    }

    #[test]
    fn repeated_widget_key_names_both_lines() {
        let payload = concat!(
            "{\"widgetKey\":\"w.a\",\"tree\":{}}\n",
            "{\"widgetKey\":\"w.b\",\"tree\":{}}\n",
            "{\"widgetKey\":\"w.a\",\"tree\":{\"kind\":\"row\"}}\n",
        );
        match read_records(payload.as_bytes()) {
            Err(JsonlError::DuplicateWidgetKey {
                widget_key,
                first_line,
                line,
            }) => {
                assert_eq!(widget_key, "w.a");
                assert_eq!((first_line, line), (1, 3));
            }
            other => panic!("expected duplicate key error, got {other:?}"),
        }
    }

    #[test]
    fn read_records_from_path_rejects_nul_payload() {
        let path = temp_path("nul", "jsonl");
        fs::write(
            &path,
            b"{\"widgetKey\":\"w.a\",\"tree\":{\"kind\":\"text\"}}\n\0garbage",
        )
        .expect("fixture should write");

        match read_records_from_path(&path) {
            Err(JsonlError::Corrupt { reason, .. }) => assert!(reason.contains("NUL")),
            other => panic!("expected corrupt payload error, got {other:?}"),
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn read_records_from_path_rejects_non_utf8_payload() {
        let path = temp_path("non-utf8", "jsonl");
        fs::write(&path, [0x7b, 0xff, 0xfe, 0x7d, b'\n']).expect("fixture should write");

        match read_records_from_path(&path) {
            Err(JsonlError::Corrupt { reason, .. }) => assert!(reason.contains("non-UTF-8")),
            other => panic!("expected corrupt payload error, got {other:?}"),
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn written_file_starts_with_header_and_reads_back() {
        let path = temp_path("header", "jsonl");
        let records = vec![
            SchemaRecord::new("w.a", UiNode::element("text")),
            SchemaRecord::new("w.b", UiNode::reference("w.a")),
        ];
        write_records_to_path(&path, &records).expect("write should succeed");

        let raw = fs::read_to_string(&path).expect("jsonl should exist");
        assert_eq!(raw.lines().next(), Some(STORE_HEADER));
        assert_eq!(raw.lines().count(), 3);
        assert_eq!(
            read_records_from_path(&path).expect("read should succeed"),
            records
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn write_records_to_path_replaces_file_atomically() {
        let path = temp_path("atomic-write", "jsonl");
        let first = SchemaRecord::new("w.first", UiNode::element("text"));
        write_records_to_path(&path, &[first]).expect("first write should succeed");

        let second = SchemaRecord::new("w.second", UiNode::element("text"));
        write_records_to_path(&path, &[second]).expect("second write should succeed");

        let lines = fs::read_to_string(&path).expect("jsonl should exist");
        assert!(!lines.contains("w.first"));
        assert!(lines.contains("w.second"));

        let dir = path.parent().expect("temp path has a parent");
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .expect("utf-8 name");
        let leftovers = fs::read_dir(dir)
            .expect("temp dir should list")
            .filter_map(Result::ok)
            .filter(|entry| {
                let entry_name = entry.file_name();
                let entry_name = entry_name.to_string_lossy();
                entry_name.starts_with(&format!(".{name}.")) && entry_name.ends_with(".tmp")
            })
            .count();
        assert_eq!(leftovers, 0);

        let _ = fs::remove_file(path);
    }
}
