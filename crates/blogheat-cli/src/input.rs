use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use blogheat_core::ContentRecord;
use serde::Deserialize;

/// Either a bare array of articles or the list response envelope
/// (`{"data": [...], "total": n}`) returned by the blog API.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordList {
    Plain(Vec<ContentRecord>),
    Envelope { data: Vec<ContentRecord> },
}

/// Read records from a file path, or from stdin when `source` is `-`.
pub fn load_records(source: &str) -> Result<Vec<ContentRecord>> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read article list from stdin")?;
        buf
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("Failed to read input file '{}'", source))?
    };

    let records = parse_records(&content)
        .with_context(|| format!("Could not parse article list from '{}'", source))?;
    tracing::debug!(count = records.len(), source, "loaded records");
    Ok(records)
}

pub fn parse_records(content: &str) -> Result<Vec<ContentRecord>> {
    let list: RecordList = serde_json::from_str(content)
        .context("expected a JSON array of articles or an object with a \"data\" array")?;
    Ok(match list {
        RecordList::Plain(records) => records,
        RecordList::Envelope { data } => data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let records = parse_records(r#"[{"CreatedAt": "2026-02-01T10:00:00+08:00"}]"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_envelope() {
        let records = parse_records(
            r#"{"status": 200, "data": [{"createdAt": "2026-02-01T10:00:00+08:00"}, {}], "total": 2}"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].created_at, None);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(parse_records("{}").is_err());
        assert!(parse_records("not json").is_err());
        assert!(parse_records(r#"{"data": 3}"#).is_err());
    }
}
