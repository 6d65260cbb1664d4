//! Word-level transcript loading.
//!
//! We read the JSON layout produced by word-aligning transcription tools: a top-level
//! `word_segments` container whose entries carry a `word` plus optional `start`/`end`
//! times in seconds.
//!
//! `word_segments` may be either an object keyed by segment ID (document order is kept)
//! or a plain array. Timestamps may be numbers, `null`, absent, or numeric strings.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// One word from the transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub word: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

/// Load transcript entries from a JSON file on disk.
pub fn load_transcript(path: impl AsRef<Path>) -> Result<Vec<TranscriptEntry>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::parse(format!("cannot open '{}': {e}", path.display())))?;

    tracing::info!(path = %path.display(), "loading transcript");
    parse_transcript(BufReader::new(file))
}

/// Parse transcript entries from any JSON byte stream.
pub fn parse_transcript<R: Read>(r: R) -> Result<Vec<TranscriptEntry>> {
    let doc: Value =
        serde_json::from_reader(r).map_err(|e| Error::parse(format!("invalid JSON: {e}")))?;
    entries_from_value(&doc)
}

/// Extract transcript entries from an already-parsed JSON document.
pub fn entries_from_value(doc: &Value) -> Result<Vec<TranscriptEntry>> {
    let segments = doc
        .get("word_segments")
        .ok_or_else(|| Error::parse("missing top-level `word_segments`"))?;

    match segments {
        Value::Object(map) => map
            .iter()
            .map(|(id, v)| entry_from_value(id, v))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| entry_from_value(&i.to_string(), v))
            .collect(),
        _ => Err(Error::parse("`word_segments` must be an object or an array")),
    }
}

fn entry_from_value(id: &str, v: &Value) -> Result<TranscriptEntry> {
    let Value::Object(fields) = v else {
        return Err(Error::schema(format!("segment '{id}' is not an object")));
    };

    let word = match fields.get("word") {
        Some(Value::String(s)) => s.clone(),
        // A null word never matches the flag pattern.
        Some(Value::Null) => String::new(),
        Some(_) => return Err(Error::schema(format!("segment '{id}': `word` is not a string"))),
        None => return Err(Error::schema(format!("segment '{id}' has no `word` field"))),
    };

    Ok(TranscriptEntry {
        word,
        start: time_field(id, "start", fields.get("start"))?,
        end: time_field(id, "end", fields.get("end"))?,
    })
}

/// Read an optional seconds value. Non-finite numbers are treated as missing.
fn time_field(id: &str, name: &str, v: Option<&Value>) -> Result<Option<f64>> {
    let secs = match v {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => Some(s.trim().parse::<f64>().map_err(|_| {
            Error::schema(format!("segment '{id}': `{name}` is not numeric: {s:?}"))
        })?),
        Some(other) => {
            return Err(Error::schema(format!(
                "segment '{id}': `{name}` has unexpected type: {other}"
            )));
        }
    };

    Ok(secs.filter(|t| t.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<TranscriptEntry>> {
        parse_transcript(json.as_bytes())
    }

    #[test]
    fn object_layout_keeps_document_order() -> anyhow::Result<()> {
        let entries = parse(
            r#"{"word_segments": {
                "7": {"word": "first", "start": 0.5, "end": 0.9},
                "2": {"word": "second", "start": 1.0, "end": 1.4}
            }}"#,
        )?;

        let words: Vec<_> = entries.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["first", "second"]);
        assert_eq!(entries[0].start, Some(0.5));
        assert_eq!(entries[1].end, Some(1.4));
        Ok(())
    }

    #[test]
    fn array_layout_is_accepted() -> anyhow::Result<()> {
        let entries = parse(r#"{"word_segments": [{"word": "hi", "start": 1, "end": 2}]}"#)?;
        assert_eq!(
            entries,
            vec![TranscriptEntry {
                word: "hi".into(),
                start: Some(1.0),
                end: Some(2.0),
            }]
        );
        Ok(())
    }

    #[test]
    fn missing_and_null_times_become_none() -> anyhow::Result<()> {
        let entries = parse(r#"{"word_segments": {"0": {"word": "x", "start": null}}}"#)?;
        assert_eq!(entries[0].start, None);
        assert_eq!(entries[0].end, None);
        Ok(())
    }

    #[test]
    fn numeric_strings_are_parsed() -> anyhow::Result<()> {
        let entries =
            parse(r#"{"word_segments": {"0": {"word": "x", "start": "2.5", "end": " 3 "}}}"#)?;
        assert_eq!(entries[0].start, Some(2.5));
        assert_eq!(entries[0].end, Some(3.0));
        Ok(())
    }

    #[test]
    fn invalid_json_is_parse_error() {
        assert!(matches!(parse("{not json"), Err(Error::Parse(_))));
    }

    #[test]
    fn missing_word_segments_is_parse_error() {
        assert!(matches!(parse(r#"{"segments": []}"#), Err(Error::Parse(_))));
        assert!(matches!(
            parse(r#"{"word_segments": 3}"#),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn entry_without_word_is_schema_error() {
        let err = parse(r#"{"word_segments": {"4": {"start": 1, "end": 2}}}"#).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert!(err.to_string().contains("segment '4'"));
    }

    #[test]
    fn null_word_is_kept_as_unflagged_entry() -> anyhow::Result<()> {
        let entries = parse(
            r#"{"word_segments": {
                "0": {"word": null, "start": 0.5, "end": 1.0},
                "1": {"word": "**x**", "start": 2.0, "end": 3.0}
            }}"#,
        )?;

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].word, "");
        assert_eq!(entries[1].word, "**x**");
        Ok(())
    }

    #[test]
    fn non_string_word_is_schema_error() {
        assert!(matches!(
            parse(r#"{"word_segments": [{"word": 42, "start": 1, "end": 2}]}"#),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn bad_time_type_is_schema_error() {
        assert!(matches!(
            parse(r#"{"word_segments": [{"word": "x", "start": true}]}"#),
            Err(Error::Schema(_))
        ));
        assert!(matches!(
            parse(r#"{"word_segments": [{"word": "x", "end": "soon"}]}"#),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn unreadable_file_is_parse_error() {
        let err = load_transcript("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
