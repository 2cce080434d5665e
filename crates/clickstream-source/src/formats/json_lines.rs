use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::errors::SourceError;
use crate::model::RawEvent;

pub(super) fn read_file(path: &Path) -> Result<Vec<RawEvent>, SourceError> {
    let content = fs::read_to_string(path).map_err(|err| SourceError::io(path, err))?;
    Ok(parse_json_lines(&content))
}

/// Parses newline-delimited JSON. Blank lines are skipped; a line that is not valid JSON becomes
/// an all-null event so the quality filter accounts for it.
pub fn parse_json_lines(content: &str) -> Vec<RawEvent> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_index, line)| match serde_json::from_str::<Value>(line) {
            Ok(value) => RawEvent::from_json_value(&value),
            Err(err) => {
                debug!(line_index, error = %err, "malformed JSON line kept as an empty record");
                RawEvent::default()
            }
        })
        .collect()
}
