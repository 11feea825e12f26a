use crate::dataset::{RawDataset, TrainingExample};
use crate::error::{TrainingError, TrainingResult};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Result of loading a dataset for validation.
///
/// Loading never fails outright: a missing or unparsable file is reported as
/// such and validates as an empty dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(RawDataset),
    Missing,
    Malformed { line: usize, message: String },
}

/// Parse JSON Lines content. Blank lines are skipped; any other line must be valid JSON.
pub fn parse_jsonl(contents: &str) -> TrainingResult<RawDataset> {
    let mut dataset = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .map_err(|e| TrainingError::MalformedLine { line: idx + 1, message: e.to_string() })?;
        dataset.push(value);
    }

    Ok(dataset)
}

pub fn read_jsonl_dataset(path: &Path) -> TrainingResult<RawDataset> {
    let contents = std::fs::read_to_string(path)?;
    parse_jsonl(&contents)
}

/// Load a fresh snapshot of `path` for validation.
pub fn load_dataset(path: &Path) -> LoadOutcome {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "dataset file not found");
            return LoadOutcome::Missing;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read dataset file");
            return LoadOutcome::Malformed { line: 0, message: e.to_string() };
        }
    };

    match parse_jsonl(&contents) {
        Ok(examples) => {
            debug!(path = %path.display(), examples = examples.len(), "loaded dataset");
            LoadOutcome::Loaded(examples)
        }
        Err(TrainingError::MalformedLine { line, message }) => {
            warn!(path = %path.display(), line, error = %message, "dataset file is not valid JSON Lines");
            LoadOutcome::Malformed { line, message }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse dataset file");
            LoadOutcome::Malformed { line: 0, message: e.to_string() }
        }
    }
}

/// Append one example as a new line, creating the file if needed.
///
/// Existing lines are never rewritten. If the file does not end with a
/// newline one is written first so the new record starts on its own line.
pub fn append_example(path: &Path, example: &TrainingExample) -> TrainingResult<()> {
    example.validate()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().read(true).append(true).create(true).open(path)?;

    let mut line = String::new();
    if file.metadata()?.len() > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            line.push('\n');
        }
    }
    line.push_str(&serde_json::to_string(example)?);
    line.push('\n');

    file.write_all(line.as_bytes())?;
    file.flush()?;

    debug!(path = %path.display(), messages = example.messages.len(), "appended example");
    Ok(())
}
