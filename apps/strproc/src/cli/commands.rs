//! CLI command implementations.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use strproc_core::{
    Observer, Pipeline, PipelineConfig, PipelineError, STAGE_KINDS, Stage, StageSpec,
};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a pipeline config file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Bytes read per chunk in `--split` mode.
const SPLIT_CHUNK_SIZE: usize = 8 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), PipelineError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| PipelineError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(PipelineError::InvalidConfig(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate that a path names an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, PipelineError> {
    let canonical = path.canonicalize().map_err(|e| {
        PipelineError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(PipelineError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// CONFIG LOADING
// =============================================================================

/// Merge a TOML config file and compact stage strings, file stages first.
pub fn load_config(
    config: Option<&Path>,
    stages: &[String],
) -> Result<PipelineConfig, PipelineError> {
    let mut merged = match config {
        Some(path) => {
            let path = validate_file_path(path)?;
            validate_file_size(&path, MAX_CONFIG_FILE_SIZE)?;
            let source = std::fs::read_to_string(&path)
                .map_err(|e| PipelineError::IoError(format!("Read config: {}", e)))?;
            tracing::debug!(path = %path.display(), "loaded pipeline config");
            PipelineConfig::from_toml_str(&source)?
        }
        None => PipelineConfig::default(),
    };

    merged.extend(PipelineConfig::from_compact(stages)?);
    Ok(merged)
}

/// Observer writing print-stage reports to stdout.
///
/// In JSON mode each report is a `{"print": ...}` object so the output stays
/// one JSON value per line.
pub fn stdout_observer(json_mode: bool) -> Observer {
    Rc::new(move |line: &str| {
        let mut stdout = io::stdout();
        let written = if json_mode {
            let report = serde_json::json!({ "print": line });
            writeln!(stdout, "{}", report)
        } else {
            writeln!(stdout, "{}", line)
        };
        if let Err(e) = written {
            tracing::warn!("Failed to write print report: {}", e);
        }
    })
}

// =============================================================================
// STREAMING
// =============================================================================

/// Counts reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Items fed to the pipeline head.
    pub items_in: usize,
    /// Items written from the pipeline tail.
    pub items_out: usize,
}

/// Feed `reader` through `pipeline`, writing every produced item to `writer`.
///
/// Without `split` each input line (terminator removed) is one item. With
/// `split` raw UTF-8 chunks are fed instead, for a pipeline whose head splits
/// them. Output ready after each item is written before the next one is read;
/// at end of input the pipeline receives `eof()` and the rest is written.
pub fn run_stream<R, W>(
    pipeline: &mut Pipeline<String>,
    reader: R,
    writer: &mut W,
    json_mode: bool,
    split: bool,
) -> Result<RunSummary, PipelineError>
where
    R: BufRead,
    W: Write,
{
    let mut summary = RunSummary::default();

    if split {
        feed_chunks(pipeline, reader, writer, json_mode, &mut summary)?;
    } else {
        for line in reader.lines() {
            feed(pipeline, line?, writer, json_mode, &mut summary)?;
        }
    }

    pipeline.eof()?;
    summary.items_out += write_ready(pipeline, writer, json_mode)?;
    writer.flush()?;

    Ok(summary)
}

fn feed<W: Write>(
    pipeline: &mut Pipeline<String>,
    item: String,
    writer: &mut W,
    json_mode: bool,
    summary: &mut RunSummary,
) -> Result<(), PipelineError> {
    pipeline.input(item)?;
    summary.items_in += 1;
    summary.items_out += write_ready(pipeline, writer, json_mode)?;
    Ok(())
}

/// Read fixed-size chunks, cutting each at the last complete UTF-8 character.
fn feed_chunks<R: Read, W: Write>(
    pipeline: &mut Pipeline<String>,
    mut reader: R,
    writer: &mut W,
    json_mode: bool,
    summary: &mut RunSummary,
) -> Result<(), PipelineError> {
    let mut buf = vec![0u8; SPLIT_CHUNK_SIZE];
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        pending.extend_from_slice(&buf[..n]);

        let valid = match std::str::from_utf8(&pending) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(PipelineError::IoError(format!("Invalid UTF-8 in input: {}", e)));
            }
        };
        if valid == 0 {
            continue;
        }

        let rest = pending.split_off(valid);
        let chunk = String::from_utf8(std::mem::replace(&mut pending, rest))
            .map_err(|e| PipelineError::IoError(format!("Invalid UTF-8 in input: {}", e)))?;
        feed(pipeline, chunk, writer, json_mode, summary)?;
    }

    if !pending.is_empty() {
        return Err(PipelineError::IoError(
            "Input ends inside a UTF-8 character".to_string(),
        ));
    }
    Ok(())
}

/// Write every item currently available at the tail. Returns the count.
fn write_ready<W: Write>(
    pipeline: &mut Pipeline<String>,
    writer: &mut W,
    json_mode: bool,
) -> Result<usize, PipelineError> {
    let mut written = 0;
    for item in pipeline.outputs() {
        let item = item?;
        if json_mode {
            let encoded = serde_json::to_string(&item)
                .map_err(|e| PipelineError::IoError(format!("Encode output: {}", e)))?;
            writeln!(writer, "{}", encoded)?;
        } else {
            writeln!(writer, "{}", item)?;
        }
        written += 1;
    }
    Ok(written)
}

// =============================================================================
// PIPELINE REPORT
// =============================================================================

/// One row of `check` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub kind: &'static str,
    pub flags: Vec<&'static str>,
}

/// Describe the top-level stages of a built pipeline.
pub fn describe_pipeline(pipeline: &Pipeline<String>) -> Vec<StageReport> {
    pipeline
        .stage_kinds()
        .into_iter()
        .zip(pipeline.stage_flags())
        .map(|(kind, flags)| StageReport {
            kind,
            flags: flags.names(),
        })
        .collect()
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Filter input through the configured pipeline.
pub fn cmd_run(
    config: Option<&Path>,
    stages: &[String],
    input: Option<&Path>,
    split: bool,
    json_mode: bool,
) -> Result<(), PipelineError> {
    let mut pipeline_config = load_config(config, stages)?;
    if split {
        pipeline_config.prepend(StageSpec::SplitLines);
    }
    if pipeline_config.stages.is_empty() {
        tracing::info!("No stages configured, passing input through");
    }

    let mut pipeline = pipeline_config.build(&stdout_observer(json_mode))?;
    let mut stdout = io::stdout();

    let summary = match input {
        Some(path) => {
            let path = validate_file_path(path)?;
            let file = File::open(&path)
                .map_err(|e| PipelineError::IoError(format!("Open input: {}", e)))?;
            run_stream(
                &mut pipeline,
                BufReader::new(file),
                &mut stdout,
                json_mode,
                split,
            )?
        }
        None => run_stream(&mut pipeline, io::stdin().lock(), &mut stdout, json_mode, split)?,
    };

    tracing::info!(
        items_in = summary.items_in,
        items_out = summary.items_out,
        "Run complete"
    );

    if !pipeline.state()?.can_input() {
        tracing::warn!("Pipeline finished unable to accept input");
    }
    Ok(())
}

/// Validate the configured pipeline and print its stages.
pub fn cmd_check(
    config: Option<&Path>,
    stages: &[String],
    json_mode: bool,
) -> Result<(), PipelineError> {
    let pipeline_config = load_config(config, stages)?;
    let quiet: Observer = Rc::new(|_: &str| {});
    let pipeline = pipeline_config.build(&quiet)?;
    let report = describe_pipeline(&pipeline);
    let appended_buffer = pipeline.stage_count() > pipeline_config.stages.len();

    if json_mode {
        let output = serde_json::json!({
            "valid": true,
            "stage_count": pipeline.stage_count(),
            "appended_buffer": appended_buffer,
            "stages": report
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("Pipeline OK ({} stages)", pipeline.stage_count());
        let flags = pipeline.stage_flags();
        for (i, (stage, flags)) in report.iter().zip(flags).enumerate() {
            println!("  {:>2}. {:<14} {}", i, stage.kind, flags);
        }
        if appended_buffer {
            println!("  (trailing buffer appended)");
        }
    }

    Ok(())
}

/// List available stage kinds.
pub fn cmd_kinds(json_mode: bool) -> Result<(), PipelineError> {
    if json_mode {
        let kinds: Vec<_> = STAGE_KINDS
            .iter()
            .map(|(name, about)| serde_json::json!({ "kind": name, "description": about }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&kinds).unwrap_or_default()
        );
    } else {
        println!("Stage kinds:");
        for (name, about) in STAGE_KINDS {
            println!("  {:<22} {}", name, about);
        }
    }
    Ok(())
}
