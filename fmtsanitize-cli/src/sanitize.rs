use std::fs;
use std::path::{Path, PathBuf};

use fmtsanitize::{RewriteOutcome, Rewriter};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;

/// What happened to one resource file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Rewritten { replacements: usize },
    Unchanged,
    /// Not parsable as XML; left as is.
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Rewrites one resource file.
///
/// The result is written to `output`, or back to `input` when no output is
/// given. An unchanged or unparsable input is copied to `output` verbatim.
/// Nothing is written in `dry_run` mode.
pub fn sanitize_file(
    input: &Path,
    output: Option<&Path>,
    rewriter: &Rewriter,
    dry_run: bool,
) -> Result<FileStatus, String> {
    let raw = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read {}: {}", input.display(), e))?;

    let outcome = rewriter
        .rewrite_str(&raw)
        .map_err(|e| format!("Failed to rewrite {}: {}", input.display(), e))?;

    let (status, content) = match outcome {
        RewriteOutcome::Rewritten { content, report } => (
            FileStatus::Rewritten {
                replacements: report.replacements(),
            },
            Some(content),
        ),
        RewriteOutcome::Unchanged => (FileStatus::Unchanged, None),
        RewriteOutcome::Unparsable(reason) => (FileStatus::Skipped { reason }, None),
    };
    if dry_run {
        return Ok(status);
    }

    let target = output.unwrap_or(input);
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    match content {
        Some(content) => fs::write(target, content)
            .map_err(|e| format!("Failed to write {}: {}", target.display(), e))?,
        None if target != input => {
            fs::copy(input, target).map_err(|e| {
                format!(
                    "Failed to copy {} to {}: {}",
                    input.display(),
                    target.display(),
                    e
                )
            })?;
        }
        None => {}
    }
    Ok(status)
}

/// Rewrites every file in place, in parallel. Failures are recorded per file.
pub fn sanitize_files(paths: &[PathBuf], rewriter: &Rewriter, dry_run: bool) -> Vec<FileResult> {
    paths
        .par_iter()
        .map(|path| {
            let status = sanitize_file(path, None, rewriter, dry_run)
                .unwrap_or_else(|error| FileStatus::Failed { error });
            FileResult {
                path: path.clone(),
                status,
            }
        })
        .collect()
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub rewritten: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub replacements: usize,
}

impl Summary {
    pub fn from_results(results: &[FileResult]) -> Self {
        let mut summary = Summary {
            files: results.len(),
            ..Summary::default()
        };
        for result in results {
            match &result.status {
                FileStatus::Rewritten { replacements } => {
                    summary.rewritten += 1;
                    summary.replacements += replacements;
                }
                FileStatus::Unchanged => summary.unchanged += 1,
                FileStatus::Skipped { .. } => summary.skipped += 1,
                FileStatus::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

pub fn print_scan_results(results: &[FileResult], dry_run: bool, json_output: bool) {
    let summary = Summary::from_results(results);

    if json_output {
        let body = json!({
            "dry_run": dry_run,
            "summary": {
                "files": summary.files,
                "rewritten": summary.rewritten,
                "unchanged": summary.unchanged,
                "skipped": summary.skipped,
                "failed": summary.failed,
                "replacements": summary.replacements,
            },
            "files": results,
        });
        match serde_json::to_string_pretty(&body) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Error: failed to encode report: {}", e),
        }
        return;
    }

    let verb = if dry_run { "Would rewrite" } else { "Rewrote" };
    for result in results {
        match &result.status {
            FileStatus::Rewritten { replacements } => println!(
                "✅ {} {} ({} placeholder{})",
                verb,
                result.path.display(),
                replacements,
                if *replacements == 1 { "" } else { "s" }
            ),
            FileStatus::Unchanged => {}
            FileStatus::Skipped { reason } => {
                println!("⚠️  Skipped {}: {}", result.path.display(), reason)
            }
            FileStatus::Failed { error } => eprintln!("❌ {}", error),
        }
    }

    println!("=== Summary ===");
    println!("Files scanned: {}", summary.files);
    println!("Rewritten: {}", summary.rewritten);
    println!("Unchanged: {}", summary.unchanged);
    println!("Skipped: {}", summary.skipped);
    println!("Failed: {}", summary.failed);
    println!("Placeholders replaced: {}", summary.replacements);
}
