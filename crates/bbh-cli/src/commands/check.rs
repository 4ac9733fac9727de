use std::error::Error;
use std::path::{Path, PathBuf};

use bbh_meta::{parse_file, to_canonical_json_bytes, validate, Finding, ParseOptions, Severity};
use clap::Args;
use serde::Serialize;
use tracing::info;
use walkdir::WalkDir;

/// File name searched for when a directory is given.
const METADATA_FILE_NAME: &str = "metadata.txt";

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Metadata files, or directories searched recursively for `metadata.txt`.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Treat validation warnings as failures.
    #[arg(long)]
    pub strict: bool,
    /// Emit the per-file results as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct FileResult {
    path: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    findings: Vec<Finding>,
}

pub fn run(args: &CheckArgs, opts: &ParseOptions) -> Result<(), Box<dyn Error>> {
    let files = collect_files(&args.paths);
    if files.is_empty() {
        return Err("no metadata files found".into());
    }
    // Findings are reported once, in the per-file results.
    let opts = ParseOptions {
        validate: false,
        ..opts.clone()
    };
    let results: Vec<FileResult> = files
        .iter()
        .map(|path| check_file(path, &opts, args.strict))
        .collect();
    let failed = results.iter().filter(|result| !result.ok).count();

    if args.json {
        print!("{}", String::from_utf8(to_canonical_json_bytes(&results)?)?);
    } else {
        for result in &results {
            print_result(result);
        }
    }
    info!(files = results.len(), failed, "check finished");
    if failed > 0 {
        return Err(format!("{failed} of {} metadata files failed", results.len()).into());
    }
    Ok(())
}

fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.file_type().is_file() && entry.file_name() == METADATA_FILE_NAME {
                files.push(entry.into_path());
            }
        }
    }
    files
}

fn check_file(path: &Path, opts: &ParseOptions, strict: bool) -> FileResult {
    let display = path.display().to_string();
    match parse_file(path, opts) {
        Ok(record) => {
            let report = validate(&record);
            FileResult {
                path: display,
                ok: !(strict && report.has_warnings()),
                error: None,
                findings: report.findings,
            }
        }
        Err(err) => FileResult {
            path: display,
            ok: false,
            error: Some(err.to_string()),
            findings: Vec::new(),
        },
    }
}

fn print_result(result: &FileResult) {
    let status = if result.ok { "ok" } else { "FAIL" };
    match &result.error {
        Some(error) => println!("{status} {}: {error}", result.path),
        None => println!("{status} {}", result.path),
    }
    for finding in &result.findings {
        let label = match finding.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        println!("  {label} {}: {}", finding.key, finding.message);
    }
}
