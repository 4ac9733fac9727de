use std::error::Error;
use std::fs;
use std::path::PathBuf;

use bbh_meta::{parse_file, to_text, ParseOptions};
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Metadata file to format.
    pub file: PathBuf,
    /// Rewrite the file in place instead of printing to stdout.
    #[arg(long)]
    pub write: bool,
    /// Exit with an error if the file is not already in canonical layout.
    #[arg(long, conflicts_with = "write")]
    pub check: bool,
}

pub fn run(args: &FmtArgs, opts: &ParseOptions) -> Result<(), Box<dyn Error>> {
    let record = parse_file(&args.file, opts)?;
    let text = to_text(&record);
    if args.check {
        let current = fs::read_to_string(&args.file)?;
        if current != text {
            return Err(format!("{} is not canonically formatted", args.file.display()).into());
        }
        return Ok(());
    }
    if args.write {
        fs::write(&args.file, &text)?;
        info!(path = %args.file.display(), keys = record.len(), "rewrote metadata");
    } else {
        print!("{text}");
    }
    Ok(())
}
