use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use bbh_core::format_float;
use bbh_meta::{
    parse_file, record_hash, to_canonical_json_bytes, to_text, DerivedQuantities, ParseOptions,
    SimulationRecord,
};
use clap::{Args, ValueEnum};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
    Csv,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Metadata file to parse.
    pub file: PathBuf,
    /// Output representation.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
    /// Include derived quantities (mass ratio, effective spin, kick).
    #[arg(long)]
    pub derived: bool,
}

#[derive(Debug, Serialize)]
struct ShowReport<'a> {
    hash: String,
    record: &'a SimulationRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    derived: Option<DerivedQuantities>,
    cited_keys: Vec<&'a str>,
}

pub fn run(args: &ShowArgs, opts: &ParseOptions) -> Result<(), Box<dyn Error>> {
    let record = parse_file(&args.file, opts)?;
    let derived = args.derived.then(|| DerivedQuantities::from_record(&record));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Json => {
            let report = ShowReport {
                hash: record_hash(&record)?,
                record: &record,
                derived,
                cited_keys: record.bibliography().cited_keys(),
            };
            out.write_all(&to_canonical_json_bytes(&report)?)?;
        }
        OutputFormat::Text => out.write_all(to_text(&record).as_bytes())?,
        OutputFormat::Csv => write_csv(&mut out, &record, derived.as_ref())?,
    }
    out.flush()?;
    Ok(())
}

fn write_csv<W: Write>(
    out: W,
    record: &SimulationRecord,
    derived: Option<&DerivedQuantities>,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["key", "value"])?;
    for (spec, raw) in record.entries() {
        wtr.write_record([spec.name, raw])?;
    }
    for entry in record.extras() {
        wtr.write_record([entry.key.as_str(), entry.value.as_str()])?;
    }
    if let Some(derived) = derived {
        let rows = [
            ("derived-total-mass", derived.total_mass),
            ("derived-mass-ratio", derived.mass_ratio),
            ("derived-symmetric-mass-ratio", derived.symmetric_mass_ratio),
            ("derived-chi-eff", derived.chi_eff),
            ("derived-remnant-spin-magnitude", derived.remnant_spin_magnitude),
            ("derived-remnant-kick", derived.remnant_kick),
            ("derived-ringdown-mass", derived.ringdown.map(|r| r.mass)),
            ("derived-ringdown-chi", derived.ringdown.map(|r| r.chi)),
        ];
        for (key, value) in rows {
            if let Some(value) = value {
                wtr.write_record([key, format_float(value).as_str()])?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}
