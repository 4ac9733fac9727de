use std::error::Error;

use bbh_meta::keys::in_section;
use bbh_meta::{to_canonical_json_bytes, Section, KEYS};
use clap::Args;

#[derive(Args, Debug)]
pub struct KeysArgs {
    /// Emit the key table as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &KeysArgs) -> Result<(), Box<dyn Error>> {
    if args.json {
        print!("{}", String::from_utf8(to_canonical_json_bytes(&KEYS)?)?);
        return Ok(());
    }
    let width = KEYS.iter().map(|spec| spec.name.len()).max().unwrap_or(0);
    for section in Section::ALL {
        println!("# {}", section.title());
        for spec in in_section(section) {
            println!("{:width$}  {}", spec.name, spec.kind.name());
        }
    }
    Ok(())
}
