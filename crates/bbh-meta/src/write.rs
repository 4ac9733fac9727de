//! Canonical text layout for records.

use crate::keys::Section;
use crate::record::SimulationRecord;

const BANNER: &str =
    "#-------------------------------------------------------------------------------";

fn push_line(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    if value.is_empty() {
        out.push_str(" =\n");
    } else {
        out.push_str(" = ");
        out.push_str(value);
        out.push('\n');
    }
}

fn push_banner(out: &mut String, title: &str) {
    out.push('\n');
    out.push_str(BANNER);
    out.push_str("\n# ");
    out.push_str(title);
    out.push('\n');
    out.push_str(BANNER);
    out.push('\n');
}

/// Writes `record` in the canonical layout: sectioned, known keys in table
/// order with their original value text, unknown keys last.
pub fn to_text(record: &SimulationRecord) -> String {
    let mut out = String::new();
    match &record.identity().simulation_name {
        Some(name) => out.push_str(&format!("# metadata.txt - {name}\n")),
        None => out.push_str("# metadata.txt\n"),
    }

    let entries: Vec<_> = record.entries().collect();
    for section in Section::ALL {
        let mut in_section = entries
            .iter()
            .filter(|(spec, _)| spec.section == section)
            .peekable();
        if in_section.peek().is_none() {
            continue;
        }
        push_banner(&mut out, section.title());
        for (spec, raw) in in_section {
            push_line(&mut out, spec.name, raw);
        }
    }

    if !record.extras().is_empty() {
        push_banner(&mut out, "Additional fields");
        for entry in record.extras() {
            push_line(&mut out, &entry.key, &entry.value);
        }
    }
    out
}
