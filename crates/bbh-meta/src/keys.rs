//! Table of known keys, their value kinds and the section they belong to.

use serde::Serialize;

use crate::value::ValueKind;

/// Decorative section a key is grouped under when writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    /// Names, keywords and contacts.
    Identity,
    /// Citation keys.
    Bibliography,
    /// Initial-data solver parameters.
    InitialData,
    /// Quantities at t=0.
    InitialQuantities,
    /// Quantities at the reference time.
    ReferenceQuantities,
    /// Whole-run summary.
    Evolution,
    /// Final black hole.
    Remnant,
    /// Layout version and code revisions.
    Provenance,
}

impl Section {
    /// Sections in writer order.
    pub const ALL: [Section; 8] = [
        Section::Identity,
        Section::Bibliography,
        Section::InitialData,
        Section::InitialQuantities,
        Section::ReferenceQuantities,
        Section::Evolution,
        Section::Remnant,
        Section::Provenance,
    ];

    /// Banner title.
    pub fn title(&self) -> &'static str {
        match self {
            Section::Identity => "Simulation identity",
            Section::Bibliography => "Bibliography",
            Section::InitialData => "Initial data parameters",
            Section::InitialQuantities => "t=0 quantities",
            Section::ReferenceQuantities => "Quantities at the reference time",
            Section::Evolution => "Whole-evolution summary",
            Section::Remnant => "Remnant properties",
            Section::Provenance => "Code versions",
        }
    }
}

/// Static description of a known key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeySpec {
    /// Canonical spelling.
    pub name: &'static str,
    /// Kind the value is coerced into.
    pub kind: ValueKind,
    /// Section the key is written under.
    pub section: Section,
}

const fn spec(name: &'static str, kind: ValueKind, section: Section) -> KeySpec {
    KeySpec {
        name,
        kind,
        section,
    }
}

use Section::*;
use ValueKind::*;

/// Every known key, in writer order.
pub const KEYS: &[KeySpec] = &[
    spec("simulation-name", Text, Identity),
    spec("alternative-names", TextList, Identity),
    spec("keywords", TextList, Identity),
    spec("point-of-contact-email", Text, Identity),
    spec("authors-emails", TextList, Identity),
    spec("simulation-bibtex-keys", TextList, Bibliography),
    spec("code-bibtex-keys", TextList, Bibliography),
    spec("initial-data-bibtex-keys", TextList, Bibliography),
    spec("quasicircular-bibtex-keys", TextList, Bibliography),
    spec("initial-separation", Float, InitialData),
    spec("initial-orbital-frequency", Float, InitialData),
    spec("initial-adot", Float, InitialData),
    spec("object1", Object, InitialData),
    spec("object2", Object, InitialData),
    spec("initial-ADM-energy", Float, InitialQuantities),
    spec("initial-ADM-linear-momentum", Vector, InitialQuantities),
    spec("initial-ADM-angular-momentum", Vector, InitialQuantities),
    spec("initial-mass1", Float, InitialQuantities),
    spec("initial-mass2", Float, InitialQuantities),
    spec("initial-dimensionless-spin1", Vector, InitialQuantities),
    spec("initial-dimensionless-spin2", Vector, InitialQuantities),
    spec("initial-position1", Vector, InitialQuantities),
    spec("initial-position2", Vector, InitialQuantities),
    spec("reference-time", Float, ReferenceQuantities),
    spec("reference-mass1", Float, ReferenceQuantities),
    spec("reference-mass2", Float, ReferenceQuantities),
    spec("reference-dimensionless-spin1", Vector, ReferenceQuantities),
    spec("reference-dimensionless-spin2", Vector, ReferenceQuantities),
    spec("reference-position1", Vector, ReferenceQuantities),
    spec("reference-position2", Vector, ReferenceQuantities),
    spec("reference-orbital-frequency", Vector, ReferenceQuantities),
    spec("reference-eccentricity", Bounded, ReferenceQuantities),
    spec("reference-mean-anomaly", Float, ReferenceQuantities),
    spec("common-horizon-time", Float, Evolution),
    spec("number-of-orbits", Float, Evolution),
    spec("remnant-mass", Float, Remnant),
    spec("remnant-dimensionless-spin", Vector, Remnant),
    spec("remnant-velocity", Vector, Remnant),
    spec("metadata-version", Integer, Provenance),
    spec("spec-revisions", TextList, Provenance),
    spec("spells-revision", Text, Provenance),
];

/// Keys whose values must be strictly positive.
pub const MASS_KEYS: &[&str] = &[
    "initial-mass1",
    "initial-mass2",
    "reference-mass1",
    "reference-mass2",
    "remnant-mass",
];

const RELAXED_PREFIX: &str = "relaxed-";
const REFERENCE_PREFIX: &str = "reference-";

/// Resolves a key as written to its table entry, ignoring ASCII case.
pub fn lookup(key: &str) -> Option<&'static KeySpec> {
    KEYS.iter().find(|spec| spec.name.eq_ignore_ascii_case(key))
}

/// Like [`lookup`], additionally accepting the older `relaxed-*` spellings
/// of the reference-time keys.
pub fn lookup_with_aliases(key: &str) -> Option<&'static KeySpec> {
    if let Some(spec) = lookup(key) {
        return Some(spec);
    }
    let lowered = key.to_ascii_lowercase();
    let rest = lowered.strip_prefix(RELAXED_PREFIX)?;
    if rest == "measurement-time" {
        return lookup("reference-time");
    }
    lookup(&format!("{REFERENCE_PREFIX}{rest}"))
}

/// Known keys belonging to `section`, in writer order.
pub fn in_section(section: Section) -> impl Iterator<Item = &'static KeySpec> {
    KEYS.iter().filter(move |spec| spec.section == section)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(
            lookup("initial-adm-energy").map(|s| s.name),
            Some("initial-ADM-energy")
        );
        assert!(lookup("unknown-key").is_none());
    }

    #[test]
    fn relaxed_aliases_resolve() {
        assert!(lookup("relaxed-mass1").is_none());
        assert_eq!(
            lookup_with_aliases("relaxed-mass1").map(|s| s.name),
            Some("reference-mass1")
        );
        assert_eq!(
            lookup_with_aliases("relaxed-measurement-time").map(|s| s.name),
            Some("reference-time")
        );
        assert!(lookup_with_aliases("relaxed-nonsense").is_none());
    }

    #[test]
    fn every_key_has_a_section_in_order() {
        let ordered: Vec<_> = Section::ALL
            .iter()
            .flat_map(|section| in_section(*section))
            .map(|spec| spec.name)
            .collect();
        let table: Vec<_> = KEYS.iter().map(|spec| spec.name).collect();
        assert_eq!(ordered, table);
    }

    #[test]
    fn mass_keys_are_floats() {
        for key in MASS_KEYS {
            assert_eq!(lookup(key).map(|s| s.kind), Some(ValueKind::Float), "{key}");
        }
    }
}
