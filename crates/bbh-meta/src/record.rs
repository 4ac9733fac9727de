//! Typed, immutable view of a parsed metadata file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use bbh_core::errors::{ErrorInfo, MetaError};
use bbh_core::provenance::{CodeProvenance, SchemaVersion};
use bbh_core::{Bounded, ObjectKind, Vec3};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, warn};

use crate::keys::{self, KeySpec, MASS_KEYS};
use crate::lexer::{scan, Document, Entry};
use crate::options::{DuplicatePolicy, ParseOptions};
use crate::validate::{validate, Severity};
use crate::value::{Value, ValueKind};

/// Who ran the simulation and how to find it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Identity {
    /// Catalog name, e.g. `q4_nospin_d13/Lev3`.
    pub simulation_name: Option<String>,
    /// Other names the run is known by.
    pub alternative_names: Option<Vec<String>>,
    /// Free-form tags.
    pub keywords: Option<Vec<String>>,
    /// Address to write to about the run.
    pub point_of_contact_email: Option<String>,
    /// Authors to contact, as `Name <email>` items.
    pub authors_emails: Option<Vec<String>>,
}

/// Citation keys grouped by the role of the cited work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Bibliography {
    /// Papers presenting the simulation itself.
    pub simulation: Option<Vec<String>>,
    /// Papers describing the evolution code.
    pub code: Option<Vec<String>>,
    /// Papers describing the initial-data method.
    pub initial_data: Option<Vec<String>>,
    /// Papers describing eccentricity reduction.
    pub quasicircular: Option<Vec<String>>,
}

/// Parameters handed to the initial-data solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InitialData {
    /// Coordinate separation of the two bodies.
    pub separation: Option<f64>,
    /// Orbital angular frequency.
    pub orbital_frequency: Option<f64>,
    /// Radial drift rate `ȧ`.
    pub adot: Option<f64>,
    /// Type of the first body.
    pub object1: Option<ObjectKind>,
    /// Type of the second body.
    pub object2: Option<ObjectKind>,
}

/// Mass, spin and position of one body at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BodyState {
    /// Christodoulou mass.
    pub mass: Option<f64>,
    /// Spin divided by mass squared.
    pub dimensionless_spin: Option<Vec3>,
    /// Coordinate position of the horizon centre.
    pub position: Option<Vec3>,
}

/// Quantities measured on the initial slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InitialQuantities {
    /// ADM energy of the initial slice.
    pub adm_energy: Option<f64>,
    /// ADM linear momentum.
    pub adm_linear_momentum: Option<Vec3>,
    /// ADM angular momentum.
    pub adm_angular_momentum: Option<Vec3>,
    /// First body at t=0.
    pub body1: BodyState,
    /// Second body at t=0.
    pub body2: BodyState,
}

/// Quantities measured once junk radiation has left the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReferenceQuantities {
    /// Reference time itself.
    pub time: Option<f64>,
    /// First body at the reference time.
    pub body1: BodyState,
    /// Second body at the reference time.
    pub body2: BodyState,
    /// Orbital angular velocity vector.
    pub orbital_frequency: Option<Vec3>,
    /// Orbital eccentricity, possibly only bounded from above.
    pub eccentricity: Option<Bounded>,
    /// Mean anomaly of the orbit.
    pub mean_anomaly: Option<f64>,
}

/// Run-level summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Evolution {
    /// Time a common apparent horizon was first found.
    pub common_horizon_time: Option<f64>,
    /// Orbits between the reference time and merger.
    pub number_of_orbits: Option<f64>,
}

/// Final black hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Remnant {
    /// Christodoulou mass of the remnant.
    pub mass: Option<f64>,
    /// Remnant spin divided by mass squared.
    pub dimensionless_spin: Option<Vec3>,
    /// Recoil velocity.
    pub velocity: Option<Vec3>,
}

#[derive(Debug, Clone)]
struct Field {
    /// `None` when the file carries the key with an empty value.
    value: Option<Value>,
    raw: String,
    line: usize,
}

/// One simulation's metadata.
///
/// Records are immutable: typed groups are read through accessors and the
/// raw text of every value is retained so writing reproduces it exactly.
///
/// Deserializing reads the JSON form back by rendering every typed value and
/// re-parsing it, so raw float text is regenerated rather than recovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RecordRepr")]
pub struct SimulationRecord {
    identity: Identity,
    bibliography: Bibliography,
    initial_data: InitialData,
    initial: InitialQuantities,
    reference: ReferenceQuantities,
    evolution: Evolution,
    remnant: Remnant,
    provenance: CodeProvenance,
    #[serde(
        serialize_with = "serialize_extras",
        skip_serializing_if = "Vec::is_empty"
    )]
    extras: Vec<Entry>,
    #[serde(skip)]
    fields: BTreeMap<&'static str, Field>,
    /// Whether `relaxed-*` spellings resolve to known keys in lookups.
    #[serde(skip)]
    accept_aliases: bool,
}

fn serialize_extras<S: Serializer>(extras: &[Entry], serializer: S) -> Result<S::Ok, S::Error> {
    let map: BTreeMap<&str, &str> = extras
        .iter()
        .map(|entry| (entry.key.as_str(), entry.value.as_str()))
        .collect();
    map.serialize(serializer)
}

/// JSON shape of a record as written by `Serialize`.
#[derive(Deserialize)]
struct RecordRepr {
    #[serde(default)]
    identity: Identity,
    #[serde(default)]
    bibliography: Bibliography,
    #[serde(default)]
    initial_data: InitialData,
    #[serde(default)]
    initial: InitialQuantities,
    #[serde(default)]
    reference: ReferenceQuantities,
    #[serde(default)]
    evolution: Evolution,
    #[serde(default)]
    remnant: Remnant,
    #[serde(default)]
    provenance: CodeProvenance,
    #[serde(default)]
    extras: BTreeMap<String, String>,
}

fn put<T: Into<Value>>(out: &mut Vec<(&'static str, Value)>, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        out.push((key, value.into()));
    }
}

fn put_body(out: &mut Vec<(&'static str, Value)>, keys: [&'static str; 3], body: &BodyState) {
    put(out, keys[0], body.mass);
    put(out, keys[1], body.dimensionless_spin);
    put(out, keys[2], body.position);
}

impl RecordRepr {
    fn typed_values(self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::new();
        let identity = self.identity;
        put(&mut out, "simulation-name", identity.simulation_name);
        put(&mut out, "alternative-names", identity.alternative_names);
        put(&mut out, "keywords", identity.keywords);
        put(&mut out, "point-of-contact-email", identity.point_of_contact_email);
        put(&mut out, "authors-emails", identity.authors_emails);

        let bibliography = self.bibliography;
        put(&mut out, "simulation-bibtex-keys", bibliography.simulation);
        put(&mut out, "code-bibtex-keys", bibliography.code);
        put(&mut out, "initial-data-bibtex-keys", bibliography.initial_data);
        put(&mut out, "quasicircular-bibtex-keys", bibliography.quasicircular);

        let initial_data = self.initial_data;
        put(&mut out, "initial-separation", initial_data.separation);
        put(&mut out, "initial-orbital-frequency", initial_data.orbital_frequency);
        put(&mut out, "initial-adot", initial_data.adot);
        put(&mut out, "object1", initial_data.object1);
        put(&mut out, "object2", initial_data.object2);

        let initial = self.initial;
        put(&mut out, "initial-ADM-energy", initial.adm_energy);
        put(&mut out, "initial-ADM-linear-momentum", initial.adm_linear_momentum);
        put(&mut out, "initial-ADM-angular-momentum", initial.adm_angular_momentum);
        put_body(
            &mut out,
            ["initial-mass1", "initial-dimensionless-spin1", "initial-position1"],
            &initial.body1,
        );
        put_body(
            &mut out,
            ["initial-mass2", "initial-dimensionless-spin2", "initial-position2"],
            &initial.body2,
        );

        let reference = self.reference;
        put(&mut out, "reference-time", reference.time);
        put_body(
            &mut out,
            ["reference-mass1", "reference-dimensionless-spin1", "reference-position1"],
            &reference.body1,
        );
        put_body(
            &mut out,
            ["reference-mass2", "reference-dimensionless-spin2", "reference-position2"],
            &reference.body2,
        );
        put(&mut out, "reference-orbital-frequency", reference.orbital_frequency);
        put(&mut out, "reference-eccentricity", reference.eccentricity);
        put(&mut out, "reference-mean-anomaly", reference.mean_anomaly);

        put(&mut out, "common-horizon-time", self.evolution.common_horizon_time);
        put(&mut out, "number-of-orbits", self.evolution.number_of_orbits);

        put(&mut out, "remnant-mass", self.remnant.mass);
        put(&mut out, "remnant-dimensionless-spin", self.remnant.dimensionless_spin);
        put(&mut out, "remnant-velocity", self.remnant.velocity);

        let provenance = self.provenance;
        put(
            &mut out,
            "metadata-version",
            provenance.metadata_version.map(|version| i64::from(version.get())),
        );
        if !provenance.evolution_revisions.is_empty() {
            out.push(("spec-revisions", provenance.evolution_revisions.into()));
        }
        put(&mut out, "spells-revision", provenance.initial_data_revision);
        out
    }
}

impl TryFrom<RecordRepr> for SimulationRecord {
    type Error = MetaError;

    fn try_from(mut repr: RecordRepr) -> Result<Self, MetaError> {
        let extras = std::mem::take(&mut repr.extras);
        // Extras spelled like aliases only survive if aliases stay unresolved.
        let accept_aliases = !extras
            .keys()
            .any(|key| keys::lookup_with_aliases(key).is_some());
        let mut builder = RecordBuilder::new();
        for (key, value) in repr.typed_values() {
            builder = builder.set(key, value)?;
        }
        for (key, raw) in &extras {
            builder = builder.set_raw(key, raw)?;
        }
        builder.build(&ParseOptions {
            accept_aliases,
            ..ParseOptions::default()
        })
    }
}

impl PartialEq for SimulationRecord {
    fn eq(&self, other: &Self) -> bool {
        let raw = |record: &SimulationRecord| -> Vec<(&'static str, String)> {
            record
                .fields
                .iter()
                .map(|(key, field)| (*key, field.raw.clone()))
                .collect()
        };
        let extras = |record: &SimulationRecord| -> Vec<(String, String)> {
            record
                .extras
                .iter()
                .map(|entry| (entry.key.clone(), entry.value.clone()))
                .collect()
        };
        raw(self) == raw(other) && extras(self) == extras(other)
    }
}

/// Parses metadata text.
pub fn parse_str(text: &str, opts: &ParseOptions) -> Result<SimulationRecord, MetaError> {
    let document = scan(text)?;
    SimulationRecord::from_document(&document, opts)
}

/// Reads and parses a metadata file.
pub fn parse_file(path: &Path, opts: &ParseOptions) -> Result<SimulationRecord, MetaError> {
    let text = fs::read_to_string(path).map_err(|err| {
        MetaError::Io(
            ErrorInfo::new("bbh_meta.read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    parse_str(&text, opts).map_err(|err| with_path(err, path))
}

fn with_path(err: MetaError, path: &Path) -> MetaError {
    let path = path.display().to_string();
    match err {
        MetaError::Syntax(info) => MetaError::Syntax(info.with_context("path", path)),
        MetaError::Value(info) => MetaError::Value(info.with_context("path", path)),
        MetaError::Duplicate(info) => MetaError::Duplicate(info.with_context("path", path)),
        MetaError::Invariant(info) => MetaError::Invariant(info.with_context("path", path)),
        other => other,
    }
}

impl SimulationRecord {
    /// Builds a record from a scanned document.
    pub fn from_document(document: &Document, opts: &ParseOptions) -> Result<Self, MetaError> {
        let mut fields: BTreeMap<&'static str, Field> = BTreeMap::new();
        let mut extras: Vec<Entry> = Vec::new();

        for entry in document.entries() {
            let spec = if opts.accept_aliases {
                keys::lookup_with_aliases(&entry.key)
            } else {
                keys::lookup(&entry.key)
            };
            let Some(spec) = spec else {
                insert_extra(&mut extras, entry, opts.duplicates)?;
                continue;
            };
            if !spec.name.eq_ignore_ascii_case(&entry.key) {
                debug!(alias = %entry.key, key = spec.name, line = entry.line, "resolved key alias");
            }
            if let Some(previous) = fields.get(spec.name) {
                match opts.duplicates {
                    DuplicatePolicy::Reject => {
                        return Err(duplicate_error(entry, previous.line));
                    }
                    DuplicatePolicy::First => {
                        warn!(key = %entry.key, line = entry.line, first = previous.line, "keeping first occurrence of duplicate key");
                        continue;
                    }
                    DuplicatePolicy::Last => {
                        warn!(key = %entry.key, line = entry.line, first = previous.line, "replacing earlier occurrence of duplicate key");
                    }
                }
            }
            fields.insert(spec.name, coerce(spec, entry)?);
        }

        if opts.enforce_invariants {
            check_masses(&fields)?;
        }

        let record = Self::assemble(fields, extras, opts.accept_aliases);
        if opts.validate {
            for finding in validate(&record).findings {
                match finding.severity {
                    Severity::Warning => warn!(key = %finding.key, "{}", finding.message),
                    Severity::Info => debug!(key = %finding.key, "{}", finding.message),
                }
            }
        }
        Ok(record)
    }

    fn assemble(
        fields: BTreeMap<&'static str, Field>,
        extras: Vec<Entry>,
        accept_aliases: bool,
    ) -> Self {
        let get = |key: &str| fields.get(key).and_then(|field| field.value.as_ref());
        let text = |key: &str| match get(key) {
            Some(Value::Text(text)) => Some(text.clone()),
            _ => None,
        };
        let list = |key: &str| match fields.get(key) {
            Some(Field {
                value: Some(Value::TextList(items)),
                ..
            }) => Some(items.clone()),
            Some(Field { value: None, .. }) => Some(Vec::new()),
            _ => None,
        };
        let float = |key: &str| match get(key) {
            Some(Value::Float(value)) => Some(*value),
            _ => None,
        };
        let vector = |key: &str| match get(key) {
            Some(Value::Vector(value)) => Some(*value),
            _ => None,
        };
        let object = |key: &str| match get(key) {
            Some(Value::Object(kind)) => Some(*kind),
            _ => None,
        };
        let body = |prefix: &str, index: u8| BodyState {
            mass: float(&format!("{prefix}-mass{index}")),
            dimensionless_spin: vector(&format!("{prefix}-dimensionless-spin{index}")),
            position: vector(&format!("{prefix}-position{index}")),
        };

        let identity = Identity {
            simulation_name: text("simulation-name"),
            alternative_names: list("alternative-names"),
            keywords: list("keywords"),
            point_of_contact_email: text("point-of-contact-email"),
            authors_emails: list("authors-emails"),
        };
        let bibliography = Bibliography {
            simulation: list("simulation-bibtex-keys"),
            code: list("code-bibtex-keys"),
            initial_data: list("initial-data-bibtex-keys"),
            quasicircular: list("quasicircular-bibtex-keys"),
        };
        let initial_data = InitialData {
            separation: float("initial-separation"),
            orbital_frequency: float("initial-orbital-frequency"),
            adot: float("initial-adot"),
            object1: object("object1"),
            object2: object("object2"),
        };
        let initial = InitialQuantities {
            adm_energy: float("initial-ADM-energy"),
            adm_linear_momentum: vector("initial-ADM-linear-momentum"),
            adm_angular_momentum: vector("initial-ADM-angular-momentum"),
            body1: body("initial", 1),
            body2: body("initial", 2),
        };
        let reference = ReferenceQuantities {
            time: float("reference-time"),
            body1: body("reference", 1),
            body2: body("reference", 2),
            orbital_frequency: vector("reference-orbital-frequency"),
            eccentricity: match get("reference-eccentricity") {
                Some(Value::Bounded(bounded)) => Some(*bounded),
                _ => None,
            },
            mean_anomaly: float("reference-mean-anomaly"),
        };
        let evolution = Evolution {
            common_horizon_time: float("common-horizon-time"),
            number_of_orbits: float("number-of-orbits"),
        };
        let remnant = Remnant {
            mass: float("remnant-mass"),
            dimensionless_spin: vector("remnant-dimensionless-spin"),
            velocity: vector("remnant-velocity"),
        };
        let provenance = CodeProvenance {
            metadata_version: match get("metadata-version") {
                Some(Value::Integer(version)) => u32::try_from(*version).ok().map(SchemaVersion::new),
                _ => None,
            },
            evolution_revisions: list("spec-revisions").unwrap_or_default(),
            initial_data_revision: text("spells-revision"),
        };

        Self {
            identity,
            bibliography,
            initial_data,
            initial,
            reference,
            evolution,
            remnant,
            provenance,
            extras,
            fields,
            accept_aliases,
        }
    }

    /// Naming and contact fields.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Citation keys.
    pub fn bibliography(&self) -> &Bibliography {
        &self.bibliography
    }

    /// Initial-data solver parameters.
    pub fn initial_data(&self) -> &InitialData {
        &self.initial_data
    }

    /// Quantities at t=0.
    pub fn initial(&self) -> &InitialQuantities {
        &self.initial
    }

    /// Quantities at the reference (relaxation) time.
    pub fn reference(&self) -> &ReferenceQuantities {
        &self.reference
    }

    /// Run-level summary.
    pub fn evolution(&self) -> &Evolution {
        &self.evolution
    }

    /// Final black hole.
    pub fn remnant(&self) -> &Remnant {
        &self.remnant
    }

    /// Layout version and code revisions.
    pub fn provenance(&self) -> &CodeProvenance {
        &self.provenance
    }

    /// Keys not in the key table, with their raw text, in file order.
    pub fn extras(&self) -> &[Entry] {
        &self.extras
    }

    /// Whether the record carries `key` (known or unknown), even if empty.
    pub fn contains(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    /// Raw value text for `key` exactly as it appeared in the source.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.field(key)
            .map(|field| field.raw.as_str())
            .or_else(|| self.extra(key).map(|entry| entry.value.as_str()))
    }

    /// 1-based source line of `key`.
    pub fn line_of(&self, key: &str) -> Option<usize> {
        self.field(key)
            .map(|field| field.line)
            .or_else(|| self.extra(key).map(|entry| entry.line))
    }

    fn field(&self, key: &str) -> Option<&Field> {
        let spec = if self.accept_aliases {
            keys::lookup_with_aliases(key)
        } else {
            keys::lookup(key)
        }?;
        self.fields.get(spec.name)
    }

    fn extra(&self, key: &str) -> Option<&Entry> {
        self.extras
            .iter()
            .find(|entry| entry.key.eq_ignore_ascii_case(key))
    }

    /// Value of an unknown key, classified from its text alone; `None` when
    /// absent or empty.
    pub fn extra_value(&self, key: &str) -> Option<Value> {
        self.extra(key)
            .filter(|entry| !entry.value.is_empty())
            .map(|entry| Value::infer(&entry.value))
    }

    /// Typed value for a known key; `None` when absent or empty.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.field(key)?.value.as_ref()
    }

    /// Typed value for a known key, reporting absence as an error.
    pub fn require(&self, key: &str) -> Result<&Value, MetaError> {
        self.get(key).ok_or_else(|| MetaError::absent(key))
    }

    /// Float value for `key`, reporting absence as an error.
    pub fn require_float(&self, key: &str) -> Result<f64, MetaError> {
        match self.require(key)? {
            Value::Float(value) => Ok(*value),
            other => Err(kind_mismatch(key, ValueKind::Float, other)),
        }
    }

    /// Vector value for `key`, reporting absence as an error.
    pub fn require_vector(&self, key: &str) -> Result<Vec3, MetaError> {
        match self.require(key)? {
            Value::Vector(value) => Ok(*value),
            other => Err(kind_mismatch(key, ValueKind::Vector, other)),
        }
    }

    /// Possibly bounded value for `key`, reporting absence as an error.
    pub fn require_bounded(&self, key: &str) -> Result<Bounded, MetaError> {
        match self.require(key)? {
            Value::Bounded(value) => Ok(*value),
            other => Err(kind_mismatch(key, ValueKind::Bounded, other)),
        }
    }

    /// Text value for `key`, reporting absence as an error.
    pub fn require_text(&self, key: &str) -> Result<&str, MetaError> {
        match self.require(key)? {
            Value::Text(value) => Ok(value),
            other => Err(kind_mismatch(key, ValueKind::Text, other)),
        }
    }

    /// Known keys present in the record with their raw text, in key-table order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static KeySpec, &str)> + '_ {
        keys::KEYS.iter().filter_map(move |spec| {
            self.fields
                .get(spec.name)
                .map(|field| (spec, field.raw.as_str()))
        })
    }

    /// Number of keys present, known and unknown.
    pub fn len(&self) -> usize {
        self.fields.len() + self.extras.len()
    }

    /// Whether the record has no keys at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn kind_mismatch(key: &str, expected: ValueKind, found: &Value) -> MetaError {
    MetaError::Value(
        ErrorInfo::new(
            "bbh_meta.kind_mismatch",
            format!(
                "`{key}` holds a {} value, not a {}",
                found.kind().name(),
                expected.name()
            ),
        )
        .with_context("key", key),
    )
}

fn duplicate_error(entry: &Entry, first_line: usize) -> MetaError {
    MetaError::Duplicate(
        ErrorInfo::new(
            "bbh_meta.duplicate_key",
            format!("`{}` already defined on line {first_line}", entry.key),
        )
        .at(entry.line, &entry.key)
        .with_context("first_line", first_line.to_string()),
    )
}

fn coerce(spec: &KeySpec, entry: &Entry) -> Result<Field, MetaError> {
    let value = if entry.value.is_empty() && !spec.kind.is_list() {
        debug!(key = %entry.key, line = entry.line, "empty value treated as absent");
        None
    } else {
        Some(Value::parse(spec.kind, &entry.value, entry.line, &entry.key)?)
    };
    if let Some(Value::Integer(version)) = &value {
        if spec.name == "metadata-version" && u32::try_from(*version).is_err() {
            return Err(MetaError::Value(
                ErrorInfo::new(
                    "bbh_meta.not_a_version",
                    format!("`{}` is not a layout version", entry.value),
                )
                .at(entry.line, &entry.key)
                .with_context("value", entry.value.as_str())
                .with_hint("layout versions are non-negative integers"),
            ));
        }
    }
    Ok(Field {
        value,
        raw: entry.value.clone(),
        line: entry.line,
    })
}

fn insert_extra(
    extras: &mut Vec<Entry>,
    entry: &Entry,
    policy: DuplicatePolicy,
) -> Result<(), MetaError> {
    debug!(key = %entry.key, line = entry.line, "ignoring unknown key");
    let existing = extras
        .iter()
        .position(|seen| seen.key.eq_ignore_ascii_case(&entry.key));
    match (existing, policy) {
        (None, _) => extras.push(entry.clone()),
        (Some(idx), DuplicatePolicy::Reject) => {
            return Err(duplicate_error(entry, extras[idx].line));
        }
        (Some(idx), DuplicatePolicy::First) => {
            warn!(key = %entry.key, line = entry.line, first = extras[idx].line, "keeping first occurrence of duplicate key");
        }
        (Some(idx), DuplicatePolicy::Last) => {
            warn!(key = %entry.key, line = entry.line, first = extras[idx].line, "replacing earlier occurrence of duplicate key");
            extras[idx] = entry.clone();
        }
    }
    Ok(())
}

fn check_masses(fields: &BTreeMap<&'static str, Field>) -> Result<(), MetaError> {
    for key in MASS_KEYS {
        let Some(field) = fields.get(key) else {
            continue;
        };
        if let Some(Value::Float(mass)) = &field.value {
            if *mass <= 0.0 || mass.is_nan() {
                return Err(MetaError::Invariant(
                    ErrorInfo::new(
                        "bbh_meta.non_positive_mass",
                        format!("mass must be positive, found {}", field.raw),
                    )
                    .at(field.line, key),
                ));
            }
        }
    }
    Ok(())
}

/// Assembles new records for producing pipelines.
///
/// Values are rendered to text and parsed back, so a built record is
/// indistinguishable from one read from disk.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    lines: Vec<(String, String)>,
}

impl RecordBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a known key from a typed value; the value kind must match the key.
    pub fn set(self, key: &str, value: impl Into<Value>) -> Result<Self, MetaError> {
        let value = value.into();
        let spec = keys::lookup(key).ok_or_else(|| {
            MetaError::Value(
                ErrorInfo::new("bbh_meta.unknown_key", format!("`{key}` is not a known key"))
                    .with_context("key", key)
                    .with_hint("use `set_raw` for keys outside the table"),
            )
        })?;
        if value.kind() != spec.kind {
            return Err(MetaError::Value(
                ErrorInfo::new(
                    "bbh_meta.kind_mismatch",
                    format!(
                        "`{key}` takes a {} value, not a {}",
                        spec.kind.name(),
                        value.kind().name()
                    ),
                )
                .with_context("key", key),
            ));
        }
        check_writable(spec.name, &value)?;
        let text = value.to_string();
        self.set_raw(spec.name, &text)
    }

    /// Sets any key from raw value text.
    pub fn set_raw(mut self, key: &str, raw: &str) -> Result<Self, MetaError> {
        if !crate::lexer::is_valid_key(key) || raw.contains('\n') {
            return Err(unwritable(key, "key or value cannot be written as one line"));
        }
        if let Some(slot) = self
            .lines
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
        {
            slot.1 = raw.trim().to_string();
        } else {
            self.lines.push((key.to_string(), raw.trim().to_string()));
        }
        Ok(self)
    }

    /// Renders and parses the accumulated entries.
    pub fn build(&self, opts: &ParseOptions) -> Result<SimulationRecord, MetaError> {
        let mut text = String::new();
        for (key, value) in &self.lines {
            text.push_str(key);
            text.push_str(" = ");
            text.push_str(value);
            text.push('\n');
        }
        parse_str(&text, opts)
    }
}

fn unwritable(key: &str, message: &str) -> MetaError {
    MetaError::Value(ErrorInfo::new("bbh_meta.unwritable", message).with_context("key", key))
}

/// Rejects typed values whose text form would parse back differently.
fn check_writable(key: &str, value: &Value) -> Result<(), MetaError> {
    match value {
        Value::Text(text) if text.is_empty() || text.trim() != text => Err(unwritable(
            key,
            "text values must be non-empty without surrounding whitespace",
        )),
        Value::TextList(items) => match items
            .iter()
            .find(|item| item.is_empty() || item.contains(',') || item.trim() != item.as_str())
        {
            Some(item) => Err(MetaError::Value(
                ErrorInfo::new(
                    "bbh_meta.unwritable",
                    "list items must be non-empty, without commas or surrounding whitespace",
                )
                .with_context("key", key)
                .with_context("item", item.as_str()),
            )),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}
