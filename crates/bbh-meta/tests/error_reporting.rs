use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use bbh_core::{MetaError, Vec3};
use bbh_meta::{parse_str, validate, DuplicatePolicy, ParseOptions, Value};

fn parse(text: &str) -> Result<bbh_meta::SimulationRecord, MetaError> {
    parse_str(text, &ParseOptions::default())
}

#[test]
fn unknown_keys_are_ignored() {
    let record = parse("remnant-mass = 0.95\nsome-future-key = whatever\n").expect("parse");
    assert_eq!(record.remnant().mass, Some(0.95));
    assert!(record.get("some-future-key").is_none());
    assert_eq!(record.raw("some-future-key"), Some("whatever"));
}

#[test]
fn missing_keys_are_absent_not_zero() {
    let record = parse("simulation-name = q1\n").expect("parse");
    assert_eq!(record.remnant().mass, None);
    let err = record.require_float("remnant-mass").expect_err("absent");
    assert!(matches!(err, MetaError::Absent(_)));
    assert_eq!(err.info().key(), Some("remnant-mass"));
}

#[test]
fn empty_scalar_is_absent_but_empty_list_is_present() {
    let record = parse("remnant-mass =\nkeywords =\n").expect("parse");
    assert!(record.contains("remnant-mass"));
    assert!(matches!(
        record.require("remnant-mass"),
        Err(MetaError::Absent(_))
    ));
    assert_eq!(record.identity().keywords, Some(Vec::new()));
    assert_eq!(record.identity().authors_emails, None);
}

#[test]
fn malformed_vector_names_line_and_key() {
    let err = parse("simulation-name = q1\n\nremnant-velocity = 0.1, 0.2\n").expect_err("arity");
    assert!(matches!(err, MetaError::Value(_)));
    assert_eq!(err.info().line(), Some(3));
    assert_eq!(err.info().key(), Some("remnant-velocity"));
    assert_eq!(err.info().code, "bbh_meta.vector_arity");
}

#[test]
fn non_numeric_value_names_line_and_key() {
    let err = parse("# header\ninitial-mass1 = heavy\n").expect_err("nan");
    assert_eq!(err.info().line(), Some(2));
    assert_eq!(err.info().key(), Some("initial-mass1"));
    assert_eq!(err.info().code, "bbh_meta.not_a_number");
}

#[test]
fn version_must_be_integral() {
    let err = parse("metadata-version = 1.0\n").expect_err("float version");
    assert_eq!(err.info().code, "bbh_meta.not_an_integer");
}

#[test]
fn bound_in_exact_field_is_rejected() {
    let err = parse("reference-mean-anomaly = <3.0\n").expect_err("bound");
    assert_eq!(err.info().code, "bbh_meta.unexpected_bound");
}

#[test]
fn unknown_object_kind_is_rejected() {
    let err = parse("object2 = wd\n").expect_err("object");
    assert_eq!(err.info().code, "bbh_meta.object_kind");
}

#[test]
fn duplicates_follow_policy() {
    let text = "remnant-mass = 0.9\nREMNANT-MASS = 0.8\n";
    let err = parse(text).expect_err("duplicate");
    assert!(matches!(err, MetaError::Duplicate(_)));
    assert_eq!(err.info().line(), Some(2));
    assert_eq!(err.info().context.get("first_line").map(String::as_str), Some("1"));

    let first = ParseOptions {
        duplicates: DuplicatePolicy::First,
        ..ParseOptions::default()
    };
    assert_eq!(parse_str(text, &first).expect("first").remnant().mass, Some(0.9));

    let last = ParseOptions {
        duplicates: DuplicatePolicy::Last,
        ..ParseOptions::default()
    };
    assert_eq!(parse_str(text, &last).expect("last").remnant().mass, Some(0.8));
}

#[test]
fn alias_and_canonical_spelling_collide() {
    let err = parse("reference-time = 200.0\nrelaxed-measurement-time = 250.0\n")
        .expect_err("duplicate");
    assert!(matches!(err, MetaError::Duplicate(_)));
}

#[test]
fn aliases_can_be_disabled() {
    let opts = ParseOptions {
        accept_aliases: false,
        ..ParseOptions::default()
    };
    let record = parse_str("relaxed-mass1 = 0.5\n", &opts).expect("parse");
    assert_eq!(record.reference().body1.mass, None);
    assert_eq!(record.raw("relaxed-mass1"), Some("0.5"));
}

#[test]
fn non_positive_mass_violates_invariant() {
    let err = parse("initial-mass1 = 0.5\ninitial-mass2 = -0.5\n").expect_err("mass");
    assert!(matches!(err, MetaError::Invariant(_)));
    assert_eq!(err.info().line(), Some(2));
    assert_eq!(err.info().key(), Some("initial-mass2"));

    let lenient = ParseOptions {
        enforce_invariants: false,
        ..ParseOptions::default()
    };
    let record = parse_str("remnant-mass = 0.0\n", &lenient).expect("lenient");
    assert_eq!(record.remnant().mass, Some(0.0));
}

#[test]
fn require_reports_kind_mismatch() {
    let record = parse("remnant-mass = 0.95\n").expect("parse");
    let err = record.require_vector("remnant-mass").expect_err("kind");
    assert_eq!(err.info().code, "bbh_meta.kind_mismatch");
}

#[test]
fn version_outside_u32_is_rejected() {
    for raw in ["-1", "4294967296"] {
        let text = format!("object1 = bh\nobject2 = bh\nmetadata-version = {raw}\n");
        let err = parse(&text).expect_err("version");
        assert!(matches!(err, MetaError::Value(_)));
        assert_eq!(err.info().code, "bbh_meta.not_a_version");
        assert_eq!(err.info().line(), Some(3));
        assert_eq!(err.info().key(), Some("metadata-version"));
    }
}

#[test]
fn version_zero_parses_but_is_flagged() {
    let record = parse("object1 = bh\nobject2 = bh\nmetadata-version = 0\n").expect("parse");
    assert_eq!(record.provenance().metadata_version.map(|v| v.get()), Some(0));
    assert!(validate(&record)
        .warnings()
        .any(|finding| finding.key == "metadata-version"));
}

#[test]
fn unknown_values_are_classified_on_request() {
    let record = parse(
        "pipeline-step = 3\nkick-estimate = <0.002\nbeam = 0.0, 1.0, 0.5\nnote = hand tuned\nempty =\n",
    )
    .expect("parse");
    assert_eq!(record.extra_value("pipeline-step"), Some(Value::Integer(3)));
    assert!(matches!(
        record.extra_value("KICK-ESTIMATE"),
        Some(Value::Bounded(bound)) if bound.is_upper_bound()
    ));
    assert_eq!(
        record.extra_value("beam"),
        Some(Value::Vector(Vec3::new(0.0, 1.0, 0.5)))
    );
    assert_eq!(
        record.extra_value("note"),
        Some(Value::Text("hand tuned".to_string()))
    );
    assert_eq!(record.extra_value("empty"), None);
    assert_eq!(record.extra_value("remnant-mass"), None);
}

#[test]
fn disabled_aliases_keep_alias_lookups_on_extras() {
    let opts = ParseOptions {
        accept_aliases: false,
        ..ParseOptions::default()
    };
    let record = parse_str("reference-mass1 = 0.6\nrelaxed-mass1 = 0.5\n", &opts).expect("parse");
    assert_eq!(record.raw("reference-mass1"), Some("0.6"));
    assert_eq!(record.raw("relaxed-mass1"), Some("0.5"));
    assert_eq!(record.line_of("relaxed-mass1"), Some(2));
    assert!(record.get("relaxed-mass1").is_none());

    let record = parse("relaxed-mass1 = 0.5\n").expect("parse");
    assert_eq!(record.raw("relaxed-mass1"), Some("0.5"));
    assert_eq!(record.get("relaxed-mass1"), Some(&Value::Float(0.5)));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn parse_with_logs(text: &str, opts: &ParseOptions) -> (bbh_meta::SimulationRecord, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let record = tracing::subscriber::with_default(subscriber, || parse_str(text, opts))
        .expect("parse");
    let text = String::from_utf8(logs.0.lock().expect("lock").clone()).expect("utf8");
    (record, text)
}

#[test]
fn resolved_duplicate_unknown_keys_are_logged() {
    let text = "mystery = 1\nMYSTERY = 2\n";
    let first = ParseOptions {
        duplicates: DuplicatePolicy::First,
        ..ParseOptions::default()
    };
    let (record, logs) = parse_with_logs(text, &first);
    assert_eq!(record.raw("mystery"), Some("1"));
    assert!(logs.contains("keeping first occurrence of duplicate key"));

    let last = ParseOptions {
        duplicates: DuplicatePolicy::Last,
        ..ParseOptions::default()
    };
    let (record, logs) = parse_with_logs(text, &last);
    assert_eq!(record.raw("mystery"), Some("2"));
    assert!(logs.contains("replacing earlier occurrence of duplicate key"));
}
