use bbh_core::{Bounded, ObjectKind, SchemaVersion, Vec3};
use bbh_meta::{parse_str, validate, ParseOptions, Value, KEYS};

const FIXTURE: &str = include_str!("fixtures/metadata.txt");

fn fixture() -> bbh_meta::SimulationRecord {
    parse_str(FIXTURE, &ParseOptions::default()).expect("fixture parses")
}

#[test]
fn every_known_key_is_populated() {
    let record = fixture();
    for spec in KEYS {
        assert!(record.get(spec.name).is_some(), "{} missing", spec.name);
    }
    assert!(record.extras().is_empty());
    assert_eq!(record.len(), KEYS.len());
}

#[test]
fn component_masses_sum_to_unity() {
    let record = fixture();
    let m1 = record.initial().body1.mass.expect("m1");
    let m2 = record.initial().body2.mass.expect("m2");
    assert_eq!(m1, 0.8000000333787665);
    assert!((m1 + m2 - 1.0).abs() < 1e-7);
}

#[test]
fn eccentricity_is_an_upper_bound() {
    let record = fixture();
    let eccentricity = record.reference().eccentricity.expect("eccentricity");
    assert_eq!(eccentricity, Bounded::UpperBound(1.7e-4));
    assert_ne!(eccentricity, Bounded::Exact(1.7e-4));
    assert_eq!(record.raw("reference-eccentricity"), Some("<1.7e-04"));
}

#[test]
fn metadata_version_is_an_integer() {
    let record = fixture();
    assert_eq!(record.get("metadata-version"), Some(&Value::Integer(1)));
    assert_eq!(
        record.provenance().metadata_version,
        Some(SchemaVersion::new(1))
    );
}

#[test]
fn vectors_have_three_components() {
    let record = fixture();
    let vector_keys: Vec<_> = KEYS
        .iter()
        .filter(|spec| spec.kind == bbh_meta::ValueKind::Vector)
        .map(|spec| spec.name)
        .collect();
    assert_eq!(vector_keys.len(), 13);
    for key in vector_keys {
        let vector = record.require_vector(key).expect(key);
        assert_eq!(vector.components().len(), 3);
    }
    assert_eq!(
        record.initial().body2.position,
        Some(Vec3::new(-10.4, 0.0, 0.0))
    );
}

#[test]
fn groups_are_populated() {
    let record = fixture();
    assert_eq!(
        record.identity().simulation_name.as_deref(),
        Some("q4_nospin_d13/Lev3")
    );
    assert_eq!(
        record.identity().alternative_names.as_deref(),
        Some(&["SXS:BBH:0123".to_string(), "q4_nospin_d13".to_string()][..])
    );
    assert_eq!(record.bibliography().code.as_ref().map(Vec::len), Some(3));
    assert_eq!(record.initial_data().object1, Some(ObjectKind::BlackHole));
    assert_eq!(record.initial_data().adot, Some(-1.32649259e-4));
    assert_eq!(record.reference().time, Some(200.0));
    assert_eq!(record.evolution().number_of_orbits, Some(17.28));
    assert_eq!(record.remnant().mass, Some(0.97578381));
    assert_eq!(record.provenance().evolution_revisions.len(), 2);
    assert_eq!(
        record.provenance().initial_data_revision.as_deref(),
        Some("InitialCommit-22431-g1a2b3c4")
    );
}

#[test]
fn fixture_passes_validation() {
    let report = validate(&fixture());
    assert!(report.findings.is_empty(), "{:?}", report.findings);
}

#[test]
fn line_numbers_are_tracked() {
    let record = fixture();
    assert_eq!(record.line_of("simulation-name"), Some(3));
    assert_eq!(record.line_of("initial-ADM-energy"), record.line_of("initial-adm-energy"));
}
